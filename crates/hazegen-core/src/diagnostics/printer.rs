//! Renderer for collected diagnostics.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};

use super::collection::Diagnostics;
use super::message::Severity;

/// Renders diagnostics as plain lines, with annotated regexp source excerpts
/// for messages that carry a span.
pub struct DiagnosticsPrinter<'a> {
    diagnostics: &'a Diagnostics,
    colored: bool,
}

impl<'a> DiagnosticsPrinter<'a> {
    pub fn new(diagnostics: &'a Diagnostics) -> Self {
        Self {
            diagnostics,
            colored: false,
        }
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_str("\n")?;
            }

            let Some(span) = &diag.span else {
                writeln!(w, "{}", diag)?;
                continue;
            };

            let range = adjust_range(span.range.clone(), span.source.len());
            let snippet = Snippet::source(span.source.as_str())
                .line_start(1)
                .path(diag.construct.as_str())
                .annotation(AnnotationKind::Primary.span(range));

            let level = severity_to_level(diag.severity());
            let report: Vec<Group> = vec![level.primary_title(&diag.message).element(snippet)];
            writeln!(w, "{}", renderer.render(&report))?;
        }

        Ok(())
    }
}

fn severity_to_level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
    }
}

/// Clamp a span to the source bounds, widening empty spans to one byte when
/// there is a byte to point at. An empty source yields `0..0`.
fn adjust_range(range: std::ops::Range<usize>, limit: usize) -> std::ops::Range<usize> {
    let start = range.start.min(limit);
    let end = range.end.min(limit);
    if start == end && end < limit {
        return start..end + 1;
    }
    start..end
}
