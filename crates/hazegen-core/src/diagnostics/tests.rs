use super::*;

#[test]
fn accumulates_and_counts() {
    let mut diags = Diagnostics::new();
    assert!(diags.is_empty());

    diags.error("undeclared name `mul`", "insn_a");
    diags.warning("unit `fp` is not used", "fp");
    diags.error("unit `div` excludes itself", "div");

    assert_eq!(diags.len(), 3);
    assert_eq!(diags.error_count(), 2);
    assert_eq!(diags.warning_count(), 1);
    assert!(diags.has_errors());
    assert!(diags.has_warnings());
}

#[test]
fn permissive_downgrades() {
    let mut diags = Diagnostics::new();
    diags.error_unless_permissive(true, "duplicate automaton `pipe`", "pipe");
    assert!(!diags.has_errors());
    assert!(diags.has_warnings());

    diags.error_unless_permissive(false, "duplicate automaton `pipe`", "pipe");
    assert!(diags.has_errors());
}

#[test]
fn display_names_construct() {
    let mut diags = Diagnostics::new();
    diags.error("cycle in definition of reservation", "r1");
    let msg = diags.iter().next().unwrap();
    assert_eq!(
        msg.to_string(),
        "error: cycle in definition of reservation (in `r1`)"
    );
}

#[test]
fn printer_renders_plain_lines() {
    let mut diags = Diagnostics::new();
    diags.error("undeclared name `mul`", "insn_a");
    diags.warning("automaton `pipe` is not used", "pipe");

    let out = DiagnosticsPrinter::new(&diags).render();
    assert!(out.contains("error: undeclared name `mul` (in `insn_a`)"));
    assert!(out.contains("warning: automaton `pipe` is not used (in `pipe`)"));
}

#[test]
fn printer_renders_empty_regexp_source() {
    // An empty reservation string reports a 0..0 span into an empty source;
    // the annotation must stay inside the source bounds.
    let mut diags = Diagnostics::new();
    diags.error_in_regexp(
        "empty reservation string",
        "insn_a",
        RegexpSpan::new("", 0..0),
    );

    let out = DiagnosticsPrinter::new(&diags).render();
    assert!(out.contains("empty reservation string"));
}

#[test]
fn printer_renders_end_of_source_span() {
    // A parse error at end of input points one past the last byte; the
    // widened annotation must not exceed the source length.
    let mut diags = Diagnostics::new();
    let source = "alu,";
    diags.error_in_regexp(
        "expected a name or `(`",
        "insn_a",
        RegexpSpan::new(source, 4..4),
    );

    let out = DiagnosticsPrinter::new(&diags).render();
    assert!(out.contains("expected a name or `(`"));
    assert!(out.contains("alu,"));
}

#[test]
fn printer_renders_regexp_span() {
    let mut diags = Diagnostics::new();
    let source = "alu, (mul";
    diags.error_in_regexp(
        "unbalanced parenthesis",
        "insn_a",
        RegexpSpan::new(source, 5..6),
    );

    let out = DiagnosticsPrinter::new(&diags).render();
    assert!(out.contains("unbalanced parenthesis"));
    assert!(out.contains("alu, (mul"));
}
