//! Generation options.

use crate::decl::OptionDecl;
use crate::diagnostics::Diagnostics;

/// Options controlling automaton generation. Defaults are all-off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Preserve nondeterminism: emit an arc per compatible alternative and
    /// rely on subset construction to merge them.
    pub ndfa: bool,
    /// Skip DFA minimization.
    pub no_minimization: bool,
    /// Downgrade selected errors to warnings.
    pub permissive: bool,
    /// Produce the human-readable automaton description.
    pub verbose: bool,
    /// Record per-phase timings.
    pub time: bool,
    /// Request this many independent automata via heuristic distribution.
    /// Zero means one automaton per declared automaton (or a single one).
    pub split: u32,
}

impl Options {
    /// Fold one option declaration into the options value.
    ///
    /// Unknown option names are user errors.
    pub fn apply(&mut self, opt: &OptionDecl, diags: &mut Diagnostics) {
        match opt.name.as_str() {
            "ndfa" => self.ndfa = true,
            "no-minimization" => self.no_minimization = true,
            "w" => self.permissive = true,
            "v" => self.verbose = true,
            "time" => self.time = true,
            "split" => match opt.value {
                Some(n) => self.split = n,
                None => diags.error("option `split` requires a value", "split"),
            },
            other => diags.error(format!("unknown option `{}`", other), other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_flags() {
        let mut diags = Diagnostics::new();
        let mut opts = Options::default();
        for name in ["ndfa", "w", "time"] {
            opts.apply(&OptionDecl::flag(name), &mut diags);
        }
        assert!(opts.ndfa && opts.permissive && opts.time);
        assert!(!opts.no_minimization && !opts.verbose);
        assert!(diags.is_empty());
    }

    #[test]
    fn unknown_option_is_error() {
        let mut diags = Diagnostics::new();
        let mut opts = Options::default();
        opts.apply(&OptionDecl::flag("frobnicate"), &mut diags);
        assert!(diags.has_errors());
    }

    #[test]
    fn split_needs_value() {
        let mut diags = Diagnostics::new();
        let mut opts = Options::default();
        opts.apply(&OptionDecl::flag("split"), &mut diags);
        assert!(diags.has_errors());

        let mut diags = Diagnostics::new();
        opts.apply(
            &OptionDecl {
                name: "split".into(),
                value: Some(3),
            },
            &mut diags,
        );
        assert_eq!(opts.split, 3);
        assert!(diags.is_empty());
    }
}
