//! The staged generation facade.
//!
//! ```
//! use hazegen_dfa::Description;
//! use hazegen_core::decl::{Decl, InsnReservDecl, UnitDecl};
//!
//! let checked = Description::new(vec![
//!     Decl::Unit(UnitDecl::new("alu")),
//!     Decl::InsnReservation(InsnReservDecl::new("add", "alu")),
//! ])
//! .check();
//!
//! if !checked.is_valid() {
//!     eprintln!("{}", checked.dump_errors());
//! }
//! let dfa = checked.build().unwrap().tabulate();
//! assert_eq!(dfa.state_size(), 4);
//! ```

use std::time::Instant;

use hazegen_core::check::CheckedDescription;
use hazegen_core::decl::Decl;
use hazegen_core::{Diagnostics, DiagnosticsPrinter, Result};

use crate::runtime::Dfa;
use crate::tables;

/// An unchecked pile of declaration records.
pub struct Description {
    decls: Vec<Decl>,
}

impl Description {
    pub fn new(decls: Vec<Decl>) -> Self {
        Self { decls }
    }

    /// Run the semantic checker.
    pub fn check(self) -> Checked {
        let started = Instant::now();
        let desc = hazegen_core::check(self.decls);
        Checked {
            check_time: started.elapsed(),
            desc,
        }
    }
}

/// A checked description with its diagnostics.
pub struct Checked {
    desc: CheckedDescription,
    check_time: std::time::Duration,
}

impl Checked {
    pub fn is_valid(&self) -> bool {
        self.desc.is_valid()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.desc.diagnostics
    }

    pub fn dump_errors(&self) -> String {
        DiagnosticsPrinter::new(&self.desc.diagnostics).render()
    }

    pub fn description(&self) -> &CheckedDescription {
        &self.desc
    }

    /// Construct and minimize every automaton.
    ///
    /// Fails with [`hazegen_core::Error::CheckFailed`] when checking
    /// accumulated errors.
    pub fn build(self) -> Result<Built> {
        let mut built = hazegen_automata::build(self.desc)?;
        built.timings.check = self.check_time;
        Ok(Built { built })
    }
}

/// Constructed automata, ready for table compression.
pub struct Built {
    built: hazegen_automata::Automata,
}

impl Built {
    /// The human-readable automaton description (the `v` option artifact).
    pub fn dump(&self) -> String {
        self.built.dump()
    }

    pub fn counts(&self) -> Vec<hazegen_automata::Counts> {
        self.built.counts()
    }

    pub fn automata(&self) -> &hazegen_automata::Automata {
        &self.built
    }

    /// Compress the tables and assemble the query API.
    pub fn tabulate(self) -> Dfa {
        let started = Instant::now();
        let tables = tables::tabulate_all(&self.built.desc, &self.built.automata);
        let mut timings = self.built.timings;
        timings.tables = started.elapsed();
        Dfa::new(&self.built.desc, tables, timings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hazegen_core::Error;
    use hazegen_core::decl::{InsnReservDecl, UnitDecl};

    #[test]
    fn staged_pipeline_end_to_end() {
        let checked = Description::new(vec![
            Decl::Unit(UnitDecl::new("alu")),
            Decl::InsnReservation(InsnReservDecl::new("add", "alu")),
        ])
        .check();
        assert!(checked.is_valid());

        let dfa = checked.build().unwrap().tabulate();
        assert_eq!(dfa.automata_count(), 1);
        assert_eq!(dfa.state_size(), 4);
        assert!(dfa.insn_code("add").is_some());
    }

    #[test]
    fn built_stage_exposes_the_dump() {
        use indoc::indoc;

        let built = Description::new(vec![
            Decl::Unit(UnitDecl::new("u")),
            Decl::InsnReservation(InsnReservDecl::new("a", "u")),
        ])
        .check()
        .build()
        .unwrap();

        assert!(built.dump().starts_with(indoc! {"
            automaton #0
              2 NFA states, 3 NFA arcs
        "}));
        assert_eq!(built.counts()[0].min_states, 2);
    }

    #[test]
    fn invalid_descriptions_stop_at_build() {
        let checked = Description::new(vec![Decl::InsnReservation(InsnReservDecl::new(
            "add", "phantom",
        ))])
        .check();
        assert!(!checked.is_valid());
        assert!(checked.dump_errors().contains("undeclared name `phantom`"));
        assert!(matches!(checked.build(), Err(Error::CheckFailed(_))));
    }
}
