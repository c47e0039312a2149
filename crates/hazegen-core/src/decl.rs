//! Typed declaration records.
//!
//! Declarations arrive from an external producer (a description parser, a
//! build script, a test fixture) as plain data. The checker interns them,
//! resolves names, and derives the checked description; nothing in this
//! module validates anything.

use serde::{Deserialize, Serialize};

/// One pipeline-description construct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decl {
    Unit(UnitDecl),
    Bypass(BypassDecl),
    Automaton(AutomatonDecl),
    Exclusion(ExclusionDecl),
    Presence(PatternDecl),
    FinalPresence(PatternDecl),
    Absence(PatternDecl),
    FinalAbsence(PatternDecl),
    Reservation(ReservDecl),
    InsnReservation(InsnReservDecl),
    Option(OptionDecl),
}

/// A functional unit: a named pipeline resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDecl {
    pub name: String,
    /// Owning automaton, when automata are declared explicitly.
    pub automaton: Option<String>,
    /// Whether the unit's cycle-0 reservation is exposed at scheduling time.
    pub queryable: bool,
}

impl UnitDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            automaton: None,
            queryable: false,
        }
    }

    pub fn automaton(mut self, name: impl Into<String>) -> Self {
        self.automaton = Some(name.into());
        self
    }

    pub fn queryable(mut self) -> Self {
        self.queryable = true;
        self
    }
}

/// A result bypass between two instruction reservations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BypassDecl {
    pub latency: i32,
    pub out_insn: String,
    pub in_insn: String,
    /// Opaque guard predicate name; never interpreted.
    pub guard: Option<String>,
}

/// A declared automaton name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonDecl {
    pub name: String,
}

/// Mutual exclusion between two groups of units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionDecl {
    pub names_a: Vec<String>,
    pub names_b: Vec<String>,
}

/// Presence/absence requirement: when any unit in `names` is reserved on a
/// cycle, the `patterns` constrain what else is reserved on that cycle.
/// Each pattern is a group of unit names reserved together; the pattern list
/// is a disjunction of such groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDecl {
    pub names: Vec<String>,
    pub patterns: Vec<Vec<String>>,
}

/// A named reservation usable from other regexps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservDecl {
    pub name: String,
    pub regexp: String,
}

/// An instruction reservation: the automaton input alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsnReservDecl {
    pub name: String,
    pub default_latency: i32,
    /// Opaque condition predicate carried through to the output.
    pub condition: String,
    pub regexp: String,
}

impl InsnReservDecl {
    pub fn new(name: impl Into<String>, regexp: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_latency: 0,
            condition: String::new(),
            regexp: regexp.into(),
        }
    }

    pub fn latency(mut self, latency: i32) -> Self {
        self.default_latency = latency;
        self
    }
}

/// A generation option: `no-minimization`, `time`, `v`, `w`, `ndfa`, or
/// `split` with a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDecl {
    pub name: String,
    pub value: Option<u32>,
}

impl OptionDecl {
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn declarations_round_trip_through_json() {
        let decls = vec![
            Decl::Automaton(AutomatonDecl {
                name: "pipe".into(),
            }),
            Decl::Unit(UnitDecl::new("alu").automaton("pipe").queryable()),
            Decl::Reservation(ReservDecl {
                name: "front".into(),
                regexp: "alu, alu".into(),
            }),
            Decl::InsnReservation(InsnReservDecl::new("add", "front").latency(2)),
            Decl::Bypass(BypassDecl {
                latency: 1,
                out_insn: "add".into(),
                in_insn: "add".into(),
                guard: Some("forwarding_p".into()),
            }),
            Decl::Option(OptionDecl::flag("ndfa")),
        ];

        let json = serde_json::to_string(&decls).unwrap();
        let back: Vec<Decl> = serde_json::from_str(&json).unwrap();
        assert_eq!(decls, back);
    }

    #[test]
    fn external_json_descriptions_deserialize() {
        let json = indoc! {r#"
            [
              {"Unit": {"name": "mul", "automaton": null, "queryable": false}},
              {"Presence": {"names": ["mul"], "patterns": [["alu"], ["mem", "wb"]]}},
              {"Option": {"name": "split", "value": 2}}
            ]
        "#};
        let decls: Vec<Decl> = serde_json::from_str(json).unwrap();
        assert_eq!(decls.len(), 3);
        assert!(matches!(
            &decls[1],
            Decl::Presence(p) if p.patterns.len() == 2
        ));
        assert!(matches!(
            &decls[2],
            Decl::Option(o) if o.value == Some(2)
        ));
    }
}
