//! Tests for the semantic checker driven from declaration records.

use crate::decl::{
    BypassDecl, Decl, ExclusionDecl, InsnReservDecl, OptionDecl, PatternDecl, ReservDecl, UnitDecl,
};
use crate::ids::AutomatonId;
use crate::regexp::canonical_alternatives;

use super::{ADVANCE_CYCLE_NAME, CheckedDescription, check};

fn unit(name: &str) -> Decl {
    Decl::Unit(UnitDecl::new(name))
}

fn insn(name: &str, regexp: &str) -> Decl {
    Decl::InsnReservation(InsnReservDecl::new(name, regexp))
}

fn errors(desc: &CheckedDescription) -> Vec<String> {
    desc.diagnostics
        .iter()
        .filter(|d| d.severity() == crate::Severity::Error)
        .map(|d| d.message().to_string())
        .collect()
}

#[test]
fn minimal_description_checks_clean() {
    let desc = check(vec![unit("alu"), insn("add", "alu")]);
    assert!(desc.is_valid(), "{:?}", desc.diagnostics);
    assert_eq!(desc.units.len(), 1);
    assert_eq!(desc.insns.len(), 2, "advance-cycle appended");
    assert_eq!(desc.insns.last().unwrap().name, ADVANCE_CYCLE_NAME);
    assert_eq!(desc.automata.len(), 1);
    assert_eq!(desc.geometry.units, 1);
    assert_eq!(desc.geometry.cycles, 1);
}

#[test]
fn advance_cycle_is_always_last() {
    let desc = check(vec![unit("alu"), insn("add", "alu"), insn("sub", "alu")]);
    let adv = desc.advance_insn();
    assert!(desc.insns[adv.index()].is_advance_cycle());
    assert!(desc.insns[adv.index()].canonical.is_none());
}

#[test]
fn duplicate_unit_is_error() {
    let desc = check(vec![unit("alu"), unit("alu"), insn("add", "alu")]);
    assert!(
        errors(&desc).iter().any(|m| m.contains("repeated declaration of `alu`")),
        "{:?}",
        desc.diagnostics
    );
}

#[test]
fn duplicate_automaton_downgrades_under_permissive() {
    let decls = |permissive: bool| {
        let mut d = vec![
            Decl::Automaton(crate::decl::AutomatonDecl { name: "pipe".into() }),
            Decl::Automaton(crate::decl::AutomatonDecl { name: "pipe".into() }),
            Decl::Unit(UnitDecl::new("alu").automaton("pipe")),
            insn("add", "alu"),
        ];
        if permissive {
            d.insert(0, Decl::Option(OptionDecl::flag("w")));
        }
        d
    };

    assert!(!check(decls(false)).is_valid());
    let permissive = check(decls(true));
    assert!(permissive.is_valid(), "{:?}", permissive.diagnostics);
    assert!(permissive.diagnostics.has_warnings());
}

#[test]
fn undeclared_name_in_regexp() {
    let desc = check(vec![unit("alu"), insn("add", "alu + mul")]);
    assert!(errors(&desc).iter().any(|m| m.contains("undeclared name `mul`")));
}

#[test]
fn unit_without_automaton_when_automata_declared() {
    let desc = check(vec![
        Decl::Automaton(crate::decl::AutomatonDecl { name: "pipe".into() }),
        Decl::Unit(UnitDecl::new("alu").automaton("pipe")),
        unit("mul"),
        insn("add", "alu"),
        insn("mula", "mul"),
    ]);
    assert!(
        errors(&desc)
            .iter()
            .any(|m| m.contains("`mul` is not assigned to an automaton"))
    );
}

#[test]
fn malformed_regexp_is_reported_with_span() {
    let desc = check(vec![unit("alu"), insn("add", "(alu")]);
    assert!(!desc.is_valid());
    let msg = desc
        .diagnostics
        .iter()
        .find(|d| d.message().contains("unbalanced parenthesis"))
        .expect("parse diagnostic");
    assert_eq!(msg.construct(), "add");
}

#[test]
fn reservation_inlines_into_instructions() {
    let desc = check(vec![
        unit("decode"),
        unit("exec"),
        Decl::Reservation(ReservDecl {
            name: "front".into(),
            regexp: "decode, decode".into(),
        }),
        insn("add", "front, exec"),
    ]);
    assert!(desc.is_valid(), "{:?}", desc.diagnostics);

    let canonical = desc.insns[0].canonical.as_ref().unwrap();
    let alts = canonical_alternatives(canonical);
    assert_eq!(alts.len(), 1);
    assert_eq!(alts[0].len(), 3, "front expands to two decode cycles");
    assert_eq!(desc.geometry.cycles, 3);
}

#[test]
fn recursive_reservation_is_error() {
    let desc = check(vec![
        unit("alu"),
        Decl::Reservation(ReservDecl {
            name: "r1".into(),
            regexp: "alu, r2".into(),
        }),
        Decl::Reservation(ReservDecl {
            name: "r2".into(),
            regexp: "r1".into(),
        }),
        insn("add", "r1"),
    ]);
    let errs = errors(&desc);
    assert!(errs.iter().any(|m| m.contains("cycle in definition of reservation `r1`")));
    assert!(errs.iter().any(|m| m.contains("cycle in definition of reservation `r2`")));
}

#[test]
fn self_exclusion_is_error() {
    let desc = check(vec![
        unit("alu"),
        Decl::Exclusion(ExclusionDecl {
            names_a: vec!["alu".into()],
            names_b: vec!["alu".into()],
        }),
        insn("add", "alu"),
    ]);
    assert!(errors(&desc).iter().any(|m| m.contains("`alu` excludes itself")));
}

#[test]
fn exclusion_is_made_symmetric() {
    let desc = check(vec![
        unit("u1"),
        unit("u2"),
        Decl::Exclusion(ExclusionDecl {
            names_a: vec!["u1".into()],
            names_b: vec!["u2".into()],
        }),
        insn("a", "u1"),
        insn("b", "u2"),
    ]);
    assert!(desc.is_valid(), "{:?}", desc.diagnostics);
    assert!(desc.constraints.unit(0).excl.test(1));
    assert!(desc.constraints.unit(1).excl.test(0));
}

#[test]
fn cross_automaton_exclusion_is_error() {
    let desc = check(vec![
        Decl::Automaton(crate::decl::AutomatonDecl { name: "p0".into() }),
        Decl::Automaton(crate::decl::AutomatonDecl { name: "p1".into() }),
        Decl::Unit(UnitDecl::new("u1").automaton("p0")),
        Decl::Unit(UnitDecl::new("u2").automaton("p1")),
        Decl::Exclusion(ExclusionDecl {
            names_a: vec!["u1".into()],
            names_b: vec!["u2".into()],
        }),
        insn("a", "u1 + u2"),
    ]);
    assert!(
        errors(&desc)
            .iter()
            .any(|m| m.contains("belong to different automata"))
    );
}

#[test]
fn own_absence_is_error() {
    let desc = check(vec![
        unit("u1"),
        unit("u2"),
        Decl::Absence(PatternDecl {
            names: vec!["u1".into()],
            patterns: vec![vec!["u1".into(), "u2".into()]],
        }),
        insn("a", "u1"),
        insn("b", "u2"),
    ]);
    assert!(
        errors(&desc)
            .iter()
            .any(|m| m.contains("`u1` requires its own absence"))
    );
}

#[test]
fn exclusion_presence_conflict_is_downgradable() {
    let build = |permissive: bool| {
        let mut d = vec![
            unit("u1"),
            unit("u2"),
            Decl::Exclusion(ExclusionDecl {
                names_a: vec!["u1".into()],
                names_b: vec!["u2".into()],
            }),
            Decl::Presence(PatternDecl {
                names: vec!["u1".into()],
                patterns: vec![vec!["u2".into()]],
            }),
            insn("a", "u1"),
            insn("b", "u2"),
        ];
        if permissive {
            d.insert(0, Decl::Option(OptionDecl::flag("w")));
        }
        check(d)
    };

    let strict = build(false);
    assert!(
        errors(&strict)
            .iter()
            .any(|m| m.contains("excludes and requires presence of `u2`"))
    );
    assert!(build(true).is_valid());
}

#[test]
fn unused_declarations_complain() {
    let desc = check(vec![
        unit("alu"),
        unit("idle"),
        Decl::Reservation(ReservDecl {
            name: "spare".into(),
            regexp: "alu".into(),
        }),
        insn("add", "alu"),
    ]);
    let errs = errors(&desc);
    assert!(errs.iter().any(|m| m.contains("unit `idle` is not used")));
    assert!(errs.iter().any(|m| m.contains("reservation `spare` is not used")));
}

#[test]
fn bypass_resolution_and_duplicates() {
    let desc = check(vec![
        unit("alu"),
        insn("a", "alu"),
        insn("b", "alu"),
        Decl::Bypass(BypassDecl {
            latency: 1,
            out_insn: "a".into(),
            in_insn: "b".into(),
            guard: None,
        }),
        Decl::Bypass(BypassDecl {
            latency: 2,
            out_insn: "a".into(),
            in_insn: "b".into(),
            guard: None,
        }),
    ]);
    assert!(
        errors(&desc)
            .iter()
            .any(|m| m.contains("already defined with another latency"))
    );
    assert_eq!(desc.insns[0].bypasses.len(), 1);
    assert_eq!(desc.insns[0].bypasses[0].latency, 1);
}

#[test]
fn bypass_unknown_endpoint() {
    let desc = check(vec![
        unit("alu"),
        insn("a", "alu"),
        Decl::Bypass(BypassDecl {
            latency: 1,
            out_insn: "a".into(),
            in_insn: "phantom".into(),
            guard: None,
        }),
    ]);
    assert!(
        errors(&desc)
            .iter()
            .any(|m| m.contains("undeclared instruction `phantom` in bypass"))
    );
}

#[test]
fn negative_default_latency_is_error() {
    let desc = check(vec![
        unit("alu"),
        Decl::InsnReservation(InsnReservDecl::new("a", "alu").latency(-1)),
    ]);
    assert!(errors(&desc).iter().any(|m| m.contains("negative default latency")));
}

#[test]
fn cycle_extents_are_computed() {
    let desc = check(vec![
        unit("fetch"),
        unit("mem"),
        insn("load", "fetch, nothing, mem"),
        insn("store", "fetch, mem"),
    ]);
    assert!(desc.is_valid(), "{:?}", desc.diagnostics);
    assert_eq!(desc.units[0].min_occ_cycle, Some(0));
    assert_eq!(desc.units[0].max_occ_cycle, Some(0));
    assert_eq!(desc.units[1].min_occ_cycle, Some(1));
    assert_eq!(desc.units[1].max_occ_cycle, Some(2));
    assert_eq!(desc.geometry.cycles, 3);
}

#[test]
fn uneven_distribution_over_automata_is_error() {
    let desc = check(vec![
        Decl::Automaton(crate::decl::AutomatonDecl { name: "p0".into() }),
        Decl::Automaton(crate::decl::AutomatonDecl { name: "p1".into() }),
        Decl::Unit(UnitDecl::new("u1").automaton("p0")),
        Decl::Unit(UnitDecl::new("u2").automaton("p1")),
        // One alternative reserves only p0, the other both: p1 over-accepts.
        insn("a", "u1 | (u1 + u2)"),
    ]);
    assert!(
        errors(&desc)
            .iter()
            .any(|m| m.contains("in some but not all alternatives of `a`")),
        "{:?}",
        desc.diagnostics
    );
}

#[test]
fn even_distribution_over_automata_is_accepted() {
    let desc = check(vec![
        Decl::Automaton(crate::decl::AutomatonDecl { name: "p0".into() }),
        Decl::Automaton(crate::decl::AutomatonDecl { name: "p1".into() }),
        Decl::Unit(UnitDecl::new("u1").automaton("p0")),
        Decl::Unit(UnitDecl::new("u2").automaton("p0")),
        Decl::Unit(UnitDecl::new("m").automaton("p1")),
        insn("a", "(u1 + m) | (u2 + m)"),
    ]);
    assert!(desc.is_valid(), "{:?}", desc.diagnostics);
    assert_eq!(desc.units[0].automaton, AutomatonId(0));
    assert_eq!(desc.units[2].automaton, AutomatonId(1));
}

#[test]
fn queryable_units_sort_by_name() {
    let desc = check(vec![
        Decl::Unit(UnitDecl::new("zeta").queryable()),
        Decl::Unit(UnitDecl::new("alpha").queryable()),
        unit("mid"),
        insn("a", "zeta + alpha + mid"),
    ]);
    let sorted = desc.queryable_units_sorted();
    assert_eq!(sorted.len(), 2);
    assert_eq!(desc.units[sorted[0].index()].name, "alpha");
    assert_eq!(desc.units[sorted[1].index()].name, "zeta");
}
