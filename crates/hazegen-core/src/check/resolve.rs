//! Pass 2: reference resolution.
//!
//! Every name used in a regexp must resolve to a unit or a reservation.
//! Units must name an automaton once any automaton is declared.

use indexmap::IndexMap;

use crate::diagnostics::Diagnostics;
use crate::regexp::Regexp;

use super::{Checker, NameRef};

pub(crate) fn run(checker: &mut Checker) {
    // Unit / automaton wiring.
    for unit in &checker.units {
        match &unit.automaton_name {
            Some(name) => {
                if !checker.automata_names.contains_key(name) {
                    checker.diags.error(
                        format!("undeclared automaton `{}` for unit `{}`", name, unit.name),
                        &unit.name,
                    );
                }
            }
            None => {
                if !checker.automata_names.is_empty() {
                    checker.diags.error(
                        format!(
                            "unit `{}` is not assigned to an automaton, but automata are declared",
                            unit.name
                        ),
                        &unit.name,
                    );
                }
            }
        }
    }

    // Regexp name resolution. Reservations and instructions may reference
    // declarations made later in the input, so this runs after all interning.
    for i in 0..checker.reservs.len() {
        let Some(re) = checker.reservs[i].regexp.take() else {
            continue;
        };
        let construct = checker.reservs[i].name.clone();
        let (resolved, marks) =
            resolve_regexp(re, &construct, &checker.decl_names, &mut checker.diags);
        apply_marks(checker, marks);
        checker.reservs[i].regexp = resolved;
    }
    for i in 0..checker.insns.len() {
        let Some(re) = checker.insns[i].regexp.take() else {
            continue;
        };
        let construct = checker.insns[i].name.clone();
        let (resolved, marks) =
            resolve_regexp(re, &construct, &checker.decl_names, &mut checker.diags);
        apply_marks(checker, marks);
        checker.insns[i].regexp = resolved;
    }
}

/// Units and reservations referenced while resolving one regexp; applied to
/// the checker afterwards so the resolver only borrows the name table.
#[derive(Default)]
struct UsageMarks {
    units: Vec<usize>,
    reservs: Vec<usize>,
}

fn apply_marks(checker: &mut Checker, marks: UsageMarks) {
    for u in marks.units {
        checker.units[u].used = true;
    }
    for r in marks.reservs {
        checker.reservs[r].used = true;
    }
}

fn resolve_regexp(
    re: Regexp,
    construct: &str,
    names: &IndexMap<String, NameRef>,
    diags: &mut Diagnostics,
) -> (Option<Regexp>, UsageMarks) {
    let mut marks = UsageMarks::default();
    let mut ok = true;
    let resolved = resolve_node(re, construct, names, diags, &mut marks, &mut ok);
    (ok.then_some(resolved), marks)
}

fn resolve_node(
    re: Regexp,
    construct: &str,
    names: &IndexMap<String, NameRef>,
    diags: &mut Diagnostics,
    marks: &mut UsageMarks,
    ok: &mut bool,
) -> Regexp {
    match re {
        Regexp::Name(name) => match names.get(&name) {
            Some(NameRef::Unit(id)) => {
                marks.units.push(id.index());
                Regexp::Unit(*id)
            }
            Some(NameRef::Reserv(id)) => {
                marks.reservs.push(id.index());
                Regexp::Reserv(*id)
            }
            None => {
                diags.error(format!("undeclared name `{}`", name), construct);
                *ok = false;
                Regexp::Nothing
            }
        },
        Regexp::Sequence(cs) => {
            Regexp::Sequence(resolve_all(cs, construct, names, diags, marks, ok))
        }
        Regexp::AllOf(cs) => Regexp::AllOf(resolve_all(cs, construct, names, diags, marks, ok)),
        Regexp::OneOf(cs) => Regexp::OneOf(resolve_all(cs, construct, names, diags, marks, ok)),
        Regexp::Repeat(child, n) => Regexp::Repeat(
            Box::new(resolve_node(*child, construct, names, diags, marks, ok)),
            n,
        ),
        leaf => leaf,
    }
}

fn resolve_all(
    cs: Vec<Regexp>,
    construct: &str,
    names: &IndexMap<String, NameRef>,
    diags: &mut Diagnostics,
    marks: &mut UsageMarks,
    ok: &mut bool,
) -> Vec<Regexp> {
    cs.into_iter()
        .map(|c| resolve_node(c, construct, names, diags, marks, ok))
        .collect()
}
