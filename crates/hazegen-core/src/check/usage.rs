//! Pass 6: usage audit and cycle extents.
//!
//! Warns about declared-but-unreferenced constructs, then computes per-unit
//! min/max occurrence cycles and the global reservation length from the
//! canonical instruction regexps.

use crate::regexp::canonical_alternatives;

use super::Checker;

/// Returns the global maximum reservation length in cycles.
pub(crate) fn run(checker: &mut Checker) -> usize {
    audit(checker);
    extents(checker)
}

fn audit(checker: &mut Checker) {
    let permissive = checker.options.permissive;

    let unused_units: Vec<String> = checker
        .units
        .iter()
        .filter(|u| !u.used && !u.in_constraint)
        .map(|u| u.name.clone())
        .collect();
    for name in unused_units {
        checker.diags.error_unless_permissive(
            permissive,
            format!("unit `{}` is not used", name),
            &name,
        );
    }

    let unused_reservs: Vec<String> = checker
        .reservs
        .iter()
        .filter(|r| !r.used)
        .map(|r| r.name.clone())
        .collect();
    for name in unused_reservs {
        checker.diags.error_unless_permissive(
            permissive,
            format!("reservation `{}` is not used", name),
            &name,
        );
    }

    let unused_automata: Vec<String> = checker
        .automata_names
        .keys()
        .filter(|name| {
            !checker
                .units
                .iter()
                .any(|u| u.automaton_name.as_deref() == Some(name.as_str()))
        })
        .cloned()
        .collect();
    for name in unused_automata {
        checker.diags.error_unless_permissive(
            permissive,
            format!("automaton `{}` is not used", name),
            &name,
        );
    }

    // An instruction whose reservation never touches a unit cannot affect
    // any automaton state.
    let empty_insns: Vec<String> = checker
        .insns
        .iter()
        .filter(|i| {
            i.canonical
                .as_ref()
                .is_some_and(|c| canonical_alternatives(c).iter().flatten().all(|u| u.is_empty()))
        })
        .map(|i| i.name.clone())
        .collect();
    for name in empty_insns {
        checker.diags.warning(
            format!("instruction `{}` has no reservation effect", name),
            &name,
        );
    }
}

fn extents(checker: &mut Checker) -> usize {
    let mut max_cycles = 1usize;

    for insn in &checker.insns {
        let Some(canonical) = &insn.canonical else {
            continue;
        };
        for alt in canonical_alternatives(canonical) {
            max_cycles = max_cycles.max(alt.len());
            for (cycle, units) in alt.iter().enumerate() {
                for unit in units {
                    let info = &mut checker.units[unit.index()];
                    info.min_occ_cycle =
                        Some(info.min_occ_cycle.map_or(cycle, |m| m.min(cycle)));
                    info.max_occ_cycle =
                        Some(info.max_occ_cycle.map_or(cycle, |m| m.max(cycle)));
                }
            }
        }
    }

    max_cycles
}
