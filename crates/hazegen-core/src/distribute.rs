//! Unit-to-automaton distribution and its validation.
//!
//! With declared automata, every unit goes to the automaton it names. With
//! none declared, the `split` option engages a heuristic that balances the
//! estimated state-space size, measured as the product of
//! `(max occurrence cycle + 1)` across a partition's units, against the
//! nth root of the global product.

use indexmap::IndexMap;

use crate::check::{AutomatonInfo, InsnInfo, UnitInfo};
use crate::diagnostics::Diagnostics;
use crate::ids::AutomatonId;
use crate::regexp::canonical_alternatives;

/// Bound on the state-space estimation product, to keep the floating-point
/// arithmetic well away from overflow.
const MAX_ESTIMATION: f64 = 1e30;

/// Assign every unit an automaton; returns the automata list.
pub(crate) fn run(
    units: &mut [UnitInfo],
    declared: &IndexMap<String, AutomatonId>,
    split: u32,
    diags: &mut Diagnostics,
) -> Vec<AutomatonInfo> {
    if !declared.is_empty() {
        if split > 0 {
            diags.warning(
                "option `split` is ignored because automata are declared",
                "split",
            );
        }
        return assign_declared(units, declared);
    }

    let target = (split as usize).clamp(1, units.len().max(1));
    if target <= 1 {
        for unit in units.iter_mut() {
            unit.automaton = AutomatonId(0);
        }
        return vec![AutomatonInfo { name: None }];
    }

    heuristic_distribution(units, target)
}

fn assign_declared(
    units: &mut [UnitInfo],
    declared: &IndexMap<String, AutomatonId>,
) -> Vec<AutomatonInfo> {
    for unit in units.iter_mut() {
        unit.automaton = unit
            .automaton_name
            .as_ref()
            .and_then(|name| declared.get(name).copied())
            // Unresolved automaton names were already reported; fall back to
            // the first automaton so construction state stays well-formed.
            .unwrap_or(AutomatonId(0));
    }
    declared
        .keys()
        .map(|name| AutomatonInfo {
            name: Some(name.clone()),
        })
        .collect()
}

/// Sort units by decreasing max occurrence cycle and fill automata greedily,
/// keeping each partition's estimated size near the nth root of the global
/// estimate.
fn heuristic_distribution(units: &mut [UnitInfo], target: usize) -> Vec<AutomatonInfo> {
    let rate = |unit: &UnitInfo| (unit.max_occ_cycle.map_or(0, |c| c) + 1) as f64;

    let mut order: Vec<usize> = (0..units.len()).collect();
    order.sort_by(|&a, &b| {
        units[b]
            .max_occ_cycle
            .cmp(&units[a].max_occ_cycle)
            .then(a.cmp(&b))
    });

    let mut global = 1.0f64;
    for unit in units.iter() {
        global = (global * rate(unit)).min(MAX_ESTIMATION);
    }
    let bound = global.powf(1.0 / target as f64);

    let mut current = 0usize;
    let mut current_rate = 1.0f64;
    let mut empty = true;
    for &i in &order {
        let r = rate(&units[i]);
        if !empty && current + 1 < target && current_rate * r > bound {
            current += 1;
            current_rate = 1.0;
            empty = true;
        }
        units[i].automaton = AutomatonId::from_index(current);
        current_rate = (current_rate * r).min(MAX_ESTIMATION);
        empty = false;
    }

    (0..=current)
        .map(|_| AutomatonInfo { name: None })
        .collect()
}

/// Validate the distribution against every instruction's canonical regexp:
/// when units are split over several automata, each automaton reserved on a
/// cycle of one alternative must be reserved on the same cycle of every
/// other alternative, otherwise that automaton would accept issue sequences
/// the full reservation forbids.
pub(crate) fn validate(
    insns: &[InsnInfo],
    units: &[UnitInfo],
    automata: &[AutomatonInfo],
    diags: &mut Diagnostics,
) {
    if automata.len() <= 1 {
        return;
    }

    for insn in insns {
        let Some(canonical) = &insn.canonical else {
            continue;
        };
        let alts = canonical_alternatives(canonical);
        if alts.len() < 2 {
            continue;
        }

        // (cycle, automaton) -> (alternatives using it, witness unit)
        let mut usages: IndexMap<(usize, AutomatonId), (Vec<bool>, usize)> = IndexMap::new();
        for (alt_idx, alt) in alts.iter().enumerate() {
            for (cycle, cycle_units) in alt.iter().enumerate() {
                for unit in cycle_units {
                    let am = units[unit.index()].automaton;
                    let entry = usages
                        .entry((cycle, am))
                        .or_insert_with(|| (vec![false; alts.len()], unit.index()));
                    entry.0[alt_idx] = true;
                }
            }
        }

        for ((cycle, am), (seen, witness)) in &usages {
            if seen.iter().all(|&s| s) {
                continue;
            }
            diags.error(
                format!(
                    "unit `{}` of automaton `{}` is reserved on cycle {} in some but not \
                     all alternatives of `{}`",
                    units[*witness].name,
                    automata[am.index()].display_name(am.index()),
                    cycle,
                    insn.name
                ),
                &insn.name,
            );
        }
    }
}
