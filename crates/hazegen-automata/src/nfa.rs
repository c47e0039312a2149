//! NFA construction.
//!
//! Worklist over reachable states, starting from the empty reservation. For
//! every chain-head instruction, each alternative compatible with the
//! current state yields a destination `union(state, alternative)` masked
//! through the matters-set; deterministic mode commits to the first
//! compatible alternative and records how many were compatible. Every state
//! also advances: `shift(state)` under the advance-cycle label.

use hazegen_core::check::CheckedDescription;
use hazegen_core::{AutomatonId, ResvSet};

use crate::altstate::AltStates;
use crate::graph::StateGraph;

/// The matters-set of one automaton: the reservation bits whose future value
/// can affect any transition. A bit `(cycle, unit)` matters iff the unit
/// belongs to this automaton and the cycle is at least the unit's minimum
/// occurrence cycle, or the unit is queryable, or the unit appears in a
/// constraint. Unions are masked through this set so states that cannot be
/// told apart by any future instruction collapse.
pub fn matters_set(desc: &CheckedDescription, automaton: AutomatonId) -> ResvSet {
    let geom = &desc.geometry;
    let mut matters = ResvSet::empty(geom);
    for (i, unit) in desc.units.iter().enumerate() {
        if unit.automaton != automaton {
            continue;
        }
        let always = unit.queryable || unit.in_constraint;
        for cycle in 0..geom.cycles {
            let min_occ_reached = unit.min_occ_cycle.is_some_and(|min| cycle >= min);
            if always || min_occ_reached {
                matters.set(geom, cycle, i);
            }
        }
    }
    matters
}

/// Build the automaton's NFA in place.
pub fn build(
    desc: &CheckedDescription,
    graph: &mut StateGraph,
    alt_states: &AltStates,
    matters: &ResvSet,
) {
    let geom = &desc.geometry;
    let constraints = &desc.constraints;
    let advance = desc.advance_insn();
    let ndfa = desc.options.ndfa;

    // Destinations may collide with pre-interned alt states, so newness at
    // interning does not mean "not yet processed"; track placement on the
    // work stack explicitly.
    let mut placed = vec![false; graph.len()];
    let mut stack = vec![graph.start()];
    placed[graph.start().index()] = true;

    while let Some(state) = stack.pop() {
        let state_resv = graph.state(state).resv.clone();

        for &head in &alt_states.heads {
            let alts = &alt_states.alts[head.index()];

            if ndfa {
                for &alt in alts {
                    let alt_resv = graph.state(alt).resv.clone();
                    if state_resv.in_conflict(&alt_resv, geom, constraints) {
                        continue;
                    }
                    let mut dest = state_resv.or(&alt_resv);
                    dest.and_assign(matters);
                    let (to, _) = graph.intern_atomic(dest);
                    graph.add_arc(state, to, head, 1);
                    place(to, &mut placed, &mut stack);
                }
            } else {
                let compatible: Vec<_> = alts
                    .iter()
                    .filter(|&&alt| {
                        !state_resv.in_conflict(&graph.state(alt).resv, geom, constraints)
                    })
                    .copied()
                    .collect();
                let Some(&first) = compatible.first() else {
                    continue;
                };
                let mut dest = state_resv.or(&graph.state(first).resv.clone());
                dest.and_assign(matters);
                let (to, _) = graph.intern_atomic(dest);
                graph.add_arc(state, to, head, compatible.len() as u32);
                place(to, &mut placed, &mut stack);
            }
        }

        let mut shifted = state_resv.shift(geom);
        shifted.and_assign(matters);
        let (to, _) = graph.intern_atomic(shifted);
        graph.add_arc(state, to, advance, 1);
        place(to, &mut placed, &mut stack);
    }
}

fn place(state: crate::graph::StateId, placed: &mut Vec<bool>, stack: &mut Vec<crate::graph::StateId>) {
    if state.index() >= placed.len() {
        placed.resize(state.index() + 1, false);
    }
    if !placed[state.index()] {
        placed[state.index()] = true;
        stack.push(state);
    }
}
