//! Instruction equivalence classification.
//!
//! Two instructions are equivalent in an automaton iff issuing either from
//! any reachable state lands in the same destination. Since the automaton
//! is deterministic by now, the destination vector over all reachable
//! states is a complete discriminator: instructions grouping to the same
//! vector share a class. Class numbers become the column index of the
//! compressed transition tables.
//!
//! Only chain heads (and advance-cycle) own arcs; chain members inherit
//! their head's class.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use hazegen_core::InsnId;

use crate::altstate::AltStates;
use crate::graph::{StateGraph, StateId};

/// Classify instructions; returns the per-instruction class numbers and the
/// class count.
pub fn classify(graph: &StateGraph, alt_states: &AltStates, insn_count: usize) -> (Vec<u32>, u32) {
    let reachable = graph.reachable();

    // Destination of each (state, insn) pair, for arc-owning instructions.
    let mut dest: FxHashMap<(StateId, InsnId), StateId> = FxHashMap::default();
    for &state in &reachable {
        for arc in &graph.state(state).arcs {
            dest.insert((state, arc.insn), arc.to);
        }
    }

    let mut keys: IndexMap<Vec<Option<StateId>>, u32> = IndexMap::new();
    let mut classes = vec![0u32; insn_count];

    for i in 0..insn_count {
        let insn = InsnId::from_index(i);
        let head = alt_states.chain_head[i];
        if head != insn {
            // Chain members classify with their head, assigned below.
            continue;
        }
        let signature: Vec<Option<StateId>> = reachable
            .iter()
            .map(|&state| dest.get(&(state, insn)).copied())
            .collect();
        let next = keys.len() as u32;
        classes[i] = *keys.entry(signature).or_insert(next);
    }

    for i in 0..insn_count {
        let head = alt_states.chain_head[i];
        if head.index() != i {
            classes[i] = classes[head.index()];
        }
    }

    (classes, keys.len() as u32)
}
