//! Alternative reservation states.
//!
//! Every instruction's canonical regexp is a list of alternatives; each
//! alternative, restricted to one automaton's units, yields a deterministic
//! state interned in that automaton's graph. The sorted-unique alt-state
//! list is the instruction's behavioral identity: instructions sharing it
//! are chained together and only the chain head drives construction.

use indexmap::IndexMap;

use hazegen_core::check::CheckedDescription;
use hazegen_core::regexp::canonical_alternatives;
use hazegen_core::{AutomatonId, InsnId, ResvSet};

use crate::graph::{StateGraph, StateId};

/// Per-instruction alternative states for one automaton.
#[derive(Debug, Clone)]
pub struct AltStates {
    /// Alternatives in canonical-regexp order. Empty for the advance-cycle
    /// instruction.
    pub alts: Vec<Vec<StateId>>,
    /// Sorted, deduplicated copy: the identity key.
    pub sorted: Vec<Vec<StateId>>,
    /// Head of each instruction's same-reservation chain.
    pub chain_head: Vec<InsnId>,
    /// Chain heads in instruction order, excluding advance-cycle.
    pub heads: Vec<InsnId>,
    /// Whether the instruction reserves any unit of this automaton; only
    /// then can issuing it change the automaton's state.
    pub important: Vec<bool>,
}

/// Build alternative states for every instruction, interning them in the
/// automaton's graph.
pub fn build(
    desc: &CheckedDescription,
    automaton: AutomatonId,
    graph: &mut StateGraph,
) -> AltStates {
    let geom = &desc.geometry;
    let insn_count = desc.insns.len();

    let mut alts: Vec<Vec<StateId>> = Vec::with_capacity(insn_count);
    let mut sorted: Vec<Vec<StateId>> = Vec::with_capacity(insn_count);
    let mut important = vec![false; insn_count];

    for (i, insn) in desc.insns.iter().enumerate() {
        let Some(canonical) = &insn.canonical else {
            alts.push(Vec::new());
            sorted.push(Vec::new());
            continue;
        };

        let mut insn_alts = Vec::new();
        for alternative in canonical_alternatives(canonical) {
            let mut resv = ResvSet::empty(geom);
            for (cycle, units) in alternative.iter().enumerate() {
                for unit in units {
                    if desc.units[unit.index()].automaton == automaton {
                        resv.set(geom, cycle, unit.index());
                        important[i] = true;
                    }
                }
            }
            let (state, _) = graph.intern_atomic(resv);
            insn_alts.push(state);
        }

        let mut unique = insn_alts.clone();
        unique.sort();
        unique.dedup();
        alts.push(insn_alts);
        sorted.push(unique);
    }

    // Chain instructions by identical sorted alt-state lists; list equality
    // is id-sequence equality because states are interned.
    let mut by_key: IndexMap<&[StateId], InsnId> = IndexMap::new();
    let mut chain_head = Vec::with_capacity(insn_count);
    let mut heads = Vec::new();
    for (i, insn) in desc.insns.iter().enumerate() {
        let id = InsnId::from_index(i);
        if insn.is_advance_cycle() || insn.canonical.is_none() {
            chain_head.push(id);
            continue;
        }
        let head = *by_key.entry(sorted[i].as_slice()).or_insert(id);
        chain_head.push(head);
        if head == id {
            heads.push(id);
        }
    }

    AltStates {
        alts,
        sorted,
        chain_head,
        heads,
        important,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hazegen_core::check::check;
    use hazegen_core::decl::{Decl, InsnReservDecl, UnitDecl};

    fn decls(insns: &[(&str, &str)]) -> Vec<Decl> {
        let mut d = vec![
            Decl::Unit(UnitDecl::new("u1")),
            Decl::Unit(UnitDecl::new("u2")),
        ];
        for (name, regexp) in insns {
            d.push(Decl::InsnReservation(InsnReservDecl::new(*name, *regexp)));
        }
        d
    }

    #[test]
    fn alternatives_intern_one_state_each() {
        let desc = check(decls(&[("a", "u1 | u2")]));
        assert!(desc.is_valid());
        let mut graph = StateGraph::new(&desc.geometry);
        let alt_states = build(&desc, AutomatonId(0), &mut graph);

        assert_eq!(alt_states.alts[0].len(), 2);
        assert_ne!(alt_states.alts[0][0], alt_states.alts[0][1]);
        assert!(alt_states.important[0]);
    }

    #[test]
    fn identical_reservations_share_a_chain() {
        let desc = check(decls(&[("a", "u1, u2"), ("b", "u1, u2"), ("c", "u2")]));
        assert!(desc.is_valid());
        let mut graph = StateGraph::new(&desc.geometry);
        let alt_states = build(&desc, AutomatonId(0), &mut graph);

        assert_eq!(alt_states.chain_head[0], InsnId(0));
        assert_eq!(alt_states.chain_head[1], InsnId(0), "b chains behind a");
        assert_eq!(alt_states.chain_head[2], InsnId(2));
        assert_eq!(alt_states.heads, vec![InsnId(0), InsnId(2)]);
    }

    #[test]
    fn advance_cycle_has_no_alternatives() {
        let desc = check(decls(&[("a", "u1")]));
        let mut graph = StateGraph::new(&desc.geometry);
        let alt_states = build(&desc, AutomatonId(0), &mut graph);

        let adv = desc.advance_insn();
        assert!(alt_states.alts[adv.index()].is_empty());
        assert!(!alt_states.important[adv.index()]);
        assert!(!alt_states.heads.contains(&adv));
    }

    #[test]
    fn duplicate_alternatives_dedup_in_sorted_list() {
        // Both alternatives reserve u1 only; the sorted list has one entry,
        // the raw list keeps both for state_alts counting.
        let desc = check(decls(&[("a", "u1 | u1"), ("b", "u1")]));
        let mut graph = StateGraph::new(&desc.geometry);
        let alt_states = build(&desc, AutomatonId(0), &mut graph);

        assert_eq!(alt_states.alts[0].len(), 2);
        assert_eq!(alt_states.sorted[0].len(), 1);
        assert_eq!(
            alt_states.chain_head[1],
            InsnId(0),
            "b's single alternative matches a's deduplicated identity"
        );
    }
}
