//! DFA minimization by partition refinement.
//!
//! The initial partition distinguishes states by out-arc count and by the
//! cycle-0 observation of every queryable unit. Each refinement round keys
//! a state by its sorted `(destination class, instruction, state alts)`
//! triples and splits classes until stable. States of one final class merge
//! into the class's lowest-numbered representative, which records the other
//! members as components so observation queries stay answerable.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use hazegen_core::check::CheckedDescription;
use hazegen_core::{AutomatonId, UnitId};

use crate::graph::{StateGraph, StateId};

pub fn run(graph: &mut StateGraph, desc: &CheckedDescription, automaton: AutomatonId) {
    let queryable: Vec<UnitId> = desc
        .queryable_units_sorted()
        .into_iter()
        .filter(|u| desc.units[u.index()].automaton == automaton)
        .collect();

    let reachable = graph.reachable();
    let mut class: FxHashMap<StateId, u32> = FxHashMap::default();

    // Initial partition: out-arc count plus queryable-unit observations.
    {
        let mut keys: IndexMap<(usize, Vec<bool>), u32> = IndexMap::new();
        for &state in &reachable {
            let observations: Vec<bool> = queryable
                .iter()
                .map(|u| {
                    graph
                        .observation_resv(state)
                        .test(&desc.geometry, 0, u.index())
                })
                .collect();
            let key = (graph.state(state).arcs.len(), observations);
            let next = keys.len() as u32;
            let c = *keys.entry(key).or_insert(next);
            class.insert(state, c);
        }
    }

    // Refinement rounds.
    loop {
        let mut keys: IndexMap<(u32, Vec<(u32, u32, u32)>), u32> = IndexMap::new();
        let mut next_class: FxHashMap<StateId, u32> = FxHashMap::default();
        for &state in &reachable {
            let mut triples: Vec<(u32, u32, u32)> = graph
                .state(state)
                .arcs
                .iter()
                .map(|arc| (class[&arc.to], arc.insn.0, arc.state_alts))
                .collect();
            triples.sort();
            let key = (class[&state], triples);
            let next = keys.len() as u32;
            let c = *keys.entry(key).or_insert(next);
            next_class.insert(state, c);
        }
        let stable = keys.len()
            == class
                .values()
                .collect::<std::collections::HashSet<_>>()
                .len();
        class = next_class;
        if stable {
            break;
        }
    }

    merge(graph, &reachable, &class);
}

/// Merge every class into its lowest-numbered state and redirect arcs.
fn merge(graph: &mut StateGraph, reachable: &[StateId], class: &FxHashMap<StateId, u32>) {
    let mut members: IndexMap<u32, Vec<StateId>> = IndexMap::new();
    for &state in reachable {
        members.entry(class[&state]).or_default().push(state);
    }

    let mut rep_of: FxHashMap<StateId, StateId> = FxHashMap::default();
    for group in members.values() {
        let rep = *group.iter().min().expect("class is never empty");
        for &m in group {
            rep_of.insert(m, rep);
        }
    }

    for group in members.values() {
        let rep = rep_of[&group[0]];

        // Representatives absorb the other members as components, flattening
        // compound members, so "first component" queries survive merging.
        if group.len() > 1 {
            let mut components = Vec::new();
            for &m in group {
                if m == rep {
                    continue;
                }
                let m_state = graph.state(m);
                if m_state.is_compound() {
                    components.extend_from_slice(&m_state.components);
                } else {
                    components.push(m);
                }
            }
            components.sort();
            components.dedup();
            let rep_state = graph.state_mut(rep);
            let mut merged = std::mem::take(&mut rep_state.components);
            merged.extend(components);
            merged.sort();
            merged.dedup();
            merged.retain(|&c| c != rep);
            graph.state_mut(rep).components = merged;
        }

        // All members have equivalent arcs; the representative's own arcs,
        // redirected to representatives, are the merged state's arcs.
        let redirected: Vec<_> = graph
            .state(rep)
            .arcs
            .iter()
            .map(|arc| (rep_of.get(&arc.to).copied().unwrap_or(arc.to), arc.insn, arc.state_alts))
            .collect();
        graph.state_mut(rep).arcs.clear();
        for (to, insn, state_alts) in redirected {
            graph.add_arc(rep, to, insn, state_alts);
        }
    }
}

/// Tag states reachable only through advance-cycle arcs. Runs on the final
/// graph whether or not minimization did.
pub fn tag_new_cycle(graph: &mut StateGraph, desc: &CheckedDescription) {
    let advance = desc.advance_insn();
    let reachable = graph.reachable();

    let mut any_incoming: FxHashMap<StateId, bool> = FxHashMap::default();
    let mut all_advance: FxHashMap<StateId, bool> = FxHashMap::default();
    for &state in &reachable {
        for arc in &graph.state(state).arcs {
            any_incoming.insert(arc.to, true);
            let entry = all_advance.entry(arc.to).or_insert(true);
            *entry &= arc.insn == advance;
        }
    }

    for &state in &reachable {
        let tagged = any_incoming.get(&state).copied().unwrap_or(false)
            && all_advance.get(&state).copied().unwrap_or(false);
        graph.state_mut(state).new_cycle = tagged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{altstate, determinize, nfa};
    use hazegen_core::check::check;
    use hazegen_core::decl::{Decl, InsnReservDecl, UnitDecl};

    fn built(decls: Vec<Decl>) -> (CheckedDescription, StateGraph) {
        let desc = check(decls);
        assert!(desc.is_valid(), "{:?}", desc.diagnostics);
        let mut graph = StateGraph::new(&desc.geometry);
        let alt_states = altstate::build(&desc, AutomatonId(0), &mut graph);
        let matters = nfa::matters_set(&desc, AutomatonId(0));
        nfa::build(&desc, &mut graph, &alt_states, &matters);
        determinize::run(&mut graph, &desc.geometry);
        run(&mut graph, &desc, AutomatonId(0));
        tag_new_cycle(&mut graph, &desc);
        (desc, graph)
    }

    #[test]
    fn equivalent_tails_collapse() {
        // Both instructions leave a one-cycle residue on their own unit;
        // the residues block the same set of issues (none) and advance to
        // the same place, but they are distinguishable while `a` and `b`
        // compete for their own unit, so the state count stays put only
        // when behaviour genuinely differs.
        let (_, graph) = built(vec![
            Decl::Unit(UnitDecl::new("u")),
            Decl::InsnReservation(InsnReservDecl::new("a", "u")),
            Decl::InsnReservation(InsnReservDecl::new("b", "u")),
        ]);
        // a and b share the same alt states, so they chain and the graph is
        // exactly the single-instruction one.
        let (states, arcs) = graph.count_states_and_arcs();
        assert_eq!(states, 2);
        assert_eq!(arcs, 3);
    }

    #[test]
    fn queryable_units_block_merging() {
        // With u1 and u2 mutually exclusive, the post-issue states {u1@0}
        // and {u2@0} behave identically: each blocks both instructions and
        // advances back to start. They merge - unless a queryable unit makes
        // their cycle-0 observations distinguishable.
        let build_with = |queryable: bool| {
            let u1 = if queryable {
                UnitDecl::new("u1").queryable()
            } else {
                UnitDecl::new("u1")
            };
            built(vec![
                Decl::Unit(u1),
                Decl::Unit(UnitDecl::new("u2")),
                Decl::Exclusion(hazegen_core::decl::ExclusionDecl {
                    names_a: vec!["u1".into()],
                    names_b: vec!["u2".into()],
                }),
                Decl::InsnReservation(InsnReservDecl::new("a", "u1")),
                Decl::InsnReservation(InsnReservDecl::new("b", "u2")),
            ])
        };

        let (_, plain) = build_with(false);
        assert_eq!(plain.count_states_and_arcs().0, 2, "issue states merge");

        let (_, queryable) = build_with(true);
        assert_eq!(
            queryable.count_states_and_arcs().0,
            3,
            "observation of u1 on cycle 0 keeps the issue states apart"
        );
    }

    #[test]
    fn new_cycle_tagging() {
        let (desc, graph) = built(vec![
            Decl::Unit(UnitDecl::new("u")),
            Decl::InsnReservation(InsnReservDecl::new("a", "u, u")),
        ]);
        let geom = &desc.geometry;

        // The intermediate state {u@0} is reached only by advancing out of
        // {u@0,u@1}.
        let reachable = graph.reachable();
        let mid = reachable
            .iter()
            .copied()
            .find(|&s| {
                let r = &graph.state(s).resv;
                r.test(geom, 0, 0) && !r.test(geom, 1, 0)
            })
            .expect("intermediate state");
        assert!(graph.state(mid).new_cycle);

        // The issue state is entered by issuing `a`.
        let issue = graph.state(graph.start()).arcs[0].to;
        assert!(!graph.state(issue).new_cycle);
    }

    #[test]
    fn language_preserved_after_minimization() {
        // Compare issue decisions of the minimized automaton against a
        // freshly built unminimized one over every instruction string of
        // bounded length.
        let decls = || {
            vec![
                Decl::Unit(UnitDecl::new("u1")),
                Decl::Unit(UnitDecl::new("u2")),
                Decl::InsnReservation(InsnReservDecl::new("a", "u1, u2")),
                Decl::InsnReservation(InsnReservDecl::new("b", "u2")),
            ]
        };

        let (desc, minimized) = built(decls());

        let unmin_desc = check(decls());
        let mut unmin = StateGraph::new(&unmin_desc.geometry);
        let alt_states = altstate::build(&unmin_desc, AutomatonId(0), &mut unmin);
        let matters = nfa::matters_set(&unmin_desc, AutomatonId(0));
        nfa::build(&unmin_desc, &mut unmin, &alt_states, &matters);
        determinize::run(&mut unmin, &unmin_desc.geometry);

        // Walk both automata in lockstep over all strings up to length 4
        // over {a, b, advance}.
        let insns = [0u32, 1, desc.advance_insn().0];
        let mut frontier = vec![(minimized.start(), unmin.start())];
        for _ in 0..4 {
            let mut next = Vec::new();
            for (ms, us) in frontier {
                for insn in insns {
                    let m_arc = minimized
                        .state(ms)
                        .arcs
                        .iter()
                        .find(|a| a.insn.0 == insn)
                        .copied();
                    let u_arc = unmin
                        .state(us)
                        .arcs
                        .iter()
                        .find(|a| a.insn.0 == insn)
                        .copied();
                    assert_eq!(
                        m_arc.is_some(),
                        u_arc.is_some(),
                        "issue decision diverged for insn {}",
                        insn
                    );
                    if let (Some(m), Some(u)) = (m_arc, u_arc) {
                        next.push((m.to, u.to));
                    }
                }
            }
            frontier = next;
        }
    }
}
