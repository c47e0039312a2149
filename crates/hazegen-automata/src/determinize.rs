//! Subset construction.
//!
//! Walks the reachable graph; for every state, out-arcs sharing an
//! instruction label merge into a single arc. A multi-arc group targets a
//! compound state whose components are the sorted-unique union of the
//! atomic destinations (nested compounds flatten); the group's arc records
//! how many arcs merged. Compound states inherit the union of their
//! components' arcs and join the worklist.
//!
//! With the `ndfa` option off, every group has one arc by construction and
//! the pass degenerates to a walk.

use indexmap::IndexMap;

use hazegen_core::{Geometry, InsnId};

use crate::graph::{ArcOut, StateGraph, StateId};

pub fn run(graph: &mut StateGraph, geom: &Geometry) {
    let mut placed = vec![false; graph.len()];
    let mut stack = vec![graph.start()];
    placed[graph.start().index()] = true;

    while let Some(state) = stack.pop() {
        // A freshly created compound state materializes its arcs as the
        // union of its components' arcs.
        if graph.state(state).is_compound() && graph.state(state).arcs.is_empty() {
            let components = graph.state(state).components.clone();
            for component in components {
                for arc in graph.state(component).arcs.clone() {
                    graph.add_arc(state, arc.to, arc.insn, arc.state_alts);
                }
            }
        }

        let mut groups: IndexMap<InsnId, Vec<ArcOut>> = IndexMap::new();
        for arc in &graph.state(state).arcs {
            groups.entry(arc.insn).or_default().push(*arc);
        }

        let mut new_arcs = Vec::with_capacity(groups.len());
        for (insn, arcs) in groups {
            let arc = if arcs.len() == 1 && !graph.state(arcs[0].to).is_compound() {
                arcs[0]
            } else {
                let mut components = Vec::new();
                for arc in &arcs {
                    let dest = graph.state(arc.to);
                    if dest.is_compound() {
                        components.extend_from_slice(&dest.components);
                    } else {
                        components.push(arc.to);
                    }
                }
                components.sort();
                components.dedup();

                let to = if components.len() == 1 {
                    components[0]
                } else {
                    graph.intern_compound(components, geom).0
                };
                ArcOut {
                    insn,
                    to,
                    state_alts: arcs.len() as u32,
                }
            };

            if arc.to.index() >= placed.len() {
                placed.resize(arc.to.index() + 1, false);
            }
            if !placed[arc.to.index()] {
                placed[arc.to.index()] = true;
                stack.push(arc.to);
            }
            new_arcs.push(arc);
        }

        graph.state_mut(state).arcs = new_arcs;
    }
}
