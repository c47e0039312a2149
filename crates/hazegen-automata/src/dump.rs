//! Human-readable automaton description, the artifact behind the `v`
//! option. Line-oriented and stable, so tests can assert on it.

use std::fmt::Write;

use rustc_hash::FxHashMap;

use crate::build::{Automata, AutomatonGraph};
use crate::graph::StateId;

impl Automata {
    /// Render every automaton: per-phase counts, then each reachable state
    /// with its reservation and out-arcs. States are numbered in
    /// depth-first order from the start state.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        for (i, automaton) in self.automata.iter().enumerate() {
            if i > 0 {
                w.write_str("\n")?;
            }
            self.format_automaton(w, i, automaton)?;
        }
        Ok(())
    }

    fn format_automaton(
        &self,
        w: &mut impl Write,
        index: usize,
        automaton: &AutomatonGraph,
    ) -> std::fmt::Result {
        let desc = &self.desc;
        let counts = automaton.counts;

        writeln!(w, "automaton {}", desc.automata[index].display_name(index))?;
        writeln!(
            w,
            "  {} NFA states, {} NFA arcs",
            counts.nfa_states, counts.nfa_arcs
        )?;
        writeln!(
            w,
            "  {} DFA states, {} DFA arcs",
            counts.dfa_states, counts.dfa_arcs
        )?;
        writeln!(
            w,
            "  {} minimal DFA states, {} minimal DFA arcs",
            counts.min_states, counts.min_arcs
        )?;
        writeln!(
            w,
            "  {} instruction equivalence classes",
            counts.equiv_classes
        )?;

        let unit_names = desc.unit_names();
        let graph = &automaton.graph;
        let order = graph.reachable();
        let number: FxHashMap<StateId, usize> =
            order.iter().enumerate().map(|(n, &s)| (s, n)).collect();

        for &state_id in &order {
            let state = graph.state(state_id);

            write!(w, "  state {}", number[&state_id])?;
            if state.is_compound() {
                let components: Vec<String> = state
                    .components
                    .iter()
                    .map(|c| match number.get(c) {
                        Some(n) => n.to_string(),
                        None => format!("({})", c),
                    })
                    .collect();
                write!(w, " components {}", components.join(" "))?;
            } else {
                write!(w, " {}", state.resv.display(&desc.geometry, &unit_names))?;
            }
            if state.new_cycle {
                w.write_str(" (new cycle)")?;
            }
            w.write_str("\n")?;

            for arc in &state.arcs {
                writeln!(
                    w,
                    "    {} -> {} [{}]",
                    desc.insns[arc.insn.index()].name,
                    number[&arc.to],
                    arc.state_alts
                )?;
            }
        }
        Ok(())
    }
}
