//! The per-automaton construction pipeline: alt-states, NFA, subset
//! construction, minimization, instruction classification.

use std::time::{Duration, Instant};

use hazegen_core::check::CheckedDescription;
use hazegen_core::{AutomatonId, Error, ResvSet, Result};

use crate::altstate::{self, AltStates};
use crate::graph::StateGraph;
use crate::{determinize, equiv, minimize, nfa};

/// State and arc counts per construction phase of one automaton.
#[derive(Debug, Clone, Copy, Default)]
pub struct Counts {
    pub nfa_states: usize,
    pub nfa_arcs: usize,
    pub dfa_states: usize,
    pub dfa_arcs: usize,
    pub min_states: usize,
    pub min_arcs: usize,
    pub equiv_classes: u32,
}

/// Wall-clock time spent per phase, summed over automata.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseTimings {
    pub check: Duration,
    pub nfa: Duration,
    pub determinize: Duration,
    pub minimize: Duration,
    pub equiv: Duration,
    pub tables: Duration,
}

/// One constructed automaton.
#[derive(Debug, Clone)]
pub struct AutomatonGraph {
    pub automaton: AutomatonId,
    pub graph: StateGraph,
    pub alt_states: AltStates,
    pub matters: ResvSet,
    /// Per-instruction equivalence class, the transition-table column.
    pub insn_classes: Vec<u32>,
    pub class_count: u32,
    pub counts: Counts,
}

/// All automata of a description, constructed and minimized.
#[derive(Debug, Clone)]
pub struct Automata {
    pub desc: CheckedDescription,
    pub automata: Vec<AutomatonGraph>,
    pub timings: PhaseTimings,
}

/// Construct every automaton of a checked description.
///
/// Fails with [`Error::CheckFailed`] when the checker accumulated errors;
/// construction over a broken description would dereference unresolved
/// names.
pub fn build(desc: CheckedDescription) -> Result<Automata> {
    if !desc.is_valid() {
        return Err(Error::CheckFailed(desc.diagnostics.clone()));
    }

    let mut timings = PhaseTimings::default();
    let mut automata = Vec::with_capacity(desc.automata.len());

    for index in 0..desc.automata.len() {
        let automaton = AutomatonId::from_index(index);
        let mut counts = Counts::default();

        let mut graph = StateGraph::new(&desc.geometry);
        let alt_states = altstate::build(&desc, automaton, &mut graph);
        let matters = nfa::matters_set(&desc, automaton);

        let started = Instant::now();
        nfa::build(&desc, &mut graph, &alt_states, &matters);
        timings.nfa += started.elapsed();
        (counts.nfa_states, counts.nfa_arcs) = graph.count_states_and_arcs();

        let started = Instant::now();
        determinize::run(&mut graph, &desc.geometry);
        timings.determinize += started.elapsed();
        (counts.dfa_states, counts.dfa_arcs) = graph.count_states_and_arcs();

        let started = Instant::now();
        if !desc.options.no_minimization {
            minimize::run(&mut graph, &desc, automaton);
        }
        minimize::tag_new_cycle(&mut graph, &desc);
        timings.minimize += started.elapsed();
        (counts.min_states, counts.min_arcs) = graph.count_states_and_arcs();

        let started = Instant::now();
        let (insn_classes, class_count) = equiv::classify(&graph, &alt_states, desc.insns.len());
        timings.equiv += started.elapsed();
        counts.equiv_classes = class_count;

        automata.push(AutomatonGraph {
            automaton,
            graph,
            alt_states,
            matters,
            insn_classes,
            class_count,
            counts,
        });
    }

    Ok(Automata {
        desc,
        automata,
        timings,
    })
}

impl Automata {
    /// Per-automaton phase counts, for stats output.
    pub fn counts(&self) -> Vec<Counts> {
        self.automata.iter().map(|a| a.counts).collect()
    }
}
