//! Per-automaton table bundle.
//!
//! States are enumerated in depth-first order from the start state, which
//! therefore gets number 0; zeroing a scheduler state resets every
//! automaton. Transition and state-alts tables are `state × class` and
//! compressed per the comb-vector selection rule; the min-issue-delay table
//! packs sub-byte entries; dead-lock and reserved-units are per-state
//! vectors.

use rustc_hash::FxHashMap;

use hazegen_automata::{AutomatonGraph, StateId};
use hazegen_core::check::CheckedDescription;
use hazegen_core::{AutomatonId, UnitId};

use crate::comb::Table;
use crate::delay::{self, MinDelayTable};

/// The compressed tables of one automaton.
#[derive(Debug, Clone)]
pub struct AutomatonTables {
    pub state_count: usize,
    pub class_count: usize,
    /// Instruction number to equivalence class (transition-table column).
    pub translate: Vec<u32>,
    pub advance_class: u32,
    /// `(state, class)` to destination state number.
    pub transitions: Table,
    /// `(state, class)` to the number of alternative reservations.
    pub state_alts: Table,
    pub min_delay: MinDelayTable,
    /// States whose only way forward is an advance-cycle.
    pub dead_lock: Vec<bool>,
    /// Cycle-0 reservation bitmap of this automaton's queryable units,
    /// `query_bytes` bytes per state.
    pub reserved_units: Vec<u8>,
    pub query_bytes: usize,
    /// This automaton's queryable units, positioned by bit index.
    pub query_units: Vec<UnitId>,
}

/// Build the table bundle for one constructed automaton.
pub fn tabulate(desc: &CheckedDescription, automaton: &AutomatonGraph) -> AutomatonTables {
    let graph = &automaton.graph;
    let order = graph.reachable();
    let number: FxHashMap<StateId, usize> =
        order.iter().enumerate().map(|(n, &s)| (s, n)).collect();

    let state_count = order.len();
    let class_count = automaton.class_count as usize;
    let advance = desc.advance_insn();
    let advance_class = automaton.insn_classes[advance.index()];

    // Dense transition/alts matrices, then compression.
    let mut transitions = vec![None; state_count * class_count];
    let mut alts = vec![None; state_count * class_count];
    for (i, &state) in order.iter().enumerate() {
        for arc in &graph.state(state).arcs {
            let class = automaton.insn_classes[arc.insn.index()] as usize;
            let slot = i * class_count + class;
            debug_assert!(
                transitions[slot].is_none_or(|t| t == number[&arc.to] as u32),
                "conflicting transitions within one equivalence class"
            );
            transitions[slot] = Some(number[&arc.to] as u32);
            alts[slot] = Some(arc.state_alts);
        }
    }

    let transitions = Table::build(state_count, class_count, |row, col| {
        transitions[row * class_count + col]
    });
    let state_alts = Table::build(state_count, class_count, |row, col| {
        alts[row * class_count + col]
    });

    let matrix = delay::min_issue_delays(automaton, &order, &number, advance);
    let min_delay = MinDelayTable::pack(&matrix, class_count);

    let dead_lock: Vec<bool> = order
        .iter()
        .map(|&state| {
            let arcs = &graph.state(state).arcs;
            arcs.len() == 1 && arcs[0].insn == advance
        })
        .collect();

    // Queryable units of this automaton, in global sorted-name order.
    let query_units: Vec<UnitId> = desc
        .queryable_units_sorted()
        .into_iter()
        .filter(|u| desc.units[u.index()].automaton == automaton.automaton)
        .collect();
    let query_bytes = query_units.len().div_ceil(8);
    let mut reserved_units = vec![0u8; state_count * query_bytes];
    for (i, &state) in order.iter().enumerate() {
        let resv = graph.observation_resv(state);
        for (bit, unit) in query_units.iter().enumerate() {
            if resv.test(&desc.geometry, 0, unit.index()) {
                reserved_units[i * query_bytes + bit / 8] |= 1 << (bit % 8);
            }
        }
    }

    AutomatonTables {
        state_count,
        class_count,
        translate: automaton.insn_classes.clone(),
        advance_class,
        transitions,
        state_alts,
        min_delay,
        dead_lock,
        reserved_units,
        query_bytes,
        query_units,
    }
}

impl AutomatonTables {
    /// Destination state for issuing an instruction of `class` from `state`.
    #[inline]
    pub fn transition(&self, state: u32, class: u32) -> Option<u32> {
        self.transitions.get(state as usize, class as usize)
    }

    #[inline]
    pub fn alternatives(&self, state: u32, class: u32) -> u32 {
        self.state_alts
            .get(state as usize, class as usize)
            .unwrap_or(0)
    }

    #[inline]
    pub fn min_issue_delay(&self, state: u32, class: u32) -> u32 {
        self.min_delay.get(state as usize, class as usize)
    }

    #[inline]
    pub fn dead_lock(&self, state: u32) -> bool {
        self.dead_lock[state as usize]
    }

    /// Cycle-0 reservation of the local queryable unit at `bit`.
    #[inline]
    pub fn unit_reserved(&self, state: u32, bit: usize) -> bool {
        let byte = self.reserved_units[state as usize * self.query_bytes + bit / 8];
        byte >> (bit % 8) & 1 != 0
    }
}

/// Tables for every automaton plus the instruction metadata the runtime
/// needs; built by [`crate::stages::Automata::tabulate`].
#[derive(Debug, Clone)]
pub struct DfaTables {
    pub automata: Vec<AutomatonTables>,
    /// Automata whose state can change when the instruction issues.
    pub important: Vec<Vec<AutomatonId>>,
}

pub fn tabulate_all(desc: &CheckedDescription, automata: &[AutomatonGraph]) -> DfaTables {
    let tables: Vec<AutomatonTables> = automata.iter().map(|a| tabulate(desc, a)).collect();

    let insn_count = desc.insns.len();
    let mut important = vec![Vec::new(); insn_count];
    for automaton in automata {
        for (i, is_important) in automaton.alt_states.important.iter().enumerate() {
            if *is_important {
                important[i].push(automaton.automaton);
            }
        }
    }

    DfaTables {
        automata: tables,
        important,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hazegen_automata::build;
    use hazegen_core::check::check;
    use hazegen_core::decl::{Decl, InsnReservDecl, UnitDecl};

    fn tables(decls: Vec<Decl>) -> (CheckedDescription, DfaTables) {
        let desc = check(decls);
        assert!(desc.is_valid(), "{:?}", desc.diagnostics);
        let automata = build(desc).unwrap();
        let tables = tabulate_all(&automata.desc, &automata.automata);
        (automata.desc, tables)
    }

    #[test]
    fn start_state_is_number_zero() {
        let (desc, tables) = tables(vec![
            Decl::Unit(UnitDecl::new("u")),
            Decl::InsnReservation(InsnReservDecl::new("a", "u")),
        ]);
        let t = &tables.automata[0];

        // Advancing from start stays at start.
        let advance = t.translate[desc.advance_insn().index()];
        assert_eq!(t.transition(0, advance), Some(0));

        // Issuing moves to state 1; the delay table says issue is immediate.
        let a_class = t.translate[0];
        assert_eq!(t.transition(0, a_class), Some(1));
        assert_eq!(t.min_issue_delay(0, a_class), 0);

        // From state 1 the instruction needs one advance.
        assert_eq!(t.transition(1, a_class), None);
        assert_eq!(t.min_issue_delay(1, a_class), 1);
        assert_eq!(t.transition(1, advance), Some(0));
    }

    #[test]
    fn dead_lock_vector_flags_advance_only_states() {
        let (_, tables) = tables(vec![
            Decl::Unit(UnitDecl::new("u")),
            Decl::InsnReservation(InsnReservDecl::new("a", "u, u")),
        ]);
        let t = &tables.automata[0];
        assert!(!t.dead_lock(0), "start can issue");
        assert!(t.dead_lock(1), "fresh two-cycle reservation blocks issue");
        assert!(t.dead_lock(2), "one residual cycle still blocks issue");
    }

    #[test]
    fn reserved_units_bitmap_tracks_cycle_zero() {
        let (_, tables) = tables(vec![
            Decl::Unit(UnitDecl::new("u").queryable()),
            Decl::InsnReservation(InsnReservDecl::new("a", "u")),
        ]);
        let t = &tables.automata[0];
        assert_eq!(t.query_bytes, 1);
        assert!(!t.unit_reserved(0, 0));
        assert!(t.unit_reserved(1, 0));
    }

    #[test]
    fn important_automata_cover_reserving_insns_only() {
        let (desc, tables) = tables(vec![
            Decl::Automaton(hazegen_core::decl::AutomatonDecl { name: "p0".into() }),
            Decl::Automaton(hazegen_core::decl::AutomatonDecl { name: "p1".into() }),
            Decl::Unit(UnitDecl::new("u1").automaton("p0")),
            Decl::Unit(UnitDecl::new("u2").automaton("p1")),
            Decl::InsnReservation(InsnReservDecl::new("a", "u1")),
            Decl::InsnReservation(InsnReservDecl::new("b", "u2")),
        ]);
        assert_eq!(tables.important[0], vec![AutomatonId(0)]);
        assert_eq!(tables.important[1], vec![AutomatonId(1)]);
        assert!(tables.important[desc.advance_insn().index()].is_empty());
    }
}
