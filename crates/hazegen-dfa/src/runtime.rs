//! The scheduling query API over the compressed tables.
//!
//! A [`DfaState`] is one `u32` state number per automaton; the product of
//! the automata is the CPU state. Every query is a table lookup per
//! automaton, O(1) in the description size.

use indexmap::IndexMap;

use hazegen_automata::PhaseTimings;
use hazegen_core::check::{BypassLink, CheckedDescription};
use hazegen_core::{AutomatonId, InsnId, Options};

use crate::tables::DfaTables;

/// Issue succeeded and the state advanced.
pub const TRANSITION_OK: i32 = -1;

/// The opaque scheduler state: one state number per automaton. Zero in
/// every cell is the start state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfaState {
    cells: Box<[u32]>,
}

impl DfaState {
    pub fn as_cells(&self) -> &[u32] {
        &self.cells
    }
}

#[derive(Debug, Clone)]
struct InsnMeta {
    name: String,
    condition: String,
    default_latency: u32,
    bypasses: Vec<BypassLink>,
}

/// A queryable unit: global code order is sorted-name order.
#[derive(Debug, Clone)]
struct QueryUnit {
    name: String,
    automaton: AutomatonId,
    /// Bit position within the owning automaton's reserved-units bitmap.
    bit: usize,
}

/// The generated automaton: compressed tables plus the query entry points.
#[derive(Debug, Clone)]
pub struct Dfa {
    options: Options,
    insns: Vec<InsnMeta>,
    insn_codes: IndexMap<String, InsnId>,
    advance: InsnId,
    tables: DfaTables,
    query_units: Vec<QueryUnit>,
    timings: PhaseTimings,
}

impl Dfa {
    pub(crate) fn new(
        desc: &CheckedDescription,
        tables: DfaTables,
        timings: PhaseTimings,
    ) -> Dfa {
        let insns: Vec<InsnMeta> = desc
            .insns
            .iter()
            .map(|insn| InsnMeta {
                name: insn.name.clone(),
                condition: insn.condition.clone(),
                default_latency: insn.default_latency,
                bypasses: insn.bypasses.clone(),
            })
            .collect();
        let insn_codes = insns
            .iter()
            .enumerate()
            .map(|(i, insn)| (insn.name.clone(), InsnId::from_index(i)))
            .collect();

        let query_units = desc
            .queryable_units_sorted()
            .into_iter()
            .map(|unit| {
                let automaton = desc.units[unit.index()].automaton;
                let bit = tables.automata[automaton.index()]
                    .query_units
                    .iter()
                    .position(|&u| u == unit)
                    .expect("queryable unit present in its automaton's table");
                QueryUnit {
                    name: desc.units[unit.index()].name.clone(),
                    automaton,
                    bit,
                }
            })
            .collect();

        Dfa {
            options: desc.options,
            insns,
            insn_codes,
            advance: desc.advance_insn(),
            tables,
            query_units,
            timings,
        }
    }

    /// Byte size of the opaque state.
    pub fn state_size(&self) -> usize {
        self.tables.automata.len() * std::mem::size_of::<u32>()
    }

    /// A freshly reset state.
    pub fn new_state(&self) -> DfaState {
        DfaState {
            cells: vec![0u32; self.tables.automata.len()].into_boxed_slice(),
        }
    }

    /// Reset every automaton to its start state.
    pub fn state_reset(&self, state: &mut DfaState) {
        state.cells.fill(0);
    }

    /// Advance one cycle (`None`) or try to issue an instruction.
    ///
    /// Returns [`TRANSITION_OK`] on success with the state mutated;
    /// otherwise the minimum number of advance-cycles before the issue can
    /// succeed, with the state untouched.
    pub fn state_transition(&self, state: &mut DfaState, insn: Option<InsnId>) -> i32 {
        let insn = match insn {
            None => return self.advance_cycle(state),
            Some(insn) if insn == self.advance => return self.advance_cycle(state),
            Some(insn) => insn,
        };

        // Stage all lookups before committing any cell: a failed automaton
        // must leave the state unchanged.
        let important = &self.tables.important[insn.index()];
        let mut staged = Vec::with_capacity(important.len());
        for &am in important {
            let t = &self.tables.automata[am.index()];
            let class = t.translate[insn.index()];
            match t.transition(state.cells[am.index()], class) {
                Some(dest) => staged.push((am, dest)),
                None => return self.min_issue_delay(state, insn) as i32,
            }
        }
        for (am, dest) in staged {
            state.cells[am.index()] = dest;
        }
        TRANSITION_OK
    }

    fn advance_cycle(&self, state: &mut DfaState) -> i32 {
        for (cell, t) in state.cells.iter_mut().zip(&self.tables.automata) {
            *cell = t
                .transition(*cell, t.advance_class)
                .expect("advance-cycle transitions are total");
        }
        TRANSITION_OK
    }

    /// Minimum advance-cycles until the instruction can issue from this
    /// state: the worst automaton wins.
    pub fn min_issue_delay(&self, state: &DfaState, insn: InsnId) -> u32 {
        self.tables.important[insn.index()]
            .iter()
            .map(|am| {
                let t = &self.tables.automata[am.index()];
                t.min_issue_delay(state.cells[am.index()], t.translate[insn.index()])
            })
            .max()
            .unwrap_or(0)
    }

    /// Sum across automata of the alternative reservations available for
    /// the instruction in this state.
    pub fn state_alts(&self, state: &DfaState, insn: InsnId) -> u32 {
        self.tables.important[insn.index()]
            .iter()
            .map(|am| {
                let t = &self.tables.automata[am.index()];
                t.alternatives(state.cells[am.index()], t.translate[insn.index()])
            })
            .sum()
    }

    /// Whether nothing but an advance-cycle can happen here.
    pub fn state_dead_lock_p(&self, state: &DfaState) -> bool {
        state
            .cells
            .iter()
            .zip(&self.tables.automata)
            .any(|(&cell, t)| t.dead_lock(cell))
    }

    /// Delay needed between issuing `insn1` and `insn2` starting from a
    /// freshly reset state.
    pub fn min_insn_conflict_delay(&self, insn1: InsnId, insn2: InsnId) -> u32 {
        let mut state = self.new_state();
        let issued = self.state_transition(&mut state, Some(insn1));
        debug_assert_eq!(issued, TRANSITION_OK, "issue from the start state");
        self.min_issue_delay(&state, insn2)
    }

    /// Result latency from `insn1` to `insn2`: the bypass latency when one
    /// is declared, else `insn1`'s default latency.
    pub fn insn_latency(&self, insn1: InsnId, insn2: InsnId) -> i32 {
        self.insns[insn1.index()]
            .bypasses
            .iter()
            .find(|b| b.to == insn2)
            .map(|b| b.latency)
            .unwrap_or(self.insns[insn1.index()].default_latency as i32)
    }

    /// The opaque guard predicate attached to the bypass, if any.
    pub fn bypass_guard(&self, insn1: InsnId, insn2: InsnId) -> Option<&str> {
        self.insns[insn1.index()]
            .bypasses
            .iter()
            .find(|b| b.to == insn2)
            .and_then(|b| b.guard.as_deref())
    }

    /// Whether the queryable unit with this code is reserved on cycle 0.
    pub fn cpu_unit_reservation_p(&self, state: &DfaState, code: usize) -> bool {
        let unit = &self.query_units[code];
        let t = &self.tables.automata[unit.automaton.index()];
        t.unit_reserved(state.cells[unit.automaton.index()], unit.bit)
    }

    /// Binary search over the sorted queryable-unit names.
    pub fn get_cpu_unit_code(&self, name: &str) -> Option<usize> {
        self.query_units
            .binary_search_by(|unit| unit.name.as_str().cmp(name))
            .ok()
    }

    /// Internal instruction number by name.
    pub fn insn_code(&self, name: &str) -> Option<InsnId> {
        self.insn_codes.get(name).copied()
    }

    pub fn insn_name(&self, insn: InsnId) -> &str {
        &self.insns[insn.index()].name
    }

    /// The opaque condition predicate carried from the declaration.
    pub fn insn_condition(&self, insn: InsnId) -> &str {
        &self.insns[insn.index()].condition
    }

    pub fn insn_count(&self) -> usize {
        self.insns.len()
    }

    pub fn advance_insn(&self) -> InsnId {
        self.advance
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Per-phase wall-clock durations of the generation run; meaningful to
    /// print when the `time` option was set.
    pub fn timings(&self) -> &PhaseTimings {
        &self.timings
    }

    pub fn automata_count(&self) -> usize {
        self.tables.automata.len()
    }
}
