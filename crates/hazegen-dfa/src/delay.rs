//! Minimum issue delay computation and the packed table.
//!
//! For every instruction equivalence class, the minimum number of
//! advance-cycles before an instruction of the class can issue from each
//! state is a shortest-path problem: advance-cycle arcs weigh 1, all other
//! arcs weigh 0, and states owning an arc of the class are the targets.
//! Solved per class with a 0-1 BFS over the reverse graph.
//!
//! The table packs entries into 1, 2, 4, or 8 bits each, whichever width
//! the maximum value fits.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use hazegen_automata::{AutomatonGraph, StateId};
use hazegen_core::InsnId;

/// Unreachable marker during the search; clamped at packing.
const INFINITE: u32 = u32::MAX;

/// Compute the `state × class` delay matrix, row-major over the given state
/// order.
pub fn min_issue_delays(
    automaton: &AutomatonGraph,
    order: &[StateId],
    number: &FxHashMap<StateId, usize>,
    advance: InsnId,
) -> Vec<u32> {
    let graph = &automaton.graph;
    let classes = automaton.class_count as usize;
    let states = order.len();

    // Reverse adjacency with 0/1 weights, and per-class target sets.
    let mut reverse: Vec<Vec<(usize, u32)>> = vec![Vec::new(); states];
    let mut targets: Vec<Vec<usize>> = vec![Vec::new(); classes];
    for (i, &state) in order.iter().enumerate() {
        for arc in &graph.state(state).arcs {
            let weight = u32::from(arc.insn == advance);
            reverse[number[&arc.to]].push((i, weight));
            let class = automaton.insn_classes[arc.insn.index()] as usize;
            targets[class].push(i);
        }
    }

    let mut matrix = vec![INFINITE; states * classes];
    let mut dist = vec![INFINITE; states];
    for (class, class_targets) in targets.iter().enumerate() {
        dist.fill(INFINITE);
        let mut deque: VecDeque<usize> = VecDeque::new();
        for &t in class_targets {
            if dist[t] != 0 {
                dist[t] = 0;
                deque.push_back(t);
            }
        }

        while let Some(i) = deque.pop_front() {
            let d = dist[i];
            for &(from, weight) in &reverse[i] {
                let candidate = d.saturating_add(weight);
                if candidate < dist[from] {
                    dist[from] = candidate;
                    if weight == 0 {
                        deque.push_front(from);
                    } else {
                        deque.push_back(from);
                    }
                }
            }
        }

        for i in 0..states {
            matrix[i * classes + class] = dist[i];
        }
    }

    matrix
}

/// The min-issue-delay table with sub-byte packing.
#[derive(Debug, Clone)]
pub struct MinDelayTable {
    bits: u8,
    cols: usize,
    data: Vec<u8>,
}

impl MinDelayTable {
    /// Pack a row-major matrix. Entry width is the narrowest of 1/2/4/8
    /// bits that holds the maximum finite value; unreachable entries clamp
    /// to the width's maximum.
    pub fn pack(matrix: &[u32], cols: usize) -> MinDelayTable {
        let max = matrix
            .iter()
            .copied()
            .filter(|&v| v != INFINITE)
            .max()
            .unwrap_or(0);
        let bits: u8 = [1u8, 2, 4, 8]
            .into_iter()
            .find(|&b| max <= mask(b))
            .unwrap_or(8);

        let per_byte = (8 / bits) as usize;
        let mut data = vec![0u8; matrix.len().div_ceil(per_byte)];
        for (i, &value) in matrix.iter().enumerate() {
            let clamped = value.min(mask(bits)) as u8;
            let shift = (i % per_byte) as u8 * bits;
            data[i / per_byte] |= clamped << shift;
        }

        MinDelayTable { bits, cols, data }
    }

    pub fn get(&self, row: usize, col: usize) -> u32 {
        let i = row * self.cols + col;
        let per_byte = (8 / self.bits) as usize;
        let shift = (i % per_byte) as u8 * self.bits;
        ((self.data[i / per_byte] >> shift) & mask(self.bits) as u8) as u32
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

fn mask(bits: u8) -> u32 {
    if bits >= 32 { u32::MAX } else { (1 << bits) - 1 }
}
