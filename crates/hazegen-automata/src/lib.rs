//! Hazegen automata: from a checked description to minimized per-automaton
//! DFAs.
//!
//! - `graph` - interned state graphs with per-state arc lists
//! - `altstate` - per-instruction alternative reservation states
//! - `nfa` - worklist NFA construction under the matters-set mask
//! - `determinize` - subset construction over compound states
//! - `minimize` - partition refinement with queryable-unit discrimination
//! - `equiv` - instruction equivalence classification
//! - `build` - the per-automaton construction pipeline
//! - `dump` - the human-readable automaton description

pub mod altstate;
pub mod build;
pub mod determinize;
pub mod dump;
pub mod equiv;
pub mod graph;
pub mod minimize;
pub mod nfa;

pub use build::{Automata, AutomatonGraph, Counts, PhaseTimings, build};
pub use graph::{ArcOut, State, StateGraph, StateId};
