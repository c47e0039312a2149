//! Hazegen DFA: compressed hazard-automaton tables and the O(1) scheduling
//! query API.
//!
//! The pipeline runs through staged types:
//! [`Description`] → [`Checked`] → [`Built`] → [`Dfa`].
//!
//! - `comb` - full and base/check/next table encodings
//! - `delay` - min-issue-delay computation and sub-byte packing
//! - `tables` - the per-automaton table bundle
//! - `runtime` - [`Dfa`]/[`DfaState`] and the query entry points
//! - `cache` - the instruction-code cache
//! - `stages` - the generation facade

pub mod cache;
pub mod comb;
pub mod delay;
pub mod runtime;
pub mod stages;
pub mod tables;


pub use cache::InsnCache;
pub use runtime::{Dfa, DfaState, TRANSITION_OK};
pub use stages::{Built, Checked, Description};

pub use hazegen_core::{Diagnostics, Error, InsnId, Options, Result, Severity};
