//! Hazegen core: pipeline description model and semantic analysis.
//!
//! This crate provides the front half of the hazard-automaton generator:
//! - `decl` - typed declaration records (the external input)
//! - `options` - generation options folded from option declarations
//! - `diagnostics` - accumulating error/warning reporting
//! - `resv` - reservation sets (bit strings over cycle × unit)
//! - `constraint` - exclusion / presence / absence tables
//! - `regexp` - reservation regexp IR, lexer, parser, canonicalizer
//! - `check` - the semantic checker producing a [`CheckedDescription`]
//! - `distribute` - unit-to-automaton distribution and its validation

pub mod check;
pub mod constraint;
pub mod decl;
pub mod diagnostics;
pub mod distribute;
pub mod ids;
pub mod options;
pub mod regexp;
pub mod resv;

pub use check::{CheckedDescription, check};
pub use diagnostics::{Diagnostics, DiagnosticsPrinter, Severity};
pub use ids::{AutomatonId, InsnId, ReservId, UnitId};
pub use options::Options;
pub use resv::{Geometry, ResvSet};

/// Errors that can cross the generation boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The semantic checker accumulated at least one error-severity
    /// diagnostic; automaton construction is suppressed.
    #[error("description check failed with {} errors", .0.error_count())]
    CheckFailed(Diagnostics),
}

/// Result type for generation operations.
pub type Result<T> = std::result::Result<T, Error>;
