//! Error taxonomy for the synthesis core.
//!
//! Mirrors splr's own style: a plain enum implementing `Display` and
//! `std::error::Error` by hand, no `thiserror`/`anyhow`.
use std::fmt;

/// Errors that can escape a `TruthTable` operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TruthTableError {
    /// Two truth tables were combined but didn't share `num_vars`.
    MismatchedWidth { expected: usize, found: usize },
}

impl fmt::Display for TruthTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TruthTableError::MismatchedWidth { expected, found } => write!(
                f,
                "mismatched truth table width: expected {} variables, found {}",
                expected, found
            ),
        }
    }
}

impl std::error::Error for TruthTableError {}

/// Top-level error taxonomy for one synthesis run.
#[derive(Debug)]
pub enum SynthesisError {
    /// `num_vars < 3`, mismatched truth-table widths, or a non-trivial
    /// target function that is actually constant.
    SpecificationInvalid(String),
    /// The SAT solver returned an out-of-band status.
    SolverUnexpected(String),
    /// The solver exhausted its conflict budget at the current step count.
    /// Not fatal: the caller may retry with a larger budget.
    Timeout { step_count: usize },
    /// Fan-in clause emission failed for every step at the current step
    /// count: no selection is possible. Recovered locally by the driver,
    /// which grows the step count; only escapes if growth also fails.
    EncoderExhausted { step_count: usize },
    /// Step count was grown past the configured cap without finding a
    /// satisfying assignment.
    Unsynthesizable { step_cap: usize },
    /// An extracted chain failed to reproduce the specification. This is
    /// a bug signal, not a normal outcome; synthesis aborts rather than
    /// returning a wrong chain.
    ChainVerificationFailure,
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisError::SpecificationInvalid(why) => {
                write!(f, "invalid specification: {}", why)
            }
            SynthesisError::SolverUnexpected(why) => write!(f, "solver returned {}", why),
            SynthesisError::Timeout { step_count } => {
                write!(f, "conflict budget exhausted at {} steps", step_count)
            }
            SynthesisError::EncoderExhausted { step_count } => write!(
                f,
                "no fan-in selection is possible with {} steps",
                step_count
            ),
            SynthesisError::Unsynthesizable { step_cap } => write!(
                f,
                "no chain found up to the step cap of {}",
                step_cap
            ),
            SynthesisError::ChainVerificationFailure => {
                write!(f, "extracted chain failed to reproduce its specification")
            }
        }
    }
}

impl std::error::Error for SynthesisError {}

/// Result alias used throughout the crate, matching splr's `MaybeInconsistent`
/// idiom for "this step may fail, and failure carries no extra payload
/// beyond the error itself".
pub type SynthResult<T> = Result<T, SynthesisError>;

/// `Ok(())` unless a clause addition made the formula trivially
/// unsatisfiable; mirrors splr's `MaybeInconsistent`.
pub type MaybeOk = Result<(), ()>;
