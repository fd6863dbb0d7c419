//! # Error Module
//!
//! Every fallible operation in the core returns [`JintonicError`]. Failures
//! are local: nothing is retried except the bounded partition search, which
//! reports [`JintonicError::SearchExhausted`] once it gives up.

use thiserror::Error;

/// Result alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, JintonicError>;

/// Errors raised by interval construction, interval arithmetic and lattice
/// traversal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JintonicError {
    // --- Invalid construction ---
    #[error("interval {numerator}:0 has a zero denominator")]
    ZeroDenominator { numerator: u64 },

    #[error(
        "numerator must be greater than or equal to denominator, got {numerator}:{denominator}"
    )]
    BelowUnison { numerator: u64, denominator: u64 },

    #[error("invalid literal for interval: '{0}'")]
    InvalidRatio(String),

    // --- Domain violations ---
    #[error("intervals can only be raised to non-negative powers, got {0}")]
    NegativeExponent(i64),

    #[error("complement is undefined for {0}, which is larger than an octave")]
    ComplementUndefined(String),

    #[error("the prime limit must be a prime number, got {0}")]
    NotPrime(u64),

    #[error("vector has {given} axes but the lattice only has {available}")]
    TooManyAxes { given: usize, available: usize },

    #[error("cannot divide an interval into {0} parts")]
    InvalidDivisor(usize),

    #[error("{interval} is not divisible into {parts} parts")]
    NotDivisible { interval: String, parts: usize },

    #[error("fundamental must be a positive finite frequency, got {0}")]
    InvalidFundamental(f64),

    #[error("cannot undo {requested} steps, only {available} recorded")]
    NothingToUndo { requested: usize, available: usize },

    #[error("{0} is not an axis of this lattice")]
    UnknownAxis(u64),

    #[error("cannot pivot on axis {axis}, above the chord's prime limit {prime_limit}")]
    AxisAboveLimit { axis: u64, prime_limit: u64 },

    #[error("unknown chord name: '{0}'")]
    UnknownChord(String),

    #[error("unknown genus: '{0}'")]
    UnknownGenus(String),

    #[error("invalid tetrachord: {0}")]
    InvalidTetrachord(String),

    #[error("cannot reduce an empty sequence")]
    EmptyInput,

    #[error("integer overflow while computing {0}")]
    Overflow(&'static str),

    // --- Search exhaustion ---
    #[error(
        "no partition of {interval} into {divisor} steps within prime limit {prime_limit} \
         after {max_iterations} iterations"
    )]
    SearchExhausted {
        interval: String,
        divisor: usize,
        prime_limit: u64,
        max_iterations: u32,
    },
}
