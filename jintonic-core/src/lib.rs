// jintonic-core/src/lib.rs

//! The core logic for just intonation tuning.
//! This crate is responsible for exact interval arithmetic, prime-axis
//! lattice traversal, and the chords and scales built on top of them.
//! It is completely headless and performs no I/O.

pub mod chord;
pub mod error;
pub mod harmonics;
pub mod interval;
pub mod lattice;
pub mod primes;
pub mod scale;

pub use chord::LatticeChord;
pub use error::{JintonicError, Result};
pub use interval::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_PRIME_LIMIT, Interval, primary_interval, sub_primary_interval,
};
pub use lattice::Lattice;
pub use scale::{Genus, Scale, Tetrachord, TetrachordalScale};

use serde::Serialize;

/// A snapshot of a lattice position, ready for display or serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatticeReport {
    /// The 1:1 pitch in Hertz.
    pub fundamental: f64,
    /// The current tone above 1:1.
    pub tone: Interval,
    /// The most recently applied step vector.
    pub node: Vec<i64>,
    /// The accumulated lattice coordinate.
    pub position: Vec<i64>,
    /// The current pitch in Hertz.
    pub hertz: f64,
    /// The current tone in cents above 1:1.
    pub cents: f64,
    /// Prime limit of the current tone.
    pub prime_limit: u64,
}

impl From<&Lattice> for LatticeReport {
    fn from(lattice: &Lattice) -> Self {
        Self {
            fundamental: lattice.fundamental(),
            tone: lattice.tone(),
            node: lattice.node().to_vec(),
            position: lattice.position().to_vec(),
            hertz: lattice.hertz(),
            cents: lattice.cents(),
            prime_limit: lattice.tone().prime_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_reflects_lattice() {
        let mut lattice = Lattice::with_fundamental(60.0).unwrap();
        lattice.traverse(&[1, 1, 0]).unwrap();
        let report = lattice.report();
        assert_eq!(report.tone, Interval::new(15, 8).unwrap());
        assert_eq!(report.hertz, 112.5);
        assert_eq!(report.position, vec![1, 1, 0]);
        assert_eq!(report.prime_limit, 5);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["tone"], "15/8");
        assert_eq!(json["node"], serde_json::json!([1, 1, 0]));
    }
}
