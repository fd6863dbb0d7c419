//! # Just Intonation Lattice
//!
//! A cursor over the prime-axis lattice. Axis `i` steps by the primary
//! interval of the `(i + 1)`-th prime (3, 5, 7, 11, ...); the octave is
//! implicit and every resulting tone is reduced into [1:1, 2:1).
//!
//! Two notions of position are tracked:
//! - `node`: the most recently applied step vector
//! - `position`: the running sum of step vectors since the last return to
//!   1:1, i.e. the absolute lattice coordinate of the current tone
//!
//! The path records every applied vector so traversals can be undone.

use serde::Serialize;
use std::fmt;
use tracing::{debug, trace};

use crate::LatticeReport;
use crate::error::{JintonicError, Result};
use crate::interval::{DEFAULT_PRIME_LIMIT, Interval, primary_interval};
use crate::primes::{generate_primes, is_prime};

/// A mutable position in a just intonation lattice.
#[derive(Debug, Clone, Serialize)]
pub struct Lattice {
    fundamental: f64,
    prime_limit: u64,
    #[serde(skip)]
    axes: Vec<u64>,
    #[serde(skip)]
    generators: Vec<Interval>,
    tone: Interval,
    node: Vec<i64>,
    position: Vec<i64>,
    path: Vec<Vec<i64>>,
}

impl Lattice {
    /// Creates a lattice at 1:1.
    ///
    /// # Arguments
    /// * `fundamental` - The 1:1 pitch in Hertz
    /// * `prime_limit` - A prime number bounding the available axes
    pub fn new(fundamental: f64, prime_limit: u64) -> Result<Self> {
        validate_fundamental(fundamental)?;
        if !is_prime(prime_limit) {
            return Err(JintonicError::NotPrime(prime_limit));
        }
        let axes: Vec<u64> = generate_primes(prime_limit).into_iter().skip(1).collect();
        let generators = axes
            .iter()
            .map(|&prime| primary_interval(prime))
            .collect::<Result<Vec<_>>>()?;
        let origin = vec![0; axes.len()];

        Ok(Self {
            fundamental,
            prime_limit,
            axes,
            generators,
            tone: Interval::UNISON,
            node: origin.clone(),
            position: origin.clone(),
            path: vec![origin],
        })
    }

    /// Creates a 7-limit lattice (three axes: 3, 5 and 7).
    pub fn with_fundamental(fundamental: f64) -> Result<Self> {
        Self::new(fundamental, DEFAULT_PRIME_LIMIT)
    }

    /// Traverses the lattice by `vector` steps from the current tone.
    ///
    /// The first component steps along the 3-limit axis, the second along
    /// the 5-limit axis, and so on. Missing trailing components are zero.
    /// The vector becomes the current node and is appended to the path.
    ///
    /// # Returns
    /// * `Err(TooManyAxes)` - The vector is wider than the lattice; the
    ///   lattice is left untouched
    pub fn traverse(&mut self, vector: &[i64]) -> Result<&mut Self> {
        let vector = self.pad(vector)?;
        let tone = self.step(self.tone, &vector)?;
        self.commit(tone, &vector);
        self.path.push(vector);
        Ok(self)
    }

    /// Undoes the last `steps` traversals by applying their negations.
    ///
    /// Undone vectors are removed from the path and their inverses are not
    /// recorded. The origin entry of the path can never be undone, and a
    /// failed undo leaves the lattice untouched.
    pub fn undo(&mut self, steps: usize) -> Result<&mut Self> {
        let available = self.path.len() - 1;
        if steps > available {
            return Err(JintonicError::NothingToUndo {
                requested: steps,
                available,
            });
        }
        let mut scratch = self.clone();
        for _ in 0..steps {
            let Some(vector) = scratch.path.pop() else {
                break;
            };
            let inverse: Vec<i64> = vector.iter().map(|s| -s).collect();
            let tone = scratch.step(scratch.tone, &inverse)?;
            scratch.commit(tone, &inverse);
        }
        *self = scratch;
        Ok(self)
    }

    /// Returns to 1:1 without losing path history.
    pub fn to_fundamental(&mut self) -> &mut Self {
        let origin = vec![0; self.axes.len()];
        self.tone = Interval::UNISON;
        self.node = origin.clone();
        self.position = origin.clone();
        self.path.push(origin);
        debug!(fundamental = self.fundamental, "lattice returned to 1/1");
        self
    }

    /// Returns to 1:1 and clears the path history.
    pub fn reset_path(&mut self) -> &mut Self {
        self.to_fundamental();
        self.path = vec![vec![0; self.axes.len()]];
        self
    }

    /// Moves to the absolute lattice coordinate `vector`.
    ///
    /// Equivalent to [`Lattice::to_fundamental`] followed by
    /// [`Lattice::traverse`], but leaves the lattice untouched on failure.
    pub fn to_node(&mut self, vector: &[i64]) -> Result<&mut Self> {
        let vector = self.pad(vector)?;
        let tone = self.step(Interval::UNISON, &vector)?;
        self.to_fundamental();
        self.commit(tone, &vector);
        self.path.push(vector);
        Ok(self)
    }

    /// The current node's pitch in Hertz.
    pub fn hertz(&self) -> f64 {
        self.tone.scale(self.fundamental)
    }

    /// The current node's interval in cents.
    pub fn cents(&self) -> f64 {
        self.tone.cents()
    }

    /// The current tone as an interval above 1:1.
    pub fn tone(&self) -> Interval {
        self.tone
    }

    /// The most recently applied vector.
    pub fn node(&self) -> &[i64] {
        &self.node
    }

    /// The accumulated coordinate since the last return to 1:1.
    pub fn position(&self) -> &[i64] {
        &self.position
    }

    pub fn path(&self) -> &[Vec<i64>] {
        &self.path
    }

    pub fn fundamental(&self) -> f64 {
        self.fundamental
    }

    /// Sets the 1:1 pitch in Hertz.
    pub fn set_fundamental(&mut self, fundamental: f64) -> Result<()> {
        validate_fundamental(fundamental)?;
        self.fundamental = fundamental;
        Ok(())
    }

    pub fn prime_limit(&self) -> u64 {
        self.prime_limit
    }

    /// The prime of each axis, in vector order.
    pub fn axes(&self) -> &[u64] {
        &self.axes
    }

    /// Snapshot of the current position.
    pub fn report(&self) -> LatticeReport {
        LatticeReport::from(self)
    }

    /// Zero-pads `vector` to the lattice width.
    fn pad(&self, vector: &[i64]) -> Result<Vec<i64>> {
        if vector.len() > self.axes.len() {
            return Err(JintonicError::TooManyAxes {
                given: vector.len(),
                available: self.axes.len(),
            });
        }
        let mut padded = vector.to_vec();
        padded.resize(self.axes.len(), 0);
        Ok(padded)
    }

    /// Applies `vector` to `from` and octave-reduces the result.
    fn step(&self, from: Interval, vector: &[i64]) -> Result<Interval> {
        let mut tone = from;
        for (generator, &steps) in self.generators.iter().zip(vector) {
            let magnitude = steps
                .checked_abs()
                .ok_or(JintonicError::Overflow("lattice step"))?;
            let interval = generator.power(magnitude)?;
            if steps > 0 {
                tone = tone.compose(interval)?;
            } else if steps < 0 {
                tone = tone.decompose(interval)?;
            }
        }
        Ok(tone.base_octave())
    }

    fn commit(&mut self, tone: Interval, vector: &[i64]) {
        trace!(from = %self.tone, to = %tone, ?vector, "lattice step");
        self.tone = tone;
        for (coordinate, steps) in self.position.iter_mut().zip(vector) {
            *coordinate += steps;
        }
        self.node = vector.to_vec();
    }
}

fn validate_fundamental(fundamental: f64) -> Result<()> {
    if fundamental.is_finite() && fundamental > 0.0 {
        Ok(())
    } else {
        Err(JintonicError::InvalidFundamental(fundamental))
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hertz = (self.hertz() * 10_000.0).round() / 10_000.0;
        write!(
            f,
            "Lattice({} Hz, {}, {} Hz)",
            self.fundamental, self.tone, hertz
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn iv(numerator: u64, denominator: u64) -> Interval {
        Interval::new(numerator, denominator).unwrap()
    }

    #[test]
    fn test_new_lattice_is_at_unison() {
        let lattice = Lattice::with_fundamental(60.0).unwrap();
        assert_eq!(lattice.tone(), Interval::UNISON);
        assert_eq!(lattice.node(), &[0, 0, 0]);
        assert_eq!(lattice.path(), &[vec![0, 0, 0]]);
        assert_eq!(lattice.axes(), &[3, 5, 7]);
        assert_eq!(lattice.hertz(), 60.0);
        assert_eq!(lattice.prime_limit(), 7);
    }

    #[test]
    fn test_new_rejects_bad_arguments() {
        assert!(matches!(
            Lattice::new(0.0, 7),
            Err(JintonicError::InvalidFundamental(_))
        ));
        assert!(matches!(
            Lattice::new(f64::NAN, 7),
            Err(JintonicError::InvalidFundamental(_))
        ));
        assert_eq!(Lattice::new(60.0, 9).unwrap_err(), JintonicError::NotPrime(9));
    }

    #[test]
    fn test_traverse_fifth() {
        let mut lattice = Lattice::with_fundamental(60.0).unwrap();
        lattice.traverse(&[1, 0, 0]).unwrap();
        assert_eq!(lattice.tone(), iv(3, 2));
        assert_eq!(lattice.hertz(), 90.0);
        assert_eq!((lattice.cents() * 1000.0).round() / 1000.0, 701.955);
    }

    #[test]
    fn test_traverse_is_relative_to_current_tone() {
        let mut lattice = Lattice::with_fundamental(60.0).unwrap();
        let expected = [
            (vec![1, 0, 0], iv(3, 2)),
            (vec![-2, 0, 0], iv(4, 3)),
            (vec![1, 1, 0], iv(5, 4)),
            (vec![0, -2, 0], iv(8, 5)),
            (vec![0, 1, 1], iv(7, 4)),
            (vec![0, 0, -2], iv(8, 7)),
            (vec![2, 0, 1], iv(9, 8)),
            (vec![-4, 0, 0], iv(16, 9)),
        ];
        for (vector, tone) in expected {
            lattice.traverse(&vector).unwrap();
            assert_eq!(lattice.tone(), tone, "after {:?}", vector);
        }
        assert_eq!(lattice.node(), &[-4, 0, 0]);
        assert_eq!(lattice.position(), &[-2, 0, 0]);
    }

    #[test]
    fn test_traverse_records_path_and_pads() {
        let mut lattice = Lattice::with_fundamental(60.0).unwrap();
        lattice.traverse(&[0, 2, 3]).unwrap();
        lattice.traverse(&[1]).unwrap();
        assert_eq!(lattice.node(), &[1, 0, 0]);
        assert_eq!(
            lattice.path(),
            &[vec![0, 0, 0], vec![0, 2, 3], vec![1, 0, 0]]
        );
    }

    #[test]
    fn test_traverse_rejects_wide_vectors() {
        let mut lattice = Lattice::with_fundamental(60.0).unwrap();
        let result = lattice.traverse(&[0, 0, 0, 1]).map(|_| ());
        assert_eq!(
            result,
            Err(JintonicError::TooManyAxes {
                given: 4,
                available: 3
            })
        );
        assert_eq!(lattice.path().len(), 1);

        let mut eleven = Lattice::new(60.0, 11).unwrap();
        eleven.traverse(&[0, 0, 0, 1]).unwrap();
        assert_eq!(eleven.tone(), iv(11, 8));
    }

    #[test]
    fn test_undo() {
        let mut lattice = Lattice::with_fundamental(60.0).unwrap();
        lattice.traverse(&[1, 0, 0]).unwrap();
        lattice.undo(1).unwrap();
        assert_eq!(lattice.tone(), Interval::UNISON);
        assert_eq!(lattice.hertz(), 60.0);
        assert_eq!(lattice.node(), &[-1, 0, 0]);
        assert_eq!(lattice.position(), &[0, 0, 0]);
        assert_eq!(lattice.path(), &[vec![0, 0, 0]]);
    }

    #[test]
    fn test_undo_multiple_steps() {
        let mut lattice = Lattice::with_fundamental(60.0).unwrap();
        lattice.traverse(&[1, 0, 0]).unwrap();
        lattice.traverse(&[0, 1, 0]).unwrap();
        lattice.traverse(&[0, 0, 1]).unwrap();
        lattice.undo(2).unwrap();
        assert_eq!(lattice.tone(), iv(3, 2));
        assert_eq!(lattice.position(), &[1, 0, 0]);
        assert_eq!(lattice.path().len(), 2);
    }

    #[test]
    fn test_undo_past_origin_fails_without_mutation() {
        let mut lattice = Lattice::with_fundamental(60.0).unwrap();
        lattice.traverse(&[1, 0, 0]).unwrap();
        let result = lattice.undo(2).map(|_| ());
        assert_eq!(
            result,
            Err(JintonicError::NothingToUndo {
                requested: 2,
                available: 1
            })
        );
        assert_eq!(lattice.tone(), iv(3, 2));
    }

    #[test]
    fn test_undo_overflow_keeps_history() {
        let mut lattice = Lattice::with_fundamental(60.0).unwrap();
        lattice.traverse(&[40, 0, 0]).unwrap();
        lattice.to_fundamental();
        let before = lattice.clone();

        // The first pass undoes the return to 1:1, the second overflows.
        let result = lattice.undo(2).map(|_| ());
        assert!(matches!(result, Err(JintonicError::Overflow(_))));
        assert_eq!(lattice.path(), before.path());
        assert_eq!(lattice.tone(), Interval::UNISON);
        assert_eq!(lattice.node(), before.node());
        assert_eq!(lattice.position(), before.position());

        lattice.undo(1).unwrap();
        assert!(lattice.undo(1).is_err());
        assert_eq!(lattice.path(), &[vec![0, 0, 0], vec![40, 0, 0]]);
    }

    #[test]
    fn test_to_fundamental_keeps_history() {
        let mut lattice = Lattice::with_fundamental(60.0).unwrap();
        lattice.traverse(&[1, 0, 0]).unwrap();
        lattice.to_fundamental();
        assert_eq!(lattice.tone(), Interval::UNISON);
        assert_eq!(lattice.hertz(), 60.0);
        assert_eq!(
            lattice.path(),
            &[vec![0, 0, 0], vec![1, 0, 0], vec![0, 0, 0]]
        );
    }

    #[test]
    fn test_reset_path() {
        let mut lattice = Lattice::with_fundamental(60.0).unwrap();
        lattice.traverse(&[1, 0, 0]).unwrap().traverse(&[0, 1, 0]).unwrap();
        lattice.reset_path();
        assert_eq!(lattice.tone(), Interval::UNISON);
        assert_eq!(lattice.path(), &[vec![0, 0, 0]]);
    }

    #[test]
    fn test_to_node_is_absolute() {
        let mut lattice = Lattice::with_fundamental(60.0).unwrap();
        lattice.traverse(&[1, 0, 0]).unwrap();
        lattice.to_node(&[0, 0, 0]).unwrap();
        assert_eq!(lattice.tone(), Interval::UNISON);

        lattice.to_node(&[1, 1, 0]).unwrap();
        lattice.to_node(&[1, 1, 0]).unwrap();
        assert_eq!(lattice.tone(), iv(15, 8));
        assert_eq!(lattice.position(), &[1, 1, 0]);
    }

    #[test]
    fn test_display() {
        let mut lattice = Lattice::with_fundamental(60.0).unwrap();
        assert_eq!(lattice.to_string(), "Lattice(60 Hz, 1/1, 60 Hz)");
        lattice.traverse(&[0, 0, -2]).unwrap();
        assert_eq!(lattice.to_string(), "Lattice(60 Hz, 64/49, 78.3673 Hz)");

        lattice.to_node(&[0, 1, 1]).unwrap();
        assert_eq!(lattice.to_string(), "Lattice(60 Hz, 35/32, 65.625 Hz)");
    }

    #[test]
    fn test_set_fundamental() {
        let mut lattice = Lattice::with_fundamental(60.0).unwrap();
        lattice.traverse(&[1, 0, 0]).unwrap();
        lattice.set_fundamental(440.0).unwrap();
        assert_eq!(lattice.hertz(), 660.0);
        assert!(lattice.set_fundamental(-1.0).is_err());
        assert_eq!(lattice.fundamental(), 440.0);
    }
}
