//! # Just Interval Module
//!
//! Exact rational frequency ratios for just intonation.
//!
//! An [`Interval`] is always stored in lowest terms with `numerator >=
//! denominator`, so it never represents anything below unison. Stacking
//! intervals multiplies their ratios; un-stacking divides them and wraps
//! around the octave so the result stays at or above unison.
//!
//! ## Features
//! - Composition, decomposition, and integer powers
//! - Octave reduction and octave complements
//! - Cents and absolute frequency conversion
//! - Prime-limit analysis
//! - Prime-limited partitioning of an interval into consecutive steps

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace, warn};

use crate::error::{JintonicError, Result};
use crate::primes::{gcd, is_prime, largest_prime_factor};

/// Prime limit used when none is given.
pub const DEFAULT_PRIME_LIMIT: u64 = 7;

/// Number of scale factors the partition search tries before giving up.
pub const DEFAULT_MAX_ITERATIONS: u32 = 30;

/// A just intonation interval: an exact frequency ratio of at least 1:1.
///
/// Equality and ordering compare the rational value. Because every value is
/// kept in lowest terms, two intervals with the same value always have the
/// same numerator and denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Interval {
    numerator: u64,
    denominator: u64,
}

impl Interval {
    /// 1:1
    pub const UNISON: Interval = Interval {
        numerator: 1,
        denominator: 1,
    };

    /// 2:1
    pub const OCTAVE: Interval = Interval {
        numerator: 2,
        denominator: 1,
    };

    /// Creates an interval, reducing it to lowest terms.
    ///
    /// # Arguments
    /// * `numerator` - Must be greater than or equal to `denominator`
    /// * `denominator` - Must be non-zero
    ///
    /// # Returns
    /// * `Ok(interval)` - The reduced interval
    /// * `Err(ZeroDenominator | BelowUnison)` - The pair is not a valid interval
    pub fn new(numerator: u64, denominator: u64) -> Result<Self> {
        if denominator == 0 {
            return Err(JintonicError::ZeroDenominator { numerator });
        }
        if numerator < denominator {
            return Err(JintonicError::BelowUnison {
                numerator,
                denominator,
            });
        }
        let common = gcd(numerator, denominator);
        Ok(Self {
            numerator: numerator / common,
            denominator: denominator / common,
        })
    }

    /// Const counterpart of [`Interval::new`], for compile-time constants.
    /// Returns `None` where `new` would fail.
    pub const fn new_const(numerator: u64, denominator: u64) -> Option<Self> {
        if denominator == 0 || numerator < denominator {
            return None;
        }
        let common = gcd(numerator, denominator);
        Some(Self {
            numerator: numerator / common,
            denominator: denominator / common,
        })
    }

    /// Creates the interval between two frequencies in Hertz.
    ///
    /// Both frequencies are truncated to whole numbers and the larger one
    /// becomes the numerator, so argument order does not matter.
    pub fn from_frequencies(a_hz: f64, b_hz: f64) -> Result<Self> {
        let (smaller, greater) = if a_hz <= b_hz { (a_hz, b_hz) } else { (b_hz, a_hz) };
        Self::new(greater as u64, smaller as u64)
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    /// The ratio as a float, for display and frequency conversion only.
    pub fn ratio(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Stacks `other` on top of this interval (ratio multiplication).
    ///
    /// Cross-cancels before multiplying, so the product is already in
    /// lowest terms and overflows only if the reduced result does.
    pub fn compose(self, other: Self) -> Result<Self> {
        let g1 = gcd(self.numerator, other.denominator);
        let g2 = gcd(other.numerator, self.denominator);
        let numerator = (self.numerator / g1)
            .checked_mul(other.numerator / g2)
            .ok_or(JintonicError::Overflow("composition"))?;
        let denominator = (self.denominator / g2)
            .checked_mul(other.denominator / g1)
            .ok_or(JintonicError::Overflow("composition"))?;
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Removes `other` from this interval: the interval which, composed onto
    /// `other`, yields `self`.
    ///
    /// If `other` is larger than `self`, `self` is raised by octaves until
    /// it is not, so the result is always at least unison.
    pub fn decompose(self, other: Self) -> Result<Self> {
        let mut minuend = self;
        while other > minuend {
            minuend = minuend.compose(Self::OCTAVE)?;
        }
        let g1 = gcd(minuend.numerator, other.numerator);
        let g2 = gcd(minuend.denominator, other.denominator);
        let numerator = (minuend.numerator / g1)
            .checked_mul(other.denominator / g2)
            .ok_or(JintonicError::Overflow("decomposition"))?;
        let denominator = (minuend.denominator / g2)
            .checked_mul(other.numerator / g1)
            .ok_or(JintonicError::Overflow("decomposition"))?;
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// This interval composed with itself `exponent` times.
    ///
    /// A zero exponent yields unison. Negative exponents are rejected.
    pub fn power(self, exponent: i64) -> Result<Self> {
        if exponent < 0 {
            return Err(JintonicError::NegativeExponent(exponent));
        }
        let exponent = u32::try_from(exponent).map_err(|_| JintonicError::Overflow("power"))?;
        // Powers of coprime integers stay coprime.
        let numerator = self
            .numerator
            .checked_pow(exponent)
            .ok_or(JintonicError::Overflow("power"))?;
        let denominator = self
            .denominator
            .checked_pow(exponent)
            .ok_or(JintonicError::Overflow("power"))?;
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Multiplies a scalar by this interval.
    ///
    /// This is how the absolute frequency of a pitch this interval above a
    /// fundamental is computed: `Interval(3, 2).scale(440.0) == 660.0`.
    pub fn scale(self, scalar: f64) -> f64 {
        scalar * self.numerator as f64 / self.denominator as f64
    }

    /// Superparticular intervals are of the form x+1:x.
    pub fn is_superparticular(&self) -> bool {
        self.numerator == self.denominator + 1
    }

    /// The interval reduced into the range [1:1, 2:1).
    pub fn base_octave(self) -> Self {
        let mut reduced = self;
        while reduced >= Self::OCTAVE {
            // numerator >= 2 * denominator, so doubling the denominator
            // cannot overflow, and halving or doubling keeps lowest terms.
            if reduced.numerator % 2 == 0 {
                reduced.numerator /= 2;
            } else {
                reduced.denominator *= 2;
            }
        }
        reduced
    }

    /// The interval which, composed with this one, yields an octave.
    ///
    /// Only defined up to the octave itself: 1:1 complements to 2:1 and 2:1
    /// complements to 1:1. Larger intervals must be octave-reduced first.
    pub fn complement(self) -> Result<Self> {
        match self.cmp(&Self::OCTAVE) {
            Ordering::Less => Self::OCTAVE.decompose(self),
            Ordering::Equal => Ok(Self::UNISON),
            Ordering::Greater => Err(JintonicError::ComplementUndefined(self.to_string())),
        }
    }

    /// The interval expressed in cents (1200 per octave).
    pub fn cents(&self) -> f64 {
        1200.0 * self.ratio().log2()
    }

    /// The largest prime factor appearing in either term.
    ///
    /// Pure octaves (including unison) have a prime limit of 1.
    pub fn prime_limit(&self) -> u64 {
        if self.base_octave() == Self::UNISON {
            return 1;
        }
        largest_prime_factor(self.numerator).max(largest_prime_factor(self.denominator))
    }

    /// Divides the interval into `divisor` consecutive steps whose harmonic
    /// numbers respect `prime_limit`.
    ///
    /// The search scales the interval's terms by a growing factor (starting
    /// at `divisor`) and keeps every integer in the scaled range except
    /// primes above the limit. The first factor that leaves exactly
    /// `divisor + 1` integers yields the steps between neighbours.
    ///
    /// # Arguments
    /// * `divisor` - Number of steps
    /// * `prime_limit` - A prime number
    /// * `max_iterations` - How many additional factors to try
    ///
    /// # Returns
    /// * `Ok(steps)` - `divisor` intervals, ascending, composing to `self`
    /// * `Err(NotPrime)` - `prime_limit` is not prime
    /// * `Err(InvalidDivisor)` - `divisor` is zero
    /// * `Err(SearchExhausted)` - No factor worked within `max_iterations`
    pub fn divide(self, divisor: usize, prime_limit: u64, max_iterations: u32) -> Result<Vec<Self>> {
        if !is_prime(prime_limit) {
            return Err(JintonicError::NotPrime(prime_limit));
        }
        if divisor == 0 {
            return Err(JintonicError::InvalidDivisor(divisor));
        }

        let mut factor = divisor as u64;
        for attempt in 0..=max_iterations {
            let low = self
                .denominator
                .checked_mul(factor)
                .ok_or(JintonicError::Overflow("partition range"))?;
            let high = self
                .numerator
                .checked_mul(factor)
                .ok_or(JintonicError::Overflow("partition range"))?;

            let excluded = |n: u64| n > prime_limit && is_prime(n);
            // Both endpoints must survive or the steps would not compose back to `self`.
            if excluded(low) || excluded(high) {
                trace!(attempt, factor, "partition endpoint excluded");
                factor += 1;
                continue;
            }
            // One extra term is enough to tell the range has too many.
            let retained: Vec<u64> = (low..=high)
                .filter(|&n| !excluded(n))
                .take(divisor.saturating_add(2))
                .collect();
            trace!(attempt, factor, retained = retained.len(), "partition search attempt");

            if retained.len() - 1 == divisor {
                let mut steps = retained
                    .windows(2)
                    .map(|pair| Self::new(pair[1], pair[0]))
                    .collect::<Result<Vec<_>>>()?;
                steps.sort();
                debug!(interval = %self, divisor, prime_limit, factor, "partition found");
                return Ok(steps);
            }
            factor += 1;
        }

        warn!(interval = %self, divisor, prime_limit, max_iterations, "partition search exhausted");
        Err(JintonicError::SearchExhausted {
            interval: self.to_string(),
            divisor,
            prime_limit,
            max_iterations,
        })
    }

    /// [`Interval::divide`] with the default iteration bound.
    pub fn divisions(self, divisor: usize, prime_limit: u64) -> Result<Vec<Self>> {
        self.divide(divisor, prime_limit, DEFAULT_MAX_ITERATIONS)
    }

    /// Naive division into `parts` superparticular steps, ignoring any
    /// prime limit.
    ///
    /// A superparticular interval is scaled by `parts`. Any other interval
    /// is scaled so that the distance between its terms equals `parts`,
    /// which requires `parts` to be a multiple of that distance.
    ///
    /// ```
    /// use jintonic_core::Interval;
    ///
    /// let steps = Interval::new(7, 4).unwrap().split(3).unwrap();
    /// let names: Vec<String> = steps.iter().map(|s| s.to_string()).collect();
    /// assert_eq!(names, ["7/6", "6/5", "5/4"]);
    /// ```
    pub fn split(self, parts: usize) -> Result<Vec<Self>> {
        let not_divisible = || JintonicError::NotDivisible {
            interval: self.to_string(),
            parts,
        };
        if parts == 0 {
            return Err(JintonicError::InvalidDivisor(parts));
        }
        let parts = parts as u64;
        let factor = if self.is_superparticular() {
            parts
        } else {
            let span = self.numerator - self.denominator;
            if span == 0 || parts % span != 0 {
                return Err(not_divisible());
            }
            parts / span
        };
        let numerator = self
            .numerator
            .checked_mul(factor)
            .ok_or(JintonicError::Overflow("split"))?;
        let denominator = self
            .denominator
            .checked_mul(factor)
            .ok_or(JintonicError::Overflow("split"))?;

        // Consecutive integers are always coprime.
        let mut steps: Vec<Self> = ((denominator + 1)..=numerator)
            .map(|k| Self {
                numerator: k,
                denominator: k - 1,
            })
            .collect();
        steps.sort();
        Ok(steps)
    }
}

/// The primary interval of a prime: `prime` over the largest power of two
/// below it, e.g. 3:2, 5:4, 7:4, 19:16.
///
/// This is the single-step generator of that prime's lattice axis.
pub fn primary_interval(prime: u64) -> Result<Interval> {
    if !is_prime(prime) {
        return Err(JintonicError::NotPrime(prime));
    }
    let mut power_of_two = 2;
    while power_of_two <= prime / 2 {
        power_of_two *= 2;
    }
    Interval::new(prime, power_of_two)
}

/// The sub-harmonic primary interval: the complement of
/// [`primary_interval`], e.g. 4:3 for 3.
pub fn sub_primary_interval(prime: u64) -> Result<Interval> {
    primary_interval(prime)?.complement()
}

impl Ord for Interval {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.numerator as u128 * other.denominator as u128;
        let rhs = other.numerator as u128 * self.denominator as u128;
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Interval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for Interval {
    type Err = JintonicError;

    /// Parses `"numerator:denominator"` (or the display form
    /// `"numerator/denominator"`), ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || JintonicError::InvalidRatio(s.to_string());
        let (num, denom) = s
            .trim()
            .split_once([':', '/'])
            .ok_or_else(invalid)?;
        let parse = |digits: &str| {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            digits.parse::<u64>().map_err(|_| invalid())
        };
        Self::new(parse(num)?, parse(denom)?)
    }
}

impl TryFrom<String> for Interval {
    type Error = JintonicError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Interval> for String {
    fn from(interval: Interval) -> Self {
        interval.to_string()
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
    fn test_construction_reduces() {
        assert_eq!(iv(6, 3), iv(2, 1));
        assert_eq!(iv(6, 3).numerator(), 2);
        assert_eq!(iv(6, 3).denominator(), 1);
        assert_eq!(iv(3, 3), Interval::UNISON);
    }

    #[test]
    fn test_construction_rejects_invalid_pairs() {
        assert_eq!(
            Interval::new(3, 0),
            Err(JintonicError::ZeroDenominator { numerator: 3 })
        );
        assert_eq!(
            Interval::new(2, 3),
            Err(JintonicError::BelowUnison {
                numerator: 2,
                denominator: 3
            })
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!("3:2".parse::<Interval>(), Ok(iv(3, 2)));
        assert_eq!(" 6:3 ".parse::<Interval>(), Ok(iv(2, 1)));
        assert_eq!("9/8".parse::<Interval>(), Ok(iv(9, 8)));
        assert!(matches!("3-2".parse::<Interval>(), Err(JintonicError::InvalidRatio(_))));
        assert!(matches!(":2".parse::<Interval>(), Err(JintonicError::InvalidRatio(_))));
        assert!(matches!("+3:2".parse::<Interval>(), Err(JintonicError::InvalidRatio(_))));
        assert!(matches!("3:2:1".parse::<Interval>(), Err(JintonicError::InvalidRatio(_))));
        assert!(matches!("2:3".parse::<Interval>(), Err(JintonicError::BelowUnison { .. })));
    }

    #[test]
    fn test_from_frequencies() {
        assert_eq!(Interval::from_frequencies(220.0, 440.0), Ok(iv(2, 1)));
        assert_eq!(Interval::from_frequencies(660.7, 440.2), Ok(iv(3, 2)));
    }

    #[test]
    fn test_compose() {
        assert_eq!(iv(3, 2).compose(iv(4, 3)), Ok(iv(2, 1)));
        assert_eq!(iv(2, 1).compose(iv(3, 2)), Ok(iv(3, 1)));
        assert_eq!(iv(5, 4).compose(Interval::UNISON), Ok(iv(5, 4)));
    }

    #[test]
    fn test_decompose_wraps_around_the_octave() {
        assert_eq!(iv(3, 2).decompose(iv(9, 8)), Ok(iv(4, 3)));
        assert_eq!(Interval::UNISON.decompose(iv(3, 2)), Ok(iv(4, 3)));
        assert_eq!(iv(3, 2).decompose(iv(9, 4)), Ok(iv(4, 3)));
        assert_eq!(Interval::UNISON.decompose(iv(5, 1)), Ok(iv(8, 5)));
    }

    #[test]
    fn test_power() {
        assert_eq!(iv(3, 2).power(3), Ok(iv(27, 8)));
        assert_eq!(iv(3, 2).power(0), Ok(Interval::UNISON));
        assert_eq!(iv(3, 2).power(-1), Err(JintonicError::NegativeExponent(-1)));
        assert_eq!(iv(3, 2).power(200), Err(JintonicError::Overflow("power")));
    }

    #[test]
    fn test_scale() {
        assert_eq!(iv(3, 2).scale(440.0), 660.0);
        assert_eq!(Interval::UNISON.scale(60.0), 60.0);
    }

    #[test]
    fn test_is_superparticular() {
        assert!(iv(3, 2).is_superparticular());
        assert!(iv(5, 4).is_superparticular());
        assert!(!iv(9, 7).is_superparticular());
        assert!(!Interval::UNISON.is_superparticular());
    }

    #[test]
    fn test_base_octave() {
        assert_eq!(iv(9, 4).base_octave(), iv(9, 8));
        assert_eq!(iv(2, 1).base_octave(), Interval::UNISON);
        assert_eq!(iv(27, 8).base_octave(), iv(27, 16));
        assert_eq!(iv(3, 2).base_octave(), iv(3, 2));
    }

    #[test]
    fn test_complement() {
        assert_eq!(iv(3, 2).complement(), Ok(iv(4, 3)));
        assert_eq!(iv(5, 4).complement(), Ok(iv(8, 5)));
        assert_eq!(Interval::OCTAVE.complement(), Ok(Interval::UNISON));
        assert_eq!(Interval::UNISON.complement(), Ok(Interval::OCTAVE));
        assert!(matches!(
            iv(3, 1).complement(),
            Err(JintonicError::ComplementUndefined(_))
        ));
    }

    #[test]
    fn test_cents() {
        assert_eq!((iv(3, 2).cents() * 1000.0).round() / 1000.0, 701.955);
        assert_eq!(Interval::OCTAVE.cents(), 1200.0);
        assert_eq!(Interval::UNISON.cents(), 0.0);
    }

    #[test]
    fn test_prime_limit() {
        assert_eq!(iv(64, 49).prime_limit(), 7);
        assert_eq!(iv(3, 2).prime_limit(), 3);
        assert_eq!(iv(3, 1).prime_limit(), 3);
        assert_eq!(iv(4, 1).prime_limit(), 1);
        assert_eq!(Interval::UNISON.prime_limit(), 1);
    }

    #[test]
    fn test_ordering_compares_values() {
        assert!(iv(3, 2) < iv(5, 3));
        assert!(iv(9, 8) > iv(10, 9));
        let mut tones = vec![iv(2, 1), iv(5, 4), Interval::UNISON, iv(3, 2)];
        tones.sort();
        assert_eq!(tones, vec![Interval::UNISON, iv(5, 4), iv(3, 2), iv(2, 1)]);
    }

    #[test]
    fn test_divide_octave_five_limit() {
        let steps = Interval::OCTAVE.divide(4, 5, DEFAULT_MAX_ITERATIONS).unwrap();
        assert_eq!(steps, vec![iv(10, 9), iv(9, 8), iv(6, 5), iv(4, 3)]);

        let total = steps
            .iter()
            .try_fold(Interval::UNISON, |acc, step| acc.compose(*step))
            .unwrap();
        assert_eq!(total, Interval::OCTAVE);
        for step in &steps {
            assert!(step.prime_limit() <= 5);
        }
    }

    #[test]
    fn test_divide_keeps_primes_up_to_the_limit() {
        assert_eq!(iv(16, 15).divisions(2, 31), Ok(vec![iv(32, 31), iv(31, 30)]));
        assert_eq!(iv(10, 9).divisions(2, 7), Ok(vec![iv(28, 27), iv(15, 14)]));
    }

    #[test]
    fn test_divide_never_drops_an_endpoint() {
        // 17 is removed at limit 7, leaving 15, 16 which would give 16/15.
        assert!(matches!(
            iv(17, 15).divide(1, 7, 3),
            Err(JintonicError::SearchExhausted { .. })
        ));
    }

    #[test]
    fn test_divide_wide_interval_stops_early() {
        let wide = iv(2_000_000, 1);
        assert_eq!(
            wide.divide(2, 7, 2),
            Err(JintonicError::SearchExhausted {
                interval: "2000000/1".to_string(),
                divisor: 2,
                prime_limit: 7,
                max_iterations: 2,
            })
        );
        assert_eq!(iv(3, 2).divide(2, 7, 0), Ok(vec![iv(6, 5), iv(5, 4)]));
    }

    #[test]
    fn test_divide_rejects_bad_arguments() {
        assert_eq!(iv(2, 1).divisions(2, 9), Err(JintonicError::NotPrime(9)));
        assert_eq!(iv(2, 1).divisions(0, 7), Err(JintonicError::InvalidDivisor(0)));
    }

    #[test]
    fn test_divide_reports_exhaustion() {
        let result = Interval::UNISON.divide(2, 7, 5);
        assert_eq!(
            result,
            Err(JintonicError::SearchExhausted {
                interval: "1/1".to_string(),
                divisor: 2,
                prime_limit: 7,
                max_iterations: 5,
            })
        );
    }

    #[test]
    fn test_split() {
        assert_eq!(Interval::OCTAVE.split(2), Ok(vec![iv(4, 3), iv(3, 2)]));
        assert_eq!(
            Interval::OCTAVE.split(3),
            Ok(vec![iv(6, 5), iv(5, 4), iv(4, 3)])
        );
        assert_eq!(iv(7, 4).split(3), Ok(vec![iv(7, 6), iv(6, 5), iv(5, 4)]));
        assert!(matches!(iv(7, 4).split(2), Err(JintonicError::NotDivisible { .. })));
        assert!(matches!(
            Interval::UNISON.split(2),
            Err(JintonicError::NotDivisible { .. })
        ));
    }

    #[test]
    fn test_primary_interval() {
        assert_eq!(primary_interval(3), Ok(iv(3, 2)));
        assert_eq!(primary_interval(5), Ok(iv(5, 4)));
        assert_eq!(primary_interval(7), Ok(iv(7, 4)));
        assert_eq!(primary_interval(17), Ok(iv(17, 16)));
        assert_eq!(primary_interval(19), Ok(iv(19, 16)));
        assert_eq!(primary_interval(9), Err(JintonicError::NotPrime(9)));
        assert_eq!(sub_primary_interval(3), Ok(iv(4, 3)));
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(iv(3, 2).to_string(), "3/2");
        let json = serde_json::to_string(&iv(7, 4)).unwrap();
        assert_eq!(json, "\"7/4\"");
        let parsed: Interval = serde_json::from_str("\"12:8\"").unwrap();
        assert_eq!(parsed, iv(3, 2));
        assert!(serde_json::from_str::<Interval>("\"1:2\"").is_err());
    }
}
