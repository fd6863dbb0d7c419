//! # Harmonic Series Module
//!
//! Converts sets of tones to harmonic (or sub-harmonic) segments: the
//! smallest integers sharing a common fundamental that sound those tones.

use crate::error::{JintonicError, Result};
use crate::interval::Interval;
use crate::primes::{gcd, lcm};

/// Converts tones to a harmonic segment, or a sub-harmonic segment when
/// `sub` is set.
///
/// Any member whose half is exactly one below its successor is halved, so
/// that a segment such as `[8, 5, 6, 7]` reads `[4, 5, 6, 7]`.
///
/// # Arguments
/// * `tones` - Tones above a shared 1:1
/// * `sub` - Build an undertone segment instead of an overtone one
///
/// # Returns
/// * `Ok(segment)` - One harmonic number per tone, in input order
/// * `Err(EmptyInput)` - `tones` was empty
pub fn tones_to_harmonic_segment(tones: &[Interval], sub: bool) -> Result<Vec<u64>> {
    let pairs: Vec<(u64, u64)> = tones
        .iter()
        .map(|tone| {
            if sub {
                (tone.denominator(), tone.numerator())
            } else {
                (tone.numerator(), tone.denominator())
            }
        })
        .collect();

    let bottoms: Vec<u64> = pairs.iter().map(|&(_, bottom)| bottom).collect();
    let common = lcm(&bottoms)?;
    let mut segment = pairs
        .iter()
        .map(|&(top, bottom)| {
            top.checked_mul(common / bottom)
                .ok_or(JintonicError::Overflow("harmonic segment"))
        })
        .collect::<Result<Vec<_>>>()?;

    let divisor = segment.iter().copied().fold(0, gcd);
    if divisor > 1 {
        for harmonic in &mut segment {
            *harmonic /= divisor;
        }
    }

    if sub {
        segment.reverse();
    }
    for i in 0..segment.len().saturating_sub(1) {
        let harmonic = segment[i];
        if harmonic % 2 == 0 && harmonic / 2 + 1 == segment[i + 1] {
            segment[i] = harmonic / 2;
        }
    }
    if sub {
        segment.reverse();
    }
    Ok(segment)
}

/// Converts a harmonic number to its tone identity (odd part).
pub fn harmonic_to_identity(harmonic: u64) -> u64 {
    if harmonic == 0 {
        return 0;
    }
    harmonic >> harmonic.trailing_zeros()
}

/// Converts a harmonic or sub-harmonic segment to its tone identities.
pub fn harmonic_segment_to_identities(segment: &[u64]) -> Vec<u64> {
    segment.iter().map(|&h| harmonic_to_identity(h)).collect()
}
