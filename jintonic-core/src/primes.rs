//! # Prime Utilities
//!
//! Prime number operations used throughout just intonation: primality,
//! enumeration, factorization, and least common multiples.
//!
//! Inputs are small tuning-theory integers (harmonic numbers, prime limits),
//! so plain trial division is used everywhere.

use crate::error::{JintonicError, Result};

/// States whether a number is prime.
///
/// # Arguments
/// * `number` - The number to test
///
/// # Returns
/// * `true` if `number` has no divisor other than 1 and itself
pub fn is_prime(number: u64) -> bool {
    if number < 2 {
        return false;
    }
    let mut factor = 2;
    while factor <= number / factor {
        if number % factor == 0 {
            return false;
        }
        factor += 1;
    }
    true
}

/// Generates all primes up to and including `limit`, ascending.
pub fn generate_primes(limit: u64) -> Vec<u64> {
    (2..=limit).filter(|&n| is_prime(n)).collect()
}

/// Finds the prime factors of an integer by trial division.
///
/// Factors are returned ascending, with multiplicity. `0` and `1` have no
/// prime factors.
///
/// # Arguments
/// * `number` - The integer to factor
///
/// # Returns
/// * Prime factors, e.g. `prime_factors(12) == [2, 2, 3]`
pub fn prime_factors(mut number: u64) -> Vec<u64> {
    let mut factors = Vec::new();
    if number < 2 {
        return factors;
    }
    let mut factor = 2;
    while factor <= number / factor {
        if number % factor == 0 {
            number /= factor;
            factors.push(factor);
        } else {
            factor += 1;
        }
    }
    if number > 1 {
        factors.push(number);
    }
    factors
}

/// Largest prime factor of `number`, or `1` when it has none.
pub fn largest_prime_factor(number: u64) -> u64 {
    prime_factors(number).last().copied().unwrap_or(1)
}

/// Greatest common divisor (Euclid).
pub const fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Least common multiple of a non-empty sequence of integers.
///
/// # Returns
/// * `Ok(lcm)` - The least common multiple
/// * `Err(EmptyInput)` - The sequence was empty
/// * `Err(Overflow)` - The result does not fit in a `u64`
pub fn lcm(numbers: &[u64]) -> Result<u64> {
    let (first, rest) = numbers.split_first().ok_or(JintonicError::EmptyInput)?;
    rest.iter().try_fold(*first, |acc, &n| {
        if acc == 0 || n == 0 {
            return Ok(0);
        }
        (acc / gcd(acc, n))
            .checked_mul(n)
            .ok_or(JintonicError::Overflow("least common multiple"))
    })
}
