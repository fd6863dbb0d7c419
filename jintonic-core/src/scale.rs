//! # Scale Module
//!
//! Arbitrary just scales, disjunct tetrachords, and the tetrachordal scales
//! built from a pair of tetrachords separated by a 9:8 tone.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{JintonicError, Result};
use crate::interval::Interval;

/// The perfect fourth spanned by every tetrachord.
const FOURTH: Interval = match Interval::new_const(4, 3) {
    Some(interval) => interval,
    None => Interval::UNISON,
};

/// The whole tone separating the two tetrachords of a scale.
const DISJUNCTION: Interval = match Interval::new_const(9, 8) {
    Some(interval) => interval,
    None => Interval::UNISON,
};

fn format_tones(tones: &[Interval]) -> String {
    tones
        .iter()
        .map(Interval::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// An arbitrary set of tones above 1:1, kept in ascending order.
///
/// 1:1 is only part of the scale if it was given as a tone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scale {
    tones: Vec<Interval>,
}

impl Scale {
    pub fn new(mut tones: Vec<Interval>) -> Self {
        tones.sort();
        Self { tones }
    }

    /// Adds a tone, keeping the scale sorted.
    pub fn push(&mut self, tone: Interval) {
        let index = self.tones.partition_point(|existing| *existing <= tone);
        self.tones.insert(index, tone);
    }

    pub fn tones(&self) -> &[Interval] {
        &self.tones
    }

    /// The steps between successive tones.
    pub fn intervals(&self) -> Result<Vec<Interval>> {
        self.tones
            .windows(2)
            .map(|pair| pair[1].decompose(pair[0]))
            .collect()
    }

    /// The scale made of each tone's octave complement.
    pub fn complement(&self) -> Result<Scale> {
        let tones = self
            .tones
            .iter()
            .map(|tone| tone.complement())
            .collect::<Result<Vec<_>>>()?;
        Ok(Scale::new(tones))
    }

    /// Translates the tones to pitches in Hertz over `fundamental` (1:1).
    pub fn hertz(&self, fundamental: f64) -> Vec<f64> {
        self.tones.iter().map(|tone| tone.scale(fundamental)).collect()
    }

    pub fn prime_limit(&self) -> u64 {
        self.tones
            .iter()
            .map(Interval::prime_limit)
            .max()
            .unwrap_or(1)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scale([{}])", format_tones(&self.tones))
    }
}

/// The three classical tetrachord genera, named by their characteristic
/// (largest, uppermost) interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Genus {
    /// 5:4 characteristic interval
    Enharmonic,
    /// 6:5 characteristic interval
    Chromatic,
    /// 10:9 characteristic interval
    Diatonic,
}

impl Genus {
    pub const ALL: [Genus; 3] = [Genus::Enharmonic, Genus::Chromatic, Genus::Diatonic];

    pub fn characteristic(self) -> Interval {
        let (numerator, denominator) = match self {
            Genus::Enharmonic => (5, 4),
            Genus::Chromatic => (6, 5),
            Genus::Diatonic => (10, 9),
        };
        Interval::new_const(numerator, denominator).unwrap_or(Interval::UNISON)
    }

    pub fn name(self) -> &'static str {
        match self {
            Genus::Enharmonic => "enharmonic",
            Genus::Chromatic => "chromatic",
            Genus::Diatonic => "diatonic",
        }
    }
}

impl FromStr for Genus {
    type Err = JintonicError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();
        Genus::ALL
            .into_iter()
            .find(|genus| genus.name() == name)
            .ok_or_else(|| JintonicError::UnknownGenus(s.to_string()))
    }
}

impl fmt::Display for Genus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Three intervals composing exactly to a perfect fourth (4:3).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tetrachord {
    intervals: [Interval; 3],
}

impl Tetrachord {
    /// Creates a tetrachord from the intervals between its successive tones.
    ///
    /// # Returns
    /// * `Err(InvalidTetrachord)` - Not exactly three intervals, or they do
    ///   not compose to 4:3
    pub fn new(intervals: &[Interval]) -> Result<Self> {
        let intervals: [Interval; 3] = intervals.try_into().map_err(|_| {
            JintonicError::InvalidTetrachord(format!(
                "expected exactly three intervals, got {}",
                intervals.len()
            ))
        })?;
        let total = intervals
            .iter()
            .try_fold(Interval::UNISON, |acc, &step| acc.compose(step))?;
        if total != FOURTH {
            return Err(JintonicError::InvalidTetrachord(format!(
                "intervals compose to {total}, not {FOURTH}"
            )));
        }
        Ok(Self { intervals })
    }

    /// Creates a tetrachord of the given genus.
    ///
    /// The characteristic interval goes on top; the remainder of the fourth
    /// is divided in two within `prime_limit`.
    pub fn from_genus(genus: Genus, prime_limit: u64) -> Result<Self> {
        let characteristic = genus.characteristic();
        let remainder = FOURTH.decompose(characteristic)?;
        let mut intervals = remainder.divisions(2, prime_limit)?;
        intervals.push(characteristic);
        Self::new(&intervals)
    }

    pub fn intervals(&self) -> &[Interval; 3] {
        &self.intervals
    }

    /// The genus, recognised by the uppermost interval. `None` means the
    /// tetrachord is non-classical.
    pub fn genus(&self) -> Option<Genus> {
        let top = self.intervals[2];
        Genus::ALL
            .into_iter()
            .find(|genus| genus.characteristic() == top)
    }

    /// The largest prime limit among the three intervals.
    pub fn prime_limit(&self) -> u64 {
        self.intervals
            .iter()
            .map(Interval::prime_limit)
            .max()
            .unwrap_or(1)
    }

    /// All six orderings of the intervals.
    pub fn permutations(&self) -> Vec<Tetrachord> {
        const ORDERS: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        ORDERS
            .iter()
            .map(|order| Tetrachord {
                intervals: order.map(|i| self.intervals[i]),
            })
            .collect()
    }
}

impl fmt::Display for Tetrachord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let genus = self.genus().map_or("non-classical", Genus::name);
        let steps: Vec<String> = self
            .intervals
            .iter()
            .map(|step| format!("{}:{}", step.denominator(), step.numerator()))
            .collect();
        write!(f, "Tetrachord({} [{}])", genus, steps.join(", "))
    }
}

/// Two disjunct tetrachords separated by a 9:8 tone, spanning an octave.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TetrachordalScale {
    lower: Tetrachord,
    upper: Tetrachord,
}

impl TetrachordalScale {
    pub fn new(lower: Tetrachord, upper: Tetrachord) -> Self {
        Self { lower, upper }
    }

    /// An equal tetrachordal scale: the same tetrachord above and below.
    pub fn equal(tetrachord: Tetrachord) -> Self {
        Self {
            lower: tetrachord.clone(),
            upper: tetrachord,
        }
    }

    pub fn lower(&self) -> &Tetrachord {
        &self.lower
    }

    pub fn upper(&self) -> &Tetrachord {
        &self.upper
    }

    pub fn set_lower(&mut self, lower: Tetrachord) {
        self.lower = lower;
    }

    pub fn set_upper(&mut self, upper: Tetrachord) {
        self.upper = upper;
    }

    /// The seven steps of the scale.
    pub fn intervals(&self) -> Vec<Interval> {
        let mut intervals = self.lower.intervals.to_vec();
        intervals.push(DISJUNCTION);
        intervals.extend_from_slice(&self.upper.intervals);
        intervals
    }

    /// The eight tones of the scale, from 1:1 to 2:1.
    pub fn tones(&self) -> Result<Vec<Interval>> {
        let intervals = self.intervals();
        let mut tones = Vec::with_capacity(intervals.len() + 1);
        let mut current = Interval::UNISON;
        tones.push(current);
        for &step in &intervals[..intervals.len() - 1] {
            current = current.compose(step)?;
            tones.push(current);
        }
        tones.push(Interval::OCTAVE);
        Ok(tones)
    }

    pub fn hertz(&self, fundamental: f64) -> Result<Vec<f64>> {
        Ok(self
            .tones()?
            .iter()
            .map(|tone| tone.scale(fundamental))
            .collect())
    }

    /// The complement of every tone. The result is no longer tetrachordal.
    pub fn complement(&self) -> Result<Scale> {
        Scale::new(self.tones()?).complement()
    }

    pub fn genera(&self) -> (Option<Genus>, Option<Genus>) {
        (self.lower.genus(), self.upper.genus())
    }

    /// Whether both tetrachords are identical.
    pub fn is_equal(&self) -> bool {
        self.lower == self.upper
    }

    pub fn prime_limit(&self) -> u64 {
        self.lower.prime_limit().max(self.upper.prime_limit())
    }

    /// All 36 combinations of lower and upper tetrachord permutations.
    pub fn permutations(&self) -> Vec<TetrachordalScale> {
        let uppers = self.upper.permutations();
        self.lower
            .permutations()
            .into_iter()
            .flat_map(|lower| {
                uppers
                    .iter()
                    .map(move |upper| TetrachordalScale::new(lower.clone(), upper.clone()))
            })
            .collect()
    }
}

impl fmt::Display for TetrachordalScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TetrachordalScale([{}])", format_tones(&self.intervals()))
    }
}
