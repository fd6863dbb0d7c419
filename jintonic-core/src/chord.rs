//! # Lattice Chord Module
//!
//! Chords described as lattice coordinates: a root node plus the nodes of
//! each constituent tone, all measured from the root.
//!
//! ## Features
//! - Static table of conventional chord names (triads, sevenths, ninths,
//!   and a few otonal clusters)
//! - Transposition, pivoting on a prime axis, and complementation
//! - Harmonic segments, tone identities, and pitches in Hertz

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{JintonicError, Result};
use crate::harmonics::{harmonic_segment_to_identities, tones_to_harmonic_segment};
use crate::interval::Interval;
use crate::lattice::Lattice;

/// Constituent nodes (relative to the root) for each conventional chord name.
///
/// Vectors are ordered along the 3, 5 and 7 axes.
static CHORD_NODES: Lazy<BTreeMap<&'static str, Vec<Vec<i64>>>> = Lazy::new(|| {
    BTreeMap::from([
        ("sub-minor triad", vec![vec![1, 0, 0], vec![-1, 0, 1]]),
        ("minor triad", vec![vec![1, -1, 0], vec![1, 0, 0]]),
        ("diminished triad", vec![vec![1, -1, 0], vec![0, -1, 1]]),
        ("major triad", vec![vec![0, 1, 0], vec![1, 0, 0]]),
        (
            "sub-minor seventh",
            vec![vec![-1, 0, 1], vec![1, 0, 0], vec![0, 0, 1]],
        ),
        (
            "minor seventh",
            vec![vec![1, -1, 0], vec![1, 0, 0], vec![2, -1, 0]],
        ),
        (
            "half-diminished seventh",
            vec![vec![1, -1, 0], vec![0, -1, 1], vec![2, -1, 0]],
        ),
        (
            "major seventh",
            vec![vec![0, 1, 0], vec![1, 0, 0], vec![1, 1, 0]],
        ),
        (
            "super-major seventh",
            vec![vec![2, 0, -1], vec![1, 0, 0], vec![3, 0, -1]],
        ),
        (
            "dominant seventh",
            vec![vec![0, 1, 0], vec![1, 0, 0], vec![1, 1, 0], vec![0, 0, 1]],
        ),
        (
            "added second",
            vec![vec![0, 1, 0], vec![1, 0, 0], vec![2, -1, 0]],
        ),
        (
            "minor ninth",
            vec![vec![1, -1, 0], vec![1, 0, 0], vec![2, -1, 0], vec![2, 0, 0]],
        ),
        (
            "major ninth",
            vec![vec![0, 1, 0], vec![1, 0, 0], vec![1, 1, 0], vec![2, 0, 0]],
        ),
        (
            "dominant ninth",
            vec![vec![0, 1, 0], vec![1, 0, 0], vec![0, 0, 1], vec![2, 0, 0]],
        ),
        ("4-6-7", vec![vec![1, 0, 0], vec![0, 0, 1]]),
        ("5-7-9", vec![vec![0, -1, 1], vec![2, -1, 0]]),
    ])
});

/// All chord names accepted by [`LatticeChord::from_name`], sorted.
pub fn chord_names() -> impl Iterator<Item = &'static str> {
    CHORD_NODES.keys().copied()
}

/// A chord built from lattice coordinates in a 7-limit lattice.
///
/// Tones are resolved once at construction, so a chord is immutable and
/// every derived view (harmonics, identities, Hertz) reads the same tones.
#[derive(Debug, Clone, Serialize)]
pub struct LatticeChord {
    fundamental: f64,
    root: Vec<i64>,
    nodes: Vec<Vec<i64>>,
    tones: Vec<Interval>,
}

impl LatticeChord {
    /// Creates a chord.
    ///
    /// # Arguments
    /// * `fundamental` - The lattice's 1:1 in Hertz
    /// * `root` - Lattice node of the chord's root
    /// * `nodes` - Node of each constituent tone, relative to the root
    pub fn new(fundamental: f64, root: &[i64], nodes: &[Vec<i64>]) -> Result<Self> {
        let mut lattice = Lattice::with_fundamental(fundamental)?;
        let width = lattice.axes().len();

        let mut tones = Vec::with_capacity(nodes.len() + 1);
        tones.push(lattice.to_node(root)?.tone());
        for node in nodes {
            tones.push(lattice.to_node(root)?.traverse(node)?.tone());
        }

        let pad = |vector: &[i64]| {
            let mut padded = vector.to_vec();
            padded.resize(width, 0);
            padded
        };
        Ok(Self {
            fundamental,
            root: pad(root),
            nodes: nodes.iter().map(|node| pad(node)).collect(),
            tones,
        })
    }

    /// Creates a chord from a conventional name such as `"minor triad"`.
    ///
    /// Names are matched case-insensitively; see [`chord_names`].
    pub fn from_name(fundamental: f64, root: &[i64], name: &str) -> Result<Self> {
        let key = name.trim().to_lowercase();
        let nodes = CHORD_NODES
            .get(key.as_str())
            .ok_or_else(|| JintonicError::UnknownChord(name.to_string()))?;
        Self::new(fundamental, root, nodes)
    }

    /// The same chord built on another root node.
    pub fn transpose(&self, root: &[i64]) -> Result<Self> {
        Self::new(self.fundamental, root, &self.nodes)
    }

    /// Mirrors every constituent node along the axis of `axis` (a prime).
    pub fn pivot(&self, axis: u64) -> Result<Self> {
        let prime_limit = self.prime_limit();
        if axis > prime_limit {
            return Err(JintonicError::AxisAboveLimit { axis, prime_limit });
        }
        let lattice = Lattice::with_fundamental(self.fundamental)?;
        let index = lattice
            .axes()
            .iter()
            .position(|&prime| prime == axis)
            .ok_or(JintonicError::UnknownAxis(axis))?;

        let nodes: Vec<Vec<i64>> = self
            .nodes
            .iter()
            .map(|node| {
                let mut node = node.clone();
                node[index] = -node[index];
                node
            })
            .collect();
        Self::new(self.fundamental, &self.root, &nodes)
    }

    /// The chord with every node's relationship to the root inverted.
    pub fn complement(&self) -> Result<Self> {
        let nodes: Vec<Vec<i64>> = self
            .nodes
            .iter()
            .map(|node| {
                self.root
                    .iter()
                    .zip(node)
                    .map(|(root, step)| root - step)
                    .collect()
            })
            .collect();
        Self::new(self.fundamental, &self.root, &nodes)
    }

    pub fn fundamental(&self) -> f64 {
        self.fundamental
    }

    pub fn root(&self) -> &[i64] {
        &self.root
    }

    pub fn nodes(&self) -> &[Vec<i64>] {
        &self.nodes
    }

    /// The root tone followed by each constituent tone, all above 1:1.
    pub fn tones(&self) -> &[Interval] {
        &self.tones
    }

    /// The largest prime limit among the chord's tones.
    pub fn prime_limit(&self) -> u64 {
        self.tones
            .iter()
            .map(Interval::prime_limit)
            .max()
            .unwrap_or(1)
    }

    /// Relative frequencies of the tones as a harmonic segment.
    pub fn harmonics(&self) -> Result<Vec<u64>> {
        tones_to_harmonic_segment(&self.tones, false)
    }

    /// Tone identities (odd parts) of the harmonic segment.
    pub fn identities(&self) -> Result<Vec<u64>> {
        Ok(harmonic_segment_to_identities(&self.harmonics()?))
    }

    /// Pitches in Hertz, each tone raised by octaves until it is not below
    /// the previous one.
    pub fn hertz(&self) -> Result<Vec<f64>> {
        let mut stacked: Vec<Interval> = Vec::with_capacity(self.tones.len());
        for &tone in &self.tones {
            let mut tone = tone;
            if let Some(&previous) = stacked.last() {
                while tone < previous {
                    tone = tone.compose(Interval::OCTAVE)?;
                }
            }
            stacked.push(tone);
        }
        Ok(stacked
            .iter()
            .map(|tone| tone.scale(self.fundamental))
            .collect())
    }
}

impl fmt::Display for LatticeChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tones: Vec<String> = self.tones.iter().map(Interval::to_string).collect();
        let identities = match self.identities() {
            Ok(identities) => identities
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join("-"),
            Err(_) => "?".to_string(),
        };
        write!(
            f,
            "LatticeChord({} Hz, [{}], [{}])",
            self.fundamental,
            tones.join(", "),
            identities
        )
    }
}
