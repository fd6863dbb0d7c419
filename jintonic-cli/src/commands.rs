//! # Command Module
//!
//! Each subcommand builds a serializable summary from the core crate. The
//! summary is rendered as plain text or as JSON, then printed by `run`.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::str::FromStr;
use tracing::info;

use jintonic_core::chord::chord_names;
use jintonic_core::{
    Genus, Interval, Lattice, LatticeChord, LatticeReport, Tetrachord, TetrachordalScale,
};

/// A lattice step vector given on the command line as `"1,0,-1"`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepVector(pub Vec<i64>);

impl FromStr for StepVector {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('[').trim_end_matches(']');
        if trimmed.trim().is_empty() {
            return Ok(Self(Vec::new()));
        }
        trimmed
            .split(',')
            .map(|component| {
                component
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| format!("invalid vector component '{}': {}", component.trim(), e))
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// Output format selected by the `--json` flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Format {
    Text,
    Json,
}

/// A command result that can be shown to the user.
pub trait Render: Serialize {
    /// Human readable form, one item per line.
    fn text(&self) -> String;
}

/// Renders `summary` in the requested format.
pub fn render<T: Render>(format: Format, summary: &T) -> Result<String> {
    match format {
        Format::Json => {
            let json = serde_json::to_string_pretty(summary).context("serializing output")?;
            Ok(format!("{json}\n"))
        }
        Format::Text => Ok(summary.text()),
    }
}

/// Renders and prints a summary to stdout.
pub fn run<T: Render>(format: Format, summary: &T) -> Result<()> {
    print!("{}", render(format, summary)?);
    Ok(())
}

fn join<T: ToString>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

#[derive(Debug, Serialize)]
pub struct IntervalSummary {
    interval: Interval,
    cents: f64,
    prime_limit: u64,
    superparticular: bool,
    base_octave: Interval,
    complement: Option<Interval>,
}

impl Render for IntervalSummary {
    fn text(&self) -> String {
        let complement = self
            .complement
            .map_or_else(|| "(larger than an octave)".to_string(), |c| c.to_string());
        format!(
            "interval:        {}\n\
             cents:           {:.3}\n\
             prime limit:     {}\n\
             superparticular: {}\n\
             base octave:     {}\n\
             complement:      {}\n",
            self.interval,
            self.cents,
            self.prime_limit,
            self.superparticular,
            self.base_octave,
            complement
        )
    }
}

pub fn describe_interval(interval: Interval) -> IntervalSummary {
    IntervalSummary {
        interval,
        cents: interval.cents(),
        prime_limit: interval.prime_limit(),
        superparticular: interval.is_superparticular(),
        base_octave: interval.base_octave(),
        complement: interval.complement().ok(),
    }
}

#[derive(Debug, Serialize)]
pub struct DivisionSummary {
    interval: Interval,
    prime_limit: Option<u64>,
    steps: Vec<Interval>,
    cents: Vec<f64>,
}

impl DivisionSummary {
    fn new(interval: Interval, prime_limit: Option<u64>, steps: Vec<Interval>) -> Self {
        Self {
            interval,
            prime_limit,
            cents: steps.iter().map(Interval::cents).collect(),
            steps,
        }
    }
}

impl Render for DivisionSummary {
    fn text(&self) -> String {
        self.steps
            .iter()
            .zip(&self.cents)
            .map(|(step, cents)| format!("{:>9}  {:>9.3} cents\n", step.to_string(), cents))
            .collect()
    }
}

pub fn divide(
    interval: Interval,
    parts: usize,
    prime_limit: u64,
    max_iterations: u32,
) -> Result<DivisionSummary> {
    let steps = interval
        .divide(parts, prime_limit, max_iterations)
        .with_context(|| format!("dividing {interval} into {parts} parts"))?;
    info!(%interval, parts, prime_limit, "divided interval");
    Ok(DivisionSummary::new(interval, Some(prime_limit), steps))
}

pub fn split(interval: Interval, parts: usize) -> Result<DivisionSummary> {
    let steps = interval
        .split(parts)
        .with_context(|| format!("splitting {interval} into {parts} parts"))?;
    Ok(DivisionSummary::new(interval, None, steps))
}

/// Options for the `lattice` subcommand.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub fundamental: f64,
    pub prime_limit: u64,
    pub absolute: bool,
    pub undo: usize,
}

/// Every position visited by a lattice walk, starting at 1:1.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct LatticeWalk {
    reports: Vec<LatticeReport>,
}

impl Render for LatticeWalk {
    fn text(&self) -> String {
        self.reports
            .iter()
            .map(|report| {
                format!(
                    "{:<12} {:>9}  {:>10.4} Hz  {:>9.3} cents\n",
                    format!("{:?}", report.position),
                    report.tone.to_string(),
                    report.hertz,
                    report.cents
                )
            })
            .collect()
    }
}

pub fn walk_lattice(options: &WalkOptions, vectors: &[StepVector]) -> Result<LatticeWalk> {
    let mut lattice = Lattice::new(options.fundamental, options.prime_limit)
        .context("creating lattice")?;
    info!(axes = ?lattice.axes(), "lattice ready");

    let mut reports = vec![lattice.report()];
    for StepVector(vector) in vectors {
        let moved = if options.absolute {
            lattice.to_node(vector)
        } else {
            lattice.traverse(vector)
        };
        moved.with_context(|| format!("moving by {vector:?}"))?;
        reports.push(lattice.report());
    }
    if options.undo > 0 {
        lattice
            .undo(options.undo)
            .with_context(|| format!("undoing {} steps", options.undo))?;
        reports.push(lattice.report());
    }
    Ok(LatticeWalk { reports })
}

#[derive(Debug, Serialize)]
pub struct ChordSummary {
    chord: LatticeChord,
    harmonics: Vec<u64>,
    identities: Vec<u64>,
    hertz: Vec<f64>,
    prime_limit: u64,
}

impl Render for ChordSummary {
    fn text(&self) -> String {
        format!(
            "{}\nharmonics:   {}\nhertz:       {}\nprime limit: {}\n",
            self.chord,
            join(&self.harmonics, ":"),
            join(&self.hertz, ", "),
            self.prime_limit
        )
    }
}

/// Options for the `chord` subcommand.
#[derive(Debug, Clone)]
pub struct ChordOptions {
    pub fundamental: f64,
    pub root: StepVector,
    pub pivot: Option<u64>,
    pub complement: bool,
}

pub fn chord(name: &str, options: &ChordOptions) -> Result<ChordSummary> {
    let mut chord = LatticeChord::from_name(options.fundamental, &options.root.0, name)
        .with_context(|| format!("building chord '{name}'"))?;
    if let Some(axis) = options.pivot {
        chord = chord.pivot(axis).with_context(|| format!("pivoting on {axis}"))?;
    }
    if options.complement {
        chord = chord.complement().context("complementing chord")?;
    }

    Ok(ChordSummary {
        harmonics: chord.harmonics()?,
        identities: chord.identities()?,
        hertz: chord.hertz()?,
        prime_limit: chord.prime_limit(),
        chord,
    })
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ChordList {
    names: Vec<&'static str>,
}

impl Render for ChordList {
    fn text(&self) -> String {
        self.names.iter().map(|name| format!("{name}\n")).collect()
    }
}

pub fn list_chords() -> ChordList {
    ChordList {
        names: chord_names().collect(),
    }
}

#[derive(Debug, Serialize)]
pub struct TetrachordSummary {
    scale: TetrachordalScale,
    intervals: Vec<Interval>,
    tones: Vec<Interval>,
    hertz: Vec<f64>,
    complement: Vec<Interval>,
    prime_limit: u64,
}

impl Render for TetrachordSummary {
    fn text(&self) -> String {
        format!(
            "lower:       {}\n\
             upper:       {}\n\
             intervals:   {}\n\
             tones:       {}\n\
             hertz:       {}\n\
             complement:  {}\n\
             prime limit: {}\n",
            self.scale.lower(),
            self.scale.upper(),
            join(&self.intervals, ", "),
            join(&self.tones, ", "),
            join(&self.hertz, ", "),
            join(&self.complement, ", "),
            self.prime_limit
        )
    }
}

pub fn tetrachord(
    lower: Genus,
    upper: Option<Genus>,
    prime_limit: u64,
    fundamental: f64,
) -> Result<TetrachordSummary> {
    if !(fundamental.is_finite() && fundamental > 0.0) {
        bail!("fundamental must be a positive frequency, got {fundamental}");
    }
    let build = |genus: Genus| {
        Tetrachord::from_genus(genus, prime_limit)
            .with_context(|| format!("building {genus} tetrachord"))
    };
    let scale = TetrachordalScale::new(build(lower)?, build(upper.unwrap_or(lower))?);

    Ok(TetrachordSummary {
        intervals: scale.intervals(),
        tones: scale.tones()?,
        hertz: scale.hertz(fundamental)?,
        complement: scale.complement()?.tones().to_vec(),
        prime_limit: scale.prime_limit(),
        scale,
    })
}
