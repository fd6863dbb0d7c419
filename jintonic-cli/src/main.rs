//! # Jintonic - Just Intonation Command Line
//!
//! Front end over `jintonic-core`. Every subcommand prints a human readable
//! summary, or pretty JSON when `--json` is given.
//!
//! ## Logging
//! - Diagnostics go to stderr through `tracing-subscriber`
//! - `RUST_LOG` is honoured unless `-v` / `-vv` is passed

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::{ChordOptions, Format, StepVector, WalkOptions};
use jintonic_core::{DEFAULT_MAX_ITERATIONS, DEFAULT_PRIME_LIMIT, Genus, Interval};

/// Frequency of 1:1 when none is given.
const DEFAULT_FUNDAMENTAL: f64 = 60.0;

#[derive(Parser, Debug)]
#[command(name = "jintonic")]
#[command(author, version, about = "Just intonation intervals, lattices, chords and scales")]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Describe a single interval, e.g. `3/2` or `5:4`
    Interval {
        ratio: Interval,
    },

    /// Divide an interval into steps within a prime limit
    Divide {
        ratio: Interval,
        parts: usize,

        #[arg(short = 'l', long, default_value_t = DEFAULT_PRIME_LIMIT)]
        prime_limit: u64,

        #[arg(short = 'i', long, default_value_t = DEFAULT_MAX_ITERATIONS)]
        max_iterations: u32,
    },

    /// Split an interval into equal-difference steps
    Split {
        ratio: Interval,
        parts: usize,
    },

    /// Walk the prime lattice by step vectors such as `1,0,-1`
    Lattice {
        #[arg(allow_hyphen_values = true)]
        vectors: Vec<StepVector>,

        #[arg(short, long, default_value_t = DEFAULT_FUNDAMENTAL)]
        fundamental: f64,

        #[arg(short = 'l', long, default_value_t = DEFAULT_PRIME_LIMIT)]
        prime_limit: u64,

        /// Treat each vector as an absolute coordinate
        #[arg(short, long)]
        absolute: bool,

        /// Undo this many steps after walking
        #[arg(short, long, default_value_t = 0)]
        undo: usize,
    },

    /// Build a named chord on the 7-limit lattice
    Chord {
        name: String,

        #[arg(short, long, default_value = "0,0,0", allow_hyphen_values = true)]
        root: StepVector,

        #[arg(short, long, default_value_t = DEFAULT_FUNDAMENTAL)]
        fundamental: f64,

        /// Reflect every node about the prime axis (3, 5 or 7)
        #[arg(short, long)]
        pivot: Option<u64>,

        /// Reflect the chord through its root
        #[arg(short, long)]
        complement: bool,
    },

    /// List the named chords
    Chords,

    /// Build a tetrachordal scale from one or two genera
    Tetrachord {
        genus: Genus,

        /// Genus of the upper tetrachord, defaults to the lower one
        #[arg(long)]
        upper: Option<Genus>,

        #[arg(short = 'l', long, default_value_t = DEFAULT_PRIME_LIMIT)]
        prime_limit: u64,

        #[arg(short, long, default_value_t = DEFAULT_FUNDAMENTAL)]
        fundamental: f64,
    },
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!(?cli, "parsed arguments");

    let format = if cli.json { Format::Json } else { Format::Text };

    match cli.command {
        Command::Interval { ratio } => commands::run(format, &commands::describe_interval(ratio)),
        Command::Divide {
            ratio,
            parts,
            prime_limit,
            max_iterations,
        } => commands::run(
            format,
            &commands::divide(ratio, parts, prime_limit, max_iterations)?,
        ),
        Command::Split { ratio, parts } => commands::run(format, &commands::split(ratio, parts)?),
        Command::Lattice {
            vectors,
            fundamental,
            prime_limit,
            absolute,
            undo,
        } => {
            let options = WalkOptions {
                fundamental,
                prime_limit,
                absolute,
                undo,
            };
            commands::run(format, &commands::walk_lattice(&options, &vectors)?)
        }
        Command::Chord {
            name,
            root,
            fundamental,
            pivot,
            complement,
        } => {
            let options = ChordOptions {
                fundamental,
                root,
                pivot,
                complement,
            };
            commands::run(format, &commands::chord(&name, &options)?)
        }
        Command::Chords => commands::run(format, &commands::list_chords()),
        Command::Tetrachord {
            genus,
            upper,
            prime_limit,
            fundamental,
        } => commands::run(
            format,
            &commands::tetrachord(genus, upper, prime_limit, fundamental)?,
        ),
    }
}
