//! Command-line arguments, the optional TOML file and their merged result.

use std::{
    fs,
    path::{Path, PathBuf},
};

use algoview_core::AlgorithmKind;
use algoview_system_pacing::{clamp_speed, TICKS_PER_SECOND};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

const DEFAULT_WIDTH: usize = 41;
const DEFAULT_HEIGHT: usize = 21;
const DEFAULT_SPEED: f64 = 1.0;
const DEFAULT_MAX_TICKS: u64 = 1_000_000;

/// Algorithms selectable from the command line or the configuration file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum Algorithm {
    /// Randomized depth-first maze generation.
    Maze,
    /// Breadth-first search.
    Bfs,
    /// Breadth-first search from both endpoints.
    BidirectionalBfs,
    /// A* search.
    AStar,
}

impl From<Algorithm> for AlgorithmKind {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Maze => AlgorithmKind::MazeGeneration,
            Algorithm::Bfs => AlgorithmKind::Bfs,
            Algorithm::BidirectionalBfs => AlgorithmKind::BidirectionalBfs,
            Algorithm::AStar => AlgorithmKind::AStar,
        }
    }
}

/// Runs grid algorithms headlessly and prints the resulting grid.
#[derive(Debug, Default, Parser)]
#[command(name = "algoview", version, about = "Step through maze and path algorithms")]
pub(crate) struct Args {
    /// Number of grid columns.
    #[arg(long)]
    width: Option<usize>,
    /// Number of grid rows.
    #[arg(long)]
    height: Option<usize>,
    /// Algorithm steps per tick.
    #[arg(long)]
    speed: Option<f64>,
    /// Ticks in one schedule cycle.
    #[arg(long)]
    ticks_per_second: Option<usize>,
    /// Seed for maze generation; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Algorithms to run in order, separated by commas.
    #[arg(long, value_enum, value_delimiter = ',')]
    algorithm: Vec<Algorithm>,
    /// Upper bound on ticks spent in a single run.
    #[arg(long)]
    max_ticks: Option<u64>,
    /// TOML file providing defaults for the options above.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the grid after every tick.
    #[arg(long)]
    frames: bool,
}

/// Contents of the optional configuration file.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    width: Option<usize>,
    height: Option<usize>,
    speed: Option<f64>,
    ticks_per_second: Option<usize>,
    seed: Option<u64>,
    algorithms: Option<Vec<Algorithm>>,
    max_ticks: Option<u64>,
    frames: Option<bool>,
}

impl FileConfig {
    /// Reads and parses a configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse configuration toml contents")
    }
}

/// Problems with otherwise well-formed settings.
#[derive(Clone, Debug, Error, PartialEq)]
pub(crate) enum ConfigError {
    /// The tick cycle has no slots.
    #[error("ticks per second must be at least 1")]
    ZeroTickRate,
    /// Nothing was requested.
    #[error("at least one algorithm must be selected")]
    NoAlgorithms,
    /// No tick budget was granted.
    #[error("max ticks must be at least 1")]
    ZeroTickBudget,
}

/// Settings after merging the file with the command line.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) speed: f64,
    pub(crate) ticks_per_second: usize,
    pub(crate) seed: Option<u64>,
    pub(crate) algorithms: Vec<AlgorithmKind>,
    pub(crate) max_ticks: u64,
    pub(crate) frames: bool,
}

impl Settings {
    /// Loads the configuration file named by `args`, if any, and merges it.
    pub(crate) fn from_args(args: Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::merge(args, file)?)
    }

    /// Command-line values take precedence over the file.
    fn merge(args: Args, file: FileConfig) -> Result<Self, ConfigError> {
        let algorithms = if args.algorithm.is_empty() {
            file.algorithms
                .unwrap_or_else(|| vec![Algorithm::Maze, Algorithm::AStar])
        } else {
            args.algorithm
        };
        if algorithms.is_empty() {
            return Err(ConfigError::NoAlgorithms);
        }

        let ticks_per_second = args
            .ticks_per_second
            .or(file.ticks_per_second)
            .unwrap_or(TICKS_PER_SECOND);
        if ticks_per_second == 0 {
            return Err(ConfigError::ZeroTickRate);
        }

        let max_ticks = args
            .max_ticks
            .or(file.max_ticks)
            .unwrap_or(DEFAULT_MAX_TICKS);
        if max_ticks == 0 {
            return Err(ConfigError::ZeroTickBudget);
        }

        let requested = args.speed.or(file.speed).unwrap_or(DEFAULT_SPEED);
        let speed = clamp_speed(requested);
        if speed != requested {
            warn!(requested, speed, "speed clamped into the supported range");
        }

        Ok(Self {
            width: args.width.or(file.width).unwrap_or(DEFAULT_WIDTH),
            height: args.height.or(file.height).unwrap_or(DEFAULT_HEIGHT),
            speed,
            ticks_per_second,
            seed: args.seed.or(file.seed),
            algorithms: algorithms.into_iter().map(AlgorithmKind::from).collect(),
            max_ticks,
            frames: args.frames || file.frames.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_generate_a_maze_then_solve_it() {
        let settings = Settings::merge(Args::default(), FileConfig::default())
            .expect("defaults are valid");

        assert_eq!(settings.width, DEFAULT_WIDTH);
        assert_eq!(settings.height, DEFAULT_HEIGHT);
        assert_eq!(settings.ticks_per_second, TICKS_PER_SECOND);
        assert_eq!(
            settings.algorithms,
            vec![AlgorithmKind::MazeGeneration, AlgorithmKind::AStar]
        );
        assert!(!settings.frames);
    }

    #[test]
    fn file_values_fill_in_missing_arguments() {
        let file = FileConfig::parse(
            r#"
            width = 12
            height = 8
            speed = 2.5
            seed = 42
            algorithms = ["maze", "bidirectional-bfs"]
            frames = true
            "#,
        )
        .expect("valid toml");
        let args = Args::parse_from(["algoview", "--width", "30", "--algorithm", "bfs,a-star"]);

        let settings = Settings::merge(args, file).expect("valid settings");
        assert_eq!(settings.width, 30);
        assert_eq!(settings.height, 8);
        assert_eq!(settings.speed, 2.5);
        assert_eq!(settings.seed, Some(42));
        assert_eq!(
            settings.algorithms,
            vec![AlgorithmKind::Bfs, AlgorithmKind::AStar]
        );
        assert!(settings.frames);
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(FileConfig::parse("colour = \"red\"").is_err());
        assert!(FileConfig::parse("algorithms = [\"dijkstra\"]").is_err());
    }

    #[test]
    fn speed_is_clamped() {
        let args = Args::parse_from(["algoview", "--speed", "500"]);
        let settings = Settings::merge(args, FileConfig::default()).expect("valid settings");
        assert_eq!(settings.speed, 30.0);
    }

    #[test]
    fn degenerate_settings_are_rejected() {
        let args = Args::parse_from(["algoview", "--ticks-per-second", "0"]);
        assert_eq!(
            Settings::merge(args, FileConfig::default()),
            Err(ConfigError::ZeroTickRate)
        );

        let file = FileConfig::parse("algorithms = []").expect("valid toml");
        assert_eq!(
            Settings::merge(Args::default(), file),
            Err(ConfigError::NoAlgorithms)
        );

        let args = Args::parse_from(["algoview", "--max-ticks", "0"]);
        assert_eq!(
            Settings::merge(args, FileConfig::default()),
            Err(ConfigError::ZeroTickBudget)
        );
    }
}
