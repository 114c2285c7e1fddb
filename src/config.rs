// Configuration module for reading Pursuit.toml

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::layout::{Layout, LayoutError};
use crate::search::SearchLimits;
use crate::types::Coord;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "Pursuit.toml";

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub timing: TimingConfig,
    pub strategy: StrategyConfig,
    pub game: GameConfig,
    pub layout: LayoutConfig,
    pub debug: DebugConfig,
}

/// Time and depth limits
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    /// Wall-clock budget for one seeker decision
    pub decision_budget_ms: u64,
    /// Wall-clock limit for the whole game
    pub game_time_limit_ms: u64,
    pub max_search_depth: u8,
    /// Poll the deadline inside an iteration, not only between iterations
    pub hard_deadline: bool,
}

impl TimingConfig {
    pub fn decision_budget(&self) -> Duration {
        Duration::from_millis(self.decision_budget_ms)
    }

    pub fn game_time_limit(&self) -> Duration {
        Duration::from_millis(self.game_time_limit_ms)
    }
}

/// Search execution strategy
#[derive(Debug, Deserialize, Clone)]
pub struct StrategyConfig {
    pub parallel_root: bool,
    pub min_cpus_for_parallel: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GameConfig {
    /// Seeds pursuer movement and random layouts
    pub seed: u64,
}

/// Starting layout, either spelled out or generated
#[derive(Debug, Deserialize, Clone)]
pub struct LayoutConfig {
    pub random: bool,
    pub rows: usize,
    pub cols: usize,
    #[serde(default)]
    pub obstacles: Vec<Coord>,
    pub seeker: Coord,
    #[serde(default)]
    pub targets: Vec<Coord>,
    #[serde(default)]
    pub pursuers: Vec<Coord>,
    #[serde(default)]
    pub num_obstacles: usize,
    #[serde(default)]
    pub num_targets: usize,
    #[serde(default)]
    pub num_pursuers: usize,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::FileRead {
            path: path.as_ref().to_path_buf(),
            source,
        })?;

        Ok(toml::from_str(&contents)?)
    }

    /// Loads default configuration from Pursuit.toml in the working directory
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::from_file(DEFAULT_CONFIG_PATH)
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Pursuit.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                decision_budget_ms: 200,
                game_time_limit_ms: 3000,
                max_search_depth: 3,
                hard_deadline: false,
            },
            strategy: StrategyConfig {
                parallel_root: false,
                min_cpus_for_parallel: 2,
            },
            game: GameConfig { seed: 2024 },
            layout: LayoutConfig {
                random: false,
                rows: 9,
                cols: 18,
                obstacles: vec![Coord::new(1, 1), Coord::new(2, 2)],
                seeker: Coord::new(5, 0),
                targets: vec![Coord::new(1, 2), Coord::new(3, 3)],
                pursuers: vec![Coord::new(8, 17)],
                num_obstacles: 2,
                num_targets: 2,
                num_pursuers: 1,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "pursuit_turns.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!(
                "Could not load {} ({}), using hardcoded defaults",
                DEFAULT_CONFIG_PATH,
                e
            );
            Self::default_hardcoded()
        })
    }

    /// Per-decision search limits.
    ///
    /// Parallel root search is only enabled when the rayon pool has at least
    /// `min_cpus_for_parallel` threads.
    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_depth: self.timing.max_search_depth,
            time_budget: self.timing.decision_budget(),
            hard_deadline: self.timing.hard_deadline,
            parallel_root: self.strategy.parallel_root
                && rayon::current_num_threads() >= self.strategy.min_cpus_for_parallel,
        }
    }

    /// Starting layout: the explicit one, or one generated from `game.seed`
    pub fn starting_layout(&self) -> Result<Layout, LayoutError> {
        let layout = &self.layout;
        if layout.random {
            let mut rng = StdRng::seed_from_u64(self.game.seed);
            Layout::random(
                layout.rows,
                layout.cols,
                layout.num_obstacles,
                layout.num_targets,
                layout.num_pursuers,
                &mut rng,
            )
        } else {
            Ok(Layout {
                rows: layout.rows,
                cols: layout.cols,
                obstacles: layout.obstacles.clone(),
                seeker: layout.seeker,
                targets: layout.targets.clone(),
                pursuers: layout.pursuers.clone(),
            })
        }
    }
}
