//! Game configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::countdown::DEFAULT_ROUND_SECONDS;
use crate::expression::Difficulty;
use crate::round::{RoundBuilder, DEFAULT_MAX_ATTEMPTS};
use crate::session::GameMode;

/// Top-level mathrank configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathrankConfig {
    /// Mode used when none is given on the command line.
    #[serde(default = "default_mode")]
    pub default_mode: GameMode,
    /// Difficulty used when none is given on the command line.
    #[serde(default = "default_difficulty")]
    pub default_difficulty: Difficulty,
    /// Seconds on the clock for each round.
    #[serde(default = "default_round_seconds")]
    pub round_seconds: u32,
    /// Pause between a forced submit and the next round, in milliseconds.
    #[serde(default = "default_advance_delay")]
    pub advance_delay_ms: u64,
    /// Cap on generator draws per round.
    #[serde(default = "default_max_attempts")]
    pub max_generation_attempts: usize,
    /// Fixed RNG seed for reproducible games.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Where session reports are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_mode() -> GameMode {
    GameMode::Main
}
fn default_difficulty() -> Difficulty {
    Difficulty::Medium
}
fn default_round_seconds() -> u32 {
    DEFAULT_ROUND_SECONDS
}
fn default_advance_delay() -> u64 {
    500
}
fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./mathrank-results")
}

impl Default for MathrankConfig {
    fn default() -> Self {
        Self {
            default_mode: default_mode(),
            default_difficulty: default_difficulty(),
            round_seconds: default_round_seconds(),
            advance_delay_ms: default_advance_delay(),
            max_generation_attempts: default_max_attempts(),
            seed: None,
            output_dir: default_output_dir(),
        }
    }
}

impl MathrankConfig {
    pub fn round_builder(&self) -> RoundBuilder {
        RoundBuilder::new().with_max_attempts(self.max_generation_attempts)
    }

    /// Apply `MATHRANK_SEED`, `MATHRANK_MODE` and `MATHRANK_DIFFICULTY`.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(seed) = std::env::var("MATHRANK_SEED") {
            self.seed = Some(
                seed.trim()
                    .parse()
                    .with_context(|| format!("invalid MATHRANK_SEED: '{seed}'"))?,
            );
        }
        if let Ok(mode) = std::env::var("MATHRANK_MODE") {
            self.default_mode = mode.parse().map_err(anyhow::Error::msg)?;
        }
        if let Ok(difficulty) = std::env::var("MATHRANK_DIFFICULTY") {
            self.default_difficulty = difficulty.parse().map_err(anyhow::Error::msg)?;
        }
        Ok(())
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `mathrank.toml` in the current directory
/// 2. `~/.config/mathrank/config.toml`
///
/// Environment variable overrides: `MATHRANK_SEED`, `MATHRANK_MODE`, `MATHRANK_DIFFICULTY`.
pub fn load_config() -> Result<MathrankConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<MathrankConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("mathrank.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => parse_config_file(&path)?,
        None => MathrankConfig::default(),
    };
    config.apply_env_overrides()?;

    anyhow::ensure!(config.round_seconds >= 1, "round_seconds must be at least 1");
    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<MathrankConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<MathrankConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mathrank"))
}
