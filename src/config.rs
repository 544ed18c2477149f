use crate::app_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Tunables for the per-word score formulas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    /// Lower bound on spawn-to-first-key seconds.
    pub creation_floor_secs: f64,
    /// Lower bound on first-to-last-key seconds.
    pub typing_floor_secs: f64,
    /// `k` in `1 + k * len / typing_secs`.
    pub speed_constant: f64,
    /// Multiplier for the miss penalty `len / fall_speed`.
    pub penalty_factor: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            creation_floor_secs: 0.3,
            typing_floor_secs: 0.1,
            speed_constant: 0.3,
            penalty_factor: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub enemies: u32,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub start_level: usize,
    pub max_level: usize,
    pub level_step: i64,
    pub fps: u32,
    pub strict_focus: bool,
    pub log_results: bool,
    pub persist_words: bool,
    pub word_list: Option<PathBuf>,
    pub scoring: ScoringConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enemies: 50,
            min_delay_ms: 1000,
            max_delay_ms: 3000,
            start_level: 3,
            max_level: 9,
            level_step: 100,
            fps: 60,
            strict_focus: true,
            log_results: true,
            persist_words: false,
            word_list: None,
            scoring: ScoringConfig::default(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("spawn delay range {min}..{max} ms is invalid")]
    InvalidDelayRange { min: u64, max: u64 },
    #[error("level range {start}..={max} is invalid")]
    InvalidLevelRange { start: usize, max: usize },
    #[error("frame rate must be positive")]
    ZeroFrameRate,
    #[error("at least one enemy is required")]
    ZeroEnemies,
    #[error("level step must be positive")]
    NonPositiveLevelStep,
    #[error("scoring time floors must be positive")]
    NonPositiveFloor,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_delay_ms == 0 || self.min_delay_ms > self.max_delay_ms {
            return Err(ConfigError::InvalidDelayRange {
                min: self.min_delay_ms,
                max: self.max_delay_ms,
            });
        }
        if self.start_level == 0 || self.start_level > self.max_level {
            return Err(ConfigError::InvalidLevelRange {
                start: self.start_level,
                max: self.max_level,
            });
        }
        if self.fps == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }
        if self.enemies == 0 {
            return Err(ConfigError::ZeroEnemies);
        }
        if self.level_step <= 0 {
            return Err(ConfigError::NonPositiveLevelStep);
        }
        if self.scoring.creation_floor_secs <= 0.0 || self.scoring.typing_floor_secs <= 0.0 {
            return Err(ConfigError::NonPositiveFloor);
        }
        Ok(())
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("wordfall_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => log::warn!("ignoring unreadable config {}: {e}", self.path.display()),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
