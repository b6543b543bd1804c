//! Game configuration.
//!
//! Loaded once at startup from `rally.toml` in the working directory when
//! present, otherwise defaults. Timing values tune difficulty; geometry and
//! key bindings are fixed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::Error;

/// Default config file looked up next to the working directory.
pub const CONFIG_FILE: &str = "rally.toml";

/// Tunable game parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Highest level; clearing it wins the round for the player.
    pub max_level: u32,
    /// Consecutive player hits required to clear a level.
    pub rally_hits: u32,
    /// Base ball tick in milliseconds; scaled down as levels rise.
    pub ball_gap_ms: u64,
    /// Fixed AI tick in milliseconds, independent of level.
    pub ai_gap_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_level: 5,
            rally_hits: 8,
            ball_gap_ms: 16,
            ai_gap_ms: 60,
        }
    }
}

impl Config {
    /// Load `rally.toml` from the working directory, or defaults if absent.
    pub fn load() -> Result<Self, Error> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load a specific config file, or defaults if it does not exist.
    ///
    /// A file that exists but fails to read or parse is a startup error;
    /// silently playing with defaults after a typo would be worse.
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: PathBuf::from(path),
            reason: e.to_string(),
        })?;
        let config: Self = toml::from_str(&raw).map_err(|e| Error::Config {
            path: PathBuf::from(path),
            reason: e.to_string(),
        })?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Fixed AI tick interval.
    pub const fn ai_tick(&self) -> Duration {
        Duration::from_millis(self.ai_gap_ms)
    }

    /// Ball tick interval for a level: `ball_gap_ms * (max_level - 1 - level)`,
    /// floored at one base gap so the top level keeps a sane tick.
    pub fn ball_tick(&self, level: u32) -> Duration {
        let scale = self
            .max_level
            .saturating_sub(level.saturating_add(1))
            .max(1);
        Duration::from_millis(self.ball_gap_ms * u64::from(scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_level, 5);
        assert_eq!(config.rally_hits, 8);
    }

    #[test]
    fn test_ball_tick_shrinks_with_level() {
        let config = Config::default();
        let mut last = Duration::MAX;
        for level in 0..config.max_level - 1 {
            let tick = config.ball_tick(level);
            assert!(tick < last, "level {level} must tick faster than the one below");
            last = tick;
        }
    }

    #[test]
    fn test_ball_tick_floored_at_base_gap() {
        let config = Config::default();
        let base = Duration::from_millis(config.ball_gap_ms);
        assert_eq!(config.ball_tick(config.max_level - 1), base);
        assert_eq!(config.ball_tick(config.max_level), base);
        assert_eq!(config.ball_tick(config.max_level + 7), base);
    }

    #[test]
    fn test_missing_file_is_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/rally.toml")).unwrap();
        assert_eq!(config.max_level, Config::default().max_level);
    }

    #[test]
    fn test_parse() {
        let config: Config =
            toml::from_str("max_level = 9\nrally_hits = 3\n").unwrap();
        assert_eq!(config.max_level, 9);
        assert_eq!(config.rally_hits, 3);
        // Unspecified fields keep their defaults
        assert_eq!(config.ball_gap_ms, Config::default().ball_gap_ms);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(toml::from_str::<Config>("ball_speed = 1\n").is_err());
    }
}
