// Configuration module for reading Isolation.toml
// This module provides OOP-style configuration management for the isolation agents

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::heuristics::Heuristic;
use crate::player::AgentKind;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub search: SearchConfig,
    pub timing: TimingConfig,
    pub board: BoardConfig,
    pub agent: AgentConfig,
    pub debug: DebugConfig,
}

/// Search parameters owned by a player
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SearchConfig {
    /// Plies searched by the fixed-depth minimax player
    pub search_depth: u32,
    /// Minimum milliseconds that must remain for the search to keep recursing
    pub timer_threshold_ms: f64,
    pub heuristic: Heuristic,
    /// Optional cap for iterative deepening; unset means "until cancelled"
    #[serde(default)]
    pub max_depth: Option<u32>,
}

impl SearchConfig {
    /// Checks the invariants the engines rely on
    pub fn validate(&self) -> Result<(), String> {
        if self.search_depth == 0 {
            return Err("search.search_depth must be at least 1".to_string());
        }
        if !(self.timer_threshold_ms > 0.0) {
            return Err(format!(
                "search.timer_threshold_ms must be positive, got {}",
                self.timer_threshold_ms
            ));
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            search_depth: 3,
            timer_threshold_ms: 10.0,
            heuristic: Heuristic::DistanceRatio,
            max_depth: None,
        }
    }
}

/// Turn clock used by the command-line driver
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TimingConfig {
    pub turn_time_limit_ms: u64,
}

/// Dimensions of a freshly created board
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
}

/// Which agent the driver runs
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AgentConfig {
    pub kind: AgentKind,
    #[serde(default)]
    pub random_seed: Option<u64>,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Isolation.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed and validated configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Isolation.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Isolation.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Isolation.toml
    pub fn default_hardcoded() -> Self {
        Config {
            search: SearchConfig::default(),
            timing: TimingConfig {
                turn_time_limit_ms: 150,
            },
            board: BoardConfig {
                width: 7,
                height: 7,
            },
            agent: AgentConfig {
                kind: AgentKind::AlphaBeta,
                random_seed: None,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "isolation_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Isolation.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }

    /// Validates cross-section invariants
    pub fn validate(&self) -> Result<(), String> {
        self.search.validate()?;

        if self.board.width == 0 || self.board.height == 0 {
            return Err(format!(
                "board dimensions must be positive, got {}x{}",
                self.board.width, self.board.height
            ));
        }

        if (self.timing.turn_time_limit_ms as f64) <= self.search.timer_threshold_ms {
            return Err(format!(
                "timing.turn_time_limit_ms ({}) must exceed search.timer_threshold_ms ({})",
                self.timing.turn_time_limit_ms, self.search.timer_threshold_ms
            ));
        }

        Ok(())
    }
}
