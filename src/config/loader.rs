//! Configuration file loading with precedence handling.

use super::ScrollerConfig;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CDRSCROLL_CONFIG";
/// Environment variable overriding the assumed row height.
pub const ROW_HEIGHT_ENV: &str = "CDRSCROLL_ROW_HEIGHT";
/// Environment variable enabling debug diagnostics.
pub const DEBUG_ENV: &str = "CDRSCROLL_DEBUG";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// One or more values are out of range.
    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/cdrscroll/config.toml`.
///
/// ```toml
/// row_height = 44
/// buffer_size = 12
/// fixed_row_height = false
/// debug = true
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Assumed row height in pixels.
    #[serde(default)]
    pub row_height: Option<f64>,

    /// Base buffer in rows.
    #[serde(default)]
    pub buffer_size: Option<usize>,

    /// Scroll throttle in milliseconds.
    #[serde(default)]
    pub scroll_throttle_ms: Option<u64>,

    /// Disable runtime row-height measurement.
    #[serde(default)]
    pub fixed_row_height: Option<bool>,

    /// Renders between row-height samples.
    #[serde(default)]
    pub measure_every: Option<u32>,

    /// Renders between throttled host notifications.
    #[serde(default)]
    pub notify_every: Option<u32>,

    /// Pool capacity in viewport screens.
    #[serde(default)]
    pub pool_screens_cap: Option<u32>,

    /// Adapt buffer and throttle to the dataset size.
    #[serde(default)]
    pub adaptive_buffer: Option<bool>,

    /// Emit debug diagnostics.
    #[serde(default)]
    pub debug: Option<bool>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Scroller tuning.
    pub scroller: ScrollerConfig,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            scroller: ScrollerConfig::default(),
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/cdrscroll/cdrscroll.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("cdrscroll").join("cdrscroll.log")
    } else {
        PathBuf::from("cdrscroll.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
/// Returns `Err` if file exists but cannot be read or parsed.
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/cdrscroll/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cdrscroll").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (like CLI `--config`)
/// 2. `CDRSCROLL_CONFIG` environment variable
/// 3. Default path `~/.config/cdrscroll/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `CDRSCROLL_ROW_HEIGHT`: Override assumed row height (ignored unless a number)
/// - `CDRSCROLL_DEBUG`: `1`/`true` enables, `0`/`false` disables debug diagnostics
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Some(height) = std::env::var(ROW_HEIGHT_ENV)
        .ok()
        .and_then(|raw| raw.trim().parse::<f64>().ok())
    {
        config.scroller.row_height = height;
    }

    if let Ok(raw) = std::env::var(DEBUG_ENV) {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => config.scroller.debug = true,
            "0" | "false" | "no" => config.scroller.debug = false,
            _ => {}
        }
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    merge_config_onto(ScrollerConfig::default(), config_file)
}

/// Merge config file onto a chosen base profile.
///
/// Like [`merge_config`], but fields the file leaves unset come from `base`
/// (for example the compact profile) instead of the desktop defaults.
pub fn merge_config_onto(base: ScrollerConfig, config_file: Option<ConfigFile>) -> ResolvedConfig {
    let Some(config) = config_file else {
        return ResolvedConfig {
            scroller: base,
            log_file_path: default_log_path(),
        };
    };

    ResolvedConfig {
        scroller: ScrollerConfig {
            row_height: config.row_height.unwrap_or(base.row_height),
            buffer_size: config.buffer_size.unwrap_or(base.buffer_size),
            scroll_throttle_ms: config
                .scroll_throttle_ms
                .unwrap_or(base.scroll_throttle_ms),
            fixed_row_height: config.fixed_row_height.unwrap_or(base.fixed_row_height),
            measure_every: config.measure_every.unwrap_or(base.measure_every),
            notify_every: config.notify_every.unwrap_or(base.notify_every),
            pool_screens_cap: config.pool_screens_cap.unwrap_or(base.pool_screens_cap),
            adaptive_buffer: config.adaptive_buffer.unwrap_or(base.adaptive_buffer),
            debug: config.debug.unwrap_or(base.debug),
        },
        log_file_path: config.log_file_path.unwrap_or_else(default_log_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults (or compact profile) → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    row_height_override: Option<f64>,
    debug_override: Option<bool>,
    log_file_override: Option<PathBuf>,
) -> ResolvedConfig {
    if let Some(height) = row_height_override {
        config.scroller.row_height = height;
    }

    if let Some(debug) = debug_override {
        config.scroller.debug = debug;
    }

    if let Some(path) = log_file_override {
        config.log_file_path = path;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
