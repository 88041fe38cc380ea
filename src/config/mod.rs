//! Configuration module.
//!
//! [`ScrollerConfig`] holds the numeric defaults the scroller reads once at
//! construction. [`loader`] resolves it from defaults, a TOML file,
//! environment variables and CLI flags.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, merge_config_onto, ConfigError, ConfigFile,
    ResolvedConfig,
};

/// Default assumed row height in pixels.
pub const ROW_HEIGHT: f64 = 40.0;
/// Default base buffer, in rows, above and below the viewport.
pub const BUFFER_SIZE: usize = 10;
/// Default scroll throttle in milliseconds.
pub const SCROLL_THROTTLE_MS: u64 = 12;
/// Renders between row-height samples.
pub const MEASURE_EVERY: u32 = 5;
/// Renders between throttled host notifications.
pub const NOTIFY_EVERY: u32 = 3;
/// Pool capacity in viewport screens.
pub const POOL_SCREENS_CAP: u32 = 4;

/// Viewport widths at or below this use the compact profile.
pub const COMPACT_BREAKPOINT_PX: f64 = 768.0;
/// Row height of the compact profile.
pub const COMPACT_ROW_HEIGHT: f64 = 35.0;
/// Base buffer of the compact profile.
pub const COMPACT_BUFFER_SIZE: usize = 3;

/// Throttle used for very large datasets.
const LARGE_DATA_THROTTLE_MS: u64 = 24;

/// Scroller tuning.
///
/// Defaults match the dashboard's desktop profile; see
/// [`ScrollerConfig::for_viewport_width`] for the compact profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollerConfig {
    /// Assumed row height in pixels until measured.
    pub row_height: f64,
    /// Base buffer in rows.
    pub buffer_size: usize,
    /// Scroll throttle in milliseconds.
    pub scroll_throttle_ms: u64,
    /// Skip runtime row-height measurement entirely.
    pub fixed_row_height: bool,
    /// Renders between row-height samples.
    pub measure_every: u32,
    /// Renders between throttled host notifications.
    pub notify_every: u32,
    /// Pool capacity in viewport screens.
    pub pool_screens_cap: u32,
    /// Adjust buffer and throttle to the dataset size on `set_data`.
    pub adaptive_buffer: bool,
    /// Emit per-render and contract-violation diagnostics.
    pub debug: bool,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self {
            row_height: ROW_HEIGHT,
            buffer_size: BUFFER_SIZE,
            scroll_throttle_ms: SCROLL_THROTTLE_MS,
            fixed_row_height: false,
            measure_every: MEASURE_EVERY,
            notify_every: NOTIFY_EVERY,
            pool_screens_cap: POOL_SCREENS_CAP,
            adaptive_buffer: true,
            debug: false,
        }
    }
}

impl ScrollerConfig {
    /// Switch to the compact profile on narrow viewports.
    pub fn for_viewport_width(mut self, width: f64) -> Self {
        if width <= COMPACT_BREAKPOINT_PX {
            self.row_height = COMPACT_ROW_HEIGHT;
            self.buffer_size = COMPACT_BUFFER_SIZE;
        }
        self
    }

    /// Buffer and throttle tuned for a dataset of `data_len` rows.
    ///
    /// Larger datasets get a larger buffer (bounded) and, above 5000 rows, a
    /// slower throttle. Always derived from the configured base values.
    pub fn optimized_for(&self, data_len: usize) -> (usize, u64) {
        let base = self.buffer_size;
        if data_len > 5000 {
            (base.clamp(16, 24), LARGE_DATA_THROTTLE_MS)
        } else if data_len > 1000 {
            (base.clamp(12, 16), self.scroll_throttle_ms)
        } else {
            (base.max(10), self.scroll_throttle_ms)
        }
    }

    /// Check value ranges, reporting every violation at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            problems.push(format!("row_height must be positive (got {})", self.row_height));
        }
        if self.measure_every == 0 {
            problems.push("measure_every must be at least 1".to_string());
        }
        if self.notify_every == 0 {
            problems.push("notify_every must be at least 1".to_string());
        }
        if self.pool_screens_cap == 0 {
            problems.push("pool_screens_cap must be at least 1".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_desktop_profile() {
        let config = ScrollerConfig::default();
        assert_eq!(config.row_height, 40.0);
        assert_eq!(config.buffer_size, 10);
        assert_eq!(config.scroll_throttle_ms, 12);
        assert_eq!(config.measure_every, 5);
        assert_eq!(config.notify_every, 3);
        assert_eq!(config.pool_screens_cap, 4);
        assert!(!config.fixed_row_height);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn narrow_viewport_uses_compact_profile() {
        let config = ScrollerConfig::default().for_viewport_width(768.0);
        assert_eq!(config.row_height, COMPACT_ROW_HEIGHT);
        assert_eq!(config.buffer_size, COMPACT_BUFFER_SIZE);

        let wide = ScrollerConfig::default().for_viewport_width(1280.0);
        assert_eq!(wide, ScrollerConfig::default());
    }

    #[test]
    fn optimized_buffer_grows_with_data() {
        let config = ScrollerConfig {
            buffer_size: 5,
            ..ScrollerConfig::default()
        };
        assert_eq!(config.optimized_for(200), (10, 12));
        assert_eq!(config.optimized_for(1000), (10, 12));
        assert_eq!(config.optimized_for(1001), (12, 12));
        assert_eq!(config.optimized_for(5001), (16, 24));
    }

    #[test]
    fn optimized_buffer_is_bounded() {
        let config = ScrollerConfig {
            buffer_size: 40,
            ..ScrollerConfig::default()
        };
        assert_eq!(config.optimized_for(2000).0, 16);
        assert_eq!(config.optimized_for(9000).0, 24);
        assert_eq!(config.optimized_for(10).0, 40);
    }

    #[test]
    fn validate_reports_every_problem() {
        let config = ScrollerConfig {
            row_height: 0.0,
            measure_every: 0,
            notify_every: 0,
            pool_screens_cap: 0,
            ..ScrollerConfig::default()
        };
        match config.validate() {
            Err(ConfigError::Invalid(problems)) => assert_eq!(problems.len(), 4),
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn validate_rejects_nan_row_height() {
        let config = ScrollerConfig {
            row_height: f64::NAN,
            ..ScrollerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
