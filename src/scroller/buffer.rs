//! Scroll-speed driven buffer sizing.

/// Upper bound on the speed multiplier for regular rows.
pub const MAX_MULTIPLIER: f64 = 3.0;

/// Rows taller than this get a larger multiplier ceiling.
const TALL_ROW_THRESHOLD: f64 = 60.0;
const TALL_ROW_MAX_MULTIPLIER: f64 = 3.5;

/// Buffer limits for a given row height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferConfig {
    /// Ceiling for [`dynamic_buffer_multiplier`].
    pub max_multiplier: f64,
}

impl BufferConfig {
    /// Limits for rows of `row_height` pixels.
    pub fn for_row_height(row_height: f64) -> Self {
        let max_multiplier = if row_height > TALL_ROW_THRESHOLD {
            TALL_ROW_MAX_MULTIPLIER
        } else {
            MAX_MULTIPLIER
        };
        Self { max_multiplier }
    }

    /// Multiplier for `speed`, clamped to `[1, max_multiplier]`.
    pub fn multiplier(&self, speed: f64) -> f64 {
        dynamic_buffer_multiplier(speed, self.max_multiplier).clamp(1.0, self.max_multiplier.max(1.0))
    }
}

/// Map scroll speed (px/ms) to a buffer multiplier.
///
/// | speed      | multiplier          |
/// |------------|---------------------|
/// | `> 2`      | `min(2.5, max)`     |
/// | `> 1`      | `min(2, max)`       |
/// | `> 0.5`    | `min(1.5, max)`     |
/// | otherwise  | `1`                 |
pub fn dynamic_buffer_multiplier(speed: f64, max_multiplier: f64) -> f64 {
    if speed > 2.0 {
        2.5_f64.min(max_multiplier)
    } else if speed > 1.0 {
        2.0_f64.min(max_multiplier)
    } else if speed > 0.5 {
        1.5_f64.min(max_multiplier)
    } else {
        1.0
    }
}
