//! Environment overrides for binarization defaults
//!
//! Each knob is read once and cached. Values that fail to parse fall back
//! to the built-in default.

use std::sync::OnceLock;

/// Window size used by the reference scripts
pub const DEFAULT_WINDOW_SIZE: usize = 7;
/// Wolf `k` used by the reference scripts
pub const DEFAULT_K: f64 = 0.3;
/// Images with at least this many pixels are binarized row-parallel
pub const DEFAULT_PARALLEL_MIN_PIXELS: usize = 1 << 16;
/// Rows processed between cancellation checks
pub const DEFAULT_ROW_BATCH: usize = 64;
/// Largest accepted window side; bounds the padded buffers
pub const DEFAULT_MAX_WINDOW_SIZE: usize = 1023;

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

static WINDOW_SIZE: OnceLock<usize> = OnceLock::new();

pub(crate) fn window_size() -> usize {
    *WINDOW_SIZE.get_or_init(|| parse_env_usize("WOLF_WINDOW_SIZE", DEFAULT_WINDOW_SIZE))
}

static K: OnceLock<f64> = OnceLock::new();

pub(crate) fn k() -> f64 {
    *K.get_or_init(|| parse_env_f64("WOLF_K", DEFAULT_K))
}

static PARALLEL_MIN_PIXELS: OnceLock<usize> = OnceLock::new();

pub(crate) fn parallel_min_pixels() -> usize {
    *PARALLEL_MIN_PIXELS
        .get_or_init(|| parse_env_usize("WOLF_PARALLEL_MIN_PIXELS", DEFAULT_PARALLEL_MIN_PIXELS))
}

static ROW_BATCH: OnceLock<usize> = OnceLock::new();

pub(crate) fn row_batch() -> usize {
    *ROW_BATCH.get_or_init(|| parse_env_usize("WOLF_ROW_BATCH", DEFAULT_ROW_BATCH).clamp(1, 4096))
}

static MAX_WINDOW_SIZE: OnceLock<usize> = OnceLock::new();

pub(crate) fn max_window_size() -> usize {
    *MAX_WINDOW_SIZE
        .get_or_init(|| parse_env_usize("WOLF_MAX_WINDOW_SIZE", DEFAULT_MAX_WINDOW_SIZE).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fallbacks() {
        assert_eq!(parse_env_usize("WOLF_TEST_UNSET_USIZE", 9), 9);
        assert_eq!(parse_env_f64("WOLF_TEST_UNSET_F64", 0.5), 0.5);
    }

    #[test]
    fn test_row_batch_in_range() {
        let batch = row_batch();
        assert!((1..=4096).contains(&batch));
    }

    #[test]
    fn test_max_window_size_positive() {
        assert!(max_window_size() >= 1);
    }
}
