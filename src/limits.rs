//! Resource limits and cancellation.

use std::sync::atomic::{AtomicBool, Ordering};

/// Per-item resource limits for a batch.
///
/// All limits are optional. Input size is checked before decoding; dimensions
/// are checked once the raster is decoded.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    /// Maximum image width in pixels.
    pub max_width: Option<u64>,
    /// Maximum image height in pixels.
    pub max_height: Option<u64>,
    /// Maximum total pixels (width × height).
    pub max_pixels: Option<u64>,
    /// Maximum size of one encoded input file in bytes.
    pub max_input_bytes: Option<u64>,
}

impl Limits {
    /// Create a new Limits with no restrictions.
    pub fn none() -> Self {
        Self::default()
    }

    /// Check if dimensions are within limits.
    ///
    /// Returns `Err` with a description if any limit is exceeded.
    pub fn check_dimensions(&self, width: u64, height: u64) -> Result<(), &'static str> {
        if let Some(max_width) = self.max_width {
            if width > max_width {
                return Err("width exceeds limit");
            }
        }

        if let Some(max_height) = self.max_height {
            if height > max_height {
                return Err("height exceeds limit");
            }
        }

        if let Some(max_pixels) = self.max_pixels {
            if width.saturating_mul(height) > max_pixels {
                return Err("pixel count exceeds limit");
            }
        }

        Ok(())
    }

    /// Check if an input file is within the size limit.
    pub fn check_input_size(&self, bytes: u64) -> Result<(), &'static str> {
        if let Some(max) = self.max_input_bytes {
            if bytes > max {
                return Err("input size exceeds limit");
            }
        }
        Ok(())
    }
}

/// Cancellation token for long-running batches.
///
/// The orchestrator checks `should_stop()` before preparation and before every
/// decode and encode, failing the batch with
/// [`ConvertError::Cancelled`](crate::ConvertError::Cancelled).
pub trait Stop: Send + Sync {
    /// Whether the operation should be cancelled.
    fn should_stop(&self) -> bool;
}

impl Stop for AtomicBool {
    fn should_stop(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_none() {
        let limits = Limits::none();
        assert!(limits.check_dimensions(u64::MAX, u64::MAX).is_ok());
        assert!(limits.check_input_size(u64::MAX).is_ok());
    }

    #[test]
    fn limits_dimensions() {
        let limits = Limits {
            max_width: Some(1000),
            max_height: Some(1000),
            max_pixels: Some(500_000),
            ..Default::default()
        };

        assert!(limits.check_dimensions(1000, 1000).is_err()); // 1M pixels > 500k
        assert!(limits.check_dimensions(500, 500).is_ok());
        assert!(limits.check_dimensions(2000, 100).is_err());
    }

    #[test]
    fn limits_input_size() {
        let limits = Limits {
            max_input_bytes: Some(1_000),
            ..Default::default()
        };

        assert!(limits.check_input_size(1_000).is_ok());
        assert!(limits.check_input_size(1_001).is_err());
    }

    #[test]
    fn atomic_bool_stop() {
        let flag = AtomicBool::new(false);
        assert!(!flag.should_stop());
        flag.store(true, Ordering::Relaxed);
        assert!(flag.should_stop());
    }
}
