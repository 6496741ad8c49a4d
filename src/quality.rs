//! User-facing quality to per-codec native parameter mapping.
//!
//! One 0-100 slider drives every encoder. Higher always means higher fidelity
//! and larger files; this module is the only place that knows how each codec
//! scales its own control.
//!
//! | Format                       | Native parameter        | Mapping                    |
//! |------------------------------|-------------------------|----------------------------|
//! | jpeg, png, webp, heic, wp2   | quality                 | identity                   |
//! | avif                         | cq level (0 best..63)   | `round((100 - q) / 5)`     |
//! | jxl                          | distance (0 lossless..) | `q` passed through as-is   |
//! | qoi                          | none                    | ignored                    |

use crate::{ConvertError, SupportedFormat};

/// Highest AVIF compression level (worst quality).
pub const AVIF_MAX_CQ_LEVEL: u8 = 63;

/// Normalized quality, 0 (smallest file) to 100 (best fidelity).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    pub const MAX: Quality = Quality(100);

    /// Validate a raw quality value.
    pub fn new(value: u32) -> Result<Self, ConvertError> {
        if value > 100 {
            return Err(ConvertError::InvalidQuality(value));
        }
        Ok(Quality(value as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Quality(75)
    }
}

impl TryFrom<u32> for Quality {
    type Error = ConvertError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Quality::new(value)
    }
}

/// Encoder options in a codec's own parameter space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NativeOptions {
    /// "Higher is better" quality, 0-100.
    Quality(u8),
    /// AVIF cq level: 0 is best, [`AVIF_MAX_CQ_LEVEL`] is worst.
    CompressionLevel(u8),
    /// JPEG XL butteraugli distance: 0 is lossless.
    Distance(f32),
    /// The codec takes no quality control.
    None,
}

/// Translate a quality value into the native options for `format`'s encoder.
pub fn native_options_for(format: SupportedFormat, quality: Quality) -> NativeOptions {
    let q = quality.get();
    match format {
        SupportedFormat::Jpeg
        | SupportedFormat::Png
        | SupportedFormat::WebP
        | SupportedFormat::Heic
        | SupportedFormat::Wp2 => NativeOptions::Quality(q),
        SupportedFormat::Avif => NativeOptions::CompressionLevel(avif_cq_level(quality)),
        // Passed through without inversion: quality 100 becomes distance 100.
        SupportedFormat::Jxl => NativeOptions::Distance(f32::from(q)),
        SupportedFormat::Qoi => NativeOptions::None,
    }
}

/// `round((100 - q) / 5)`: 100 maps to 0, 0 maps to 20.
pub fn avif_cq_level(quality: Quality) -> u8 {
    let level = (f32::from(100 - quality.get()) / 5.0).round() as u8;
    level.min(AVIF_MAX_CQ_LEVEL)
}
