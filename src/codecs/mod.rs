//! Codec capability contract and built-in adapters.
//!
//! Each adapter is a thin bridge between the canonical raster and one
//! format-specific codec crate. Adapters are feature-gated; a format whose
//! adapter is not compiled in is backed by [`Unavailable`].

use crate::quality::NativeOptions;
use crate::raster::{CanonicalRaster, ColorSpace};
use crate::{ConvertError, SupportedFormat};

#[cfg(feature = "jpeg")]
pub(crate) mod jpeg;

#[cfg(feature = "png")]
pub(crate) mod png;

#[cfg(feature = "webp")]
pub(crate) mod webp;

#[cfg(feature = "qoi")]
pub(crate) mod qoi;

#[cfg(any(feature = "avif-encode", feature = "avif-decode"))]
pub(crate) mod avif;

#[cfg(feature = "jxl")]
pub(crate) mod jxl;

#[cfg(feature = "heic")]
pub(crate) mod heic;

mod unavailable;

pub use unavailable::Unavailable;

/// Decode/encode capability for one format.
///
/// Implementations must be shareable across threads: a batch calls `decode`
/// and `encode` concurrently from many workers. `prepare_decoder` and
/// `prepare_encoder` run before the first call in each direction and must be
/// idempotent.
pub trait Codec: Send + Sync {
    /// The format this codec handles.
    fn format(&self) -> SupportedFormat;

    /// Whether `decode` is backed by a real implementation.
    fn can_decode(&self) -> bool {
        true
    }

    /// Whether `encode` is backed by a real implementation.
    fn can_encode(&self) -> bool {
        true
    }

    /// One-time decoder setup.
    fn prepare_decoder(&self) -> Result<(), ConvertError> {
        Ok(())
    }

    /// One-time encoder setup.
    fn prepare_encoder(&self) -> Result<(), ConvertError> {
        Ok(())
    }

    /// Decode encoded bytes into the canonical raster.
    fn decode(&self, data: &[u8]) -> Result<CanonicalRaster, ConvertError>;

    /// Encode a canonical raster with options from
    /// [`native_options_for`](crate::quality::native_options_for).
    fn encode(
        &self,
        raster: &CanonicalRaster,
        options: &NativeOptions,
    ) -> Result<Vec<u8>, ConvertError>;
}

/// Extract a "higher is better" quality, rejecting options meant for another codec.
pub(crate) fn expect_quality(
    format: SupportedFormat,
    options: &NativeOptions,
) -> Result<u8, ConvertError> {
    match *options {
        NativeOptions::Quality(q) => Ok(q),
        other => Err(ConvertError::encode(
            format,
            format_args!("expected quality option, got {other:?}"),
        )),
    }
}

/// Built-in encoders write gamma-encoded sRGB; reject anything else.
pub(crate) fn require_srgb(
    format: SupportedFormat,
    raster: &CanonicalRaster,
) -> Result<(), ConvertError> {
    match raster.color_space() {
        ColorSpace::Srgb => Ok(()),
        other => Err(ConvertError::encode(
            format,
            format_args!("expected sRGB raster, got {other:?}"),
        )),
    }
}

/// Decode through the `image` crate and convert to RGBA8.
#[cfg(any(feature = "jpeg", feature = "avif-decode"))]
pub(crate) fn decode_with_image(
    data: &[u8],
    image_format: image::ImageFormat,
    format: SupportedFormat,
) -> Result<CanonicalRaster, ConvertError> {
    let image = image::load_from_memory_with_format(data, image_format)
        .map_err(|e| ConvertError::decode(format, e))?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    CanonicalRaster::from_rgba_bytes(rgba.as_raw(), width, height)
        .ok_or_else(|| ConvertError::decode(format, "decoded buffer size mismatch"))
}
