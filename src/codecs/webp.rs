//! WebP codec adapter using libwebp through the webp crate.

use crate::quality::NativeOptions;
use crate::raster::CanonicalRaster;
use crate::{Codec, ConvertError, SupportedFormat};

/// Lossy WebP. Alpha is preserved.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct WebpCodec;

impl Codec for WebpCodec {
    fn format(&self) -> SupportedFormat {
        SupportedFormat::WebP
    }

    fn decode(&self, data: &[u8]) -> Result<CanonicalRaster, ConvertError> {
        let image = webp::Decoder::new(data)
            .decode()
            .ok_or_else(|| ConvertError::decode(SupportedFormat::WebP, "invalid WebP data"))?;

        let raster = if image.is_alpha() {
            CanonicalRaster::from_rgba_bytes(&image, image.width(), image.height())
        } else {
            CanonicalRaster::from_rgb_bytes(&image, image.width(), image.height())
        };
        raster.ok_or_else(|| ConvertError::decode(SupportedFormat::WebP, "decoded buffer size mismatch"))
    }

    fn encode(
        &self,
        raster: &CanonicalRaster,
        options: &NativeOptions,
    ) -> Result<Vec<u8>, ConvertError> {
        super::require_srgb(SupportedFormat::WebP, raster)?;
        let quality = super::expect_quality(SupportedFormat::WebP, options)?;
        let bytes = raster.to_rgba_bytes();

        let memory = webp::Encoder::from_rgba(&bytes, raster.width(), raster.height())
            .encode_simple(false, f32::from(quality))
            .map_err(|e| ConvertError::encode(SupportedFormat::WebP, format_args!("{e:?}")))?;

        Ok(memory.to_vec())
    }
}
