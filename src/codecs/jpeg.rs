//! JPEG codec adapter using the image crate.

use std::io::Cursor;

use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;

use crate::quality::NativeOptions;
use crate::raster::CanonicalRaster;
use crate::{Codec, ConvertError, SupportedFormat};

/// Baseline JPEG. Alpha is dropped on encode.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct JpegCodec;

impl Codec for JpegCodec {
    fn format(&self) -> SupportedFormat {
        SupportedFormat::Jpeg
    }

    fn decode(&self, data: &[u8]) -> Result<CanonicalRaster, ConvertError> {
        super::decode_with_image(data, image::ImageFormat::Jpeg, SupportedFormat::Jpeg)
    }

    fn encode(
        &self,
        raster: &CanonicalRaster,
        options: &NativeOptions,
    ) -> Result<Vec<u8>, ConvertError> {
        super::require_srgb(SupportedFormat::Jpeg, raster)?;
        // The encoder accepts 1-100; quality 0 is treated as the lowest setting.
        let quality = super::expect_quality(SupportedFormat::Jpeg, options)?.max(1);
        let rgb = raster.to_rgb_bytes();

        let mut output = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut output, quality)
            .encode(&rgb, raster.width(), raster.height(), ExtendedColorType::Rgb8)
            .map_err(|e| ConvertError::encode(SupportedFormat::Jpeg, e))?;

        Ok(output.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::test_support::gradient;

    #[test]
    fn round_trip_keeps_dimensions() {
        let raster = gradient(16, 8);
        let encoded = JpegCodec.encode(&raster, &NativeOptions::Quality(90)).unwrap();
        assert_eq!(&encoded[..3], &[0xFF, 0xD8, 0xFF]);

        let decoded = JpegCodec.decode(&encoded).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
        assert!(!decoded.has_transparency());
    }

    #[test]
    fn lower_quality_is_smaller() {
        let raster = gradient(64, 64);
        let high = JpegCodec.encode(&raster, &NativeOptions::Quality(100)).unwrap();
        let low = JpegCodec.encode(&raster, &NativeOptions::Quality(0)).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            JpegCodec.decode(b"not a jpeg"),
            Err(ConvertError::Decode {
                format: SupportedFormat::Jpeg,
                ..
            })
        ));
    }
}
