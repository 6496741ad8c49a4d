//! JPEG XL codec adapter using libjxl through jpegxl-rs.

use jpegxl_rs::decode::PixelFormat;
use jpegxl_rs::encode::EncoderResult;
use jpegxl_rs::{decoder_builder, encoder_builder};

use crate::quality::NativeOptions;
use crate::raster::CanonicalRaster;
use crate::{Codec, ConvertError, SupportedFormat};

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct JxlCodec;

impl Codec for JxlCodec {
    fn format(&self) -> SupportedFormat {
        SupportedFormat::Jxl
    }

    fn decode(&self, data: &[u8]) -> Result<CanonicalRaster, ConvertError> {
        let decoder = decoder_builder()
            .pixel_format(PixelFormat {
                num_channels: 4,
                ..PixelFormat::default()
            })
            .build()
            .map_err(|e| ConvertError::decode(SupportedFormat::Jxl, e))?;

        let (metadata, pixels) = decoder
            .decode_with::<u8>(data)
            .map_err(|e| ConvertError::decode(SupportedFormat::Jxl, e))?;

        CanonicalRaster::from_rgba_bytes(&pixels, metadata.width, metadata.height)
            .ok_or_else(|| ConvertError::decode(SupportedFormat::Jxl, "decoded buffer size mismatch"))
    }

    fn encode(
        &self,
        raster: &CanonicalRaster,
        options: &NativeOptions,
    ) -> Result<Vec<u8>, ConvertError> {
        super::require_srgb(SupportedFormat::Jxl, raster)?;
        let distance = match *options {
            NativeOptions::Distance(distance) => distance,
            other => {
                return Err(ConvertError::encode(
                    SupportedFormat::Jxl,
                    format_args!("expected distance, got {other:?}"),
                ));
            }
        };

        let mut encoder = encoder_builder()
            .has_alpha(true)
            .quality(distance)
            .build()
            .map_err(|e| ConvertError::encode(SupportedFormat::Jxl, e))?;

        let bytes = raster.to_rgba_bytes();
        let result: EncoderResult<u8> = encoder
            .encode::<u8, u8>(&bytes, raster.width(), raster.height())
            .map_err(|e| ConvertError::encode(SupportedFormat::Jxl, e))?;

        Ok(result.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::test_support::gradient;
    use crate::quality::native_options_for;
    use crate::Quality;

    #[test]
    fn round_trip_keeps_dimensions() {
        let raster = gradient(12, 8);
        let options = native_options_for(SupportedFormat::Jxl, Quality::new(1).unwrap());
        assert_eq!(options, NativeOptions::Distance(1.0));

        let encoded = JxlCodec.encode(&raster, &options).unwrap();
        // Bare codestream or ISOBMFF container
        assert!(encoded.starts_with(&[0xFF, 0x0A]) || encoded[4..8] == *b"JXL ");

        let decoded = JxlCodec.decode(&encoded).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 8));
    }

    #[test]
    fn max_quality_is_out_of_distance_range() {
        // Quality passes through as distance, and libjxl caps distance at 25.
        let options = native_options_for(SupportedFormat::Jxl, Quality::MAX);
        assert_eq!(options, NativeOptions::Distance(100.0));
        assert!(matches!(
            JxlCodec.encode(&gradient(4, 4), &options),
            Err(ConvertError::Encode {
                format: SupportedFormat::Jxl,
                ..
            })
        ));
    }

    #[test]
    fn rejects_quality_options() {
        assert!(matches!(
            JxlCodec.encode(&gradient(2, 2), &NativeOptions::Quality(90)),
            Err(ConvertError::Encode { .. })
        ));
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            JxlCodec.decode(b"not a jxl file"),
            Err(ConvertError::Decode {
                format: SupportedFormat::Jxl,
                ..
            })
        ));
    }
}
