//! HEIC codec adapter using libheif through libheif-rs.

use libheif_rs::{
    Channel, ColorSpace, CompressionFormat, EncoderQuality, HeifContext, Image, LibHeif, RgbChroma,
};
use rgb::ComponentBytes;

use crate::quality::NativeOptions;
use crate::raster::CanonicalRaster;
use crate::{Codec, ConvertError, SupportedFormat};

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct HeicCodec;

impl Codec for HeicCodec {
    fn format(&self) -> SupportedFormat {
        SupportedFormat::Heic
    }

    /// Fails early when libheif was built without an HEVC encoder plugin.
    fn prepare_encoder(&self) -> Result<(), ConvertError> {
        LibHeif::new()
            .encoder_for_format(CompressionFormat::Hevc)
            .map(|_| ())
            .map_err(|e| ConvertError::encode(SupportedFormat::Heic, e))
    }

    fn decode(&self, data: &[u8]) -> Result<CanonicalRaster, ConvertError> {
        let lib_heif = LibHeif::new();
        let context = HeifContext::read_from_bytes(data)
            .map_err(|e| ConvertError::decode(SupportedFormat::Heic, e))?;
        let handle = context
            .primary_image_handle()
            .map_err(|e| ConvertError::decode(SupportedFormat::Heic, e))?;
        let image = lib_heif
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgba), None)
            .map_err(|e| ConvertError::decode(SupportedFormat::Heic, e))?;

        let planes = image.planes();
        let plane = planes
            .interleaved
            .ok_or_else(|| ConvertError::decode(SupportedFormat::Heic, "no interleaved plane"))?;

        let row_bytes = plane.width as usize * 4;
        let mut bytes = Vec::with_capacity(row_bytes * plane.height as usize);
        for row in plane.data.chunks(plane.stride).take(plane.height as usize) {
            bytes.extend_from_slice(&row[..row_bytes]);
        }

        CanonicalRaster::from_rgba_bytes(&bytes, plane.width, plane.height)
            .ok_or_else(|| ConvertError::decode(SupportedFormat::Heic, "decoded buffer size mismatch"))
    }

    fn encode(
        &self,
        raster: &CanonicalRaster,
        options: &NativeOptions,
    ) -> Result<Vec<u8>, ConvertError> {
        super::require_srgb(SupportedFormat::Heic, raster)?;
        let quality = super::expect_quality(SupportedFormat::Heic, options)?;
        let err = |e: libheif_rs::HeifError| ConvertError::encode(SupportedFormat::Heic, e);
        let (width, height) = (raster.width(), raster.height());

        let mut image = Image::new(width, height, ColorSpace::Rgb(RgbChroma::Rgba)).map_err(err)?;
        image
            .create_plane(Channel::Interleaved, width, height, 8)
            .map_err(err)?;
        {
            let planes = image.planes_mut();
            let mut plane = planes
                .interleaved
                .ok_or_else(|| ConvertError::encode(SupportedFormat::Heic, "no interleaved plane"))?;
            let stride = plane.stride;
            for (y, row) in raster.as_img().rows().enumerate() {
                let row = row.as_bytes();
                plane.data[y * stride..y * stride + row.len()].copy_from_slice(row);
            }
        }

        let lib_heif = LibHeif::new();
        let mut context = HeifContext::new().map_err(err)?;
        let mut encoder = lib_heif
            .encoder_for_format(CompressionFormat::Hevc)
            .map_err(err)?;
        encoder
            .set_quality(EncoderQuality::Lossy(quality))
            .map_err(err)?;
        context.encode_image(&image, &mut encoder, None).map_err(err)?;
        context.write_to_bytes().map_err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::test_support::gradient;

    #[test]
    fn round_trip_keeps_dimensions() {
        let raster = gradient(16, 16);
        let encoded = HeicCodec.encode(&raster, &NativeOptions::Quality(80));

        // libheif builds without an HEVC encoder plugin can only decode.
        if HeicCodec.prepare_encoder().is_err() {
            assert!(matches!(
                encoded,
                Err(ConvertError::Encode {
                    format: SupportedFormat::Heic,
                    ..
                })
            ));
            return;
        }

        let encoded = encoded.unwrap();
        assert_eq!(&encoded[4..8], b"ftyp");
        let decoded = HeicCodec.decode(&encoded).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 16));
    }

    #[test]
    fn prepare_encoder_matches_libheif() {
        let has_hevc = LibHeif::new()
            .encoder_for_format(CompressionFormat::Hevc)
            .is_ok();
        assert_eq!(HeicCodec.prepare_encoder().is_ok(), has_hevc);
        assert!(HeicCodec.prepare_decoder().is_ok());
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            HeicCodec.decode(b"not a heic file"),
            Err(ConvertError::Decode {
                format: SupportedFormat::Heic,
                ..
            })
        ));
    }

    #[test]
    fn rejects_distance_options() {
        assert!(matches!(
            HeicCodec.encode(&gradient(2, 2), &NativeOptions::Distance(1.0)),
            Err(ConvertError::Encode { .. })
        ));
    }
}
