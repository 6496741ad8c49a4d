//! PNG codec adapter using png crate.
//!
//! PNG is lossless; the quality option is accepted but does not change pixels.

use std::io::Cursor;

use crate::quality::NativeOptions;
use crate::raster::{CanonicalRaster, ColorSpace, ImgVec, Rgba};
use crate::{Codec, ConvertError, SupportedFormat};

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct PngCodec {
    compression: png::Compression,
}

impl PngCodec {
    pub(crate) fn new(compression: png::Compression) -> Self {
        Self { compression }
    }
}

impl Codec for PngCodec {
    fn format(&self) -> SupportedFormat {
        SupportedFormat::Png
    }

    fn decode(&self, data: &[u8]) -> Result<CanonicalRaster, ConvertError> {
        let mut decoder = png::Decoder::new(Cursor::new(data));
        decoder.set_transformations(png::Transformations::normalize_to_color8());

        let mut reader = decoder
            .read_info()
            .map_err(|e| ConvertError::decode(SupportedFormat::Png, e))?;

        let buffer_size = reader.output_buffer_size().ok_or_else(|| {
            ConvertError::decode(SupportedFormat::Png, "cannot determine output buffer size")
        })?;
        let mut raw_pixels = vec![0u8; buffer_size];

        let output_info = reader
            .next_frame(&mut raw_pixels)
            .map_err(|e| ConvertError::decode(SupportedFormat::Png, e))?;
        raw_pixels.truncate(output_info.buffer_size());

        let (color_type, _bit_depth) = reader.output_color_type();
        let w = output_info.width as usize;
        let h = output_info.height as usize;

        let rgba: Vec<Rgba<u8>> = match color_type {
            png::ColorType::Rgba => bytemuck::cast_slice(&raw_pixels).to_vec(),
            png::ColorType::Rgb => raw_pixels
                .chunks_exact(3)
                .map(|p| Rgba {
                    r: p[0],
                    g: p[1],
                    b: p[2],
                    a: 255,
                })
                .collect(),
            png::ColorType::GrayscaleAlpha => raw_pixels
                .chunks_exact(2)
                .map(|ga| Rgba {
                    r: ga[0],
                    g: ga[0],
                    b: ga[0],
                    a: ga[1],
                })
                .collect(),
            png::ColorType::Grayscale => raw_pixels
                .iter()
                .map(|&g| Rgba {
                    r: g,
                    g,
                    b: g,
                    a: 255,
                })
                .collect(),
            png::ColorType::Indexed => {
                return Err(ConvertError::decode(
                    SupportedFormat::Png,
                    "indexed output after palette expansion",
                ));
            }
        };

        if rgba.len() != w * h {
            return Err(ConvertError::decode(SupportedFormat::Png, "truncated image data"));
        }

        Ok(CanonicalRaster::new(ImgVec::new(rgba, w, h), ColorSpace::Srgb))
    }

    fn encode(
        &self,
        raster: &CanonicalRaster,
        options: &NativeOptions,
    ) -> Result<Vec<u8>, ConvertError> {
        super::require_srgb(SupportedFormat::Png, raster)?;
        super::expect_quality(SupportedFormat::Png, options)?;
        let bytes = raster.to_rgba_bytes();

        let mut output = Vec::new();
        let mut encoder = png::Encoder::new(&mut output, raster.width(), raster.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(self.compression);

        let mut writer = encoder
            .write_header()
            .map_err(|e| ConvertError::encode(SupportedFormat::Png, e))?;

        writer
            .write_image_data(&bytes)
            .map_err(|e| ConvertError::encode(SupportedFormat::Png, e))?;

        writer
            .finish()
            .map_err(|e| ConvertError::encode(SupportedFormat::Png, e))?;

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::test_support::{gradient, linear};

    #[test]
    fn round_trip_is_lossless() {
        let raster = gradient(5, 3);
        let encoded = PngCodec::default()
            .encode(&raster, &NativeOptions::Quality(10))
            .unwrap();
        assert_eq!(&encoded[1..4], b"PNG");

        let decoded = PngCodec::default().decode(&encoded).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (5, 3));
        assert_eq!(decoded.to_rgba_bytes(), raster.to_rgba_bytes());
    }

    #[test]
    fn decodes_rgb_input() {
        let mut encoded = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut encoded, 2, 1);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[10, 20, 30, 40, 50, 60]).unwrap();
        }

        let decoded = PngCodec::default().decode(&encoded).unwrap();
        assert_eq!(decoded.to_rgba_bytes(), vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn truncated_input_fails() {
        let encoded = PngCodec::default()
            .encode(&gradient(4, 4), &NativeOptions::Quality(100))
            .unwrap();
        assert!(matches!(
            PngCodec::default().decode(&encoded[..encoded.len() / 2]),
            Err(ConvertError::Decode {
                format: SupportedFormat::Png,
                ..
            })
        ));
    }

    #[test]
    fn linear_raster_is_not_encoded() {
        assert!(matches!(
            PngCodec::default().encode(&linear(2, 2), &NativeOptions::Quality(100)),
            Err(ConvertError::Encode {
                format: SupportedFormat::Png,
                ..
            })
        ));
    }
}
