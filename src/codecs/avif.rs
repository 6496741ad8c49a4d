//! AVIF codec adapter: ravif for encoding, the image crate (dav1d) for decoding.
//!
//! Either direction can be compiled out independently.

#[cfg(feature = "avif-encode")]
use crate::quality::AVIF_MAX_CQ_LEVEL;
use crate::quality::NativeOptions;
use crate::raster::CanonicalRaster;
use crate::{Codec, ConvertError, SupportedFormat};

/// Default ravif speed (1 slowest .. 10 fastest).
pub(crate) const DEFAULT_SPEED: u8 = 4;

#[derive(Clone, Copy, Debug)]
pub(crate) struct AvifCodec {
    #[cfg_attr(not(feature = "avif-encode"), allow(dead_code))]
    speed: u8,
}

impl AvifCodec {
    pub(crate) fn new(speed: u8) -> Self {
        Self {
            speed: speed.clamp(1, 10),
        }
    }
}

impl Default for AvifCodec {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED)
    }
}

/// Convert a cq level (0 best..63 worst) into ravif's 0-100 quality scale.
#[cfg(feature = "avif-encode")]
pub(crate) fn cq_level_to_ravif_quality(level: u8) -> f32 {
    let level = level.min(AVIF_MAX_CQ_LEVEL);
    100.0 * f32::from(AVIF_MAX_CQ_LEVEL - level) / f32::from(AVIF_MAX_CQ_LEVEL)
}

impl Codec for AvifCodec {
    fn format(&self) -> SupportedFormat {
        SupportedFormat::Avif
    }

    fn can_decode(&self) -> bool {
        cfg!(feature = "avif-decode")
    }

    fn can_encode(&self) -> bool {
        cfg!(feature = "avif-encode")
    }

    fn prepare_decoder(&self) -> Result<(), ConvertError> {
        if self.can_decode() {
            Ok(())
        } else {
            Err(ConvertError::CodecUnavailable {
                format: SupportedFormat::Avif,
                operation: crate::error::Operation::Decode,
            })
        }
    }

    fn prepare_encoder(&self) -> Result<(), ConvertError> {
        if self.can_encode() {
            Ok(())
        } else {
            Err(ConvertError::CodecUnavailable {
                format: SupportedFormat::Avif,
                operation: crate::error::Operation::Encode,
            })
        }
    }

    #[cfg(feature = "avif-decode")]
    fn decode(&self, data: &[u8]) -> Result<CanonicalRaster, ConvertError> {
        super::decode_with_image(data, image::ImageFormat::Avif, SupportedFormat::Avif)
    }

    #[cfg(not(feature = "avif-decode"))]
    fn decode(&self, _data: &[u8]) -> Result<CanonicalRaster, ConvertError> {
        self.prepare_decoder()?;
        Err(ConvertError::decode(SupportedFormat::Avif, "decoder not compiled in"))
    }

    #[cfg(feature = "avif-encode")]
    fn encode(
        &self,
        raster: &CanonicalRaster,
        options: &NativeOptions,
    ) -> Result<Vec<u8>, ConvertError> {
        super::require_srgb(SupportedFormat::Avif, raster)?;
        let level = match *options {
            NativeOptions::CompressionLevel(level) => level,
            other => {
                return Err(ConvertError::encode(
                    SupportedFormat::Avif,
                    format_args!("expected compression level, got {other:?}"),
                ));
            }
        };
        let quality = cq_level_to_ravif_quality(level);

        let encoded = ravif::Encoder::new()
            .with_quality(quality)
            .with_alpha_quality(quality)
            .with_speed(self.speed)
            .encode_rgba(raster.as_img())
            .map_err(|e| ConvertError::encode(SupportedFormat::Avif, e))?;

        Ok(encoded.avif_file)
    }

    #[cfg(not(feature = "avif-encode"))]
    fn encode(
        &self,
        _raster: &CanonicalRaster,
        _options: &NativeOptions,
    ) -> Result<Vec<u8>, ConvertError> {
        self.prepare_encoder()?;
        Err(ConvertError::encode(SupportedFormat::Avif, "encoder not compiled in"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "avif-encode")]
    #[test]
    fn cq_level_scale() {
        assert_eq!(cq_level_to_ravif_quality(0), 100.0);
        assert_eq!(cq_level_to_ravif_quality(63), 0.0);
        assert_eq!(cq_level_to_ravif_quality(200), 0.0);
        assert!(cq_level_to_ravif_quality(20) > cq_level_to_ravif_quality(21));
    }

    #[cfg(feature = "avif-encode")]
    #[test]
    fn encodes_ftyp_box() {
        let raster = crate::codecs::test_support::gradient(8, 8);
        let encoded = AvifCodec::new(10)
            .encode(&raster, &NativeOptions::CompressionLevel(10))
            .unwrap();
        assert_eq!(&encoded[4..8], b"ftyp");
    }

    #[cfg(feature = "avif-encode")]
    #[test]
    fn rejects_quality_options() {
        let raster = crate::codecs::test_support::gradient(2, 2);
        assert!(matches!(
            AvifCodec::default().encode(&raster, &NativeOptions::Quality(50)),
            Err(ConvertError::Encode { .. })
        ));
    }

    #[cfg(not(feature = "avif-decode"))]
    #[test]
    fn decode_unavailable_without_feature() {
        let codec = AvifCodec::default();
        assert!(!codec.can_decode());
        assert!(matches!(
            codec.decode(b"\x00\x00\x00\x18ftypavif"),
            Err(ConvertError::CodecUnavailable { .. })
        ));
    }

    #[test]
    fn speed_is_clamped() {
        assert_eq!(AvifCodec::new(0).speed, 1);
        assert_eq!(AvifCodec::new(99).speed, 10);
    }
}
