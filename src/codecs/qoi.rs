//! QOI codec adapter. Always lossless; takes no options.

use crate::quality::NativeOptions;
use crate::raster::CanonicalRaster;
use crate::{Codec, ConvertError, SupportedFormat};

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct QoiCodec;

impl Codec for QoiCodec {
    fn format(&self) -> SupportedFormat {
        SupportedFormat::Qoi
    }

    fn decode(&self, data: &[u8]) -> Result<CanonicalRaster, ConvertError> {
        let (header, pixels) =
            qoi::decode_to_vec(data).map_err(|e| ConvertError::decode(SupportedFormat::Qoi, e))?;

        let count = header.width as usize * header.height as usize;
        let raster = if pixels.len() == count * 4 {
            CanonicalRaster::from_rgba_bytes(&pixels, header.width, header.height)
        } else {
            CanonicalRaster::from_rgb_bytes(&pixels, header.width, header.height)
        };
        raster.ok_or_else(|| ConvertError::decode(SupportedFormat::Qoi, "decoded buffer size mismatch"))
    }

    fn encode(
        &self,
        raster: &CanonicalRaster,
        _options: &NativeOptions,
    ) -> Result<Vec<u8>, ConvertError> {
        super::require_srgb(SupportedFormat::Qoi, raster)?;
        let bytes = raster.to_rgba_bytes();
        qoi::encode_to_vec(&bytes, raster.width(), raster.height())
            .map_err(|e| ConvertError::encode(SupportedFormat::Qoi, e))
    }
}
