//! Placeholder for formats without a compiled-in codec.

use crate::error::Operation;
use crate::quality::NativeOptions;
use crate::raster::CanonicalRaster;
use crate::{Codec, ConvertError, SupportedFormat};

/// Registry entry for a format whose codec is not part of this build.
///
/// Every call fails with [`ConvertError::CodecUnavailable`]. Register a real
/// codec with [`CodecRegistry::with_codec`](crate::CodecRegistry::with_codec)
/// to replace it.
#[derive(Clone, Copy, Debug)]
pub struct Unavailable(pub SupportedFormat);

impl Unavailable {
    fn error(&self, operation: Operation) -> ConvertError {
        ConvertError::CodecUnavailable {
            format: self.0,
            operation,
        }
    }
}

impl Codec for Unavailable {
    fn format(&self) -> SupportedFormat {
        self.0
    }

    fn can_decode(&self) -> bool {
        false
    }

    fn can_encode(&self) -> bool {
        false
    }

    fn prepare_decoder(&self) -> Result<(), ConvertError> {
        Err(self.error(Operation::Decode))
    }

    fn prepare_encoder(&self) -> Result<(), ConvertError> {
        Err(self.error(Operation::Encode))
    }

    fn decode(&self, _data: &[u8]) -> Result<CanonicalRaster, ConvertError> {
        Err(self.error(Operation::Decode))
    }

    fn encode(
        &self,
        _raster: &CanonicalRaster,
        _options: &NativeOptions,
    ) -> Result<Vec<u8>, ConvertError> {
        Err(self.error(Operation::Encode))
    }
}
