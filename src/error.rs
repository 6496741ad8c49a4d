//! Unified error type for batch conversion.

use std::fmt;

use crate::format::SupportedFormat;

/// Direction of a codec operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Decode,
    Encode,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Decode => f.write_str("decoding"),
            Operation::Encode => f.write_str("encoding"),
        }
    }
}

/// Unified error type for conversion operations.
#[derive(Clone, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// File extension not in the format registry.
    #[error("unsupported format: {0:?}")]
    UnsupportedFormat(String),
    /// Input bytes rejected by the decoder for their claimed format.
    #[error("failed to decode {format}: {detail}")]
    Decode {
        format: SupportedFormat,
        detail: String,
    },
    /// Raster or options rejected by the target encoder.
    #[error("failed to encode {format}: {detail}")]
    Encode {
        format: SupportedFormat,
        detail: String,
    },
    /// Packaging the results failed.
    #[error("archive error: {0}")]
    Archive(String),
    /// Quality outside 0-100.
    #[error("quality {0} out of range 0-100")]
    InvalidQuality(u32),
    /// The format is registered but no codec backs it in this build.
    #[error("{operation} {format} is not available (codec not compiled in)")]
    CodecUnavailable {
        format: SupportedFormat,
        operation: Operation,
    },
    /// Resource limit exceeded.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
    /// Batch cancelled via Stop token.
    #[error("conversion cancelled")]
    Cancelled,
    /// Nothing to convert or archive.
    #[error("batch contains no images")]
    EmptyBatch,
}

impl ConvertError {
    /// Wrap a codec-specific decode error.
    pub fn decode<E: fmt::Display>(format: SupportedFormat, error: E) -> Self {
        ConvertError::Decode {
            format,
            detail: error.to_string(),
        }
    }

    /// Wrap a codec-specific encode error.
    pub fn encode<E: fmt::Display>(format: SupportedFormat, error: E) -> Self {
        ConvertError::Encode {
            format,
            detail: error.to_string(),
        }
    }

    /// Whether the error belongs to a single item rather than the whole batch.
    ///
    /// Only item errors are isolated under
    /// [`FailurePolicy::BestEffort`](crate::FailurePolicy::BestEffort).
    pub fn is_item_error(&self) -> bool {
        matches!(
            self,
            ConvertError::UnsupportedFormat(_)
                | ConvertError::Decode { .. }
                | ConvertError::Encode { .. }
                | ConvertError::LimitExceeded(_)
                | ConvertError::CodecUnavailable {
                    operation: Operation::Decode,
                    ..
                }
        )
    }
}
