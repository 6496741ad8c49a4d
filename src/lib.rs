//! # batchconv
//!
//! Batch image conversion: detect each input's format from its file name,
//! decode to a canonical RGBA raster, re-encode every image into one target
//! format at a shared quality, and package the results into a ZIP archive.
//!
//! Each codec is feature-gated. Enable only what you need:
//!
//! ```toml
//! [dependencies]
//! batchconv = { version = "0.1", features = ["jpeg", "webp", "png"] }
//! ```
//!
//! Formats whose codec is not compiled in are still recognized; converting
//! them fails with [`ConvertError::CodecUnavailable`]. Any codec can be
//! replaced at runtime through [`CodecRegistry::with_codec`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use batchconv::{InputItem, Quality, SupportedFormat, process_batch};
//!
//! let items = vec![
//!     InputItem::new("a.png", std::fs::read("a.png")?),
//!     InputItem::new("b.jpg", std::fs::read("b.jpg")?),
//! ];
//! // a.webp and b.webp, zipped
//! let zip = process_batch(&items, SupportedFormat::WebP, Quality::new(80)?)?;
//! std::fs::write("converted.zip", zip)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

mod archive;
pub mod codecs;
mod config;
mod convert;
mod error;
mod format;
mod limits;
pub mod quality;
pub mod raster;
mod registry;

pub use archive::archive;
pub use codecs::{Codec, Unavailable};
pub use config::CodecConfig;
pub use convert::{
    BatchReport, BatchRequest, FailurePolicy, InputItem, ItemFailure, OutputItem, convert_batch,
    derive_output_name, process_batch,
};
pub use error::{ConvertError, Operation};
pub use format::SupportedFormat;
pub use limits::{Limits, Stop};
pub use quality::{NativeOptions, Quality, native_options_for};
pub use raster::{CanonicalRaster, ColorSpace};
pub use registry::{CodecRegistry, FormatSet};
