//! Batch conversion: detect → prepare → decode → encode, one target format.
//!
//! A batch shares one target format and one quality. Codec preparation runs
//! once per distinct format, and items are converted in parallel on a rayon
//! pool. By default the batch is all-or-nothing: the first failing item fails
//! the whole call and no outputs are returned.
//!
//! # Example
//!
//! ```no_run
//! use batchconv::{BatchRequest, InputItem, Quality, SupportedFormat};
//!
//! let items = vec![
//!     InputItem::new("a.png", std::fs::read("a.png")?),
//!     InputItem::new("b.jpg", std::fs::read("b.jpg")?),
//! ];
//! let outputs = BatchRequest::new(SupportedFormat::WebP, Quality::new(80)?).convert(&items)?;
//! for out in &outputs {
//!     println!("{} ({} bytes)", out.name, out.data.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::format::extension_of;
use crate::quality::{NativeOptions, native_options_for};
use crate::registry::FormatSet;
use crate::{CodecRegistry, ConvertError, Limits, Quality, Stop, SupportedFormat};

/// One file handed in by the caller.
#[derive(Clone, Debug)]
pub struct InputItem {
    /// Original file name, used for format detection and output naming.
    pub name: String,
    /// Encoded file contents. Never modified.
    pub data: Vec<u8>,
}

impl InputItem {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// One converted file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputItem {
    /// `<original base name>.<target extension>`.
    pub name: String,
    /// Encoded bytes in the target format.
    pub data: Vec<u8>,
}

/// How item failures affect the rest of the batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// The first failing item fails the whole batch.
    #[default]
    AllOrNothing,
    /// Failing items are reported; the rest are still converted.
    BestEffort,
}

/// A failed item under [`FailurePolicy::BestEffort`].
#[derive(Clone, Debug)]
pub struct ItemFailure {
    /// Position of the item in the input slice.
    pub index: usize,
    /// Original input name.
    pub name: String,
    pub error: ConvertError,
}

/// Result of a best-effort batch.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    /// Successful outputs, in input order.
    pub outputs: Vec<OutputItem>,
    /// Failed items, in input order.
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Batch conversion request builder.
pub struct BatchRequest<'a> {
    target: SupportedFormat,
    quality: Quality,
    registry: Option<&'a CodecRegistry>,
    limits: Option<&'a Limits>,
    stop: Option<&'a dyn Stop>,
    jobs: Option<usize>,
    policy: FailurePolicy,
}

impl<'a> BatchRequest<'a> {
    /// Convert to `target` at `quality` using the built-in codecs.
    pub fn new(target: SupportedFormat, quality: Quality) -> Self {
        Self {
            target,
            quality,
            registry: None,
            limits: None,
            stop: None,
            jobs: None,
            policy: FailurePolicy::default(),
        }
    }

    /// Use a custom codec registry.
    pub fn with_registry(mut self, registry: &'a CodecRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set per-item resource limits.
    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Set a cancellation token.
    pub fn with_stop(mut self, stop: &'a dyn Stop) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Number of worker threads (default: the global rayon pool).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs.max(1));
        self
    }

    /// Failure policy used by [`process`](Self::process).
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn target(&self) -> SupportedFormat {
        self.target
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Convert every item; any failure fails the batch.
    ///
    /// On success the result has exactly one output per input, in input order.
    pub fn convert(&self, items: &[InputItem]) -> Result<Vec<OutputItem>, ConvertError> {
        let default_registry;
        let registry = match self.registry {
            Some(r) => r,
            None => {
                default_registry = CodecRegistry::builtin();
                &default_registry
            }
        };
        self.install(|| self.convert_all(registry, items))
    }

    /// Convert every item, isolating item failures in the report.
    ///
    /// Still fails as a whole on cancellation, an empty batch, or when the
    /// target encoder cannot be prepared.
    pub fn convert_report(&self, items: &[InputItem]) -> Result<BatchReport, ConvertError> {
        let default_registry;
        let registry = match self.registry {
            Some(r) => r,
            None => {
                default_registry = CodecRegistry::builtin();
                &default_registry
            }
        };
        self.install(|| self.convert_isolated(registry, items))
    }

    /// Convert and package the outputs into a ZIP archive.
    ///
    /// Under [`FailurePolicy::BestEffort`] only successful items are archived,
    /// and the call fails with [`ConvertError::EmptyBatch`] if none succeeded.
    pub fn process(&self, items: &[InputItem]) -> Result<Vec<u8>, ConvertError> {
        let outputs = match self.policy {
            FailurePolicy::AllOrNothing => self.convert(items)?,
            FailurePolicy::BestEffort => self.convert_report(items)?.outputs,
        };
        crate::archive::archive(&outputs)
    }

    /// Run `op` on a dedicated pool when a job count is set.
    fn install<T: Send>(&self, op: impl FnOnce() -> T + Send) -> T {
        if let Some(jobs) = self.jobs {
            match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
                Ok(pool) => return pool.install(op),
                Err(e) => warn!(jobs, error = %e, "failed to build thread pool, using global pool"),
            }
        }
        op()
    }

    fn check_stop(&self) -> Result<(), ConvertError> {
        match self.stop {
            Some(stop) if stop.should_stop() => Err(ConvertError::Cancelled),
            _ => Ok(()),
        }
    }

    fn convert_all(
        &self,
        registry: &CodecRegistry,
        items: &[InputItem],
    ) -> Result<Vec<OutputItem>, ConvertError> {
        if items.is_empty() {
            return Err(ConvertError::EmptyBatch);
        }
        self.check_stop()?;
        let started = Instant::now();

        let formats = items
            .iter()
            .map(|item| SupportedFormat::detect(&item.name))
            .collect::<Result<Vec<_>, _>>()?;
        let decoders: FormatSet = formats.iter().copied().collect();

        let (decoders_ready, encoder_ready) = rayon::join(
            || {
                decoders
                    .iter()
                    .collect::<Vec<_>>()
                    .into_par_iter()
                    .map(|format| self.prepare_decoder(registry, format))
                    .collect::<Result<(), _>>()
            },
            || self.prepare_encoder(registry),
        );
        decoders_ready?;
        encoder_ready?;

        let options = native_options_for(self.target, self.quality);
        let outputs = items
            .par_iter()
            .zip(formats.par_iter())
            .map(|(item, &format)| self.convert_one(registry, item, format, &options))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            count = outputs.len(),
            target_format = %self.target,
            quality = self.quality.get(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch converted"
        );
        Ok(outputs)
    }

    fn convert_isolated(
        &self,
        registry: &CodecRegistry,
        items: &[InputItem],
    ) -> Result<BatchReport, ConvertError> {
        if items.is_empty() {
            return Err(ConvertError::EmptyBatch);
        }
        self.check_stop()?;
        let started = Instant::now();

        let formats: Vec<Result<SupportedFormat, ConvertError>> = items
            .iter()
            .map(|item| SupportedFormat::detect(&item.name))
            .collect();
        let decoders: FormatSet = formats.iter().filter_map(|f| f.as_ref().ok().copied()).collect();

        let (prepared, encoder_ready) = rayon::join(
            || {
                decoders
                    .iter()
                    .collect::<Vec<_>>()
                    .into_par_iter()
                    .map(|format| (format, self.prepare_decoder(registry, format)))
                    .collect::<Vec<_>>()
            },
            || self.prepare_encoder(registry),
        );
        encoder_ready?;
        for (_, ready) in &prepared {
            if let Err(e) = ready {
                if !e.is_item_error() {
                    return Err(e.clone());
                }
            }
        }

        let options = native_options_for(self.target, self.quality);
        let results: Vec<Result<OutputItem, ConvertError>> = items
            .par_iter()
            .zip(formats.into_par_iter())
            .map(|(item, format)| {
                let format = format?;
                if let Some((_, Err(e))) = prepared.iter().find(|(f, _)| *f == format) {
                    return Err(e.clone());
                }
                self.convert_one(registry, item, format, &options)
            })
            .collect();

        let mut report = BatchReport::default();
        for (index, (item, result)) in items.iter().zip(results).enumerate() {
            match result {
                Ok(output) => report.outputs.push(output),
                Err(e) if e.is_item_error() => {
                    warn!(index, name = %item.name, error = %e, "item failed");
                    report.failures.push(ItemFailure {
                        index,
                        name: item.name.clone(),
                        error: e,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            converted = report.outputs.len(),
            failed = report.failures.len(),
            target_format = %self.target,
            quality = self.quality.get(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch converted"
        );
        Ok(report)
    }

    fn prepare_decoder(
        &self,
        registry: &CodecRegistry,
        format: SupportedFormat,
    ) -> Result<(), ConvertError> {
        self.check_stop()?;
        registry.codec(format).prepare_decoder()?;
        debug!(%format, "decoder ready");
        Ok(())
    }

    fn prepare_encoder(&self, registry: &CodecRegistry) -> Result<(), ConvertError> {
        self.check_stop()?;
        registry.codec(self.target).prepare_encoder()?;
        debug!(format = %self.target, "encoder ready");
        Ok(())
    }

    fn convert_one(
        &self,
        registry: &CodecRegistry,
        item: &InputItem,
        format: SupportedFormat,
        options: &NativeOptions,
    ) -> Result<OutputItem, ConvertError> {
        if let Some(limits) = self.limits {
            limits
                .check_input_size(item.data.len() as u64)
                .map_err(|e| ConvertError::LimitExceeded(format!("{}: {e}", item.name)))?;
        }

        self.check_stop()?;
        let raster = registry.codec(format).decode(&item.data)?;

        if let Some(limits) = self.limits {
            limits
                .check_dimensions(u64::from(raster.width()), u64::from(raster.height()))
                .map_err(|e| ConvertError::LimitExceeded(format!("{}: {e}", item.name)))?;
        }

        self.check_stop()?;
        let data = registry.codec(self.target).encode(&raster, options)?;
        let name = derive_output_name(&item.name, self.target);

        debug!(
            input = %item.name,
            output = %name,
            width = raster.width(),
            height = raster.height(),
            input_bytes = item.data.len(),
            output_bytes = data.len(),
            "converted"
        );
        Ok(OutputItem { name, data })
    }
}

/// Convert a batch with the built-in codecs; any failure fails the batch.
pub fn convert_batch(
    items: &[InputItem],
    target: SupportedFormat,
    quality: Quality,
) -> Result<Vec<OutputItem>, ConvertError> {
    BatchRequest::new(target, quality).convert(items)
}

/// Convert a batch with the built-in codecs and archive the results.
pub fn process_batch(
    items: &[InputItem],
    target: SupportedFormat,
    quality: Quality,
) -> Result<Vec<u8>, ConvertError> {
    BatchRequest::new(target, quality).process(items)
}

/// Replace the final extension of `name` with `target`'s canonical extension.
///
/// `"photo.final.png"` becomes `"photo.final.webp"`; a name without an
/// extension just gains one.
pub fn derive_output_name(name: &str, target: SupportedFormat) -> String {
    let base = match extension_of(name) {
        Some(ext) => &name[..name.len() - ext.len() - 1],
        None => name,
    };
    format!("{base}.{}", target.extension())
}
