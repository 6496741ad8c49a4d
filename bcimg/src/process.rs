//! Convert pipeline: expand → load → convert → archive → write.

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, bail};
use batchconv::{
    BatchReport, BatchRequest, CodecConfig, CodecRegistry, InputItem, Limits, OutputItem, Quality,
    SupportedFormat, derive_output_name,
};
use tracing::{info, warn};

use crate::ConvertArgs;
use crate::batch;

/// Run a conversion described by the command line.
pub fn run(args: ConvertArgs) -> anyhow::Result<()> {
    let started = Instant::now();
    let target = args.format.to_format();
    let quality = Quality::new(args.quality)?;

    check_writable(&args.output, args.force)?;

    let files = batch::expand_inputs(&args.files)?;
    if files.is_empty() {
        bail!("no image files found");
    }

    let mut config = CodecConfig::default();
    if let Some(speed) = args.avif_speed {
        config = config.with_avif_speed(speed);
    }
    let registry = CodecRegistry::builtin_with_config(&config);
    if !registry.can_encode(target) {
        bail!("{target} encoding is not available in this build");
    }

    if args.dry_run {
        for path in &files {
            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            let note = match SupportedFormat::detect(&name) {
                Ok(format) if registry.can_decode(format) => String::new(),
                Ok(format) => format!(" (no {format} decoder)"),
                Err(e) => format!(" ({e})"),
            };
            eprintln!(
                "dry-run: {} -> {}{note}",
                path.display(),
                derive_output_name(&name, target)
            );
        }
        return Ok(());
    }

    let inputs = batch::load_inputs(&files, args.jobs)?;
    let limits = Limits {
        max_input_bytes: args.max_input_bytes,
        max_pixels: args.max_pixels,
        ..Limits::default()
    };

    let mut request = BatchRequest::new(target, quality)
        .with_registry(&registry)
        .with_limits(&limits);
    if let Some(jobs) = args.jobs {
        request = request.with_jobs(jobs);
    }

    let report = if args.best_effort {
        let report = request.convert_report(&inputs)?;
        for failure in &report.failures {
            eprintln!("error: {}: {}", failure.name, failure.error);
        }
        if report.outputs.is_empty() {
            bail!("none of {} files converted", inputs.len());
        }
        report
    } else {
        BatchReport {
            outputs: request.convert(&inputs)?,
            failures: Vec::new(),
        }
    };

    let zip = batchconv::archive(&report.outputs)?;
    std::fs::write(&args.output, &zip)
        .with_context(|| format!("writing {}", args.output.display()))?;

    if args.report {
        batch::print_report(&report_rows(&inputs, &report));
    }
    if !report.failures.is_empty() {
        warn!(
            failed = report.failures.len(),
            total = inputs.len(),
            "some files were not converted"
        );
    }

    info!(
        files = report.outputs.len(),
        archive = %args.output.display(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "done"
    );
    eprintln!(
        "{} files -> {} ({})",
        report.outputs.len(),
        args.output.display(),
        batch::format_size(zip.len() as u64),
    );
    Ok(())
}

fn check_writable(output: &Path, force: bool) -> anyhow::Result<()> {
    if output.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }
    if output.is_dir() {
        bail!("{} is a directory", output.display());
    }
    Ok(())
}

/// Pair each output with its input's size.
///
/// Outputs keep input order with failed positions removed, so the inputs
/// whose index is not in a failure line up with the outputs one to one.
fn report_rows<'a>(inputs: &[InputItem], report: &'a BatchReport) -> Vec<(u64, &'a OutputItem)> {
    let failed: HashSet<usize> = report.failures.iter().map(|f| f.index).collect();
    inputs
        .iter()
        .enumerate()
        .filter(|(index, _)| !failed.contains(index))
        .zip(&report.outputs)
        .map(|((_, input), output)| (input.data.len() as u64, output))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use batchconv::{ConvertError, ItemFailure};

    fn output(name: &str, len: usize) -> OutputItem {
        OutputItem {
            name: name.to_string(),
            data: vec![0; len],
        }
    }

    #[test]
    fn rows_skip_failed_inputs() {
        let inputs = vec![
            InputItem::new("a.png", vec![0; 10]),
            InputItem::new("bad.bmp", vec![0; 20]),
            InputItem::new("c.png", vec![0; 30]),
        ];
        let report = BatchReport {
            outputs: vec![output("a.webp", 1), output("c.webp", 2)],
            failures: vec![ItemFailure {
                index: 1,
                name: "bad.bmp".to_string(),
                error: ConvertError::UnsupportedFormat("bmp".to_string()),
            }],
        };
        let rows = report_rows(&inputs, &report);
        let sizes: Vec<_> = rows.iter().map(|(size, out)| (*size, out.name.as_str())).collect();
        assert_eq!(sizes, vec![(10, "a.webp"), (30, "c.webp")]);
    }

    #[test]
    fn rows_pair_by_position_when_names_repeat() {
        // Same base name from two directories; only the second one fails.
        let inputs = vec![
            InputItem::new("a.png", vec![0; 10]),
            InputItem::new("a.png", vec![0; 20]),
        ];
        let report = BatchReport {
            outputs: vec![output("a.webp", 1)],
            failures: vec![ItemFailure {
                index: 1,
                name: "a.png".to_string(),
                error: ConvertError::decode(SupportedFormat::Png, "truncated"),
            }],
        };
        let rows = report_rows(&inputs, &report);
        let sizes: Vec<_> = rows.iter().map(|(size, out)| (*size, out.name.as_str())).collect();
        assert_eq!(sizes, vec![(10, "a.webp")]);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.zip");
        assert!(check_writable(&path, false).is_ok());
        std::fs::write(&path, b"zip").unwrap();
        assert!(check_writable(&path, false).is_err());
        assert!(check_writable(&path, true).is_ok());
        assert!(check_writable(dir.path(), true).is_err());
    }
}
