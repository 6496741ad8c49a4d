//! bcimg: batch image converter.
//!
//! Converts every input image to one target format at a shared quality and
//! writes the results into a single ZIP archive.

mod batch;
mod process;

use std::path::PathBuf;

use batchconv::SupportedFormat;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Convert a batch of images to one format and bundle them into a ZIP.
#[derive(Parser, Debug)]
#[command(name = "bcimg", version)]
pub struct ConvertArgs {
    /// Input files, directories, or glob patterns.
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Target output format.
    #[arg(short, long, value_enum)]
    pub format: FormatArg,

    /// Quality (0-100), mapped onto each codec's native setting.
    #[arg(short, long, default_value_t = 75, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub quality: u32,

    /// Output archive path.
    #[arg(short, long, default_value = "converted.zip")]
    pub output: PathBuf,

    /// Allow overwriting an existing archive.
    #[arg(long)]
    pub force: bool,

    /// Show what would be converted without encoding anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Archive the images that converted and report the rest, instead of
    /// failing the whole batch on the first error.
    #[arg(long)]
    pub best_effort: bool,

    /// Number of parallel workers (default: CPU count).
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Reject inputs larger than this many bytes. A rejected input fails the
    /// batch unless --best-effort is set.
    #[arg(long)]
    pub max_input_bytes: Option<u64>,

    /// Reject images with more pixels than this.
    #[arg(long)]
    pub max_pixels: Option<u64>,

    /// AVIF encoder speed (1-10, lower = slower/better).
    #[arg(long, env = "BCIMG_AVIF_SPEED")]
    pub avif_speed: Option<u8>,

    /// Print a per-file size report.
    #[arg(long)]
    pub report: bool,

    /// More logging (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Target image format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Jpeg,
    Png,
    Webp,
    Avif,
    Jxl,
    Qoi,
    Heic,
    Wp2,
}

impl FormatArg {
    pub fn to_format(self) -> SupportedFormat {
        match self {
            FormatArg::Jpeg => SupportedFormat::Jpeg,
            FormatArg::Png => SupportedFormat::Png,
            FormatArg::Webp => SupportedFormat::WebP,
            FormatArg::Avif => SupportedFormat::Avif,
            FormatArg::Jxl => SupportedFormat::Jxl,
            FormatArg::Qoi => SupportedFormat::Qoi,
            FormatArg::Heic => SupportedFormat::Heic,
            FormatArg::Wp2 => SupportedFormat::Wp2,
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = ConvertArgs::parse();
    init_logging(args.verbose);
    process::run(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_invocation() {
        let args = ConvertArgs::try_parse_from(["bcimg", "-f", "webp", "a.png", "b.jpg"]).unwrap();
        assert_eq!(args.format, FormatArg::Webp);
        assert_eq!(args.quality, 75);
        assert_eq!(args.output, PathBuf::from("converted.zip"));
        assert_eq!(args.files, vec!["a.png", "b.jpg"]);
        assert!(!args.best_effort);
    }

    #[test]
    fn rejects_out_of_range_quality() {
        assert!(ConvertArgs::try_parse_from(["bcimg", "-f", "png", "-q", "101", "a.png"]).is_err());
        assert!(ConvertArgs::try_parse_from(["bcimg", "-f", "png", "-q", "100", "a.png"]).is_ok());
    }

    #[test]
    fn format_is_required() {
        assert!(ConvertArgs::try_parse_from(["bcimg", "a.png"]).is_err());
    }

    #[test]
    fn every_format_is_selectable() {
        let mut formats: Vec<_> = FormatArg::value_variants()
            .iter()
            .map(|arg| arg.to_format())
            .collect();
        formats.sort();
        formats.dedup();
        let mut all = SupportedFormat::ALL.to_vec();
        all.sort();
        assert_eq!(formats, all);
    }

    #[test]
    fn jobs_and_input_limit_parse() {
        let args = ConvertArgs::try_parse_from([
            "bcimg", "-j", "2", "--max-input-bytes", "4096", "-f", "png", "a.jpg",
        ])
        .unwrap();
        assert_eq!(args.jobs, Some(2));
        assert_eq!(args.max_input_bytes, Some(4096));
    }

    #[test]
    fn verbosity_counts() {
        let args = ConvertArgs::try_parse_from(["bcimg", "-vv", "-f", "qoi", "x.png"]).unwrap();
        assert_eq!(args.verbose, 2);
    }
}
