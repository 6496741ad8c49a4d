//! Input expansion, file loading, and batch reporting.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use batchconv::{InputItem, OutputItem, SupportedFormat};
use rayon::prelude::*;
use tracing::warn;

/// Expand input patterns into a deduplicated list of image files.
///
/// Handles:
/// - Glob patterns (containing `*`, `?`, `[`)
/// - Plain file paths, kept even when the extension is not recognized
/// - Directories (recursive image discovery)
///
/// Order follows the patterns; directory contents are sorted by path.
pub fn expand_inputs(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            for entry in glob::glob(pattern)? {
                let path = entry?;
                if path.is_file() && is_image(&path) {
                    push_unique(path, &mut seen, &mut files);
                }
            }
        } else {
            let path = PathBuf::from(pattern);
            if path.is_dir() {
                let mut found = Vec::new();
                for_each_image_in_dir(&path, &mut found);
                found.sort();
                for path in found {
                    push_unique(path, &mut seen, &mut files);
                }
            } else if path.is_file() {
                push_unique(path, &mut seen, &mut files);
            } else {
                anyhow::bail!("not a file or directory: {}", path.display());
            }
        }
    }

    Ok(files)
}

fn push_unique(path: PathBuf, seen: &mut HashSet<PathBuf>, files: &mut Vec<PathBuf>) {
    if let Ok(canonical) = path.canonicalize() {
        if seen.insert(canonical) {
            files.push(path);
        }
    }
}

/// Check if a file path has a recognized image extension.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(SupportedFormat::from_extension)
        .is_some()
}

/// Recursively find image files in a directory.
fn for_each_image_in_dir(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            for_each_image_in_dir(&path, files);
        } else if path.is_file() && is_image(&path) {
            files.push(path);
        }
    }
}

/// Read every file into an [`InputItem`] named by its file name.
///
/// With `jobs` set, reads run on a pool of that many threads instead of the
/// global one.
pub fn load_inputs(files: &[PathBuf], jobs: Option<usize>) -> anyhow::Result<Vec<InputItem>> {
    let read = || -> anyhow::Result<Vec<InputItem>> {
        files
            .par_iter()
            .map(|path| {
                let data =
                    std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .with_context(|| format!("no file name: {}", path.display()))?;
                Ok(InputItem::new(name, data))
            })
            .collect()
    };
    if let Some(jobs) = jobs {
        match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
            Ok(pool) => return pool.install(read),
            Err(e) => warn!(jobs, error = %e, "failed to build thread pool, using global pool"),
        }
    }
    read()
}

/// Print a per-file size table. Each row pairs an input size with its output.
pub fn print_report(rows: &[(u64, &OutputItem)]) {
    println!(
        "{:<40} {:>10} {:>10} {:>8}",
        "File", "Input", "Output", "Change"
    );
    println!("{}", "-".repeat(72));

    for &(input_size, output) in rows {
        println!(
            "{:<40} {:>10} {:>10} {:>8}",
            shorten(&output.name),
            format_size(input_size),
            format_size(output.data.len() as u64),
            change(input_size, output.data.len() as u64),
        );
    }

    println!("{}", "-".repeat(72));
    let total_in: u64 = rows.iter().map(|(size, _)| size).sum();
    let total_out: u64 = rows.iter().map(|(_, o)| o.data.len() as u64).sum();
    println!(
        "{} converted | {} -> {} ({})",
        rows.len(),
        format_size(total_in),
        format_size(total_out),
        change(total_in, total_out),
    );
}

fn shorten(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() > 38 {
        let tail: String = chars[chars.len() - 36..].iter().collect();
        format!("..{tail}")
    } else {
        name.to_string()
    }
}

fn change(before: u64, after: u64) -> String {
    if before > 0 {
        let pct = (after as f64 - before as f64) / before as f64 * 100.0;
        format!("{pct:+.1}%")
    } else {
        "N/A".to_string()
    }
}

/// Format a byte size into a human-readable string.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn change_percent() {
        assert_eq!(change(100, 50), "-50.0%");
        assert_eq!(change(0, 50), "N/A");
    }

    #[test]
    fn image_extensions() {
        assert!(is_image(Path::new("a/b.JPG")));
        assert!(is_image(Path::new("x.wp2")));
        assert!(!is_image(Path::new("notes.txt")));
        assert!(!is_image(Path::new("Makefile")));
    }

    #[test]
    fn expands_directories_and_globs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.png"), b"1").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"22").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/c.qoi"), b"333").unwrap();

        let root = dir.path().to_string_lossy().into_owned();
        let files = expand_inputs(&[root.clone(), format!("{root}/*.png")]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        // b.png appears once despite matching both patterns
        assert_eq!(names, vec!["a.jpg", "b.png", "c.qoi"]);

        let items = load_inputs(&files, None).unwrap();
        assert_eq!(items[2].name, "c.qoi");
        assert_eq!(items[2].data, b"333");
    }

    #[test]
    fn loads_on_a_sized_pool_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let files: Vec<_> = (0..6)
            .map(|i| {
                let path = dir.path().join(format!("img{i}.png"));
                std::fs::write(&path, vec![i as u8; i + 1]).unwrap();
                path
            })
            .collect();

        let items = load_inputs(&files, Some(2)).unwrap();
        let loaded: Vec<_> = items.iter().map(|i| (i.name.as_str(), i.data.len())).collect();
        assert_eq!(
            loaded,
            vec![
                ("img0.png", 1),
                ("img1.png", 2),
                ("img2.png", 3),
                ("img3.png", 4),
                ("img4.png", 5),
                ("img5.png", 6),
            ]
        );
        assert!(load_inputs(&[dir.path().join("missing.png")], Some(2)).is_err());
    }

    #[test]
    fn missing_input_is_an_error() {
        assert!(expand_inputs(&["/definitely/not/here.png".to_string()]).is_err());
    }
}
