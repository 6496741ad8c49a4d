//! ZIP packaging of converted outputs.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use tracing::debug;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::{ConvertError, OutputItem};

/// Package `items` into a single ZIP archive, one entry per item.
///
/// Entry names are the item names reduced to their final path component,
/// with `\` treated as a separator. Names that would collide (compared
/// case-insensitively) fail the whole archive rather than overwrite each
/// other. Entries are Deflate-compressed and written in input order.
pub fn archive(items: &[OutputItem]) -> Result<Vec<u8>, ConvertError> {
    if items.is_empty() {
        return Err(ConvertError::EmptyBatch);
    }

    let mut seen = HashSet::with_capacity(items.len());
    let mut names = Vec::with_capacity(items.len());
    for item in items {
        let name = entry_name(&item.name)?;
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(ConvertError::Archive(format!("duplicate entry name {name:?}")));
        }
        names.push(name);
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, item) in names.into_iter().zip(items) {
        writer.start_file(name, options).map_err(archive_error)?;
        writer.write_all(&item.data).map_err(archive_error)?;
    }
    let bytes = writer.finish().map_err(archive_error)?.into_inner();

    debug!(entries = items.len(), bytes = bytes.len(), "archive written");
    Ok(bytes)
}

fn entry_name(name: &str) -> Result<&str, ConvertError> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base {
        "" | "." | ".." => Err(ConvertError::Archive(format!(
            "invalid entry name {name:?}"
        ))),
        base => Ok(base),
    }
}

fn archive_error(e: impl std::fmt::Display) -> ConvertError {
    ConvertError::Archive(e.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Read;

    use super::*;

    /// Entry names of a ZIP archive in stored order.
    pub(crate) fn entry_names(bytes: &[u8]) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    fn item(name: &str, data: &[u8]) -> OutputItem {
        OutputItem {
            name: name.to_string(),
            data: data.to_vec(),
        }
    }

    #[test]
    fn entries_round_trip() {
        let bytes = archive(&[item("a.webp", b"first"), item("b.webp", b"second")]).unwrap();
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(zip.len(), 2);

        let mut entry = zip.by_name("b.webp").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        assert_eq!(data, b"second");
    }

    #[test]
    fn entries_keep_input_order() {
        let bytes = archive(&[item("z.png", b"1"), item("a.png", b"2"), item("m.png", b"3")]).unwrap();
        assert_eq!(entry_names(&bytes), vec!["z.png", "a.png", "m.png"]);
    }

    #[test]
    fn directories_are_stripped() {
        let bytes = archive(&[item("in/photos/a.jpeg", b"1"), item(r"C:\scans\b.jpeg", b"2")]).unwrap();
        assert_eq!(entry_names(&bytes), vec!["a.jpeg", "b.jpeg"]);
    }

    #[test]
    fn duplicates_rejected() {
        let err = archive(&[item("dir1/a.png", b"1"), item("dir2/A.PNG", b"2")]);
        assert!(matches!(err, Err(ConvertError::Archive(msg)) if msg.contains("duplicate")));
    }

    #[test]
    fn invalid_names_rejected() {
        for name in ["", "dir/", "..", "a/."] {
            assert!(
                matches!(archive(&[item(name, b"1")]), Err(ConvertError::Archive(_))),
                "{name:?}"
            );
        }
    }

    #[test]
    fn empty_archive_rejected() {
        assert!(matches!(archive(&[]), Err(ConvertError::EmptyBatch)));
    }

    #[test]
    fn identical_input_identical_bytes() {
        let items = [item("a.qoi", b"qoif"), item("b.qoi", b"qoif2")];
        assert_eq!(archive(&items).unwrap(), archive(&items).unwrap());
    }
}
