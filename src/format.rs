//! Supported formats and name-based format detection.

use std::fmt;
use std::str::FromStr;

use crate::ConvertError;

/// Image formats the converter knows about.
///
/// The set is closed: every variant has exactly one entry in a
/// [`CodecRegistry`](crate::CodecRegistry), even when the codec behind it is
/// not compiled in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SupportedFormat {
    Jpeg,
    Png,
    WebP,
    Avif,
    Jxl,
    Qoi,
    Heic,
    Wp2,
}

impl SupportedFormat {
    /// Every format, in registry order.
    pub const ALL: [SupportedFormat; 8] = [
        SupportedFormat::Jpeg,
        SupportedFormat::Png,
        SupportedFormat::WebP,
        SupportedFormat::Avif,
        SupportedFormat::Jxl,
        SupportedFormat::Qoi,
        SupportedFormat::Heic,
        SupportedFormat::Wp2,
    ];

    /// Position in [`ALL`](Self::ALL).
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Detect the format of a file from its name.
    ///
    /// Only the final extension is considered, lower-cased. File contents are
    /// never inspected, so a renamed file is detected by its new name.
    pub fn detect(file_name: &str) -> Result<Self, ConvertError> {
        let ext = extension_of(file_name).unwrap_or("");
        Self::from_extension(ext).ok_or_else(|| ConvertError::UnsupportedFormat(ext.to_lowercase()))
    }

    /// Look up a format by file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" | "jfif" => Some(SupportedFormat::Jpeg),
            "png" => Some(SupportedFormat::Png),
            "webp" => Some(SupportedFormat::WebP),
            "avif" => Some(SupportedFormat::Avif),
            "jxl" => Some(SupportedFormat::Jxl),
            "qoi" => Some(SupportedFormat::Qoi),
            "heic" | "heif" => Some(SupportedFormat::Heic),
            "wp2" => Some(SupportedFormat::Wp2),
            _ => None,
        }
    }

    /// Canonical identifier, also used as the output file extension.
    pub fn extension(self) -> &'static str {
        match self {
            SupportedFormat::Jpeg => "jpeg",
            SupportedFormat::Png => "png",
            SupportedFormat::WebP => "webp",
            SupportedFormat::Avif => "avif",
            SupportedFormat::Jxl => "jxl",
            SupportedFormat::Qoi => "qoi",
            SupportedFormat::Heic => "heic",
            SupportedFormat::Wp2 => "wp2",
        }
    }

    /// All extensions that detect as this format.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            SupportedFormat::Jpeg => &["jpg", "jpeg", "jpe", "jfif"],
            SupportedFormat::Png => &["png"],
            SupportedFormat::WebP => &["webp"],
            SupportedFormat::Avif => &["avif"],
            SupportedFormat::Jxl => &["jxl"],
            SupportedFormat::Qoi => &["qoi"],
            SupportedFormat::Heic => &["heic", "heif"],
            SupportedFormat::Wp2 => &["wp2"],
        }
    }

    /// MIME type string.
    pub fn mime_type(self) -> &'static str {
        match self {
            SupportedFormat::Jpeg => "image/jpeg",
            SupportedFormat::Png => "image/png",
            SupportedFormat::WebP => "image/webp",
            SupportedFormat::Avif => "image/avif",
            SupportedFormat::Jxl => "image/jxl",
            SupportedFormat::Qoi => "image/qoi",
            SupportedFormat::Heic => "image/heic",
            SupportedFormat::Wp2 => "image/wp2",
        }
    }

    /// Whether the format can only store pixels losslessly.
    ///
    /// The quality parameter has no effect on the pixels of these formats.
    pub fn is_lossless_only(self) -> bool {
        matches!(self, SupportedFormat::Png | SupportedFormat::Qoi)
    }

    /// Whether this format supports an alpha channel.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, SupportedFormat::Jpeg)
    }
}

impl fmt::Display for SupportedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for SupportedFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| ConvertError::UnsupportedFormat(s.to_lowercase()))
    }
}

/// The final `.ext` of a file name, if any.
///
/// A leading dot alone (`.hidden`) is treated as an extension, matching how
/// the name is later stripped.
pub(crate) fn extension_of(file_name: &str) -> Option<&str> {
    let dot = file_name.rfind('.')?;
    let ext = &file_name[dot + 1..];
    if ext.is_empty() || ext.contains('/') || ext.contains('\\') {
        None
    } else {
        Some(ext)
    }
}
