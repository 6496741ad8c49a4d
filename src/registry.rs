//! Codec capability table indexed by format.

use std::fmt;
use std::sync::Arc;

use crate::codecs::{Codec, Unavailable};
use crate::config::CodecConfig;
use crate::SupportedFormat;

/// Set of formats represented as bitflags.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatSet(u8);

impl FormatSet {
    pub const EMPTY: Self = FormatSet(0);

    fn bit(format: SupportedFormat) -> u8 {
        1 << format.index()
    }

    pub fn contains(self, format: SupportedFormat) -> bool {
        (self.0 & Self::bit(format)) != 0
    }

    /// Add a format; returns `true` if it was not already present.
    pub fn insert(&mut self, format: SupportedFormat) -> bool {
        let added = !self.contains(format);
        self.0 |= Self::bit(format);
        added
    }

    pub fn remove(&mut self, format: SupportedFormat) {
        self.0 &= !Self::bit(format);
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in registry order.
    pub fn iter(self) -> impl Iterator<Item = SupportedFormat> {
        SupportedFormat::ALL
            .into_iter()
            .filter(move |&f| self.contains(f))
    }
}

impl FromIterator<SupportedFormat> for FormatSet {
    fn from_iter<I: IntoIterator<Item = SupportedFormat>>(iter: I) -> Self {
        let mut set = FormatSet::EMPTY;
        for format in iter {
            set.insert(format);
        }
        set
    }
}

impl fmt::Debug for FormatSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// One codec per supported format.
///
/// Built-in adapters are selected at compile time by cargo features; any entry
/// can be replaced at runtime with [`with_codec`](Self::with_codec). The
/// registry is immutable once a batch starts and is shared by all workers.
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: [Arc<dyn Codec>; 8],
}

impl CodecRegistry {
    /// Every format backed by [`Unavailable`].
    pub fn none() -> Self {
        Self {
            codecs: SupportedFormat::ALL.map(|f| Arc::new(Unavailable(f)) as Arc<dyn Codec>),
        }
    }

    /// All compiled-in codecs with default settings.
    pub fn builtin() -> Self {
        Self::builtin_with_config(&CodecConfig::default())
    }

    /// All compiled-in codecs, tuned by `config`.
    #[allow(unused_mut, unused_variables)]
    pub fn builtin_with_config(config: &CodecConfig) -> Self {
        let mut registry = Self::none();

        #[cfg(feature = "jpeg")]
        {
            registry = registry.with_codec(Arc::new(crate::codecs::jpeg::JpegCodec));
        }
        #[cfg(feature = "png")]
        {
            let compression = config.png_compression.unwrap_or_default();
            registry = registry.with_codec(Arc::new(crate::codecs::png::PngCodec::new(compression)));
        }
        #[cfg(feature = "webp")]
        {
            registry = registry.with_codec(Arc::new(crate::codecs::webp::WebpCodec));
        }
        #[cfg(any(feature = "avif-encode", feature = "avif-decode"))]
        {
            let speed = config
                .avif_speed
                .unwrap_or(crate::codecs::avif::DEFAULT_SPEED);
            registry = registry.with_codec(Arc::new(crate::codecs::avif::AvifCodec::new(speed)));
        }
        #[cfg(feature = "jxl")]
        {
            registry = registry.with_codec(Arc::new(crate::codecs::jxl::JxlCodec));
        }
        #[cfg(feature = "qoi")]
        {
            registry = registry.with_codec(Arc::new(crate::codecs::qoi::QoiCodec));
        }
        #[cfg(feature = "heic")]
        {
            registry = registry.with_codec(Arc::new(crate::codecs::heic::HeicCodec));
        }

        registry
    }

    /// Replace the entry for `codec.format()`.
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        let index = codec.format().index();
        self.codecs[index] = codec;
        self
    }

    /// The codec registered for `format`.
    pub fn codec(&self, format: SupportedFormat) -> &Arc<dyn Codec> {
        &self.codecs[format.index()]
    }

    /// Is this format backed by a real decoder?
    pub fn can_decode(&self, format: SupportedFormat) -> bool {
        self.codec(format).can_decode()
    }

    /// Is this format backed by a real encoder?
    pub fn can_encode(&self, format: SupportedFormat) -> bool {
        self.codec(format).can_encode()
    }

    /// Formats with a working decoder.
    pub fn decodable_formats(&self) -> FormatSet {
        SupportedFormat::ALL
            .into_iter()
            .filter(|&f| self.can_decode(f))
            .collect()
    }

    /// Formats with a working encoder.
    pub fn encodable_formats(&self) -> FormatSet {
        SupportedFormat::ALL
            .into_iter()
            .filter(|&f| self.can_encode(f))
            .collect()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("decode", &self.decodable_formats())
            .field("encode", &self.encodable_formats())
            .finish()
    }
}
