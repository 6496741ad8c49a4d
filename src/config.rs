//! Codec tuning that the quality slider does not cover.
//!
//! [`CodecConfig`] is consumed when building the built-in registry with
//! [`CodecRegistry::builtin_with_config`](crate::CodecRegistry::builtin_with_config).
//! Unset fields use each codec's default.

/// Format-specific configuration overrides for built-in codecs.
///
/// # Example
///
/// ```
/// use batchconv::{CodecConfig, CodecRegistry};
///
/// let config = CodecConfig::default().with_avif_speed(8);
/// let registry = CodecRegistry::builtin_with_config(&config);
/// # let _ = registry;
/// ```
#[derive(Clone, Default)]
#[non_exhaustive]
pub struct CodecConfig {
    /// AVIF encode speed (1-10, lower = slower/better). Default 4.
    pub avif_speed: Option<u8>,

    /// PNG deflate compression level.
    #[cfg(feature = "png")]
    pub png_compression: Option<png::Compression>,
}

impl CodecConfig {
    /// Set AVIF encode speed (1-10, lower = slower/better).
    pub fn with_avif_speed(mut self, speed: u8) -> Self {
        self.avif_speed = Some(speed);
        self
    }

    /// Set PNG compression level.
    #[cfg(feature = "png")]
    pub fn with_png_compression(mut self, compression: png::Compression) -> Self {
        self.png_compression = Some(compression);
        self
    }
}

impl core::fmt::Debug for CodecConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut d = f.debug_struct("CodecConfig");
        d.field("avif_speed", &self.avif_speed);
        #[cfg(feature = "png")]
        d.field("png_compression", &self.png_compression);
        d.finish()
    }
}
