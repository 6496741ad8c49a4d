//! Canonical decoded raster.
//!
//! Every codec decodes into, and encodes from, 8-bit RGBA held in an
//! `imgref::ImgVec` of `rgb::Rgba` pixels.

pub use imgref::{ImgRef, ImgVec};
pub use rgb::{Rgb, Rgba};

use rgb::ComponentBytes;

/// Color space of the raster's channel values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorSpace {
    /// Gamma-encoded sRGB (what every built-in codec produces).
    #[default]
    Srgb,
    /// Linear-light sRGB primaries. Only custom codecs produce this; the
    /// built-in encoders reject it with an encode error.
    LinearSrgb,
}

/// Decoded image in canonical form.
#[derive(Clone, Debug)]
pub struct CanonicalRaster {
    pixels: ImgVec<Rgba<u8>>,
    color_space: ColorSpace,
}

impl CanonicalRaster {
    /// Wrap an RGBA pixel buffer.
    pub fn new(pixels: ImgVec<Rgba<u8>>, color_space: ColorSpace) -> Self {
        Self {
            pixels,
            color_space,
        }
    }

    /// Build a raster from tightly packed RGBA bytes.
    ///
    /// Returns `None` if `bytes.len()` is not `width * height * 4`.
    pub fn from_rgba_bytes(bytes: &[u8], width: u32, height: u32) -> Option<Self> {
        let (w, h) = (width as usize, height as usize);
        if bytes.len() != w.checked_mul(h)?.checked_mul(4)? {
            return None;
        }
        let rgba: &[Rgba<u8>] = bytemuck::cast_slice(bytes);
        Some(Self::new(ImgVec::new(rgba.to_vec(), w, h), ColorSpace::Srgb))
    }

    /// Build a raster from tightly packed RGB bytes, filling alpha with 255.
    pub fn from_rgb_bytes(bytes: &[u8], width: u32, height: u32) -> Option<Self> {
        let (w, h) = (width as usize, height as usize);
        if bytes.len() != w.checked_mul(h)?.checked_mul(3)? {
            return None;
        }
        let rgba = bytes
            .chunks_exact(3)
            .map(|p| Rgba {
                r: p[0],
                g: p[1],
                b: p[2],
                a: 255,
            })
            .collect();
        Some(Self::new(ImgVec::new(rgba, w, h), ColorSpace::Srgb))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.pixels.height() as u32
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// Borrow the pixels as an image reference.
    pub fn as_img(&self) -> ImgRef<'_, Rgba<u8>> {
        self.pixels.as_ref()
    }

    /// Tightly packed RGBA bytes (stride removed if the buffer has padding).
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let (buf, _, _) = self.pixels.as_ref().to_contiguous_buf();
        buf.as_bytes().to_vec()
    }

    /// Tightly packed RGB bytes with alpha dropped.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.width() * self.pixels.height() * 3);
        for px in self.pixels.as_ref().pixels() {
            out.extend_from_slice(&[px.r, px.g, px.b]);
        }
        out
    }

    /// Whether any pixel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.pixels.as_ref().pixels().any(|p| p.a < 255)
    }
}
