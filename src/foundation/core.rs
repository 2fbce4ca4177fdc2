use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{BoothError, BoothResult};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// A still image held in memory as straight (non-premultiplied) RGBA8.
///
/// Capture and upload both produce `Photo`s, so the compositor does not know which path
/// acquired them. Pixel storage is shared, cloning is cheap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Photo {
    width: u32,
    height: u32,
    rgba8: Arc<Vec<u8>>,
}

impl Photo {
    /// Wrap tightly packed, row-major RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> BoothResult<Self> {
        if width == 0 || height == 0 {
            return Err(BoothError::validation("photo dimensions must be > 0"));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| BoothError::validation("photo dimensions overflow"))?;
        if rgba8.len() != expected {
            return Err(BoothError::validation(format!(
                "photo buffer has {} bytes, expected {expected} for {width}x{height}",
                rgba8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8: Arc::new(rgba8),
        })
    }

    /// A single-color photo.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> BoothResult<Self> {
        let n = (width as usize) * (height as usize);
        Self::from_rgba8(width, height, rgba.repeat(n))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw straight-alpha RGBA8 bytes.
    pub fn rgba8(&self) -> &[u8] {
        &self.rgba8
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = &self.rgba8[i..i + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Encode as PNG bytes.
    pub fn encode_png(&self) -> BoothResult<Vec<u8>> {
        encode_png_rgba8(self.width, self.height, &self.rgba8)
    }
}

/// Decode encoded image bytes (any format the `image` crate reads) into a [`Photo`].
pub fn decode_photo(bytes: &[u8]) -> BoothResult<Photo> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Photo::from_rgba8(width, height, rgba.into_raw())
}

pub(crate) fn encode_png_rgba8(width: u32, height: u32, rgba8: &[u8]) -> BoothResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(width, height, rgba8.to_vec())
        .ok_or_else(|| BoothError::render("rgba buffer does not match dimensions"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn demultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
