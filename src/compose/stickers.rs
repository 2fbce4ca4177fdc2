use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::customize::palette::{STICKER_IDS, StickerId};
use crate::foundation::core::{Photo, decode_photo};
use crate::foundation::error::{BoothError, BoothResult};

/// Artwork for one sticker.
#[derive(Clone, Debug)]
pub enum StickerArt {
    /// Parsed vector artwork.
    Vector(Arc<usvg::Tree>),
    /// Bitmap artwork.
    Raster(Photo),
}

/// Sticker artwork keyed by [`StickerId`].
///
/// Starts from built-in vector drawings; a directory may override any of them with
/// `<id>.svg` or `<id>.png`.
#[derive(Clone, Debug)]
pub struct StickerLibrary {
    art: BTreeMap<StickerId, StickerArt>,
}

impl StickerLibrary {
    /// The built-in artwork for every known sticker.
    pub fn builtin() -> BoothResult<Self> {
        let mut art = BTreeMap::new();
        for (id, svg) in STICKER_IDS.iter().zip(BUILTIN_SVGS) {
            let tree = parse_svg(svg.as_bytes()).with_context(|| format!("built-in {id}"))?;
            art.insert(StickerId::new(id)?, StickerArt::Vector(Arc::new(tree)));
        }
        Ok(Self { art })
    }

    /// Built-in artwork with overrides loaded from `dir`.
    ///
    /// Files are matched by sticker id; `.svg` wins over `.png` when both exist.
    #[tracing::instrument]
    pub fn with_overrides(dir: &Path) -> BoothResult<Self> {
        if !dir.is_dir() {
            return Err(BoothError::config(format!(
                "sticker directory '{}' does not exist",
                dir.display()
            )));
        }
        let mut lib = Self::builtin()?;
        for id in STICKER_IDS {
            let svg = dir.join(format!("{id}.svg"));
            let png = dir.join(format!("{id}.png"));
            let art = if svg.is_file() {
                let bytes = std::fs::read(&svg)
                    .with_context(|| format!("read sticker '{}'", svg.display()))?;
                let tree = parse_svg(&bytes)
                    .with_context(|| format!("parse sticker '{}'", svg.display()))?;
                StickerArt::Vector(Arc::new(tree))
            } else if png.is_file() {
                let bytes = std::fs::read(&png)
                    .with_context(|| format!("read sticker '{}'", png.display()))?;
                StickerArt::Raster(decode_photo(&bytes)?)
            } else {
                continue;
            };
            tracing::debug!(sticker = id, "sticker artwork overridden");
            lib.art.insert(StickerId::new(id)?, art);
        }
        Ok(lib)
    }

    /// Artwork for `id`.
    pub fn get(&self, id: &StickerId) -> BoothResult<&StickerArt> {
        self.art
            .get(id)
            .ok_or_else(|| BoothError::render(format!("no artwork for sticker {id}")))
    }
}

/// Parse SVG bytes into a `usvg` tree.
fn parse_svg(bytes: &[u8]) -> anyhow::Result<usvg::Tree> {
    let opts = usvg::Options::default();
    Ok(usvg::Tree::from_data(bytes, &opts)?)
}

const BUILTIN_SVGS: [&str; 8] = [
    // heart
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="40" viewBox="0 0 40 40">
  <path d="M20 35 C6 25 2 16 8 10 C13 5 18 7 20 12 C22 7 27 5 32 10 C38 16 34 25 20 35 Z"
        fill="#FF5C8A" stroke="#FFFFFF" stroke-width="2"/>
</svg>"##,
    // star
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="40" viewBox="0 0 40 40">
  <polygon points="20,3 24.7,14.5 37,15.3 27.5,23.2 30.5,35.3 20,28.7 9.5,35.3 12.5,23.2 3,15.3 15.3,14.5"
           fill="#FFD23F" stroke="#E09F00" stroke-width="1.5"/>
</svg>"##,
    // flower
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="40" viewBox="0 0 40 40">
  <g fill="#F7A1C4">
    <circle cx="20" cy="9" r="8"/>
    <circle cx="31" cy="17" r="8"/>
    <circle cx="27" cy="30" r="8"/>
    <circle cx="13" cy="30" r="8"/>
    <circle cx="9" cy="17" r="8"/>
  </g>
  <circle cx="20" cy="21" r="6" fill="#FFD23F"/>
</svg>"##,
    // sun
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="40" viewBox="0 0 40 40">
  <g stroke="#FFA725" stroke-width="3" stroke-linecap="round">
    <line x1="20" y1="2" x2="20" y2="8"/>
    <line x1="20" y1="32" x2="20" y2="38"/>
    <line x1="2" y1="20" x2="8" y2="20"/>
    <line x1="32" y1="20" x2="38" y2="20"/>
    <line x1="7" y1="7" x2="11" y2="11"/>
    <line x1="29" y1="29" x2="33" y2="33"/>
    <line x1="7" y1="33" x2="11" y2="29"/>
    <line x1="29" y1="11" x2="33" y2="7"/>
  </g>
  <circle cx="20" cy="20" r="9" fill="#FFD23F"/>
</svg>"##,
    // sparkle
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="40" viewBox="0 0 40 40">
  <path d="M20 2 Q22 18 38 20 Q22 22 20 38 Q18 22 2 20 Q18 18 20 2 Z" fill="#B6D0FF"
        stroke="#5C7FE8" stroke-width="1"/>
</svg>"##,
    // cloud
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="40" viewBox="0 0 40 40">
  <g fill="#FFFFFF" stroke="#9DB4D6" stroke-width="1.5">
    <circle cx="14" cy="22" r="8"/>
    <circle cx="22" cy="17" r="9"/>
    <circle cx="29" cy="23" r="7"/>
  </g>
  <rect x="12" y="21" width="18" height="9" fill="#FFFFFF"/>
</svg>"##,
    // smiley
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="40" viewBox="0 0 40 40">
  <circle cx="20" cy="20" r="17" fill="#FFE15C" stroke="#C79A00" stroke-width="2"/>
  <circle cx="14" cy="16" r="2.5" fill="#5A3A00"/>
  <circle cx="26" cy="16" r="2.5" fill="#5A3A00"/>
  <path d="M12 24 Q20 32 28 24" fill="none" stroke="#5A3A00" stroke-width="2.5" stroke-linecap="round"/>
</svg>"##,
    // bow
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="40" viewBox="0 0 40 40">
  <path d="M20 20 L4 9 L4 31 Z" fill="#B03052"/>
  <path d="M20 20 L36 9 L36 31 Z" fill="#B03052"/>
  <circle cx="20" cy="20" r="5" fill="#E25C7E"/>
</svg>"##,
];

#[cfg(test)]
#[path = "../../tests/unit/compose/stickers.rs"]
mod tests;
