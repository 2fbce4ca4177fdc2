use std::fmt;

use serde::{Deserialize, Serialize};

use crate::foundation::color::HexColor;
use crate::foundation::error::{BoothError, BoothResult};

/// Selectable frame colors, in display order.
pub const FRAME_COLORS: [HexColor; 14] = [
    HexColor::rgb(0xFF, 0xB6, 0xC1),
    HexColor::rgb(0xB6, 0xD0, 0xFF),
    HexColor::rgb(0xD6, 0xFF, 0xB6),
    HexColor::rgb(0xFF, 0xD6, 0xB6),
    HexColor::rgb(0xD6, 0xB6, 0xFF),
    HexColor::rgb(0x00, 0x00, 0x00),
    HexColor::rgb(0xFF, 0x57, 0x33),
    HexColor::rgb(0xB0, 0x30, 0x52),
    HexColor::rgb(0xFF, 0xA7, 0x25),
    HexColor::rgb(0x0D, 0x47, 0x15),
    HexColor::rgb(0x70, 0x6D, 0x54),
    HexColor::rgb(0xF6, 0xF1, 0xDE),
    HexColor::rgb(0x2D, 0x32, 0x50),
    HexColor::rgb(0x6C, 0x4E, 0x31),
];

/// Selectable background colors, in display order.
pub const BACKGROUND_COLORS: [HexColor; 14] = [
    HexColor::rgb(0xC5, 0x99, 0xB6),
    HexColor::rgb(0xE6, 0xF9, 0xFF),
    HexColor::rgb(0xCD, 0xC1, 0xFF),
    HexColor::rgb(0xFF, 0xB4, 0xA2),
    HexColor::rgb(0xC6, 0xE2, 0xFF),
    HexColor::rgb(0xFA, 0xDA, 0xDD),
    HexColor::rgb(0xCC, 0xE0, 0xAC),
    HexColor::rgb(0xF0, 0xEA, 0xAC),
    HexColor::rgb(0xEF, 0x9C, 0x66),
    HexColor::rgb(0xCA, 0x87, 0x87),
    HexColor::rgb(0xF1, 0x9E, 0xD2),
    HexColor::rgb(0xD1, 0xBB, 0x9E),
    HexColor::rgb(0xE5, 0xE1, 0xDA),
    HexColor::rgb(0x7B, 0xD3, 0xEA),
];

/// Known sticker identifiers, in display order.
pub const STICKER_IDS: [&str; 8] = [
    "sticker1", "sticker2", "sticker3", "sticker4", "sticker5", "sticker6", "sticker7",
    "sticker8",
];

/// Session background before any customization.
pub const DEFAULT_BACKGROUND: HexColor = HexColor::rgb(0xFF, 0xF9, 0xD6);
/// Session frame color before any customization.
pub const DEFAULT_FRAME: HexColor = HexColor::rgb(0xFF, 0xB6, 0xC1);

/// Background preselected when the customization screen opens.
pub const PRESELECTED_BACKGROUND: HexColor = DEFAULT_BACKGROUND;
/// Frame color preselected when the customization screen opens.
pub const PRESELECTED_FRAME: HexColor = HexColor::rgb(0xC5, 0x99, 0xB6);

/// A validated sticker identifier (one of [`STICKER_IDS`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StickerId(String);

impl StickerId {
    /// Validate a sticker identifier.
    pub fn new(id: &str) -> BoothResult<Self> {
        if STICKER_IDS.contains(&id) {
            Ok(Self(id.to_string()))
        } else {
            Err(BoothError::validation(format!(
                "unknown sticker \"{id}\" (expected one of {})",
                STICKER_IDS.join(", ")
            )))
        }
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StickerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StickerId {
    type Error = BoothError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<StickerId> for String {
    fn from(value: StickerId) -> Self {
        value.0
    }
}

/// Ordered sticker collection carried into the session.
///
/// The customization screen is single-select today; the collection form keeps the
/// session contract stable if multi-select is added.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StickerSelection(Vec<StickerId>);

impl StickerSelection {
    /// Empty selection.
    pub fn none() -> Self {
        Self::default()
    }

    /// Normalize an optional single choice into a collection.
    pub fn single(choice: Option<StickerId>) -> Self {
        Self(choice.into_iter().collect())
    }

    /// Build from several choices, dropping duplicates while keeping first-seen order.
    pub fn from_ids(ids: impl IntoIterator<Item = StickerId>) -> Self {
        let mut out = Vec::new();
        for id in ids {
            if !out.contains(&id) {
                out.push(id);
            }
        }
        Self(out)
    }

    /// Selected stickers in order.
    pub fn iter(&self) -> impl Iterator<Item = &StickerId> {
        self.0.iter()
    }

    /// Number of stickers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `id` is part of the selection.
    pub fn contains(&self, id: &StickerId) -> bool {
        self.0.contains(id)
    }
}

/// Styling submitted by the customization screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomizationChoice {
    /// Strip background color.
    pub background_color: HexColor,
    /// Frame color around the photos.
    pub frame_color: HexColor,
    /// Stickers to place on the strip.
    pub stickers: StickerSelection,
}

/// Selection state of the customization screen.
#[derive(Clone, Debug)]
pub struct Customizer {
    frame_color: HexColor,
    background_color: HexColor,
    sticker: Option<StickerId>,
}

impl Default for Customizer {
    fn default() -> Self {
        Self {
            frame_color: PRESELECTED_FRAME,
            background_color: PRESELECTED_BACKGROUND,
            sticker: None,
        }
    }
}

impl Customizer {
    /// Screen state with the preselected defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame color palette.
    pub fn frame_colors(&self) -> &'static [HexColor] {
        &FRAME_COLORS
    }

    /// Background color palette.
    pub fn background_colors(&self) -> &'static [HexColor] {
        &BACKGROUND_COLORS
    }

    /// Current frame color.
    pub fn frame_color(&self) -> HexColor {
        self.frame_color
    }

    /// Current background color.
    pub fn background_color(&self) -> HexColor {
        self.background_color
    }

    /// Currently selected sticker, if any.
    pub fn selected_sticker(&self) -> Option<&StickerId> {
        self.sticker.as_ref()
    }

    /// Pick a frame color from [`FRAME_COLORS`].
    pub fn select_frame_color(&mut self, color: HexColor) -> BoothResult<()> {
        self.frame_color = pick(&FRAME_COLORS, color, "frame")?;
        Ok(())
    }

    /// Pick a background color from [`BACKGROUND_COLORS`].
    pub fn select_background_color(&mut self, color: HexColor) -> BoothResult<()> {
        self.background_color = pick(&BACKGROUND_COLORS, color, "background")?;
        Ok(())
    }

    /// Pick a frame color by palette position.
    pub fn select_frame_index(&mut self, index: usize) -> BoothResult<()> {
        self.frame_color = pick_index(&FRAME_COLORS, index, "frame")?;
        Ok(())
    }

    /// Pick a background color by palette position.
    pub fn select_background_index(&mut self, index: usize) -> BoothResult<()> {
        self.background_color = pick_index(&BACKGROUND_COLORS, index, "background")?;
        Ok(())
    }

    /// Select `id`, or clear the selection when `id` is already selected.
    ///
    /// Returns the selection after the toggle.
    pub fn toggle_sticker(&mut self, id: &str) -> BoothResult<Option<&StickerId>> {
        let id = StickerId::new(id)?;
        if self.sticker.as_ref() == Some(&id) {
            self.sticker = None;
        } else {
            self.sticker = Some(id);
        }
        Ok(self.sticker.as_ref())
    }

    /// Current selections, verbatim.
    pub fn submit(&self) -> CustomizationChoice {
        CustomizationChoice {
            background_color: self.background_color,
            frame_color: self.frame_color,
            stickers: StickerSelection::single(self.sticker.clone()),
        }
    }
}

fn pick(palette: &[HexColor], color: HexColor, what: &str) -> BoothResult<HexColor> {
    if palette.contains(&color) {
        Ok(color)
    } else {
        Err(BoothError::validation(format!(
            "{color} is not in the {what} palette"
        )))
    }
}

fn pick_index(palette: &[HexColor], index: usize, what: &str) -> BoothResult<HexColor> {
    palette.get(index).copied().ok_or_else(|| {
        BoothError::validation(format!(
            "{what} palette index {index} out of range (0..{})",
            palette.len()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/customize/palette.rs"]
mod tests;
