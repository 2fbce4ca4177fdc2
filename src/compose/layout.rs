use crate::customize::palette::StickerId;
use crate::foundation::color::HexColor;
use crate::foundation::core::{Photo, Point, Rect, Size};
use crate::foundation::error::{BoothError, BoothResult};
use crate::session::wizard::{PHOTOS_PER_STRIP, Session};

/// Geometry and fixed colors of the strip, in layout pixels (before export scaling).
#[derive(Clone, Debug, PartialEq)]
pub struct StripMetrics {
    /// Outer border width.
    pub border: f64,
    /// Border color.
    pub border_color: HexColor,
    /// Space between border and frame.
    pub padding: f64,
    /// Outer corner radius.
    pub radius: f64,
    /// Space between frame edge and photos.
    pub frame_padding: f64,
    /// Vertical gap between photos.
    pub photo_gap: f64,
    /// Frame corner radius.
    pub frame_radius: f64,
    /// Edge length of each (square) photo slot.
    pub photo_size: f64,
    /// Photo corner radius.
    pub photo_radius: f64,
    /// Fill behind photos that do not cover their slot.
    pub photo_backdrop: HexColor,
    /// Top-left anchor of the note label.
    pub note_anchor: Point,
    /// Note label rotation about its top-left corner, in degrees.
    pub note_rotation_deg: f64,
    /// Note text size.
    pub note_font_px: f64,
    /// Note line height.
    pub note_line_px: f64,
    /// Horizontal and vertical padding inside the note label.
    pub note_padding: (f64, f64),
    /// Note label corner radius.
    pub note_radius: f64,
    /// Note label fill.
    pub note_fill: HexColor,
    /// Note text color.
    pub note_text: HexColor,
    /// Sticker edge length.
    pub sticker_size: f64,
    /// Sticker opacity.
    pub sticker_opacity: f32,
}

impl Default for StripMetrics {
    fn default() -> Self {
        Self {
            border: 4.0,
            border_color: HexColor::rgb(0xE5, 0xE7, 0xEB),
            padding: 24.0,
            radius: 8.0,
            frame_padding: 16.0,
            photo_gap: 8.0,
            frame_radius: 8.0,
            photo_size: 128.0,
            photo_radius: 6.0,
            photo_backdrop: HexColor::rgb(0, 0, 0),
            note_anchor: Point::new(12.0, 12.0),
            note_rotation_deg: -6.0,
            note_font_px: 14.0,
            note_line_px: 20.0,
            note_padding: (8.0, 4.0),
            note_radius: 6.0,
            note_fill: HexColor::rgb(0xC4, 0xA4, 0x84),
            note_text: HexColor::rgb(0xFF, 0xFF, 0xFF),
            sticker_size: 40.0,
            sticker_opacity: 0.8,
        }
    }
}

/// Width of a line of note text, in layout pixels.
pub trait TextMeasure {
    /// Width of `line` set at `font_px`.
    fn line_width(&self, line: &str, font_px: f64) -> f64;
}

/// Font-free estimate: every character advances 0.55em.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlyphEstimate;

impl TextMeasure for GlyphEstimate {
    fn line_width(&self, line: &str, font_px: f64) -> f64 {
        line.chars().count() as f64 * font_px * 0.55
    }
}

/// Photo corner a sticker is pinned to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    /// Upper right.
    TopRight,
    /// Lower left.
    BottomLeft,
    /// Upper left.
    TopLeft,
    /// Lower right.
    BottomRight,
}

const CORNER_CYCLE: [Corner; 4] = [
    Corner::TopRight,
    Corner::BottomLeft,
    Corner::TopLeft,
    Corner::BottomRight,
];

impl Corner {
    fn point(self, rect: Rect) -> Point {
        match self {
            Self::TopRight => Point::new(rect.x1, rect.y0),
            Self::BottomLeft => Point::new(rect.x0, rect.y1),
            Self::TopLeft => Point::new(rect.x0, rect.y0),
            Self::BottomRight => Point::new(rect.x1, rect.y1),
        }
    }

    fn tilt_deg(self) -> f64 {
        match self {
            Self::TopRight => 12.0,
            Self::BottomLeft => -12.0,
            Self::TopLeft => -8.0,
            Self::BottomRight => 8.0,
        }
    }
}

/// One drawable element of the strip, in paint order.
#[derive(Clone, Debug, PartialEq)]
pub enum Layer {
    /// Rounded filled rectangle, optionally with an inner border.
    Panel {
        /// Outer bounds.
        rect: Rect,
        /// Corner radius.
        radius: f64,
        /// Fill color.
        fill: HexColor,
        /// Border width and color.
        border: Option<(f64, HexColor)>,
    },
    /// A photo cropped to cover its slot.
    Photo {
        /// Position in capture order.
        index: usize,
        /// Slot bounds.
        rect: Rect,
        /// Corner radius.
        radius: f64,
        /// Fill shown behind the photo.
        backdrop: HexColor,
        /// The still.
        photo: Photo,
    },
    /// A sticker centered on a photo corner.
    Sticker {
        /// Which artwork.
        id: StickerId,
        /// Photo the sticker is pinned to.
        photo_index: usize,
        /// Pinned corner.
        corner: Corner,
        /// Center point.
        center: Point,
        /// Edge length.
        size: f64,
        /// Tilt in degrees.
        rotation_deg: f64,
        /// Opacity in `0..=1`.
        opacity: f32,
    },
    /// The note label.
    Note {
        /// Wrapped lines.
        lines: Vec<String>,
        /// Top-left anchor (rotation pivot).
        origin: Point,
        /// Unrotated label size.
        size: Size,
        /// Rotation in degrees.
        rotation_deg: f64,
        /// Corner radius.
        radius: f64,
        /// Label fill.
        fill: HexColor,
        /// Text color.
        text_color: HexColor,
        /// Text size.
        font_px: f64,
        /// Line height.
        line_px: f64,
        /// Inner padding.
        padding: (f64, f64),
    },
}

/// Resolved layout of a strip: every layer positioned, nothing rasterized yet.
#[derive(Clone, Debug, PartialEq)]
pub struct StripPlan {
    /// Strip size in layout pixels.
    pub size: Size,
    /// Layers in paint order.
    pub layers: Vec<Layer>,
}

impl StripPlan {
    /// Photo layers in paint order.
    pub fn photos(&self) -> impl Iterator<Item = (usize, &Photo)> {
        self.layers.iter().filter_map(|l| match l {
            Layer::Photo { index, photo, .. } => Some((*index, photo)),
            _ => None,
        })
    }

    /// Sticker layers in paint order.
    pub fn stickers(&self) -> impl Iterator<Item = &StickerId> {
        self.layers.iter().filter_map(|l| match l {
            Layer::Sticker { id, .. } => Some(id),
            _ => None,
        })
    }

    /// Note text, lines joined by `\n`, if the strip has a note.
    pub fn note_text(&self) -> Option<String> {
        self.layers.iter().find_map(|l| match l {
            Layer::Note { lines, .. } => Some(lines.join("\n")),
            _ => None,
        })
    }
}

/// Lay out a session's strip.
///
/// Paint order is background panel, frame panel, photos, stickers, note. The note is
/// drawn once, as its own label layer, wrapped and sized with `measure` so every line
/// fits inside the label and the label fits inside the strip.
pub fn plan_strip(
    session: &Session,
    m: &StripMetrics,
    measure: &dyn TextMeasure,
) -> BoothResult<StripPlan> {
    let photos = session.photos();
    if photos.len() != PHOTOS_PER_STRIP {
        return Err(BoothError::incomplete(format!(
            "a strip needs {PHOTOS_PER_STRIP} photos, session has {}",
            photos.len()
        )));
    }

    let n = photos.len() as f64;
    let frame_w = m.frame_padding * 2.0 + m.photo_size;
    let frame_h = m.frame_padding * 2.0 + m.photo_size * n + m.photo_gap * (n - 1.0);
    let inset = m.border + m.padding;
    let size = Size::new(frame_w + inset * 2.0, frame_h + inset * 2.0);

    let mut layers = Vec::with_capacity(photos.len() + session.stickers().len() + 3);
    layers.push(Layer::Panel {
        rect: Rect::from_origin_size(Point::ORIGIN, size),
        radius: m.radius,
        fill: session.background_color(),
        border: Some((m.border, m.border_color)),
    });

    let frame = Rect::new(inset, inset, inset + frame_w, inset + frame_h);
    layers.push(Layer::Panel {
        rect: frame,
        radius: m.frame_radius,
        fill: session.frame_color(),
        border: None,
    });

    let slots: Vec<Rect> = (0..photos.len())
        .map(|i| {
            let x0 = frame.x0 + m.frame_padding;
            let y0 = frame.y0 + m.frame_padding + (i as f64) * (m.photo_size + m.photo_gap);
            Rect::new(x0, y0, x0 + m.photo_size, y0 + m.photo_size)
        })
        .collect();

    for (index, (photo, rect)) in photos.iter().zip(&slots).enumerate() {
        layers.push(Layer::Photo {
            index,
            rect: *rect,
            radius: m.photo_radius,
            backdrop: m.photo_backdrop,
            photo: photo.clone(),
        });
    }

    for (i, id) in session.stickers().iter().enumerate() {
        let photo_index = i % slots.len();
        let corner = CORNER_CYCLE[(i / slots.len()) % CORNER_CYCLE.len()];
        layers.push(Layer::Sticker {
            id: id.clone(),
            photo_index,
            corner,
            center: corner.point(slots[photo_index]),
            size: m.sticker_size,
            rotation_deg: corner.tilt_deg(),
            opacity: m.sticker_opacity,
        });
    }

    if !session.note().trim().is_empty() {
        let max_label_w = size.width - m.note_anchor.x * 2.0;
        let max_text_w = (max_label_w - m.note_padding.0 * 2.0).max(0.0);
        let width_of = |line: &str| measure.line_width(line, m.note_font_px);
        let lines = wrap_note(session.note(), |line| width_of(line) <= max_text_w);
        let widest = lines.iter().map(|l| width_of(l)).fold(0.0, f64::max);
        let label = Size::new(
            (widest + m.note_padding.0 * 2.0).ceil().min(max_label_w),
            lines.len() as f64 * m.note_line_px + m.note_padding.1 * 2.0,
        );
        layers.push(Layer::Note {
            lines,
            origin: m.note_anchor,
            size: label,
            rotation_deg: m.note_rotation_deg,
            radius: m.note_radius,
            fill: m.note_fill,
            text_color: m.note_text,
            font_px: m.note_font_px,
            line_px: m.note_line_px,
            padding: m.note_padding,
        });
    }

    tracing::debug!(
        width = size.width,
        height = size.height,
        layers = layers.len(),
        "strip planned"
    );
    Ok(StripPlan { size, layers })
}

/// Greedy word wrap: a line grows while `fits` accepts it. Explicit newlines are kept
/// and words that never fit are split by character (at least one per line).
fn wrap_note(text: &str, fits: impl Fn(&str) -> bool) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.trim().lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if fits(&candidate) {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                if fits(word) {
                    line = word.to_string();
                    continue;
                }
            }
            for c in word.chars() {
                line.push(c);
                if line.chars().count() > 1 && !fits(&line) {
                    line.pop();
                    lines.push(std::mem::replace(&mut line, c.to_string()));
                }
            }
        }
        if !line.is_empty() || paragraph.trim().is_empty() {
            lines.push(line);
        }
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/compose/layout.rs"]
mod tests;
