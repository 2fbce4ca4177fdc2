use std::path::Path;
use std::sync::Arc;

use crate::compose::layout::{GlyphEstimate, TextMeasure};
use crate::foundation::color::HexColor;

/// Font stack requested for note text; unmatched families fall back to generic faces.
pub(crate) const NOTE_FONT_FAMILY: &str = "Prata, Georgia, serif";

/// Font database used for note text: system fonts plus any `.ttf`/`.otf`/`.ttc` in
/// `font_dir`.
pub fn load_note_fonts(font_dir: Option<&Path>) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    if let Some(dir) = font_dir {
        load_fonts_from_dir(&mut db, dir);
    }
    if db.is_empty() {
        tracing::warn!("no fonts found; note labels will be drawn without text");
    } else {
        tracing::debug!(faces = db.len(), "note fonts loaded");
    }
    Arc::new(db)
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}

/// Parse options that resolve note fonts against `fonts`.
pub(crate) fn note_svg_options(fonts: &Arc<usvg::fontdb::Database>) -> usvg::Options<'static> {
    usvg::Options {
        fontdb: fonts.clone(),
        font_resolver: note_font_resolver(),
        ..Default::default()
    }
}

/// Resolver that tries the requested families, then generic sans/serif/mono, then any
/// face at all, so text is never dropped while the database has fonts.
fn note_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }
            families.push(usvg::fontdb::Family::SansSerif);
            families.push(usvg::fontdb::Family::Serif);
            families.push(usvg::fontdb::Family::Monospace);

            let style = match font.style() {
                usvg::FontStyle::Normal => usvg::fontdb::Style::Normal,
                usvg::FontStyle::Italic => usvg::fontdb::Style::Italic,
                usvg::FontStyle::Oblique => usvg::fontdb::Style::Oblique,
            };

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style,
            };

            if let Some(id) = fontdb.query(&query) {
                return Some(id);
            }
            fontdb.faces().next().map(|f| f.id)
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

/// `<text>` element for `lines`, first baseline at `first_baseline`, lines `line_px` apart.
pub(crate) fn note_text_element(
    lines: &[String],
    x: f64,
    first_baseline: f64,
    font_px: f64,
    line_px: f64,
    color: HexColor,
) -> String {
    let mut out = format!(
        r#"<text font-family="{NOTE_FONT_FAMILY}" font-style="italic" font-size="{font_px}" fill="{color}">"#
    );
    for (i, line) in lines.iter().enumerate() {
        let y = first_baseline + (i as f64) * line_px;
        out.push_str(&format!(
            r#"<tspan x="{x}" y="{y}" xml:space="preserve">{}</tspan>"#,
            escape_xml(line)
        ));
    }
    out.push_str("</text>");
    out
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Whether `tree` holds at least one shaped text node.
pub(crate) fn has_text(group: &usvg::Group) -> bool {
    group.children().iter().any(|node| match node {
        usvg::Node::Text(_) => true,
        usvg::Node::Group(g) => has_text(g),
        _ => false,
    })
}

fn text_right_edge(group: &usvg::Group) -> Option<f32> {
    group
        .children()
        .iter()
        .filter_map(|node| match node {
            usvg::Node::Text(t) => Some(t.bounding_box().right()),
            usvg::Node::Group(g) => text_right_edge(g),
            _ => None,
        })
        .reduce(f32::max)
}

/// Measures note lines by shaping them with the same fonts and style the label uses.
///
/// Lines that cannot be shaped (no fonts) fall back to [`GlyphEstimate`].
#[derive(Clone)]
pub struct FontMeasure {
    fonts: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for FontMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontMeasure")
            .field("faces", &self.fonts.len())
            .finish()
    }
}

impl FontMeasure {
    /// Measure with `fonts`.
    pub fn new(fonts: Arc<usvg::fontdb::Database>) -> Self {
        Self { fonts }
    }

    fn shaped_width(&self, line: &str, font_px: f64) -> Option<f64> {
        if line.trim().is_empty() {
            return None;
        }
        let h = font_px * 2.0;
        let w = font_px * (line.chars().count() as f64 + 2.0) * 2.0;
        let text = note_text_element(
            &[line.to_string()],
            0.0,
            font_px,
            font_px,
            font_px,
            HexColor::rgb(0, 0, 0),
        );
        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">{text}</svg>"#
        );
        let tree = usvg::Tree::from_str(&svg, &note_svg_options(&self.fonts)).ok()?;
        text_right_edge(tree.root()).map(f64::from)
    }
}

impl TextMeasure for FontMeasure {
    fn line_width(&self, line: &str, font_px: f64) -> f64 {
        self.shaped_width(line, font_px)
            .unwrap_or_else(|| GlyphEstimate.line_width(line, font_px))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/text.rs"]
mod tests;
