use std::sync::Arc;

use kurbo::{PathEl, RoundedRect, Shape};
use resvg::tiny_skia::{
    FillRule, FilterQuality, IntSize, Paint, Pixmap, PixmapPaint, Pattern, SpreadMode, Stroke,
    Transform,
};

use crate::compose::export::ExportArtifact;
use crate::compose::layout::{Layer, StripMetrics, StripPlan, plan_strip};
use crate::compose::stickers::{StickerArt, StickerLibrary};
use crate::compose::text::{FontMeasure, has_text, load_note_fonts, note_svg_options, note_text_element};
use crate::foundation::color::HexColor;
use crate::foundation::config::BoothConfig;
use crate::foundation::core::{
    Affine, Photo, Point, Rect, Size, Vec2, demultiply_rgba8_in_place,
    premultiply_rgba8_in_place,
};
use crate::foundation::error::{BoothError, BoothResult};
use crate::session::wizard::Session;

/// Largest raster edge the compositor will allocate.
const MAX_DIM: u32 = 16_384;

/// Flattens finished sessions into export artifacts.
#[derive(Clone)]
pub struct Compositor {
    metrics: StripMetrics,
    scale: f64,
    stickers: StickerLibrary,
    fonts: Arc<usvg::fontdb::Database>,
    measure: FontMeasure,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("metrics", &self.metrics)
            .field("scale", &self.scale)
            .field("fonts", &self.fonts.len())
            .finish_non_exhaustive()
    }
}

impl Compositor {
    /// Compositor with default metrics, built-in stickers, system fonts, and the given
    /// export scale.
    pub fn new(scale: f64) -> BoothResult<Self> {
        Self::with_fonts(scale, load_note_fonts(None))
    }

    /// Like [`Compositor::new`], with an explicit note font database.
    pub fn with_fonts(scale: f64, fonts: Arc<usvg::fontdb::Database>) -> BoothResult<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(BoothError::validation("export scale must be finite and > 0"));
        }
        Ok(Self {
            metrics: StripMetrics::default(),
            scale,
            stickers: StickerLibrary::builtin()?,
            measure: FontMeasure::new(fonts.clone()),
            fonts,
        })
    }

    /// Compositor configured from `cfg` (export scale, font directory, sticker overrides).
    pub fn from_config(cfg: &BoothConfig) -> BoothResult<Self> {
        let fonts = load_note_fonts(cfg.font_dir.as_deref());
        let mut out = Self::with_fonts(cfg.export.scale, fonts)?;
        if let Some(dir) = &cfg.sticker_dir {
            out.stickers = StickerLibrary::with_overrides(dir)?;
        }
        Ok(out)
    }

    /// Replace the layout metrics.
    pub fn with_metrics(mut self, metrics: StripMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Export scale factor.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Layout of `session`'s strip without rasterizing it.
    pub fn plan(&self, session: &Session) -> BoothResult<StripPlan> {
        plan_strip(session, &self.metrics, &self.measure)
    }

    /// Plan and rasterize `session`'s strip.
    pub fn render(&self, session: &Session) -> BoothResult<ExportArtifact> {
        let plan = self.plan(session)?;
        render_strip(&plan, &self.stickers, &self.fonts, self.scale)
    }
}

/// Rasterize a planned strip at `scale` × its layout size.
///
/// Everything outside the rounded strip stays transparent.
#[tracing::instrument(skip_all, fields(scale = scale, layers = plan.layers.len()))]
pub fn render_strip(
    plan: &StripPlan,
    stickers: &StickerLibrary,
    fonts: &Arc<usvg::fontdb::Database>,
    scale: f64,
) -> BoothResult<ExportArtifact> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(BoothError::render("export scale must be finite and > 0"));
    }
    let width = to_px(plan.size.width * scale)?;
    let height = to_px(plan.size.height * scale)?;
    let mut canvas = Pixmap::new(width, height)
        .ok_or_else(|| BoothError::render("failed to allocate strip pixmap"))?;
    let base = Affine::scale(scale);

    for layer in &plan.layers {
        match layer {
            Layer::Panel {
                rect,
                radius,
                fill,
                border,
            } => draw_panel(&mut canvas, base, *rect, *radius, *fill, *border)?,
            Layer::Photo {
                rect,
                radius,
                backdrop,
                photo,
                ..
            } => {
                draw_panel(&mut canvas, base, *rect, *radius, *backdrop, None)?;
                draw_photo(&mut canvas, base, *rect, *radius, photo)?;
            }
            Layer::Sticker {
                id,
                center,
                size,
                rotation_deg,
                opacity,
                ..
            } => {
                let art = stickers.get(id)?;
                draw_sticker(&mut canvas, scale, art, *center, *size, *rotation_deg, *opacity)?;
            }
            Layer::Note {
                lines,
                origin,
                size,
                rotation_deg,
                radius,
                fill,
                text_color,
                font_px,
                line_px,
                padding,
            } => {
                let svg = note_label_svg(
                    lines, *size, *radius, *fill, *text_color, *font_px, *line_px, *padding,
                );
                let tree = usvg::Tree::from_str(&svg, &note_svg_options(fonts))
                    .map_err(|e| BoothError::render(format!("note label: {e}")))?;
                if lines.iter().any(|l| !l.trim().is_empty()) && !has_text(tree.root()) {
                    tracing::warn!(
                        faces = fonts.len(),
                        "no font could shape the note; label drawn without text"
                    );
                }
                let xf = base
                    * Affine::translate(origin.to_vec2())
                    * Affine::rotate(rotation_deg.to_radians());
                resvg::render(&tree, to_skia(xf), &mut canvas.as_mut());
            }
        }
    }

    let mut rgba8 = canvas.take();
    demultiply_rgba8_in_place(&mut rgba8);
    tracing::debug!(width, height, "strip rasterized");
    Ok(ExportArtifact {
        width,
        height,
        rgba8,
    })
}

fn to_px(v: f64) -> BoothResult<u32> {
    if !v.is_finite() || v < 1.0 {
        return Err(BoothError::render("strip raster would be empty"));
    }
    let px = v.ceil() as u64;
    if px > u64::from(MAX_DIM) {
        return Err(BoothError::render(format!(
            "strip raster too large: {px}px (max {MAX_DIM})"
        )));
    }
    Ok(px as u32)
}

fn to_skia(a: Affine) -> Transform {
    let [sx, ky, kx, sy, tx, ty] = a.as_coeffs();
    Transform::from_row(
        sx as f32, ky as f32, kx as f32, sy as f32, tx as f32, ty as f32,
    )
}

fn rounded_rect_path(rect: Rect, radius: f64) -> BoothResult<resvg::tiny_skia::Path> {
    let shape = RoundedRect::from_rect(rect, radius);
    let mut pb = resvg::tiny_skia::PathBuilder::new();
    for el in shape.path_elements(0.1) {
        match el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(a, b) => pb.quad_to(a.x as f32, a.y as f32, b.x as f32, b.y as f32),
            PathEl::CurveTo(a, b, c) => pb.cubic_to(
                a.x as f32, a.y as f32, b.x as f32, b.y as f32, c.x as f32, c.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
        .ok_or_else(|| BoothError::render(format!("degenerate rectangle {rect:?}")))
}

fn draw_panel(
    canvas: &mut Pixmap,
    base: Affine,
    rect: Rect,
    radius: f64,
    fill: HexColor,
    border: Option<(f64, HexColor)>,
) -> BoothResult<()> {
    let path = rounded_rect_path(rect, radius)?;
    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.set_color(fill.to_skia());
    canvas.fill_path(&path, &paint, FillRule::Winding, to_skia(base), None);

    if let Some((width, color)) = border.filter(|(w, _)| *w > 0.0) {
        let half = width / 2.0;
        let inner = rounded_rect_path(rect.inset(-half), (radius - half).max(0.0))?;
        paint.set_color(color.to_skia());
        let stroke = Stroke {
            width: width as f32,
            ..Stroke::default()
        };
        canvas.stroke_path(&inner, &paint, &stroke, to_skia(base), None);
    }
    Ok(())
}

/// Premultiplied pixmap copy of a photo.
fn photo_pixmap(photo: &Photo) -> BoothResult<Pixmap> {
    let size = IntSize::from_wh(photo.width(), photo.height())
        .ok_or_else(|| BoothError::render("photo has zero size"))?;
    let mut data = photo.rgba8().to_vec();
    premultiply_rgba8_in_place(&mut data);
    Pixmap::from_vec(data, size).ok_or_else(|| BoothError::render("photo buffer size mismatch"))
}

/// Transform mapping photo pixels onto `slot`, scaled to cover it and centered.
fn cover_transform(photo_w: f64, photo_h: f64, slot: Rect) -> Affine {
    let s = (slot.width() / photo_w).max(slot.height() / photo_h);
    let offset = Vec2::new(
        slot.x0 + (slot.width() - photo_w * s) / 2.0,
        slot.y0 + (slot.height() - photo_h * s) / 2.0,
    );
    Affine::translate(offset) * Affine::scale(s)
}

fn draw_photo(
    canvas: &mut Pixmap,
    base: Affine,
    slot: Rect,
    radius: f64,
    photo: &Photo,
) -> BoothResult<()> {
    let pixmap = photo_pixmap(photo)?;
    let cover = cover_transform(f64::from(photo.width()), f64::from(photo.height()), slot);
    let clip = rounded_rect_path(slot, radius)?;

    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.shader = Pattern::new(
        pixmap.as_ref(),
        SpreadMode::Pad,
        FilterQuality::Bilinear,
        1.0,
        to_skia(cover),
    );
    canvas.fill_path(&clip, &paint, FillRule::Winding, to_skia(base), None);
    Ok(())
}

fn draw_sticker(
    canvas: &mut Pixmap,
    scale: f64,
    art: &StickerArt,
    center: Point,
    size: f64,
    rotation_deg: f64,
    opacity: f32,
) -> BoothResult<()> {
    let px = to_px(size * scale)?;
    let mut sprite =
        Pixmap::new(px, px).ok_or_else(|| BoothError::render("failed to allocate sticker"))?;

    match art {
        StickerArt::Vector(tree) => {
            let ts = tree.size();
            let xf = Transform::from_scale(px as f32 / ts.width(), px as f32 / ts.height());
            resvg::render(tree, xf, &mut sprite.as_mut());
        }
        StickerArt::Raster(photo) => {
            let src = photo_pixmap(photo)?;
            let fit = (f64::from(px) / f64::from(photo.width()))
                .min(f64::from(px) / f64::from(photo.height()));
            let offset = Vec2::new(
                (f64::from(px) - f64::from(photo.width()) * fit) / 2.0,
                (f64::from(px) - f64::from(photo.height()) * fit) / 2.0,
            );
            let paint = PixmapPaint {
                quality: FilterQuality::Bilinear,
                ..PixmapPaint::default()
            };
            sprite.draw_pixmap(
                0,
                0,
                src.as_ref(),
                &paint,
                to_skia(Affine::translate(offset) * Affine::scale(fit)),
                None,
            );
        }
    }

    let half = f64::from(px) / 2.0;
    let xf = Affine::translate(center.to_vec2() * scale)
        * Affine::rotate(rotation_deg.to_radians())
        * Affine::translate(Vec2::new(-half, -half));
    let paint = PixmapPaint {
        opacity: opacity.clamp(0.0, 1.0),
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    canvas.draw_pixmap(0, 0, sprite.as_ref(), &paint, to_skia(xf), None);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn note_label_svg(
    lines: &[String],
    size: Size,
    radius: f64,
    fill: HexColor,
    text_color: HexColor,
    font_px: f64,
    line_px: f64,
    padding: (f64, f64),
) -> String {
    let (w, h) = (size.width, size.height);
    let first_baseline = padding.1 + (line_px + font_px * 0.7) / 2.0;
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            r#"<rect x="0" y="0" width="{w}" height="{h}" rx="{r}" ry="{r}" fill="{fill}"/>"#,
            "{text}</svg>"
        ),
        w = w,
        h = h,
        r = radius,
        fill = fill,
        text = note_text_element(lines, padding.0, first_baseline, font_px, line_px, text_color),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/compose/raster.rs"]
mod tests;
