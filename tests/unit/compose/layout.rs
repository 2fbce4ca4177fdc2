use super::*;
use crate::customize::palette::{CustomizationChoice, StickerSelection};

fn sample_session(note: &str, stickers: &[&str]) -> Session {
    let photos = vec![
        Photo::solid(4, 4, [255, 0, 0, 255]).unwrap(),
        Photo::solid(4, 4, [0, 255, 0, 255]).unwrap(),
        Photo::solid(4, 4, [0, 0, 255, 255]).unwrap(),
    ];
    let choice = CustomizationChoice {
        background_color: HexColor::parse("#FFF9D6").unwrap(),
        frame_color: HexColor::parse("#FFB6C1").unwrap(),
        stickers: StickerSelection::from_ids(stickers.iter().map(|s| StickerId::new(s).unwrap())),
    };
    Session::finished(photos, note, choice).unwrap()
}

fn default_plan(session: &Session) -> BoothResult<StripPlan> {
    plan_strip(session, &StripMetrics::default(), &GlyphEstimate)
}

#[test]
fn plan_has_photos_in_order_note_and_one_sticker() {
    let session = sample_session("hi", &["sticker1"]);
    let plan = default_plan(&session).unwrap();

    let photos: Vec<_> = plan.photos().collect();
    assert_eq!(photos.len(), 3);
    for (i, (index, photo)) in photos.iter().enumerate() {
        assert_eq!(*index, i);
        assert_eq!(*photo, &session.photos()[i]);
    }
    assert_eq!(plan.note_text().as_deref(), Some("hi"));
    assert_eq!(plan.stickers().count(), 1);
}

#[test]
fn strip_size_follows_metrics() {
    let plan = default_plan(&sample_session("", &[])).unwrap();
    assert_eq!(plan.size, Size::new(216.0, 488.0));
    assert!(plan.note_text().is_none());
    assert_eq!(plan.stickers().count(), 0);
}

#[test]
fn photos_stack_top_to_bottom_inside_frame() {
    let plan = default_plan(&sample_session("", &[])).unwrap();
    let rects: Vec<Rect> = plan
        .layers
        .iter()
        .filter_map(|l| match l {
            Layer::Photo { rect, .. } => Some(*rect),
            _ => None,
        })
        .collect();
    assert_eq!(rects[0], Rect::new(44.0, 44.0, 172.0, 172.0));
    assert_eq!(rects[1].y0, 180.0);
    assert_eq!(rects[2].y1, 444.0);
}

#[test]
fn paint_order_is_background_frame_photos_stickers_note() {
    let plan = default_plan(&sample_session("hey", &["sticker2"])).unwrap();
    let kinds: Vec<&str> = plan
        .layers
        .iter()
        .map(|l| match l {
            Layer::Panel { .. } => "panel",
            Layer::Photo { .. } => "photo",
            Layer::Sticker { .. } => "sticker",
            Layer::Note { .. } => "note",
        })
        .collect();
    assert_eq!(
        kinds,
        ["panel", "panel", "photo", "photo", "photo", "sticker", "note"]
    );
    match &plan.layers[0] {
        Layer::Panel { fill, .. } => assert_eq!(fill.to_string(), "#FFF9D6"),
        other => panic!("unexpected first layer {other:?}"),
    }
}

#[test]
fn stickers_pin_to_photo_corners_deterministically() {
    let session = sample_session("", &["sticker1", "sticker2", "sticker3", "sticker4"]);
    let a = default_plan(&session).unwrap();
    let b = default_plan(&session).unwrap();
    assert_eq!(a, b);

    let pins: Vec<(usize, Corner, Point)> = a
        .layers
        .iter()
        .filter_map(|l| match l {
            Layer::Sticker {
                photo_index,
                corner,
                center,
                ..
            } => Some((*photo_index, *corner, *center)),
            _ => None,
        })
        .collect();
    assert_eq!(pins[0], (0, Corner::TopRight, Point::new(172.0, 44.0)));
    assert_eq!(pins[1].0, 1);
    assert_eq!(pins[2].0, 2);
    assert_eq!(pins[3], (0, Corner::BottomLeft, Point::new(44.0, 172.0)));
}

#[test]
fn incomplete_session_cannot_be_planned() {
    let err = default_plan(&Session::default()).unwrap_err();
    assert!(matches!(err, BoothError::IncompleteSelection(_)));
}

fn max_chars(n: usize) -> impl Fn(&str) -> bool {
    move |line: &str| line.chars().count() <= n
}

#[test]
fn wrap_breaks_on_words_and_splits_long_words() {
    assert_eq!(
        wrap_note("hello there world", max_chars(11)),
        ["hello there", "world"]
    );
    assert_eq!(wrap_note("abcdefgh", max_chars(3)), ["abc", "def", "gh"]);
    assert_eq!(wrap_note("a\nb", max_chars(10)), ["a", "b"]);
    assert_eq!(wrap_note("x abcdef", max_chars(3)), ["x", "abc", "def"]);
}

#[test]
fn long_note_grows_label_but_stays_inside_strip() {
    let note = "a very long note that certainly will not fit on one single line";
    let plan = default_plan(&sample_session(note, &[])).unwrap();
    let Some(Layer::Note { lines, size, .. }) = plan.layers.last() else {
        panic!("note layer missing");
    };
    assert!(lines.len() > 1);
    assert!(size.width <= plan.size.width - 24.0);
}

/// Wide capitals advance 0.9em, everything else 0.5em.
struct WideCaps;

impl TextMeasure for WideCaps {
    fn line_width(&self, line: &str, font_px: f64) -> f64 {
        line.chars()
            .map(|c| if c.is_uppercase() { 0.9 } else { 0.5 })
            .sum::<f64>()
            * font_px
    }
}

#[test]
fn wide_glyph_note_wraps_within_label_and_strip() {
    let m = StripMetrics::default();
    let note = "W".repeat(22);
    let plan = plan_strip(&sample_session(&note, &[]), &m, &WideCaps).unwrap();
    let Some(Layer::Note {
        lines,
        size,
        padding,
        font_px,
        origin,
        ..
    }) = plan.layers.last()
    else {
        panic!("note layer missing");
    };

    assert!(lines.len() > 1);
    assert_eq!(lines.concat(), note);
    for line in lines {
        let w = WideCaps.line_width(line, *font_px);
        assert!(w <= size.width - padding.0 * 2.0, "{line} is {w}px wide");
    }
    assert!(origin.x + size.width <= plan.size.width - m.note_anchor.x);
}

#[test]
fn narrow_glyphs_fit_more_per_line_than_wide_ones() {
    let m = StripMetrics::default();
    let wide = plan_strip(&sample_session(&"W".repeat(30), &[]), &m, &WideCaps).unwrap();
    let narrow = plan_strip(&sample_session(&"i".repeat(30), &[]), &m, &WideCaps).unwrap();
    let line_count = |p: &StripPlan| p.note_text().unwrap().lines().count();
    assert!(line_count(&narrow) < line_count(&wide));
}
