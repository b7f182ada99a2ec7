use kurbo::{PathEl, Shape};

use super::*;

#[test]
fn text_column_sits_right_of_the_thumbnail() {
    let layout = CoverLayout::default();
    let thumb = layout.thumb_rect();
    assert!(thumb.x1 < f64::from(layout.canvas.width) / 2.0 + 1.0);
    assert_eq!(layout.text_left(), thumb.x1 + layout.text_gap);
    assert_eq!(
        layout.text_left() + layout.text_width(),
        f64::from(layout.canvas.width) - layout.right_margin
    );
}

#[test]
fn text_width_never_negative() {
    let layout = CoverLayout {
        canvas: Canvas {
            width: 100,
            height: 100,
        },
        ..CoverLayout::default()
    };
    assert_eq!(layout.text_width(), 0.0);
}

#[test]
fn badge_is_inside_the_canvas_bottom_right() {
    let layout = CoverLayout::default();
    let badge = layout.badge_rect();
    assert_eq!(badge.x1, f64::from(layout.canvas.width) - layout.right_margin);
    assert_eq!(badge.y1, f64::from(layout.canvas.height) - layout.bottom_margin);
    assert!(badge.x0 > layout.text_left());
    assert!(layout.artists_bottom(true) < layout.artists_bottom(false));
}

#[test]
fn rounded_rect_uses_four_quad_corners() {
    let rect = Rect::new(10.0, 20.0, 66.0, 76.0);
    let path = rounded_rect_path(rect, 14.0);
    let quads = path
        .elements()
        .iter()
        .filter(|el| matches!(el, PathEl::QuadTo(..)))
        .count();
    assert_eq!(quads, 4);
    assert_eq!(path.bounding_box(), rect);
}

#[test]
fn rounded_rect_radius_is_clamped() {
    let rect = Rect::new(0.0, 0.0, 10.0, 40.0);
    let path = rounded_rect_path(rect, 100.0);
    assert_eq!(path.bounding_box(), rect);
    assert!(!path.contains(Point::new(0.3, 0.3)));
    assert!(path.contains(Point::new(5.0, 20.0)));
}

#[test]
fn layout_deserializes_partial_overrides() {
    let layout: CoverLayout =
        serde_json::from_str(r#"{"canvas":{"width":800,"height":400},"thumb_size":200}"#)
            .unwrap();
    assert_eq!(layout.canvas.width, 800);
    assert_eq!(layout.thumb_size, 200);
    assert_eq!(layout.title_max_size, CoverLayout::default().title_max_size);
}
