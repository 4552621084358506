use super::*;

fn frame() -> Rect {
    Rect::new(0.0, 0.0, 400.0, 300.0)
}

#[test]
fn oversized_image_shrinks_to_width_and_centers_vertically() {
    let placed = fit_rect(Size::new(800.0, 300.0), frame(), FitMode::default());
    assert_eq!(
        fit_scale(Size::new(800.0, 300.0), frame().size(), FitMode::default()),
        0.5
    );
    assert_eq!(placed.size(), Size::new(400.0, 150.0));
    assert_eq!(placed.x0, 0.0);
    assert_eq!(placed.y0, 75.0);
}

#[test]
fn small_image_grows_by_smaller_ratio_with_zoom_to_fit() {
    let mode = FitMode {
        zoom: None,
        zoom_to_fit: true,
    };
    assert_eq!(fit_scale(Size::new(100.0, 100.0), frame().size(), mode), 3.0);
    let placed = fit_rect(Size::new(100.0, 100.0), frame(), mode);
    assert_eq!(placed.size(), Size::new(300.0, 300.0));
    assert_eq!(placed.x0, 50.0);
    assert_eq!(placed.y0, 0.0);
}

#[test]
fn small_image_keeps_natural_size_by_default() {
    let placed = fit_rect(Size::new(100.0, 50.0), frame(), FitMode::default());
    assert_eq!(placed.size(), Size::new(100.0, 50.0));
    assert_eq!((placed.x0, placed.y0), (150.0, 125.0));
}

#[test]
fn fixed_zoom_ignores_frame() {
    let mode = FitMode {
        zoom: Some(2.0),
        zoom_to_fit: true,
    };
    let placed = fit_rect(Size::new(800.0, 300.0), frame(), mode);
    assert_eq!(placed.size(), Size::new(1600.0, 600.0));
    assert_eq!((placed.x0, placed.y0), (-600.0, -150.0));
}

#[test]
fn frame_offset_is_applied() {
    let frame = Rect::new(36.0, 0.0, 684.0, 384.0);
    let placed = fit_rect(Size::new(96.0, 96.0), frame, FitMode::default());
    assert_eq!((placed.x0, placed.y0), (36.0 + 276.0, 144.0));
}
