use super::*;

#[test]
fn default_regions_for_720x480() {
    let a = Anchors::default();
    assert_eq!(a.slide_height(), 384);
    assert_eq!(a.slide_left(), 36);
    assert_eq!(a.slide_width(), 648);
    assert_eq!(a.caption_frame_top(), 384);
    assert_eq!(a.caption_frame_height(), 96);
    assert_eq!(a.caption_top(), 394);
    assert_eq!(a.caption_height(), 76);
    assert_eq!(a.caption_left(), 72);
    assert_eq!(a.caption_width(), 576);
    assert_eq!(a.portrait_height(), 96);
    assert_eq!(a.portrait_width(), 96);
    assert_eq!(a.portrait_top(), 288);
}

#[test]
fn frames_tile_the_canvas_vertically() {
    let a = Anchors::default();
    assert_eq!(a.slide_frame().y1, a.caption_frame().y0);
    assert_eq!(a.caption_frame().y1, 480.0);
    assert_eq!(a.caption_frame().width(), 720.0);
    assert_eq!(a.portrait_frame().y1, a.slide_frame().y1);
}

#[test]
fn caption_box_is_inside_caption_frame() {
    let a = Anchors::default();
    let frame = a.caption_frame();
    let b = a.caption_box();
    assert!(b.x0 >= frame.x0 && b.x1 <= frame.x1);
    assert!(b.y0 >= frame.y0 && b.y1 <= frame.y1);
}
