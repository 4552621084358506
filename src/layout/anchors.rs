use crate::foundation::core::{Canvas, Rect};

/// Screen regions derived from the canvas size.
///
/// The slide occupies the top 80% (with 5% side margins), the caption band the rest, and the
/// character portrait sits in the bottom-left corner of the slide region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Anchors {
    pub width: u32,
    pub height: u32,
}

impl Default for Anchors {
    fn default() -> Self {
        Self::new(Canvas::default())
    }
}

impl Anchors {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
        }
    }

    pub fn slide_height(&self) -> u32 {
        self.height * 4 / 5
    }

    pub fn slide_left(&self) -> u32 {
        self.width / 20
    }

    pub fn slide_width(&self) -> u32 {
        self.width - self.slide_left() * 2
    }

    pub fn slide_top(&self) -> u32 {
        0
    }

    pub fn caption_frame_top(&self) -> u32 {
        self.slide_height()
    }

    pub fn caption_frame_left(&self) -> u32 {
        0
    }

    pub fn caption_frame_height(&self) -> u32 {
        self.height - self.caption_frame_top()
    }

    pub fn caption_frame_width(&self) -> u32 {
        self.width
    }

    pub fn caption_top(&self) -> u32 {
        self.slide_height() + 10
    }

    pub fn caption_height(&self) -> u32 {
        self.caption_frame_height().saturating_sub(10 * 2)
    }

    pub fn caption_left(&self) -> u32 {
        self.width / 10
    }

    pub fn caption_width(&self) -> u32 {
        self.width - self.caption_left() * 2
    }

    pub fn portrait_left(&self) -> u32 {
        0
    }

    pub fn portrait_height(&self) -> u32 {
        self.height / 5
    }

    pub fn portrait_width(&self) -> u32 {
        self.portrait_height()
    }

    pub fn portrait_top(&self) -> u32 {
        self.slide_height() - self.portrait_height()
    }

    pub fn slide_frame(&self) -> Rect {
        rect(
            self.slide_left(),
            self.slide_top(),
            self.slide_width(),
            self.slide_height(),
        )
    }

    /// The black band behind captions.
    pub fn caption_frame(&self) -> Rect {
        rect(
            self.caption_frame_left(),
            self.caption_frame_top(),
            self.caption_frame_width(),
            self.caption_frame_height(),
        )
    }

    /// Where caption text is laid out, inset from [`Anchors::caption_frame`].
    pub fn caption_box(&self) -> Rect {
        rect(
            self.caption_left(),
            self.caption_top(),
            self.caption_width(),
            self.caption_height(),
        )
    }

    pub fn portrait_frame(&self) -> Rect {
        rect(
            self.portrait_left(),
            self.portrait_top(),
            self.portrait_width(),
            self.portrait_height(),
        )
    }
}

fn rect(x: u32, y: u32, w: u32, h: u32) -> Rect {
    Rect::new(
        f64::from(x),
        f64::from(y),
        f64::from(x) + f64::from(w),
        f64::from(y) + f64::from(h),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/layout/anchors.rs"]
mod tests;
