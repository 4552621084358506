use crate::foundation::core::{Rect, Size};

/// How an image is scaled into its frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FitMode {
    /// Fixed scale factor, independent of the frame.
    pub zoom: Option<f64>,
    /// Enlarge images smaller than the frame until one axis touches it.
    pub zoom_to_fit: bool,
}

/// Scale factor for an image of `natural` size placed into `frame`.
///
/// 1. fixed `zoom` wins;
/// 2. an image overflowing the frame on either axis shrinks by the larger overflow ratio;
/// 3. with `zoom_to_fit` a smaller image grows by the smaller of the two axis ratios;
/// 4. otherwise the image keeps its natural size.
pub fn fit_scale(natural: Size, frame: Size, mode: FitMode) -> f64 {
    if let Some(zoom) = mode.zoom {
        return zoom;
    }
    if natural.width <= 0.0 || natural.height <= 0.0 {
        return 1.0;
    }
    let ratio = (frame.width / natural.width).min(frame.height / natural.height);
    let overflows = natural.width > frame.width || natural.height > frame.height;
    if overflows || mode.zoom_to_fit {
        ratio
    } else {
        1.0
    }
}

/// Placed rectangle of the scaled image, centered in `frame` on both axes.
pub fn fit_rect(natural: Size, frame: Rect, mode: FitMode) -> Rect {
    let scale = fit_scale(natural, frame.size(), mode);
    let w = natural.width * scale;
    let h = natural.height * scale;
    let x = frame.x0 + (frame.width() - w) * 0.5;
    let y = frame.y0 + (frame.height() - h) * 0.5;
    Rect::new(x, y, x + w, y + h)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fit.rs"]
mod tests;
