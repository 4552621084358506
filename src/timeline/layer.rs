use std::path::PathBuf;
use std::time::Duration;

use crate::foundation::core::Rect;
use crate::foundation::error::{ReelError, ReelResult};

/// Straight-alpha RGBA8.
pub type Rgba8 = [u8; 4];

pub const WHITE: Rgba8 = [255, 255, 255, 255];
pub const BLACK: Rgba8 = [0, 0, 0, 255];

/// Wrapped, left-aligned text drawn inside `rect`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub font_size: f64,
    pub color: Rgba8,
    /// Fill painted behind the whole `rect` first, if any.
    pub background: Option<Rgba8>,
    pub rect: Rect,
}

/// An image file scaled and positioned to `rect`.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedImage {
    pub path: PathBuf,
    pub rect: Rect,
}

/// A solid rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fill {
    pub rect: Rect,
    pub color: Rgba8,
}

/// What a slide puts on screen.
#[derive(Clone, Debug, PartialEq)]
pub enum SlideVisual {
    Image(PlacedImage),
    Text(TextBlock),
}

#[derive(Clone, Debug, PartialEq)]
pub enum LayerKind {
    /// Synthesized speech for one voice-over.
    Audio { path: PathBuf },
    Caption(TextBlock),
    Slide(SlideVisual),
    /// Full-timeline fill behind the caption band.
    Background(Fill),
    /// Full-timeline character portrait.
    Portrait(PlacedImage),
}

/// A timed audio or visual element. Later layers draw over earlier ones.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    pub start: Duration,
    pub duration: Duration,
}

impl Layer {
    pub fn end(&self) -> Duration {
        self.start + self.duration
    }

    pub fn is_audio(&self) -> bool {
        matches!(self.kind, LayerKind::Audio { .. })
    }
}

/// Where one slide landed on the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlideSpan {
    pub start: Duration,
    pub duration: Duration,
    pub voice_overs: usize,
}

/// Fully time-resolved output of composition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timeline {
    /// One entry per input slide, in script order.
    pub slides: Vec<SlideSpan>,
    /// Layers in emission (= compositing) order.
    pub layers: Vec<Layer>,
    pub total_duration: Duration,
    /// Font the text layers were laid out with. Text is drawn with the same file when set.
    pub font_file: Option<PathBuf>,
}

impl Timeline {
    pub fn audio_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.is_audio())
    }

    pub fn visual_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| !l.is_audio())
    }

    /// Check `duration > 0` and `start + duration <= total_duration` for every layer.
    pub fn validate(&self) -> ReelResult<()> {
        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.duration.is_zero() {
                return Err(ReelError::validation(format!(
                    "layer {idx} has zero duration"
                )));
            }
            if layer.end() > self.total_duration {
                return Err(ReelError::validation(format!(
                    "layer {idx} ends at {:?}, past the timeline end {:?}",
                    layer.end(),
                    self.total_duration
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/layer.rs"]
mod tests;
