use std::time::Duration;

use crate::cache::store::ArtifactKind;
use crate::foundation::error::ReelResult;
use crate::layout::fit::{FitMode, fit_rect};
use crate::script::model::Characters;
use crate::slide::model::{RenderContext, Slide, resolve_asset};
use crate::timeline::layer::{
    BLACK, Fill, Layer, LayerKind, PlacedImage, SlideSpan, Timeline,
};

/// Turns a slide sequence into a time-resolved [`Timeline`].
///
/// Performs no process spawning; audio lengths and image sizes come from the probe in `ctx`,
/// so synthesis and code rendering must have finished first.
pub struct Compositor<'a> {
    ctx: RenderContext<'a>,
}

impl<'a> Compositor<'a> {
    pub fn new(ctx: RenderContext<'a>) -> Self {
        Self { ctx }
    }

    /// Single sequential pass over `slides`.
    ///
    /// Each slide starts where the previous one ended. Its voice-overs play back to back from
    /// that point, each with an audio layer and a caption layer. The slide visual covers the
    /// summed voice-over time, raised to `min_duration` when that is larger. Layers with zero
    /// duration are dropped. Finally the caption band fill goes to the bottom of the stack and
    /// one portrait per character to the top, both spanning the whole timeline.
    #[tracing::instrument(skip_all, fields(slides = slides.len()))]
    pub fn compose(&self, slides: &[Slide], characters: &Characters) -> ReelResult<Timeline> {
        let anchors = self.ctx.anchors;
        let mut timeline = Timeline::default();
        let mut cursor = Duration::ZERO;

        for slide in slides {
            let mut caption_start = cursor;
            let mut slide_duration = Duration::ZERO;

            for vo in slide.voice_overs() {
                let path = self.ctx.cache.path_for(vo.cache_key(), ArtifactKind::Audio);
                let duration = self.ctx.probe.audio_duration(&path)?;
                if !duration.is_zero() {
                    timeline.layers.push(Layer {
                        kind: LayerKind::Audio { path },
                        start: caption_start,
                        duration,
                    });
                    timeline.layers.push(Layer {
                        kind: LayerKind::Caption(vo.caption(&anchors, self.ctx.text)?),
                        start: caption_start,
                        duration,
                    });
                }
                slide_duration += duration;
                caption_start += duration;
            }

            if let Some(min) = slide.min_duration
                && slide_duration < min
            {
                slide_duration = min;
            }

            // Zero-length slides still resolve their media.
            if let Some(visual) = slide.render(&self.ctx)?
                && !slide_duration.is_zero()
            {
                timeline.layers.push(Layer {
                    kind: LayerKind::Slide(visual),
                    start: cursor,
                    duration: slide_duration,
                });
            }

            tracing::debug!(
                kind = slide.kind_name(),
                start = ?cursor,
                duration = ?slide_duration,
                "placed slide"
            );
            timeline.slides.push(SlideSpan {
                start: cursor,
                duration: slide_duration,
                voice_overs: slide.voice_overs().len(),
            });
            cursor += slide_duration;
        }

        timeline.total_duration = cursor;
        if cursor.is_zero() {
            return Ok(timeline);
        }

        timeline.layers.insert(
            0,
            Layer {
                kind: LayerKind::Background(Fill {
                    rect: anchors.caption_frame(),
                    color: BLACK,
                }),
                start: Duration::ZERO,
                duration: cursor,
            },
        );
        for (name, character) in characters.iter() {
            let path = resolve_asset(self.ctx.assets_root, &character.image);
            let natural = self.ctx.probe.image_size(&path)?;
            let rect = fit_rect(natural, anchors.portrait_frame(), FitMode::default());
            tracing::debug!(character = name, "placed portrait");
            timeline.layers.push(Layer {
                kind: LayerKind::Portrait(PlacedImage { path, rect }),
                start: Duration::ZERO,
                duration: cursor,
            });
        }

        timeline.validate()?;
        Ok(timeline)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/compose.rs"]
mod tests;
