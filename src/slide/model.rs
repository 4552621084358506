use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

use crate::cache::fingerprint::{CacheKey, Fingerprinter};
use crate::cache::store::{ArtifactCache, ArtifactKind};
use crate::foundation::error::{ReelError, ReelResult};
use crate::layout::anchors::Anchors;
use crate::layout::fit::{FitMode, fit_rect};
use crate::layout::text::{LineBreaker, fit_text};
use crate::slide::voice_over::VoiceOver;
use crate::timeline::layer::{BLACK, PlacedImage, SlideVisual, TextBlock, WHITE};
use crate::timeline::probe::MediaProbe;

pub const DEFAULT_TEXT_FONT_SIZE: f64 = 25.0;

#[derive(Clone, Debug, PartialEq)]
pub struct ImageSlide {
    /// Path as written in the script; relative paths resolve against the script directory.
    pub image: PathBuf,
    pub fit: FitMode,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextSlide {
    pub text: String,
    pub font_size: f64,
}

/// Highlighter hint for a code slide, passed on through the snippet's file name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CodeStyle {
    #[default]
    Plain,
    /// Font size in points.
    FontSize(u32),
    /// Large emoji font; only markdown snippets honour it.
    Emoji,
}

impl CodeStyle {
    fn file_tag(self) -> Option<String> {
        match self {
            CodeStyle::Plain => None,
            CodeStyle::FontSize(size) => Some(size.to_string()),
            CodeStyle::Emoji => Some("emoji".to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeSlide {
    code: String,
    ext: String,
    tag: Option<String>,
    cache_key: CacheKey,
}

impl CodeSlide {
    /// `ext` drives syntax highlighting and must be a plain file extension.
    pub fn new(code: impl Into<String>, ext: impl Into<String>) -> ReelResult<Self> {
        let code = code.into();
        let ext = ext.into();
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ReelError::malformed(format!(
                "code extension must be non-empty and alphanumeric, got '{ext}'"
            )));
        }
        let cache_key = Fingerprinter::new().str(&ext).str(&code).finish();
        Ok(Self {
            code,
            ext,
            tag: None,
            cache_key,
        })
    }

    /// Re-keys the snippet; a styled snippet never shares artifacts with the plain one.
    pub fn with_style(mut self, style: CodeStyle) -> Self {
        self.tag = style.file_tag();
        let mut fp = Fingerprinter::new().str(&self.ext).str(&self.code);
        if let Some(tag) = &self.tag {
            fp = fp.str(tag);
        }
        self.cache_key = fp.finish();
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn ext(&self) -> &str {
        &self.ext
    }

    pub fn cache_key(&self) -> CacheKey {
        self.cache_key
    }

    pub fn source_path(&self, cache: &ArtifactCache) -> PathBuf {
        cache.path_for(self.cache_key, self.source_kind())
    }

    fn source_kind(&self) -> ArtifactKind<'_> {
        ArtifactKind::CodeSource {
            ext: &self.ext,
            tag: self.tag.as_deref(),
        }
    }

    pub fn image_path(&self, cache: &ArtifactCache) -> PathBuf {
        cache.path_for(self.cache_key, ArtifactKind::CodeImage)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SlideContent {
    Empty,
    Image(ImageSlide),
    Text(TextSlide),
    Code(CodeSlide),
}

/// Everything a slide needs to turn into a visual.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub anchors: Anchors,
    pub cache: &'a ArtifactCache,
    pub probe: &'a dyn MediaProbe,
    pub text: &'a dyn LineBreaker,
    /// Base directory for relative image paths.
    pub assets_root: &'a Path,
}

/// A unit of visual content plus the voice-overs spoken while it is shown.
#[derive(Clone, Debug, PartialEq)]
pub struct Slide {
    pub content: SlideContent,
    voice_overs: Vec<VoiceOver>,
    /// Floor on the time the slide stays on screen.
    pub min_duration: Option<Duration>,
}

impl Slide {
    pub fn new(content: SlideContent) -> Self {
        Self {
            content,
            voice_overs: Vec::new(),
            min_duration: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(SlideContent::Empty)
    }

    pub fn with_min_duration(mut self, min_duration: Option<Duration>) -> Self {
        self.min_duration = min_duration;
        self
    }

    pub fn with_voice_over(mut self, voice_over: VoiceOver) -> Self {
        self.voice_overs.push(voice_over);
        self
    }

    pub fn push_voice_over(&mut self, voice_over: VoiceOver) {
        self.voice_overs.push(voice_over);
    }

    pub fn voice_overs(&self) -> &[VoiceOver] {
        &self.voice_overs
    }

    pub fn kind_name(&self) -> &'static str {
        match self.content {
            SlideContent::Empty => "empty",
            SlideContent::Image(_) => "image",
            SlideContent::Text(_) => "text",
            SlideContent::Code(_) => "code",
        }
    }

    /// One-time side effect before compositing: code slides materialize their source into the
    /// cache. Returns `true` when something was written.
    pub fn prepare(&self, cache: &ArtifactCache) -> ReelResult<bool> {
        let SlideContent::Code(code) = &self.content else {
            return Ok(false);
        };
        let entry = cache.ensure(code.cache_key, code.source_kind());
        if entry.hit {
            return Ok(false);
        }
        std::fs::write(&entry.path, &code.code)
            .with_context(|| format!("write code snippet '{}'", entry.path.display()))?;
        Ok(true)
    }

    /// Visual content for the slide region, `None` for empty slides.
    pub fn render(&self, ctx: &RenderContext<'_>) -> ReelResult<Option<SlideVisual>> {
        match &self.content {
            SlideContent::Empty => Ok(None),
            SlideContent::Image(image) => {
                let path = resolve_asset(ctx.assets_root, &image.image);
                place_image(ctx, path, image.fit).map(Some)
            }
            SlideContent::Text(text) => {
                let rect = ctx.anchors.slide_frame();
                let fitted = fit_text(ctx.text, &text.text, rect, text.font_size)?;
                Ok(Some(SlideVisual::Text(TextBlock {
                    lines: fitted.lines,
                    font_size: fitted.font_size,
                    color: BLACK,
                    background: Some(WHITE),
                    rect,
                })))
            }
            SlideContent::Code(code) => {
                place_image(ctx, code.image_path(ctx.cache), FitMode::default()).map(Some)
            }
        }
    }
}

fn place_image(ctx: &RenderContext<'_>, path: PathBuf, fit: FitMode) -> ReelResult<SlideVisual> {
    let natural = ctx.probe.image_size(&path)?;
    let rect = fit_rect(natural, ctx.anchors.slide_frame(), fit);
    Ok(SlideVisual::Image(PlacedImage { path, rect }))
}

/// Resolve a script-relative media path.
pub fn resolve_asset(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/slide/model.rs"]
mod tests;
