use std::path::{Path, PathBuf};

use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};

/// Settings for the batch speech synthesizer.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeechConfig {
    /// Synthesizer executable.
    pub program: String,
    /// Talk to a running synthesis server instead of loading voices in-process.
    pub remote: bool,
    /// Speaking-rate multiplier (> 1.0 is slower).
    pub length_scale: f64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            program: "mimic3".to_string(),
            remote: true,
            length_scale: 1.1,
        }
    }
}

/// Settings for the code-to-image highlighter.
#[derive(Clone, Debug, PartialEq)]
pub struct HighlightConfig {
    pub program: String,
    pub style: String,
    pub default_font_size: u32,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            program: "pygmentize".to_string(),
            style: "github-dark".to_string(),
            default_font_size: 16,
        }
    }
}

/// Run-wide configuration.
///
/// There are no command-line flags; values come from [`Default`], the script location and a few
/// `SLIDEREEL_*` environment variables (see [`ReelConfig::with_env_overrides`]).
#[derive(Clone, Debug, PartialEq)]
pub struct ReelConfig {
    pub canvas: Canvas,
    pub fps: u32,
    /// Root of the artifact cache (`audio/`, `codes/`, `images/`, `work/`).
    pub cache_root: PathBuf,
    /// Family used for captions and text slides.
    pub font_family: String,
    /// Font file that overrides the family lookup.
    pub font_path: Option<PathBuf>,
    pub ffmpeg_program: String,
    pub speech: SpeechConfig,
    pub highlight: HighlightConfig,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: 30,
            cache_root: PathBuf::from(".slidereel"),
            font_family: "Noto Sans".to_string(),
            font_path: None,
            ffmpeg_program: "ffmpeg".to_string(),
            speech: SpeechConfig::default(),
            highlight: HighlightConfig::default(),
        }
    }
}

impl ReelConfig {
    /// Defaults with the cache placed next to the script.
    pub fn for_script(script_path: &Path) -> Self {
        Self {
            cache_root: script_dir(script_path).join(".slidereel"),
            ..Self::default()
        }
    }

    /// Apply `SLIDEREEL_CACHE_DIR`, `SLIDEREEL_TTS_BIN`, `SLIDEREEL_HIGHLIGHT_BIN`,
    /// `SLIDEREEL_FFMPEG_BIN` and `SLIDEREEL_FONT` when set.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    pub(crate) fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup("SLIDEREEL_CACHE_DIR") {
            self.cache_root = PathBuf::from(dir);
        }
        if let Some(bin) = lookup("SLIDEREEL_TTS_BIN") {
            self.speech.program = bin;
        }
        if let Some(bin) = lookup("SLIDEREEL_HIGHLIGHT_BIN") {
            self.highlight.program = bin;
        }
        if let Some(bin) = lookup("SLIDEREEL_FFMPEG_BIN") {
            self.ffmpeg_program = bin;
        }
        if let Some(font) = lookup("SLIDEREEL_FONT") {
            self.font_path = Some(PathBuf::from(font));
        }
        self
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ReelError::validation("canvas width/height must be non-zero"));
        }
        if !self.canvas.width.is_multiple_of(2) || !self.canvas.height.is_multiple_of(2) {
            // yuv420p output needs even dimensions.
            return Err(ReelError::validation("canvas width/height must be even"));
        }
        if self.fps == 0 {
            return Err(ReelError::validation("fps must be non-zero"));
        }
        if !self.speech.length_scale.is_finite() || self.speech.length_scale <= 0.0 {
            return Err(ReelError::validation(
                "speech length_scale must be a positive number",
            ));
        }
        if self.highlight.default_font_size == 0 {
            return Err(ReelError::validation("highlight font size must be non-zero"));
        }
        Ok(())
    }
}

/// Directory that relative media paths in a script resolve against.
pub fn script_dir(script_path: &Path) -> PathBuf {
    match script_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
