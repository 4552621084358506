use crate::cache::fingerprint::{CacheKey, Fingerprinter};
use crate::foundation::error::ReelResult;
use crate::layout::anchors::Anchors;
use crate::layout::text::{LineBreaker, fit_text};
use crate::timeline::layer::{TextBlock, WHITE};

pub const CAPTION_FONT_SIZE: f64 = 18.0;

/// One spoken line by one character.
///
/// Derived values (clean text, markup, cache key) are computed once at construction; the
/// struct is immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceOver {
    character: String,
    voice: String,
    text: String,
    end_pause: String,
    clean_text: String,
    markup: String,
    cache_key: CacheKey,
}

impl VoiceOver {
    pub const DEFAULT_END_PAUSE: &'static str = "500ms";

    pub fn new(character: impl Into<String>, voice: impl Into<String>, text: &str) -> Self {
        Self::with_end_pause(character, voice, text, Self::DEFAULT_END_PAUSE)
    }

    pub fn with_end_pause(
        character: impl Into<String>,
        voice: impl Into<String>,
        text: &str,
        end_pause: impl Into<String>,
    ) -> Self {
        let character = character.into();
        let voice = voice.into();
        let end_pause = end_pause.into();
        let text = text.trim().to_string();
        let clean_text = text.replace("\r\n", " ").replace('\n', " ");
        let markup = format!(
            "<speak>{}<break time='{}'/></speak>",
            escape_xml(&clean_text),
            end_pause
        );
        let cache_key = Fingerprinter::new()
            .str(&character)
            .str(&voice)
            .str(&markup)
            .finish();
        Self {
            character,
            voice,
            text,
            end_pause,
            clean_text,
            markup,
            cache_key,
        }
    }

    pub fn character(&self) -> &str {
        &self.character
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Script text with surrounding whitespace trimmed.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn end_pause(&self) -> &str {
        &self.end_pause
    }

    /// Text with line breaks collapsed to spaces; what the caption shows.
    pub fn clean_text(&self) -> &str {
        &self.clean_text
    }

    /// SSML envelope sent to the synthesizer.
    pub fn synthesis_payload(&self) -> &str {
        &self.markup
    }

    pub fn cache_key(&self) -> CacheKey {
        self.cache_key
    }

    /// Caption render parameters inside the caption box.
    pub fn caption(&self, anchors: &Anchors, text: &dyn LineBreaker) -> ReelResult<TextBlock> {
        let rect = anchors.caption_box();
        let fitted = fit_text(text, &self.clean_text, rect, CAPTION_FONT_SIZE)?;
        Ok(TextBlock {
            lines: fitted.lines,
            font_size: fitted.font_size,
            color: WHITE,
            background: None,
            rect,
        })
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/slide/voice_over.rs"]
mod tests;
