use std::time::Duration;

use serde_yaml::{Mapping, Value};

use crate::foundation::core::duration_from_secs;
use crate::foundation::error::{ReelError, ReelResult};
use crate::layout::fit::FitMode;
use crate::script::model::Characters;
use crate::slide::model::{
    CodeSlide, CodeStyle, DEFAULT_TEXT_FONT_SIZE, ImageSlide, Slide, SlideContent, TextSlide,
};
use crate::slide::voice_over::VoiceOver;

#[derive(serde::Deserialize)]
struct ImageEntry {
    image: std::path::PathBuf,
    #[serde(default)]
    zoom: Option<f64>,
    #[serde(default)]
    zoom_to_fit: bool,
    #[serde(default)]
    min_duration: Option<f64>,
}

#[derive(serde::Deserialize)]
struct TextEntry {
    text: String,
    #[serde(default = "default_font_size")]
    font_size: f64,
    #[serde(default)]
    min_duration: Option<f64>,
}

#[derive(serde::Deserialize)]
struct CodeEntry {
    code: String,
    ext: String,
    #[serde(default)]
    font_size: Option<u32>,
    #[serde(default)]
    emoji: bool,
    #[serde(default)]
    min_duration: Option<f64>,
}

fn default_font_size() -> f64 {
    DEFAULT_TEXT_FONT_SIZE
}

/// A classified script entry.
enum Entry {
    Slide(Slide),
    VoiceOver(VoiceOver),
}

/// Fold accumulator. `current` is the slide new voice-overs attach to; it starts as the
/// implicit empty slide and is replaced whenever a slide entry appears.
struct Segmenter {
    done: Vec<Slide>,
    current: Slide,
}

impl Segmenter {
    fn new() -> Self {
        Self {
            done: Vec::new(),
            current: Slide::empty(),
        }
    }

    fn push(mut self, entry: Entry) -> Self {
        match entry {
            Entry::Slide(slide) => {
                let prev = std::mem::replace(&mut self.current, slide);
                self.done.push(prev);
            }
            // A voice-over after a slide entry belongs to that slide until the next one starts.
            Entry::VoiceOver(vo) => self.current.push_voice_over(vo),
        }
        self
    }

    fn finish(mut self) -> Vec<Slide> {
        self.done.push(self.current);
        self.done
    }
}

/// Group ordered script entries into slides.
///
/// Per entry, in priority order: key `image` starts an image slide, `text` a text slide, `code`
/// a code slide; otherwise the single key names a character and the value is a spoken line
/// appended to the current slide.
pub fn segment(entries: &[Value], characters: &Characters) -> ReelResult<Vec<Slide>> {
    let segmenter = entries
        .iter()
        .enumerate()
        .try_fold(Segmenter::new(), |acc, (idx, entry)| {
            Ok::<_, ReelError>(acc.push(classify(idx, entry, characters)?))
        })?;
    Ok(segmenter.finish())
}

fn classify(idx: usize, entry: &Value, characters: &Characters) -> ReelResult<Entry> {
    let Value::Mapping(map) = entry else {
        return Err(ReelError::malformed(format!(
            "entry {idx}: expected a single-key mapping"
        )));
    };

    if map.contains_key("image") {
        let e: ImageEntry = decode(idx, entry)?;
        if let Some(zoom) = e.zoom
            && (!zoom.is_finite() || zoom <= 0.0)
        {
            return Err(ReelError::validation(format!(
                "entry {idx}: zoom must be a positive number"
            )));
        }
        let slide = Slide::new(SlideContent::Image(ImageSlide {
            image: e.image,
            fit: FitMode {
                zoom: e.zoom,
                zoom_to_fit: e.zoom_to_fit,
            },
        }));
        return Ok(Entry::Slide(
            slide.with_min_duration(min_duration(idx, e.min_duration)?),
        ));
    }

    if map.contains_key("text") {
        let e: TextEntry = decode(idx, entry)?;
        if !e.font_size.is_finite() || e.font_size <= 0.0 {
            return Err(ReelError::validation(format!(
                "entry {idx}: font_size must be a positive number"
            )));
        }
        let slide = Slide::new(SlideContent::Text(TextSlide {
            text: e.text,
            font_size: e.font_size,
        }));
        return Ok(Entry::Slide(
            slide.with_min_duration(min_duration(idx, e.min_duration)?),
        ));
    }

    if map.contains_key("code") {
        let e: CodeEntry = decode(idx, entry)?;
        let style = match (e.emoji, e.font_size) {
            (true, _) => CodeStyle::Emoji,
            (false, Some(0)) => {
                return Err(ReelError::validation(format!(
                    "entry {idx}: font_size must be a positive number"
                )));
            }
            (false, Some(size)) => CodeStyle::FontSize(size),
            (false, None) => CodeStyle::Plain,
        };
        let code = CodeSlide::new(e.code, e.ext)
            .map_err(|err| ReelError::malformed(format!("entry {idx}: {err}")))?
            .with_style(style);
        let slide = Slide::new(SlideContent::Code(code));
        return Ok(Entry::Slide(
            slide.with_min_duration(min_duration(idx, e.min_duration)?),
        ));
    }

    voice_over(idx, map, characters).map(Entry::VoiceOver)
}

fn voice_over(idx: usize, map: &Mapping, characters: &Characters) -> ReelResult<VoiceOver> {
    let mut iter = map.iter();
    let (Some((key, value)), None) = (iter.next(), iter.next()) else {
        return Err(ReelError::malformed(format!(
            "entry {idx}: expected `image`, `text`, `code` or exactly one `<character>: <line>` \
             pair, found {} keys",
            map.len()
        )));
    };
    let Some(name) = key.as_str() else {
        return Err(ReelError::malformed(format!(
            "entry {idx}: character name must be a string"
        )));
    };
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => {
            return Err(ReelError::malformed(format!(
                "entry {idx}: line for '{name}' must be a string"
            )));
        }
    };
    let character = characters
        .get(name)
        .ok_or_else(|| ReelError::unknown_character(name))?;
    Ok(VoiceOver::new(name, character.voice.clone(), &text))
}

fn decode<T: serde::de::DeserializeOwned>(idx: usize, entry: &Value) -> ReelResult<T> {
    serde_yaml::from_value(entry.clone())
        .map_err(|e| ReelError::malformed(format!("entry {idx}: {e}")))
}

fn min_duration(idx: usize, secs: Option<f64>) -> ReelResult<Option<Duration>> {
    secs.map(duration_from_secs).transpose().map_err(|_| {
        ReelError::validation(format!(
            "entry {idx}: min_duration must be a finite, non-negative number of seconds"
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/script/segment.rs"]
mod tests;
