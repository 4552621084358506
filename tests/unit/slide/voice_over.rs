use std::path::PathBuf;

use super::*;
use crate::layout::text::{LineBox, TextLayoutEngine, locate_font};

/// Every glyph is one em wide; one word per line.
struct WordPerLine;

impl LineBreaker for WordPerLine {
    fn break_lines(&self, text: &str, _max_width: f64, font_size: f64) -> ReelResult<Vec<LineBox>> {
        Ok(text
            .split_whitespace()
            .map(|word| LineBox {
                text: word.to_string(),
                width: word.chars().count() as f64 * font_size,
                height: font_size,
            })
            .collect())
    }
}

#[test]
fn text_is_trimmed_and_line_breaks_collapse() {
    let vo = VoiceOver::new("Alice", "en_US/vctk_low#p236", "  Hello\nworld \n");
    assert_eq!(vo.text(), "Hello\nworld");
    assert_eq!(vo.clean_text(), "Hello world");
    assert_eq!(vo.end_pause(), "500ms");
}

#[test]
fn payload_escapes_and_carries_pause() {
    let vo = VoiceOver::with_end_pause("Bob", "v", "a < b && c > d", "1s");
    assert_eq!(
        vo.synthesis_payload(),
        "<speak>a &lt; b &amp;&amp; c &gt; d<break time='1s'/></speak>"
    );
}

#[test]
fn cache_key_is_deterministic() {
    let a = VoiceOver::new("Alice", "v1", "hi there");
    let b = VoiceOver::new("Alice", "v1", "hi there");
    assert_eq!(a.cache_key(), b.cache_key());
    // Whitespace trimming happens before hashing.
    let c = VoiceOver::new("Alice", "v1", "  hi there\n");
    assert_eq!(a.cache_key(), c.cache_key());
}

#[test]
fn cache_key_changes_with_any_input() {
    let base = VoiceOver::new("Alice", "v1", "hi");
    let others = [
        VoiceOver::new("Bob", "v1", "hi"),
        VoiceOver::new("Alice", "v2", "hi"),
        VoiceOver::new("Alice", "v1", "hello"),
        VoiceOver::with_end_pause("Alice", "v1", "hi", "800ms"),
    ];
    for other in &others {
        assert_ne!(base.cache_key(), other.cache_key(), "{other:?}");
    }
}

#[test]
fn caption_uses_caption_box() {
    let anchors = Anchors::default();
    let vo = VoiceOver::new("Alice", "v1", "short line");
    let caption = vo.caption(&anchors, &WordPerLine).unwrap();
    assert_eq!(caption.rect, anchors.caption_box());
    assert_eq!(caption.lines, vec!["short".to_string(), "line".to_string()]);
    assert_eq!(caption.font_size, CAPTION_FONT_SIZE);
    assert_eq!(caption.color, WHITE);
    assert!(caption.background.is_none());
}

#[test]
fn caption_of_wide_glyphs_wraps_with_a_real_font() {
    let dirs = [
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
        PathBuf::from("/Library/Fonts"),
        PathBuf::from("C:\\Windows\\Fonts"),
    ];
    let Some(font) = ["DejaVu Sans", "Noto Sans", "Liberation Sans", "Arial"]
        .iter()
        .find_map(|family| locate_font(family, &dirs))
    else {
        eprintln!("skipping: no system font found");
        return;
    };
    let engine = TextLayoutEngine::from_font_file(&font).unwrap();
    let anchors = Anchors::default();
    let vo = VoiceOver::new("Alice", "v1", &"WWWWWW ".repeat(10));

    let caption = vo.caption(&anchors, &engine).unwrap();
    assert!(caption.lines.len() >= 2, "{:?}", caption.lines);
    let words: Vec<&str> = caption
        .lines
        .iter()
        .flat_map(|l| l.split_whitespace())
        .collect();
    assert_eq!(words, vec!["WWWWWW"; 10]);
}
