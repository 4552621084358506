//! slidereel renders a narrated slide video from a YAML script.
//!
//! A script is an ordered list of slide entries (`image`, `text`, `code`) interleaved with
//! `<character>: <line>` voice-over entries, plus a registry of characters (portrait + voice).
//!
//! # Pipeline overview
//!
//! 1. **Parse**: YAML entries are folded into [`Slide`]s; each voice-over attaches to the slide
//!    that is current when it appears (an implicit empty slide before the first entry).
//! 2. **Synthesize**: cache-miss voice-overs go to the speech backend in one batch.
//! 3. **Prepare + highlight**: code snippets are written to the cache and rendered to images in
//!    one batch.
//! 4. **Compose**: slides are laid out back to back into a [`Timeline`] of timed layers.
//! 5. **Encode**: the timeline is handed to a [`VideoBackend`] (the system `ffmpeg` by default).
//!
//! Generated artifacts live in a content-addressed cache keyed by a fingerprint of their inputs,
//! so unchanged lines and snippets are never regenerated across runs.
#![forbid(unsafe_code)]

mod audio;
mod cache;
mod encode;
mod foundation;
mod layout;
mod pipeline;
mod script;
mod slide;
mod synth;
mod timeline;

pub use audio::mix::{
    AudioManifest, AudioSegment, MIX_CHANNELS, MIX_SAMPLE_RATE, PcmClip, build_audio_manifest,
    decode_wav, duration_to_sample, mix_manifest, write_mix_to_f32le_file,
};
pub use cache::fingerprint::{CacheKey, Fingerprinter};
pub use cache::store::{ArtifactCache, ArtifactKind, CacheEntry};
pub use encode::ffmpeg::{
    EncodePlan, EncodeSettings, FfmpegBackend, VideoBackend, ensure_parent_dir,
    escape_filter_value, is_ffmpeg_on_path, plan_encode,
};
pub use foundation::config::{HighlightConfig, ReelConfig, SpeechConfig, script_dir};
pub use foundation::core::{Canvas, Point, Rect, Size, duration_from_secs, format_secs};
pub use foundation::error::{ReelError, ReelResult};
pub use layout::anchors::Anchors;
pub use layout::fit::{FitMode, fit_rect, fit_scale};
pub use layout::text::{
    FittedText, LINE_SPACING_EM, LineBox, LineBreaker, MIN_FONT_SIZE, TextLayoutEngine, fit_text,
    locate_font, resolve_font_file,
};
pub use pipeline::{Pipeline, RunReport};
pub use script::model::{Character, Characters, Script};
pub use script::segment::segment;
pub use slide::model::{
    CodeSlide, CodeStyle, DEFAULT_TEXT_FONT_SIZE, ImageSlide, RenderContext, Slide, SlideContent, TextSlide,
    resolve_asset,
};
pub use slide::voice_over::{CAPTION_FONT_SIZE, VoiceOver};
pub use synth::highlight::{
    CodeRenderer, HighlightOptions, PygmentizeRenderer, RenderJob, render_pending,
};
pub use synth::speech::{
    Mimic3Backend, SpeechBackend, SpeechBatch, SpeechRequest, synthesize_missing,
};
pub use timeline::compose::Compositor;
pub use timeline::layer::{
    BLACK, Fill, Layer, LayerKind, PlacedImage, Rgba8, SlideSpan, SlideVisual, TextBlock,
    Timeline, WHITE,
};
pub use timeline::probe::{FsMediaProbe, MediaProbe, wav_duration};
