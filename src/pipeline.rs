use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::store::ArtifactCache;
use crate::encode::ffmpeg::{EncodeSettings, FfmpegBackend, VideoBackend};
use crate::foundation::config::{ReelConfig, script_dir};
use crate::foundation::error::ReelResult;
use crate::layout::anchors::Anchors;
use crate::layout::text::{LineBreaker, TextLayoutEngine, resolve_font_file};
use crate::script::model::Script;
use crate::slide::model::RenderContext;
use crate::synth::highlight::{CodeRenderer, PygmentizeRenderer, render_pending};
use crate::synth::speech::{Mimic3Backend, SpeechBackend, synthesize_missing};
use crate::timeline::compose::Compositor;
use crate::timeline::layer::Timeline;
use crate::timeline::probe::FsMediaProbe;

/// Summary of one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub slides: usize,
    pub voice_overs: usize,
    /// Speech requests sent this run (cache misses).
    pub synthesized: usize,
    /// Code images rendered this run (cache misses).
    pub rendered: usize,
    pub total_duration: Duration,
}

/// Script to video, end to end.
pub struct Pipeline {
    config: ReelConfig,
    speech: Box<dyn SpeechBackend>,
    renderer: Box<dyn CodeRenderer>,
    video: Box<dyn VideoBackend>,
    /// Replaces the font-backed layout engine when set.
    text: Option<Box<dyn LineBreaker>>,
}

impl Pipeline {
    pub fn new(
        config: ReelConfig,
        speech: Box<dyn SpeechBackend>,
        renderer: Box<dyn CodeRenderer>,
        video: Box<dyn VideoBackend>,
    ) -> Self {
        Self {
            config,
            speech,
            renderer,
            video,
            text: None,
        }
    }

    pub fn with_line_breaker(mut self, text: Box<dyn LineBreaker>) -> Self {
        self.text = Some(text);
        self
    }

    /// `mimic3`, `pygmentize` and `ffmpeg` as configured.
    pub fn with_system_backends(config: ReelConfig) -> Self {
        let work_dir = ArtifactCache::new(&config.cache_root).work_dir();
        let speech = Mimic3Backend::new(config.speech.clone());
        let renderer = PygmentizeRenderer::new(config.highlight.clone());
        let video = FfmpegBackend::new(EncodeSettings::from_config(&config, work_dir));
        Self::new(
            config,
            Box::new(speech),
            Box::new(renderer),
            Box::new(video),
        )
    }

    pub fn config(&self) -> &ReelConfig {
        &self.config
    }

    /// Everything up to and including composition; nothing is encoded.
    #[tracing::instrument(skip_all, fields(script = %script_path.display()))]
    pub fn compose(&self, script_path: &Path) -> ReelResult<(Timeline, RunReport)> {
        self.config.validate()?;

        let script = Script::load(script_path)?;
        let slides = script.parse_slides()?;
        let voice_overs = slides.iter().map(|s| s.voice_overs().len()).sum();
        tracing::info!(slides = slides.len(), voice_overs, "script parsed");

        let assets_root = script_dir(script_path);
        let engine;
        let (text, font_file): (&dyn LineBreaker, Option<PathBuf>) = match &self.text {
            Some(text) => (text.as_ref(), None),
            None => {
                let path = resolve_font_file(
                    self.config.font_path.as_deref(),
                    &self.config.font_family,
                    &assets_root,
                )?;
                engine = TextLayoutEngine::from_font_file(&path)?;
                tracing::info!(
                    font = %path.display(),
                    family = engine.family_name(),
                    "font loaded"
                );
                (&engine as &dyn LineBreaker, Some(path))
            }
        };

        let cache = ArtifactCache::new(&self.config.cache_root);
        cache.create_dirs()?;

        let synthesized = synthesize_missing(
            slides.iter().flat_map(|s| s.voice_overs()),
            &cache,
            self.speech.as_ref(),
        )?;

        let mut prepared = 0usize;
        for slide in &slides {
            if slide.prepare(&cache)? {
                prepared += 1;
            }
        }
        tracing::debug!(prepared, "slides prepared");
        let rendered = render_pending(&slides, &cache, self.renderer.as_ref())?;

        let probe = FsMediaProbe;
        let ctx = RenderContext {
            anchors: Anchors::new(self.config.canvas),
            cache: &cache,
            probe: &probe,
            text,
            assets_root: &assets_root,
        };
        let mut timeline = Compositor::new(ctx).compose(&slides, &script.characters)?;
        timeline.font_file = font_file;
        tracing::info!(
            layers = timeline.layers.len(),
            total = ?timeline.total_duration,
            "timeline composed"
        );

        let report = RunReport {
            slides: slides.len(),
            voice_overs,
            synthesized,
            rendered,
            total_duration: timeline.total_duration,
        };
        Ok((timeline, report))
    }

    /// Compose `script_path` and write the result to `output_path`.
    pub fn run(&self, script_path: &Path, output_path: &Path) -> ReelResult<RunReport> {
        let (timeline, report) = self.compose(script_path)?;
        self.video.write(&timeline, output_path)?;
        tracing::info!(out = %output_path.display(), "video written");
        Ok(report)
    }
}
