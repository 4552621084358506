use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::cache::store::ArtifactCache;
use crate::foundation::config::HighlightConfig;
use crate::foundation::error::{ReelError, ReelResult};
use crate::slide::model::{Slide, SlideContent};

const EMOJI_FONT_SIZE: u32 = 109;
const EMOJI_FONT_NAME: &str = "Noto Color Emoji";
const MARKDOWN_LINE_PAD: u32 = 3;

/// One snippet to highlight: source file in, PNG out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderJob {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// Code-to-image port. Called once with every pending snippet.
pub trait CodeRenderer {
    fn render(&self, jobs: &[RenderJob]) -> ReelResult<()>;
}

/// Formatter options derived from a snippet's file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightOptions {
    pub style: String,
    pub font_size: u32,
    pub line_pad: Option<u32>,
    pub font_name: Option<String>,
}

impl HighlightOptions {
    /// A trailing `_<N>` in the stem sets the font size; `.md` files get extra line padding,
    /// and `.md` files whose stem ends in `_emoji` switch to a large emoji font. Script snippets
    /// get these suffixes from the code entry's `font_size` and `emoji` keys.
    pub fn for_source(path: &Path, cfg: &HighlightConfig) -> Self {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let is_markdown = path.extension().is_some_and(|e| e == "md");

        let mut opts = Self {
            style: cfg.style.clone(),
            font_size: stem
                .rsplit('_')
                .next()
                .and_then(|tail| tail.parse::<u32>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(cfg.default_font_size),
            line_pad: None,
            font_name: None,
        };
        if is_markdown {
            opts.line_pad = Some(MARKDOWN_LINE_PAD);
            if stem.ends_with("_emoji") {
                opts.font_size = EMOJI_FONT_SIZE;
                opts.font_name = Some(EMOJI_FONT_NAME.to_string());
            }
        }
        opts
    }

    /// Comma-separated `-O` value for the formatter.
    pub fn to_formatter_options(&self) -> String {
        let mut out = format!(
            "style={},font_size={},line_numbers=False",
            self.style, self.font_size
        );
        if let Some(pad) = self.line_pad {
            out.push_str(&format!(",line_pad={pad}"));
        }
        if let Some(name) = &self.font_name {
            out.push_str(&format!(",font_name={name}"));
        }
        out
    }
}

/// Render every code slide whose image is not cached yet. Slides must be prepared first so
/// their sources exist.
///
/// Returns the number of snippets rendered.
#[tracing::instrument(skip_all)]
pub fn render_pending(
    slides: &[Slide],
    cache: &ArtifactCache,
    renderer: &dyn CodeRenderer,
) -> ReelResult<usize> {
    let mut jobs: Vec<RenderJob> = Vec::new();
    for slide in slides {
        let SlideContent::Code(code) = &slide.content else {
            continue;
        };
        let output = code.image_path(cache);
        if output.is_file() || jobs.iter().any(|j| j.output == output) {
            continue;
        }
        let source = code.source_path(cache);
        if !source.is_file() {
            return Err(ReelError::artifact_missing(source));
        }
        jobs.push(RenderJob { source, output });
    }

    if jobs.is_empty() {
        tracing::debug!("all code images cached");
        return Ok(0);
    }

    tracing::info!(jobs = jobs.len(), "rendering code images");
    renderer.render(&jobs)?;

    for job in &jobs {
        if !job.output.is_file() {
            return Err(ReelError::artifact_missing(&job.output));
        }
    }
    Ok(jobs.len())
}

/// `pygmentize -f png`, one process per snippet.
#[derive(Clone, Debug)]
pub struct PygmentizeRenderer {
    cfg: HighlightConfig,
}

impl PygmentizeRenderer {
    pub fn new(cfg: HighlightConfig) -> Self {
        Self { cfg }
    }

    pub(crate) fn args(&self, job: &RenderJob) -> Vec<String> {
        let opts = HighlightOptions::for_source(&job.source, &self.cfg);
        vec![
            "-f".to_string(),
            "png".to_string(),
            "-O".to_string(),
            opts.to_formatter_options(),
            "-o".to_string(),
            job.output.display().to_string(),
            job.source.display().to_string(),
        ]
    }
}

impl CodeRenderer for PygmentizeRenderer {
    fn render(&self, jobs: &[RenderJob]) -> ReelResult<()> {
        let program = &self.cfg.program;
        for job in jobs {
            tracing::debug!(source = %job.source.display(), "highlight");
            let output = Command::new(program)
                .args(self.args(job))
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .output()
                .map_err(|e| ReelError::backend(program, format!("failed to spawn: {e}")))?;
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(ReelError::backend(
                    program,
                    format!(
                        "'{}' exited with status {}: {}",
                        job.source.display(),
                        output.status,
                        stderr.trim()
                    ),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/synth/highlight.rs"]
mod tests;
