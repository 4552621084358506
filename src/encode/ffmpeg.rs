use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context as _;

use crate::audio::mix::{
    MIX_CHANNELS, MIX_SAMPLE_RATE, build_audio_manifest, mix_manifest, write_mix_to_f32le_file,
};
use crate::foundation::config::ReelConfig;
use crate::foundation::core::{Canvas, Rect, format_secs};
use crate::foundation::error::{ReelError, ReelResult};
use crate::layout::text::LINE_SPACING_EM;
use crate::timeline::layer::{
    Layer, LayerKind, PlacedImage, Rgba8, SlideVisual, TextBlock, Timeline,
};

/// Final rendering port: composed layers in, one audio+video file out.
pub trait VideoBackend {
    fn write(&self, timeline: &Timeline, out: &Path) -> ReelResult<()>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct EncodeSettings {
    pub program: String,
    pub canvas: Canvas,
    pub fps: u32,
    /// Fontconfig family for text when the timeline names no font file.
    pub font_family: String,
    /// Where caption text files and the PCM mix are written.
    pub work_dir: PathBuf,
}

impl EncodeSettings {
    pub fn from_config(cfg: &ReelConfig, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: cfg.ffmpeg_program.clone(),
            canvas: cfg.canvas,
            fps: cfg.fps,
            font_family: cfg.font_family.clone(),
            work_dir: work_dir.into(),
        }
    }
}

/// Everything one encoder invocation needs, computed without touching the filesystem.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodePlan {
    pub args: Vec<String>,
    /// Files `drawtext` reads its text from.
    pub text_files: Vec<(PathBuf, String)>,
    /// Raw f32le mix the encoder reads, when the timeline has audio.
    pub audio_path: Option<PathBuf>,
}

/// Build the `ffmpeg` argument list for `timeline`.
///
/// Input 0 is a white `color` source covering the whole timeline. Every image layer gets its own
/// looped input, then the PCM mix if there is audio. Visual layers are applied onto the base in
/// emission order, each gated to its time span.
pub fn plan_encode(
    timeline: &Timeline,
    settings: &EncodeSettings,
    out: &Path,
) -> ReelResult<EncodePlan> {
    if timeline.total_duration.is_zero() {
        return Err(ReelError::validation(
            "nothing to encode: timeline has zero duration",
        ));
    }
    let total = format_secs(timeline.total_duration);
    let Canvas { width, height } = settings.canvas;

    let mut args = Vec::from(["-y", "-loglevel", "error", "-f", "lavfi", "-i"].map(String::from));
    args.push(format!(
        "color=c=white:s={width}x{height}:r={}:d={total}",
        settings.fps
    ));

    let font = match &timeline.font_file {
        Some(path) => format!("fontfile={}", escape_filter_value(&path.display().to_string())),
        None => format!("font={}", escape_filter_value(&settings.font_family)),
    };
    let mut filters: Vec<String> = Vec::new();
    let mut text_files = Vec::new();
    let mut current = "0:v".to_string();
    let mut next_input = 1usize;

    for (idx, layer) in timeline.visual_layers().enumerate() {
        let enable = enable_expr(layer);
        let output = format!("v{idx}");
        match &layer.kind {
            LayerKind::Background(fill) => {
                filters.push(format!(
                    "[{current}]{}[{output}]",
                    drawbox(fill.rect, fill.color, &enable)
                ));
            }
            LayerKind::Slide(SlideVisual::Image(image)) | LayerKind::Portrait(image) => {
                args.extend(image_input(image, settings.fps, &total));
                let scaled = format!("img{idx}");
                filters.push(scale_filter(next_input, image.rect, &scaled));
                filters.push(format!(
                    "[{current}][{scaled}]overlay=x={}:y={}:enable='{enable}'[{output}]",
                    px(image.rect.x0),
                    px(image.rect.y0)
                ));
                next_input += 1;
            }
            LayerKind::Slide(SlideVisual::Text(text)) | LayerKind::Caption(text) => {
                let path = settings.work_dir.join(format!("text_{idx}.txt"));
                filters.push(format!(
                    "[{current}]{}[{output}]",
                    text_chain(text, &path, &font, &enable)
                ));
                text_files.push((path, text.lines.join("\n")));
            }
            LayerKind::Audio { .. } => continue,
        }
        current = output;
    }

    let audio_path = timeline
        .audio_layers()
        .next()
        .map(|_| settings.work_dir.join("mix.f32le"));
    if let Some(path) = &audio_path {
        args.extend([
            "-f".to_string(),
            "f32le".to_string(),
            "-ar".to_string(),
            MIX_SAMPLE_RATE.to_string(),
            "-ac".to_string(),
            MIX_CHANNELS.to_string(),
            "-i".to_string(),
            path.display().to_string(),
        ]);
    }

    if filters.is_empty() {
        filters.push(format!("[{current}]null[vout]"));
    } else {
        filters.push(format!("[{current}]format=yuv420p[vout]"));
    }
    args.push("-filter_complex".to_string());
    args.push(filters.join(";"));
    args.push("-map".to_string());
    args.push("[vout]".to_string());
    if audio_path.is_some() {
        args.push("-map".to_string());
        args.push(format!("{next_input}:a"));
        args.extend(["-c:a", "aac"].map(String::from));
    }
    args.extend(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-r"].map(String::from));
    args.push(settings.fps.to_string());
    args.push("-t".to_string());
    args.push(total);
    args.extend(["-movflags", "+faststart"].map(String::from));
    args.push(out.display().to_string());

    Ok(EncodePlan {
        args,
        text_files,
        audio_path,
    })
}

fn enable_expr(layer: &Layer) -> String {
    format!(
        "gte(t,{})*lt(t,{})",
        format_secs(layer.start),
        format_secs(layer.end())
    )
}

fn image_input(image: &PlacedImage, fps: u32, total: &str) -> [String; 8] {
    [
        "-loop".to_string(),
        "1".to_string(),
        "-framerate".to_string(),
        fps.to_string(),
        "-t".to_string(),
        total.to_string(),
        "-i".to_string(),
        image.path.display().to_string(),
    ]
}

fn scale_filter(input: usize, rect: Rect, label: &str) -> String {
    format!(
        "[{input}:v]scale={}:{},setsar=1,format=rgba[{label}]",
        px(rect.width()).max(1),
        px(rect.height()).max(1)
    )
}

fn drawbox(rect: Rect, color: Rgba8, enable: &str) -> String {
    format!(
        "drawbox=x={}:y={}:w={}:h={}:color={}:t=fill:enable='{enable}'",
        px(rect.x0),
        px(rect.y0),
        px(rect.width()),
        px(rect.height()),
        ffmpeg_color(color)
    )
}

/// `font` is a ready `font=` or `fontfile=` option. Text is read verbatim: `expansion=none` keeps
/// `%` and `\` literal.
fn text_chain(text: &TextBlock, textfile: &Path, font: &str, enable: &str) -> String {
    let mut chain = String::new();
    if let Some(bg) = text.background {
        chain.push_str(&drawbox(text.rect, bg, enable));
        chain.push(',');
    }
    let _ = write!(
        chain,
        "drawtext={font}:textfile={}:expansion=none:fontsize={}:fontcolor={}:line_spacing={}:x={}:y={}:enable='{enable}'",
        escape_filter_value(&textfile.display().to_string()),
        px(text.font_size),
        ffmpeg_color(text.color),
        px(text.font_size * LINE_SPACING_EM),
        px(text.rect.x0),
        px(text.rect.y0),
    );
    chain
}

fn px(v: f64) -> i64 {
    v.round() as i64
}

fn ffmpeg_color(c: Rgba8) -> String {
    format!(
        "0x{:02x}{:02x}{:02x}@{:.3}",
        c[0],
        c[1],
        c[2],
        f64::from(c[3]) / 255.0
    )
}

/// Escape a value for use inside a filter graph option.
pub fn escape_filter_value(raw: &str) -> String {
    raw.replace('\\', r"\\")
        .replace(':', r"\:")
        .replace(',', r"\,")
        .replace('\'', r"\'")
        .replace('%', r"\%")
}

pub fn is_ffmpeg_on_path(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Encodes with the system `ffmpeg` binary in a single invocation.
#[derive(Clone, Debug)]
pub struct FfmpegBackend {
    settings: EncodeSettings,
}

impl FfmpegBackend {
    pub fn new(settings: EncodeSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EncodeSettings {
        &self.settings
    }
}

impl VideoBackend for FfmpegBackend {
    #[tracing::instrument(skip_all, fields(out = %out.display()))]
    fn write(&self, timeline: &Timeline, out: &Path) -> ReelResult<()> {
        let plan = plan_encode(timeline, &self.settings, out)?;
        let program = &self.settings.program;
        if !is_ffmpeg_on_path(program) {
            return Err(ReelError::backend(
                program,
                "required for encoding, but was not found on PATH",
            ));
        }

        ensure_parent_dir(out)?;
        std::fs::create_dir_all(&self.settings.work_dir).with_context(|| {
            format!(
                "create work directory '{}'",
                self.settings.work_dir.display()
            )
        })?;
        for (path, contents) in &plan.text_files {
            std::fs::write(path, contents)
                .with_context(|| format!("write caption text '{}'", path.display()))?;
        }
        if let Some(path) = &plan.audio_path {
            let manifest = build_audio_manifest(timeline)?;
            write_mix_to_f32le_file(&mix_manifest(&manifest), path)?;
            tracing::debug!(segments = manifest.segments.len(), "audio mixed");
        }

        tracing::info!(layers = timeline.layers.len(), "encoding");
        let output = Command::new(program)
            .args(&plan.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| ReelError::backend(program, format!("failed to spawn: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReelError::backend(
                program,
                format!("exited with status {}: {}", output.status, stderr.trim()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
