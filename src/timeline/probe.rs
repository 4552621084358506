use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use crate::foundation::core::Size;
use crate::foundation::error::{ReelError, ReelResult};

/// Read-only access to media properties the compositor needs.
///
/// Durations only exist once synthesis has produced the audio, so this is consulted after the
/// external backends have run.
pub trait MediaProbe {
    /// Playback length of an audio file.
    fn audio_duration(&self, path: &Path) -> ReelResult<Duration>;
    /// Natural pixel size of an image file.
    fn image_size(&self, path: &Path) -> ReelResult<Size>;
}

/// Probe backed by the filesystem: WAV headers via `hound`, image headers via `image`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsMediaProbe;

impl MediaProbe for FsMediaProbe {
    fn audio_duration(&self, path: &Path) -> ReelResult<Duration> {
        if !path.is_file() {
            return Err(ReelError::artifact_missing(path));
        }
        let reader = hound::WavReader::open(path)
            .with_context(|| format!("read wav header '{}'", path.display()))?;
        wav_duration(reader.spec().sample_rate, reader.duration())
    }

    fn image_size(&self, path: &Path) -> ReelResult<Size> {
        if !path.is_file() {
            return Err(ReelError::artifact_missing(path));
        }
        let (w, h) = image::image_dimensions(path)
            .with_context(|| format!("read image header '{}'", path.display()))?;
        if w == 0 || h == 0 {
            return Err(ReelError::validation(format!(
                "image '{}' has zero width or height",
                path.display()
            )));
        }
        Ok(Size::new(f64::from(w), f64::from(h)))
    }
}

/// Exact duration of `frames` samples per channel at `sample_rate`.
pub fn wav_duration(sample_rate: u32, frames: u32) -> ReelResult<Duration> {
    if sample_rate == 0 {
        return Err(ReelError::validation("wav sample rate must be non-zero"));
    }
    let nanos = u128::from(frames) * 1_000_000_000 / u128::from(sample_rate);
    Ok(Duration::from_nanos(nanos as u64))
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/probe.rs"]
mod tests;
