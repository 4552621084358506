use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::foundation::error::{ReelError, ReelResult};
use crate::timeline::layer::{LayerKind, Timeline};

pub const MIX_SAMPLE_RATE: u32 = 48_000;
pub const MIX_CHANNELS: u16 = 2;

/// Decoded interleaved PCM in `[-1, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct PcmClip {
    pub sample_rate: u32,
    pub channels: u16,
    pub interleaved_f32: Vec<f32>,
}

#[derive(Clone, Debug)]
pub struct AudioSegment {
    pub timeline_start_sample: u64,
    pub timeline_end_sample: u64,
    pub source_sample_rate: u32,
    pub source_channels: u16,
    pub source_interleaved_f32: Arc<Vec<f32>>,
}

#[derive(Clone, Debug)]
pub struct AudioManifest {
    pub sample_rate: u32,
    pub channels: u16,
    pub total_samples: u64,
    pub segments: Vec<AudioSegment>,
}

/// Decode a WAV file (8/16/24/32-bit integer or 32-bit float).
pub fn decode_wav(path: &Path) -> ReelResult<PcmClip> {
    if !path.is_file() {
        return Err(ReelError::artifact_missing(path));
    }
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("open wav '{}'", path.display()))?;
    let spec = reader.spec();
    if spec.channels == 0 || spec.sample_rate == 0 {
        return Err(ReelError::validation(format!(
            "wav '{}' has no channels or a zero sample rate",
            path.display()
        )));
    }

    let interleaved_f32 = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("decode wav '{}'", path.display()))?,
        hound::SampleFormat::Int => {
            if !(1..=32).contains(&spec.bits_per_sample) {
                return Err(ReelError::validation(format!(
                    "wav '{}' has unsupported bit depth {}",
                    path.display(),
                    spec.bits_per_sample
                )));
            }
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("decode wav '{}'", path.display()))?
        }
    };

    Ok(PcmClip {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        interleaved_f32,
    })
}

/// Collect every audio layer of `timeline` into a 48 kHz stereo manifest.
///
/// Each distinct file is decoded once.
pub fn build_audio_manifest(timeline: &Timeline) -> ReelResult<AudioManifest> {
    build_audio_manifest_with(timeline, decode_wav)
}

pub(crate) fn build_audio_manifest_with(
    timeline: &Timeline,
    mut decode: impl FnMut(&Path) -> ReelResult<PcmClip>,
) -> ReelResult<AudioManifest> {
    let sample_rate = MIX_SAMPLE_RATE;
    let total_samples = duration_to_sample(timeline.total_duration, sample_rate);
    let mut decoded: HashMap<PathBuf, (u32, u16, Arc<Vec<f32>>)> = HashMap::new();
    let mut segments = Vec::new();

    for layer in &timeline.layers {
        let LayerKind::Audio { path } = &layer.kind else {
            continue;
        };
        let (source_sample_rate, source_channels, pcm) = match decoded.get(path) {
            Some(entry) => entry.clone(),
            None => {
                let clip = decode(path)?;
                let entry = (
                    clip.sample_rate,
                    clip.channels,
                    Arc::new(clip.interleaved_f32),
                );
                decoded.insert(path.clone(), entry.clone());
                entry
            }
        };
        segments.push(AudioSegment {
            timeline_start_sample: duration_to_sample(layer.start, sample_rate),
            timeline_end_sample: duration_to_sample(layer.end(), sample_rate).min(total_samples),
            source_sample_rate,
            source_channels,
            source_interleaved_f32: pcm,
        });
    }

    Ok(AudioManifest {
        sample_rate,
        channels: MIX_CHANNELS,
        total_samples,
        segments,
    })
}

/// Sum all segments into one interleaved buffer, linearly resampling each source and clamping
/// the result to `[-1, 1]`. Mono sources feed both output channels.
pub fn mix_manifest(manifest: &AudioManifest) -> Vec<f32> {
    let frames = manifest.total_samples as usize;
    let mut out = vec![0.0f32; frames * usize::from(manifest.channels)];

    for seg in &manifest.segments {
        let src = seg.source_interleaved_f32.as_ref();
        let src_channels = usize::from(seg.source_channels);
        let src_frames = src.len() / src_channels.max(1);
        if src_frames == 0 {
            continue;
        }

        for dst_sample in seg.timeline_start_sample..seg.timeline_end_sample {
            let rel_sample = dst_sample - seg.timeline_start_sample;
            let rel_sec = (rel_sample as f64) / f64::from(manifest.sample_rate);
            let src_pos = rel_sec * f64::from(seg.source_sample_rate);
            let src_frame0 = src_pos.floor() as usize;
            if src_frame0 >= src_frames {
                break;
            }
            let src_frame1 = (src_frame0 + 1).min(src_frames - 1);
            let frac = (src_pos - src_frame0 as f64) as f32;

            let (l, r) = if src_channels == 1 {
                let v0 = src[src_frame0];
                let v1 = src[src_frame1];
                let v = v0 + ((v1 - v0) * frac);
                (v, v)
            } else {
                let i0 = src_frame0 * src_channels;
                let i1 = src_frame1 * src_channels;
                (
                    src[i0] + ((src[i1] - src[i0]) * frac),
                    src[i0 + 1] + ((src[i1 + 1] - src[i0 + 1]) * frac),
                )
            };

            let dst_idx = dst_sample as usize * usize::from(manifest.channels);
            out[dst_idx] += l;
            if manifest.channels > 1 {
                out[dst_idx + 1] += r;
            }
        }
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    out
}

pub fn write_mix_to_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> ReelResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!(
                "create audio mix output directory '{}'",
                parent.display()
            )
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes)
        .with_context(|| format!("write mixed audio file '{}'", out_path.display()))?;
    Ok(())
}

/// Nearest sample index for a point in time.
pub fn duration_to_sample(d: Duration, sample_rate: u32) -> u64 {
    let num = d.as_nanos() * u128::from(sample_rate);
    ((num + 500_000_000) / 1_000_000_000) as u64
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
