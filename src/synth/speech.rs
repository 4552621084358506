use std::io::Write as _;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::Context;

use crate::cache::fingerprint::CacheKey;
use crate::cache::store::{ArtifactCache, ArtifactKind};
use crate::foundation::config::SpeechConfig;
use crate::foundation::error::{ReelError, ReelResult};
use crate::slide::voice_over::VoiceOver;

/// One row of a synthesis batch; the backend writes `<key>.wav`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeechRequest {
    pub key: CacheKey,
    pub voice: String,
    pub markup: String,
}

/// Cache-miss voice-overs in script order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpeechBatch {
    pub requests: Vec<SpeechRequest>,
}

impl SpeechBatch {
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// `key|voice|markup` lines, one per request.
    pub fn to_delimited(&self) -> String {
        let mut out = String::new();
        for req in &self.requests {
            out.push_str(&quote_field(&req.key.to_hex()));
            out.push('|');
            out.push_str(&quote_field(&req.voice));
            out.push('|');
            out.push_str(&quote_field(&req.markup));
            out.push('\n');
        }
        out
    }
}

fn quote_field(field: &str) -> String {
    if field.contains(['|', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Batch text-to-speech port. One call per run, never per voice-over.
pub trait SpeechBackend {
    /// Produce `<key>.wav` in `out_dir` for every request. Any failure fails the whole batch.
    fn synthesize(&self, batch: &SpeechBatch, out_dir: &Path) -> ReelResult<()>;
}

/// Synthesize audio for every voice-over whose WAV is not cached yet.
///
/// Returns the number of requests sent. No backend call is made when everything is cached.
#[tracing::instrument(skip_all)]
pub fn synthesize_missing<'a>(
    voice_overs: impl IntoIterator<Item = &'a VoiceOver>,
    cache: &ArtifactCache,
    backend: &dyn SpeechBackend,
) -> ReelResult<usize> {
    let mut batch = SpeechBatch::default();
    for vo in voice_overs {
        if cache.ensure(vo.cache_key(), ArtifactKind::Audio).hit {
            continue;
        }
        // Identical lines share a key; request each once.
        if batch.requests.iter().any(|r| r.key == vo.cache_key()) {
            continue;
        }
        batch.requests.push(SpeechRequest {
            key: vo.cache_key(),
            voice: vo.voice().to_string(),
            markup: vo.synthesis_payload().to_string(),
        });
    }

    if batch.is_empty() {
        tracing::debug!("all voice-overs cached");
        return Ok(0);
    }

    tracing::info!(requests = batch.len(), "synthesizing speech");
    backend.synthesize(&batch, &cache.audio_dir())?;

    for req in &batch.requests {
        let path = cache.path_for(req.key, ArtifactKind::Audio);
        if !path.is_file() {
            return Err(ReelError::artifact_missing(path));
        }
    }
    Ok(batch.len())
}

/// `mimic3` fed the request table on stdin.
#[derive(Clone, Debug)]
pub struct Mimic3Backend {
    cfg: SpeechConfig,
}

impl Mimic3Backend {
    pub fn new(cfg: SpeechConfig) -> Self {
        Self { cfg }
    }

    pub(crate) fn args(&self, out_dir: &Path) -> Vec<String> {
        let mut args = Vec::new();
        if self.cfg.remote {
            args.push("--remote".to_string());
        }
        args.extend(
            ["--ssml", "--stdin-format", "lines", "--csv-voice", "--length-scale"]
                .map(String::from),
        );
        args.push(self.cfg.length_scale.to_string());
        args.push("--output-dir".to_string());
        args.push(out_dir.display().to_string());
        args
    }
}

impl SpeechBackend for Mimic3Backend {
    fn synthesize(&self, batch: &SpeechBatch, out_dir: &Path) -> ReelResult<()> {
        let program = &self.cfg.program;
        let mut child = Command::new(program)
            .args(self.args(out_dir))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ReelError::backend(program, format!("failed to spawn: {e}")))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::backend(program, "failed to open stdin"))?;
        let table = batch.to_delimited();

        // stderr is drained while the table is still being written.
        let (written, output) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(table.as_bytes()));
            let output = child.wait_with_output();
            (writer.join(), output)
        });

        let output = output.with_context(|| format!("wait for {program}"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReelError::backend(
                program,
                format!("exited with status {}: {}", output.status, stderr.trim()),
            ));
        }
        written
            .map_err(|_| ReelError::backend(program, "stdin writer panicked"))?
            .with_context(|| format!("write synthesis requests to {program}"))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/synth/speech.rs"]
mod tests;
