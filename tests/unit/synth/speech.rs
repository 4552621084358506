use std::cell::RefCell;
use std::path::PathBuf;

use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "slidereel_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

/// Records every batch and writes placeholder WAV files unless told to skip some.
#[derive(Default)]
struct RecordingSpeech {
    batches: RefCell<Vec<SpeechBatch>>,
    skip_writes: bool,
}

impl SpeechBackend for RecordingSpeech {
    fn synthesize(&self, batch: &SpeechBatch, out_dir: &Path) -> ReelResult<()> {
        self.batches.borrow_mut().push(batch.clone());
        if !self.skip_writes {
            for req in &batch.requests {
                std::fs::write(out_dir.join(format!("{}.wav", req.key)), b"RIFF").unwrap();
            }
        }
        Ok(())
    }
}

struct FailingSpeech;

impl SpeechBackend for FailingSpeech {
    fn synthesize(&self, _batch: &SpeechBatch, _out_dir: &Path) -> ReelResult<()> {
        Err(ReelError::backend("mimic3", "exited with status 1: boom"))
    }
}

fn lines() -> Vec<VoiceOver> {
    vec![
        VoiceOver::new("A", "voice1", "hello"),
        VoiceOver::new("B", "voice2", "world"),
        VoiceOver::new("A", "voice1", "hello"),
    ]
}

#[test]
fn only_misses_are_requested_and_second_run_is_a_noop() {
    let cache = ArtifactCache::new(temp_dir("speech_idem"));
    cache.create_dirs().unwrap();
    let backend = RecordingSpeech::default();
    let vos = lines();

    assert_eq!(synthesize_missing(&vos, &cache, &backend).unwrap(), 2);
    assert_eq!(synthesize_missing(&vos, &cache, &backend).unwrap(), 0);

    let batches = backend.batches.borrow();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].requests[0].key, vos[0].cache_key());
    assert_eq!(batches[0].requests[1].voice, "voice2");
    assert_eq!(batches[0].requests[1].markup, vos[1].synthesis_payload());
}

#[test]
fn cached_lines_are_left_out_of_the_batch() {
    let cache = ArtifactCache::new(temp_dir("speech_partial"));
    cache.create_dirs().unwrap();
    let vos = lines();
    std::fs::write(cache.path_for(vos[0].cache_key(), ArtifactKind::Audio), b"").unwrap();

    let backend = RecordingSpeech::default();
    assert_eq!(synthesize_missing(&vos, &cache, &backend).unwrap(), 1);
    assert_eq!(
        backend.batches.borrow()[0].requests[0].key,
        vos[1].cache_key()
    );
}

#[test]
fn missing_output_after_synthesis_is_reported() {
    let cache = ArtifactCache::new(temp_dir("speech_missing"));
    cache.create_dirs().unwrap();
    let backend = RecordingSpeech {
        skip_writes: true,
        ..RecordingSpeech::default()
    };
    let err = synthesize_missing(&lines(), &cache, &backend).unwrap_err();
    assert!(matches!(err, ReelError::ArtifactMissing { .. }));
}

#[test]
fn backend_failure_propagates() {
    let cache = ArtifactCache::new(temp_dir("speech_fail"));
    cache.create_dirs().unwrap();
    let err = synthesize_missing(&lines(), &cache, &FailingSpeech).unwrap_err();
    assert!(matches!(err, ReelError::ExternalBackendFailure { .. }));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn delimited_table_quotes_special_fields() {
    let key = crate::cache::fingerprint::Fingerprinter::new().str("x").finish();
    let batch = SpeechBatch {
        requests: vec![
            SpeechRequest {
                key,
                voice: "en_US/vctk_low#p236".to_string(),
                markup: "<speak>a|b \"c\"</speak>".to_string(),
            },
            SpeechRequest {
                key,
                voice: "v".to_string(),
                markup: "plain".to_string(),
            },
        ],
    };
    assert_eq!(
        batch.to_delimited(),
        format!(
            "{key}|en_US/vctk_low#p236|\"<speak>a|b \"\"c\"\"</speak>\"\n{key}|v|plain\n"
        )
    );
}

#[test]
fn mimic3_arguments_follow_config() {
    let backend = Mimic3Backend::new(SpeechConfig::default());
    assert_eq!(
        backend.args(Path::new("cache/audio")),
        [
            "--remote",
            "--ssml",
            "--stdin-format",
            "lines",
            "--csv-voice",
            "--length-scale",
            "1.1",
            "--output-dir",
            "cache/audio",
        ]
    );

    let local = Mimic3Backend::new(SpeechConfig {
        remote: false,
        ..SpeechConfig::default()
    });
    assert_eq!(local.args(Path::new("out"))[0], "--ssml");
}

#[cfg(unix)]
fn fake_synthesizer(dir: &Path, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join("fake-mimic3");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.display().to_string()
}

#[cfg(unix)]
fn large_batch() -> SpeechBatch {
    use crate::cache::fingerprint::Fingerprinter;

    SpeechBatch {
        requests: (0..2_000)
            .map(|i| SpeechRequest {
                key: Fingerprinter::new().str(&i.to_string()).finish(),
                voice: "en_US/vctk_low#p236".to_string(),
                markup: format!("<speak>{}</speak>", "x".repeat(100)),
            })
            .collect(),
    }
}

#[cfg(unix)]
#[test]
fn chatty_synthesizer_does_not_stall_a_large_batch() {
    let dir = temp_dir("speech_chatty");
    // 256 KiB of log output before any input is read; both pipes overflow their buffers.
    let program = fake_synthesizer(&dir, "head -c 262144 /dev/zero >&2\ncat > /dev/null");
    let backend = Mimic3Backend::new(SpeechConfig {
        program,
        ..SpeechConfig::default()
    });

    let batch = large_batch();
    assert!(batch.to_delimited().len() > 128 * 1024);
    backend.synthesize(&batch, &dir).unwrap();
    std::fs::remove_dir_all(&dir).ok();
}

#[cfg(unix)]
#[test]
fn synthesizer_exit_status_wins_over_broken_stdin() {
    let dir = temp_dir("speech_early_exit");
    let program = fake_synthesizer(&dir, "echo 'no voices loaded' >&2\nexit 3");
    let backend = Mimic3Backend::new(SpeechConfig {
        program,
        ..SpeechConfig::default()
    });

    let err = backend.synthesize(&large_batch(), &dir).unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, ReelError::ExternalBackendFailure { .. }), "{msg}");
    assert!(msg.contains("no voices loaded"), "{msg}");
    std::fs::remove_dir_all(&dir).ok();
}
