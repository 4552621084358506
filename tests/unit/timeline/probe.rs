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

#[test]
fn wav_duration_is_exact() {
    assert_eq!(wav_duration(22_050, 44_100).unwrap(), Duration::from_secs(2));
    assert_eq!(
        wav_duration(48_000, 24_000).unwrap(),
        Duration::from_millis(500)
    );
    assert!(wav_duration(0, 10).is_err());
}

#[test]
fn fs_probe_reads_wav_and_png_headers() {
    let tmp = temp_dir("probe");
    std::fs::create_dir_all(&tmp).unwrap();

    let wav = tmp.join("a.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&wav, spec).unwrap();
    for _ in 0..8_000 {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();

    let png = tmp.join("a.png");
    image::RgbaImage::new(40, 30).save(&png).unwrap();

    let probe = FsMediaProbe;
    assert_eq!(
        probe.audio_duration(&wav).unwrap(),
        Duration::from_millis(500)
    );
    assert_eq!(probe.image_size(&png).unwrap(), Size::new(40.0, 30.0));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn fs_probe_reports_missing_artifacts() {
    let probe = FsMediaProbe;
    let missing = PathBuf::from("definitely/not/here.wav");
    assert!(matches!(
        probe.audio_duration(&missing),
        Err(ReelError::ArtifactMissing { path }) if path == missing
    ));
    assert!(matches!(
        probe.image_size(Path::new("nope.png")),
        Err(ReelError::ArtifactMissing { .. })
    ));
}
