use super::*;

fn audio(start_ms: u64, dur_ms: u64) -> Layer {
    Layer {
        kind: LayerKind::Audio {
            path: PathBuf::from("a.wav"),
        },
        start: Duration::from_millis(start_ms),
        duration: Duration::from_millis(dur_ms),
    }
}

fn fill(start_ms: u64, dur_ms: u64) -> Layer {
    Layer {
        kind: LayerKind::Background(Fill {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            color: BLACK,
        }),
        start: Duration::from_millis(start_ms),
        duration: Duration::from_millis(dur_ms),
    }
}

#[test]
fn validate_accepts_layers_inside_timeline() {
    let t = Timeline {
        slides: vec![],
        layers: vec![audio(0, 1000), fill(0, 2000)],
        total_duration: Duration::from_millis(2000),
        font_file: None,
    };
    t.validate().unwrap();
    assert_eq!(t.audio_layers().count(), 1);
    assert_eq!(t.visual_layers().count(), 1);
}

#[test]
fn validate_rejects_zero_duration_and_overrun() {
    let t = Timeline {
        slides: vec![],
        layers: vec![audio(0, 0)],
        total_duration: Duration::from_millis(2000),
        font_file: None,
    };
    assert!(t.validate().is_err());

    let t = Timeline {
        slides: vec![],
        layers: vec![audio(1500, 1000)],
        total_duration: Duration::from_millis(2000),
        font_file: None,
    };
    assert!(t.validate().is_err());
}
