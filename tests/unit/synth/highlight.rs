use std::cell::RefCell;

use super::*;
use crate::slide::model::{CodeSlide, CodeStyle};

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

#[derive(Default)]
struct RecordingRenderer {
    calls: RefCell<Vec<Vec<RenderJob>>>,
}

impl CodeRenderer for RecordingRenderer {
    fn render(&self, jobs: &[RenderJob]) -> ReelResult<()> {
        self.calls.borrow_mut().push(jobs.to_vec());
        for job in jobs {
            std::fs::write(&job.output, b"png").unwrap();
        }
        Ok(())
    }
}

fn code_slide(code: &str, ext: &str) -> Slide {
    Slide::new(SlideContent::Code(CodeSlide::new(code, ext).unwrap()))
}

#[test]
fn options_follow_file_name_conventions() {
    let cfg = HighlightConfig::default();

    let plain = HighlightOptions::for_source(Path::new("codes/abc.py"), &cfg);
    assert_eq!(plain.font_size, 16);
    assert_eq!(plain.line_pad, None);
    assert_eq!(
        plain.to_formatter_options(),
        "style=github-dark,font_size=16,line_numbers=False"
    );

    let sized = HighlightOptions::for_source(Path::new("codes/abc_24.rs"), &cfg);
    assert_eq!(sized.font_size, 24);

    let md = HighlightOptions::for_source(Path::new("codes/notes_20.md"), &cfg);
    assert_eq!(md.font_size, 20);
    assert_eq!(md.line_pad, Some(3));
    assert_eq!(md.font_name, None);

    let emoji = HighlightOptions::for_source(Path::new("codes/faces_emoji.md"), &cfg);
    assert_eq!(emoji.font_size, 109);
    assert_eq!(
        emoji.to_formatter_options(),
        "style=github-dark,font_size=109,line_numbers=False,line_pad=3,font_name=Noto Color Emoji"
    );

    // `_emoji` only matters for markdown.
    let not_md = HighlightOptions::for_source(Path::new("codes/faces_emoji.txt"), &cfg);
    assert_eq!(not_md.font_size, 16);
    assert_eq!(not_md.font_name, None);
}

#[test]
fn pending_snippets_render_in_one_call_and_then_hit_the_cache() {
    let cache = ArtifactCache::new(temp_dir("highlight_pending"));
    cache.create_dirs().unwrap();
    let slides = vec![
        Slide::empty(),
        code_slide("fn main() {}", "rs"),
        code_slide("print(1)", "py"),
        code_slide("fn main() {}", "rs"),
    ];
    for slide in &slides {
        slide.prepare(&cache).unwrap();
    }

    let renderer = RecordingRenderer::default();
    assert_eq!(render_pending(&slides, &cache, &renderer).unwrap(), 2);
    assert_eq!(render_pending(&slides, &cache, &renderer).unwrap(), 0);

    let calls = renderer.calls.borrow();
    assert_eq!(calls.len(), 1);
    let SlideContent::Code(first) = &slides[1].content else {
        unreachable!()
    };
    assert_eq!(calls[0][0].source, first.source_path(&cache));
    assert_eq!(calls[0][0].output, first.image_path(&cache));
}

#[test]
fn unprepared_source_is_missing() {
    let cache = ArtifactCache::new(temp_dir("highlight_unprepared"));
    cache.create_dirs().unwrap();
    let slides = vec![code_slide("x = 1", "py")];
    let err = render_pending(&slides, &cache, &RecordingRenderer::default()).unwrap_err();
    assert!(matches!(err, ReelError::ArtifactMissing { .. }));
}

#[test]
fn pygmentize_arguments() {
    let renderer = PygmentizeRenderer::new(HighlightConfig::default());
    let job = RenderJob {
        source: PathBuf::from("c/k.py"),
        output: PathBuf::from("i/k.png"),
    };
    assert_eq!(
        renderer.args(&job),
        [
            "-f",
            "png",
            "-O",
            "style=github-dark,font_size=16,line_numbers=False",
            "-o",
            "i/k.png",
            "c/k.py",
        ]
    );
}

#[test]
fn styled_snippets_pass_their_hint_to_the_highlighter() {
    let cache = ArtifactCache::new(temp_dir("highlight_styled"));
    cache.create_dirs().unwrap();
    let sized = CodeSlide::new("fn main() {}", "rs")
        .unwrap()
        .with_style(CodeStyle::FontSize(24));
    let emoji = CodeSlide::new(":tada:", "md")
        .unwrap()
        .with_style(CodeStyle::Emoji);
    let slides = vec![
        Slide::new(SlideContent::Code(sized)),
        Slide::new(SlideContent::Code(emoji)),
    ];
    for slide in &slides {
        slide.prepare(&cache).unwrap();
    }

    let recorder = RecordingRenderer::default();
    assert_eq!(render_pending(&slides, &cache, &recorder).unwrap(), 2);
    let jobs = recorder.calls.borrow()[0].clone();

    let cfg = HighlightConfig::default();
    assert_eq!(HighlightOptions::for_source(&jobs[0].source, &cfg).font_size, 24);
    let opts = HighlightOptions::for_source(&jobs[1].source, &cfg);
    assert_eq!(opts.font_size, 109);
    assert_eq!(opts.font_name.as_deref(), Some("Noto Color Emoji"));
}
