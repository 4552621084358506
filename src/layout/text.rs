use std::borrow::Cow;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::Rect;
use crate::foundation::error::{ReelError, ReelResult};

/// Gap between lines as a fraction of the font size; the encoder draws with the same value.
pub const LINE_SPACING_EM: f64 = 0.2;
/// Text shrinks to fit its box, but never below this size.
pub const MIN_FONT_SIZE: f64 = 10.0;
const SHRINK_STEP: f64 = 0.9;

/// One laid-out line.
#[derive(Clone, Debug, PartialEq)]
pub struct LineBox {
    pub text: String,
    /// Advance without trailing whitespace.
    pub width: f64,
    pub height: f64,
}

/// Line breaking port.
///
/// Implementations break at word boundaries so that lines fit `max_width`; a single word wider
/// than that stays on its own (overflowing) line.
pub trait LineBreaker {
    fn break_lines(&self, text: &str, max_width: f64, font_size: f64) -> ReelResult<Vec<LineBox>>;
}

/// Wrapped lines plus the size they were laid out at.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedText {
    pub lines: Vec<String>,
    pub font_size: f64,
}

/// Wrap `text` into `rect`, shrinking the font until every line fits the width and the block
/// fits the height. At [`MIN_FONT_SIZE`] the lines below the box are dropped.
pub fn fit_text(
    breaker: &dyn LineBreaker,
    text: &str,
    rect: Rect,
    font_size: f64,
) -> ReelResult<FittedText> {
    if !font_size.is_finite() || font_size <= 0.0 {
        return Err(ReelError::validation(
            "font size must be a positive number",
        ));
    }
    let mut size = font_size;
    loop {
        let lines = breaker.break_lines(text, rect.width(), size)?;
        let fits_width = lines.iter().all(|l| l.width <= rect.width());
        if fits_width && lines_within(&lines, size, rect.height()) == lines.len() {
            return Ok(FittedText {
                lines: lines.into_iter().map(|l| l.text).collect(),
                font_size: size,
            });
        }
        if size <= MIN_FONT_SIZE {
            let kept = lines_within(&lines, size, rect.height());
            tracing::warn!(
                kept,
                total = lines.len(),
                font_size = size,
                "text overflows its box"
            );
            return Ok(FittedText {
                lines: lines.into_iter().take(kept).map(|l| l.text).collect(),
                font_size: size,
            });
        }
        size = (size * SHRINK_STEP).max(MIN_FONT_SIZE);
    }
}

/// How many leading lines fit in `height`.
fn lines_within(lines: &[LineBox], font_size: f64, height: f64) -> usize {
    let gap = font_size * LINE_SPACING_EM;
    let mut used = 0.0;
    for (idx, line) in lines.iter().enumerate() {
        used += line.height + if idx > 0 { gap } else { 0.0 };
        if used > height {
            return idx;
        }
    }
    lines.len()
}

struct Contexts {
    font: parley::FontContext,
    layout: parley::LayoutContext<()>,
}

/// Parley-backed line breaker over a single font loaded from bytes.
pub struct TextLayoutEngine {
    contexts: RefCell<Contexts>,
    family: String,
}

impl TextLayoutEngine {
    pub fn from_font_bytes(bytes: Vec<u8>) -> ReelResult<Self> {
        let mut font = parley::FontContext::default();
        let families = font
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            ReelError::validation("no font families registered from font bytes")
        })?;
        let family = font
            .collection
            .family_name(family_id)
            .ok_or_else(|| ReelError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            contexts: RefCell::new(Contexts {
                font,
                layout: parley::LayoutContext::new(),
            }),
            family,
        })
    }

    pub fn from_font_file(path: &Path) -> ReelResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Self::from_font_bytes(bytes)
    }

    pub fn family_name(&self) -> &str {
        &self.family
    }
}

impl LineBreaker for TextLayoutEngine {
    fn break_lines(&self, text: &str, max_width: f64, font_size: f64) -> ReelResult<Vec<LineBox>> {
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(ReelError::validation(
                "font size must be a positive number",
            ));
        }
        let text = text.trim_end();
        let mut guard = self.contexts.borrow_mut();
        let Contexts { font, layout } = &mut *guard;

        let mut builder = layout.ranged_builder(font, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Borrowed(self.family.as_str())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font_size as f32));

        let mut laid_out: parley::Layout<()> = builder.build(text);
        laid_out.break_all_lines(Some(max_width as f32));

        Ok(laid_out
            .lines()
            .map(|line| {
                let metrics = line.metrics();
                LineBox {
                    text: text[line.text_range()].trim_end().to_string(),
                    width: f64::from(metrics.advance - metrics.trailing_whitespace),
                    height: f64::from(metrics.line_height),
                }
            })
            .collect())
    }
}

/// Font file for the run: `explicit` when given, otherwise the first file named after `family`
/// under `<assets_root>/fonts`, `<assets_root>/assets` or the system font directories.
pub fn resolve_font_file(
    explicit: Option<&Path>,
    family: &str,
    assets_root: &Path,
) -> ReelResult<PathBuf> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(ReelError::artifact_missing(path));
        }
        return Ok(path.to_path_buf());
    }
    let mut dirs = vec![assets_root.join("fonts"), assets_root.join("assets")];
    dirs.extend(system_font_dirs());
    locate_font(family, &dirs).ok_or_else(|| {
        ReelError::validation(format!(
            "font '{family}' not found; set SLIDEREEL_FONT to a .ttf or .otf file"
        ))
    })
}

/// Search `dirs` (recursively, in order) for a font file whose name matches `family`, ignoring
/// case, spaces and dashes. `Noto Sans` matches `NotoSans.ttf` and `NotoSans-Regular.ttf`.
pub fn locate_font(family: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    let want = normalize_font_name(family);
    if want.is_empty() {
        return None;
    }
    let names = [want.clone(), format!("{want}regular")];
    dirs.iter().find_map(|dir| find_in_dir(dir, &names))
}

fn find_in_dir(root: &Path, names: &[String]) -> Option<PathBuf> {
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let Ok(rd) = std::fs::read_dir(&dir) else {
            continue;
        };
        let mut entries: Vec<PathBuf> = rd.flatten().map(|e| e.path()).collect();
        entries.sort();
        for path in entries {
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            if !is_font_file(&path) {
                continue;
            }
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            if names.contains(&normalize_font_name(stem)) {
                return Some(path);
            }
        }
    }
    None
}

fn is_font_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    ext == "ttf" || ext == "otf" || ext == "ttc"
}

fn normalize_font_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        dirs.push(home.join(".local/share/fonts"));
        dirs.push(home.join(".fonts"));
    }
    dirs.extend(
        [
            "/usr/share/fonts",
            "/usr/local/share/fonts",
            "/Library/Fonts",
            "/System/Library/Fonts",
            "C:\\Windows\\Fonts",
        ]
        .map(PathBuf::from),
    );
    dirs
}

#[cfg(test)]
#[path = "../../tests/unit/layout/text.rs"]
mod tests;
