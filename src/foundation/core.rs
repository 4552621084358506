use std::time::Duration;

use crate::foundation::error::{ReelError, ReelResult};

pub use kurbo::{Point, Rect, Size};

/// Output frame size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 720,
            height: 480,
        }
    }
}

/// Convert a script-provided number of seconds into a [`Duration`].
pub fn duration_from_secs(secs: f64) -> ReelResult<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|_| {
        ReelError::validation(format!(
            "duration must be a finite, non-negative number of seconds (got {secs})"
        ))
    })
}

/// Seconds with microsecond precision, the form ffmpeg expressions accept.
pub fn format_secs(d: Duration) -> String {
    format!("{:.6}", d.as_secs_f64())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
