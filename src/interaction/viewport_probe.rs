use crate::core::{Rect, Viewport};

use super::RenderSchedule;

pub const DEFAULT_VIEWPORT_PROBE_DEBOUNCE_MS: i64 = 200;

/// Debounced check of whether a chart is inside the visible window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportProbe {
    debounce_ms: i64,
    schedule: RenderSchedule,
    in_viewport: bool,
}

impl ViewportProbe {
    #[must_use]
    pub fn new(debounce_ms: i64) -> Self {
        Self {
            debounce_ms,
            schedule: RenderSchedule::new(),
            in_viewport: true,
        }
    }

    /// Requests a probe after the debounce delay; repeated requests push the
    /// deadline back.
    pub fn request(&mut self, now_ms: i64) {
        self.schedule.schedule_debounced(now_ms, self.debounce_ms);
    }

    pub fn cancel(&mut self) {
        self.schedule.cancel();
    }

    #[must_use]
    pub fn in_viewport(&self) -> bool {
        self.in_viewport
    }

    /// Runs a due probe against `plot_rect` (page space). Returns the new
    /// in-viewport flag when it changed.
    pub fn tick(&mut self, now_ms: i64, plot_rect: Rect, window: Viewport) -> Option<bool> {
        if !self.schedule.take_due(now_ms) {
            return None;
        }
        let in_viewport =
            plot_rect.intersects_window(f64::from(window.width), f64::from(window.height));
        if in_viewport == self.in_viewport {
            return None;
        }
        self.in_viewport = in_viewport;
        Some(in_viewport)
    }
}

impl Default for ViewportProbe {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_PROBE_DEBOUNCE_MS)
    }
}
