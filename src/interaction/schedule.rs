use serde::{Deserialize, Serialize};

/// Work waiting for a host tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingRender {
    /// Runs on the next animation frame.
    NextFrame,
    /// Runs on the first tick at or after `due_at_ms`.
    Debounce { due_at_ms: i64 },
}

/// Single pending-render slot. Scheduling replaces whatever is pending, so
/// stale work never runs after a newer state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderSchedule {
    pending: Option<PendingRender>,
}

impl RenderSchedule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_next_frame(&mut self) {
        self.pending = Some(PendingRender::NextFrame);
    }

    pub fn schedule_debounced(&mut self, now_ms: i64, delay_ms: i64) {
        self.pending = Some(PendingRender::Debounce {
            due_at_ms: now_ms.saturating_add(delay_ms.max(0)),
        });
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn pending(&self) -> Option<PendingRender> {
        self.pending
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consumes the pending work when it is due at `now_ms`.
    pub fn take_due(&mut self, now_ms: i64) -> bool {
        let due = match self.pending {
            Some(PendingRender::NextFrame) => true,
            Some(PendingRender::Debounce { due_at_ms }) => now_ms >= due_at_ms,
            None => false,
        };
        if due {
            self.pending = None;
        }
        due
    }
}
