use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::core::format_with_unit;

pub type AxisFormatterFn = Arc<dyn Fn(f64) -> String + Send + Sync + 'static>;

/// Caller-supplied tick formatter.
///
/// Two formatters compare equal only when they share the same closure, so
/// rebuilding a config with a fresh closure counts as a config change.
#[derive(Clone)]
pub struct CustomFormatter(AxisFormatterFn);

impl CustomFormatter {
    pub fn new<F>(formatter: F) -> Self
    where
        F: Fn(f64) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(formatter))
    }

    #[must_use]
    pub fn format(&self, value: f64) -> String {
        (self.0)(value)
    }
}

impl PartialEq for CustomFormatter {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for CustomFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomFormatter(..)")
    }
}

/// One row of the datetime tick table: ticks spaced at least
/// `min_step_seconds` apart use `pattern`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFormatRow {
    pub min_step_seconds: u64,
    pub pattern: &'static str,
}

const DAY: u64 = 86_400;

/// Fixed datetime formatter table for time X axes, widest step first.
pub const TIME_FORMAT_TABLE: [TimeFormatRow; 6] = [
    TimeFormatRow { min_step_seconds: 365 * DAY, pattern: "%Y" },
    TimeFormatRow { min_step_seconds: 28 * DAY, pattern: "%b %Y" },
    TimeFormatRow { min_step_seconds: DAY, pattern: "%m/%d" },
    TimeFormatRow { min_step_seconds: 3_600, pattern: "%m/%d %H:%M" },
    TimeFormatRow { min_step_seconds: 60, pattern: "%H:%M" },
    TimeFormatRow { min_step_seconds: 1, pattern: "%H:%M:%S" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TimeZoneOffset {
    offset_minutes: i16,
}

impl TimeZoneOffset {
    #[must_use]
    pub const fn utc() -> Self {
        Self { offset_minutes: 0 }
    }

    /// Offset clamped to the valid `-14h..=14h` window.
    #[must_use]
    pub fn from_minutes(offset_minutes: i16) -> Self {
        Self {
            offset_minutes: offset_minutes.clamp(-14 * 60, 14 * 60),
        }
    }

    #[must_use]
    pub fn offset_minutes(self) -> i16 {
        self.offset_minutes
    }

    fn fixed_offset(self) -> FixedOffset {
        FixedOffset::east_opt(i32::from(self.offset_minutes) * 60)
            .unwrap_or_else(|| Utc.fix())
    }
}

/// Tick value formatting strategy for one axis.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisValueFormat {
    /// Numbers rendered in a universal unit, rescaled inside its family.
    Numeric {
        unit: Option<String>,
        decimals: usize,
    },
    /// Unix-second ticks rendered with the fixed datetime table.
    DateTime { timezone: TimeZoneOffset },
    Custom(CustomFormatter),
}

impl Default for AxisValueFormat {
    fn default() -> Self {
        Self::Numeric {
            unit: None,
            decimals: 2,
        }
    }
}

impl AxisValueFormat {
    /// Formats every tick; `step` is the spacing between adjacent ticks.
    #[must_use]
    pub fn format_ticks(&self, ticks: &[f64], step: f64) -> Vec<String> {
        ticks
            .iter()
            .map(|tick| self.format_tick(*tick, step))
            .collect()
    }

    #[must_use]
    pub fn format_tick(&self, value: f64, step: f64) -> String {
        match self {
            Self::Numeric { unit, decimals } => format_with_unit(value, unit.as_deref(), *decimals),
            Self::DateTime { timezone } => format_time_tick(value, step, *timezone),
            Self::Custom(formatter) => formatter.format(value),
        }
    }
}

fn resolve_time_pattern(step_seconds: f64) -> &'static str {
    let step = if step_seconds.is_finite() && step_seconds > 0.0 {
        step_seconds as u64
    } else {
        1
    };
    TIME_FORMAT_TABLE
        .iter()
        .find(|row| step >= row.min_step_seconds)
        .map_or(TIME_FORMAT_TABLE[TIME_FORMAT_TABLE.len() - 1].pattern, |row| {
            row.pattern
        })
}

fn format_time_tick(value_seconds: f64, step_seconds: f64, timezone: TimeZoneOffset) -> String {
    if !value_seconds.is_finite() {
        return String::new();
    }
    let Some(utc) = DateTime::<Utc>::from_timestamp(value_seconds.floor() as i64, 0) else {
        return String::new();
    };
    utc.with_timezone(&timezone.fixed_offset())
        .format(resolve_time_pattern(step_seconds))
        .to_string()
}

/// Text measurement port (canvas `measureText` in a browser host).
pub trait TextMeasurer {
    fn text_width_px(&self, text: &str, font_size_px: f64) -> f64;
}

/// Deterministic, backend-independent width estimate.
#[derive(Debug, Default, Clone, Copy)]
pub struct EstimatingTextMeasurer;

impl TextMeasurer for EstimatingTextMeasurer {
    fn text_width_px(&self, text: &str, font_size_px: f64) -> f64 {
        let units = text.chars().fold(0.0, |acc, ch| {
            acc + match ch {
                '0'..='9' => 0.62,
                '.' | ',' | ':' | '/' => 0.34,
                '-' | '+' | '%' => 0.42,
                ' ' => 0.33,
                _ => 0.58,
            }
        });
        units * font_size_px
    }
}
