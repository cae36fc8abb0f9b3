//! Scale range and distribution algorithm.
//!
//! `RangeResolver` is the pure function handed to the render backend for each
//! value scale: it folds hard limits, soft limits and data bounds into one
//! non-degenerate `[min, max]` pair. Limits are normalized once, when the
//! resolver is built, so per-draw resolution stays cheap and deterministic.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LOG_BASE: f64 = 10.0;
pub const LINEAR_FALLBACK_RANGE: (f64, f64) = (0.0, 100.0);
pub const LOG_FALLBACK_RANGE: (f64, f64) = (1.0, 100.0);

pub const TIME_WINDOW_FALLBACK_SECONDS: f64 = 24.0 * 60.0 * 60.0;
pub const TIME_MAX_TRAILING_SHIFT_SECONDS: f64 = 60.0;

/// Mapping function of a value scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Distribution {
    #[default]
    Linear,
    Logarithmic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapDirection {
    Floor,
    Ceil,
}

/// Raw hard and soft limits as declared on a scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScaleLimits {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub soft_min: Option<f64>,
    pub soft_max: Option<f64>,
}

impl ScaleLimits {
    #[must_use]
    pub fn has_any(self) -> bool {
        self.min.is_some() || self.max.is_some() || self.soft_min.is_some() || self.soft_max.is_some()
    }
}

/// Extra headroom applied to linear ranges, as a fraction of the span.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RangePadding {
    pub min_factor: f64,
    pub max_factor: f64,
}

impl RangePadding {
    #[must_use]
    pub const fn new(min_factor: f64, max_factor: f64) -> Self {
        Self {
            min_factor,
            max_factor,
        }
    }
}

/// Drops the `(0, 0)` soft-limit sentinel.
///
/// Both soft limits at zero mean "unset", not a real `[0, 0]` range. A lone
/// zero is a real limit, e.g. a value axis that starts at zero.
#[must_use]
pub fn normalize_soft_limits(
    soft_min: Option<f64>,
    soft_max: Option<f64>,
) -> (Option<f64>, Option<f64>) {
    let soft_min = soft_min.filter(|value| value.is_finite());
    let soft_max = soft_max.filter(|value| value.is_finite());
    if soft_min == Some(0.0) && soft_max == Some(0.0) {
        (None, None)
    } else {
        (soft_min, soft_max)
    }
}

/// Expands (never contracts) soft limits so every threshold stays in range.
///
/// `thresholds` must already be expressed in the scale's display unit.
#[must_use]
pub fn expand_soft_limits(
    soft_min: Option<f64>,
    soft_max: Option<f64>,
    thresholds: &[f64],
) -> (Option<f64>, Option<f64>) {
    let mut finite = thresholds.iter().copied().filter(|value| value.is_finite());
    let Some(first) = finite.next() else {
        return (soft_min, soft_max);
    };
    let (threshold_min, threshold_max) =
        finite.fold((first, first), |(min, max), value| (min.min(value), max.max(value)));

    (
        Some(soft_min.map_or(threshold_min, |current| current.min(threshold_min))),
        Some(soft_max.map_or(threshold_max, |current| current.max(threshold_max))),
    )
}

/// Snaps a positive value to a power of `base`.
///
/// Non-positive and non-finite values cannot live on a log scale and are
/// returned unchanged. Snapping an exact power returns it unchanged.
#[must_use]
pub fn snap_to_log_base(value: f64, base: f64, direction: SnapDirection) -> f64 {
    if !value.is_finite() || value <= 0.0 || !is_valid_log_base(base) {
        return value;
    }
    let exponent = log_with_base(value, base);
    let nearest = exponent.round();
    let exponent = if (exponent - nearest).abs() <= 1e-9 {
        nearest
    } else {
        match direction {
            SnapDirection::Floor => exponent.floor(),
            SnapDirection::Ceil => exponent.ceil(),
        }
    };
    power_of(base, exponent)
}

/// Enclosing powers of `base` for `[min, max]`.
///
/// Non-positive minimums are replaced by one power below the snapped
/// maximum so the range stays representable.
#[must_use]
pub fn log_range(min: f64, max: f64, base: f64) -> (f64, f64) {
    let base = if is_valid_log_base(base) {
        base
    } else {
        DEFAULT_LOG_BASE
    };
    let max = if max.is_finite() && max > 0.0 {
        snap_to_log_base(max, base, SnapDirection::Ceil)
    } else {
        LOG_FALLBACK_RANGE.1
    };
    let min = if min.is_finite() && min > 0.0 {
        snap_to_log_base(min, base, SnapDirection::Floor)
    } else {
        max / base
    };
    (min, max)
}

fn is_valid_log_base(base: f64) -> bool {
    base.is_finite() && base > 1.0
}

fn log_with_base(value: f64, base: f64) -> f64 {
    if base == 10.0 {
        value.log10()
    } else if base == 2.0 {
        value.log2()
    } else {
        value.ln() / base.ln()
    }
}

fn power_of(base: f64, exponent: f64) -> f64 {
    if exponent.abs() <= f64::from(i32::MAX) {
        base.powi(exponent as i32)
    } else {
        base.powf(exponent)
    }
}

/// Normalized, per-scale range function.
///
/// Built by the scale builder; `resolve` is evaluated on every draw with the
/// current data bounds of the series bound to the scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeResolver {
    distribution: Distribution,
    log_base: f64,
    limits: ScaleLimits,
    padding: RangePadding,
}

impl RangeResolver {
    /// Builds a resolver from declared limits and display-unit thresholds.
    ///
    /// Soft limits go through sentinel removal, then threshold expansion, then
    /// (for log scales) power snapping together with the hard limits.
    #[must_use]
    pub fn new(
        distribution: Distribution,
        log_base: f64,
        limits: ScaleLimits,
        padding: RangePadding,
        thresholds: &[f64],
    ) -> Self {
        let log_base = if is_valid_log_base(log_base) {
            log_base
        } else {
            DEFAULT_LOG_BASE
        };
        let (soft_min, soft_max) = normalize_soft_limits(limits.soft_min, limits.soft_max);
        let (soft_min, soft_max) = expand_soft_limits(soft_min, soft_max, thresholds);
        let mut limits = ScaleLimits {
            min: limits.min.filter(|value| value.is_finite()),
            max: limits.max.filter(|value| value.is_finite()),
            soft_min,
            soft_max,
        };

        if distribution == Distribution::Logarithmic {
            let floor = |value: Option<f64>| {
                value.map(|value| snap_to_log_base(value, log_base, SnapDirection::Floor))
            };
            let ceil = |value: Option<f64>| {
                value.map(|value| snap_to_log_base(value, log_base, SnapDirection::Ceil))
            };
            limits = ScaleLimits {
                min: floor(limits.min),
                max: ceil(limits.max),
                soft_min: floor(limits.soft_min),
                soft_max: ceil(limits.soft_max),
            };
        }

        Self {
            distribution,
            log_base,
            limits,
            padding,
        }
    }

    #[must_use]
    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    #[must_use]
    pub fn log_base(&self) -> f64 {
        self.log_base
    }

    /// Effective limits after sentinel removal, threshold expansion and snapping.
    #[must_use]
    pub fn limits(&self) -> ScaleLimits {
        self.limits
    }

    #[must_use]
    pub fn has_fixed_range(&self) -> bool {
        self.limits.has_any()
    }

    /// Resolves the final range for the current data bounds.
    ///
    /// Returns `None` only when neither limits nor data exist; the backend
    /// then keeps its own range untouched.
    #[must_use]
    pub fn resolve(&self, data_min: Option<f64>, data_max: Option<f64>) -> Option<(f64, f64)> {
        let data_min = data_min.filter(|value| value.is_finite());
        let data_max = data_max.filter(|value| value.is_finite());
        if !self.has_fixed_range() && data_min.is_none() && data_max.is_none() {
            return None;
        }

        let (mut min, mut max) = match self.distribution {
            Distribution::Linear => self.resolve_linear(data_min, data_max),
            Distribution::Logarithmic => self.resolve_log(data_min, data_max),
        };

        if self.distribution == Distribution::Linear {
            if let (Some(hard), None) = (self.limits.min, self.limits.soft_min) {
                min = hard;
            }
            if let (Some(hard), None) = (self.limits.max, self.limits.soft_max) {
                max = hard;
            }
        }

        if !min.is_finite() || !max.is_finite() || min >= max {
            return Some(self.fallback_range());
        }
        Some((min, max))
    }

    #[must_use]
    pub fn fallback_range(&self) -> (f64, f64) {
        match self.distribution {
            Distribution::Linear => LINEAR_FALLBACK_RANGE,
            Distribution::Logarithmic => LOG_FALLBACK_RANGE,
        }
    }

    fn resolve_linear(&self, data_min: Option<f64>, data_max: Option<f64>) -> (f64, f64) {
        let ScaleLimits {
            min: hard_min,
            max: hard_max,
            soft_min,
            soft_max,
        } = self.limits;

        let min = match (hard_min, soft_min) {
            (Some(hard), None) => Some(hard),
            (hard, soft) => widen(data_min, soft, f64::min).map(|value| match hard {
                Some(hard) => value.max(hard),
                None => value,
            }),
        };
        let max = match (hard_max, soft_max) {
            (Some(hard), None) => Some(hard),
            (hard, soft) => widen(data_max, soft, f64::max).map(|value| match hard {
                Some(hard) => value.min(hard),
                None => value,
            }),
        };
        let (min, max) = fill_missing_bound(min, max, LINEAR_FALLBACK_RANGE);

        let span = max - min;
        let (min, max) = if span > 0.0 {
            (
                min - span * self.padding.min_factor,
                max + span * self.padding.max_factor,
            )
        } else {
            (min, max)
        };
        (min.floor(), max.ceil())
    }

    fn resolve_log(&self, data_min: Option<f64>, data_max: Option<f64>) -> (f64, f64) {
        let ScaleLimits {
            min: hard_min,
            max: hard_max,
            soft_min,
            soft_max,
        } = self.limits;

        let min = hard_min.or_else(|| widen(data_min, soft_min, f64::min));
        let max = hard_max.or_else(|| widen(data_max, soft_max, f64::max));
        let (min, max) = fill_missing_bound(min, max, LOG_FALLBACK_RANGE);

        let (min, max) = log_range(min, max, self.log_base);
        let min = snap_to_log_base(min, self.log_base, SnapDirection::Floor);
        let mut max = snap_to_log_base(max, self.log_base, SnapDirection::Ceil);
        if min == max {
            max *= self.log_base;
        }
        (min, max)
    }
}

fn widen(data: Option<f64>, soft: Option<f64>, pick: fn(f64, f64) -> f64) -> Option<f64> {
    match (data, soft) {
        (Some(data), Some(soft)) => Some(pick(data, soft)),
        (data, soft) => data.or(soft),
    }
}

fn fill_missing_bound(min: Option<f64>, max: Option<f64>, fallback: (f64, f64)) -> (f64, f64) {
    match (min, max) {
        (Some(min), Some(max)) => (min, max),
        (Some(min), None) => (min, min),
        (None, Some(max)) => (max, max),
        (None, None) => fallback,
    }
}

/// Resolves the shared time (X) scale window in unix seconds.
///
/// Without bounds the window is the 24 hours ending at `now_seconds`. With
/// bounds, the max is pulled back one minute and floored to the minute so
/// in-flight samples at the edge do not leave an empty trailing gap.
#[must_use]
pub fn resolve_time_range(
    min_seconds: Option<f64>,
    max_seconds: Option<f64>,
    now_seconds: f64,
) -> (f64, f64) {
    let min_seconds = min_seconds.filter(|value| value.is_finite());
    let max_seconds = max_seconds.filter(|value| value.is_finite());
    match (min_seconds, max_seconds) {
        (None, None) => (now_seconds - TIME_WINDOW_FALLBACK_SECONDS, now_seconds),
        (min, max) => {
            let raw_max = max.unwrap_or(now_seconds);
            let min = min.unwrap_or(raw_max - TIME_WINDOW_FALLBACK_SECONDS);
            let shifted = ((raw_max - TIME_MAX_TRAILING_SHIFT_SECONDS) / 60.0).floor() * 60.0;
            let max = if shifted > min { shifted } else { raw_max };
            (min, max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SnapDirection, fill_missing_bound, normalize_soft_limits, snap_to_log_base};

    #[test]
    fn zero_pair_is_treated_as_unset() {
        assert_eq!(normalize_soft_limits(Some(0.0), Some(0.0)), (None, None));
        assert_eq!(normalize_soft_limits(Some(0.0), Some(5.0)), (Some(0.0), Some(5.0)));
        assert_eq!(normalize_soft_limits(Some(0.0), None), (Some(0.0), None));
        assert_eq!(normalize_soft_limits(None, Some(0.0)), (None, Some(0.0)));
    }

    #[test]
    fn snapping_exact_power_is_stable() {
        assert_eq!(snap_to_log_base(1000.0, 10.0, SnapDirection::Floor), 1000.0);
        assert_eq!(snap_to_log_base(1000.0, 10.0, SnapDirection::Ceil), 1000.0);
        assert_eq!(snap_to_log_base(999.0, 10.0, SnapDirection::Ceil), 1000.0);
        assert_eq!(snap_to_log_base(-4.0, 10.0, SnapDirection::Floor), -4.0);
    }

    #[test]
    fn missing_bound_mirrors_the_known_one() {
        assert_eq!(fill_missing_bound(Some(3.0), None, (0.0, 1.0)), (3.0, 3.0));
        assert_eq!(fill_missing_bound(None, None, (0.0, 1.0)), (0.0, 1.0));
    }
}
