use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Color, convert_value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub value: f64,
    /// Unit `value` is expressed in; `None` means the scale's display unit.
    pub unit: Option<String>,
    pub label: Option<String>,
    pub color: Option<Color>,
}

impl Threshold {
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            value,
            unit: None,
            label: None,
            color: None,
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// Thresholds attached to one value scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdsSpec {
    pub scale_key: String,
    pub thresholds: Vec<Threshold>,
    /// Overrides the scale's own display unit for conversion.
    pub display_unit: Option<String>,
}

impl ThresholdsSpec {
    #[must_use]
    pub fn new(scale_key: impl Into<String>, thresholds: Vec<Threshold>) -> Self {
        Self {
            scale_key: scale_key.into(),
            thresholds,
            display_unit: None,
        }
    }

    #[must_use]
    pub fn with_display_unit(mut self, unit: impl Into<String>) -> Self {
        self.display_unit = Some(unit.into());
        self
    }

    /// Threshold values converted into the display unit, sorted and
    /// deduplicated. Values that cannot be converted are dropped.
    #[must_use]
    pub fn converted_values(&self, scale_display_unit: Option<&str>) -> Vec<f64> {
        let target = self.display_unit.as_deref().or(scale_display_unit);
        let mut values: Vec<OrderedFloat<f64>> = self
            .thresholds
            .iter()
            .filter_map(|threshold| {
                let converted = convert_value(threshold.value, threshold.unit.as_deref(), target)
                    .filter(|value| value.is_finite());
                if converted.is_none() {
                    debug!(
                        scale_key = %self.scale_key,
                        value = threshold.value,
                        unit = ?threshold.unit,
                        target = ?target,
                        "skipping threshold that cannot be converted"
                    );
                }
                converted.map(OrderedFloat)
            })
            .collect();
        values.sort_unstable();
        values.dedup();
        values.into_iter().map(OrderedFloat::into_inner).collect()
    }
}
