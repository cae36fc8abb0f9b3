use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::interaction::TooltipOptions;

use super::{DEFAULT_FOCUS_ALPHA, Theme, TimeZoneOffset};

pub const CHART_OPTIONS_JSON_SCHEMA_V1: u32 = 1;

/// Loadable chart defaults shared by every chart of a dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub theme: Theme,
    pub timezone: TimeZoneOffset,
    pub focus_alpha: f64,
    pub tooltip: TooltipOptions,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            timezone: TimeZoneOffset::utc(),
            focus_alpha: DEFAULT_FOCUS_ALPHA,
            tooltip: TooltipOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptionsJsonContractV1 {
    pub schema_version: u32,
    pub options: ChartOptions,
}

impl ChartOptions {
    pub fn validate(&self) -> ChartResult<()> {
        if !self.focus_alpha.is_finite() || !(0.0..=1.0).contains(&self.focus_alpha) {
            return Err(ChartError::InvalidData(format!(
                "focus alpha must be within [0, 1], got {}",
                self.focus_alpha
            )));
        }
        if self.tooltip.deactivate_debounce_ms < 0 || self.tooltip.viewport_probe_debounce_ms < 0 {
            return Err(ChartError::InvalidData(
                "tooltip debounce delays must be non-negative".to_owned(),
            ));
        }
        if !self.tooltip.placement_gap_px.is_finite() || self.tooltip.placement_gap_px < 0.0 {
            return Err(ChartError::InvalidData(format!(
                "tooltip placement gap must be finite and >= 0, got {}",
                self.tooltip.placement_gap_px
            )));
        }
        Ok(())
    }

    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = ChartOptionsJsonContractV1 {
            schema_version: CHART_OPTIONS_JSON_SCHEMA_V1,
            options: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize chart options contract v1: {e}"))
        })
    }

    /// Accepts either a bare options object or a versioned contract.
    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        let value: serde_json::Value = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse chart options json: {e}"))
        })?;
        let options = if value.get("schema_version").is_some() {
            let payload: ChartOptionsJsonContractV1 =
                serde_json::from_value(value).map_err(|e| {
                    ChartError::InvalidData(format!(
                        "failed to parse chart options json payload: {e}"
                    ))
                })?;
            if payload.schema_version != CHART_OPTIONS_JSON_SCHEMA_V1 {
                return Err(ChartError::InvalidData(format!(
                    "unsupported chart options schema version: {}",
                    payload.schema_version
                )));
            }
            payload.options
        } else {
            serde_json::from_value(value).map_err(|e| {
                ChartError::InvalidData(format!("failed to parse chart options json: {e}"))
            })?
        };
        options.validate()?;
        Ok(options)
    }
}
