use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::Color;

use super::{AxisValueFormat, TextMeasurer, Theme, TimeZoneOffset, X_SCALE_KEY};

pub const DEFAULT_AXIS_GAP_PX: f64 = 5.0;
pub const DEFAULT_TICK_SIZE_PX: f64 = 6.0;
pub const DEFAULT_AXIS_FONT_SIZE_PX: f64 = 12.0;
pub const DEFAULT_GRID_WIDTH_PX: f64 = 1.0;
pub const LOG_GRID_WIDTH_PX: f64 = 0.5;
pub const X_AXIS_SIZE_PX: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AxisSide {
    #[default]
    Bottom,
    Left,
    Top,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridStyle {
    pub show: bool,
    pub stroke: Color,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickStyle {
    pub show: bool,
    pub stroke: Color,
    pub width: f64,
    pub size: f64,
}

/// Last size resolved by a dynamic sizer, shared across config emissions.
#[derive(Debug, Clone, Default)]
pub struct AxisSizeCache(Rc<Cell<Option<f64>>>);

impl AxisSizeCache {
    #[must_use]
    pub fn get(&self) -> Option<f64> {
        self.0.get()
    }

    fn set(&self, size: f64) {
        self.0.set(Some(size));
    }
}

/// Y-axis width derived from the widest formatted tick label.
///
/// The backend runs layout in cycles; on any cycle after the first the
/// previously resolved size is returned unchanged so the layout converges.
#[derive(Debug, Clone)]
pub struct DynamicAxisSizer {
    pub gap_px: f64,
    pub font_size_px: f64,
    cache: AxisSizeCache,
}

impl PartialEq for DynamicAxisSizer {
    fn eq(&self, other: &Self) -> bool {
        self.gap_px == other.gap_px && self.font_size_px == other.font_size_px
    }
}

impl DynamicAxisSizer {
    #[must_use]
    pub fn new(gap_px: f64, font_size_px: f64, cache: AxisSizeCache) -> Self {
        Self {
            gap_px,
            font_size_px,
            cache,
        }
    }

    pub fn size(
        &self,
        labels: &[String],
        tick_size_px: f64,
        cycle_num: u32,
        measurer: &dyn TextMeasurer,
    ) -> f64 {
        if cycle_num > 1 {
            if let Some(previous) = self.cache.get() {
                return previous;
            }
        }
        let widest = labels
            .iter()
            .map(|label| measurer.text_width_px(label, self.font_size_px))
            .fold(0.0_f64, f64::max);
        let size = (widest + tick_size_px + self.gap_px).ceil();
        self.cache.set(size);
        size
    }

    #[must_use]
    pub fn cached_size(&self) -> Option<f64> {
        self.cache.get()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AxisSize {
    Fixed(f64),
    Dynamic(DynamicAxisSizer),
}

/// Fully resolved axis, as emitted in a plot config.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSpec {
    pub scale_key: String,
    pub show: bool,
    pub side: AxisSide,
    pub label: Option<String>,
    pub label_color: Color,
    pub grid: GridStyle,
    pub ticks: TickStyle,
    pub values: AxisValueFormat,
    pub size: AxisSize,
    pub gap_px: f64,
}

impl AxisSpec {
    #[must_use]
    pub fn is_x_axis(&self) -> bool {
        self.scale_key == X_SCALE_KEY
    }
}

/// Declared axis properties. `None` fields fall back to theme defaults and
/// are left untouched when merged into an existing builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisProps {
    pub scale_key: String,
    pub show: Option<bool>,
    pub side: Option<AxisSide>,
    pub label: Option<String>,
    pub show_grid: Option<bool>,
    pub grid_width: Option<f64>,
    pub grid_stroke: Option<Color>,
    pub tick_size: Option<f64>,
    pub values: Option<AxisValueFormat>,
    pub unit: Option<String>,
    pub decimals: Option<usize>,
    pub gap_px: Option<f64>,
    pub font_size_px: Option<f64>,
    pub is_log_scale: Option<bool>,
    pub theme: Option<Theme>,
}

impl AxisProps {
    #[must_use]
    pub fn new(scale_key: impl Into<String>) -> Self {
        Self {
            scale_key: scale_key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_side(mut self, side: AxisSide) -> Self {
        self.side = Some(side);
        self
    }

    #[must_use]
    pub fn with_show(mut self, show: bool) -> Self {
        self.show = Some(show);
        self
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = Some(decimals);
        self
    }

    #[must_use]
    pub fn with_values(mut self, values: AxisValueFormat) -> Self {
        self.values = Some(values);
        self
    }

    #[must_use]
    pub fn with_gap(mut self, gap_px: f64) -> Self {
        self.gap_px = Some(gap_px);
        self
    }

    #[must_use]
    pub fn with_log_scale(mut self, is_log_scale: bool) -> Self {
        self.is_log_scale = Some(is_log_scale);
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    #[must_use]
    pub fn with_grid(mut self, show_grid: bool) -> Self {
        self.show_grid = Some(show_grid);
        self
    }
}

/// Context the orchestrator knows and a single axis does not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBuildContext {
    pub theme: Theme,
    pub is_time_scale: bool,
    pub is_log_scale: bool,
    pub timezone: TimeZoneOffset,
}

#[derive(Debug, Clone)]
pub struct AxisBuilder {
    props: AxisProps,
    size_cache: AxisSizeCache,
}

impl AxisBuilder {
    #[must_use]
    pub fn new(props: AxisProps) -> Self {
        Self {
            props,
            size_cache: AxisSizeCache::default(),
        }
    }

    #[must_use]
    pub fn scale_key(&self) -> &str {
        &self.props.scale_key
    }

    #[must_use]
    pub fn props(&self) -> &AxisProps {
        &self.props
    }

    /// Overlays every field set in `update`; unset fields keep their value.
    pub fn merge(&mut self, update: AxisProps) {
        let props = &mut self.props;
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(if update.$field.is_some() {
                    props.$field = update.$field;
                })*
            };
        }
        overlay!(
            show,
            side,
            label,
            show_grid,
            grid_width,
            grid_stroke,
            tick_size,
            values,
            unit,
            decimals,
            gap_px,
            font_size_px,
            is_log_scale,
            theme,
        );
    }

    #[must_use]
    pub fn build(&self, context: AxisBuildContext) -> AxisSpec {
        let props = &self.props;
        let theme = props.theme.unwrap_or(context.theme);
        let is_x_axis = props.scale_key == X_SCALE_KEY;
        let is_log = props.is_log_scale.unwrap_or(context.is_log_scale);

        let default_grid_width = if is_log {
            LOG_GRID_WIDTH_PX
        } else {
            DEFAULT_GRID_WIDTH_PX
        };
        let grid = GridStyle {
            show: props.show_grid.unwrap_or(true),
            stroke: props.grid_stroke.unwrap_or_else(|| theme.grid_stroke()),
            width: props.grid_width.unwrap_or(default_grid_width),
        };
        let ticks = TickStyle {
            show: true,
            stroke: theme.tick_stroke(),
            width: default_grid_width,
            size: props.tick_size.unwrap_or(DEFAULT_TICK_SIZE_PX),
        };

        let values = if is_x_axis && context.is_time_scale {
            AxisValueFormat::DateTime {
                timezone: context.timezone,
            }
        } else if let Some(values) = &props.values {
            values.clone()
        } else {
            AxisValueFormat::Numeric {
                unit: props.unit.clone(),
                decimals: props.decimals.unwrap_or(2),
            }
        };

        let gap_px = props.gap_px.unwrap_or(DEFAULT_AXIS_GAP_PX);
        let size = if is_x_axis {
            AxisSize::Fixed(X_AXIS_SIZE_PX)
        } else {
            AxisSize::Dynamic(DynamicAxisSizer::new(
                gap_px,
                props.font_size_px.unwrap_or(DEFAULT_AXIS_FONT_SIZE_PX),
                self.size_cache.clone(),
            ))
        };

        let default_side = if is_x_axis {
            AxisSide::Bottom
        } else {
            AxisSide::Left
        };

        AxisSpec {
            scale_key: props.scale_key.clone(),
            show: props.show.unwrap_or(true),
            side: props.side.unwrap_or(default_side),
            label: props.label.clone(),
            label_color: theme.label_color(),
            grid,
            ticks,
            values,
            size,
            gap_px,
        }
    }
}
