mod axis_builder;
mod axis_format;
mod chart_options;
mod config_builder;
mod hooks;
mod legend;
mod paths;
mod plot_context;
mod scale_builder;
mod series_builder;
mod theme;
mod thresholds;
mod visibility;

pub use axis_builder::{
    AxisBuildContext, AxisBuilder, AxisProps, AxisSide, AxisSize, AxisSizeCache, AxisSpec,
    DEFAULT_AXIS_FONT_SIZE_PX, DEFAULT_AXIS_GAP_PX, DEFAULT_GRID_WIDTH_PX, DEFAULT_TICK_SIZE_PX,
    DynamicAxisSizer, GridStyle, LOG_GRID_WIDTH_PX, TickStyle, X_AXIS_SIZE_PX,
};
pub use axis_format::{
    AxisFormatterFn, AxisValueFormat, CustomFormatter, EstimatingTextMeasurer, TIME_FORMAT_TABLE,
    TextMeasurer, TimeFormatRow, TimeZoneOffset,
};
pub use chart_options::{CHART_OPTIONS_JSON_SCHEMA_V1, ChartOptions, ChartOptionsJsonContractV1};
pub use config_builder::{
    Band, ConfigBuilder, CursorConfig, CursorDrag, CursorSync, DEFAULT_FOCUS_ALPHA,
    DEFAULT_FOCUS_PROXIMITY_PX, FocusConfig, LegendConfig, LegendItem, Padding, PlotConfig,
    SelectConfig,
};
pub use hooks::{HookEvent, HookHandle, HookKind, HookRegistry, Selection};
pub use legend::{Clipboard, LegendEntry, LegendView};
pub use paths::{
    DEFAULT_BAR_WIDTH_FACTOR, DEFAULT_POINT_RADIUS_PX, PathBuilder, PathBuilderRegistry,
    PathInput, PathKind, PathSegment, SharedPathBuilder, default_path_builders,
};
pub use plot_context::PlotContext;
pub use scale_builder::{ScaleBuildContext, ScaleBuilder, ScaleProps, ScaleRangeMode, ScaleSpec};
pub use series_builder::{
    DEFAULT_LINE_WIDTH_PX, DEFAULT_POINT_SIZE_PX, DrawStyle, LineInterpolation, PointVisibility,
    SeriesBuildContext, SeriesBuilder, SeriesProps, SeriesSpec,
};
pub use theme::Theme;
pub use thresholds::{Threshold, ThresholdsSpec};
pub use visibility::{
    InMemoryVisibilityStore, SeriesVisibilityEntry, StoredVisibility, VisibilityStore,
    load_visibility, resolve_series_visibility, save_visibility,
};

/// Key of the shared X scale and axis.
pub const X_SCALE_KEY: &str = "x";
