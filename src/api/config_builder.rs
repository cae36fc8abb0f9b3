use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{AlignedData, Clock, Color, Distribution, SystemClock};
use crate::error::{ChartError, ChartResult};
use crate::extensions::{InstalledPlugin, PlotPlugin};

use super::{
    AxisBuildContext, AxisBuilder, AxisProps, AxisSpec, ChartOptions, HookEvent, HookHandle,
    HookKind, HookRegistry, PathBuilderRegistry, PlotContext, ScaleBuildContext, ScaleBuilder,
    ScaleProps, ScaleSpec, SeriesBuildContext, SeriesBuilder, SeriesProps, SeriesSpec,
    StoredVisibility, Theme, ThresholdsSpec, TimeZoneOffset, VisibilityStore, X_SCALE_KEY,
    default_path_builders, load_visibility, resolve_series_visibility, save_visibility,
};

pub const DEFAULT_FOCUS_ALPHA: f64 = 0.3;
pub const DEFAULT_FOCUS_PROXIMITY_PX: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSync {
    pub key: String,
    /// Scale keys matched across synced charts (X, optional Y).
    pub scales: (String, Option<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorDrag {
    pub x: bool,
    pub y: bool,
    pub set_scale: bool,
}

impl Default for CursorDrag {
    fn default() -> Self {
        Self {
            x: true,
            y: false,
            set_scale: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorConfig {
    pub show: bool,
    pub show_points: bool,
    pub drag: CursorDrag,
    pub focus_proximity_px: f64,
    pub sync: Option<CursorSync>,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            show: true,
            show_points: true,
            drag: CursorDrag::default(),
            focus_proximity_px: DEFAULT_FOCUS_PROXIMITY_PX,
            sync: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 16.0,
            right: 16.0,
            bottom: 8.0,
            left: 8.0,
        }
    }
}

/// Built-in legend of the backend; the crate renders its own `LegendView`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegendConfig {
    pub show: bool,
    pub live: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusConfig {
    /// Opacity applied to unfocused series.
    pub alpha: f64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_FOCUS_ALPHA,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectConfig {
    pub show: bool,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self { show: true }
    }
}

/// Filled region between two series (1-based indexes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub series: (usize, usize),
    pub fill: Option<Color>,
}

/// Immutable configuration handed to the render backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    pub axes: Vec<AxisSpec>,
    pub scales: Vec<ScaleSpec>,
    /// Data series; series index `n` lives at `series[n - 1]`.
    pub series: Vec<SeriesSpec>,
    pub bands: Vec<Band>,
    pub cursor: CursorConfig,
    pub legend: LegendConfig,
    pub focus: FocusConfig,
    pub select: SelectConfig,
    pub padding: Padding,
    pub timezone: TimeZoneOffset,
    pub plugin_ids: Vec<String>,
    pub hooks: HookRegistry,
    pub plot_context: PlotContext,
}

impl PlotConfig {
    #[must_use]
    pub fn scale(&self, scale_key: &str) -> Option<&ScaleSpec> {
        self.scales.iter().find(|scale| scale.scale_key == scale_key)
    }

    #[must_use]
    pub fn axis(&self, scale_key: &str) -> Option<&AxisSpec> {
        self.axes.iter().find(|axis| axis.scale_key == scale_key)
    }

    /// Series at the 1-based `series_index`.
    #[must_use]
    pub fn series_at(&self, series_index: usize) -> Option<&SeriesSpec> {
        series_index
            .checked_sub(1)
            .and_then(|position| self.series.get(position))
    }

    #[must_use]
    pub fn is_time_x(&self) -> bool {
        self.scale(X_SCALE_KEY).is_some_and(|scale| scale.time)
    }

    /// Range of `scale_key` for `data`, folding the bounds of every visible
    /// series drawn on it. `None` leaves the range to backend autoscale.
    #[must_use]
    pub fn scale_range(
        &self,
        scale_key: &str,
        data: &AlignedData,
        now_seconds: f64,
    ) -> Option<(f64, f64)> {
        let scale = self.scale(scale_key)?;
        let bounds = if scale_key == X_SCALE_KEY {
            data.x_bounds()
        } else {
            let indexes = self
                .series
                .iter()
                .enumerate()
                .filter(|(_, series)| series.show && series.scale_key == scale_key)
                .map(|(position, _)| position + 1);
            data.value_bounds(indexes)
        };
        let (data_min, data_max) = bounds.map_or((None, None), |(min, max)| (Some(min), Some(max)));
        scale.range_for(data_min, data_max, now_seconds)
    }
}

/// One legend row derived from a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendItem {
    pub series_index: usize,
    pub label: String,
    pub color: Color,
    pub show: bool,
}

/// Orchestrates axis, scale and series builders into a `PlotConfig`.
pub struct ConfigBuilder {
    widget_id: Option<String>,
    theme: Theme,
    clock: Rc<dyn Clock>,
    visibility_store: Option<Rc<dyn VisibilityStore>>,
    color_map: Option<IndexMap<String, Color>>,
    path_builders: Option<Rc<PathBuilderRegistry>>,
    axes: IndexMap<String, AxisBuilder>,
    scales: IndexMap<String, ScaleBuilder>,
    series: Vec<SeriesBuilder>,
    thresholds: IndexMap<String, ThresholdsSpec>,
    hooks: HookRegistry,
    plugins: Vec<InstalledPlugin>,
    bands: Vec<Band>,
    cursor: CursorConfig,
    padding: Padding,
    legend: LegendConfig,
    focus: FocusConfig,
    select: SelectConfig,
    timezone: TimeZoneOffset,
    plot_context: PlotContext,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            widget_id: None,
            theme: Theme::default(),
            clock: Rc::new(SystemClock),
            visibility_store: None,
            color_map: None,
            path_builders: None,
            axes: IndexMap::new(),
            scales: IndexMap::new(),
            series: Vec::new(),
            thresholds: IndexMap::new(),
            hooks: HookRegistry::new(),
            plugins: Vec::new(),
            bands: Vec::new(),
            cursor: CursorConfig::default(),
            padding: Padding::default(),
            legend: LegendConfig::default(),
            focus: FocusConfig::default(),
            select: SelectConfig::default(),
            timezone: TimeZoneOffset::utc(),
            plot_context: PlotContext::new(),
        }
    }

    #[must_use]
    pub fn with_widget_id(mut self, widget_id: impl Into<String>) -> Self {
        self.widget_id = Some(widget_id.into());
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_visibility_store(mut self, store: Rc<dyn VisibilityStore>) -> Self {
        self.visibility_store = Some(store);
        self
    }

    #[must_use]
    pub fn with_color_map(mut self, color_map: IndexMap<String, Color>) -> Self {
        self.color_map = Some(color_map);
        self
    }

    #[must_use]
    pub fn with_path_builders(mut self, registry: PathBuilderRegistry) -> Self {
        self.path_builders = Some(Rc::new(registry));
        self
    }

    /// Applies loadable defaults: theme, timezone and focus opacity.
    #[must_use]
    pub fn with_options(mut self, options: &ChartOptions) -> Self {
        self.theme = options.theme;
        self.timezone = options.timezone;
        self.focus.alpha = options.focus_alpha;
        self
    }

    #[must_use]
    pub fn get_widget_id(&self) -> Option<&str> {
        self.widget_id.as_deref()
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub fn clock(&self) -> Rc<dyn Clock> {
        Rc::clone(&self.clock)
    }

    #[must_use]
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    #[must_use]
    pub fn plot_context(&self) -> PlotContext {
        self.plot_context.clone()
    }

    #[must_use]
    pub fn visibility_store(&self) -> Option<Rc<dyn VisibilityStore>> {
        self.visibility_store.clone()
    }

    #[must_use]
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    #[must_use]
    pub fn is_time_x(&self) -> bool {
        self.scales
            .get(X_SCALE_KEY)
            .is_some_and(ScaleBuilder::is_time)
    }

    /// Adds an axis, merging into an existing axis with the same scale key.
    pub fn add_axis(&mut self, props: AxisProps) {
        if let Some(existing) = self.axes.get_mut(&props.scale_key) {
            existing.merge(props);
            return;
        }
        self.axes
            .insert(props.scale_key.clone(), AxisBuilder::new(props));
    }

    /// Adds a scale, merging into an existing scale with the same key.
    ///
    /// Only one scale may be a time scale; a later `time: true` on another
    /// key is dropped and that scale stays a value scale.
    pub fn add_scale(&mut self, mut props: ScaleProps) {
        if props.time == Some(true) {
            let existing_time_key = self
                .scales
                .values()
                .find(|scale| scale.is_time() && scale.scale_key() != props.scale_key)
                .map(|scale| scale.scale_key().to_owned());
            if let Some(time_key) = existing_time_key {
                warn!(
                    scale_key = %props.scale_key,
                    time_scale = %time_key,
                    "a time scale already exists; keeping scale as a value scale"
                );
                props.time = Some(false);
            }
        }
        if let Some(existing) = self.scales.get_mut(&props.scale_key) {
            existing.merge(props);
            return;
        }
        self.scales
            .insert(props.scale_key.clone(), ScaleBuilder::new(props));
    }

    /// Appends a series and returns its 1-based index.
    pub fn add_series(&mut self, props: SeriesProps) -> usize {
        self.series.push(SeriesBuilder::new(props));
        self.series.len()
    }

    pub fn add_hook<F>(&self, kind: HookKind, handler: F) -> HookHandle
    where
        F: FnMut(&HookEvent) + 'static,
    {
        self.hooks.add(kind, handler)
    }

    pub fn add_plugin(&mut self, mut plugin: Box<dyn PlotPlugin>) -> ChartResult<()> {
        let plugin_id = plugin.id().to_owned();
        if plugin_id.is_empty() {
            return Err(ChartError::InvalidData(
                "plugin id must not be empty".to_owned(),
            ));
        }
        if self.has_plugin(&plugin_id) {
            return Err(ChartError::InvalidData(format!(
                "plugin with id `{plugin_id}` is already registered"
            )));
        }
        let handles = plugin.install(&self.hooks);
        self.plugins.push(InstalledPlugin { plugin, handles });
        Ok(())
    }

    /// Removes a plugin and its hooks. Returns `true` when removed.
    pub fn remove_plugin(&mut self, plugin_id: &str) -> bool {
        let Some(position) = self
            .plugins
            .iter()
            .position(|entry| entry.plugin.id() == plugin_id)
        else {
            return false;
        };
        self.plugins.remove(position).uninstall();
        true
    }

    #[must_use]
    pub fn has_plugin(&self, plugin_id: &str) -> bool {
        self.plugins
            .iter()
            .any(|entry| entry.plugin.id() == plugin_id)
    }

    /// Attaches thresholds to a scale. Only the first call per scale key
    /// takes effect; returns `false` for ignored calls.
    pub fn add_thresholds(&mut self, spec: ThresholdsSpec) -> bool {
        if self.thresholds.contains_key(&spec.scale_key) {
            debug!(scale_key = %spec.scale_key, "thresholds already set for scale");
            return false;
        }
        self.thresholds.insert(spec.scale_key.clone(), spec);
        true
    }

    pub fn set_cursor(&mut self, cursor: CursorConfig) {
        self.cursor = cursor;
    }

    pub fn set_padding(&mut self, padding: Padding) {
        self.padding = padding;
    }

    pub fn set_legend(&mut self, legend: LegendConfig) {
        self.legend = legend;
    }

    pub fn set_focus(&mut self, focus: FocusConfig) {
        self.focus = focus;
    }

    pub fn set_select(&mut self, select: SelectConfig) {
        self.select = select;
    }

    pub fn set_tz_date(&mut self, timezone: TimeZoneOffset) {
        self.timezone = timezone;
    }

    pub fn set_bands(&mut self, bands: Vec<Band>) {
        self.bands = bands;
    }

    /// Shares the cursor across charts with the same `key`. Only time-based
    /// X scales can be synced; returns `false` otherwise.
    pub fn enable_cursor_sync(&mut self, key: impl Into<String>) -> bool {
        if !self.is_time_x() {
            return false;
        }
        self.cursor.sync = Some(CursorSync {
            key: key.into(),
            scales: (X_SCALE_KEY.to_owned(), None),
        });
        true
    }

    /// Calls `callback(start_ms, end_ms)` for every drag selection with a
    /// non-zero width.
    pub fn on_drag_select<F>(&self, mut callback: F) -> HookHandle
    where
        F: FnMut(i64, i64) + 'static,
    {
        self.hooks.add(HookKind::SetSelect, move |event| {
            let HookEvent::SetSelect { selection, .. } = event else {
                return;
            };
            if selection.width_px <= 0.0 {
                return;
            }
            let start_ms = seconds_to_millis(selection.start.min(selection.end));
            let end_ms = seconds_to_millis(selection.start.max(selection.end));
            if start_ms < end_ms {
                callback(start_ms, end_ms);
            }
        })
    }

    /// Effective visibility per series, in series order.
    #[must_use]
    pub fn resolve_visibility(&self) -> Vec<bool> {
        let declared: Vec<bool> = self.series.iter().map(SeriesBuilder::declared_show).collect();
        let stored = self.load_stored_visibility();
        resolve_series_visibility(&declared, stored.as_ref())
    }

    fn load_stored_visibility(&self) -> Option<StoredVisibility> {
        let store = self.visibility_store.as_deref()?;
        let widget_id = self.widget_id.as_deref()?;
        load_visibility(store, widget_id)
    }

    /// Persists `visibility` (series order) under the widget id. A no-op
    /// without a widget id or store.
    pub fn persist_visibility(&self, visibility: &[bool]) -> ChartResult<()> {
        let (Some(store), Some(widget_id)) =
            (self.visibility_store.as_deref(), self.widget_id.as_deref())
        else {
            return Ok(());
        };
        let labels = self.series_labels();
        let stored = StoredVisibility::from_series(
            X_SCALE_KEY,
            labels
                .iter()
                .map(String::as_str)
                .zip(visibility.iter().copied()),
        );
        save_visibility(store, widget_id, &stored)
    }

    fn series_labels(&self) -> Vec<String> {
        self.series
            .iter()
            .enumerate()
            .map(|(position, series)| series_label(series, position + 1))
            .collect()
    }

    fn path_builders(&self) -> &PathBuilderRegistry {
        self.path_builders
            .as_deref()
            .unwrap_or_else(|| default_path_builders())
    }

    /// Emits the configuration for the current builder state.
    pub fn get_config(&self) -> ChartResult<PlotConfig> {
        let any_time_axis = self.scales.values().any(ScaleBuilder::is_time);
        let has_series = !self.series.is_empty();

        let scales = self
            .scales
            .values()
            .map(|scale| {
                let thresholds = self
                    .thresholds
                    .get(scale.scale_key())
                    .map(|spec| spec.converted_values(scale.display_unit()))
                    .unwrap_or_default();
                scale.build(ScaleBuildContext {
                    any_time_axis,
                    has_series,
                    thresholds: &thresholds,
                })
            })
            .collect();

        let axes = self
            .axes
            .values()
            .map(|axis| {
                let scale = self.scales.get(axis.scale_key());
                axis.build(AxisBuildContext {
                    theme: self.theme,
                    is_time_scale: scale.is_some_and(ScaleBuilder::is_time),
                    is_log_scale: scale
                        .is_some_and(|scale| scale.distribution() == Distribution::Logarithmic),
                    timezone: self.timezone,
                })
            })
            .collect();

        let context = SeriesBuildContext {
            theme: self.theme,
            color_map: self.color_map.as_ref(),
            path_builders: self.path_builders(),
        };
        let series = self
            .series
            .iter()
            .zip(self.resolve_visibility())
            .map(|(series, show)| series.build(context, show))
            .collect::<ChartResult<Vec<_>>>()?;

        Ok(PlotConfig {
            axes,
            scales,
            series,
            bands: self.bands.clone(),
            cursor: self.cursor.clone(),
            legend: self.legend,
            focus: self.focus,
            select: self.select,
            padding: self.padding,
            timezone: self.timezone,
            plugin_ids: self
                .plugins
                .iter()
                .map(|entry| entry.plugin.id().to_owned())
                .collect(),
            hooks: self.hooks.clone(),
            plot_context: self.plot_context.clone(),
        })
    }

    /// Legend rows keyed by 1-based series index.
    #[must_use]
    pub fn get_legend_items(&self) -> IndexMap<usize, LegendItem> {
        self.series
            .iter()
            .zip(self.resolve_visibility())
            .enumerate()
            .map(|(position, (series, show))| {
                let series_index = position + 1;
                let item = LegendItem {
                    series_index,
                    label: series_label(series, series_index),
                    color: series.resolve_color(self.theme, self.color_map.as_ref()),
                    show,
                };
                (series_index, item)
            })
            .collect()
    }
}

fn series_label(series: &SeriesBuilder, series_index: usize) -> String {
    series
        .label()
        .map_or_else(|| format!("Series {series_index}"), str::to_owned)
}

fn seconds_to_millis(seconds: f64) -> i64 {
    (seconds * 1000.0).round() as i64
}
