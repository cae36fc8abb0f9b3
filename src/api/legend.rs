use indexmap::IndexMap;
use tracing::debug;

use crate::core::Color;
use crate::error::ChartResult;
use crate::interaction::RenderSchedule;

use super::{ConfigBuilder, LegendItem, PlotContext};

/// Host clipboard.
pub trait Clipboard {
    fn write_text(&self, text: &str) -> ChartResult<()>;
}

/// One rendered legend row.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub series_index: usize,
    pub label: String,
    pub color: Color,
    pub show: bool,
    pub focused: bool,
}

/// Filterable legend with hover focus, toggle, isolate and copy.
///
/// Visibility changes go straight to the live render instance through the
/// chart's `PlotContext` and are persisted through the builder's visibility
/// store, so the next `get_config` resolves the same state.
pub struct LegendView {
    items: IndexMap<usize, LegendItem>,
    filter: String,
    focused: Option<usize>,
    requested_focus: Option<usize>,
    focus_schedule: RenderSchedule,
    plot_context: PlotContext,
}

impl LegendView {
    #[must_use]
    pub fn new(builder: &ConfigBuilder) -> Self {
        Self {
            items: builder.get_legend_items(),
            filter: String::new(),
            focused: None,
            requested_focus: None,
            focus_schedule: RenderSchedule::new(),
            plot_context: builder.plot_context(),
        }
    }

    /// Re-reads legend items after the builder emitted a new config.
    pub fn refresh(&mut self, builder: &ConfigBuilder) {
        self.items = builder.get_legend_items();
        self.plot_context = builder.plot_context();
    }

    pub fn set_filter(&mut self, query: impl Into<String>) {
        self.filter = query.into();
    }

    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Rows matching the filter, case-insensitively.
    #[must_use]
    pub fn entries(&self) -> Vec<LegendEntry> {
        let needle = self.filter.trim().to_lowercase();
        self.items
            .values()
            .filter(|item| needle.is_empty() || item.label.to_lowercase().contains(&needle))
            .map(|item| LegendEntry {
                series_index: item.series_index,
                label: item.label.clone(),
                color: item.color,
                show: item.show,
                focused: self.focused == Some(item.series_index),
            })
            .collect()
    }

    #[must_use]
    pub fn visibility(&self) -> Vec<bool> {
        self.items.values().map(|item| item.show).collect()
    }

    #[must_use]
    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Requests focus on `series_index` for the next frame.
    pub fn hover(&mut self, series_index: usize) {
        if !self.items.contains_key(&series_index) {
            return;
        }
        self.requested_focus = Some(series_index);
        self.focus_schedule.schedule_next_frame();
    }

    /// Cancels a pending hover and clears any applied focus.
    pub fn leave(&mut self) {
        self.focus_schedule.cancel();
        self.requested_focus = None;
        if self.focused.take().is_some() {
            self.plot_context
                .with_instance(|instance| instance.set_focus(None));
        }
    }

    /// Applies pending focus. Returns `true` when focus changed.
    pub fn tick(&mut self, now_ms: i64) -> bool {
        if !self.focus_schedule.take_due(now_ms) {
            return false;
        }
        let focus = self.requested_focus.take();
        if focus == self.focused {
            return false;
        }
        self.focused = focus;
        self.plot_context
            .with_instance(|instance| instance.set_focus(focus));
        true
    }

    /// Marker click: flips one series.
    pub fn toggle(&mut self, builder: &ConfigBuilder, series_index: usize) -> ChartResult<bool> {
        let Some(show) = self.items.get(&series_index).map(|item| !item.show) else {
            return Ok(false);
        };
        let next = self.next_visibility(|item| {
            if item.series_index == series_index {
                show
            } else {
                item.show
            }
        });
        self.apply(builder, &next)?;
        Ok(show)
    }

    /// Label click: shows only `series_index`, or restores every series when
    /// it already is the only visible one.
    pub fn isolate(&mut self, builder: &ConfigBuilder, series_index: usize) -> ChartResult<()> {
        if !self.items.contains_key(&series_index) {
            return Ok(());
        }
        let only_clicked_visible = self
            .items
            .values()
            .all(|item| item.show == (item.series_index == series_index));
        let next = if only_clicked_visible {
            debug!(series_index, "restoring all series");
            self.next_visibility(|_| true)
        } else {
            debug!(series_index, "isolating series");
            self.next_visibility(|item| item.series_index == series_index)
        };
        self.apply(builder, &next)
    }

    pub fn copy_label(&self, series_index: usize, clipboard: &dyn Clipboard) -> ChartResult<bool> {
        let Some(item) = self.items.get(&series_index) else {
            return Ok(false);
        };
        clipboard.write_text(&item.label)?;
        Ok(true)
    }

    fn next_visibility(&self, show: impl Fn(&LegendItem) -> bool) -> Vec<(usize, bool)> {
        self.items
            .values()
            .map(|item| (item.series_index, show(item)))
            .collect()
    }

    /// Persists first; a failed write leaves the legend and instance as they were.
    fn apply(&mut self, builder: &ConfigBuilder, next: &[(usize, bool)]) -> ChartResult<()> {
        let visibility: Vec<bool> = next.iter().map(|&(_, show)| show).collect();
        builder.persist_visibility(&visibility)?;
        for &(series_index, show) in next {
            let Some(item) = self.items.get_mut(&series_index) else {
                continue;
            };
            if item.show != show {
                item.show = show;
                self.plot_context
                    .with_instance(|instance| instance.set_series(series_index, show));
            }
        }
        Ok(())
    }
}
