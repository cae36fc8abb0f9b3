//! Persisted per-series visibility and the rule that resolves it against
//! each series' declared `show` flag.

use std::cell::RefCell;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ChartError, ChartResult};

/// Keyed string storage for visibility state (browser local storage in a
/// web host).
pub trait VisibilityStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> ChartResult<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryVisibilityStore {
    entries: RefCell<IndexMap<String, String>>,
}

impl InMemoryVisibilityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl VisibilityStore for InMemoryVisibilityStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> ChartResult<()> {
        self.entries
            .try_borrow_mut()
            .map_err(|_| ChartError::Storage(format!("store busy while writing `{key}`")))?
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesVisibilityEntry {
    pub label: String,
    pub show: bool,
}

/// Visibility array aligned with `[x placeholder, series 1, series 2, ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredVisibility {
    pub entries: Vec<SeriesVisibilityEntry>,
}

impl StoredVisibility {
    #[must_use]
    pub fn new(entries: Vec<SeriesVisibilityEntry>) -> Self {
        Self { entries }
    }

    /// Builds the stored form from series labels and their current
    /// visibility; the X placeholder is prepended.
    #[must_use]
    pub fn from_series<'a, I>(x_label: &str, series: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let mut entries = vec![SeriesVisibilityEntry {
            label: x_label.to_owned(),
            show: true,
        }];
        entries.extend(series.into_iter().map(|(label, show)| SeriesVisibilityEntry {
            label: label.to_owned(),
            show,
        }));
        Self { entries }
    }

    #[must_use]
    pub fn has_hidden(&self) -> bool {
        self.entries.iter().any(|entry| !entry.show)
    }

    /// Stored flag for the 1-based `series_index`.
    #[must_use]
    pub fn show_for(&self, series_index: usize) -> Option<bool> {
        self.entries.get(series_index).map(|entry| entry.show)
    }

    pub fn to_json(&self) -> ChartResult<String> {
        serde_json::to_string(self)
            .map_err(|e| ChartError::Storage(format!("failed to serialize visibility: {e}")))
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::Storage(format!("failed to parse visibility: {e}")))
    }
}

/// Reads the stored visibility for `widget_id`; corrupt payloads count as
/// absent.
pub fn load_visibility(store: &dyn VisibilityStore, widget_id: &str) -> Option<StoredVisibility> {
    let raw = store.get(widget_id)?;
    match StoredVisibility::from_json_str(&raw) {
        Ok(stored) => Some(stored),
        Err(err) => {
            warn!(widget_id, error = %err, "ignoring corrupt persisted visibility");
            None
        }
    }
}

pub fn save_visibility(
    store: &dyn VisibilityStore,
    widget_id: &str,
    visibility: &StoredVisibility,
) -> ChartResult<()> {
    store.set(widget_id, &visibility.to_json()?)
}

/// Effective visibility for each series, given declared flags in series
/// order.
///
/// When any stored entry is hidden the stored array is authoritative and a
/// series without a stored entry is hidden. Otherwise declared flags win.
#[must_use]
pub fn resolve_series_visibility(declared: &[bool], stored: Option<&StoredVisibility>) -> Vec<bool> {
    match stored {
        Some(stored) if stored.has_hidden() => (1..=declared.len())
            .map(|series_index| stored.show_for(series_index).unwrap_or(false))
            .collect(),
        _ => declared.to_vec(),
    }
}
