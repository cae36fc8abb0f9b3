use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Integer pixel dimensions of a mounted plot surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Floors fractional host dimensions into whole pixels.
    ///
    /// Negative and non-finite inputs collapse to zero.
    #[must_use]
    pub fn floored(width: f64, height: f64) -> Self {
        Self {
            width: floor_dimension(width),
            height: floor_dimension(height),
        }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

fn floor_dimension(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let floored = value.floor();
    if floored >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        floored as u32
    }
}

/// Page-space rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.top + self.height
    }

    /// Returns `true` when any part of `self` overlaps the window `[0, w] x [0, h]`.
    #[must_use]
    pub fn intersects_window(self, window_width: f64, window_height: f64) -> bool {
        self.right() > 0.0
            && self.bottom() > 0.0
            && self.left < window_width
            && self.top < window_height
    }
}

/// Columnar series data sharing one X column.
///
/// `x` holds the shared X values in ascending order; each entry of `series`
/// is positionally aligned to `x`, with gaps stored as `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlignedData {
    pub x: Vec<f64>,
    pub series: Vec<Vec<Option<f64>>>,
}

impl AlignedData {
    #[must_use]
    pub fn new(x: Vec<f64>, series: Vec<Vec<Option<f64>>>) -> Self {
        Self { x, series }
    }

    /// Builds aligned data from raw columns where the first column is X.
    ///
    /// Non-finite Y values become gaps. Non-finite X values are rejected since
    /// they cannot be positioned.
    pub fn from_columns(columns: Vec<Vec<f64>>) -> ChartResult<Self> {
        let mut columns = columns.into_iter();
        let x = columns.next().unwrap_or_default();
        if x.iter().any(|value| !value.is_finite()) {
            return Err(ChartError::InvalidData(
                "x column values must be finite".to_owned(),
            ));
        }
        let series = columns
            .map(|column| column.into_iter().map(normalize_value).collect())
            .collect();
        Ok(Self { x, series })
    }

    /// Structurally empty: the shared X column has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Returns the Y column for 1-based `series_index`.
    #[must_use]
    pub fn column(&self, series_index: usize) -> Option<&[Option<f64>]> {
        series_index
            .checked_sub(1)
            .and_then(|index| self.series.get(index))
            .map(Vec::as_slice)
    }

    #[must_use]
    pub fn x_bounds(&self) -> Option<(f64, f64)> {
        Some((*self.x.first()?, *self.x.last()?))
    }

    /// Min/max over the given 1-based series, ignoring gaps.
    #[must_use]
    pub fn value_bounds<I>(&self, series_indexes: I) -> Option<(f64, f64)>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut bounds: Option<(f64, f64)> = None;
        for index in series_indexes {
            let Some(column) = self.column(index) else {
                continue;
            };
            for value in column.iter().flatten() {
                bounds = Some(match bounds {
                    Some((min, max)) => (min.min(*value), max.max(*value)),
                    None => (*value, *value),
                });
            }
        }
        bounds
    }
}

/// Normalizes a raw sample: non-finite values become gaps.
#[must_use]
pub fn normalize_value(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
