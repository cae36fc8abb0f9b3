use serde::{Deserialize, Serialize};

use crate::core::Color;

/// Dashboard color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    #[must_use]
    pub fn grid_stroke(self) -> Color {
        match self {
            Self::Dark => Color::rgba(0.92, 0.93, 0.95, 0.07),
            Self::Light => Color::rgba(0.07, 0.09, 0.12, 0.07),
        }
    }

    #[must_use]
    pub fn tick_stroke(self) -> Color {
        match self {
            Self::Dark => Color::rgba(0.92, 0.93, 0.95, 0.12),
            Self::Light => Color::rgba(0.07, 0.09, 0.12, 0.12),
        }
    }

    #[must_use]
    pub fn label_color(self) -> Color {
        match self {
            Self::Dark => Color::rgb8(0xc0, 0xc1, 0xc3),
            Self::Light => Color::rgb8(0x38, 0x3d, 0x47),
        }
    }

    /// Series color used when a series has no label to hash.
    #[must_use]
    pub fn default_series_color(self) -> Color {
        match self {
            Self::Dark => Color::rgb8(0xe8, 0xea, 0xed),
            Self::Light => Color::rgb8(0x1d, 0x21, 0x2d),
        }
    }
}
