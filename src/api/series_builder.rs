use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{Color, palette_color_for_label};
use crate::error::{ChartError, ChartResult};

use super::{PathBuilderRegistry, PathKind, SharedPathBuilder, Theme};

pub const DEFAULT_LINE_WIDTH_PX: f64 = 2.0;
pub const DEFAULT_POINT_SIZE_PX: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DrawStyle {
    #[default]
    Line,
    Points,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LineInterpolation {
    #[default]
    Linear,
    Spline,
    StepBefore,
    StepAfter,
}

/// Point marker policy for line series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PointVisibility {
    /// Backend decides from point density.
    #[default]
    Auto,
    Always,
    Never,
}

/// Fully resolved series, as emitted in a plot config.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub scale_key: String,
    pub label: Option<String>,
    pub color: Color,
    pub draw_style: DrawStyle,
    pub interpolation: LineInterpolation,
    /// `None` leaves point visibility to density rules.
    pub show_points: Option<bool>,
    pub point_size: f64,
    pub line_width: f64,
    pub span_gaps: bool,
    pub show: bool,
    pub paths: SharedPathBuilder,
}

impl SeriesSpec {
    /// Whether point markers are drawn for `points_len` samples over
    /// `plot_width_px` pixels.
    #[must_use]
    pub fn points_visible(&self, points_len: usize, plot_width_px: f64) -> bool {
        match self.show_points {
            Some(show) => show,
            None => {
                let spacing = plot_width_px / points_len.max(1) as f64;
                spacing >= self.point_size * 2.0
            }
        }
    }
}

/// Declared series properties.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesProps {
    pub scale_key: String,
    pub label: Option<String>,
    pub color: Option<Color>,
    pub draw_style: DrawStyle,
    pub interpolation: LineInterpolation,
    pub point_visibility: PointVisibility,
    /// Explicit per-series override; wins over every other point rule.
    pub show_points: Option<bool>,
    pub point_size: Option<f64>,
    pub line_width: Option<f64>,
    pub span_gaps: bool,
    pub show: bool,
}

impl SeriesProps {
    #[must_use]
    pub fn new(scale_key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            scale_key: scale_key.into(),
            label: Some(label.into()),
            show: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn unlabeled(scale_key: impl Into<String>) -> Self {
        Self {
            scale_key: scale_key.into(),
            show: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn with_draw_style(mut self, draw_style: DrawStyle) -> Self {
        self.draw_style = draw_style;
        self
    }

    #[must_use]
    pub fn with_interpolation(mut self, interpolation: LineInterpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    #[must_use]
    pub fn with_point_visibility(mut self, point_visibility: PointVisibility) -> Self {
        self.point_visibility = point_visibility;
        self
    }

    #[must_use]
    pub fn with_show_points(mut self, show_points: bool) -> Self {
        self.show_points = Some(show_points);
        self
    }

    #[must_use]
    pub fn with_span_gaps(mut self, span_gaps: bool) -> Self {
        self.span_gaps = span_gaps;
        self
    }

    #[must_use]
    pub fn with_show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SeriesBuildContext<'a> {
    pub theme: Theme,
    pub color_map: Option<&'a IndexMap<String, Color>>,
    pub path_builders: &'a PathBuilderRegistry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesBuilder {
    props: SeriesProps,
}

impl SeriesBuilder {
    #[must_use]
    pub fn new(props: SeriesProps) -> Self {
        Self { props }
    }

    #[must_use]
    pub fn props(&self) -> &SeriesProps {
        &self.props
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.props.label.as_deref()
    }

    #[must_use]
    pub fn declared_show(&self) -> bool {
        self.props.show
    }

    /// Explicit color, then the label color map, then the hashed palette
    /// slot, then the theme default for unlabeled series.
    #[must_use]
    pub fn resolve_color(&self, theme: Theme, color_map: Option<&IndexMap<String, Color>>) -> Color {
        if let Some(color) = self.props.color {
            return color;
        }
        let Some(label) = self.props.label.as_deref() else {
            return theme.default_series_color();
        };
        color_map
            .and_then(|map| map.get(label).copied())
            .unwrap_or_else(|| palette_color_for_label(label))
    }

    #[must_use]
    pub fn resolve_show_points(&self) -> Option<bool> {
        if let Some(show) = self.props.show_points {
            return Some(show);
        }
        if self.props.draw_style == DrawStyle::Points {
            return Some(true);
        }
        match self.props.point_visibility {
            PointVisibility::Always => Some(true),
            PointVisibility::Never => Some(false),
            PointVisibility::Auto => None,
        }
    }

    pub fn resolve_paths(&self, registry: &PathBuilderRegistry) -> ChartResult<SharedPathBuilder> {
        let kind = PathKind::resolve(self.props.draw_style, self.props.interpolation);
        registry.get(kind).ok_or(ChartError::MissingPathBuilder {
            draw_style: self.props.draw_style,
            interpolation: self.props.interpolation,
        })
    }

    /// Builds the series; `show` is the already-resolved visibility.
    pub fn build(&self, context: SeriesBuildContext<'_>, show: bool) -> ChartResult<SeriesSpec> {
        let props = &self.props;
        Ok(SeriesSpec {
            scale_key: props.scale_key.clone(),
            label: props.label.clone(),
            color: self.resolve_color(context.theme, context.color_map),
            draw_style: props.draw_style,
            interpolation: props.interpolation,
            show_points: self.resolve_show_points(),
            point_size: props.point_size.unwrap_or(DEFAULT_POINT_SIZE_PX),
            line_width: props.line_width.unwrap_or(DEFAULT_LINE_WIDTH_PX),
            span_gaps: props.span_gaps,
            show,
            paths: self.resolve_paths(context.path_builders)?,
        })
    }
}
