//! Path builders turning projected series points into drawable geometry.
//!
//! Builders are stateless and shared: the default registry is built once per
//! process and every series holding the same draw style and interpolation
//! reuses the same `Arc`.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use super::{DrawStyle, LineInterpolation};

pub const DEFAULT_POINT_RADIUS_PX: f64 = 2.5;
pub const DEFAULT_BAR_WIDTH_FACTOR: f64 = 0.6;

/// One drawing command in plot-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathSegment {
    MoveTo {
        x: f64,
        y: f64,
    },
    LineTo {
        x: f64,
        y: f64,
    },
    CurveTo {
        cx1: f64,
        cy1: f64,
        cx2: f64,
        cy2: f64,
        x: f64,
        y: f64,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
    },
}

/// Projected samples of one series.
#[derive(Debug, Clone, Copy)]
pub struct PathInput<'a> {
    pub xs: &'a [f64],
    pub ys: &'a [Option<f64>],
    pub span_gaps: bool,
    /// Pixel Y of the value-axis zero line, used by bars.
    pub baseline_y: f64,
}

pub trait PathBuilder: Send + Sync {
    fn kind(&self) -> PathKind;
    fn build(&self, input: &PathInput<'_>) -> Vec<PathSegment>;
}

/// Rendering strategy resolved from draw style and interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathKind {
    Linear,
    Spline,
    StepBefore,
    StepAfter,
    Points,
    Bars,
}

impl PathKind {
    #[must_use]
    pub fn resolve(draw_style: DrawStyle, interpolation: LineInterpolation) -> Self {
        match (draw_style, interpolation) {
            (DrawStyle::Points, _) => Self::Points,
            (DrawStyle::Bar, _) => Self::Bars,
            (DrawStyle::Line, LineInterpolation::Linear) => Self::Linear,
            (DrawStyle::Line, LineInterpolation::Spline) => Self::Spline,
            (DrawStyle::Line, LineInterpolation::StepBefore) => Self::StepBefore,
            (DrawStyle::Line, LineInterpolation::StepAfter) => Self::StepAfter,
        }
    }
}

/// Path builder handle stored on a series; equal when it is the same builder.
#[derive(Clone)]
pub struct SharedPathBuilder(Arc<dyn PathBuilder>);

impl SharedPathBuilder {
    #[must_use]
    pub fn new(builder: Arc<dyn PathBuilder>) -> Self {
        Self(builder)
    }

    #[must_use]
    pub fn kind(&self) -> PathKind {
        self.0.kind()
    }

    #[must_use]
    pub fn build(&self, input: &PathInput<'_>) -> Vec<PathSegment> {
        self.0.build(input)
    }
}

impl PartialEq for SharedPathBuilder {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SharedPathBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedPathBuilder").field(&self.kind()).finish()
    }
}

/// Lookup table from `PathKind` to builder.
#[derive(Clone, Default)]
pub struct PathBuilderRegistry {
    entries: Vec<(PathKind, Arc<dyn PathBuilder>)>,
}

impl PathBuilderRegistry {
    /// Registry covering every draw style and interpolation.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(LinearPath));
        registry.register(Arc::new(SplinePath));
        registry.register(Arc::new(SteppedPath {
            kind: PathKind::StepBefore,
        }));
        registry.register(Arc::new(SteppedPath {
            kind: PathKind::StepAfter,
        }));
        registry.register(Arc::new(PointsPath {
            radius: DEFAULT_POINT_RADIUS_PX,
        }));
        registry.register(Arc::new(BarsPath {
            width_factor: DEFAULT_BAR_WIDTH_FACTOR,
        }));
        registry
    }

    /// Registers `builder`, replacing any builder of the same kind.
    pub fn register(&mut self, builder: Arc<dyn PathBuilder>) {
        let kind = builder.kind();
        self.entries.retain(|(existing, _)| *existing != kind);
        self.entries.push((kind, builder));
    }

    #[must_use]
    pub fn get(&self, kind: PathKind) -> Option<SharedPathBuilder> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == kind)
            .map(|(_, builder)| SharedPathBuilder::new(Arc::clone(builder)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for PathBuilderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(kind, _)| kind))
            .finish()
    }
}

/// Process-wide default registry, constructed on first use.
pub fn default_path_builders() -> &'static PathBuilderRegistry {
    static REGISTRY: OnceLock<PathBuilderRegistry> = OnceLock::new();
    REGISTRY.get_or_init(PathBuilderRegistry::with_defaults)
}

/// Splits samples into drawable runs; gaps break runs unless `span_gaps`.
fn runs(input: &PathInput<'_>) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (x, y) in input.xs.iter().zip(input.ys.iter()) {
        match y {
            Some(y) if x.is_finite() && y.is_finite() => current.push((*x, *y)),
            _ if input.span_gaps => {}
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

struct LinearPath;

impl PathBuilder for LinearPath {
    fn kind(&self) -> PathKind {
        PathKind::Linear
    }

    fn build(&self, input: &PathInput<'_>) -> Vec<PathSegment> {
        let mut segments = Vec::with_capacity(input.xs.len());
        for run in runs(input) {
            for (index, (x, y)) in run.into_iter().enumerate() {
                segments.push(if index == 0 {
                    PathSegment::MoveTo { x, y }
                } else {
                    PathSegment::LineTo { x, y }
                });
            }
        }
        segments
    }
}

/// Catmull-Rom spline emitted as cubic Bezier segments.
struct SplinePath;

impl PathBuilder for SplinePath {
    fn kind(&self) -> PathKind {
        PathKind::Spline
    }

    fn build(&self, input: &PathInput<'_>) -> Vec<PathSegment> {
        let mut segments = Vec::with_capacity(input.xs.len());
        for run in runs(input) {
            let (x0, y0) = run[0];
            segments.push(PathSegment::MoveTo { x: x0, y: y0 });
            let last = run.len() - 1;
            for index in 0..last {
                let previous = run[index.saturating_sub(1)];
                let start = run[index];
                let end = run[index + 1];
                let next = run[(index + 2).min(last)];
                segments.push(PathSegment::CurveTo {
                    cx1: start.0 + (end.0 - previous.0) / 6.0,
                    cy1: start.1 + (end.1 - previous.1) / 6.0,
                    cx2: end.0 - (next.0 - start.0) / 6.0,
                    cy2: end.1 - (next.1 - start.1) / 6.0,
                    x: end.0,
                    y: end.1,
                });
            }
        }
        segments
    }
}

struct SteppedPath {
    kind: PathKind,
}

impl PathBuilder for SteppedPath {
    fn kind(&self) -> PathKind {
        self.kind
    }

    fn build(&self, input: &PathInput<'_>) -> Vec<PathSegment> {
        let mut segments = Vec::with_capacity(input.xs.len() * 2);
        for run in runs(input) {
            let (x0, y0) = run[0];
            segments.push(PathSegment::MoveTo { x: x0, y: y0 });
            for pair in run.windows(2) {
                let ((x1, y1), (x2, y2)) = (pair[0], pair[1]);
                let corner = if self.kind == PathKind::StepBefore {
                    PathSegment::LineTo { x: x1, y: y2 }
                } else {
                    PathSegment::LineTo { x: x2, y: y1 }
                };
                segments.push(corner);
                segments.push(PathSegment::LineTo { x: x2, y: y2 });
            }
        }
        segments
    }
}

struct PointsPath {
    radius: f64,
}

impl PathBuilder for PointsPath {
    fn kind(&self) -> PathKind {
        PathKind::Points
    }

    fn build(&self, input: &PathInput<'_>) -> Vec<PathSegment> {
        input
            .xs
            .iter()
            .zip(input.ys.iter())
            .filter_map(|(x, y)| y.map(|y| (*x, y)))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(x, y)| PathSegment::Circle {
                x,
                y,
                radius: self.radius,
            })
            .collect()
    }
}

struct BarsPath {
    width_factor: f64,
}

impl PathBuilder for BarsPath {
    fn kind(&self) -> PathKind {
        PathKind::Bars
    }

    fn build(&self, input: &PathInput<'_>) -> Vec<PathSegment> {
        let min_gap = input
            .xs
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).abs())
            .filter(|gap| gap.is_finite() && *gap > 0.0)
            .fold(f64::INFINITY, f64::min);
        let width = if min_gap.is_finite() {
            (min_gap * self.width_factor).max(1.0)
        } else {
            DEFAULT_POINT_RADIUS_PX * 4.0
        };

        input
            .xs
            .iter()
            .zip(input.ys.iter())
            .filter_map(|(x, y)| y.map(|y| (*x, y)))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(x, y)| PathSegment::Rect {
                x: x - width / 2.0,
                y: y.min(input.baseline_y),
                width,
                height: (input.baseline_y - y).abs(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{PathInput, PathKind, PathSegment, default_path_builders};

    fn input<'a>(xs: &'a [f64], ys: &'a [Option<f64>], span_gaps: bool) -> PathInput<'a> {
        PathInput {
            xs,
            ys,
            span_gaps,
            baseline_y: 100.0,
        }
    }

    #[test]
    fn gaps_split_linear_runs_unless_spanned() {
        let xs = [0.0, 10.0, 20.0, 30.0];
        let ys = [Some(1.0), None, Some(3.0), Some(4.0)];
        let linear = default_path_builders()
            .get(PathKind::Linear)
            .expect("linear builder");

        let split = linear.build(&input(&xs, &ys, false));
        let moves = split
            .iter()
            .filter(|segment| matches!(segment, PathSegment::MoveTo { .. }))
            .count();
        assert_eq!(moves, 2);

        let spanned = linear.build(&input(&xs, &ys, true));
        let moves = spanned
            .iter()
            .filter(|segment| matches!(segment, PathSegment::MoveTo { .. }))
            .count();
        assert_eq!(moves, 1);
    }

    #[test]
    fn step_after_holds_value_until_next_x() {
        let xs = [0.0, 10.0];
        let ys = [Some(5.0), Some(8.0)];
        let stepped = default_path_builders()
            .get(PathKind::StepAfter)
            .expect("step builder");
        let segments = stepped.build(&input(&xs, &ys, false));
        assert_eq!(segments[1], PathSegment::LineTo { x: 10.0, y: 5.0 });
        assert_eq!(segments[2], PathSegment::LineTo { x: 10.0, y: 8.0 });
    }

    #[test]
    fn default_registry_is_shared() {
        let first = default_path_builders().get(PathKind::Bars).expect("bars");
        let second = default_path_builders().get(PathKind::Bars).expect("bars");
        assert_eq!(first, second);
    }
}
