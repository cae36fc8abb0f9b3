use thiserror::Error;

use crate::api::{DrawStyle, LineInterpolation};

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("no path builder registered for draw style {draw_style:?} with {interpolation:?}")]
    MissingPathBuilder {
        draw_style: DrawStyle,
        interpolation: LineInterpolation,
    },

    #[error("visibility storage failure: {0}")]
    Storage(String),
}
