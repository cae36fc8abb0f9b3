pub mod clock;
pub mod color;
pub mod scale_range;
pub mod types;
pub mod units;

pub use clock::{Clock, FixedClock, SystemClock};
pub use color::{Color, SERIES_PALETTE, label_hash, palette_color_for_label};
pub use scale_range::{
    DEFAULT_LOG_BASE, Distribution, RangePadding, RangeResolver, ScaleLimits, SnapDirection, expand_soft_limits,
    log_range, normalize_soft_limits, resolve_time_range, snap_to_log_base,
};
pub use types::{AlignedData, Rect, Viewport, normalize_value};
pub use units::{UnitFamily, convert_value, format_with_unit, unit_family};
