//! Viewport-safe tooltip placement.
//!
//! Each axis flips independently to the far side of the cursor when the
//! tooltip would overflow the window. A flipped axis stays flipped until the
//! unflipped placement fits with one extra gap of slack, so a cursor resting
//! near the boundary does not make the tooltip jump back and forth.

use serde::{Deserialize, Serialize};

use crate::core::Viewport;

pub const DEFAULT_PLACEMENT_GAP_PX: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlacementState {
    pub flipped_x: bool,
    pub flipped_y: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TooltipPlacement {
    pub left: f64,
    pub top: f64,
}

/// Places a `width` x `height` tooltip next to a cursor at page coordinates
/// `(cursor_x, cursor_y)` and updates the sticky flip state.
pub fn place_tooltip(
    state: &mut PlacementState,
    cursor_x: f64,
    cursor_y: f64,
    size: (f64, f64),
    window: Viewport,
    gap_px: f64,
) -> TooltipPlacement {
    let (width, height) = size;
    let (left, flipped_x) = place_axis(
        cursor_x,
        width,
        f64::from(window.width),
        gap_px,
        state.flipped_x,
    );
    let (top, flipped_y) = place_axis(
        cursor_y,
        height,
        f64::from(window.height),
        gap_px,
        state.flipped_y,
    );
    state.flipped_x = flipped_x;
    state.flipped_y = flipped_y;
    TooltipPlacement { left, top }
}

fn place_axis(cursor: f64, extent: f64, limit: f64, gap: f64, flipped: bool) -> (f64, bool) {
    let forward = cursor + gap;
    let backward = cursor - gap - extent;
    let fits_forward = forward + extent <= limit;
    let fits_forward_with_slack = forward + extent + gap <= limit;

    let wants_flip = if flipped {
        !fits_forward_with_slack
    } else {
        !fits_forward
    };
    // Neither side fits: take the side with more room.
    let flipped = wants_flip && (backward >= 0.0 || cursor - gap > limit - forward);

    let position = if flipped { backward } else { forward };
    let max_position = (limit - extent).max(0.0);
    (position.clamp(0.0, max_position), flipped)
}

#[cfg(test)]
mod tests {
    use super::{PlacementState, place_tooltip};
    use crate::core::Viewport;

    const WINDOW: Viewport = Viewport {
        width: 1000,
        height: 800,
    };

    #[test]
    fn flips_near_right_edge_and_sticks_until_slack_fits() {
        let mut state = PlacementState::default();
        let placement = place_tooltip(&mut state, 900.0, 100.0, (200.0, 50.0), WINDOW, 10.0);
        assert!(state.flipped_x);
        assert_eq!(placement.left, 690.0);

        // Fits without flipping, but not with the extra gap of slack.
        place_tooltip(&mut state, 785.0, 100.0, (200.0, 50.0), WINDOW, 10.0);
        assert!(state.flipped_x);

        let placement = place_tooltip(&mut state, 700.0, 100.0, (200.0, 50.0), WINDOW, 10.0);
        assert!(!state.flipped_x);
        assert_eq!(placement.left, 710.0);
    }
}
