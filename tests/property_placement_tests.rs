use dashplot::core::Viewport;
use dashplot::interaction::{PlacementState, place_tooltip};
use proptest::prelude::*;

proptest! {
    #[test]
    fn placement_stays_inside_window_property(
        cursor_x in -200.0f64..2_200.0,
        cursor_y in -200.0f64..1_300.0,
        width in 1.0f64..600.0,
        height in 1.0f64..400.0,
        flipped_x in any::<bool>(),
        flipped_y in any::<bool>()
    ) {
        let window = Viewport::new(1920, 1080);
        let mut state = PlacementState { flipped_x, flipped_y };
        let placement = place_tooltip(&mut state, cursor_x, cursor_y, (width, height), window, 10.0);

        prop_assert!(placement.left >= 0.0);
        prop_assert!(placement.top >= 0.0);
        prop_assert!(placement.left + width <= 1920.0 + 1e-9);
        prop_assert!(placement.top + height <= 1080.0 + 1e-9);
    }

    #[test]
    fn repeated_placement_is_stable_property(
        cursor_x in 0.0f64..1_920.0,
        cursor_y in 0.0f64..1_080.0,
        width in 1.0f64..600.0,
        height in 1.0f64..400.0
    ) {
        let window = Viewport::new(1920, 1080);
        let mut state = PlacementState::default();
        let first = place_tooltip(&mut state, cursor_x, cursor_y, (width, height), window, 10.0);
        let settled = state;
        let second = place_tooltip(&mut state, cursor_x, cursor_y, (width, height), window, 10.0);

        prop_assert_eq!(first, second);
        prop_assert_eq!(settled, state);
    }
}
