use dashplot::core::{
    Distribution, RangePadding, RangeResolver, ScaleLimits, SnapDirection, snap_to_log_base,
};
use proptest::prelude::*;

fn limit() -> impl Strategy<Value = Option<f64>> {
    proptest::option::of(prop_oneof![Just(0.0), -1_000_000.0f64..1_000_000.0])
}

fn distribution() -> impl Strategy<Value = Distribution> {
    prop_oneof![Just(Distribution::Linear), Just(Distribution::Logarithmic)]
}

proptest! {
    #[test]
    fn linear_range_encloses_data_property(
        data_min in -1_000_000.0f64..1_000_000.0,
        data_span in 0.001f64..1_000_000.0,
        soft_max_offset in proptest::option::of(-1_000.0f64..1_000.0)
    ) {
        let data_max = data_min + data_span;
        let resolver = RangeResolver::new(
            Distribution::Linear,
            10.0,
            ScaleLimits {
                soft_max: soft_max_offset.map(|offset| data_max + offset),
                ..ScaleLimits::default()
            },
            RangePadding::default(),
            &[],
        );

        let (min, max) = resolver
            .resolve(Some(data_min), Some(data_max))
            .expect("range");

        prop_assert!(min < max);
        prop_assert!(min <= data_min);
        prop_assert!(max >= data_max);
    }

    #[test]
    fn log_snapping_is_idempotent_property(value in 1e-6f64..1e9) {
        let floor = snap_to_log_base(value, 10.0, SnapDirection::Floor);
        let ceil = snap_to_log_base(value, 10.0, SnapDirection::Ceil);

        prop_assert!(floor > 0.0);
        prop_assert!(floor <= ceil);
        prop_assert_eq!(snap_to_log_base(floor, 10.0, SnapDirection::Floor), floor);
        prop_assert_eq!(snap_to_log_base(ceil, 10.0, SnapDirection::Ceil), ceil);
    }

    #[test]
    fn log_range_is_ordered_property(
        data_min in 1e-3f64..1e6,
        factor in 1.0f64..1e3
    ) {
        let resolver = RangeResolver::new(
            Distribution::Logarithmic,
            10.0,
            ScaleLimits::default(),
            RangePadding::default(),
            &[],
        );

        let (min, max) = resolver
            .resolve(Some(data_min), Some(data_min * factor))
            .expect("range");

        prop_assert!(min > 0.0);
        prop_assert!(min < max);
    }

    #[test]
    fn resolved_range_is_never_degenerate_property(
        distribution in distribution(),
        log_base in prop_oneof![Just(2.0), Just(10.0)],
        min in limit(),
        max in limit(),
        soft_min in limit(),
        soft_max in limit(),
        data_min in limit(),
        data_max in limit(),
        thresholds in proptest::collection::vec(-1_000_000.0f64..1_000_000.0, 0..4),
        padding_min in 0.0f64..0.5,
        padding_max in 0.0f64..0.5
    ) {
        let limits = ScaleLimits { min, max, soft_min, soft_max };
        let resolver = RangeResolver::new(
            distribution,
            log_base,
            limits,
            RangePadding::new(padding_min, padding_max),
            &thresholds,
        );

        let resolved = resolver.resolve(data_min, data_max);
        if data_min.is_some() || data_max.is_some() || resolver.has_fixed_range() {
            prop_assert!(resolved.is_some());
        }
        if let Some((lo, hi)) = resolved {
            prop_assert!(lo.is_finite());
            prop_assert!(hi.is_finite());
            prop_assert!(lo < hi);
        }
    }
}
