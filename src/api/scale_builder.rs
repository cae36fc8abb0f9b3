use serde::{Deserialize, Serialize};

use crate::core::{
    DEFAULT_LOG_BASE, Distribution, RangePadding, RangeResolver, ScaleLimits,
    resolve_time_range,
};

/// How the backend obtains the range of one scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScaleRangeMode {
    /// Backend autoscale from data.
    Auto,
    /// Explicit range function evaluated per draw.
    Resolver(RangeResolver),
    /// Time window in unix seconds; unset bounds resolve against "now" at
    /// draw time.
    Time { min: Option<f64>, max: Option<f64> },
}

/// Fully resolved scale, as emitted in a plot config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleSpec {
    pub scale_key: String,
    pub time: bool,
    pub auto: bool,
    pub distribution: Distribution,
    pub log_base: f64,
    pub range: ScaleRangeMode,
}

impl ScaleSpec {
    /// Range for the given data bounds, `None` when the backend should keep
    /// its own autoscaled range.
    #[must_use]
    pub fn range_for(
        &self,
        data_min: Option<f64>,
        data_max: Option<f64>,
        now_seconds: f64,
    ) -> Option<(f64, f64)> {
        match self.range {
            ScaleRangeMode::Auto => None,
            ScaleRangeMode::Resolver(resolver) => resolver.resolve(data_min, data_max),
            ScaleRangeMode::Time { min, max } => Some(resolve_time_range(min, max, now_seconds)),
        }
    }

    #[must_use]
    pub fn is_log(&self) -> bool {
        self.distribution == Distribution::Logarithmic
    }
}

/// Declared scale properties; `None` fields keep their current value on merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleProps {
    pub scale_key: String,
    pub time: Option<bool>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub soft_min: Option<f64>,
    pub soft_max: Option<f64>,
    pub distribution: Option<Distribution>,
    pub log_base: Option<f64>,
    pub padding: Option<RangePadding>,
    /// Unit the scale displays values in; thresholds convert into it.
    pub display_unit: Option<String>,
}

impl ScaleProps {
    #[must_use]
    pub fn new(scale_key: impl Into<String>) -> Self {
        Self {
            scale_key: scale_key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_time(mut self, time: bool) -> Self {
        self.time = Some(time);
        self
    }

    #[must_use]
    pub fn with_hard_limits(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    #[must_use]
    pub fn with_soft_limits(mut self, soft_min: Option<f64>, soft_max: Option<f64>) -> Self {
        self.soft_min = soft_min;
        self.soft_max = soft_max;
        self
    }

    #[must_use]
    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = Some(distribution);
        self
    }

    #[must_use]
    pub fn with_log_base(mut self, log_base: f64) -> Self {
        self.log_base = Some(log_base);
        self
    }

    #[must_use]
    pub fn with_padding(mut self, padding: RangePadding) -> Self {
        self.padding = Some(padding);
        self
    }

    #[must_use]
    pub fn with_display_unit(mut self, unit: impl Into<String>) -> Self {
        self.display_unit = Some(unit.into());
        self
    }
}

/// Orchestrator-level facts a scale needs to pick its range mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBuildContext<'a> {
    pub any_time_axis: bool,
    pub has_series: bool,
    /// Threshold values already converted into the display unit.
    pub thresholds: &'a [f64],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBuilder {
    props: ScaleProps,
}

impl ScaleBuilder {
    #[must_use]
    pub fn new(props: ScaleProps) -> Self {
        Self { props }
    }

    #[must_use]
    pub fn scale_key(&self) -> &str {
        &self.props.scale_key
    }

    #[must_use]
    pub fn props(&self) -> &ScaleProps {
        &self.props
    }

    #[must_use]
    pub fn is_time(&self) -> bool {
        self.props.time.unwrap_or(false)
    }

    #[must_use]
    pub fn distribution(&self) -> Distribution {
        self.props.distribution.unwrap_or_default()
    }

    #[must_use]
    pub fn display_unit(&self) -> Option<&str> {
        self.props.display_unit.as_deref()
    }

    pub fn merge(&mut self, update: ScaleProps) {
        let props = &mut self.props;
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(if update.$field.is_some() {
                    props.$field = update.$field;
                })*
            };
        }
        overlay!(
            time,
            min,
            max,
            soft_min,
            soft_max,
            distribution,
            log_base,
            padding,
            display_unit,
        );
    }

    #[must_use]
    pub fn build(&self, context: ScaleBuildContext<'_>) -> ScaleSpec {
        let props = &self.props;
        let distribution = self.distribution();
        let log_base = props.log_base.unwrap_or(DEFAULT_LOG_BASE);

        if self.is_time() {
            return ScaleSpec {
                scale_key: props.scale_key.clone(),
                time: true,
                auto: false,
                distribution: Distribution::Linear,
                log_base,
                range: ScaleRangeMode::Time {
                    min: props.min,
                    max: props.max,
                },
            };
        }

        let resolver = RangeResolver::new(
            distribution,
            log_base,
            ScaleLimits {
                min: props.min,
                max: props.max,
                soft_min: props.soft_min,
                soft_max: props.soft_max,
            },
            props.padding.unwrap_or_default(),
            context.thresholds,
        );
        let auto = !resolver.has_fixed_range() && (!context.any_time_axis || !context.has_series);
        let range = if auto {
            ScaleRangeMode::Auto
        } else {
            ScaleRangeMode::Resolver(resolver)
        };

        ScaleSpec {
            scale_key: props.scale_key.clone(),
            time: false,
            auto,
            distribution,
            log_base: resolver.log_base(),
            range,
        }
    }
}
