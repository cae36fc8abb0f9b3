use dashplot::ChartError;
use dashplot::api::{CHART_OPTIONS_JSON_SCHEMA_V1, ChartOptions, Theme, TimeZoneOffset};
use dashplot::interaction::SyncMode;

#[test]
fn contract_v1_round_trips() {
    let mut options = ChartOptions {
        theme: Theme::Light,
        timezone: TimeZoneOffset::from_minutes(-300),
        focus_alpha: 0.45,
        ..ChartOptions::default()
    };
    options.tooltip = options.tooltip.with_sync(SyncMode::Tooltip, "dashboard-1");

    let json = options.to_json_contract_v1_pretty().expect("serialize");
    assert!(json.contains(&format!("\"schema_version\": {CHART_OPTIONS_JSON_SCHEMA_V1}")));

    let parsed = ChartOptions::from_json_compat_str(&json).expect("parse");
    assert_eq!(parsed, options);
}

#[test]
fn bare_partial_options_fill_defaults() {
    let parsed = ChartOptions::from_json_compat_str(r#"{ "focus_alpha": 0.5 }"#).expect("parse");
    assert_eq!(parsed.focus_alpha, 0.5);
    assert_eq!(parsed.theme, Theme::Dark);
    assert_eq!(parsed.tooltip.deactivate_debounce_ms, 100);
    assert!(parsed.tooltip.can_pin);
}

#[test]
fn unsupported_schema_version_is_rejected() {
    let err = ChartOptions::from_json_compat_str(r#"{ "schema_version": 2, "options": {} }"#)
        .expect_err("version 2");
    assert!(matches!(err, ChartError::InvalidData(message) if message.contains("schema version")));
}

#[test]
fn invalid_values_are_rejected() {
    let err = ChartOptions::from_json_compat_str(r#"{ "focus_alpha": 2.0 }"#)
        .expect_err("alpha out of range");
    assert!(matches!(err, ChartError::InvalidData(_)));

    let err = ChartOptions::from_json_compat_str(
        r#"{ "tooltip": { "deactivate_debounce_ms": -5 } }"#,
    )
    .expect_err("negative debounce");
    assert!(matches!(err, ChartError::InvalidData(_)));

    assert!(ChartOptions::from_json_compat_str("not json").is_err());
}
