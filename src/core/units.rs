//! Universal Y-axis units and same-family conversion.
//!
//! Unit ids follow the dashboard's universal unit vocabulary (`ms`, `By`,
//! `KiBy`, `percentunit`, ...). Conversion only happens inside one family;
//! anything else is reported as `None` so callers can skip the value.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitFamily {
    Time,
    DataDecimal,
    DataBinary,
    DataRate,
    Bits,
    Percent,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct UnitDef {
    id: &'static str,
    family: UnitFamily,
    /// Multiplier into the family base unit.
    factor: f64,
    suffix: &'static str,
}

const KB: f64 = 1_000.0;
const KIB: f64 = 1_024.0;

const UNITS: &[UnitDef] = &[
    UnitDef { id: "ns", family: UnitFamily::Time, factor: 1e-9, suffix: "ns" },
    UnitDef { id: "us", family: UnitFamily::Time, factor: 1e-6, suffix: "µs" },
    UnitDef { id: "ms", family: UnitFamily::Time, factor: 1e-3, suffix: "ms" },
    UnitDef { id: "s", family: UnitFamily::Time, factor: 1.0, suffix: "s" },
    UnitDef { id: "min", family: UnitFamily::Time, factor: 60.0, suffix: "min" },
    UnitDef { id: "h", family: UnitFamily::Time, factor: 3_600.0, suffix: "h" },
    UnitDef { id: "d", family: UnitFamily::Time, factor: 86_400.0, suffix: "d" },
    UnitDef { id: "By", family: UnitFamily::DataDecimal, factor: 1.0, suffix: "B" },
    UnitDef { id: "kBy", family: UnitFamily::DataDecimal, factor: KB, suffix: "kB" },
    UnitDef { id: "MBy", family: UnitFamily::DataDecimal, factor: KB * KB, suffix: "MB" },
    UnitDef { id: "GBy", family: UnitFamily::DataDecimal, factor: KB * KB * KB, suffix: "GB" },
    UnitDef { id: "TBy", family: UnitFamily::DataDecimal, factor: KB * KB * KB * KB, suffix: "TB" },
    UnitDef { id: "bytes", family: UnitFamily::DataBinary, factor: 1.0, suffix: "B" },
    UnitDef { id: "KiBy", family: UnitFamily::DataBinary, factor: KIB, suffix: "KiB" },
    UnitDef { id: "MiBy", family: UnitFamily::DataBinary, factor: KIB * KIB, suffix: "MiB" },
    UnitDef { id: "GiBy", family: UnitFamily::DataBinary, factor: KIB * KIB * KIB, suffix: "GiB" },
    UnitDef { id: "TiBy", family: UnitFamily::DataBinary, factor: KIB * KIB * KIB * KIB, suffix: "TiB" },
    UnitDef { id: "By/s", family: UnitFamily::DataRate, factor: 1.0, suffix: "B/s" },
    UnitDef { id: "kBy/s", family: UnitFamily::DataRate, factor: KB, suffix: "kB/s" },
    UnitDef { id: "MBy/s", family: UnitFamily::DataRate, factor: KB * KB, suffix: "MB/s" },
    UnitDef { id: "GBy/s", family: UnitFamily::DataRate, factor: KB * KB * KB, suffix: "GB/s" },
    UnitDef { id: "bit", family: UnitFamily::Bits, factor: 1.0, suffix: "b" },
    UnitDef { id: "kbit", family: UnitFamily::Bits, factor: KB, suffix: "kb" },
    UnitDef { id: "Mbit", family: UnitFamily::Bits, factor: KB * KB, suffix: "Mb" },
    UnitDef { id: "Gbit", family: UnitFamily::Bits, factor: KB * KB * KB, suffix: "Gb" },
    UnitDef { id: "percent", family: UnitFamily::Percent, factor: 1.0, suffix: "%" },
    UnitDef { id: "percentunit", family: UnitFamily::Percent, factor: 100.0, suffix: "%" },
    UnitDef { id: "{count}", family: UnitFamily::Count, factor: 1.0, suffix: "" },
];

fn lookup(unit: &str) -> Option<&'static UnitDef> {
    UNITS.iter().find(|def| def.id == unit)
}

/// Returns the family of a known unit id.
#[must_use]
pub fn unit_family(unit: &str) -> Option<UnitFamily> {
    lookup(unit).map(|def| def.family)
}

/// Converts `value` expressed in `from` into `to`.
///
/// A missing unit on either side means "already in display unit". Unknown
/// ids and cross-family pairs return `None`.
#[must_use]
pub fn convert_value(value: f64, from: Option<&str>, to: Option<&str>) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let (Some(from), Some(to)) = (from, to) else {
        return Some(value);
    };
    if from == to {
        return Some(value);
    }
    let from = lookup(from)?;
    let to = lookup(to)?;
    if from.family != to.family {
        return None;
    }
    let converted = value * from.factor / to.factor;
    converted.is_finite().then_some(converted)
}

/// Formats `value` in `unit`, rescaling to the largest unit of the same
/// family whose magnitude stays >= 1.
#[must_use]
pub fn format_with_unit(value: f64, unit: Option<&str>, decimals: usize) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let Some(def) = unit.and_then(lookup) else {
        return trim_decimal(value, decimals);
    };
    if def.family == UnitFamily::Percent {
        return format!("{}{}", trim_decimal(value * def.factor, decimals), def.suffix);
    }
    if def.family == UnitFamily::Count {
        return trim_decimal(value, decimals);
    }

    let base_value = value * def.factor;
    if base_value == 0.0 {
        return format!("0 {}", def.suffix);
    }
    let best = UNITS
        .iter()
        .filter(|candidate| candidate.family == def.family)
        .filter(|candidate| (base_value / candidate.factor).abs() >= 1.0)
        .max_by(|lhs, rhs| lhs.factor.total_cmp(&rhs.factor))
        .unwrap_or(def);
    format!(
        "{} {}",
        trim_decimal(base_value / best.factor, decimals),
        best.suffix
    )
}

fn trim_decimal(value: f64, decimals: usize) -> String {
    let text = format!("{value:.decimals$}");
    if !text.contains('.') {
        return text;
    }
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_owned()
    } else {
        trimmed.to_owned()
    }
}
