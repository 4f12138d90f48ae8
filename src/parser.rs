//! Payload coercion: raw string → [`TypedValue`] plus derived attributes.
//!
//! The parser never fails. Payloads that cannot satisfy a metric's declared
//! device class become [`TypedValue::Unavailable`]; payloads with no
//! structured form are kept as text.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::{DeviceClass, MetricDefinition, Unit, ValueKind};
use crate::category::{Category, EntityType};
use crate::duration::{format_duration, format_duration_full, parse_duration};
use crate::gps::gps_attributes;

pub const MAX_STATE_LENGTH: usize = 255;

/// Payloads treated as "no value" for numeric metrics.
pub const SPECIAL_STATE_VALUES: &[&str] = &["unavailable", "unknown", "none", "", "null", "nan"];

/// Corner order used by OVMS for four-wheel vectors: descriptive key, short key.
pub const TIRE_POSITIONS: &[(&str, &str)] = &[
    ("tire_front_left", "tire_fl"),
    ("tire_front_right", "tire_fr"),
    ("tire_rear_left", "tire_lr"),
    ("tire_rear_right", "tire_rr"),
];

/// Unit suffixes accepted after a number for numeric metrics.
const EMBEDDED_UNITS: &[&str] = &[
    "dBm", "V", "A", "W", "kW", "kWh", "Ah", "°C", "C", "km", "m", "s", "Sec", "sec", "min", "h",
    "kPa", "%", "km/h",
];

/// kPa per psi.
pub const PSI_TO_KPA: f64 = 6.89476;

/// Pressure suffixes accepted on pressure metrics, with their factor to kPa.
const PRESSURE_UNITS: &[(&str, f64)] = &[("psi", PSI_TO_KPA), ("kpa", 1.0), ("bar", 100.0)];

/// The coerced value of one payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TypedValue {
    Boolean(bool),
    Numeric(f64),
    Vector(VectorValue),
    Json(Value),
    Text(String),
    Timestamp(DateTime<Utc>),
    Unavailable,
}

impl TypedValue {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, TypedValue::Unavailable)
    }

    /// Numeric view: numbers, booleans as 1/0, vectors as their mean.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Numeric(n) => Some(*n),
            TypedValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            TypedValue::Vector(v) => Some(v.state()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for TypedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypedValue::Boolean(b) => write!(f, "{}", b),
            TypedValue::Numeric(n) => write!(f, "{}", n),
            TypedValue::Vector(v) => write!(f, "{}", v.state()),
            TypedValue::Json(v) => write!(f, "{}", v),
            TypedValue::Text(s) => f.write_str(s),
            TypedValue::Timestamp(t) => f.write_str(&t.to_rfc3339()),
            TypedValue::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// Comma-separated numeric payload with statistics over every element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorValue {
    pub values: Vec<f64>,
    /// Set only for four-element tire vectors
    pub position_labels: Option<&'static [(&'static str, &'static str)]>,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl VectorValue {
    /// `None` for an empty slice.
    pub fn from_values(values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        // per-element division keeps values near f64::MAX finite
        let mean = values.iter().map(|v| v / count as f64).sum::<f64>();
        let median = median(&values);
        Some(Self {
            values,
            position_labels: None,
            count,
            min,
            max,
            mean,
            median,
        })
    }

    /// Mean rounded to four decimals.
    pub fn state(&self) -> f64 {
        round4(self.mean)
    }

    fn with_tire_labels(mut self) -> Self {
        if self.count == TIRE_POSITIONS.len() {
            self.position_labels = Some(TIRE_POSITIONS);
        }
        self
    }

    /// Statistics, raw values and positional keys.
    pub fn attributes(&self) -> Map<String, Value> {
        let mut attrs = Map::new();
        attrs.insert("count".to_string(), Value::from(self.count));
        attrs.insert("min".to_string(), Value::from(self.min));
        attrs.insert("max".to_string(), Value::from(self.max));
        attrs.insert("mean".to_string(), Value::from(self.mean));
        attrs.insert("median".to_string(), Value::from(self.median));
        attrs.insert("values".to_string(), Value::from(self.values.clone()));

        match self.position_labels {
            Some(labels) => {
                for ((long, short), v) in labels.iter().zip(&self.values) {
                    attrs.insert(long.to_string(), Value::from(*v));
                    attrs.insert(short.to_string(), Value::from(*v));
                }
            }
            None => {
                for (i, v) in self.values.iter().enumerate() {
                    attrs.insert(format!("cell_{}", i + 1), Value::from(*v));
                }
            }
        }
        attrs
    }
}

/// Standard median: middle value, or mean of the two middle values.
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 0 {
        sorted[n / 2 - 1] / 2.0 + sorted[n / 2] / 2.0
    } else {
        sorted[n / 2]
    }
}

fn round4(n: f64) -> f64 {
    (n * 10_000.0).round() / 10_000.0
}

/// What the parser needs to know about the metric.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub metric_path: &'a str,
    pub entity_type: EntityType,
    pub category: Category,
    pub definition: Option<&'a MetricDefinition>,
}

impl<'a> ParseContext<'a> {
    fn requires_numeric(&self) -> bool {
        self.definition.map(|d| d.requires_numeric()).unwrap_or(false)
    }

    fn device_class(&self) -> Option<DeviceClass> {
        self.definition.and_then(|d| d.device_class)
    }

    fn unit(&self) -> Unit {
        self.definition.map(|d| d.unit).unwrap_or(Unit::None)
    }

    fn kind(&self) -> Option<ValueKind> {
        self.definition.map(|d| d.kind)
    }

    /// Pressure vectors are always tires; temperature only in the tire category.
    fn is_tire_vector(&self) -> bool {
        match self.device_class() {
            Some(DeviceClass::Pressure) => true,
            Some(DeviceClass::Temperature) => self.category == Category::Tire,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedPayload {
    pub value: TypedValue,
    pub attributes: Map<String, Value>,
}

impl ParsedPayload {
    fn new(value: TypedValue) -> Self {
        Self {
            value,
            attributes: Map::new(),
        }
    }

    fn unavailable() -> Self {
        Self::new(TypedValue::Unavailable)
    }
}

pub fn parse(ctx: &ParseContext<'_>, raw: &str) -> ParsedPayload {
    let payload = raw.trim();

    if ctx.entity_type.is_boolean() {
        return ParsedPayload::new(parse_boolean_state(payload));
    }

    if payload.is_empty() {
        return ParsedPayload::unavailable();
    }
    if is_special_state_value(payload)
        && (ctx.requires_numeric()
            || matches!(ctx.kind(), Some(ValueKind::Timestamp | ValueKind::Vector)))
    {
        return ParsedPayload::unavailable();
    }

    if payload.starts_with('{') || payload.starts_with('[') {
        if let Ok(json) = serde_json::from_str::<Value>(payload) {
            return parse_json(ctx, json);
        }
        tracing::trace!("parser: {} payload is not valid JSON", ctx.metric_path);
    }

    if ctx.device_class() == Some(DeviceClass::Pressure) {
        if let Some((body, unit, factor)) = split_pressure_unit(payload) {
            return parse_pressure(ctx, body, unit, factor);
        }
    }

    if payload.contains([',', ';']) {
        if let Some(parsed) = parse_vector(ctx, payload) {
            return parsed;
        }
        if ctx.requires_numeric() {
            return ParsedPayload::unavailable();
        }
        return ParsedPayload::new(TypedValue::Text(truncate_state(payload)));
    }

    if ctx.kind() == Some(ValueKind::Timestamp) {
        return match parse_timestamp(payload) {
            Some(ts) => ParsedPayload::new(TypedValue::Timestamp(ts)),
            None => ParsedPayload::unavailable(),
        };
    }

    let value = coerce_scalar(ctx, payload);
    with_scalar_attributes(ctx, value)
}

/// Scalar text → number, or text when the metric allows it.
fn coerce_scalar(ctx: &ParseContext<'_>, payload: &str) -> TypedValue {
    if let Some(n) = parse_number(payload) {
        return TypedValue::Numeric(n);
    }
    if !ctx.requires_numeric() {
        return TypedValue::Text(truncate_state(payload));
    }

    if let Some(b) = parse_bool_word(payload) {
        return TypedValue::Numeric(if b { 1.0 } else { 0.0 });
    }
    if let Some(per_unit) = ctx.unit().seconds_per_unit() {
        if let Some(secs) = parse_duration(payload) {
            return TypedValue::Numeric(secs / per_unit);
        }
    }
    if let Some(n) = parse_with_unit(payload) {
        return TypedValue::Numeric(n);
    }

    tracing::debug!(
        "parser: {} expects a number, got '{}'",
        ctx.metric_path,
        truncate_state(payload)
    );
    TypedValue::Unavailable
}

fn with_scalar_attributes(ctx: &ParseContext<'_>, value: TypedValue) -> ParsedPayload {
    let mut parsed = ParsedPayload::new(value);
    if let TypedValue::Numeric(n) = parsed.value {
        parsed.attributes.extend(duration_attributes(ctx, n));
        parsed.attributes.extend(gps_attributes(ctx.metric_path, n));
    }
    parsed
}

fn duration_attributes(ctx: &ParseContext<'_>, value: f64) -> Map<String, Value> {
    let mut attrs = Map::new();
    if let Some(per_unit) = ctx.unit().seconds_per_unit() {
        let seconds = value * per_unit;
        attrs.insert("duration_seconds".to_string(), Value::from(seconds));
        attrs.insert("duration_formatted".to_string(), Value::from(format_duration(seconds)));
        attrs.insert(
            "duration_formatted_full".to_string(),
            Value::from(format_duration_full(seconds)),
        );
    }
    attrs
}

fn parse_boolean_state(payload: &str) -> TypedValue {
    if let Some(b) = parse_bool(payload) {
        return TypedValue::Boolean(b);
    }
    match parse_number(payload) {
        Some(n) => TypedValue::Boolean(n != 0.0),
        None => TypedValue::Unavailable,
    }
}

/// Elements of a `,` or `;` separated payload, empty ones dropped.
fn split_elements(payload: &str) -> impl Iterator<Item = &str> {
    payload.split([',', ';']).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_vector(ctx: &ParseContext<'_>, payload: &str) -> Option<ParsedPayload> {
    let values: Option<Vec<f64>> = split_elements(payload).map(parse_number).collect();
    vector_payload(ctx, values?)
}

fn pressure_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        let units: Vec<&str> = PRESSURE_UNITS.iter().map(|(u, _)| *u).collect();
        Regex::new(&format!(r"(?i)^([-+0-9.,;\s]*[0-9.])\s*({})$", units.join("|"))).ok()
    })
    .as_ref()
}

/// `"32,33,31,32psi"` → (`"32,33,31,32"`, `"psi"`, factor to kPa).
fn split_pressure_unit(payload: &str) -> Option<(&str, &'static str, f64)> {
    let caps = pressure_regex()?.captures(payload)?;
    let body = caps.get(1)?.as_str();
    let suffix = caps.get(2)?.as_str();
    PRESSURE_UNITS
        .iter()
        .find(|(u, _)| u.eq_ignore_ascii_case(suffix))
        .map(|&(unit, factor)| (body, unit, factor))
}

/// Pressure readings with a unit suffix, normalized to kPa.
fn parse_pressure(ctx: &ParseContext<'_>, body: &str, unit: &'static str, factor: f64) -> ParsedPayload {
    let values: Option<Vec<f64>> = split_elements(body)
        .map(|s| parse_number(s).map(|n| n * factor))
        .collect();

    match values.and_then(|values| vector_payload(ctx, values)) {
        Some(mut parsed) => {
            parsed
                .attributes
                .insert("original_unit".to_string(), Value::from(unit));
            parsed
        }
        None => {
            tracing::debug!("parser: {} has unparseable pressure '{}'", ctx.metric_path, body);
            ParsedPayload::unavailable()
        }
    }
}

/// One value is a plain number; two or more become a vector.
fn vector_payload(ctx: &ParseContext<'_>, values: Vec<f64>) -> Option<ParsedPayload> {
    if values.len() < 2 {
        let n = *values.first()?;
        return Some(with_scalar_attributes(ctx, TypedValue::Numeric(n)));
    }

    let mut vector = VectorValue::from_values(values)?;
    if ctx.is_tire_vector() {
        vector = vector.with_tire_labels();
    }
    let attributes = vector.attributes();
    Some(ParsedPayload {
        value: TypedValue::Vector(vector),
        attributes,
    })
}

fn parse_json(ctx: &ParseContext<'_>, json: Value) -> ParsedPayload {
    match json {
        Value::Object(obj) => parse_json_object(ctx, obj),
        Value::Array(items) => parse_json_array(ctx, items),
        _ => ParsedPayload::unavailable(),
    }
}

fn parse_json_object(ctx: &ParseContext<'_>, obj: Map<String, Value>) -> ParsedPayload {
    let primary = obj
        .get("value")
        .or_else(|| obj.get("state"))
        .or_else(|| obj.values().find(|v| v.is_number()))
        .cloned();

    let value = match primary {
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|n| n.is_finite())
            .map(TypedValue::Numeric)
            .unwrap_or(TypedValue::Unavailable),
        Some(Value::Bool(b)) if ctx.requires_numeric() => {
            TypedValue::Numeric(if b { 1.0 } else { 0.0 })
        }
        Some(Value::Bool(b)) => TypedValue::Boolean(b),
        Some(Value::String(s)) if is_special_state_value(&s) => TypedValue::Unavailable,
        Some(Value::String(s)) => coerce_scalar(ctx, s.trim()),
        Some(Value::Null) => TypedValue::Unavailable,
        Some(_) | None if ctx.requires_numeric() => TypedValue::Unavailable,
        Some(_) | None => TypedValue::Json(Value::Object(obj.clone())),
    };

    let mut parsed = with_scalar_attributes(ctx, value);
    for (key, val) in &obj {
        if matches!(key.as_str(), "value" | "state" | "data") {
            continue;
        }
        parsed.attributes.entry(key.clone()).or_insert_with(|| val.clone());
        if let Value::Object(nested) = val {
            for (sub, sub_val) in nested {
                parsed
                    .attributes
                    .entry(format!("{}_{}", key, sub))
                    .or_insert_with(|| sub_val.clone());
            }
        }
    }
    if let Some(ts) = obj.get("timestamp") {
        parsed.attributes.insert("device_timestamp".to_string(), ts.clone());
    }
    parsed
}

fn parse_json_array(ctx: &ParseContext<'_>, items: Vec<Value>) -> ParsedPayload {
    let numbers: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();

    let mut parsed = match numbers.and_then(|values| vector_payload(ctx, values)) {
        Some(parsed) => parsed,
        None if ctx.requires_numeric() => ParsedPayload::unavailable(),
        None => ParsedPayload::new(TypedValue::Json(Value::Array(items.clone()))),
    };

    parsed.attributes.insert("list_length".to_string(), Value::from(items.len()));
    parsed.attributes.insert("list_values".to_string(), Value::Array(items));
    parsed
}

// ── Scalar helpers ───────────────────────────────────────

pub fn is_special_state_value(payload: &str) -> bool {
    let lower = payload.trim().to_ascii_lowercase();
    SPECIAL_STATE_VALUES.contains(&lower.as_str())
}

/// Finite float, or `None`. Rejects `nan` and `inf`.
pub fn parse_number(payload: &str) -> Option<f64> {
    payload.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Boolean payloads accepted for binary sensors.
pub fn parse_bool(payload: &str) -> Option<bool> {
    match payload.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" | "open" | "locked" | "online" => Some(true),
        "false" | "off" | "no" | "0" | "closed" | "unlocked" | "offline" => Some(false),
        _ => None,
    }
}

/// Words mapped to 1/0 for numeric metrics.
fn parse_bool_word(payload: &str) -> Option<bool> {
    match payload.trim().to_ascii_lowercase().as_str() {
        "yes" | "on" | "true" | "enabled" => Some(true),
        "no" | "off" | "false" | "disabled" => Some(false),
        _ => None,
    }
}

fn unit_suffix_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        let units: Vec<String> = EMBEDDED_UNITS.iter().map(|u| regex::escape(u)).collect();
        Regex::new(&format!(
            r"^([+-]?(?:\d+(?:\.\d*)?|\.\d+))\s*(?:{})$",
            units.join("|")
        ))
        .ok()
    })
    .as_ref()
}

/// `-101dBm`, `12.5 V`, `230kPa`.
fn parse_with_unit(payload: &str) -> Option<f64> {
    let caps = unit_suffix_regex()?.captures(payload)?;
    parse_number(caps.get(1)?.as_str())
}

/// Epoch seconds (or milliseconds), RFC 3339, or `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn parse_timestamp(payload: &str) -> Option<DateTime<Utc>> {
    let payload = payload.trim();
    if let Some(n) = parse_number(payload) {
        if n <= 0.0 {
            return None;
        }
        let secs = if n > 1e12 { n / 1000.0 } else { n };
        let whole = secs.trunc() as i64;
        let nanos = ((secs - secs.trunc()) * 1e9) as u32;
        return Utc.timestamp_opt(whole, nanos).single();
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(payload) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(payload, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Cut text to [`MAX_STATE_LENGTH`] characters, ending in `...`.
pub fn truncate_state(text: &str) -> String {
    if text.chars().count() <= MAX_STATE_LENGTH {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_STATE_LENGTH - 3).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MetricCatalog;
    use approx::assert_relative_eq;

    fn parse_metric(catalog: &MetricCatalog, path: &str, category: Category, raw: &str) -> ParsedPayload {
        let m = catalog.resolve(path);
        let ctx = ParseContext {
            metric_path: path,
            entity_type: catalog.entity_type_hint(path),
            category,
            definition: m.map(|m| m.definition),
        };
        parse(&ctx, raw)
    }

    fn vector_of(parsed: &ParsedPayload) -> &VectorValue {
        match &parsed.value {
            TypedValue::Vector(v) => v,
            other => panic!("expected vector, got {:?}", other),
        }
    }

    const TIRE_PAYLOAD: &str = "206.8,216.4,210.2,218.5";

    #[test]
    fn test_vector_statistics() {
        let catalog = MetricCatalog::load(None);
        let parsed = parse_metric(&catalog, "v.b.c.voltage", Category::Battery, TIRE_PAYLOAD);
        let v = vector_of(&parsed);
        assert_eq!(v.count, 4);
        assert_relative_eq!(v.min, 206.8);
        assert_relative_eq!(v.max, 218.5);
        assert_relative_eq!(v.mean, 212.975, epsilon = 1e-9);
        assert_relative_eq!(v.median, 213.3, epsilon = 1e-9);
        assert_relative_eq!(v.state(), 212.975);
        assert_eq!(parsed.attributes["count"], 4);
        assert_eq!(parsed.attributes["values"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_odd_median() {
        assert_relative_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_relative_eq!(median(&[4.0, 1.0]), 2.5);
    }

    #[test]
    fn test_statistics_near_f64_max() {
        let v = VectorValue::from_values(vec![1e308, 1e308]).unwrap();
        assert!(v.mean.is_finite());
        assert_relative_eq!(v.mean, 1e308);
        assert_relative_eq!(v.median, 1e308);
        assert_relative_eq!(median(&[f64::MAX, f64::MAX]), f64::MAX);
    }

    fn pressure(raw: &str) -> ParsedPayload {
        let catalog = MetricCatalog::load(None);
        parse_metric(&catalog, "v.t.pressure", Category::Tire, raw)
    }

    #[test]
    fn test_pressure_kpa_suffix() {
        let parsed = pressure("220,225,215,220kPa");
        let v = vector_of(&parsed);
        assert_eq!(v.values, vec![220.0, 225.0, 215.0, 220.0]);
        assert_relative_eq!(v.state(), 220.0);
        assert_eq!(parsed.attributes["tire_fr"], 225.0);
        assert_eq!(parsed.attributes["original_unit"], "kpa");
    }

    #[test]
    fn test_pressure_psi_converted() {
        let parsed = pressure("32,33,31,32psi");
        let v = vector_of(&parsed);
        assert_eq!(v.count, 4);
        assert_relative_eq!(v.values[1], 33.0 * PSI_TO_KPA, epsilon = 1e-9);
        assert_relative_eq!(v.mean, 32.0 * PSI_TO_KPA, epsilon = 1e-9);
        assert_eq!(v.position_labels, Some(TIRE_POSITIONS));

        // case and whitespace do not matter
        let parsed = pressure("32.0, 33.5 , 31.2, 32.8 PSI");
        assert_relative_eq!(vector_of(&parsed).max, 33.5 * PSI_TO_KPA, epsilon = 1e-9);
    }

    #[test]
    fn test_pressure_semicolons() {
        let parsed = pressure("30; 31; 29; 30");
        let v = vector_of(&parsed);
        assert_eq!(v.values, vec![30.0, 31.0, 29.0, 30.0]);
        assert_relative_eq!(v.mean, 30.0);
        assert!(!parsed.attributes.contains_key("original_unit"));
    }

    #[test]
    fn test_pressure_single_values() {
        match pressure("32psi").value {
            TypedValue::Numeric(n) => assert_relative_eq!(n, 220.63232, epsilon = 1e-9),
            other => panic!("unexpected {:?}", other),
        }
        match pressure("2.2bar").value {
            TypedValue::Numeric(n) => assert_relative_eq!(n, 220.0, epsilon = 1e-9),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(pressure("psi").value, TypedValue::Unavailable);
        assert_eq!(pressure("32,x,31psi").value, TypedValue::Unavailable);
    }

    #[test]
    fn test_pressure_suffix_only_on_pressure_metrics() {
        let catalog = MetricCatalog::load(None);
        let parsed = parse_metric(&catalog, "v.b.soc", Category::Battery, "32psi");
        assert_eq!(parsed.value, TypedValue::Unavailable);
    }

    #[test]
    fn test_tire_labels() {
        let catalog = MetricCatalog::load(None);
        let parsed = parse_metric(&catalog, "v.t.pressure", Category::Tire, TIRE_PAYLOAD);
        let v = vector_of(&parsed);
        assert_eq!(v.position_labels, Some(TIRE_POSITIONS));
        let a = &parsed.attributes;
        assert_eq!(a["tire_front_left"], 206.8);
        assert_eq!(a["tire_front_right"], 216.4);
        assert_eq!(a["tire_rear_left"], 210.2);
        assert_eq!(a["tire_rear_right"], 218.5);
        assert_eq!(a["tire_fl"], 206.8);
        assert_eq!(a["tire_fr"], 216.4);
        assert_eq!(a["tire_lr"], 210.2);
        assert_eq!(a["tire_rr"], 218.5);
        assert!(!a.contains_key("cell_1"));
        // statistics still present
        assert_eq!(a["count"], 4);
    }

    #[test]
    fn test_non_tire_vector_gets_cells() {
        let catalog = MetricCatalog::load(None);
        // temperature outside the tire category
        let parsed = parse_metric(&catalog, "v.b.c.temp", Category::Battery, TIRE_PAYLOAD);
        let a = &parsed.attributes;
        assert_eq!(vector_of(&parsed).position_labels, None);
        for i in 1..=4 {
            assert!(a.contains_key(&format!("cell_{}", i)));
        }
        assert!(!a.contains_key("tire_fl"));

        // tire temperature does get positions
        let parsed = parse_metric(&catalog, "v.t.temp", Category::Tire, "20,21,22,23");
        assert!(parsed.attributes.contains_key("tire_rr"));
    }

    #[test]
    fn test_tire_labels_need_four_values() {
        let catalog = MetricCatalog::load(None);
        let parsed = parse_metric(&catalog, "v.t.pressure", Category::Tire, "200,210,220");
        assert_eq!(vector_of(&parsed).position_labels, None);
        assert!(parsed.attributes.contains_key("cell_3"));
        assert_eq!(parsed.attributes["count"], 3);
    }

    #[test]
    fn test_boolean_round_trip() {
        let catalog = MetricCatalog::load(None);
        let first = parse_metric(&catalog, "v.d.fl", Category::Door, "yes");
        assert_eq!(first.value, TypedValue::Boolean(true));
        let again = parse_metric(&catalog, "v.d.fl", Category::Door, &first.value.to_string());
        assert_eq!(again.value, first.value);

        let off = parse_metric(&catalog, "v.d.fl", Category::Door, "no");
        assert_eq!(off.value, TypedValue::Boolean(false));
        let again = parse_metric(&catalog, "v.d.fl", Category::Door, &off.value.to_string());
        assert_eq!(again.value, off.value);

        assert_eq!(
            parse_metric(&catalog, "v.d.fl", Category::Door, "maybe").value,
            TypedValue::Unavailable
        );
    }

    #[test]
    fn test_device_class_safety() {
        let catalog = MetricCatalog::load(None);
        for raw in ["N/A", "unknown", "nan", "", "--", "{broken", "a,b,c", "inf"] {
            let parsed = parse_metric(&catalog, "v.b.soc", Category::Battery, raw);
            assert_eq!(parsed.value, TypedValue::Unavailable, "payload {:?}", raw);
        }
    }

    #[test]
    fn test_numeric_coercion() {
        let catalog = MetricCatalog::load(None);
        assert_eq!(
            parse_metric(&catalog, "v.b.soc", Category::Battery, "87").value,
            TypedValue::Numeric(87.0)
        );
        assert_eq!(
            parse_metric(&catalog, "m.net.sq", Category::Network, "-101dBm").value,
            TypedValue::Numeric(-101.0)
        );
        assert_eq!(
            parse_metric(&catalog, "v.b.voltage", Category::Battery, "396.5 V").value,
            TypedValue::Numeric(396.5)
        );
        assert_eq!(
            parse_metric(&catalog, "v.e.cabinfan", Category::Climate, "off").value,
            TypedValue::Numeric(0.0)
        );
        assert_eq!(
            parse_metric(&catalog, "v.b.voltage", Category::Battery, ".5V").value,
            TypedValue::Numeric(0.5)
        );
        for raw in ["12.5 volts", "V12", "1.2.3V", "12.5V extra"] {
            assert_eq!(
                parse_metric(&catalog, "v.b.voltage", Category::Battery, raw).value,
                TypedValue::Unavailable,
                "payload {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_text_fallback() {
        let catalog = MetricCatalog::load(None);
        assert_eq!(
            parse_metric(&catalog, "v.c.state", Category::Charging, "done").value,
            TypedValue::Text("done".to_string())
        );
        let long = "x".repeat(300);
        match parse_metric(&catalog, "zz.note", Category::System, &long).value {
            TypedValue::Text(t) => {
                assert_eq!(t.chars().count(), MAX_STATE_LENGTH);
                assert!(t.ends_with("..."));
            }
            other => panic!("unexpected {:?}", other),
        }
        // malformed JSON on a text metric stays raw
        assert_eq!(
            parse_metric(&catalog, "zz.note", Category::System, "{oops").value,
            TypedValue::Text("{oops".to_string())
        );
    }

    #[test]
    fn test_duration_attributes() {
        let catalog = MetricCatalog::load(None);
        let parsed = parse_metric(&catalog, "v.c.duration.full", Category::Charging, "150");
        assert_eq!(parsed.value, TypedValue::Numeric(150.0));
        assert_eq!(parsed.attributes["duration_seconds"], 9000.0);
        assert_eq!(parsed.attributes["duration_formatted"], "2h 30m");
        assert_eq!(parsed.attributes["duration_formatted_full"], "2 hours 30 minutes");

        // duration strings land in the metric's own unit
        let parsed = parse_metric(&catalog, "v.c.duration.full", Category::Charging, "2h 30m");
        assert_eq!(parsed.value, TypedValue::Numeric(150.0));
        let parsed = parse_metric(&catalog, "v.e.parktime", Category::Trip, "01:00:00");
        assert_eq!(parsed.value, TypedValue::Numeric(3600.0));
    }

    #[test]
    fn test_timestamps() {
        let catalog = MetricCatalog::load(None);
        let parsed = parse_metric(&catalog, "m.time.utc", Category::System, "1700000000");
        let TypedValue::Timestamp(ts) = parsed.value else {
            panic!("expected timestamp");
        };
        assert_eq!(ts.timestamp(), 1_700_000_000);

        let parsed = parse_metric(&catalog, "m.time.utc", Category::System, "2024-03-01 12:00:00");
        assert!(matches!(parsed.value, TypedValue::Timestamp(_)));
        let parsed = parse_metric(&catalog, "m.time.utc", Category::System, "2024-03-01T12:00:00Z");
        assert!(matches!(parsed.value, TypedValue::Timestamp(_)));
        let parsed = parse_metric(&catalog, "m.time.utc", Category::System, "later");
        assert_eq!(parsed.value, TypedValue::Unavailable);
    }

    #[test]
    fn test_json_object() {
        let catalog = MetricCatalog::load(None);
        let parsed = parse_metric(
            &catalog,
            "v.b.soc",
            Category::Battery,
            r#"{"value": 81.5, "timestamp": 1700000000, "source": {"bms": "ok"}}"#,
        );
        assert_eq!(parsed.value, TypedValue::Numeric(81.5));
        assert_eq!(parsed.attributes["device_timestamp"], 1700000000);
        assert_eq!(parsed.attributes["source_bms"], "ok");
        assert!(!parsed.attributes.contains_key("value"));

        let parsed = parse_metric(&catalog, "zz.info", Category::System, r#"{"name": "x"}"#);
        assert!(matches!(parsed.value, TypedValue::Json(_)));
        assert_eq!(parsed.attributes["name"], "x");
    }

    #[test]
    fn test_json_array() {
        let catalog = MetricCatalog::load(None);
        let parsed = parse_metric(&catalog, "zz.list", Category::System, "[1, 2, 3]");
        assert_eq!(vector_of(&parsed).count, 3);
        assert_eq!(parsed.attributes["list_length"], 3);

        let parsed = parse_metric(&catalog, "zz.list", Category::System, r#"["a", "b"]"#);
        assert!(matches!(parsed.value, TypedValue::Json(_)));
        assert_eq!(parsed.attributes["list_length"], 2);
        assert!(!parsed.attributes.contains_key("mean"));
    }

    #[test]
    fn test_gps_attributes_attached() {
        let catalog = MetricCatalog::load(None);
        let parsed = parse_metric(&catalog, "v.p.gpssq", Category::Location, "70");
        assert_eq!(parsed.attributes["gps_accuracy"], 30.0);
    }

    #[test]
    fn test_truncate_multibyte() {
        let text = "°".repeat(300);
        let cut = truncate_state(&text);
        assert_eq!(cut.chars().count(), MAX_STATE_LENGTH);
    }
}
