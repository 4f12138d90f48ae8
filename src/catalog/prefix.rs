//! Prefix rule table for category resolution.
//!
//! Rules are keyed by dotted prefix and matched segment by segment, longest
//! first, so `v.p.latitude` never competes with a shorter rule. There is no
//! `v.p` entry; every position metric is listed individually.

use std::collections::HashMap;

use super::{patterns, MetricDefinition, Tier};
use crate::category::Category::{self, *};

/// Explicit rules. Catalog keys are inserted before these and take
/// precedence; these only fill gaps.
pub static PREFIX_RULES: &[(&str, Category)] = &[
    // broad branches
    ("v.b", Battery),
    ("v.c", Charging),
    ("v.c.12v", Power),
    ("v.d", Door),
    ("v.e", Diagnostic),
    ("v.g", Power),
    ("v.i", Motor),
    ("v.m", Motor),
    ("v.t", Tire),
    ("v.type", Device),
    ("v.vin", Device),
    ("m", System),
    ("m.net", Network),
    ("s", System),
    // vendor namespaces
    ("xvu", VwEup),
    ("xsq", SmartFortwo),
    ("xmg", MgZsEv),
    ("xnl", NissanLeaf),
    ("xrt", RenaultTwizy),
    // position branch: location
    ("v.p.altitude", Location),
    ("v.p.direction", Location),
    ("v.p.gpshdop", Location),
    ("v.p.gpslock", Location),
    ("v.p.gpsmode", Location),
    ("v.p.gpssq", Location),
    ("v.p.gpsspeed", Location),
    ("v.p.gpstime", Location),
    ("v.p.latitude", Location),
    ("v.p.longitude", Location),
    ("v.p.satcount", Location),
    ("v.p.location", Location),
    ("v.p.valet.latitude", Location),
    ("v.p.valet.longitude", Location),
    // position branch: trip
    ("v.p.acceleration", Trip),
    ("v.p.deceleration", Trip),
    ("v.p.odometer", Trip),
    ("v.p.speed", Trip),
    ("v.p.trip", Trip),
    ("v.p.valet.distance", Trip),
    // environment metrics outside the diagnostic default
    ("v.e.heating", Climate),
    ("v.e.cooling", Climate),
    ("v.e.hvac", Climate),
    ("v.e.cabintemp", Climate),
    ("v.e.cabinfan", Climate),
    ("v.e.temp", Climate),
    ("v.e.locked", Door),
    ("v.e.drivetime", Trip),
    ("v.e.parktime", Trip),
    ("v.e.regenbrake", Motor),
    // inverter
    ("v.i.temp", Motor),
    ("v.i.rpm", Motor),
    ("v.i.pwr", Motor),
    // module
    ("m.net.provider", Network),
    ("m.net.sq", Network),
    ("m.net.type", Network),
    ("m.freeram", System),
    ("m.hardware", System),
    ("m.serial", System),
    ("m.version", System),
];

/// True when `prefix` equals `path` or covers it at a segment boundary.
pub fn is_dotted_prefix(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

/// Build the rule map: catalog keys first, then the explicit table, then the
/// dotted generic patterns.
pub(super) fn build_rules(
    entries: &HashMap<&'static str, (&'static MetricDefinition, Tier)>,
) -> HashMap<&'static str, Category> {
    let mut rules: HashMap<&'static str, Category> =
        entries.iter().map(|(key, (def, _))| (*key, def.category)).collect();

    for (prefix, category) in PREFIX_RULES {
        rules.entry(*prefix).or_insert(*category);
    }
    for def in patterns::PREFIX_PATTERNS {
        rules.entry(def.key).or_insert(def.category);
    }
    rules
}

/// Rules sorted most specific first (segment count, then key).
pub(super) fn ordered(rules: &HashMap<&'static str, Category>) -> Vec<(&'static str, Category)> {
    let mut ordered: Vec<_> = rules.iter().map(|(k, c)| (*k, *c)).collect();
    ordered.sort_by(|a, b| {
        let da = a.0.split('.').count();
        let db = b.0.split('.').count();
        db.cmp(&da).then_with(|| a.0.cmp(b.0))
    });
    ordered
}

/// Walk the path from its full length down to its first segment.
pub(super) fn longest_match(
    rules: &HashMap<&'static str, Category>,
    metric_path: &str,
) -> Option<(&'static str, Category)> {
    let mut candidate = metric_path;
    loop {
        if let Some((key, category)) = rules.get_key_value(candidate) {
            return Some((*key, *category));
        }
        match candidate.rfind('.') {
            Some(idx) => candidate = &candidate[..idx],
            None => return None,
        }
    }
}
