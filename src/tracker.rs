//! Device-tracker aggregation.
//!
//! Position arrives as separate metrics (`v.p.latitude`, `v.p.longitude`,
//! `v.p.gpssq`, `v.p.gpshdop`, ...). The tracker keeps the latest of each per
//! vehicle and produces one `device_tracker.ovms_<vehicle>` entity once both
//! coordinates are known.

use dashmap::DashMap;
use serde_json::{Map, Value};

use crate::entity::{tracker_entity_id, tracker_friendly_name, EntityUpdate};
use crate::gps::estimate_accuracy;
use crate::message::ParsedMessage;

/// The bridge has no zones, so a located vehicle is never "home".
pub const TRACKER_STATE: &str = "not_home";

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Fix {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub signal_quality: Option<f64>,
    pub hdop: Option<f64>,
    pub altitude: Option<f64>,
    pub direction: Option<f64>,
    pub speed: Option<f64>,
}

impl Fix {
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    pub fn accuracy(&self) -> Option<f64> {
        estimate_accuracy(self.signal_quality, self.hdop)
    }
}

#[derive(Default)]
pub struct DeviceTracker {
    fixes: DashMap<String, Fix>,
}

impl DeviceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a metric feeds the tracker.
    pub fn is_position_metric(metric_path: &str) -> bool {
        position_field(metric_path).is_some()
    }

    /// Record a position metric. Returns the tracker entity when both
    /// coordinates are known; `None` for unrelated or unusable values.
    pub fn update(&self, msg: &ParsedMessage) -> Option<EntityUpdate> {
        let field = position_field(&msg.metric_path)?;
        let value = msg.value.as_f64().filter(|v| v.is_finite())?;
        if !field.accepts(value) {
            tracing::debug!("tracker: {} ignoring out-of-range {} {}", msg.vehicle_id, msg.metric_path, value);
            return None;
        }

        let fix = {
            let mut entry = self.fixes.entry(msg.vehicle_id.clone()).or_default();
            field.store(&mut entry, value);
            *entry
        };

        let (latitude, longitude) = fix.position()?;
        Some(tracker_update(&msg.vehicle_id, latitude, longitude, &fix))
    }

    pub fn fix(&self, vehicle_id: &str) -> Option<Fix> {
        self.fixes.get(vehicle_id).map(|f| *f)
    }
}

fn tracker_update(vehicle_id: &str, latitude: f64, longitude: f64, fix: &Fix) -> EntityUpdate {
    let friendly_name = tracker_friendly_name(vehicle_id);

    let mut attrs = Map::new();
    attrs.insert("friendly_name".to_string(), Value::from(friendly_name.as_str()));
    attrs.insert("source_type".to_string(), Value::from("gps"));
    attrs.insert("latitude".to_string(), Value::from(latitude));
    attrs.insert("longitude".to_string(), Value::from(longitude));
    if let Some(accuracy) = fix.accuracy() {
        attrs.insert("gps_accuracy".to_string(), Value::from(accuracy));
    }
    for (key, value) in [
        ("altitude", fix.altitude),
        ("course", fix.direction),
        ("speed", fix.speed),
        ("gps_signal_quality", fix.signal_quality),
        ("gps_hdop", fix.hdop),
    ] {
        if let Some(v) = value {
            attrs.insert(key.to_string(), Value::from(v));
        }
    }
    attrs.insert("icon".to_string(), Value::from("mdi:car"));

    EntityUpdate {
        entity_id: tracker_entity_id(vehicle_id),
        friendly_name,
        state: TRACKER_STATE.to_string(),
        attributes: attrs,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Latitude,
    Longitude,
    SignalQuality,
    Hdop,
    Altitude,
    Direction,
    Speed,
}

impl Field {
    fn accepts(self, v: f64) -> bool {
        match self {
            Field::Latitude => (-90.0..=90.0).contains(&v),
            Field::Longitude => (-180.0..=180.0).contains(&v),
            _ => true,
        }
    }

    fn store(self, fix: &mut Fix, v: f64) {
        let slot = match self {
            Field::Latitude => &mut fix.latitude,
            Field::Longitude => &mut fix.longitude,
            Field::SignalQuality => &mut fix.signal_quality,
            Field::Hdop => &mut fix.hdop,
            Field::Altitude => &mut fix.altitude,
            Field::Direction => &mut fix.direction,
            Field::Speed => &mut fix.speed,
        };
        *slot = Some(v);
    }
}

fn position_field(metric_path: &str) -> Option<Field> {
    match metric_path {
        "v.p.latitude" => Some(Field::Latitude),
        "v.p.longitude" => Some(Field::Longitude),
        "v.p.gpssq" => Some(Field::SignalQuality),
        "v.p.gpshdop" => Some(Field::Hdop),
        "v.p.altitude" => Some(Field::Altitude),
        "v.p.direction" => Some(Field::Direction),
        "v.p.gpsspeed" => Some(Field::Speed),
        _ => None,
    }
}
