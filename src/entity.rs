//! Entity ids, friendly names and state strings for parsed messages.

use serde_json::{Map, Value};

use crate::catalog::VehicleModel;
use crate::classifier::TopicBranch;
use crate::message::ParsedMessage;
use crate::parser::{truncate_state, TypedValue};

/// What the state store receives for one message.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityUpdate {
    pub entity_id: String,
    pub friendly_name: String,
    pub state: String,
    pub attributes: Map<String, Value>,
}

/// `<domain>.ovms_<vehicle>_<metric path>`, lowercase, `_` separated.
pub fn entity_id(domain: &str, vehicle_id: &str, metric_path: &str) -> String {
    format!(
        "{}.{}",
        domain,
        object_id(&format!("ovms_{}_{}", vehicle_id, metric_path))
    )
}

/// `device_tracker.ovms_<vehicle>`
pub fn tracker_entity_id(vehicle_id: &str) -> String {
    format!("device_tracker.{}", object_id(&format!("ovms_{}", vehicle_id)))
}

pub fn tracker_friendly_name(vehicle_id: &str) -> String {
    format!("({}) Location", vehicle_id)
}

/// Lowercase ASCII alphanumerics; every other run of characters becomes a
/// single `_`.
pub fn object_id(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Friendly name for a metric.
///
/// Known metrics use their catalog name, others a title-cased trailing
/// token. Metrics under a vendor namespace get the model's display name in
/// front.
pub fn friendly_name(msg: &ParsedMessage) -> String {
    if msg.branch == TopicBranch::Notification {
        return notification_name(&msg.metric_path);
    }

    let base = match msg.name {
        Some(name) => name.to_string(),
        None => title_case(msg.metric_path.rsplit('.').next().unwrap_or(&msg.metric_path)),
    };

    let vendor = msg
        .metric_path
        .split('.')
        .next()
        .and_then(VehicleModel::from_namespace);
    match vendor {
        Some(model) if !base.contains(model.display_name()) => {
            format!("{} {}", model.display_name(), base)
        }
        _ => base,
    }
}

/// `notify.alert.charge.stopped` → `Alert: Charge Stopped`
fn notification_name(metric_path: &str) -> String {
    let rest = metric_path.strip_prefix("notify.").unwrap_or(metric_path);
    match rest.split_once('.') {
        Some((kind, subject)) => format!("{}: {}", title_case(kind), title_case(subject)),
        None => title_case(rest),
    }
}

/// `charge_stopped` / `charge.stopped` → `Charge Stopped`
pub fn title_case(raw: &str) -> String {
    raw.split(['.', '_', '-', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// State string as stored for the entity.
pub fn render_state(value: &TypedValue) -> String {
    match value {
        TypedValue::Boolean(true) => "on".to_string(),
        TypedValue::Boolean(false) => "off".to_string(),
        TypedValue::Json(Value::String(s)) => truncate_state(s),
        TypedValue::Json(v) => truncate_state(&v.to_string()),
        TypedValue::Text(s) => truncate_state(s),
        other => other.to_string(),
    }
}

/// Parsed attributes plus the entity metadata.
pub fn entity_attributes(msg: &ParsedMessage, friendly_name: &str) -> Map<String, Value> {
    let mut attrs = msg.attributes.clone();
    attrs.insert("friendly_name".to_string(), Value::from(friendly_name));
    if let Some(symbol) = msg.unit.symbol() {
        attrs.insert("unit_of_measurement".to_string(), Value::from(symbol));
    }
    if let Some(class) = msg.device_class {
        attrs.insert("device_class".to_string(), Value::from(class.as_str()));
    }
    if let Some(class) = msg.state_class {
        attrs.insert("state_class".to_string(), Value::from(class.as_str()));
    }
    if let Some(icon) = msg.icon {
        attrs.insert("icon".to_string(), Value::from(icon));
    }
    attrs.insert("category".to_string(), Value::from(msg.category.as_str()));
    attrs.insert("metric_path".to_string(), Value::from(msg.metric_path.as_str()));
    attrs.insert("topic".to_string(), Value::from(msg.topic.as_str()));
    attrs.insert("vehicle_id".to_string(), Value::from(msg.vehicle_id.as_str()));
    attrs
}

pub fn entity_update(msg: &ParsedMessage) -> EntityUpdate {
    let friendly_name = friendly_name(msg);
    EntityUpdate {
        entity_id: entity_id(msg.entity_type.domain(), &msg.vehicle_id, &msg.metric_path),
        state: render_state(&msg.value),
        attributes: entity_attributes(msg, &friendly_name),
        friendly_name,
    }
}
