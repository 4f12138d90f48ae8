//! Canonical category and entity-type labels.
//!
//! Every module refers to these enums; there are no free-standing category
//! string constants anywhere else in the crate.

use serde::{Deserialize, Serialize};

/// Coarse grouping label used to organise entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Battery,
    Charging,
    Climate,
    Door,
    Location,
    Motor,
    Trip,
    Device,
    Diagnostic,
    Power,
    Network,
    System,
    Tire,
    Notification,
    VwEup,
    SmartFortwo,
    MgZsEv,
    NissanLeaf,
    RenaultTwizy,
}

impl Category {
    pub const ALL: [Category; 19] = [
        Category::Battery,
        Category::Charging,
        Category::Climate,
        Category::Door,
        Category::Location,
        Category::Motor,
        Category::Trip,
        Category::Device,
        Category::Diagnostic,
        Category::Power,
        Category::Network,
        Category::System,
        Category::Tire,
        Category::Notification,
        Category::VwEup,
        Category::SmartFortwo,
        Category::MgZsEv,
        Category::NissanLeaf,
        Category::RenaultTwizy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Battery => "battery",
            Category::Charging => "charging",
            Category::Climate => "climate",
            Category::Door => "door",
            Category::Location => "location",
            Category::Motor => "motor",
            Category::Trip => "trip",
            Category::Device => "device",
            Category::Diagnostic => "diagnostic",
            Category::Power => "power",
            Category::Network => "network",
            Category::System => "system",
            Category::Tire => "tire",
            Category::Notification => "notification",
            Category::VwEup => "vw_eup",
            Category::SmartFortwo => "smart_fortwo",
            Category::MgZsEv => "mg_zs_ev",
            Category::NissanLeaf => "nissan_leaf",
            Category::RenaultTwizy => "renault_twizy",
        }
    }

    /// Look up a category by its label (case-insensitive).
    pub fn from_label(label: &str) -> Option<Category> {
        let lower = label.to_ascii_lowercase();
        Category::ALL.into_iter().find(|c| c.as_str() == lower)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of home-automation primitive a metric becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Sensor,
    BinarySensor,
    DeviceTracker,
    Switch,
}

impl EntityType {
    /// Entity-id domain (`sensor`, `binary_sensor`, ...).
    pub fn domain(&self) -> &'static str {
        match self {
            EntityType::Sensor => "sensor",
            EntityType::BinarySensor => "binary_sensor",
            EntityType::DeviceTracker => "device_tracker",
            EntityType::Switch => "switch",
        }
    }

    /// Binary sensors and switches carry on/off state.
    pub fn is_boolean(&self) -> bool {
        matches!(self, EntityType::BinarySensor | EntityType::Switch)
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.domain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.as_str()), Some(category));
        }
        assert_eq!(Category::from_label("Battery"), Some(Category::Battery));
        assert_eq!(Category::from_label("v"), None);
    }

    #[test]
    fn test_serde_labels() {
        let json = serde_json::to_string(&Category::MgZsEv).unwrap();
        assert_eq!(json, "\"mg_zs_ev\"");
        let json = serde_json::to_string(&EntityType::BinarySensor).unwrap();
        assert_eq!(json, "\"binary_sensor\"");
    }

    #[test]
    fn test_entity_domain() {
        assert_eq!(EntityType::DeviceTracker.domain(), "device_tracker");
        assert!(EntityType::Switch.is_boolean());
        assert!(!EntityType::Sensor.is_boolean());
    }
}
