//! The classify-and-parse pipeline.
//!
//! [`Engine`] owns the read-only catalog, the blacklist and the topic
//! structure for one vehicle. It holds no mutable state, so one instance can
//! serve any number of tasks behind an `Arc`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::blacklist::Blacklist;
use crate::catalog::{DeviceClass, MetricCatalog, MetricDefinition, StateClass, Unit};
use crate::category::{Category, EntityType};
use crate::classifier::{classify, ClassifiedTopic, TopicBranch};
use crate::error::Rejected;
use crate::parser::{parse, ParseContext, TypedValue};
use crate::resolver::{resolve_category, CategoryResolution, ResolutionSource};
use crate::topic::TopicStructure;

/// One classified and parsed message. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedMessage {
    pub vehicle_id: String,
    pub topic: String,
    pub metric_path: String,
    pub raw_payload: String,
    pub branch: TopicBranch,
    pub category: Category,
    pub category_source: ResolutionSource,
    pub entity_type: EntityType,
    pub value: TypedValue,
    pub attributes: Map<String, Value>,
    /// Display name from the catalog, when the metric is known
    pub name: Option<&'static str>,
    pub unit: Unit,
    pub device_class: Option<DeviceClass>,
    pub state_class: Option<StateClass>,
    pub icon: Option<&'static str>,
}

pub struct Engine {
    catalog: MetricCatalog,
    blacklist: Blacklist,
    structure: TopicStructure,
    vehicle_id: String,
}

impl Engine {
    pub fn new(
        catalog: MetricCatalog,
        blacklist: Blacklist,
        structure: TopicStructure,
        vehicle_id: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            blacklist,
            structure,
            vehicle_id: vehicle_id.into(),
        }
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    pub fn structure(&self) -> &TopicStructure {
        &self.structure
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn classify(&self, topic: &str) -> Result<ClassifiedTopic, Rejected> {
        classify(topic, &self.structure, &self.vehicle_id, &self.catalog, &self.blacklist)
    }

    pub fn classify_and_parse(&self, topic: &str, payload: &[u8]) -> Result<ParsedMessage, Rejected> {
        let classified = self.classify(topic)?;
        let raw = String::from_utf8_lossy(payload).into_owned();

        let (resolution, definition) = match classified.branch {
            TopicBranch::Metric => {
                let resolution =
                    resolve_category(&self.catalog, &classified.metric_path, classified.entity_type);
                let definition = self
                    .catalog
                    .resolve(&classified.metric_path)
                    .map(|m| m.definition);
                (resolution, definition)
            }
            TopicBranch::Notification => (
                CategoryResolution {
                    category: Category::Notification,
                    source: ResolutionSource::CategoryLiteral,
                },
                None,
            ),
            TopicBranch::Status => (
                CategoryResolution {
                    category: Category::Diagnostic,
                    source: ResolutionSource::CategoryLiteral,
                },
                Some(&STATUS_DEFINITION),
            ),
        };

        let known = classified.branch == TopicBranch::Status
            || self.catalog.lookup(&classified.metric_path).is_some();

        let ctx = ParseContext {
            metric_path: &classified.metric_path,
            entity_type: classified.entity_type,
            category: resolution.category,
            definition,
        };
        let parsed = parse(&ctx, &raw);

        tracing::trace!(
            "ovms: {} -> {} {} = {}",
            classified.metric_path,
            classified.entity_type,
            resolution.category,
            parsed.value
        );

        Ok(ParsedMessage {
            vehicle_id: classified.vehicle_id,
            topic: topic.to_string(),
            metric_path: classified.metric_path,
            raw_payload: raw,
            branch: classified.branch,
            category: resolution.category,
            category_source: resolution.source,
            entity_type: classified.entity_type,
            value: parsed.value,
            attributes: parsed.attributes,
            // pattern definitions name the pattern, not the metric
            name: definition.filter(|_| known).map(|d| d.name),
            unit: definition.map(|d| d.unit).unwrap_or(Unit::None),
            device_class: definition.and_then(|d| d.device_class),
            state_class: definition.and_then(|d| d.state_class),
            icon: definition.and_then(|d| d.icon),
        })
    }
}

/// Module online status (`<base>/status`).
static STATUS_DEFINITION: MetricDefinition =
    MetricDefinition::binary("status", "Module Status", Category::Diagnostic)
        .class(DeviceClass::Connectivity);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VehicleModel;

    fn engine(model: Option<VehicleModel>) -> Engine {
        Engine::new(
            MetricCatalog::load(model),
            Blacklist::with_defaults().unwrap(),
            TopicStructure::with_username("alice").unwrap(),
            "car1",
        )
    }

    #[test]
    fn test_battery_soc() {
        let msg = engine(None)
            .classify_and_parse("ovms/alice/car1/metric/v/b/soc", b"87")
            .unwrap();
        assert_eq!(msg.entity_type, EntityType::Sensor);
        assert_eq!(msg.category, Category::Battery);
        assert_eq!(msg.value, TypedValue::Numeric(87.0));
        assert_eq!(msg.name, Some("State of Charge"));
        assert_eq!(msg.unit, Unit::Percent);
        assert_eq!(msg.device_class, Some(DeviceClass::Battery));
    }

    #[test]
    fn test_latitude_is_location() {
        let msg = engine(None)
            .classify_and_parse("ovms/alice/car1/metric/v/p/latitude", b"51.5074")
            .unwrap();
        assert_eq!(msg.category, Category::Location);
        assert_eq!(msg.entity_type, EntityType::Sensor);
        assert_eq!(msg.value, TypedValue::Numeric(51.5074));
    }

    #[test]
    fn test_odometer_is_trip() {
        let msg = engine(None)
            .classify_and_parse("ovms/alice/car1/metric/v/p/odometer", b"12345.6")
            .unwrap();
        assert_eq!(msg.category, Category::Trip);
        assert_eq!(msg.value, TypedValue::Numeric(12345.6));
    }

    #[test]
    fn test_command_topic_rejected() {
        let err = engine(None)
            .classify_and_parse("ovms/alice/car1/client/rr/command/abc123", b"stat")
            .unwrap_err();
        assert!(matches!(err, Rejected::NotAMetricTopic(_)));
    }

    #[test]
    fn test_blacklisted() {
        let err = engine(None)
            .classify_and_parse("ovms/alice/car1/metric/xrt/log/battery", b"1")
            .unwrap_err();
        assert!(matches!(err, Rejected::Blacklisted(_)));
    }

    #[test]
    fn test_notification() {
        let msg = engine(None)
            .classify_and_parse("ovms/alice/car1/notify/alert/charge.stopped", b"Charging stopped")
            .unwrap();
        assert_eq!(msg.category, Category::Notification);
        assert_eq!(msg.entity_type, EntityType::Sensor);
        assert_eq!(msg.value, TypedValue::Text("Charging stopped".to_string()));
    }

    #[test]
    fn test_status() {
        let msg = engine(None)
            .classify_and_parse("ovms/alice/car1/status", b"online")
            .unwrap();
        assert_eq!(msg.category, Category::Diagnostic);
        assert_eq!(msg.value, TypedValue::Boolean(true));
        assert_eq!(msg.device_class, Some(DeviceClass::Connectivity));
    }

    #[test]
    fn test_tire_pressure_message() {
        let msg = engine(None)
            .classify_and_parse("ovms/alice/car1/metric/v/t/pressure", b"206.8,216.4,210.2,218.5")
            .unwrap();
        assert_eq!(msg.category, Category::Tire);
        assert_eq!(msg.attributes["tire_rr"], 218.5);
    }

    #[test]
    fn test_vehicle_override_message() {
        let msg = engine(Some(VehicleModel::RenaultTwizy))
            .classify_and_parse("ovms/alice/car1/metric/v/e/throttle", b"42")
            .unwrap();
        assert_eq!(msg.category, Category::Motor);
        assert_eq!(msg.category_source, ResolutionSource::VehicleOverride);
    }

    #[test]
    fn test_pattern_match_has_no_catalog_name() {
        let msg = engine(None)
            .classify_and_parse("ovms/alice/car1/metric/v/d/sunroof", b"no")
            .unwrap();
        assert_eq!(msg.entity_type, EntityType::BinarySensor);
        assert_eq!(msg.name, None);
        assert_eq!(msg.device_class, Some(DeviceClass::Door));
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }
}
