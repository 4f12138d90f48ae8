//! Topic classification: topic string → metric path, branch and entity type.

use serde::Serialize;

use crate::blacklist::Blacklist;
use crate::catalog::MetricCatalog;
use crate::category::EntityType;
use crate::error::Rejected;
use crate::topic::TopicStructure;

/// Which subtree under the vehicle base a topic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicBranch {
    Metric,
    Notification,
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedTopic {
    pub vehicle_id: String,
    /// Dotted path, e.g. `v.b.soc`, `notify.alert.charge.stopped`, `status`
    pub metric_path: String,
    pub branch: TopicBranch,
    pub entity_type: EntityType,
}

pub fn classify(
    topic: &str,
    structure: &TopicStructure,
    vehicle_id: &str,
    catalog: &MetricCatalog,
    blacklist: &Blacklist,
) -> Result<ClassifiedTopic, Rejected> {
    let rest = structure
        .strip_base(topic, vehicle_id)
        .ok_or_else(|| Rejected::NotOvmsTopic(topic.to_string()))?;

    if is_non_metric(rest) {
        tracing::trace!("classifier: skipping non-metric topic {}", topic);
        return Err(Rejected::NotAMetricTopic(topic.to_string()));
    }

    if let Some(pattern) = blacklist.find(topic) {
        tracing::debug!("classifier: {} blacklisted by '{}'", topic, pattern);
        return Err(Rejected::Blacklisted(pattern.to_string()));
    }

    let (branch, metric_path) = if rest == "status" {
        (TopicBranch::Status, "status".to_string())
    } else if let Some(notify) = rest.strip_prefix("notify/") {
        (TopicBranch::Notification, format!("notify.{}", to_dotted(notify)))
    } else {
        let path = rest.strip_prefix("metric/").unwrap_or(rest);
        (TopicBranch::Metric, to_dotted(path))
    };

    if metric_path.is_empty() || metric_path == "notify." {
        return Err(Rejected::NotAMetricTopic(topic.to_string()));
    }

    if let Some(pattern) = blacklist.find(&metric_path) {
        tracing::debug!("classifier: {} blacklisted by '{}'", metric_path, pattern);
        return Err(Rejected::Blacklisted(pattern.to_string()));
    }

    let entity_type = match branch {
        TopicBranch::Status => EntityType::BinarySensor,
        TopicBranch::Notification => EntityType::Sensor,
        TopicBranch::Metric => catalog.entity_type_hint(&metric_path),
    };

    Ok(ClassifiedTopic {
        vehicle_id: vehicle_id.to_string(),
        metric_path,
        branch,
        entity_type,
    })
}

/// Command/response, client and event traffic never becomes an entity.
fn is_non_metric(rest: &str) -> bool {
    rest.is_empty()
        || rest == "client"
        || rest.starts_with("client/")
        || rest == "event"
        || rest.ends_with("/event")
        || rest == "metric"
        || rest == "notify"
}

/// `v/b/soc` → `v.b.soc`; empty segments are dropped.
fn to_dotted(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VehicleModel;

    fn classify_default(topic: &str) -> Result<ClassifiedTopic, Rejected> {
        let structure = TopicStructure::with_username("alice").unwrap();
        let catalog = MetricCatalog::load(None);
        classify(topic, &structure, "car1", &catalog, &Blacklist::default())
    }

    #[test]
    fn test_metric_topic() {
        let c = classify_default("ovms/alice/car1/metric/v/b/soc").unwrap();
        assert_eq!(c.metric_path, "v.b.soc");
        assert_eq!(c.branch, TopicBranch::Metric);
        assert_eq!(c.entity_type, EntityType::Sensor);
        assert_eq!(c.vehicle_id, "car1");

        let c = classify_default("ovms/alice/car1/metric/v/d/fl").unwrap();
        assert_eq!(c.entity_type, EntityType::BinarySensor);
    }

    #[test]
    fn test_command_traffic_rejected() {
        assert_eq!(
            classify_default("ovms/alice/car1/client/rr/command/abc123"),
            Err(Rejected::NotAMetricTopic(
                "ovms/alice/car1/client/rr/command/abc123".to_string()
            ))
        );
        assert!(matches!(
            classify_default("ovms/alice/car1/client/rr/response/abc123"),
            Err(Rejected::NotAMetricTopic(_))
        ));
        assert!(matches!(
            classify_default("ovms/alice/car1/client/web/active"),
            Err(Rejected::NotAMetricTopic(_))
        ));
        assert!(matches!(
            classify_default("ovms/alice/car1/metric/v/e/event"),
            Err(Rejected::NotAMetricTopic(_))
        ));
    }

    #[test]
    fn test_foreign_topic() {
        assert!(matches!(
            classify_default("zigbee2mqtt/lamp/state"),
            Err(Rejected::NotOvmsTopic(_))
        ));
        assert!(matches!(
            classify_default("ovms/alice/car2/metric/v/b/soc"),
            Err(Rejected::NotOvmsTopic(_))
        ));
    }

    #[test]
    fn test_alternate_username() {
        let c = classify_default("ovms/bob/car1/metric/v/b/soc").unwrap();
        assert_eq!(c.metric_path, "v.b.soc");
    }

    #[test]
    fn test_notify_and_status() {
        let c = classify_default("ovms/alice/car1/notify/alert/charge.stopped").unwrap();
        assert_eq!(c.branch, TopicBranch::Notification);
        assert_eq!(c.metric_path, "notify.alert.charge.stopped");
        assert_eq!(c.entity_type, EntityType::Sensor);

        let c = classify_default("ovms/alice/car1/status").unwrap();
        assert_eq!(c.branch, TopicBranch::Status);
        assert_eq!(c.entity_type, EntityType::BinarySensor);
    }

    #[test]
    fn test_blacklist() {
        let structure = TopicStructure::with_username("alice").unwrap();
        let catalog = MetricCatalog::load(None);
        let bl = Blacklist::new(["v.b.c", "debug/"]).unwrap();

        assert_eq!(
            classify("ovms/alice/car1/metric/v/b/c/voltage", &structure, "car1", &catalog, &bl),
            Err(Rejected::Blacklisted("v.b.c".to_string()))
        );
        assert_eq!(
            classify("ovms/alice/car1/metric/debug/x", &structure, "car1", &catalog, &bl),
            Err(Rejected::Blacklisted("debug/".to_string()))
        );
        assert!(classify("ovms/alice/car1/metric/v/b/soc", &structure, "car1", &catalog, &bl).is_ok());
    }

    #[test]
    fn test_model_entity_hint() {
        let structure = TopicStructure::with_username("alice").unwrap();
        let catalog = MetricCatalog::load(Some(VehicleModel::NissanLeaf));
        let c = classify(
            "ovms/alice/car1/metric/xnl/v/c/quick",
            &structure,
            "car1",
            &catalog,
            &Blacklist::default(),
        )
        .unwrap();
        assert_eq!(c.entity_type, EntityType::BinarySensor);
    }

    #[test]
    fn test_unknown_metric_still_sensor() {
        let c = classify_default("ovms/alice/car1/metric/zz/new/thing").unwrap();
        assert_eq!(c.metric_path, "zz.new.thing");
        assert_eq!(c.entity_type, EntityType::Sensor);
    }
}
