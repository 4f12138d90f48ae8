//! Bridge configuration: `ovms.yaml` plus `OVMS_*` environment overrides.
//!
//! ```yaml
//! mqtt:
//!   host: broker.local
//!   port: 1883
//!   username: alice
//!   password: secret
//! topic:
//!   prefix: ovms
//!   structure: "{prefix}/{mqtt_username}/{vehicle_id}"
//! vehicle:
//!   id: car1
//!   model: nissan_leaf
//! blacklist:
//!   - "xnl.v.b.cell"
//! command_timeout_secs: 10
//! service_topic: "ovms-bridge/car1/service"
//! stale_after_hours: 24
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::blacklist::{Blacklist, DEFAULT_BLACKLIST};
use crate::catalog::{MetricCatalog, VehicleModel};
use crate::error::{ConfigError, ConfigResult};
use crate::message::Engine;
use crate::topic::{TopicStructure, DEFAULT_PREFIX, DEFAULT_TEMPLATE};

pub const DEFAULT_CONFIG_PATH: &str = "ovms.yaml";
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mqtt: MqttSettings,
    pub topic: TopicSettings,
    pub vehicle: VehicleSettings,
    /// Extra substrings to ignore, on top of the defaults
    pub blacklist: Vec<String>,
    pub use_default_blacklist: Option<bool>,
    pub command_timeout_secs: Option<u64>,
    /// Topic carrying JSON service requests; defaults to
    /// `ovms-bridge/<vehicle_id>/service`
    pub service_topic: Option<String>,
    /// Purge entities unavailable this long; unset disables the purge
    pub stale_after_hours: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: Option<String>,
    pub keep_alive_secs: u64,
    pub qos: u8,
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            username: None,
            password: None,
            client_id: None,
            keep_alive_secs: 30,
            qos: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TopicSettings {
    pub prefix: String,
    pub structure: String,
    /// Username inside the topic; defaults to the broker username
    pub mqtt_username: Option<String>,
}

impl Default for TopicSettings {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            structure: DEFAULT_TEMPLATE.to_string(),
            mqtt_username: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VehicleSettings {
    pub id: Option<String>,
    pub model: Option<String>,
}

impl Config {
    /// Load from `$OVMS_CONFIG` (or `ovms.yaml`) and apply the environment.
    ///
    /// A missing default file is not an error; a missing `$OVMS_CONFIG` is.
    pub fn load() -> ConfigResult<Self> {
        let explicit = std::env::var("OVMS_CONFIG").ok().map(PathBuf::from);
        let path = explicit
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = if explicit.is_some() || path.exists() {
            tracing::info!("Loading configuration from {}", path.display());
            Self::from_path(&path)?
        } else {
            tracing::info!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> ConfigResult<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(contents)?;
        Ok(config)
    }

    /// Apply `OVMS_*` overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        if let Some(host) = lookup("OVMS_MQTT_HOST") {
            self.mqtt.host = host;
        }
        if let Some(port) = lookup("OVMS_MQTT_PORT") {
            self.mqtt.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "OVMS_MQTT_PORT",
                value: port.clone(),
            })?;
        }
        if let Some(username) = lookup("OVMS_MQTT_USERNAME") {
            self.mqtt.username = Some(username);
        }
        if let Some(password) = lookup("OVMS_MQTT_PASSWORD") {
            self.mqtt.password = Some(password);
        }
        if let Some(vehicle_id) = lookup("OVMS_VEHICLE_ID") {
            self.vehicle.id = Some(vehicle_id);
        }
        if let Some(prefix) = lookup("OVMS_TOPIC_PREFIX") {
            self.topic.prefix = prefix;
        }
        if let Some(model) = lookup("OVMS_VEHICLE_MODEL") {
            self.vehicle.model = Some(model);
        }
        if let Some(hours) = lookup("OVMS_STALE_AFTER_HOURS") {
            self.stale_after_hours = Some(hours.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "OVMS_STALE_AFTER_HOURS",
                value: hours.clone(),
            })?);
        }
        Ok(())
    }

    /// Check everything the runtime will need, once.
    pub fn validate(&self) -> ConfigResult<()> {
        self.vehicle_id()?;
        self.vehicle_model()?;
        self.topic_structure()?;
        if self.mqtt.host.trim().is_empty() {
            return Err(ConfigError::Missing("mqtt.host"));
        }
        if self.mqtt.qos > 2 {
            return Err(ConfigError::InvalidValue {
                field: "mqtt.qos",
                value: self.mqtt.qos.to_string(),
            });
        }
        if self.stale_after_hours == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "stale_after_hours",
                value: "0".to_string(),
            });
        }
        if let Some(topic) = &self.service_topic {
            if topic.trim().is_empty() || topic.contains(['+', '#']) {
                return Err(ConfigError::InvalidValue {
                    field: "service_topic",
                    value: topic.clone(),
                });
            }
        }
        if self.command_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "command_timeout_secs",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn vehicle_id(&self) -> ConfigResult<&str> {
        self.vehicle
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::Missing("vehicle.id"))
    }

    pub fn vehicle_model(&self) -> ConfigResult<Option<VehicleModel>> {
        match self.vehicle.model.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(model) => model.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
                field: "vehicle.model",
                value: model.to_string(),
            }),
        }
    }

    /// Username that appears in topics.
    pub fn topic_username(&self) -> &str {
        self.topic
            .mqtt_username
            .as_deref()
            .or(self.mqtt.username.as_deref())
            .unwrap_or("")
    }

    pub fn topic_structure(&self) -> ConfigResult<TopicStructure> {
        TopicStructure::new(
            self.topic.structure.clone(),
            self.topic.prefix.clone(),
            self.topic_username(),
        )
    }

    pub fn blacklist(&self) -> ConfigResult<Blacklist> {
        let defaults: &[&str] = if self.use_default_blacklist.unwrap_or(true) {
            DEFAULT_BLACKLIST
        } else {
            &[]
        };
        let blacklist = Blacklist::new(
            defaults
                .iter()
                .map(|s| s.to_string())
                .chain(self.blacklist.iter().cloned()),
        )?;
        Ok(blacklist)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS))
    }

    pub fn service_topic(&self) -> ConfigResult<String> {
        match &self.service_topic {
            Some(topic) => Ok(topic.trim().to_string()),
            None => Ok(format!("ovms-bridge/{}/service", self.vehicle_id()?)),
        }
    }

    pub fn stale_after(&self) -> Option<chrono::Duration> {
        self.stale_after_hours
            .and_then(|h| i64::try_from(h).ok())
            .and_then(chrono::Duration::try_hours)
    }

    /// MQTT client id; derived from the vehicle id when not configured.
    pub fn client_id(&self) -> String {
        match &self.mqtt.client_id {
            Some(id) if !id.trim().is_empty() => id.clone(),
            _ => format!("ovms-bridge-{}", self.vehicle.id.as_deref().unwrap_or("unknown")),
        }
    }

    pub fn build_engine(&self) -> ConfigResult<Engine> {
        let catalog = MetricCatalog::load(self.vehicle_model()?);
        Ok(Engine::new(
            catalog,
            self.blacklist()?,
            self.topic_structure()?,
            self.vehicle_id()?,
        ))
    }
}
