//! Topic structure for a vehicle module.
//!
//! OVMS publishes under a configurable base:
//! - `{prefix}/{mqtt_username}/{vehicle_id}` (default)
//! - `{prefix}/client/{vehicle_id}`
//! - `{prefix}/{vehicle_id}`
//!
//! Under the base:
//! - `metric/<path>`               metric values, `/` separated
//! - `notify/<kind>/<subject>`     transient notifications
//! - `status`                      module online status
//! - `client/rr/command/<id>`      commands we send
//! - `client/rr/response/<id>`     responses to our commands

use crate::error::{ConfigError, ConfigResult};

pub const DEFAULT_PREFIX: &str = "ovms";
pub const DEFAULT_TEMPLATE: &str = "{prefix}/{mqtt_username}/{vehicle_id}";

pub const TEMPLATE_PRESETS: &[&str] = &[
    DEFAULT_TEMPLATE,
    "{prefix}/client/{vehicle_id}",
    "{prefix}/{vehicle_id}",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicStructure {
    template: String,
    prefix: String,
    username: String,
}

impl TopicStructure {
    /// Validate a template. `{vehicle_id}` is mandatory; `{mqtt_username}`
    /// requires a username.
    pub fn new(
        template: impl Into<String>,
        prefix: impl Into<String>,
        username: impl Into<String>,
    ) -> ConfigResult<Self> {
        let template = template.into();
        let prefix = prefix.into().trim_matches('/').to_string();
        let username = username.into();

        let invalid = |reason: &str| ConfigError::InvalidTemplate {
            template: template.clone(),
            reason: reason.to_string(),
        };

        if !template.contains("{vehicle_id}") {
            return Err(invalid("missing {vehicle_id}"));
        }
        if template.contains("{mqtt_username}") && username.trim().is_empty() {
            return Err(invalid("{mqtt_username} used but no username configured"));
        }
        if template.contains("{prefix}") && prefix.is_empty() {
            return Err(invalid("{prefix} used but prefix is empty"));
        }
        if template.contains('#') || template.contains('+') {
            return Err(invalid("wildcards are not allowed"));
        }

        Ok(Self {
            template,
            prefix,
            username,
        })
    }

    /// The default layout for a broker username.
    pub fn with_username(username: impl Into<String>) -> ConfigResult<Self> {
        Self::new(DEFAULT_TEMPLATE, DEFAULT_PREFIX, username)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Topic base for a vehicle, without trailing slash.
    pub fn base(&self, vehicle_id: &str) -> String {
        self.template
            .replace("{prefix}", &self.prefix)
            .replace("{mqtt_username}", &self.username)
            .replace("{vehicle_id}", vehicle_id)
            .trim_end_matches('/')
            .to_string()
    }

    /// Wildcard subscription covering everything the vehicle publishes.
    pub fn subscription(&self, vehicle_id: &str) -> String {
        format!("{}/#", self.base(vehicle_id))
    }

    pub fn command_topic(&self, vehicle_id: &str, command_id: &str) -> String {
        format!("{}/client/rr/command/{}", self.base(vehicle_id), command_id)
    }

    pub fn response_topic(&self, vehicle_id: &str, command_id: &str) -> String {
        format!("{}/client/rr/response/{}", self.base(vehicle_id), command_id)
    }

    /// Wildcard for responses to our commands.
    pub fn response_subscription(&self, vehicle_id: &str) -> String {
        format!("{}/client/rr/response/#", self.base(vehicle_id))
    }

    /// Part of `topic` below the vehicle base.
    ///
    /// Falls back to any `<prefix>/.../<vehicle_id>/...` layout so modules
    /// publishing under a different username are still recognised.
    pub fn strip_base<'t>(&self, topic: &'t str, vehicle_id: &str) -> Option<&'t str> {
        let base = self.base(vehicle_id);
        if let Some(rest) = topic.strip_prefix(base.as_str()) {
            if let Some(rest) = rest.strip_prefix('/') {
                return Some(rest);
            }
            if rest.is_empty() {
                return Some(rest);
            }
        }

        let under_prefix = topic.strip_prefix(self.prefix.as_str())?.strip_prefix('/')?;
        let marker = format!("{}/", vehicle_id);
        let mut offset = 0;
        for segment in under_prefix.split('/') {
            let start = offset;
            offset += segment.len() + 1;
            if segment == vehicle_id {
                let rest = &under_prefix[start..];
                return rest.strip_prefix(marker.as_str());
            }
        }
        None
    }

    /// Response id from a `client/rr/response/<id>` topic.
    pub fn response_id<'t>(&self, topic: &'t str, vehicle_id: &str) -> Option<&'t str> {
        let rest = self.strip_base(topic, vehicle_id)?;
        rest.strip_prefix("client/rr/response/")
            .filter(|id| !id.is_empty() && !id.contains('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_structure() -> TopicStructure {
        TopicStructure::with_username("alice").unwrap()
    }

    #[test]
    fn test_base_and_subscription() {
        let s = default_structure();
        assert_eq!(s.base("car1"), "ovms/alice/car1");
        assert_eq!(s.subscription("car1"), "ovms/alice/car1/#");

        let s = TopicStructure::new("{prefix}/client/{vehicle_id}", "ovms", "").unwrap();
        assert_eq!(s.base("car1"), "ovms/client/car1");

        let s = TopicStructure::new("{prefix}/{vehicle_id}", "fleet/", "").unwrap();
        assert_eq!(s.base("car1"), "fleet/car1");
    }

    #[test]
    fn test_invalid_templates() {
        assert!(matches!(
            TopicStructure::new("{prefix}/{mqtt_username}", "ovms", "alice"),
            Err(ConfigError::InvalidTemplate { .. })
        ));
        assert!(TopicStructure::new(DEFAULT_TEMPLATE, "ovms", "").is_err());
        assert!(TopicStructure::new("{prefix}/+/{vehicle_id}", "ovms", "a").is_err());
    }

    #[test]
    fn test_command_topics() {
        let s = default_structure();
        assert_eq!(
            s.command_topic("car1", "abc12345"),
            "ovms/alice/car1/client/rr/command/abc12345"
        );
        assert_eq!(
            s.response_topic("car1", "abc12345"),
            "ovms/alice/car1/client/rr/response/abc12345"
        );
        assert_eq!(
            s.response_id("ovms/alice/car1/client/rr/response/abc12345", "car1"),
            Some("abc12345")
        );
        assert_eq!(s.response_id("ovms/alice/car1/metric/v/b/soc", "car1"), None);
    }

    #[test]
    fn test_strip_base() {
        let s = default_structure();
        assert_eq!(s.strip_base("ovms/alice/car1/metric/v/b/soc", "car1"), Some("metric/v/b/soc"));
        assert_eq!(s.strip_base("ovms/alice/car1", "car1"), Some(""));
        // alternate username
        assert_eq!(s.strip_base("ovms/bob/car1/metric/v/b/soc", "car1"), Some("metric/v/b/soc"));
        // other vehicle, other prefix
        assert_eq!(s.strip_base("ovms/alice/car2/metric/v/b/soc", "car1"), None);
        assert_eq!(s.strip_base("other/alice/car1/metric/v/b/soc", "car1"), None);
        // no partial segment match
        assert_eq!(s.strip_base("ovms/alice/car10/metric/v/b/soc", "car1"), None);
    }
}
