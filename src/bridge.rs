//! OVMS bridge: routes one vehicle's MQTT traffic into the state store.
//!
//! Under the vehicle base:
//! - `client/rr/response/<id>`  → command channel
//! - `metric/...`, `notify/...`, `status` → engine → state store (+ tracker)
//! - anything else is skipped
//!
//! Service requests on the bridge's own service topic go the other way:
//! they become shell commands on the command channel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::category::{Category, EntityType};
use crate::command::{CommandChannel, CommandPublisher, CommandResponse};
use crate::entity::entity_update;
use crate::error::{CommandError, CommandResult, Rejected};
use crate::message::{Engine, ParsedMessage};
use crate::resolver::ResolutionSource;
use crate::service::{switch_command, switch_parameter, ServiceCall};
use crate::state::StateStore;
use crate::tracker::DeviceTracker;

/// A metric the bridge has turned into an entity.
#[derive(Debug, Clone)]
pub struct BridgedMetric {
    pub entity_id: String,
    pub metric_path: String,
    /// Topic the metric was first seen on
    pub topic: String,
    pub entity_type: EntityType,
    pub category: Category,
    pub category_source: ResolutionSource,
    pub first_seen: DateTime<Utc>,
    pub messages: u64,
}

pub struct OvmsBridge<P> {
    engine: Arc<Engine>,
    state: Arc<StateStore>,
    commands: Arc<CommandChannel<P>>,
    tracker: DeviceTracker,
    /// Known metrics keyed by entity id
    metrics: DashMap<String, BridgedMetric>,
    service_topic: Option<String>,
}

impl<P: CommandPublisher> OvmsBridge<P> {
    pub fn new(engine: Arc<Engine>, state: Arc<StateStore>, commands: Arc<CommandChannel<P>>) -> Self {
        Self {
            engine,
            state,
            commands,
            tracker: DeviceTracker::new(),
            metrics: DashMap::new(),
            service_topic: None,
        }
    }

    /// Accept service requests published on `topic`.
    pub fn with_service_topic(mut self, topic: impl Into<String>) -> Self {
        self.service_topic = Some(topic.into());
        self
    }

    pub fn service_topic(&self) -> Option<&str> {
        self.service_topic.as_deref()
    }

    pub fn is_service_topic(&self, topic: &str) -> bool {
        self.service_topic.as_deref() == Some(topic)
    }

    /// Decode and run one service request payload.
    pub async fn handle_service_request(&self, payload: &[u8]) -> CommandResult<CommandResponse> {
        let call = ServiceCall::from_json(payload)?;
        self.call_service(&call).await
    }

    pub async fn call_service(&self, call: &ServiceCall) -> CommandResult<CommandResponse> {
        tracing::debug!("service: {}", call.name());
        if let Some((entity_id, on)) = call.switch_target() {
            return self.set_switch(entity_id, on).await;
        }
        match call.shell_command() {
            Some(shell) => self.commands.send(&shell.command, shell.parameters.as_deref()).await,
            None => Err(CommandError::InvalidRequest(call.name().to_string())),
        }
    }

    /// Turn a bridged switch on or off.
    ///
    /// The entity shows the requested state once the module answers; a
    /// failed or timed-out command leaves it untouched.
    pub async fn set_switch(&self, entity_id: &str, on: bool) -> CommandResult<CommandResponse> {
        let (command, topic) = match self.metrics.get(entity_id) {
            Some(m) if m.entity_type == EntityType::Switch => {
                (switch_command(&m.topic, &m.metric_path), m.topic.clone())
            }
            _ => return Err(CommandError::UnknownSwitch(entity_id.to_string())),
        };

        tracing::debug!("ovms: switching {} {} via '{}'", entity_id, switch_parameter(on), command);
        let response = self.commands.send(&command, Some(switch_parameter(on))).await?;

        let attributes = self
            .state
            .get(entity_id)
            .map(|s| s.attributes)
            .unwrap_or_default();
        self.state.set(
            entity_id.to_string(),
            switch_parameter(on).to_string(),
            attributes,
            Some(topic),
        );
        Ok(response)
    }

    /// Drop entities that have been unavailable for `max_age`.
    pub fn purge_stale(&self, max_age: chrono::Duration) -> Vec<String> {
        let purged = self.state.purge_stale(max_age);
        for entity_id in &purged {
            self.metrics.remove(entity_id);
        }
        purged
    }

    /// Process one publish from the vehicle subscription.
    pub fn process_message(&self, topic: &str, payload: &[u8]) {
        if self.commands.handle_response(topic, payload) {
            return;
        }

        match self.engine.classify_and_parse(topic, payload) {
            Ok(msg) => self.apply(&msg),
            Err(Rejected::Blacklisted(pattern)) => {
                tracing::debug!("ovms: {} skipped (blacklist '{}')", topic, pattern);
            }
            Err(e) => {
                tracing::trace!("ovms: {} skipped ({})", topic, e);
            }
        }
    }

    /// Check if a topic belongs to the configured vehicle.
    pub fn is_ovms_topic(&self, topic: &str) -> bool {
        self.engine
            .structure()
            .strip_base(topic, self.engine.vehicle_id())
            .is_some()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn commands(&self) -> &Arc<CommandChannel<P>> {
        &self.commands
    }

    /// All bridged metrics, sorted by entity id.
    pub fn metrics(&self) -> Vec<BridgedMetric> {
        let mut all: Vec<BridgedMetric> = self.metrics.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        all
    }

    pub fn metric_count(&self) -> usize {
        self.metrics.len()
    }

    // ── Private handlers ─────────────────────────────────

    fn apply(&self, msg: &ParsedMessage) {
        let update = entity_update(msg);

        self.metrics
            .entry(update.entity_id.clone())
            .and_modify(|m| {
                m.messages += 1;
                m.category = msg.category;
                m.category_source = msg.category_source;
            })
            .or_insert_with(|| {
                tracing::info!(
                    "ovms: new {} {} ({}, {})",
                    msg.entity_type,
                    update.entity_id,
                    msg.category,
                    update.friendly_name
                );
                BridgedMetric {
                    entity_id: update.entity_id.clone(),
                    metric_path: msg.metric_path.clone(),
                    topic: msg.topic.clone(),
                    entity_type: msg.entity_type,
                    category: msg.category,
                    category_source: msg.category_source,
                    first_seen: Utc::now(),
                    messages: 1,
                }
            });

        if msg.value.is_unavailable() {
            tracing::debug!("ovms: {} unavailable (payload '{}')", update.entity_id, msg.raw_payload);
        }

        self.state
            .set(update.entity_id, update.state, update.attributes, Some(msg.topic.clone()));

        if let Some(tracker) = self.tracker.update(msg) {
            self.state
                .set(tracker.entity_id, tracker.state, tracker.attributes, Some(msg.topic.clone()));
        }
    }
}
