//! Request/response command channel.
//!
//! A command is published to `<base>/client/rr/command/<id>`; the module
//! answers on `<base>/client/rr/response/<id>`. Ids are eight hex characters
//! and each pending command waits on a oneshot until its response arrives or
//! the timeout expires.

use std::future::Future;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::{CommandError, CommandResult};
use crate::topic::TopicStructure;

/// Pending entries older than this are dropped by [`CommandChannel::cleanup`].
pub const PENDING_MAX_AGE: Duration = Duration::from_secs(300);

/// Publishes a command payload. Implemented for the MQTT client in
/// [`crate::mqtt`].
pub trait CommandPublisher: Send + Sync {
    fn publish(&self, topic: String, payload: String) -> impl Future<Output = CommandResult<()>> + Send;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    fn parse(raw: String) -> Self {
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(v) if v.is_object() || v.is_array() => ResponseBody::Json(v),
            _ => ResponseBody::Text(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResponse {
    pub command_id: String,
    pub command: String,
    pub body: ResponseBody,
}

struct PendingCommand {
    tx: oneshot::Sender<String>,
    created: Instant,
}

pub struct CommandChannel<P> {
    publisher: P,
    structure: TopicStructure,
    vehicle_id: String,
    timeout: Duration,
    pending: DashMap<String, PendingCommand>,
}

impl<P: CommandPublisher> CommandChannel<P> {
    pub fn new(publisher: P, structure: TopicStructure, vehicle_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            publisher,
            structure,
            vehicle_id: vehicle_id.into(),
            timeout,
            pending: DashMap::new(),
        }
    }

    /// Send `<command> <parameters>` and wait for the response.
    pub async fn send(&self, command: &str, parameters: Option<&str>) -> CommandResult<CommandResponse> {
        let command_id = self.next_id();
        let payload = match parameters.map(str::trim).filter(|p| !p.is_empty()) {
            Some(params) => format!("{} {}", command.trim(), params),
            None => command.trim().to_string(),
        };

        let (tx, rx) = oneshot::channel();
        self.pending.insert(
            command_id.clone(),
            PendingCommand {
                tx,
                created: Instant::now(),
            },
        );

        let topic = self.structure.command_topic(&self.vehicle_id, &command_id);
        tracing::debug!("command: {} -> {} ({})", command_id, payload, topic);

        if let Err(e) = self.publisher.publish(topic, payload.clone()).await {
            self.pending.remove(&command_id);
            return Err(e);
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(raw)) => Ok(CommandResponse {
                command_id,
                command: payload,
                body: ResponseBody::parse(raw),
            }),
            Ok(Err(_)) => Err(CommandError::Cancelled(command_id)),
            Err(_) => {
                self.pending.remove(&command_id);
                tracing::warn!("command: {} timed out after {:?}", command_id, self.timeout);
                Err(CommandError::Timeout {
                    command_id,
                    seconds: self.timeout.as_secs(),
                })
            }
        }
    }

    pub fn is_response_topic(&self, topic: &str) -> bool {
        self.structure.response_id(topic, &self.vehicle_id).is_some()
    }

    /// Deliver a response. Returns false when the topic is not a response
    /// topic; unknown and duplicate ids are consumed and dropped.
    pub fn handle_response(&self, topic: &str, payload: &[u8]) -> bool {
        let Some(command_id) = self.structure.response_id(topic, &self.vehicle_id) else {
            return false;
        };

        match self.pending.remove(command_id) {
            Some((_, pending)) => {
                let raw = String::from_utf8_lossy(payload).into_owned();
                if pending.tx.send(raw).is_err() {
                    tracing::debug!("command: {} caller gone before response", command_id);
                }
            }
            None => {
                tracing::debug!("command: dropping response for unknown or answered id {}", command_id);
            }
        }
        true
    }

    /// Drop pending commands older than `max_age`. Returns how many went.
    pub fn cleanup(&self, max_age: Duration) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, p| p.created.elapsed() < max_age);
        let removed = before.saturating_sub(self.pending.len());
        if removed > 0 {
            tracing::debug!("command: purged {} stale pending commands", removed);
        }
        removed
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn next_id(&self) -> String {
        loop {
            let id = new_command_id();
            if !self.pending.contains_key(&id) {
                return id;
            }
        }
    }
}

/// Eight lowercase hex characters.
pub fn new_command_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
