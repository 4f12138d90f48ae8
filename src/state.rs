//! Last-value-wins entity state store with change events.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// State string of an entity with no usable value.
pub const UNAVAILABLE: &str = "unavailable";

/// Current state of one bridged entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    /// Last time `state` changed
    pub last_changed: DateTime<Utc>,
    /// Last time `state` or `attributes` changed
    pub last_updated: DateTime<Utc>,
    /// Last time any message arrived, changed or not
    pub last_reported: DateTime<Utc>,
    pub context: Context,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub id: String,
    /// MQTT topic the update came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_topic: Option<String>,
}

impl Context {
    pub fn new(source_topic: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_topic,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StateChangedEvent {
    pub entity_id: String,
    pub old_state: Option<EntityState>,
    pub new_state: EntityState,
}

/// Counters for store operations
#[derive(Debug, Default)]
pub struct StoreCounters {
    /// Every `set` call
    pub updates: AtomicU64,
    /// `set` calls that changed state or attributes
    pub changes: AtomicU64,
    pub removals: AtomicU64,
}

pub struct StateStore {
    states: Arc<DashMap<String, EntityState>>,
    event_tx: broadcast::Sender<StateChangedEvent>,
    pub counters: StoreCounters,
}

impl StateStore {
    pub fn new(channel_capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(channel_capacity);
        Self {
            states: Arc::new(DashMap::new()),
            event_tx,
            counters: StoreCounters::default(),
        }
    }

    pub fn get_all(&self) -> Vec<EntityState> {
        let mut all: Vec<EntityState> = self
            .states
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        all
    }

    pub fn get(&self, entity_id: &str) -> Option<EntityState> {
        self.states.get(entity_id).map(|entry| entry.value().clone())
    }

    /// Store the latest value for an entity.
    ///
    /// Fires a change event only when the state or attributes differ from
    /// the stored ones; repeated identical reports just bump `last_reported`.
    pub fn set(
        &self,
        entity_id: String,
        state: String,
        attributes: Map<String, Value>,
        source_topic: Option<String>,
    ) -> EntityState {
        let now = Utc::now();
        self.counters.updates.fetch_add(1, Ordering::Relaxed);

        let old_state = self.states.get(&entity_id).map(|e| e.value().clone());

        let (last_changed, last_updated, changed) = match &old_state {
            Some(prev) => {
                let state_changed = prev.state != state;
                let changed = state_changed || prev.attributes != attributes;
                (
                    if state_changed { now } else { prev.last_changed },
                    if changed { now } else { prev.last_updated },
                    changed,
                )
            }
            None => (now, now, true),
        };

        let new_state = EntityState {
            entity_id: entity_id.clone(),
            state,
            attributes,
            last_changed,
            last_updated,
            last_reported: now,
            context: Context::new(source_topic),
        };

        self.states.insert(entity_id.clone(), new_state.clone());

        if changed {
            self.counters.changes.fetch_add(1, Ordering::Relaxed);
            // no subscribers is fine
            let _ = self.event_tx.send(StateChangedEvent {
                entity_id,
                old_state,
                new_state: new_state.clone(),
            });
        }

        new_state
    }

    /// Remove an entity. Returns true if it existed.
    pub fn remove(&self, entity_id: &str) -> bool {
        let existed = self.states.remove(entity_id).is_some();
        if existed {
            self.counters.removals.fetch_add(1, Ordering::Relaxed);
        }
        existed
    }

    /// Remove entities that have been `unavailable` for at least `max_age`.
    /// Returns the removed ids, sorted.
    pub fn purge_stale(&self, max_age: chrono::Duration) -> Vec<String> {
        let now = Utc::now();
        let mut stale: Vec<String> = self
            .states
            .iter()
            .filter(|e| e.state == UNAVAILABLE && now - e.last_updated >= max_age)
            .map(|e| e.key().clone())
            .collect();
        stale.sort();

        stale.retain(|entity_id| {
            // a fresh value may have landed since the scan
            self.states
                .remove_if(entity_id, |_, s| s.state == UNAVAILABLE && now - s.last_updated >= max_age)
                .is_some()
        });
        if !stale.is_empty() {
            self.counters
                .removals
                .fetch_add(stale.len() as u64, Ordering::Relaxed);
            tracing::info!("state: purged {} stale entities", stale.len());
        }
        stale
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChangedEvent> {
        self.event_tx.subscribe()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(1024)
    }
}
