//! MQTT client loop: subscribes to the vehicle base and the service topic
//! and feeds the bridge.

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::task::JoinHandle;

use crate::bridge::OvmsBridge;
use crate::command::CommandPublisher;
use crate::config::Config;
use crate::error::{CommandError, CommandResult};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Command publisher backed by the rumqttc client.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
    qos: QoS,
}

impl MqttPublisher {
    pub fn new(client: AsyncClient, qos: QoS) -> Self {
        Self { client, qos }
    }
}

impl CommandPublisher for MqttPublisher {
    async fn publish(&self, topic: String, payload: String) -> CommandResult<()> {
        self.client
            .publish(topic, self.qos, false, payload)
            .await
            .map_err(|e| CommandError::Publish(e.to_string()))
    }
}

pub fn qos(level: u8) -> QoS {
    match level {
        0 => QoS::AtMostOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtLeastOnce,
    }
}

pub fn mqtt_options(config: &Config) -> MqttOptions {
    let mut opts = MqttOptions::new(config.client_id(), config.mqtt.host.clone(), config.mqtt.port);
    opts.set_keep_alive(Duration::from_secs(config.mqtt.keep_alive_secs.max(5)));
    if let Some(username) = &config.mqtt.username {
        opts.set_credentials(username.clone(), config.mqtt.password.clone().unwrap_or_default());
    }
    opts
}

pub fn connect(config: &Config) -> (AsyncClient, EventLoop) {
    AsyncClient::new(mqtt_options(config), 64)
}

/// Drive the event loop and dispatch publishes to the bridge.
///
/// Subscribes again on every ConnAck so a broker restart does not lose
/// the subscriptions. Service requests run on their own task because they
/// wait for a response that arrives through this same loop.
pub fn start_mqtt(
    bridge: Arc<OvmsBridge<MqttPublisher>>,
    client: AsyncClient,
    mut eventloop: EventLoop,
    subscriptions: Vec<String>,
    qos: QoS,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    for subscription in &subscriptions {
                        match client.try_subscribe(subscription.as_str(), qos) {
                            Ok(()) => tracing::info!("MQTT connected, subscribed to {}", subscription),
                            Err(e) => tracing::error!("MQTT subscribe {} failed: {}", subscription, e),
                        }
                    }
                }
                Ok(event) => {
                    if let Some((topic, payload)) = extract_publish(&event) {
                        if bridge.is_service_topic(&topic) {
                            spawn_service_request(bridge.clone(), payload);
                        } else if bridge.is_ovms_topic(&topic) {
                            bridge.process_message(&topic, &payload);
                        } else {
                            tracing::trace!("MQTT ignoring {}", topic);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("MQTT connection error, reconnecting: {}", e);
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    })
}

fn spawn_service_request(bridge: Arc<OvmsBridge<MqttPublisher>>, payload: Vec<u8>) {
    tokio::spawn(async move {
        match bridge.handle_service_request(&payload).await {
            Ok(response) => tracing::info!(
                "service: '{}' answered ({})",
                response.command,
                response.command_id
            ),
            Err(e) => tracing::warn!("service: request failed: {}", e),
        }
    });
}

/// Extract topic and payload from an incoming publish.
fn extract_publish(event: &Event) -> Option<(String, Vec<u8>)> {
    match event {
        Event::Incoming(Packet::Publish(publish)) => {
            Some((publish.topic.clone(), publish.payload.to_vec()))
        }
        _ => None,
    }
}
