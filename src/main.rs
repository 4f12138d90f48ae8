use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use ovms_bridge::bridge::OvmsBridge;
use ovms_bridge::command::{CommandChannel, PENDING_MAX_AGE};
use ovms_bridge::config::Config;
use ovms_bridge::mqtt::{self, MqttPublisher};
use ovms_bridge::state::StateStore;

const STALE_CHECK_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ovms_bridge=debug")),
        )
        .init();

    tracing::info!("Starting ovms-bridge v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    let vehicle_id = config.vehicle_id()?.to_string();
    let structure = config.topic_structure()?;

    let engine = Arc::new(config.build_engine()?);
    tracing::info!(
        "Vehicle {} ({}), {} catalog entries, {} blacklist patterns",
        vehicle_id,
        engine
            .catalog()
            .model()
            .map(|m| m.display_name())
            .unwrap_or("generic"),
        engine.catalog().len(),
        config.blacklist()?.len()
    );

    let state = Arc::new(StateStore::new(4096));

    let qos = mqtt::qos(config.mqtt.qos);
    let (client, eventloop) = mqtt::connect(&config);
    let commands = Arc::new(CommandChannel::new(
        MqttPublisher::new(client.clone(), qos),
        structure.clone(),
        vehicle_id.clone(),
        config.command_timeout(),
    ));

    let service_topic = config.service_topic()?;
    let bridge = Arc::new(
        OvmsBridge::new(engine, state.clone(), commands.clone()).with_service_topic(service_topic.clone()),
    );

    let subscription = structure.subscription(&vehicle_id);
    tracing::info!(
        "Connecting to {}:{} for {}, services on {}",
        config.mqtt.host,
        config.mqtt.port,
        subscription,
        service_topic
    );
    let mqtt_handle = mqtt::start_mqtt(
        bridge.clone(),
        client.clone(),
        eventloop,
        vec![subscription, service_topic],
        qos,
    );

    let cleanup_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            commands.cleanup(PENDING_MAX_AGE);
        }
    });

    let stale_handle = config.stale_after().map(|max_age| {
        tracing::info!("Purging entities unavailable for {}h", max_age.num_hours());
        let bridge = bridge.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(STALE_CHECK_INTERVAL);
            loop {
                interval.tick().await;
                for entity_id in bridge.purge_stale(max_age) {
                    tracing::debug!("Removed stale entity {}", entity_id);
                }
            }
        })
    });

    let mut events = state.subscribe();
    let event_handle = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    tracing::debug!("{} = {}", event.entity_id, event.new_state.state);
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("State event listener lagged by {} events", n);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!(
        "Shutting down, {} entities from {} metrics",
        state.len(),
        bridge.metric_count()
    );

    if let Err(e) = client.disconnect().await {
        tracing::debug!("MQTT disconnect: {}", e);
    }
    mqtt_handle.abort();
    cleanup_handle.abort();
    event_handle.abort();
    if let Some(handle) = stale_handle {
        handle.abort();
    }

    Ok(())
}
