//! MQTT feed consumer.
//!
//! Subscribes to every feedback topic and hands each publish to the
//! ingestor. Connection loss is handled with exponential backoff capped at
//! 30 seconds; subscriptions are re-established on every (re)connect.

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::BrokerConfig;
use crate::ingest::Ingestor;
use motor_core::fields::FieldKind;

pub async fn run_feed(broker: BrokerConfig, ingestor: Ingestor) {
    let mut options = MqttOptions::new(&broker.client_id, &broker.host, broker.port);
    options.set_keep_alive(Duration::from_secs(30));

    let (client, mut event_loop) = AsyncClient::new(options, 64);
    let mut failures: u32 = 0;

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                failures = 0;
                info!(host = %broker.host, port = broker.port, "connected to broker");
                subscribe_feedback_topics(&client).await;
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                ingestor
                    .handle_message(&publish.topic, &publish.payload)
                    .await;
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                warn!("broker sent disconnect");
            }
            Ok(event) => {
                debug!(?event, "feed event");
            }
            Err(e) => {
                failures += 1;
                let delay = reconnect_delay_secs(failures);
                warn!(error = %e, delay_secs = delay, "feed connection lost, backing off");
                sleep(Duration::from_secs(delay)).await;
            }
        }
    }
}

async fn subscribe_feedback_topics(client: &AsyncClient) {
    for field in FieldKind::ALL {
        if let Err(e) = client.subscribe(field.topic(), QoS::AtLeastOnce).await {
            warn!(topic = field.topic(), error = %e, "subscribe failed");
        }
    }
}

/// 1s, 2s, 4s, ... capped at 30s.
fn reconnect_delay_secs(failures: u32) -> u64 {
    let exponent = failures.saturating_sub(1).min(5);
    std::cmp::min(1 << exponent, 30)
}
