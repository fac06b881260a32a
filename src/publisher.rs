use crate::config::SimulatorConfig;
use crate::model::DroneModel;
use crate::sink::TelemetrySink;
use crate::telemetry;
use serde::Serialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PublisherSettings {
    pub topic_base: String,
    pub tick_interval: Duration,
}

impl PublisherSettings {
    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self {
            topic_base: config.topic_base.clone(),
            tick_interval: Duration::from_millis(config.tick_interval_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PublisherStats {
    pub ticks: u64,
    pub messages_published: u64,
    pub publish_failures: u64,
}

/// One atomic tick: advance the model, encode the five messages and hand
/// each to the sink in publication order. A failed publish is counted
/// and logged; the remaining messages of the tick are still attempted.
pub fn publish_tick<S: TelemetrySink>(
    model: &mut DroneModel,
    sink: &mut S,
    topic_base: &str,
    now_ms: u64,
    stats: &mut PublisherStats,
) {
    let snapshot = model.advance(now_ms);
    stats.ticks += 1;

    let messages = match telemetry::encode_messages(topic_base, &snapshot) {
        Ok(messages) => messages,
        Err(e) => {
            warn!("snapshot encoding failed, skipping tick: {}", e);
            return;
        }
    };

    info!(
        "📡 tick {}: battery {}% | speed {:.2} m/s | altitude {:.2} m",
        stats.ticks, snapshot.battery, snapshot.speed, snapshot.altitude
    );

    for message in messages {
        match sink.publish(&message.topic, message.payload.as_bytes()) {
            Ok(()) => stats.messages_published += 1,
            Err(e) => {
                stats.publish_failures += 1;
                warn!("publish to {} failed: {}", message.topic, e);
            }
        }
    }
}

/// Drive the model on a fixed cadence until the stop signal flips.
///
/// The loop is a single logical task: tick, publish, sleep. The stop
/// signal is observed between ticks, so shutdown happens within one tick
/// interval; a tick in flight finishes all five publish attempts first.
/// The sink gets a best-effort disconnect on the way out.
pub async fn run<S: TelemetrySink>(
    model: &mut DroneModel,
    sink: &mut S,
    settings: &PublisherSettings,
    mut stop: watch::Receiver<bool>,
) -> PublisherStats {
    let mut stats = PublisherStats::default();
    let mut interval = tokio::time::interval(settings.tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *stop.borrow() {
            break;
        }

        tokio::select! {
            _ = interval.tick() => {
                publish_tick(model, sink, &settings.topic_base, wall_clock_ms(), &mut stats);
            }
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
        }
    }

    sink.disconnect();
    info!(
        "publisher stopped after {} ticks: {} messages published, {} failures",
        stats.ticks, stats.messages_published, stats.publish_failures
    );

    stats
}

pub fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}
