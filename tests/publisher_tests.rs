use dronesim::model::{DroneModel, ModelConfig};
use dronesim::publisher::{self, PublisherSettings, PublisherStats};
use dronesim::sink::{PublishError, TelemetrySink};
use dronesim::telemetry::{self, PositionPayload, TelemetrySnapshot};
use std::time::Duration;
use tokio::sync::watch;

const EXPECTED_TOPIC_ORDER: [&str; 5] = [
    "drone/position",
    "drone/battery",
    "drone/altitude",
    "drone/speed",
    "drone/telemetry",
];

/// Test double recording every publish attempt, optionally failing a
/// configured attempt index.
#[derive(Default)]
struct RecordingSink {
    attempts: Vec<(String, String)>,
    fail_attempt: Option<usize>,
    disconnected: bool,
}

impl TelemetrySink for RecordingSink {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        let index = self.attempts.len();
        self.attempts
            .push((topic.to_string(), String::from_utf8_lossy(payload).into_owned()));

        if self.fail_attempt == Some(index) {
            return Err(PublishError::Rejected {
                topic: topic.to_string(),
            });
        }
        Ok(())
    }

    fn disconnect(&mut self) {
        self.disconnected = true;
    }
}

fn test_model() -> DroneModel {
    DroneModel::with_seed(ModelConfig::default(), 1, 0)
}

#[test]
fn test_three_ticks_emit_fifteen_messages_in_order() {
    let mut model = test_model();
    let mut sink = RecordingSink::default();
    let mut stats = PublisherStats::default();

    for tick in 1..=3u64 {
        publisher::publish_tick(&mut model, &mut sink, "drone", tick * 200, &mut stats);
    }

    assert_eq!(sink.attempts.len(), 15);
    assert_eq!(stats.ticks, 3);
    assert_eq!(stats.messages_published, 15);
    assert_eq!(stats.publish_failures, 0);

    for (index, (topic, _)) in sink.attempts.iter().enumerate() {
        assert_eq!(topic, EXPECTED_TOPIC_ORDER[index % 5]);
    }
}

#[test]
fn test_publish_failure_does_not_abort_tick_or_stream() {
    let mut model = test_model();
    let mut sink = RecordingSink {
        // Attempt 6 is the battery message of tick 2.
        fail_attempt: Some(6),
        ..RecordingSink::default()
    };
    let mut stats = PublisherStats::default();

    for tick in 1..=3u64 {
        publisher::publish_tick(&mut model, &mut sink, "drone", tick * 200, &mut stats);
    }

    // Every message of every tick was still attempted.
    assert_eq!(sink.attempts.len(), 15);
    assert_eq!(sink.attempts[6].0, "drone/battery");
    assert_eq!(sink.attempts[7].0, "drone/altitude");
    assert_eq!(sink.attempts[8].0, "drone/speed");
    assert_eq!(sink.attempts[9].0, "drone/telemetry");

    assert_eq!(stats.ticks, 3);
    assert_eq!(stats.messages_published, 14);
    assert_eq!(stats.publish_failures, 1);
}

#[test]
fn test_payloads_match_consumer_contract() {
    let mut model = test_model();
    let mut sink = RecordingSink::default();
    let mut stats = PublisherStats::default();

    publisher::publish_tick(&mut model, &mut sink, "drone", 200, &mut stats);

    let position: PositionPayload = serde_json::from_str(&sink.attempts[0].1).unwrap();
    assert!((position.latitude - (-1.286289)).abs() < 1e-9);

    let battery: u8 = sink.attempts[1].1.parse().unwrap();
    assert!(battery <= 100);

    // Scalars carry two decimal places.
    let altitude_text = &sink.attempts[2].1;
    assert_eq!(altitude_text.split('.').nth(1).unwrap().len(), 2);
    altitude_text.parse::<f64>().unwrap();

    let speed_text = &sink.attempts[3].1;
    assert_eq!(speed_text.split('.').nth(1).unwrap().len(), 2);
    speed_text.parse::<f64>().unwrap();

    let snapshot: TelemetrySnapshot = serde_json::from_str(&sink.attempts[4].1).unwrap();
    assert_eq!(snapshot.drone_id, "drone123");
    assert_eq!(snapshot.timestamp, 200);
    assert_eq!(snapshot.battery, battery);
}

#[test]
fn test_encode_messages_prefixes_topic_base() {
    let snapshot = TelemetrySnapshot {
        drone_id: "drone123".into(),
        battery: 87,
        speed: 12.5,
        altitude: 432.1,
        latitude: -1.2863,
        longitude: 36.8172,
        timestamp: 1000,
    };

    let messages = telemetry::encode_messages("fleet/alpha", &snapshot).unwrap();

    assert_eq!(messages.len(), 5);
    assert_eq!(messages[0].topic, "fleet/alpha/position");
    assert_eq!(messages[4].topic, "fleet/alpha/telemetry");
    assert_eq!(messages[1].payload, "87");
    assert_eq!(messages[2].payload, "432.10");
    assert_eq!(messages[3].payload, "12.50");
}

/// Sink that flips the stop signal once enough messages have gone out.
struct StoppingSink {
    inner: RecordingSink,
    stop_tx: watch::Sender<bool>,
    stop_after: usize,
}

impl TelemetrySink for StoppingSink {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        let result = self.inner.publish(topic, payload);
        if self.inner.attempts.len() >= self.stop_after {
            let _ = self.stop_tx.send(true);
        }
        result
    }

    fn disconnect(&mut self) {
        self.inner.disconnect();
    }
}

#[tokio::test]
async fn test_run_stops_on_signal_and_disconnects() {
    let (stop_tx, stop_rx) = watch::channel(false);
    let mut model = test_model();
    let mut sink = StoppingSink {
        inner: RecordingSink::default(),
        stop_tx,
        stop_after: 15,
    };
    let settings = PublisherSettings {
        topic_base: "drone".into(),
        tick_interval: Duration::from_millis(10),
    };

    let stats = publisher::run(&mut model, &mut sink, &settings, stop_rx).await;

    // Stop was raised during tick 3; the loop observes it before tick 4.
    assert_eq!(stats.ticks, 3);
    assert_eq!(stats.messages_published, 15);
    assert!(sink.inner.disconnected);
}

#[tokio::test]
async fn test_run_exits_immediately_when_already_stopped() {
    let (stop_tx, stop_rx) = watch::channel(true);
    let mut model = test_model();
    let mut sink = RecordingSink::default();
    let settings = PublisherSettings {
        topic_base: "drone".into(),
        tick_interval: Duration::from_millis(10),
    };

    let stats = publisher::run(&mut model, &mut sink, &settings, stop_rx).await;
    drop(stop_tx);

    assert_eq!(stats.ticks, 0);
    assert_eq!(sink.attempts.len(), 0);
    assert!(sink.disconnected);
}
