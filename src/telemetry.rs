use serde::{Deserialize, Serialize};

pub const POSITION_SUFFIX: &str = "position";
pub const BATTERY_SUFFIX: &str = "battery";
pub const ALTITUDE_SUFFIX: &str = "altitude";
pub const SPEED_SUFFIX: &str = "speed";
pub const TELEMETRY_SUFFIX: &str = "telemetry";

/// Per-tick publication order. Consumers treat the topics as independent
/// messages; the order only matters for the publisher's own bookkeeping.
pub const TOPIC_SUFFIXES: [&str; 5] = [
    POSITION_SUFFIX,
    BATTERY_SUFFIX,
    ALTITUDE_SUFFIX,
    SPEED_SUFFIX,
    TELEMETRY_SUFFIX,
];

// Scalar payloads carry two decimal places, matching what the dashboard
// and mobile consumers parse.
const SCALAR_DECIMALS: usize = 2;

/// Immutable view of the vehicle at one tick. Field names are a wire
/// contract with downstream consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub drone_id: String,
    pub battery: u8,
    pub speed: f64,
    pub altitude: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PositionPayload {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone)]
pub struct TopicMessage {
    pub topic: String,
    pub payload: String,
}

impl TopicMessage {
    fn new(base: &str, suffix: &str, payload: String) -> Self {
        Self {
            topic: format!("{}/{}", base, suffix),
            payload,
        }
    }
}

/// Encode one snapshot into the five per-tick messages, in publication
/// order: position, battery, altitude, speed, full telemetry.
pub fn encode_messages(
    base: &str,
    snapshot: &TelemetrySnapshot,
) -> Result<Vec<TopicMessage>, serde_json::Error> {
    let position = PositionPayload {
        latitude: snapshot.latitude,
        longitude: snapshot.longitude,
    };

    Ok(vec![
        TopicMessage::new(base, POSITION_SUFFIX, serde_json::to_string(&position)?),
        TopicMessage::new(base, BATTERY_SUFFIX, snapshot.battery.to_string()),
        TopicMessage::new(
            base,
            ALTITUDE_SUFFIX,
            format!("{:.1$}", snapshot.altitude, SCALAR_DECIMALS),
        ),
        TopicMessage::new(
            base,
            SPEED_SUFFIX,
            format!("{:.1$}", snapshot.speed, SCALAR_DECIMALS),
        ),
        TopicMessage::new(base, TELEMETRY_SUFFIX, serde_json::to_string(snapshot)?),
    ])
}
