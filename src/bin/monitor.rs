use clap::{App, Arg};
use colored::*;
use dronesim::config::SimulatorConfig;
use dronesim::telemetry::{
    PositionPayload, TelemetrySnapshot, ALTITUDE_SUFFIX, BATTERY_SUFFIX, POSITION_SUFFIX,
    SPEED_SUFFIX, TELEMETRY_SUFFIX, TOPIC_SUFFIXES,
};
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS, Transport};
use std::time::Duration;
use tracing::{error, info};

const EVENT_CHANNEL_CAPACITY: usize = 64;
const MONITOR_CLIENT_ID: &str = "dronesim-monitor";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let matches = App::new("drone-monitor")
        .version("0.1.0")
        .author("Flight Systems Engineering Team")
        .about("📡 Drone Telemetry Monitor - watch the live telemetry stream")
        .arg(
            Arg::with_name("broker")
                .short("b")
                .long("broker")
                .value_name("HOST")
                .help("MQTT broker host (default: localhost, env: MQTT_BROKER)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .value_name("PORT")
                .help("MQTT broker port (default: 1883, env: MQTT_PORT)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("tls")
                .long("tls")
                .help("Connect over TLS (env: MQTT_TLS)"),
        )
        .arg(
            Arg::with_name("topic-base")
                .short("t")
                .long("topic-base")
                .value_name("BASE")
                .help("Topic prefix to subscribe under (default: drone)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .takes_value(true)
                .possible_values(&["compact", "json"])
                .default_value("compact"),
        )
        .get_matches();

    let mut config = SimulatorConfig::from_env();
    config.client_id = MONITOR_CLIENT_ID.to_string();

    if let Some(broker) = matches.value_of("broker") {
        config.broker = broker.to_string();
    }
    if let Some(port) = matches.value_of("port") {
        config.port = port.parse()?;
    }
    if matches.is_present("tls") {
        config.tls = true;
    }
    if let Some(base) = matches.value_of("topic-base") {
        config.topic_base = base.to_string();
    }
    let format = matches.value_of("format").unwrap();

    println!(
        "{}",
        "📡 Monitoring drone telemetry (Press Ctrl+C to stop)..."
            .bright_blue()
            .bold()
    );

    let mut options = MqttOptions::new(&config.client_id, &config.broker, config.port);
    options.set_keep_alive(Duration::from_secs(config.keep_alive_s));
    options.set_clean_session(true);
    if config.tls {
        options.set_transport(Transport::tls_with_default_config());
    }
    if let Some((username, password)) = config.credentials() {
        options.set_credentials(username, password);
    }

    let (client, mut event_loop) = AsyncClient::new(options, EVENT_CHANNEL_CAPACITY);

    for suffix in TOPIC_SUFFIXES {
        client
            .subscribe(format!("{}/{}", config.topic_base, suffix), QoS::AtLeastOnce)
            .await?;
    }

    loop {
        tokio::select! {
            event = event_loop.poll() => match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("connected to {}:{}", config.broker, config.port);
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let payload = String::from_utf8_lossy(&publish.payload);
                    render_message(&publish.topic, &payload, format);
                }
                Ok(_) => {}
                Err(e) => {
                    error!("mqtt error: {}", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                println!("{}", "Monitor stopped".yellow());
                let _ = client.try_disconnect();
                break;
            }
        }
    }

    Ok(())
}

fn render_message(topic: &str, payload: &str, format: &str) {
    if format == "json" {
        println!("{} {}", topic.dimmed(), payload);
        return;
    }

    let suffix = topic.rsplit('/').next().unwrap_or(topic);
    match suffix {
        POSITION_SUFFIX => {
            if let Ok(position) = serde_json::from_str::<PositionPayload>(payload) {
                println!(
                    "📍 {} {:.6}, {:.6}",
                    "position".bright_white(),
                    position.latitude,
                    position.longitude
                );
            }
        }
        BATTERY_SUFFIX => {
            if let Ok(level) = payload.parse::<u8>() {
                let value = match level {
                    0..=19 => format!("{}%", level).bright_red(),
                    20..=49 => format!("{}%", level).yellow(),
                    _ => format!("{}%", level).bright_green(),
                };
                println!("🔋 {} {}", "battery".bright_white(), value);
            }
        }
        ALTITUDE_SUFFIX => {
            println!("🏔️  {} {} m", "altitude".bright_white(), payload);
        }
        SPEED_SUFFIX => {
            println!("🚀 {} {} m/s", "speed".bright_white(), payload);
        }
        TELEMETRY_SUFFIX => {
            if let Ok(snapshot) = serde_json::from_str::<TelemetrySnapshot>(payload) {
                println!(
                    "[{}] {} | 🔋 {:>3}% | 🚀 {:>6.2} m/s | 🏔️ {:>7.2} m | 📍 {:.6}, {:.6}",
                    snapshot.timestamp / 1000,
                    snapshot.drone_id.bright_cyan(),
                    snapshot.battery,
                    snapshot.speed,
                    snapshot.altitude,
                    snapshot.latitude,
                    snapshot.longitude
                );
            }
        }
        _ => {
            println!("{} {}", topic.dimmed(), payload);
        }
    }
}
