use clap::{App, Arg, ArgMatches};
use dronesim::config::SimulatorConfig;
use dronesim::model::DroneModel;
use dronesim::publisher::{self, PublisherSettings};
use dronesim::sink::MqttSink;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let matches = App::new("drone-publisher")
        .version("0.1.0")
        .author("Flight Systems Engineering Team")
        .about("🛸 Drone Telemetry Publisher - streams simulated flight state over MQTT")
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
                .takes_value(true)
                .validator(|v| match v.parse::<u16>() {
                    Ok(_) => Ok(()),
                    Err(_) => Err("Port must be a number between 0 and 65535".into()),
                }),
        )
        .arg(
            Arg::with_name("tls")
                .long("tls")
                .help("Connect over TLS (env: MQTT_TLS)"),
        )
        .arg(
            Arg::with_name("client-id")
                .long("client-id")
                .value_name("ID")
                .help("MQTT client identifier")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("topic-base")
                .short("t")
                .long("topic-base")
                .value_name("BASE")
                .help("Topic prefix for all publications (default: drone)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("drone-id")
                .long("drone-id")
                .value_name("ID")
                .help("Vehicle identifier carried in the telemetry record")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("tick-interval")
                .short("i")
                .long("tick-interval")
                .value_name("MS")
                .help("Simulation tick interval in milliseconds (default: 200)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("mission-duration")
                .long("mission-duration")
                .value_name("SECONDS")
                .help("Wall-clock span over which the battery depletes to 0 (default: 3600)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("retarget-interval")
                .long("retarget-interval")
                .value_name("SECONDS")
                .help("Seconds between randomized speed/altitude retargets (default: 30)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("speed-range")
                .long("speed-range")
                .value_name("MIN,MAX")
                .help("Target speed draw range in m/s (default: 5,25)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("altitude-range")
                .long("altitude-range")
                .value_name("MIN,MAX")
                .help("Target altitude draw range in meters (default: 100,1000)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("start-position")
                .long("start-position")
                .value_name("LAT,LNG")
                .help("Initial position in degrees (default: -1.286389,36.817223)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("start-battery")
                .long("start-battery")
                .value_name("PERCENT")
                .help("Initial battery level 0-100 (default: 100)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("start-speed")
                .long("start-speed")
                .value_name("MPS")
                .help("Initial speed in m/s (default: 0)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("start-altitude")
                .long("start-altitude")
                .value_name("METERS")
                .help("Initial altitude in meters (default: 100)")
                .takes_value(true),
        )
        .get_matches();

    let config = build_config(&matches)?;

    println!("🛸 Drone Telemetry Publisher");
    println!("============================");
    println!(
        "   Broker: {}:{}{}",
        config.broker,
        config.port,
        if config.tls { " (tls)" } else { "" }
    );
    println!("   Topic base: {}", config.topic_base);
    println!("   Tick interval: {} ms", config.tick_interval_ms);
    println!("   Mission duration: {} s", config.model.mission_duration_s);

    // A sink that cannot be established is fatal: exit before any tick.
    let mut sink = match MqttSink::connect(&config).await {
        Ok(sink) => sink,
        Err(e) => {
            error!("failed to establish mqtt sink: {}", e);
            return Err(e.into());
        }
    };

    let mut model = DroneModel::new(config.model.clone(), publisher::wall_clock_ms());
    let settings = PublisherSettings::from_config(&config);

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping after the current tick");
            let _ = stop_tx.send(true);
        }
    });

    let stats = publisher::run(&mut model, &mut sink, &settings, stop_rx).await;

    println!(
        "🛬 Publisher stopped: {} ticks, {} messages published, {} failures",
        stats.ticks, stats.messages_published, stats.publish_failures
    );

    Ok(())
}

// CLI flags override environment, environment overrides defaults.
fn build_config(matches: &ArgMatches<'_>) -> Result<SimulatorConfig, Box<dyn std::error::Error>> {
    let mut config = SimulatorConfig::from_env();

    if let Some(broker) = matches.value_of("broker") {
        config.broker = broker.to_string();
    }
    if let Some(port) = matches.value_of("port") {
        config.port = port.parse()?;
    }
    if matches.is_present("tls") {
        config.tls = true;
    }
    if let Some(client_id) = matches.value_of("client-id") {
        config.client_id = client_id.to_string();
    }
    if let Some(base) = matches.value_of("topic-base") {
        config.topic_base = base.to_string();
    }
    if let Some(interval) = matches.value_of("tick-interval") {
        config.tick_interval_ms = interval.parse()?;
    }

    if let Some(id) = matches.value_of("drone-id") {
        config.model.drone_id = id.to_string();
    }
    if let Some(duration) = matches.value_of("mission-duration") {
        config.model.mission_duration_s = duration.parse()?;
    }
    if let Some(interval) = matches.value_of("retarget-interval") {
        config.model.retarget_interval_s = interval.parse()?;
    }
    if let Some(range) = matches.value_of("speed-range") {
        config.model.speed_range_mps = parse_pair(range)?;
    }
    if let Some(range) = matches.value_of("altitude-range") {
        config.model.altitude_range_m = parse_pair(range)?;
    }
    if let Some(position) = matches.value_of("start-position") {
        let (lat, lng) = parse_pair(position)?;
        config.model.start_latitude = lat;
        config.model.start_longitude = lng;
    }
    if let Some(battery) = matches.value_of("start-battery") {
        config.model.start_battery_percent = battery.parse()?;
    }
    if let Some(speed) = matches.value_of("start-speed") {
        config.model.start_speed_mps = speed.parse()?;
    }
    if let Some(altitude) = matches.value_of("start-altitude") {
        config.model.start_altitude_m = altitude.parse()?;
    }

    Ok(config)
}

fn parse_pair(value: &str) -> Result<(f64, f64), Box<dyn std::error::Error>> {
    let mut parts = value.splitn(2, ',');
    let first = parts
        .next()
        .ok_or("expected two comma-separated numbers")?
        .trim()
        .parse()?;
    let second = parts
        .next()
        .ok_or("expected two comma-separated numbers")?
        .trim()
        .parse()?;
    Ok((first, second))
}
