use dronesim::config::SimulatorConfig;
use std::env;

#[test]
fn test_defaults_match_published_contract() {
    let config = SimulatorConfig::default();

    assert_eq!(config.broker, "localhost");
    assert_eq!(config.port, 1883);
    assert!(!config.tls);
    assert_eq!(config.topic_base, "drone");
    assert_eq!(config.tick_interval_ms, 200);

    assert_eq!(config.model.drone_id, "drone123");
    assert_eq!(config.model.mission_duration_s, 3600);
    assert_eq!(config.model.retarget_interval_s, 30);
    assert_eq!(config.model.speed_range_mps, (5.0, 25.0));
    assert_eq!(config.model.altitude_range_m, (100.0, 1000.0));
    assert_eq!(config.model.start_battery_percent, 100);
}

#[test]
fn test_credentials_absent_without_password() {
    let config = SimulatorConfig::default();
    assert!(config.credentials().is_none());

    let config = SimulatorConfig {
        username: "drone-app".into(),
        password: "hunter2".into(),
        ..SimulatorConfig::default()
    };
    assert_eq!(config.credentials(), Some(("drone-app", "hunter2")));
}

// Kept as a single test so the process environment is not mutated from
// concurrent test threads.
#[test]
fn test_environment_overlays_defaults() {
    env::set_var("MQTT_BROKER", "broker.example.com");
    env::set_var("MQTT_PORT", "8883");
    env::set_var("MQTT_USERNAME", "ops");
    env::set_var("MQTT_PASSWORD", "secret");
    env::set_var("MQTT_TLS", "true");

    let config = SimulatorConfig::from_env();

    assert_eq!(config.broker, "broker.example.com");
    assert_eq!(config.port, 8883);
    assert!(config.tls);
    assert_eq!(config.credentials(), Some(("ops", "secret")));

    // Transport settings never disturb the vehicle model defaults.
    assert_eq!(config.model.mission_duration_s, 3600);

    for key in [
        "MQTT_BROKER",
        "MQTT_PORT",
        "MQTT_USERNAME",
        "MQTT_PASSWORD",
        "MQTT_TLS",
    ] {
        env::remove_var(key);
    }
}
