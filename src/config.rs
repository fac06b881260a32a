use crate::model::ModelConfig;
use std::env;

const DEFAULT_BROKER: &str = "localhost";
const DEFAULT_PORT: u16 = 1883;
const DEFAULT_USERNAME: &str = "drone-app";
const DEFAULT_CLIENT_ID: &str = "dronesim-publisher";
const DEFAULT_TOPIC_BASE: &str = "drone";
const DEFAULT_TICK_INTERVAL_MS: u64 = 200;
const DEFAULT_KEEP_ALIVE_S: u64 = 30;

/// Everything the publisher needs to run: transport settings plus the
/// embedded vehicle model configuration. Credentials come from the
/// environment so they stay out of scripts and shell history.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub broker: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub tls: bool,
    pub client_id: String,
    pub topic_base: String,
    pub tick_interval_ms: u64,
    pub keep_alive_s: u64,
    pub model: ModelConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            broker: DEFAULT_BROKER.into(),
            port: DEFAULT_PORT,
            username: DEFAULT_USERNAME.into(),
            password: String::new(),
            tls: false,
            client_id: DEFAULT_CLIENT_ID.into(),
            topic_base: DEFAULT_TOPIC_BASE.into(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            keep_alive_s: DEFAULT_KEEP_ALIVE_S,
            model: ModelConfig::default(),
        }
    }
}

impl SimulatorConfig {
    /// Defaults overlaid with `MQTT_BROKER`, `MQTT_PORT`, `MQTT_USERNAME`,
    /// `MQTT_PASSWORD` and `MQTT_TLS` when set. CLI flags take precedence
    /// over the environment in the binaries.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(broker) = env::var("MQTT_BROKER") {
            config.broker = broker;
        }
        if let Ok(port) = env::var("MQTT_PORT") {
            config.port = port.parse().unwrap_or(DEFAULT_PORT);
        }
        if let Ok(username) = env::var("MQTT_USERNAME") {
            config.username = username;
        }
        if let Ok(password) = env::var("MQTT_PASSWORD") {
            config.password = password;
        }
        if let Ok(tls) = env::var("MQTT_TLS") {
            config.tls = matches!(tls.as_str(), "1" | "true" | "yes");
        }

        config
    }

    /// Username/password pair, or `None` when no password is configured
    /// (anonymous brokers).
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.password.is_empty() {
            None
        } else {
            Some((&self.username, &self.password))
        }
    }
}
