//! # Drone Telemetry Simulator
//!
//! A synthetic telemetry generator that models a single moving drone and
//! streams its state over MQTT at a fixed cadence, for exercising
//! dashboards and mobile consumers without real hardware.
//!
//! ## Features
//!
//! - **Stateful flight simulation**: smooth step-limited convergence of
//!   speed and altitude toward periodically re-randomized targets
//! - **Deterministic power model**: battery depletes as a pure function
//!   of elapsed mission time
//! - **Multi-topic publication**: position, battery, altitude, speed and
//!   a full telemetry record per tick
//! - **Pluggable sink**: the simulation core only knows a publish trait;
//!   the MQTT transport (TLS, credentials, reconnect) lives behind it
//!
//! ## Quick Start
//!
//! ```rust
//! use dronesim::model::{DroneModel, ModelConfig};
//!
//! let mut model = DroneModel::new(ModelConfig::default(), 0);
//!
//! // One simulation tick, one immutable snapshot
//! let snapshot = model.advance(200);
//! println!("battery: {}%", snapshot.battery);
//! ```
//!
//! ## Architecture
//!
//! - [`model`] - Motion/power state model advanced once per tick
//! - [`telemetry`] - Snapshot type and the five-topic message schema
//! - [`sink`] - Sink trait, error taxonomy and the rumqttc-backed MQTT sink
//! - [`publisher`] - Fixed-cadence tick loop with bounded-effort publishing
//! - [`config`] - Defaults, environment overlay and credential sourcing

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod config;
pub mod model;
pub mod publisher;
pub mod sink;
pub mod telemetry;

// Re-export main public types for convenience
pub use config::SimulatorConfig;
pub use model::{DroneModel, ModelConfig, VehicleState};
pub use publisher::{PublisherSettings, PublisherStats};
pub use sink::{ConnectError, MqttSink, PublishError, TelemetrySink};
pub use telemetry::{TelemetrySnapshot, TopicMessage};
