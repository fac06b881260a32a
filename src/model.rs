use crate::telemetry::TelemetrySnapshot;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

const DEFAULT_DRONE_ID: &str = "drone123";
const DEFAULT_START_LATITUDE: f64 = -1.286389;
const DEFAULT_START_LONGITUDE: f64 = 36.817223;
const DEFAULT_START_BATTERY_PERCENT: u8 = 100;
const DEFAULT_START_SPEED_MPS: f64 = 0.0;
const DEFAULT_START_ALTITUDE_M: f64 = 100.0;
const DEFAULT_TARGET_SPEED_MPS: f64 = 15.0;
const DEFAULT_TARGET_ALTITUDE_M: f64 = 500.0;
const DEFAULT_MISSION_DURATION_S: u64 = 3600;
const DEFAULT_RETARGET_INTERVAL_S: u64 = 30;
const DEFAULT_SPEED_RANGE_MPS: (f64, f64) = (5.0, 25.0);
const DEFAULT_ALTITUDE_RANGE_M: (f64, f64) = (100.0, 1000.0);
const DEFAULT_POSITION_DRIFT_DEG: f64 = 0.0001;
const DEFAULT_SPEED_STEP_MPS: f64 = 0.5;
const DEFAULT_ALTITUDE_STEP_M: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub drone_id: String,
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub start_battery_percent: u8,
    pub start_speed_mps: f64,
    pub start_altitude_m: f64,
    pub initial_target_speed_mps: f64,
    pub initial_target_altitude_m: f64,
    pub mission_duration_s: u64,
    pub retarget_interval_s: u64,
    pub speed_range_mps: (f64, f64),
    pub altitude_range_m: (f64, f64),
    pub position_drift_deg: f64,
    pub speed_step_mps: f64,
    pub altitude_step_m: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            drone_id: DEFAULT_DRONE_ID.into(),
            start_latitude: DEFAULT_START_LATITUDE,
            start_longitude: DEFAULT_START_LONGITUDE,
            start_battery_percent: DEFAULT_START_BATTERY_PERCENT,
            start_speed_mps: DEFAULT_START_SPEED_MPS,
            start_altitude_m: DEFAULT_START_ALTITUDE_M,
            initial_target_speed_mps: DEFAULT_TARGET_SPEED_MPS,
            initial_target_altitude_m: DEFAULT_TARGET_ALTITUDE_M,
            mission_duration_s: DEFAULT_MISSION_DURATION_S,
            retarget_interval_s: DEFAULT_RETARGET_INTERVAL_S,
            speed_range_mps: DEFAULT_SPEED_RANGE_MPS,
            altitude_range_m: DEFAULT_ALTITUDE_RANGE_M,
            position_drift_deg: DEFAULT_POSITION_DRIFT_DEG,
            speed_step_mps: DEFAULT_SPEED_STEP_MPS,
            altitude_step_m: DEFAULT_ALTITUDE_STEP_M,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleState {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f64,
    pub speed_mps: f64,
    pub battery_percent: u8,
    pub target_speed_mps: f64,
    pub target_altitude_m: f64,
}

#[derive(Debug)]
pub struct DroneModel {
    config: ModelConfig,
    state: VehicleState,
    mission_start_ms: u64,
    last_retarget_boundary: u64,
    rng: StdRng,
}

impl DroneModel {
    pub fn new(config: ModelConfig, now_ms: u64) -> Self {
        Self::with_rng(config, StdRng::from_entropy(), now_ms)
    }

    /// Deterministic variant for tests: retarget draws come from the seed.
    pub fn with_seed(config: ModelConfig, seed: u64, now_ms: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed), now_ms)
    }

    fn with_rng(config: ModelConfig, rng: StdRng, now_ms: u64) -> Self {
        let state = VehicleState {
            latitude: config.start_latitude,
            longitude: config.start_longitude,
            altitude_m: config.start_altitude_m,
            speed_mps: config.start_speed_mps,
            battery_percent: config.start_battery_percent.min(100),
            target_speed_mps: config.initial_target_speed_mps,
            target_altitude_m: config.initial_target_altitude_m,
        };

        Self {
            config,
            state,
            mission_start_ms: now_ms,
            last_retarget_boundary: 0,
            rng,
        }
    }

    /// Advance the vehicle by one tick and return an immutable snapshot.
    ///
    /// Effects are applied in a fixed order: position drift, battery
    /// recomputation from elapsed mission time, step-limited speed and
    /// altitude convergence, then the retarget boundary check. The whole
    /// update is a single state transition; a snapshot never observes a
    /// partially applied tick.
    pub fn advance(&mut self, now_ms: u64) -> TelemetrySnapshot {
        debug_assert!(
            now_ms >= self.mission_start_ms,
            "tick time {} precedes mission start {}",
            now_ms,
            self.mission_start_ms
        );
        let elapsed_ms = now_ms.saturating_sub(self.mission_start_ms);

        // Constant-heading drift keeps the track predictable for maps.
        self.state.latitude += self.config.position_drift_deg;
        self.state.longitude += self.config.position_drift_deg;

        self.state.battery_percent = battery_at(
            elapsed_ms,
            self.config.mission_duration_s,
            self.config.start_battery_percent,
        );

        self.state.speed_mps = step_toward(
            self.state.speed_mps,
            self.state.target_speed_mps,
            self.config.speed_step_mps,
        );
        self.state.altitude_m = step_toward(
            self.state.altitude_m,
            self.state.target_altitude_m,
            self.config.altitude_step_m,
        );

        self.check_retarget(elapsed_ms);

        debug_assert!(self.state.battery_percent <= 100);

        TelemetrySnapshot {
            drone_id: self.config.drone_id.clone(),
            battery: self.state.battery_percent,
            speed: self.state.speed_mps,
            altitude: self.state.altitude_m,
            latitude: self.state.latitude,
            longitude: self.state.longitude,
            timestamp: now_ms,
        }
    }

    // Fires once per crossed boundary index, never once per tick that
    // happens to observe the same elapsed-second value.
    fn check_retarget(&mut self, elapsed_ms: u64) {
        if self.config.retarget_interval_s == 0 {
            return;
        }

        let boundary = (elapsed_ms / 1000) / self.config.retarget_interval_s;
        if boundary > self.last_retarget_boundary {
            self.last_retarget_boundary = boundary;

            let (speed_lo, speed_hi) = self.config.speed_range_mps;
            let (alt_lo, alt_hi) = self.config.altitude_range_m;
            self.state.target_speed_mps = self.rng.gen_range(speed_lo..=speed_hi);
            self.state.target_altitude_m = self.rng.gen_range(alt_lo..=alt_hi);
        }
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn drone_id(&self) -> &str {
        &self.config.drone_id
    }

    pub fn mission_start_ms(&self) -> u64 {
        self.mission_start_ms
    }
}

/// Charge remaining as a pure function of elapsed mission time: the
/// configured start level depletes linearly to zero over the mission
/// window. Idempotent at equal elapsed times and non-increasing as time
/// advances.
fn battery_at(elapsed_ms: u64, mission_duration_s: u64, start_percent: u8) -> u8 {
    let duration_ms = mission_duration_s.saturating_mul(1000);
    if duration_ms == 0 || elapsed_ms >= duration_ms {
        return 0;
    }

    let fraction_left = 1.0 - elapsed_ms as f64 / duration_ms as f64;
    (f64::from(start_percent.min(100)) * fraction_left).clamp(0.0, 100.0) as u8
}

// Clamped at the target so a step can never cross it within one tick.
fn step_toward(current: f64, target: f64, max_step: f64) -> f64 {
    let delta = target - current;
    if delta.abs() <= max_step {
        target
    } else {
        current + max_step.copysign(delta)
    }
}
