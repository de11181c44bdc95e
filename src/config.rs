// Timeouts, topics, robot configuration
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::swerve::{ChassisGeometry, SwerveKinematics, UnitConversion};

// Runtime loop frequency
pub const LOOP_HZ: u64 = 50;
pub const MAX_LOOP_HZ: u64 = 1000;

// Command timeout for watchdog
pub const CMD_TIMEOUT: Duration = Duration::from_millis(250);

// Zenoh topics
pub const TOPIC_CMD_CHASSIS: &str = "swerve/cmd/chassis"; // commands
pub const TOPIC_RT_MODULES: &str = "swerve/rt/modules"; // actuation
pub const TOPIC_HEALTH: &str = "swerve/state/health"; // health status

/// Error types for loading the robot configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Joystick deadband thresholds per axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadbandConfig {
    pub forward: f64,
    pub strafe: f64,
    pub rotate: f64,
}

impl Default for DeadbandConfig {
    fn default() -> Self {
        Self {
            forward: 0.1,
            strafe: 0.1,
            rotate: 0.1,
        }
    }
}

/// Robot configuration
///
/// Array fields are ordered front-right, front-left, rear-left, rear-right.
/// Gear ratios are motor revolutions per wheel revolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwerveConfig {
    pub wheelbase_length: f64,
    pub wheelbase_track_width: f64,

    /// Closed-loop drive velocity at full speed, encoder ticks per 100 ms
    pub drive_units_per_100ms: f64,

    pub steer_motor_gear_reduction: f64,
    pub steer_wheel_gear_ratio: f64,
    pub steer_pulses_per_revolution: f64,

    pub drive_can_ids: [u8; 4],
    pub steer_can_ids: [u8; 4],

    /// Steering encoder ticks from the index pulse to straight ahead
    pub steer_index_offsets: [f64; 4],

    pub deadband: DeadbandConfig,

    pub loop_hz: u64,
    pub cmd_timeout_ms: u64,
}

impl Default for SwerveConfig {
    fn default() -> Self {
        let steer_motor_gear_reduction = 12.0;
        let steer_wheel_gear_ratio = 4.6;
        let steer_pulses_per_revolution = 4096.0;
        let steer_ppr =
            steer_pulses_per_revolution * (steer_motor_gear_reduction * steer_wheel_gear_ratio);

        Self {
            wheelbase_length: 10.0,
            wheelbase_track_width: 10.0,
            drive_units_per_100ms: 600.0,
            steer_motor_gear_reduction,
            steer_wheel_gear_ratio,
            steer_pulses_per_revolution,
            drive_can_ids: [1, 2, 3, 4],
            steer_can_ids: [11, 12, 13, 14],
            steer_index_offsets: [
                -steer_ppr / 4.0,
                -steer_ppr / 4.0,
                steer_ppr / 4.0,
                steer_ppr * 3.0 / 4.0,
            ],
            deadband: DeadbandConfig::default(),
            loop_hz: LOOP_HZ,
            cmd_timeout_ms: CMD_TIMEOUT.as_millis() as u64,
        }
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive number, got {}", value),
        })
    }
}

fn require_threshold(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be in [0, 1), got {}", value),
        })
    }
}

impl SwerveConfig {
    /// Load and validate a JSON config file; missing fields keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: SwerveConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("wheelbase_length", self.wheelbase_length)?;
        require_positive("wheelbase_track_width", self.wheelbase_track_width)?;
        require_positive("drive_units_per_100ms", self.drive_units_per_100ms)?;
        require_positive("steer_motor_gear_reduction", self.steer_motor_gear_reduction)?;
        require_positive("steer_wheel_gear_ratio", self.steer_wheel_gear_ratio)?;
        require_positive("steer_pulses_per_revolution", self.steer_pulses_per_revolution)?;

        if let Some(offset) = self.steer_index_offsets.iter().find(|o| !o.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "steer_index_offsets",
                reason: format!("must be finite, got {}", offset),
            });
        }

        require_threshold("deadband.forward", self.deadband.forward)?;
        require_threshold("deadband.strafe", self.deadband.strafe)?;
        require_threshold("deadband.rotate", self.deadband.rotate)?;

        if !(1..=MAX_LOOP_HZ).contains(&self.loop_hz) {
            return Err(ConfigError::Invalid {
                field: "loop_hz",
                reason: format!("must be in 1..={}, got {}", MAX_LOOP_HZ, self.loop_hz),
            });
        }
        if self.cmd_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "cmd_timeout_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Steering motor revolutions per wheel revolution
    pub fn final_steer_gear_ratio(&self) -> f64 {
        self.steer_motor_gear_reduction * self.steer_wheel_gear_ratio
    }

    /// Steering encoder ticks per full wheel revolution
    pub fn steer_pulses_per_wheel_rev(&self) -> f64 {
        self.steer_pulses_per_revolution * self.final_steer_gear_ratio()
    }

    pub fn geometry(&self) -> ChassisGeometry {
        ChassisGeometry::from_wheelbase(self.wheelbase_length, self.wheelbase_track_width)
    }

    pub fn units(&self) -> UnitConversion {
        UnitConversion::new(
            self.drive_units_per_100ms,
            self.steer_pulses_per_revolution,
            self.final_steer_gear_ratio(),
        )
    }

    pub fn kinematics(&self) -> SwerveKinematics {
        SwerveKinematics::new(self.geometry(), self.units())
    }

    pub fn loop_period(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.loop_hz.max(1))
    }

    pub fn cmd_timeout(&self) -> Duration {
        Duration::from_millis(self.cmd_timeout_ms)
    }
}
