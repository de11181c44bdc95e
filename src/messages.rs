// Define message types for the runtime

use serde::{Deserialize, Serialize};

use crate::swerve::Wheel;

// Command from teleop/joystick -> runtime
// Rates are normalized (-1..1); heading is radians and only read in field-centric mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChassisCommand {
    pub forward: f64,
    pub strafe: f64,
    pub rotate: f64,
    #[serde(default)]
    pub field_centric: bool,
    #[serde(default)]
    pub heading: f64,
}

// Setpoints for one swerve module, addressed by its controller IDs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModuleSetpoint {
    pub wheel: Wheel,
    pub drive_id: u8,
    pub steer_id: u8,
    /// Drive velocity in encoder ticks per 100 ms
    pub speed: f64,
    /// Absolute steering position in encoder ticks, index offset applied
    pub position: f64,
}

// Actuation output from runtime -> motor controller bridge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwerveActuation {
    pub modules: [ModuleSetpoint; 4],
}

/// Health status published by runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    CmdStale,
}
