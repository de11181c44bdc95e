// Joystick deadbanding applied to operator commands before kinematics

use crate::config::DeadbandConfig;
use crate::messages::ChassisCommand;

/// Zero out axis values inside the deadband (and anything non-finite)
pub fn apply_deadband(value: f64, threshold: f64) -> f64 {
    if !value.is_finite() || value.abs() < threshold {
        0.0
    } else {
        value
    }
}

/// Per-axis deadband for chassis rate commands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deadband {
    forward: f64,
    strafe: f64,
    rotate: f64,
}

impl Deadband {
    pub fn new(forward: f64, strafe: f64, rotate: f64) -> Self {
        Self {
            forward,
            strafe,
            rotate,
        }
    }

    /// Apply to the three rates; mode flag and heading pass through
    pub fn apply(&self, cmd: &ChassisCommand) -> ChassisCommand {
        ChassisCommand {
            forward: apply_deadband(cmd.forward, self.forward),
            strafe: apply_deadband(cmd.strafe, self.strafe),
            rotate: apply_deadband(cmd.rotate, self.rotate),
            ..*cmd
        }
    }
}

impl From<&DeadbandConfig> for Deadband {
    fn from(config: &DeadbandConfig) -> Self {
        Self::new(config.forward, config.strafe, config.rotate)
    }
}
