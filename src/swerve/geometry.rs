// Chassis geometry and native-unit conversion constants
//
// Both groups are derived once from the robot configuration and never change
// afterwards, so the kinematics engine can hold them by value.

use std::f64::consts::PI;

/// Half dimensions of the wheelbase rectangle (wheel contact points)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChassisGeometry {
    pub half_length: f64,
    pub half_width: f64,
}

impl ChassisGeometry {
    /// Build from full wheelbase length (front to rear) and track width (left to right)
    pub fn from_wheelbase(length: f64, track_width: f64) -> Self {
        Self {
            half_length: length / 2.0,
            half_width: track_width / 2.0,
        }
    }
}

/// Scale factors from the normalized math domain to actuator-native units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConversion {
    /// Native speed units (encoder ticks per 100 ms) for a normalized speed of 1.0
    pub speed_scale: f64,
    /// Native absolute-position ticks per radian of wheel steering angle
    pub to_position: f64,
}

impl UnitConversion {
    /// `steer_gear_ratio` is motor revolutions per wheel revolution
    pub fn new(speed_scale: f64, steer_pulses_per_rev: f64, steer_gear_ratio: f64) -> Self {
        Self {
            speed_scale,
            to_position: steer_pulses_per_rev * steer_gear_ratio / (2.0 * PI),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_dimensions() {
        let geometry = ChassisGeometry::from_wheelbase(24.0, 18.0);
        assert_eq!(geometry.half_length, 12.0);
        assert_eq!(geometry.half_width, 9.0);
    }

    #[test]
    fn test_full_turn_is_one_wheel_revolution_of_ticks() {
        // 4096 pulses on the motor, 55.2:1 down to the wheel
        let units = UnitConversion::new(600.0, 4096.0, 55.2);
        let ticks = 2.0 * PI * units.to_position;
        assert!((ticks - 4096.0 * 55.2).abs() < 1e-6);
        assert_eq!(units.speed_scale, 600.0);
    }
}
