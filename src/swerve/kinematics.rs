// Swerve inverse kinematics for a four-module independent-steer base
// Converts chassis rates (forward, strafe, rotate) to per-wheel speed and steering position.
//
// Wheel layout, viewed from above:
//
//          forward
//             ^
//   FL |-----------| FR
//      |           |
//      |           |  length
//      |           |
//   RL |-----------| RR
//          width

use std::ops::Index;

use tracing::debug;

use super::geometry::{ChassisGeometry, UnitConversion};
use crate::messages::ChassisCommand;

/// Module corners, in the fixed order the commands are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wheel {
    FrontRight = 0,
    FrontLeft = 1,
    RearLeft = 2,
    RearRight = 3,
}

impl Wheel {
    pub const ALL: [Wheel; 4] = [
        Wheel::FrontRight,
        Wheel::FrontLeft,
        Wheel::RearLeft,
        Wheel::RearRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Wheel::FrontRight => "front_right",
            Wheel::FrontLeft => "front_left",
            Wheel::RearLeft => "rear_left",
            Wheel::RearRight => "rear_right",
        }
    }
}

/// Setpoints for one module in native units
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelCommand {
    /// Drive speed magnitude, 0..=speed_scale
    pub speed: f64,
    /// Absolute steering position in encoder ticks (not wrapped)
    pub position: f64,
}

/// The four module setpoints of one control cycle, returned by value
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelCommands([WheelCommand; 4]);

impl WheelCommands {
    pub fn as_array(&self) -> &[WheelCommand; 4] {
        &self.0
    }

    /// Iterate as (wheel, command) in front-right, front-left, rear-left, rear-right order
    pub fn iter(&self) -> impl Iterator<Item = (Wheel, &WheelCommand)> {
        Wheel::ALL.into_iter().zip(self.0.iter())
    }

    pub fn speeds(&self) -> [f64; 4] {
        self.0.map(|c| c.speed)
    }

    pub fn positions(&self) -> [f64; 4] {
        self.0.map(|c| c.position)
    }
}

impl Index<Wheel> for WheelCommands {
    type Output = WheelCommand;

    fn index(&self, wheel: Wheel) -> &WheelCommand {
        &self.0[wheel.index()]
    }
}

/// Two-argument arctangent that resolves the (0, 0) case to 0 regardless of zero signs
fn atan2_or_zero(y: f64, x: f64) -> f64 {
    if y == 0.0 && x == 0.0 {
        0.0
    } else {
        y.atan2(x)
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Stateless swerve inverse kinematics bound to one chassis configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwerveKinematics {
    geometry: ChassisGeometry,
    units: UnitConversion,
}

impl SwerveKinematics {
    pub fn new(geometry: ChassisGeometry, units: UnitConversion) -> Self {
        Self { geometry, units }
    }

    pub fn geometry(&self) -> ChassisGeometry {
        self.geometry
    }

    pub fn units(&self) -> UnitConversion {
        self.units
    }

    /// (lateral, longitudinal) velocity pair per wheel, same order as `Wheel::ALL`
    fn wheel_terms(
        &self,
        mut forward: f64,
        mut strafe: f64,
        rotate: f64,
        field_centric: bool,
        heading: f64,
    ) -> [(f64, f64); 4] {
        // Rotate the field-frame request by -heading into the robot frame
        if field_centric {
            let (sin_h, cos_h) = heading.sin_cos();
            let robot_forward = forward * cos_h + strafe * sin_h;
            let robot_strafe = -forward * sin_h + strafe * cos_h;
            forward = robot_forward;
            strafe = robot_strafe;
        }

        let ChassisGeometry {
            half_length,
            half_width,
        } = self.geometry;

        // Velocity components shared by adjacent modules
        let a = strafe - rotate * half_length;
        let b = strafe + rotate * half_length;
        let c = forward - rotate * half_width;
        let d = forward + rotate * half_width;

        [(b, c), (b, d), (a, d), (a, c)]
    }

    /// Compute wheel commands for a chassis command
    pub fn compute(&self, cmd: &ChassisCommand) -> WheelCommands {
        self.compute_wheel_commands(
            cmd.forward,
            cmd.strafe,
            cmd.rotate,
            cmd.field_centric,
            cmd.heading,
        )
    }

    /// Convert chassis rates to wheel speeds and steering positions
    ///
    /// # Arguments
    /// * `forward` - Forward rate, normally -1..1 (positive = forward)
    /// * `strafe` - Strafe rate, normally -1..1 (positive = right)
    /// * `rotate` - Rotation rate, normally -1..1 (positive = clockwise)
    /// * `field_centric` - Interpret forward/strafe in the field frame
    /// * `heading` - Robot heading in radians, only used when `field_centric` is set
    ///
    /// # Returns
    /// Commands in front-right, front-left, rear-left, rear-right order
    pub fn compute_wheel_commands(
        &self,
        forward: f64,
        strafe: f64,
        rotate: f64,
        field_centric: bool,
        heading: f64,
    ) -> WheelCommands {
        if !(forward.is_finite() && strafe.is_finite() && rotate.is_finite()) {
            debug!(
                "Non-finite chassis rates (fwd={}, str={}, rot={}), zeroing them",
                forward, strafe, rotate
            );
        }
        let forward = finite_or_zero(forward);
        let strafe = finite_or_zero(strafe);
        let rotate = finite_or_zero(rotate);
        let heading = finite_or_zero(heading);

        let mut pairs = self.wheel_terms(forward, strafe, rotate, field_centric, heading);
        let mut speeds = pairs.map(|(y, x)| y.hypot(x));
        let mut max = speeds.iter().copied().fold(0.0f64, f64::max);

        // Terms overflowed: the request saturates, so solve it again on rates scaled into -1..1
        if !max.is_finite() {
            let largest = forward.abs().max(strafe.abs()).max(rotate.abs());
            debug!("Chassis terms overflowed, rescaling rates by {}", largest);
            pairs = self.wheel_terms(
                forward / largest,
                strafe / largest,
                rotate / largest,
                field_centric,
                heading,
            );
            speeds = pairs.map(|(y, x)| y.hypot(x));
            max = speeds.iter().copied().fold(0.0f64, f64::max);
            for speed in &mut speeds {
                *speed /= max;
            }
        } else if max > 1.0 {
            // No wheel may exceed full speed; scale all together to keep the turn radius
            for speed in &mut speeds {
                *speed /= max;
            }
        }

        let mut commands = [WheelCommand::default(); 4];
        for (i, command) in commands.iter_mut().enumerate() {
            let (y, x) = pairs[i];
            command.speed = finite_or_zero(speeds[i] * self.units.speed_scale);
            command.position = finite_or_zero(atan2_or_zero(y, x) * self.units.to_position);
        }

        WheelCommands(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPS: f64 = 1e-9;

    fn engine(length: f64, width: f64, speed_scale: f64) -> SwerveKinematics {
        SwerveKinematics::new(
            ChassisGeometry::from_wheelbase(length, width),
            UnitConversion::new(speed_scale, 4096.0, 55.2),
        )
    }

    /// Engine whose outputs stay in the math domain (speed 0..1, angle in radians)
    fn unit_engine(length: f64, width: f64) -> SwerveKinematics {
        SwerveKinematics::new(
            ChassisGeometry::from_wheelbase(length, width),
            UnitConversion {
                speed_scale: 1.0,
                to_position: 1.0,
            },
        )
    }

    fn assert_close(a: f64, b: f64, what: &str) {
        assert!((a - b).abs() < EPS, "{}: {} != {}", what, a, b);
    }

    fn assert_commands_close(a: &WheelCommands, b: &WheelCommands) {
        for ((wheel, ca), (_, cb)) in a.iter().zip(b.iter()) {
            assert_close(ca.speed, cb.speed, wheel.name());
            assert_close(ca.position, cb.position, wheel.name());
        }
    }

    #[test]
    fn test_zero_input() {
        let wheels = engine(10.0, 10.0, 600.0).compute_wheel_commands(0.0, 0.0, 0.0, false, 0.0);
        for (wheel, cmd) in wheels.iter() {
            assert_eq!(cmd.speed, 0.0, "{} speed", wheel.name());
            assert_eq!(cmd.position, 0.0, "{} position", wheel.name());
        }
    }

    #[test]
    fn test_negative_zero_terms_do_not_flip_angle() {
        // -0.0 strafe and forward would give atan2(-0.0, -0.0) = -PI without the guard
        let wheels = unit_engine(10.0, 10.0).compute_wheel_commands(-0.0, -0.0, 0.0, false, 0.0);
        for (_, cmd) in wheels.iter() {
            assert_eq!(cmd.position, 0.0);
            assert_eq!(cmd.speed, 0.0);
        }
    }

    #[test]
    fn test_forward_motion() {
        let wheels = engine(10.0, 10.0, 600.0).compute_wheel_commands(1.0, 0.0, 0.0, false, 0.0);
        println!("Forward: {:?}", wheels);

        for (wheel, cmd) in wheels.iter() {
            assert_close(cmd.speed, 600.0, wheel.name());
            assert_close(cmd.position, 0.0, wheel.name());
        }
    }

    #[test]
    fn test_strafe_points_wheels_sideways() {
        let kin = unit_engine(10.0, 10.0);
        let wheels = kin.compute_wheel_commands(0.0, 0.5, 0.0, false, 0.0);
        for (wheel, cmd) in wheels.iter() {
            assert_close(cmd.speed, 0.5, wheel.name());
            assert_close(cmd.position, FRAC_PI_2, wheel.name());
        }
    }

    #[test]
    fn test_rotation_only() {
        // Rectangular chassis so the pinwheel is not trivially symmetric
        let kin = unit_engine(20.0, 12.0);
        let rotate = 0.05;
        let wheels = kin.compute_wheel_commands(0.0, 0.0, rotate, false, 0.0);
        println!("Rotation: {:?}", wheels);

        let geometry = kin.geometry();
        let a = -rotate * geometry.half_length;
        let b = rotate * geometry.half_length;
        let c = -rotate * geometry.half_width;
        let d = rotate * geometry.half_width;

        // Same radius from center for every module
        let speeds = wheels.speeds();
        for speed in speeds {
            assert_close(speed, speeds[0], "rotation speed");
        }
        assert_close(speeds[0], b.hypot(c), "rotation magnitude");

        // Each wheel tangential: diagonally opposite wheels point opposite ways
        assert_close(wheels[Wheel::FrontRight].position, b.atan2(c), "fr");
        assert_close(wheels[Wheel::FrontLeft].position, b.atan2(d), "fl");
        assert_close(wheels[Wheel::RearLeft].position, a.atan2(d), "rl");
        assert_close(wheels[Wheel::RearRight].position, a.atan2(c), "rr");
        assert_close(
            wheels[Wheel::FrontRight].position - wheels[Wheel::RearLeft].position,
            PI,
            "fr vs rl",
        );
        assert_close(
            wheels[Wheel::FrontLeft].position - wheels[Wheel::RearRight].position,
            PI,
            "fl vs rr",
        );
    }

    #[test]
    fn test_saturation_preserves_ratios() {
        let kin = unit_engine(10.0, 10.0);
        let (forward, strafe, rotate): (f64, f64, f64) = (0.8, 0.3, 0.1);

        // Raw speeds computed by hand before normalization
        let (a, b) = (strafe - rotate * 5.0, strafe + rotate * 5.0);
        let (c, d) = (forward - rotate * 5.0, forward + rotate * 5.0);
        let raw = [b.hypot(c), b.hypot(d), a.hypot(d), a.hypot(c)];
        let raw_max = raw.iter().copied().fold(0.0f64, f64::max);
        assert!(raw_max > 1.0, "test input must saturate");

        let speeds = kin.compute_wheel_commands(forward, strafe, rotate, false, 0.0).speeds();
        let max = speeds.iter().copied().fold(0.0f64, f64::max);
        assert_close(max, 1.0, "normalized max");
        for i in 0..4 {
            assert_close(speeds[i], raw[i] / raw_max, "ratio");
        }
    }

    #[test]
    fn test_speed_never_exceeds_scale() {
        let kin = engine(10.0, 10.0, 600.0);
        for &(f, s, r) in &[(1.0, 1.0, 1.0), (-1.0, 1.0, -1.0), (50.0, -20.0, 3.0)] {
            for speed in kin.compute_wheel_commands(f, s, r, false, 0.0).speeds() {
                assert!((0.0..=600.0 + EPS).contains(&speed), "speed {} out of range", speed);
            }
        }
    }

    #[test]
    fn test_unsaturated_speeds_not_scaled_up() {
        let speeds = unit_engine(10.0, 10.0)
            .compute_wheel_commands(0.25, 0.0, 0.0, false, 0.0)
            .speeds();
        for speed in speeds {
            assert_close(speed, 0.25, "quarter speed");
        }
    }

    #[test]
    fn test_field_centric_zero_heading_matches_robot_centric() {
        let kin = engine(10.0, 8.0, 600.0);
        let robot = kin.compute_wheel_commands(0.4, -0.3, 0.02, false, 0.0);
        let field = kin.compute_wheel_commands(0.4, -0.3, 0.02, true, 0.0);
        assert_eq!(robot, field);
    }

    #[test]
    fn test_field_centric_quarter_turn() {
        // Robot facing +90°: field-forward is robot-left, i.e. negative strafe
        let kin = engine(10.0, 8.0, 600.0);
        let field = kin.compute_wheel_commands(1.0, 0.0, 0.0, true, FRAC_PI_2);
        let robot = kin.compute_wheel_commands(0.0, -1.0, 0.0, false, 0.0);
        assert_commands_close(&field, &robot);
    }

    #[test]
    fn test_heading_ignored_when_robot_centric() {
        let kin = engine(10.0, 8.0, 600.0);
        let a = kin.compute_wheel_commands(0.5, 0.2, 0.0, false, 1.3);
        let b = kin.compute_wheel_commands(0.5, 0.2, 0.0, false, 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let kin = engine(10.0, 8.0, 600.0);
        let first = kin.compute_wheel_commands(0.3, 0.7, -0.04, true, 0.9);
        for _ in 0..10 {
            assert_eq!(kin.compute_wheel_commands(0.3, 0.7, -0.04, true, 0.9), first);
        }
    }

    #[test]
    fn test_non_finite_input_gives_finite_output() {
        let kin = engine(10.0, 10.0, 600.0);
        let wheels = kin.compute_wheel_commands(f64::NAN, f64::INFINITY, 0.0, true, f64::NAN);
        for (_, cmd) in wheels.iter() {
            assert!(cmd.speed.is_finite());
            assert!(cmd.position.is_finite());
        }
        assert_eq!(wheels, kin.compute_wheel_commands(0.0, 0.0, 0.0, false, 0.0));
    }

    #[test]
    fn test_huge_request_saturates_to_full_speed() {
        let kin = engine(10.0, 10.0, 600.0);
        let wheels = kin.compute_wheel_commands(f64::MAX, f64::MAX, 0.0, false, 0.0);
        println!("Huge diagonal: {:?}", wheels);

        // Same direction as a unit diagonal request, at full speed
        let unit = kin.compute_wheel_commands(1.0, 1.0, 0.0, false, 0.0);
        assert_commands_close(&wheels, &unit);
        for speed in wheels.speeds() {
            assert_close(speed, 600.0, "huge speed");
        }
    }

    #[test]
    fn test_huge_rotation_keeps_pinwheel() {
        let kin = unit_engine(20.0, 12.0);
        let huge = kin.compute_wheel_commands(0.0, 0.0, f64::MAX, true, 0.7);
        let small = kin.compute_wheel_commands(0.0, 0.0, 1.0, true, 0.7);
        assert_commands_close(&huge, &small);
        let max = huge.speeds().iter().copied().fold(0.0f64, f64::max);
        assert_close(max, 1.0, "huge rotation max");
    }

    #[test]
    fn test_compute_from_command() {
        let kin = engine(10.0, 8.0, 600.0);
        let cmd = ChassisCommand {
            forward: 0.2,
            strafe: -0.4,
            rotate: 0.01,
            field_centric: true,
            heading: 0.5,
        };
        assert_eq!(
            kin.compute(&cmd),
            kin.compute_wheel_commands(0.2, -0.4, 0.01, true, 0.5)
        );
    }

    #[test]
    fn test_position_uses_native_ticks() {
        // Pure strafe right is a quarter wheel turn
        let wheels = engine(10.0, 10.0, 600.0).compute_wheel_commands(0.0, 1.0, 0.0, false, 0.0);
        let quarter_turn = 4096.0 * 55.2 / 4.0;
        for (wheel, cmd) in wheels.iter() {
            assert!((cmd.position - quarter_turn).abs() < 1e-6, "{}", wheel.name());
        }
    }
}
