// Module addressing for the swerve base
//
// Maps the kinematics output onto the drive/steer controller IDs and applies
// each steering encoder's index offset, producing setpoints the motor
// controller bridge can forward as-is.

use tracing::debug;

use super::kinematics::{Wheel, WheelCommands};
use crate::config::SwerveConfig;
use crate::messages::{ModuleSetpoint, SwerveActuation};

/// Controller IDs and steering offset for one module
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModuleConfig {
    pub drive_id: u8,
    pub steer_id: u8,
    pub index_offset: f64,
}

/// The four modules in front-right, front-left, rear-left, rear-right order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwerveModules {
    modules: [ModuleConfig; 4],
}

impl SwerveModules {
    pub fn new(modules: [ModuleConfig; 4]) -> Self {
        Self { modules }
    }

    pub fn from_config(config: &SwerveConfig) -> Self {
        let modules = Wheel::ALL.map(|wheel| {
            let i = wheel.index();
            ModuleConfig {
                drive_id: config.drive_can_ids[i],
                steer_id: config.steer_can_ids[i],
                index_offset: config.steer_index_offsets[i],
            }
        });
        Self { modules }
    }

    pub fn module(&self, wheel: Wheel) -> &ModuleConfig {
        &self.modules[wheel.index()]
    }

    /// Address each wheel command to its controllers
    pub fn actuation(&self, wheels: &WheelCommands) -> SwerveActuation {
        let modules = Wheel::ALL.map(|wheel| {
            let module = self.module(wheel);
            let cmd = wheels[wheel];
            ModuleSetpoint {
                wheel,
                drive_id: module.drive_id,
                steer_id: module.steer_id,
                speed: cmd.speed,
                position: cmd.position + module.index_offset,
            }
        });

        debug!(
            "Module setpoints: fr=({:.1}, {:.1}) fl=({:.1}, {:.1}) rl=({:.1}, {:.1}) rr=({:.1}, {:.1})",
            modules[0].speed,
            modules[0].position,
            modules[1].speed,
            modules[1].position,
            modules[2].speed,
            modules[2].position,
            modules[3].speed,
            modules[3].position
        );

        SwerveActuation { modules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ids() {
        let modules = SwerveModules::from_config(&SwerveConfig::default());
        assert_eq!(modules.module(Wheel::FrontRight).drive_id, 1);
        assert_eq!(modules.module(Wheel::FrontRight).steer_id, 11);
        assert_eq!(modules.module(Wheel::RearRight).drive_id, 4);
        assert_eq!(modules.module(Wheel::RearRight).steer_id, 14);
    }

    #[test]
    fn test_offsets_applied_in_order() {
        let config = SwerveConfig::default();
        let kin = config.kinematics();
        let modules = SwerveModules::from_config(&config);

        let wheels = kin.compute_wheel_commands(0.5, 0.5, 0.0, false, 0.0);
        let actuation = modules.actuation(&wheels);

        for (i, (wheel, cmd)) in wheels.iter().enumerate() {
            let setpoint = &actuation.modules[i];
            assert_eq!(setpoint.wheel, wheel);
            assert_eq!(setpoint.speed, cmd.speed);
            assert_eq!(
                setpoint.position,
                cmd.position + config.steer_index_offsets[i]
            );
        }
    }

    #[test]
    fn test_zero_offsets_pass_positions_through() {
        let modules = SwerveModules::new(
            [ModuleConfig {
                drive_id: 0,
                steer_id: 0,
                index_offset: 0.0,
            }; 4],
        );
        let wheels = SwerveConfig::default()
            .kinematics()
            .compute_wheel_commands(0.0, 0.3, 0.2, false, 0.0);
        let actuation = modules.actuation(&wheels);
        assert_eq!(
            actuation.modules.map(|m| m.position),
            wheels.positions()
        );
    }
}
