// Swerve drive module for the four-wheel independent-steer base
//
// Provides:
// - Chassis geometry and native-unit conversion constants
// - Swerve inverse kinematics (chassis rates -> wheel speed and steering position)
// - Module addressing (controller IDs and steering index offsets)

mod geometry;
pub mod kinematics;
mod modules;

pub use geometry::{ChassisGeometry, UnitConversion};
pub use kinematics::{SwerveKinematics, Wheel, WheelCommand, WheelCommands};
pub use modules::{ModuleConfig, SwerveModules};
