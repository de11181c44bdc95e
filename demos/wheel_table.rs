// Wheel table: print module setpoints for a few canned chassis commands
//
// Usage: cargo run --example wheel_table -- [config.json]

use std::f64::consts::FRAC_PI_2;

use swerve_zenoh_runtime::config::SwerveConfig;
use swerve_zenoh_runtime::messages::ChassisCommand;
use swerve_zenoh_runtime::swerve::SwerveModules;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => SwerveConfig::load(path)?,
        None => SwerveConfig::default(),
    };
    let kinematics = config.kinematics();
    let modules = SwerveModules::from_config(&config);

    let cases = [
        ("stop", ChassisCommand::default()),
        ("forward", ChassisCommand { forward: 1.0, ..Default::default() }),
        ("strafe right", ChassisCommand { strafe: 1.0, ..Default::default() }),
        ("rotate cw", ChassisCommand { rotate: 0.1, ..Default::default() }),
        (
            "forward + rotate (saturated)",
            ChassisCommand { forward: 1.0, rotate: 0.1, ..Default::default() },
        ),
        (
            "field forward, heading 90",
            ChassisCommand {
                forward: 1.0,
                field_centric: true,
                heading: FRAC_PI_2,
                ..Default::default()
            },
        ),
    ];

    for (label, cmd) in cases {
        let wheels = kinematics.compute(&cmd);
        let actuation = modules.actuation(&wheels);

        println!("{} {:?}", label, cmd);
        for (setpoint, (wheel, raw)) in actuation.modules.iter().zip(wheels.iter()) {
            println!(
                "  {:<12} drive#{:<2} speed {:>8.2}   steer#{:<2} angle {:>8.2} deg  pos {:>10.1}",
                wheel.name(),
                setpoint.drive_id,
                setpoint.speed,
                setpoint.steer_id,
                (raw.position / kinematics.units().to_position).to_degrees(),
                setpoint.position
            );
        }
        println!();
    }

    Ok(())
}
