// Swerve keyboard teleop
//
// W/S forward, A/D strafe, Z/X rotate (X = clockwise), 1/2/3 speed gear,
// C toggle field-centric, [ and ] step the simulated heading, Q quit.
//
// Usage: cargo run --example teleop

use std::f64::consts::PI;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use swerve_zenoh_runtime::config::{LOOP_HZ, SwerveConfig, TOPIC_CMD_CHASSIS};
use swerve_zenoh_runtime::messages::ChassisCommand;
use tracing::info;

/// Translate and rotate rate per gear; every rate clears the default 0.1 deadband
const GEARS: [(f64, f64); 3] = [(0.3, 0.15), (0.6, 0.3), (1.0, 0.6)];
const HEADING_STEP: f64 = PI / 12.0;
/// Keys auto-repeat, so an axis is released once its key stops repeating
const KEY_HOLD: Duration = Duration::from_millis(150);

#[derive(Clone, Copy)]
enum Axis {
    Forward,
    Strafe,
    Rotate,
}

/// Held axis deflection, -1, 0 or 1, with the time it was last refreshed
#[derive(Default)]
struct Stick {
    forward: (f64, Option<Instant>),
    strafe: (f64, Option<Instant>),
    rotate: (f64, Option<Instant>),
}

impl Stick {
    fn press(&mut self, axis: Axis, sign: f64) {
        let slot = match axis {
            Axis::Forward => &mut self.forward,
            Axis::Strafe => &mut self.strafe,
            Axis::Rotate => &mut self.rotate,
        };
        *slot = (sign, Some(Instant::now()));
    }

    fn held(slot: (f64, Option<Instant>)) -> f64 {
        match slot {
            (sign, Some(at)) if at.elapsed() < KEY_HOLD => sign,
            _ => 0.0,
        }
    }

    /// Fill the rate fields of `cmd` for the selected gear
    fn apply(&self, cmd: &mut ChassisCommand, (translate, rotate): (f64, f64)) {
        cmd.forward = Self::held(self.forward) * translate;
        cmd.strafe = Self::held(self.strafe) * translate;
        cmd.rotate = Self::held(self.rotate) * rotate;
    }
}

fn axis_for(code: KeyCode) -> Option<(Axis, f64)> {
    match code {
        KeyCode::Char('w') => Some((Axis::Forward, 1.0)),
        KeyCode::Char('s') => Some((Axis::Forward, -1.0)),
        KeyCode::Char('d') => Some((Axis::Strafe, 1.0)),
        KeyCode::Char('a') => Some((Axis::Strafe, -1.0)),
        KeyCode::Char('x') => Some((Axis::Rotate, 1.0)),
        KeyCode::Char('z') => Some((Axis::Rotate, -1.0)),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = SwerveConfig::default();
    info!(
        "Deadband fwd={} str={} rot={}",
        config.deadband.forward, config.deadband.strafe, config.deadband.rotate
    );

    let session = zenoh::open(zenoh::Config::default()).await?;
    let publisher = session.declare_publisher(TOPIC_CMD_CHASSIS).await?;
    info!("Publishing chassis commands on {}", TOPIC_CMD_CHASSIS);

    enable_raw_mode()?;
    let result = drive(&publisher).await;
    disable_raw_mode()?;

    result
}

async fn drive(
    publisher: &zenoh::pubsub::Publisher<'_>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let period = Duration::from_millis(1000 / LOOP_HZ);
    let mut stick = Stick::default();
    let mut gear = 0;
    let mut cmd = ChassisCommand::default();

    loop {
        if event::poll(period)? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                if kind == KeyEventKind::Release {
                    continue;
                }
                if let Some((axis, sign)) = axis_for(code) {
                    stick.press(axis, sign);
                }
                match code {
                    KeyCode::Char(c @ '1'..='3') => {
                        gear = (c as u8 - b'1') as usize;
                        info!("Gear {}: {:?}", gear + 1, GEARS[gear]);
                    }
                    KeyCode::Char('c') => {
                        cmd.field_centric = !cmd.field_centric;
                        info!("Field-centric: {}", cmd.field_centric);
                    }
                    KeyCode::Char('[') => cmd.heading -= HEADING_STEP,
                    KeyCode::Char(']') => cmd.heading += HEADING_STEP,
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    _ => {}
                }
            }
        }

        stick.apply(&mut cmd, GEARS[gear]);
        publisher.put(serde_json::to_string(&cmd)?).await?;
    }
}
