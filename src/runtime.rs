// Fixed-rate loop with watchdog
// Note: a watchdog is a safety mechanism that triggers a safe action if something goes wrong
// Eg. without it if teleop crashes and stops sending commands, the runtime would keep driving the last command

use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{debug, info, warn};

// local imports
use crate::config::{SwerveConfig, TOPIC_CMD_CHASSIS, TOPIC_HEALTH, TOPIC_RT_MODULES};
use crate::input::Deadband;
use crate::messages::{ChassisCommand, RuntimeHealth, SwerveActuation};
use crate::swerve::{SwerveKinematics, SwerveModules};

pub struct Runtime {
    kinematics: SwerveKinematics,
    modules: SwerveModules,
    deadband: Deadband,
    cmd_timeout: Duration,
    latest_cmd: Option<ChassisCommand>,
    cmd_received_at: Instant,
    health: RuntimeHealth,
}

impl Runtime {
    pub fn new(config: &SwerveConfig) -> Self {
        Self {
            kinematics: config.kinematics(),
            modules: SwerveModules::from_config(config),
            deadband: Deadband::from(&config.deadband),
            cmd_timeout: config.cmd_timeout(),
            latest_cmd: None,
            cmd_received_at: Instant::now(),
            health: RuntimeHealth::CmdStale, // Start stale until first cmd
        }
    }

    pub fn health(&self) -> RuntimeHealth {
        self.health
    }

    /// Process incoming command
    pub fn on_command(&mut self, cmd: ChassisCommand) {
        debug!("Received command: {:?}", &cmd);
        self.latest_cmd = Some(cmd);
        self.cmd_received_at = Instant::now();
    }

    /// Compute actuation based on watchdog state
    pub fn compute_actuation(&mut self) -> SwerveActuation {
        let cmd_age = self.cmd_received_at.elapsed();

        let cmd = match self.latest_cmd {
            Some(cmd) if cmd_age <= self.cmd_timeout => {
                if self.health != RuntimeHealth::Ok {
                    info!("Commands resumed");
                }
                self.health = RuntimeHealth::Ok;
                self.deadband.apply(&cmd)
            }
            Some(_) => {
                // Watchdog triggered - stop the robot
                if self.health != RuntimeHealth::CmdStale {
                    warn!("Command stale ({:?} old), stopping robot", cmd_age);
                }
                self.health = RuntimeHealth::CmdStale;
                ChassisCommand::default()
            }
            None => {
                // No command ever received
                self.health = RuntimeHealth::CmdStale;
                ChassisCommand::default()
            }
        };

        let wheels = self.kinematics.compute(&cmd);
        self.modules.actuation(&wheels)
    }
}

pub async fn run(config: SwerveConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up publishers and subscribers...");
    let subscriber = session.declare_subscriber(TOPIC_CMD_CHASSIS).await?;
    let pub_actuation = session.declare_publisher(TOPIC_RT_MODULES).await?;
    let pub_health = session.declare_publisher(TOPIC_HEALTH).await?;

    let mut runtime = Runtime::new(&config);
    let mut tick = interval(config.loop_period());

    info!(
        "Runtime started: {}Hz loop, {}ms watchdog timeout",
        config.loop_hz, config.cmd_timeout_ms
    );
    info!(
        "Chassis {} x {}, {} ticks/100ms full speed, steer ratio {:.1}:1",
        config.wheelbase_length,
        config.wheelbase_track_width,
        config.drive_units_per_100ms,
        config.final_steer_gear_ratio()
    );
    info!("Subscribed to: {}", TOPIC_CMD_CHASSIS);
    info!("Publishing to: {}, {}", TOPIC_RT_MODULES, TOPIC_HEALTH);

    loop {
        tick.tick().await;

        // 1. Drain all pending commands (non-blocking), keep latest
        while let Ok(Some(sample)) = subscriber.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<ChassisCommand>(&payload) {
                Ok(cmd) => {
                    runtime.on_command(cmd);
                }
                Err(e) => {
                    warn!("Failed to parse command: {}", e);
                }
            }
        }

        // 2. Compute actuation (includes watchdog logic)
        let actuation = runtime.compute_actuation();

        // 3. Publish actuation
        let actuation_json = serde_json::to_string(&actuation)?;
        pub_actuation.put(actuation_json).await?;

        // 4. Publish health
        let health_json = serde_json::to_string(&runtime.health)?;
        pub_health.put(health_json).await?;
    }
}
