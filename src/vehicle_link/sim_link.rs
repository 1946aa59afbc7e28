use super::link::{GeoPoint, LinkError, LocalNed, VehicleLink};
use super::messages::{self, CommandFrame, TelemetryFrame};
use crate::flight_control::PhaseController;
use crate::logger::SessionLog;
use crate::{info, log, warn};
use fixed::types::I32F32;
use std::env;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Connection settings for the simulator link, read from the environment.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    addr: String,
    threaded: bool,
    px4: bool,
}

impl LinkConfig {
    const DEFAULT_ADDR: &'static str = "127.0.0.1:5760";

    pub fn from_env() -> LinkConfig {
        let addr_var = env::var("SIM_LINK_ADDR");
        let addr = addr_var.as_ref().map_or(Self::DEFAULT_ADDR, |v| v.as_str());
        LinkConfig {
            addr: String::from(addr),
            threaded: env_flag("SIM_LINK_THREADED"),
            px4: env_flag("SIM_LINK_PX4"),
        }
    }

    pub fn addr(&self) -> &str { self.addr.as_str() }
    /// Run the delivery loop on a spawned task instead of the caller's.
    pub fn threaded(&self) -> bool { self.threaded }
    /// Vehicle speaks the PX4 firmware dialect.
    pub fn px4(&self) -> bool { self.px4 }
}

fn env_flag(name: &str) -> bool {
    env::var(name).is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// [`VehicleLink`] over a TCP stream to the simulator.
///
/// Holds the latest telemetry snapshot of each category; commands are handed
/// to the writer task through an unbounded channel and are fire-and-forget.
/// `stop` cancels the delivery loop, which ends the mission run.
#[derive(Debug)]
pub struct SimLink {
    local_position: LocalNed,
    local_velocity: LocalNed,
    global_position: GeoPoint,
    global_home: GeoPoint,
    armed: bool,
    guided: bool,
    px4: bool,
    cmd_tx: mpsc::UnboundedSender<CommandFrame>,
    cancel: CancellationToken,
}

impl SimLink {
    fn new(cmd_tx: mpsc::UnboundedSender<CommandFrame>, cancel: CancellationToken, px4: bool) -> SimLink {
        SimLink {
            local_position: LocalNed::default(),
            local_velocity: LocalNed::default(),
            global_position: GeoPoint::default(),
            global_home: GeoPoint::default(),
            armed: false,
            guided: false,
            px4,
            cmd_tx,
            cancel,
        }
    }

    pub fn guided(&self) -> bool { self.guided }

    /// Overwrites the cached snapshot of the frame's category.
    pub(crate) fn apply_frame(&mut self, frame: TelemetryFrame) {
        match frame {
            TelemetryFrame::LocalPosition(p) => self.local_position = p,
            TelemetryFrame::LocalVelocity(v) => self.local_velocity = v,
            TelemetryFrame::GlobalPosition(g) => self.global_position = g,
            TelemetryFrame::HomePosition(h) => self.global_home = h,
            TelemetryFrame::State { armed, guided } => {
                self.armed = armed;
                self.guided = guided;
            }
        }
    }

    fn send(&self, frame: CommandFrame) -> Result<(), LinkError> {
        self.cmd_tx.send(frame).map_err(|_| LinkError::ChannelClosed)
    }
}

impl VehicleLink for SimLink {
    fn local_position(&self) -> LocalNed { self.local_position }
    fn local_velocity(&self) -> LocalNed { self.local_velocity }
    fn global_position(&self) -> GeoPoint { self.global_position }
    fn global_home(&self) -> GeoPoint { self.global_home }
    fn is_armed(&self) -> bool { self.armed }

    fn take_control(&mut self) -> Result<(), LinkError> { self.send(CommandFrame::TakeControl) }

    fn release_control(&mut self) -> Result<(), LinkError> {
        self.send(CommandFrame::ReleaseControl)
    }

    fn arm(&mut self) -> Result<(), LinkError> { self.send(CommandFrame::Arm) }

    fn disarm(&mut self) -> Result<(), LinkError> { self.send(CommandFrame::Disarm) }

    fn set_home_position(
        &mut self,
        lat: I32F32,
        lon: I32F32,
        alt: I32F32,
    ) -> Result<(), LinkError> {
        if self.px4 {
            // PX4 sets its own home on arm.
            log!("px4 dialect, skipping set_home");
            return Ok(());
        }
        self.send(CommandFrame::SetHome(GeoPoint { lat, lon, alt }))
    }

    fn takeoff(&mut self, altitude: I32F32) -> Result<(), LinkError> {
        self.send(CommandFrame::Takeoff { altitude })
    }

    fn land(&mut self) -> Result<(), LinkError> { self.send(CommandFrame::Land) }

    fn move_to(
        &mut self,
        north: I32F32,
        east: I32F32,
        altitude: I32F32,
        heading: I32F32,
    ) -> Result<(), LinkError> {
        self.send(CommandFrame::MoveTo { north, east, altitude, heading })
    }

    fn stop(&mut self) -> Result<(), LinkError> {
        self.send(CommandFrame::Stop)?;
        self.cancel.cancel();
        Ok(())
    }
}

/// Runs one mission over an established simulator connection.
///
/// Telemetry frames are read one at a time and each is processed to
/// completion (snapshot update, guard check, command dispatch, phase
/// mutation) before the next read, so the controller state is never touched
/// concurrently. Returns when the controller stops the link or the
/// connection drops.
pub async fn run_mission(
    stream: TcpStream,
    config: LinkConfig,
    mut nav_log: SessionLog,
) -> Result<(), LinkError> {
    let (mut rx_socket, tx_socket) = stream.into_split();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    tokio::spawn(drain_commands(tx_socket, cmd_rx));

    let link = SimLink::new(cmd_tx, cancel.clone(), config.px4());
    let mut controller = PhaseController::new(link);
    controller.start_mission();

    loop {
        let frame = tokio::select! {
            () = cancel.cancelled() => break,
            res = read_frame(&mut rx_socket) => res?,
        };
        nav_log.record(&format!("{frame:?}"));
        controller.link_mut().apply_frame(frame);
        match frame {
            TelemetryFrame::LocalPosition(_) => controller.on_local_position(),
            TelemetryFrame::LocalVelocity(_) => controller.on_velocity(),
            TelemetryFrame::State { .. } => controller.on_vehicle_state(),
            TelemetryFrame::GlobalPosition(_) | TelemetryFrame::HomePosition(_) => {}
        }
    }
    nav_log.close();
    info!("mission run finished in {} phase", controller.phase());
    Ok(())
}

async fn read_frame(socket: &mut OwnedReadHalf) -> Result<TelemetryFrame, LinkError> {
    let length = socket.read_u32().await?;
    let mut buffer = vec![0u8; length as usize];
    socket.read_exact(&mut buffer).await?;
    messages::decode_telemetry(&buffer).map_err(|_| LinkError::Proto)
}

#[allow(clippy::cast_possible_truncation)]
async fn drain_commands(
    mut socket: OwnedWriteHalf,
    mut cmd_rx: mpsc::UnboundedReceiver<CommandFrame>,
) {
    while let Some(frame) = cmd_rx.recv().await {
        let Ok(buffer) = messages::encode_command(&frame) else {
            warn!("dropping unencodable command {frame:?}");
            continue;
        };
        let write = async {
            socket.write_u32(buffer.len() as u32).await?;
            socket.write_all(&buffer).await
        };
        if let Err(e) = write.await {
            warn!("closing command writer: {e}");
            break;
        }
    }
    let _ = socket.shutdown().await;
}
