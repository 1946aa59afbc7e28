use super::link::{GeoPoint, LocalNed};
use fixed::types::I32F32;

/// Telemetry frame received from the simulator, one per category. The link
/// caches the latest frame of each category before the matching controller
/// handler runs.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TelemetryFrame {
    LocalPosition(LocalNed),
    LocalVelocity(LocalNed),
    GlobalPosition(GeoPoint),
    HomePosition(GeoPoint),
    State { armed: bool, guided: bool },
}

/// Command frame sent to the simulator.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum CommandFrame {
    TakeControl,
    ReleaseControl,
    Arm,
    Disarm,
    SetHome(GeoPoint),
    Takeoff { altitude: I32F32 },
    Land,
    MoveTo { north: I32F32, east: I32F32, altitude: I32F32, heading: I32F32 },
    Stop,
}

pub fn encode_command(frame: &CommandFrame) -> Result<Vec<u8>, bincode::error::EncodeError> {
    bincode::serde::encode_to_vec(frame, bincode::config::standard())
}

pub fn decode_telemetry(buffer: &[u8]) -> Result<TelemetryFrame, bincode::error::DecodeError> {
    bincode::serde::decode_from_slice(buffer, bincode::config::standard()).map(|(frame, _)| frame)
}
