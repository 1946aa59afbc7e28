use fixed::types::I32F32;
use strum_macros::Display;

/// Local-frame vector in NED axes (north, east, down), meters or m/s.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LocalNed {
    pub north: I32F32,
    pub east: I32F32,
    pub down: I32F32,
}

/// Global position fix (degrees latitude/longitude, meters altitude).
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    pub lat: I32F32,
    pub lon: I32F32,
    pub alt: I32F32,
}

#[derive(Debug, Display)]
pub enum LinkError {
    NoConnection,
    ChannelClosed,
    Proto,
    Unknown,
}

impl std::error::Error for LinkError {}
impl From<std::io::Error> for LinkError {
    fn from(value: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match value.kind() {
            ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::ConnectionRefused
            | ErrorKind::BrokenPipe
            | ErrorKind::TimedOut => LinkError::NoConnection,
            _ => LinkError::Unknown,
        }
    }
}

/// Telemetry read access and command dispatch to the vehicle.
///
/// Reads return the latest cached snapshot of their category; they never
/// block. Commands are fire-and-forget: `Ok(())` means the frame was handed
/// to the transport, not that the vehicle executed it. Confirmation arrives
/// through later telemetry, which the phase guards re-evaluate.
pub trait VehicleLink {
    fn local_position(&self) -> LocalNed;
    fn local_velocity(&self) -> LocalNed;
    fn global_position(&self) -> GeoPoint;
    fn global_home(&self) -> GeoPoint;
    fn is_armed(&self) -> bool;

    fn take_control(&mut self) -> Result<(), LinkError>;
    fn release_control(&mut self) -> Result<(), LinkError>;
    fn arm(&mut self) -> Result<(), LinkError>;
    fn disarm(&mut self) -> Result<(), LinkError>;
    fn set_home_position(&mut self, lat: I32F32, lon: I32F32, alt: I32F32)
    -> Result<(), LinkError>;
    fn takeoff(&mut self, altitude: I32F32) -> Result<(), LinkError>;
    fn land(&mut self) -> Result<(), LinkError>;
    fn move_to(
        &mut self,
        north: I32F32,
        east: I32F32,
        altitude: I32F32,
        heading: I32F32,
    ) -> Result<(), LinkError>;
    fn stop(&mut self) -> Result<(), LinkError>;
}
