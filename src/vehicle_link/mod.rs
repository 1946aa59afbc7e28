//! Narrow seam between the phase controller and the vehicle: the
//! [`VehicleLink`] trait for telemetry reads and command dispatch, the wire
//! frames, and the TCP simulator link with its serialized delivery loop.

mod link;
pub(crate) mod messages;
pub(crate) mod sim_link;

pub use link::{GeoPoint, LinkError, LocalNed, VehicleLink};
pub use sim_link::LinkConfig;
