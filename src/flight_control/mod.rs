mod flight_phase;
mod phase_controller;

pub use flight_phase::FlightPhase;
pub use phase_controller::{PhaseController, TargetPosition};
