use strum_macros::Display;

/// One discrete stage of the scripted square mission. Exactly one phase is
/// active at any time; transitions run along a single fixed cycle starting
/// and ending at [`FlightPhase::Manual`].
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum FlightPhase {
    Manual,
    Arming,
    Takeoff,
    Waypoint1,
    Waypoint2,
    Waypoint3,
    ReturnHome,
    Landing,
    Disarming,
}
