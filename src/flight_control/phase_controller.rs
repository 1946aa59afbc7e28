use super::flight_phase::FlightPhase;
use crate::vehicle_link::{LocalNed, VehicleLink};
use crate::{error, info};
use fixed::types::I32F32;

/// Commanded takeoff altitude for the scripted mission, in meters.
pub const TARGET_ALTITUDE: I32F32 = I32F32::lit("3.0");
/// Fraction of the target altitude that counts as "takeoff complete".
pub const ALTITUDE_REACHED_FRACTION: I32F32 = I32F32::lit("0.95");
/// Horizontal arrival tolerance around a waypoint setpoint, in meters.
pub const POSITION_TOLERANCE: I32F32 = I32F32::lit("0.1");
/// Maximum vertical displacement still considered "at rest" after landing.
pub const VERTICAL_REST_TOLERANCE: I32F32 = I32F32::lit("0.01");

/// Setpoint the vehicle is currently commanded toward. Written only inside
/// transition functions, never inside guards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TargetPosition {
    pub north: I32F32,
    pub east: I32F32,
    pub altitude: I32F32,
}

/// Supervisory state machine for the scripted square mission.
///
/// The controller is driven exclusively by the link's delivery loop: each
/// telemetry callback evaluates only the guards relevant to the current
/// phase, and a satisfied guard issues its command and mutates the phase
/// synchronously before the next callback can run. A callback arriving while
/// the phase is outside its relevant set is a silent no-op.
///
/// A command that the link fails to accept leaves the phase unchanged; the
/// next telemetry callback re-evaluates the same guard, so retry is driven
/// by telemetry cadence rather than explicit retry logic.
#[derive(Debug)]
pub struct PhaseController<L: VehicleLink> {
    link: L,
    phase: FlightPhase,
    target: TargetPosition,
    mission_active: bool,
}

impl<L: VehicleLink> PhaseController<L> {
    pub fn new(link: L) -> PhaseController<L> {
        PhaseController {
            link,
            phase: FlightPhase::Manual,
            target: TargetPosition::default(),
            mission_active: false,
        }
    }

    pub fn phase(&self) -> FlightPhase { self.phase }

    pub fn target(&self) -> TargetPosition { self.target }

    pub fn mission_active(&self) -> bool { self.mission_active }

    pub fn link(&self) -> &L { &self.link }

    pub fn link_mut(&mut self) -> &mut L { &mut self.link }

    /// Marks the mission as running; the next vehicle-state callback in
    /// manual phase kicks off the arming transition.
    pub fn start_mission(&mut self) { self.mission_active = true; }

    /// Local-position callback. Relevant phases: takeoff, the three
    /// waypoints and the return-home leg.
    pub fn on_local_position(&mut self) {
        let pos = self.link.local_position();
        match self.phase {
            FlightPhase::Takeoff => {
                let altitude = -pos.down;
                // Strict comparison, matching the flown guard: exactly 95%
                // of the target altitude does not yet count as reached.
                if altitude > ALTITUDE_REACHED_FRACTION * self.target.altitude {
                    self.waypoint_transition();
                }
            }
            FlightPhase::Waypoint1 | FlightPhase::Waypoint2 | FlightPhase::Waypoint3 => {
                if self.target_reached(pos) {
                    self.waypoint_transition();
                }
            }
            FlightPhase::ReturnHome => {
                if self.target_reached(pos) {
                    self.landing_transition();
                }
            }
            _ => {}
        }
    }

    /// Local-velocity callback. Relevant phase: landing only.
    pub fn on_velocity(&mut self) {
        if self.phase != FlightPhase::Landing {
            return;
        }
        let alt_above_home = self.link.global_position().alt - self.link.global_home().alt;
        let down = self.link.local_position().down;
        if alt_above_home < POSITION_TOLERANCE && down.abs() < VERTICAL_REST_TOLERANCE {
            self.disarming_transition();
        }
    }

    /// Vehicle-state callback. Relevant phases: manual, arming, disarming.
    /// Ignored entirely once the mission flag is cleared.
    pub fn on_vehicle_state(&mut self) {
        if !self.mission_active {
            return;
        }
        match self.phase {
            FlightPhase::Manual => self.arming_transition(),
            FlightPhase::Arming if self.link.is_armed() => self.takeoff_transition(),
            FlightPhase::Disarming if !self.link.is_armed() => self.manual_transition(),
            _ => {}
        }
    }

    fn target_reached(&self, pos: LocalNed) -> bool {
        (pos.north - self.target.north).abs() < POSITION_TOLERANCE
            && (pos.east - self.target.east).abs() < POSITION_TOLERANCE
    }

    fn arming_transition(&mut self) {
        let home = self.link.global_position();
        let res = self
            .link
            .take_control()
            .and_then(|()| self.link.arm())
            .and_then(|()| self.link.set_home_position(home.lat, home.lon, home.alt));
        match res {
            Ok(()) => {
                info!("arming transition");
                self.phase = FlightPhase::Arming;
            }
            Err(e) => error!("arming transition failed: {e}"),
        }
    }

    fn takeoff_transition(&mut self) {
        match self.link.takeoff(TARGET_ALTITUDE) {
            Ok(()) => {
                info!("takeoff transition");
                self.target.altitude = TARGET_ALTITUDE;
                self.phase = FlightPhase::Takeoff;
            }
            Err(e) => error!("takeoff transition failed: {e}"),
        }
    }

    fn waypoint_transition(&mut self) {
        let (next, north, east) = match self.phase {
            FlightPhase::Takeoff => (FlightPhase::Waypoint1, I32F32::ZERO, I32F32::lit("10.0")),
            FlightPhase::Waypoint1 => {
                (FlightPhase::Waypoint2, I32F32::lit("10.0"), I32F32::lit("10.0"))
            }
            FlightPhase::Waypoint2 => (FlightPhase::Waypoint3, I32F32::lit("10.0"), I32F32::ZERO),
            FlightPhase::Waypoint3 => (FlightPhase::ReturnHome, I32F32::ZERO, I32F32::ZERO),
            _ => return,
        };
        match self.link.move_to(north, east, self.target.altitude, I32F32::ZERO) {
            Ok(()) => {
                info!("{next} transition");
                self.target.north = north;
                self.target.east = east;
                self.phase = next;
            }
            Err(e) => error!("{next} transition failed: {e}"),
        }
    }

    fn landing_transition(&mut self) {
        match self.link.land() {
            Ok(()) => {
                info!("landing transition");
                self.phase = FlightPhase::Landing;
            }
            Err(e) => error!("landing transition failed: {e}"),
        }
    }

    fn disarming_transition(&mut self) {
        match self.link.disarm() {
            Ok(()) => {
                info!("disarming transition");
                self.phase = FlightPhase::Disarming;
            }
            Err(e) => error!("disarming transition failed: {e}"),
        }
    }

    fn manual_transition(&mut self) {
        let res = self.link.release_control().and_then(|()| self.link.stop());
        match res {
            Ok(()) => {
                info!("manual transition");
                self.mission_active = false;
                self.phase = FlightPhase::Manual;
            }
            Err(e) => error!("manual transition failed: {e}"),
        }
    }
}
