use nalgebra::{UnitQuaternion, Vector3};

use crate::parts::PartTree;

// ---------------------------------------------------------------------------
// Vessel snapshot: read-only kinematic/orbital state supplied by the host
// ---------------------------------------------------------------------------

/// Flight situation reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Situation {
    /// Still clamped to the pad; staging decisions are deferred.
    PreLaunch,
    /// In atmospheric or suborbital flight.
    Flying,
    /// On a stable orbit.
    Orbiting,
}

/// Read-only view of the vessel for one control tick.
///
/// The host owns and updates all of this between ticks; the autopilot never
/// mutates it.
#[derive(Debug, Clone)]
pub struct VesselSnapshot {
    pub situation: Situation,
    pub altitude: f64,                      // m above surface
    pub apoapsis: f64,                      // m above surface
    pub orbital_velocity: Vector3<f64>,     // m/s, world frame
    pub grav_parameter: f64,                // m^3/s^2
    pub body_radius: f64,                   // m
    pub body_spin: Vector3<f64>,            // rad/s, body rotation vector
    pub orientation: UnitQuaternion<f64>,   // vehicle local -> world
    pub position: Vector3<f64>,             // m, CoM relative to body center
    pub orbit_normal: Option<Vector3<f64>>, // host-provided orbit normal, if any
    pub current_stage: i32,
    pub total_stages: i32,
}

impl VesselSnapshot {
    pub fn lifted_off(&self) -> bool {
        self.situation != Situation::PreLaunch
    }

    /// Radial-up unit direction (body center toward vessel), if defined.
    pub fn radial_up(&self) -> Option<Vector3<f64>> {
        let r = self.position.norm();
        if r > 1e-9 {
            Some(self.position / r)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator command structure shared by all controllers within a tick
// ---------------------------------------------------------------------------

/// Named actuator channels. Each controller writes only the channels it
/// owns; untouched channels keep whatever the pilot or host set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightControls {
    pub pitch: f64,         // [-1, 1]
    pub yaw: f64,           // [-1, 1]
    pub roll: f64,          // [-1, 1]
    pub main_throttle: f64, // [0, 1]
}

// ---------------------------------------------------------------------------
// Per-tick inputs and outbound commands
// ---------------------------------------------------------------------------

/// Everything the host hands the autopilot for one tick. Borrowed views are
/// valid only for the duration of the tick.
pub struct TickContext<'a> {
    pub dt: f64,
    pub vessel: &'a VesselSnapshot,
    pub parts: &'a PartTree,
    /// Burn vector of the currently planned maneuver, world frame, if any.
    pub maneuver: Option<Vector3<f64>>,
}

/// Commands issued back to the host for one tick.
///
/// `advance_stage` is a single flag, so at most one staging event can be
/// requested per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickCommands {
    pub advance_stage: bool,
    /// Prograde delta-v (m/s) of a circularization burn the host should
    /// schedule at the next apoapsis.
    pub circularize: Option<f64>,
}

// ---------------------------------------------------------------------------
// Preset snapshots
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// Kerbin-like home body constants.
    pub const BODY_RADIUS: f64 = 600_000.0;
    pub const GRAV_PARAMETER: f64 = 3.5316e12;
    pub const BODY_SPIN_RATE: f64 = 2.9157e-4; // rad/s about +z

    /// Vessel sitting on the pad at the equator, nose up.
    pub fn pad_snapshot() -> VesselSnapshot {
        VesselSnapshot {
            situation: Situation::PreLaunch,
            altitude: 80.0,
            apoapsis: 0.0,
            orbital_velocity: Vector3::new(0.0, 175.0, 0.0),
            grav_parameter: GRAV_PARAMETER,
            body_radius: BODY_RADIUS,
            body_spin: Vector3::new(0.0, 0.0, BODY_SPIN_RATE),
            // Local y (nose) pointing along world +x (radial up at this spot).
            orientation: UnitQuaternion::rotation_between(&Vector3::y(), &Vector3::x())
                .unwrap_or_else(UnitQuaternion::identity),
            position: Vector3::new(BODY_RADIUS + 80.0, 0.0, 0.0),
            orbit_normal: None,
            current_stage: 3,
            total_stages: 3,
        }
    }

    /// Same vessel partway up a gravity turn.
    pub fn ascent_snapshot(altitude: f64, apoapsis: f64) -> VesselSnapshot {
        let mut snap = pad_snapshot();
        snap.situation = Situation::Flying;
        snap.altitude = altitude;
        snap.apoapsis = apoapsis;
        snap.position = Vector3::new(BODY_RADIUS + altitude, 0.0, 0.0);
        snap.orbital_velocity = Vector3::new(250.0, 900.0, 0.0);
        snap
    }
}
