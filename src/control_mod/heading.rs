use nalgebra::{Unit, UnitQuaternion, Vector3};

use crate::state::VesselSnapshot;

// ---------------------------------------------------------------------------
// Heading resolver: attitude mode -> target heading in world space
// ---------------------------------------------------------------------------

/// Symbolic attitude-hold modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Attitude {
    #[default]
    None,
    Prograde,
    Retrograde,
    NormalPlus,
    NormalMinus,
    RadialUp,
    RadialDown,
    ManeuverNode,
    UserDefined,
}

/// Where the orbit-normal direction comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalSource {
    /// Use the host's orbit normal; derive one if the host gives none.
    #[default]
    Host,
    /// Always derive from velocity x radial position (historical fallback).
    CrossProduct,
}

/// Directions below this length are treated as undefined.
const MIN_NORM: f64 = 1e-9;

fn unit(v: Vector3<f64>) -> Option<Unit<Vector3<f64>>> {
    Unit::try_new(v, MIN_NORM)
}

fn orbit_normal(vessel: &VesselSnapshot, source: NormalSource) -> Option<Unit<Vector3<f64>>> {
    match source {
        NormalSource::Host => match vessel.orbit_normal {
            Some(n) => unit(n),
            None => unit(vessel.orbital_velocity.cross(&vessel.position)),
        },
        NormalSource::CrossProduct => unit(vessel.orbital_velocity.cross(&vessel.position)),
    }
}

/// Resolve an attitude mode to a unit heading in world space.
///
/// Returns `None` when the mode produces no heading: mode `None` itself, a
/// maneuver hold with no maneuver defined, or degenerate kinematics (zero
/// velocity, spin or position). The caller must skip the tick in that case
/// rather than emit a zero command.
pub fn resolve_heading(
    attitude: Attitude,
    vessel: &VesselSnapshot,
    pitch_deg: f64,
    yaw_deg: f64,
    maneuver: Option<Vector3<f64>>,
    normal_source: NormalSource,
) -> Option<Unit<Vector3<f64>>> {
    match attitude {
        Attitude::None => None,
        Attitude::Prograde => unit(vessel.orbital_velocity),
        Attitude::Retrograde => unit(-vessel.orbital_velocity),
        Attitude::NormalPlus => orbit_normal(vessel, normal_source),
        Attitude::NormalMinus => orbit_normal(vessel, normal_source).map(|n| -n),
        Attitude::RadialUp => unit(vessel.position),
        Attitude::RadialDown => unit(-vessel.position),
        Attitude::ManeuverNode => maneuver.and_then(unit),
        Attitude::UserDefined => {
            let east = unit(vessel.body_spin.cross(&vessel.position))?;
            let up = unit(vessel.position)?;
            let north = east.cross(&up);

            let q_pitch = UnitQuaternion::from_axis_angle(&up, pitch_deg.to_radians());
            let q_yaw = UnitQuaternion::from_axis_angle(&east, -yaw_deg.to_radians());
            unit(q_pitch * (q_yaw * north))
        }
    }
}
