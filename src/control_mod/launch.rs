use crate::state::{FlightControls, TickCommands, TickContext};
use super::attitude::AttitudeController;
use super::heading::Attitude;
use super::staging::AutoStagingController;
use super::Controller;

// ---------------------------------------------------------------------------
// Auto-launch sequencer: thin phase logic over the other controllers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AutoLaunchController {
    enabled: bool,
    /// Climb straight up until this altitude (m), then start the turn.
    pub turn_altitude: f64,
    /// Above this altitude (m) the ascent guidance hands over to a
    /// circularization burn.
    pub guidance_ceiling: f64,
    /// Apoapsis (m) the ascent aims for.
    pub target_apoapsis: f64,
}

impl AutoLaunchController {
    pub fn new() -> Self {
        Self {
            enabled: false,
            turn_altitude: 10_000.0,
            guidance_ceiling: 80_000.0,
            target_apoapsis: 100_000.0,
        }
    }

    /// One tick of the sequencer. Runs before the attitude controller so
    /// retargeting takes effect on the same tick.
    #[allow(clippy::too_many_arguments)]
    pub fn drive(
        &mut self,
        ctx: &TickContext,
        controls: &mut FlightControls,
        attitude: &mut AttitudeController,
        staging: &mut AutoStagingController,
        master_enabled: &mut bool,
        commands: &mut TickCommands,
    ) {
        if !self.enabled {
            return;
        }
        let vessel = ctx.vessel;

        if vessel.altitude < self.turn_altitude {
            // Initial climb: straight up, full throttle, staging armed.
            attitude.set_attitude(Attitude::RadialUp);
            staging.enable();
            controls.main_throttle = 1.0;
        } else if vessel.altitude < self.guidance_ceiling {
            // Gravity turn: fixed user-defined heading, throttle tapering
            // off as the apoapsis approaches the target.
            attitude.set_pitch(90.0);
            attitude.set_yaw(45.0);
            attitude.set_attitude(Attitude::UserDefined);
            controls.main_throttle = (self.target_apoapsis - vessel.apoapsis).clamp(0.0, 1.0);
        } else {
            // Out of the atmosphere: hand the host a circularization burn
            // for the next apoapsis and stand down.
            commands.circularize = Some(self.circularization_dv(ctx));
            attitude.set_attitude(Attitude::None);
            staging.disable();
            *master_enabled = false;
        }
    }

    /// Prograde delta-v needed at apoapsis to reach a circular orbit at the
    /// target apoapsis. The apoapsis speed follows from angular-momentum
    /// conservation: v_ap = |r x v| / r_ap.
    fn circularization_dv(&self, ctx: &TickContext) -> f64 {
        let vessel = ctx.vessel;
        let r_ap = vessel.body_radius + vessel.apoapsis;
        let r_target = vessel.body_radius + self.target_apoapsis;
        let h = vessel.position.cross(&vessel.orbital_velocity).norm();
        let v_ap = h / r_ap;
        (vessel.grav_parameter / r_target).sqrt() - v_ap
    }
}

impl Default for AutoLaunchController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for AutoLaunchController {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn name(&self) -> &str {
        "auto-launch"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parts::presets::booster_stack;
    use crate::state::presets;

    struct Rig {
        attitude: AttitudeController,
        staging: AutoStagingController,
        launch: AutoLaunchController,
        master: bool,
    }

    impl Rig {
        fn new() -> Self {
            let mut launch = AutoLaunchController::new();
            launch.enable();
            Self {
                attitude: AttitudeController::new(),
                staging: AutoStagingController::new(),
                launch,
                master: true,
            }
        }

        fn tick(&mut self, altitude: f64, apoapsis: f64) -> (FlightControls, TickCommands) {
            let vessel = presets::ascent_snapshot(altitude, apoapsis);
            let (parts, _) = booster_stack();
            let ctx = TickContext { dt: 0.02, vessel: &vessel, parts: &parts, maneuver: None };
            let mut controls = FlightControls::default();
            let mut commands = TickCommands::default();
            self.launch.drive(
                &ctx,
                &mut controls,
                &mut self.attitude,
                &mut self.staging,
                &mut self.master,
                &mut commands,
            );
            (controls, commands)
        }
    }

    #[test]
    fn initial_climb_goes_straight_up_at_full_throttle() {
        let mut rig = Rig::new();
        let (controls, commands) = rig.tick(2_000.0, 4_000.0);
        assert_eq!(rig.attitude.attitude(), Attitude::RadialUp);
        assert!(rig.staging.is_enabled());
        assert_eq!(controls.main_throttle, 1.0);
        assert_eq!(commands, TickCommands::default());
    }

    #[test]
    fn gravity_turn_switches_to_user_defined_heading() {
        let mut rig = Rig::new();
        let (_, _) = rig.tick(25_000.0, 60_000.0);
        assert_eq!(rig.attitude.attitude(), Attitude::UserDefined);
        assert_eq!(rig.attitude.pitch(), 90.0);
        assert_eq!(rig.attitude.yaw(), 45.0);
    }

    #[test]
    fn throttle_tapers_near_target_apoapsis() {
        let mut rig = Rig::new();
        let (far, _) = rig.tick(25_000.0, 60_000.0);
        assert_eq!(far.main_throttle, 1.0);
        let (near, _) = rig.tick(25_000.0, 99_999.6);
        assert!(near.main_throttle > 0.0 && near.main_throttle < 1.0);
        let (done, _) = rig.tick(25_000.0, 100_500.0);
        assert_eq!(done.main_throttle, 0.0);
    }

    #[test]
    fn above_ceiling_plans_circularization_and_stands_down() {
        let mut rig = Rig::new();
        rig.staging.enable();
        let (_, commands) = rig.tick(81_000.0, 100_000.0);

        let dv = commands.circularize.expect("should plan a burn");
        assert!(dv.is_finite());
        assert_eq!(rig.attitude.attitude(), Attitude::None);
        assert!(!rig.staging.is_enabled());
        assert!(!rig.master, "master autopilot switch released");
    }

    #[test]
    fn circularization_dv_is_zero_for_matching_circular_orbit() {
        let mut rig = Rig::new();
        // Build a snapshot already on a circular orbit at the target.
        let mut vessel = presets::ascent_snapshot(100_000.0, 100_000.0);
        let r = vessel.body_radius + 100_000.0;
        let v_circ = (vessel.grav_parameter / r).sqrt();
        vessel.position = nalgebra::Vector3::new(r, 0.0, 0.0);
        vessel.orbital_velocity = nalgebra::Vector3::new(0.0, v_circ, 0.0);

        let (parts, _) = booster_stack();
        let ctx = TickContext { dt: 0.02, vessel: &vessel, parts: &parts, maneuver: None };
        let dv = rig.launch.circularization_dv(&ctx);
        assert!(dv.abs() < 1e-6, "already circular, got {dv}");
    }

    #[test]
    fn disabled_sequencer_is_inert() {
        let mut rig = Rig::new();
        rig.launch.disable();
        let (controls, commands) = rig.tick(2_000.0, 4_000.0);
        assert_eq!(controls, FlightControls::default());
        assert_eq!(commands, TickCommands::default());
        assert_eq!(rig.attitude.attitude(), Attitude::None);
        assert!(!rig.staging.is_enabled());
    }
}
