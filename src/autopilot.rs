use crate::control_mod::attitude::AttitudeController;
use crate::control_mod::launch::AutoLaunchController;
use crate::control_mod::staging::AutoStagingController;
use crate::control_mod::Controller;
use crate::state::{FlightControls, TickCommands, TickContext};

// ---------------------------------------------------------------------------
// Autopilot: registry and per-tick dispatch of the three controllers
// ---------------------------------------------------------------------------

/// Root of the control core. The host calls [`Autopilot::drive`] once per
/// fixed simulation tick; everything below runs synchronously inside that
/// call.
///
/// Dispatch order is fixed and deterministic: auto-launch first (it
/// retargets the attitude controller for the same tick), then attitude,
/// then auto-staging.
#[derive(Debug, Clone)]
pub struct Autopilot {
    pub attitude: AttitudeController,
    pub launch: AutoLaunchController,
    pub staging: AutoStagingController,
    enabled: bool,
}

impl Autopilot {
    pub fn new() -> Self {
        let mut attitude = AttitudeController::new();
        // Attitude hold is armed from the start (mode None until told
        // otherwise); the master switch and the sequencers are opt-in.
        attitude.enable();
        Self {
            attitude,
            launch: AutoLaunchController::new(),
            staging: AutoStagingController::new(),
            enabled: false,
        }
    }

    /// One control tick. Disabled controllers are skipped entirely; with
    /// the master switch off nothing runs at all.
    pub fn drive(&mut self, ctx: &TickContext, controls: &mut FlightControls) -> TickCommands {
        let mut commands = TickCommands::default();
        if !self.enabled {
            return commands;
        }

        let Self { attitude, launch, staging, enabled } = self;
        launch.drive(ctx, controls, attitude, staging, enabled, &mut commands);
        attitude.drive(ctx, controls);
        staging.drive(ctx, &mut commands);

        commands
    }
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for Autopilot {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn name(&self) -> &str {
        "autopilot"
    }
}
