pub mod autopilot;
pub mod parts;
pub mod state;
mod control_mod;

// The control module: expose control_mod as `control` publicly
pub mod control {
    pub use crate::control_mod::*;
}

// Convenience re-exports
pub mod types {
    pub use crate::autopilot::Autopilot;
    pub use crate::control_mod::attitude::AttitudeController;
    pub use crate::control_mod::heading::{Attitude, NormalSource};
    pub use crate::control_mod::launch::AutoLaunchController;
    pub use crate::control_mod::pid::Pid;
    pub use crate::control_mod::staging::AutoStagingController;
    pub use crate::control_mod::Controller;
    pub use crate::parts::{Part, PartBuilder, PartId, PartTree, ResourceKind};
    pub use crate::state::{FlightControls, Situation, TickCommands, TickContext, VesselSnapshot};
}
