pub mod attitude;
pub mod heading;
pub mod launch;
pub mod pid;
pub mod staging;

pub use attitude::AttitudeController;
pub use heading::{resolve_heading, Attitude, NormalSource};
pub use launch::AutoLaunchController;
pub use pid::Pid;
pub use staging::AutoStagingController;

/// Trait for tick-driven controllers.
///
/// A disabled controller's drive is a complete no-op: its tick logic never
/// runs, so it can neither observe nor mutate anything.
pub trait Controller {
    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    fn enable(&mut self) {
        self.set_enabled(true);
    }

    fn disable(&mut self) {
        self.set_enabled(false);
    }

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// Numeric boundary rule for configuration fields: parse a float, or keep
/// the previous value when the text does not parse.
pub fn parse_or_keep(input: &str, current: f64) -> f64 {
    input.trim().parse().unwrap_or(current)
}
