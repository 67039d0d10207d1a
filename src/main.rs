use rocket_autopilot::control::{Attitude, Controller};
use rocket_autopilot::parts::presets::{booster_stack, burn_out_booster};
use rocket_autopilot::state::{presets, FlightControls, Situation, TickContext};
use rocket_autopilot::types::Autopilot;

// ---------------------------------------------------------------------------
// Scripted ascent demo: the host side is faked with a simple altitude
// profile; the autopilot reacts tick by tick.
// ---------------------------------------------------------------------------

fn main() {
    let mut autopilot = Autopilot::new();
    autopilot.enable();
    autopilot.launch.enable();

    let (mut parts, ids) = booster_stack();
    let mut vessel = presets::pad_snapshot();
    vessel.situation = Situation::Flying;
    vessel.current_stage = 3;

    let dt = 0.02;
    let mut time = 0.0;
    let mut booster_spent = false;

    println!();
    println!("====================================================================");
    println!("  AUTOPILOT ASCENT DEMO — booster stack, target apoapsis 100 km");
    println!("====================================================================");
    println!();
    println!(
        "  {:>7}  {:>9}  {:>9}  {:>6}  {:>13}  {}",
        "t (s)", "alt (m)", "apo (m)", "thr", "attitude", "event"
    );
    println!("  {}", "─".repeat(66));

    for step in 0..200_000u64 {
        time = step as f64 * dt;

        // Crude host: altitude and apoapsis climb while the throttle is up.
        vessel.altitude += vessel.orbital_velocity.x * dt;
        vessel.apoapsis = vessel.altitude * 1.8;
        vessel.position.x = vessel.body_radius + vessel.altitude;
        vessel.orbital_velocity.x = 120.0;
        vessel.orbital_velocity.y += 2.0 * dt;

        // Booster burns out a third of the way up the turn.
        if !booster_spent && vessel.altitude > 14_000.0 {
            burn_out_booster(&mut parts, &ids);
            booster_spent = true;
            report(time, &vessel, None, &autopilot, "booster burnout");
        }

        let mut controls = FlightControls::default();
        let ctx = TickContext { dt, vessel: &vessel, parts: &parts, maneuver: None };
        let commands = autopilot.drive(&ctx, &mut controls);

        if commands.advance_stage {
            vessel.current_stage -= 1;
            report(time, &vessel, Some(&controls), &autopilot, "ADVANCE STAGE");
        }

        if let Some(dv) = commands.circularize {
            report(time, &vessel, Some(&controls), &autopilot, "plan burn");
            println!();
            println!("  Circularization burn at apoapsis: {:.1} m/s prograde", dv);
            break;
        }

        if step % 25_000 == 0 {
            report(time, &vessel, Some(&controls), &autopilot, "");
        }
    }

    println!();
    println!("  Flight time: {:.0} s, final stage index: {}", time, vessel.current_stage);
    println!("====================================================================");
    println!();
}

fn report(
    time: f64,
    vessel: &rocket_autopilot::state::VesselSnapshot,
    controls: Option<&FlightControls>,
    autopilot: &Autopilot,
    event: &str,
) {
    let throttle = controls.map_or("-".into(), |c| format!("{:.2}", c.main_throttle));
    println!(
        "  {:>7.1}  {:>9.0}  {:>9.0}  {:>6}  {:>13}  {}",
        time,
        vessel.altitude,
        vessel.apoapsis,
        throttle,
        attitude_label(autopilot.attitude.attitude()),
        event
    );
}

fn attitude_label(attitude: Attitude) -> &'static str {
    match attitude {
        Attitude::None => "none",
        Attitude::Prograde => "prograde",
        Attitude::Retrograde => "retrograde",
        Attitude::NormalPlus => "normal+",
        Attitude::NormalMinus => "normal-",
        Attitude::RadialUp => "radial up",
        Attitude::RadialDown => "radial down",
        Attitude::ManeuverNode => "maneuver node",
        Attitude::UserDefined => "user defined",
    }
}
