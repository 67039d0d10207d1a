use std::collections::HashSet;

use crate::parts::{FuelFeed, Part, PartId, PartState, PartTree, ResourceKind};
use crate::state::{TickCommands, TickContext, VesselSnapshot};
use super::Controller;

// ---------------------------------------------------------------------------
// Staging safety analyzer
// ---------------------------------------------------------------------------
//
// Every tick the analyzer re-walks the part tree from scratch and decides
// whether firing the next stage would throw away hardware still in use.
// Nothing is cached: parts can appear or vanish between ticks.

/// Whether an engine can currently draw propellant.
pub fn engine_has_fuel(part: &Part) -> bool {
    match &part.fuel_feed {
        Some(FuelFeed::Module { flamed_out, .. }) => !flamed_out,
        Some(FuelFeed::Legacy { probe_ok }) => *probe_ok,
        None => false,
    }
}

/// Walk the parent chain looking for a decoupler or launch clamp that fires
/// in `stage`. The hop count is bounded by the tree size so malformed host
/// data fails closed (treated as not decoupled) instead of looping.
pub fn is_decoupled_in_stage(parts: &PartTree, id: PartId, stage: i32) -> bool {
    let mut cur = Some(id);
    let mut hops = 0;
    while let Some(i) = cur {
        let Some(part) = parts.get(i) else {
            return false;
        };
        if (part.caps.decoupler || part.caps.launch_clamp) && part.stage == stage {
            return true;
        }
        cur = part.parent();
        hops += 1;
        if hops > parts.len() {
            return false;
        }
    }
    false
}

/// An engine that still fires once detached and is decoupled in its own
/// activation stage jettisons itself; the guards leave it alone.
pub fn is_separatron(parts: &PartTree, id: PartId) -> bool {
    let part = &parts[id];
    part.activates_when_detached
        && part.caps.engine
        && is_decoupled_in_stage(parts, id, part.stage)
}

/// Resource kinds drawn by any non-separatron engine module at or above the
/// current stage. These are the fuels that still matter downstream.
pub fn burned_resources(parts: &PartTree, current_stage: i32) -> HashSet<ResourceKind> {
    let mut kinds = HashSet::new();
    for id in parts.ids() {
        let part = &parts[id];
        if part.stage < current_stage || !part.caps.engine || is_separatron(parts, id) {
            continue;
        }
        if let Some(FuelFeed::Module { propellants, .. }) = &part.fuel_feed {
            kinds.extend(propellants.iter().copied());
        }
    }
    kinds
}

fn tank_has_fuel(part: &Part) -> bool {
    part.caps.fuel_tank
        && part
            .resources
            .iter()
            .any(|r| !r.kind.is_charge() && r.amount > 0.0)
}

/// Part has drained every non-charge resource it ever carried.
fn is_drained(part: &Part) -> bool {
    let mut had = false;
    let mut has = false;
    for r in &part.resources {
        if r.kind.is_charge() {
            continue;
        }
        if r.capacity > 0.0 {
            had = true;
        }
        if r.amount > 0.0 {
            has = true;
        }
    }
    had && !has
}

fn has_active_or_idle_descendant(
    parts: &PartTree,
    id: PartId,
    burned: &HashSet<ResourceKind>,
) -> bool {
    let part = &parts[id];
    if matches!(part.state, PartState::Active | PartState::Idle)
        && part.caps.engine
        && !is_separatron(parts, id)
        && engine_has_fuel(part)
    {
        return true;
    }
    if tank_has_fuel(part) {
        return true;
    }
    if !is_separatron(parts, id)
        && part
            .resources
            .iter()
            .any(|r| r.amount > 0.0 && !r.kind.is_charge() && burned.contains(&r.kind))
    {
        return true;
    }
    part.children()
        .iter()
        .any(|&child| has_active_or_idle_descendant(parts, child, burned))
}

fn has_deactivated_engine_or_tank_descendant(parts: &PartTree, id: PartId) -> bool {
    let part = &parts[id];
    if part.state == PartState::Deactivated
        && (part.caps.fuel_tank || part.caps.engine)
        && !is_separatron(parts, id)
    {
        return true;
    }
    if is_drained(part) {
        return true;
    }
    if part.caps.engine && !engine_has_fuel(part) {
        return true;
    }
    part.children()
        .iter()
        .any(|&child| has_deactivated_engine_or_tank_descendant(parts, child))
}

/// Guard 2: would `stage` separate an active or idle engine, a tank that
/// still holds fuel, or anything still holding a burned resource?
pub fn decouples_active_or_idle(
    parts: &PartTree,
    stage: i32,
    burned: &HashSet<ResourceKind>,
) -> bool {
    parts.ids().any(|id| {
        let part = &parts[id];
        part.stage == stage
            && (part.caps.decoupler || part.caps.launch_clamp)
            && has_active_or_idle_descendant(parts, id, burned)
    })
}

/// Guard 3: does `stage` deploy a parachute that is not itself decoupled in
/// the same stage?
pub fn has_staying_chutes(parts: &PartTree, stage: i32) -> bool {
    parts.ids().any(|id| {
        let part = &parts[id];
        part.stage == stage
            && part.caps.parachute
            && !is_decoupled_in_stage(parts, id, stage)
    })
}

/// Does `stage` fire any decoupler? Launch clamps are deliberately not
/// counted here: releasing clamps needs no payoff.
pub fn fires_decoupler(parts: &PartTree, stage: i32) -> bool {
    parts.ids().any(|id| {
        let part = &parts[id];
        part.stage == stage && part.caps.decoupler
    })
}

/// Guard 4 payoff check: does some decoupler in `stage` shed a deactivated
/// engine, a drained tank, or a starved engine?
pub fn decouples_deactivated(parts: &PartTree, stage: i32) -> bool {
    parts.ids().any(|id| {
        let part = &parts[id];
        part.stage == stage
            && part.caps.decoupler
            && has_deactivated_engine_or_tank_descendant(parts, id)
    })
}

/// Full per-tick decision: is it safe and useful to fire the next stage?
pub fn safe_to_stage(vessel: &VesselSnapshot, parts: &PartTree) -> bool {
    if !vessel.lifted_off() || vessel.current_stage <= 0 {
        return false;
    }
    let stage = vessel.current_stage - 1;

    let burned = burned_resources(parts, vessel.current_stage);
    if decouples_active_or_idle(parts, stage, &burned) {
        return false;
    }
    if has_staying_chutes(parts, stage) {
        return false;
    }
    // Only fire decouplers that shed spent hardware; a decoupler with no
    // payoff is load-bearing structure.
    if fires_decoupler(parts, stage) && !decouples_deactivated(parts, stage) {
        return false;
    }
    true
}

// ---------------------------------------------------------------------------
// Controller wrapper
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AutoStagingController {
    enabled: bool,
}

impl AutoStagingController {
    pub fn new() -> Self {
        Self { enabled: false }
    }

    pub fn drive(&mut self, ctx: &TickContext, commands: &mut TickCommands) {
        if !self.enabled {
            return;
        }
        if safe_to_stage(ctx.vessel, ctx.parts) {
            commands.advance_stage = true;
        }
    }
}

impl Default for AutoStagingController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for AutoStagingController {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn name(&self) -> &str {
        "auto-staging"
    }
}
