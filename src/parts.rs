use thiserror::Error;

// ---------------------------------------------------------------------------
// Part tree: arena-indexed view of the vehicle's component hierarchy
// ---------------------------------------------------------------------------
//
// The host owns and mutates the real part graph; this is the read-only shape
// the staging analyzer walks. Parts live in a flat arena indexed by `PartId`
// with parent/children links, so upward walks are plain index loops and the
// tree cannot express a pointer cycle (a malformed parent chain is still
// checked defensively by the analyzer).

pub type PartId = usize;

/// Lifecycle state of engines and other consumable parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartState {
    Idle,
    Active,
    Deactivated,
}

/// Resource kinds tracked by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    LiquidFuel,
    Oxidizer,
    SolidFuel,
    MonoPropellant,
    ElectricCharge,
    XenonGas,
}

impl ResourceKind {
    /// Electric charge is reserved and excluded from every fuel check.
    pub fn is_charge(self) -> bool {
        self == ResourceKind::ElectricCharge
    }
}

/// One stored resource on a part.
#[derive(Debug, Clone, Copy)]
pub struct Resource {
    pub kind: ResourceKind,
    pub amount: f64,
    pub capacity: f64,
}

/// Capability flags. A part may set several (e.g. an engine that is also
/// its own decoupler).
#[derive(Debug, Clone, Copy, Default)]
pub struct Caps {
    pub engine: bool,
    pub decoupler: bool,
    pub launch_clamp: bool,
    pub parachute: bool,
    pub fuel_tank: bool,
}

/// How an engine draws propellant.
#[derive(Debug, Clone)]
pub enum FuelFeed {
    /// Resource-consuming engine module: starvation is a flameout flag.
    Module {
        propellants: Vec<ResourceKind>,
        flamed_out: bool,
    },
    /// Legacy engine probed with a zero-quantity fuel request.
    Legacy { probe_ok: bool },
}

/// One vehicle component.
#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    /// Stage index at which this part fires, if it has activation behavior.
    pub stage: i32,
    pub state: PartState,
    pub caps: Caps,
    pub resources: Vec<Resource>,
    /// True for separatron-style engines that still fire once detached.
    pub activates_when_detached: bool,
    pub fuel_feed: Option<FuelFeed>,
    parent: Option<PartId>,
    children: Vec<PartId>,
}

impl Part {
    pub fn parent(&self) -> Option<PartId> {
        self.parent
    }

    pub fn children(&self) -> &[PartId] {
        &self.children
    }

    /// Total stored amount of a resource kind on this part.
    pub fn resource_amount(&self, kind: ResourceKind) -> f64 {
        self.resources
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.amount)
            .sum()
    }

    /// Drain a resource kind to zero (host-side mutation between ticks).
    pub fn drain(&mut self, kind: ResourceKind) {
        for r in &mut self.resources {
            if r.kind == kind {
                r.amount = 0.0;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PartTreeError {
    #[error("parent part {0} does not exist")]
    InvalidParent(PartId),
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PartTree {
    parts: Vec<Part>,
}

impl PartTree {
    /// Create a tree containing only the vehicle root.
    pub fn new(root: Part) -> Self {
        let mut root = root;
        root.parent = None;
        root.children.clear();
        Self { parts: vec![root] }
    }

    /// Attach a part under an existing parent, returning its id.
    pub fn attach(&mut self, parent: PartId, part: Part) -> Result<PartId, PartTreeError> {
        if parent >= self.parts.len() {
            return Err(PartTreeError::InvalidParent(parent));
        }
        let id = self.parts.len();
        let mut part = part;
        part.parent = Some(parent);
        part.children.clear();
        self.parts.push(part);
        self.parts[parent].children.push(id);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = PartId> {
        0..self.parts.len()
    }

    pub fn get(&self, id: PartId) -> Option<&Part> {
        self.parts.get(id)
    }

    pub fn part_mut(&mut self, id: PartId) -> Option<&mut Part> {
        self.parts.get_mut(id)
    }

    /// Corrupt a parent link. Test-only: the analyzer must fail closed on
    /// malformed host data instead of walking forever.
    #[cfg(test)]
    pub(crate) fn corrupt_parent(&mut self, id: PartId, parent: Option<PartId>) {
        self.parts[id].parent = parent;
    }
}

impl std::ops::Index<PartId> for PartTree {
    type Output = Part;

    fn index(&self, id: PartId) -> &Part {
        &self.parts[id]
    }
}

// ---------------------------------------------------------------------------
// Part builder
// ---------------------------------------------------------------------------

pub struct PartBuilder {
    part: Part,
}

impl PartBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            part: Part {
                name: name.into(),
                stage: -1,
                state: PartState::Idle,
                caps: Caps::default(),
                resources: vec![],
                activates_when_detached: false,
                fuel_feed: None,
                parent: None,
                children: vec![],
            },
        }
    }

    pub fn stage(mut self, stage: i32) -> Self {
        self.part.stage = stage;
        self
    }

    pub fn state(mut self, state: PartState) -> Self {
        self.part.state = state;
        self
    }

    pub fn active(self) -> Self {
        self.state(PartState::Active)
    }

    pub fn deactivated(self) -> Self {
        self.state(PartState::Deactivated)
    }

    pub fn engine(mut self, feed: FuelFeed) -> Self {
        self.part.caps.engine = true;
        self.part.fuel_feed = Some(feed);
        self
    }

    pub fn decoupler(mut self) -> Self {
        self.part.caps.decoupler = true;
        self
    }

    pub fn launch_clamp(mut self) -> Self {
        self.part.caps.launch_clamp = true;
        self
    }

    pub fn parachute(mut self) -> Self {
        self.part.caps.parachute = true;
        self
    }

    pub fn fuel_tank(mut self) -> Self {
        self.part.caps.fuel_tank = true;
        self
    }

    pub fn activates_when_detached(mut self) -> Self {
        self.part.activates_when_detached = true;
        self
    }

    pub fn resource(mut self, kind: ResourceKind, amount: f64, capacity: f64) -> Self {
        self.part.resources.push(Resource { kind, amount, capacity });
        self
    }

    pub fn build(self) -> Part {
        self.part
    }
}

// ---------------------------------------------------------------------------
// Preset vehicles
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// Two-stage booster stack, staged the usual way:
    ///   stage 2 — launch clamps release, first engine ignites
    ///   stage 1 — interstage decoupler drops the booster, sustainer ignites
    ///   stage 0 — payload chute deploys (with its own decoupler)
    ///
    /// Returns the tree plus the ids of the parts tests and the demo poke at.
    pub fn booster_stack() -> (PartTree, BoosterStackIds) {
        let mut tree = PartTree::new(PartBuilder::new("payload-pod").stage(-1).build());
        let root = 0;

        let chute_decoupler = tree
            .attach(root, PartBuilder::new("chute-decoupler").stage(0).decoupler().build())
            .unwrap();
        let chute = tree
            .attach(chute_decoupler, PartBuilder::new("main-chute").stage(0).parachute().build())
            .unwrap();

        let sustainer_tank = tree
            .attach(
                root,
                PartBuilder::new("sustainer-tank")
                    .stage(-1)
                    .fuel_tank()
                    .resource(ResourceKind::LiquidFuel, 90.0, 90.0)
                    .resource(ResourceKind::Oxidizer, 110.0, 110.0)
                    .build(),
            )
            .unwrap();
        let sustainer_engine = tree
            .attach(
                sustainer_tank,
                PartBuilder::new("sustainer-engine")
                    .stage(1)
                    .engine(FuelFeed::Module {
                        propellants: vec![ResourceKind::LiquidFuel, ResourceKind::Oxidizer],
                        flamed_out: false,
                    })
                    .build(),
            )
            .unwrap();

        let interstage = tree
            .attach(
                sustainer_engine,
                PartBuilder::new("interstage-decoupler").stage(1).decoupler().build(),
            )
            .unwrap();
        let booster_tank = tree
            .attach(
                interstage,
                PartBuilder::new("booster-tank")
                    .stage(-1)
                    .fuel_tank()
                    .resource(ResourceKind::LiquidFuel, 360.0, 360.0)
                    .resource(ResourceKind::Oxidizer, 440.0, 440.0)
                    .build(),
            )
            .unwrap();
        let booster_engine = tree
            .attach(
                booster_tank,
                PartBuilder::new("booster-engine")
                    .stage(2)
                    .active()
                    .engine(FuelFeed::Module {
                        propellants: vec![ResourceKind::LiquidFuel, ResourceKind::Oxidizer],
                        flamed_out: false,
                    })
                    .build(),
            )
            .unwrap();

        let clamp = tree
            .attach(booster_tank, PartBuilder::new("launch-clamp").stage(2).launch_clamp().build())
            .unwrap();

        let ids = BoosterStackIds {
            root,
            chute_decoupler,
            chute,
            sustainer_tank,
            sustainer_engine,
            interstage,
            booster_tank,
            booster_engine,
            clamp,
        };
        (tree, ids)
    }

    pub struct BoosterStackIds {
        pub root: PartId,
        pub chute_decoupler: PartId,
        pub chute: PartId,
        pub sustainer_tank: PartId,
        pub sustainer_engine: PartId,
        pub interstage: PartId,
        pub booster_tank: PartId,
        pub booster_engine: PartId,
        pub clamp: PartId,
    }

    /// Drain and shut down the booster so only the interstage remains useful.
    pub fn burn_out_booster(tree: &mut PartTree, ids: &BoosterStackIds) {
        let tank = tree.part_mut(ids.booster_tank).unwrap();
        tank.drain(ResourceKind::LiquidFuel);
        tank.drain(ResourceKind::Oxidizer);

        let engine = tree.part_mut(ids.booster_engine).unwrap();
        engine.state = PartState::Deactivated;
        if let Some(FuelFeed::Module { flamed_out, .. }) = engine.fuel_feed.as_mut() {
            *flamed_out = true;
        }
    }
}
