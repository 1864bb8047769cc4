/*!
Pair dispatch table.

The table is built once from a declarative list of [`PairGroup`]s. Each group
classifies the cross product of two kind lists as ignored or as handled by a
named [`Handler`]. Every declared `(A, B)` registers both merge keys:
- `(A, B)` with `first_case = true`: runtime box #1 plays the role of `A`,
- `(B, A)` with `first_case = false`: runtime box #2 plays the role of `A`.

Declaring a pair twice is allowed when both declarations agree (the first one
wins); declaring two different responses for one pair is rejected.
*/

use std::collections::HashMap;

use crate::error::{CollideResult, CollisionError};
use crate::type_tag::{Kind, MergeKey, TypeTag, merge_key};

/// Named resolution routine, see [`crate::collision::handlers`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Handler {
    /// (floor, entity)
    FloorContact,
    /// (floor, projectile)
    FloorProjectile,
    /// (projectile, entity that blocks it)
    DenyProjectile,
    /// (hazard, entity)
    HazardContact,
    /// (entity, entity)
    EntityContact,
    /// (attack, entity)
    AttackEntity,
    /// (attack, projectile)
    ReflectProjectile,
    /// (teleport bullet, anything that swallows it)
    TeleportIgnore,
    /// (teleport bullet, entity)
    TeleportEntity,
    /// (teleport bullet, floor)
    TeleportFloor,
    /// (dummy, player)
    PlayerDummy,
    /// (load zone, player or dummy)
    Loadzone,
    /// (checkpoint, player)
    Checkpoint,
    /// (entity, pressure pad)
    PressurePad,
    /// (sight box, entity)
    GuardView,
}

/// Rule stored under one merge key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    Ignore,
    SelfIgnore,
    Handler { handler: Handler, first_case: bool },
}

impl Rule {
    fn same_response(&self, other: &Rule) -> bool {
        match (self, other) {
            (Rule::Ignore | Rule::SelfIgnore, Rule::Ignore | Rule::SelfIgnore) => true,
            (Rule::Handler { handler: a, .. }, Rule::Handler { handler: b, .. }) => a == b,
            _ => false,
        }
    }
}

/// What a declared pair does.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Ignore,
    Handle(Handler),
}

/// Cross product of two kind lists sharing one response.
#[derive(Copy, Clone, Debug)]
pub struct PairGroup {
    pub first: &'static [Kind],
    pub second: &'static [Kind],
    pub response: Response,
}

const fn group(first: &'static [Kind], second: &'static [Kind], response: Response) -> PairGroup {
    PairGroup {
        first,
        second,
        response,
    }
}

use Kind::*;

const FLOORS: &[Kind] = &[Floor, FloorNoTeleport, BluePlatform, Door];
const WALKERS: &[Kind] = &[Spiky, Walky, Turret, GreenWalky, Gunny, Swordy];
const ENEMIES: &[Kind] = &[Spiky, Walky, GreenWalky, Turret];
const PLAYERS: &[Kind] = &[Swordy, Gunny];
const DUMMIES: &[Kind] = &[DummySwordy, DummyGunny];
const EFFECTS: &[Kind] = &[Fx, SwordFx];

/// The game's collision rules.
pub const STANDARD_RULES: &[PairGroup] = &[
    // Level geometry.
    group(FLOORS, WALKERS, Response::Handle(Handler::FloorContact)),
    group(FLOORS, &[GreenWalkyAttack], Response::Handle(Handler::FloorProjectile)),
    group(FLOORS, FLOORS, Response::Ignore),
    group(
        FLOORS,
        &[SwordAttack, Checkpoint, Loadzone, Spike, GreenWalkyView, PressurePad, DummySwordy, DummyGunny],
        Response::Ignore,
    ),
    // Enemy projectile.
    group(
        &[GreenWalkyAttack],
        &[Swordy, Gunny, Spiky, Walky, GreenWalky],
        Response::Handle(Handler::AttackEntity),
    ),
    group(&[GreenWalkyAttack], &[Turret], Response::Handle(Handler::DenyProjectile)),
    group(
        &[GreenWalkyAttack],
        &[
            Loadzone,
            TeleportBullet,
            Checkpoint,
            GreenWalkyAttack,
            GreenWalkyView,
            PressurePad,
            DummySwordy,
            DummyGunny,
        ],
        Response::Ignore,
    ),
    // Pure visuals never collide.
    group(EFFECTS, &Kind::ALL, Response::Ignore),
    // Sword swings.
    group(
        &[SwordAttack],
        &[GreenWalkyAttack, TeleportBullet],
        Response::Handle(Handler::ReflectProjectile),
    ),
    group(&[SwordAttack], &[Spiky, Walky, GreenWalky], Response::Handle(Handler::AttackEntity)),
    group(
        &[SwordAttack],
        &[
            Turret,
            Swordy,
            Gunny,
            SwordAttack,
            Checkpoint,
            Spike,
            Loadzone,
            GreenWalkyView,
            PressurePad,
            DummySwordy,
            DummyGunny,
        ],
        Response::Ignore,
    ),
    // Spikes. Turrets stand on them like on a floor.
    group(&[Spike], &[Turret], Response::Handle(Handler::FloorContact)),
    group(
        &[Spike],
        &[Spiky, Walky, GreenWalky, Gunny, Swordy],
        Response::Handle(Handler::HazardContact),
    ),
    group(&[Spike], &[GreenWalkyAttack], Response::Handle(Handler::FloorProjectile)),
    group(
        &[Spike],
        &[Loadzone, Checkpoint, Spike, GreenWalkyView, PressurePad, DummySwordy, DummyGunny],
        Response::Ignore,
    ),
    // Entities stacking on each other.
    group(WALKERS, WALKERS, Response::Handle(Handler::EntityContact)),
    group(WALKERS, &[PressurePad], Response::Handle(Handler::PressurePad)),
    group(&[GreenWalkyView], WALKERS, Response::Handle(Handler::GuardView)),
    // Stand-ins left behind by the inactive player.
    group(DUMMIES, PLAYERS, Response::Handle(Handler::PlayerDummy)),
    group(DUMMIES, DUMMIES, Response::Ignore),
    group(DUMMIES, ENEMIES, Response::Ignore),
    group(
        DUMMIES,
        &[TeleportBullet, Checkpoint, GreenWalkyView, PressurePad],
        Response::Ignore,
    ),
    group(
        &[GreenWalkyView],
        &[Loadzone, TeleportBullet, Checkpoint, GreenWalkyView, PressurePad],
        Response::Ignore,
    ),
    // Events.
    group(&[Checkpoint], PLAYERS, Response::Handle(Handler::Checkpoint)),
    group(&[Checkpoint], ENEMIES, Response::Ignore),
    group(
        &[Checkpoint],
        &[Loadzone, TeleportBullet, Checkpoint, PressurePad],
        Response::Ignore,
    ),
    group(&[Loadzone], PLAYERS, Response::Handle(Handler::Loadzone)),
    group(&[Loadzone], DUMMIES, Response::Handle(Handler::Loadzone)),
    group(&[Loadzone], ENEMIES, Response::Ignore),
    group(&[Loadzone], &[Loadzone, PressurePad], Response::Ignore),
    group(&[PressurePad], &[PressurePad], Response::Ignore),
    // Teleporter bullet.
    group(
        &[TeleportBullet],
        &[Turret, Spike, FloorNoTeleport, Door],
        Response::Handle(Handler::TeleportIgnore),
    ),
    group(
        &[TeleportBullet],
        &[Spiky, Walky, Swordy, GreenWalky],
        Response::Handle(Handler::TeleportEntity),
    ),
    group(
        &[TeleportBullet],
        &[BluePlatform, Floor],
        Response::Handle(Handler::TeleportFloor),
    ),
    group(
        &[TeleportBullet],
        &[TeleportBullet, Loadzone, PressurePad, Gunny],
        Response::Ignore,
    ),
];

/// Merge-key lookup table.
#[derive(Debug, Default, Clone)]
pub struct RuleTable {
    rules: HashMap<MergeKey, Rule>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a list of groups.
    pub fn build(groups: &[PairGroup]) -> CollideResult<Self> {
        let mut table = Self::new();
        for g in groups {
            for &a in g.first {
                for &b in g.second {
                    table.declare(a, b, g.response)?;
                }
            }
        }
        Ok(table)
    }

    /// Build the table from [`STANDARD_RULES`].
    pub fn standard() -> CollideResult<Self> {
        Self::build(STANDARD_RULES)
    }

    /// Register `(first, second)` and its mirror.
    pub fn declare(&mut self, first: Kind, second: Kind, response: Response) -> CollideResult<()> {
        let (forward, mirrored) = match response {
            Response::Ignore if first == second => (Rule::SelfIgnore, Rule::SelfIgnore),
            Response::Ignore => (Rule::Ignore, Rule::Ignore),
            Response::Handle(handler) => (
                Rule::Handler {
                    handler,
                    first_case: true,
                },
                Rule::Handler {
                    handler,
                    first_case: false,
                },
            ),
        };
        self.insert(first, second, forward)?;
        if first != second {
            self.insert(second, first, mirrored)?;
        }
        Ok(())
    }

    fn insert(&mut self, first: Kind, second: Kind, rule: Rule) -> CollideResult<()> {
        let key = merge_key(first.tag(), second.tag());
        match self.rules.get(&key) {
            Some(existing) if !existing.same_response(&rule) => {
                Err(CollisionError::ConflictingRule { first, second })
            }
            Some(_) => Ok(()),
            None => {
                self.rules.insert(key, rule);
                Ok(())
            }
        }
    }

    /// Rule for an ordered pair of runtime tags. Payload bits are ignored.
    #[inline]
    pub fn lookup(&self, first: TypeTag, second: TypeTag) -> Option<Rule> {
        self.rules.get(&merge_key(first, second)).copied()
    }

    /// Ordered pairs over `kinds` that have no rule.
    pub fn missing_pairs(&self, kinds: &[Kind]) -> Vec<(Kind, Kind)> {
        let mut missing = Vec::new();
        for &a in kinds {
            for &b in kinds {
                if self.lookup(a.tag(), b.tag()).is_none() {
                    missing.push((a, b));
                }
            }
        }
        missing
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
