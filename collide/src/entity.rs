/*!
Entity physics: jump timer, gravity switch, per-frame collision and stacking.

An entity is one hit box plus the state the pair handlers mutate: aliveness,
the entity it rides on this frame, its animation and its tuning.

Frame contract:
- `update_jump` runs first, reading the contacts resolved during the previous frame,
- `pre_update` integrates and collides against the static then the dynamic index,
- `post_update` resolves riding once every entity has moved, then turns each one towards its velocity.
*/

use std::time::Duration;

use crate::bitmask_flags::BitmaskFlags;
use crate::carry;
use crate::collision::body::Body;
use crate::collision::broad::SpatialIndex;
use crate::collision::resolver::CollisionSystem;
use crate::collision::types::{BodyId, CollisionDir, EntityId, Facing, Vec2};
use crate::constants::{FRAMES_PER_SECOND, JUMP_GRACE, MAX_FALL_SPEED, tiles_to_px};
use crate::define_bitmask_flags;
use crate::error::{CollideResult, CollisionError};
use crate::input::ButtonState;
use crate::type_tag::Kind;
use crate::world::World;

define_bitmask_flags!(
    /// Per-entity state bits.
    EntityFlag, u8, { Alive, SkipCollision, CarryResolved, AttackTriggered }
);

/// Initial vertical speed of a jump reaching `height_tiles` after `frames` frames.
#[inline]
pub fn jump_speed(frames: f32, height_tiles: f32) -> f32 {
    -2.0 * tiles_to_px(height_tiles) / (frames / FRAMES_PER_SECOND)
}

/// Constant deceleration that stops [`jump_speed`] exactly at the apex.
#[inline]
pub fn jump_acceleration(frames: f32, height_tiles: f32) -> f32 {
    let t = frames / FRAMES_PER_SECOND;
    2.0 * tiles_to_px(height_tiles) / (t * t)
}

/// Vertical tuning of an entity. Negative velocities point up.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhysicsTuning {
    pub jump_velocity: f32,
    pub short_hop_velocity: f32,
    /// Gravity while rising.
    pub stand_gravity: f32,
    /// Gravity while falling or resting.
    pub fall_gravity: f32,
    /// How long after leaving the ground a jump is still accepted.
    pub jump_grace: Duration,
}

impl PhysicsTuning {
    /// A jumping character.
    ///
    /// Times are in 60 Hz frames, heights in tiles.
    pub fn jumper(
        jump_frames: f32,
        jump_height: f32,
        hop_frames: f32,
        hop_height: f32,
        fall_frames: f32,
    ) -> Self {
        Self {
            jump_velocity: jump_speed(jump_frames, jump_height),
            short_hop_velocity: jump_speed(hop_frames, hop_height),
            stand_gravity: jump_acceleration(jump_frames, jump_height),
            fall_gravity: jump_acceleration(fall_frames, jump_height),
            jump_grace: JUMP_GRACE,
        }
    }

    /// Something that never jumps and falls with a single gravity.
    pub fn faller(fall_frames: f32, fall_height: f32) -> Self {
        let gravity = jump_acceleration(fall_frames, fall_height);
        Self {
            jump_velocity: 0.0,
            short_hop_velocity: 0.0,
            stand_gravity: gravity,
            fall_gravity: gravity,
            jump_grace: JUMP_GRACE,
        }
    }

    /// Stock tuning of each character and enemy.
    pub fn for_kind(kind: Kind) -> Self {
        match kind {
            Kind::Swordy | Kind::DummySwordy => Self::jumper(20.0, 4.5, 18.0, 1.5, 15.0),
            Kind::Gunny | Kind::DummyGunny => Self::jumper(16.0, 3.25, 10.0, 1.0, 14.0),
            Kind::Walky => Self::faller(3.0, 1.0),
            Kind::Spiky | Kind::GreenWalky => Self::faller(16.0, 4.0),
            // Turrets, and anything that is not a character, hang in place.
            _ => Self::faller(1.0, 0.0),
        }
    }
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self::for_kind(Kind::Swordy)
    }
}

/// Sight box following the entity.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sight {
    pub body: BodyId,
    pub offset: Vec2,
}

/// Blocks frontal hits by raising a guard instead.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Guard {
    pub defend_animation: usize,
}

/// What `update_jump` did this frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JumpOutcome {
    DidJump,
    Idle,
}

/// A moving character or enemy, owner of one hit box.
#[derive(Clone, Debug)]
pub struct Entity {
    pub body: BodyId,
    pub kind: Kind,
    pub sight: Option<Sight>,
    pub guard: Option<Guard>,
    /// Entity this one rides on, recomputed every frame.
    pub carrying: Option<EntityId>,
    pub flags: BitmaskFlags<u8>,
    /// Seconds left to start a jump after leaving the ground.
    pub jump_grace: f32,
    pub tuning: PhysicsTuning,
    /// Jump button as last fed to [`Entity::update_jump`].
    pub jump_button: ButtonState,
    pub animation: usize,
    pub animation_count: usize,
    /// Set by the animation driver once a non-looping animation finished.
    pub animation_done: bool,
}

impl Entity {
    pub fn new(body: BodyId, kind: Kind, tuning: PhysicsTuning, animation_count: usize) -> Self {
        Self {
            body,
            kind,
            sight: None,
            guard: None,
            carrying: None,
            flags: BitmaskFlags::from_tags(&[EntityFlag::Alive]),
            jump_grace: 0.0,
            tuning,
            jump_button: ButtonState::Released,
            animation: 0,
            animation_count,
            animation_done: false,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.flags.has(EntityFlag::Alive)
    }

    pub fn kill(&mut self) {
        self.flags.remove(EntityFlag::Alive);
    }

    /// Every hit is lethal; the damage is only reported.
    pub fn hit(&mut self, damage: u16) {
        log::debug!("{:?} hit for {} damage", self.kind, damage);
        self.kill();
    }

    pub fn set_animation(&mut self, index: usize, force: bool) -> CollideResult<()> {
        if index >= self.animation_count {
            return Err(CollisionError::InvalidAnimationIndex {
                index,
                count: self.animation_count,
            });
        }
        if force || index != self.animation {
            self.animation = index;
            self.animation_done = false;
        }
        Ok(())
    }

    /// Stand gravity while rising, fall gravity otherwise.
    pub fn apply_gravity(&self, body: &mut Body) {
        body.acceleration.y = if body.velocity.y < 0.0 {
            self.tuning.stand_gravity
        } else {
            self.tuning.fall_gravity
        };
    }

    /// Advance the jump timer and react to the jump button.
    pub fn update_jump(&mut self, body: &mut Body, jump: ButtonState, dt: f32) -> JumpOutcome {
        self.jump_button = jump;
        if body.collision().has(CollisionDir::Down) {
            self.jump_grace = self.tuning.jump_grace.as_secs_f32();
        }

        let outcome = if self.jump_grace > 0.0 && jump.just_pressed() {
            body.velocity.y = self.tuning.jump_velocity;
            self.jump_grace = 0.0;
            JumpOutcome::DidJump
        } else {
            if jump.just_released() {
                // Releasing twice shortens the hop twice; a button cannot do that.
                let hop = self.tuning.short_hop_velocity;
                let vy = body.velocity.y;
                if vy < hop * 2.0 {
                    body.velocity.y = vy * 0.5;
                } else if vy < hop {
                    body.velocity.y = hop;
                }
            }
            JumpOutcome::Idle
        };

        self.jump_grace -= dt;
        self.apply_gravity(body);
        outcome
    }
}

/// Turn the body towards where it is moving.
pub fn face_velocity(body: &mut Body) {
    if body.velocity.x > 0.0 {
        body.facing = Facing::Right;
    } else if body.velocity.x < 0.0 {
        body.facing = Facing::Left;
    }
}

/// Run [`Entity::update_jump`] for an entity of the world.
pub fn update_jump(world: &mut World, id: EntityId, jump: ButtonState) -> CollideResult<JumpOutcome> {
    let dt = world.dt;
    let (entity, body) = world.entity_body_mut(id)?;
    Ok(entity.update_jump(body, jump, dt))
}

/// Like [`update_jump`], from the raw level of the jump button this frame.
pub fn update_jump_held(world: &mut World, id: EntityId, down: bool) -> CollideResult<JumpOutcome> {
    let previous = world.entity(id)?.jump_button;
    update_jump(world, id, ButtonState::from_levels(previous.is_down(), down))
}

/// Integrate the entity and collide it against the world.
pub fn pre_update<S: SpatialIndex, D: SpatialIndex>(
    world: &mut World,
    sys: &mut CollisionSystem<S, D>,
    id: EntityId,
) -> CollideResult<()> {
    let dt = world.dt;
    let (entity, body) = world.entity_body_mut(id)?;
    entity.carrying = None;
    entity.flags.remove(EntityFlag::CarryResolved);

    entity.apply_gravity(body);
    if body.velocity.y >= MAX_FALL_SPEED {
        body.velocity.y = MAX_FALL_SPEED;
    }
    body.update(dt);

    let origin = body.position;
    let sight = entity.sight;
    if let Some(sight) = sight {
        let sight_body = world.body_mut(sight.body)?;
        sight_body.last_position = sight_body.position;
        sight_body.position = origin + sight.offset;
    }

    collide_entity(world, sys, id)
}

/// Collide the entity against the static index (twice for players) and the dynamic index.
pub fn collide_entity<S: SpatialIndex, D: SpatialIndex>(
    world: &mut World,
    sys: &mut CollisionSystem<S, D>,
    id: EntityId,
) -> CollideResult<()> {
    let entity = world.entity(id)?;
    if entity.flags.has(EntityFlag::SkipCollision) {
        return Ok(());
    }
    let (body, kind, sight) = (entity.body, entity.kind, entity.sight);

    sys.collide_static(world, body)?;
    if kind.is_player() {
        // A player squeezed between two tiles may still overlap the first one.
        sys.collide_static(world, body)?;
    }
    sys.collide_dynamic(world, body)?;
    if let Some(sight) = sight {
        sys.collide_dynamic(world, sight.body)?;
    }
    Ok(())
}

/// Settle the entity on whatever carries it, then face where it is going.
pub fn post_update<S: SpatialIndex, D: SpatialIndex>(
    world: &mut World,
    sys: &mut CollisionSystem<S, D>,
    id: EntityId,
) -> CollideResult<()> {
    if world.entity(id)?.carrying.is_some() {
        carry::resolve_carry(world, sys, id)?;
    }
    let (_, body) = world.entity_body_mut(id)?;
    face_velocity(body);
    Ok(())
}

/// On a fresh contact, the entity landing from above rides the other one.
pub fn collide_two_entities(world: &mut World, a: EntityId, b: EntityId) -> CollideResult<()> {
    let (body_a, body_b) = (world.entity(a)?.body, world.entity(b)?.body);
    let (pa, pb) = world.body_pair_mut(body_a, body_b)?;
    if !Body::just_overlapped(pa, pb) {
        return Ok(());
    }
    let (a_down, b_down) = (
        pa.collision().has(CollisionDir::Down),
        pb.collision().has(CollisionDir::Down),
    );

    if a_down {
        if world.entity(b)?.carrying != Some(a) {
            world.entity_mut(a)?.carrying = Some(b);
        }
    } else if b_down && world.entity(a)?.carrying != Some(b) {
        world.entity_mut(b)?.carrying = Some(a);
    }
    Ok(())
}

/// Decide whether an attack on a guarding entity lands.
///
/// Reads the sides touched this frame, so the caller records the contact first.
/// A blocked attack turns the entity towards the attacker and raises the guard.
pub fn on_guarded_attack(world: &mut World, id: EntityId) -> CollideResult<bool> {
    let (entity, body) = world.entity_body_mut(id)?;
    let Some(guard) = entity.guard else {
        return Ok(true);
    };
    let touched = body.collision();
    let defending = entity.animation == guard.defend_animation;

    if defending && entity.animation_done {
        return Ok(true);
    }
    let from_behind = (touched.has(CollisionDir::Left) && body.facing == Facing::Right)
        || (touched.has(CollisionDir::Right) && body.facing == Facing::Left);
    if defending && from_behind {
        return Ok(true);
    }

    if touched.has(CollisionDir::Left) {
        body.facing = Facing::Left;
    } else if touched.has(CollisionDir::Right) {
        body.facing = Facing::Right;
    }
    entity.set_animation(guard.defend_animation, true)?;
    Ok(false)
}
