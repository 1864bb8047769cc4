/*!
Teleport target tracking and the swap itself.

A teleport bullet leaves behind at most one pending target: either an entity or
a fixed point next to a wall. The target is shown by a marker effect, which is
also what a positional teleport lands on.
*/

use crate::collision::broad::SpatialIndex;
use crate::collision::resolver::CollisionSystem;
use crate::collision::types::{Aabb, BodyId, EntityId, Vec2};
use crate::constants::{MARKER_SIDE_OFFSET, MARKER_SIZE};
use crate::effects::{Animation, EffectSpawn};
use crate::entity::EntityFlag;
use crate::error::CollideResult;
use crate::type_tag::Kind;
use crate::world::World;

/// Where a positional target sits relative to what the bullet struck.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TargetSide {
    /// Attached to an entity.
    #[default]
    Entity,
    /// Right of a wall the bullet hit from its right side.
    Left,
    /// Left of a wall the bullet hit from its left side.
    Right,
}

impl TargetSide {
    /// Horizontal draw offset of the marker, leaning it against the wall.
    pub fn marker_offset(self) -> f32 {
        match self {
            TargetSide::Entity => 0.0,
            TargetSide::Left => -MARKER_SIDE_OFFSET,
            TargetSide::Right => MARKER_SIDE_OFFSET,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TeleportTarget {
    pub entity: Option<EntityId>,
    pub marker: Option<BodyId>,
    pub side: TargetSide,
}

impl TeleportTarget {
    #[inline]
    pub fn is_set(&self) -> bool {
        self.marker.is_some()
    }
}

fn marker_bounds(center: Vec2) -> Aabb {
    Aabb {
        min: center - Vec2::repeat(MARKER_SIZE / 2.0),
        size: Vec2::repeat(MARKER_SIZE),
    }
}

/// Where the marker should be drawn: its box leaned against the struck wall.
pub fn marker_draw_position(world: &World) -> Option<Vec2> {
    let target = world.teleport;
    let marker = world.bodies.get(target.marker?)?;
    Some(marker.position + Vec2::new(target.side.marker_offset(), 0.0))
}

/// Drop the pending target and its marker.
pub fn clear_target(world: &mut World) {
    if let Some(marker) = world.teleport.marker {
        world.remove_effect(marker);
    }
    world.teleport = TeleportTarget::default();
}

/// Target a fixed point, replacing any previous target.
pub fn target_position(world: &mut World, point: Vec2, side: TargetSide) -> CollideResult<()> {
    clear_target(world);
    let marker = world.spawn_effect(EffectSpawn::new(
        marker_bounds(point),
        Kind::Fx.tag(),
        Animation::TeleportMarker,
    ))?;
    world.teleport = TeleportTarget {
        entity: None,
        marker: Some(marker),
        side,
    };
    Ok(())
}

/// Target an entity, replacing any previous target.
pub fn target_entity(world: &mut World, id: EntityId) -> CollideResult<()> {
    let center = world.body(world.entity(id)?.body)?.center();
    target_position(world, center, TargetSide::Entity)?;
    world.teleport.entity = Some(id);
    Ok(())
}

/// Keep the marker on its entity; forget targets that died or left the screen.
pub fn update_target(world: &mut World) -> CollideResult<()> {
    let Some(marker) = world.teleport.marker else {
        return Ok(());
    };

    if let Some(id) = world.teleport.entity {
        let target = world.entity(id)?;
        if !target.is_alive() {
            clear_target(world);
            return Ok(());
        }
        let center = world.body(target.body)?.center();
        world.body_mut(marker)?.place_at(marker_bounds(center).min);
    }

    if !world.is_visible(marker) {
        log::debug!("teleport target left the screen");
        clear_target(world);
    }
    Ok(())
}

/// Snap a freshly moved entity out of the terrain and make sure it falls.
fn settle<S: SpatialIndex, D: SpatialIndex>(
    world: &mut World,
    sys: &mut CollisionSystem<S, D>,
    id: EntityId,
) -> CollideResult<()> {
    let entity = world.entity(id)?;
    if !entity.flags.has(EntityFlag::SkipCollision) {
        let body = entity.body;
        sys.collide_static_fixup(world, body)?;
    }

    let (entity, body) = world.entity_body_mut(id)?;
    if body.velocity.y == 0.0 {
        // Otherwise an entity caught mid-bounce keeps floating in place.
        body.acceleration.y = entity.tuning.fall_gravity;
    }
    Ok(())
}

/// Teleport `id` to the pending target, swapping places with a target entity.
///
/// Does nothing without a target. The target is cleared only once every move succeeded.
pub fn teleport_entity<S: SpatialIndex, D: SpatialIndex>(
    world: &mut World,
    sys: &mut CollisionSystem<S, D>,
    id: EntityId,
) -> CollideResult<()> {
    let target = world.teleport;
    let Some(marker) = target.marker else {
        return Ok(());
    };
    let mover = world.entity(id)?.body;

    let destination = match target.entity {
        Some(other) if other != id => {
            let origin = world.body(mover)?.bottom_center();
            let other_body = world.entity(other)?.body;
            let destination = world.body(other_body)?.bottom_center();
            world.body_mut(other_body)?.set_bottom_center(origin);
            settle(world, sys, other)?;
            destination
        }
        _ => world.body(marker)?.bottom_center(),
    };

    world.body_mut(mover)?.set_bottom_center(destination);
    settle(world, sys, id)?;
    log::debug!("entity {} teleported to {:?}", id.0, destination);

    clear_target(world);
    Ok(())
}
