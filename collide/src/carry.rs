/*!
Riding: entities standing on other entities follow them.

The stack under a rider is walked bottom first so that horizontal motion
propagates through every level in a single post-update pass. Each link is
settled once per frame; [`EntityFlag::CarryResolved`] records which ones were.
*/

use crate::collision::body::Body;
use crate::collision::broad::SpatialIndex;
use crate::collision::resolver::CollisionSystem;
use crate::collision::settings::carried_velocity;
use crate::collision::types::EntityId;
use crate::constants::MAX_CARRY_CHAIN;
use crate::entity::EntityFlag;
use crate::error::{CollideResult, CollisionError};
use crate::world::World;

/// Entities from `id` down to the first carrier that needs no settling, rider first.
fn carry_chain(world: &World, id: EntityId) -> CollideResult<Vec<EntityId>> {
    let mut chain = vec![id];
    let mut current = id;
    loop {
        let entity = world.entity(current)?;
        if entity.flags.has(EntityFlag::CarryResolved) {
            break;
        }
        let Some(carrier) = entity.carrying else {
            break;
        };
        if chain.contains(&carrier) {
            log::warn!("carry cycle through entity {}, cut at {}", carrier.0, current.0);
            break;
        }
        if chain.len() > MAX_CARRY_CHAIN {
            return Err(CollisionError::BufferExhausted {
                what: "carry chain",
                capacity: MAX_CARRY_CHAIN,
            });
        }
        chain.push(carrier);
        current = carrier;
    }
    Ok(chain)
}

/// Settle `rider` on `carrier` and collide it against the level again.
fn carry_onto<S: SpatialIndex, D: SpatialIndex>(
    world: &mut World,
    sys: &mut CollisionSystem<S, D>,
    rider: EntityId,
    carrier: EntityId,
) -> CollideResult<()> {
    let dt = world.dt;
    let (rb, cb) = (world.entity(rider)?.body, world.entity(carrier)?.body);
    let (r, c) = world.body_pair_mut(rb, cb)?;

    r.apply_delta_x(c);
    let (vy, ay) = (c.velocity.y, c.acceleration.y);

    let was_fixed = c.fixed;
    c.fixed = true;
    Body::just_overlapped(r, c);
    Body::separate_vertical(r, c);
    c.fixed = was_fixed;

    r.velocity.y = carried_velocity(vy, ay, dt);

    sys.collide_static(world, rb)?;
    world.entity_mut(rider)?.flags.add(EntityFlag::CarryResolved);
    Ok(())
}

/// Resolve the stack under `id`. Returns how many riders were settled.
///
/// Any failure aborts the whole stack; links settled before it stay settled.
pub fn resolve_carry<S: SpatialIndex, D: SpatialIndex>(
    world: &mut World,
    sys: &mut CollisionSystem<S, D>,
    id: EntityId,
) -> CollideResult<usize> {
    let chain = carry_chain(world, id)?;
    for link in chain.windows(2).rev() {
        carry_onto(world, sys, link[0], link[1])?;
    }
    Ok(chain.len() - 1)
}
