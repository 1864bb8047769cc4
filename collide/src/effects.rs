/*!
Pooled short-lived boxes: attacks, projectiles, bursts and markers.

Every effect owns exactly one body in the arena, typed by the spawner. An effect
with a time to live is removed once it expires; markers and projectiles without
one live until a handler removes them.
*/

use std::time::Duration;

use crate::collision::body::{Body, BodyArena};
use crate::collision::types::{Aabb, BodyId, Facing, Owner, Vec2};
use crate::constants::{BULLET_HEIGHT, BULLET_SPEED, BULLET_TTL, BULLET_WIDTH};
use crate::error::{CollideResult, CollisionError};
use crate::type_tag::{Kind, TypeTag};

/// Animation an effect plays. Rendering is out of scope; the tag is carried for it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Animation {
    Slash,
    Bullet,
    EnemyBullet,
    StarExplosion,
    CheckpointSaved,
    TeleportMarker,
}

/// Parameters of a new effect.
#[derive(Copy, Clone, Debug)]
pub struct EffectSpawn {
    pub bounds: Aabb,
    pub tag: TypeTag,
    pub animation: Animation,
    pub ttl: Option<Duration>,
    pub velocity: Vec2,
    pub facing: Facing,
}

impl EffectSpawn {
    pub fn new(bounds: Aabb, tag: TypeTag, animation: Animation) -> Self {
        Self {
            bounds,
            tag,
            animation,
            ttl: None,
            velocity: Vec2::zeros(),
            facing: Facing::Right,
        }
    }

    /// A teleporter bullet fired from a shooter at `origin` (its top-left corner).
    pub fn teleport_bullet(origin: Vec2, facing: Facing) -> Self {
        let (dx, vx) = match facing {
            Facing::Right => (3.0, BULLET_SPEED),
            Facing::Left => (-4.0, -BULLET_SPEED),
        };
        let bounds = Aabb::new(origin.x + dx, origin.y + 3.0, BULLET_WIDTH, BULLET_HEIGHT);
        Self::new(bounds, Kind::TeleportBullet.tag(), Animation::Bullet)
            .with_velocity(Vec2::new(vx, 0.0))
            .with_ttl(BULLET_TTL)
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self.facing = if velocity.x < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        };
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Effect {
    pub body: BodyId,
    pub animation: Animation,
    /// Seconds left, if the effect expires on its own.
    pub remaining: Option<f32>,
}

/// Fixed-capacity pool of live effects.
#[derive(Debug, Clone)]
pub struct EffectPool {
    live: Vec<Effect>,
    capacity: usize,
}

impl EffectPool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            live: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn spawn(&mut self, bodies: &mut BodyArena, spawn: EffectSpawn) -> CollideResult<BodyId> {
        if self.live.len() >= self.capacity {
            return Err(CollisionError::BufferExhausted {
                what: "effect pool",
                capacity: self.capacity,
            });
        }
        let body = bodies.insert_with(|id| {
            let mut body = Body::new(spawn.bounds, spawn.tag, Owner::Effect(id));
            body.velocity = spawn.velocity;
            body.facing = spawn.facing;
            body
        });
        self.live.push(Effect {
            body,
            animation: spawn.animation,
            remaining: spawn.ttl.map(|t| t.as_secs_f32()),
        });
        Ok(body)
    }

    /// Remove an effect and its body. Returns false if it was already gone.
    pub fn remove(&mut self, bodies: &mut BodyArena, body: BodyId) -> bool {
        let Some(pos) = self.live.iter().position(|e| e.body == body) else {
            return false;
        };
        self.live.swap_remove(pos);
        bodies.remove(body).is_some()
    }

    /// Expire effects whose time ran out, then integrate the survivors.
    pub fn update(&mut self, bodies: &mut BodyArena, dt: f32) {
        self.live.retain_mut(|effect| {
            if let Some(remaining) = effect.remaining.as_mut() {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    bodies.remove(effect.body);
                    return false;
                }
            }
            match bodies.get_mut(effect.body) {
                Some(body) => {
                    body.update(dt);
                    true
                }
                None => false,
            }
        });
    }

    pub fn get(&self, body: BodyId) -> Option<&Effect> {
        self.live.iter().find(|e| e.body == body)
    }

    pub fn live_bodies(&self) -> Vec<BodyId> {
        self.live.iter().map(|e| e.body).collect()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slash() -> EffectSpawn {
        EffectSpawn::new(Aabb::new(0.0, 0.0, 8.0, 8.0), Kind::SwordAttack.tag(), Animation::Slash)
    }

    #[test]
    fn spawned_effects_own_their_body() {
        let mut bodies = BodyArena::new();
        let mut pool = EffectPool::with_capacity(2);

        let id = pool.spawn(&mut bodies, slash()).expect("room in pool");
        let body = bodies.get(id).expect("body inserted");

        assert_eq!(body.owner, Owner::Effect(id));
        assert_eq!(body.tag, Kind::SwordAttack.tag());
        assert!(pool.get(id).is_some());
    }

    #[test]
    fn full_pool_reports_exhaustion() {
        let mut bodies = BodyArena::new();
        let mut pool = EffectPool::with_capacity(1);
        pool.spawn(&mut bodies, slash()).expect("room in pool");

        assert!(matches!(
            pool.spawn(&mut bodies, slash()),
            Err(CollisionError::BufferExhausted { what: "effect pool", capacity: 1 })
        ));
        assert_eq!(bodies.len(), 1);
    }

    #[test]
    fn ttl_expiry_and_motion() {
        let mut bodies = BodyArena::new();
        let mut pool = EffectPool::with_capacity(4);
        let short = pool
            .spawn(&mut bodies, slash().with_ttl(Duration::from_millis(100)))
            .expect("room in pool");
        let bullet = pool
            .spawn(&mut bodies, slash().with_velocity(Vec2::new(-20.0, 0.0)))
            .expect("room in pool");

        pool.update(&mut bodies, 0.25);

        assert!(bodies.get(short).is_none());
        assert_eq!(pool.len(), 1);
        let moved = bodies.get(bullet).expect("no ttl");
        assert_eq!(moved.position.x, -5.0);
        assert_eq!(moved.facing, Facing::Left);
    }

    #[test]
    fn teleport_bullets_leave_from_the_facing_side() {
        let right = EffectSpawn::teleport_bullet(Vec2::new(10.0, 20.0), Facing::Right);
        let left = EffectSpawn::teleport_bullet(Vec2::new(10.0, 20.0), Facing::Left);

        assert_eq!(right.bounds, Aabb::new(13.0, 23.0, BULLET_WIDTH, BULLET_HEIGHT));
        assert_eq!(right.velocity.x, 200.0);
        assert_eq!(left.bounds.min, Vec2::new(6.0, 23.0));
        assert_eq!(left.facing, Facing::Left);
        assert_eq!(left.tag, Kind::TeleportBullet.tag());
        assert_eq!(left.ttl, Some(BULLET_TTL));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut bodies = BodyArena::new();
        let mut pool = EffectPool::with_capacity(1);
        let id = pool.spawn(&mut bodies, slash()).expect("room in pool");

        assert!(pool.remove(&mut bodies, id));
        assert!(!pool.remove(&mut bodies, id));
        assert!(pool.is_empty());
    }
}
