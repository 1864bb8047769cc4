/*!
Context object holding every box, entity and event of the running level.

Handlers and physics routines receive the world by reference; nothing lives in
global state. Static geometry and event areas must also be inserted into the
static spatial index by whoever builds the level.
*/

use crate::bitmask_flags::BitmaskFlags;
use crate::collision::body::{Body, BodyArena};
use crate::collision::types::{Aabb, BodyId, EntityId, EventId, Owner, Vec2};
use crate::constants::{DEFAULT_EFFECT_CAPACITY, MAX_EVENTS};
use crate::define_bitmask_flags;
use crate::effects::{EffectPool, EffectSpawn};
use crate::entity::{Entity, PhysicsTuning, Sight};
use crate::error::{CollideResult, CollisionError};
use crate::events::{Event, EventKind, Events, LevelTriggers, Transition};
use crate::teleport::TeleportTarget;
use crate::type_tag::Kind;

define_bitmask_flags!(
    /// Switches that persist for the whole play session.
    SessionFlag, u8, { BlueActive }
);

/// Everything a frame reads and mutates.
pub struct World {
    pub bodies: BodyArena,
    pub entities: Vec<Entity>,
    pub events: Events,
    pub effects: EffectPool,
    pub teleport: TeleportTarget,
    /// Visible part of the level.
    pub camera: Aabb,
    pub session: BitmaskFlags<u8>,
    pub triggers: LevelTriggers,
    /// Last checkpoint touched by a player.
    pub checkpoint: Option<Transition>,
    /// Duration of the current frame, in seconds.
    pub dt: f32,
}

impl World {
    pub fn new(camera: Aabb) -> Self {
        Self::with_capacities(camera, DEFAULT_EFFECT_CAPACITY, MAX_EVENTS)
    }

    pub fn with_capacities(camera: Aabb, effects: usize, events: usize) -> Self {
        Self {
            bodies: BodyArena::new(),
            entities: Vec::new(),
            events: Events::with_capacity(events),
            effects: EffectPool::with_capacity(effects),
            teleport: TeleportTarget::default(),
            camera,
            session: BitmaskFlags::empty(),
            triggers: LevelTriggers::default(),
            checkpoint: None,
            dt: 0.0,
        }
    }

    /// Add a piece of fixed level geometry.
    pub fn add_static(&mut self, bounds: Aabb, kind: Kind) -> BodyId {
        self.bodies
            .insert_with(|id| Body::new(bounds, kind.tag(), Owner::Static(id)).fixed())
    }

    /// Add an event area; its body is fixed and typed after the event.
    pub fn add_event(&mut self, bounds: Aabb, kind: EventKind) -> CollideResult<(EventId, BodyId)> {
        let next = EventId(self.events.len() as u32);
        let body = self
            .bodies
            .insert_with(|_| Body::new(bounds, kind.kind().tag(), Owner::Event(next)).fixed());
        match self.events.push(Event { body, kind }) {
            Ok(id) => Ok((id, body)),
            Err(err) => {
                self.bodies.remove(body);
                Err(err)
            }
        }
    }

    pub fn add_entity(
        &mut self,
        bounds: Aabb,
        kind: Kind,
        tuning: PhysicsTuning,
        animation_count: usize,
    ) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        let body = self
            .bodies
            .insert_with(|_| Body::new(bounds, kind.tag(), Owner::Entity(id)));
        if let Some(b) = self.bodies.get_mut(body) {
            b.acceleration.y = tuning.stand_gravity;
        }
        self.entities
            .push(Entity::new(body, kind, tuning, animation_count));
        id
    }

    /// Attach a sight box that follows the entity at `offset` from its position.
    pub fn add_sight(&mut self, entity: EntityId, offset: Vec2, size: Vec2) -> CollideResult<BodyId> {
        let origin = self.body(self.entity(entity)?.body)?.position;
        let bounds = Aabb {
            min: origin + offset,
            size,
        };
        let body = self
            .bodies
            .insert_with(|_| Body::new(bounds, Kind::GreenWalkyView.tag(), Owner::Entity(entity)));
        self.entity_mut(entity)?.sight = Some(Sight { body, offset });
        Ok(body)
    }

    pub fn entity(&self, id: EntityId) -> CollideResult<&Entity> {
        self.entities
            .get(id.0 as usize)
            .ok_or(CollisionError::UnknownEntity(id))
    }

    pub fn entity_mut(&mut self, id: EntityId) -> CollideResult<&mut Entity> {
        self.entities
            .get_mut(id.0 as usize)
            .ok_or(CollisionError::UnknownEntity(id))
    }

    pub fn body(&self, id: BodyId) -> CollideResult<&Body> {
        self.bodies.get(id).ok_or(CollisionError::UnknownBody(id))
    }

    pub fn body_mut(&mut self, id: BodyId) -> CollideResult<&mut Body> {
        self.bodies.get_mut(id).ok_or(CollisionError::UnknownBody(id))
    }

    /// An entity together with its hit box.
    pub fn entity_body_mut(&mut self, id: EntityId) -> CollideResult<(&mut Entity, &mut Body)> {
        let entity = self
            .entities
            .get_mut(id.0 as usize)
            .ok_or(CollisionError::UnknownEntity(id))?;
        let body = self
            .bodies
            .get_mut(entity.body)
            .ok_or(CollisionError::UnknownBody(entity.body))?;
        Ok((entity, body))
    }

    /// Two distinct live bodies.
    pub fn body_pair_mut(&mut self, a: BodyId, b: BodyId) -> CollideResult<(&mut Body, &mut Body)> {
        if !self.bodies.contains(a) {
            return Err(CollisionError::UnknownBody(a));
        }
        self.bodies
            .pair_mut(a, b)
            .ok_or(CollisionError::UnknownBody(b))
    }

    pub fn spawn_effect(&mut self, spawn: EffectSpawn) -> CollideResult<BodyId> {
        self.effects.spawn(&mut self.bodies, spawn)
    }

    pub fn remove_effect(&mut self, body: BodyId) -> bool {
        self.effects.remove(&mut self.bodies, body)
    }

    /// Whether any part of the body is inside the camera.
    pub fn is_visible(&self, body: BodyId) -> bool {
        self.bodies
            .get(body)
            .is_some_and(|b| b.bounds().intersects(&self.camera))
    }

    pub fn living_entities(&self) -> Vec<EntityId> {
        self.entities
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_alive())
            .map(|(i, _)| EntityId(i as u32))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(Aabb::new(0.0, 0.0, 320.0, 240.0))
    }

    #[test]
    fn entities_own_their_boxes() {
        let mut w = world();
        let id = w.add_entity(Aabb::new(10.0, 10.0, 6.0, 12.0), Kind::Swordy, PhysicsTuning::default(), 1);
        let body = w.entity(id).expect("entity").body;

        assert_eq!(w.body(body).expect("body").owner, Owner::Entity(id));
        assert_eq!(w.body(body).expect("body").acceleration.y, PhysicsTuning::default().stand_gravity);
        assert_eq!(w.living_entities(), vec![id]);
    }

    #[test]
    fn sight_box_shares_the_owner() {
        let mut w = world();
        let id = w.add_entity(Aabb::new(10.0, 10.0, 6.0, 6.0), Kind::GreenWalky, PhysicsTuning::default(), 1);
        let sight = w
            .add_sight(id, Vec2::new(6.0, 0.0), Vec2::new(32.0, 6.0))
            .expect("entity exists");

        let b = w.body(sight).expect("sight body");
        assert_eq!(b.owner, Owner::Entity(id));
        assert_eq!(b.position, Vec2::new(16.0, 10.0));
    }

    #[test]
    fn event_areas_are_bounded_and_typed() {
        let mut w = World::with_capacities(Aabb::new(0.0, 0.0, 10.0, 10.0), 4, 1);
        let (event, body) = w
            .add_event(Aabb::new(0.0, 0.0, 8.0, 8.0), EventKind::PressurePad { locks: 2 })
            .expect("room for one");

        assert_eq!(w.body(body).expect("body").tag, Kind::PressurePad.tag());
        assert_eq!(w.body(body).expect("body").owner, Owner::Event(event));
        assert!(matches!(
            w.add_event(Aabb::new(0.0, 0.0, 8.0, 8.0), EventKind::PressurePad { locks: 1 }),
            Err(CollisionError::BufferExhausted { .. })
        ));
        assert_eq!(w.bodies.len(), 1);
    }

    #[test]
    fn visibility_follows_the_camera() {
        let mut w = world();
        let inside = w.add_static(Aabb::new(300.0, 200.0, 40.0, 8.0), Kind::Floor);
        let outside = w.add_static(Aabb::new(400.0, 0.0, 8.0, 8.0), Kind::Floor);

        assert!(w.is_visible(inside));
        assert!(!w.is_visible(outside));
        assert!(w.body(inside).expect("static").fixed);
    }
}
