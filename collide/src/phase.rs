/*!
Frame orchestration.

A frame runs its steps in a fixed order:
1. `begin_frame`: set the frame time and clear per-frame state,
2. `apply_jump` (any number of times) then `pre_update`: integrate every entity and collide it,
3. `update_effects`: move effects and collide them,
4. `post_update`: settle riders on their carriers,
5. `end_frame`: follow the teleport target, teleport if asked, report level triggers.

[`UpdatePhase`] tracks which step is due and rejects the others with
[`CollisionError::PhaseOrder`]. A failed step abandons the frame; the next
call must be `begin_frame` again.
*/

use std::time::Duration;

use crate::collision::broad::SpatialIndex;
use crate::collision::resolver::CollisionSystem;
use crate::collision::types::{EntityId, Vec2};
use crate::entity::{self, JumpOutcome};
use crate::error::{CollideResult, CollisionError};
use crate::input::ButtonState;
use crate::teleport;
use crate::world::World;

/// Step of a frame that is due next.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FramePhase {
    /// Between frames.
    #[default]
    Idle,
    PreUpdate,
    Effects,
    PostUpdate,
    Teleport,
}

impl FramePhase {
    pub fn next(self) -> Self {
        match self {
            FramePhase::Idle => FramePhase::PreUpdate,
            FramePhase::PreUpdate => FramePhase::Effects,
            FramePhase::Effects => FramePhase::PostUpdate,
            FramePhase::PostUpdate => FramePhase::Teleport,
            FramePhase::Teleport => FramePhase::Idle,
        }
    }
}

/// Level state collected during a frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Zone both players reached this frame.
    pub transition: Option<u8>,
    /// Locks held open by pressure pads.
    pub pressed_locks: u8,
    /// Draw position of the pending teleport marker.
    pub teleport_marker: Option<Vec2>,
}

/// Drives one frame at a time and refuses steps that are not due.
#[derive(Debug, Default)]
pub struct UpdatePhase {
    due: FramePhase,
}

impl UpdatePhase {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn due(&self) -> FramePhase {
        self.due
    }

    fn require(&self, step: FramePhase) -> CollideResult<()> {
        if self.due == step {
            Ok(())
        } else {
            Err(CollisionError::PhaseOrder {
                expected: self.due,
                got: step,
            })
        }
    }

    fn run<T>(&mut self, step: FramePhase, f: impl FnOnce() -> CollideResult<T>) -> CollideResult<T> {
        self.require(step)?;
        match f() {
            Ok(value) => {
                self.due = step.next();
                Ok(value)
            }
            Err(err) => {
                log::error!("{:?} step failed, frame abandoned: {}", step, err);
                self.due = FramePhase::Idle;
                Err(err)
            }
        }
    }

    pub fn begin_frame<S: SpatialIndex, D: SpatialIndex>(
        &mut self,
        world: &mut World,
        sys: &mut CollisionSystem<S, D>,
        dt: Duration,
    ) -> CollideResult<()> {
        self.run(FramePhase::Idle, || {
            world.dt = dt.as_secs_f32();
            world.triggers.reset();
            sys.dynamic.reset();
            Ok(())
        })
    }

    /// Feed the jump button of one entity. Only valid before `pre_update`.
    pub fn apply_jump(&mut self, world: &mut World, id: EntityId, jump: ButtonState) -> CollideResult<JumpOutcome> {
        self.require(FramePhase::PreUpdate)?;
        entity::update_jump(world, id, jump)
    }

    /// [`Self::apply_jump`] from whether the button is held this frame.
    pub fn apply_jump_held(&mut self, world: &mut World, id: EntityId, down: bool) -> CollideResult<JumpOutcome> {
        self.require(FramePhase::PreUpdate)?;
        entity::update_jump_held(world, id, down)
    }

    pub fn pre_update<S: SpatialIndex, D: SpatialIndex>(
        &mut self,
        world: &mut World,
        sys: &mut CollisionSystem<S, D>,
    ) -> CollideResult<()> {
        self.run(FramePhase::PreUpdate, || {
            for id in world.living_entities() {
                entity::pre_update(world, sys, id)?;
            }
            Ok(())
        })
    }

    pub fn update_effects<S: SpatialIndex, D: SpatialIndex>(
        &mut self,
        world: &mut World,
        sys: &mut CollisionSystem<S, D>,
    ) -> CollideResult<()> {
        self.run(FramePhase::Effects, || {
            let dt = world.dt;
            world.effects.update(&mut world.bodies, dt);
            for body in world.effects.live_bodies() {
                // Earlier effects may have removed this one.
                if world.bodies.contains(body) {
                    sys.collide_static(world, body)?;
                }
                if world.bodies.contains(body) {
                    sys.collide_dynamic(world, body)?;
                }
            }
            Ok(())
        })
    }

    pub fn post_update<S: SpatialIndex, D: SpatialIndex>(
        &mut self,
        world: &mut World,
        sys: &mut CollisionSystem<S, D>,
    ) -> CollideResult<()> {
        self.run(FramePhase::PostUpdate, || {
            for id in world.living_entities() {
                entity::post_update(world, sys, id)?;
            }
            Ok(())
        })
    }

    /// Finish the frame, teleporting `teleport` to the pending target if given.
    pub fn end_frame<S: SpatialIndex, D: SpatialIndex>(
        &mut self,
        world: &mut World,
        sys: &mut CollisionSystem<S, D>,
        teleport: Option<EntityId>,
    ) -> CollideResult<FrameReport> {
        self.run(FramePhase::Teleport, || {
            teleport::update_target(world)?;
            if let Some(id) = teleport {
                teleport::teleport_entity(world, sys, id)?;
            }
            Ok(FrameReport {
                transition: world.triggers.pending_transition(),
                pressed_locks: world.triggers.pressed_locks(),
                teleport_marker: teleport::marker_draw_position(world),
            })
        })
    }

    /// Run every step of a frame with no input.
    pub fn step<S: SpatialIndex, D: SpatialIndex>(
        &mut self,
        world: &mut World,
        sys: &mut CollisionSystem<S, D>,
        dt: Duration,
    ) -> CollideResult<FrameReport> {
        self.begin_frame(world, sys, dt)?;
        self.pre_update(world, sys)?;
        self.update_effects(world, sys)?;
        self.post_update(world, sys)?;
        self.end_frame(world, sys, None)
    }
}
