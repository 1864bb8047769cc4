pub mod bitmask_flags;
pub mod carry;
pub mod collision;
pub mod constants;
pub mod effects;
pub mod entity;
pub mod error;
pub mod events;
pub mod input;
pub mod phase;
pub mod teleport;
pub mod type_tag;
pub mod world;

pub use collision::{
    Aabb, Body, BodyArena, BodyId, CollisionResolver, CollisionSystem, EntityId, EventId, LinearIndex,
    Owner, RuleTable, SpatialIndex, Vec2,
};
pub use entity::{Entity, EntityFlag, JumpOutcome, PhysicsTuning};
pub use error::{CollideResult, CollisionError, IndexError};
pub use input::ButtonState;
pub use phase::{FramePhase, FrameReport, UpdatePhase};
pub use type_tag::{Kind, TypeTag, merge_key};
pub use world::World;
