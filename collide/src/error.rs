use thiserror::Error;

use crate::collision::types::{BodyId, EntityId, EventId};
use crate::phase::FramePhase;
use crate::type_tag::{Kind, MergeKey, TypeTag};

/// Failures reported by a [`crate::collision::broad::SpatialIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The queried body is not (or no longer) in the body arena.
    #[error("body {0:?} is not live")]
    UnknownBody(BodyId),
    /// `advance` was called without an active query.
    #[error("no overlap query in progress")]
    NoPendingOverlap,
}

/// Error type for resolution and entity physics.
#[derive(Debug, Error)]
pub enum CollisionError {
    /// Two boxes overlapped and no rule classifies their pair of types.
    #[error("unhandled collision between {first:?} and {second:?} (key {key:#010x})")]
    UnhandledCollision {
        first: TypeTag,
        second: TypeTag,
        key: MergeKey,
    },
    /// The spatial index failed while enumerating overlaps.
    #[error("spatial index error: {0}")]
    SpatialIndex(#[from] IndexError),
    /// An animation outside the entity's declared set was requested.
    #[error("animation {index} out of range (entity declares {count})")]
    InvalidAnimationIndex { index: usize, count: usize },
    /// A fixed-capacity buffer (carry chain, effect pool, event list) is full.
    #[error("{what} exhausted its capacity of {capacity}")]
    BufferExhausted { what: &'static str, capacity: usize },
    /// A frame step was requested out of order.
    #[error("frame step {got:?} requested while {expected:?} was due")]
    PhaseOrder {
        expected: FramePhase,
        got: FramePhase,
    },
    /// The rule list declares two different rules for one pair.
    #[error("conflicting collision rules for {first:?} / {second:?}")]
    ConflictingRule { first: Kind, second: Kind },
    #[error("body {0:?} does not exist")]
    UnknownBody(BodyId),
    #[error("body {0:?} is not owned by an entity")]
    NotAnEntity(BodyId),
    #[error("body {0:?} is not an event area")]
    NotAnEvent(BodyId),
    #[error("entity {0:?} does not exist")]
    UnknownEntity(EntityId),
    #[error("event {0:?} does not exist")]
    UnknownEvent(EventId),
}

pub type CollideResult<T> = Result<T, CollisionError>;
