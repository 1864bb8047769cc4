/*!
Core collision types and math aliases shared by the collision submodules.

This module contains no algorithms. It defines the data exchanged between:
- body:     the axis-aligned boxes and their per-frame contact state
- broad:    the spatial index contract and the linear index
- rules:    the pair dispatch table
- handlers: the pair resolution routines
- resolver: the iterate-dispatch-apply loop

Every box is created together with its [`Owner`], so a resolved pair is a pair of
[`Node`]s without any runtime unwrapping of the box.
*/

use nalgebra as na;

use crate::bitmask_flags::BitmaskFlags;
use crate::define_bitmask_flags;
use crate::type_tag::TypeTag;

/// Common math alias. Positive y points down.
pub type Vec2 = na::Vector2<f32>;

/// Handle to a box in the [`crate::collision::body::BodyArena`].
///
/// The generation guards against a recycled slot being mistaken for the box that used to live there.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId {
    pub index: u32,
    pub generation: u32,
}

/// Index of an entity in the world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Index of an event area (load zone, checkpoint, pressure pad) in the world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub u32);

/// Whoever spawned a box. Boxes never own anything themselves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Hit box or sight box of an entity.
    Entity(EntityId),
    /// Pooled effect or projectile; the box is its own owner.
    Effect(BodyId),
    /// Level geometry.
    Static(BodyId),
    /// Event area.
    Event(EventId),
}

/// A box resolved for dispatch: its tag and owner.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub body: BodyId,
    pub tag: TypeTag,
    pub owner: Owner,
}

impl Node {
    #[inline]
    pub fn entity(&self) -> Option<EntityId> {
        match self.owner {
            Owner::Entity(id) => Some(id),
            _ => None,
        }
    }

    #[inline]
    pub fn event(&self) -> Option<EventId> {
        match self.owner {
            Owner::Event(id) => Some(id),
            _ => None,
        }
    }
}

/// Horizontal facing of a sprite.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Facing::Right => Facing::Left,
            Facing::Left => Facing::Right,
        }
    }
}

define_bitmask_flags!(
    /// Side of a box that touched something this frame.
    CollisionDir, u8, { Left, Right, Up, Down }
);

/// Set of [`CollisionDir`] accumulated during a frame.
pub type CollisionMask = BitmaskFlags<u8>;

/// Both horizontal sides, for `has_any` checks.
pub const HORIZONTAL: [CollisionDir; 2] = [CollisionDir::Left, CollisionDir::Right];

/// An axis-aligned rectangle given by its top-left corner and its size.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    #[inline]
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Strict intersection; boxes sharing an edge do not overlap.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.overlaps_x(other) && self.overlaps_y(other)
    }

    #[inline]
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.min.x < other.max().x && other.min.x < self.max().x
    }

    #[inline]
    pub fn overlaps_y(&self, other: &Aabb) -> bool {
        self.min.y < other.max().y && other.min.y < self.max().y
    }
}
