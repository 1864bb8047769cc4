/*!
Collision root module.

Pairwise resolution of overlapping boxes. The code is split for clarity:

- types:    shared data types (Aabb, BodyId, Owner, Node, CollisionDir)
- settings: contact tolerances and the carry velocity curve
- body:     boxes, entry direction and separation, plus the arena holding them
- broad:    the spatial index contract and a linear implementation
- rules:    declarative pair rules and the merge-key table built from them
- resolver: the iterate-dispatch-apply loop
- handlers: one routine per named pair rule
*/

pub mod body;
pub mod broad;
pub mod handlers;
pub mod resolver;
pub mod rules;
pub mod settings;
pub mod types;

// Re-export commonly used types.
pub use body::{Body, BodyArena};
pub use broad::{IndexStatus, LinearIndex, SpatialIndex};
pub use resolver::{CollisionResolver, CollisionSystem, HandlerCtx, RunState};
pub use rules::{Handler, PairGroup, Response, Rule, RuleTable, STANDARD_RULES};
pub use types::{Aabb, BodyId, CollisionDir, CollisionMask, EntityId, EventId, Facing, Node, Owner, Vec2};
