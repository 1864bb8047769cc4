/*!
The iterate-dispatch-apply loop.

For every overlapping pair the index reports, the resolver looks up the pair's
rule and runs the matching handler with the boxes in declared role order. Any
handler may raise the skip flag to end the current pass early; the flag is reset
at the start of every pass.

Pairs whose boxes share an owner are always no-ops, whatever the table says.
*/

use crate::collision::broad::{IndexStatus, LinearIndex, SpatialIndex};
use crate::collision::handlers;
use crate::collision::rules::{Rule, RuleTable};
use crate::collision::types::{BodyId, Node};
use crate::error::{CollideResult, CollisionError};
use crate::type_tag::merge_key;
use crate::world::World;

/// Transient resolver flags.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    /// Stop processing the current pass.
    pub skip: bool,
    /// Floors fix positions instead of colliding (set around post-teleport passes).
    pub fix_teleport: bool,
}

/// What a handler may touch.
pub struct HandlerCtx<'a> {
    pub world: &'a mut World,
    pub run: &'a mut RunState,
}

/// Dispatches overlapping pairs through a [`RuleTable`].
///
/// In strict mode a pair with no rule aborts the pass with
/// [`CollisionError::UnhandledCollision`].
#[derive(Debug, Clone)]
pub struct CollisionResolver {
    rules: RuleTable,
    run: RunState,
    strict: bool,
}

impl CollisionResolver {
    /// Unhandled pairs are errors in debug builds and ignored in release builds.
    pub fn new(rules: RuleTable) -> Self {
        Self {
            rules,
            run: RunState::default(),
            strict: cfg!(debug_assertions),
        }
    }

    pub fn standard() -> CollideResult<Self> {
        Ok(Self::new(RuleTable::standard()?))
    }

    /// Override whether an unhandled pair interrupts resolution.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    pub fn set_fix_teleport(&mut self, enabled: bool) {
        self.run.fix_teleport = enabled;
    }

    /// Query `body` against `index` and resolve every overlap found.
    pub fn collide_with<I: SpatialIndex + ?Sized>(
        &mut self,
        index: &mut I,
        world: &mut World,
        body: BodyId,
    ) -> CollideResult<()> {
        self.run.skip = false;
        match index.collide(&world.bodies, body)? {
            IndexStatus::Overlapping => self.resolve_all(index, world),
            IndexStatus::Done => Ok(()),
        }
    }

    /// Resolve pairs from the index cursor until it is exhausted or a handler skips.
    pub fn resolve_all<I: SpatialIndex + ?Sized>(
        &mut self,
        index: &mut I,
        world: &mut World,
    ) -> CollideResult<()> {
        self.run.skip = false;
        while let Some((a, b)) = index.current_pair() {
            self.resolve_pair(world, a, b)?;
            if self.run.skip {
                break;
            }
            if index.advance(&world.bodies)? == IndexStatus::Done {
                break;
            }
        }
        Ok(())
    }

    /// Classify and resolve one overlapping pair.
    pub fn resolve_pair(&mut self, world: &mut World, a: BodyId, b: BodyId) -> CollideResult<()> {
        let (Some(first), Some(second)) = (world.bodies.node(a), world.bodies.node(b)) else {
            // A handler removed one of the boxes earlier in this pass.
            return Ok(());
        };
        if first.owner == second.owner {
            return Ok(());
        }

        match self.rules.lookup(first.tag, second.tag) {
            Some(Rule::Ignore | Rule::SelfIgnore) => Ok(()),
            Some(Rule::Handler {
                handler,
                first_case,
            }) => {
                let (x, y) = if first_case {
                    (first, second)
                } else {
                    (second, first)
                };
                log::trace!("{:?}: {:?} / {:?}", handler, x.tag.kind(), y.tag.kind());
                let mut ctx = HandlerCtx {
                    world,
                    run: &mut self.run,
                };
                handlers::dispatch(handler, &mut ctx, x, y)
            }
            None => self.unhandled(first, second),
        }
    }

    fn unhandled(&self, first: Node, second: Node) -> CollideResult<()> {
        let key = merge_key(first.tag, second.tag);
        if self.strict {
            log::error!(
                "no collision rule for {:?} / {:?} (key {:#010x})",
                first.tag.kind(),
                second.tag.kind(),
                key
            );
            Err(CollisionError::UnhandledCollision {
                first: first.tag,
                second: second.tag,
                key,
            })
        } else {
            log::warn!("ignoring unclassified collision key {:#010x}", key);
            Ok(())
        }
    }
}

/// The resolver together with the two indices it runs against.
///
/// The static index holds level geometry and event areas; the dynamic index is
/// rebuilt every frame from whatever moved.
pub struct CollisionSystem<S = LinearIndex, D = LinearIndex> {
    pub resolver: CollisionResolver,
    pub statics: S,
    pub dynamic: D,
}

impl<S: SpatialIndex, D: SpatialIndex> CollisionSystem<S, D> {
    pub fn new(resolver: CollisionResolver, statics: S, dynamic: D) -> Self {
        Self {
            resolver,
            statics,
            dynamic,
        }
    }

    pub fn collide_static(&mut self, world: &mut World, body: BodyId) -> CollideResult<()> {
        self.resolver.collide_with(&mut self.statics, world, body)
    }

    pub fn collide_dynamic(&mut self, world: &mut World, body: BodyId) -> CollideResult<()> {
        self.resolver.collide_with(&mut self.dynamic, world, body)
    }

    /// Static pass in fix-teleport mode. The mode is cleared even when the pass fails.
    pub fn collide_static_fixup(&mut self, world: &mut World, body: BodyId) -> CollideResult<()> {
        self.resolver.set_fix_teleport(true);
        let result = self.collide_static(world, body);
        self.resolver.set_fix_teleport(false);
        result
    }
}

impl CollisionSystem {
    /// Standard rules over two linear indices.
    pub fn linear() -> CollideResult<Self> {
        Ok(Self::new(
            CollisionResolver::standard()?,
            LinearIndex::statics(),
            LinearIndex::dynamic(),
        ))
    }
}
