/*!
Spatial index contract consumed by the resolver, and a linear implementation.

The resolver only needs an overlap cursor: start a query for one body, read the
current overlapping pair, resolve it, then advance. Whatever structure sits
behind the cursor (quadtree, grid, flat list) is up to the index.

[`LinearIndex`] checks overlaps lazily against live positions, so a pair that a
previous handler already separated is not reported, and bodies removed from the
arena mid-query simply vanish.
*/

use crate::collision::body::BodyArena;
use crate::collision::types::BodyId;
use crate::error::IndexError;

/// Outcome of starting or advancing an overlap query.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IndexStatus {
    /// A pair is available through [`SpatialIndex::current_pair`].
    Overlapping,
    /// No further overlaps for this query.
    Done,
}

/// Query contract of a broad-phase structure holding collision boxes.
pub trait SpatialIndex {
    /// Begin enumerating the members overlapping `body`.
    fn collide(&mut self, bodies: &BodyArena, body: BodyId) -> Result<IndexStatus, IndexError>;

    /// The overlapping pair the cursor currently points at, probe first.
    /// `None` once the query is exhausted.
    fn current_pair(&self) -> Option<(BodyId, BodyId)>;

    /// Move past the current pair.
    fn advance(&mut self, bodies: &BodyArena) -> Result<IndexStatus, IndexError>;

    /// Drop every member.
    fn reset(&mut self);
}

/// Flat list index, linear scan per query.
///
/// Two flavours:
/// - [`LinearIndex::statics`]: members are added once with [`LinearIndex::insert`]; queries never insert.
/// - [`LinearIndex::dynamic`]: each queried body joins the index, so later bodies collide with it.
#[derive(Debug, Default)]
pub struct LinearIndex {
    members: Vec<BodyId>,
    insert_on_collide: bool,
    query: Option<Query>,
}

#[derive(Debug, Clone, Copy)]
struct Query {
    probe: BodyId,
    cursor: usize,
    current: Option<BodyId>,
}

impl LinearIndex {
    pub fn statics() -> Self {
        Self::default()
    }

    pub fn dynamic() -> Self {
        Self {
            insert_on_collide: true,
            ..Self::default()
        }
    }

    pub fn insert(&mut self, body: BodyId) {
        if !self.members.contains(&body) {
            self.members.push(body);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Scan from the query cursor to the next live member overlapping the probe.
    fn seek(&mut self, bodies: &BodyArena) -> Result<IndexStatus, IndexError> {
        let Some(query) = self.query.as_mut() else {
            return Err(IndexError::NoPendingOverlap);
        };
        let probe = bodies
            .get(query.probe)
            .ok_or(IndexError::UnknownBody(query.probe))?
            .bounds();

        while query.cursor < self.members.len() {
            let member = self.members[query.cursor];
            query.cursor += 1;
            if member == query.probe {
                continue;
            }
            let Some(other) = bodies.get(member) else {
                continue;
            };
            if probe.intersects(&other.bounds()) {
                query.current = Some(member);
                return Ok(IndexStatus::Overlapping);
            }
        }

        self.query = None;
        Ok(IndexStatus::Done)
    }
}

impl SpatialIndex for LinearIndex {
    fn collide(&mut self, bodies: &BodyArena, body: BodyId) -> Result<IndexStatus, IndexError> {
        if !bodies.contains(body) {
            return Err(IndexError::UnknownBody(body));
        }
        // Dead members are pruned here so the list does not grow with spent effects.
        self.members.retain(|m| bodies.contains(*m));
        self.query = Some(Query {
            probe: body,
            cursor: 0,
            current: None,
        });
        let status = self.seek(bodies);
        if self.insert_on_collide {
            self.insert(body);
        }
        status
    }

    fn current_pair(&self) -> Option<(BodyId, BodyId)> {
        let query = self.query?;
        query.current.map(|member| (query.probe, member))
    }

    fn advance(&mut self, bodies: &BodyArena) -> Result<IndexStatus, IndexError> {
        self.seek(bodies)
    }

    fn reset(&mut self) {
        self.members.clear();
        self.query = None;
    }
}
