/*!
Axis-aligned boxes and the pairwise contact primitives the handlers are built from.

A [`Body`] remembers where it was at the start of the frame. Entry direction is
derived from those last positions:
- boxes that were already overlapping have no entry (the contact is continued),
- boxes that overlapped horizontally last frame entered vertically,
- boxes that overlapped vertically last frame entered horizontally,
- boxes that overlapped on neither axis entered diagonally and touch on both.

Separation pushes movable boxes apart along one axis; a fixed box never moves.
*/

use crate::collision::types::{Aabb, BodyId, CollisionDir, CollisionMask, Facing, Node, Owner, Vec2};
use crate::type_tag::TypeTag;

/// A box in the world together with its kinematic state.
#[derive(Clone, Debug)]
pub struct Body {
    pub position: Vec2,
    pub last_position: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub tag: TypeTag,
    pub owner: Owner,
    pub facing: Facing,
    /// Fixed bodies are never displaced by separation.
    pub fixed: bool,
    collision: CollisionMask,
    last_collision: CollisionMask,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Entry {
    Vertical,
    Horizontal,
    Diagonal,
}

impl Body {
    pub fn new(bounds: Aabb, tag: TypeTag, owner: Owner) -> Self {
        Self {
            position: bounds.min,
            last_position: bounds.min,
            size: bounds.size,
            velocity: Vec2::zeros(),
            acceleration: Vec2::zeros(),
            tag,
            owner,
            facing: Facing::Right,
            fixed: false,
            collision: CollisionMask::empty(),
            last_collision: CollisionMask::empty(),
        }
    }

    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb {
            min: self.position,
            size: self.size,
        }
    }

    #[inline]
    pub fn last_bounds(&self) -> Aabb {
        Aabb {
            min: self.last_position,
            size: self.size,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    #[inline]
    pub fn last_center(&self) -> Vec2 {
        self.last_bounds().center()
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }

    /// Horizontal center of the bottom edge.
    #[inline]
    pub fn bottom_center(&self) -> Vec2 {
        Vec2::new(self.position.x + self.size.x * 0.5, self.bottom())
    }

    /// Move so the bottom edge is centered on `point`. See [`Body::place_at`].
    pub fn set_bottom_center(&mut self, point: Vec2) {
        self.place_at(Vec2::new(point.x - self.size.x * 0.5, point.y - self.size.y));
    }

    /// Move without travelling: the last position follows, so the new spot
    /// counts as a continued contact rather than a fresh entry.
    pub fn place_at(&mut self, position: Vec2) {
        self.position = position;
        self.last_position = position;
    }

    /// Sides touched so far this frame.
    #[inline]
    pub fn collision(&self) -> CollisionMask {
        self.collision
    }

    /// Sides touched during the previous frame.
    #[inline]
    pub fn last_collision(&self) -> CollisionMask {
        self.last_collision
    }

    #[inline]
    pub fn touch(&mut self, dirs: CollisionMask) {
        self.collision = self.collision.union(dirs);
    }

    /// Horizontal distance travelled this frame.
    #[inline]
    pub fn delta_x(&self) -> f32 {
        self.position.x - self.last_position.x
    }

    /// Replay another body's horizontal motion on this one.
    #[inline]
    pub fn apply_delta_x(&mut self, other: &Body) {
        self.position.x += other.delta_x();
    }

    /// Start a new frame: remember the current state and integrate motion.
    pub fn update(&mut self, dt: f32) {
        self.last_position = self.position;
        self.last_collision = self.collision;
        self.collision.clear();
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;
    }

    pub fn node(&self, id: BodyId) -> Node {
        Node {
            body: id,
            tag: self.tag,
            owner: self.owner,
        }
    }

    #[inline]
    pub fn is_overlapping(a: &Body, b: &Body) -> bool {
        a.bounds().intersects(&b.bounds())
    }

    fn entry(a: &Body, b: &Body) -> Option<Entry> {
        let (la, lb) = (a.last_bounds(), b.last_bounds());
        let (x, y) = (la.overlaps_x(&lb), la.overlaps_y(&lb));
        match (x, y) {
            (true, true) => None,
            (true, false) => Some(Entry::Vertical),
            (false, true) => Some(Entry::Horizontal),
            (false, false) => Some(Entry::Diagonal),
        }
    }

    /// Check whether the boxes started overlapping this frame.
    ///
    /// On a fresh contact both bodies record the sides that touched.
    pub fn just_overlapped(a: &mut Body, b: &mut Body) -> bool {
        if !Body::is_overlapping(a, b) {
            return false;
        }
        let Some(entry) = Body::entry(a, b) else {
            return false;
        };

        let (la, lb) = (a.last_center(), b.last_center());
        let mut da = CollisionMask::empty();
        let mut db = CollisionMask::empty();
        if entry != Entry::Horizontal {
            if la.y < lb.y {
                da.add(CollisionDir::Down);
                db.add(CollisionDir::Up);
            } else {
                da.add(CollisionDir::Up);
                db.add(CollisionDir::Down);
            }
        }
        if entry != Entry::Vertical {
            if la.x < lb.x {
                da.add(CollisionDir::Right);
                db.add(CollisionDir::Left);
            } else {
                da.add(CollisionDir::Left);
                db.add(CollisionDir::Right);
            }
        }
        a.touch(da);
        b.touch(db);
        true
    }

    /// Push the boxes apart vertically. Returns whether anything moved.
    pub fn separate_vertical(a: &mut Body, b: &mut Body) -> bool {
        if !Body::is_overlapping(a, b) {
            return false;
        }
        let a_above = a.last_center().y < b.last_center().y
            || (a.last_center().y == b.last_center().y && a.center().y <= b.center().y);
        let depth = if a_above {
            a.bottom() - b.position.y
        } else {
            b.bottom() - a.position.y
        };
        let sign = if a_above { -1.0 } else { 1.0 };
        Body::push_apart(a, b, Vec2::new(0.0, sign * depth))
    }

    /// Push the boxes apart horizontally. Returns whether anything moved.
    pub fn separate_horizontal(a: &mut Body, b: &mut Body) -> bool {
        if !Body::is_overlapping(a, b) {
            return false;
        }
        let a_left = a.last_center().x < b.last_center().x
            || (a.last_center().x == b.last_center().x && a.center().x <= b.center().x);
        let depth = if a_left {
            a.position.x + a.size.x - b.position.x
        } else {
            b.position.x + b.size.x - a.position.x
        };
        let sign = if a_left { -1.0 } else { 1.0 };
        Body::push_apart(a, b, Vec2::new(sign * depth, 0.0))
    }

    /// Physically resolve an overlap along the axis the boxes met on.
    ///
    /// Diagonal and continued contacts use the axis of least penetration.
    pub fn collide(a: &mut Body, b: &mut Body) -> bool {
        if !Body::is_overlapping(a, b) {
            return false;
        }
        match Body::entry(a, b) {
            Some(Entry::Vertical) => Body::separate_vertical(a, b),
            Some(Entry::Horizontal) => Body::separate_horizontal(a, b),
            Some(Entry::Diagonal) | None => {
                let (ba, bb) = (a.bounds(), b.bounds());
                let px = ba.max().x.min(bb.max().x) - ba.min.x.max(bb.min.x);
                let py = ba.max().y.min(bb.max().y) - ba.min.y.max(bb.min.y);
                if py <= px {
                    Body::separate_vertical(a, b)
                } else {
                    Body::separate_horizontal(a, b)
                }
            }
        }
    }

    /// Move `a` by `offset` and `b` by `-offset`, split by mobility.
    fn push_apart(a: &mut Body, b: &mut Body, offset: Vec2) -> bool {
        match (a.fixed, b.fixed) {
            (true, true) => false,
            (false, true) => {
                a.position += offset;
                true
            }
            (true, false) => {
                b.position -= offset;
                true
            }
            (false, false) => {
                a.position += offset * 0.5;
                b.position -= offset * 0.5;
                true
            }
        }
    }
}

struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// Generational storage for every box in the world.
#[derive(Default)]
pub struct BodyArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl BodyArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a body built from its own id (effects and statics own themselves).
    pub fn insert_with(&mut self, build: impl FnOnce(BodyId) -> Body) -> BodyId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            let id = BodyId {
                index,
                generation: slot.generation,
            };
            slot.body = Some(build(id));
            id
        } else {
            let id = BodyId {
                index: self.slots.len() as u32,
                generation: 0,
            };
            self.slots.push(Slot {
                generation: 0,
                body: Some(build(id)),
            });
            id
        }
    }

    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(body)
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.body.as_ref())
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.body.as_mut())
    }

    #[inline]
    pub fn contains(&self, id: BodyId) -> bool {
        self.get(id).is_some()
    }

    /// Mutable access to two distinct live bodies.
    pub fn pair_mut(&mut self, a: BodyId, b: BodyId) -> Option<(&mut Body, &mut Body)> {
        if a.index == b.index || !self.contains(a) || !self.contains(b) {
            return None;
        }
        let (lo, hi, swapped) = if a.index < b.index {
            (a.index as usize, b.index as usize, false)
        } else {
            (b.index as usize, a.index as usize, true)
        };
        let (head, tail) = self.slots.split_at_mut(hi);
        let first = head[lo].body.as_mut()?;
        let second = tail[0].body.as_mut()?;
        if swapped {
            Some((second, first))
        } else {
            Some((first, second))
        }
    }

    pub fn node(&self, id: BodyId) -> Option<Node> {
        self.get(id).map(|b| b.node(id))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.body.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_tag::Kind;

    fn body(x: f32, y: f32, w: f32, h: f32, kind: Kind) -> Body {
        Body::new(
            Aabb::new(x, y, w, h),
            kind.tag(),
            Owner::Static(BodyId {
                index: 0,
                generation: 0,
            }),
        )
    }

    #[test]
    fn landing_is_a_vertical_entry() {
        let mut floor = body(0.0, 16.0, 32.0, 8.0, Kind::Floor).fixed();
        let mut ent = body(4.0, 4.0, 8.0, 12.0, Kind::Walky);
        ent.velocity.y = 60.0;
        ent.update(0.05);

        assert!(Body::just_overlapped(&mut ent, &mut floor));
        assert!(ent.collision().has(CollisionDir::Down));
        assert!(!ent.collision().has_any(&crate::collision::types::HORIZONTAL));
        assert!(floor.collision().has(CollisionDir::Up));

        assert!(Body::collide(&mut floor, &mut ent));
        assert_eq!(ent.bottom(), 16.0);
        assert_eq!(floor.position.y, 16.0);
    }

    #[test]
    fn continued_overlap_is_not_a_fresh_entry() {
        let mut a = body(0.0, 0.0, 8.0, 8.0, Kind::Walky);
        let mut b = body(4.0, 4.0, 8.0, 8.0, Kind::Walky);

        assert!(Body::is_overlapping(&a, &b));
        assert!(!Body::just_overlapped(&mut a, &mut b));
        assert!(a.collision().is_empty());
    }

    #[test]
    fn walking_into_a_wall_is_horizontal() {
        let mut wall = body(16.0, 0.0, 8.0, 32.0, Kind::Floor).fixed();
        let mut ent = body(7.0, 8.0, 8.0, 8.0, Kind::Swordy);
        ent.velocity.x = 40.0;
        ent.update(0.05);

        assert!(Body::just_overlapped(&mut wall, &mut ent));
        assert!(ent.collision().has(CollisionDir::Right));
        assert!(!ent.collision().has(CollisionDir::Down));

        Body::collide(&mut wall, &mut ent);
        assert_eq!(ent.position.x, 8.0);
    }

    #[test]
    fn diagonal_entry_touches_both_axes() {
        let mut a = body(0.0, 0.0, 8.0, 8.0, Kind::Walky);
        let mut b = body(9.0, 9.0, 8.0, 8.0, Kind::Floor).fixed();
        a.velocity = Vec2::new(40.0, 40.0);
        a.update(0.05);

        assert!(Body::just_overlapped(&mut a, &mut b));
        assert!(a.collision().has_all(&[CollisionDir::Down, CollisionDir::Right]));
    }

    #[test]
    fn fixed_pairs_never_move() {
        let mut a = body(0.0, 0.0, 8.0, 8.0, Kind::Floor).fixed();
        let mut b = body(4.0, 4.0, 8.0, 8.0, Kind::Floor).fixed();

        assert!(!Body::separate_vertical(&mut a, &mut b));
        assert_eq!(a.position, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn bottom_center_round_trips() {
        let mut a = body(3.0, 5.0, 10.0, 6.0, Kind::Gunny);
        a.set_bottom_center(Vec2::new(40.0, 80.0));

        assert_eq!(a.bottom_center(), Vec2::new(40.0, 80.0));
        assert_eq!(a.last_position, a.position);
    }

    #[test]
    fn update_rotates_collision_state() {
        let mut a = body(0.0, 0.0, 8.0, 8.0, Kind::Walky);
        a.touch(CollisionMask::from_tags(&[CollisionDir::Down]));
        a.acceleration.y = 100.0;
        a.update(0.5);

        assert!(a.collision().is_empty());
        assert!(a.last_collision().has(CollisionDir::Down));
        assert_eq!(a.velocity.y, 50.0);
        assert_eq!(a.position.y, 25.0);
    }

    #[test]
    fn arena_recycles_slots_with_new_generations() {
        let mut arena = BodyArena::new();
        let a = arena.insert_with(|_| body(0.0, 0.0, 1.0, 1.0, Kind::Fx));
        let b = arena.insert_with(|_| body(2.0, 0.0, 1.0, 1.0, Kind::Fx));

        assert!(arena.remove(a).is_some());
        let c = arena.insert_with(|_| body(4.0, 0.0, 1.0, 1.0, Kind::Fx));

        assert_eq!(c.index, a.index);
        assert_ne!(c, a);
        assert!(arena.get(a).is_none());
        assert_eq!(arena.len(), 2);

        let (pc, pb) = arena.pair_mut(c, b).expect("both live");
        assert_eq!(pc.position.x, 4.0);
        assert_eq!(pb.position.x, 2.0);
        assert!(arena.pair_mut(b, b).is_none());
    }
}
