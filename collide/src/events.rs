/*!
Event areas placed by the level: load zones, checkpoints and pressure pads.

Touching an area only records state on the world. Level transitions are
aggregated per frame by [`LevelTriggers`]: a transition is pending once both
players touched the same zone during one frame, and the first zone touched in
a frame wins.
*/

use crate::bitmask_flags::BitmaskFlags;
use crate::collision::types::{BodyId, EventId, Vec2};
use crate::define_bitmask_flags;
use crate::error::{CollideResult, CollisionError};
use crate::type_tag::Kind;

/// Where a load zone or checkpoint leads.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transition {
    /// Index of the zone (and of the level it loads).
    pub zone: u8,
    /// Spawn point in the destination.
    pub spawn: Vec2,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EventKind {
    Loadzone(Transition),
    Checkpoint(Transition),
    /// Bits of the locks opened while something stands on the pad.
    PressurePad { locks: u8 },
}

impl EventKind {
    pub fn kind(&self) -> Kind {
        match self {
            EventKind::Loadzone(_) => Kind::Loadzone,
            EventKind::Checkpoint(_) => Kind::Checkpoint,
            EventKind::PressurePad { .. } => Kind::PressurePad,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Event {
    pub body: BodyId,
    pub kind: EventKind,
}

/// Fixed-capacity list of the level's event areas.
#[derive(Debug, Clone)]
pub struct Events {
    list: Vec<Event>,
    capacity: usize,
}

impl Events {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            list: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, event: Event) -> CollideResult<EventId> {
        if self.list.len() >= self.capacity {
            return Err(CollisionError::BufferExhausted {
                what: "event list",
                capacity: self.capacity,
            });
        }
        self.list.push(event);
        Ok(EventId((self.list.len() - 1) as u32))
    }

    pub fn get(&self, id: EventId) -> CollideResult<&Event> {
        self.list
            .get(id.0 as usize)
            .ok_or(CollisionError::UnknownEvent(id))
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

define_bitmask_flags!(
    /// Player character whose presence in a load zone counts towards a transition.
    PlayerSlot, u8, { Swordy, Gunny }
);

impl PlayerSlot {
    pub fn from_kind(kind: Kind) -> Option<Self> {
        match kind {
            Kind::Swordy => Some(PlayerSlot::Swordy),
            Kind::Gunny => Some(PlayerSlot::Gunny),
            _ => None,
        }
    }
}

/// Per-frame record of triggered event areas.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LevelTriggers {
    zone: Option<u8>,
    players: BitmaskFlags<u8>,
    pressed_locks: u8,
}

impl LevelTriggers {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record something touching load zone `zone`. Returns false when another
    /// zone was already touched this frame.
    ///
    /// Dummies (`player` is `None`) claim the zone for the frame without counting as present.
    pub fn hit_loadzone(&mut self, player: Option<PlayerSlot>, zone: u8) -> bool {
        match self.zone {
            Some(current) if current != zone => false,
            _ => {
                self.zone = Some(zone);
                if let Some(player) = player {
                    self.players.add(player);
                }
                true
            }
        }
    }

    /// Zone both players are standing in, if any.
    pub fn pending_transition(&self) -> Option<u8> {
        if self.players.has_all(&[PlayerSlot::Swordy, PlayerSlot::Gunny]) {
            self.zone
        } else {
            None
        }
    }

    pub fn press(&mut self, locks: u8) {
        self.pressed_locks |= locks;
    }

    pub fn pressed_locks(&self) -> u8 {
        self.pressed_locks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_needs_both_players_in_the_same_zone() {
        let mut triggers = LevelTriggers::default();

        assert!(triggers.hit_loadzone(Some(PlayerSlot::Swordy), 2));
        assert_eq!(triggers.pending_transition(), None);

        assert!(!triggers.hit_loadzone(Some(PlayerSlot::Gunny), 3));
        assert_eq!(triggers.pending_transition(), None);

        assert!(triggers.hit_loadzone(Some(PlayerSlot::Gunny), 2));
        assert_eq!(triggers.pending_transition(), Some(2));

        triggers.reset();
        assert_eq!(triggers.pending_transition(), None);
    }

    #[test]
    fn dummies_claim_a_zone_without_counting() {
        assert_eq!(PlayerSlot::from_kind(Kind::DummyGunny), None);
        assert_eq!(PlayerSlot::from_kind(Kind::Swordy), Some(PlayerSlot::Swordy));

        let mut triggers = LevelTriggers::default();
        assert!(triggers.hit_loadzone(None, 4));
        assert!(triggers.hit_loadzone(Some(PlayerSlot::Swordy), 4));
        assert_eq!(triggers.pending_transition(), None);

        // The dummy got there first, so the other zone is ignored this frame.
        assert!(!triggers.hit_loadzone(Some(PlayerSlot::Gunny), 5));
        assert_eq!(triggers.pending_transition(), None);
    }

    #[test]
    fn event_list_is_bounded() {
        let mut events = Events::with_capacity(1);
        let event = Event {
            body: BodyId {
                index: 0,
                generation: 0,
            },
            kind: EventKind::PressurePad { locks: 1 },
        };

        assert_eq!(events.push(event).ok(), Some(EventId(0)));
        assert!(matches!(
            events.push(event),
            Err(CollisionError::BufferExhausted { capacity: 1, .. })
        ));
        assert!(matches!(events.get(EventId(5)), Err(CollisionError::UnknownEvent(EventId(5)))));
    }
}
