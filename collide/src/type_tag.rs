/*!
Packed collision type tags and merge keys.

# Bit layout
A [`TypeTag`] is a `u32` with the following layout (least-significant bit = bit 0):

- bits 0..=4   : [`BaseCategory`] (hazard, player, event, floor, enemy, fx)
- bits 5..=15  : subtype index within the category
- bits 16..=31 : payload (e.g. the damage carried by an attack hitbox)

Only the low 16 bits take part in collision dispatch. A [`MergeKey`] packs two of those
halves into one value, `first | second << 16`. It is not symmetric, so the rule table
registers both orderings of every declared pair.

# Compatibility
Level data and hitbox spawners store these values directly. Do not renumber categories or
subtypes without updating the producers.
*/

/// Number of low bits reserved for the base category.
pub const BASE_BITS: u32 = 5;

/// Mask selecting the base category.
pub const BASE_MASK: u32 = (1 << BASE_BITS) - 1;

/// Mask selecting the part of a tag that participates in dispatch.
pub const KIND_MASK: u32 = 0xffff;

/// Shift of the per-box payload.
pub const PAYLOAD_SHIFT: u32 = 16;

/// Dispatch key for an ordered pair of tags.
pub type MergeKey = u32;

/// Broad category stored in the low bits of a tag.
///
/// The numeric values are part of the packed tag format.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BaseCategory {
    Hazard = 5,
    Player = 6,
    Event = 7,
    Floor = 8,
    Enemy = 10,
    Fx = 13,
}

impl BaseCategory {
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            5 => Some(Self::Hazard),
            6 => Some(Self::Player),
            7 => Some(Self::Event),
            8 => Some(Self::Floor),
            10 => Some(Self::Enemy),
            13 => Some(Self::Fx),
            _ => None,
        }
    }
}

/// Packed type tag carried by every collision box.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeTag(u32);

impl TypeTag {
    #[inline]
    pub const fn new(base: BaseCategory, subtype: u16) -> Self {
        Self(((subtype as u32) << BASE_BITS) | base as u32)
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The 16 bits used for dispatch (category plus subtype).
    #[inline]
    pub const fn key_bits(self) -> u32 {
        self.0 & KIND_MASK
    }

    #[inline]
    pub fn base(self) -> Option<BaseCategory> {
        BaseCategory::from_bits(self.0 & BASE_MASK)
    }

    #[inline]
    pub const fn subtype(self) -> u32 {
        (self.0 & KIND_MASK) >> BASE_BITS
    }

    #[inline]
    pub const fn payload(self) -> u16 {
        (self.0 >> PAYLOAD_SHIFT) as u16
    }

    /// Same dispatch bits, replaced payload.
    #[inline]
    pub const fn with_payload(self, payload: u16) -> Self {
        Self(self.key_bits() | ((payload as u32) << PAYLOAD_SHIFT))
    }

    #[inline]
    pub fn kind(self) -> Option<Kind> {
        Kind::from_tag(self)
    }
}

/// Combine two tags into the ordered dispatch key `first | second << 16`.
#[inline]
pub const fn merge_key(first: TypeTag, second: TypeTag) -> MergeKey {
    first.key_bits() | (second.key_bits() << 16)
}

/// Split a merge key back into its two (payload-free) tags.
#[inline]
pub const fn split_merge_key(key: MergeKey) -> (TypeTag, TypeTag) {
    (TypeTag(key & KIND_MASK), TypeTag(key >> 16))
}

/// Every box type the game declares.
///
/// The rule table must classify the full cross product of these.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Floor,
    FloorNoTeleport,
    BluePlatform,
    Door,
    Spike,
    Swordy,
    Gunny,
    SwordAttack,
    TeleportBullet,
    DummySwordy,
    DummyGunny,
    Fx,
    SwordFx,
    Walky,
    GreenWalky,
    Spiky,
    Turret,
    GreenWalkyAttack,
    GreenWalkyView,
    Checkpoint,
    Loadzone,
    PressurePad,
}

impl Kind {
    pub const ALL: [Kind; 22] = [
        Kind::Floor,
        Kind::FloorNoTeleport,
        Kind::BluePlatform,
        Kind::Door,
        Kind::Spike,
        Kind::Swordy,
        Kind::Gunny,
        Kind::SwordAttack,
        Kind::TeleportBullet,
        Kind::DummySwordy,
        Kind::DummyGunny,
        Kind::Fx,
        Kind::SwordFx,
        Kind::Walky,
        Kind::GreenWalky,
        Kind::Spiky,
        Kind::Turret,
        Kind::GreenWalkyAttack,
        Kind::GreenWalkyView,
        Kind::Checkpoint,
        Kind::Loadzone,
        Kind::PressurePad,
    ];

    pub const fn base(self) -> BaseCategory {
        match self {
            Kind::Floor | Kind::FloorNoTeleport | Kind::BluePlatform | Kind::Door => {
                BaseCategory::Floor
            }
            Kind::Spike => BaseCategory::Hazard,
            Kind::Swordy
            | Kind::Gunny
            | Kind::SwordAttack
            | Kind::TeleportBullet
            | Kind::DummySwordy
            | Kind::DummyGunny => BaseCategory::Player,
            Kind::Fx | Kind::SwordFx => BaseCategory::Fx,
            Kind::Walky
            | Kind::GreenWalky
            | Kind::Spiky
            | Kind::Turret
            | Kind::GreenWalkyAttack
            | Kind::GreenWalkyView => BaseCategory::Enemy,
            Kind::Checkpoint | Kind::Loadzone | Kind::PressurePad => BaseCategory::Event,
        }
    }

    /// Index of this kind inside its category.
    const fn subtype_index(self) -> u16 {
        match self {
            Kind::Floor | Kind::Fx => 0,
            Kind::FloorNoTeleport
            | Kind::Spike
            | Kind::Swordy
            | Kind::Walky
            | Kind::Checkpoint => 1,
            Kind::BluePlatform | Kind::Gunny | Kind::GreenWalky | Kind::Loadzone => 2,
            Kind::Door
            | Kind::SwordAttack
            | Kind::SwordFx
            | Kind::Spiky
            | Kind::PressurePad => 3,
            Kind::TeleportBullet | Kind::Turret => 4,
            Kind::DummySwordy | Kind::GreenWalkyAttack => 5,
            Kind::DummyGunny | Kind::GreenWalkyView => 6,
        }
    }

    #[inline]
    pub const fn tag(self) -> TypeTag {
        TypeTag::new(self.base(), self.subtype_index())
    }

    /// Look up the kind of a tag, ignoring its payload.
    pub fn from_tag(tag: TypeTag) -> Option<Kind> {
        let bits = tag.key_bits();
        Kind::ALL.into_iter().find(|k| k.tag().key_bits() == bits)
    }

    /// Player-controlled characters (not their attacks or dummies).
    #[inline]
    pub fn is_player(self) -> bool {
        matches!(self, Kind::Swordy | Kind::Gunny)
    }
}
