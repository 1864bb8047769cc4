use std::time::Duration;

/// Size of one level tile in world units (pixels).
pub const TILE_SIZE: f32 = 8.0;

/// Logic frames per second assumed by frame-based tuning values.
pub const FRAMES_PER_SECOND: f32 = 60.0;

/// Convert a length in tiles to world units.
#[inline]
pub const fn tiles_to_px(tiles: f32) -> f32 {
    tiles * TILE_SIZE
}

/// Terminal vertical velocity (units per second, positive is down).
pub const MAX_FALL_SPEED: f32 = 410.0;

/// Default time a jump may still be started after leaving the ground.
pub const JUMP_GRACE: Duration = Duration::from_millis(80);

/// Damage carried by a sword swing. Any hit is lethal, the value only travels in the tag payload.
pub const SWORD_DAMAGE: u16 = 1000;

/// Size of a teleporter bullet.
pub const BULLET_WIDTH: f32 = 8.0;
pub const BULLET_HEIGHT: f32 = 2.0;

/// Horizontal speed of a teleporter bullet (units per second).
pub const BULLET_SPEED: f32 = tiles_to_px(25.0);

/// A teleporter bullet that hits nothing vanishes after this long.
pub const BULLET_TTL: Duration = Duration::from_millis(6000);

/// Side of the square teleport marker effect.
pub const MARKER_SIZE: f32 = 8.0;

/// Horizontal render offset of a marker stuck to a wall, towards the wall.
pub const MARKER_SIDE_OFFSET: f32 = 4.0;

/// Side of the star spawned when an enemy projectile bursts.
pub const EXPLOSION_SIZE: f32 = 4.0;

/// Lifetime of the projectile burst effect.
pub const EXPLOSION_TTL: Duration = Duration::from_millis(250);

/// Lifetime of the "saved" effect shown over a touched checkpoint.
pub const CHECKPOINT_FX_TTL: Duration = Duration::from_millis(1000);

/// Maximum depth of a stack of entities riding each other.
pub const MAX_CARRY_CHAIN: usize = 8;

/// Maximum number of event areas (load zones, checkpoints, pressure pads) in a level.
pub const MAX_EVENTS: usize = 32;

/// Default number of simultaneously live effects.
pub const DEFAULT_EFFECT_CAPACITY: usize = 64;
