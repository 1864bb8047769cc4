/*!
Collision response tolerances and carry tuning.

These constants centralize the magic numbers used by the pair handlers and the
carry chain. Keeping them together makes tuning easier and keeps the handlers
free of literals.

Notes
- Distances are in world units (pixels), velocities in units per second.
- Positive vertical velocity points down.
*/

use crate::constants::tiles_to_px;

/// Distance an entity must sink below a hazard's top before the hazard kills it.
/// Grazing the tip of a spike is survivable.
pub const SPIKE_OFFSET: f32 = 4.0;

/// Nudge applied away from a corner when landing while touching a wall,
/// and downwards after a head bump.
pub const CORNER_NUDGE: f32 = 1.0;

/// Carrier fall speed from which the rider is pulled along with extra speed.
pub const CARRY_FAST_FALL: f32 = tiles_to_px(2.0);

/// Multiplier applied to a fast-falling carrier's velocity before handing it to the rider.
pub const CARRY_FAST_FALL_SCALE: f32 = 1.06125;

/// Fall speed given to a rider whose carrier is resting or barely rising.
pub const CARRY_MIN_FALL: f32 = tiles_to_px(5.0);

/// Damping applied to the rider while the carrier rises quickly.
pub const CARRY_RISE_DAMPING: f32 = 0.125;

/// Damped rise slower than this is replaced by [`CARRY_RISE_FLOOR`].
pub const CARRY_RISE_THRESHOLD: f32 = tiles_to_px(2.0);

/// Downward speed used when the damped rise is too small to matter.
pub const CARRY_RISE_FLOOR: f32 = tiles_to_px(1.0);

/// Velocity handed to a rider given its carrier's vertical velocity and acceleration.
///
/// The result is clamped to [`crate::constants::MAX_FALL_SPEED`].
#[inline]
pub fn carried_velocity(carrier_vy: f32, carrier_ay: f32, dt: f32) -> f32 {
    let vy = if carrier_vy >= CARRY_FAST_FALL {
        CARRY_FAST_FALL_SCALE * (carrier_vy + carrier_ay * dt)
    } else if carrier_vy >= -CARRY_MIN_FALL {
        CARRY_MIN_FALL
    } else {
        let damped = carrier_vy * CARRY_RISE_DAMPING;
        if damped >= -CARRY_RISE_THRESHOLD {
            CARRY_RISE_FLOOR
        } else {
            damped
        }
    };
    vy.min(crate::constants::MAX_FALL_SPEED)
}
