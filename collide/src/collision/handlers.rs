/*!
Pair handlers.

Every handler receives its two nodes already ordered by role (see
[`crate::collision::rules::Handler`] for which is which). Handlers that spend or
remove the box being resolved raise the skip flag so the current pass stops.
*/

use crate::collision::body::Body;
use crate::collision::resolver::HandlerCtx;
use crate::collision::rules::Handler;
use crate::collision::settings::{CORNER_NUDGE, SPIKE_OFFSET};
use crate::collision::types::{Aabb, BodyId, CollisionDir, EntityId, EventId, Facing, HORIZONTAL, Node, Vec2};
use crate::constants::{CHECKPOINT_FX_TTL, EXPLOSION_SIZE, EXPLOSION_TTL, SWORD_DAMAGE};
use crate::effects::{Animation, EffectSpawn};
use crate::entity::{self, EntityFlag};
use crate::error::{CollideResult, CollisionError};
use crate::events::{EventKind, PlayerSlot};
use crate::teleport::{self, TargetSide};
use crate::type_tag::Kind;
use crate::world::{SessionFlag, World};

pub(crate) fn dispatch(handler: Handler, ctx: &mut HandlerCtx<'_>, a: Node, b: Node) -> CollideResult<()> {
    match handler {
        Handler::FloorContact => floor_contact(ctx, a, b),
        Handler::FloorProjectile | Handler::DenyProjectile => {
            // The projectile is the second box for floors, the first one otherwise.
            let projectile = if handler == Handler::FloorProjectile { b } else { a };
            deny_projectile(ctx, projectile)
        }
        Handler::HazardContact => hazard_contact(ctx, a, b),
        Handler::EntityContact => entity_contact(ctx, a, b),
        Handler::AttackEntity => attack_entity(ctx, a, b),
        Handler::ReflectProjectile => reflect_projectile(ctx, a, b),
        Handler::TeleportIgnore => {
            ctx.world.remove_effect(a.body);
            ctx.run.skip = true;
            Ok(())
        }
        Handler::TeleportEntity => teleport_entity(ctx, a, b),
        Handler::TeleportFloor => teleport_floor(ctx, a, b),
        Handler::PlayerDummy => player_dummy(ctx, a, b),
        Handler::Loadzone => loadzone(ctx, a, b),
        Handler::Checkpoint => checkpoint(ctx, a),
        Handler::PressurePad => pressure_pad(ctx, b),
        Handler::GuardView => {
            let owner = entity_of(a)?;
            ctx.world.entity_mut(owner)?.flags.add(EntityFlag::AttackTriggered);
            Ok(())
        }
    }
}

fn entity_of(node: Node) -> CollideResult<EntityId> {
    node.entity().ok_or(CollisionError::NotAnEntity(node.body))
}

fn event_of(node: Node) -> CollideResult<EventId> {
    node.event().ok_or(CollisionError::NotAnEvent(node.body))
}

/// Blue platforms only exist once they were switched on.
fn is_inactive_platform(world: &World, node: Node) -> bool {
    node.tag.kind() == Some(Kind::BluePlatform) && !world.session.has(SessionFlag::BlueActive)
}

fn retype(world: &mut World, body: BodyId, kind: Kind) -> CollideResult<()> {
    world.body_mut(body)?.tag = kind.tag();
    Ok(())
}

/// Replace a projectile with a short star burst.
fn explode(world: &mut World, projectile: BodyId) -> CollideResult<()> {
    let Some(position) = world.bodies.get(projectile).map(|b| b.position) else {
        return Ok(());
    };
    world.remove_effect(projectile);
    let bounds = Aabb {
        min: position,
        size: Vec2::repeat(EXPLOSION_SIZE),
    };
    world.spawn_effect(
        EffectSpawn::new(bounds, Kind::Fx.tag(), Animation::StarExplosion).with_ttl(EXPLOSION_TTL),
    )?;
    Ok(())
}

fn floor_contact(ctx: &mut HandlerCtx<'_>, floor: Node, entity: Node) -> CollideResult<()> {
    if is_inactive_platform(ctx.world, floor) {
        return Ok(());
    }
    let fix_teleport = ctx.run.fix_teleport;
    let (f, e) = ctx.world.body_pair_mut(floor.body, entity.body)?;

    if Body::just_overlapped(f, e) {
        let dir = e.collision();
        if dir.has(CollisionDir::Up) && dir.has_any(&HORIZONTAL) {
            // Two separate tiles forming a wall would otherwise catch the head on the seam.
            Body::separate_horizontal(f, e);
        } else {
            Body::collide(f, e);
        }

        if dir.has(CollisionDir::Down) {
            e.velocity.y = 0.0;
            if dir.has(CollisionDir::Left) {
                e.position += Vec2::new(-CORNER_NUDGE, -CORNER_NUDGE);
            } else if dir.has(CollisionDir::Right) {
                e.position += Vec2::new(CORNER_NUDGE, -CORNER_NUDGE);
            }
        } else if dir.has(CollisionDir::Up) && !dir.has_any(&HORIZONTAL) {
            e.velocity.y = 0.0;
            e.position.y += CORNER_NUDGE;
        }
    } else if fix_teleport && Body::is_overlapping(f, e) {
        if e.position.y >= f.position.y {
            e.position.y = f.bottom();
        } else if e.bottom() <= f.bottom() {
            e.position.y = f.position.y - e.size.y;
        }
    }
    Ok(())
}

fn deny_projectile(ctx: &mut HandlerCtx<'_>, projectile: Node) -> CollideResult<()> {
    if projectile.tag.kind() == Some(Kind::GreenWalkyAttack) {
        explode(ctx.world, projectile.body)?;
    }
    ctx.run.skip = true;
    Ok(())
}

fn hazard_contact(ctx: &mut HandlerCtx<'_>, hazard: Node, entity: Node) -> CollideResult<()> {
    let id = entity_of(entity)?;
    let (h, e) = ctx.world.body_pair_mut(hazard.body, entity.body)?;
    Body::just_overlapped(h, e);

    if e.bottom() < h.position.y + SPIKE_OFFSET {
        return Ok(());
    }
    if e.collision().has_any(&HORIZONTAL) {
        Body::separate_horizontal(h, e);
        return Ok(());
    }
    log::debug!("{:?} fell on a hazard", entity.tag.kind());
    ctx.world.entity_mut(id)?.kill();
    Ok(())
}

fn entity_contact(ctx: &mut HandlerCtx<'_>, a: Node, b: Node) -> CollideResult<()> {
    let spiky = |n: Node| n.tag.kind() == Some(Kind::Spiky);
    match (spiky(a), spiky(b)) {
        (true, false) => spiky_contact(ctx, a, b),
        (false, true) => spiky_contact(ctx, b, a),
        _ => entity::collide_two_entities(ctx.world, entity_of(a)?, entity_of(b)?),
    }
}

/// A spiky hurts whatever it runs into head first.
fn spiky_contact(ctx: &mut HandlerCtx<'_>, spiky: Node, other: Node) -> CollideResult<()> {
    let (s, o) = ctx.world.body_pair_mut(spiky.body, other.body)?;
    if !Body::just_overlapped(s, o) {
        return Ok(());
    }
    let touched = s.collision();
    let head_first = match s.facing {
        Facing::Right => touched.has(CollisionDir::Right),
        Facing::Left => touched.has(CollisionDir::Left),
    };
    if head_first {
        let id = entity_of(other)?;
        ctx.world.entity_mut(id)?.hit(spiky.tag.payload());
        ctx.run.skip = true;
    }
    Ok(())
}

/// Whether an attack on `target` lands, consulting its guard if it has one.
fn attack_lands(ctx: &mut HandlerCtx<'_>, attack: BodyId, target: Node) -> CollideResult<bool> {
    let id = entity_of(target)?;
    if ctx.world.entity(id)?.guard.is_none() {
        return Ok(true);
    }
    let (a, t) = ctx.world.body_pair_mut(attack, target.body)?;
    Body::just_overlapped(a, t);
    entity::on_guarded_attack(ctx.world, id)
}

fn attack_entity(ctx: &mut HandlerCtx<'_>, attack: Node, target: Node) -> CollideResult<()> {
    let damage = match attack.tag.kind() {
        Some(Kind::SwordAttack) => SWORD_DAMAGE,
        _ => attack.tag.payload(),
    };
    if attack_lands(ctx, attack.body, target)? {
        ctx.world.entity_mut(entity_of(target)?)?.hit(damage);
    }

    match attack.tag.kind() {
        Some(Kind::SwordAttack) => retype(ctx.world, attack.body, Kind::SwordFx)?,
        Some(Kind::GreenWalkyAttack) => explode(ctx.world, attack.body)?,
        _ => {}
    }
    ctx.run.skip = true;
    Ok(())
}

fn reflect_projectile(ctx: &mut HandlerCtx<'_>, sword: Node, projectile: Node) -> CollideResult<()> {
    let p = ctx.world.body_mut(projectile.body)?;
    p.velocity.x = -p.velocity.x;
    p.facing = p.facing.flipped();

    retype(ctx.world, sword.body, Kind::SwordFx)?;
    ctx.run.skip = true;
    Ok(())
}

fn teleport_entity(ctx: &mut HandlerCtx<'_>, bullet: Node, target: Node) -> CollideResult<()> {
    let id = entity_of(target)?;
    let accepted = ctx.world.is_visible(target.body) && attack_lands(ctx, bullet.body, target)?;

    ctx.world.remove_effect(bullet.body);
    if accepted {
        teleport::target_entity(ctx.world, id)?;
    }
    ctx.run.skip = true;
    Ok(())
}

fn teleport_floor(ctx: &mut HandlerCtx<'_>, bullet: Node, floor: Node) -> CollideResult<()> {
    if is_inactive_platform(ctx.world, floor) {
        return Ok(());
    }

    let target = if ctx.world.is_visible(floor.body) {
        let b = ctx.world.body(bullet.body)?;
        let (center, half) = (b.last_center(), b.size.x / 2.0);
        let f = ctx.world.body(floor.body)?;
        // Bullets travel horizontally, so the side struck follows from where the bullet came from.
        if center.x - half >= f.position.x {
            Some((Vec2::new(f.position.x + f.size.x + half, center.y), TargetSide::Left))
        } else {
            Some((Vec2::new(f.position.x - half, center.y), TargetSide::Right))
        }
    } else {
        None
    };

    ctx.world.remove_effect(bullet.body);
    if let Some((point, side)) = target {
        teleport::target_position(ctx.world, point, side)?;
    }
    ctx.run.skip = true;
    Ok(())
}

fn player_dummy(ctx: &mut HandlerCtx<'_>, dummy: Node, player: Node) -> CollideResult<()> {
    let (p, d) = ctx.world.body_pair_mut(player.body, dummy.body)?;
    Body::just_overlapped(p, d);
    if p.position.y < d.position.y {
        Body::separate_vertical(p, d);
        if p.collision().has(CollisionDir::Down) {
            p.velocity.y = 0.0;
        }
    }
    Ok(())
}

fn loadzone(ctx: &mut HandlerCtx<'_>, zone: Node, player: Node) -> CollideResult<()> {
    let event = ctx.world.events.get(event_of(zone)?)?;
    let EventKind::Loadzone(transition) = event.kind else {
        return Err(CollisionError::NotAnEvent(zone.body));
    };
    let slot = player.tag.kind().and_then(PlayerSlot::from_kind);
    if !ctx.world.triggers.hit_loadzone(slot, transition.zone) {
        log::trace!("zone {} ignored, another zone was touched first", transition.zone);
    }
    Ok(())
}

fn checkpoint(ctx: &mut HandlerCtx<'_>, area: Node) -> CollideResult<()> {
    let event = ctx.world.events.get(event_of(area)?)?;
    let EventKind::Checkpoint(transition) = event.kind else {
        return Err(CollisionError::NotAnEvent(area.body));
    };
    let bounds = ctx.world.body(area.body)?.bounds();

    ctx.world.checkpoint = Some(transition);
    ctx.world.spawn_effect(
        EffectSpawn::new(bounds, Kind::Fx.tag(), Animation::CheckpointSaved).with_ttl(CHECKPOINT_FX_TTL),
    )?;
    // A checkpoint saves once per level load.
    retype(ctx.world, area.body, Kind::Fx)?;
    log::info!("checkpoint saved in zone {}", transition.zone);
    Ok(())
}

fn pressure_pad(ctx: &mut HandlerCtx<'_>, pad: Node) -> CollideResult<()> {
    let event = ctx.world.events.get(event_of(pad)?)?;
    if let EventKind::PressurePad { locks } = event.kind {
        ctx.world.triggers.press(locks);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::resolver::RunState;
    use crate::entity::{Guard, PhysicsTuning};
    use crate::events::Transition;

    fn world() -> World {
        World::new(Aabb::new(0.0, 0.0, 320.0, 240.0))
    }

    fn run(world: &mut World, handler: Handler, a: BodyId, b: BodyId) -> RunState {
        let mut state = RunState::default();
        let x = world.bodies.node(a).expect("first box");
        let y = world.bodies.node(b).expect("second box");
        let mut ctx = HandlerCtx {
            world,
            run: &mut state,
        };
        dispatch(handler, &mut ctx, x, y).expect("handled");
        state
    }

    fn entity(world: &mut World, bounds: Aabb, kind: Kind) -> (EntityId, BodyId) {
        let id = world.add_entity(bounds, kind, PhysicsTuning::default(), 2);
        (id, world.entity(id).expect("entity").body)
    }

    /// Move a body as if it travelled by `delta` during this frame.
    fn travel(world: &mut World, body: BodyId, delta: Vec2) {
        let b = world.body_mut(body).expect("body");
        b.last_position = b.position;
        b.position += delta;
    }

    #[test]
    fn landing_entities_stop_without_nudge() {
        let mut w = world();
        let floor = w.add_static(Aabb::new(0.0, 16.0, 64.0, 8.0), Kind::Floor);
        let (_, a) = entity(&mut w, Aabb::new(4.0, 4.0, 8.0, 12.0), Kind::Walky);
        let (_, b) = entity(&mut w, Aabb::new(30.0, 4.0, 8.0, 12.0), Kind::Swordy);

        for body in [a, b] {
            w.body_mut(body).expect("body").velocity.y = 60.0;
            travel(&mut w, body, Vec2::new(0.0, 3.0));
            run(&mut w, Handler::FloorContact, floor, body);
        }

        for (body, x) in [(a, 4.0), (b, 30.0)] {
            let e = w.body(body).expect("body");
            assert_eq!(e.velocity.y, 0.0);
            assert_eq!(e.position, Vec2::new(x, 4.0));
        }
    }

    #[test]
    fn corner_landing_is_nudged_towards_the_platform() {
        let mut w = world();
        let floor = w.add_static(Aabb::new(0.0, 16.0, 64.0, 8.0), Kind::Floor);
        let (_, body) = entity(&mut w, Aabb::new(-8.0, 4.0, 8.0, 12.0), Kind::Walky);
        travel(&mut w, body, Vec2::new(2.0, 2.0));

        run(&mut w, Handler::FloorContact, floor, body);

        let e = w.body(body).expect("body");
        assert!(e.collision().has_all(&[CollisionDir::Down, CollisionDir::Right]));
        assert_eq!(e.position, Vec2::new(-5.0, 3.0));
    }

    #[test]
    fn head_bump_pushes_down() {
        let mut w = world();
        let floor = w.add_static(Aabb::new(0.0, 16.0, 64.0, 8.0), Kind::Floor);
        let (_, body) = entity(&mut w, Aabb::new(4.0, 24.0, 8.0, 8.0), Kind::Swordy);
        w.body_mut(body).expect("body").velocity.y = -80.0;
        travel(&mut w, body, Vec2::new(0.0, -2.0));

        run(&mut w, Handler::FloorContact, floor, body);

        let e = w.body(body).expect("body");
        assert_eq!(e.velocity.y, 0.0);
        assert_eq!(e.position.y, 25.0);
    }

    #[test]
    fn blue_platforms_need_the_session_switch() {
        let mut w = world();
        let platform = w.add_static(Aabb::new(0.0, 16.0, 64.0, 8.0), Kind::BluePlatform);
        let (_, body) = entity(&mut w, Aabb::new(4.0, 4.0, 8.0, 12.0), Kind::Walky);
        travel(&mut w, body, Vec2::new(0.0, 3.0));

        run(&mut w, Handler::FloorContact, platform, body);
        assert_eq!(w.body(body).expect("body").position.y, 7.0);

        w.session.add(SessionFlag::BlueActive);
        w.body_mut(body).expect("body").last_position.y = 4.0;
        run(&mut w, Handler::FloorContact, platform, body);
        assert_eq!(w.body(body).expect("body").position.y, 4.0);
    }

    #[test]
    fn teleport_fix_drops_embedded_boxes_below_the_floor() {
        let mut w = world();
        let floor = w.add_static(Aabb::new(0.0, 16.0, 64.0, 8.0), Kind::Floor);
        let (_, body) = entity(&mut w, Aabb::new(4.0, 18.0, 8.0, 4.0), Kind::Walky);

        let mut state = RunState {
            fix_teleport: true,
            ..RunState::default()
        };
        let x = w.bodies.node(floor).expect("floor");
        let y = w.bodies.node(body).expect("entity");
        dispatch(
            Handler::FloorContact,
            &mut HandlerCtx {
                world: &mut w,
                run: &mut state,
            },
            x,
            y,
        )
        .expect("handled");

        assert_eq!(w.body(body).expect("body").position.y, 24.0);
    }

    #[test]
    fn spikes_kill_from_above_and_block_from_the_side() {
        let mut w = world();
        let spike = w.add_static(Aabb::new(0.0, 16.0, 16.0, 8.0), Kind::Spike);
        let (faller, fb) = entity(&mut w, Aabb::new(4.0, 4.0, 8.0, 12.0), Kind::Walky);
        let (walker, wb) = entity(&mut w, Aabb::new(-8.0, 14.0, 8.0, 8.0), Kind::Swordy);

        // Grazing the top edge is harmless.
        travel(&mut w, fb, Vec2::new(0.0, 3.0));
        run(&mut w, Handler::HazardContact, spike, fb);
        assert!(w.entity(faller).expect("entity").is_alive());

        travel(&mut w, fb, Vec2::new(0.0, 2.0));
        w.body_mut(fb).expect("body").last_position.y = 4.0;
        run(&mut w, Handler::HazardContact, spike, fb);
        assert!(!w.entity(faller).expect("entity").is_alive());

        travel(&mut w, wb, Vec2::new(2.0, 0.0));
        run(&mut w, Handler::HazardContact, spike, wb);
        assert!(w.entity(walker).expect("entity").is_alive());
        assert_eq!(w.body(wb).expect("body").position.x, -8.0);
    }

    #[test]
    fn spiky_hurts_only_head_first() {
        let mut w = world();
        let (_, spiky) = entity(&mut w, Aabb::new(0.0, 0.0, 8.0, 8.0), Kind::Spiky);
        let (victim, vb) = entity(&mut w, Aabb::new(9.0, 0.0, 8.0, 8.0), Kind::Walky);
        w.body_mut(spiky).expect("body").tag = Kind::Spiky.tag().with_payload(3);

        w.body_mut(spiky).expect("body").facing = Facing::Left;
        travel(&mut w, spiky, Vec2::new(2.0, 0.0));
        let state = run(&mut w, Handler::EntityContact, vb, spiky);
        assert!(!state.skip);
        assert!(w.entity(victim).expect("entity").is_alive());

        w.body_mut(spiky).expect("body").facing = Facing::Right;
        w.body_mut(spiky).expect("body").last_position.x = 0.0;
        let state = run(&mut w, Handler::EntityContact, vb, spiky);
        assert!(state.skip);
        assert!(!w.entity(victim).expect("entity").is_alive());
    }

    #[test]
    fn sword_reflects_bullets() {
        let mut w = world();
        let sword = w
            .spawn_effect(EffectSpawn::new(Aabb::new(0.0, 0.0, 8.0, 8.0), Kind::SwordAttack.tag(), Animation::Slash))
            .expect("room");
        let bullet = w
            .spawn_effect(
                EffectSpawn::new(Aabb::new(4.0, 2.0, 4.0, 4.0), Kind::GreenWalkyAttack.tag(), Animation::EnemyBullet)
                    .with_velocity(Vec2::new(-20.0, 0.0)),
            )
            .expect("room");

        let state = run(&mut w, Handler::ReflectProjectile, sword, bullet);

        let b = w.body(bullet).expect("bullet");
        assert_eq!(b.velocity.x, 20.0);
        assert_eq!(b.facing, Facing::Right);
        assert_eq!(w.body(sword).expect("sword").tag, Kind::SwordFx.tag());
        assert!(state.skip);
    }

    #[test]
    fn floors_explode_enemy_bullets() {
        let mut w = world();
        let floor = w.add_static(Aabb::new(0.0, 16.0, 64.0, 8.0), Kind::Floor);
        let bullet = w
            .spawn_effect(EffectSpawn::new(
                Aabb::new(4.0, 14.0, 4.0, 4.0),
                Kind::GreenWalkyAttack.tag(),
                Animation::EnemyBullet,
            ))
            .expect("room");

        let state = run(&mut w, Handler::FloorProjectile, floor, bullet);

        assert!(state.skip);
        assert!(w.body(bullet).is_err());
        let burst = w.effects.live_bodies()[0];
        assert_eq!(w.effects.get(burst).expect("burst").animation, Animation::StarExplosion);
        assert_eq!(w.body(burst).expect("burst").bounds(), Aabb::new(4.0, 14.0, 4.0, 4.0));
    }

    #[test]
    fn guard_blocks_frontal_attacks() {
        let mut w = world();
        let (walky, wb) = entity(&mut w, Aabb::new(0.0, 0.0, 8.0, 8.0), Kind::GreenWalky);
        w.entity_mut(walky).expect("entity").guard = Some(Guard { defend_animation: 1 });
        let sword = w
            .spawn_effect(EffectSpawn::new(Aabb::new(9.0, 0.0, 8.0, 8.0), Kind::SwordAttack.tag(), Animation::Slash))
            .expect("room");
        travel(&mut w, sword, Vec2::new(-3.0, 0.0));

        let state = run(&mut w, Handler::AttackEntity, sword, wb);

        let e = w.entity(walky).expect("entity");
        assert!(e.is_alive());
        assert_eq!(e.animation, 1);
        assert_eq!(w.body(wb).expect("body").facing, Facing::Right);
        assert_eq!(w.body(sword).expect("sword").tag, Kind::SwordFx.tag());
        assert!(state.skip);
    }

    #[test]
    fn guard_is_open_from_behind() {
        let mut w = world();
        let (walky, wb) = entity(&mut w, Aabb::new(16.0, 0.0, 8.0, 8.0), Kind::GreenWalky);
        {
            let e = w.entity_mut(walky).expect("entity");
            e.guard = Some(Guard { defend_animation: 1 });
            e.animation = 1;
        }
        let sword = w
            .spawn_effect(EffectSpawn::new(Aabb::new(7.0, 0.0, 8.0, 8.0), Kind::SwordAttack.tag(), Animation::Slash))
            .expect("room");
        travel(&mut w, sword, Vec2::new(3.0, 0.0));

        run(&mut w, Handler::AttackEntity, sword, wb);

        assert!(!w.entity(walky).expect("entity").is_alive());
    }

    #[test]
    fn teleport_bullet_marks_the_struck_side_of_a_wall() {
        let mut w = world();
        let wall = w.add_static(Aabb::new(40.0, 0.0, 16.0, 64.0), Kind::Floor);

        let bullet = w
            .spawn_effect(EffectSpawn::teleport_bullet(Vec2::new(25.0, 7.0), Facing::Right))
            .expect("room");
        travel(&mut w, bullet, Vec2::new(6.0, 0.0));
        let state = run(&mut w, Handler::TeleportFloor, bullet, wall);

        assert!(state.skip);
        assert!(w.body(bullet).is_err());
        assert_eq!(w.teleport.side, TargetSide::Right);
        let marker = w.teleport.marker.expect("marker spawned");
        // Half a bullet away from the face it hit.
        assert_eq!(w.body(marker).expect("marker").center(), Vec2::new(36.0, 11.0));

        let bullet = w
            .spawn_effect(EffectSpawn::teleport_bullet(Vec2::new(61.0, 7.0), Facing::Left))
            .expect("room");
        travel(&mut w, bullet, Vec2::new(-3.0, 0.0));
        run(&mut w, Handler::TeleportFloor, bullet, wall);

        assert_eq!(w.teleport.side, TargetSide::Left);
        let marker = w.teleport.marker.expect("marker spawned");
        assert_eq!(w.body(marker).expect("marker").center(), Vec2::new(60.0, 11.0));
        assert_eq!(w.effects.len(), 1);
    }

    #[test]
    fn offscreen_targets_only_consume_the_bullet() {
        let mut w = world();
        let (_, target) = entity(&mut w, Aabb::new(400.0, 0.0, 8.0, 8.0), Kind::Walky);
        let bullet = w
            .spawn_effect(EffectSpawn::new(
                Aabb::new(396.0, 0.0, 16.0, 4.0),
                Kind::TeleportBullet.tag(),
                Animation::Bullet,
            ))
            .expect("room");

        let state = run(&mut w, Handler::TeleportEntity, bullet, target);

        assert!(state.skip);
        assert!(w.effects.is_empty());
        assert!(!w.teleport.is_set());
    }

    #[test]
    fn dummies_only_hold_players_from_below() {
        let mut w = world();
        let (_, dummy) = entity(&mut w, Aabb::new(0.0, 16.0, 8.0, 8.0), Kind::DummyGunny);
        let (_, player) = entity(&mut w, Aabb::new(0.0, 4.0, 8.0, 8.0), Kind::Swordy);
        w.body_mut(player).expect("body").velocity.y = 90.0;
        travel(&mut w, player, Vec2::new(0.0, 6.0));

        run(&mut w, Handler::PlayerDummy, dummy, player);

        let (p, d) = (w.body(player).expect("player"), w.body(dummy).expect("dummy"));
        assert_eq!(p.velocity.y, 0.0);
        assert_eq!(p.bottom(), d.position.y);
    }

    #[test]
    fn event_areas_record_their_triggers() {
        let mut w = world();
        let spawn = Vec2::new(8.0, 8.0);
        let (_, zone) = w
            .add_event(Aabb::new(0.0, 0.0, 16.0, 16.0), EventKind::Loadzone(Transition { zone: 1, spawn }))
            .expect("room");
        let (_, save) = w
            .add_event(Aabb::new(0.0, 0.0, 16.0, 16.0), EventKind::Checkpoint(Transition { zone: 4, spawn }))
            .expect("room");
        let (_, pad) = w
            .add_event(Aabb::new(0.0, 0.0, 16.0, 16.0), EventKind::PressurePad { locks: 0b101 })
            .expect("room");
        let (_, swordy) = entity(&mut w, Aabb::new(2.0, 2.0, 8.0, 8.0), Kind::Swordy);
        let (_, dummy) = entity(&mut w, Aabb::new(4.0, 2.0, 8.0, 8.0), Kind::DummyGunny);
        let (_, gunny) = entity(&mut w, Aabb::new(4.0, 2.0, 8.0, 8.0), Kind::Gunny);
        let (_, walky) = entity(&mut w, Aabb::new(4.0, 2.0, 8.0, 8.0), Kind::Walky);

        run(&mut w, Handler::Loadzone, zone, swordy);
        assert_eq!(w.triggers.pending_transition(), None);
        // A dummy standing in for its player does not complete the pair.
        run(&mut w, Handler::Loadzone, zone, dummy);
        assert_eq!(w.triggers.pending_transition(), None);
        run(&mut w, Handler::Loadzone, zone, gunny);
        assert_eq!(w.triggers.pending_transition(), Some(1));

        run(&mut w, Handler::Checkpoint, save, swordy);
        assert_eq!(w.checkpoint, Some(Transition { zone: 4, spawn }));
        assert_eq!(w.body(save).expect("checkpoint").tag, Kind::Fx.tag());
        assert_eq!(w.effects.len(), 1);

        run(&mut w, Handler::PressurePad, walky, pad);
        assert_eq!(w.triggers.pressed_locks(), 0b101);
    }

    #[test]
    fn sight_boxes_trigger_their_owner() {
        let mut w = world();
        let (watcher, _) = entity(&mut w, Aabb::new(0.0, 0.0, 8.0, 8.0), Kind::GreenWalky);
        let view = w
            .add_sight(watcher, Vec2::new(8.0, 0.0), Vec2::new(32.0, 8.0))
            .expect("entity exists");
        let (_, prey) = entity(&mut w, Aabb::new(20.0, 0.0, 8.0, 8.0), Kind::Swordy);

        run(&mut w, Handler::GuardView, view, prey);

        assert!(w.entity(watcher).expect("entity").flags.has(EntityFlag::AttackTriggered));
    }
}
