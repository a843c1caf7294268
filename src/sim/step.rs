/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Jump (edge-triggered, before integration)
///   2. Player integration (input → velocity → position, ladders, platforms, floor)
///   3. Fire (edge-triggered, spawns from the integrated position)
///   4. Enemy behavior (patrol / chase / complex)
///   5. Projectiles vs enemies
///   6. Enemies vs player (may end the session)
///   7. Item pickup
///   8. Map transitions, then boundary clamps
///   9. Timer updates
///
/// Nothing runs unless the phase is `Playing` and the session is not paused.
/// `now_ms` is session time; only the invincibility window reads it.

use tracing::{debug, info, warn};

use crate::domain::combat;
use crate::domain::entity::{FrameInput, ItemKind};
use crate::domain::physics;
use crate::domain::ai;
use crate::domain::transition;
use super::event::GameEvent;
use super::world::{Phase, WorldState};

const MAP_BANNER_TICKS: u32 = 120;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput, now_ms: u64) -> Vec<GameEvent> {
    if world.phase != Phase::Playing || world.paused { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    resolve_jump(world, input.jump, &mut events);
    resolve_player_motion(world, &input);
    resolve_fire(world, input.fire, &mut events);
    resolve_enemy_behavior(world);
    resolve_projectiles(world, &mut events);
    if resolve_enemy_contact(world, now_ms, &mut events) { return events; }
    resolve_items(world, &mut events);
    resolve_transitions(world, &mut events);
    physics::clamp_x(&mut world.player);
    resolve_timers(world);

    events
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_jump(world: &mut WorldState, jump: bool, events: &mut Vec<GameEvent>) {
    if jump && physics::try_jump(&mut world.player, world.tuning.jump_force) {
        events.push(GameEvent::Jumped);
    }
}

fn resolve_player_motion(world: &mut WorldState, input: &FrameInput) {
    let motion = world.tuning.motion();
    let platforms = &world.maps[world.current_map].platforms;
    physics::integrate(&mut world.player, input, platforms, motion);
}

fn resolve_fire(world: &mut WorldState, fire: bool, events: &mut Vec<GameEvent>) {
    if !fire { return; }
    let shot = combat::spawn_projectile(&world.player, world.tuning.projectile_speed);
    debug!(x = shot.x, y = shot.y, vx = shot.vx, "projectile fired");
    world.projectiles.push(shot);
    events.push(GameEvent::ProjectileFired);
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

fn resolve_enemy_behavior(world: &mut WorldState) {
    let (px, py) = (world.player.x, world.player.y);
    for enemy in world.maps[world.current_map].enemies.iter_mut() {
        ai::update_enemy(enemy, px, py);
    }
}

// ══════════════════════════════════════════════════════════════
// Combat
// ══════════════════════════════════════════════════════════════

fn resolve_projectiles(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.projectiles.is_empty() { return; }

    let enemies = &mut world.maps[world.current_map].enemies;
    let hits = combat::step_projectiles(&mut world.projectiles, enemies, world.tuning.projectile_damage);

    for hit in hits {
        events.push(GameEvent::EnemyHit { x: hit.x, y: hit.y });
        if hit.killed {
            world.score += hit.points;
            debug!(enemy = hit.enemy, points = hit.points, score = world.score, "enemy killed");
            events.push(GameEvent::EnemyKilled { x: hit.x, y: hit.y, points: hit.points });
        } else {
            debug!(enemy = hit.enemy, damage = hit.damage, "enemy hit");
        }
    }
}

/// Returns true when a hit was fatal and the session is over.
fn resolve_enemy_contact(world: &mut WorldState, now_ms: u64, events: &mut Vec<GameEvent>) -> bool {
    let enemies = &world.maps[world.current_map].enemies;
    let contacts = combat::resolve_enemy_contact(
        &mut world.player,
        enemies,
        now_ms,
        &mut world.last_damage_ms,
        world.tuning.invincibility_ms,
        world.tuning.knockback,
    );
    if contacts.is_empty() { return false; }

    for contact in contacts {
        debug!(enemy = contact.enemy, damage = contact.damage, "player hurt");
        events.push(GameEvent::PlayerHurt { damage: contact.damage });
    }

    if world.is_alive() { return false; }

    info!(score = world.score, map = world.current_map().id, "player killed");
    events.push(GameEvent::PlayerKilled);
    world.phase = Phase::GameOver;
    world.projectiles.clear();
    world.set_message("GAME OVER", 0);
    true
}

fn resolve_items(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let items = &mut world.maps[world.current_map].items;
    for pickup in combat::collect_items(&world.player, items) {
        world.score += combat::pickup_score(&pickup);
        debug!(kind = ?pickup.kind, x = pickup.x, y = pickup.y, score = world.score, "item collected");
        match pickup.kind {
            ItemKind::Coin => events.push(GameEvent::CoinCollected { value: pickup.value }),
            ItemKind::Other => events.push(GameEvent::ItemCollected),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Map transitions
// ══════════════════════════════════════════════════════════════

fn resolve_transitions(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let conns = world.current_map().connections;
    let p = &world.player;

    if let Some(t) = transition::check(p.x, p.y, p.on_ladder, &conns) {
        match world.map_index(t.target) {
            Some(index) => {
                let from = world.current_map().id;
                world.enter_map(index);
                world.player.x = t.x;
                world.player.y = t.y;
                let name = world.current_map().name.clone();
                info!(from, to = t.target, edge = ?t.edge, map = %name, "map changed");
                world.set_message(&name, MAP_BANNER_TICKS);
                events.push(GameEvent::MapChanged { from, to: t.target });
            }
            None => warn!(target_id = t.target, "connection to unknown map ignored"),
        }
    }

    let conns = world.current_map().connections;
    world.player.y = transition::clamp_y(world.player.y, &conns);
}

// ══════════════════════════════════════════════════════════════
// Timers
// ══════════════════════════════════════════════════════════════

fn resolve_timers(world: &mut WorldState) {
    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 { world.message.clear(); }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use crate::domain::entity::{Enemy, EnemyKind, Item, MapId, Platform, PlatformKind};
    use crate::domain::map::{Edge, Map};

    fn ground_map(id: MapId) -> Map {
        let mut m = Map::new(id, &format!("Map {id}"));
        m.platforms.push(Platform::new(0.0, 560.0, 800.0, 40.0, PlatformKind::Ground));
        m
    }

    fn playing(maps: Vec<Map>) -> WorldState {
        let mut w = WorldState::new(maps, Tuning::default());
        w.start();
        w
    }

    fn held_right() -> FrameInput {
        FrameInput { right: true, ..FrameInput::default() }
    }

    fn held_left() -> FrameInput {
        FrameInput { left: true, ..FrameInput::default() }
    }

    // ── phase gating ──

    #[test]
    fn title_and_pause_do_not_tick() {
        let mut w = WorldState::new(vec![ground_map(0)], Tuning::default());
        assert!(step(&mut w, held_right(), 0).is_empty());
        assert_eq!(w.tick, 0);

        w.start();
        w.paused = true;
        let x = w.player.x;
        step(&mut w, held_right(), 16);
        assert_eq!(w.tick, 0);
        assert_eq!(w.player.x, x);
    }

    #[test]
    fn player_rests_on_ground() {
        let mut w = playing(vec![ground_map(0)]);
        for t in 0..60 {
            step(&mut w, FrameInput::default(), t * 16);
        }
        assert_eq!(w.player.y, 520.0);
        assert!(!w.player.jumping);
    }

    // ── jump / fire ──

    #[test]
    fn jump_is_edge_triggered() {
        let mut w = playing(vec![ground_map(0)]);
        w.player.y = 520.0;
        let jump = FrameInput { jump: true, ..FrameInput::default() };
        assert!(step(&mut w, jump, 0).contains(&GameEvent::Jumped));
        assert!(w.player.y < 520.0);
        // Still airborne: a second press does nothing
        assert!(!step(&mut w, jump, 16).contains(&GameEvent::Jumped));
    }

    #[test]
    fn fire_spawns_projectile() {
        let mut w = playing(vec![ground_map(0)]);
        let fire = FrameInput { fire: true, ..FrameInput::default() };
        let events = step(&mut w, fire, 0);
        assert!(events.contains(&GameEvent::ProjectileFired));
        assert_eq!(w.projectiles.len(), 1);
        assert!(w.projectiles[0].vx > 0.0);
    }

    #[test]
    fn kill_awards_points() {
        let mut m = ground_map(0);
        let mut e = Enemy::new(EnemyKind::Basic, 105.0, 530.0, 30.0, 30.0, 2.0, 100.0);
        e.health = 10;
        m.enemies.push(e);
        let mut w = playing(vec![m]);
        w.player.y = 520.0;

        let fire = FrameInput { fire: true, ..FrameInput::default() };
        let events = step(&mut w, fire, 0);
        assert!(events.iter().any(|e| matches!(e, GameEvent::EnemyKilled { points: 100, .. })));
        assert_eq!(w.score, 100);
        assert!(!w.current_map().enemies[0].alive);
        assert!(w.projectiles.is_empty());
    }

    // ── contact ──

    #[test]
    fn contact_hurts_and_pushes_back() {
        let mut m = ground_map(0);
        m.enemies.push(Enemy::new(EnemyKind::Basic, 70.0, 530.0, 30.0, 30.0, 2.0, 100.0));
        let mut w = playing(vec![m]);
        w.player.y = 520.0;

        let events = step(&mut w, FrameInput::default(), 5_000);
        assert!(events.contains(&GameEvent::PlayerHurt { damage: 10 }));
        assert_eq!(w.player.health, 90);
        assert_eq!(w.player.x, 0.0);
        assert_eq!(w.last_damage_ms, Some(5_000));
    }

    #[test]
    fn knockback_into_second_enemy_hurts_twice() {
        let mut m = ground_map(0);
        m.enemies.push(Enemy::new(EnemyKind::Basic, 320.0, 530.0, 30.0, 30.0, 0.0, 100.0));
        m.enemies.push(Enemy::new(EnemyKind::Basic, 255.0, 530.0, 30.0, 30.0, 0.0, 100.0));
        let mut w = playing(vec![m]);
        w.player.x = 300.0;
        w.player.y = 520.0;

        let events = step(&mut w, FrameInput::default(), 5_000);
        let hurts = events.iter()
            .filter(|e| matches!(e, GameEvent::PlayerHurt { damage: 10 }))
            .count();
        assert_eq!(hurts, 2);
        assert_eq!(w.player.health, 80);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn fatal_contact_ends_session() {
        let mut m = ground_map(0);
        m.enemies.push(Enemy::new(EnemyKind::Boss, 40.0, 480.0, 60.0, 60.0, 2.0, 100.0));
        let mut w = playing(vec![m]);
        w.player.y = 520.0;
        w.player.health = 5;

        let events = step(&mut w, FrameInput::default(), 0);
        assert!(events.contains(&GameEvent::PlayerKilled));
        assert_eq!(w.phase, Phase::GameOver);

        let tick = w.tick;
        assert!(step(&mut w, held_right(), 2_000).is_empty());
        assert_eq!(w.tick, tick);

        w.restart();
        assert_eq!(w.phase, Phase::Playing);
        assert!(w.is_alive());
    }

    // ── items ──

    #[test]
    fn coin_scores_once() {
        let mut m = ground_map(0);
        m.items.push(Item::new(ItemKind::Coin, 60.0, 530.0, 10));
        m.items.push(Item::new(ItemKind::Other, 70.0, 530.0, 99));
        let mut w = playing(vec![m]);
        w.player.y = 520.0;

        let events = step(&mut w, FrameInput::default(), 0);
        assert!(events.contains(&GameEvent::CoinCollected { value: 10 }));
        assert!(events.contains(&GameEvent::ItemCollected));
        assert_eq!(w.score, 10);

        step(&mut w, FrameInput::default(), 16);
        assert_eq!(w.score, 10);
    }

    // ── transitions ──

    fn three_maps() -> Vec<Map> {
        let mut a = ground_map(0);
        a.connections.set(Edge::Right, Some(2));
        vec![a, ground_map(1), ground_map(2)]
    }

    #[test]
    fn right_edge_switches_map() {
        let mut w = playing(three_maps());
        w.player.x = 760.0;
        w.player.y = 520.0;
        let events = step(&mut w, held_right(), 0);
        assert_eq!(w.current_map, 2);
        assert_eq!(w.player.x, 50.0);
        assert!(events.contains(&GameEvent::MapChanged { from: 0, to: 2 }));
    }

    #[test]
    fn closed_edge_clamps() {
        let mut w = playing(vec![ground_map(0)]);
        w.player.x = 760.0;
        w.player.y = 520.0;
        step(&mut w, held_right(), 0);
        assert_eq!(w.current_map, 0);
        assert_eq!(w.player.x, 760.0);

        w.player.x = 2.0;
        step(&mut w, held_left(), 16);
        assert_eq!(w.player.x, 0.0);
    }

    #[test]
    fn left_edge_enters_from_right() {
        let mut maps = three_maps();
        maps[2].connections.set(Edge::Left, Some(0));
        let mut w = playing(maps);
        w.enter_map(2);
        w.player.x = 2.0;
        w.player.y = 520.0;
        step(&mut w, held_left(), 0);
        assert_eq!(w.current_map, 0);
        assert_eq!(w.player.x, 710.0);
    }

    #[test]
    fn ladder_climbs_into_map_above() {
        let mut low = ground_map(0);
        low.platforms.push(Platform::new(300.0, -100.0, 40.0, 660.0, PlatformKind::Ladder));
        low.connections.set(Edge::Top, Some(1));
        let mut w = playing(vec![low, ground_map(1)]);
        w.player.x = 300.0;
        w.player.y = -38.0;

        let up = FrameInput { up: true, ..FrameInput::default() };
        let events = step(&mut w, up, 0);
        assert!(events.contains(&GameEvent::MapChanged { from: 0, to: 1 }));
        assert_eq!(w.current_map, 1);
        assert_eq!(w.player.y, 520.0);
    }

    #[test]
    fn ladder_climbs_down_into_map_below() {
        let mut high = ground_map(0);
        high.platforms.push(Platform::new(300.0, 400.0, 40.0, 300.0, PlatformKind::Ladder));
        high.connections.set(Edge::Bottom, Some(1));
        let mut w = playing(vec![high, ground_map(1)]);
        w.player.x = 300.0;
        w.player.y = 598.0;

        let down = FrameInput { down: true, ..FrameInput::default() };
        step(&mut w, down, 0);
        assert_eq!(w.current_map, 1);
        assert_eq!(w.player.y, 0.0);
    }

    #[test]
    fn ladder_without_exit_stops_at_top() {
        let mut m = ground_map(0);
        m.platforms.push(Platform::new(300.0, -100.0, 40.0, 660.0, PlatformKind::Ladder));
        let mut w = playing(vec![m]);
        w.player.x = 300.0;
        w.player.y = 2.0;
        let up = FrameInput { up: true, ..FrameInput::default() };
        step(&mut w, up, 0);
        assert_eq!(w.player.y, 0.0);
        assert_eq!(w.current_map, 0);
    }

    #[test]
    fn transition_discards_projectiles_and_resets_revisited_map() {
        let mut maps = three_maps();
        maps[0].enemies.push(Enemy::new(EnemyKind::Basic, 300.0, 530.0, 30.0, 30.0, 2.0, 100.0));
        maps[2].connections.set(Edge::Left, Some(0));
        let mut w = playing(maps);

        // Let the patroller wander, then leave right with a shot in flight
        for t in 0..10 {
            step(&mut w, FrameInput::default(), t * 16);
        }
        assert_ne!(w.maps[0].enemies[0].x, 300.0);
        w.projectiles.push(crate::domain::entity::Projectile { x: 400.0, y: 100.0, vx: 10.0, vy: 0.0 });
        w.player.x = 760.0;
        step(&mut w, held_right(), 1_000);
        assert_eq!(w.current_map, 2);
        assert!(w.projectiles.is_empty());

        // Come back
        w.player.x = 2.0;
        step(&mut w, held_left(), 1_016);
        assert_eq!(w.current_map, 0);
        assert_eq!(w.maps[0].enemies[0].x, 300.0);
    }
}
