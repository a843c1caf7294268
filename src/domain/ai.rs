/// Enemy AI: one movement rule per enemy per tick.
///
/// The rule family is fixed at build time (`Enemy::movement`):
///   1. **Patrol**:  bounce between `initial_x` and `initial_x + patrol_distance`.
///   2. **Chase**:   glide straight at the player while inside the detection
///      ring, patrol otherwise.
///   3. **Complex**: (boss) patrol when far, approach on the ground when near,
///      hop at the player when close and the cooldown has run out.
///
/// Distances are measured between top-left corners. No randomness: the
/// outcome depends only on the player position and the enemy's own timers.

use super::entity::{Enemy, Facing, MoveKind};
use super::geom::distance;

pub const CHASE_RANGE: f32 = 250.0;
/// Closer than this the chaser stops homing in (avoids jitter on top of the player).
pub const MIN_CHASE_DISTANCE: f32 = 5.0;

pub const BOSS_RANGE: f32 = 300.0;
pub const BOSS_JUMP_DISTANCE: f32 = 150.0;
pub const BOSS_JUMP_COOLDOWN: u32 = 100;
pub const BOSS_JUMP_VELOCITY: f32 = -10.0;
pub const BOSS_GRAVITY: f32 = 0.5;
pub const BOSS_APPROACH_FACTOR: f32 = 0.7;
pub const BOSS_DEAD_ZONE: f32 = 10.0;

/// The rule that moved an enemy this tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Behavior {
    Patrol,
    Chase,
    BossJump,
    BossApproach,
}

/// Run the enemy's movement rule. Dead enemies do not move.
pub fn update_enemy(enemy: &mut Enemy, px: f32, py: f32) -> Option<Behavior> {
    if !enemy.alive { return None; }
    let behavior = match enemy.movement {
        MoveKind::Patrol => {
            patrol(enemy);
            Behavior::Patrol
        }
        MoveKind::Chase => chase(enemy, px, py),
        MoveKind::Complex => complex(enemy, px, py),
    };
    Some(behavior)
}

// ── Patrol ──

pub fn patrol(enemy: &mut Enemy) {
    enemy.chasing = false;
    enemy.x += enemy.speed * enemy.direction;

    let far_bound = enemy.initial_x + enemy.patrol_distance;
    if enemy.x >= far_bound {
        enemy.direction = -1.0;
    } else if enemy.x <= enemy.initial_x {
        enemy.direction = 1.0;
    }
    enemy.facing = if enemy.direction < 0.0 { Facing::Left } else { Facing::Right };
}

// ── Chase ──

pub fn chase(enemy: &mut Enemy, px: f32, py: f32) -> Behavior {
    let dx = px - enemy.x;
    let dy = py - enemy.y;
    let dist = distance(enemy.x, enemy.y, px, py);

    if dist > MIN_CHASE_DISTANCE && dist < CHASE_RANGE {
        enemy.x += dx / dist * enemy.speed;
        enemy.y += dy / dist * enemy.speed;
        enemy.chasing = true;
        if let Some(f) = Facing::toward(dx) {
            enemy.facing = f;
        }
        Behavior::Chase
    } else {
        patrol(enemy);
        Behavior::Patrol
    }
}

// ── Complex (boss) ──

pub fn complex(enemy: &mut Enemy, px: f32, py: f32) -> Behavior {
    enemy.jump.cooldown = enemy.jump.cooldown.saturating_add(1);

    // Mid-air: finish the arc before anything else
    if enemy.jump.airborne {
        jump_arc(enemy);
        return Behavior::BossJump;
    }

    let dx = px - enemy.x;
    let dist = distance(enemy.x, enemy.y, px, py);

    if dist >= BOSS_RANGE {
        patrol(enemy);
        return Behavior::Patrol;
    }

    enemy.chasing = true;
    if let Some(f) = Facing::toward(dx) {
        enemy.facing = f;
    }

    if dist < BOSS_JUMP_DISTANCE && enemy.jump.cooldown > BOSS_JUMP_COOLDOWN {
        // Armed this tick, moves from the next one
        enemy.jump.airborne = true;
        enemy.jump.velocity_y = BOSS_JUMP_VELOCITY;
        enemy.jump.start_y = enemy.y;
        enemy.jump.cooldown = 0;
        return Behavior::BossJump;
    }

    if dx.abs() > BOSS_DEAD_ZONE {
        enemy.x += dx.signum() * enemy.speed * BOSS_APPROACH_FACTOR;
    }
    Behavior::BossApproach
}

fn jump_arc(enemy: &mut Enemy) {
    enemy.y += enemy.jump.velocity_y;
    enemy.jump.velocity_y += BOSS_GRAVITY;

    if enemy.y >= enemy.jump.start_y {
        enemy.y = enemy.jump.start_y;
        enemy.jump.velocity_y = 0.0;
        enemy.jump.airborne = false;
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::EnemyKind;

    fn patroller() -> Enemy {
        Enemy::new(EnemyKind::Basic, 100.0, 530.0, 30.0, 30.0, 2.0, 150.0)
    }

    fn chaser(x: f32, y: f32) -> Enemy {
        Enemy::new(EnemyKind::Armored, x, y, 30.0, 30.0, 2.0, 100.0)
    }

    fn boss(x: f32, y: f32) -> Enemy {
        Enemy::new(EnemyKind::Boss, x, y, 60.0, 60.0, 2.0, 200.0)
    }

    // ── patrol ──

    #[test]
    fn patrol_reverses_at_far_bound() {
        let mut e = patroller();
        for _ in 0..75 { patrol(&mut e); }
        assert_eq!(e.x, 250.0);
        assert_eq!(e.direction, -1.0);
        assert_eq!(e.facing, Facing::Left);

        patrol(&mut e);
        assert_eq!(e.x, 248.0);
    }

    #[test]
    fn patrol_reverses_at_home_bound() {
        let mut e = patroller();
        for _ in 0..150 { patrol(&mut e); }
        assert_eq!(e.x, 100.0);
        assert_eq!(e.direction, 1.0);
        assert_eq!(e.facing, Facing::Right);
    }

    #[test]
    fn patrol_has_no_drift_over_cycles() {
        let mut e = patroller();
        for _ in 0..(150 * 4) { patrol(&mut e); }
        assert_eq!(e.x, 100.0);
        assert_eq!(e.direction, 1.0);
        // Never leaves the band
        let mut e = patroller();
        for _ in 0..500 {
            patrol(&mut e);
            assert!(e.x >= 100.0 && e.x <= 250.0, "x = {}", e.x);
        }
    }

    // ── chase ──

    #[test]
    fn chase_boundary_is_strict() {
        let mut at_edge = chaser(100.0, 100.0);
        assert_eq!(chase(&mut at_edge, 350.0, 100.0), Behavior::Patrol);
        assert!(!at_edge.chasing);

        let mut inside = chaser(100.0, 100.0);
        assert_eq!(chase(&mut inside, 349.0, 100.0), Behavior::Chase);
        assert!(inside.chasing);
        assert_eq!(inside.x, 102.0);
    }

    #[test]
    fn chase_moves_along_normalized_vector() {
        // 3-4-5 triangle scaled to distance 100
        let mut e = chaser(0.0, 0.0);
        e.speed = 5.0;
        chase(&mut e, 60.0, 80.0);
        assert!((e.x - 3.0).abs() < 1e-4);
        assert!((e.y - 4.0).abs() < 1e-4);
        assert_eq!(e.facing, Facing::Right);
    }

    #[test]
    fn chase_faces_player_on_left() {
        let mut e = chaser(300.0, 500.0);
        chase(&mut e, 200.0, 500.0);
        assert_eq!(e.facing, Facing::Left);
        assert_eq!(e.x, 298.0);
    }

    #[test]
    fn chase_too_close_falls_back_to_patrol() {
        let mut e = chaser(100.0, 100.0);
        assert_eq!(chase(&mut e, 102.0, 101.0), Behavior::Patrol);
        assert!(!e.chasing);
        assert_eq!(e.x, 102.0); // patrol step to the right
    }

    // ── complex ──

    #[test]
    fn boss_patrols_when_far() {
        let mut e = boss(100.0, 500.0);
        assert_eq!(complex(&mut e, 400.0, 500.0), Behavior::Patrol);
        assert!(!e.chasing);
        assert_eq!(e.jump.cooldown, 1);
    }

    #[test]
    fn boss_approaches_at_reduced_speed() {
        let mut e = boss(100.0, 500.0);
        assert_eq!(complex(&mut e, 300.0, 500.0), Behavior::BossApproach);
        assert!(e.chasing);
        assert!((e.x - 101.4).abs() < 1e-4);
    }

    #[test]
    fn boss_holds_inside_dead_zone() {
        let mut e = boss(100.0, 500.0);
        assert_eq!(complex(&mut e, 108.0, 500.0), Behavior::BossApproach);
        assert_eq!(e.x, 100.0);
    }

    #[test]
    fn boss_jump_waits_for_cooldown() {
        let mut e = boss(100.0, 500.0);
        // Ticks 1..=100 only approach
        for _ in 0..100 {
            let px = e.x + 50.0;
            assert_eq!(complex(&mut e, px, 500.0), Behavior::BossApproach);
        }
        assert_eq!(e.jump.cooldown, 100);
        // Tick 101: cooldown exceeds 100 → jump armed
        let px = e.x + 50.0;
        assert_eq!(complex(&mut e, px, 500.0), Behavior::BossJump);
        assert!(e.is_airborne());
        assert_eq!(e.jump.cooldown, 0);
        assert_eq!(e.y, 500.0);
    }

    #[test]
    fn boss_jump_arc_returns_to_ground() {
        let mut e = boss(100.0, 500.0);
        e.jump.cooldown = BOSS_JUMP_COOLDOWN;
        assert_eq!(complex(&mut e, 150.0, 500.0), Behavior::BossJump);

        let mut peak = e.y;
        let mut ticks = 0;
        while e.is_airborne() {
            let x_before = e.x;
            // Player far away: the arc still finishes, no patrol mid-air
            assert_eq!(complex(&mut e, 790.0, 500.0), Behavior::BossJump);
            assert_eq!(e.x, x_before);
            peak = peak.min(e.y);
            ticks += 1;
            assert!(ticks < 100, "arc never landed");
        }
        assert_eq!(ticks, 41);
        assert_eq!(e.y, 500.0);
        assert!(peak < 400.0);
    }

    #[test]
    fn behavior_is_deterministic() {
        let mut a = boss(200.0, 480.0);
        let mut b = a.clone();
        let path = [(260.0, 480.0), (250.0, 470.0), (600.0, 480.0), (210.0, 480.0)];
        for _ in 0..60 {
            for &(px, py) in &path {
                assert_eq!(update_enemy(&mut a, px, py), update_enemy(&mut b, px, py));
                assert_eq!((a.x, a.y), (b.x, b.y));
            }
        }
    }

    #[test]
    fn dead_enemies_stay_put() {
        let mut e = chaser(100.0, 100.0);
        e.alive = false;
        assert_eq!(update_enemy(&mut e, 150.0, 100.0), None);
        assert_eq!(e.x, 100.0);
    }
}
