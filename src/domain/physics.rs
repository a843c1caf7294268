/// Player physics: one integration step per tick.
///
/// ## Order
///
///   1. Horizontal velocity from held keys (right wins over left)
///   2. Ladder check against the map's ladder platforms
///   3. Vertical velocity: climb on a ladder, otherwise gravity (no cap)
///   4. Position += velocity
///   5. Platform landing (skipped while climbing)
///   6. Floor clamp when airborne past `FLOOR_Y`
///
/// Horizontal clamping happens later, after map transitions had their look.
///
/// ## Landing
///
/// One-sided: the player lands when their feet reached or passed a platform
/// top while their head is still above it. Hits from below or the sides are
/// not resolved. Every matching platform snaps in turn; the last one wins.

use super::entity::{Facing, FrameInput, Platform, Player, PLAYER_SIZE};
use super::geom::Rect;

pub const LEVEL_WIDTH: f32 = 800.0;
pub const LEVEL_HEIGHT: f32 = 600.0;
pub const FLOOR_Y: f32 = 520.0;
pub const MAX_PLAYER_X: f32 = LEVEL_WIDTH - PLAYER_SIZE;

/// Motion constants for one step.
#[derive(Clone, Copy, Debug)]
pub struct Motion {
    pub gravity: f32,
    pub jump_force: f32,
    pub speed: f32,
}

impl Default for Motion {
    fn default() -> Self {
        Motion { gravity: 0.5, jump_force: -12.0, speed: 5.0 }
    }
}

/// Last writer wins: right overrides left when both are held.
pub fn horizontal_velocity(input: &FrameInput, speed: f32) -> f32 {
    let mut vx = 0.0;
    if input.left { vx = -speed; }
    if input.right { vx = speed; }
    vx
}

/// Is the player's box touching any ladder?
pub fn on_ladder(player: &Player, platforms: &[Platform]) -> bool {
    let hitbox = player.rect();
    platforms.iter()
        .filter(|p| p.is_ladder())
        .any(|p| hitbox.overlaps(&p.rect()))
}

/// Edge-triggered jump. Returns true when the jump took.
pub fn try_jump(player: &mut Player, jump_force: f32) -> bool {
    if player.jumping || player.on_ladder { return false; }
    player.vy = jump_force;
    player.jumping = true;
    true
}

/// Land on platform tops, ladders included. Returns true if any platform
/// caught the player.
///
/// Snapping is deterministic: running this twice in one tick leaves the
/// same position and velocity as running it once.
pub fn resolve_platforms(player: &mut Player, platforms: &[Platform]) -> bool {
    let mut on_platform = false;

    for p in platforms {
        let player_bottom = player.y + PLAYER_SIZE;
        let player_right = player.x + PLAYER_SIZE;

        if player.x < p.x + p.width
            && player_right > p.x
            && player_bottom >= p.y
            && player.y < p.y
        {
            player.y = p.y - PLAYER_SIZE;
            player.vy = 0.0;
            player.jumping = false;
            on_platform = true;
        }
    }

    on_platform
}

/// Advance the player one tick. Returns true if resting on a platform.
pub fn integrate(player: &mut Player, input: &FrameInput, platforms: &[Platform], motion: Motion) -> bool {
    player.vx = horizontal_velocity(input, motion.speed);
    if let Some(f) = Facing::toward(player.vx) {
        player.facing = f;
    }

    player.on_ladder = on_ladder(player, platforms);

    if player.on_ladder {
        player.vy = if input.up {
            -motion.speed
        } else if input.down {
            motion.speed
        } else {
            0.0
        };
        player.jumping = false;
    } else {
        player.vy += motion.gravity;
    }

    player.x += player.vx;
    player.y += player.vy;

    if player.on_ladder {
        return false;
    }

    let on_platform = resolve_platforms(player, platforms);
    if !on_platform && player.y > FLOOR_Y {
        player.y = FLOOR_Y;
        player.vy = 0.0;
        player.jumping = false;
    }
    on_platform
}

/// Keep the player inside the horizontal level bounds.
pub fn clamp_x(player: &mut Player) {
    player.x = player.x.clamp(0.0, MAX_PLAYER_X);
}

/// Is the box fully outside the level rectangle?
pub fn out_of_level(r: &Rect) -> bool {
    r.x < 0.0 || r.x > LEVEL_WIDTH || r.y < 0.0 || r.y > LEVEL_HEIGHT
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::PlatformKind;

    fn ground() -> Platform {
        Platform::new(0.0, 560.0, 800.0, 40.0, PlatformKind::Ground)
    }

    fn ledge(x: f32, y: f32, w: f32) -> Platform {
        Platform::new(x, y, w, 20.0, PlatformKind::Other)
    }

    fn ladder(x: f32, y: f32, h: f32) -> Platform {
        Platform::new(x, y, 40.0, h, PlatformKind::Ladder)
    }

    fn held(left: bool, right: bool, up: bool, down: bool) -> FrameInput {
        FrameInput { left, right, up, down, ..FrameInput::default() }
    }

    // ── horizontal ──

    #[test]
    fn right_overrides_left() {
        assert_eq!(horizontal_velocity(&held(true, true, false, false), 5.0), 5.0);
        assert_eq!(horizontal_velocity(&held(true, false, false, false), 5.0), -5.0);
        assert_eq!(horizontal_velocity(&held(false, false, false, false), 5.0), 0.0);
    }

    #[test]
    fn facing_follows_movement() {
        let mut p = Player::new(100.0, 520.0);
        integrate(&mut p, &held(true, false, false, false), &[ground()], Motion::default());
        assert_eq!(p.facing, Facing::Left);
        assert_eq!(p.x, 95.0);
    }

    // ── gravity / floor ──

    #[test]
    fn gravity_accumulates_without_cap() {
        let mut p = Player::new(100.0, 0.0);
        for _ in 0..10 {
            integrate(&mut p, &FrameInput::default(), &[], Motion::default());
        }
        assert!((p.vy - 5.0).abs() < 1e-4);
    }

    #[test]
    fn floor_clamps_falling_player() {
        let mut p = Player::new(100.0, 519.0);
        p.vy = 8.0;
        p.jumping = true;
        integrate(&mut p, &FrameInput::default(), &[], Motion::default());
        assert_eq!(p.y, FLOOR_Y);
        assert_eq!(p.vy, 0.0);
        assert!(!p.jumping);
    }

    // ── jump ──

    #[test]
    fn jump_sets_force_once() {
        let mut p = Player::new(100.0, 520.0);
        assert!(try_jump(&mut p, -12.0));
        assert_eq!(p.vy, -12.0);
        assert!(p.jumping);
        // Already airborne
        assert!(!try_jump(&mut p, -12.0));
    }

    #[test]
    fn no_jump_from_ladder() {
        let mut p = Player::new(100.0, 400.0);
        p.on_ladder = true;
        assert!(!try_jump(&mut p, -12.0));
        assert_eq!(p.vy, 0.0);
    }

    // ── platforms ──

    #[test]
    fn lands_on_platform_top() {
        let mut p = Player::new(210.0, 365.0);
        p.vy = 6.0;
        p.jumping = true;
        assert!(resolve_platforms(&mut p, &[ledge(200.0, 400.0, 100.0)]));
        assert_eq!(p.y, 360.0);
        assert_eq!(p.vy, 0.0);
        assert!(!p.jumping);
    }

    #[test]
    fn misses_platform_horizontally() {
        // Right edge touches platform left edge: no horizontal overlap
        let mut p = Player::new(160.0, 365.0);
        assert!(!resolve_platforms(&mut p, &[ledge(200.0, 400.0, 100.0)]));
        assert_eq!(p.y, 365.0);
    }

    #[test]
    fn no_landing_from_below() {
        // Head already below the top surface
        let mut p = Player::new(210.0, 405.0);
        p.vy = -10.0;
        assert!(!resolve_platforms(&mut p, &[ledge(200.0, 400.0, 100.0)]));
        assert_eq!(p.y, 405.0);
        assert_eq!(p.vy, -10.0);
    }

    #[test]
    fn platform_pass_is_idempotent() {
        let platforms = [ledge(200.0, 400.0, 100.0), ground()];
        let mut once = Player::new(220.0, 362.5);
        once.vy = 4.0;
        resolve_platforms(&mut once, &platforms);
        let mut twice = once.clone();
        resolve_platforms(&mut twice, &platforms);
        assert_eq!(once.y, twice.y);
        assert_eq!(once.vy, twice.vy);
        assert_eq!(once.jumping, twice.jumping);
    }

    #[test]
    fn overlapping_platforms_last_wins() {
        let mut p = Player::new(210.0, 370.0);
        let platforms = [ledge(200.0, 405.0, 100.0), ledge(200.0, 400.0, 100.0)];
        assert!(resolve_platforms(&mut p, &platforms));
        assert_eq!(p.y, 360.0);
    }

    #[test]
    fn standing_on_ground_is_stable() {
        let mut p = Player::new(100.0, 520.0);
        for _ in 0..30 {
            integrate(&mut p, &FrameInput::default(), &[ground()], Motion::default());
        }
        assert_eq!(p.y, 520.0);
        assert_eq!(p.vy, 0.0);
    }

    // ── ladders ──

    #[test]
    fn ladder_suppresses_gravity() {
        let mut p = Player::new(300.0, 300.0);
        let map = [ladder(300.0, 200.0, 360.0)];
        integrate(&mut p, &FrameInput::default(), &map, Motion::default());
        assert!(p.on_ladder);
        assert_eq!(p.vy, 0.0);
        assert_eq!(p.y, 300.0);
    }

    #[test]
    fn ladder_climbs_both_ways() {
        let map = [ladder(300.0, 200.0, 360.0)];
        let mut p = Player::new(300.0, 300.0);
        integrate(&mut p, &held(false, false, true, false), &map, Motion::default());
        assert_eq!(p.y, 295.0);
        integrate(&mut p, &held(false, false, false, true), &map, Motion::default());
        assert_eq!(p.y, 300.0);
    }

    #[test]
    fn climbing_down_passes_through_platforms() {
        // Ladder runs through a ledge at y=400
        let map = [ledge(280.0, 400.0, 100.0), ladder(300.0, 360.0, 200.0)];
        let mut p = Player::new(300.0, 360.0);
        for _ in 0..4 {
            integrate(&mut p, &held(false, false, false, true), &map, Motion::default());
        }
        assert_eq!(p.y, 380.0);
        assert!(p.on_ladder);
    }

    #[test]
    fn ladder_below_floor_is_reachable() {
        let map = [ladder(300.0, 400.0, 260.0)];
        let mut p = Player::new(300.0, 518.0);
        integrate(&mut p, &held(false, false, false, true), &map, Motion::default());
        assert_eq!(p.y, 523.0);
    }

    #[test]
    fn stands_on_ladder_top() {
        // Feet exactly on the top rung: not touching the ladder, so gravity
        // runs and the landing pass puts the player back on top.
        let map = [ladder(300.0, 360.0, 200.0)];
        let mut p = Player::new(300.0, 320.0);
        let on_platform = integrate(&mut p, &FrameInput::default(), &map, Motion::default());
        assert!(on_platform);
        assert!(!p.on_ladder);
        assert_eq!(p.y, 320.0);
        assert_eq!(p.vy, 0.0);

        for _ in 0..10 {
            integrate(&mut p, &FrameInput::default(), &map, Motion::default());
        }
        assert_eq!(p.y, 320.0);
    }

    #[test]
    fn climbing_out_of_ladder_top_lands_on_it() {
        let map = [ladder(300.0, 360.0, 200.0)];
        let mut p = Player::new(300.0, 330.0);
        integrate(&mut p, &held(false, false, true, false), &map, Motion::default());
        assert_eq!(p.y, 325.0);
        integrate(&mut p, &held(false, false, true, false), &map, Motion::default());
        assert_eq!(p.y, 320.0);
        // Off the ladder now: gravity, then the top catches the player
        integrate(&mut p, &FrameInput::default(), &map, Motion::default());
        assert_eq!(p.y, 320.0);
        assert!(!p.jumping);
    }

    #[test]
    fn clamp_keeps_player_in_level() {
        let mut p = Player::new(-12.0, 520.0);
        clamp_x(&mut p);
        assert_eq!(p.x, 0.0);
        p.x = 790.0;
        clamp_x(&mut p);
        assert_eq!(p.x, MAX_PLAYER_X);
    }
}
