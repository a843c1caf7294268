/// Combat: projectiles vs enemies, enemies vs player, item pickup.
///
/// Pure bookkeeping on the structs handed in. The caller (step) turns the
/// returned outcomes into score changes and events.
///
/// Damage math runs in f64 and floors at the end, so `20 * (1 - 0.3)` is 14
/// and `10 * 1.2` is 12, exactly as the map data reads.

use super::entity::{
    Enemy, EnemyKind, Item, ItemKind, Player, Projectile, PLAYER_SIZE, PROJECTILE_H, PROJECTILE_W,
};
use super::geom::Rect;
use super::physics;

/// Enemy boxes shrink by this much against projectiles.
pub const ENEMY_HIT_INSET: f32 = 2.0;
/// Boss boxes shrink by this much against the player.
pub const BOSS_CONTACT_INSET: f32 = 8.0;
pub const AIRBORNE_BOSS_MULTIPLIER: f64 = 1.5;
pub const CHASE_MULTIPLIER: f64 = 1.2;

/// A projectile connected with an enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
    pub enemy: usize,
    pub x: f32,
    pub y: f32,
    pub damage: i32,
    pub killed: bool,
    pub points: u32,
}

/// An enemy connected with the player.
#[derive(Clone, Debug, PartialEq)]
pub struct Contact {
    pub enemy: usize,
    pub damage: i32,
}

/// An item the player walked over.
#[derive(Clone, Debug, PartialEq)]
pub struct Pickup {
    pub kind: ItemKind,
    pub value: u32,
    pub x: f32,
    pub y: f32,
}

// ── Projectiles ──

/// Spawn a shot from the player's leading edge, flying where they face.
pub fn spawn_projectile(player: &Player, speed: f32) -> Projectile {
    let sign = player.facing.sign();
    let x = if sign > 0.0 { player.x + PLAYER_SIZE } else { player.x - PROJECTILE_W };
    Projectile {
        x,
        y: player.y + PLAYER_SIZE / 2.0 - PROJECTILE_H / 2.0,
        vx: speed * sign,
        vy: 0.0,
    }
}

/// Damage one projectile deals to an enemy of `kind`.
pub fn projectile_damage(base: i32, kind: EnemyKind) -> i32 {
    (base as f64 * (1.0 - kind.damage_reduction())).floor() as i32
}

/// Advance every projectile and resolve hits.
///
/// Each projectile hits at most one enemy per tick (the first in map order)
/// and is consumed by the hit. Misses that leave the level are dropped.
pub fn step_projectiles(projectiles: &mut Vec<Projectile>, enemies: &mut [Enemy], base_damage: i32) -> Vec<Hit> {
    let mut hits = Vec::new();

    projectiles.retain_mut(|p| {
        p.x += p.vx;
        p.y += p.vy;

        let hitbox = p.hitbox();
        let target = enemies.iter().position(|e| {
            e.alive && hitbox.overlaps(&e.rect().inset(ENEMY_HIT_INSET))
        });

        if let Some(i) = target {
            let e = &mut enemies[i];
            let damage = projectile_damage(base_damage, e.kind);
            e.health -= damage;
            let killed = e.health <= 0;
            if killed {
                e.alive = false;
            }
            hits.push(Hit { enemy: i, x: p.x, y: p.y, damage, killed, points: e.points });
            return false;
        }

        !physics::out_of_level(&p.rect())
    });

    hits
}

// ── Enemy contact ──

/// Contact damage after the airborne-boss and chasing multipliers.
pub fn contact_damage(enemy: &Enemy) -> i32 {
    let mut damage = enemy.damage;
    if enemy.kind == EnemyKind::Boss && enemy.is_airborne() {
        damage *= AIRBORNE_BOSS_MULTIPLIER;
    }
    if enemy.chasing {
        damage *= CHASE_MULTIPLIER;
    }
    damage.floor() as i32
}

fn contact_box(enemy: &Enemy) -> Rect {
    match enemy.kind {
        EnemyKind::Boss => enemy.rect().inset(BOSS_CONTACT_INSET),
        _ => enemy.rect(),
    }
}

/// Apply every enemy hit to the player for this tick.
///
/// Skipped while `now_ms` is inside the invincibility window that started at
/// `last_damage_ms`; the window is checked once, before any enemy. Each
/// overlapping enemy knocks the player `knockback` px away from itself, and
/// later enemies are tested against the knocked-back position.
pub fn resolve_enemy_contact(
    player: &mut Player,
    enemies: &[Enemy],
    now_ms: u64,
    last_damage_ms: &mut Option<u64>,
    window_ms: u64,
    knockback: f32,
) -> Vec<Contact> {
    if let Some(last) = *last_damage_ms {
        if now_ms.saturating_sub(last) < window_ms {
            return vec![];
        }
    }

    let mut contacts = Vec::new();
    for (idx, enemy) in enemies.iter().enumerate().filter(|(_, e)| e.alive) {
        let hitbox = player.rect();
        if !hitbox.overlaps(&contact_box(enemy)) {
            continue;
        }

        let damage = contact_damage(enemy);
        player.health -= damage;
        *last_damage_ms = Some(now_ms);

        let away = if hitbox.center_x() < enemy.rect().center_x() { -1.0 } else { 1.0 };
        player.x += away * knockback;
        physics::clamp_x(player);

        contacts.push(Contact { enemy: idx, damage });
    }
    contacts
}

// ── Items ──

/// Mark every touched item collected and report it.
pub fn collect_items(player: &Player, items: &mut [Item]) -> Vec<Pickup> {
    let hitbox = player.rect();
    let mut picked = Vec::new();
    for item in items.iter_mut().filter(|i| !i.collected) {
        if hitbox.overlaps(&item.rect()) {
            item.collected = true;
            picked.push(Pickup { kind: item.kind, value: item.value, x: item.x, y: item.y });
        }
    }
    picked
}

/// Score an item is worth. Only coins score.
pub fn pickup_score(pickup: &Pickup) -> u32 {
    match pickup.kind {
        ItemKind::Coin => pickup.value,
        ItemKind::Other => 0,
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
