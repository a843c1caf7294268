/// Entities: Player, Enemy, Platform, Item, Projectile.
///
/// Simulation fields only. Presentation handles (screen cells, flashes)
/// belong to the renderer and never live on these structs.

use serde::Deserialize;

use super::geom::Rect;

/// Map identifier as written in the map document.
pub type MapId = u32;

pub const PLAYER_SIZE: f32 = 40.0;
pub const PLAYER_MAX_HEALTH: i32 = 100;
pub const ITEM_SIZE: f32 = 20.0;
pub const PROJECTILE_W: f32 = 10.0;
pub const PROJECTILE_H: f32 = 4.0;
/// Extra reach added around a projectile when testing hits.
pub const PROJECTILE_HIT_PAD: f32 = 4.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Facing toward a horizontal delta; `None` when the delta is zero.
    pub fn toward(dx: f32) -> Option<Facing> {
        if dx < 0.0 {
            Some(Facing::Left)
        } else if dx > 0.0 {
            Some(Facing::Right)
        } else {
            None
        }
    }
}

// ── Platforms ──

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Ground,
    Ladder,
    #[default]
    #[serde(other)]
    Other,
}

/// Immutable after the map is built.
#[derive(Clone, Debug)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: String,
    pub kind: PlatformKind,
}

impl Platform {
    pub fn new(x: f32, y: f32, width: f32, height: f32, kind: PlatformKind) -> Self {
        let color = match kind {
            PlatformKind::Ground => "#4a4a4a",
            PlatformKind::Ladder => "#8b5a2b",
            PlatformKind::Other => "#666666",
        };
        Platform { x, y, width, height, color: color.to_string(), kind }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn is_ladder(&self) -> bool {
        self.kind == PlatformKind::Ladder
    }
}

// ── Enemies ──

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    Basic,
    Armored,
    Boss,
}

/// Movement policy, picked once when the enemy is built.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    Patrol,
    Chase,
    Complex,
}

impl EnemyKind {
    pub fn base_health(self) -> i32 {
        match self {
            EnemyKind::Basic => 40,
            EnemyKind::Armored => 80,
            EnemyKind::Boss => 300,
        }
    }

    pub fn base_damage(self) -> f64 {
        match self {
            EnemyKind::Basic => 10.0,
            EnemyKind::Armored => 15.0,
            EnemyKind::Boss => 25.0,
        }
    }

    pub fn base_points(self) -> u32 {
        match self {
            EnemyKind::Basic => 100,
            EnemyKind::Armored => 250,
            EnemyKind::Boss => 1000,
        }
    }

    pub fn default_movement(self) -> MoveKind {
        match self {
            EnemyKind::Basic => MoveKind::Patrol,
            EnemyKind::Armored => MoveKind::Chase,
            EnemyKind::Boss => MoveKind::Complex,
        }
    }

    /// Fraction of projectile damage absorbed.
    pub fn damage_reduction(self) -> f64 {
        match self {
            EnemyKind::Basic => 0.0,
            EnemyKind::Armored => 0.3,
            EnemyKind::Boss => 0.5,
        }
    }

    pub fn default_color(self) -> &'static str {
        match self {
            EnemyKind::Basic => "#ff6b6b",
            EnemyKind::Armored => "#9b59b6",
            EnemyKind::Boss => "#e67e22",
        }
    }
}

/// Boss jump arc state. Unused by the other movement kinds.
#[derive(Clone, Copy, Debug, Default)]
pub struct JumpState {
    pub airborne: bool,
    pub velocity_y: f32,
    pub start_y: f32,
    /// Ticks since the last landing; incremented every tick.
    pub cooldown: u32,
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub movement: MoveKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub health: i32,
    pub max_health: i32,
    /// Contact damage before multipliers. Kept in f64 so floors match the data.
    pub damage: f64,
    pub points: u32,
    pub speed: f32,
    pub patrol_distance: f32,
    pub initial_x: f32,
    pub initial_y: f32,
    /// Patrol direction: +1.0 right, -1.0 left.
    pub direction: f32,
    pub facing: Facing,
    pub chasing: bool,
    pub jump: JumpState,
    pub alive: bool,
    pub color: String,
}

impl Enemy {
    /// Build an enemy with its archetype stats.
    pub fn new(kind: EnemyKind, x: f32, y: f32, width: f32, height: f32, speed: f32, patrol_distance: f32) -> Self {
        Enemy {
            kind,
            movement: kind.default_movement(),
            x, y,
            width, height,
            health: kind.base_health(),
            max_health: kind.base_health(),
            damage: kind.base_damage(),
            points: kind.base_points(),
            speed,
            patrol_distance,
            initial_x: x,
            initial_y: y,
            direction: 1.0,
            facing: Facing::Right,
            chasing: false,
            jump: JumpState { start_y: y, ..JumpState::default() },
            alive: true,
            color: kind.default_color().to_string(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn is_airborne(&self) -> bool {
        self.jump.airborne
    }

    /// Back to the spawn point with fresh behavior timers. Health is kept.
    pub fn return_to_spawn(&mut self) {
        self.x = self.initial_x;
        self.y = self.initial_y;
        self.direction = 1.0;
        self.facing = Facing::Right;
        self.chasing = false;
        self.jump = JumpState { start_y: self.initial_y, ..JumpState::default() };
    }
}

// ── Items ──

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Coin,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug)]
pub struct Item {
    pub kind: ItemKind,
    pub x: f32,
    pub y: f32,
    pub value: u32,
    pub collected: bool,
}

impl Item {
    pub fn new(kind: ItemKind, x: f32, y: f32, value: u32) -> Self {
        Item { kind, x, y, value, collected: false }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, ITEM_SIZE, ITEM_SIZE)
    }
}

// ── Projectiles ──

/// Player-fired shot. Lives until it hits something or leaves the level.
#[derive(Clone, Debug)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Projectile {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, PROJECTILE_W, PROJECTILE_H)
    }

    /// Enlarged box used for hit tests.
    pub fn hitbox(&self) -> Rect {
        self.rect().inset(-PROJECTILE_HIT_PAD)
    }
}

// ── Player ──

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub facing: Facing,
    pub jumping: bool,
    pub on_ladder: bool,
    pub health: i32,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Player {
            x, y,
            vx: 0.0,
            vy: 0.0,
            facing: Facing::Right,
            jumping: false,
            on_ladder: false,
            health: PLAYER_MAX_HEALTH,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, PLAYER_SIZE, PLAYER_SIZE)
    }
}

/// Frame input: held movement keys plus edge-triggered actions.
/// Jump and fire fire once per fresh press, never on hold.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub fire: bool,
}
