/// WorldState: the complete snapshot of a running session.
///
/// ## Maps
///
/// Two map sets:
///   - `pristine`: the maps as loaded. **Never mutated** after `new`.
///   - `maps`:     the live maps: enemy positions, kills, pickups.
///
/// The live set persists for the whole session. Re-entering a map calls
/// `Map::reset()` (living enemies go home, kills and pickups stay).
/// `restart()` copies `pristine` back over `maps`.
///
/// The player and the projectile list belong to the session, not to a map.

use crate::config::Tuning;
use crate::domain::entity::{MapId, Player, Projectile, PLAYER_MAX_HEALTH};
use crate::domain::map::Map;

pub const PLAYER_SPAWN: (f32, f32) = (50.0, 460.0);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    GameOver,
}

pub struct WorldState {
    // ── Maps ──
    pristine: Vec<Map>,
    pub maps: Vec<Map>,
    pub current_map: usize,

    // ── Entities ──
    pub player: Player,
    pub projectiles: Vec<Projectile>,

    // ── Combat ──
    /// Session time (ms) of the last hit taken. `None` = never hit.
    pub last_damage_ms: Option<u64>,

    // ── Tuning ──
    pub tuning: Tuning,

    // ── Meta ──
    pub phase: Phase,
    pub score: u32,
    pub tick: u64,
    pub paused: bool,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

// ── Construction ──

impl WorldState {
    /// `maps` must not be empty; the loader guarantees it.
    pub fn new(maps: Vec<Map>, tuning: Tuning) -> Self {
        let (x, y) = PLAYER_SPAWN;
        WorldState {
            pristine: maps.clone(),
            maps,
            current_map: 0,
            player: Player::new(x, y),
            projectiles: vec![],
            last_damage_ms: None,
            tuning,
            phase: Phase::Title,
            score: 0,
            tick: 0,
            paused: false,
            message: String::new(),
            message_timer: 0,
        }
    }

    /// Begin play from the title screen.
    pub fn start(&mut self) {
        self.restart();
    }

    /// Fresh session: pristine maps, full health, zero score.
    pub fn restart(&mut self) {
        let (x, y) = PLAYER_SPAWN;
        self.maps = self.pristine.clone();
        self.current_map = 0;
        self.player = Player::new(x, y);
        self.projectiles.clear();
        self.last_damage_ms = None;
        self.score = 0;
        self.tick = 0;
        self.paused = false;
        self.phase = Phase::Playing;
        if let Some(m) = self.maps.first_mut() {
            m.visited = true;
        }
        let name = self.current_map().name.clone();
        self.set_message(&name, 120);
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }
}

// ── Map access ──

impl WorldState {
    pub fn current_map(&self) -> &Map {
        &self.maps[self.current_map]
    }

    /// Index of the map with the given id.
    pub fn map_index(&self, id: MapId) -> Option<usize> {
        self.maps.iter().position(|m| m.id == id)
    }

    /// Switch to the map at `index`. Projectiles do not follow the player.
    pub fn enter_map(&mut self, index: usize) {
        self.current_map = index;
        self.projectiles.clear();
        let map = &mut self.maps[index];
        if map.visited {
            map.reset();
        }
        map.visited = true;
    }

    pub fn is_alive(&self) -> bool {
        self.player.health > 0
    }

    pub fn health_ratio(&self) -> f32 {
        self.player.health.max(0) as f32 / PLAYER_MAX_HEALTH as f32
    }
}
