/// Map loader.
///
/// ## Source
///
/// One JSON document (`maps.json` by default, see `[general] maps_file`):
///   ```json
///   { "maps": [
///       { "id": 0, "name": "Outskirts", "background": "#1a1a2e",
///         "platforms":   [{ "x": 0, "y": 560, "width": 800, "height": 40, "type": "ground" }],
///         "enemies":     [{ "type": "basic", "initialX": 300, "initialY": 530, "speed": 2 }],
///         "items":       [{ "type": "coin", "x": 200, "y": 500, "value": 10 }],
///         "connections": { "right": 1 } } ] }
///   ```
///
/// Keys are camelCase. Enemy stats default to the archetype of their
/// `type`; any of `health`, `damage`, `points`, `movement`, `color` may
/// override it per enemy.
///
/// ## Failure
///
/// `load_maps` reports what went wrong. `load_or_fallback` never fails:
/// on any error it logs a warning and hands back `fallback_map()`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::entity::{
    Enemy, EnemyKind, Item, ItemKind, MapId, MoveKind, Platform, PlatformKind,
};
use crate::domain::map::{Connections, Edge, Map};

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("read maps file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse maps json at {path}: {message}")]
    Parse { path: String, message: String },
    #[error("invalid maps: {0}")]
    Invalid(String),
}

// ── Document schema ──

#[derive(Deserialize, Debug)]
struct MapsDoc {
    maps: Vec<MapDef>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct MapDef {
    id: MapId,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    background: Option<String>,
    #[serde(default)]
    platforms: Vec<PlatformDef>,
    #[serde(default)]
    enemies: Vec<EnemyDef>,
    #[serde(default)]
    items: Vec<ItemDef>,
    #[serde(default)]
    connections: ConnectionsDef,
}

#[derive(Deserialize, Debug)]
struct PlatformDef {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    #[serde(default)]
    color: Option<String>,
    #[serde(rename = "type", default)]
    kind: PlatformKind,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EnemyDef {
    #[serde(rename = "type")]
    kind: EnemyKind,
    #[serde(default)]
    width: Option<f32>,
    #[serde(default)]
    height: Option<f32>,
    initial_x: f32,
    initial_y: f32,
    speed: f32,
    #[serde(default = "default_patrol_distance")]
    patrol_distance: f32,
    #[serde(default)]
    health: Option<i32>,
    #[serde(default)]
    damage: Option<f64>,
    #[serde(default)]
    points: Option<u32>,
    #[serde(default)]
    movement: Option<MoveKind>,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ItemDef {
    #[serde(rename = "type", default)]
    kind: ItemKind,
    x: f32,
    y: f32,
    #[serde(default = "default_item_value")]
    value: u32,
}

#[derive(Deserialize, Debug, Default)]
struct ConnectionsDef {
    top: Option<MapId>,
    bottom: Option<MapId>,
    left: Option<MapId>,
    right: Option<MapId>,
}

fn default_patrol_distance() -> f32 { 100.0 }
fn default_item_value() -> u32 { 10 }

fn default_enemy_size(kind: EnemyKind) -> f32 {
    match kind {
        EnemyKind::Boss => 60.0,
        _ => 30.0,
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Read and validate the map document at `path`.
pub fn load_maps(path: &Path) -> Result<Vec<Map>, LevelError> {
    let raw = fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_maps(&raw)
}

/// Like `load_maps`, but a broken or missing file degrades to the fallback map.
pub fn load_or_fallback(path: &Path) -> Vec<Map> {
    match load_maps(path) {
        Ok(maps) => {
            info!(path = %path.display(), count = maps.len(), "maps loaded");
            maps
        }
        Err(e) => {
            warn!(error = %e, "using fallback map");
            vec![fallback_map()]
        }
    }
}

/// One ground platform spanning the level. No enemies, items or exits.
pub fn fallback_map() -> Map {
    let mut map = Map::new(0, "Fallback");
    map.description = "Built-in map used when the map file cannot be loaded".to_string();
    map.platforms.push(Platform::new(0.0, 560.0, 800.0, 40.0, PlatformKind::Ground));
    map
}

pub fn parse_maps(raw: &str) -> Result<Vec<Map>, LevelError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let doc: MapsDoc = serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        let message = error.into_inner().to_string();
        LevelError::Parse { path, message }
    })?;

    validate(&doc)?;

    let known: HashSet<MapId> = doc.maps.iter().map(|m| m.id).collect();
    Ok(doc.maps.into_iter().map(|def| build_map(def, &known)).collect())
}

// ══════════════════════════════════════════════════════════════
// Validation / construction
// ══════════════════════════════════════════════════════════════

fn validate(doc: &MapsDoc) -> Result<(), LevelError> {
    if doc.maps.is_empty() {
        return Err(LevelError::Invalid("document has no maps".to_string()));
    }

    let mut seen = HashSet::new();
    for (i, m) in doc.maps.iter().enumerate() {
        if !seen.insert(m.id) {
            return Err(LevelError::Invalid(format!("maps[{i}]: duplicate map id {}", m.id)));
        }
        for (j, p) in m.platforms.iter().enumerate() {
            if p.width <= 0.0 || p.height <= 0.0 {
                return Err(LevelError::Invalid(format!(
                    "maps[{i}].platforms[{j}]: size must be positive, got {}x{}",
                    p.width, p.height
                )));
            }
        }
        for (j, e) in m.enemies.iter().enumerate() {
            if e.speed < 0.0 || e.patrol_distance < 0.0 {
                return Err(LevelError::Invalid(format!(
                    "maps[{i}].enemies[{j}]: speed and patrolDistance must not be negative"
                )));
            }
            if e.health.is_some_and(|h| h <= 0) {
                return Err(LevelError::Invalid(format!("maps[{i}].enemies[{j}]: health must be positive")));
            }
        }
    }
    Ok(())
}

fn build_map(def: MapDef, known: &HashSet<MapId>) -> Map {
    let mut map = Map::new(def.id, &def.name);
    map.description = def.description;
    if let Some(bg) = def.background {
        map.background = bg;
    }

    map.platforms = def.platforms.into_iter().map(|p| {
        let mut platform = Platform::new(p.x, p.y, p.width, p.height, p.kind);
        if let Some(color) = p.color {
            platform.color = color;
        }
        platform
    }).collect();

    map.enemies = def.enemies.into_iter().map(build_enemy).collect();
    map.items = def.items.into_iter().map(|i| Item::new(i.kind, i.x, i.y, i.value)).collect();

    let c = def.connections;
    let edges = [(Edge::Top, c.top), (Edge::Bottom, c.bottom), (Edge::Left, c.left), (Edge::Right, c.right)];
    let mut conns = Connections::default();
    for (edge, target) in edges {
        match target {
            Some(id) if !known.contains(&id) => {
                warn!(map = def.id, ?edge, target_id = id, "connection to unknown map dropped");
            }
            _ => conns.set(edge, target),
        }
    }
    map.connections = conns;
    map
}

fn build_enemy(e: EnemyDef) -> Enemy {
    let w = e.width.unwrap_or_else(|| default_enemy_size(e.kind));
    let h = e.height.unwrap_or_else(|| default_enemy_size(e.kind));
    let mut enemy = Enemy::new(e.kind, e.initial_x, e.initial_y, w, h, e.speed, e.patrol_distance);
    if let Some(health) = e.health {
        enemy.health = health;
        enemy.max_health = health;
    }
    if let Some(damage) = e.damage { enemy.damage = damage; }
    if let Some(points) = e.points { enemy.points = points; }
    if let Some(movement) = e.movement { enemy.movement = movement; }
    if let Some(color) = e.color { enemy.color = color; }
    enemy
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
