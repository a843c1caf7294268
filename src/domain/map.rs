/// One level: platforms, enemies, items and the edges that lead elsewhere.
///
/// The map owns its enemies and items. The session keeps one `Map` per id
/// for its whole run, so kills and pickups survive leaving and re-entering.

use super::entity::{Enemy, Item, MapId, Platform};

/// Level edge a connection hangs off.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// Edge → target map id. `None` = closed edge.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Connections {
    pub top: Option<MapId>,
    pub bottom: Option<MapId>,
    pub left: Option<MapId>,
    pub right: Option<MapId>,
}

impl Connections {
    pub fn get(&self, edge: Edge) -> Option<MapId> {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }

    pub fn set(&mut self, edge: Edge, target: Option<MapId>) {
        match edge {
            Edge::Top => self.top = target,
            Edge::Bottom => self.bottom = target,
            Edge::Left => self.left = target,
            Edge::Right => self.right = target,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Map {
    pub id: MapId,
    pub name: String,
    pub description: String,
    pub platforms: Vec<Platform>,
    pub enemies: Vec<Enemy>,
    pub items: Vec<Item>,
    pub connections: Connections,
    pub background: String,
    pub visited: bool,
}

impl Map {
    pub fn new(id: MapId, name: &str) -> Self {
        Map {
            id,
            name: name.to_string(),
            description: String::new(),
            platforms: vec![],
            enemies: vec![],
            items: vec![],
            connections: Connections::default(),
            background: "#1a1a2e".to_string(),
            visited: false,
        }
    }

    pub fn connection(&self, edge: Edge) -> Option<MapId> {
        self.connections.get(edge)
    }

    /// Put living enemies back on their spawn points.
    /// Dead enemies stay dead; collected items stay collected.
    pub fn reset(&mut self) {
        for e in self.enemies.iter_mut().filter(|e| e.alive) {
            e.return_to_spawn();
        }
    }

    pub fn living_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.alive)
    }

    pub fn ladders(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter().filter(|p| p.is_ladder())
    }
}
