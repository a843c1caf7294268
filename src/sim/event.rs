/// Events emitted during a simulation step.
/// The presentation layer consumes these for flashes/sound.

use crate::domain::entity::MapId;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    ProjectileFired,
    EnemyHit { x: f32, y: f32 },
    EnemyKilled { x: f32, y: f32, points: u32 },
    CoinCollected { value: u32 },
    ItemCollected,
    PlayerHurt { damage: i32 },
    PlayerKilled,
    MapChanged { from: MapId, to: MapId },
}
