/// Map transitions: which edge the player crossed and where they reappear.
///
/// Horizontal edges fire any time. Vertical edges only fire while the
/// player is on a ladder, with a 40 px overshoot above the top edge.
/// A crossing with no connection is no transition; the caller clamps.

use super::entity::{MapId, PLAYER_SIZE};
use super::map::{Connections, Edge};
use super::physics::{FLOOR_Y, LEVEL_HEIGHT, MAX_PLAYER_X};

/// Spawn x after entering through the left edge.
pub const ENTER_LEFT_X: f32 = 50.0;
/// Spawn x after entering through the right edge.
pub const ENTER_RIGHT_X: f32 = MAX_PLAYER_X - 50.0;
/// Spawn y after climbing out through the top.
pub const ENTER_BOTTOM_Y: f32 = FLOOR_Y;
/// Spawn y after climbing down through the bottom.
pub const ENTER_TOP_Y: f32 = 0.0;
pub const TOP_OVERSHOOT: f32 = -PLAYER_SIZE;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Transition {
    pub edge: Edge,
    pub target: MapId,
    /// New player position in the target map.
    pub x: f32,
    pub y: f32,
}

/// Decide whether the player at (x, y) leaves the map.
pub fn check(x: f32, y: f32, on_ladder: bool, conns: &Connections) -> Option<Transition> {
    if x > MAX_PLAYER_X {
        if let Some(target) = conns.right {
            return Some(Transition { edge: Edge::Right, target, x: ENTER_LEFT_X, y });
        }
    } else if x < 0.0 {
        if let Some(target) = conns.left {
            return Some(Transition { edge: Edge::Left, target, x: ENTER_RIGHT_X, y });
        }
    }

    if !on_ladder {
        return None;
    }

    if y < TOP_OVERSHOOT {
        if let Some(target) = conns.top {
            return Some(Transition { edge: Edge::Top, target, x, y: ENTER_BOTTOM_Y });
        }
    } else if y > LEVEL_HEIGHT {
        if let Some(target) = conns.bottom {
            return Some(Transition { edge: Edge::Bottom, target, x, y: ENTER_TOP_Y });
        }
    }
    None
}

/// Vertical clamp for closed edges. Open edges let the player through
/// so `check` can fire once the threshold is passed.
pub fn clamp_y(y: f32, conns: &Connections) -> f32 {
    if y < 0.0 && conns.top.is_none() {
        0.0
    } else if y > FLOOR_Y && conns.bottom.is_none() {
        FLOOR_Y
    } else {
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(edge: Edge, target: MapId) -> Connections {
        let mut c = Connections::default();
        c.set(edge, Some(target));
        c
    }

    #[test]
    fn right_edge_enters_at_left() {
        let t = check(765.0, 300.0, false, &open(Edge::Right, 2)).unwrap();
        assert_eq!(t.target, 2);
        assert_eq!((t.x, t.y), (50.0, 300.0));
        assert_eq!(t.edge, Edge::Right);
    }

    #[test]
    fn left_edge_enters_at_right() {
        let t = check(-3.0, 520.0, false, &open(Edge::Left, 7)).unwrap();
        assert_eq!((t.target, t.x), (7, 710.0));
    }

    #[test]
    fn closed_edges_do_not_transition() {
        let none = Connections::default();
        assert_eq!(check(765.0, 300.0, false, &none), None);
        assert_eq!(check(-3.0, 300.0, false, &none), None);
        assert_eq!(check(300.0, -50.0, true, &none), None);
        assert_eq!(check(300.0, 610.0, true, &none), None);
    }

    #[test]
    fn vertical_needs_ladder() {
        let top = open(Edge::Top, 4);
        assert_eq!(check(300.0, -41.0, false, &top), None);
        let t = check(300.0, -41.0, true, &top).unwrap();
        assert_eq!((t.target, t.x, t.y), (4, 300.0, 520.0));

        let bottom = open(Edge::Bottom, 5);
        assert_eq!(check(300.0, 601.0, false, &bottom), None);
        let t = check(300.0, 601.0, true, &bottom).unwrap();
        assert_eq!((t.target, t.y), (5, 0.0));
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(check(760.0, 300.0, false, &open(Edge::Right, 1)), None);
        assert_eq!(check(0.0, 300.0, false, &open(Edge::Left, 1)), None);
        assert_eq!(check(300.0, -40.0, true, &open(Edge::Top, 1)), None);
        assert_eq!(check(300.0, 600.0, true, &open(Edge::Bottom, 1)), None);
    }

    #[test]
    fn clamp_y_only_on_closed_edges() {
        let none = Connections::default();
        assert_eq!(clamp_y(-12.0, &none), 0.0);
        assert_eq!(clamp_y(560.0, &none), FLOOR_Y);
        assert_eq!(clamp_y(300.0, &none), 300.0);

        assert_eq!(clamp_y(-12.0, &open(Edge::Top, 1)), -12.0);
        assert_eq!(clamp_y(560.0, &open(Edge::Bottom, 1)), 560.0);
    }
}
