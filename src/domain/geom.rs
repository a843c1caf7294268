/// Axis-aligned rectangles and the overlap test every collision check uses.
///
/// Overlap is half-open: rectangles that only share an edge do NOT overlap.
///
///   ax < bx + bw  &&  ax + aw > bx  &&  ay < by + bh  &&  ay + ah > by

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    /// Shrink by `amount` on every side (negative grows).
    /// Never produces a negative size.
    pub fn inset(&self, amount: f32) -> Rect {
        let w = (self.w - amount * 2.0).max(0.0);
        let h = (self.h - amount * 2.0).max(0.0);
        Rect { x: self.x + amount, y: self.y + amount, w, h }
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        overlaps(
            self.x, self.y, self.w, self.h,
            other.x, other.y, other.w, other.h,
        )
    }
}

/// Raw overlap test on two boxes. Pure, O(1).
#[inline]
#[allow(clippy::too_many_arguments)]
pub fn overlaps(
    ax: f32, ay: f32, aw: f32, ah: f32,
    bx: f32, by: f32, bw: f32, bh: f32,
) -> bool {
    ax < bx + bw && ax + aw > bx && ay < by + bh && ay + ah > by
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = bx - ax;
    let dy = by - ay;
    (dx * dx + dy * dy).sqrt()
}
