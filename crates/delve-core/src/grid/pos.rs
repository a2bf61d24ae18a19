//! Grid coordinates and displacements

use core::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A grid position (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Pos2D {
    pub y: i32,
    pub x: i32,
}

/// A displacement between two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Pos2DVec {
    pub y: i32,
    pub x: i32,
}

impl Pos2D {
    pub const fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    /// Approximate distance: the long axis plus half the short one
    pub fn distance(self, other: Pos2D) -> i32 {
        let dy = (self.y - other.y).abs();
        let dx = (self.x - other.x).abs();
        if dy > dx { dy + (dx >> 1) } else { dx + (dy >> 1) }
    }

    /// Chebyshev (king-move) distance
    pub fn chebyshev(self, other: Pos2D) -> i32 {
        (self.y - other.y).abs().max((self.x - other.x).abs())
    }

    /// True when `other` is one of the 8 neighbors (or the same grid)
    pub fn is_adjacent(self, other: Pos2D) -> bool {
        self.chebyshev(other) < 2
    }
}

impl Pos2DVec {
    pub const fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    pub const fn is_zero(self) -> bool {
        self.y == 0 && self.x == 0
    }

    /// Component-wise sign, giving a unit king-move
    pub fn signum(self) -> Self {
        Self::new(self.y.signum(), self.x.signum())
    }
}

impl Add<Pos2DVec> for Pos2D {
    type Output = Pos2D;
    fn add(self, v: Pos2DVec) -> Pos2D {
        Pos2D::new(self.y + v.y, self.x + v.x)
    }
}

impl AddAssign<Pos2DVec> for Pos2D {
    fn add_assign(&mut self, v: Pos2DVec) {
        self.y += v.y;
        self.x += v.x;
    }
}

impl Sub<Pos2DVec> for Pos2D {
    type Output = Pos2D;
    fn sub(self, v: Pos2DVec) -> Pos2D {
        Pos2D::new(self.y - v.y, self.x - v.x)
    }
}

impl Sub<Pos2D> for Pos2D {
    type Output = Pos2DVec;
    fn sub(self, other: Pos2D) -> Pos2DVec {
        Pos2DVec::new(self.y - other.y, self.x - other.x)
    }
}

impl Add for Pos2DVec {
    type Output = Pos2DVec;
    fn add(self, v: Pos2DVec) -> Pos2DVec {
        Pos2DVec::new(self.y + v.y, self.x + v.x)
    }
}

impl Neg for Pos2DVec {
    type Output = Pos2DVec;
    fn neg(self) -> Pos2DVec {
        Pos2DVec::new(-self.y, -self.x)
    }
}

impl Mul<i32> for Pos2DVec {
    type Output = Pos2DVec;
    fn mul(self, k: i32) -> Pos2DVec {
        Pos2DVec::new(self.y * k, self.x * k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_prefers_long_axis() {
        let a = Pos2D::new(0, 0);
        assert_eq!(a.distance(Pos2D::new(0, 5)), 5);
        assert_eq!(a.distance(Pos2D::new(4, 4)), 6);
        assert_eq!(a.distance(Pos2D::new(1, 6)), 6);
        assert_eq!(a.distance(Pos2D::new(3, 2)), 4);
    }

    #[test]
    fn test_vector_arithmetic() {
        let p = Pos2D::new(3, 4);
        let v = Pos2DVec::new(-1, 2);
        assert_eq!(p + v, Pos2D::new(2, 6));
        assert_eq!((p + v) - p, v);
        assert_eq!(-v * 2, Pos2DVec::new(2, -4));
        assert_eq!(Pos2DVec::new(-7, 3).signum(), Pos2DVec::new(-1, 1));
    }
}
