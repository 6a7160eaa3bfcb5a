//! Depth and Ply types for search.

use std::ops::{Add, Sub};

/// Deepest nominal iteration the driver will ever request.
pub const MAX_DEPTH: i32 = 64;

/// Stack bound for killer slots and recursion (nominal depth, extensions and
/// the quiescence tail all fit below it).
pub const MAX_PLY: i32 = 128;

/// Remaining search depth in plies. Zero or below drops into quiescence.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
#[repr(transparent)]
pub struct Depth(pub i32);

impl Depth {
    pub const ZERO: Depth = Depth(0);
    pub const ONE: Depth = Depth(1);
    pub const MAX: Depth = Depth(MAX_DEPTH);

    #[inline]
    pub const fn new(d: i32) -> Self {
        Depth(d)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Check if this depth requires quiescence search
    #[inline]
    pub const fn is_qs(self) -> bool {
        self.0 <= 0
    }

    /// Depth after a reduction, never below zero.
    #[inline]
    pub const fn reduced(self, plies: i32) -> Self {
        let d = self.0 - plies;
        Depth(if d < 0 { 0 } else { d })
    }
}

impl Add<i32> for Depth {
    type Output = Self;
    #[inline]
    fn add(self, rhs: i32) -> Self {
        Depth(self.0 + rhs)
    }
}

impl Sub<i32> for Depth {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: i32) -> Self {
        Depth(self.0 - rhs)
    }
}

impl From<i32> for Depth {
    #[inline]
    fn from(d: i32) -> Self {
        Depth(d)
    }
}

/// Distance from the root in half-moves. Indexes killer slots and offsets
/// mate scores.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
#[repr(transparent)]
pub struct Ply(pub i32);

impl Ply {
    pub const ZERO: Ply = Ply(0);

    #[inline]
    pub const fn new(p: i32) -> Self {
        Ply(p)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn next(self) -> Self {
        Ply(self.0 + 1)
    }

    /// Get as usize for array indexing
    #[inline]
    pub const fn as_index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_floors_at_zero() {
        assert_eq!(Depth::new(3).reduced(4), Depth::ZERO);
        assert_eq!(Depth::new(5).reduced(4), Depth::ONE);
        assert!(Depth::new(5).reduced(5).is_qs());
    }
}
