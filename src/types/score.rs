//! Search scores.
//!
//! A score is a centipawn count from the side to move, except near the ends
//! of the range where it encodes a forced mate together with its distance in
//! plies from the root.

use std::fmt;
use std::ops::{Add, Neg, Sub};

pub const SCORE_INFINITY: i32 = 32000;
pub const SCORE_MATE: i32 = 31000;
pub const SCORE_DRAW: i32 = 0;

/// Scores at or beyond this magnitude are mate scores.
pub const SCORE_MATE_IN_MAX: i32 = SCORE_MATE - 1000;

/// Centipawns, or a mate encoded as `SCORE_MATE - plies`.
///
/// Being mated is the negation. A nearer mate is numerically larger, so the
/// search prefers it without any special casing.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Score(pub i32);

impl Score {
    #[inline]
    pub const fn cp(centipawns: i32) -> Self {
        Score(centipawns)
    }

    /// The side to move mates in `ply` plies from the root.
    #[inline]
    pub const fn mate_in(ply: i32) -> Self {
        Score(SCORE_MATE - ply)
    }

    /// The side to move is mated in `ply` plies from the root.
    #[inline]
    pub const fn mated_in(ply: i32) -> Self {
        Score(ply - SCORE_MATE)
    }

    #[inline]
    pub const fn draw() -> Self {
        Score(SCORE_DRAW)
    }

    /// Upper search bound; no real score reaches it.
    #[inline]
    pub const fn infinity() -> Self {
        Score(SCORE_INFINITY)
    }

    #[inline]
    pub const fn neg_infinity() -> Self {
        Score(-SCORE_INFINITY)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn is_mate(self) -> bool {
        self.0 >= SCORE_MATE_IN_MAX
    }

    #[inline]
    pub const fn is_mated(self) -> bool {
        self.0 <= -SCORE_MATE_IN_MAX
    }

    #[inline]
    pub const fn is_mate_score(self) -> bool {
        self.is_mate() || self.is_mated()
    }

    /// Plies to the mate, for either side.
    #[inline]
    pub const fn mate_distance(self) -> Option<i32> {
        if self.is_mate_score() {
            Some(SCORE_MATE - self.0.abs())
        } else {
            None
        }
    }

    /// Full moves to the mate; negative when the side to move is being mated.
    pub const fn mate_moves(self) -> Option<i32> {
        match self.mate_distance() {
            Some(plies) if self.is_mate() => Some((plies + 1) / 2),
            Some(plies) => Some(-((plies + 1) / 2)),
            None => None,
        }
    }

    /// Move a mate's reference point `plies` further from the root.
    #[inline]
    const fn shift_mate(self, plies: i32) -> Self {
        if self.is_mate() {
            Score(self.0 + plies)
        } else if self.is_mated() {
            Score(self.0 - plies)
        } else {
            self
        }
    }

    /// Re-base a root-relative mate to the node at `ply` before storing it.
    #[inline]
    pub const fn to_tt(self, ply: i32) -> Self {
        self.shift_mate(ply)
    }

    /// Inverse of [`Score::to_tt`].
    #[inline]
    pub const fn from_tt(self, ply: i32) -> Self {
        self.shift_mate(-ply)
    }
}

impl Add for Score {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Score(self.0 + rhs.0)
    }
}

impl Sub for Score {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Score(self.0 - rhs.0)
    }
}

impl Neg for Score {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Score(-self.0)
    }
}

impl From<i32> for Score {
    #[inline]
    fn from(v: i32) -> Self {
        Score(v)
    }
}

/// UCI score syntax: `cp 35`, `mate 2`, `mate -1`.
impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mate_moves() {
            Some(moves) => write!(f, "mate {}", moves),
            None => write!(f, "cp {}", self.0),
        }
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_band() {
        assert!(Score::mate_in(5).is_mate());
        assert!(!Score::mate_in(5).is_mated());
        assert!(Score::mated_in(4).is_mated());
        assert!(!Score::cp(2500).is_mate_score());
        assert!(Score(SCORE_MATE_IN_MAX).is_mate());
        assert!(!Score(SCORE_MATE_IN_MAX - 1).is_mate());
    }

    #[test]
    fn test_distances() {
        assert_eq!(Score::mate_in(5).mate_distance(), Some(5));
        assert_eq!(Score::mated_in(4).mate_distance(), Some(4));
        assert_eq!(Score::cp(-80).mate_distance(), None);

        assert_eq!(Score::mate_in(1).mate_moves(), Some(1));
        assert_eq!(Score::mate_in(3).mate_moves(), Some(2));
        assert_eq!(Score::mated_in(2).mate_moves(), Some(-1));
        assert_eq!(Score::cp(12).mate_moves(), None);
    }

    #[test]
    fn test_nearer_mate_ranks_higher() {
        assert!(Score::mate_in(1) > Score::mate_in(3));
        assert!(Score::mated_in(3) > Score::mated_in(1));
        assert!(Score::mated_in(1) < Score::cp(-3000));
        assert_eq!(-Score::mate_in(6), Score::mated_in(6));
    }

    #[test]
    fn test_tt_rebasing() {
        // Mate 7 plies from the root, stored at ply 4: 3 plies from that node.
        let stored = Score::mate_in(7).to_tt(4);
        assert_eq!(stored, Score::mate_in(3));
        // Found again at ply 2, it is 5 plies from the root.
        assert_eq!(stored.from_tt(2), Score::mate_in(5));

        assert_eq!(Score::mated_in(6).to_tt(2), Score::mated_in(4));
        assert_eq!(Score::cp(40).to_tt(9), Score::cp(40));
    }

    #[test]
    fn test_display() {
        assert_eq!(Score::cp(35).to_string(), "cp 35");
        assert_eq!(Score::mate_in(1).to_string(), "mate 1");
        assert_eq!(Score::mated_in(2).to_string(), "mate -1");
    }
}
