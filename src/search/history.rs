//! History heuristic: per (from, to) credit for quiet moves that cut off.

use crate::types::Move;

/// Scores are halved once any entry reaches this, keeping them below the
/// bonus given to killer and counter moves.
pub const HISTORY_MAX: i32 = 400_000;

#[derive(Clone)]
pub struct HistoryTable {
    table: Box<[[i32; 64]; 64]>,
}

impl HistoryTable {
    pub fn new() -> Self {
        Self {
            table: Box::new([[0; 64]; 64]),
        }
    }

    #[inline]
    pub fn get(&self, m: Move) -> i32 {
        self.table[m.get_source().to_index()][m.get_dest().to_index()]
    }

    /// Credit a cutoff with depth squared, aging the table when it saturates.
    pub fn record_cutoff(&mut self, m: Move, depth: i32) {
        let d = depth.max(1);
        let entry = &mut self.table[m.get_source().to_index()][m.get_dest().to_index()];
        *entry += d * d;
        if *entry >= HISTORY_MAX {
            self.age();
        }
    }

    /// Halve every score.
    pub fn age(&mut self) {
        for row in self.table.iter_mut() {
            for v in row.iter_mut() {
                *v /= 2;
            }
        }
    }

    pub fn clear(&mut self) {
        for row in self.table.iter_mut() {
            *row = [0; 64];
        }
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Square;

    #[test]
    fn test_depth_squared_credit() {
        let mut history = HistoryTable::new();
        let m = Move::new(Square::E2, Square::E4, None);
        history.record_cutoff(m, 3);
        history.record_cutoff(m, 2);
        assert_eq!(history.get(m), 13);
        assert_eq!(history.get(Move::new(Square::D2, Square::D4, None)), 0);
    }

    #[test]
    fn test_aging_halves() {
        let mut history = HistoryTable::new();
        let m = Move::new(Square::E2, Square::E4, None);
        history.record_cutoff(m, 10);
        history.age();
        assert_eq!(history.get(m), 50);
    }

    #[test]
    fn test_growth_is_bounded() {
        let mut history = HistoryTable::new();
        let m = Move::new(Square::G1, Square::F3, None);
        for _ in 0..100_000 {
            history.record_cutoff(m, 20);
        }
        assert!(history.get(m) < HISTORY_MAX);
    }

    #[test]
    fn test_clear() {
        let mut history = HistoryTable::new();
        let m = Move::new(Square::E2, Square::E4, None);
        history.record_cutoff(m, 4);
        history.clear();
        assert_eq!(history.get(m), 0);
    }
}
