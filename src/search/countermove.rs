//! Counter-move heuristic for move ordering.
//!
//! Tracks which move refuted the opponent's previous move. Similar to killer
//! moves but indexed by the opponent's move rather than by ply.

use crate::types::Move;

/// Counter-move table: [from_sq][to_sq] -> counter move
#[derive(Clone)]
pub struct CounterMoveTable {
    table: Box<[[Option<Move>; 64]; 64]>,
}

impl CounterMoveTable {
    pub fn new() -> Self {
        Self {
            table: Box::new([[None; 64]; 64]),
        }
    }

    /// Store the reply that refuted `opponent_move`
    #[inline]
    pub fn store(&mut self, opponent_move: Move, counter: Move) {
        let from = opponent_move.get_source().to_index();
        let to = opponent_move.get_dest().to_index();
        self.table[from][to] = Some(counter);
    }

    #[inline]
    pub fn get(&self, opponent_move: Move) -> Option<Move> {
        let from = opponent_move.get_source().to_index();
        let to = opponent_move.get_dest().to_index();
        self.table[from][to]
    }

    pub fn clear(&mut self) {
        for row in self.table.iter_mut() {
            *row = [None; 64];
        }
    }
}

impl Default for CounterMoveTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Square;

    #[test]
    fn test_store_and_get() {
        let mut counters = CounterMoveTable::new();
        let theirs = Move::new(Square::E7, Square::E5, None);
        let reply = Move::new(Square::G1, Square::F3, None);
        assert_eq!(counters.get(theirs), None);
        counters.store(theirs, reply);
        assert_eq!(counters.get(theirs), Some(reply));
        counters.clear();
        assert_eq!(counters.get(theirs), None);
    }
}
