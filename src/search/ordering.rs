//! Move ordering heuristics.
//!
//! Good move ordering is critical for alpha-beta pruning efficiency. The
//! priority bands are, from first to last: hash move, winning captures,
//! promotions, killers, counter-move, checks, even captures, quiet moves by
//! history, losing captures. Weaker ratings use a cheaper tier that only
//! knows part of this stack.
//!
//! Uses lazy selection sort to avoid full sort overhead.

use super::countermove::CounterMoveTable;
use super::history::HistoryTable;
use super::killers::KillerTable;
use super::see;
use crate::eval::mix64;
use crate::types::{captured_piece, gives_check, is_capture, piece_value, Board, Move, Piece, Ply};

/// Move score constants
const HASH_MOVE_BONUS: i32 = 10_000_000;
const WINNING_CAPTURE_BONUS: i32 = 8_000_000;
const PROMOTION_BONUS: i32 = 7_000_000;
const KILLER_0_BONUS: i32 = 6_000_000;
const KILLER_1_BONUS: i32 = 5_900_000;
const COUNTER_MOVE_BONUS: i32 = 5_000_000;
const CHECK_BONUS: i32 = 4_000_000;
const EVEN_CAPTURE_BONUS: i32 = 3_000_000;
const LOSING_CAPTURE_PENALTY: i32 = -1_000_000;

const MAX_MOVES: usize = 256;

/// How much of the ordering stack is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingTier {
    /// Captures first, everything else in a seeded pseudo-random order.
    Simple,
    /// Captures by MVV-LVA, then promotions.
    MvvLva,
    /// The full heuristic stack.
    Full,
}

impl OrderingTier {
    pub fn for_rating(rating: u32) -> Self {
        match rating {
            r if r < 800 => OrderingTier::Simple,
            r if r < 1400 => OrderingTier::MvvLva,
            _ => OrderingTier::Full,
        }
    }
}

/// Most valuable victim, least valuable attacker.
#[inline]
pub fn mvv_lva(board: &Board, m: Move) -> i32 {
    match (captured_piece(board, m), board.piece_on(m.get_source())) {
        (Some(v), Some(a)) => piece_value(v) * 10 - piece_value(a).min(piece_value(Piece::Queen)),
        _ => 0,
    }
}

#[inline]
fn move_bits(m: Move) -> u64 {
    let promo = m.get_promotion().map(|p| p.to_index() as u64 + 1).unwrap_or(0);
    (m.get_source().to_index() as u64) | ((m.get_dest().to_index() as u64) << 6) | (promo << 12)
}

/// Ordering state for one search: killers, history and counter-moves.
#[derive(Clone)]
pub struct MoveOrderer {
    tier: OrderingTier,
    killers: KillerTable,
    history: HistoryTable,
    counters: CounterMoveTable,
    salt: u64,
}

impl MoveOrderer {
    pub fn new(tier: OrderingTier) -> Self {
        Self {
            tier,
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            counters: CounterMoveTable::new(),
            salt: 0,
        }
    }

    #[inline]
    pub fn tier(&self) -> OrderingTier {
        self.tier
    }

    pub fn set_tier(&mut self, tier: OrderingTier) {
        self.tier = tier;
    }

    /// Seed for the shuffle used by the simple tier.
    pub fn set_salt(&mut self, salt: u64) {
        self.salt = salt;
    }

    pub fn killers(&self) -> &KillerTable {
        &self.killers
    }

    pub fn history(&self) -> &HistoryTable {
        &self.history
    }

    /// Forget everything learned (start of a search).
    pub fn clear(&mut self) {
        self.killers.clear();
        self.history.clear();
        self.counters.clear();
    }

    /// Update the tables after a quiet move caused a beta cutoff.
    pub fn record_cutoff(&mut self, m: Move, ply: Ply, depth: i32, last_move: Option<Move>) {
        self.killers.store(ply, m);
        self.history.record_cutoff(m, depth);
        if let Some(prev) = last_move {
            self.counters.store(prev, m);
        }
    }

    /// Score a move for ordering (higher = search first)
    pub fn score(
        &self,
        board: &Board,
        m: Move,
        ply: Ply,
        hash_move: Option<Move>,
        last_move: Option<Move>,
    ) -> i32 {
        if hash_move == Some(m) {
            return HASH_MOVE_BONUS;
        }
        match self.tier {
            OrderingTier::Simple => {
                let noise = (mix64(self.salt ^ move_bits(m)) % 100_000) as i32;
                if is_capture(board, m) {
                    WINNING_CAPTURE_BONUS + noise
                } else {
                    noise
                }
            }
            OrderingTier::MvvLva => {
                if is_capture(board, m) {
                    WINNING_CAPTURE_BONUS + mvv_lva(board, m)
                } else if m.get_promotion() == Some(Piece::Queen) {
                    PROMOTION_BONUS
                } else {
                    0
                }
            }
            OrderingTier::Full => self.score_full(board, m, ply, last_move),
        }
    }

    fn score_full(&self, board: &Board, m: Move, ply: Ply, last_move: Option<Move>) -> i32 {
        if is_capture(board, m) {
            let exchange = see::see(board, m);
            return if exchange > 0 {
                WINNING_CAPTURE_BONUS + mvv_lva(board, m)
            } else if exchange == 0 {
                EVEN_CAPTURE_BONUS + mvv_lva(board, m)
            } else {
                LOSING_CAPTURE_PENALTY + exchange
            };
        }

        match m.get_promotion() {
            Some(Piece::Queen) => return PROMOTION_BONUS,
            // Underpromotions are almost never right
            Some(_) => return LOSING_CAPTURE_PENALTY,
            None => {}
        }

        let killers = self.killers.get(ply);
        if killers[0] == Some(m) {
            KILLER_0_BONUS
        } else if killers[1] == Some(m) {
            KILLER_1_BONUS
        } else if last_move.and_then(|prev| self.counters.get(prev)) == Some(m) {
            COUNTER_MOVE_BONUS
        } else if gives_check(board, m) {
            CHECK_BONUS
        } else {
            self.history.get(m)
        }
    }

    /// Lazy picker over `moves`.
    pub fn picker(
        &self,
        board: &Board,
        moves: &[Move],
        ply: Ply,
        hash_move: Option<Move>,
        last_move: Option<Move>,
    ) -> MovePicker {
        MovePicker::new(moves, |m| self.score(board, m, ply, hash_move, last_move))
    }

    /// Fully ordered copy of `moves`, best first.
    pub fn order(
        &self,
        board: &Board,
        moves: &[Move],
        ply: Ply,
        hash_move: Option<Move>,
        last_move: Option<Move>,
    ) -> Vec<Move> {
        let mut picker = self.picker(board, moves, ply, hash_move, last_move);
        let mut ordered = Vec::with_capacity(moves.len());
        while let Some(m) = picker.next() {
            ordered.push(m);
        }
        ordered
    }
}

impl Default for MoveOrderer {
    fn default() -> Self {
        Self::new(OrderingTier::Full)
    }
}

/// Move picker for lazy move ordering.
/// Uses selection sort - only finds next best move when needed
pub struct MovePicker {
    moves: [Move; MAX_MOVES],
    scores: [i32; MAX_MOVES],
    count: usize,
    current: usize,
}

impl MovePicker {
    /// Create a picker scoring every move with `score`
    pub fn new(moves_in: &[Move], mut score: impl FnMut(Move) -> i32) -> Self {
        let mut picker = MovePicker {
            moves: [Move::default(); MAX_MOVES],
            scores: [0; MAX_MOVES],
            count: moves_in.len().min(MAX_MOVES),
            current: 0,
        };

        for (i, &m) in moves_in.iter().take(MAX_MOVES).enumerate() {
            picker.moves[i] = m;
            picker.scores[i] = score(m);
        }

        picker
    }

    /// Picker for quiescence: captures by MVV-LVA, other moves after them.
    pub fn captures(board: &Board, moves_in: &[Move]) -> Self {
        MovePicker::new(moves_in, |m| {
            if is_capture(board, m) {
                WINNING_CAPTURE_BONUS + mvv_lva(board, m)
            } else if m.get_promotion().is_some() {
                PROMOTION_BONUS
            } else {
                CHECK_BONUS
            }
        })
    }

    /// Get next best move using selection sort (find max, swap to front)
    #[inline]
    pub fn next(&mut self) -> Option<Move> {
        if self.current >= self.count {
            return None;
        }

        let mut best_idx = self.current;
        let mut best_score = self.scores[self.current];

        for i in (self.current + 1)..self.count {
            if self.scores[i] > best_score {
                best_score = self.scores[i];
                best_idx = i;
            }
        }

        self.moves.swap(self.current, best_idx);
        self.scores.swap(self.current, best_idx);

        let mv = self.moves[self.current];
        self.current += 1;
        Some(mv)
    }

    /// Index of the move last returned (for LMR)
    #[inline]
    pub fn move_index(&self) -> usize {
        self.current.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MoveGen, Square};
    use std::str::FromStr;

    fn legal(board: &Board) -> Vec<Move> {
        MoveGen::new_legal(board).collect()
    }

    #[test]
    fn test_hash_move_first() {
        let board = Board::default();
        let moves = legal(&board);
        let hash = Move::new(Square::B1, Square::A3, None);
        for tier in [OrderingTier::Simple, OrderingTier::MvvLva, OrderingTier::Full] {
            let ordered = MoveOrderer::new(tier).order(&board, &moves, Ply::ZERO, Some(hash), None);
            assert_eq!(ordered[0], hash);
            assert_eq!(ordered.len(), moves.len());
        }
    }

    #[test]
    fn test_winning_capture_before_losing() {
        // Pawn takes knight (winning), queen takes defended pawn (losing)
        let board = Board::from_str("4k3/8/2p5/3p1n2/4P3/8/3Q4/4K3 w - - 0 1").unwrap();
        let ordered = MoveOrderer::new(OrderingTier::Full).order(&board, &legal(&board), Ply::ZERO, None, None);
        assert_eq!(ordered[0], Move::new(Square::E4, Square::F5, None));
        let qxd5 = Move::new(Square::D2, Square::D5, None);
        assert_eq!(ordered.last(), Some(&qxd5));
    }

    #[test]
    fn test_killers_before_history() {
        let board = Board::default();
        let mut orderer = MoveOrderer::new(OrderingTier::Full);
        let killer = Move::new(Square::A2, Square::A3, None);
        let popular = Move::new(Square::E2, Square::E4, None);
        orderer.history.record_cutoff(popular, 10);
        orderer.record_cutoff(killer, Ply::new(2), 1, None);

        let ordered = orderer.order(&board, &legal(&board), Ply::new(2), None, None);
        assert_eq!(ordered[0], killer);
        assert_eq!(ordered[1], popular);
    }

    #[test]
    fn test_counter_move_bonus() {
        let board = Board::default();
        let mut orderer = MoveOrderer::new(OrderingTier::Full);
        let theirs = Move::new(Square::E7, Square::E5, None);
        let reply = Move::new(Square::H2, Square::H3, None);
        orderer.counters.store(theirs, reply);

        let ordered = orderer.order(&board, &legal(&board), Ply::ZERO, None, Some(theirs));
        assert_eq!(ordered[0], reply);
    }

    #[test]
    fn test_simple_tier_is_deterministic_and_captures_first() {
        let board = Board::from_str("4k3/8/8/3n4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mut orderer = MoveOrderer::new(OrderingTier::Simple);
        orderer.set_salt(99);
        let a = orderer.order(&board, &legal(&board), Ply::ZERO, None, None);
        let b = orderer.order(&board, &legal(&board), Ply::ZERO, None, None);
        assert_eq!(a, b);
        assert_eq!(a[0], Move::new(Square::E4, Square::D5, None));
    }

    #[test]
    fn test_tiers_by_rating() {
        assert_eq!(OrderingTier::for_rating(400), OrderingTier::Simple);
        assert_eq!(OrderingTier::for_rating(1000), OrderingTier::MvvLva);
        assert_eq!(OrderingTier::for_rating(2000), OrderingTier::Full);
    }
}
