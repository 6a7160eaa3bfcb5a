//! Core types for the engine.
//!
//! Board and move types come straight from the `chess` crate, which plays the
//! role of the rules library. The engine adds its own search-oriented types
//! (Score, Depth, Ply) and the material scale shared by evaluation, ordering
//! and static exchange.

mod score;
mod depth;

pub use score::{Score, SCORE_INFINITY, SCORE_MATE, SCORE_DRAW, SCORE_MATE_IN_MAX};
pub use depth::{Depth, Ply, MAX_DEPTH, MAX_PLY};

pub use chess::{
    Board,
    ChessMove as Move,
    Square,
    Piece,
    Color,
    BitBoard,
    File,
    Rank,
    MoveGen,
    BoardStatus,
    EMPTY,
};

/// Zobrist hash type (transposition table and opening book key)
pub type Hash = u64;

/// Node count type
pub type NodeCount = u64;

/// Centipawn value type (for piece values, etc.)
pub type Value = i32;

// Piece values in centipawns
pub const PAWN_VALUE: Value = 100;
pub const KNIGHT_VALUE: Value = 320;
pub const BISHOP_VALUE: Value = 330;
pub const ROOK_VALUE: Value = 500;
pub const QUEEN_VALUE: Value = 900;
pub const KING_VALUE: Value = 20000;

/// Every square set; used as the blocker mask for pawn attack lookups.
pub const ALL_SQUARES_BB: BitBoard = BitBoard(u64::MAX);

/// Pieces that count towards game phase and null-move eligibility.
pub const NON_PAWN_PIECES: [Piece; 4] = [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen];

/// Get the material value of a piece in centipawns
#[inline]
pub const fn piece_value(piece: Piece) -> Value {
    match piece {
        Piece::Pawn => PAWN_VALUE,
        Piece::Knight => KNIGHT_VALUE,
        Piece::Bishop => BISHOP_VALUE,
        Piece::Rook => ROOK_VALUE,
        Piece::Queen => QUEEN_VALUE,
        Piece::King => KING_VALUE,
    }
}

/// Non-pawn material of one side, in centipawns.
#[inline]
pub fn non_pawn_material(board: &Board, color: Color) -> Value {
    NON_PAWN_PIECES
        .iter()
        .map(|&p| piece_value(p) * (board.pieces(p) & board.color_combined(color)).popcnt() as Value)
        .sum()
}

/// Squares attacked by `color` on `target`, given an occupancy.
///
/// Shared by static exchange, hanging-piece detection and king safety.
pub fn attackers_to(board: &Board, target: Square, color: Color, occupied: BitBoard) -> BitBoard {
    let ours = *board.color_combined(color) & occupied;
    let diagonal = *board.pieces(Piece::Bishop) | *board.pieces(Piece::Queen);
    let straight = *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);

    let pawns = chess::get_pawn_attacks(target, !color, ALL_SQUARES_BB) & *board.pieces(Piece::Pawn);
    let knights = chess::get_knight_moves(target) & *board.pieces(Piece::Knight);
    let kings = chess::get_king_moves(target) & *board.pieces(Piece::King);
    let bishops = chess::get_bishop_moves(target, occupied) & diagonal;
    let rooks = chess::get_rook_moves(target, occupied) & straight;

    (pawns | knights | kings | bishops | rooks) & ours
}

/// Whether `m` captures something, en passant included.
#[inline]
pub fn is_capture(board: &Board, m: Move) -> bool {
    board.piece_on(m.get_dest()).is_some() || is_en_passant(board, m)
}

/// Pawn moving diagonally onto an empty square.
#[inline]
pub fn is_en_passant(board: &Board, m: Move) -> bool {
    board.piece_on(m.get_source()) == Some(Piece::Pawn)
        && m.get_source().get_file() != m.get_dest().get_file()
        && board.piece_on(m.get_dest()).is_none()
}

/// Neither a capture nor a promotion.
#[inline]
pub fn is_quiet(board: &Board, m: Move) -> bool {
    !is_capture(board, m) && m.get_promotion().is_none()
}

/// Piece taken by `m`, if any.
#[inline]
pub fn captured_piece(board: &Board, m: Move) -> Option<Piece> {
    if is_en_passant(board, m) {
        Some(Piece::Pawn)
    } else {
        board.piece_on(m.get_dest())
    }
}

/// Whether playing `m` leaves the opponent in check.
#[inline]
pub fn gives_check(board: &Board, m: Move) -> bool {
    *board.make_move_new(m).checkers() != EMPTY
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_en_passant_is_capture() {
        let board = Board::from_str("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let ep = Move::new(Square::E5, Square::D6, None);
        assert!(is_en_passant(&board, ep));
        assert_eq!(captured_piece(&board, ep), Some(Piece::Pawn));
        assert!(!is_quiet(&board, ep));
    }

    #[test]
    fn test_attackers_to_counts_both_pawns() {
        // e4 is hit by the d3 and f3 pawns and the g3 knight
        let board = Board::from_str("4k3/8/8/8/4p3/3P1PN1/8/4K3 w - - 0 1").unwrap();
        let attackers = attackers_to(&board, Square::E4, Color::White, *board.combined());
        assert_eq!(attackers.popcnt(), 3);
    }

    #[test]
    fn test_non_pawn_material_startpos() {
        let board = Board::default();
        assert_eq!(non_pawn_material(&board, Color::White), 2 * 320 + 2 * 330 + 2 * 500 + 900);
    }
}
