//! Piece-square tables and game-phase helpers.
//!
//! Tables are laid out from white's point of view with a8 first, so a white
//! piece on square `sq` reads index `sq ^ 56` and a black piece reads `sq`.

use crate::types::{non_pawn_material, Board, Color, Piece, Square, Value};

/// Combined non-pawn material (both sides) at or below which the position is an endgame.
pub const ENDGAME_MATERIAL: Value = 2600;

/// Full phase value, reached in the starting position.
pub const PHASE_MAX: i32 = 256;

#[rustfmt::skip]
const PAWN_MG: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const PAWN_EG: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    80, 80, 80, 80, 80, 80, 80, 80,
    50, 50, 50, 50, 50, 50, 50, 50,
    30, 30, 30, 30, 30, 30, 30, 30,
    20, 20, 20, 20, 20, 20, 20, 20,
    10, 10, 10, 10, 10, 10, 10, 10,
     5,  5,  5,  5,  5,  5,  5,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT: [i32; 64] = [
   -50,-40,-30,-30,-30,-30,-40,-50,
   -40,-20,  0,  0,  0,  0,-20,-40,
   -30,  0, 10, 15, 15, 10,  0,-30,
   -30,  5, 15, 20, 20, 15,  5,-30,
   -30,  0, 15, 20, 20, 15,  0,-30,
   -30,  5, 10, 15, 15, 10,  5,-30,
   -40,-20,  0,  5,  5,  0,-20,-40,
   -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
const BISHOP: [i32; 64] = [
   -20,-10,-10,-10,-10,-10,-10,-20,
   -10,  0,  0,  0,  0,  0,  0,-10,
   -10,  0,  5, 10, 10,  5,  0,-10,
   -10,  5,  5, 10, 10,  5,  5,-10,
   -10,  0, 10, 10, 10, 10,  0,-10,
   -10, 10, 10, 10, 10, 10, 10,-10,
   -10,  5,  0,  0,  0,  0,  5,-10,
   -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN: [i32; 64] = [
   -20,-10,-10, -5, -5,-10,-10,-20,
   -10,  0,  0,  0,  0,  0,  0,-10,
   -10,  0,  5,  5,  5,  5,  0,-10,
    -5,  0,  5,  5,  5,  5,  0, -5,
     0,  0,  5,  5,  5,  5,  0, -5,
   -10,  5,  5,  5,  5,  5,  0,-10,
   -10,  0,  5,  0,  0,  0,  0,-10,
   -20,-10,-10, -5, -5,-10,-10,-20,
];

#[rustfmt::skip]
const KING_MG: [i32; 64] = [
   -30,-40,-40,-50,-50,-40,-40,-30,
   -30,-40,-40,-50,-50,-40,-40,-30,
   -30,-40,-40,-50,-50,-40,-40,-30,
   -30,-40,-40,-50,-50,-40,-40,-30,
   -20,-30,-30,-40,-40,-30,-30,-20,
   -10,-20,-20,-20,-20,-20,-20,-10,
    20, 20,  0,  0,  0,  0, 20, 20,
    20, 30, 10,  0,  0, 10, 30, 20,
];

#[rustfmt::skip]
const KING_EG: [i32; 64] = [
   -50,-40,-30,-20,-20,-30,-40,-50,
   -30,-20,-10,  0,  0,-10,-20,-30,
   -30,-10, 20, 30, 30, 20,-10,-30,
   -30,-10, 30, 40, 40, 30,-10,-30,
   -30,-10, 30, 40, 40, 30,-10,-30,
   -30,-10, 20, 30, 30, 20,-10,-30,
   -30,-30,  0,  0,  0,  0,-30,-30,
   -50,-30,-30,-30,-30,-30,-30,-50,
];

/// Table index for a square from `color`'s point of view.
#[inline]
pub fn pst_index(sq: Square, color: Color) -> usize {
    let idx = sq.to_index();
    if color == Color::White {
        idx ^ 56
    } else {
        idx
    }
}

/// Game phase: `PHASE_MAX` with all minor and major pieces on the board, 0 with none.
pub fn game_phase(board: &Board) -> i32 {
    const WEIGHTS: [(Piece, i32); 4] = [
        (Piece::Knight, 1),
        (Piece::Bishop, 1),
        (Piece::Rook, 2),
        (Piece::Queen, 4),
    ];
    const TOTAL: i32 = 4 + 4 + 8 + 8;

    let present: i32 = WEIGHTS
        .iter()
        .map(|&(piece, w)| board.pieces(piece).popcnt() as i32 * w)
        .sum();
    ((present.min(TOTAL) * PHASE_MAX + TOTAL / 2) / TOTAL).clamp(0, PHASE_MAX)
}

/// Blend a middlegame and an endgame value by phase.
#[inline]
pub fn taper(mg: i32, eg: i32, phase: i32) -> i32 {
    (mg * phase + eg * (PHASE_MAX - phase)) / PHASE_MAX
}

/// Absolute material test used to switch king tables and endgame terms.
#[inline]
pub fn is_endgame(board: &Board) -> bool {
    non_pawn_material(board, Color::White) + non_pawn_material(board, Color::Black) <= ENDGAME_MATERIAL
}

/// Piece-square value for one piece, from its owner's point of view.
pub fn square_value(piece: Piece, sq: Square, color: Color, phase: i32, endgame: bool) -> i32 {
    let idx = pst_index(sq, color);
    match piece {
        Piece::Pawn => taper(PAWN_MG[idx], PAWN_EG[idx], phase),
        Piece::Knight => KNIGHT[idx],
        Piece::Bishop => BISHOP[idx],
        Piece::Rook => ROOK[idx],
        Piece::Queen => QUEEN[idx],
        Piece::King => {
            if endgame {
                KING_EG[idx]
            } else {
                KING_MG[idx]
            }
        }
    }
}
