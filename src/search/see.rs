//! Static Exchange Evaluation (SEE)
//!
//! Plays out the capture sequence on one square, cheapest attacker first,
//! and reports the material balance for the side making the first move.
//! Used for move ordering, quiescence pruning and to spot moves that simply
//! leave a piece en prise.

use crate::types::{
    attackers_to, captured_piece, is_en_passant, piece_value, BitBoard, Board, Move, Piece,
    Square, EMPTY,
};

const MAX_EXCHANGE: usize = 32;

const BY_VALUE: [Piece; 6] = [
    Piece::Pawn,
    Piece::Knight,
    Piece::Bishop,
    Piece::Rook,
    Piece::Queen,
    Piece::King,
];

/// Cheapest piece in `attackers`.
fn least_valuable(board: &Board, attackers: BitBoard) -> Option<(Square, Piece)> {
    BY_VALUE.iter().find_map(|&piece| {
        let set = attackers & *board.pieces(piece);
        if set == EMPTY {
            None
        } else {
            Some((set.to_square(), piece))
        }
    })
}

/// Static Exchange Evaluation.
///
/// For a quiet move this is zero or the loss of the moved piece when the
/// destination is attacked and not adequately covered.
pub fn see(board: &Board, mv: Move) -> i32 {
    let from = mv.get_source();
    let to = mv.get_dest();
    let Some(mover) = board.piece_on(from) else {
        return 0;
    };

    let mut gain = [0i32; MAX_EXCHANGE];
    gain[0] = captured_piece(board, mv).map(piece_value).unwrap_or(0);
    let mut on_square = piece_value(mover);
    if let Some(promo) = mv.get_promotion() {
        gain[0] += piece_value(promo) - piece_value(Piece::Pawn);
        on_square = piece_value(promo);
    }

    let mut occupied = *board.combined() ^ BitBoard::from_square(from);
    if is_en_passant(board, mv) {
        let victim = Square::make_square(from.get_rank(), to.get_file());
        occupied ^= BitBoard::from_square(victim);
    }

    let mut side = !board.side_to_move();
    let mut depth = 0;
    loop {
        let attackers = attackers_to(board, to, side, occupied);
        let Some((sq, piece)) = least_valuable(board, attackers) else {
            break;
        };
        // The king may only recapture onto an undefended square
        if piece == Piece::King
            && attackers_to(board, to, !side, occupied ^ BitBoard::from_square(sq)) != EMPTY
        {
            break;
        }
        depth += 1;
        if depth >= MAX_EXCHANGE {
            break;
        }
        gain[depth] = on_square - gain[depth - 1];
        if (-gain[depth - 1]).max(gain[depth]) < 0 {
            break;
        }
        on_square = piece_value(piece);
        occupied ^= BitBoard::from_square(sq);
        side = !side;
    }

    while depth > 0 {
        gain[depth - 1] = -(-gain[depth - 1]).max(gain[depth]);
        depth -= 1;
    }
    gain[0]
}

/// Check if SEE is greater than or equal to threshold
#[inline]
pub fn see_ge(board: &Board, mv: Move, threshold: i32) -> bool {
    see(board, mv) >= threshold
}

/// Check if a capture does not lose material (SEE >= 0)
#[inline]
pub fn is_good_capture(board: &Board, mv: Move) -> bool {
    see_ge(board, mv, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn see_of(fen: &str, from: Square, to: Square) -> i32 {
        let board = Board::from_str(fen).unwrap();
        see(&board, Move::new(from, to, None))
    }

    #[test]
    fn test_free_piece() {
        assert_eq!(see_of("4k3/8/8/3n4/4P3/8/8/4K3 w - - 0 1", Square::E4, Square::D5), 320);
    }

    #[test]
    fn test_defended_pawn_loses_queen() {
        assert_eq!(see_of("4k3/8/2p5/3p4/8/8/3Q4/4K3 w - - 0 1", Square::D2, Square::D5), -800);
    }

    #[test]
    fn test_xray_support() {
        // Doubled rooks win the pawn; black declines to recapture
        assert_eq!(see_of("4k3/3r4/8/3p4/8/8/3R4/3RK3 w - - 0 1", Square::D2, Square::D5), 100);
    }

    #[test]
    fn test_en_passant() {
        assert_eq!(see_of("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1", Square::E5, Square::D6), 100);
    }

    #[test]
    fn test_quiet_move_into_attack() {
        // Knight steps onto a square covered by a pawn
        assert_eq!(see_of("4k3/8/2p5/8/8/4N3/8/4K3 w - - 0 1", Square::E3, Square::D5), -320);
        assert_eq!(see_of("4k3/8/8/8/8/4N3/8/4K3 w - - 0 1", Square::E3, Square::D5), 0);
    }

    #[test]
    fn test_king_cannot_recapture_defended() {
        // Rxd2 is covered by the bishop, so the king may not take back
        let fen = "3rk3/8/8/8/5b2/8/3P4/4K3 b - - 0 1";
        assert_eq!(see_of(fen, Square::D8, Square::D2), 100);
    }
}
