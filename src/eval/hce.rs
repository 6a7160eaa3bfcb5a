//! Hand-crafted evaluation terms.
//!
//! Every term is computed from white's point of view and reported separately
//! so the [`Evaluator`](super::Evaluator) can weight each one by rating and
//! personality before summing.

use crate::types::{
    attackers_to, piece_value, Board, BitBoard, Color, File, MoveGen, Piece, Rank, Square, EMPTY,
    NON_PAWN_PIECES,
};

use super::pst::{game_phase, is_endgame, square_value};

const BISHOP_PAIR_BONUS: i32 = 30;
const DOUBLED_PAWN_PENALTY: i32 = -10;
const ISOLATED_PAWN_PENALTY: i32 = -20;
const PASSED_PAWN_BONUS: [i32; 8] = [0, 10, 20, 40, 60, 90, 130, 0]; // by relative rank

const SHIELD_PAWN_BONUS: i32 = 12;
const MISSING_SHIELD_PENALTY: i32 = -15;
const CENTRAL_KING_PENALTY: i32 = -35;
const KING_ATTACKER_WEIGHT: i32 = 8;

const MOBILITY_WEIGHT: i32 = 4;
const CENTER_CONTROL_WEIGHT: i32 = 10;

const FORK_BONUS: i32 = 40;
const PIN_BONUS: i32 = 20;

const KING_CENTRALIZATION_WEIGHT: i32 = 6;

/// d4, e4, d5, e5
const CENTER: BitBoard = BitBoard(0x0000_0018_1800_0000);

/// Which of the expensive terms are switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalFeatures {
    pub tactics: bool,
    pub mobility: bool,
    pub king_attackers: bool,
}

impl EvalFeatures {
    pub const ALL: EvalFeatures = EvalFeatures {
        tactics: true,
        mobility: true,
        king_attackers: true,
    };

    /// Weaker ratings are blind to the costlier terms.
    pub fn for_rating(rating: u32) -> Self {
        EvalFeatures {
            tactics: rating >= 800,
            mobility: rating >= 1000,
            king_attackers: rating >= 1200,
        }
    }
}

impl Default for EvalFeatures {
    fn default() -> Self {
        EvalFeatures::ALL
    }
}

/// Per-term scores, white-relative centipawns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalBreakdown {
    pub material: i32,
    pub positional: i32,
    pub tactical: i32,
    pub king_safety: i32,
    pub king_attack: i32,
    pub mobility: i32,
    pub pawn_structure: i32,
    pub endgame: i32,
}

impl EvalBreakdown {
    pub fn total(&self) -> i32 {
        self.material
            + self.positional
            + self.tactical
            + self.king_safety
            + self.king_attack
            + self.mobility
            + self.pawn_structure
            + self.endgame
    }
}

#[inline]
fn sign(color: Color) -> i32 {
    if color == Color::White {
        1
    } else {
        -1
    }
}

#[inline]
fn ours(board: &Board, piece: Piece, color: Color) -> BitBoard {
    *board.pieces(piece) & *board.color_combined(color)
}

/// Rank counted from `color`'s own back rank (0..=7).
#[inline]
fn relative_rank(sq: Square, color: Color) -> usize {
    let r = sq.get_rank().to_index();
    if color == Color::White {
        r
    } else {
        7 - r
    }
}

/// All terms for a position.
pub fn breakdown(board: &Board, features: EvalFeatures) -> EvalBreakdown {
    let phase = game_phase(board);
    let endgame = is_endgame(board);
    let mut out = EvalBreakdown::default();

    for &color in &[Color::White, Color::Black] {
        let s = sign(color);
        out.material += s * material(board, color);
        out.positional += s * positional(board, color, phase, endgame);
        out.pawn_structure += s * pawn_structure(board, color);
        if !endgame {
            out.king_safety += s * king_shelter(board, color);
            if features.king_attackers {
                out.king_attack -= s * king_attackers(board, color);
            }
        } else {
            out.endgame += s * endgame_factors(board, color);
        }
        if features.tactics {
            out.tactical += s * tactics(board, color);
        }
    }

    if features.mobility {
        out.mobility = mobility(board) + space(board);
    }
    out
}

fn material(board: &Board, color: Color) -> i32 {
    let mut score = ours(board, Piece::Pawn, color).popcnt() as i32 * piece_value(Piece::Pawn);
    for &piece in &NON_PAWN_PIECES {
        score += ours(board, piece, color).popcnt() as i32 * piece_value(piece);
    }
    if ours(board, Piece::Bishop, color).popcnt() >= 2 {
        score += BISHOP_PAIR_BONUS;
    }
    score
}

fn positional(board: &Board, color: Color, phase: i32, endgame: bool) -> i32 {
    let mut score = 0;
    for &piece in &[Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King] {
        for sq in ours(board, piece, color) {
            score += square_value(piece, sq, color, phase, endgame);
        }
    }
    score
}

/// Pawns of `color` in the files next to `file`.
#[inline]
fn adjacent_pawns(board: &Board, color: Color, file: File) -> BitBoard {
    ours(board, Piece::Pawn, color) & chess::get_adjacent_files(file)
}

/// Squares strictly in front of `sq` from `color`'s point of view.
fn front_span(sq: Square, color: Color) -> BitBoard {
    let rank = sq.get_rank().to_index() as u32;
    if color == Color::White {
        if rank >= 7 {
            EMPTY
        } else {
            BitBoard(!0u64 << ((rank + 1) * 8))
        }
    } else {
        BitBoard((1u64 << (rank * 8)) - 1)
    }
}

pub fn is_passed_pawn(board: &Board, sq: Square, color: Color) -> bool {
    let file = sq.get_file();
    let files = chess::get_file(file) | chess::get_adjacent_files(file);
    ours(board, Piece::Pawn, !color) & files & front_span(sq, color) == EMPTY
}

fn is_isolated_pawn(board: &Board, sq: Square, color: Color) -> bool {
    adjacent_pawns(board, color, sq.get_file()) == EMPTY
}

/// Doubled and isolated penalties plus the base passed-pawn bonus.
fn pawn_structure(board: &Board, color: Color) -> i32 {
    let pawns = ours(board, Piece::Pawn, color);
    let mut score = 0;
    for sq in pawns {
        if (pawns & chess::get_file(sq.get_file())).popcnt() > 1 {
            score += DOUBLED_PAWN_PENALTY;
        }
        if is_isolated_pawn(board, sq, color) {
            score += ISOLATED_PAWN_PENALTY;
        }
        if is_passed_pawn(board, sq, color) {
            score += PASSED_PAWN_BONUS[relative_rank(sq, color)];
        }
    }
    score
}

/// Pawn shield in front of the king and the central-file penalty.
fn king_shelter(board: &Board, color: Color) -> i32 {
    let king = board.king_square(color);
    let file = king.get_file();
    let shield_files = chess::get_file(file) | chess::get_adjacent_files(file);

    let rank = relative_rank(king, color);
    let mut shield_ranks = EMPTY;
    for step in 1..=2 {
        let r = rank + step;
        if r <= 7 {
            let absolute = if color == Color::White { r } else { 7 - r };
            shield_ranks |= chess::get_rank(Rank::from_index(absolute));
        }
    }

    let shield = (ours(board, Piece::Pawn, color) & shield_files & shield_ranks).popcnt() as i32;
    let expected = shield_files.popcnt() as i32 / 8;
    let mut score = shield.min(expected) * SHIELD_PAWN_BONUS + (expected - shield).max(0) * MISSING_SHIELD_PENALTY;

    if file == File::D || file == File::E {
        score += CENTRAL_KING_PENALTY;
    }
    score
}

/// Enemy pieces bearing on the king zone; returned as a penalty magnitude for `color`.
fn king_attackers(board: &Board, color: Color) -> i32 {
    let king = board.king_square(color);
    let zone = chess::get_king_moves(king) | BitBoard::from_square(king);
    let occupied = *board.combined();
    let enemy = !color;

    let mut attackers = EMPTY;
    for sq in zone {
        attackers |= attackers_to(board, sq, enemy, occupied);
    }
    let attackers = attackers & !(*board.pieces(Piece::Pawn) | *board.pieces(Piece::King));
    let count = attackers.popcnt() as i32;
    count * count * KING_ATTACKER_WEIGHT
}

/// Legal-move count differential. Skipped while in check, where the
/// opponent's count is undefined.
fn mobility(board: &Board) -> i32 {
    let Some(passed) = board.null_move() else {
        return 0;
    };
    let own = MoveGen::new_legal(board).len() as i32;
    let theirs = MoveGen::new_legal(&passed).len() as i32;
    sign(board.side_to_move()) * (own - theirs) * MOBILITY_WEIGHT
}

/// Central square control differential.
fn space(board: &Board) -> i32 {
    let occupied = *board.combined();
    let mut score = 0;
    for sq in CENTER {
        let white = attackers_to(board, sq, Color::White, occupied).popcnt() as i32;
        let black = attackers_to(board, sq, Color::Black, occupied).popcnt() as i32;
        score += (white - black).signum() * CENTER_CONTROL_WEIGHT;
    }
    score
}

/// Hanging pieces, simple forks and pins, scored for `color`.
fn tactics(board: &Board, color: Color) -> i32 {
    let occupied = *board.combined();
    let enemy = !color;
    let to_move = board.side_to_move() == color;
    let mut score = 0;

    // Our undefended or under-defended pieces; cheaper to fix when it is our move
    for &piece in &NON_PAWN_PIECES {
        for sq in ours(board, piece, color) {
            let attackers = attackers_to(board, sq, enemy, occupied);
            if attackers == EMPTY {
                continue;
            }
            let defended = attackers_to(board, sq, color, occupied) != EMPTY;
            let cheapest = cheapest_piece(board, attackers);
            if !defended || cheapest < piece_value(piece) {
                let loss = if defended { piece_value(piece) - cheapest } else { piece_value(piece) };
                score -= if to_move { loss / 8 } else { loss / 2 };
            }
        }
    }

    // Knight and pawn forks on pieces worth more than the forker, or the king
    for &forker in &[Piece::Knight, Piece::Pawn] {
        for sq in ours(board, forker, color) {
            let reach = if forker == Piece::Knight {
                chess::get_knight_moves(sq)
            } else {
                chess::get_pawn_attacks(sq, color, *board.color_combined(enemy))
            };
            let targets = (reach & *board.color_combined(enemy))
                .filter(|&t| match board.piece_on(t) {
                    Some(Piece::King) => true,
                    Some(p) => piece_value(p) > piece_value(forker),
                    None => false,
                })
                .count();
            if targets >= 2 {
                score += FORK_BONUS;
            }
        }
    }

    // Enemy pieces pinned against their king
    let enemy_pinned = if board.side_to_move() == enemy {
        Some(*board.pinned())
    } else {
        board.null_move().map(|b| *b.pinned())
    };
    if let Some(pinned) = enemy_pinned {
        score += pinned.popcnt() as i32 * PIN_BONUS;
    }
    score
}

fn cheapest_piece(board: &Board, set: BitBoard) -> i32 {
    set.map(|sq| board.piece_on(sq).map(piece_value).unwrap_or(0))
        .min()
        .unwrap_or(0)
}

/// King centralization and the endgame surcharge on passed pawns.
fn endgame_factors(board: &Board, color: Color) -> i32 {
    let king = board.king_square(color);
    let file = king.get_file().to_index() as i32;
    let rank = king.get_rank().to_index() as i32;
    // Manhattan distance to the nearest of d4/e4/d5/e5
    let dist = (3 - file).max(file - 4).max(0) + (3 - rank).max(rank - 4).max(0);
    let mut score = (6 - dist) * KING_CENTRALIZATION_WEIGHT;

    for sq in ours(board, Piece::Pawn, color) {
        if is_passed_pawn(board, sq, color) {
            score += PASSED_PAWN_BONUS[relative_rank(sq, color)];
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn board(fen: &str) -> Board {
        Board::from_str(fen).unwrap()
    }

    #[test]
    fn test_starting_position_is_balanced() {
        let b = breakdown(&Board::default(), EvalFeatures::ALL);
        assert_eq!(b.material, 0);
        assert_eq!(b.positional, 0);
        assert_eq!(b.pawn_structure, 0);
        assert_eq!(b.king_safety, 0);
    }

    #[test]
    fn test_material_advantage() {
        let b = breakdown(&board("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"), EvalFeatures::ALL);
        assert_eq!(b.material, 900);
    }

    #[test]
    fn test_passed_and_isolated_pawns() {
        let b = board("4k3/8/8/3P4/8/8/8/4K3 w - - 0 1");
        assert!(is_passed_pawn(&b, Square::D5, Color::White));
        let blocked = board("4k3/4p3/8/3P4/8/8/8/4K3 w - - 0 1");
        assert!(!is_passed_pawn(&blocked, Square::D5, Color::White));
        // A lone passer on the fifth is isolated but still a net plus
        assert_eq!(pawn_structure(&b, Color::White), PASSED_PAWN_BONUS[4] + ISOLATED_PAWN_PENALTY);
    }

    #[test]
    fn test_doubled_pawns_penalised() {
        let doubled = board("4k3/8/8/8/2P5/2P5/8/4K3 w - - 0 1");
        let split = board("4k3/8/8/8/2P5/1P6/8/4K3 w - - 0 1");
        assert!(pawn_structure(&doubled, Color::White) < pawn_structure(&split, Color::White));
    }

    #[test]
    fn test_hanging_piece_is_penalised() {
        // Undefended knight en prise with white to move
        let b = board("4k3/8/8/8/3n4/2P5/8/4K3 w - - 0 1");
        assert_eq!(tactics(&b, Color::Black), -piece_value(Piece::Knight) / 2);
    }

    #[test]
    fn test_knight_fork_detected() {
        // Knight on c7 hits the king on e8 and the rook on a8
        let b = board("r3k3/2N5/8/8/8/8/8/4K3 b - - 0 1");
        assert!(tactics(&b, Color::White) >= FORK_BONUS);
    }

    #[test]
    fn test_pawn_shield_rewarded() {
        let sheltered = board("4k3/8/8/8/8/8/5PPP/6K1 w - - 0 1");
        let bare = board("4k3/8/8/8/8/8/PPP5/6K1 w - - 0 1");
        assert!(king_shelter(&sheltered, Color::White) > king_shelter(&bare, Color::White));
    }

    #[test]
    fn test_centralised_king_in_endgame() {
        let central = board("8/8/8/3K4/8/8/8/k7 w - - 0 1");
        let corner = board("8/8/8/8/8/8/8/K6k w - - 0 1");
        assert!(endgame_factors(&central, Color::White) > endgame_factors(&corner, Color::White));
    }

    #[test]
    fn test_features_gate_terms() {
        let b = board("r3k3/2N5/8/8/8/8/8/4K3 b - - 0 1");
        let blind = breakdown(&b, EvalFeatures::for_rating(400));
        assert_eq!(blind.tactical, 0);
        assert_eq!(blind.mobility, 0);
        let sharp = breakdown(&b, EvalFeatures::for_rating(2000));
        assert_ne!(sharp.tactical, 0);
    }
}
