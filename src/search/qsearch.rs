//! Quiescence search - resolve captures to avoid the horizon effect.
//!
//! When the main search reaches depth 0, we keep searching captures and
//! promotions (plus quiet checks at the first level, and every evasion while
//! in check) so we don't stop in the middle of a tactical sequence.
//!
//! Implements delta pruning to skip hopeless captures, and a hard cap on the
//! number of extra plies.
//!
//! Uses compile-time node type specialization via the `NodeType` trait.

use super::node_types::NodeType;
use super::ordering::MovePicker;
use super::see::is_good_capture;
use super::Searcher;
use crate::types::{captured_piece, is_capture, piece_value, Board, Move, MoveGen, Piece, Ply, Score, EMPTY, MAX_PLY};

/// Extra plies allowed beyond the nominal depth.
pub const MAX_QSEARCH_DEPTH: i32 = 8;

/// If even winning a queen cannot reach alpha, give up on the node
const BIG_DELTA: i32 = 900 + 200;

/// Safety margin for individual move delta pruning
const DELTA_SAFETY: i32 = 200;

/// Quiescence search.
///
/// `qdepth` counts plies already spent in quiescence.
pub fn quiescence<NT: NodeType>(
    searcher: &mut Searcher,
    board: &Board,
    ply: Ply,
    mut alpha: Score,
    beta: Score,
    qdepth: i32,
) -> Score {
    if searcher.check_stop() {
        return Score::draw();
    }
    searcher.inc_qnodes();
    searcher.update_seldepth(ply);
    if NT::PV {
        searcher.clear_pv(ply);
    }

    let in_check = *board.checkers() != EMPTY;
    let stand_pat = searcher.evaluate(board);

    if qdepth >= MAX_QSEARCH_DEPTH || ply.raw() >= MAX_PLY - 1 {
        return stand_pat;
    }

    if !in_check {
        // Beta cutoff: position is already too good
        if stand_pat >= beta {
            return beta;
        }

        // === Delta Pruning (Big Delta) ===
        if stand_pat.raw() + BIG_DELTA < alpha.raw() {
            return alpha;
        }

        if stand_pat > alpha {
            alpha = stand_pat;
        }
    }

    let moves: Vec<Move> = MoveGen::new_legal(board)
        .filter(|&m| {
            in_check
                || is_capture(board, m)
                || m.get_promotion().is_some()
                || (qdepth == 0 && *board.make_move_new(m).checkers() != EMPTY)
        })
        .collect();

    if moves.is_empty() {
        if in_check {
            // Every evasion was generated, so this is mate
            return Score::mated_in(ply.raw());
        }
        return alpha;
    }

    let mut picker = MovePicker::captures(board, &moves);
    let mut best_score = if in_check { Score::neg_infinity() } else { stand_pat };

    while let Some(m) = picker.next() {
        if !in_check && is_capture(board, m) {
            // === Delta Pruning (Per-Move) ===
            // Promotions gain material beyond the victim, so never prune them
            if m.get_promotion().is_none() {
                let gain = captured_piece(board, m).map(piece_value).unwrap_or(0);
                if stand_pat.raw() + gain + DELTA_SAFETY < alpha.raw() {
                    continue;
                }
            }

            // === SEE Pruning ===
            if !is_good_capture(board, m) {
                continue;
            }
        }

        // Underpromotions only matter when escaping check
        if !in_check && matches!(m.get_promotion(), Some(p) if p != Piece::Queen) {
            continue;
        }

        if NT::PV {
            searcher.clear_pv(ply.next());
        }
        let new_board = board.make_move_new(m);
        let score = -quiescence::<NT::Next>(searcher, &new_board, ply.next(), -beta, -alpha, qdepth + 1);

        if searcher.stopped() {
            return Score::draw();
        }

        if score > best_score {
            best_score = score;

            if score > alpha {
                alpha = score;
                if NT::PV {
                    searcher.update_pv(ply, m);
                }
                if score >= beta {
                    break;
                }
            }
        }
    }

    best_score
}
