//! Principal variation search in the negamax framework.
//!
//! This is the core search algorithm with:
//! - Transposition table probing and storing
//! - PVS with null-window scouts and full-window re-searches
//! - Null move pruning (R = 3)
//! - Late move reductions for quiet moves
//! - Check extensions
//! - Quiescence search at the horizon

use super::node_types::{NodeType, OffPV};
use super::qsearch::quiescence;
use super::tt::BoundType;
use super::Searcher;
use crate::position::has_insufficient_material;
use crate::types::{
    is_quiet, non_pawn_material, Board, Depth, Move, MoveGen, Ply, Score, EMPTY, MAX_PLY,
};

/// Null move depth reduction
const NULL_MOVE_R: i32 = 3;

/// Moves searched at full depth before reductions start
const LMR_FULL_DEPTH_MOVES: usize = 3;

/// Remaining depth above which late moves may be reduced
const LMR_MIN_DEPTH: i32 = 2;

/// Negamax search with alpha-beta pruning.
///
/// `last_move` is the move that led here, used for counter-move ordering.
pub fn search<NT: NodeType>(
    searcher: &mut Searcher,
    board: &Board,
    mut depth: Depth,
    ply: Ply,
    mut alpha: Score,
    beta: Score,
    allow_null: bool,
    last_move: Option<Move>,
) -> Score {
    if !NT::ROOT && searcher.check_stop() {
        return Score::draw();
    }
    if NT::PV {
        searcher.clear_pv(ply);
    }

    let in_check = *board.checkers() != EMPTY;

    // === Check Extension ===
    if in_check && ply.raw() < MAX_PLY / 2 {
        depth = depth + 1;
    }

    if depth.is_qs() {
        return quiescence::<NT>(searcher, board, ply, alpha, beta, 0);
    }

    searcher.inc_nodes();
    searcher.update_seldepth(ply);

    if !NT::ROOT {
        if has_insufficient_material(board) {
            return Score::draw();
        }
        if ply.raw() >= MAX_PLY - 1 {
            return searcher.evaluate(board);
        }
    }

    let orig_alpha = alpha;
    let hash = board.get_hash();

    // === TT Probe ===
    let (tt_score, tt_move) = searcher.probe_tt(hash, depth, alpha, beta, ply);
    if !NT::PV {
        if let Some(score) = tt_score {
            return score;
        }
    }

    // === Null Move Pruning ===
    // Skip if: on the PV, in check, depth too low, or only king+pawns (zugzwang risk)
    if !NT::PV
        && allow_null
        && !in_check
        && depth.raw() >= 3
        && non_pawn_material(board, board.side_to_move()) > 0
    {
        if let Some(null_board) = board.null_move() {
            let reduced = Depth::new(depth.raw() - 1 - NULL_MOVE_R).reduced(0);
            let null_score = -search::<OffPV>(
                searcher,
                &null_board,
                reduced,
                ply.next(),
                -beta,
                -beta + Score::cp(1),
                false, // Don't allow consecutive null moves
                None,
            );

            if searcher.stopped() {
                return Score::draw();
            }
            if null_score >= beta {
                searcher.record_null_cutoff();
                return beta;
            }
        }
    }

    let moves: Vec<Move> = MoveGen::new_legal(board).collect();

    // Checkmate or stalemate
    if moves.is_empty() {
        return if in_check {
            Score::mated_in(ply.raw())
        } else {
            Score::draw()
        };
    }

    let mut picker = searcher.orderer().picker(board, &moves, ply, tt_move, last_move);

    let mut best_move = None;
    let mut best_score = Score::neg_infinity();

    while let Some(m) = picker.next() {
        let index = picker.move_index();
        if NT::PV {
            searcher.clear_pv(ply.next());
        }
        let new_board = board.make_move_new(m);
        let quiet = is_quiet(board, m);
        let gives_check = *new_board.checkers() != EMPTY;

        let score = if index == 0 {
            -search::<NT::Next>(searcher, &new_board, depth - 1, ply.next(), -beta, -alpha, true, Some(m))
        } else {
            // === Late Move Reduction ===
            let reduction = if depth.raw() > LMR_MIN_DEPTH
                && index >= LMR_FULL_DEPTH_MOVES
                && quiet
                && !gives_check
                && !in_check
            {
                1
            } else {
                0
            };

            if reduction > 0 {
                searcher.record_reduction();
            }

            let null_window = -alpha - Score::cp(1);
            let mut score = -search::<OffPV>(
                searcher,
                &new_board,
                depth - 1 - reduction,
                ply.next(),
                null_window,
                -alpha,
                true,
                Some(m),
            );

            // Reduced search beat alpha: verify at full depth
            if reduction > 0 && score > alpha && !searcher.stopped() {
                searcher.record_lmr_research();
                score = -search::<OffPV>(searcher, &new_board, depth - 1, ply.next(), null_window, -alpha, true, Some(m));
            }

            // Scout failed high inside the window: full re-search on the PV
            if NT::PV && score > alpha && score < beta && !searcher.stopped() {
                score = -search::<NT::Next>(searcher, &new_board, depth - 1, ply.next(), -beta, -alpha, true, Some(m));
            }
            score
        };

        if searcher.stopped() {
            return Score::draw();
        }

        if score > best_score {
            best_score = score;
            best_move = Some(m);

            if score > alpha {
                alpha = score;
                if NT::PV {
                    searcher.update_pv(ply, m);
                }

                if score >= beta {
                    searcher.record_cutoff();
                    if quiet {
                        searcher.orderer_mut().record_cutoff(m, ply, depth.raw(), last_move);
                    }
                    break;
                }
            }
        }
    }

    // === TT Store ===
    let bound = if best_score >= beta {
        BoundType::LowerBound
    } else if best_score > orig_alpha {
        BoundType::Exact
    } else {
        BoundType::UpperBound
    };
    searcher.store_tt(hash, depth, best_score, bound, best_move, ply);

    best_score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchLimits;
    use std::str::FromStr;

    const MIDDLEGAME: &str = "r1bq1rk1/pp2bppp/2n1pn2/3p4/2PP4/2N1PN2/PP3PPP/R2QKB1R w KQ - 0 12";

    fn board(fen: &str) -> Board {
        Board::from_str(fen).unwrap()
    }

    fn scout(searcher: &mut Searcher, b: &Board, depth: i32, beta: Score, allow_null: bool) -> Score {
        let alpha = beta - Score::cp(1);
        search::<OffPV>(searcher, b, Depth::new(depth), Ply::new(1), alpha, beta, allow_null, None)
    }

    #[test]
    fn test_null_move_cuts_when_far_ahead() {
        // White is a queen and a rook up
        let b = board("4k3/8/8/8/8/8/8/R2QK3 w - - 0 1");
        let mut searcher = Searcher::default();
        let score = scout(&mut searcher, &b, 3, Score::cp(1), true);
        assert_eq!(score, Score::cp(1));
        assert_eq!(searcher.stats().null_cutoffs, 1);
    }

    #[test]
    fn test_null_move_respects_guards() {
        let mut searcher = Searcher::default();
        let b = board("4k3/8/8/8/8/8/8/R2QK3 w - - 0 1");
        let score = scout(&mut searcher, &b, 3, Score::cp(1), false);
        assert!(score >= Score::cp(1));
        assert_eq!(searcher.stats().null_cutoffs, 0);

        // King and pawns only: zugzwang territory
        let mut searcher = Searcher::default();
        let pawns = board("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        scout(&mut searcher, &pawns, 3, Score::cp(-4999), true);
        assert_eq!(searcher.stats().null_cutoffs, 0);

        // Depth below 3
        let mut searcher = Searcher::default();
        scout(&mut searcher, &b, 2, Score::cp(1), true);
        assert_eq!(searcher.stats().null_cutoffs, 0);
    }

    #[test]
    fn test_late_moves_reduced_and_verified() {
        let b = board(MIDDLEGAME);
        let mut searcher = Searcher::default();
        let result = searcher.search(&b, SearchLimits::depth(5));
        let stats = &result.stats;
        assert!(stats.reductions > 0);
        assert!(stats.lmr_researches > 0);
        assert!(stats.lmr_researches <= stats.reductions);
    }

    #[test]
    fn test_no_reductions_at_shallow_depth() {
        let b = board(MIDDLEGAME);
        let mut searcher = Searcher::default();
        let result = searcher.search(&b, SearchLimits::depth(LMR_MIN_DEPTH));
        assert_eq!(result.stats.reductions, 0);
    }
}
