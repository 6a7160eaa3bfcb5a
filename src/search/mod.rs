//! Search module for the chess engine.
//!
//! # Architecture
//! - `Searcher`: Main search controller with state management
//! - `negamax`: Principal variation search with null move pruning and LMR
//! - `qsearch`: Capture resolution at the horizon
//! - `ordering`: Move ordering heuristics (SEE, MVV-LVA, killers, history, counter-moves)
//! - `tt`: Capacity-bounded transposition table
//! - `limits`: Search limits and the search clock
//!
//! A `Searcher` is single-threaded and owns all of its tables. One instance
//! must never be driven from two threads at once; run one per game instead.

mod countermove;
mod history;
mod killers;
mod limits;
mod negamax;
mod node_types;
mod ordering;
mod qsearch;
mod see;
mod tt;

pub use countermove::CounterMoveTable;
pub use history::{HistoryTable, HISTORY_MAX};
pub use killers::KillerTable;
pub use limits::{clock_budget, SearchClock, SearchLimits, DEFAULT_MOVES_TO_GO};
pub use ordering::{mvv_lva, MoveOrderer, MovePicker, OrderingTier};
pub use qsearch::MAX_QSEARCH_DEPTH;
pub use see::{is_good_capture, see, see_ge};
pub use tt::{BoundType, TTEntry, TranspositionTable};

use crate::eval::Evaluator;
use crate::types::{Board, Depth, Hash, Move, MoveGen, NodeCount, Ply, Score, EMPTY, MAX_PLY};
use log::debug;
use node_types::{OnPV, Root};
use std::time::Duration;

/// Half-width of the aspiration window in centipawns
const ASPIRATION_WINDOW: i32 = 50;

/// Search statistics collected during search
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    pub nodes: NodeCount,
    pub qnodes: NodeCount,
    pub seldepth: Ply,
    pub cutoffs: u64,
    pub tt_probes: u64,
    pub tt_hits: u64,
    /// Full-window searches after the aspiration window missed
    pub aspiration_researches: u64,
    pub null_cutoffs: u64,
    /// Late moves searched one ply shallower
    pub reductions: u64,
    /// Reduced moves that beat alpha and were searched again at full depth
    pub lmr_researches: u64,
    pub time_ms: u64,
}

impl SearchStats {
    pub fn nps(&self) -> u64 {
        if self.time_ms > 0 {
            (self.nodes + self.qnodes) * 1000 / self.time_ms
        } else {
            0
        }
    }

    /// Fraction of probes that found an entry
    pub fn tt_hit_rate(&self) -> f64 {
        if self.tt_probes == 0 {
            0.0
        } else {
            self.tt_hits as f64 / self.tt_probes as f64
        }
    }
}

/// Result from a search
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Absent only when the position has no legal moves
    pub best_move: Option<Move>,
    /// Side-to-move relative
    pub score: Score,
    /// Deepest fully completed iteration
    pub depth: Depth,
    pub nodes: NodeCount,
    pub elapsed: Duration,
    pub pv: Vec<Move>,
    pub stats: SearchStats,
}

/// Main search controller
pub struct Searcher {
    tt: TranspositionTable,
    orderer: MoveOrderer,
    evaluator: Evaluator,
    stats: SearchStats,
    /// Triangular principal variation table, one line per ply
    pv_table: Vec<Vec<Move>>,
    clock: SearchClock,
    stopped: bool,
}

impl Searcher {
    pub fn new(hash_mb: usize, evaluator: Evaluator, tier: OrderingTier) -> Self {
        Self {
            tt: TranspositionTable::new(hash_mb),
            orderer: MoveOrderer::new(tier),
            evaluator,
            stats: SearchStats::default(),
            pv_table: vec![Vec::new(); MAX_PLY as usize + 1],
            clock: SearchClock::start(None),
            stopped: false,
        }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn set_evaluator(&mut self, evaluator: Evaluator) {
        self.evaluator = evaluator;
    }

    pub fn set_ordering_tier(&mut self, tier: OrderingTier) {
        self.orderer.set_tier(tier);
    }

    /// Seed for evaluation noise and shuffled ordering.
    pub fn set_salt(&mut self, salt: u64) {
        self.evaluator.set_salt(salt);
        self.orderer.set_salt(salt.rotate_left(17));
    }

    pub fn resize_tt(&mut self, hash_mb: usize) {
        self.tt = TranspositionTable::new(hash_mb);
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Get current statistics
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Reset per-search state so results depend only on the inputs.
    fn reset(&mut self, budget: Option<Duration>) {
        self.tt.clear();
        self.orderer.clear();
        self.stats = SearchStats::default();
        for line in &mut self.pv_table {
            line.clear();
        }
        self.stopped = false;
        self.clock = SearchClock::start(budget);
    }

    /// Run an iterative-deepening search.
    ///
    /// Returns the best move of the deepest completed iteration. If not even
    /// the first iteration completes, the first move in ordering is returned.
    pub fn search(&mut self, board: &Board, limits: SearchLimits) -> SearchResult {
        self.reset(limits.time_budget);

        let moves: Vec<Move> = MoveGen::new_legal(board).collect();
        if moves.is_empty() {
            let score = if *board.checkers() != EMPTY {
                Score::mated_in(0)
            } else {
                Score::draw()
            };
            return self.finish(None, score, Depth::ZERO, Vec::new());
        }

        let ordered = self.orderer.order(board, &moves, Ply::ZERO, None, None);
        let mut best_move = ordered.first().copied();
        let mut best_score = self.evaluator.evaluate(board);
        let mut pv: Vec<Move> = best_move.into_iter().collect();
        let mut completed = Depth::ZERO;

        for d in 1..=limits.max_depth.raw() {
            if self.check_stop() {
                break;
            }
            self.tt.new_generation();
            let depth = Depth::new(d);

            let score = if d >= 3 && !best_score.is_mate_score() {
                self.aspiration_search(board, depth, best_score)
            } else {
                self.search_root(board, depth, Score::neg_infinity(), Score::infinity())
            };

            if self.stopped {
                break;
            }

            best_score = score;
            completed = depth;
            if let Some(&m) = self.pv_table[0].first() {
                best_move = Some(m);
                pv = self.pv_table[0].clone();
            }

            debug!(
                "depth {} score {} nodes {} time {}ms pv {}",
                d,
                best_score,
                self.stats.nodes + self.stats.qnodes,
                self.clock.elapsed().as_millis(),
                pv.iter().map(|m| m.to_string()).collect::<Vec<_>>().join(" ")
            );

            // A mate inside the horizon will not change with more depth
            if let Some(distance) = best_score.mate_distance() {
                if distance <= d {
                    break;
                }
            }
        }

        self.finish(best_move, best_score, completed, pv)
    }

    /// Root search in a narrow window around `guess`, widened to the full
    /// range when the result falls outside it.
    fn aspiration_search(&mut self, board: &Board, depth: Depth, guess: Score) -> Score {
        let alpha = guess - Score::cp(ASPIRATION_WINDOW);
        let beta = guess + Score::cp(ASPIRATION_WINDOW);
        let score = self.search_root(board, depth, alpha, beta);
        if self.stopped || (score > alpha && score < beta) {
            return score;
        }
        debug!("aspiration miss at depth {} ({}), re-searching", depth.raw(), score);
        self.stats.aspiration_researches += 1;
        self.search_root(board, depth, Score::neg_infinity(), Score::infinity())
    }

    fn search_root(&mut self, board: &Board, depth: Depth, alpha: Score, beta: Score) -> Score {
        negamax::search::<Root>(self, board, depth, Ply::ZERO, alpha, beta, true, None)
    }

    fn finish(&mut self, best_move: Option<Move>, score: Score, depth: Depth, pv: Vec<Move>) -> SearchResult {
        let elapsed = self.clock.elapsed();
        self.stats.time_ms = elapsed.as_millis() as u64;
        SearchResult {
            best_move,
            score,
            depth,
            nodes: self.stats.nodes + self.stats.qnodes,
            elapsed,
            pv,
            stats: self.stats.clone(),
        }
    }

    /// Score every legal move with a fixed-depth full-window search, best
    /// first. No time limit; meant for shallow depths.
    pub fn rank_moves(&mut self, board: &Board, depth: Depth) -> Vec<(Move, Score)> {
        self.reset(None);
        let moves: Vec<Move> = MoveGen::new_legal(board).collect();
        let child_depth = Depth::new(depth.raw() - 1);
        let mut ranked: Vec<(Move, Score)> = moves
            .into_iter()
            .map(|m| {
                let child = board.make_move_new(m);
                let score = -negamax::search::<OnPV>(
                    self,
                    &child,
                    child_depth,
                    Ply::new(1),
                    Score::neg_infinity(),
                    Score::infinity(),
                    true,
                    Some(m),
                );
                (m, score)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    // === Hooks used by the recursive search ===

    /// Check the clock; latches once the budget is gone.
    #[inline]
    pub(crate) fn check_stop(&mut self) -> bool {
        if !self.stopped && self.clock.expired() {
            self.stopped = true;
        }
        self.stopped
    }

    #[inline]
    pub(crate) fn stopped(&self) -> bool {
        self.stopped
    }

    #[inline]
    pub(crate) fn inc_nodes(&mut self) {
        self.stats.nodes += 1;
    }

    #[inline]
    pub(crate) fn inc_qnodes(&mut self) {
        self.stats.qnodes += 1;
    }

    #[inline]
    pub(crate) fn record_cutoff(&mut self) {
        self.stats.cutoffs += 1;
    }

    #[inline]
    pub(crate) fn record_null_cutoff(&mut self) {
        self.stats.null_cutoffs += 1;
    }

    #[inline]
    pub(crate) fn record_reduction(&mut self) {
        self.stats.reductions += 1;
    }

    #[inline]
    pub(crate) fn record_lmr_research(&mut self) {
        self.stats.lmr_researches += 1;
    }

    #[inline]
    pub(crate) fn update_seldepth(&mut self, ply: Ply) {
        if ply > self.stats.seldepth {
            self.stats.seldepth = ply;
        }
    }

    #[inline]
    pub(crate) fn evaluate(&self, board: &Board) -> Score {
        self.evaluator.evaluate(board)
    }

    #[inline]
    pub(crate) fn orderer(&self) -> &MoveOrderer {
        &self.orderer
    }

    #[inline]
    pub(crate) fn orderer_mut(&mut self) -> &mut MoveOrderer {
        &mut self.orderer
    }

    pub(crate) fn probe_tt(
        &mut self,
        hash: Hash,
        depth: Depth,
        alpha: Score,
        beta: Score,
        ply: Ply,
    ) -> (Option<Score>, Option<Move>) {
        self.stats.tt_probes += 1;
        if self.tt.get(hash).is_some() {
            self.stats.tt_hits += 1;
        }
        self.tt.probe(hash, depth, alpha, beta, ply.raw())
    }

    pub(crate) fn store_tt(
        &mut self,
        hash: Hash,
        depth: Depth,
        score: Score,
        bound: BoundType,
        best_move: Option<Move>,
        ply: Ply,
    ) {
        self.tt.store(hash, depth, score, bound, best_move, ply.raw());
    }

    #[inline]
    pub(crate) fn clear_pv(&mut self, ply: Ply) {
        if let Some(line) = self.pv_table.get_mut(ply.as_index()) {
            line.clear();
        }
    }

    /// pv[ply] = m followed by pv[ply + 1]
    pub(crate) fn update_pv(&mut self, ply: Ply, m: Move) {
        let idx = ply.as_index();
        if idx + 1 >= self.pv_table.len() {
            return;
        }
        let (head, tail) = self.pv_table.split_at_mut(idx + 1);
        let line = &mut head[idx];
        line.clear();
        line.push(m);
        line.extend_from_slice(&tail[0]);
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(16, Evaluator::clean(), OrderingTier::Full)
    }
}
