//! Transposition table for caching search results.
//!
//! # Design
//! - Keyed by the full Zobrist hash in an `FxHashMap`, so there are no index
//!   collisions to verify against
//! - Capacity bounded by the configured size in MB
//! - Generation-based eviction: stale generations go first, then the
//!   oldest and shallowest quarter of what is left

use crate::types::{Depth, Hash, Move, Score};
use log::trace;
use rustc_hash::FxHashMap;
use std::mem;

/// Generations older than this are the first to be evicted.
const STALE_GENERATIONS: u16 = 2;

/// Smallest table we will build, whatever the configured size.
const MIN_ENTRIES: usize = 1024;

/// Type of bound stored in TT entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundType {
    /// Exact score (PV node)
    Exact,
    /// Lower bound (fail-high, score >= beta)
    LowerBound,
    /// Upper bound (fail-low, score <= alpha)
    UpperBound,
}

/// A single entry in the transposition table.
#[derive(Debug, Clone, Copy)]
pub struct TTEntry {
    best_move: Option<Move>,
    score: Score,
    depth: Depth,
    bound: BoundType,
    generation: u16,
}

impl TTEntry {
    #[inline]
    pub fn bound(&self) -> BoundType {
        self.bound
    }

    #[inline]
    pub fn generation(&self) -> u16 {
        self.generation
    }

    /// Stored score, still in table (root-independent) form.
    #[inline]
    pub fn score(&self) -> Score {
        self.score
    }

    #[inline]
    pub fn depth(&self) -> Depth {
        self.depth
    }

    #[inline]
    pub fn best_move(&self) -> Option<Move> {
        self.best_move
    }

    /// Score usable at `depth` inside `[alpha, beta]`, adjusted to `ply`.
    fn usable_score(&self, depth: Depth, alpha: Score, beta: Score, ply: i32) -> Option<Score> {
        if self.depth < depth {
            return None;
        }
        let score = self.score.from_tt(ply);
        match self.bound {
            BoundType::Exact => Some(score),
            BoundType::LowerBound if score >= beta => Some(score),
            BoundType::UpperBound if score <= alpha => Some(score),
            _ => None,
        }
    }
}

/// Capacity-bounded transposition table.
pub struct TranspositionTable {
    entries: FxHashMap<Hash, TTEntry>,
    capacity: usize,
    generation: u16,
    size_mb: usize,
}

impl TranspositionTable {
    /// Create a new TT with given size in MB
    pub fn new(size_mb: usize) -> Self {
        let per_entry = mem::size_of::<Hash>() + mem::size_of::<TTEntry>() + 8;
        let capacity = (size_mb * 1024 * 1024 / per_entry).max(MIN_ENTRIES);
        Self::with_capacity(capacity, size_mb)
    }

    /// Create a table holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize, size_mb: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: FxHashMap::default(),
            capacity,
            generation: 0,
            size_mb,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn size_mb(&self) -> usize {
        self.size_mb
    }

    #[inline]
    pub fn generation(&self) -> u16 {
        self.generation
    }

    /// Advance the generation (once per iterative-deepening iteration).
    pub fn new_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Raw entry lookup.
    #[inline]
    pub fn get(&self, hash: Hash) -> Option<&TTEntry> {
        self.entries.get(&hash)
    }

    /// Probe for a usable score and the stored move.
    ///
    /// The move is returned even when the stored depth is too shallow, so it
    /// can still seed move ordering.
    pub fn probe(
        &self,
        hash: Hash,
        depth: Depth,
        alpha: Score,
        beta: Score,
        ply: i32,
    ) -> (Option<Score>, Option<Move>) {
        match self.entries.get(&hash) {
            Some(entry) => (entry.usable_score(depth, alpha, beta, ply), entry.best_move),
            None => (None, None),
        }
    }

    /// Store an entry. `score` is root-relative and converted here.
    ///
    /// A shallower result from an older generation never overwrites a deeper
    /// one from the current generation.
    pub fn store(
        &mut self,
        hash: Hash,
        depth: Depth,
        score: Score,
        bound: BoundType,
        best_move: Option<Move>,
        ply: i32,
    ) {
        if let Some(existing) = self.entries.get(&hash) {
            if existing.generation == self.generation
                && existing.depth > depth
                && bound != BoundType::Exact
            {
                return;
            }
        } else if self.entries.len() >= self.capacity {
            self.evict();
        }

        // Keep an older move if this search produced none
        let best_move = best_move.or_else(|| self.entries.get(&hash).and_then(|e| e.best_move));
        self.entries.insert(
            hash,
            TTEntry {
                best_move,
                score: score.to_tt(ply),
                depth,
                bound,
                generation: self.generation,
            },
        );
    }

    /// Make room: drop stale generations, then the oldest and shallowest
    /// quarter if that was not enough.
    fn evict(&mut self) {
        let before = self.entries.len();
        let current = self.generation;
        self.entries
            .retain(|_, e| current.wrapping_sub(e.generation) <= STALE_GENERATIONS);

        if self.entries.len() >= self.capacity {
            let mut ranked: Vec<(u16, Depth, Hash)> = self
                .entries
                .iter()
                .map(|(&k, e)| (current.wrapping_sub(e.generation), e.depth, k))
                .collect();
            // Oldest first, then shallowest
            ranked.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));
            let drop = (self.entries.len() / 4).max(1);
            for &(_, _, key) in ranked.iter().take(drop) {
                self.entries.remove(&key);
            }
        }
        trace!(
            "tt eviction: {} -> {} entries (capacity {}, generation {})",
            before,
            self.entries.len(),
            self.capacity,
            current
        );
    }

    /// Clear the table
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation = 0;
    }

    /// Table fill in permill (for UCI info)
    pub fn hashfull(&self) -> u32 {
        ((self.entries.len() * 1000) / self.capacity).min(1000) as u32
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(16) // 16 MB default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Square;

    #[test]
    fn test_tt_basic() {
        let mut tt = TranspositionTable::new(1);
        let hash: Hash = 0x123456789ABCDEF0;

        assert_eq!(tt.probe(hash, Depth::new(1), Score::neg_infinity(), Score::infinity(), 0), (None, None));

        let mv = Move::new(Square::E2, Square::E4, None);
        tt.store(hash, Depth::new(5), Score::cp(100), BoundType::Exact, Some(mv), 0);

        let entry = tt.get(hash).expect("Entry should exist");
        assert_eq!(entry.score().raw(), 100);
        assert_eq!(entry.depth().raw(), 5);
        assert_eq!(entry.bound(), BoundType::Exact);

        let (score, best) = tt.probe(hash, Depth::new(5), Score::cp(-50), Score::cp(50), 0);
        assert_eq!(score, Some(Score::cp(100)));
        assert_eq!(best, Some(mv));
    }

    #[test]
    fn test_shallow_entry_still_gives_move() {
        let mut tt = TranspositionTable::new(1);
        let mv = Move::new(Square::G1, Square::F3, None);
        tt.store(7, Depth::new(2), Score::cp(30), BoundType::Exact, Some(mv), 0);

        let (score, best) = tt.probe(7, Depth::new(4), Score::neg_infinity(), Score::infinity(), 0);
        assert_eq!(score, None);
        assert_eq!(best, Some(mv));
    }

    #[test]
    fn test_bounds_respect_window() {
        let mut tt = TranspositionTable::new(1);
        tt.store(1, Depth::new(3), Score::cp(200), BoundType::LowerBound, None, 0);
        tt.store(2, Depth::new(3), Score::cp(-200), BoundType::UpperBound, None, 0);

        // Lower bound above beta cuts, inside the window it does not
        assert_eq!(tt.probe(1, Depth::new(3), Score::cp(0), Score::cp(100), 0).0, Some(Score::cp(200)));
        assert_eq!(tt.probe(1, Depth::new(3), Score::cp(0), Score::cp(300), 0).0, None);
        // Upper bound below alpha cuts
        assert_eq!(tt.probe(2, Depth::new(3), Score::cp(-100), Score::cp(100), 0).0, Some(Score::cp(-200)));
        assert_eq!(tt.probe(2, Depth::new(3), Score::cp(-300), Score::cp(100), 0).0, None);
    }

    #[test]
    fn test_mate_scores_are_ply_adjusted() {
        let mut tt = TranspositionTable::new(1);
        // Mate found 5 plies from root while the node sits at ply 2
        tt.store(9, Depth::new(4), Score::mate_in(5), BoundType::Exact, None, 2);
        // Same position reached at ply 4: mate is two plies further from root
        let (score, _) = tt.probe(9, Depth::new(4), Score::neg_infinity(), Score::infinity(), 4);
        assert_eq!(score, Some(Score::mate_in(7)));
    }

    #[test]
    fn test_capacity_is_bounded() {
        let mut tt = TranspositionTable::with_capacity(64, 0);
        for key in 0..1000u64 {
            if key % 100 == 0 {
                tt.new_generation();
            }
            tt.store(key, Depth::new((key % 7) as i32), Score::cp(0), BoundType::Exact, None, 0);
            assert!(tt.len() <= tt.capacity());
        }
    }

    #[test]
    fn test_stale_generations_evicted_first() {
        let mut tt = TranspositionTable::with_capacity(8, 0);
        for key in 0..4u64 {
            tt.store(key, Depth::new(10), Score::cp(0), BoundType::Exact, None, 0);
        }
        for _ in 0..3 {
            tt.new_generation();
        }
        for key in 100..104u64 {
            tt.store(key, Depth::new(1), Score::cp(0), BoundType::Exact, None, 0);
        }
        // Table is full; the next store must drop the deep but stale entries
        tt.store(200, Depth::new(1), Score::cp(0), BoundType::Exact, None, 0);
        assert!(tt.get(0).is_none());
        assert!(tt.get(100).is_some());
        assert!(tt.get(200).is_some());
    }
}
