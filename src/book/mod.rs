//! Opening repertoire for the engine.
//!
//! Named lines of play are replayed from the initial position and every
//! position along the way is keyed by its fingerprint. Each candidate move
//! carries the rating range of the players who would choose it and a weight
//! for random selection.
//!
//! # Usage
//!
//! ```ignore
//! use humanchess::book;
//!
//! let book = book::global();
//! let choice = book.read().lookup(&position, 1500, Personality::Balanced, &mut rng);
//! ```

mod lines;

pub use lines::{builtin_lines, BookLine};

use crate::config::Personality;
use crate::error::EngineError;
use crate::position::{to_uci, Position};
use crate::types::{Color, Hash, Move};
use log::{debug, warn};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Weight multiplier when the opening name suits the personality
const KEYWORD_BONUS: u32 = 2;

/// A candidate move in one book position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMove {
    pub mv: Move,
    pub weight: u32,
    pub min_rating: u32,
    pub max_rating: u32,
    pub name: String,
}

impl BookMove {
    #[inline]
    pub fn suits_rating(&self, rating: u32) -> bool {
        (self.min_rating..=self.max_rating).contains(&rating)
    }
}

/// How a finished game ended, for learning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    WhiteWins,
    BlackWins,
    Draw,
}

/// Position-keyed table of candidate moves.
#[derive(Debug, Clone, Default)]
pub struct OpeningBook {
    entries: FxHashMap<Hash, Vec<BookMove>>,
    lines: usize,
}

impl OpeningBook {
    /// An empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// The repertoire compiled into the crate
    pub fn builtin() -> Self {
        Self::from_lines(&builtin_lines())
    }

    /// Build from lines; lines that fail to replay are skipped with a warning.
    pub fn from_lines(lines: &[BookLine]) -> Self {
        let mut book = OpeningBook::new();
        book.extend(lines);
        debug!("opening book: {} lines, {} positions", book.lines, book.entries.len());
        book
    }

    /// Parse a JSON array of lines.
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        let lines: Vec<BookLine> =
            serde_json::from_str(text).map_err(|e| EngineError::Book(e.to_string()))?;
        Ok(Self::from_lines(&lines))
    }

    /// Load a JSON repertoire file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| EngineError::Book(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    /// Replay one line into the book, merging with what is already there.
    ///
    /// Nothing is added unless every move of the line is legal.
    pub fn add_line(&mut self, line: &BookLine) -> Result<(), EngineError> {
        if line.min_rating > line.max_rating {
            return Err(EngineError::Book(format!(
                "rating range {}..{} is empty",
                line.min_rating, line.max_rating
            )));
        }

        let mut position = Position::startpos();
        let mut steps = Vec::new();
        for text in line.move_texts() {
            let mv = position
                .parse_uci(text)
                .ok_or_else(|| EngineError::Book(format!("illegal move {} at ply {}", text, steps.len() + 1)))?;
            steps.push((position.fingerprint(), mv));
            position = position.play(mv);
        }
        if steps.is_empty() {
            return Err(EngineError::Book("line has no moves".to_string()));
        }

        for (key, mv) in steps {
            self.insert(
                key,
                BookMove {
                    mv,
                    weight: line.weight,
                    min_rating: line.min_rating,
                    max_rating: line.max_rating,
                    name: line.name.clone(),
                },
            );
        }
        self.lines += 1;
        Ok(())
    }

    /// Merge rule: widen the rating range, keep the larger weight and the
    /// first name seen.
    fn insert(&mut self, key: Hash, candidate: BookMove) {
        let moves = self.entries.entry(key).or_default();
        match moves.iter_mut().find(|m| m.mv == candidate.mv) {
            Some(existing) => {
                existing.min_rating = existing.min_rating.min(candidate.min_rating);
                existing.max_rating = existing.max_rating.max(candidate.max_rating);
                existing.weight = existing.weight.max(candidate.weight);
            }
            None => moves.push(candidate),
        }
    }

    /// Add more lines, skipping any that fail to replay.
    pub fn extend(&mut self, lines: &[BookLine]) {
        for line in lines {
            if let Err(e) = self.add_line(line) {
                warn!("skipping book line '{}': {}", line.name, e);
            }
        }
    }

    /// Number of positions in the book
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lines successfully added
    pub fn line_count(&self) -> usize {
        self.lines
    }

    /// Every candidate for a position, regardless of rating.
    pub fn entries(&self, position: &Position) -> &[BookMove] {
        self.entries
            .get(&position.fingerprint())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Candidates whose rating range contains `rating`.
    pub fn candidates(&self, position: &Position, rating: u32) -> Vec<&BookMove> {
        self.entries(position)
            .iter()
            .filter(|m| m.suits_rating(rating) && m.weight > 0 && position.is_legal(m.mv))
            .collect()
    }

    /// Pick a book move by weighted random choice, or `None` when out of book.
    ///
    /// Openings whose name matches one of the personality's keywords weigh
    /// double.
    pub fn lookup<R: Rng>(
        &self,
        position: &Position,
        rating: u32,
        personality: Personality,
        rng: &mut R,
    ) -> Option<BookMove> {
        let candidates = self.candidates(position, rating);
        if candidates.is_empty() {
            return None;
        }

        let keywords = personality.opening_keywords();
        let weights: Vec<u64> = candidates
            .iter()
            .map(|m| {
                let name = m.name.to_ascii_lowercase();
                let bonus = if keywords.iter().any(|k| name.contains(&k.to_ascii_lowercase())) {
                    KEYWORD_BONUS
                } else {
                    1
                };
                u64::from(m.weight) * u64::from(bonus)
            })
            .collect();

        let total: u64 = weights.iter().sum();
        let mut pick = rng.gen_range(0..total);
        for (candidate, weight) in candidates.iter().zip(&weights) {
            if pick < *weight {
                return Some((*candidate).clone());
            }
            pick -= weight;
        }
        candidates.last().map(|m| (*m).clone())
    }

    /// Reinforce the book moves of a finished game.
    ///
    /// Walks the game from the initial position while it stays in book. Moves
    /// by a winner gain 2, moves by either side of a drawn game gain 1.
    /// Returns how many weights changed.
    pub fn learn(&mut self, moves: &[Move], outcome: GameOutcome) -> usize {
        let mut position = Position::startpos();
        let mut updated = 0;
        for &mv in moves {
            if !position.is_legal(mv) {
                warn!("learn: {} is illegal in {}", to_uci(mv), position.to_fen());
                break;
            }
            let bonus = match (outcome, position.side_to_move()) {
                (GameOutcome::Draw, _) => 1,
                (GameOutcome::WhiteWins, Color::White) => 2,
                (GameOutcome::BlackWins, Color::Black) => 2,
                _ => 0,
            };
            let Some(entry) = self
                .entries
                .get_mut(&position.fingerprint())
                .and_then(|list| list.iter_mut().find(|m| m.mv == mv))
            else {
                break;
            };
            if bonus > 0 {
                entry.weight = entry.weight.saturating_add(bonus);
                updated += 1;
            }
            position = position.play(mv);
        }
        debug!("learn: {} book weights updated", updated);
        updated
    }
}

static GLOBAL_BOOK: Lazy<Arc<RwLock<OpeningBook>>> =
    Lazy::new(|| Arc::new(RwLock::new(OpeningBook::builtin())));

/// The process-wide book, built from the built-in repertoire on first use.
pub fn global() -> Arc<RwLock<OpeningBook>> {
    Arc::clone(&GLOBAL_BOOK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn line(name: &str, moves: &str, min: u32, max: u32, weight: u32) -> BookLine {
        BookLine::new(name, moves, min, max, weight)
    }

    #[test]
    fn test_builtin_lines_all_replay() {
        let book = OpeningBook::builtin();
        assert_eq!(book.line_count(), builtin_lines().len());
        assert!(book.len() > 100);
    }

    #[test]
    fn test_startpos_top_rating_moves() {
        let book = OpeningBook::builtin();
        let pos = Position::startpos();
        let moves: Vec<String> = book.candidates(&pos, 2400).iter().map(|m| to_uci(m.mv)).collect();
        assert!(!moves.is_empty());
        for m in &moves {
            assert!(["e2e4", "d2d4", "g1f3", "c2c4"].contains(&m.as_str()), "unexpected {}", m);
        }
    }

    #[test]
    fn test_rating_filter() {
        let mut book = OpeningBook::new();
        book.add_line(&line("Low", "g2g4", 400, 1000, 50)).unwrap();
        book.add_line(&line("High", "e2e4", 1800, 2400, 1)).unwrap();
        let pos = Position::startpos();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let pick = book.lookup(&pos, 2000, Personality::Balanced, &mut rng).unwrap();
            assert_eq!(to_uci(pick.mv), "e2e4");
        }
        assert!(book.lookup(&pos, 1200, Personality::Balanced, &mut rng).is_none());
    }

    #[test]
    fn test_merge_widens_range_and_keeps_first_name() {
        let mut book = OpeningBook::new();
        book.add_line(&line("First", "e2e4 e7e5", 1000, 1400, 5)).unwrap();
        book.add_line(&line("Second", "e2e4 c7c5", 1600, 2000, 9)).unwrap();
        let e4 = &book.entries(&Position::startpos())[0];
        assert_eq!((e4.min_rating, e4.max_rating, e4.weight), (1000, 2000, 9));
        assert_eq!(e4.name, "First");
        // The second ply keeps both replies
        let after = Position::startpos().play(e4.mv);
        assert_eq!(book.entries(&after).len(), 2);
    }

    #[test]
    fn test_illegal_line_rejected_whole() {
        let mut book = OpeningBook::new();
        let err = book.add_line(&line("Broken", "e2e4 e2e4", 400, 2400, 1)).unwrap_err();
        assert!(matches!(err, EngineError::Book(_)));
        assert!(book.is_empty());
    }

    #[test]
    fn test_json_round_trip_schema() {
        let json = r#"[
            {"name": "Queen's Gambit", "moves": "d2d4 d7d5 c2c4", "min_rating": 800, "max_rating": 2400, "weight": 7},
            {"name": "No weight", "moves": "e2e4", "min_rating": 400, "max_rating": 2400}
        ]"#;
        let book = OpeningBook::from_json(json).unwrap();
        assert_eq!(book.line_count(), 2);
        let start = book.entries(&Position::startpos());
        assert_eq!(start.len(), 2);
        assert_eq!(start[1].weight, 10);
        assert!(OpeningBook::from_json("not json").is_err());
    }

    #[test]
    fn test_personality_keywords_double_weight() {
        let mut book = OpeningBook::new();
        book.add_line(&line("King's Gambit", "e2e4 e7e5 f2f4", 400, 2400, 10)).unwrap();
        book.add_line(&line("Quiet Knight", "e2e4 e7e5 g1f3", 400, 2400, 10)).unwrap();
        let pos = Position::startpos()
            .play(Position::startpos().parse_uci("e2e4").unwrap());
        let pos = pos.play(pos.parse_uci("e7e5").unwrap());

        let mut rng = StdRng::seed_from_u64(5);
        let gambits = (0..3000)
            .filter(|_| {
                let pick = book.lookup(&pos, 1500, Personality::Romantic, &mut rng).unwrap();
                to_uci(pick.mv) == "f2f4"
            })
            .count();
        // Expected two thirds
        assert!(gambits > 1800 && gambits < 2200, "gambit picks {}", gambits);
    }

    #[test]
    fn test_learn_rewards_winner() {
        let mut book = OpeningBook::new();
        book.add_line(&line("Italian", "e2e4 e7e5 g1f3 b8c6 f1c4", 400, 2400, 10)).unwrap();
        let start = Position::startpos();
        let game: Vec<Move> = ["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "f8c5"]
            .iter()
            .scan(start, |pos, text| {
                let mv = pos.parse_uci(text)?;
                *pos = pos.play(mv);
                Some(mv)
            })
            .collect();

        let updated = book.learn(&game, GameOutcome::WhiteWins);
        assert_eq!(updated, 3);
        assert_eq!(book.entries(&start)[0].weight, 12);
        let after_e4 = start.play(game[0]);
        assert_eq!(book.entries(&after_e4)[0].weight, 10);

        assert_eq!(book.learn(&game, GameOutcome::Draw), 5);
        assert_eq!(book.entries(&after_e4)[0].weight, 11);
    }

    #[test]
    fn test_global_book_is_shared() {
        let a = global();
        let b = global();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!a.read().is_empty());
    }
}
