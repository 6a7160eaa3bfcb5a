//! Repertoire lines: the serialized form of the book and the built-in set.

use serde::{Deserialize, Serialize};

fn default_weight() -> u32 {
    10
}

/// One named line of play from the initial position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLine {
    pub name: String,
    /// Space-separated moves in coordinate notation, e.g. "e2e4 e7e5"
    pub moves: String,
    pub min_rating: u32,
    pub max_rating: u32,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

impl BookLine {
    pub fn new(name: &str, moves: &str, min_rating: u32, max_rating: u32, weight: u32) -> Self {
        BookLine {
            name: name.to_string(),
            moves: moves.to_string(),
            min_rating,
            max_rating,
            weight,
        }
    }

    pub fn move_texts(&self) -> impl Iterator<Item = &str> {
        self.moves.split_whitespace()
    }
}

// name, moves, min rating, max rating, weight
const BUILTIN: &[(&str, &str, u32, u32, u32)] = &[
    ("Ruy Lopez", "e2e4 e7e5 g1f3 b8c6 f1b5 a7a6 b5a4 g8f6 e1g1 f8e7 f1e1 b7b5 a4b3 d7d6", 1200, 2400, 30),
    ("Ruy Lopez, Berlin Defence", "e2e4 e7e5 g1f3 b8c6 f1b5 g8f6 e1g1 f6e4 d2d4 e4d6", 1800, 2400, 15),
    ("Italian Game", "e2e4 e7e5 g1f3 b8c6 f1c4 f8c5 c2c3 g8f6 d2d3 d7d6", 800, 2400, 30),
    ("Two Knights Defence", "e2e4 e7e5 g1f3 b8c6 f1c4 g8f6 d2d3 f8e7", 800, 2000, 15),
    ("Evans Gambit", "e2e4 e7e5 g1f3 b8c6 f1c4 f8c5 b2b4 c5b4 c2c3", 1000, 2200, 6),
    ("Scotch Game", "e2e4 e7e5 g1f3 b8c6 d2d4 e5d4 f3d4 g8f6 d4c6 b7c6", 1000, 2400, 15),
    ("Four Knights Game", "e2e4 e7e5 g1f3 b8c6 b1c3 g8f6 f1b5 f8b4", 600, 1600, 12),
    ("King's Pawn Game", "e2e4 e7e5 g1f3 b8c6 f1c4 g8f6", 400, 1200, 20),
    ("Petrov Defence", "e2e4 e7e5 g1f3 g8f6 f3e5 d7d6 e5f3 f6e4 d2d4 d6d5", 1600, 2400, 10),
    ("Philidor Defence", "e2e4 e7e5 g1f3 d7d6 d2d4 g8f6 b1c3 b8d7", 600, 1800, 6),
    ("Vienna Game", "e2e4 e7e5 b1c3 g8f6 f2f4 d7d5", 800, 2000, 10),
    ("King's Gambit", "e2e4 e7e5 f2f4 e5f4 g1f3 g7g5", 600, 2000, 8),
    ("Danish Gambit", "e2e4 e7e5 d2d4 e5d4 c2c3 d4c3 f1c4", 600, 1600, 5),
    ("Center Game", "e2e4 e7e5 d2d4 e5d4 d1d4 b8c6 d4e3", 400, 1400, 8),
    ("Scholar's Mate Attack", "e2e4 e7e5 f1c4 b8c6 d1h5 g7g6 h5f3 g8f6", 400, 1000, 12),
    ("Bongcloud Attack", "e2e4 e7e5 e1e2", 400, 800, 3),
    ("Sicilian Defence, Najdorf", "e2e4 c7c5 g1f3 d7d6 d2d4 c5d4 f3d4 g8f6 b1c3 a7a6 c1e3 e7e5", 1800, 2400, 25),
    ("Sicilian Defence, Open", "e2e4 c7c5 g1f3 b8c6 d2d4 c5d4 f3d4 g8f6 b1c3 e7e5", 1200, 2400, 20),
    ("Sicilian Defence, Alapin", "e2e4 c7c5 c2c3 d7d5 e4d5 d8d5 d2d4 g8f6", 1000, 2200, 10),
    ("French Defence", "e2e4 e7e6 d2d4 d7d5 b1c3 g8f6 c1g5 f8e7 e4e5 f6d7", 1000, 2400, 20),
    ("Caro-Kann Defence", "e2e4 c7c6 d2d4 d7d5 b1c3 d5e4 c3e4 c8f5 e4g3 f5g6", 1000, 2400, 20),
    ("Scandinavian Defence", "e2e4 d7d5 e4d5 d8d5 b1c3 d5a5 d2d4 g8f6", 600, 1800, 10),
    ("Queen's Gambit Declined", "d2d4 d7d5 c2c4 e7e6 b1c3 g8f6 c1g5 f8e7 e2e3 e8g8", 1000, 2400, 25),
    ("Queen's Gambit Accepted", "d2d4 d7d5 c2c4 d5c4 g1f3 g8f6 e2e3 e7e6 f1c4 c7c5", 1000, 2400, 12),
    ("Slav Defence", "d2d4 d7d5 c2c4 c7c6 g1f3 g8f6 b1c3 d5c4 a2a4", 1200, 2400, 18),
    ("King's Indian Defence", "d2d4 g8f6 c2c4 g7g6 b1c3 f8g7 e2e4 d7d6 g1f3 e8g8 f1e2 e7e5", 1400, 2400, 20),
    ("Nimzo-Indian Defence", "d2d4 g8f6 c2c4 e7e6 b1c3 f8b4 e2e3 e8g8 f1d3 d7d5", 1600, 2400, 18),
    ("Grunfeld Defence", "d2d4 g8f6 c2c4 g7g6 b1c3 d7d5 c4d5 f6d5 e2e4 d5c3 b2c3", 1800, 2400, 10),
    ("London System", "d2d4 d7d5 c1f4 g8f6 e2e3 e7e6 g1f3 c7c5 c2c3", 800, 2200, 20),
    ("Queen's Pawn Game", "d2d4 d7d5 g1f3 g8f6 e2e3 e7e6", 400, 1400, 15),
    ("Dutch Defence", "d2d4 f7f5 g2g3 g8f6 f1g2 e7e6 g1f3", 1200, 2200, 6),
    ("Reti Opening", "g1f3 d7d5 c2c4 e7e6 g2g3 g8f6 f1g2 f8e7", 1400, 2400, 15),
    ("English Opening", "c2c4 e7e5 b1c3 g8f6 g2g3 d7d5 c4d5 f6d5", 1400, 2400, 15),
    ("English Opening, Symmetrical", "c2c4 c7c5 g1f3 g8f6 b1c3 b8c6", 1600, 2400, 10),
    ("Grob Opening", "g2g4 d7d5 f1g2 c8g4", 400, 1000, 4),
    ("Ware Opening", "a2a4 e7e5 h2h4", 400, 800, 3),
];

/// The repertoire compiled into the crate.
pub fn builtin_lines() -> Vec<BookLine> {
    BUILTIN
        .iter()
        .map(|&(name, moves, min, max, weight)| BookLine::new(name, moves, min, max, weight))
        .collect()
}
