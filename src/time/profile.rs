//! Per-rating timing constants.

use crate::eval::pst::is_endgame;
use crate::position::Position;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Coarse stage of the game, for pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Opening,
    EarlyMiddlegame,
    Middlegame,
    LateMiddlegame,
    Endgame,
}

impl GamePhase {
    /// Endgame by material, otherwise by move number.
    pub fn of(position: &Position) -> Self {
        if is_endgame(position.board()) {
            return GamePhase::Endgame;
        }
        match position.fullmove_number() {
            0..=10 => GamePhase::Opening,
            11..=20 => GamePhase::EarlyMiddlegame,
            21..=30 => GamePhase::Middlegame,
            _ => GamePhase::LateMiddlegame,
        }
    }
}

/// What kind of decision the move is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveClassification {
    OpeningBook,
    Forced,
    Tactical,
    Positional,
    Endgame,
}

/// Phase multipliers, opening fastest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseMultipliers {
    pub opening: f64,
    pub early_middlegame: f64,
    pub middlegame: f64,
    pub late_middlegame: f64,
    pub endgame: f64,
}

impl PhaseMultipliers {
    pub fn get(&self, phase: GamePhase) -> f64 {
        match phase {
            GamePhase::Opening => self.opening,
            GamePhase::EarlyMiddlegame => self.early_middlegame,
            GamePhase::Middlegame => self.middlegame,
            GamePhase::LateMiddlegame => self.late_middlegame,
            GamePhase::Endgame => self.endgame,
        }
    }
}

/// Classification multipliers. Book and forced moves are near instant;
/// the others are further scaled by complexity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMultipliers {
    pub opening_book: f64,
    pub forced: f64,
    pub tactical: f64,
    pub positional: f64,
    pub endgame: f64,
}

impl ClassMultipliers {
    pub fn get(&self, class: MoveClassification) -> f64 {
        match class {
            MoveClassification::OpeningBook => self.opening_book,
            MoveClassification::Forced => self.forced,
            MoveClassification::Tactical => self.tactical,
            MoveClassification::Positional => self.positional,
            MoveClassification::Endgame => self.endgame,
        }
    }
}

const PHASES: PhaseMultipliers = PhaseMultipliers {
    opening: 0.6,
    early_middlegame: 0.85,
    middlegame: 1.0,
    late_middlegame: 1.15,
    endgame: 1.1,
};

const CLASSES: ClassMultipliers = ClassMultipliers {
    opening_book: 0.1,
    forced: 0.05,
    tactical: 1.5,
    positional: 1.0,
    endgame: 0.9,
};

/// Timing constants for one rating bracket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeProfile {
    pub base: Duration,
    pub min: Duration,
    pub max: Duration,
    pub phase: PhaseMultipliers,
    pub class: ClassMultipliers,
    /// Half-width of the uniform random factor around 1.0
    pub inconsistency: f64,
}

impl TimeProfile {
    /// Profile for the bracket containing `rating`.
    pub fn for_rating(rating: u32) -> Self {
        let (base, min, max, inconsistency) = match rating {
            r if r < 800 => (2_000, 500, 8_000, 0.40),
            r if r < 1200 => (3_000, 600, 12_000, 0.35),
            r if r < 1600 => (4_000, 800, 18_000, 0.30),
            r if r < 2000 => (5_000, 1_000, 25_000, 0.25),
            _ => (6_000, 1_000, 30_000, 0.20),
        };
        TimeProfile {
            base: Duration::from_millis(base),
            min: Duration::from_millis(min),
            max: Duration::from_millis(max),
            phase: PHASES,
            class: CLASSES,
            inconsistency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_by_move_number() {
        let fen = |n: u32| {
            Position::from_fen(&format!("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 {}", n)).unwrap()
        };
        assert_eq!(GamePhase::of(&fen(1)), GamePhase::Opening);
        assert_eq!(GamePhase::of(&fen(15)), GamePhase::EarlyMiddlegame);
        assert_eq!(GamePhase::of(&fen(25)), GamePhase::Middlegame);
        assert_eq!(GamePhase::of(&fen(45)), GamePhase::LateMiddlegame);
    }

    #[test]
    fn test_endgame_by_material() {
        let pos = Position::from_fen("8/5k2/8/8/8/8/2K1R3/8 w - - 0 3").unwrap();
        assert_eq!(GamePhase::of(&pos), GamePhase::Endgame);
    }

    #[test]
    fn test_phase_multipliers_ordered() {
        let p = TimeProfile::for_rating(1500).phase;
        assert!(p.opening < p.early_middlegame);
        assert!(p.early_middlegame < p.middlegame);
        assert!(p.middlegame < p.late_middlegame);
        assert!((p.late_middlegame - p.endgame).abs() < 0.1);
    }

    #[test]
    fn test_stronger_brackets_are_steadier() {
        let weak = TimeProfile::for_rating(500);
        let strong = TimeProfile::for_rating(2200);
        assert!(weak.inconsistency > strong.inconsistency);
        assert!(weak.base < strong.base);
        assert!(strong.min <= strong.base && strong.base <= strong.max);
    }
}
