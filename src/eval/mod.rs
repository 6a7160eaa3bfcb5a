//! Board evaluation module.
//!
//! A hand-crafted evaluator whose terms are weighted by the playing strength
//! and personality of the engine, with optional deterministic noise so that
//! weaker settings misjudge positions in a reproducible way.

use crate::config::{PersonalityModifiers, RatingConfig};
use crate::types::{Board, Color, Score};

pub mod hce;
pub mod pst;

pub use hce::{EvalBreakdown, EvalFeatures};

/// Multipliers applied to each evaluation term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalWeights {
    pub material: f64,
    pub positional: f64,
    pub tactical: f64,
    pub king_safety: f64,
    pub king_attack: f64,
    pub mobility: f64,
    pub pawn_structure: f64,
    pub endgame: f64,
}

impl EvalWeights {
    pub const UNIT: EvalWeights = EvalWeights {
        material: 1.0,
        positional: 1.0,
        tactical: 1.0,
        king_safety: 1.0,
        king_attack: 1.0,
        mobility: 1.0,
        pawn_structure: 1.0,
        endgame: 1.0,
    };

    /// Derive weights from a skill level and a style.
    pub fn from_config(rc: &RatingConfig, p: &PersonalityModifiers) -> Self {
        let pos = rc.positional_weight;
        // Players eager to sacrifice care a little less about material
        let material = (p.material * (1.0 - 0.1 * (p.sacrifice_willingness - 1.0))).max(0.5);
        let risk = p.risk_tolerance.max(0.25);

        EvalWeights {
            material,
            positional: pos * p.positional,
            tactical: rc.tactical_awareness * p.tactical,
            king_safety: (0.5 + 0.5 * pos) * p.king_safety / risk.sqrt(),
            king_attack: p.aggression,
            mobility: pos * p.mobility,
            pawn_structure: pos * p.pawn_structure,
            endgame: rc.endgame_skill,
        }
    }

    /// Weighted sum of a breakdown, white-relative.
    pub fn apply(&self, b: &EvalBreakdown) -> i32 {
        let sum = self.material * f64::from(b.material)
            + self.positional * f64::from(b.positional)
            + self.tactical * f64::from(b.tactical)
            + self.king_safety * f64::from(b.king_safety)
            + self.king_attack * f64::from(b.king_attack)
            + self.mobility * f64::from(b.mobility)
            + self.pawn_structure * f64::from(b.pawn_structure)
            + self.endgame * f64::from(b.endgame);
        sum.round() as i32
    }
}

impl Default for EvalWeights {
    fn default() -> Self {
        EvalWeights::UNIT
    }
}

/// Static evaluator.
///
/// Holds no mutable state: the same board always gets the same score for a
/// given salt, so it can be shared freely between recursive calls.
#[derive(Debug, Clone)]
pub struct Evaluator {
    weights: EvalWeights,
    features: EvalFeatures,
    noise: i32,
    salt: u64,
}

impl Evaluator {
    pub fn new(weights: EvalWeights, features: EvalFeatures, noise: i32) -> Self {
        Evaluator { weights, features, noise: noise.max(0), salt: 0 }
    }

    /// Evaluator tuned to a rating and personality.
    pub fn for_config(rc: &RatingConfig, p: &PersonalityModifiers, with_noise: bool) -> Self {
        let noise = if with_noise { rc.evaluation_noise } else { 0 };
        Evaluator::new(
            EvalWeights::from_config(rc, p),
            EvalFeatures::for_rating(rc.rating),
            noise,
        )
    }

    /// Every term, unit weights, no noise.
    pub fn clean() -> Self {
        Evaluator::new(EvalWeights::UNIT, EvalFeatures::ALL, 0)
    }

    /// Change the noise seed; call once per search.
    pub fn set_salt(&mut self, salt: u64) {
        self.salt = salt;
    }

    pub fn noise_amplitude(&self) -> i32 {
        self.noise
    }

    pub fn features(&self) -> EvalFeatures {
        self.features
    }

    pub fn weights(&self) -> &EvalWeights {
        &self.weights
    }

    /// Unweighted per-term scores.
    pub fn breakdown(&self, board: &Board) -> EvalBreakdown {
        hce::breakdown(board, self.features)
    }

    /// White-relative score including noise.
    pub fn evaluate_white(&self, board: &Board) -> i32 {
        let base = self.weights.apply(&self.breakdown(board));
        base + noise_for(board.get_hash() ^ self.salt, self.noise)
    }

    /// Score relative to the side to move.
    pub fn evaluate(&self, board: &Board) -> Score {
        let white = self.evaluate_white(board);
        if board.side_to_move() == Color::White {
            Score::cp(white)
        } else {
            Score::cp(-white)
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::clean()
    }
}

/// Evaluate with the clean evaluator.
pub fn evaluate(board: &Board) -> Score {
    Evaluator::clean().evaluate(board)
}

/// Symmetric perturbation in `[-amplitude, amplitude]` derived from `key`.
fn noise_for(key: u64, amplitude: i32) -> i32 {
    if amplitude <= 0 {
        return 0;
    }
    let span = 2 * amplitude as u64 + 1;
    (mix64(key) % span) as i32 - amplitude
}

/// SplitMix64 finaliser.
#[inline]
pub(crate) fn mix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{rating_config, Personality};
    use std::str::FromStr;

    #[test]
    fn test_startpos_is_near_zero() {
        let score = evaluate(&Board::default());
        assert!(score.raw().abs() <= 20, "startpos eval {}", score);
    }

    #[test]
    fn test_side_to_move_perspective() {
        let white = Board::from_str("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        let black = Board::from_str("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1").unwrap();
        assert!(evaluate(&white).raw() > 700);
        assert!(evaluate(&black).raw() < -700);
    }

    #[test]
    fn test_noise_is_bounded_and_reproducible() {
        let rc = rating_config(400);
        let mut eval = Evaluator::for_config(&rc, &Personality::Balanced.modifiers(), true);
        let clean = Evaluator::new(*eval.weights(), eval.features(), 0);
        eval.set_salt(42);

        let board = Board::default();
        let a = eval.evaluate_white(&board);
        let b = eval.evaluate_white(&board);
        assert_eq!(a, b);
        assert!((a - clean.evaluate_white(&board)).abs() <= rc.evaluation_noise);
    }

    #[test]
    fn test_salt_changes_noise() {
        let rc = rating_config(400);
        let mut eval = Evaluator::for_config(&rc, &Personality::Balanced.modifiers(), true);
        let board = Board::default();
        let values: Vec<i32> = (0..16)
            .map(|salt| {
                eval.set_salt(salt);
                eval.evaluate_white(&board)
            })
            .collect();
        assert!(values.iter().any(|&v| v != values[0]));
    }

    #[test]
    fn test_noise_range() {
        for key in 0..1000u64 {
            let n = noise_for(key, 7);
            assert!((-7..=7).contains(&n));
        }
        assert_eq!(noise_for(123, 0), 0);
    }

    #[test]
    fn test_weights_follow_personality() {
        let rc = rating_config(1500);
        let aggressive = EvalWeights::from_config(&rc, &Personality::Aggressive.modifiers());
        let defensive = EvalWeights::from_config(&rc, &Personality::Defensive.modifiers());
        assert!(aggressive.king_attack > defensive.king_attack);
        assert!(defensive.king_safety > aggressive.king_safety);
    }
}
