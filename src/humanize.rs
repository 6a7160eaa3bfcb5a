//! Deliberate mistakes.
//!
//! After the search has picked its move, the humanizer may swap it for a
//! worse one with the rating's blunder probability. What the replacement
//! looks like depends on strength: beginners play anything, club players
//! at least avoid leaving the moved piece en prise, and strong players slip
//! to one of the next few moves of a quick second look.

use crate::config::rating_config;
use crate::position::Position;
use crate::search::{see, Searcher};
use crate::types::{Depth, Move};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

/// Ratings below this substitute a uniformly random move
pub const RANDOM_BAND_LIMIT: u32 = 800;
/// Ratings below this (and above the random band) avoid hanging the moved piece
pub const SAFE_BAND_LIMIT: u32 = 1600;

/// Depth of the second look used by the strongest band
const NEAR_BEST_DEPTH: i32 = 2;
/// Most runner-up moves the strongest band chooses between
const NEAR_BEST_CHOICES: usize = 3;

/// Runner-up window for the near-best band. Sharper calculation narrows the
/// slip to the second-best move.
pub fn near_best_choices(calculation_accuracy: f64) -> usize {
    let spread = (1.0 - calculation_accuracy.clamp(0.0, 1.0)) * 10.0;
    (spread.round() as usize).clamp(1, NEAR_BEST_CHOICES)
}

/// How a substitute move is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlunderBand {
    Random,
    NonHanging,
    NearBest,
}

impl BlunderBand {
    pub fn for_rating(rating: u32) -> Self {
        match rating {
            r if r < RANDOM_BAND_LIMIT => BlunderBand::Random,
            r if r < SAFE_BAND_LIMIT => BlunderBand::NonHanging,
            _ => BlunderBand::NearBest,
        }
    }
}

/// Possibly replace `best_move` with a plausible mistake.
///
/// The probability is the rating's blunder chance. A substitute always
/// differs from `best_move`; with a single legal move nothing changes.
pub fn maybe_blunder<R: Rng>(
    position: &Position,
    best_move: Move,
    rating: u32,
    searcher: &mut Searcher,
    rng: &mut R,
) -> Move {
    let config = rating_config(rating);
    if !rng.gen_bool(config.blunder_chance.clamp(0.0, 1.0)) {
        return best_move;
    }

    let band = BlunderBand::for_rating(rating);
    match substitute(position, best_move, band, config.calculation_accuracy, searcher, rng) {
        Some(mv) => {
            debug!("humanizer ({:?}) replaced {} with {}", band, best_move, mv);
            mv
        }
        None => best_move,
    }
}

/// Pick a replacement for `best_move` in the given band.
pub fn substitute<R: Rng>(
    position: &Position,
    best_move: Move,
    band: BlunderBand,
    calculation_accuracy: f64,
    searcher: &mut Searcher,
    rng: &mut R,
) -> Option<Move> {
    let others: Vec<Move> = position
        .legal_moves()
        .into_iter()
        .filter(|&m| m != best_move)
        .collect();
    if others.is_empty() {
        return None;
    }

    match band {
        BlunderBand::Random => others.choose(rng).copied(),
        BlunderBand::NonHanging => {
            let board = position.board();
            let safe: Vec<Move> = others.iter().copied().filter(|&m| see(board, m) >= 0).collect();
            if safe.is_empty() {
                others.choose(rng).copied()
            } else {
                safe.choose(rng).copied()
            }
        }
        BlunderBand::NearBest => {
            let ranked = searcher.rank_moves(position.board(), Depth::new(NEAR_BEST_DEPTH));
            let runners_up: Vec<Move> = ranked
                .into_iter()
                .map(|(m, _)| m)
                .filter(|&m| m != best_move)
                .take(near_best_choices(calculation_accuracy))
                .collect();
            runners_up.choose(rng).copied()
        }
    }
}
