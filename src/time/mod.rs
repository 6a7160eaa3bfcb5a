//! Think-time allocation.
//!
//! Turns the game phase, the kind of move, and how complicated the position
//! looks into a per-move time, then adds human-like variance: a random
//! inconsistency factor, the occasional long think, and fatigue late in the
//! game. The allocation is reported to the caller; nothing here sleeps.

mod profile;

pub use profile::{ClassMultipliers, GamePhase, MoveClassification, PhaseMultipliers, TimeProfile};

use crate::config::PersonalityModifiers;
use crate::eval::pst::is_endgame;
use crate::position::Position;
use crate::search::see;
use crate::types::{attackers_to, is_capture, Color, MoveGen, Piece, EMPTY, NON_PAWN_PIECES};
use rand::Rng;
use std::time::Duration;

/// Chance of an unusually long think
const LONG_THINK_CHANCE: f64 = 0.05;
const LONG_THINK_MIN: f64 = 1.5;
const LONG_THINK_MAX: f64 = 2.5;

/// Fatigue starts after this move and grows 1% per move
const FATIGUE_START: u32 = 30;
const FATIGUE_MAX: f64 = 0.30;

/// How tangled a position is, in `[0, 1]`.
///
/// Built from the number of candidate moves and the tactical motifs on the
/// board: captures and checks available, being in check, loose pieces.
pub fn assess_complexity(position: &Position, candidate_count: usize) -> f64 {
    let board = position.board();
    let mut captures = 0;
    let mut checks = 0;
    for m in MoveGen::new_legal(board) {
        if is_capture(board, m) {
            captures += 1;
        } else if *board.make_move_new(m).checkers() != EMPTY {
            checks += 1;
        }
    }

    let mut score = (candidate_count.min(50) as f64 / 50.0) * 0.4;
    score += (captures.min(6) as f64 / 6.0) * 0.25;
    score += (checks.min(3) as f64 / 3.0) * 0.1;
    if position.in_check() {
        score += 0.15;
    }
    score += (loose_pieces(position).min(4) as f64 / 4.0) * 0.1;
    score.clamp(0.0, 1.0)
}

/// Pieces of either side that are attacked and not defended.
fn loose_pieces(position: &Position) -> u32 {
    let board = position.board();
    let occupied = *board.combined();
    let mut count = 0;
    for &color in &[Color::White, Color::Black] {
        for &piece in &NON_PAWN_PIECES {
            for sq in *board.pieces(piece) & *board.color_combined(color) {
                if attackers_to(board, sq, !color, occupied) != EMPTY
                    && attackers_to(board, sq, color, occupied) == EMPTY
                {
                    count += 1;
                }
            }
        }
    }
    count
}

/// Decide what kind of move is being made.
pub fn classify(position: &Position, candidate_count: usize, in_book: bool) -> MoveClassification {
    if in_book {
        return MoveClassification::OpeningBook;
    }
    if candidate_count <= 1 {
        return MoveClassification::Forced;
    }
    let board = position.board();
    if position.in_check() {
        return MoveClassification::Tactical;
    }
    let winning_capture = MoveGen::new_legal(board)
        .any(|m| is_capture(board, m) && see(board, m) > 0);
    if winning_capture || loose_pieces(position) > 0 {
        return MoveClassification::Tactical;
    }
    if is_endgame(board) || non_king_pieces(position) <= 6 {
        return MoveClassification::Endgame;
    }
    MoveClassification::Positional
}

fn non_king_pieces(position: &Position) -> u32 {
    let board = position.board();
    (*board.combined() & !*board.pieces(Piece::King)).popcnt()
}

/// Allocates think time for one rating bracket.
#[derive(Debug, Clone)]
pub struct TimeManager {
    profile: TimeProfile,
    /// Personality scale on the base think time
    patience: f64,
    /// Personality divisor on the inconsistency spread
    consistency: f64,
}

impl TimeManager {
    pub fn new(rating: u32) -> Self {
        Self::with_profile(TimeProfile::for_rating(rating))
    }

    pub fn with_profile(profile: TimeProfile) -> Self {
        Self {
            profile,
            patience: 1.0,
            consistency: 1.0,
        }
    }

    /// Apply a personality: patient styles think longer, consistent ones
    /// vary less from move to move.
    pub fn with_style(mut self, modifiers: &PersonalityModifiers) -> Self {
        self.patience = modifiers.patience.max(0.1);
        self.consistency = modifiers.consistency.max(0.1);
        self
    }

    pub fn profile(&self) -> &TimeProfile {
        &self.profile
    }

    /// Think time for the move about to be made.
    ///
    /// Book and forced moves skip the variance and the floor so they stay
    /// near instant.
    pub fn allocate<R: Rng>(
        &self,
        position: &Position,
        class: MoveClassification,
        complexity: f64,
        candidate_count: usize,
        rng: &mut R,
    ) -> Duration {
        let p = &self.profile;
        let class = if candidate_count <= 1 { MoveClassification::Forced } else { class };
        let base = p.base.as_secs_f64() * p.phase.get(GamePhase::of(position));

        if matches!(class, MoveClassification::OpeningBook | MoveClassification::Forced) {
            let secs = base * p.class.get(class);
            return Duration::from_secs_f64(secs.min(p.max.as_secs_f64()));
        }

        let complexity = complexity.clamp(0.0, 1.0);
        let mut secs = base * p.class.get(class) * (0.6 + 1.4 * complexity) * self.patience;

        let spread = (p.inconsistency / self.consistency).min(0.9);
        secs *= rng.gen_range(1.0 - spread..=1.0 + spread);
        if rng.gen_bool(LONG_THINK_CHANCE) {
            secs *= rng.gen_range(LONG_THINK_MIN..=LONG_THINK_MAX);
        }

        let fullmove = position.fullmove_number();
        if fullmove > FATIGUE_START {
            let fatigue = (f64::from(fullmove - FATIGUE_START) * 0.01).min(FATIGUE_MAX);
            secs *= 1.0 - fatigue;
        }

        Duration::from_secs_f64(secs.clamp(p.min.as_secs_f64(), p.max.as_secs_f64()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const MIDDLEGAME: &str = "r1bq1rk1/pp2bppp/2n1pn2/3p4/2PP4/2N1PN2/PP3PPP/R2QKB1R w KQ - 0 12";

    #[test]
    fn test_forced_and_book_are_near_instant() {
        let tm = TimeManager::new(1500);
        let pos = Position::startpos();
        let mut rng = StdRng::seed_from_u64(1);
        let book = tm.allocate(&pos, MoveClassification::OpeningBook, 0.5, 20, &mut rng);
        let forced = tm.allocate(&pos, MoveClassification::Positional, 0.5, 1, &mut rng);
        assert!(book < tm.profile().min);
        assert!(forced < Duration::from_millis(200));
    }

    #[test]
    fn test_allocation_within_bounds() {
        let pos = Position::from_fen(MIDDLEGAME).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for rating in [400, 1000, 1500, 1900, 2400] {
            let tm = TimeManager::new(rating);
            for class in [MoveClassification::Tactical, MoveClassification::Positional, MoveClassification::Endgame] {
                for _ in 0..50 {
                    let t = tm.allocate(&pos, class, 1.0, 40, &mut rng);
                    assert!(t >= tm.profile().min && t <= tm.profile().max);
                }
            }
        }
    }

    #[test]
    fn test_tactical_complex_positions_get_more_time() {
        let tm = TimeManager::new(1500);
        let pos = Position::from_fen(MIDDLEGAME).unwrap();
        let mean = |class, complexity| {
            let mut rng = StdRng::seed_from_u64(3);
            let total: f64 = (0..200)
                .map(|_| tm.allocate(&pos, class, complexity, 30, &mut rng).as_secs_f64())
                .sum();
            total / 200.0
        };
        assert!(mean(MoveClassification::Tactical, 0.9) > mean(MoveClassification::Positional, 0.2));
    }

    #[test]
    fn test_style_shapes_allocation() {
        let pos = Position::from_fen(MIDDLEGAME).unwrap();
        let base = TimeManager::new(1200);
        let patient = TimeManager::new(1200).with_style(&PersonalityModifiers {
            patience: 1.3,
            ..PersonalityModifiers::NEUTRAL
        });
        let steady = TimeManager::new(1200).with_style(&PersonalityModifiers {
            consistency: 1.3,
            ..PersonalityModifiers::NEUTRAL
        });
        let allocations = |tm: &TimeManager| -> Vec<f64> {
            let mut rng = StdRng::seed_from_u64(11);
            (0..300)
                .map(|_| tm.allocate(&pos, MoveClassification::Positional, 0.3, 30, &mut rng).as_secs_f64())
                .collect()
        };
        let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
        let spread = |v: &[f64]| {
            let m = mean(v);
            v.iter().map(|x| (x - m).abs()).sum::<f64>() / v.len() as f64
        };

        let (b, p, s) = (allocations(&base), allocations(&patient), allocations(&steady));
        assert!(mean(&p) > mean(&b));
        assert!(spread(&s) < spread(&b));
    }

    #[test]
    fn test_fatigue_late_in_game() {
        let tm = TimeManager::with_profile(TimeProfile {
            inconsistency: 0.0,
            ..TimeProfile::for_rating(1500)
        });
        let early = Position::from_fen("r1bq1rk1/pp2bppp/2n1pn2/3p4/2PP4/2N1PN2/PP3PPP/R2QKB1R w KQ - 0 31").unwrap();
        let late = Position::from_fen("r1bq1rk1/pp2bppp/2n1pn2/3p4/2PP4/2N1PN2/PP3PPP/R2QKB1R w KQ - 0 60").unwrap();
        // Same seed, so the long-think roll matches
        let a = tm.allocate(&early, MoveClassification::Positional, 0.5, 30, &mut StdRng::seed_from_u64(5));
        let b = tm.allocate(&late, MoveClassification::Positional, 0.5, 30, &mut StdRng::seed_from_u64(5));
        assert!(b < a);
    }

    #[test]
    fn test_complexity_in_unit_range() {
        for fen in [crate::position::START_FEN, MIDDLEGAME, "4k3/8/8/3n4/4P3/8/8/4K3 w - - 0 1"] {
            let pos = Position::from_fen(fen).unwrap();
            let c = assess_complexity(&pos, pos.legal_move_count());
            assert!((0.0..=1.0).contains(&c));
        }
        let quiet = Position::startpos();
        let sharp = Position::from_fen("4k3/8/8/3n4/4P3/8/8/4K3 w - - 0 1").unwrap();
        assert!(
            assess_complexity(&sharp, sharp.legal_move_count()) > 0.0
                && classify(&sharp, sharp.legal_move_count(), false) == MoveClassification::Tactical
        );
        assert_eq!(classify(&quiet, 20, false), MoveClassification::Positional);
        assert_eq!(classify(&quiet, 20, true), MoveClassification::OpeningBook);
        assert_eq!(classify(&quiet, 1, false), MoveClassification::Forced);
    }
}
