use std::time::Duration;

pub const MIN_RATING: u32 = 400;
pub const MAX_RATING: u32 = 2400;

/// Search and error-injection settings for one skill rating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingConfig {
    pub rating: u32,
    /// Nominal iterative-deepening target.
    pub search_depth: i32,
    pub time_limit: Duration,
    /// Probability that the humanizer replaces the search's best move.
    pub blunder_chance: f64,
    pub tactical_awareness: f64,
    pub positional_weight: f64,
    /// Last full-move number at which the opening book is consulted.
    pub opening_book_depth: u32,
    /// Half-width of the symmetric evaluation perturbation, centipawns.
    pub evaluation_noise: i32,
    pub endgame_skill: f64,
    pub calculation_accuracy: f64,
}

/// One row of the anchor table.
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    rating: u32,
    depth: i32,
    time_ms: u64,
    blunder: f64,
    tactical: f64,
    positional: f64,
    book_depth: u32,
    noise: i32,
    endgame: f64,
    accuracy: f64,
}

const fn anchor(
    rating: u32,
    depth: i32,
    time_ms: u64,
    blunder: f64,
    tactical: f64,
    positional: f64,
    book_depth: u32,
    noise: i32,
    endgame: f64,
    accuracy: f64,
) -> Anchor {
    Anchor {
        rating,
        depth,
        time_ms,
        blunder,
        tactical,
        positional,
        book_depth,
        noise,
        endgame,
        accuracy,
    }
}

/// Defined skill levels, every 200 points from 400 to 2400.
#[rustfmt::skip]
pub const RATING_ANCHORS: [Anchor; 11] = [
    //      rating depth  time  blunder tact  pos  book noise  end   acc
    anchor(  400,  1,   300, 0.65, 0.20, 0.10,  2, 300, 0.10, 0.30),
    anchor(  600,  1,   400, 0.50, 0.30, 0.20,  3, 250, 0.20, 0.40),
    anchor(  800,  2,   500, 0.38, 0.40, 0.30,  4, 200, 0.30, 0.50),
    anchor( 1000,  2,   700, 0.28, 0.50, 0.40,  5, 160, 0.40, 0.60),
    anchor( 1200,  3,   900, 0.20, 0.60, 0.50,  6, 120, 0.50, 0.70),
    anchor( 1400,  3,  1200, 0.14, 0.70, 0.60,  8,  90, 0.60, 0.75),
    anchor( 1600,  4,  1500, 0.10, 0.80, 0.70, 10,  60, 0.70, 0.82),
    anchor( 1800,  4,  2000, 0.06, 0.85, 0.80, 12,  40, 0.80, 0.88),
    anchor( 2000,  5,  2500, 0.04, 0.90, 0.85, 14,  25, 0.85, 0.92),
    anchor( 2200,  6,  3000, 0.02, 0.95, 0.90, 16,  12, 0.90, 0.96),
    anchor( 2400,  7,  4000, 0.01, 1.00, 1.00, 20,   5, 1.00, 1.00),
];

impl Anchor {
    #[inline]
    pub fn rating(&self) -> u32 {
        self.rating
    }

    fn to_config(self, rating: u32) -> RatingConfig {
        RatingConfig {
            rating,
            search_depth: self.depth,
            time_limit: Duration::from_millis(self.time_ms),
            blunder_chance: self.blunder,
            tactical_awareness: self.tactical,
            positional_weight: self.positional,
            opening_book_depth: self.book_depth,
            evaluation_noise: self.noise,
            endgame_skill: self.endgame,
            calculation_accuracy: self.accuracy,
        }
    }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
fn lerp_round(a: i64, b: i64, t: f64) -> i64 {
    lerp(a as f64, b as f64, t).round() as i64
}

/// Configuration for a rating, clamped to [400, 2400].
///
/// Anchor ratings map exactly; anything in between is a linear blend of the
/// two neighbouring anchors, with integer fields rounded.
pub fn rating_config(rating: u32) -> RatingConfig {
    let rating = rating.clamp(MIN_RATING, MAX_RATING);

    let upper_idx = RATING_ANCHORS
        .iter()
        .position(|a| a.rating >= rating)
        .unwrap_or(RATING_ANCHORS.len() - 1);
    let upper = RATING_ANCHORS[upper_idx];
    if upper.rating == rating || upper_idx == 0 {
        return upper.to_config(rating);
    }

    let lower = RATING_ANCHORS[upper_idx - 1];
    let t = f64::from(rating - lower.rating) / f64::from(upper.rating - lower.rating);

    RatingConfig {
        rating,
        search_depth: lerp_round(lower.depth.into(), upper.depth.into(), t) as i32,
        time_limit: Duration::from_millis(lerp_round(lower.time_ms as i64, upper.time_ms as i64, t) as u64),
        blunder_chance: lerp(lower.blunder, upper.blunder, t),
        tactical_awareness: lerp(lower.tactical, upper.tactical, t),
        positional_weight: lerp(lower.positional, upper.positional, t),
        opening_book_depth: lerp_round(lower.book_depth.into(), upper.book_depth.into(), t) as u32,
        evaluation_noise: lerp_round(lower.noise.into(), upper.noise.into(), t) as i32,
        endgame_skill: lerp(lower.endgame, upper.endgame, t),
        calculation_accuracy: lerp(lower.accuracy, upper.accuracy, t),
    }
}
