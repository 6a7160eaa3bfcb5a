//! Skill and style configuration.
//!
//! Both halves are plain immutable records plus free functions that build and
//! combine them: [`rating_config`] interpolates between fixed rating anchors,
//! and the personality functions look up, blend and rating-adjust style
//! multipliers. Nothing in here holds mutable state.

mod personality;
mod rating;

pub use personality::{
    blend, perturb, personality, rating_adjust, Personality, PersonalityModifiers,
};
pub use rating::{rating_config, Anchor, RatingConfig, MAX_RATING, MIN_RATING, RATING_ANCHORS};

/// Position of a rating inside the supported band, 0.0 at the floor and 1.0 at the top.
#[inline]
pub fn rating_fraction(rating: u32) -> f64 {
    let r = rating.clamp(MIN_RATING, MAX_RATING);
    f64::from(r - MIN_RATING) / f64::from(MAX_RATING - MIN_RATING)
}
