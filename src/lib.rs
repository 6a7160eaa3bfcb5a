//! A rating-calibrated chess engine that plays like a person.
//!
//! Given a position and a target rating, the [`Engine`] picks a move the way
//! a player of that strength might: it follows a rating-filtered opening
//! repertoire, spends a human-looking amount of time, searches with a
//! handicapped alpha-beta and sometimes substitutes a plausible mistake.
//!
//! Rules (move generation, legality, hashing) come from the `chess` crate;
//! [`position::Position`] adds the bits the engine needs on top.

pub mod book;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod humanize;
pub mod position;
pub mod search;
pub mod time;
pub mod types;
pub mod uci;

pub use book::{GameOutcome, OpeningBook};
pub use config::{rating_config, Personality, PersonalityModifiers, RatingConfig};
pub use engine::{
    CoordinateMove, Engine, EngineOptions, MoveOutcome, MoveReply, MoveRequest, MoveSource,
    MoveStats,
};
pub use error::EngineError;
pub use position::{GameStatus, Position, START_FEN};
pub use search::{SearchLimits, SearchResult, Searcher};
pub use types::{Depth, Move, Score};
