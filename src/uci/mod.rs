//! UCI-compatible text front end.
//!
//! Speaks the usual subset of the Universal Chess Interface over any line
//! reader and writer, routing every `go` through the [`Engine`] facade so a
//! GUI sees the same humanized, rating-calibrated play as the JSON API. The
//! non-standard `request <json>` command answers a single
//! [`MoveRequest`](crate::engine::MoveRequest) with its JSON reply.
//!
//! See: http://wbec-ridderkerk.nl/html/UCIProtocol.html
//!
//! [`Engine`]: crate::engine::Engine

mod handler;
mod parser;

pub use handler::{InfoBuilder, UciHandler};
pub use parser::{parse_command, UciCommand};

use std::time::Duration;

use crate::search::clock_budget;
use crate::types::Color;

/// UCI engine identification
pub const ENGINE_NAME: &str = "humanchess";
pub const ENGINE_AUTHOR: &str = "humanchess developers";

/// Parameters of a `go` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    /// Search to this depth
    pub depth: Option<i32>,
    /// Search for this many milliseconds
    pub movetime: Option<u64>,
    /// White time remaining (ms)
    pub wtime: Option<u64>,
    /// Black time remaining (ms)
    pub btime: Option<u64>,
    /// White increment per move (ms)
    pub winc: Option<u64>,
    /// Black increment per move (ms)
    pub binc: Option<u64>,
    /// Moves until next time control
    pub movestogo: Option<u64>,
    /// Search until "stop"; the engine's own allocation applies.
    pub infinite: bool,
}

impl GoParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create params for a fixed depth search
    pub fn fixed_depth(depth: i32) -> Self {
        Self {
            depth: Some(depth),
            ..Default::default()
        }
    }

    /// Create params for a fixed time search
    pub fn fixed_time(ms: u64) -> Self {
        Self {
            movetime: Some(ms),
            ..Default::default()
        }
    }

    /// Budget that overrides the engine's own think time, if the command
    /// carries one. `movetime` wins over clock fields.
    pub fn budget(&self, side: Color) -> Option<Duration> {
        if let Some(ms) = self.movetime {
            return Some(Duration::from_millis(ms));
        }
        let (time, inc) = match side {
            Color::White => (self.wtime, self.winc),
            Color::Black => (self.btime, self.binc),
        };
        time.map(|left| clock_budget(left, inc.unwrap_or(0), self.movestogo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movetime_wins() {
        let params = GoParams {
            movetime: Some(250),
            wtime: Some(60_000),
            ..GoParams::new()
        };
        assert_eq!(params.budget(Color::White), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_clock_budget_per_side() {
        let params = GoParams {
            wtime: Some(60_000),
            btime: Some(30_000),
            ..GoParams::new()
        };
        assert_eq!(params.budget(Color::White), Some(Duration::from_millis(2000)));
        assert_eq!(params.budget(Color::Black), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn test_no_budget() {
        assert_eq!(GoParams::fixed_depth(4).budget(Color::White), None);
    }
}
