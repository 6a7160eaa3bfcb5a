use thiserror::Error;

/// Failures surfaced by the engine facade and its collaborators.
///
/// Running out of time is deliberately absent: a search that hits its budget
/// returns the best move of the last completed iteration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid position `{fen}`: {reason}")]
    InvalidPosition { fen: String, reason: String },
    #[error("no legal moves in this position")]
    NoLegalMoves,
    #[error("illegal move: {0}")]
    IllegalMove(String),
    #[error("cannot format move: {0}")]
    Notation(String),
    #[error("opening book error: {0}")]
    Book(String),
}
