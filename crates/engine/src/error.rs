use thiserror::Error;

/// Errors surfaced at the engine API boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Construction asked for a grid smaller than the minimum playable size.
    #[error("invalid grid size {size}: must be at least 2")]
    InvalidSize { size: usize },

    /// A direction symbol from the transport layer did not name one of the
    /// four moves. Rejected before it ever reaches the engine.
    #[error("unrecognized direction symbol {0:?}")]
    InvalidDirection(String),

    /// A tile spawn was attempted on a full grid. The feasibility check
    /// guarantees an empty cell after every accepted move, so this is a
    /// logic fault, not a normal game state.
    #[error("no empty cell available to spawn a tile")]
    SpawnExhausted,
}
