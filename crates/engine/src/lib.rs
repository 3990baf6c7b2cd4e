//! Core game state machine for a chat-hosted 2048 bot.
//!
//! The engine owns the tile grid and score and exposes the move/merge/spawn
//! algorithm plus game-over detection. Everything around it (chat transport,
//! image rendering, session routing) observes the engine only through the
//! read-only views exported here.

pub mod engine;
pub mod error;

pub use engine::{Direction, Game, Grid, MoveResult};
pub use error::GameError;
