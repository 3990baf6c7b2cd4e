//! Engine module: the N×N tile grid and the move/merge/spawn state machine.
//!
//! - `Game` is the per-player engine instance with its grid and score.
//! - `Grid` is the owned board; renderers read it, nothing outside mutates it.
//! - Hot algorithms (scan order, slide/merge, spawn) live in `ops`.

mod ops;
pub mod state;

pub use state::{Direction, Game, Grid, MoveResult};
