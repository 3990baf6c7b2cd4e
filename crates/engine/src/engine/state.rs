use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ops;
use crate::error::GameError;

/// A direction to slide/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector `(dx, dy)` for this direction, y growing downward.
    #[inline]
    pub fn vector(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

impl FromStr for Direction {
    type Err = GameError;

    /// Parse a boundary symbol into a direction. Anything unrecognized is a
    /// caller error, rejected here so it never reaches `make_move`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            "left" | "l" => Ok(Direction::Left),
            "right" | "r" => Ok(Direction::Right),
            _ => Err(GameError::InvalidDirection(s.trim().to_string())),
        }
    }
}

/// Outcome of one accepted call to [`Game::make_move`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MoveResult {
    /// The move was not feasible; grid, score and tile count are untouched
    /// and no tile was spawned.
    NoChange,
    /// The grid changed, one tile spawned, and at least one direction still
    /// admits a move.
    Continue,
    /// The grid changed, one tile spawned, and no direction can change the
    /// grid any further.
    GameOver,
}

/// Owned `size × size` board of tile values, row-major.
///
/// Cell value 0 means empty; every non-zero cell holds a power of two
/// written by a spawn or a merge. Renderers consume this read-only; only
/// the engine mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<u32>,
}

impl Grid {
    pub(crate) fn new(size: usize) -> Self {
        Grid {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Grid dimension N (the board is N×N).
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// All cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// Iterate over the rows, top to bottom.
    #[inline]
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.cells.chunks(self.size)
    }

    /// Value at column `x`, row `y` (0 if empty).
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.cells[y * self.size + x]
    }

    #[inline]
    pub(crate) fn set(&mut self, x: usize, y: usize, value: u32) {
        self.cells[y * self.size + x] = value;
    }

    #[inline]
    pub(crate) fn index_of(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    #[inline]
    pub(crate) fn cells_mut(&mut self) -> &mut [u32] {
        &mut self.cells
    }

    /// Count the number of empty cells.
    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&c| c == 0).count()
    }

    /// Sum of all tile values on the board.
    pub fn total(&self) -> u64 {
        self.cells.iter().map(|&c| c as u64).sum()
    }

    /// Highest tile value present (0 on an empty board).
    pub fn highest_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    pub(crate) fn clear(&mut self) {
        self.cells.fill(0);
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for &cell in row {
                if cell == 0 {
                    write!(f, "{:>7}", ".")?;
                } else {
                    write!(f, "{:>7}", cell)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// One player's game: the grid, the score, and the per-turn merge scratch.
///
/// Mutation happens only inside [`Game::make_move`] and [`Game::reset`].
/// The engine exposes no locking; a transport layer must serialize move
/// submissions for a single instance.
#[derive(Debug, Clone)]
pub struct Game {
    owner_id: String,
    grid: Grid,
    score: u64,
    /// One flag per cell marking merge targets for the current turn, so a
    /// merged tile never merges again within the same move. Sized to the
    /// grid once at construction and reused every turn.
    merged: Vec<bool>,
}

impl Game {
    pub const DEFAULT_SIZE: usize = 4;

    /// Create a game for `owner_id` on an N×N grid with the two starting
    /// tiles spawned, drawing randomness from `rng`.
    ///
    /// ```
    /// use chat2048_engine::Game;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let game = Game::new("player-1", 4, &mut rng).unwrap();
    /// assert_eq!(game.grid().count_empty(), 14);
    /// ```
    pub fn new<R: Rng + ?Sized>(
        owner_id: impl Into<String>,
        size: usize,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if size < 2 {
            return Err(GameError::InvalidSize { size });
        }
        let mut game = Game {
            owner_id: owner_id.into(),
            grid: Grid::new(size),
            score: 0,
            merged: vec![false; size * size],
        };
        game.reset(rng);
        Ok(game)
    }

    /// Convenience: like [`Game::new`] but uses the thread-local RNG.
    pub fn new_thread(owner_id: impl Into<String>, size: usize) -> Result<Self, GameError> {
        Self::new(owner_id, size, &mut rand::thread_rng())
    }

    /// Identifier of the actor allowed to submit moves.
    #[inline]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Grid dimension N.
    #[inline]
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    /// Cumulative score: the value of every merged tile, once per merge.
    #[inline]
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Read-only view of the board. The only observation surface for a
    /// renderer.
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// All tiles in row-major order; 0 means empty.
    #[inline]
    pub fn tiles(&self) -> &[u32] {
        self.grid.cells()
    }

    /// Apply one move: slide, merge, spawn, then classify the result.
    ///
    /// Returns [`MoveResult::NoChange`] without mutating anything when the
    /// direction cannot change the grid. Otherwise the slide/merge pass
    /// runs, exactly one tile spawns (2 at 90%, 4 at 10%, uniform over the
    /// empty cells), and the result says whether any move remains.
    ///
    /// `GameError::SpawnExhausted` signals a broken invariant (spawn on a
    /// full grid) and is propagated rather than swallowed.
    pub fn make_move<R: Rng + ?Sized>(
        &mut self,
        direction: Direction,
        rng: &mut R,
    ) -> Result<MoveResult, GameError> {
        if !ops::can_shift(&self.grid, direction) {
            return Ok(MoveResult::NoChange);
        }

        self.score += ops::shift(&mut self.grid, direction, &mut self.merged);
        ops::spawn_random_tile(&mut self.grid, rng)?;

        if ops::is_stuck(&self.grid) {
            Ok(MoveResult::GameOver)
        } else {
            Ok(MoveResult::Continue)
        }
    }

    /// Convenience: like [`Game::make_move`] but uses the thread-local RNG.
    pub fn make_move_thread(&mut self, direction: Direction) -> Result<MoveResult, GameError> {
        self.make_move(direction, &mut rand::thread_rng())
    }

    /// True iff no direction can change the grid. Pure query.
    pub fn is_game_over(&self) -> bool {
        ops::is_stuck(&self.grid)
    }

    /// Clear the board, zero the score, and spawn the two starting tiles.
    ///
    /// Score is reset along with the board: a reset starts a fresh game,
    /// not a continuation.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.grid.clear();
        self.score = 0;
        for _ in 0..2 {
            ops::spawn_random_tile(&mut self.grid, rng)
                .expect("freshly cleared grid has empty cells");
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.grid)
    }
}
