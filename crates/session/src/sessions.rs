use std::collections::HashMap;

use log::{debug, info};
use rand::Rng;

use chat2048_engine::{Direction, Game, GameError, MoveResult};

/// What became of one routed directional input.
#[derive(Debug)]
pub enum RouteOutcome {
    /// No game under this key; the event belongs to someone else.
    UnknownSession,
    /// The actor is not the owner of this game; input ignored.
    NotOwner,
    /// The move was infeasible; nothing to re-render.
    NoChange,
    /// The grid changed and the game goes on; re-render.
    Continue,
    /// The game reached a terminal state. The session was evicted and the
    /// finished game is handed back for a final render.
    Finished(Game),
}

/// Explicit store of in-flight games, keyed by an opaque session id (the
/// chat message id in the bot deployment).
///
/// Owned by the transport layer and passed by reference wherever routing
/// happens; nothing here is process-global. One game per key, one owner
/// per game, and all moves for a key arrive through [`SessionStore::submit`]
/// so each engine instance sees a serialized stream of moves.
#[derive(Default)]
pub struct SessionStore {
    games: HashMap<String, Game>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a game for `owner_id` under `key`. An existing game under the
    /// same key is replaced.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        key: impl Into<String>,
        owner_id: impl Into<String>,
        size: usize,
        rng: &mut R,
    ) -> Result<&Game, GameError> {
        let key = key.into();
        let game = Game::new(owner_id, size, rng)?;
        info!("started game for {} under session {key}", game.owner_id());
        self.games.insert(key.clone(), game);
        Ok(self.games.get(&key).expect("just inserted"))
    }

    pub fn game(&self, key: &str) -> Option<&Game> {
        self.games.get(key)
    }

    pub fn game_mut(&mut self, key: &str) -> Option<&mut Game> {
        self.games.get_mut(key)
    }

    #[allow(dead_code)]
    pub fn remove(&mut self, key: &str) -> Option<Game> {
        self.games.remove(key)
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.games.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Route one directional input to the game under `key`.
    ///
    /// Inputs for unknown sessions or from non-owners are ignored, matching
    /// how the bot treats stray reactions. A terminal move evicts the
    /// session; the engine stays memory-resident only while its game runs.
    pub fn submit<R: Rng + ?Sized>(
        &mut self,
        key: &str,
        actor_id: &str,
        direction: Direction,
        rng: &mut R,
    ) -> Result<RouteOutcome, GameError> {
        let Some(game) = self.games.get_mut(key) else {
            return Ok(RouteOutcome::UnknownSession);
        };
        if game.owner_id() != actor_id {
            debug!("ignoring move from {actor_id} on {}'s game", game.owner_id());
            return Ok(RouteOutcome::NotOwner);
        }

        match game.make_move(direction, rng)? {
            MoveResult::NoChange => Ok(RouteOutcome::NoChange),
            MoveResult::Continue => Ok(RouteOutcome::Continue),
            MoveResult::GameOver => {
                let finished = self
                    .games
                    .remove(key)
                    .expect("session present moments ago");
                info!(
                    "game ended for {} under session {key} (score {})",
                    finished.owner_id(),
                    finished.score()
                );
                Ok(RouteOutcome::Finished(finished))
            }
        }
    }
}
