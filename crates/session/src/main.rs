mod sessions;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;

use chat2048_engine::{Direction, Game};
use sessions::{RouteOutcome, SessionStore};

/// Console host: plays one game through the session store, standing in for
/// the chat transport while developing the engine.
#[derive(Parser, Debug)]
struct Args {
    /// Grid dimension (N for an N×N board).
    #[arg(long, default_value_t = Game::DEFAULT_SIZE)]
    size: usize,
    /// Seed for the tile RNG; entropy-seeded if omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Owner id attached to the game.
    #[arg(long, default_value = "console")]
    player: String,
}

const SESSION_KEY: &str = "console";

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut store = SessionStore::new();
    let game = store
        .start(SESSION_KEY, &args.player, args.size, &mut rng)
        .context("failed to start game")?;
    render(game);

    let stdin = io::stdin();
    prompt()?;
    for line in stdin.lock().lines() {
        let line = line.context("failed to read input")?;
        let input = line.trim();
        match input {
            "" => {}
            "q" | "quit" => break,
            "reset" => {
                if let Some(game) = store.game_mut(SESSION_KEY) {
                    game.reset(&mut rng);
                    render(game);
                }
            }
            _ => {
                let direction = match input.parse::<Direction>() {
                    Ok(direction) => direction,
                    Err(err) => {
                        // Caller error, not a game result; drop the input.
                        warn!("{err}");
                        prompt()?;
                        continue;
                    }
                };
                match store.submit(SESSION_KEY, &args.player, direction, &mut rng)? {
                    RouteOutcome::NoChange => println!("no tiles moved"),
                    RouteOutcome::Continue => {
                        render(store.game(SESSION_KEY).expect("game still running"));
                    }
                    RouteOutcome::Finished(game) => {
                        render(&game);
                        println!("Game over! Final score: {}", game.score());
                        break;
                    }
                    RouteOutcome::UnknownSession | RouteOutcome::NotOwner => unreachable!(),
                }
            }
        }
        prompt()?;
    }

    Ok(())
}

fn render(game: &Game) {
    println!("{game}");
    println!("Score: {}", game.score());
}

fn prompt() -> Result<()> {
    print!("move (up/down/left/right, reset, quit)> ");
    io::stdout().flush().context("failed to flush stdout")
}
