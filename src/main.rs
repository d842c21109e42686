//! Batch simulation CLI for Echoes
//!
//! Runs headless games between two seeded random agents and reports results.

use clap::Parser;

use echoes_engine::Player;
use echoes_sim::{Agent, HeadlessRunner, Outcome, RandomAgent, SimConfig};

/// Headless Echoes simulations between scripted agents
#[derive(Parser, Debug)]
#[command(name = "echoes")]
#[command(about = "Run headless Echoes games between random agents", long_about = None)]
struct Args {
    /// Number of games to run
    #[arg(long, default_value_t = 10)]
    games: u32,

    /// Base random seed (game i runs with seed + i)
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Turn ceiling per game
    #[arg(long, default_value_t = 200)]
    max_turns: u16,

    /// Print the full per-game trace log
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let mut wins = [0u32; 2];
    let mut draws = 0u32;
    let mut stalls = 0u32;

    for game in 0..args.games {
        let seed = args.seed.wrapping_add(game as u64);
        let config = SimConfig {
            seed,
            max_turns: args.max_turns,
        };
        // Decorrelate the two agents' streams from each other and the runner
        let mut agents: [Box<dyn Agent>; 2] = [
            Box::new(RandomAgent::new(Player::One, seed ^ 0x9e37_79b9)),
            Box::new(RandomAgent::new(Player::Two, seed ^ 0x7f4a_7c15)),
        ];

        let result = HeadlessRunner::new(config).run(&mut agents);

        if args.verbose {
            for line in &result.log {
                println!("{line}");
            }
        }

        match result.outcome {
            Outcome::Winner(player) => wins[player.index()] += 1,
            Outcome::TurnCapReached => draws += 1,
            Outcome::Stalled => stalls += 1,
        }
        eprintln!(
            "game {game}: {:?} after {} rounds (score {}-{})",
            result.outcome, result.turns, result.final_state.scores[0], result.final_state.scores[1]
        );
    }

    eprintln!();
    eprintln!("Results over {} games:", args.games);
    eprintln!("  Player One wins: {}", wins[0]);
    eprintln!("  Player Two wins: {}", wins[1]);
    eprintln!("  Draws (turn cap): {draws}");
    eprintln!("  Stalled: {stalls}");
}
