//! Core types for headless simulation

use echoes_engine::{GameState, Player};
use serde::{Deserialize, Serialize};

/// Hard ceiling on rounds per game. The replay mechanic has no structural
/// guarantee of termination, so runs past this bound are reported as draws.
pub const DEFAULT_TURN_CAP: u16 = 200;

/// Configuration for one simulation run
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Seed for the runner's fallback instruction picker. Agents carry their
    /// own seeds; keeping the two separate keeps runs replayable.
    pub seed: u64,

    /// Maximum number of completed rounds before the run is declared a draw
    pub max_turns: u16,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_turns: DEFAULT_TURN_CAP,
        }
    }
}

/// How a simulation run ended
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// A win condition fired for this player
    Winner(Player),

    /// No legal action was available, or an agent returned no action.
    /// Recoverable at the driver level; never an error.
    Stalled,

    /// The turn ceiling was reached; the run counts as a draw
    TurnCapReached,
}

/// Result contract produced by the headless runner
#[derive(Clone, Debug)]
pub struct SimulationResult {
    /// Winning player, or None for stalls and draws
    pub winner: Option<Player>,

    /// Why the run terminated
    pub outcome: Outcome,

    /// State at termination
    pub final_state: GameState,

    /// Ordered human-readable trace lines
    pub log: Vec<String>,

    /// One snapshot per applied transition, starting with the initial state
    pub history: Vec<GameState>,

    /// Completed rounds at termination
    pub turns: u16,
}
