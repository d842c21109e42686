//! Agent API for action selection

use echoes_engine::{EchoId, GameAction, GameState, Instruction, Player};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::SimulationResult;

/// Trait for anything that can choose actions for one side of a game: random
/// policy, rule-based heuristic, or a learned policy. All variants are
/// drop-in compatible with the headless runner.
///
/// Decisions are synchronous from the runner's point of view: a decision call
/// must return before the next transition is applied.
pub trait Agent {
    /// Stable identifier for this agent instance
    fn id(&self) -> &str;

    /// Display name
    fn name(&self) -> &str;

    /// The side this agent plays
    fn player(&self) -> Player;

    /// Choose one action from a pre-computed legal-action list, or None to
    /// decline. Returning None ends the run as a stall, never a crash.
    fn choose_action(&mut self, state: &GameState, actions: &[GameAction]) -> Option<GameAction>;

    /// Optional per-instruction hook for programming a pending echo. The
    /// default declines, and the runner falls back to a uniform-random pick
    /// from the legal choices.
    fn choose_instruction(
        &mut self,
        _state: &GameState,
        _echo: EchoId,
        _choices: &[Instruction],
    ) -> Option<Instruction> {
        None
    }

    /// Clear any internal memory between games
    fn reset(&mut self) {}

    /// Called once per game with the final result and the full state history,
    /// for agents that learn from outcomes
    fn on_game_end(&mut self, _result: &SimulationResult, _history: &[GameState]) {}
}

/// Agent that samples uniformly from whatever legal set it is handed, for
/// both the placement/finalization decision and the per-instruction decision.
/// No persisted state beyond its injected rng.
pub struct RandomAgent {
    id: String,
    player: Player,
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(player: Player, seed: u64) -> Self {
        Self {
            id: format!("random-{}", player.index() + 1),
            player,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Random"
    }

    fn player(&self) -> Player {
        self.player
    }

    fn choose_action(&mut self, _state: &GameState, actions: &[GameAction]) -> Option<GameAction> {
        if actions.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..actions.len() as u32) as usize;
        Some(actions[idx].clone())
    }

    fn choose_instruction(
        &mut self,
        _state: &GameState,
        _echo: EchoId,
        choices: &[Instruction],
    ) -> Option<Instruction> {
        if choices.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..choices.len() as u32) as usize;
        Some(choices[idx])
    }
}
