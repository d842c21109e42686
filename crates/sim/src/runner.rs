//! Headless simulation driver
//!
//! Runs one complete two-player game from the initial state to a terminal
//! state without any rendering surface: catalog -> agent -> transition, with
//! one history snapshot per applied transition and a textual trace log.

use echoes_engine::{
    apply_action, initial_state, resolve_replay, valid_actions, valid_instructions, Echo,
    GameAction, GameState, Phase, Player,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Agent, Outcome, SimConfig, SimulationResult};

/// Orchestrates a full game between two agents. One runner owns one game;
/// running many games concurrently takes one runner per game with no shared
/// state.
pub struct HeadlessRunner {
    config: SimConfig,
    /// Fallback picker for agents without the per-instruction hook
    rng: StdRng,
    log: Vec<String>,
}

impl HeadlessRunner {
    pub fn new(config: SimConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            rng,
            log: Vec::new(),
        }
    }

    fn trace(&mut self, line: String) {
        debug!("{line}");
        self.log.push(line);
    }

    /// Run one game to termination. `agents` is indexed by `Player::index`.
    pub fn run(mut self, agents: &mut [Box<dyn Agent>; 2]) -> SimulationResult {
        let mut state = initial_state();
        let mut history = vec![state.clone()];
        let mut rounds: u16 = 0;

        for agent in agents.iter_mut() {
            agent.reset();
        }
        self.trace(format!(
            "game start: {} vs {}, turn cap {}",
            agents[0].name(),
            agents[1].name(),
            self.config.max_turns
        ));

        let (winner, outcome) = loop {
            if let Some(won) = state.winner {
                self.trace(format!("winner: {won:?} after {rounds} rounds"));
                break (Some(won), Outcome::Winner(won));
            }
            if rounds >= self.config.max_turns {
                self.trace(format!(
                    "turn cap of {} reached; declaring a draw",
                    self.config.max_turns
                ));
                break (None, Outcome::TurnCapReached);
            }

            if state.phase == Phase::Replay {
                state = self.resolve_round(state, &mut history);
                rounds += 1;
                continue;
            }

            let player = state.current_player;
            let actions = valid_actions(&state, player);
            if actions.is_empty() {
                warn!("no legal actions for {player:?} on turn {}", state.turn);
                self.trace(format!(
                    "turn {}: no legal actions for {player:?}; game stalls",
                    state.turn
                ));
                break (None, Outcome::Stalled);
            }

            let all_placements = actions
                .iter()
                .all(|a| matches!(a, GameAction::PlaceEcho { .. }));
            let pending = state.pending_echo.clone().filter(|p| p.owner == player);

            if all_placements {
                let Some(action) = agents[player.index()].choose_action(&state, &actions) else {
                    self.trace(format!(
                        "turn {}: {player:?} no action returned; game stalls",
                        state.turn
                    ));
                    break (None, Outcome::Stalled);
                };
                if let GameAction::PlaceEcho { at } = &action {
                    self.trace(format!(
                        "turn {}: {player:?} places echo at ({}, {})",
                        state.turn, at.row, at.col
                    ));
                }
                state = self.apply(state, &action, &mut history);
            } else if let Some(draft) = pending {
                let draft = self.program_echo(draft, &state, agents[player.index()].as_mut());
                self.trace(format!(
                    "turn {}: {player:?} programs echo {} with {} steps",
                    state.turn,
                    draft.id,
                    draft.instructions.len()
                ));
                state = self.apply(state, &GameAction::FinalizeEcho { echo: draft }, &mut history);
                state = self.apply(state, &GameAction::SubmitTurn { player }, &mut history);
                state = self.apply(state, &GameAction::SwitchPlayer, &mut history);
            } else {
                let Some(action) = agents[player.index()].choose_action(&state, &actions) else {
                    self.trace(format!(
                        "turn {}: {player:?} no action returned; game stalls",
                        state.turn
                    ));
                    break (None, Outcome::Stalled);
                };
                state = self.apply(state, &action, &mut history);
            }
        };

        info!("simulation finished: {outcome:?}");
        let result = SimulationResult {
            winner,
            outcome,
            final_state: state,
            log: self.log,
            history,
            turns: rounds,
        };
        for agent in agents.iter_mut() {
            agent.on_game_end(&result, &result.history);
        }
        result
    }

    /// Assign one instruction per remaining action point, asking the agent's
    /// per-instruction hook and falling back to a uniform-random pick.
    fn program_echo(
        &mut self,
        mut draft: Echo,
        state: &GameState,
        agent: &mut dyn Agent,
    ) -> Echo {
        while draft.ap_remaining > 0 {
            let choices = valid_instructions(&draft);
            if choices.is_empty() {
                break;
            }
            let instr = match agent.choose_instruction(state, draft.id, &choices) {
                Some(instr) => instr,
                None => {
                    let idx = self.rng.random_range(0..choices.len() as u32) as usize;
                    choices[idx]
                }
            };
            draft.instructions.push(instr);
            // cost floor of 1 so a malformed zero-cost pick cannot spin forever
            draft.ap_remaining = draft.ap_remaining.saturating_sub(instr.cost.max(1));
        }
        draft
    }

    /// Resolve one full replay round: tick execution, scoring, history record,
    /// win check, and (absent a winner) the advance to the next turn.
    fn resolve_round(&mut self, state: GameState, history: &mut Vec<GameState>) -> GameState {
        let turn = state.turn;
        let outcome = resolve_replay(&state);
        self.trace(format!(
            "turn {turn}: replay resolved over {} ticks, {} echoes destroyed",
            outcome.state.current_tick,
            outcome.destroyed.len()
        ));
        for (id, by) in &outcome.destroyed {
            let credit = match by {
                Some(player) => format!("point to {player:?}"),
                None => "no point awarded".to_string(),
            };
            self.trace(format!("turn {turn}: echo {id} destroyed ({credit})"));
        }

        let mut next = outcome.state;
        history.push(next.clone());
        next = self.apply(
            next,
            &GameAction::UpdateScores {
                destroyed: outcome.destroyed,
            },
            history,
        );
        next = self.apply(
            next,
            &GameAction::RecordTurn {
                record: outcome.record,
            },
            history,
        );
        next = self.apply(next, &GameAction::CheckWin, history);
        if next.winner.is_none() {
            next = self.apply(next, &GameAction::NextTurn, history);
        }
        next
    }

    fn apply(
        &mut self,
        state: GameState,
        action: &GameAction,
        history: &mut Vec<GameState>,
    ) -> GameState {
        let next = apply_action(state, action);
        history.push(next.clone());
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RandomAgent;
    use echoes_engine::{EchoId, Instruction};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Agent that always declines to act
    struct NullAgent {
        player: Player,
    }

    impl Agent for NullAgent {
        fn id(&self) -> &str {
            "null"
        }

        fn name(&self) -> &str {
            "Null"
        }

        fn player(&self) -> Player {
            self.player
        }

        fn choose_action(
            &mut self,
            _state: &GameState,
            _actions: &[GameAction],
        ) -> Option<GameAction> {
            None
        }
    }

    /// Agent that records whether its lifecycle hooks fired
    struct ProbeAgent {
        inner: RandomAgent,
        resets: Rc<Cell<u32>>,
        game_ends: Rc<Cell<u32>>,
    }

    impl Agent for ProbeAgent {
        fn id(&self) -> &str {
            self.inner.id()
        }

        fn name(&self) -> &str {
            "Probe"
        }

        fn player(&self) -> Player {
            self.inner.player()
        }

        fn choose_action(
            &mut self,
            state: &GameState,
            actions: &[GameAction],
        ) -> Option<GameAction> {
            self.inner.choose_action(state, actions)
        }

        fn choose_instruction(
            &mut self,
            state: &GameState,
            echo: EchoId,
            choices: &[Instruction],
        ) -> Option<Instruction> {
            self.inner.choose_instruction(state, echo, choices)
        }

        fn reset(&mut self) {
            self.resets.set(self.resets.get() + 1);
        }

        fn on_game_end(&mut self, _result: &SimulationResult, history: &[GameState]) {
            assert!(!history.is_empty());
            self.game_ends.set(self.game_ends.get() + 1);
        }
    }

    fn random_pair(seed: u64) -> [Box<dyn Agent>; 2] {
        [
            Box::new(RandomAgent::new(Player::One, seed)),
            Box::new(RandomAgent::new(Player::Two, seed.wrapping_add(1))),
        ]
    }

    #[test]
    fn test_random_game_terminates_within_turn_cap() {
        let mut agents = random_pair(42);
        let result = HeadlessRunner::new(SimConfig {
            seed: 42,
            ..Default::default()
        })
        .run(&mut agents);

        assert!(result.turns <= 200);
        assert!(!result.history.is_empty());
        assert!(!result.log.is_empty());
        match result.outcome {
            Outcome::Winner(player) => assert_eq!(result.winner, Some(player)),
            Outcome::Stalled | Outcome::TurnCapReached => assert!(result.winner.is_none()),
        }
    }

    #[test]
    fn test_history_starts_at_initial_state() {
        let mut agents = random_pair(7);
        let result = HeadlessRunner::new(SimConfig {
            seed: 7,
            ..Default::default()
        })
        .run(&mut agents);
        assert_eq!(result.history[0], initial_state());
    }

    #[test]
    fn test_one_history_record_per_completed_round() {
        let mut agents = random_pair(3);
        let result = HeadlessRunner::new(SimConfig {
            seed: 3,
            ..Default::default()
        })
        .run(&mut agents);
        assert_eq!(
            result.final_state.turn_history.len(),
            result.turns as usize
        );
    }

    #[test]
    fn test_null_agent_stalls_on_first_turn() {
        let mut agents: [Box<dyn Agent>; 2] = [
            Box::new(NullAgent {
                player: Player::One,
            }),
            Box::new(NullAgent {
                player: Player::Two,
            }),
        ];
        let result = HeadlessRunner::new(SimConfig::default()).run(&mut agents);

        assert_eq!(result.winner, None);
        assert_eq!(result.outcome, Outcome::Stalled);
        assert_eq!(result.turns, 0);
        assert_eq!(result.final_state.turn, 1);
        assert!(
            result.log.iter().any(|line| line.contains("no action returned")),
            "stall must be logged explicitly: {:?}",
            result.log
        );
    }

    #[test]
    fn test_same_seeds_reproduce_the_run() {
        let run = |seed: u64| {
            let mut agents = random_pair(seed);
            HeadlessRunner::new(SimConfig {
                seed,
                ..Default::default()
            })
            .run(&mut agents)
        };

        let a = run(1234);
        let b = run(1234);
        assert_eq!(a.winner, b.winner);
        assert_eq!(a.outcome, b.outcome);
        assert_eq!(a.turns, b.turns);
        assert_eq!(a.final_state, b.final_state);
        assert_eq!(a.log, b.log);
    }

    #[test]
    fn test_lifecycle_hooks_fire_once_per_game() {
        let resets = Rc::new(Cell::new(0));
        let game_ends = Rc::new(Cell::new(0));
        let mut agents: [Box<dyn Agent>; 2] = [
            Box::new(ProbeAgent {
                inner: RandomAgent::new(Player::One, 11),
                resets: Rc::clone(&resets),
                game_ends: Rc::clone(&game_ends),
            }),
            Box::new(ProbeAgent {
                inner: RandomAgent::new(Player::Two, 12),
                resets: Rc::clone(&resets),
                game_ends: Rc::clone(&game_ends),
            }),
        ];
        let _result = HeadlessRunner::new(SimConfig {
            seed: 11,
            ..Default::default()
        })
        .run(&mut agents);

        assert_eq!(resets.get(), 2, "one reset per agent");
        assert_eq!(game_ends.get(), 2, "one game-end notification per agent");
    }

    #[test]
    fn test_scores_never_decrease_across_history() {
        let mut agents = random_pair(21);
        let result = HeadlessRunner::new(SimConfig {
            seed: 21,
            ..Default::default()
        })
        .run(&mut agents);

        let mut prev = [0u32, 0];
        for snapshot in &result.history {
            assert!(snapshot.scores[0] >= prev[0]);
            assert!(snapshot.scores[1] >= prev[1]);
            prev = snapshot.scores;
        }
    }
}
