//! Echoes Game Engine
//!
//! A phase-driven state engine for the tactical board game Echoes. Each side
//! programs units ("echoes") with an instruction sequence that replays
//! automatically every round until the unit is destroyed.
//!
//! Core object is a single `GameState` (plain data). No logic baked into
//! methods; pure functions operate on it. Every transition is referentially
//! transparent: identical inputs always produce an identical output, with no
//! hidden randomness or I/O.

use serde::{Deserialize, Serialize};

// =============================================================================
// Basic types and constants
// =============================================================================

/// Board side length (8x8 grid)
pub const BOARD_SIZE: u8 = 8;

/// Action-point budget a freshly placed echo can be programmed with
pub const STARTING_ACTION_POINTS: u8 = 5;

/// First score to reach this threshold wins (unless both cross together)
pub const WINNING_SCORE: u32 = 10;

/// Unique echo identifier, allocated from `GameState::next_echo_id`
pub type EchoId = u32;

/// One of the two sides of a game
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Player {
    One = 0,
    Two = 1,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Row on which this player may place new echoes
    pub fn home_row(self) -> u8 {
        match self {
            Player::One => 0,
            Player::Two => BOARD_SIZE - 1,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A board cell; `row` and `col` are both in `0..BOARD_SIZE`
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub fn new(row: u8, col: u8) -> Self {
        Position { row, col }
    }

    /// Cell one step in the given direction, or None when that leaves the board
    pub fn step(self, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.delta();
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if (0..BOARD_SIZE as i8).contains(&row) && (0..BOARD_SIZE as i8).contains(&col) {
            Some(Position {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }
}

/// One of the 8 unit directions. Rows grow toward player Two's home row.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East,
    South,
    West,
    North,
    SouthEast,
    NorthEast,
    SouthWest,
    NorthWest,
}

/// Fixed enumeration order. This is the tie-break for deterministic action
/// enumeration; agents that pick "first legal" or index into the instruction
/// list depend on it.
pub const ALL_DIRECTIONS: [Direction; 8] = [
    Direction::East,
    Direction::South,
    Direction::West,
    Direction::North,
    Direction::SouthEast,
    Direction::NorthEast,
    Direction::SouthWest,
    Direction::NorthWest,
];

impl Direction {
    /// (row, col) offset, components in {-1, 0, 1}
    pub fn delta(self) -> (i8, i8) {
        match self {
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
            Direction::North => (-1, 0),
            Direction::SouthEast => (1, 1),
            Direction::NorthEast => (-1, 1),
            Direction::SouthWest => (1, -1),
            Direction::NorthWest => (-1, -1),
        }
    }
}

// =============================================================================
// Instructions and echoes
// =============================================================================

/// Instruction type tag. Only `Walk` is enumerable and executable in this
/// core; the other tags exist so programs and saved states stay forward
/// compatible with the full rule set.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    Walk,
    Dash,
    Fire,
    Mine,
    Shield,
}

/// One step of an echo's program
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub direction: Direction,
    /// 1-based replay tick at which this instruction fires
    pub tick: u8,
    /// Action-point cost
    pub cost: u8,
}

impl Instruction {
    pub fn walk(direction: Direction, tick: u8) -> Self {
        Instruction {
            kind: InstructionKind::Walk,
            direction,
            tick,
            cost: 1,
        }
    }
}

/// A player-controlled unit that replays its program every round until
/// destroyed. Owned exclusively by the player who created it; mutated only by
/// the transition engine.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub id: EchoId,
    pub owner: Player,
    pub position: Position,
    /// The ordered program replayed each round
    pub instructions: Vec<Instruction>,
    pub shield_active: bool,
    pub shield_facing: Option<Direction>,
    pub ap_remaining: u8,
    pub ap_total: u8,
    pub alive: bool,
}

impl Echo {
    pub fn new(id: EchoId, owner: Player, position: Position) -> Self {
        Echo {
            id,
            owner,
            position,
            instructions: Vec::new(),
            shield_active: false,
            shield_facing: None,
            ap_remaining: STARTING_ACTION_POINTS,
            ap_total: STARTING_ACTION_POINTS,
            alive: true,
        }
    }

    /// Cell the echo reaches after its already-programmed movement steps.
    /// Steps that would leave the board hold position, matching replay.
    pub fn projected_position(&self) -> Position {
        self.instructions
            .iter()
            .fold(self.position, |pos, instr| match instr.kind {
                InstructionKind::Walk | InstructionKind::Dash => {
                    pos.step(instr.direction).unwrap_or(pos)
                }
                _ => pos,
            })
    }
}

// =============================================================================
// Derived board view
// =============================================================================

/// What occupies a board cell in the derived view
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum CellContent {
    Echo(EchoId),
    Projectile,
    Mine,
}

/// 8x8 snapshot of cell contents
pub type Board = [[Option<CellContent>; BOARD_SIZE as usize]; BOARD_SIZE as usize];

/// The board grid is a derived cache of entity positions, never a source of
/// truth; it is recomputed on demand from the echo list.
pub fn board(state: &GameState) -> Board {
    let mut grid: Board = [[None; BOARD_SIZE as usize]; BOARD_SIZE as usize];
    for echo in state.echoes.iter().filter(|e| e.alive) {
        grid[echo.position.row as usize][echo.position.col as usize] =
            Some(CellContent::Echo(echo.id));
    }
    grid
}

// =============================================================================
// Turn history
// =============================================================================

/// A single event observed while resolving one round
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TurnEvent {
    Moved {
        echo: EchoId,
        from: Position,
        to: Position,
    },
    /// A replayed step would have left the board; the echo held position
    Blocked {
        echo: EchoId,
        at: Position,
        direction: Direction,
    },
    Destroyed {
        echo: EchoId,
        at: Position,
        by: Option<Player>,
    },
}

/// One entry per completed round, sufficient to regenerate a per-round log
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn: u16,
    pub events: Vec<TurnEvent>,
}

// =============================================================================
// Game state
// =============================================================================

/// Turn phase. The replay phase is entered only once both players have
/// submitted their turn.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    Input,
    Replay,
}

/// The single state-of-record. Immutable per step: every transition produces
/// a new value, never mutates one in place under a caller.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Authoritative entity list; positions live here, not on the board grid
    pub echoes: Vec<Echo>,
    pub phase: Phase,
    /// Replay tick most recently executed (0 outside replay)
    pub current_tick: u8,
    /// 1-based round counter
    pub turn: u16,
    /// Per-player scores, indexed by `Player::index`; monotonically
    /// non-decreasing
    pub scores: [u32; 2],
    pub current_player: Player,
    /// The echo currently being created or extended; at most one, owned by
    /// the acting player, committed to `echoes` only on finalize
    pub pending_echo: Option<Echo>,
    /// Which players have submitted this turn, indexed by `Player::index`
    pub submitted: [bool; 2],
    pub winner: Option<Player>,
    pub turn_history: Vec<TurnRecord>,
    /// Next id to hand out; kept in the state so id allocation stays pure
    pub next_echo_id: EchoId,
}

/// The canonical initial snapshot: empty board, zero scores, input phase,
/// player One to act.
pub fn initial_state() -> GameState {
    GameState {
        echoes: Vec::new(),
        phase: Phase::Input,
        current_tick: 0,
        turn: 1,
        scores: [0, 0],
        current_player: Player::One,
        pending_echo: None,
        submitted: [false, false],
        winner: None,
        turn_history: Vec::new(),
        next_echo_id: 0,
    }
}

impl Default for GameState {
    fn default() -> Self {
        initial_state()
    }
}

/// Look up an echo by id
pub fn find_echo(state: &GameState, id: EchoId) -> Option<&Echo> {
    state.echoes.iter().find(|e| e.id == id)
}

fn living_count(state: &GameState, player: Player) -> usize {
    state
        .echoes
        .iter()
        .filter(|e| e.alive && e.owner == player)
        .count()
}

// =============================================================================
// Actions
// =============================================================================

/// Every legal mutation of a `GameState`. Actions the engine cannot apply in
/// the given state (unknown ids, out-of-range cells, repeat submissions) are
/// no-ops by policy, never errors, so malformed agent output cannot corrupt
/// state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Return to the canonical initial state
    Reset,
    /// Instantiate a fresh echo for the current player and set it pending
    PlaceEcho { at: Position },
    /// Set an existing echo pending for extension, without appending
    SelectEcho { id: EchoId },
    /// Commit a programmed echo: replace by id in place, or append when new.
    /// Clears the pending echo and records the acting player's submission.
    FinalizeEcho { echo: Echo },
    /// Toggle the player to act
    SwitchPlayer,
    /// Record a submission; once both players are in, input advances to replay
    SubmitTurn { player: Player },
    /// Advance the round counter, reset phase bookkeeping, and prune dead
    /// echoes. This is the only point at which dead echoes leave the list.
    NextTurn,
    /// Unconditional removal, independent of the alive flag
    RemoveEcho { id: EchoId },
    /// Append a round record to the turn history
    RecordTurn { record: TurnRecord },
    /// Credit one point per destroyed echo with an attributable destroyer
    UpdateScores {
        destroyed: Vec<(EchoId, Option<Player>)>,
    },
    /// Evaluate win conditions against the current snapshot
    CheckWin,
}

// =============================================================================
// Action catalog
// =============================================================================

/// Enumerate the complete set of legal actions for `player` — never a sample,
/// never partial. Empty when it is not this player's turn or the phase is not
/// input.
pub fn valid_actions(state: &GameState, player: Player) -> Vec<GameAction> {
    if state.phase != Phase::Input || player != state.current_player {
        return Vec::new();
    }

    match &state.pending_echo {
        Some(pending) if pending.owner == player => {
            vec![GameAction::FinalizeEcho {
                echo: pending.clone(),
            }]
        }
        Some(_) => Vec::new(),
        None => {
            let home = player.home_row();
            let mut occupied = [false; BOARD_SIZE as usize];
            for echo in state.echoes.iter().filter(|e| e.alive) {
                if echo.position.row == home {
                    occupied[echo.position.col as usize] = true;
                }
            }
            // Ascending column scan fixes enumeration order for deterministic
            // agents and tests. A fully occupied home row yields zero
            // placements: a stalled turn, not an error.
            (0..BOARD_SIZE)
                .filter(|&col| !occupied[col as usize])
                .map(|col| GameAction::PlaceEcho {
                    at: Position::new(home, col),
                })
                .collect()
        }
    }
}

/// Enumerate the legal single-step instructions for a partially-programmed
/// echo: one walk per direction (fixed table order) whose projected cell stays
/// in bounds. An echo with no remaining action points yields nothing.
pub fn valid_instructions(echo: &Echo) -> Vec<Instruction> {
    if echo.ap_remaining == 0 {
        return Vec::new();
    }
    let from = echo.projected_position();
    let tick = echo.instructions.len() as u8 + 1;
    ALL_DIRECTIONS
        .iter()
        .filter(|dir| from.step(**dir).is_some())
        .map(|dir| Instruction::walk(*dir, tick))
        .collect()
}

// =============================================================================
// State transition engine
// =============================================================================

/// Pure mapping from (state, action) to the next state. Inapplicable actions
/// return the state unchanged; this is the explicit default policy.
pub fn apply_action(mut state: GameState, action: &GameAction) -> GameState {
    match action {
        GameAction::Reset => initial_state(),

        GameAction::PlaceEcho { at } => {
            if at.row >= BOARD_SIZE || at.col >= BOARD_SIZE || state.pending_echo.is_some() {
                return state;
            }
            let echo = Echo::new(state.next_echo_id, state.current_player, *at);
            state.next_echo_id += 1;
            state.echoes.push(echo.clone());
            state.pending_echo = Some(echo);
            state
        }

        GameAction::SelectEcho { id } => {
            if let Some(echo) = find_echo(&state, *id) {
                state.pending_echo = Some(echo.clone());
            }
            state
        }

        GameAction::FinalizeEcho { echo } => {
            match state.echoes.iter_mut().find(|e| e.id == echo.id) {
                // Replace in place: preserves position in the list
                Some(slot) => *slot = echo.clone(),
                None => state.echoes.push(echo.clone()),
            }
            state.pending_echo = None;
            // Idempotent: re-submission is a no-op if already present
            state.submitted[state.current_player.index()] = true;
            state
        }

        GameAction::SwitchPlayer => {
            state.current_player = state.current_player.opponent();
            state
        }

        GameAction::SubmitTurn { player } => {
            state.submitted[player.index()] = true;
            if state.phase == Phase::Input && state.submitted.iter().all(|&s| s) {
                state.phase = Phase::Replay;
            }
            state
        }

        GameAction::NextTurn => {
            state.turn += 1;
            state.phase = Phase::Input;
            state.current_tick = 0;
            state.submitted = [false, false];
            state.pending_echo = None;
            state.echoes.retain(|e| e.alive);
            state
        }

        GameAction::RemoveEcho { id } => {
            state.echoes.retain(|e| e.id != *id);
            state
        }

        GameAction::RecordTurn { record } => {
            state.turn_history.push(record.clone());
            state
        }

        GameAction::UpdateScores { destroyed } => {
            for (_, destroyer) in destroyed {
                if let Some(player) = destroyer {
                    state.scores[player.index()] += 1;
                }
            }
            state
        }

        GameAction::CheckWin => {
            if state.winner.is_none() {
                state.winner = winner_for(&state);
            }
            state
        }
    }
}

/// Evaluate win conditions in fixed priority order: column control, then
/// mutual elimination, then score threshold. The first satisfied,
/// non-ambiguous condition wins; conditions both sides satisfy simultaneously
/// let the game continue.
fn winner_for(state: &GameState) -> Option<Player> {
    let controls = |player: Player| {
        let mut cols = [false; BOARD_SIZE as usize];
        for echo in state.echoes.iter().filter(|e| e.alive && e.owner == player) {
            cols[echo.position.col as usize] = true;
        }
        cols.iter().all(|&c| c)
    };

    // 1. Column control: living echoes spanning all 8 distinct columns
    let one_controls = controls(Player::One);
    let two_controls = controls(Player::Two);
    if one_controls != two_controls {
        return Some(if one_controls { Player::One } else { Player::Two });
    }

    // 2. Mutual elimination: exactly one side emptied
    let one_alive = living_count(state, Player::One);
    let two_alive = living_count(state, Player::Two);
    if one_alive == 0 && two_alive > 0 {
        return Some(Player::Two);
    }
    if two_alive == 0 && one_alive > 0 {
        return Some(Player::One);
    }

    // 3. Score threshold
    let one_scored = state.scores[Player::One.index()] >= WINNING_SCORE;
    let two_scored = state.scores[Player::Two.index()] >= WINNING_SCORE;
    if one_scored != two_scored {
        return Some(if one_scored { Player::One } else { Player::Two });
    }

    None
}

// =============================================================================
// Replay resolution
// =============================================================================

/// Result of resolving one replay phase: the post-replay state, the destroyed
/// echoes with attribution (input to `UpdateScores`), and the round record
/// (input to `RecordTurn`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReplayOutcome {
    pub state: GameState,
    pub destroyed: Vec<(EchoId, Option<Player>)>,
    pub record: TurnRecord,
}

/// Execute every living echo's program in lockstep, one tick at a time.
///
/// Deterministic and order-independent: each tick's destinations are computed
/// from the pre-tick snapshot before any echo moves. A step that would leave
/// the board is skipped (the echo holds position). After each tick, any cell
/// holding two or more living echoes destroys all of them; the destroyer
/// attributed to a victim is the opposing player when an opposing echo shares
/// the cell, otherwise none. Destroyed echoes vacate the board for later ticks
/// but stay in the list, marked dead, until `NextTurn` prunes them.
pub fn resolve_replay(state: &GameState) -> ReplayOutcome {
    let mut next = state.clone();
    let mut events = Vec::new();
    let mut destroyed = Vec::new();

    let max_tick = next
        .echoes
        .iter()
        .filter(|e| e.alive)
        .map(|e| e.instructions.len())
        .max()
        .unwrap_or(0) as u8;

    for tick in 1..=max_tick {
        next.current_tick = tick;

        // Destinations from the pre-tick snapshot; movement is simultaneous.
        let moves: Vec<(EchoId, Position, Direction, Option<Position>)> = next
            .echoes
            .iter()
            .filter(|e| e.alive)
            .filter_map(|e| {
                let instr = e.instructions.iter().find(|i| i.tick == tick)?;
                match instr.kind {
                    InstructionKind::Walk => {
                        Some((e.id, e.position, instr.direction, e.position.step(instr.direction)))
                    }
                    // Other kinds are not executable in this core
                    _ => None,
                }
            })
            .collect();

        for (id, from, direction, dest) in &moves {
            match dest {
                Some(to) => {
                    events.push(TurnEvent::Moved {
                        echo: *id,
                        from: *from,
                        to: *to,
                    });
                    if let Some(echo) = next.echoes.iter_mut().find(|e| e.id == *id) {
                        echo.position = *to;
                    }
                }
                None => {
                    events.push(TurnEvent::Blocked {
                        echo: *id,
                        at: *from,
                        direction: *direction,
                    });
                }
            }
        }

        // Collision pass: any cell shared by two or more living echoes
        let living: Vec<(EchoId, Position, Player)> = next
            .echoes
            .iter()
            .filter(|e| e.alive)
            .map(|e| (e.id, e.position, e.owner))
            .collect();

        for (id, pos, owner) in &living {
            let colliders: Vec<&(EchoId, Position, Player)> = living
                .iter()
                .filter(|(other_id, other_pos, _)| other_id != id && other_pos == pos)
                .collect();
            if colliders.is_empty() {
                continue;
            }
            let by = colliders
                .iter()
                .any(|(_, _, other_owner)| other_owner != owner)
                .then(|| owner.opponent());
            destroyed.push((*id, by));
            events.push(TurnEvent::Destroyed {
                echo: *id,
                at: *pos,
                by,
            });
            if let Some(echo) = next.echoes.iter_mut().find(|e| e.id == *id) {
                echo.alive = false;
            }
        }
    }

    let record = TurnRecord {
        turn: next.turn,
        events,
    };

    ReplayOutcome {
        state: next,
        destroyed,
        record,
    }
}
