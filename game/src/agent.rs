use engine::GameLogic;

use crate::moves::Direction;
use crate::session::GameSession;
use crate::spawn::SpawnMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    Move(Direction),
    Undo,
    NewGame,
    SetSpawnMode(SpawnMode),
    Noop,
}

/// Seeded game definition so runs can be replayed headlessly.
#[derive(Debug, Clone)]
pub struct MergeGame {
    seed: u64,
    spawn_mode: SpawnMode,
}

impl MergeGame {
    pub fn new(seed: u64, spawn_mode: SpawnMode) -> Self {
        Self { seed, spawn_mode }
    }

    pub fn deterministic() -> Self {
        Self::new(0, SpawnMode::Deterministic)
    }
}

impl GameLogic for MergeGame {
    type State = GameSession;
    type Input = MergeAction;

    fn initial_state(&self) -> Self::State {
        let mut session = GameSession::with_seed(self.spawn_mode, self.seed);
        session.start_new_game(self.spawn_mode);
        session
    }

    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State {
        let mut next = state.clone();
        apply_action(&mut next, input);
        next
    }
}

pub fn apply_action(session: &mut GameSession, action: MergeAction) {
    match action {
        MergeAction::Move(dir) => {
            session.play_turn(dir);
        }
        MergeAction::Undo => {
            session.undo();
        }
        MergeAction::NewGame => {
            let mode = session.spawn_mode();
            session.start_new_game(mode);
        }
        MergeAction::SetSpawnMode(mode) => session.set_spawn_mode(mode),
        MergeAction::Noop => {}
    }
}
