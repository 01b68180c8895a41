pub mod agent;
pub mod board;
pub mod moves;
pub mod persist;
pub mod session;
pub mod settings;
pub mod spawn;
pub mod undo;

pub use board::{BOARD_DIM, Board, Tile};
pub use moves::Direction;
pub use session::{GameSession, TurnOutcome};
pub use spawn::SpawnMode;
