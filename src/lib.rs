//! An agent for playing or analysing the hand game 'Chopsticks'
//!
//! Positions are small enough that every game up to a move bound can be
//! enumerated offline. The resulting win statistics form a lookup table
//! which is preferred at runtime, with a depth-bounded negamax search as
//! the fallback for positions the table does not cover.
//!
//! # Basic Usage
//!
//! ```
//! use chopsticks_ai::{History, MoveDatabase, MoveSelector, Difficulty, Position};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! let position = Position::new();
//! let history = History::new(&position);
//! let mut selector = MoveSelector::new(MoveDatabase::minimal()).with_seed(7);
//!
//! let selection = selector.select(&position, &history, Difficulty::Master)?;
//! assert!(selection.perfect);
//! assert_eq!(selection.notation(&position), "P1L>P2R");
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod error;

pub mod position;

pub mod moves;

pub mod movegen;

pub mod evaluator;

pub mod explorer;

pub mod database;

pub mod solver;

pub mod selector;

mod test;

pub use database::{DatabaseBuilder, DatabaseEntry, DatabaseKey, MoveDatabase};
pub use error::MoveError;
pub use evaluator::evaluate;
pub use explorer::{ExplorationSummary, Explorer, GameLogWriter, GameSink, Path};
pub use movegen::legal_moves;
pub use moves::{Move, MoveList, PlayerMove};
pub use position::{apply_move, Hands, History, Player, Position, Side};
pub use selector::{Difficulty, MoveSelector, Selection};
pub use solver::Searcher;

/// The number of hands each player has
pub const HANDS: usize = 2;

/// Finger counts wrap around at this value, a hand reaching it is dead
pub const FINGER_MODULUS: u8 = 5;

/// The largest finger count a living hand can hold
pub const MAX_FINGERS: u8 = FINGER_MODULUS - 1;

/// Default location of the binary move database
pub const DATABASE_PATH: &str = "chopsticks_database.bin";

/// Default location of the raw game log produced by the explorer
pub const GAME_LOG_PATH: &str = "complete_chopsticks_games.tsv";

/// Default exploration bound, in full moves (one move per player)
pub const DEFAULT_MAX_MOVES: usize = 10;

/// Number of completed games between game log checkpoints
pub const CHECKPOINT_INTERVAL: usize = 100_000;

// every hand value and every split total must fit in a byte of the database format
const_assert!(HANDS == 2);
const_assert!((MAX_FINGERS as usize) * HANDS < i8::MAX as usize);
