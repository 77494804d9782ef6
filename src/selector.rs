//! Move selection: database first, search otherwise

use anyhow::anyhow;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tracing::debug;

use std::fmt;
use std::str::FromStr;

use crate::{
    database::MoveDatabase,
    error::MoveError,
    movegen::legal_moves,
    moves::{Move, PlayerMove},
    position::{apply_move, History, Position},
    solver::Searcher,
};

/// Chance that a novice ignores search and plays any legal move
pub const NOVICE_RANDOM_MOVE_PROBABILITY: f64 = 0.3;

/// How strongly the AI plays when the database has no answer
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Novice,
    Intermediate,
    Master,
}

impl Difficulty {
    /// Search depth in plies
    pub fn depth(self) -> u32 {
        match self {
            Difficulty::Novice => 2,
            Difficulty::Intermediate => 4,
            Difficulty::Master => 6,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Difficulty::Novice => "novice",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Master => "master",
        })
    }
}

impl FromStr for Difficulty {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "novice" => Ok(Difficulty::Novice),
            "intermediate" => Ok(Difficulty::Intermediate),
            "master" => Ok(Difficulty::Master),
            other => Err(anyhow!(
                "unknown difficulty '{}', expected novice, intermediate or master",
                other
            )),
        }
    }
}

/// A chosen move. `perfect` moves come from the database.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub mv: Move,
    pub score: i32,
    pub perfect: bool,
}

impl Selection {
    /// Notation of the move when played from `position`
    pub fn notation(&self, position: &Position) -> String {
        PlayerMove::on(position, self.mv).to_string()
    }
}

/// Chooses moves for the AI player
///
/// The database is shared read-only, so selectors for different games can
/// hold clones of the same handle.
pub struct MoveSelector {
    database: MoveDatabase,
    rng: StdRng,
}

impl MoveSelector {
    pub fn new(database: MoveDatabase) -> Self {
        Self {
            database,
            rng: StdRng::from_entropy(),
        }
    }

    /// Fixes the seed used for random novice moves and search tie-breaking
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn database(&self) -> &MoveDatabase {
        &self.database
    }

    /// Picks a move for the player to move in `position`
    ///
    /// A database entry wins outright. Its best candidate is used unless the
    /// game's `history` makes it a repetition, in which case the next best
    /// candidate is tried. Without a usable entry the position is searched to
    /// the depth of `difficulty`.
    pub fn select(
        &mut self,
        position: &Position,
        history: &History,
        difficulty: Difficulty,
    ) -> Result<Selection, MoveError> {
        if let Some(entry) = self.database.get(position) {
            let playable = entry
                .ranked()
                .into_iter()
                .find(|(mv, _)| apply_move(position, Some(mv), history).is_ok());
            match playable {
                Some((mv, score)) => {
                    debug!(mv = %PlayerMove::on(position, mv), score, "database move");
                    return Ok(Selection {
                        mv,
                        score,
                        perfect: true,
                    });
                }
                None => debug!(state = %position, "every database move repeats, searching"),
            }
        }

        if difficulty == Difficulty::Novice && self.rng.gen_bool(NOVICE_RANDOM_MOVE_PROBABILITY) {
            let moves = legal_moves(position);
            let playable: Vec<Move> = moves
                .iter()
                .copied()
                .filter(|mv| apply_move(position, Some(mv), history).is_ok())
                .collect();
            let mv = *playable.choose(&mut self.rng).ok_or(MoveError::NoMove)?;
            debug!(mv = %PlayerMove::on(position, mv), "random novice move");
            return Ok(Selection {
                mv,
                score: 0,
                perfect: false,
            });
        }

        let depth = difficulty.depth();
        let mut searcher = Searcher::new()
            .with_seed(self.rng.gen())
            .with_history(history.clone());
        let (mv, score) = searcher.best_move(position, depth);
        let mv = mv.ok_or(MoveError::NoMove)?;
        debug!(
            mv = %PlayerMove::on(position, mv),
            score,
            depth,
            nodes = searcher.node_count,
            "search move"
        );
        Ok(Selection {
            mv,
            score,
            perfect: false,
        })
    }
}
