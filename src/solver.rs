//! Depth-limited negamax search with alpha-beta pruning

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::{debug, trace, warn};

use crate::{
    error::MoveError,
    evaluator::{evaluate, WIN_SCORE},
    movegen::legal_moves,
    moves::{Move, PlayerMove},
    position::{apply_move, History, Position},
};

/// A bound outside every reachable score
pub const INFINITY: i32 = 10 * WIN_SCORE;

/// Searches for the best move of the player to move
///
/// # Notes
/// Scores come from [`evaluate`] at the leaves and are always from the
/// point of view of the player to move at the searched position. Moves
/// that would repeat a position of the game (the given history plus the
/// line being searched) are skipped.
#[derive(Clone)]
pub struct Searcher {
    history: History,
    rng: StdRng,

    /// The number of nodes searched by this `Searcher` so far (for diagnostics only)
    pub node_count: usize,
}

impl Searcher {
    /// Creates a new `Searcher` with an empty game history
    pub fn new() -> Self {
        Self {
            history: History::default(),
            rng: StdRng::from_entropy(),
            node_count: 0,
        }
    }

    /// Uses a fixed seed for the root move shuffle, making results reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Searches as a continuation of a game that has already visited `history`
    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    /// Returns the best move from `position` and its score, searching
    /// `depth` plies. Terminal positions and positions without a playable
    /// move return no move and their static score.
    pub fn best_move(&mut self, position: &Position, depth: u32) -> (Option<Move>, i32) {
        self.node_count += 1;

        let mut moves = legal_moves(position);
        if moves.is_empty() || position.is_terminal() {
            return (None, evaluate(position));
        }

        // break ties between equal moves differently each time
        moves.shuffle(&mut self.rng);

        let root_added = self.history.visit(*position);
        let result = self.search_root(position, &moves, depth);
        if root_added {
            self.history.forget(position);
        }
        result
    }

    fn search_root(
        &mut self,
        position: &Position,
        moves: &[Move],
        depth: u32,
    ) -> (Option<Move>, i32) {
        let mut best_move = None;
        let mut best_score = -INFINITY;
        let mut alpha = -INFINITY;
        let beta = INFINITY;

        for &mv in moves {
            let child = match apply_move(position, Some(&mv), &self.history) {
                Ok(child) => child,
                // the game history rules out repetitions at the root as well
                Err(MoveError::Repeat) => {
                    debug!(mv = %PlayerMove::on(position, mv), "skipping repeating move");
                    continue;
                }
                Err(err) => {
                    warn!(
                        mv = %PlayerMove::on(position, mv),
                        state = %position,
                        "illegal move skipped in search: {}", err
                    );
                    continue;
                }
            };

            let score = -self.search_child(child, depth.saturating_sub(1), -beta, -alpha);
            if score > best_score {
                best_score = score;
                best_move = Some(mv);
                alpha = alpha.max(score);
            }
        }

        match best_move {
            Some(mv) => (Some(mv), best_score),
            None => (None, evaluate(position)),
        }
    }

    /// Performs game tree search
    ///
    /// Returns the score of the position for the player to move, clamped
    /// into the `alpha..=beta` window
    fn negamax(&mut self, position: &Position, depth: u32, mut alpha: i32, beta: i32) -> i32 {
        self.node_count += 1;

        if depth == 0 || position.is_terminal() {
            return evaluate(position);
        }

        let mut searched = false;
        for mv in legal_moves(position) {
            let child = match apply_move(position, Some(&mv), &self.history) {
                Ok(child) => child,
                Err(err) => {
                    trace!(mv = %PlayerMove::on(position, mv), "skipping move: {}", err);
                    continue;
                }
            };
            searched = true;

            // the search window is flipped for the other player
            let score = -self.search_child(child, depth - 1, -beta, -alpha);
            // a perfect opponent will avoid this branch
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        // every move repeats a position, nothing better to do than stay put
        if !searched {
            return evaluate(position);
        }
        alpha
    }

    // marks `child` as visited for the duration of its subtree
    fn search_child(&mut self, child: Position, depth: u32, alpha: i32, beta: i32) -> i32 {
        self.history.visit(child);
        let score = self.negamax(&child, depth, alpha, beta);
        self.history.forget(&child);
        score
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}
