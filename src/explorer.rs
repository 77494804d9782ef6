//! Exhaustive breadth-first enumeration of finished games
//!
//! Every path owns its own history, so a move is only rejected as a
//! repetition if the position occurred earlier on that same path. Paths are
//! copied when they branch and are never shared.

use anyhow::{anyhow, Result};
use indicatif::*;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use tracing::info;

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

use crate::{
    error::MoveError,
    movegen::legal_moves,
    moves::{Move, PlayerMove},
    position::{apply_move, History, Player, Position},
    CHECKPOINT_INTERVAL,
};

/// Column names of the tab-separated game log
pub const LOG_HEADER: [&str; 7] = [
    "GameID",
    "Turn",
    "State",
    "Move",
    "NextState",
    "Error",
    "Winner",
];

/// One game in progress: the positions visited so far and the moves between them
#[derive(Clone, Debug)]
pub struct Path {
    positions: Vec<Position>,
    moves: Vec<Move>,
    visited: History,
}

impl Path {
    pub fn new() -> Self {
        Self::from_position(Position::new())
    }

    pub fn from_position(start: Position) -> Self {
        Self {
            positions: vec![start],
            moves: Vec::new(),
            visited: History::new(&start),
        }
    }

    pub fn current(&self) -> &Position {
        // a path always holds its starting position
        &self.positions[self.positions.len() - 1]
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Length of the path in single-player moves
    pub fn plies(&self) -> usize {
        self.moves.len()
    }

    pub fn winner(&self) -> Option<Player> {
        self.current().winner()
    }

    /// A copy of this path with `mv` played, or the reason it can't be played here
    pub fn extend(&self, mv: Move) -> Result<Path, MoveError> {
        let next = apply_move(self.current(), Some(&mv), &self.visited)?;
        let mut child = self.clone();
        child.positions.push(next);
        child.moves.push(mv);
        child.visited.visit(next);
        Ok(child)
    }

    /// Every path one move longer than this one
    pub fn children(&self) -> Vec<Path> {
        legal_moves(self.current())
            .into_iter()
            .filter_map(|mv| self.extend(mv).ok())
            .collect()
    }

    /// The moves of this path in notation, in order
    pub fn notations(&self) -> impl Iterator<Item = String> + '_ {
        self.positions
            .iter()
            .zip(self.moves.iter())
            .map(|(position, &mv)| PlayerMove::on(position, mv).to_string())
    }

    /// SHA-256 of the move sequence, identifying the game independently of how it was reached
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        for (i, notation) in self.notations().enumerate() {
            if i > 0 {
                hasher.update(b"-");
            }
            hasher.update(notation.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    /// The game log rows for this path. Only the last row carries a winner,
    /// and only if the path ends in a terminal position.
    pub fn rows(&self, game_id: &str) -> Vec<LogRow> {
        let last = self.moves.len().saturating_sub(1);
        self.moves
            .iter()
            .enumerate()
            .map(|(i, &mv)| {
                let state = self.positions[i];
                let next_state = self.positions[i + 1];
                LogRow {
                    game_id: game_id.to_string(),
                    turn: i + 1,
                    state,
                    mv: PlayerMove::on(&state, mv),
                    next_state,
                    error: None,
                    winner: if i == last { next_state.winner() } else { None },
                }
            })
            .collect()
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::new()
    }
}

/// `G0001`, `G0002`, ...
pub fn game_id(number: usize) -> String {
    format!("G{:04}", number)
}

/// A single transition of the game log
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRow {
    pub game_id: String,
    pub turn: usize,
    pub state: Position,
    pub mv: PlayerMove,
    pub next_state: Position,
    pub error: Option<MoveError>,
    pub winner: Option<Player>,
}

impl LogRow {
    /// Parses one tab-separated line. The movers of both states are
    /// recovered from the player tag of the move.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != LOG_HEADER.len() {
            return Err(anyhow!(
                "expected {} columns in game log row, found {}: '{}'",
                LOG_HEADER.len(),
                fields.len(),
                line
            ));
        }

        let mv = fields[3].parse::<PlayerMove>()?;
        let error = match fields[5].trim() {
            "" => None,
            code => Some(
                MoveError::from_code(code)
                    .ok_or_else(|| anyhow!("unknown error code '{}'", code))?,
            ),
        };
        let next_mover = if error.is_some() {
            mv.player
        } else {
            mv.player.other()
        };
        let winner = match fields[6].trim() {
            "" => None,
            label => Some(label.parse()?),
        };

        Ok(Self {
            game_id: fields[0].to_string(),
            turn: fields[1].trim().parse()?,
            state: Position::from_notation(fields[2], mv.player)?,
            mv,
            next_state: Position::from_notation(fields[4], next_mover)?,
            error,
            winner,
        })
    }
}

impl fmt::Display for LogRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.game_id,
            self.turn,
            self.state,
            self.mv,
            self.next_state,
            self.error.map(|error| error.code()).unwrap_or(""),
            self.winner.map(|winner| winner.label()).unwrap_or("")
        )
    }
}

/// Receives each completed game as soon as the explorer finds it
pub trait GameSink {
    fn record(&mut self, game: &Path) -> Result<()>;
}

impl GameSink for Vec<Path> {
    fn record(&mut self, game: &Path) -> Result<()> {
        self.push(game.clone());
        Ok(())
    }
}

/// Streams completed games to a tab-separated log, flushing at every checkpoint
pub struct GameLogWriter<W: Write> {
    out: W,
    games: usize,
    checkpoint_interval: usize,
}

impl GameLogWriter<BufWriter<File>> {
    pub fn create<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Self::new(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> GameLogWriter<W> {
    /// Wraps `out`, writing the header row immediately
    pub fn new(mut out: W) -> Result<Self> {
        writeln!(out, "{}", LOG_HEADER.join("\t"))?;
        Ok(Self {
            out,
            games: 0,
            checkpoint_interval: CHECKPOINT_INTERVAL,
        })
    }

    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval.max(1);
        self
    }

    pub fn games_written(&self) -> usize {
        self.games
    }

    /// Flushes and returns the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> GameSink for GameLogWriter<W> {
    fn record(&mut self, game: &Path) -> Result<()> {
        self.games += 1;
        for row in game.rows(&game_id(self.games)) {
            writeln!(self.out, "{}", row)?;
        }
        if self.games % self.checkpoint_interval == 0 {
            self.out.flush()?;
            info!(games = self.games, "game log checkpoint written");
        }
        Ok(())
    }
}

/// Statistics over the games an exploration produced
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExplorationSummary {
    pub paths_examined: usize,
    pub games: usize,
    pub total_plies: usize,
    pub player_one_wins: usize,
    pub player_two_wins: usize,
}

impl ExplorationSummary {
    fn record(&mut self, game: &Path) {
        self.games += 1;
        self.total_plies += game.plies();
        match game.winner() {
            Some(Player::One) => self.player_one_wins += 1,
            Some(Player::Two) => self.player_two_wins += 1,
            None => {}
        }
    }

    /// Mean game length in plies
    pub fn average_length(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_plies as f64 / self.games as f64
    }

    pub fn win_percentage(&self, player: Player) -> f64 {
        let decided = self.player_one_wins + self.player_two_wins;
        if decided == 0 {
            return 0.0;
        }
        let wins = match player {
            Player::One => self.player_one_wins,
            Player::Two => self.player_two_wins,
        };
        wins as f64 * 100.0 / decided as f64
    }
}

impl fmt::Display for ExplorationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Paths examined: {}", self.paths_examined)?;
        writeln!(f, "Total unique games: {}", self.games)?;
        writeln!(f, "Average game length (plies): {:.2}", self.average_length())?;
        writeln!(
            f,
            "Player 1 wins: {} ({:.2}%)",
            self.player_one_wins,
            self.win_percentage(Player::One)
        )?;
        write!(
            f,
            "Player 2 wins: {} ({:.2}%)",
            self.player_two_wins,
            self.win_percentage(Player::Two)
        )
    }
}

/// Enumerates every distinct game that finishes within a move bound
///
/// # Bound
/// `max_moves` counts full moves, so paths are cut off at `2 * max_moves`
/// plies. A path that reaches the cut-off is discarded before it is checked
/// for a result, so games must finish strictly inside the bound.
pub struct Explorer {
    max_moves: usize,
    show_progress: bool,
}

impl Explorer {
    pub fn new(max_moves: usize) -> Self {
        Self {
            max_moves,
            show_progress: false,
        }
    }

    /// Shows a progress spinner on stderr while exploring
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn max_plies(&self) -> usize {
        self.max_moves * 2
    }

    /// Runs the breadth-first enumeration, handing each new finished game to `sink`
    ///
    /// The queue is processed one ply level at a time. Expanding a level is
    /// split across threads, each owning the paths it expands, and the
    /// children are gathered back in queue order.
    pub fn explore<S: GameSink>(&self, sink: &mut S) -> Result<ExplorationSummary> {
        let start = Instant::now();
        let max_plies = self.max_plies();

        let progress = if self.show_progress {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        progress.set_style(
            ProgressStyle::default_spinner().template("{spinner:.cyan} [{elapsed_precise}] {msg}"),
        );

        let mut seen_games = HashSet::new();
        let mut summary = ExplorationSummary::default();
        let mut frontier = vec![Path::new()];

        while !frontier.is_empty() {
            let mut expandable = Vec::with_capacity(frontier.len());
            for path in frontier {
                summary.paths_examined += 1;

                if path.plies() >= max_plies {
                    continue;
                }
                if path.current().is_terminal() {
                    if seen_games.insert(path.content_hash()) {
                        summary.record(&path);
                        sink.record(&path)?;
                    }
                    continue;
                }
                expandable.push(path);
            }

            frontier = expandable
                .par_iter()
                .flat_map_iter(|path| path.children())
                .collect();

            progress.set_message(&format!(
                "Examined {} paths, found {} complete games, queue size {}",
                summary.paths_examined,
                summary.games,
                frontier.len()
            ));
            progress.tick();
        }

        progress.finish_and_clear();
        info!(
            games = summary.games,
            paths = summary.paths_examined,
            max_moves = self.max_moves,
            "exploration complete in {}",
            HumanDuration(start.elapsed())
        );
        Ok(summary)
    }

    /// Runs the enumeration and keeps every finished game in memory
    pub fn explore_games(&self) -> Result<(Vec<Path>, ExplorationSummary)> {
        let mut games = Vec::new();
        let summary = self.explore(&mut games)?;
        Ok((games, summary))
    }
}
