//! The move database built from enumerated games
//!
//! Each key is an exact position including the player to move. The value
//! lists every move seen played from that position in the game log, all
//! sharing the win rate of the player to move, scaled to `-100..=100`.

use anyhow::{anyhow, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use tracing::{debug, info, warn};

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::sync::Arc;

use crate::{
    explorer::{LogRow, Path, LOG_HEADER},
    moves::{Move, PlayerMove, MAX_MOVES},
    position::{Hands, Player, Position, Side},
    FINGER_MODULUS,
};

/// Score given to the single opening move of the fallback database
pub const MINIMAL_OPENING_SCORE: i32 = 10;

/// Number of distinct keys: every pair of hands for both players, either to move
const MAX_KEYS: usize = (FINGER_MODULUS as usize).pow(4) * 2;

/// Database lookup key, `(p1 left, p1 right, p2 left, p2 right, mover)`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatabaseKey {
    pub player_one: Hands,
    pub player_two: Hands,
    pub mover: Player,
}

impl DatabaseKey {
    pub fn of(position: &Position) -> Self {
        Self {
            player_one: position.hands(Player::One),
            player_two: position.hands(Player::Two),
            mover: position.mover(),
        }
    }

    fn to_bytes(&self) -> [u8; 5] {
        [
            self.player_one.left(),
            self.player_one.right(),
            self.player_two.left(),
            self.player_two.right(),
            self.mover.index() as u8,
        ]
    }

    fn from_bytes(bytes: [u8; 5]) -> Result<Self> {
        Ok(Self {
            player_one: Hands::new(bytes[0], bytes[1])?,
            player_two: Hands::new(bytes[2], bytes[3])?,
            mover: Player::from_index(bytes[4] as usize)
                .ok_or_else(|| anyhow!("invalid mover {} in database key", bytes[4]))?,
        })
    }
}

/// Candidate moves for one position with their scores, as parallel lists
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DatabaseEntry {
    pub moves: Vec<Move>,
    pub scores: Vec<i32>,
}

impl DatabaseEntry {
    /// The highest scoring move, the earliest one on ties
    pub fn best(&self) -> Option<(Move, i32)> {
        self.ranked().into_iter().next()
    }

    /// All candidates from best to worst, keeping list order between equal scores
    pub fn ranked(&self) -> Vec<(Move, i32)> {
        let mut ranked: Vec<(Move, i32)> = self
            .moves
            .iter()
            .copied()
            .zip(self.scores.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Read-only handle to a move database, cheap to clone and share between threads
#[derive(Clone)]
pub struct MoveDatabase(Arc<DatabaseStorage>);

impl MoveDatabase {
    pub fn from_entries(entries: HashMap<DatabaseKey, DatabaseEntry>) -> Self {
        Self(Arc::new(DatabaseStorage { entries }))
    }

    /// A database that only knows the opening, `P1L>P2R` from the start position
    pub fn minimal() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            DatabaseKey::of(&Position::new()),
            DatabaseEntry {
                moves: vec![Move::Tap {
                    attacker: Side::Left,
                    defender: Side::Right,
                }],
                scores: vec![MINIMAL_OPENING_SCORE],
            },
        );
        Self::from_entries(entries)
    }

    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let database = Self::read_from(BufReader::new(File::open(path.as_ref())?))?;
        info!(
            positions = database.len(),
            path = %path.as_ref().display(),
            "loaded move database"
        );
        Ok(database)
    }

    pub fn read_from<R: Read>(mut input: R) -> Result<Self> {
        let count = input.read_u32::<BigEndian>()?;
        if count as usize > MAX_KEYS {
            return Err(anyhow!(
                "database claims {} entries, at most {} positions exist",
                count,
                MAX_KEYS
            ));
        }
        let mut entries = HashMap::with_capacity(count as usize);

        for _ in 0..count {
            let mut key = [0; 5];
            input.read_exact(&mut key)?;
            let key = DatabaseKey::from_bytes(key)?;

            let candidates = input.read_u8()?;
            if candidates as usize > MAX_MOVES {
                return Err(anyhow!("database entry has {} candidate moves", candidates));
            }
            let mut entry = DatabaseEntry::default();
            for _ in 0..candidates {
                let mut encoded = [0; 5];
                input.read_exact(&mut encoded)?;
                entry.moves.push(Move::from_bytes(encoded)?);
                entry.scores.push(input.read_i8()? as i32);
            }
            entries.insert(key, entry);
        }
        Ok(Self::from_entries(entries))
    }

    /// Loads the database at `database_path`, or builds it from the game log
    /// at `log_path` and saves it. Falls back to [`MoveDatabase::minimal`]
    /// when neither works, so this never fails.
    pub fn load_or_build<P, Q>(database_path: P, log_path: Q) -> Self
    where
        P: AsRef<std::path::Path>,
        Q: AsRef<std::path::Path>,
    {
        let database_path = database_path.as_ref();
        let log_path = log_path.as_ref();

        if database_path.exists() {
            match Self::load(database_path) {
                Ok(database) => return database,
                Err(err) => warn!(
                    path = %database_path.display(),
                    "could not read move database, rebuilding: {}", err
                ),
            }
        }

        match DatabaseBuilder::from_log_file(log_path) {
            Ok(builder) if !builder.is_empty() => {
                let database = builder.build();
                if let Err(err) = database.save(database_path) {
                    warn!(path = %database_path.display(), "could not save move database: {}", err);
                }
                database
            }
            Ok(_) => {
                warn!(path = %log_path.display(), "game log has no usable games, using minimal database");
                Self::minimal()
            }
            Err(err) => {
                warn!(path = %log_path.display(), "could not read game log, using minimal database: {}", err);
                Self::minimal()
            }
        }
    }
}

impl std::ops::Deref for MoveDatabase {
    type Target = DatabaseStorage;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub struct DatabaseStorage {
    entries: HashMap<DatabaseKey, DatabaseEntry>,
}

impl DatabaseStorage {
    pub fn get(&self, position: &Position) -> Option<&DatabaseEntry> {
        self.entries.get(&DatabaseKey::of(position))
    }

    pub fn contains(&self, position: &Position) -> bool {
        self.entries.contains_key(&DatabaseKey::of(position))
    }

    pub fn best_move(&self, position: &Position) -> Option<(Move, i32)> {
        self.get(position).and_then(DatabaseEntry::best)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&DatabaseKey, &DatabaseEntry)> {
        self.entries.iter()
    }

    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let mut file = BufWriter::new(
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path.as_ref())?,
        );
        self.write_to(&mut file)?;
        file.flush()?;
        info!(
            positions = self.len(),
            path = %path.as_ref().display(),
            "saved move database"
        );
        Ok(())
    }

    /// Writes entries sorted by key so equal databases give identical files
    pub fn write_to<W: Write>(&self, mut out: W) -> Result<()> {
        let mut keys: Vec<&DatabaseKey> = self.entries.keys().collect();
        keys.sort_unstable();

        out.write_u32::<BigEndian>(keys.len() as u32)?;
        for key in keys {
            let entry = &self.entries[key];
            out.write_all(&key.to_bytes())?;
            out.write_u8(entry.len() as u8)?;
            for (mv, &score) in entry.moves.iter().zip(entry.scores.iter()) {
                out.write_all(&mv.to_bytes())?;
                out.write_i8(score as i8)?;
            }
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct Tally {
    wins: u32,
    games: u32,
}

/// Aggregates logged games into a [`MoveDatabase`]
///
/// Every transition adds its move to the candidates of its pre-move
/// position and, when its game has a winner, counts a game (and a win, if
/// the winner is the player who moved) for that position.
#[derive(Default)]
pub struct DatabaseBuilder {
    candidates: HashMap<DatabaseKey, Vec<Move>>,
    tallies: HashMap<DatabaseKey, Tally>,
    games: usize,
    skipped_rows: usize,
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_log_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let mut builder = Self::new();
        builder.read_log(BufReader::new(File::open(path.as_ref())?))?;
        info!(
            games = builder.games,
            positions = builder.candidates.len(),
            skipped = builder.skipped_rows,
            path = %path.as_ref().display(),
            "read game log"
        );
        Ok(builder)
    }

    /// Reads a tab-separated game log. Rows of one game must be consecutive.
    /// Rows that fail to decode or parse are skipped.
    pub fn read_log<R: BufRead>(&mut self, mut reader: R) -> Result<()> {
        let mut game_rows: Vec<LogRow> = Vec::new();
        let mut buffer = Vec::new();

        for number in 0usize.. {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer)? == 0 {
                break;
            }
            let line = match std::str::from_utf8(&buffer) {
                Ok(line) => line.trim_end_matches(|c: char| c == '\r' || c == '\n'),
                Err(err) => {
                    debug!(line = number + 1, "skipping game log row: {}", err);
                    self.skipped_rows += 1;
                    continue;
                }
            };
            if line.trim().is_empty() || (number == 0 && line.starts_with(LOG_HEADER[0])) {
                continue;
            }
            let row = match LogRow::parse(line) {
                Ok(row) => row,
                Err(err) => {
                    debug!(line = number + 1, "skipping game log row: {}", err);
                    self.skipped_rows += 1;
                    continue;
                }
            };
            if game_rows.last().map_or(false, |last| last.game_id != row.game_id) {
                self.add_game(&game_rows);
                game_rows.clear();
            }
            game_rows.push(row);
        }
        if !game_rows.is_empty() {
            self.add_game(&game_rows);
        }
        Ok(())
    }

    /// Adds the rows of one logged game
    pub fn add_game(&mut self, rows: &[LogRow]) {
        let winner = rows.iter().rev().find_map(|row| row.winner);
        self.games += 1;

        for row in rows {
            if row.error.is_some() {
                continue;
            }
            // the logged move has to lead from the logged state to the logged next state
            if row.state.apply(&row.mv.mv) != Ok(row.next_state) {
                debug!(game = %row.game_id, turn = row.turn, "inconsistent game log row");
                self.skipped_rows += 1;
                continue;
            }
            self.add_transition(&row.state, row.mv, winner);
        }
    }

    /// Adds a game straight from the explorer, without going through a log
    pub fn add_path(&mut self, path: &Path) {
        let winner = path.winner();
        self.games += 1;
        for (position, &mv) in path.positions().iter().zip(path.moves().iter()) {
            self.add_transition(position, PlayerMove::on(position, mv), winner);
        }
    }

    fn add_transition(&mut self, state: &Position, mv: PlayerMove, winner: Option<Player>) {
        let key = DatabaseKey::of(state);
        let candidates = self.candidates.entry(key).or_default();
        if !candidates.contains(&mv.mv) {
            candidates.push(mv.mv);
        }

        if let Some(winner) = winner {
            let tally = self.tallies.entry(key).or_default();
            tally.games += 1;
            if winner == state.mover() {
                tally.wins += 1;
            }
        }
    }

    pub fn games(&self) -> usize {
        self.games
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Win rate of the mover at `key` scaled to `-100..=100`, 0 if no finished game passed through it
    fn score(&self, key: &DatabaseKey) -> i32 {
        match self.tallies.get(key) {
            Some(tally) if tally.games > 0 => {
                let win_rate = tally.wins as f64 / tally.games as f64;
                (win_rate * 200.0 - 100.0).round() as i32
            }
            _ => 0,
        }
    }

    pub fn build(&self) -> MoveDatabase {
        let entries = self
            .candidates
            .iter()
            .map(|(key, moves)| {
                let score = self.score(key);
                (
                    *key,
                    DatabaseEntry {
                        moves: moves.clone(),
                        scores: vec![score; moves.len()],
                    },
                )
            })
            .collect();
        MoveDatabase::from_entries(entries)
    }
}
