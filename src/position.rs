//! Positions of the game and the rules for moving between them

use anyhow::{anyhow, Result};

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::{error::MoveError, moves::Move, FINGER_MODULUS, HANDS, MAX_FINGERS};

/// One of the two players. `One` always moves first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    pub fn other(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Player::One),
            1 => Some(Player::Two),
            _ => None,
        }
    }

    /// The `P1`/`P2` tag used by move notation and the game log
    pub fn label(self) -> &'static str {
        match self {
            Player::One => "P1",
            Player::Two => "P2",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Player {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "P1" => Ok(Player::One),
            "P2" => Ok(Player::Two),
            other => Err(anyhow!("could not parse '{}' as a player", other)),
        }
    }
}

/// Which of a player's two hands
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; HANDS] = [Side::Left, Side::Right];

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Side::ALL.get(index).copied()
    }

    pub fn letter(self) -> char {
        match self {
            Side::Left => 'L',
            Side::Right => 'R',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'L' => Some(Side::Left),
            'R' => Some(Side::Right),
            _ => None,
        }
    }
}

/// The finger counts of one player's hands, each in `0..=MAX_FINGERS`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hands {
    left: u8,
    right: u8,
}

impl Hands {
    /// Both hands showing one finger, as at the start of a game
    pub const START: Hands = Hands { left: 1, right: 1 };

    /// Both hands dead
    pub const DEAD: Hands = Hands { left: 0, right: 0 };

    pub fn new(left: u8, right: u8) -> Result<Self> {
        if left > MAX_FINGERS || right > MAX_FINGERS {
            return Err(anyhow!(
                "invalid hands {}-{}, finger counts must be between 0 and {}",
                left,
                right,
                MAX_FINGERS
            ));
        }
        Ok(Self { left, right })
    }

    // callers guarantee both values are at most MAX_FINGERS
    pub(crate) const fn new_unchecked(left: u8, right: u8) -> Self {
        Self { left, right }
    }

    pub fn left(&self) -> u8 {
        self.left
    }

    pub fn right(&self) -> u8 {
        self.right
    }

    pub fn get(&self, side: Side) -> u8 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Copy of these hands with one side replaced
    pub fn with(&self, side: Side, fingers: u8) -> Self {
        match side {
            Side::Left => Self::new_unchecked(fingers, self.right),
            Side::Right => Self::new_unchecked(self.left, fingers),
        }
    }

    pub fn swapped(&self) -> Self {
        Self::new_unchecked(self.right, self.left)
    }

    pub fn total(&self) -> u8 {
        self.left + self.right
    }

    pub fn is_alive(&self, side: Side) -> bool {
        self.get(side) > 0
    }

    pub fn alive_count(&self) -> u8 {
        Side::ALL.iter().filter(|&&side| self.is_alive(side)).count() as u8
    }

    pub fn is_dead(&self) -> bool {
        *self == Self::DEAD
    }

    pub fn is_symmetric(&self) -> bool {
        self.left == self.right
    }

    /// `1-0` or `0-1`, a lone finger cannot be split
    pub fn is_single_finger(&self) -> bool {
        self.total() == 1
    }
}

impl fmt::Display for Hands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.left, self.right)
    }
}

impl FromStr for Hands {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_pair(s, '-')
    }
}

/// Parses two finger counts separated by `separator`, e.g. `2-3` or `2|3`
pub(crate) fn parse_pair(s: &str, separator: char) -> Result<Hands> {
    let mut parts = s.trim().split(separator);
    let mut next_count = || -> Result<u8> {
        let part = parts
            .next()
            .ok_or_else(|| anyhow!("could not parse '{}' as a pair of hands", s))?;
        part.trim()
            .parse::<u8>()
            .map_err(|_| anyhow!("could not parse '{}' as a finger count", part))
    };
    let left = next_count()?;
    let right = next_count()?;
    if parts.next().is_some() {
        return Err(anyhow!("could not parse '{}' as a pair of hands", s));
    }
    Hands::new(left, right)
}

/// A complete game position: both players' hands and whose turn it is
///
/// Positions are plain values. Applying a move never changes a position,
/// it produces the next one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    hands: [Hands; 2],
    mover: Player,
}

impl Position {
    /// The starting position, `1-1 | 1-1` with player one to move
    pub fn new() -> Self {
        Self {
            hands: [Hands::START; 2],
            mover: Player::One,
        }
    }

    pub fn from_hands(player_one: Hands, player_two: Hands, mover: Player) -> Result<Self> {
        if player_one.is_dead() && player_two.is_dead() {
            return Err(anyhow!("invalid position, both players have lost"));
        }
        Ok(Self {
            hands: [player_one, player_two],
            mover,
        })
    }

    /// Parses a state string such as `= 1-1 | 1-2`. The mover is not part of
    /// the notation and has to be supplied.
    pub fn from_notation(state: &str, mover: Player) -> Result<Self> {
        let trimmed = state.trim();
        let body = trimmed.strip_prefix('=').unwrap_or(trimmed);
        let mut players = body.split('|');
        let player_one = players
            .next()
            .ok_or_else(|| anyhow!("could not parse '{}' as a state", state))?
            .parse::<Hands>()?;
        let player_two = players
            .next()
            .ok_or_else(|| anyhow!("could not parse '{}' as a state", state))?
            .parse::<Hands>()?;
        if players.next().is_some() {
            return Err(anyhow!("could not parse '{}' as a state", state));
        }
        Self::from_hands(player_one, player_two, mover)
    }

    pub fn hands(&self, player: Player) -> Hands {
        self.hands[player.index()]
    }

    pub fn mover(&self) -> Player {
        self.mover
    }

    pub fn mover_hands(&self) -> Hands {
        self.hands(self.mover)
    }

    pub fn opponent_hands(&self) -> Hands {
        self.hands(self.mover.other())
    }

    pub fn is_terminal(&self) -> bool {
        self.winner().is_some()
    }

    /// The player whose opponent has no living hands
    pub fn winner(&self) -> Option<Player> {
        Player::ALL
            .iter()
            .find(|&&player| self.hands(player).is_dead())
            .map(|loser| loser.other())
    }

    /// Tap the opponent's `defender` hand with the mover's `attacker` hand
    pub fn apply_tap(&self, attacker: Side, defender: Side) -> Result<Self, MoveError> {
        let attacking = self.mover_hands().get(attacker);
        let target = self.opponent_hands().get(defender);
        if attacking == 0 || target == 0 {
            return Err(MoveError::Overflow);
        }

        let struck = (target + attacking) % FINGER_MODULUS;
        let opponent = self.mover.other();
        Ok(self
            .with_hands(opponent, self.opponent_hands().with(defender, struck))
            .passed())
    }

    /// Redistribute the mover's fingers from `from` to `to`
    pub fn apply_split(&self, from: Hands, to: Hands) -> Result<Self, MoveError> {
        let current = self.mover_hands();
        if self.is_terminal() || from != current {
            return Err(MoveError::InvalidSplit);
        }
        if current.total() < 2 || to.total() != current.total() {
            return Err(MoveError::InvalidSplit);
        }
        if to.left() > MAX_FINGERS || to.right() > MAX_FINGERS {
            return Err(MoveError::InvalidSplit);
        }
        if to == current.swapped() && !current.is_symmetric() {
            return Err(MoveError::Reversal);
        }
        if current.is_single_finger() || to == current {
            return Err(MoveError::InvalidSplit);
        }

        Ok(self.with_hands(self.mover, to).passed())
    }

    /// Applies a move by the rules alone, without any repetition check
    pub fn apply(&self, mv: &Move) -> Result<Self, MoveError> {
        match *mv {
            Move::Tap { attacker, defender } => self.apply_tap(attacker, defender),
            Move::Split { from, to } => self.apply_split(from, to),
        }
    }

    fn with_hands(&self, player: Player, hands: Hands) -> Self {
        let mut next = *self;
        next.hands[player.index()] = hands;
        next
    }

    fn passed(mut self) -> Self {
        self.mover = self.mover.other();
        self
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "= {} | {}",
            self.hands(Player::One),
            self.hands(Player::Two)
        )
    }
}

/// The positions already seen in one game or one exploration path
#[derive(Clone, Debug, Default)]
pub struct History {
    visited: HashSet<Position>,
}

impl History {
    /// A history holding only the position the game started from
    pub fn new(start: &Position) -> Self {
        let mut visited = HashSet::new();
        visited.insert(*start);
        Self { visited }
    }

    pub fn contains(&self, position: &Position) -> bool {
        self.visited.contains(position)
    }

    /// Records a position, returning `false` if it was already present
    pub fn visit(&mut self, position: Position) -> bool {
        self.visited.insert(position)
    }

    pub(crate) fn forget(&mut self, position: &Position) {
        self.visited.remove(position);
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

/// Applies `mv` to `position`, rejecting it if the rules forbid it or if the
/// resulting position already appears in `history`
pub fn apply_move(
    position: &Position,
    mv: Option<&Move>,
    history: &History,
) -> Result<Position, MoveError> {
    let mv = mv.ok_or(MoveError::NoMove)?;
    let next = position.apply(mv)?;
    if history.contains(&next) {
        return Err(MoveError::Repeat);
    }
    Ok(next)
}
