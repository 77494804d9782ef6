//! Moves and their text notation

use anyhow::{anyhow, Result};

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use crate::position::{parse_pair, Hands, Player, Position, Side};

/// The most moves any position can offer: four taps and four splits
pub const MAX_MOVES: usize = 8;

/// A move, relative to the player whose turn it is
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    /// Add the fingers of the mover's `attacker` hand to the opponent's `defender` hand
    Tap { attacker: Side, defender: Side },
    /// Rearrange the mover's fingers from `from` to `to`
    Split { from: Hands, to: Hands },
}

impl Move {
    /// Notation of this move when played by `player`
    pub fn notation(&self, player: Player) -> String {
        PlayerMove::new(player, *self).to_string()
    }

    /// Fixed-width encoding used by the database file
    pub fn to_bytes(&self) -> [u8; 5] {
        match *self {
            Move::Tap { attacker, defender } => {
                [0, attacker.index() as u8, defender.index() as u8, 0, 0]
            }
            Move::Split { from, to } => [1, from.left(), from.right(), to.left(), to.right()],
        }
    }

    pub fn from_bytes(bytes: [u8; 5]) -> Result<Self> {
        match bytes[0] {
            0 => {
                let side = |byte: u8| {
                    Side::from_index(byte as usize)
                        .ok_or_else(|| anyhow!("invalid hand index {} in encoded tap", byte))
                };
                Ok(Move::Tap {
                    attacker: side(bytes[1])?,
                    defender: side(bytes[2])?,
                })
            }
            1 => Ok(Move::Split {
                from: Hands::new(bytes[1], bytes[2])?,
                to: Hands::new(bytes[3], bytes[4])?,
            }),
            tag => Err(anyhow!("invalid move tag {}", tag)),
        }
    }
}

/// A move together with the player making it, which is what the notation
/// `P1L>P2R` / `Sp(P1:4|0 → 2|2)` describes
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlayerMove {
    pub player: Player,
    pub mv: Move,
}

impl PlayerMove {
    pub fn new(player: Player, mv: Move) -> Self {
        Self { player, mv }
    }

    /// Attaches the mover of `position` to `mv`
    pub fn on(position: &Position, mv: Move) -> Self {
        Self::new(position.mover(), mv)
    }
}

impl fmt::Display for PlayerMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mv {
            Move::Tap { attacker, defender } => write!(
                f,
                "{}{}>{}{}",
                self.player,
                attacker.letter(),
                self.player.other(),
                defender.letter()
            ),
            Move::Split { from, to } => write!(
                f,
                "Sp({}:{}|{} → {}|{})",
                self.player,
                from.left(),
                from.right(),
                to.left(),
                to.right()
            ),
        }
    }
}

impl FromStr for PlayerMove {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(body) = s.strip_prefix("Sp(") {
            let body = body
                .strip_suffix(')')
                .ok_or_else(|| anyhow!("could not parse '{}' as a split, missing ')'", s))?;
            let (player, pairs) = body
                .split_once(':')
                .ok_or_else(|| anyhow!("could not parse '{}' as a split, missing ':'", s))?;
            let (from, to) = pairs
                .split_once('→')
                .ok_or_else(|| anyhow!("could not parse '{}' as a split, missing '→'", s))?;
            return Ok(Self::new(
                player.parse()?,
                Move::Split {
                    from: parse_pair(from, '|')?,
                    to: parse_pair(to, '|')?,
                },
            ));
        }

        let (attacker, defender) = s
            .split_once('>')
            .ok_or_else(|| anyhow!("could not parse '{}' as a move", s))?;
        let (attacking_player, attacker) = parse_hand(attacker)?;
        let (defending_player, defender) = parse_hand(defender)?;
        if defending_player != attacking_player.other() {
            return Err(anyhow!("invalid tap '{}', a player cannot tap their own hand", s));
        }
        Ok(Self::new(attacking_player, Move::Tap { attacker, defender }))
    }
}

// `P1L` -> (Player::One, Side::Left)
fn parse_hand(s: &str) -> Result<(Player, Side)> {
    let s = s.trim();
    let mut chars = s.chars();
    let side = chars
        .next_back()
        .and_then(Side::from_letter)
        .ok_or_else(|| anyhow!("could not parse '{}' as a hand", s))?;
    Ok((chars.as_str().parse()?, side))
}

/// A fixed-capacity list of moves, in generation order
#[derive(Copy, Clone, Debug)]
pub struct MoveList {
    size: usize,
    moves: [Move; MAX_MOVES],
}

impl MoveList {
    pub fn new() -> Self {
        Self {
            size: 0,
            moves: [Move::Tap {
                attacker: Side::Left,
                defender: Side::Left,
            }; MAX_MOVES],
        }
    }

    pub fn push(&mut self, mv: Move) {
        self.moves[self.size] = mv;
        self.size += 1;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for MoveList {
    type Target = [Move];

    fn deref(&self) -> &Self::Target {
        &self.moves[..self.size]
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.moves[..self.size]
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::iter::Take<std::array::IntoIter<Move, MAX_MOVES>>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.into_iter().take(self.size)
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
