use anyhow::{anyhow, Result};
use crossterm::{
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::io::{stdout, Write};

use chopsticks_ai::*;

/// A game being played in the terminal, with everything needed to reject repetitions
#[derive(Clone)]
pub struct GameBoard {
    position: Position,
    history: History,
    pub moves: Vec<PlayerMove>,
}

impl GameBoard {
    pub fn new() -> Self {
        let position = Position::new();
        Self {
            position,
            history: History::new(&position),
            moves: Vec::new(),
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn play_checked(&mut self, mv: Move) -> Result<()> {
        let next = apply_move(&self.position, Some(&mv), &self.history).map_err(|err| {
            anyhow!(
                "Invalid move {}: {}",
                PlayerMove::on(&self.position, mv),
                err
            )
        })?;
        self.moves.push(PlayerMove::on(&self.position, mv));
        self.history.visit(next);
        self.position = next;
        Ok(())
    }

    /// Reads a move typed by a human: full notation (`P1L>P2R`,
    /// `Sp(P1:4|0 → 2|2)`), two hand letters for a tap (`LR`), or the new
    /// hands for a split (`2-2` or `2|2`)
    pub fn parse_input(&self, input: &str) -> Result<Move> {
        let input = input.trim();
        let mover = self.position.mover();

        if let Ok(played) = input.parse::<PlayerMove>() {
            if played.player != mover {
                return Err(anyhow!("It is {}'s turn", mover));
            }
            return Ok(played.mv);
        }

        let letters: Vec<Side> = input
            .to_uppercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(Side::from_letter)
            .collect::<Option<_>>()
            .unwrap_or_default();
        if let [attacker, defender] = letters[..] {
            return Ok(Move::Tap { attacker, defender });
        }

        match input.replace('|', "-").parse::<Hands>() {
            Ok(to) => Ok(Move::Split {
                from: self.position.mover_hands(),
                to,
            }),
            Err(_) => Err(anyhow!("could not parse '{}' as a move", input)),
        }
    }

    pub fn display(&self) -> Result<()> {
        let mut stdout = stdout();

        for &player in Player::ALL.iter() {
            let hands = self.position.hands(player);
            let color = match player {
                Player::One => Color::Red,
                Player::Two => Color::Yellow,
            };
            let marker = if player == self.position.mover() && !self.position.is_terminal() {
                "> "
            } else {
                "  "
            };

            stdout.queue(PrintStyledContent(style(format!("{}{}  ", marker, player))))?;
            for &side in Side::ALL.iter() {
                let fingers = hands.get(side);
                let text = format!("{}:{:<5}", side.letter(), "|".repeat(fingers as usize));
                stdout.queue(PrintStyledContent(if fingers == 0 {
                    style(text).with(Color::DarkGrey)
                } else {
                    style(text).attribute(Attribute::Bold).with(color)
                }))?;
            }
            stdout.queue(PrintStyledContent(style("\n".to_string())))?;
        }
        stdout.queue(PrintStyledContent(style(format!("{}\n", self.position))))?;
        stdout.flush()?;
        Ok(())
    }
}
