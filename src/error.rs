//! Rule violations reported when a move cannot be applied

/// Reasons a move is rejected. The position is never changed by a rejected move.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MoveError {
    #[error("the acting or the target hand is dead")]
    Overflow,
    #[error("split does not conserve fingers, leaves the valid range or changes nothing")]
    InvalidSplit,
    #[error("split only swaps the two hands")]
    Reversal,
    #[error("position already occurred in this game")]
    Repeat,
    #[error("no move given")]
    NoMove,
}

impl MoveError {
    /// Code written to the `Error` column of the game log
    pub fn code(&self) -> &'static str {
        match self {
            MoveError::Overflow => "ERR_OVERFLOW",
            MoveError::InvalidSplit => "ERR_INVALID_SPLIT",
            MoveError::Reversal => "ERR_REVERSAL",
            MoveError::Repeat => "ERR_REPEAT",
            MoveError::NoMove => "ERR_NO_MOVE",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ERR_OVERFLOW" => Some(MoveError::Overflow),
            "ERR_INVALID_SPLIT" => Some(MoveError::InvalidSplit),
            "ERR_REVERSAL" => Some(MoveError::Reversal),
            "ERR_REPEAT" => Some(MoveError::Repeat),
            "ERR_NO_MOVE" => Some(MoveError::NoMove),
            _ => None,
        }
    }
}
