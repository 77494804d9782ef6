//! Legal move generation
//!
//! Moves come out in a fixed order, taps before splits. Taps are ordered by
//! attacking hand then defending hand, splits by the new left hand value.
//! Repetition is not filtered here, it only shows up when a move is applied
//! against a history.

use crate::{
    moves::{Move, MoveList},
    position::{Hands, Position, Side},
    MAX_FINGERS,
};

/// All moves the rules allow from `position`. Terminal positions have none.
pub fn legal_moves(position: &Position) -> MoveList {
    let mut moves = MoveList::new();
    if position.is_terminal() {
        return moves;
    }
    legal_taps(position, &mut moves);
    legal_splits(position, &mut moves);
    moves
}

/// Pushes every tap from a living hand onto a living opponent hand
pub fn legal_taps(position: &Position, moves: &mut MoveList) {
    let own = position.mover_hands();
    let opponent = position.opponent_hands();

    for &attacker in Side::ALL.iter().filter(|&&side| own.is_alive(side)) {
        for &defender in Side::ALL.iter().filter(|&&side| opponent.is_alive(side)) {
            moves.push(Move::Tap { attacker, defender });
        }
    }
}

/// Pushes every split of the mover's fingers that is not a no-op or a bare swap
pub fn legal_splits(position: &Position, moves: &mut MoveList) {
    let current = position.mover_hands();
    let total = current.total();

    if total < 2 || current.is_single_finger() {
        return;
    }

    for left in 0..=total {
        let right = total - left;
        if left > MAX_FINGERS || right > MAX_FINGERS {
            continue;
        }
        let to = Hands::new_unchecked(left, right);
        if to == current || (to == current.swapped() && !current.is_symmetric()) {
            continue;
        }
        moves.push(Move::Split { from: current, to });
    }
}
