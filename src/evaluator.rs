//! Static evaluation of positions

use crate::{
    position::{Hands, Position, Side},
    FINGER_MODULUS,
};

/// Score of a won position for the mover
pub const WIN_SCORE: i32 = 100;
/// Score of a lost position for the mover
pub const LOSS_SCORE: i32 = -WIN_SCORE;

const FINGER_WEIGHT: i32 = 5;
const HAND_WEIGHT: i32 = 20;
const BOTH_HANDS_SPLIT_BONUS: i32 = 5;
const VULNERABILITY: i32 = 10;
const MIRROR_BONUS: i32 = 5;
const TRAP_BONUS: i32 = 8;

/// Scores `position` from the point of view of the player to move, in
/// `LOSS_SCORE..=WIN_SCORE`. Only terminal positions reach the extremes.
pub fn evaluate(position: &Position) -> i32 {
    if let Some(winner) = position.winner() {
        return if winner == position.mover() {
            WIN_SCORE
        } else {
            LOSS_SCORE
        };
    }

    let own = position.mover_hands();
    let opponent = position.opponent_hands();

    let own_total = own.total() as i32;
    let own_alive = own.alive_count() as i32;
    let opponent_alive = opponent.alive_count() as i32;

    let mut score = 0;
    score += FINGER_WEIGHT * (own_total - opponent.total() as i32);
    score += HAND_WEIGHT * (own_alive - opponent_alive);

    // split potential
    if own_total >= 2 && own_alive >= 1 {
        score += own_total;
        if own_alive == 2 {
            score += BOTH_HANDS_SPLIT_BONUS;
        }
    }

    if own_alive == 1 {
        score -= VULNERABILITY;
    }
    if opponent_alive == 1 {
        score += VULNERABILITY;
    }

    if own == opponent && own.is_symmetric() {
        score += MIRROR_BONUS;
    }

    score += TRAP_BONUS * killing_taps(own, opponent);

    score.max(LOSS_SCORE).min(WIN_SCORE)
}

// number of (own hand, opponent hand) pairs where a tap would leave the opponent hand on zero
fn killing_taps(own: Hands, opponent: Hands) -> i32 {
    let mut count = 0;
    for &target in Side::ALL.iter().filter(|&&side| opponent.is_alive(side)) {
        let needed = (FINGER_MODULUS - opponent.get(target)) % FINGER_MODULUS;
        if needed == 0 {
            continue;
        }
        count += Side::ALL
            .iter()
            .filter(|&&side| own.get(side) == needed)
            .count() as i32;
    }
    count
}
