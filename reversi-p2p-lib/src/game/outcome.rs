//! Peer-addressed outcome tokens.
//!
//! The sender states the *recipient's* result, so each side can verify the
//! other's claim against its own replica. Disagreement means the replicas
//! desynchronised at some earlier point.

use crate::game::board::{Board, Color};
use crate::game::rules::score;
use crate::protocol::OutcomeToken;

/// Token to send to the peer when the game is over.
pub fn outcome_token_for(board: &Board, my_color: Color) -> OutcomeToken {
    let (b, w) = score(board);
    if b == w {
        return OutcomeToken::Draw;
    }
    let i_win = match my_color {
        Color::Black => b > w,
        Color::White => w > b,
    };
    if i_win {
        OutcomeToken::YouLose
    } else {
        OutcomeToken::YouWin
    }
}

/// Verify a token received from the peer (addressed to `my_color`): if I am
/// told "YOU WIN", I must actually be the strictly higher-scoring colour.
pub fn verify_peer_outcome(board: &Board, my_color: Color, token: OutcomeToken) -> bool {
    let (b, w) = score(board);
    let (mine, theirs) = match my_color {
        Color::Black => (b, w),
        Color::White => (w, b),
    };
    match token {
        OutcomeToken::Draw => mine == theirs,
        OutcomeToken::YouWin => mine > theirs,
        OutcomeToken::YouLose => mine < theirs,
    }
}
