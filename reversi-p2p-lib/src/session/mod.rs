#![forbid(unsafe_code)]

//! The gameplay state machine on top of the line transport.
//!
//! The driver keeps a local board replica, interleaves local input (through
//! the opaque [`Ui`] collaborator) with peer messages, validates every peer
//! move against the replica, and terminates on double pass, an agreed
//! outcome, or a protocol error. Both peers run this same loop; the loop
//! invariant is that the two replicas agree given the messages exchanged so
//! far.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{error, info, warn};

use crate::error::{GameError, Result};
use crate::game::board::{Board, Color};
use crate::game::outcome::{outcome_token_for, verify_peer_outcome};
use crate::game::rules;
use crate::net::discovery::Role;
use crate::net::line::LineTransport;
use crate::protocol::{self, Message};

/// Events the session driver reports to the UI collaborator.
pub enum UiEvent<'a> {
    Board {
        board: &'a Board,
        to_move: Color,
        move_num: u32,
    },
    Pass {
        color: Color,
    },
    GameOver {
        black: u32,
        white: u32,
    },
}

/// The session driver's view of the human (or scripted) player. The driver
/// makes no assumptions about how either operation is implemented.
pub trait Ui {
    fn announce(&mut self, event: UiEvent<'_>);

    /// Pick an index into `moves`, or `None` to quit.
    fn choose_move(
        &mut self,
        board: &Board,
        color: Color,
        moves: &[(usize, usize)],
    ) -> Option<usize>;
}

/// Play one complete game over a connected transport. Returns the agreed
/// final score `(black, white)`.
pub async fn run_session<S, U>(
    tg: &mut LineTransport<S>,
    role: Role,
    ui: &mut U,
) -> Result<(u32, u32)>
where
    S: AsyncRead + AsyncWrite + Unpin,
    U: Ui,
{
    let my_color = role.color();
    let opp_color = my_color.opponent();
    let mut board = Board::initial();
    let mut to_move = Color::Black;
    let mut move_num: u32 = 1;
    let mut passes: u8 = 0;

    loop {
        ui.announce(UiEvent::Board {
            board: &board,
            to_move,
            move_num,
        });

        if rules::is_game_over(&board) {
            return send_outcome_and_close(tg, my_color, &board, ui).await;
        }

        if to_move == my_color {
            let moves = rules::legal_moves(&board, my_color);
            if moves.is_empty() {
                ui.announce(UiEvent::Pass { color: my_color });
                tg.send_line(protocol::PASS).await?;
                passes += 1;
                if passes >= 2 || !rules::has_any_move(&board, opp_color) {
                    return send_outcome_and_close(tg, my_color, &board, ui).await;
                }
                to_move = opp_color;
                continue;
            }

            let Some(choice) = ui.choose_move(&board, my_color, &moves) else {
                // Best-effort courtesy ERROR so the peer is not left hanging.
                let _ = tg.send_line(protocol::ERROR).await;
                tg.close().await;
                info!("user quit during their turn");
                return Err(GameError::UserAbort);
            };
            let (r, c) = moves[choice];

            let applied = rules::apply_move(&board, my_color, r, c);
            debug_assert!(applied.is_ok(), "legal_moves produced an illegal move");
            board = applied?;
            move_num += 1;
            passes = 0;
            tg.send_line(&protocol::encode_move(r, c)).await?;
            to_move = opp_color;
        } else {
            let line = match tg.recv_line().await {
                Ok(line) => line,
                Err(e) => {
                    error!(error = %e, "receive from peer failed");
                    tg.close().await;
                    return Err(e);
                }
            };
            let msg = match Message::parse(&line) {
                Ok(msg) => msg,
                Err(e) => {
                    warn!(line = %line, "unparseable message from peer");
                    let _ = tg.send_line(protocol::ERROR).await;
                    tg.close().await;
                    return Err(e);
                }
            };

            match msg {
                Message::Pass => {
                    ui.announce(UiEvent::Pass { color: opp_color });
                    passes += 1;
                    if passes >= 2 || !rules::has_any_move(&board, my_color) {
                        return send_outcome_and_close(tg, my_color, &board, ui).await;
                    }
                    to_move = my_color;
                }
                Message::Outcome(token) => {
                    if !verify_peer_outcome(&board, my_color, token) {
                        let expected = outcome_token_for(&board, opp_color);
                        error!(received = %token, %expected, "peer outcome disagrees with local replica");
                        let _ = tg.send_line(protocol::ERROR).await;
                        tg.close().await;
                        return Err(GameError::OutcomeMismatch {
                            received: token,
                            expected,
                        });
                    }
                    let (b, w) = rules::score(&board);
                    ui.announce(UiEvent::GameOver { black: b, white: w });
                    tg.close().await;
                    return Ok((b, w));
                }
                Message::Error => {
                    error!("peer reported a protocol error");
                    tg.close().await;
                    return Err(GameError::PeerError);
                }
                Message::Move { row, col } => {
                    board = match rules::apply_move(&board, opp_color, row, col) {
                        Ok(board) => board,
                        Err(e) => {
                            warn!(row, col, "illegal move from peer");
                            let _ = tg.send_line(protocol::ERROR).await;
                            tg.close().await;
                            return Err(e);
                        }
                    };
                    move_num += 1;
                    passes = 0;
                    to_move = my_color;
                }
            }
        }
    }
}

/// Send our peer-addressed outcome token and finish. The send is
/// best-effort: on double pass both peers compute the outcome and the other
/// side may already have sent its token and closed.
async fn send_outcome_and_close<S, U>(
    tg: &mut LineTransport<S>,
    my_color: Color,
    board: &Board,
    ui: &mut U,
) -> Result<(u32, u32)>
where
    S: AsyncRead + AsyncWrite + Unpin,
    U: Ui,
{
    let token = outcome_token_for(board, my_color);
    let _ = tg.send_line(token.as_str()).await;
    let (b, w) = rules::score(board);
    ui.announce(UiEvent::GameOver { black: b, white: w });
    tg.close().await;
    Ok((b, w))
}
