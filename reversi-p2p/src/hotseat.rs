//! Local two-player game on one terminal, sharing the rules engine and UI
//! with the networked mode.

use reversi_p2p_lib::game::board::{Board, Color};
use reversi_p2p_lib::game::rules;
use reversi_p2p_lib::{Result, Ui, UiEvent};
use tracing::info;

/// Black moves first; a player with no legal move auto-passes, and a double
/// pass (or a full board) ends the game.
pub fn run_hotseat<U: Ui>(ui: &mut U) -> Result<()> {
    info!("starting hotseat game (no networking)");
    let mut board = Board::initial();
    let mut player = Color::Black;
    let mut passes = 0u8;
    let mut move_num = 1u32;

    loop {
        ui.announce(UiEvent::Board {
            board: &board,
            to_move: player,
            move_num,
        });

        if rules::is_game_over(&board) {
            let (b, w) = rules::score(&board);
            ui.announce(UiEvent::GameOver { black: b, white: w });
            return Ok(());
        }

        let moves = rules::legal_moves(&board, player);
        if moves.is_empty() {
            passes += 1;
            ui.announce(UiEvent::Pass { color: player });
            if passes >= 2 || !rules::has_any_move(&board, player.opponent()) {
                let (b, w) = rules::score(&board);
                ui.announce(UiEvent::GameOver { black: b, white: w });
                return Ok(());
            }
            player = player.opponent();
            continue;
        }

        passes = 0;
        let Some(choice) = ui.choose_move(&board, player, &moves) else {
            info!("user quit, exiting");
            return Ok(());
        };
        let (r, c) = moves[choice];
        board = rules::apply_move(&board, player, r, c)?;
        player = player.opponent();
        move_num += 1;
    }
}
