//! Console UI collaborator: board rendering, move prompts with index or
//! algebraic input, pass and winner announcements.
//!
//! Everything here is player-facing terminal output, not logging.

use std::io::{self, BufRead, Write};

use reversi_p2p_lib::game::board::{Board, Color, SIZE};
use reversi_p2p_lib::{Ui, UiEvent};

pub struct ConsoleUi;

impl ConsoleUi {
    pub fn new() -> ConsoleUi {
        ConsoleUi
    }
}

impl Ui for ConsoleUi {
    fn announce(&mut self, event: UiEvent<'_>) {
        match event {
            UiEvent::Board {
                board,
                to_move,
                move_num,
            } => render_board(board, to_move, move_num),
            UiEvent::Pass { color } => {
                println!("-> {color} has no legal moves and PASSES.");
            }
            UiEvent::GameOver { black, white } => announce_winner(black, white),
        }
    }

    fn choose_move(
        &mut self,
        _board: &Board,
        color: Color,
        moves: &[(usize, usize)],
    ) -> Option<usize> {
        println!("{color} legal moves: {}", format_moves(moves));
        println!("Enter move by [index] or [algebraic like D3].  (q = quit)");
        let stdin = io::stdin();
        loop {
            print!("> ");
            let _ = io::stdout().flush();

            let mut raw = String::new();
            match stdin.lock().read_line(&mut raw) {
                // EOF (e.g. Ctrl+D) counts as quitting.
                Ok(0) => return None,
                Ok(_) => {}
                Err(_) => return None,
            }
            let input = raw.trim();
            if matches!(input.to_ascii_lowercase().as_str(), "q" | "quit" | "exit") {
                return None;
            }

            if input.bytes().all(|b| b.is_ascii_digit()) && !input.is_empty() {
                match input.parse::<usize>() {
                    Ok(idx) if idx < moves.len() => return Some(idx),
                    _ => {
                        println!("Index out of range 0..{}", moves.len() - 1);
                        continue;
                    }
                }
            }

            if let Some(pos) = try_parse_algebraic(input) {
                if let Some(idx) = moves.iter().position(|&mv| mv == pos) {
                    return Some(idx);
                }
                println!("That square is not a legal move this turn. Choose from the list.");
                continue;
            }

            println!("Invalid input. Use an index (e.g., 0) or algebraic (e.g., D3), or 'q' to quit.");
        }
    }
}

fn render_board(board: &Board, to_move: Color, move_num: u32) {
    let (b, w, e) = board.counts();
    println!();
    println!("{}", "=".repeat(40));
    println!(" Move #{move_num} - {to_move} to move");
    println!(" Score: BLACK={b}  WHITE={w}  Empty={e}");

    print!("    ");
    for c in 0..SIZE {
        print!(" {}", col_letter(c));
    }
    println!();
    for (r, row) in board.rows().iter().enumerate() {
        print!(" {:>2} ", r + 1);
        for cell in row {
            print!(" {}", cell.as_char());
        }
        println!();
    }
    println!("{}", "=".repeat(40));
}

/// Human-friendly listing with algebraic notation, e.g. `[0] D3, [1] C4`.
fn format_moves(moves: &[(usize, usize)]) -> String {
    moves
        .iter()
        .enumerate()
        .map(|(i, &(r, c))| format!("[{i}] {}{}", col_letter(c), r + 1))
        .collect::<Vec<_>>()
        .join(", ")
}

fn col_letter(c: usize) -> char {
    (b'A' + c as u8) as char
}

/// Accepts strings like `d3`, `D3`, `a8`; returns 0-based (row, col).
fn try_parse_algebraic(s: &str) -> Option<(usize, usize)> {
    let s = s.trim();
    let mut chars = s.chars();
    let col_ch = chars.next()?.to_ascii_uppercase();
    if !col_ch.is_ascii_uppercase() || col_ch > 'H' {
        return None;
    }
    let row_str = chars.as_str();
    if row_str.is_empty() || !row_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let row = row_str.parse::<usize>().ok()?.checked_sub(1)?;
    if row >= SIZE {
        return None;
    }
    let col = (col_ch as u8 - b'A') as usize;
    Some((row, col))
}

fn announce_winner(black: u32, white: u32) {
    println!();
    println!("{}", "#".repeat(40));
    if black > white {
        println!("FINAL: BLACK wins {black}-{white}");
    } else if white > black {
        println!("FINAL: WHITE wins {white}-{black}");
    } else {
        println!("FINAL: DRAW {black}-{white}");
    }
    println!("{}", "#".repeat(40));
}
