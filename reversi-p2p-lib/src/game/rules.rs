//! Pure move legality, application and terminal detection.
//!
//! A move is legal for a colour iff the target cell is empty and placing the
//! stone brackets at least one contiguous run of opposite-colour stones,
//! closed by a same-colour stone, along one of the eight compass directions.

use std::collections::BTreeSet;

use crate::error::{GameError, Result};
use crate::game::board::{in_bounds, Board, Cell, Color, SIZE};

/// N, NE, E, SE, S, SW, W, NW
const DIRS: [(isize, isize); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

/// Stones flipped along one ray if the colour plays at (r,c); empty when the
/// ray is not bracketed.
fn line_flips(
    board: &Board,
    color: Color,
    r: usize,
    c: usize,
    dr: isize,
    dc: isize,
) -> Vec<(usize, usize)> {
    let opp = Cell::from(color.opponent());
    let own = Cell::from(color);
    let mut flips = Vec::new();
    let mut rr = r as isize + dr;
    let mut cc = c as isize + dc;

    // Immediate neighbour must be an opponent stone.
    if !in_bounds(rr, cc) || board.cell(rr as usize, cc as usize) != opp {
        return flips;
    }

    while in_bounds(rr, cc) {
        let cell = board.cell(rr as usize, cc as usize);
        if cell == opp {
            flips.push((rr as usize, cc as usize));
        } else if cell == own {
            return flips;
        } else {
            break;
        }
        rr += dr;
        cc += dc;
    }
    // Ran off the board or hit Empty without closing the bracket.
    flips.clear();
    flips
}

/// All stones flipped if the colour plays at (r,c), or empty if the move is
/// illegal (occupied target, out of range, or nothing bracketed).
pub fn flips_for_move(board: &Board, color: Color, r: usize, c: usize) -> Vec<(usize, usize)> {
    if r >= SIZE || c >= SIZE || !board.cell(r, c).is_empty() {
        return Vec::new();
    }
    let mut flips = Vec::new();
    for (dr, dc) in DIRS {
        flips.extend(line_flips(board, color, r, c, dr, dc));
    }
    flips
}

/// Legal target coordinates for the colour, row-major sorted.
pub fn legal_moves(board: &Board, color: Color) -> Vec<(usize, usize)> {
    // Only empties adjacent to an opponent stone can bracket anything.
    let opp = Cell::from(color.opponent());
    let mut candidates = BTreeSet::new();
    for r in 0..SIZE {
        for c in 0..SIZE {
            if board.cell(r, c) != opp {
                continue;
            }
            for (dr, dc) in DIRS {
                let rr = r as isize + dr;
                let cc = c as isize + dc;
                if in_bounds(rr, cc) && board.cell(rr as usize, cc as usize).is_empty() {
                    candidates.insert((rr as usize, cc as usize));
                }
            }
        }
    }

    // BTreeSet iteration is already row-major.
    candidates
        .into_iter()
        .filter(|&(r, c)| !flips_for_move(board, color, r, c).is_empty())
        .collect()
}

pub fn has_any_move(board: &Board, color: Color) -> bool {
    !legal_moves(board, color).is_empty()
}

/// Returns a new board with the move applied; the input board is untouched.
pub fn apply_move(board: &Board, color: Color, r: usize, c: usize) -> Result<Board> {
    let flips = flips_for_move(board, color, r, c);
    if flips.is_empty() {
        return Err(GameError::IllegalMove { color, row: r, col: c });
    }

    let mut cells = *board.rows();
    cells[r][c] = Cell::from(color);
    for (rr, cc) in flips {
        cells[rr][cc] = Cell::from(color);
    }
    Ok(Board::from_cells(cells))
}

/// The game ends when the board is full or neither colour has a legal move.
pub fn is_game_over(board: &Board) -> bool {
    let (_, _, empty) = board.counts();
    if empty == 0 {
        return true;
    }
    !(has_any_move(board, Color::Black) || has_any_move(board, Color::White))
}

/// (black_count, white_count)
pub fn score(board: &Board) -> (u32, u32) {
    let (b, w, _) = board.counts();
    (b, w)
}
