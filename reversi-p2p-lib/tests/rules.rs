#![forbid(unsafe_code)]

use reversi_p2p_lib::game::board::{Board, Cell, Color, SIZE};
use reversi_p2p_lib::game::rules::{
    apply_move, flips_for_move, has_any_move, is_game_over, legal_moves, score,
};
use reversi_p2p_lib::GameError;

fn full_board(black: u32, white: u32) -> Board {
    assert_eq!(black + white, (SIZE * SIZE) as u32);
    let mut cells = [[Cell::White; SIZE]; SIZE];
    let mut left = black;
    'fill: for row in cells.iter_mut() {
        for cell in row.iter_mut() {
            if left == 0 {
                break 'fill;
            }
            *cell = Cell::Black;
            left -= 1;
        }
    }
    Board::from_cells(cells)
}

#[test]
fn initial_position_and_counts() {
    let b = Board::initial();
    assert_eq!(b.cell(3, 3), Cell::White);
    assert_eq!(b.cell(4, 4), Cell::White);
    assert_eq!(b.cell(3, 4), Cell::Black);
    assert_eq!(b.cell(4, 3), Cell::Black);
    assert_eq!(score(&b), (2, 2));
    assert!(!is_game_over(&b));
}

#[test]
fn initial_legal_moves_are_four_each_and_distinct() {
    let b = Board::initial();
    let mv_b = legal_moves(&b, Color::Black);
    let mv_w = legal_moves(&b, Color::White);
    // Row-major order is part of the contract.
    assert_eq!(mv_b, vec![(2, 3), (3, 2), (4, 5), (5, 4)]);
    assert_eq!(mv_w, vec![(2, 4), (3, 5), (4, 2), (5, 3)]);
    assert_ne!(mv_b, mv_w);
}

#[test]
fn apply_move_flips_and_preserves_unrelated_cells() {
    let b = Board::initial();
    let b2 = apply_move(&b, Color::Black, 2, 3).unwrap();
    assert_eq!(b2.cell(2, 3), Cell::Black);
    // The input board is untouched.
    assert_eq!(b.cell(3, 3), Cell::White);
    assert_eq!(b2.cell(3, 3), Cell::Black);
    assert_eq!(b2.cell(4, 4), Cell::White);
    assert_eq!(b2.cell(3, 4), Cell::Black);
    assert_eq!(b2.cell(4, 3), Cell::Black);
    assert_eq!(score(&b2), (4, 1));
}

#[test]
fn illegal_moves_are_rejected() {
    let b = Board::initial();
    // Not bracketed anywhere.
    assert!(matches!(
        apply_move(&b, Color::Black, 0, 0),
        Err(GameError::IllegalMove { .. })
    ));
    // Occupied target.
    assert!(apply_move(&b, Color::Black, 3, 3).is_err());
    assert!(flips_for_move(&b, Color::Black, 3, 3).is_empty());
}

#[test]
fn stone_count_delta_matches_flip_set() {
    let b = Board::initial();
    for color in [Color::Black, Color::White] {
        let (black_before, white_before) = score(&b);
        let (mine_before, theirs_before) = match color {
            Color::Black => (black_before, white_before),
            Color::White => (white_before, black_before),
        };
        for (r, c) in legal_moves(&b, color) {
            let flips = flips_for_move(&b, color, r, c).len() as u32;
            assert!(flips >= 1);
            let after = apply_move(&b, color, r, c).unwrap();
            let (black_after, white_after) = score(&after);
            let (mine_after, theirs_after) = match color {
                Color::Black => (black_after, white_after),
                Color::White => (white_after, black_after),
            };
            assert_eq!(mine_after, mine_before + flips + 1);
            assert_eq!(theirs_after, theirs_before - flips);
        }
    }
}

#[test]
fn no_legal_moves_means_no_apply_succeeds() {
    // White everywhere except a lone Black stone and a single empty cell;
    // Black cannot close a bracket anywhere.
    let b = Board::parse([
        "WWWWWWWW",
        "WWWWWWWW",
        "WWWWWWWW",
        "WWWBWWWW",
        "WWWW.WWW",
        "WWWWWWWW",
        "WWWWWWWW",
        "WWWWWWWW",
    ]);
    assert!(legal_moves(&b, Color::Black).is_empty());
    for r in 0..SIZE {
        for c in 0..SIZE {
            if b.cell(r, c).is_empty() {
                assert!(apply_move(&b, Color::Black, r, c).is_err());
            }
        }
    }
    // White's only move flips the lone Black stone along the NW ray.
    assert_eq!(legal_moves(&b, Color::White), vec![(4, 4)]);
}

#[test]
fn pass_detection_and_game_over_progression() {
    let b = Board::parse([
        "BBBBBBBB",
        "BBBBBBBB",
        "BBBBBBBB",
        "BBBWWBBB",
        "BBBW.BBB",
        "BBBBBBBB",
        "BBBBBBBB",
        "BBBBBBBB",
    ]);
    assert!(has_any_move(&b, Color::Black));
    let mvs = legal_moves(&b, Color::Black);
    assert!(!mvs.is_empty());
    let (r, c) = mvs[0];
    let b2 = apply_move(&b, Color::Black, r, c).unwrap();

    assert!(!has_any_move(&b2, Color::White));
    // The single empty cell is gone, so the game must be over.
    assert!(is_game_over(&b2));
    assert_eq!(score(&b2), (64, 0));
}

#[test]
fn full_board_is_terminal() {
    let b = full_board(38, 26);
    assert!(is_game_over(&b));
    assert_eq!(score(&b), (38, 26));
}
