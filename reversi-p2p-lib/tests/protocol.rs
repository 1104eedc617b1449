#![forbid(unsafe_code)]

use reversi_p2p_lib::protocol::{
    decode_move, decode_new_game, encode_move, encode_new_game, Message, OutcomeToken, PORT_MAX,
    PORT_MIN,
};
use reversi_p2p_lib::GameError;

#[test]
fn move_round_trip_covers_the_whole_board() {
    for r in 0..8 {
        for c in 0..8 {
            assert_eq!(decode_move(&encode_move(r, c)).unwrap(), (r, c));
        }
    }
    assert_eq!(encode_move(2, 3), "MOVE:2,3");
}

#[test]
fn new_game_round_trip_covers_the_port_range() {
    for port in PORT_MIN..=PORT_MAX {
        assert_eq!(decode_new_game(&encode_new_game(port)).unwrap(), port);
    }
    assert_eq!(encode_new_game(9000), "NEW GAME:9000");
}

#[test]
fn malformed_moves_are_rejected() {
    for line in [
        "MOVE:-1,0",
        "MOVE:0,8",
        "MOVE:8,0",
        "MOVE:2,x",
        "MOVE:",
        "MOVE:1",
        "MOVE:1,2,3",
        "MOVE: 1,2",
        "MOVE:1, 2",
        "MOVE:+1,2",
        "move:1,2",
        "MOVE:1,",
    ] {
        assert!(
            matches!(decode_move(line), Err(GameError::Protocol(_))),
            "{line:?} should fail to decode"
        );
    }
}

#[test]
fn malformed_or_out_of_range_adverts_are_rejected() {
    for line in [
        "NEW GAME:8999",
        "NEW GAME:9101",
        "NEW GAME:",
        "NEW GAME:abc",
        "NEW GAME:-9000",
        "NEW GAME: 9000",
        "NEWGAME:9000",
        "new game:9000",
    ] {
        assert!(decode_new_game(line).is_err(), "{line:?} should fail to decode");
    }
}

#[test]
fn tokens_are_matched_exactly() {
    assert_eq!(Message::parse("PASS").unwrap(), Message::Pass);
    assert_eq!(
        Message::parse("YOU WIN").unwrap(),
        Message::Outcome(OutcomeToken::YouWin)
    );
    assert_eq!(
        Message::parse("YOU LOSE").unwrap(),
        Message::Outcome(OutcomeToken::YouLose)
    );
    assert_eq!(
        Message::parse("DRAW").unwrap(),
        Message::Outcome(OutcomeToken::Draw)
    );
    assert_eq!(Message::parse("ERROR").unwrap(), Message::Error);

    for line in [
        " PASS",
        "PASS ",
        "pass",
        "YOU  WIN",
        "YOUWIN",
        "YOU WIN ",
        "HELLO:WORLD",
        "",
    ] {
        assert!(Message::parse(line).is_err(), "{line:?} should fail to parse");
    }
}

#[test]
fn trailing_cr_and_lf_are_tolerated() {
    assert_eq!(Message::parse("PASS\r\n").unwrap(), Message::Pass);
    assert_eq!(decode_move("MOVE:2,3\r").unwrap(), (2, 3));
    assert_eq!(decode_new_game("NEW GAME:9000\n").unwrap(), 9000);
}

#[test]
fn moves_parse_as_messages() {
    assert_eq!(
        Message::parse("MOVE:0,7").unwrap(),
        Message::Move { row: 0, col: 7 }
    );
    assert!(Message::parse("MOVE:0,9").is_err());
}

#[test]
fn outcome_tokens_render_their_wire_form() {
    assert_eq!(OutcomeToken::YouWin.as_str(), "YOU WIN");
    assert_eq!(OutcomeToken::YouLose.as_str(), "YOU LOSE");
    assert_eq!(OutcomeToken::Draw.as_str(), "DRAW");
}
