//! Wire codec for the two message families.
//!
//! UDP carries exactly one advert line per datagram: `NEW GAME:<port>` with
//! the gameplay port inside [`PORT_MIN`]..=[`PORT_MAX`]. TCP lines are
//! `MOVE:r,c` with 0-based coordinates, or one of the exact tokens `PASS`,
//! `YOU WIN`, `YOU LOSE`, `DRAW`, `ERROR`. Validation is strict: a trailing
//! CR/LF is tolerated, embedded or leading whitespace is not.

use std::fmt;

use crate::error::{GameError, Result};
use crate::game::board::SIZE;

pub const NEW_GAME: &str = "NEW GAME";
pub const MOVE: &str = "MOVE";
pub const PASS: &str = "PASS";
pub const YOU_WIN: &str = "YOU WIN";
pub const YOU_LOSE: &str = "YOU LOSE";
pub const DRAW: &str = "DRAW";
pub const ERROR: &str = "ERROR";

/// Gameplay (and advert) port range.
pub const PORT_MIN: u16 = 9000;
pub const PORT_MAX: u16 = 9100;

/// Outcome messages are peer-addressed: the sender states what the
/// *recipient* should see. `YouWin` means "you, reader, have won".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeToken {
    YouWin,
    YouLose,
    Draw,
}

impl OutcomeToken {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeToken::YouWin => YOU_WIN,
            OutcomeToken::YouLose => YOU_LOSE,
            OutcomeToken::Draw => DRAW,
        }
    }
}

impl fmt::Display for OutcomeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded TCP gameplay line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    Move { row: usize, col: usize },
    Pass,
    Outcome(OutcomeToken),
    Error,
}

impl Message {
    /// Decode any TCP gameplay line.
    pub fn parse(line: &str) -> Result<Message> {
        let s = strip_eol(line);
        if s.starts_with("MOVE:") {
            let (row, col) = decode_move(s)?;
            return Ok(Message::Move { row, col });
        }
        match s {
            PASS => Ok(Message::Pass),
            YOU_WIN => Ok(Message::Outcome(OutcomeToken::YouWin)),
            YOU_LOSE => Ok(Message::Outcome(OutcomeToken::YouLose)),
            DRAW => Ok(Message::Outcome(OutcomeToken::Draw)),
            ERROR => Ok(Message::Error),
            _ => Err(GameError::Protocol(format!(
                "unknown or invalid message: {line:?}"
            ))),
        }
    }
}

/// `MOVE:r,c` with 0-based coordinates.
pub fn encode_move(row: usize, col: usize) -> String {
    debug_assert!(row < SIZE && col < SIZE, "coordinates out of range");
    format!("{MOVE}:{row},{col}")
}

/// Decode `MOVE:r,c`; coordinates must be in 0..=7.
pub fn decode_move(line: &str) -> Result<(usize, usize)> {
    let s = strip_eol(line);
    let malformed = || GameError::Protocol(format!("malformed MOVE: {line:?}"));
    let body = s.strip_prefix("MOVE:").ok_or_else(malformed)?;
    let (r, c) = body.split_once(',').ok_or_else(malformed)?;
    let row = parse_signed(r).ok_or_else(malformed)?;
    let col = parse_signed(c).ok_or_else(malformed)?;
    let max = SIZE as i64 - 1;
    if !(0..=max).contains(&row) || !(0..=max).contains(&col) {
        return Err(GameError::Protocol(format!(
            "row/col out of bounds (0..{max}): ({row},{col})"
        )));
    }
    Ok((row as usize, col as usize))
}

/// UDP advert payload `NEW GAME:<port>`.
pub fn encode_new_game(port: u16) -> String {
    debug_assert!(
        (PORT_MIN..=PORT_MAX).contains(&port),
        "gameplay port out of range"
    );
    format!("{NEW_GAME}:{port}")
}

/// Decode `NEW GAME:<port>` and validate the port range.
pub fn decode_new_game(line: &str) -> Result<u16> {
    let s = strip_eol(line);
    let body = s
        .strip_prefix("NEW GAME:")
        .ok_or_else(|| GameError::Protocol(format!("malformed NEW GAME: {line:?}")))?;
    let port = parse_unsigned(body)
        .ok_or_else(|| GameError::Protocol(format!("malformed NEW GAME: {line:?}")))?;
    if !(PORT_MIN as u64..=PORT_MAX as u64).contains(&port) {
        return Err(GameError::Protocol(format!(
            "gameplay port must be in [{PORT_MIN}..{PORT_MAX}], got {port}"
        )));
    }
    Ok(port as u16)
}

/// Strip trailing CR/LF only; leading or embedded whitespace stays and makes
/// the line invalid.
fn strip_eol(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

/// Decimal integer with an optional leading minus; no sign symbols, spaces or
/// underscores beyond that (`i64::from_str` alone would accept `+2`).
fn parse_signed(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Unsigned decimal digits only.
fn parse_unsigned(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
