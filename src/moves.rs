//! Moves and coordinate conversion.
//!
//! A [`Move`] carries no color: the side to move is implied by the
//! [`BoardState`](crate::board::BoardState) it is applied to.

use std::fmt;
use std::str::FromStr;

use crate::constants::N;

/// A cell on the board as `(x, y)`: `x` is the column, `y` the row from the top.
pub type Vertex = (usize, usize);

/// A pass or a stone placement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Pass,
    Place(usize, usize),
}

impl Move {
    /// Canonical lookup key: `"pass"` or `"x,y"`.
    pub fn key(&self) -> String {
        self.to_string()
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Move::Pass)
    }

    /// The target cell of a placement.
    pub fn vertex(&self) -> Option<Vertex> {
        match *self {
            Move::Pass => None,
            Move::Place(x, y) => Some((x, y)),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Pass => write!(f, "pass"),
            Move::Place(x, y) => write!(f, "{x},{y}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot parse move from {0:?}")]
pub struct ParseMoveError(pub String);

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("pass") {
            return Ok(Move::Pass);
        }
        let err = || ParseMoveError(s.to_string());
        let (x, y) = s.split_once(',').ok_or_else(err)?;
        let x = x.trim().parse().map_err(|_| err())?;
        let y = y.trim().parse().map_err(|_| err())?;
        Ok(Move::Place(x, y))
    }
}

/// Parse a GTP vertex (e.g. "D4", "pass") into a move.
///
/// Columns use letters A-J skipping I; row 1 is the bottom row.
/// Returns `None` for anything that is not on the board.
pub fn parse_vertex(s: &str) -> Option<Move> {
    if s.eq_ignore_ascii_case("pass") {
        return Some(Move::Pass);
    }

    let bytes = s.as_bytes();
    if bytes.len() < 2 {
        return None;
    }

    let col_char = bytes[0].to_ascii_uppercase();
    if !col_char.is_ascii_uppercase() || col_char == b'I' {
        return None;
    }
    let mut x = (col_char - b'A') as usize;
    // Skip 'I' column (Go convention to avoid confusion with 'J')
    if col_char > b'I' {
        x -= 1;
    }

    let row: usize = s[1..].parse().ok()?;
    if x >= N || row == 0 || row > N {
        return None;
    }
    Some(Move::Place(x, N - row))
}

/// Convert a move to a GTP vertex string (e.g. "D4").
///
/// Returns "pass" for [`Move::Pass`].
pub fn vertex_string(mv: Move) -> String {
    match mv {
        Move::Pass => "pass".into(),
        Move::Place(x, y) => {
            let mut c = b'A' + x as u8;
            if c >= b'I' {
                c += 1;
            }
            format!("{}{}", c as char, N - y)
        }
    }
}
