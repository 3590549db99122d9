//! Board state and game rules.
//!
//! A [`BoardState`] is an immutable snapshot of one ply: the stone grid, the
//! move history that produced it, and the color to move. Applying a move
//! never mutates a state; [`BoardState::next_state`] builds a new one on a
//! private copy and freezes it once captures are resolved.
//!
//! The rule set is deliberately small:
//! - any empty cell is a legal placement (no ko, no suicide prohibition)
//! - enemy groups left without liberties by a placement are removed
//! - a self-captured friendly group is left on the board
//! - the game ends after three consecutive passes
//! - area score is the sum of stone markers minus komi

use std::fmt;

use crate::constants::{BLACK, EMPTY, FINISH_PASSES, KOMI, N, WHITE};
use crate::moves::{Move, Vertex};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Stone marker for this color on the grid.
    pub fn marker(self) -> i8 {
        match self {
            Color::Black => BLACK,
            Color::White => WHITE,
        }
    }

    /// The side that wins with the given final score, if any.
    ///
    /// Positive scores are Black wins, negative ones White wins.
    pub fn from_score(score: f64) -> Option<Color> {
        if score > 0.0 {
            Some(Color::Black)
        } else if score < 0.0 {
            Some(Color::White)
        } else {
            None
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// Reason a checked [`BoardState::play`] was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("illegal move {0}: point not empty")]
    Occupied(Move),
    #[error("illegal move {0}: off the board")]
    OffBoard(Move),
}

/// One ply of the game.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardState {
    stones: [[i8; N]; N],
    color: Color,
    history: Vec<Move>,
    komi: f64,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardState {
    /// The empty initial state, Black to move.
    pub fn new() -> Self {
        Self::with_komi(KOMI)
    }

    pub fn with_komi(komi: f64) -> Self {
        Self {
            stones: [[EMPTY; N]; N],
            color: Color::Black,
            history: Vec::new(),
            komi,
        }
    }

    /// Color to move.
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn komi(&self) -> f64 {
        self.komi
    }

    /// Whether `(x, y)` lies on the board.
    pub fn has_vertex(&self, (x, y): Vertex) -> bool {
        x < N && y < N
    }

    /// Stone marker at a cell: positive for Black, negative for White, zero if empty.
    ///
    /// Off-board cells read as empty.
    pub fn get(&self, (x, y): Vertex) -> i8 {
        if !self.has_vertex((x, y)) {
            return EMPTY;
        }
        self.stones[y][x]
    }

    pub fn stone(&self, vertex: Vertex) -> Option<Color> {
        match self.get(vertex) {
            BLACK => Some(Color::Black),
            WHITE => Some(Color::White),
            _ => None,
        }
    }

    pub fn stone_count(&self, color: Color) -> usize {
        let marker = color.marker();
        self.stones
            .iter()
            .flatten()
            .filter(|&&c| c == marker)
            .count()
    }

    /// Pass followed by every empty cell in row-major order.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(N * N + 1);
        moves.push(Move::Pass);
        for y in 0..N {
            for x in 0..N {
                if self.stones[y][x] == EMPTY {
                    moves.push(Move::Place(x, y));
                }
            }
        }
        moves
    }

    /// Whether `mv` is a pass or a placement on an empty on-board cell.
    pub fn is_legal(&self, mv: Move) -> bool {
        match mv {
            Move::Pass => true,
            Move::Place(x, y) => self.has_vertex((x, y)) && self.stones[y][x] == EMPTY,
        }
    }

    /// Checked variant of [`next_state`](Self::next_state).
    pub fn play(&self, mv: Move) -> Result<BoardState, RuleError> {
        if let Move::Place(x, y) = mv {
            if !self.has_vertex((x, y)) {
                return Err(RuleError::OffBoard(mv));
            }
            if self.stones[y][x] != EMPTY {
                return Err(RuleError::Occupied(mv));
            }
        }
        Ok(self.next_state(mv))
    }

    /// Apply a legal move and return the resulting state.
    ///
    /// The mover's stone is placed first; every enemy group touching it that
    /// is left without liberties is then removed. The placed group itself is
    /// not checked for liberties.
    ///
    /// # Panics
    ///
    /// Panics if `mv` places a stone off the board. Use [`play`](Self::play)
    /// for moves that have not been validated.
    pub fn next_state(&self, mv: Move) -> BoardState {
        let mut next = self.clone();
        next.apply(mv);
        next
    }

    /// Apply `mv` to this state in place.
    ///
    /// Only for private working copies (construction and playouts); a state
    /// that has been handed out is never changed.
    pub(crate) fn apply(&mut self, mv: Move) {
        debug_assert!(self.is_legal(mv), "illegal move {mv}");

        let mover = self.color;
        self.history.push(mv);
        self.color = mover.opponent();

        if let Move::Place(x, y) = mv {
            self.stones[y][x] = mover.marker();

            let enemy = mover.opponent().marker();
            let mut to_remove: Vec<Vertex> = Vec::new();
            for n in self.neighbors((x, y)) {
                if self.get(n) == enemy && !to_remove.contains(&n) && !self.has_liberties(n) {
                    to_remove.extend(self.chain(n));
                }
            }
            for (rx, ry) in to_remove {
                self.stones[ry][rx] = EMPTY;
            }
        }
    }

    /// The up to four orthogonally adjacent on-board cells.
    pub fn neighbors(&self, (x, y): Vertex) -> impl Iterator<Item = Vertex> + use<> {
        let mut v = Vec::with_capacity(4);
        if x > 0 {
            v.push((x - 1, y));
        }
        if x + 1 < N {
            v.push((x + 1, y));
        }
        if y > 0 {
            v.push((x, y - 1));
        }
        if y + 1 < N {
            v.push((x, y + 1));
        }
        v.into_iter()
    }

    /// Whether the group containing the stone at `vertex` touches an empty cell.
    ///
    /// Returns `false` for an empty cell.
    pub fn has_liberties(&self, vertex: Vertex) -> bool {
        let color = self.get(vertex);
        if color == EMPTY {
            return false;
        }
        let mut stack = vec![vertex];
        let mut visited = [[false; N]; N];
        while let Some((cx, cy)) = stack.pop() {
            if visited[cy][cx] {
                continue;
            }
            visited[cy][cx] = true;
            for (nx, ny) in self.neighbors((cx, cy)) {
                match self.stones[ny][nx] {
                    EMPTY => return true,
                    c if c == color && !visited[ny][nx] => stack.push((nx, ny)),
                    _ => {}
                }
            }
        }
        false
    }

    /// The maximal orthogonally connected set of cells sharing the value at `vertex`.
    ///
    /// For an empty cell this is the connected empty region.
    pub fn chain(&self, vertex: Vertex) -> Vec<Vertex> {
        if !self.has_vertex(vertex) {
            return Vec::new();
        }
        let color = self.get(vertex);
        let mut stack = vec![vertex];
        let mut visited = [[false; N]; N];
        let mut out = Vec::new();
        while let Some((cx, cy)) = stack.pop() {
            if visited[cy][cx] {
                continue;
            }
            visited[cy][cx] = true;
            out.push((cx, cy));
            for (nx, ny) in self.neighbors((cx, cy)) {
                if !visited[ny][nx] && self.stones[ny][nx] == color {
                    stack.push((nx, ny));
                }
            }
        }
        out
    }

    /// True once the last three moves were all passes.
    pub fn is_finished(&self) -> bool {
        self.history.len() >= FINISH_PASSES
            && self.history[self.history.len() - FINISH_PASSES..]
                .iter()
                .all(Move::is_pass)
    }

    /// Final score (stone markers summed, minus komi), or `None` while the game
    /// is still running. Positive means Black wins.
    pub fn winner(&self) -> Option<f64> {
        if !self.is_finished() {
            return None;
        }
        let sum: i32 = self.stones.iter().flatten().map(|&c| c as i32).sum();
        Some(sum as f64 - self.komi)
    }

    /// Identity of this state in the search tree: every move key in order.
    ///
    /// Two move orders reaching the same stones are different states.
    pub fn key(&self) -> String {
        self.history.iter().map(Move::key).collect()
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..N {
            for x in 0..N {
                let ch = match self.stone((x, y)) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
