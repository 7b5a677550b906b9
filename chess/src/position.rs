//! Placement of pieces on squares

use crate::types::{Piece, PieceId, Square};

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Copy, Clone, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("square {0} is already occupied")]
    OccupiedSquare(Square),
    #[error("piece {0} is already on the board")]
    DuplicatePiece(Piece),
    #[error("piece {0} is not on the board")]
    PieceNotOnBoard(Piece),
}

/// Bidirectional map between occupied squares and the pieces standing on them
///
/// Each on-board piece occupies exactly one square and each square holds at most one piece.
/// All the operations either succeed completely or leave the index untouched.
#[derive(Clone, PartialEq, Eq)]
pub struct PositionIndex {
    cells: [Option<Piece>; Square::INDEX_COUNT],
    squares: HashMap<PieceId, Square>,
}

impl PositionIndex {
    pub fn new() -> PositionIndex {
        PositionIndex {
            cells: [None; Square::INDEX_COUNT],
            squares: HashMap::new(),
        }
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.index()]
    }

    pub fn square_of(&self, piece: Piece) -> Option<Square> {
        self.squares.get(&piece.id()).copied()
    }

    pub fn contains(&self, piece: Piece) -> bool {
        self.squares.contains_key(&piece.id())
    }

    pub fn len(&self) -> usize {
        self.squares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    /// Iterates over the occupied squares in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(|sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    pub fn put(&mut self, sq: Square, piece: Piece) -> Result<(), IndexError> {
        if self.cells[sq.index()].is_some() {
            return Err(IndexError::OccupiedSquare(sq));
        }
        if self.contains(piece) {
            return Err(IndexError::DuplicatePiece(piece));
        }
        self.cells[sq.index()] = Some(piece);
        self.squares.insert(piece.id(), sq);
        Ok(())
    }

    /// Takes `piece` off the board, returning the square it stood on
    pub fn remove_by_piece(&mut self, piece: Piece) -> Result<Square, IndexError> {
        let sq = self
            .squares
            .remove(&piece.id())
            .ok_or(IndexError::PieceNotOnBoard(piece))?;
        self.cells[sq.index()] = None;
        Ok(sq)
    }

    /// Relocates `piece` to `dst`, removing whatever stood there
    ///
    /// Returns the removed piece. Moving a piece onto its own square does nothing.
    pub fn force_move(&mut self, piece: Piece, dst: Square) -> Result<Option<Piece>, IndexError> {
        let src = self
            .square_of(piece)
            .ok_or(IndexError::PieceNotOnBoard(piece))?;
        if src == dst {
            return Ok(None);
        }
        let captured = self.cells[dst.index()].take();
        if let Some(victim) = captured {
            self.squares.remove(&victim.id());
        }
        self.cells[src.index()] = None;
        self.cells[dst.index()] = Some(piece);
        self.squares.insert(piece.id(), dst);
        Ok(captured)
    }
}

impl Default for PositionIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PositionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_map()
            .entries(self.iter().map(|(sq, p)| (sq.to_string(), p.to_string())))
            .finish()
    }
}
