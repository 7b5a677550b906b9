//! Move history
//!
//! The board consults the history for three things: whether a piece has already moved (pawn
//! double steps and castling), and which move was made last (en passant). The history is
//! abstracted as a trait so that callers can plug in their own storage.

use crate::moves::Move;
use crate::types::{Piece, PieceId};

use std::collections::HashMap;

pub trait History: Default + Clone {
    /// Records a move which was just applied
    fn push(&mut self, mv: Move);

    /// Returns all the moves made by `piece`, oldest first
    fn moves_of(&self, piece: Piece) -> &[Move];

    /// Returns the move applied most recently
    fn last(&self) -> Option<Move>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn has_moved(&self, piece: Piece) -> bool {
        !self.moves_of(piece).is_empty()
    }
}

#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveLog {
    all: Vec<Move>,
    by_piece: HashMap<PieceId, Vec<Move>>,
}

impl MoveLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Move> + '_ {
        self.all.iter()
    }
}

impl History for MoveLog {
    fn push(&mut self, mv: Move) {
        self.all.push(mv);
        self.by_piece.entry(mv.piece().id()).or_default().push(mv);
    }

    fn moves_of(&self, piece: Piece) -> &[Move] {
        self.by_piece
            .get(&piece.id())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn last(&self) -> Option<Move> {
        self.all.last().copied()
    }

    fn len(&self) -> usize {
        self.all.len()
    }
}
