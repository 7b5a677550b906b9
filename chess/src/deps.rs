//! Reverse index from squares to the pieces whose moves depend on them

use crate::squareset::SquareSet;
use crate::types::{Piece, PieceId, Square};

use std::collections::{HashMap, HashSet};

/// Records, for each evaluated non-king piece, the squares its last evaluation looked at
///
/// A change on any of these squares may change the moves of the piece, so the piece must be
/// evaluated again. The forward and reverse maps are kept in sync: a piece is listed as a
/// dependent of a square iff the square is among its recorded dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyIndex {
    deps: HashMap<PieceId, SquareSet>,
    dependents: Vec<HashSet<Piece>>,
}

impl DependencyIndex {
    pub fn new() -> DependencyIndex {
        DependencyIndex {
            deps: HashMap::new(),
            dependents: vec![HashSet::new(); Square::INDEX_COUNT],
        }
    }

    /// Replaces the dependencies of `piece` with `squares`
    pub fn record(&mut self, piece: Piece, squares: SquareSet) {
        debug_assert!(!piece.is_king(), "king dependencies are never tracked");
        self.remove(piece);
        for sq in squares {
            self.dependents[sq.index()].insert(piece);
        }
        self.deps.insert(piece.id(), squares);
    }

    /// Forgets about `piece`, returning its previous dependencies
    pub fn remove(&mut self, piece: Piece) -> SquareSet {
        let squares = self.deps.remove(&piece.id()).unwrap_or_default();
        for sq in squares {
            self.dependents[sq.index()].remove(&piece);
        }
        squares
    }

    pub fn dependents_of(&self, sq: Square) -> impl Iterator<Item = Piece> + '_ {
        self.dependents[sq.index()].iter().copied()
    }

    pub fn dependencies_of(&self, piece: Piece) -> SquareSet {
        self.deps.get(&piece.id()).copied().unwrap_or_default()
    }

    pub fn contains(&self, piece: Piece) -> bool {
        self.deps.contains_key(&piece.id())
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }
}

impl Default for DependencyIndex {
    fn default() -> Self {
        Self::new()
    }
}
