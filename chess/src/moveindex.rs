use crate::movegen::MoveList;
use crate::moves::Move;
use crate::types::{Color, Piece, PieceId, Square};

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Current candidate moves of every evaluated piece, with a reverse index by target square
///
/// The reverse index is keyed by the target square and the color of the moving piece, so that
/// attack queries don't need to scan the moves of a whole color. Empty entries are never kept,
/// which makes two indices with the same moves compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveIndex {
    by_piece: HashMap<PieceId, MoveList>,
    by_target: HashMap<(Square, Color), HashSet<Move>>,
}

impl MoveIndex {
    pub fn new() -> MoveIndex {
        MoveIndex::default()
    }

    /// Replaces the moves of `piece` with `moves`
    pub fn replace(&mut self, piece: Piece, moves: MoveList) {
        self.remove(piece);
        for mv in &moves {
            debug_assert_eq!(mv.piece(), piece);
            self.by_target
                .entry((mv.dst(), mv.color()))
                .or_default()
                .insert(*mv);
        }
        self.by_piece.insert(piece.id(), moves);
    }

    /// Forgets about `piece`, returning its previous moves
    pub fn remove(&mut self, piece: Piece) -> Option<MoveList> {
        let moves = self.by_piece.remove(&piece.id())?;
        for mv in &moves {
            if let Entry::Occupied(mut e) = self.by_target.entry((mv.dst(), mv.color())) {
                e.get_mut().remove(mv);
                if e.get().is_empty() {
                    e.remove();
                }
            }
        }
        Some(moves)
    }

    pub fn moves_of(&self, piece: Piece) -> &[Move] {
        self.by_piece
            .get(&piece.id())
            .map(|moves| moves.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, piece: Piece) -> bool {
        self.by_piece.contains_key(&piece.id())
    }

    /// Returns `true` if a piece of any color other than `color` has a move onto `sq`
    ///
    /// Every candidate move counts, including pawn steps forward. Pawn diagonals onto empty
    /// squares and squares held by the attacker's own pieces are not candidate moves, so they
    /// don't count.
    pub fn is_attacked(&self, sq: Square, color: Color) -> bool {
        Color::iter().any(|c| c != color && self.by_target.contains_key(&(sq, c)))
    }

    /// Iterates over the moves of color `color` which target `sq`
    pub fn moves_targeting(&self, sq: Square, color: Color) -> impl Iterator<Item = &Move> + '_ {
        self.by_target
            .get(&(sq, color))
            .into_iter()
            .flat_map(|moves| moves.iter())
    }

    /// Iterates over all the pieces which have at least one move
    pub fn movable(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.by_piece
            .iter()
            .filter(|(_, moves)| !moves.is_empty())
            .map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.by_piece.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_piece.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::MoveKind;
    use crate::types::PieceKind;

    fn list(moves: &[Move]) -> MoveList {
        let mut res = MoveList::new();
        res.extend(moves.iter().copied());
        res
    }

    #[test]
    fn test_replace() {
        let rook = Piece::new(PieceId::new(1), Color::Red, PieceKind::Rook);
        let knight = Piece::new(PieceId::new(2), Color::Blue, PieceKind::Knight);
        let a = Square::from_parts(10, 4);
        let b = Square::from_parts(10, 5);

        let mut idx = MoveIndex::new();
        idx.replace(rook, list(&[Move::new(rook, MoveKind::Simple, a)]));
        idx.replace(knight, list(&[Move::new(knight, MoveKind::Simple, a)]));
        assert!(idx.is_attacked(a, Color::Yellow));
        assert!(idx.is_attacked(a, Color::Red));
        assert!(!idx.is_attacked(b, Color::Yellow));
        assert_eq!(idx.moves_targeting(a, Color::Red).count(), 1);

        idx.replace(knight, list(&[Move::new(knight, MoveKind::Simple, b)]));
        assert!(!idx.is_attacked(a, Color::Red));
        assert!(idx.is_attacked(a, Color::Blue));
        assert!(idx.is_attacked(b, Color::Red));
        assert_eq!(idx.moves_of(knight), &[Move::new(knight, MoveKind::Simple, b)]);

        assert!(idx.remove(rook).is_some());
        assert!(idx.remove(rook).is_none());
        assert!(idx.moves_of(rook).is_empty());
        assert!(!idx.is_attacked(a, Color::Blue));
    }

    #[test]
    fn test_no_stale_entries() {
        let bishop = Piece::new(PieceId::new(3), Color::Green, PieceKind::Bishop);
        let a = Square::from_parts(6, 9);

        let mut incremental = MoveIndex::new();
        incremental.replace(bishop, list(&[Move::new(bishop, MoveKind::Simple, a)]));
        incremental.replace(bishop, MoveList::new());

        let mut fresh = MoveIndex::new();
        fresh.replace(bishop, MoveList::new());
        assert_eq!(incremental, fresh);
        assert_eq!(fresh.movable().count(), 0);
        assert!(fresh.contains(bishop));
    }
}
