use crate::deps::DependencyIndex;
use crate::history::{History, MoveLog};
use crate::moveindex::MoveIndex;
use crate::moves::{Move, MoveKind};
use crate::position::{IndexError, PositionIndex};
use crate::reeval;
use crate::squareset::SquareSet;
use crate::types::{Color, Piece, PieceId, PieceKind, Square, SquareError};
use quadchess_base::geometry;

use log::debug;
use thiserror::Error;

use std::collections::BTreeSet;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("bad square: {0}")]
    InvalidSquare(#[from] SquareError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error("color {0} already has a king on the board")]
    DuplicateKing(Color),
    #[error("move {0} is not legal")]
    IllegalMove(Move),
    #[error("move {0} doesn't match the piece kind")]
    UnexpectedMoveType(Move),
}

/// Initial arrangement of pieces, used to set up a game
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement(Vec<(Color, PieceKind, Square)>);

impl Placement {
    pub fn empty() -> Placement {
        Placement(Vec::new())
    }

    /// Standard setup: 16 pieces per color on the two rows next to its home edge
    pub fn initial() -> Placement {
        let mut res = Placement::empty();
        for color in Color::iter() {
            for (kind, sq) in geometry::initial_layout(color) {
                res.push(color, kind, sq);
            }
        }
        res
    }

    pub fn push(&mut self, color: Color, kind: PieceKind, sq: Square) -> &mut Self {
        self.0.push((color, kind, sq));
        self
    }

    pub fn with(mut self, color: Color, kind: PieceKind, sq: Square) -> Self {
        self.push(color, kind, sq);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Color, PieceKind, Square)> + '_ {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Board state with incrementally maintained candidate moves
///
/// After every mutation, the state holds the same moves and dependencies as a state rebuilt
/// from scratch for the same position and history would hold. Only the pieces affected by the
/// change are evaluated again: those which looked at a changed square, plus all the kings.
///
/// The history is written only by [`apply_move()`](BaseBoardState::apply_move). The raw
/// mutations ([`add_piece()`](BaseBoardState::add_piece),
/// [`remove_piece()`](BaseBoardState::remove_piece),
/// [`move_piece()`](BaseBoardState::move_piece) and
/// [`remove_color()`](BaseBoardState::remove_color)) don't record anything.
#[derive(Debug, Clone)]
pub struct BaseBoardState<H: History> {
    pos: PositionIndex,
    deps: DependencyIndex,
    moves: MoveIndex,
    kings: [Option<Piece>; Color::COUNT],
    history: H,
    next_id: PieceId,
}

pub type BoardState = BaseBoardState<MoveLog>;

impl<H: History> BaseBoardState<H> {
    fn blank(history: H) -> Self {
        BaseBoardState {
            pos: PositionIndex::new(),
            deps: DependencyIndex::new(),
            moves: MoveIndex::new(),
            kings: [None; Color::COUNT],
            history,
            next_id: PieceId::new(0),
        }
    }

    pub fn new_game(placement: &Placement) -> Result<Self, Error> {
        Self::with_history(placement, H::default())
    }

    /// Sets up the board from `placement`, using `history` as the history of the game
    ///
    /// Placed pieces receive fresh ids in placement order, so moves in `history` can only
    /// refer to them if the history was recorded on a board set up the same way.
    pub fn with_history(placement: &Placement, history: H) -> Result<Self, Error> {
        let mut res = Self::blank(history);
        for &(color, kind, sq) in placement.iter() {
            let piece = res.new_piece(color, kind);
            res.place(piece, sq)?;
        }
        res.rebuild();
        debug!("new game with {} pieces", res.pos.len());
        Ok(res)
    }

    /// Creates a piece with a fresh id, without placing it
    pub fn new_piece(&mut self, color: Color, kind: PieceKind) -> Piece {
        let piece = Piece::new(self.next_id, color, kind);
        self.next_id = self.next_id.next();
        piece
    }

    fn place(&mut self, piece: Piece, sq: Square) -> Result<(), Error> {
        if piece.is_king() && self.kings[piece.color().index()].is_some() {
            return Err(Error::DuplicateKing(piece.color()));
        }
        self.pos.put(sq, piece)?;
        if piece.is_king() {
            self.kings[piece.color().index()] = Some(piece);
        }
        if piece.id() >= self.next_id {
            self.next_id = piece.id().next();
        }
        Ok(())
    }

    fn unregister(&mut self, piece: Piece) {
        let slot = &mut self.kings[piece.color().index()];
        if *slot == Some(piece) {
            *slot = None;
        }
    }

    fn dirty_around(&self, touched: SquareSet, extra: &[Piece]) -> BTreeSet<Piece> {
        let mut dirty: BTreeSet<Piece> = extra.iter().copied().collect();
        for sq in touched {
            dirty.extend(self.deps.dependents_of(sq));
        }
        dirty
    }

    fn kings_iter(&self) -> impl Iterator<Item = Piece> + '_ {
        self.kings.iter().flatten().copied()
    }

    fn run(&mut self, dirty: BTreeSet<Piece>) {
        let kings: Vec<Piece> = self.kings_iter().collect();
        reeval::reevaluate(
            &self.pos,
            &self.history,
            &mut self.deps,
            &mut self.moves,
            dirty,
            kings,
        );
    }

    fn reevaluate(&mut self, touched: SquareSet, extra: &[Piece]) {
        let dirty = self.dirty_around(touched, extra);
        debug!("reevaluating {} dirty pieces", dirty.len());
        self.run(dirty);
        #[cfg(feature = "selftest")]
        assert!(
            self.is_consistent(),
            "incremental update diverged from full rebuild"
        );
    }

    fn rebuild(&mut self) {
        self.deps = DependencyIndex::new();
        self.moves = MoveIndex::new();
        let all: BTreeSet<Piece> = self.pos.iter().map(|(_, p)| p).collect();
        self.run(all);
    }

    /// Puts `piece` on `sq`
    pub fn add_piece(&mut self, piece: Piece, sq: Square) -> Result<(), Error> {
        self.place(piece, sq)?;
        debug!("added {} at {}", piece, sq);
        self.reevaluate(SquareSet::from_square(sq), &[piece]);
        Ok(())
    }

    /// Takes `piece` off the board, returning the square it stood on
    pub fn remove_piece(&mut self, piece: Piece) -> Result<Square, Error> {
        let sq = self.pos.remove_by_piece(piece)?;
        self.unregister(piece);
        debug!("removed {} from {}", piece, sq);
        self.reevaluate(SquareSet::from_square(sq), &[piece]);
        Ok(sq)
    }

    /// Relocates `piece` to `dst` regardless of the rules, capturing whatever stood there
    pub fn move_piece(&mut self, piece: Piece, dst: Square) -> Result<Option<Piece>, Error> {
        let src = self
            .pos
            .square_of(piece)
            .ok_or(IndexError::PieceNotOnBoard(piece))?;
        let captured = self.pos.force_move(piece, dst)?;
        if let Some(victim) = captured {
            self.unregister(victim);
        }
        debug!("moved {} from {} to {}", piece, src, dst);
        let extra: Vec<Piece> = [Some(piece), captured].into_iter().flatten().collect();
        self.reevaluate(SquareSet::from_square(src).with(dst), &extra);
        Ok(captured)
    }

    /// Removes all the pieces of `color`, returning them
    ///
    /// Used when a player leaves the game.
    pub fn remove_color(&mut self, color: Color) -> Vec<Piece> {
        let removed: Vec<(Square, Piece)> = self
            .pos
            .iter()
            .filter(|(_, p)| p.color() == color)
            .collect();
        let mut touched = SquareSet::EMPTY;
        for &(sq, piece) in &removed {
            // Pieces come from the index itself, so removal can't fail
            let _ = self.pos.remove_by_piece(piece);
            touched.set(sq);
        }
        self.kings[color.index()] = None;
        let pieces: Vec<Piece> = removed.into_iter().map(|(_, p)| p).collect();
        debug!("removed {} pieces of color {}", pieces.len(), color);
        self.reevaluate(touched, &pieces);
        pieces
    }

    /// Applies a legal move, recording it in the history
    ///
    /// Returns the captured piece, if any. On error the state is left unchanged.
    pub fn apply_move(&mut self, mv: Move) -> Result<Option<Piece>, Error> {
        let piece = mv.piece();
        let src = self
            .pos
            .square_of(piece)
            .ok_or(IndexError::PieceNotOnBoard(piece))?;
        debug_assert!(
            mv.kind().fits(piece.kind()),
            "move {} doesn't match the piece kind",
            mv
        );
        if !mv.kind().fits(piece.kind()) {
            return Err(Error::UnexpectedMoveType(mv));
        }
        if !self.moves.moves_of(piece).contains(&mv) {
            return Err(Error::IllegalMove(mv));
        }
        let effect = self.plan(mv)?;

        let mut touched = SquareSet::from_square(src).with(mv.dst());
        let mut extra = vec![piece];
        // Pawns next to a stale double step lose their en passant capture
        if let Some(prev) = self.history.last() {
            if prev.kind() == MoveKind::PawnDouble {
                touched.set(prev.dst());
            }
        }
        self.history.push(mv);

        let captured = match effect {
            Effect::Relocate => self.pos.force_move(piece, mv.dst())?,
            Effect::Enpassant { victim } => {
                touched.set(self.pos.remove_by_piece(victim)?);
                self.pos.force_move(piece, mv.dst())?;
                Some(victim)
            }
            Effect::Castle { rook, rook_dst } => {
                let rook_src = self.pos.remove_by_piece(rook)?;
                self.pos.force_move(piece, mv.dst())?;
                self.pos.put(rook_dst, rook)?;
                touched.set(rook_src);
                touched.set(rook_dst);
                extra.push(rook);
                None
            }
            Effect::Promote { kind } => {
                self.pos.remove_by_piece(piece)?;
                let captured = self.pos.piece_at(mv.dst());
                if let Some(victim) = captured {
                    self.pos.remove_by_piece(victim)?;
                }
                let promoted = self.new_piece(piece.color(), kind);
                self.pos.put(mv.dst(), promoted)?;
                extra.push(promoted);
                captured
            }
        };
        if let Some(victim) = captured {
            self.unregister(victim);
            extra.push(victim);
        }
        debug!("applied {}, captured {:?}", mv, captured.map(|p| p.to_string()));
        self.reevaluate(touched, &extra);
        Ok(captured)
    }

    fn plan(&self, mv: Move) -> Result<Effect, Error> {
        let color = mv.color();
        Ok(match mv.kind() {
            MoveKind::Simple | MoveKind::PawnDouble => Effect::Relocate,
            MoveKind::Enpassant => {
                let victim = self
                    .history
                    .last()
                    .filter(|last| last.kind() == MoveKind::PawnDouble)
                    .map(|last| last.piece())
                    .filter(|&p| self.pos.contains(p))
                    .ok_or(Error::UnexpectedMoveType(mv))?;
                Effect::Enpassant { victim }
            }
            MoveKind::CastlingKingside | MoveKind::CastlingQueenside => {
                let side = mv.kind().castling().ok_or(Error::UnexpectedMoveType(mv))?;
                let rook_src = geometry::from_view(geometry::castling_rook_src(side), color);
                let rook = self
                    .pos
                    .piece_at(rook_src)
                    .filter(|r| r.color() == color && r.kind() == PieceKind::Rook)
                    .ok_or(Error::UnexpectedMoveType(mv))?;
                let rook_dst = geometry::from_view(geometry::castling_rook_dst(side), color);
                Effect::Castle { rook, rook_dst }
            }
            MoveKind::PromoteKnight
            | MoveKind::PromoteBishop
            | MoveKind::PromoteRook
            | MoveKind::PromoteQueen => {
                let kind = mv
                    .kind()
                    .promote()
                    .ok_or(Error::UnexpectedMoveType(mv))?
                    .into();
                Effect::Promote { kind }
            }
        })
    }

    pub fn legal_moves(&self, piece: Piece) -> &[Move] {
        self.moves.moves_of(piece)
    }

    /// Iterates over the moves of all the pieces of `color`
    pub fn moves_of_color(&self, color: Color) -> impl Iterator<Item = Move> + '_ {
        self.pieces_of(color)
            .flat_map(move |p| self.moves.moves_of(p).iter().copied())
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.pos.piece_at(sq)
    }

    pub fn square_of(&self, piece: Piece) -> Option<Square> {
        self.pos.square_of(piece)
    }

    /// Iterates over all the pieces on the board in row-major order of their squares
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pos.iter()
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = Piece> + '_ {
        self.pos
            .iter()
            .map(|(_, p)| p)
            .filter(move |p| p.color() == color)
    }

    pub fn king(&self, color: Color) -> Option<Piece> {
        self.kings[color.index()]
    }

    /// Returns `true` if a piece of a color other than `color` has a candidate move onto `sq`
    pub fn is_attacked(&self, sq: Square, color: Color) -> bool {
        self.moves.is_attacked(sq, color)
    }

    /// Returns the kings which stand on an attacked square
    pub fn checked_kings(&self) -> Vec<Piece> {
        self.kings_iter()
            .filter(|&k| {
                self.pos
                    .square_of(k)
                    .is_some_and(|sq| self.is_attacked(sq, k.color()))
            })
            .collect()
    }

    pub fn has_any_legal_move(&self, color: Color) -> bool {
        self.moves_of_color(color).next().is_some()
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Returns the pieces whose moves depend on `sq`
    pub fn dependents_of(&self, sq: Square) -> Vec<Piece> {
        let mut res: Vec<Piece> = self.deps.dependents_of(sq).collect();
        res.sort();
        res
    }

    pub fn dependencies_of(&self, piece: Piece) -> SquareSet {
        self.deps.dependencies_of(piece)
    }

    /// Returns a copy of this state with all the moves computed from scratch
    pub fn rebuilt(&self) -> Self {
        let mut res = BaseBoardState {
            pos: self.pos.clone(),
            deps: DependencyIndex::new(),
            moves: MoveIndex::new(),
            kings: self.kings,
            history: self.history.clone(),
            next_id: self.next_id,
        };
        res.rebuild();
        res
    }

    /// Checks that the incrementally maintained data matches a full rebuild
    pub fn is_consistent(&self) -> bool {
        let fresh = self.rebuilt();
        self.deps == fresh.deps && self.moves == fresh.moves
    }
}

enum Effect {
    Relocate,
    Enpassant { victim: Piece },
    Castle { rook: Piece, rook_dst: Square },
    Promote { kind: PieceKind },
}
