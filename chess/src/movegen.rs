//! Move generators
//!
//! Each generator looks at the board from the point of view of the moving piece's color, so
//! the rules are written once for a player sitting at the bottom edge. Results are converted
//! back into real coordinates before they leave this module.
//!
//! Generators are pure: they read the position and the history and return an [`Evaluation`].
//! Along with the moves, an evaluation lists every square the generator looked at. A change on
//! any other square can't affect the result.

use crate::history::History;
use crate::moves::{Move, MoveKind, PromotePiece};
use crate::position::PositionIndex;
use crate::squareset::SquareSet;
use crate::types::{CastlingSide, Color, Piece, PieceKind, Square};
use quadchess_base::geometry;

use arrayvec::ArrayVec;
use thiserror::Error;

use std::ops::{Deref, DerefMut};
use std::slice;

/// Upper bound on the number of moves a single piece can have
pub const MAX_MOVES: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveList(ArrayVec<Move, MAX_MOVES>);

impl Deref for MoveList {
    type Target = ArrayVec<Move, MAX_MOVES>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(ArrayVec::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub moves: MoveList,
    pub deps: SquareSet,
}

#[derive(Debug, Copy, Clone, Error, PartialEq, Eq)]
#[error("piece {0} is not on the board")]
pub struct NotOnBoard(pub Piece);

/// Position as seen by one color
///
/// All the squares passed to and returned from a view are in view coordinates.
#[derive(Copy, Clone)]
pub struct View<'a> {
    pos: &'a PositionIndex,
    color: Color,
}

impl<'a> View<'a> {
    pub fn new(pos: &'a PositionIndex, color: Color) -> View<'a> {
        View { pos, color }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.pos.piece_at(self.real(sq))
    }

    pub fn square_of(&self, piece: Piece) -> Option<Square> {
        self.pos
            .square_of(piece)
            .map(|sq| geometry::to_view(sq, self.color))
    }

    pub fn real(&self, sq: Square) -> Square {
        geometry::from_view(sq, self.color)
    }
}

pub const DIAGONAL: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
pub const ORTHOGONAL: [(i8, i8); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];
pub const ALL_DIRS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
pub const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

struct Gen<'v, 'a> {
    view: &'v View<'a>,
    piece: Piece,
    src: Square,
    res: Evaluation,
}

impl<'v, 'a> Gen<'v, 'a> {
    fn new(view: &'v View<'a>, piece: Piece) -> Result<Self, NotOnBoard> {
        debug_assert_eq!(view.color(), piece.color());
        let src = view.square_of(piece).ok_or(NotOnBoard(piece))?;
        Ok(Gen {
            view,
            piece,
            src,
            res: Evaluation::default(),
        })
    }

    fn depend(&mut self, sq: Square) {
        self.res.deps.set(self.view.real(sq));
    }

    fn add(&mut self, kind: MoveKind, dst: Square) {
        let mv = Move::new(self.piece, kind, self.view.real(dst));
        self.res.moves.push(mv);
    }

    /// Adds a pawn move, expanding it into promotions on the far edge
    fn add_pawn(&mut self, dst: Square) {
        if geometry::is_promote_square(dst) {
            for p in PromotePiece::ALL {
                self.add(p.into(), dst);
            }
        } else {
            self.add(MoveKind::Simple, dst);
        }
    }

    fn is_enemy(&self, p: Piece) -> bool {
        p.color() != self.piece.color()
    }

    fn finish(self) -> Evaluation {
        self.res
    }
}

/// Generates moves of a bishop, a rook or a queen
///
/// Each ray stops at the first occupied square, which is included if it holds an enemy piece.
/// Every square visited along the way is a dependency.
pub fn gen_sliding(
    view: &View<'_>,
    piece: Piece,
    dirs: &[(i8, i8)],
) -> Result<Evaluation, NotOnBoard> {
    let mut g = Gen::new(view, piece)?;
    for &(dr, dc) in dirs {
        let mut cur = g.src;
        while let Some(sq) = cur.try_shift(dr, dc) {
            cur = sq;
            g.depend(sq);
            match view.piece_at(sq) {
                None => g.add(MoveKind::Simple, sq),
                Some(p) => {
                    if g.is_enemy(p) {
                        g.add(MoveKind::Simple, sq);
                    }
                    break;
                }
            }
        }
    }
    Ok(g.finish())
}

pub fn gen_knight(view: &View<'_>, piece: Piece) -> Result<Evaluation, NotOnBoard> {
    let mut g = Gen::new(view, piece)?;
    for &(dr, dc) in &KNIGHT_JUMPS {
        if let Some(sq) = g.src.try_shift(dr, dc) {
            g.depend(sq);
            match view.piece_at(sq) {
                Some(p) if !g.is_enemy(p) => {}
                _ => g.add(MoveKind::Simple, sq),
            }
        }
    }
    Ok(g.finish())
}

pub fn gen_pawn<H: History>(
    view: &View<'_>,
    piece: Piece,
    history: &H,
) -> Result<Evaluation, NotOnBoard> {
    let mut g = Gen::new(view, piece)?;
    let (fr, fc) = geometry::PAWN_FORWARD;

    if let Some(fwd) = g.src.try_shift(fr, fc) {
        g.depend(fwd);
        if view.piece_at(fwd).is_none() {
            g.add_pawn(fwd);
            if !history.has_moved(piece) {
                if let Some(dbl) = fwd.try_shift(fr, fc) {
                    g.depend(dbl);
                    if view.piece_at(dbl).is_none() && !geometry::is_promote_square(dbl) {
                        g.add(MoveKind::PawnDouble, dbl);
                    }
                }
            }
        }
    }

    let last = history.last();
    for dc in [-1, 1] {
        if let Some(beside) = g.src.try_shift(0, dc) {
            g.depend(beside);
        }
        let Some(diag) = g.src.try_shift(fr, dc) else {
            continue;
        };
        g.depend(diag);
        match view.piece_at(diag) {
            Some(p) if g.is_enemy(p) => g.add_pawn(diag),
            Some(_) => {}
            None => {
                if can_take_enpassant(view, piece, g.src.try_shift(0, dc), diag, last) {
                    g.add(MoveKind::Enpassant, diag);
                }
            }
        }
    }

    Ok(g.finish())
}

/// Checks whether the last move was an enemy double step which passed over `diag` and landed
/// on `beside`
fn can_take_enpassant(
    view: &View<'_>,
    piece: Piece,
    beside: Option<Square>,
    diag: Square,
    last: Option<Move>,
) -> bool {
    let (Some(beside), Some(last)) = (beside, last) else {
        return false;
    };
    if last.color() == piece.color() || view.square_of(last.piece()) != Some(beside) {
        return false;
    }
    last.passed_square() == Some(view.real(diag))
}

/// Generates king moves
///
/// `attacked` tells whether a real square is threatened by another color. Kings don't record
/// dependencies, they are evaluated again after every change.
pub fn gen_king<H, F>(
    view: &View<'_>,
    piece: Piece,
    history: &H,
    attacked: F,
) -> Result<Evaluation, NotOnBoard>
where
    H: History,
    F: Fn(Square) -> bool,
{
    let mut g = Gen::new(view, piece)?;
    for &(dr, dc) in &ALL_DIRS {
        let Some(sq) = g.src.try_shift(dr, dc) else {
            continue;
        };
        if matches!(view.piece_at(sq), Some(p) if !g.is_enemy(p)) {
            continue;
        }
        if !attacked(view.real(sq)) {
            g.add(MoveKind::Simple, sq);
        }
    }

    if g.src == geometry::KING_HOME && !history.has_moved(piece) {
        for side in [CastlingSide::King, CastlingSide::Queen] {
            if can_castle(view, piece, history, side, &attacked) {
                g.add(side.into(), geometry::castling_king_dst(side));
            }
        }
    }

    Ok(g.finish())
}

fn can_castle<H, F>(
    view: &View<'_>,
    piece: Piece,
    history: &H,
    side: CastlingSide,
    attacked: &F,
) -> bool
where
    H: History,
    F: Fn(Square) -> bool,
{
    let rook = match view.piece_at(geometry::castling_rook_src(side)) {
        Some(r) if r.color() == piece.color() && r.kind() == PieceKind::Rook => r,
        _ => return false,
    };
    if history.has_moved(rook) {
        return false;
    }
    if geometry::castling_pass(side)
        .iter()
        .any(|&sq| view.piece_at(sq).is_some())
    {
        return false;
    }
    !geometry::castling_safe(side)
        .iter()
        .any(|&sq| attacked(view.real(sq)))
}

/// Evaluates a non-king piece
///
/// # Panics
///
/// Panics if `piece` is a king. Kings need to know which squares are attacked, use
/// [`gen_king()`] for them.
pub fn evaluate<H: History>(
    view: &View<'_>,
    piece: Piece,
    history: &H,
) -> Result<Evaluation, NotOnBoard> {
    match piece.kind() {
        PieceKind::Pawn => gen_pawn(view, piece, history),
        PieceKind::Knight => gen_knight(view, piece),
        PieceKind::Bishop => gen_sliding(view, piece, &DIAGONAL),
        PieceKind::Rook => gen_sliding(view, piece, &ORTHOGONAL),
        PieceKind::Queen => gen_sliding(view, piece, &ALL_DIRS),
        PieceKind::King => panic!("king {} must be evaluated with gen_king()", piece),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MoveLog;
    use crate::types::PieceId;

    struct Setup {
        pos: PositionIndex,
        next: u32,
    }

    impl Setup {
        fn new() -> Self {
            Setup {
                pos: PositionIndex::new(),
                next: 1,
            }
        }

        fn eval(&self, piece: Piece, history: &MoveLog) -> Result<Evaluation, NotOnBoard> {
            evaluate(&View::new(&self.pos, piece.color()), piece, history)
        }

        fn put(&mut self, color: Color, kind: PieceKind, row: u8, col: u8) -> Piece {
            let p = Piece::new(PieceId::new(self.next), color, kind);
            self.next += 1;
            self.pos.put(Square::from_parts(row, col), p).unwrap();
            p
        }
    }

    fn dsts(ev: &Evaluation) -> Vec<(u8, u8)> {
        let mut res: Vec<_> = ev.moves.iter().map(|m| (m.dst().row(), m.dst().col())).collect();
        res.sort();
        res.dedup();
        res
    }

    #[test]
    fn test_rook_stops() {
        let mut s = Setup::new();
        let rook = s.put(Color::Red, PieceKind::Rook, 14, 4);
        s.put(Color::Red, PieceKind::Pawn, 13, 4);
        s.put(Color::Blue, PieceKind::Knight, 14, 6);
        let ev = s.eval(rook, &MoveLog::new()).unwrap();
        assert_eq!(dsts(&ev), vec![(14, 5), (14, 6)]);
        assert_eq!(
            ev.deps,
            [(13, 4), (14, 5), (14, 6)]
                .into_iter()
                .map(|(r, c)| Square::from_parts(r, c))
                .collect::<SquareSet>()
        );
    }

    #[test]
    fn test_bishop_corner_cut() {
        let mut s = Setup::new();
        let bishop = s.put(Color::Red, PieceKind::Bishop, 4, 4);
        let ev = s.eval(bishop, &MoveLog::new()).unwrap();
        assert!(!dsts(&ev).contains(&(3, 3)));
        assert!(dsts(&ev).contains(&(3, 5)));
        assert!(dsts(&ev).contains(&(5, 3)));
        assert!(dsts(&ev).contains(&(11, 11)));
        assert!(!dsts(&ev).contains(&(12, 12)));
        assert_eq!(ev.moves.len(), ev.deps.len() as usize);
    }

    #[test]
    fn test_knight() {
        let mut s = Setup::new();
        let knight = s.put(Color::Red, PieceKind::Knight, 14, 5);
        s.put(Color::Red, PieceKind::Pawn, 12, 4);
        s.put(Color::Yellow, PieceKind::Pawn, 12, 6);
        let ev = s.eval(knight, &MoveLog::new()).unwrap();
        assert_eq!(dsts(&ev), vec![(12, 6), (13, 7)]);
        assert_eq!(ev.deps.len(), 3);
        assert!(ev.deps.has(Square::from_parts(12, 4)));
    }

    #[test]
    fn test_pawn_initial() {
        let mut s = Setup::new();
        let pawn = s.put(Color::Blue, PieceKind::Pawn, 7, 2);
        let ev = s.eval(pawn, &MoveLog::new()).unwrap();
        assert_eq!(dsts(&ev), vec![(7, 3), (7, 4)]);
        assert_eq!(ev.moves[1].kind(), MoveKind::PawnDouble);
        assert!(ev.deps.has(Square::from_parts(6, 3)));
        assert!(ev.deps.has(Square::from_parts(8, 3)));
        assert!(ev.deps.has(Square::from_parts(6, 2)));
        assert!(ev.deps.has(Square::from_parts(8, 2)));
    }

    #[test]
    fn test_pawn_blocked_and_capture() {
        let mut s = Setup::new();
        let pawn = s.put(Color::Yellow, PieceKind::Pawn, 2, 7);
        s.put(Color::Green, PieceKind::Rook, 3, 7);
        s.put(Color::Red, PieceKind::Bishop, 3, 8);
        s.put(Color::Yellow, PieceKind::Knight, 3, 6);
        let ev = s.eval(pawn, &MoveLog::new()).unwrap();
        assert_eq!(dsts(&ev), vec![(3, 8)]);
        assert!(!ev.deps.has(Square::from_parts(4, 7)));
    }

    #[test]
    fn test_pawn_promotion() {
        let mut s = Setup::new();
        let pawn = s.put(Color::Green, PieceKind::Pawn, 6, 2);
        let ev = s.eval(pawn, &MoveLog::new()).unwrap();
        let kinds: Vec<_> = ev.moves.iter().map(|m| m.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                MoveKind::PromoteQueen,
                MoveKind::PromoteRook,
                MoveKind::PromoteBishop,
                MoveKind::PromoteKnight,
            ]
        );
        assert!(ev.moves.iter().all(|m| m.dst() == Square::from_parts(6, 1)));
    }

    #[test]
    fn test_enpassant() {
        let mut s = Setup::new();
        let red = s.put(Color::Red, PieceKind::Pawn, 4, 7);
        let yellow = s.put(Color::Yellow, PieceKind::Pawn, 4, 6);
        let mut history = MoveLog::new();
        history.push(Move::new(
            Piece::new(PieceId::new(100), Color::Blue, PieceKind::Knight),
            MoveKind::Simple,
            Square::from_parts(6, 3),
        ));
        history.push(Move::new(yellow, MoveKind::PawnDouble, Square::from_parts(4, 6)));

        let ev = s.eval(red, &history).unwrap();
        assert!(ev
            .moves
            .contains(&Move::new(red, MoveKind::Enpassant, Square::from_parts(3, 6))));

        // Any move in between makes the double step stale
        history.push(Move::new(
            Piece::new(PieceId::new(101), Color::Green, PieceKind::Knight),
            MoveKind::Simple,
            Square::from_parts(6, 12),
        ));
        let ev = s.eval(red, &history).unwrap();
        assert!(ev.moves.iter().all(|m| m.kind() != MoveKind::Enpassant));
    }

    #[test]
    fn test_no_perpendicular_enpassant() {
        let mut s = Setup::new();
        let red = s.put(Color::Red, PieceKind::Pawn, 7, 6);
        let blue = s.put(Color::Blue, PieceKind::Pawn, 7, 5);
        let mut history = MoveLog::new();
        history.push(Move::new(blue, MoveKind::PawnDouble, Square::from_parts(7, 5)));
        let ev = s.eval(red, &history).unwrap();
        assert!(ev.moves.iter().all(|m| m.kind() != MoveKind::Enpassant));
    }

    #[test]
    fn test_king_danger() {
        let mut s = Setup::new();
        let king = s.put(Color::Red, PieceKind::King, 10, 8);
        s.put(Color::Red, PieceKind::Pawn, 9, 8);
        let danger = Square::from_parts(11, 8);
        let ev = gen_king(&View::new(&s.pos, Color::Red), king, &MoveLog::new(), |sq| {
            sq == danger
        })
        .unwrap();
        assert_eq!(
            dsts(&ev),
            vec![(9, 7), (9, 9), (10, 7), (10, 9), (11, 7), (11, 9)]
        );
        assert!(ev.deps.is_empty());
    }

    #[test]
    fn test_castling() {
        let mut s = Setup::new();
        let king = s.put(Color::Yellow, PieceKind::King, 1, 7);
        s.put(Color::Yellow, PieceKind::Rook, 1, 4);
        s.put(Color::Yellow, PieceKind::Rook, 1, 11);
        let view = View::new(&s.pos, Color::Yellow);
        let history = MoveLog::new();

        let ev = gen_king(&view, king, &history, |_| false).unwrap();
        let kingside = Move::new(king, MoveKind::CastlingKingside, Square::from_parts(1, 5));
        let queenside = Move::new(king, MoveKind::CastlingQueenside, Square::from_parts(1, 9));
        assert!(ev.moves.contains(&kingside));
        assert!(ev.moves.contains(&queenside));

        let crossed = Square::from_parts(1, 6);
        let ev = gen_king(&view, king, &history, |sq| sq == crossed).unwrap();
        assert!(!ev.moves.contains(&kingside));
        assert!(ev.moves.contains(&queenside));

        let ev = gen_king(&view, king, &history, |sq| sq == Square::from_parts(1, 7)).unwrap();
        assert!(ev.moves.iter().all(|m| m.kind() == MoveKind::Simple));
    }

    #[test]
    #[should_panic]
    fn test_evaluate_king() {
        let mut s = Setup::new();
        let king = s.put(Color::Red, PieceKind::King, 14, 8);
        let _ = s.eval(king, &MoveLog::new());
    }

    #[test]
    fn test_not_on_board() {
        let s = Setup::new();
        let ghost = Piece::new(PieceId::new(42), Color::Red, PieceKind::Queen);
        assert_eq!(
            s.eval(ghost, &MoveLog::new()),
            Err(NotOnBoard(ghost))
        );
    }
}
