use crate::types::{CastlingSide, Color, Piece, PieceKind, Square};
use quadchess_base::geometry;

use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum MoveKind {
    Simple = 0,
    PawnDouble = 1,
    CastlingKingside = 2,
    CastlingQueenside = 3,
    Enpassant = 4,
    PromoteKnight = 5,
    PromoteBishop = 6,
    PromoteRook = 7,
    PromoteQueen = 8,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PromotePiece {
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
}

impl PromotePiece {
    pub const ALL: [PromotePiece; 4] = [
        PromotePiece::Queen,
        PromotePiece::Rook,
        PromotePiece::Bishop,
        PromotePiece::Knight,
    ];
}

impl From<PromotePiece> for PieceKind {
    fn from(p: PromotePiece) -> PieceKind {
        match p {
            PromotePiece::Knight => PieceKind::Knight,
            PromotePiece::Bishop => PieceKind::Bishop,
            PromotePiece::Rook => PieceKind::Rook,
            PromotePiece::Queen => PieceKind::Queen,
        }
    }
}

impl From<PromotePiece> for MoveKind {
    fn from(p: PromotePiece) -> MoveKind {
        match p {
            PromotePiece::Knight => MoveKind::PromoteKnight,
            PromotePiece::Bishop => MoveKind::PromoteBishop,
            PromotePiece::Rook => MoveKind::PromoteRook,
            PromotePiece::Queen => MoveKind::PromoteQueen,
        }
    }
}

impl From<CastlingSide> for MoveKind {
    fn from(s: CastlingSide) -> MoveKind {
        match s {
            CastlingSide::King => MoveKind::CastlingKingside,
            CastlingSide::Queen => MoveKind::CastlingQueenside,
        }
    }
}

impl MoveKind {
    pub fn promote(&self) -> Option<PromotePiece> {
        match *self {
            MoveKind::PromoteKnight => Some(PromotePiece::Knight),
            MoveKind::PromoteBishop => Some(PromotePiece::Bishop),
            MoveKind::PromoteRook => Some(PromotePiece::Rook),
            MoveKind::PromoteQueen => Some(PromotePiece::Queen),
            _ => None,
        }
    }

    pub fn castling(&self) -> Option<CastlingSide> {
        match *self {
            MoveKind::CastlingKingside => Some(CastlingSide::King),
            MoveKind::CastlingQueenside => Some(CastlingSide::Queen),
            _ => None,
        }
    }

    /// Returns `true` if a piece of kind `kind` can ever make a move of this kind
    pub fn fits(&self, kind: PieceKind) -> bool {
        match *self {
            MoveKind::Simple => true,
            MoveKind::PawnDouble
            | MoveKind::Enpassant
            | MoveKind::PromoteKnight
            | MoveKind::PromoteBishop
            | MoveKind::PromoteRook
            | MoveKind::PromoteQueen => kind == PieceKind::Pawn,
            MoveKind::CastlingKingside | MoveKind::CastlingQueenside => kind == PieceKind::King,
        }
    }
}

/// A candidate move of one piece
///
/// The destination is given in real board coordinates. For castling it is the square where
/// the king lands.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Move {
    piece: Piece,
    kind: MoveKind,
    dst: Square,
}

impl Move {
    pub const fn new(piece: Piece, kind: MoveKind, dst: Square) -> Move {
        Move { piece, kind, dst }
    }

    pub const fn piece(&self) -> Piece {
        self.piece
    }

    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    pub const fn dst(&self) -> Square {
        self.dst
    }

    pub const fn color(&self) -> Color {
        self.piece.color()
    }

    /// For a pawn double step, returns the square the pawn jumped over
    pub fn passed_square(&self) -> Option<Square> {
        if self.kind != MoveKind::PawnDouble {
            return None;
        }
        let color = self.color();
        geometry::to_view(self.dst, color)
            .try_shift(-geometry::PAWN_FORWARD.0, -geometry::PAWN_FORWARD.1)
            .map(|sq| geometry::from_view(sq, color))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{} {}", self.piece, self.dst)?;
        match self.kind {
            MoveKind::Simple | MoveKind::PawnDouble => Ok(()),
            MoveKind::Enpassant => write!(f, " e.p."),
            MoveKind::CastlingKingside => write!(f, " O-O"),
            MoveKind::CastlingQueenside => write!(f, " O-O-O"),
            MoveKind::PromoteKnight => write!(f, "=N"),
            MoveKind::PromoteBishop => write!(f, "=B"),
            MoveKind::PromoteRook => write!(f, "=R"),
            MoveKind::PromoteQueen => write!(f, "=Q"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceId;

    #[test]
    fn test_kinds() {
        for p in PromotePiece::ALL {
            let kind = MoveKind::from(p);
            assert_eq!(kind.promote(), Some(p));
            assert!(kind.fits(PieceKind::Pawn));
            assert!(!kind.fits(PieceKind::Queen));
        }
        assert_eq!(
            MoveKind::from(CastlingSide::Queen).castling(),
            Some(CastlingSide::Queen)
        );
        assert!(MoveKind::CastlingKingside.fits(PieceKind::King));
        assert!(!MoveKind::CastlingKingside.fits(PieceKind::Rook));
        assert!(MoveKind::Simple.fits(PieceKind::Knight));
    }

    #[test]
    fn test_passed_square() {
        let pawn = Piece::new(PieceId::new(1), Color::Blue, PieceKind::Pawn);
        let mv = Move::new(pawn, MoveKind::PawnDouble, Square::from_parts(6, 4));
        assert_eq!(mv.passed_square(), Some(Square::from_parts(6, 3)));
        let mv = Move::new(pawn, MoveKind::Simple, Square::from_parts(6, 4));
        assert_eq!(mv.passed_square(), None);

        let pawn = Piece::new(PieceId::new(2), Color::Red, PieceKind::Pawn);
        let mv = Move::new(pawn, MoveKind::PawnDouble, Square::from_parts(11, 5));
        assert_eq!(mv.passed_square(), Some(Square::from_parts(12, 5)));
    }

    #[test]
    fn test_display() {
        let pawn = Piece::new(PieceId::new(7), Color::Green, PieceKind::Pawn);
        let mv = Move::new(pawn, MoveKind::PromoteQueen, Square::from_parts(5, 1));
        assert_eq!(mv.to_string(), "gP#7 5:1=Q");
    }
}
