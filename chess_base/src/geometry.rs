//! Board geometry and per-color perspective
//!
//! Every color sees the board rotated so that its home side is at the bottom. Move generation
//! works in these _view_ coordinates, so each rule is written once for the bottom player.
//! All the constants in this module are given in view coordinates.

use crate::types::{CastlingSide, Color, PieceKind, Square};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Side {
    Bottom,
    Left,
    Top,
    Right,
}

pub const fn home_side(c: Color) -> Side {
    match c {
        Color::Red => Side::Bottom,
        Color::Blue => Side::Left,
        Color::Yellow => Side::Top,
        Color::Green => Side::Right,
    }
}

/// Number of clockwise quarter turns which bring the home side of `c` to the bottom
pub const fn quarter_turns(c: Color) -> u8 {
    match home_side(c) {
        Side::Bottom => 0,
        Side::Right => 1,
        Side::Top => 2,
        Side::Left => 3,
    }
}

const fn rotate_cw(sq: Square) -> Square {
    Square::from_parts(sq.col(), Square::SIDE + 1 - sq.row())
}

const fn rotate(mut sq: Square, turns: u8) -> Square {
    let mut i = 0;
    while i < turns % 4 {
        sq = rotate_cw(sq);
        i += 1;
    }
    sq
}

/// Converts a real square into the view of color `c`
pub const fn to_view(sq: Square, c: Color) -> Square {
    rotate(sq, quarter_turns(c))
}

/// Converts a square in the view of color `c` back into a real square
pub const fn from_view(sq: Square, c: Color) -> Square {
    rotate(sq, 4 - quarter_turns(c))
}

pub const HOME_ROW: u8 = 14;
pub const PAWN_ROW: u8 = 13;
pub const PROMOTE_ROW: u8 = 1;

/// Direction in which pawns move
pub const PAWN_FORWARD: (i8, i8) = (-1, 0);

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

const FIRST_COL: u8 = 4;

pub const KING_HOME: Square = Square::from_parts(HOME_ROW, 8);

pub const fn is_promote_square(sq: Square) -> bool {
    sq.row() == PROMOTE_ROW
}

/// Returns the initial placement of the pieces of color `c`, in real coordinates
pub fn initial_layout(c: Color) -> impl Iterator<Item = (PieceKind, Square)> {
    let back = BACK_RANK
        .into_iter()
        .zip(FIRST_COL..)
        .map(|(kind, col)| (kind, Square::from_parts(HOME_ROW, col)));
    let pawns = (FIRST_COL..FIRST_COL + 8)
        .map(|col| (PieceKind::Pawn, Square::from_parts(PAWN_ROW, col)));
    back.chain(pawns).map(move |(kind, sq)| (kind, from_view(sq, c)))
}

pub const fn castling_rook_src(s: CastlingSide) -> Square {
    match s {
        CastlingSide::King => Square::from_parts(HOME_ROW, 11),
        CastlingSide::Queen => Square::from_parts(HOME_ROW, 4),
    }
}

pub const fn castling_rook_dst(s: CastlingSide) -> Square {
    match s {
        CastlingSide::King => Square::from_parts(HOME_ROW, 9),
        CastlingSide::Queen => Square::from_parts(HOME_ROW, 7),
    }
}

pub const fn castling_king_dst(s: CastlingSide) -> Square {
    match s {
        CastlingSide::King => Square::from_parts(HOME_ROW, 10),
        CastlingSide::Queen => Square::from_parts(HOME_ROW, 6),
    }
}

const KINGSIDE_PASS: [Square; 2] = [
    Square::from_parts(HOME_ROW, 9),
    Square::from_parts(HOME_ROW, 10),
];

const QUEENSIDE_PASS: [Square; 3] = [
    Square::from_parts(HOME_ROW, 5),
    Square::from_parts(HOME_ROW, 6),
    Square::from_parts(HOME_ROW, 7),
];

const KINGSIDE_SAFE: [Square; 3] = [
    KING_HOME,
    Square::from_parts(HOME_ROW, 9),
    Square::from_parts(HOME_ROW, 10),
];

const QUEENSIDE_SAFE: [Square; 3] = [
    KING_HOME,
    Square::from_parts(HOME_ROW, 7),
    Square::from_parts(HOME_ROW, 6),
];

/// Squares between the king and the rook, which must be empty to castle
pub const fn castling_pass(s: CastlingSide) -> &'static [Square] {
    match s {
        CastlingSide::King => &KINGSIDE_PASS,
        CastlingSide::Queen => &QUEENSIDE_PASS,
    }
}

/// Squares the king starts on, crosses and lands on, which must not be attacked to castle
pub const fn castling_safe(s: CastlingSide) -> &'static [Square] {
    match s {
        CastlingSide::King => &KINGSIDE_SAFE,
        CastlingSide::Queen => &QUEENSIDE_SAFE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation() {
        for c in Color::iter() {
            for sq in Square::iter() {
                assert_eq!(from_view(to_view(sq, c), c), sq);
                assert_eq!(to_view(from_view(sq, c), c), sq);
            }
        }
        let sq = Square::from_parts(4, 1);
        assert_eq!(to_view(sq, Color::Red), sq);
        assert_eq!(to_view(sq, Color::Yellow), Square::from_parts(11, 14));
    }

    #[test]
    fn test_home_sides() {
        assert_eq!(from_view(KING_HOME, Color::Red), Square::from_parts(14, 8));
        assert_eq!(from_view(KING_HOME, Color::Blue), Square::from_parts(8, 1));
        assert_eq!(from_view(KING_HOME, Color::Yellow), Square::from_parts(1, 7));
        assert_eq!(from_view(KING_HOME, Color::Green), Square::from_parts(7, 14));

        // Forward for Blue is to the right, for Green to the left
        let blue_pawn = from_view(Square::from_parts(PAWN_ROW, 6), Color::Blue);
        let blue_step = from_view(Square::from_parts(PAWN_ROW - 1, 6), Color::Blue);
        assert_eq!(blue_pawn.col() + 1, blue_step.col());
        assert_eq!(blue_pawn.row(), blue_step.row());
        let green_pawn = from_view(Square::from_parts(PAWN_ROW, 6), Color::Green);
        let green_step = from_view(Square::from_parts(PAWN_ROW - 1, 6), Color::Green);
        assert_eq!(green_pawn.col(), green_step.col() + 1);
    }

    #[test]
    fn test_initial_layout() {
        let mut all = Vec::new();
        for c in Color::iter() {
            let layout: Vec<_> = initial_layout(c).collect();
            assert_eq!(layout.len(), 16);
            assert_eq!(
                layout
                    .iter()
                    .filter(|(kind, _)| *kind == PieceKind::King)
                    .count(),
                1
            );
            all.extend(layout.into_iter().map(|(_, sq)| sq));
        }
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 64);
    }

    #[test]
    fn test_castling_squares() {
        for s in [CastlingSide::King, CastlingSide::Queen] {
            assert!(castling_pass(s).contains(&castling_king_dst(s)));
            assert!(castling_pass(s).contains(&castling_rook_dst(s)));
            assert!(castling_safe(s).contains(&castling_king_dst(s)));
            assert!(!castling_pass(s).contains(&castling_rook_src(s)));
        }
    }
}
