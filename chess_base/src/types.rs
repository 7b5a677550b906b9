use std::fmt;
use std::hint;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SquareError {
    #[error("invalid square ({row}, {col})")]
    InvalidSquare { row: u8, col: u8 },
}

/// Square on the cross-shaped board
///
/// The board is a 14×14 grid with a 3×3 block cut out of each corner, so only 160 of the 196
/// grid cells are squares. Rows are numbered from 1 (top edge) to 14 (bottom edge), columns
/// from 1 (left edge) to 14 (right edge). A `Square` is always valid.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    /// Side length of the enclosing grid
    pub const SIDE: u8 = 14;
    /// Number of valid squares
    pub const COUNT: usize = 160;
    /// Number of cells in the enclosing grid, i.e. the upper bound for [`Square::index()`]
    pub const INDEX_COUNT: usize = 196;

    pub const fn is_valid(row: u8, col: u8) -> bool {
        if row < 1 || col < 1 || row > Self::SIDE || col > Self::SIDE {
            return false;
        }
        !((row < 4 || row > 11) && (col < 4 || col > 11))
    }

    pub const fn new(row: u8, col: u8) -> Result<Square, SquareError> {
        if !Self::is_valid(row, col) {
            return Err(SquareError::InvalidSquare { row, col });
        }
        Ok(Square((row - 1) * Self::SIDE + (col - 1)))
    }

    pub const fn from_parts(row: u8, col: u8) -> Square {
        assert!(Self::is_valid(row, col), "square must lie on the cross");
        Square((row - 1) * Self::SIDE + (col - 1))
    }

    pub const fn from_index(val: usize) -> Square {
        assert!(val < Self::INDEX_COUNT, "index too large");
        let row = (val / Self::SIDE as usize) as u8 + 1;
        let col = (val % Self::SIDE as usize) as u8 + 1;
        Self::from_parts(row, col)
    }

    pub const fn row(&self) -> u8 {
        self.0 / Self::SIDE + 1
    }

    pub const fn col(&self) -> u8 {
        self.0 % Self::SIDE + 1
    }

    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Returns the square shifted by `delta_row` rows and `delta_col` columns, or `None` if
    /// the result is off the board
    pub const fn try_shift(self, delta_row: i8, delta_col: i8) -> Option<Square> {
        let row = self.row() as i16 + delta_row as i16;
        let col = self.col() as i16 + delta_col as i16;
        if row < 1 || col < 1 || row > Self::SIDE as i16 || col > Self::SIDE as i16 {
            return None;
        }
        match Self::new(row as u8, col as u8) {
            Ok(sq) => Some(sq),
            Err(_) => None,
        }
    }

    /// Iterates over all the valid squares in row-major order
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..Self::INDEX_COUNT as u8)
            .map(|i| (i / Self::SIDE + 1, i % Self::SIDE + 1))
            .filter(|&(row, col)| Self::is_valid(row, col))
            .map(|(row, col)| Square::from_parts(row, col))
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Square({})", self)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}:{}", self.row(), self.col())
    }
}

impl TryFrom<(u8, u8)> for Square {
    type Error = SquareError;

    fn try_from((row, col): (u8, u8)) -> Result<Self, Self::Error> {
        Square::new(row, col)
    }
}

/// Player color
///
/// The declaration order is the turn order, which goes clockwise around the board.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Color {
    Red = 0,
    Blue = 1,
    Yellow = 2,
    Green = 3,
}

impl Color {
    pub const COUNT: usize = 4;

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub const unsafe fn from_index_unchecked(val: usize) -> Self {
        match val {
            0 => Color::Red,
            1 => Color::Blue,
            2 => Color::Yellow,
            3 => Color::Green,
            _ => hint::unreachable_unchecked(),
        }
    }

    pub const fn from_index(val: usize) -> Self {
        assert!(val < Self::COUNT, "color index must be between 0 and 3");
        unsafe { Self::from_index_unchecked(val) }
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).map(|x| unsafe { Self::from_index_unchecked(x) })
    }

    /// Returns the color which moves after this one
    pub const fn next(&self) -> Color {
        Self::from_index((self.index() + 1) % Self::COUNT)
    }

    pub fn as_char(&self) -> char {
        match *self {
            Color::Red => 'r',
            Color::Blue => 'b',
            Color::Yellow => 'y',
            Color::Green => 'g',
        }
    }

    pub fn from_char(c: char) -> Option<Color> {
        match c {
            'r' => Some(Color::Red),
            'b' => Some(Color::Blue),
            'y' => Some(Color::Yellow),
            'g' => Some(Color::Green),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceKind {
    pub const COUNT: usize = 6;

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub const fn is_king(&self) -> bool {
        matches!(*self, PieceKind::King)
    }

    pub fn as_char(&self) -> char {
        b"pnbrqk"[self.index()] as char
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CastlingSide {
    Queen = 0,
    King = 1,
}

/// Identity of a piece within a match
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceId(u32);

impl PieceId {
    pub const fn new(val: u32) -> PieceId {
        PieceId(val)
    }

    pub const fn index(&self) -> u32 {
        self.0
    }

    pub const fn next(&self) -> PieceId {
        PieceId(self.0 + 1)
    }
}

/// A piece: identity, color and kind
///
/// Pieces don't know where they stand. Two pieces are the same piece iff their ids are equal;
/// the board never hands out two pieces with the same id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Piece {
    id: PieceId,
    color: Color,
    kind: PieceKind,
}

impl Piece {
    pub const fn new(id: PieceId, color: Color, kind: PieceKind) -> Piece {
        Piece { id, color, kind }
    }

    pub const fn id(&self) -> PieceId {
        self.id
    }

    pub const fn color(&self) -> Color {
        self.color
    }

    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    pub const fn is_king(&self) -> bool {
        self.kind.is_king()
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "{}{}#{}",
            self.color.as_char(),
            self.kind.as_char().to_ascii_uppercase(),
            self.id.0
        )
    }
}
