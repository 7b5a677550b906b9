use crate::types::Square;
use derive_more::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign};
use std::fmt;

/// Set of squares
///
/// One bit per cell of the enclosing 14×14 grid. Only bits of valid squares are ever set, so
/// there is intentionally no complement operation.
#[derive(
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    BitAnd,
    BitAndAssign,
    BitOr,
    BitOrAssign,
    BitXor,
    BitXorAssign,
)]
pub struct SquareSet {
    lo: u128,
    hi: u128,
}

impl SquareSet {
    pub const EMPTY: SquareSet = SquareSet { lo: 0, hi: 0 };

    const fn bit(sq: Square) -> (u128, u128) {
        let idx = sq.index();
        if idx < 128 {
            (1_u128 << idx, 0)
        } else {
            (0, 1_u128 << (idx - 128))
        }
    }

    pub const fn from_square(sq: Square) -> SquareSet {
        let (lo, hi) = Self::bit(sq);
        SquareSet { lo, hi }
    }

    pub const fn with(self, sq: Square) -> SquareSet {
        let (lo, hi) = Self::bit(sq);
        SquareSet {
            lo: self.lo | lo,
            hi: self.hi | hi,
        }
    }

    pub const fn without(self, sq: Square) -> SquareSet {
        let (lo, hi) = Self::bit(sq);
        SquareSet {
            lo: self.lo & !lo,
            hi: self.hi & !hi,
        }
    }

    pub fn set(&mut self, sq: Square) {
        *self = self.with(sq);
    }

    pub fn unset(&mut self, sq: Square) {
        *self = self.without(sq);
    }

    pub const fn has(&self, sq: Square) -> bool {
        let (lo, hi) = Self::bit(sq);
        (self.lo & lo) != 0 || (self.hi & hi) != 0
    }

    pub const fn len(&self) -> u32 {
        self.lo.count_ones() + self.hi.count_ones()
    }

    pub const fn is_empty(&self) -> bool {
        self.lo == 0 && self.hi == 0
    }

    pub const fn is_nonempty(&self) -> bool {
        !self.is_empty()
    }
}

impl fmt::Debug for SquareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_set().entries((*self).into_iter()).finish()
    }
}

pub struct Iter {
    lo: u128,
    hi: u128,
}

impl Iterator for Iter {
    type Item = Square;

    fn next(&mut self) -> Option<Square> {
        if self.lo != 0 {
            let bit = self.lo.trailing_zeros();
            self.lo &= self.lo.wrapping_sub(1);
            return Some(Square::from_index(bit as usize));
        }
        if self.hi != 0 {
            let bit = self.hi.trailing_zeros();
            self.hi &= self.hi.wrapping_sub(1);
            return Some(Square::from_index(128 + bit as usize));
        }
        None
    }
}

impl IntoIterator for SquareSet {
    type Item = Square;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        Iter {
            lo: self.lo,
            hi: self.hi,
        }
    }
}

impl FromIterator<Square> for SquareSet {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        iter.into_iter().fold(SquareSet::EMPTY, SquareSet::with)
    }
}

impl Extend<Square> for SquareSet {
    fn extend<I: IntoIterator<Item = Square>>(&mut self, iter: I) {
        for sq in iter {
            self.set(sq);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iter() {
        let set = SquareSet::EMPTY
            .with(Square::from_parts(14, 4))
            .with(Square::from_parts(1, 4))
            .with(Square::from_parts(7, 7));
        assert_eq!(
            set.into_iter().collect::<Vec<_>>(),
            vec![
                Square::from_parts(1, 4),
                Square::from_parts(7, 7),
                Square::from_parts(14, 4),
            ],
        );
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_all_squares() {
        let all: SquareSet = Square::iter().collect();
        assert_eq!(all.len() as usize, Square::COUNT);
        assert_eq!(all.into_iter().collect::<Vec<_>>(), Square::iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_bitops() {
        let sa = Square::from_parts(4, 1);
        let sb = Square::from_parts(10, 10);
        let sc = Square::from_parts(14, 11);

        let s1 = SquareSet::EMPTY.with(sa).with(sb);
        let s2 = SquareSet::EMPTY.with(sb).with(sc);
        assert_eq!(s1 & s2, SquareSet::from_square(sb));
        assert_eq!(s1 | s2, SquareSet::EMPTY.with(sa).with(sb).with(sc));
        assert_eq!(s1 ^ s2, SquareSet::EMPTY.with(sa).with(sc));

        let mut s3 = s1;
        s3.unset(sa);
        assert!(!s3.has(sa));
        assert!(s3.has(sb));
        s3 &= s2;
        s3 ^= s2;
        assert_eq!(s3, SquareSet::from_square(sc));
        assert!(SquareSet::EMPTY.is_empty());
    }
}
