//! Two-phase reevaluation of dirty pieces
//!
//! Kings need to know which squares are attacked, so they can only be evaluated after all the
//! other pieces are settled. The phases are encoded in the types: [`Batch::run_non_kings()`]
//! yields a [`Settled`] value, and only that value can run the king phase.

use crate::deps::DependencyIndex;
use crate::history::History;
use crate::movegen::{self, MoveList, View};
use crate::moveindex::MoveIndex;
use crate::position::PositionIndex;
use crate::types::{Piece, Square};

use log::{trace, warn};

use std::collections::BTreeSet;

pub(crate) struct Batch<'a, H: History> {
    pos: &'a PositionIndex,
    history: &'a H,
    deps: &'a mut DependencyIndex,
    moves: &'a mut MoveIndex,
    dirty: BTreeSet<Piece>,
}

#[must_use = "kings are not evaluated until run_kings() is called"]
pub(crate) struct Settled<'a, H: History> {
    pos: &'a PositionIndex,
    history: &'a H,
    moves: &'a mut MoveIndex,
}

impl<'a, H: History> Batch<'a, H> {
    pub fn new(
        pos: &'a PositionIndex,
        history: &'a H,
        deps: &'a mut DependencyIndex,
        moves: &'a mut MoveIndex,
        dirty: impl IntoIterator<Item = Piece>,
    ) -> Self {
        Batch {
            pos,
            history,
            deps,
            moves,
            dirty: dirty.into_iter().collect(),
        }
    }

    /// Evaluates every dirty non-king piece and drops the entries of dirty pieces which have
    /// left the board
    pub fn run_non_kings(mut self) -> Settled<'a, H> {
        for &piece in &self.dirty {
            if !self.pos.contains(piece) {
                trace!("{} left the board", piece);
                self.deps.remove(piece);
                self.moves.remove(piece);
                continue;
            }
            if piece.is_king() {
                continue;
            }
            let view = View::new(self.pos, piece.color());
            match movegen::evaluate(&view, piece, self.history) {
                Ok(ev) => {
                    trace!("{}: {} moves, {} deps", piece, ev.moves.len(), ev.deps.len());
                    self.deps.record(piece, ev.deps);
                    self.moves.replace(piece, ev.moves);
                }
                Err(e) => {
                    warn!("{}, dropping its moves", e);
                    self.deps.remove(piece);
                    self.moves.remove(piece);
                }
            }
        }
        trace!("non-king phase done");
        Settled {
            pos: self.pos,
            history: self.history,
            moves: self.moves,
        }
    }
}

fn is_adjacent(a: Square, b: Square) -> bool {
    a != b && a.row().abs_diff(b.row()) <= 1 && a.col().abs_diff(b.col()) <= 1
}

impl<'a, H: History> Settled<'a, H> {
    /// Evaluates all the given kings against the same snapshot of attacks
    ///
    /// The moves of every king are dropped first. A square is dangerous for a king if a
    /// non-king piece of another color can move there, or if it is next to a king of another
    /// color. The result doesn't depend on the order of `kings`.
    pub fn run_kings(mut self, kings: impl IntoIterator<Item = Piece>) {
        let kings: Vec<Piece> = kings.into_iter().collect();
        trace!("king phase for {} kings", kings.len());
        for &king in &kings {
            self.moves.remove(king);
        }

        let placed: Vec<(Piece, Square)> = kings
            .iter()
            .filter_map(|&k| self.pos.square_of(k).map(|sq| (k, sq)))
            .collect();

        let mut results: Vec<(Piece, MoveList)> = Vec::with_capacity(placed.len());
        {
            let moves = &*self.moves;
            for &(king, _) in &placed {
                let color = king.color();
                let attacked = |sq: Square| {
                    moves.is_attacked(sq, color)
                        || placed
                            .iter()
                            .any(|&(other, at)| other.color() != color && is_adjacent(at, sq))
                };
                let view = View::new(self.pos, color);
                match movegen::gen_king(&view, king, self.history, attacked) {
                    Ok(ev) => results.push((king, ev.moves)),
                    Err(e) => warn!("{}, skipping king evaluation", e),
                }
            }
        }

        for (king, list) in results {
            self.moves.replace(king, list);
        }
    }
}

/// Runs both phases
pub(crate) fn reevaluate<H: History>(
    pos: &PositionIndex,
    history: &H,
    deps: &mut DependencyIndex,
    moves: &mut MoveIndex,
    dirty: impl IntoIterator<Item = Piece>,
    kings: impl IntoIterator<Item = Piece>,
) {
    Batch::new(pos, history, deps, moves, dirty)
        .run_non_kings()
        .run_kings(kings);
}
