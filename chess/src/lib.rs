//! Board state and incremental move evaluation for four-player chess
//!
//! The board is the classic cross: a 14×14 grid with 3×3 corners removed, with Red, Blue,
//! Yellow and Green sitting at the bottom, left, top and right edges respectively.
//!
//! [`BoardState`] keeps the candidate moves of every piece up to date. When the position
//! changes, only the pieces which looked at the changed squares are evaluated again, and the
//! kings are evaluated last against the attacks of all the other pieces.
//!
//! ```
//! use quadchess::{BoardState, Color, Placement, Square};
//!
//! let mut board = BoardState::new_game(&Placement::initial()).unwrap();
//! let knight = board.piece_at(Square::from_parts(14, 5)).unwrap();
//! let mv = board.legal_moves(knight)[0];
//! board.apply_move(mv).unwrap();
//! assert!(board.has_any_legal_move(Color::Blue));
//! ```

pub mod board;
pub mod deps;
pub mod history;
pub mod movegen;
pub mod moveindex;
pub mod moves;
pub mod position;

mod reeval;

pub use quadchess_base::{geometry, squareset, types};

pub use board::{BaseBoardState, BoardState, Error, Placement};
pub use history::{History, MoveLog};
pub use moves::{Move, MoveKind, PromotePiece};
pub use squareset::SquareSet;
pub use types::{CastlingSide, Color, Piece, PieceId, PieceKind, Square};
