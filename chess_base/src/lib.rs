//! # Base types for quadchess
//!
//! This is an auxiliary crate for `quadchess`, which contains the board coordinates, colors,
//! pieces and the per-color board geometry. Nothing here knows about moves.
//!
//! Normally you don't want to use this crate directly. Use `quadchess` instead.

pub mod geometry;
pub mod squareset;
pub mod types;
