//! Block kinds, block values and face orientation.
#![forbid(unsafe_code)]

pub mod block;
pub mod face;
pub mod kind;

pub use block::{Block, MAX_LIGHT};
pub use face::Face;
pub use kind::BlockKind;
