//! Message composition.
//!
//! Provides the rope-backed input buffer behind the chat input box.

mod buffer;

pub use buffer::{Cursor, Direction, InputBuffer};
