//! # husky tui
//!
//! The terminal surface for the husky prompt: a ratatui widget wrapping the
//! engine's suggestion buffer, plus the byte-offset cursor it navigates with.

pub mod cursor;
pub mod prompt;

pub use cursor::Cursor;
pub use prompt::{Prompt, PromptTheme};
