//! Visitors that turn a walk into output.

pub mod text;

pub use text::{TextOptions, TextRenderer};
