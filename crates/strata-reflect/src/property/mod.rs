//! Property names and paths

pub mod namer;
mod tokenizer;

pub use tokenizer::{PropertyTokenizer, Segments};
