pub mod document;
pub mod lemma;
pub mod tokenize;

pub use document::{Document, retain_usable};
pub use tokenize::{is_stop_word, tokenize};
