//! Full-text search over store hashes
//!
//! A small inverted index: hash writes under a registered key prefix keep
//! the index current, and queries score documents by the number of matched
//! tokens.
//!
//! ## Submodules
//! - **`tokenizer`**: text normalization for documents and queries.
//! - **`index`**: the inverted index and scoring.

pub mod index;
pub mod tokenizer;

use std::collections::HashMap;

use serde::Serialize;

pub use index::TextIndex;

/// Search reply: total hit count plus hydrated documents, best first.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub total: usize,
    pub documents: Vec<SearchHit>,
}

/// One scored hit with the stored hash it resolved to.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub score: usize,
    pub value: HashMap<String, String>,
}
