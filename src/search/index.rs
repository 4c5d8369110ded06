//! Inverted index over keys sharing a prefix

use std::collections::{HashMap, HashSet};

use super::tokenizer::{tokenize_query, tokenize_text};

/// Inverted index over one text field of hashes under a key prefix.
///
/// The store refreshes entries on every hash write; queries score each key
/// by the number of matched query tokens.
#[derive(Debug, Clone, Default)]
pub struct TextIndex {
    prefix: String,
    field: String,
    postings: HashMap<String, HashSet<String>>,
    doc_tokens: HashMap<String, HashSet<String>>,
}

impl TextIndex {
    pub fn new(prefix: &str, field: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            field: field.to_string(),
            postings: HashMap::new(),
            doc_tokens: HashMap::new(),
        }
    }

    /// The indexed text field of each hash.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Whether a store key falls under this index.
    pub fn covers(&self, key: &str) -> bool {
        key.starts_with(&self.prefix)
    }

    /// Re-indexes one key from the current value of its text field.
    pub fn upsert(&mut self, key: &str, text: &str) {
        self.remove(key);
        let tokens = tokenize_text(text);
        for token in &tokens {
            self.postings
                .entry(token.clone())
                .or_default()
                .insert(key.to_string());
        }
        if !tokens.is_empty() {
            self.doc_tokens.insert(key.to_string(), tokens);
        }
    }

    /// Drops one key from the index.
    pub fn remove(&mut self, key: &str) {
        if let Some(tokens) = self.doc_tokens.remove(key) {
            for token in tokens {
                if let Some(keys) = self.postings.get_mut(&token) {
                    keys.remove(key);
                    if keys.is_empty() {
                        self.postings.remove(&token);
                    }
                }
            }
        }
    }

    /// Scores indexed keys against a query, best match first.
    ///
    /// Ties break on the key so results are deterministic.
    pub fn search(&self, query: &str) -> Vec<(String, usize)> {
        let mut scores: HashMap<String, usize> = HashMap::new();
        for token in tokenize_query(query) {
            if let Some(keys) = self.postings.get(&token) {
                for key in keys {
                    *scores.entry(key.clone()).or_insert(0) += 1;
                }
            }
        }

        let mut results: Vec<(String, usize)> = scores.into_iter().collect();
        results.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        results
    }
}
