//! Token vocabulary: a dense, reproducible token → id table
//!
//! Ids follow the lexicographic order of the tokens, so the same corpus
//! always yields the same table. The table is persisted as indented JSON.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use serde::ser::{Serialize, Serializer};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Vocabulary {
    ids: HashMap<String, usize>,
    /// Token for each id
    tokens: Vec<String>,
}

impl Vocabulary {
    /// Every distinct whitespace-separated token of `corpus`, sorted
    pub fn from_corpus(corpus: &str) -> Self {
        let distinct: BTreeSet<&str> = corpus.split_whitespace().collect();
        let tokens: Vec<String> = distinct.into_iter().map(str::to_string).collect();
        let ids = tokens
            .iter()
            .enumerate()
            .map(|(id, token)| (token.clone(), id))
            .collect();
        Self { ids, tokens }
    }

    /// Build from an existing table, checking ids are exactly 0..n
    pub fn from_map(ids: HashMap<String, usize>) -> Result<Self> {
        let mut tokens: Vec<Option<String>> = vec![None; ids.len()];
        for (token, &id) in &ids {
            let slot = tokens.get_mut(id).ok_or_else(|| {
                PipelineError::InvalidVocabulary(format!(
                    "id {} for '{}' is outside 0..{}",
                    id,
                    token,
                    ids.len()
                ))
            })?;
            if let Some(existing) = slot {
                return Err(PipelineError::InvalidVocabulary(format!(
                    "id {} is shared by '{}' and '{}'",
                    id, existing, token
                )));
            }
            *slot = Some(token.clone());
        }

        // ids.len() distinct slots in 0..ids.len() are all filled
        let tokens = tokens.into_iter().flatten().collect();
        Ok(Self { ids, tokens })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn id(&self, token: &str) -> Option<usize> {
        self.ids.get(token).copied()
    }

    pub fn token(&self, id: usize) -> Option<&str> {
        self.tokens.get(id).map(String::as_str)
    }

    /// Tokens in id order
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Map every corpus token to its id
    ///
    /// A token missing from the table is fatal: the vocabulary must be built
    /// from the same corpus.
    pub fn encode(&self, corpus: &str) -> Result<Vec<usize>> {
        corpus
            .split_whitespace()
            .map(|token| {
                self.id(token)
                    .ok_or_else(|| PipelineError::MissingVocabularyEntry(token.to_string()))
            })
            .collect()
    }

    /// Indented JSON object, keys in id order
    pub fn to_json(&self) -> Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(out).map_err(|e| PipelineError::InvalidVocabulary(e.to_string()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|e| PipelineError::io(path, e))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let ids: HashMap<String, usize> = serde_json::from_str(&content)?;
        Self::from_map(ids)
    }
}

impl Serialize for Vocabulary {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.tokens.iter().enumerate().map(|(id, token)| (token, id)))
    }
}

/// Build the vocabulary of `corpus` and persist it to `mappings_path`
pub fn create_mapping(corpus: &str, mappings_path: &Path) -> Result<Vocabulary> {
    let vocabulary = Vocabulary::from_corpus(corpus);
    vocabulary.save(mappings_path)?;
    log::info!(
        "vocabulary of {} tokens written to {}",
        vocabulary.len(),
        mappings_path.display()
    );
    Ok(vocabulary)
}
