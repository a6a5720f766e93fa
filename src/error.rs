//! Error types for the dataset preparation pipeline
//!
//! Two levels of failure exist:
//! - `ScoreError`: one score cannot be used. The score is reported and skipped,
//!   the batch continues.
//! - `PipelineError`: the run itself cannot continue (bad configuration,
//!   unwritable output, a corpus token missing from the vocabulary).

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::kern::ParseError;
use crate::models::{Key, Rational};

/// Reasons a single score is excluded from the corpus
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    /// The file could not be read
    #[error("unreadable score file: {0}")]
    Unreadable(String),

    /// The file is not valid **kern
    #[error("malformed score: {0}")]
    Parse(#[from] ParseError),

    /// A note or rest has a duration outside the accepted set
    #[error("unsupported duration {0} quarter lengths")]
    UnsupportedDuration(Rational),

    /// No key designation and nothing to estimate a key from
    #[error("key could not be determined")]
    UndeterminableKey,

    /// Key is modal (dorian, lydian, ...) so there is no C/A target
    #[error("unsupported key mode: {0}")]
    UnsupportedMode(Key),

    /// Transposition pushed a pitch outside MIDI 0-127
    #[error("pitch {pitch} transposed by {semitones} semitones leaves the MIDI range")]
    PitchOutOfRange { pitch: u8, semitones: i8 },
}

/// Fatal, run-level errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset directory not found: {0}")]
    MissingDirectory(PathBuf),

    /// Corpus token absent from the vocabulary; rebuild the vocabulary from this corpus
    #[error("token '{0}' is not in the vocabulary")]
    MissingVocabularyEntry(String),

    #[error("invalid vocabulary: {0}")]
    InvalidVocabulary(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("tensor sink error: {0}")]
    Sink(String),
}

impl PipelineError {
    /// Attach the offending path to an I/O error
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
