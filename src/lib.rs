//! Melody Time-Series Dataset Preparation
//!
//! Turns a collection of monophonic folk-song scores into training data for
//! a next-token melody model: scores are filtered by note duration,
//! transposed to C major / A minor, encoded as a time series of pitch, rest
//! and hold symbols, concatenated into one delimited corpus, mapped to
//! integer ids and finally cut into sliding-window (context, target) pairs.

pub mod config;
pub mod corpus;
pub mod encode;
pub mod error;
pub mod kern;
pub mod models;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod transposition;

// Re-export commonly used types
pub use config::{load_config, PipelineConfig};
pub use corpus::{TrainingSequences, Vocabulary};
pub use error::{PipelineError, Result, ScoreError};
pub use kern::{parse_kern, KernSource};
pub use models::{Event, Key, Mode, Rational, Score, Tonic};
pub use pipeline::{Pipeline, PreprocessReport, Rejection, RunSummary};
pub use sink::{MemorySink, NpySink, TensorSink};
pub use source::ScoreSource;
