//! End-to-end dataset preparation
//!
//! `Pipeline` runs the stages in order:
//! load → filter → normalize → encode → assemble → vocabulary →
//! integer-encode → window.
//!
//! Per-score failures are logged and collected in a `PreprocessReport`;
//! anything that makes the run itself impossible returns a `PipelineError`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::corpus::{self, TrainingSequences, Vocabulary};
use crate::encode::{encode_song, first_unacceptable_duration};
use crate::error::{PipelineError, Result, ScoreError};
use crate::models::{Key, Score};
use crate::sink::TensorSink;
use crate::source::{discover_scores, ScoreSource};
use crate::transposition::normalize_key;

/// A score that made it into the corpus
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptedScore {
    /// Processing index, also the encoded file's name
    pub index: usize,
    pub path: PathBuf,
    pub output: PathBuf,
    /// Key before normalization
    pub key: Key,
    pub semitones: i8,
    pub tokens: usize,
}

/// A score left out, with the reason
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub index: usize,
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of the per-score stages
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreprocessReport {
    pub discovered: usize,
    pub accepted: Vec<AcceptedScore>,
    pub rejected: Vec<Rejection>,
}

/// Outcome of a full run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub report: PreprocessReport,
    pub corpus_tokens: usize,
    pub vocabulary_size: usize,
    pub sequences: usize,
}

/// Encoded form of one score plus what normalization did to it
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedScore {
    pub encoded: String,
    pub key: Key,
    pub semitones: i8,
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline; the configuration is validated first
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Filter, normalize and encode a single score
    pub fn prepare_score(&self, score: &Score) -> std::result::Result<PreparedScore, ScoreError> {
        if let Some(duration) = first_unacceptable_duration(score, &self.config.acceptable_durations) {
            return Err(ScoreError::UnsupportedDuration(duration));
        }

        let normalized = normalize_key(score)?;
        Ok(PreparedScore {
            encoded: encode_song(&normalized.score, self.config.time_step),
            key: normalized.original_key,
            semitones: normalized.semitones,
        })
    }

    /// Encode every score under `dataset_path` into `songs_dir`
    pub fn preprocess(&self, source: &dyn ScoreSource) -> Result<PreprocessReport> {
        let paths = discover_scores(&self.config.dataset_path, source.extension())?;
        let songs_dir = &self.config.songs_dir;
        fs::create_dir_all(songs_dir).map_err(|e| PipelineError::io(songs_dir, e))?;
        if fs::read_dir(songs_dir)
            .map_err(|e| PipelineError::io(songs_dir, e))?
            .next()
            .is_some()
        {
            log::warn!(
                "{} is not empty; leftover files will end up in the corpus",
                songs_dir.display()
            );
        }

        log::info!(
            "preprocessing {} scores from {}",
            paths.len(),
            self.config.dataset_path.display()
        );

        let mut report = PreprocessReport {
            discovered: paths.len(),
            ..PreprocessReport::default()
        };

        for (index, path) in paths.into_iter().enumerate() {
            let prepared = source.load(&path).and_then(|score| self.prepare_score(&score));
            match prepared {
                Ok(prepared) => {
                    let output = songs_dir.join(index.to_string());
                    fs::write(&output, &prepared.encoded).map_err(|e| PipelineError::io(&output, e))?;
                    log::debug!("{} -> {}", path.display(), output.display());
                    report.accepted.push(AcceptedScore {
                        index,
                        path,
                        output,
                        key: prepared.key,
                        semitones: prepared.semitones,
                        tokens: prepared.encoded.split_whitespace().count(),
                    });
                }
                Err(err) => {
                    log::warn!("skipping {}: {}", path.display(), err);
                    report.rejected.push(Rejection {
                        index,
                        path,
                        reason: err.to_string(),
                    });
                }
            }
        }

        log::info!(
            "accepted {} of {} scores ({} rejected)",
            report.accepted.len(),
            report.discovered,
            report.rejected.len()
        );
        Ok(report)
    }

    /// Concatenate the encoded songs into the corpus file
    pub fn create_universal_dataset(&self) -> Result<String> {
        corpus::create_universal_dataset(
            &self.config.songs_dir,
            &self.config.universal_dataset,
            self.config.sequence_length,
            &self.config.delimiter,
        )
    }

    /// Build and persist the vocabulary of `songs`
    pub fn create_mapping(&self, songs: &str) -> Result<Vocabulary> {
        corpus::create_mapping(songs, &self.config.mappings_path)
    }

    /// Map `songs` to ids using the persisted vocabulary
    pub fn convert_songs_to_int(&self, songs: &str) -> Result<Vec<usize>> {
        Vocabulary::load(&self.config.mappings_path)?.encode(songs)
    }

    /// Windows over the persisted corpus, encoded with the persisted vocabulary
    pub fn generate_training_sequences(&self) -> Result<TrainingSequences> {
        let songs = corpus::load(&self.config.universal_dataset)?;
        let vocabulary = Vocabulary::load(&self.config.mappings_path)?;
        corpus::generate_training_sequences(
            vocabulary.encode(&songs)?,
            self.config.sequence_length,
            vocabulary.len(),
        )
    }

    /// Run every stage and hand the tensors to `sink`
    pub fn run(&self, source: &dyn ScoreSource, sink: &mut dyn TensorSink) -> Result<RunSummary> {
        let report = self.preprocess(source)?;
        let songs = self.create_universal_dataset()?;
        let vocabulary = self.create_mapping(&songs)?;
        let int_songs = vocabulary.encode(&songs)?;
        let corpus_tokens = int_songs.len();

        let sequences = corpus::generate_training_sequences(
            int_songs,
            self.config.sequence_length,
            vocabulary.len(),
        )?;
        sink.write(sequences.one_hot(), sequences.targets())?;

        Ok(RunSummary {
            report,
            corpus_tokens,
            vocabulary_size: vocabulary.len(),
            sequences: sequences.len(),
        })
    }
}

/// Write a preprocessing report as pretty JSON
pub fn save_report<P: AsRef<Path>>(report: &PreprocessReport, path: P) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).map_err(|e| PipelineError::io(path, e))
}
