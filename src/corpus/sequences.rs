//! Sliding-window training sequences
//!
//! For an integer corpus of length L and window width W there are L - W
//! pairs: `context[i] = corpus[i..i + W]`, `target[i] = corpus[i + W]`.
//! Windows are views into the corpus rather than copies; the one-hot
//! expansion is produced on demand by `OneHot`.

use crate::error::{PipelineError, Result};

/// (context, target) pairs over an integer corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingSequences {
    corpus: Vec<usize>,
    window: usize,
    vocabulary_size: usize,
}

/// Slide a `window`-wide window over `int_corpus` with stride 1
///
/// A corpus no longer than the window yields zero sequences; that is logged,
/// not treated as an error.
pub fn generate_training_sequences(
    int_corpus: Vec<usize>,
    window: usize,
    vocabulary_size: usize,
) -> Result<TrainingSequences> {
    if window == 0 {
        return Err(PipelineError::Config("window width must be at least 1".to_string()));
    }
    if let Some(&id) = int_corpus.iter().find(|&&id| id >= vocabulary_size) {
        return Err(PipelineError::InvalidVocabulary(format!(
            "token id {} outside vocabulary of size {}",
            id, vocabulary_size
        )));
    }

    let sequences = TrainingSequences {
        corpus: int_corpus,
        window,
        vocabulary_size,
    };
    if sequences.is_empty() {
        log::warn!(
            "corpus of {} tokens is not longer than the window width {}; no training sequences",
            sequences.corpus.len(),
            window
        );
    } else {
        log::info!(
            "generated {} training sequences of width {}",
            sequences.len(),
            window
        );
    }
    Ok(sequences)
}

impl TrainingSequences {
    /// Number of (context, target) pairs
    pub fn len(&self) -> usize {
        self.corpus.len().saturating_sub(self.window)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    pub fn context(&self, index: usize) -> Option<&[usize]> {
        (index < self.len()).then(|| &self.corpus[index..index + self.window])
    }

    pub fn contexts(&self) -> impl Iterator<Item = &[usize]> + '_ {
        (0..self.len()).map(move |i| &self.corpus[i..i + self.window])
    }

    /// Next token after each context
    pub fn targets(&self) -> &[usize] {
        if self.is_empty() {
            &[]
        } else {
            &self.corpus[self.window..]
        }
    }

    /// One-hot view of the contexts, shape (len, window, vocabulary_size)
    pub fn one_hot(&self) -> OneHot<'_> {
        OneHot { sequences: self }
    }
}

/// Categorical expansion of the contexts
#[derive(Debug, Clone, Copy)]
pub struct OneHot<'a> {
    sequences: &'a TrainingSequences,
}

impl<'a> OneHot<'a> {
    pub fn shape(&self) -> [usize; 3] {
        [
            self.sequences.len(),
            self.sequences.window,
            self.sequences.vocabulary_size,
        ]
    }

    /// Hot index of every (sequence, step), in row-major order
    pub fn hot_indices(&self) -> impl Iterator<Item = usize> + 'a {
        self.sequences.contexts().flatten().copied()
    }

    /// Materialize the dense tensor
    pub fn to_dense(&self) -> CategoricalTensor {
        let [sequences, window, classes] = self.shape();
        let mut data = vec![0.0f32; sequences * window * classes];
        for (row, hot) in self.hot_indices().enumerate() {
            data[row * classes + hot] = 1.0;
        }
        CategoricalTensor {
            shape: self.shape(),
            data,
        }
    }
}

/// Dense float32 one-hot tensor in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalTensor {
    pub shape: [usize; 3],
    pub data: Vec<f32>,
}

impl CategoricalTensor {
    /// The one-hot vector for `(sequence, step)`
    pub fn vector(&self, sequence: usize, step: usize) -> &[f32] {
        let classes = self.shape[2];
        let start = (sequence * self.shape[1] + step) * classes;
        &self.data[start..start + classes]
    }
}
