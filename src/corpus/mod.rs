//! Corpus-level stages
//!
//! 1. **Assemble**: encoded songs → one delimited corpus file
//! 2. **Vocabulary**: corpus tokens → dense integer ids
//! 3. **Sequences**: integer corpus → sliding-window (context, target) pairs

pub mod assembler;
pub mod sequences;
pub mod vocabulary;

pub use assembler::{create_universal_dataset, delimiter_block, join_songs, list_song_files, load};
pub use sequences::{generate_training_sequences, CategoricalTensor, OneHot, TrainingSequences};
pub use vocabulary::{create_mapping, Vocabulary};
