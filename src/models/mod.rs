//! Models module for the dataset preparation pipeline
//!
//! This module contains the musical data model shared by every stage:
//! flattened scores, keys and tonics.

pub mod key;
pub mod score;
pub mod serde_helpers;
pub mod tonic;

// Re-export commonly used types
pub use key::{Key, Mode};
pub use score::{Event, Rational, Score, MAX_MIDI_PITCH};
pub use tonic::Tonic;
