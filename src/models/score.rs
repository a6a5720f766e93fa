//! Flattened score representation
//!
//! A `Score` is what the rest of the pipeline sees of a parsed file: note and
//! rest events in temporal order, plus the key designation found in the
//! opening measure (if any).

use num_rational::Rational32;
use num_traits::CheckedAdd;
use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::transposition::key_finding;

use super::key::Key;

/// Re-export Rational for duration calculations (quarter-note units)
pub type Rational = Rational32;

/// Highest MIDI note number
pub const MAX_MIDI_PITCH: u8 = 127;

/// A single note or rest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Pitched note, MIDI number (60 = middle C)
    Note { pitch: u8, duration: Rational },
    Rest { duration: Rational },
}

impl Event {
    pub fn note(pitch: u8, duration: Rational) -> Self {
        Event::Note { pitch, duration }
    }

    pub fn rest(duration: Rational) -> Self {
        Event::Rest { duration }
    }

    /// Duration in quarter lengths
    pub fn duration(&self) -> Rational {
        match *self {
            Event::Note { duration, .. } | Event::Rest { duration } => duration,
        }
    }

    /// MIDI pitch, `None` for rests
    pub fn pitch(&self) -> Option<u8> {
        match *self {
            Event::Note { pitch, .. } => Some(pitch),
            Event::Rest { .. } => None,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Event::Rest { .. })
    }
}

/// A monophonic, flattened score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Events in onset order
    pub events: Vec<Event>,

    /// Key designation from the first measure of the first part
    pub key: Option<Key>,

    /// Grace notes found while reading; they take no time and are not events
    #[serde(default)]
    pub grace_notes: usize,
}

impl Score {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            key: None,
            grace_notes: 0,
        }
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sum of all event durations in quarter lengths
    ///
    /// `None` if the sum is not representable.
    pub fn total_duration(&self) -> Option<Rational> {
        self.events
            .iter()
            .try_fold(Rational::from_integer(0), |acc, event| {
                acc.checked_add(&event.duration())
            })
    }

    /// Estimate the key from the pitch content (Krumhansl-Schmuckler)
    ///
    /// Returns `None` when the score has no sounding notes.
    pub fn estimate_key(&self) -> Option<Key> {
        key_finding::estimate_key(&self.events)
    }

    /// Shift every pitch by `semitones`; rests are untouched
    ///
    /// A new score is returned. The key designation moves with the notes.
    pub fn transpose(&self, semitones: i8) -> Result<Score, ScoreError> {
        let events = self
            .events
            .iter()
            .map(|event| match *event {
                Event::Note { pitch, duration } => {
                    let shifted = pitch as i16 + semitones as i16;
                    if !(0..=MAX_MIDI_PITCH as i16).contains(&shifted) {
                        return Err(ScoreError::PitchOutOfRange { pitch, semitones });
                    }
                    Ok(Event::note(shifted as u8, duration))
                }
                rest @ Event::Rest { .. } => Ok(rest),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Score {
            events,
            key: self.key.map(|key| key.transposed(semitones)),
            grace_notes: self.grace_notes,
        })
    }
}
