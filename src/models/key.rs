//! Keys: a tonic plus a mode

use serde::{Deserialize, Serialize};
use std::fmt;

use super::tonic::Tonic;

/// Musical mode
///
/// Only major and minor keys can be normalized; modal designations are
/// parsed so they can be rejected with a proper reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Major,
    Minor,
    Ionian,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Aeolian,
    Locrian,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
            Mode::Ionian => "ionian",
            Mode::Dorian => "dorian",
            Mode::Phrygian => "phrygian",
            Mode::Lydian => "lydian",
            Mode::Mixolydian => "mixolydian",
            Mode::Aeolian => "aeolian",
            Mode::Locrian => "locrian",
        }
    }

    /// Humdrum modal suffix as in `*D:dor`
    pub fn from_kern_suffix(suffix: &str) -> Option<Mode> {
        match suffix {
            "ion" => Some(Mode::Ionian),
            "dor" => Some(Mode::Dorian),
            "phr" => Some(Mode::Phrygian),
            "lyd" => Some(Mode::Lydian),
            "mix" => Some(Mode::Mixolydian),
            "aeo" => Some(Mode::Aeolian),
            "loc" => Some(Mode::Locrian),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A key: tonic plus mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub tonic: Tonic,
    pub mode: Mode,
}

impl Key {
    pub fn new(tonic: Tonic, mode: Mode) -> Self {
        Self { tonic, mode }
    }

    /// Tonic the key is normalized onto: C for major, A for minor
    pub fn reference_tonic(&self) -> Option<Tonic> {
        match self.mode {
            Mode::Major => Some(Tonic::C),
            Mode::Minor => Some(Tonic::A),
            _ => None,
        }
    }

    /// Signed semitone interval from this key's tonic to its reference tonic
    ///
    /// Both tonics are placed in the same written octave before subtracting,
    /// so B major moves down 11 semitones to C and Cb major moves up one.
    pub fn interval_to_reference(&self) -> Option<i8> {
        self.reference_tonic()
            .map(|target| target.semitones_above_c() - self.tonic.semitones_above_c())
    }

    /// The same mode on a tonic `semitones` away
    pub fn transposed(&self, semitones: i8) -> Key {
        let pitch_class = (self.tonic.pitch_class() as i16 + semitones as i16).rem_euclid(12) as u8;
        Key::new(Tonic::from_pitch_class(pitch_class), self.mode)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic, self.mode)
    }
}
