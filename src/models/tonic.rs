//! Enumeration of the tonic pitches a key can be built on
//!
//! Covers every tonic of the 15 major and 15 minor key signatures:
//! - 7 natural tonics (C, D, E, F, G, A, B)
//! - 5 sharp tonics (C#, D#, F#, G#, A#)
//! - 6 flat tonics (Cb, Db, Eb, Gb, Ab, Bb)
//!
//! Enharmonic equivalents stay separate (e.g., C# and Db) because their
//! position inside the octave differs for Cb, and because a key designation
//! should round-trip through its spelling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tonic {
    Cb,
    C,
    #[serde(rename = "C#")]
    Cs,
    Db,
    D,
    #[serde(rename = "D#")]
    Ds,
    Eb,
    E,
    F,
    #[serde(rename = "F#")]
    Fs,
    Gb,
    G,
    #[serde(rename = "G#")]
    Gs,
    Ab,
    A,
    #[serde(rename = "A#")]
    As,
    Bb,
    B,
}

/// Spelling used when a tonic comes from a pitch class (key estimation)
const PITCH_CLASS_SPELLINGS: [Tonic; 12] = [
    Tonic::C,
    Tonic::Cs,
    Tonic::D,
    Tonic::Eb,
    Tonic::E,
    Tonic::F,
    Tonic::Fs,
    Tonic::G,
    Tonic::Ab,
    Tonic::A,
    Tonic::Bb,
    Tonic::B,
];

impl Tonic {
    /// Convert tonic to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Tonic::Cb => "Cb",
            Tonic::C => "C",
            Tonic::Cs => "C#",
            Tonic::Db => "Db",
            Tonic::D => "D",
            Tonic::Ds => "D#",
            Tonic::Eb => "Eb",
            Tonic::E => "E",
            Tonic::F => "F",
            Tonic::Fs => "F#",
            Tonic::Gb => "Gb",
            Tonic::G => "G",
            Tonic::Gs => "G#",
            Tonic::Ab => "Ab",
            Tonic::A => "A",
            Tonic::As => "A#",
            Tonic::Bb => "Bb",
            Tonic::B => "B",
        }
    }

    /// Semitones above the C that starts the tonic's written octave
    ///
    /// Cb is spelled on the C line, so it sits one semitone *below* that C.
    pub fn semitones_above_c(&self) -> i8 {
        match self {
            Tonic::Cb => -1,
            Tonic::C => 0,
            Tonic::Cs | Tonic::Db => 1,
            Tonic::D => 2,
            Tonic::Ds | Tonic::Eb => 3,
            Tonic::E => 4,
            Tonic::F => 5,
            Tonic::Fs | Tonic::Gb => 6,
            Tonic::G => 7,
            Tonic::Gs | Tonic::Ab => 8,
            Tonic::A => 9,
            Tonic::As | Tonic::Bb => 10,
            Tonic::B => 11,
        }
    }

    /// Chromatic pitch class (0-11, 0 = C)
    pub fn pitch_class(&self) -> u8 {
        self.semitones_above_c().rem_euclid(12) as u8
    }

    /// Conventional spelling of a pitch class
    pub fn from_pitch_class(pitch_class: u8) -> Tonic {
        PITCH_CLASS_SPELLINGS[(pitch_class % 12) as usize]
    }

    /// Parse a Humdrum tonic name: letter plus `#` / `-` (flat)
    ///
    /// Letter case is ignored here; in **kern it carries the mode and is read
    /// by the caller.
    pub fn from_kern_name(name: &str) -> Option<Tonic> {
        let mut chars = name.chars();
        let letter = chars.next()?.to_ascii_uppercase();
        let accidental: String = chars.collect();
        let spelled = match accidental.as_str() {
            "" => letter.to_string(),
            "#" => format!("{}#", letter),
            "-" => format!("{}b", letter),
            _ => return None,
        };
        spelled.parse().ok()
    }
}

impl fmt::Display for Tonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tonic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Case-insensitive parsing
        match s.to_uppercase().as_str() {
            "CB" | "C♭" => Ok(Tonic::Cb),
            "C" | "CN" => Ok(Tonic::C),
            "C#" | "CS" | "C♯" => Ok(Tonic::Cs),
            "DB" | "D♭" => Ok(Tonic::Db),
            "D" | "DN" => Ok(Tonic::D),
            "D#" | "DS" | "D♯" => Ok(Tonic::Ds),
            "EB" | "E♭" => Ok(Tonic::Eb),
            "E" | "EN" => Ok(Tonic::E),
            "F" | "FN" => Ok(Tonic::F),
            "F#" | "FS" | "F♯" => Ok(Tonic::Fs),
            "GB" | "G♭" => Ok(Tonic::Gb),
            "G" | "GN" => Ok(Tonic::G),
            "G#" | "GS" | "G♯" => Ok(Tonic::Gs),
            "AB" | "A♭" => Ok(Tonic::Ab),
            "A" | "AN" => Ok(Tonic::A),
            "A#" | "AS" | "A♯" => Ok(Tonic::As),
            "BB" | "B♭" => Ok(Tonic::Bb),
            "B" | "BN" => Ok(Tonic::B),
            _ => Err(format!("Invalid tonic: '{}'. Expected one of: Cb, C, C#, Db, D, D#, Eb, E, F, F#, Gb, G, G#, Ab, A, A#, Bb, B", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_naturals() {
        assert_eq!("C".parse::<Tonic>().unwrap(), Tonic::C);
        assert_eq!("G".parse::<Tonic>().unwrap(), Tonic::G);
        assert_eq!("B".parse::<Tonic>().unwrap(), Tonic::B);
    }

    #[test]
    fn test_from_str_accidentals() {
        assert_eq!("F#".parse::<Tonic>().unwrap(), Tonic::Fs);
        assert_eq!("bb".parse::<Tonic>().unwrap(), Tonic::Bb);
        assert_eq!("Cb".parse::<Tonic>().unwrap(), Tonic::Cb);
    }

    #[test]
    fn test_from_str_invalid() {
        assert!("H".parse::<Tonic>().is_err());
        assert!("C###".parse::<Tonic>().is_err());
        assert!("".parse::<Tonic>().is_err());
    }

    #[test]
    fn test_from_kern_name() {
        assert_eq!(Tonic::from_kern_name("G"), Some(Tonic::G));
        assert_eq!(Tonic::from_kern_name("e-"), Some(Tonic::Eb));
        assert_eq!(Tonic::from_kern_name("f#"), Some(Tonic::Fs));
        assert_eq!(Tonic::from_kern_name("C-"), Some(Tonic::Cb));
        assert_eq!(Tonic::from_kern_name("e--"), None);
        assert_eq!(Tonic::from_kern_name(""), None);
    }

    #[test]
    fn test_semitones_above_c() {
        assert_eq!(Tonic::C.semitones_above_c(), 0);
        assert_eq!(Tonic::Db.semitones_above_c(), Tonic::Cs.semitones_above_c());
        assert_eq!(Tonic::B.semitones_above_c(), 11);
        assert_eq!(Tonic::Cb.semitones_above_c(), -1);
        assert_eq!(Tonic::Cb.pitch_class(), 11);
    }

    #[test]
    fn test_pitch_class_roundtrip() {
        for pc in 0..12u8 {
            assert_eq!(Tonic::from_pitch_class(pc).pitch_class(), pc);
        }
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_string(&Tonic::Fs).unwrap();
        assert_eq!(json, "\"F#\"");
        let parsed: Tonic = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Tonic::Fs);
    }
}
