//! **kern token recognition
//!
//! Parses the data and interpretation tokens the pipeline cares about:
//! notes, rests, and key designations. Beaming, stems, articulations,
//! slurs and phrase marks are recognized implicitly by being ignored.

use num_traits::CheckedMul;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Event, Key, Mode, Rational, Tonic, MAX_MIDI_PITCH};

/// Duration part of a note token: reciprocal, optional `%` denominator, dots
static RECIP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)(?:%(\d+))?(\.*)").expect("valid recip regex"));

/// Key designation interpretation like `*G:`, `*e-:` or `*D:dor`
static KEY_DESIGNATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\*([A-Ga-g][#-]*):([a-z]*)$").expect("valid key designation regex")
});

/// Outcome of a single data token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataToken {
    Event(Event),
    /// Grace note: no duration, does not advance time
    Grace,
}

/// Read a note/rest token such as `4c#`, `8.ee-L`, `[2G`, `16r`, `3%2d`
///
/// For chords (space separated) only the first note is kept.
pub fn parse_data_token(token: &str) -> Result<DataToken, String> {
    let first = token.split(' ').find(|sub| !sub.is_empty()).unwrap_or(token);

    if first.contains(['q', 'Q']) {
        return Ok(DataToken::Grace);
    }

    let duration = parse_recip(first)?;
    if duration <= Rational::from_integer(0) {
        return Err(format!("non-positive duration {}", duration));
    }

    if first.contains('r') {
        return Ok(DataToken::Event(Event::rest(duration)));
    }

    let pitch = parse_pitch(first)?;
    Ok(DataToken::Event(Event::note(pitch, duration)))
}

/// Quarter-length duration of a recip string
///
/// `4` = quarter, `8.` = dotted eighth, `0` = breve, `00` = longa,
/// `3%2` = 8/3 quarter lengths.
pub fn parse_recip(token: &str) -> Result<Rational, String> {
    let caps = RECIP
        .captures(token)
        .ok_or_else(|| format!("no duration in '{}'", token))?;
    let digits = &caps[1];
    let dots = caps.get(3).map_or(0, |m| m.as_str().len()) as u32;

    let base = if digits.chars().all(|c| c == '0') {
        // 0 = breve (8 quarters), 00 = longa, 000 = maxima
        let zeros = digits.len() as u32;
        if zeros > 3 {
            return Err(format!("unsupported duration '{}'", digits));
        }
        Rational::from_integer(4 << zeros)
    } else {
        let recip: i32 = digits
            .parse()
            .map_err(|_| format!("duration '{}' out of range", digits))?;
        let numerator: i32 = match caps.get(2) {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| format!("duration '{}' out of range", m.as_str()))?,
            None => 1,
        };
        if numerator == 0 {
            return Err(format!("zero duration denominator in '{}'", token));
        }
        let whole_notes = 4i32
            .checked_mul(numerator)
            .ok_or_else(|| format!("duration '{}' out of range", token))?;
        Rational::new(whole_notes, recip)
    };

    if dots > 8 {
        return Err(format!("too many augmentation dots in '{}'", token));
    }
    // each dot adds half of the previous value: base * (2 - 1/2^dots)
    let dot_multiplier = Rational::new((1 << (dots + 1)) - 1, 1 << dots);
    base.checked_mul(&dot_multiplier)
        .ok_or_else(|| format!("duration '{}' out of range", token))
}

/// MIDI number of a pitch spelled in **kern (`c` = middle C = 60)
pub fn parse_pitch(token: &str) -> Result<u8, String> {
    let mut chars = token.chars().skip_while(|c| !matches!(c, 'a'..='g' | 'A'..='G'));
    let letter = chars
        .next()
        .ok_or_else(|| format!("no pitch in '{}'", token))?;
    let repeats = 1 + chars.take_while(|&c| c == letter).count() as i32;

    let step = match letter.to_ascii_lowercase() {
        'c' => 0,
        'd' => 2,
        'e' => 4,
        'f' => 5,
        'g' => 7,
        'a' => 9,
        _ => 11,
    };
    // lowercase: c = C4, cc = C5; uppercase: C = C3, CC = C2
    let octave = if letter.is_ascii_lowercase() {
        3 + repeats
    } else {
        4 - repeats
    };
    let sharps = token.matches('#').count() as i32;
    let flats = token.matches('-').count() as i32;

    let midi = (octave + 1) * 12 + step + sharps - flats;
    if !(0..=MAX_MIDI_PITCH as i32).contains(&midi) {
        return Err(format!("pitch '{}' outside MIDI range", token));
    }
    Ok(midi as u8)
}

/// Key designation interpretation, if `token` is one
///
/// Returns `Some(None)` for a designation that names no usable key (`*?:`
/// or an unknown modal suffix), `None` if the token is not a key designation.
pub fn parse_key_designation(token: &str) -> Option<Option<Key>> {
    if token == "*?:" {
        return Some(None);
    }
    let caps = KEY_DESIGNATION.captures(token)?;
    let name = &caps[1];
    let Some(tonic) = Tonic::from_kern_name(name) else {
        return Some(None);
    };

    let suffix = &caps[2];
    let mode = if suffix.is_empty() {
        if name.starts_with(|c: char| c.is_ascii_uppercase()) {
            Mode::Major
        } else {
            Mode::Minor
        }
    } else {
        match Mode::from_kern_suffix(suffix) {
            Some(mode) => mode,
            None => return Some(None),
        }
    };

    Some(Some(Key::new(tonic, mode)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(numer: i32, denom: i32) -> Rational {
        Rational::new(numer, denom)
    }

    #[test]
    fn test_recip_values() {
        assert_eq!(parse_recip("4c").unwrap(), q(1, 1));
        assert_eq!(parse_recip("16r").unwrap(), q(1, 4));
        assert_eq!(parse_recip("1C").unwrap(), q(4, 1));
        assert_eq!(parse_recip("0c").unwrap(), q(8, 1));
        assert_eq!(parse_recip("00c").unwrap(), q(16, 1));
        assert_eq!(parse_recip("3e").unwrap(), q(4, 3));
        assert_eq!(parse_recip("3%2e").unwrap(), q(8, 3));
    }

    #[test]
    fn test_recip_dots() {
        assert_eq!(parse_recip("8.g").unwrap(), q(3, 4));
        assert_eq!(parse_recip("4.g").unwrap(), q(3, 2));
        assert_eq!(parse_recip("2.g").unwrap(), q(3, 1));
        assert_eq!(parse_recip("4..g").unwrap(), q(7, 4));
    }

    #[test]
    fn test_recip_missing() {
        assert!(parse_recip("cc#").is_err());
    }

    #[test]
    fn test_recip_overflow_is_an_error() {
        assert!(parse_recip("3%1000000000c").is_err());
        assert!(parse_recip("1%536870911..c").is_err());
        assert!(parse_recip("99999999999c").is_err());
        assert!(parse_data_token("3%1000000000c").is_err());
        // largest representable value still parses
        assert_eq!(parse_recip("1%536870911c").unwrap(), q(2147483644, 1));
    }

    #[test]
    fn test_pitch_octaves() {
        assert_eq!(parse_pitch("c").unwrap(), 60);
        assert_eq!(parse_pitch("cc").unwrap(), 72);
        assert_eq!(parse_pitch("C").unwrap(), 48);
        assert_eq!(parse_pitch("CC").unwrap(), 36);
        assert_eq!(parse_pitch("a").unwrap(), 69);
        assert_eq!(parse_pitch("B").unwrap(), 59);
    }

    #[test]
    fn test_pitch_accidentals() {
        assert_eq!(parse_pitch("c#").unwrap(), 61);
        assert_eq!(parse_pitch("e-").unwrap(), 63);
        assert_eq!(parse_pitch("f##").unwrap(), 67);
        assert_eq!(parse_pitch("bn").unwrap(), 71);
    }

    #[test]
    fn test_data_tokens() {
        assert_eq!(
            parse_data_token("4c").unwrap(),
            DataToken::Event(Event::note(60, q(1, 1)))
        );
        assert_eq!(
            parse_data_token("(8.ee-L").unwrap(),
            DataToken::Event(Event::note(75, q(3, 4)))
        );
        assert_eq!(
            parse_data_token("[2G").unwrap(),
            DataToken::Event(Event::note(55, q(2, 1)))
        );
        assert_eq!(
            parse_data_token("4r").unwrap(),
            DataToken::Event(Event::rest(q(1, 1)))
        );
        assert_eq!(parse_data_token("8qc").unwrap(), DataToken::Grace);
    }

    #[test]
    fn test_chord_keeps_first_note() {
        assert_eq!(
            parse_data_token("4c 4e 4g").unwrap(),
            DataToken::Event(Event::note(60, q(1, 1)))
        );
    }

    #[test]
    fn test_invalid_data_tokens() {
        assert!(parse_data_token("c").is_err());
        assert!(parse_data_token("4").is_err());
    }

    #[test]
    fn test_key_designations() {
        assert_eq!(
            parse_key_designation("*G:"),
            Some(Some(Key::new(Tonic::G, Mode::Major)))
        );
        assert_eq!(
            parse_key_designation("*e-:"),
            Some(Some(Key::new(Tonic::Eb, Mode::Minor)))
        );
        assert_eq!(
            parse_key_designation("*f#:"),
            Some(Some(Key::new(Tonic::Fs, Mode::Minor)))
        );
        assert_eq!(
            parse_key_designation("*D:dor"),
            Some(Some(Key::new(Tonic::D, Mode::Dorian)))
        );
        assert_eq!(parse_key_designation("*?:"), Some(None));
        assert_eq!(parse_key_designation("*k[f#]"), None);
        assert_eq!(parse_key_designation("*M4/4"), None);
    }
}
