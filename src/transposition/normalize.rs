//! Key normalization: move every score onto C major or A minor
//!
//! The key comes from the score's own designation when it has one and from
//! Krumhansl-Schmuckler estimation otherwise. Modal keys are rejected rather
//! than guessed at.

use crate::error::ScoreError;
use crate::models::{Key, Score};

/// Where the key used for normalization came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Designated,
    Estimated,
}

/// A score moved onto its reference tonic
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedScore {
    pub score: Score,
    /// Key before transposition
    pub original_key: Key,
    pub key_source: KeySource,
    /// Semitones applied to every pitch
    pub semitones: i8,
}

/// Key designation if present, estimated key otherwise
pub fn detect_key(score: &Score) -> Result<(Key, KeySource), ScoreError> {
    if let Some(key) = score.key {
        return Ok((key, KeySource::Designated));
    }
    score
        .estimate_key()
        .map(|key| (key, KeySource::Estimated))
        .ok_or(ScoreError::UndeterminableKey)
}

/// Transpose `score` so a major key lands on C and a minor key on A
pub fn normalize_key(score: &Score) -> Result<NormalizedScore, ScoreError> {
    let (key, key_source) = detect_key(score)?;
    let semitones = key
        .interval_to_reference()
        .ok_or(ScoreError::UnsupportedMode(key))?;

    let mut transposed = score.transpose(semitones)?;
    // estimated keys are recorded too, so callers see the normalized key
    transposed.key = Some(key.transposed(semitones));

    log::debug!(
        "normalized {} key {} by {} semitones",
        match key_source {
            KeySource::Designated => "designated",
            KeySource::Estimated => "estimated",
        },
        key,
        semitones
    );

    Ok(NormalizedScore {
        score: transposed,
        original_key: key,
        key_source,
        semitones,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Event, Mode, Rational, Tonic};

    fn melody(pitches: &[u8]) -> Score {
        Score::new(
            pitches
                .iter()
                .map(|&p| Event::note(p, Rational::from_integer(1)))
                .collect(),
        )
    }

    #[test]
    fn test_designated_major_key_goes_to_c() {
        // D major: D E F# D
        let score = melody(&[62, 64, 66, 62]).with_key(Key::new(Tonic::D, Mode::Major));
        let normalized = normalize_key(&score).unwrap();

        assert_eq!(normalized.semitones, -2);
        assert_eq!(normalized.key_source, KeySource::Designated);
        assert_eq!(normalized.score.key, Some(Key::new(Tonic::C, Mode::Major)));
        let pitches: Vec<u8> = normalized.score.events.iter().filter_map(|e| e.pitch()).collect();
        assert_eq!(pitches, vec![60, 62, 64, 60]);
    }

    #[test]
    fn test_designated_minor_key_goes_to_a() {
        let score = melody(&[64, 67, 71]).with_key(Key::new(Tonic::E, Mode::Minor));
        let normalized = normalize_key(&score).unwrap();
        assert_eq!(normalized.semitones, 5);
        assert_eq!(normalized.score.key, Some(Key::new(Tonic::A, Mode::Minor)));
        assert_eq!(normalized.score.events[0].pitch(), Some(69));
    }

    #[test]
    fn test_estimated_key_is_used_without_designation() {
        // G major scale with emphasis on G and D
        let mut score = melody(&[67, 69, 71, 72, 74, 76, 78, 79]);
        score.events.push(Event::note(67, Rational::from_integer(4)));
        score.events.push(Event::note(74, Rational::from_integer(2)));
        let normalized = normalize_key(&score).unwrap();

        assert_eq!(normalized.key_source, KeySource::Estimated);
        assert_eq!(normalized.original_key, Key::new(Tonic::G, Mode::Major));
        assert_eq!(normalized.semitones, -7);
        assert_eq!(normalized.score.estimate_key(), Some(Key::new(Tonic::C, Mode::Major)));
    }

    #[test]
    fn test_rests_are_unaffected() {
        let mut score = melody(&[62]).with_key(Key::new(Tonic::D, Mode::Major));
        score.events.push(Event::rest(Rational::new(1, 2)));
        let normalized = normalize_key(&score).unwrap();
        assert_eq!(normalized.score.events[1], Event::rest(Rational::new(1, 2)));
    }

    #[test]
    fn test_modal_key_is_rejected() {
        let score = melody(&[62, 64, 65]).with_key(Key::new(Tonic::D, Mode::Dorian));
        assert_eq!(
            normalize_key(&score),
            Err(ScoreError::UnsupportedMode(Key::new(Tonic::D, Mode::Dorian)))
        );
    }

    #[test]
    fn test_no_key_and_no_notes_is_rejected() {
        let score = Score::new(vec![Event::rest(Rational::from_integer(2))]);
        assert_eq!(normalize_key(&score), Err(ScoreError::UndeterminableKey));
    }

    #[test]
    fn test_uniform_shift_preserves_intervals() {
        let score = melody(&[65, 69, 72, 70, 77]).with_key(Key::new(Tonic::F, Mode::Major));
        let normalized = normalize_key(&score).unwrap();
        let before: Vec<i16> = score.events.iter().filter_map(|e| e.pitch()).map(i16::from).collect();
        let after: Vec<i16> = normalized.score.events.iter().filter_map(|e| e.pitch()).map(i16::from).collect();
        for (b, a) in before.iter().zip(after.iter()) {
            assert_eq!(a - b, normalized.semitones as i16);
        }
    }
}
