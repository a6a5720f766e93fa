//! Duration filter: keep only scores whose rhythms fit the time grid

use crate::models::{Rational, Score};

/// Quarter lengths accepted by default
///
/// 16th, 8th, dotted 8th, quarter, dotted quarter, half, dotted half, whole.
pub fn default_acceptable_durations() -> Vec<Rational> {
    vec![
        Rational::new(1, 4),
        Rational::new(1, 2),
        Rational::new(3, 4),
        Rational::from_integer(1),
        Rational::new(3, 2),
        Rational::from_integer(2),
        Rational::from_integer(3),
        Rational::from_integer(4),
    ]
}

/// First event duration not in `acceptable`, if any
///
/// Grace notes count as zero-length notes and are checked after the events.
pub fn first_unacceptable_duration(score: &Score, acceptable: &[Rational]) -> Option<Rational> {
    let grace = Rational::from_integer(0);
    score
        .events
        .iter()
        .map(|event| event.duration())
        .chain((score.grace_notes > 0).then_some(grace))
        .find(|duration| !acceptable.contains(duration))
}

/// True when every note and rest has an accepted duration
///
/// An empty score passes.
pub fn has_acceptable_note_durations(score: &Score, acceptable: &[Rational]) -> bool {
    first_unacceptable_duration(score, acceptable).is_none()
}
