//! Statistical key estimation (Krumhansl-Schmuckler)
//!
//! Builds a duration-weighted pitch-class histogram and correlates it with
//! a major and a minor key profile rotated onto each of the 12 tonics. The
//! best of the 24 candidates wins. Aarden-Essen weightings are the default,
//! Krumhansl-Kessler listener ratings are available as an alternative.
//!
//! Candidates are visited C major, C minor, C# major, ... and only a strictly
//! higher correlation replaces the current best, so ties resolve to the
//! earliest candidate.

use num_traits::ToPrimitive;

use crate::models::{Event, Key, Mode, Tonic};

/// Aarden-Essen continuity weightings, index 0 = tonic
pub const AARDEN_ESSEN_MAJOR: [f64; 12] = [
    17.7661, 0.145624, 14.9265, 0.160186, 19.8049, 11.3587, 0.291248, 22.062, 0.145624, 8.15494,
    0.232998, 4.95122,
];
pub const AARDEN_ESSEN_MINOR: [f64; 12] = [
    18.2648, 0.737619, 14.0499, 16.8599, 0.702494, 14.4362, 0.702494, 18.6161, 4.56621, 1.93186,
    7.37619, 1.75623,
];

/// Krumhansl-Kessler listener ratings, index 0 = tonic
pub const KRUMHANSL_KESSLER_MAJOR: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];
pub const KRUMHANSL_KESSLER_MINOR: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Pair of major/minor weightings used for correlation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyProfile {
    /// Derived from the Essen folk-song collection
    #[default]
    AardenEssen,
    KrumhanslKessler,
}

impl KeyProfile {
    pub fn weights(&self, mode: Mode) -> Option<&'static [f64; 12]> {
        match (self, mode) {
            (KeyProfile::AardenEssen, Mode::Major) => Some(&AARDEN_ESSEN_MAJOR),
            (KeyProfile::AardenEssen, Mode::Minor) => Some(&AARDEN_ESSEN_MINOR),
            (KeyProfile::KrumhanslKessler, Mode::Major) => Some(&KRUMHANSL_KESSLER_MAJOR),
            (KeyProfile::KrumhanslKessler, Mode::Minor) => Some(&KRUMHANSL_KESSLER_MINOR),
            _ => None,
        }
    }
}

/// Candidate key with its correlation score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyCandidate {
    pub key: Key,
    pub correlation: f64,
}

/// Total sounding duration per pitch class, in quarter lengths
pub fn pitch_class_histogram(events: &[Event]) -> [f64; 12] {
    let mut histogram = [0.0f64; 12];
    for event in events {
        if let Event::Note { pitch, duration } = *event {
            histogram[(pitch % 12) as usize] += duration.to_f64().unwrap_or(0.0);
        }
    }
    histogram
}

/// Rank all 24 major/minor keys with the default profile, best first
pub fn rank_keys(events: &[Event]) -> Vec<KeyCandidate> {
    rank_keys_with(events, KeyProfile::default())
}

/// Rank all 24 major/minor keys for the given events, best first
///
/// Empty when there is no pitch content or the histogram is flat.
pub fn rank_keys_with(events: &[Event], profile: KeyProfile) -> Vec<KeyCandidate> {
    let histogram = pitch_class_histogram(events);
    if histogram.iter().all(|&weight| weight == 0.0) {
        return Vec::new();
    }

    let mut candidates = Vec::with_capacity(24);
    for tonic in 0..12usize {
        for mode in [Mode::Major, Mode::Minor] {
            let Some(weights) = profile.weights(mode) else {
                continue;
            };
            let Some(correlation) = correlate(&histogram, weights, tonic) else {
                return Vec::new();
            };
            candidates.push(KeyCandidate {
                key: Key::new(Tonic::from_pitch_class(tonic as u8), mode),
                correlation,
            });
        }
    }

    // stable sort keeps visiting order among equal scores
    candidates.sort_by(|a, b| b.correlation.total_cmp(&a.correlation));
    candidates
}

/// Most likely key, or `None` if nothing can be inferred
pub fn estimate_key(events: &[Event]) -> Option<Key> {
    rank_keys(events).first().map(|candidate| candidate.key)
}

/// Pearson correlation between the histogram and a profile rotated to `tonic`
fn correlate(histogram: &[f64; 12], profile: &[f64; 12], tonic: usize) -> Option<f64> {
    let rotated: Vec<f64> = (0..12).map(|i| histogram[(i + tonic) % 12]).collect();

    let mean_x = rotated.iter().sum::<f64>() / 12.0;
    let mean_y = profile.iter().sum::<f64>() / 12.0;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (x, y) in rotated.iter().zip(profile.iter()) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    let denominator = (variance_x * variance_y).sqrt();
    if denominator == 0.0 {
        return None;
    }
    Some(covariance / denominator)
}
