//! Key detection and normalization

pub mod key_finding;
pub mod normalize;

pub use key_finding::{estimate_key, rank_keys_with, KeyProfile};
pub use normalize::{detect_key, normalize_key, KeySource, NormalizedScore};
