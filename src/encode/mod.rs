//! Score encoding
//!
//! Turns normalized scores into the time-series token representation:
//! 1. **Filter**: drop scores with durations that do not fit the grid
//! 2. **Encode**: one token per time step, holds for sustained events
//! 3. **Decode**: collapse tokens back into (symbol, run length) pairs

pub mod duration_filter;
pub mod time_series;

pub use duration_filter::{
    default_acceptable_durations, first_unacceptable_duration, has_acceptable_note_durations,
};
pub use time_series::{
    decode_events, decode_tokens, default_time_step, encode_score, encode_song, join_tokens,
    parse_tokens, Run, Token, TokenError, HOLD_SYMBOL, REST_SYMBOL,
};
