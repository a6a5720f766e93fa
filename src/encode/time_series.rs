//! Fixed time-step symbolic encoding
//!
//! Every event becomes `steps = trunc(duration / time_step)` tokens: the
//! onset symbol (MIDI number or `r`) followed by `steps - 1` hold tokens
//! (`_`). A quarter note at the default sixteenth-note step encodes as
//! `60 _ _ _`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::models::{Event, Rational, Score, MAX_MIDI_PITCH};

pub const REST_SYMBOL: &str = "r";
pub const HOLD_SYMBOL: &str = "_";

/// Default resolution: a sixteenth note
pub fn default_time_step() -> Rational {
    Rational::new(1, 4)
}

/// One time step of an encoded score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Token {
    /// Onset of a note (MIDI number)
    Pitch(u8),
    /// Onset of a rest
    Rest,
    /// Previous onset continues
    Hold,
}

impl Token {
    pub fn is_onset(&self) -> bool {
        !matches!(self, Token::Hold)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Pitch(pitch) => write!(f, "{}", pitch),
            Token::Rest => write!(f, "{}", REST_SYMBOL),
            Token::Hold => write!(f, "{}", HOLD_SYMBOL),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("invalid token '{0}'")]
    Invalid(String),

    #[error("hold token at position {0} has no preceding onset")]
    OrphanHold(usize),
}

impl FromStr for Token {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            REST_SYMBOL => Ok(Token::Rest),
            HOLD_SYMBOL => Ok(Token::Hold),
            _ => s
                .parse::<u8>()
                .ok()
                .filter(|pitch| *pitch <= MAX_MIDI_PITCH)
                .map(Token::Pitch)
                .ok_or_else(|| TokenError::Invalid(s.to_string())),
        }
    }
}

/// Number of time steps an event occupies (truncating)
pub fn step_count(duration: Rational, time_step: Rational) -> usize {
    (duration / time_step).to_integer().max(0) as usize
}

/// Encode a score as a token sequence
pub fn encode_score(score: &Score, time_step: Rational) -> Vec<Token> {
    let mut tokens = Vec::new();

    for event in &score.events {
        let quotient = event.duration() / time_step;
        if !quotient.is_integer() {
            log::warn!(
                "duration {} is not a multiple of the {} time step, truncating",
                event.duration(),
                time_step
            );
        }

        let steps = step_count(event.duration(), time_step);
        if steps == 0 {
            continue;
        }

        tokens.push(match event {
            Event::Note { pitch, .. } => Token::Pitch(*pitch),
            Event::Rest { .. } => Token::Rest,
        });
        tokens.extend(std::iter::repeat(Token::Hold).take(steps - 1));
    }

    tokens
}

/// Encode a score as a space-separated string
pub fn encode_song(score: &Score, time_step: Rational) -> String {
    join_tokens(&encode_score(score, time_step))
}

pub fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a space-separated encoded song
pub fn parse_tokens(encoded: &str) -> Result<Vec<Token>, TokenError> {
    encoded.split_whitespace().map(str::parse).collect()
}

/// Onset symbol with the number of steps it lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub symbol: Token,
    pub steps: usize,
}

impl Run {
    /// Back to a note or rest event
    pub fn to_event(&self, time_step: Rational) -> Event {
        let duration = time_step * Rational::from_integer(self.steps as i32);
        match self.symbol {
            Token::Pitch(pitch) => Event::note(pitch, duration),
            _ => Event::rest(duration),
        }
    }
}

/// Collapse holds into their onsets
pub fn decode_tokens(tokens: &[Token]) -> Result<Vec<Run>, TokenError> {
    let mut runs: Vec<Run> = Vec::new();
    for (position, token) in tokens.iter().enumerate() {
        match token {
            Token::Hold => match runs.last_mut() {
                Some(run) => run.steps += 1,
                None => return Err(TokenError::OrphanHold(position)),
            },
            onset => runs.push(Run {
                symbol: *onset,
                steps: 1,
            }),
        }
    }
    Ok(runs)
}

/// Rebuild the event list an encoded song came from
pub fn decode_events(tokens: &[Token], time_step: Rational) -> Result<Vec<Event>, TokenError> {
    Ok(decode_tokens(tokens)?
        .iter()
        .map(|run| run.to_event(time_step))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(numer: i32, denom: i32) -> Rational {
        Rational::new(numer, denom)
    }

    #[test]
    fn test_encode_quarter_note() {
        let score = Score::new(vec![Event::note(60, q(1, 1))]);
        assert_eq!(encode_song(&score, default_time_step()), "60 _ _ _");
    }

    #[test]
    fn test_encode_mixed_events() {
        let score = Score::new(vec![
            Event::note(60, q(1, 2)),
            Event::rest(q(1, 4)),
            Event::note(62, q(3, 4)),
        ]);
        assert_eq!(encode_song(&score, default_time_step()), "60 _ r 62 _ _");
    }

    #[test]
    fn test_encoded_length_matches_duration() {
        let score = Score::new(vec![
            Event::note(67, q(3, 2)),
            Event::rest(q(4, 1)),
            Event::note(65, q(1, 4)),
        ]);
        let tokens = encode_score(&score, default_time_step());
        let expected: usize = score
            .events
            .iter()
            .map(|e| step_count(e.duration(), default_time_step()))
            .sum();
        assert_eq!(tokens.len(), expected);
        assert_eq!(tokens.len(), 23);
    }

    #[test]
    fn test_truncates_off_grid_durations() {
        // 1/3 at a 1/4 step is one step, 1/8 is zero steps and vanishes
        let score = Score::new(vec![Event::note(60, q(1, 3)), Event::note(62, q(1, 8))]);
        assert_eq!(encode_song(&score, default_time_step()), "60");
    }

    #[test]
    fn test_coarser_time_step() {
        let score = Score::new(vec![Event::note(60, q(2, 1))]);
        assert_eq!(encode_song(&score, q(1, 2)), "60 _ _ _");
    }

    #[test]
    fn test_empty_score_encodes_to_empty_string() {
        assert_eq!(encode_song(&Score::default(), default_time_step()), "");
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let score = Score::new(vec![Event::note(72, q(3, 4)), Event::rest(q(1, 2))]);
        assert_eq!(
            encode_song(&score, default_time_step()),
            encode_song(&score, default_time_step())
        );
    }

    #[test]
    fn test_token_parsing() {
        assert_eq!("60".parse::<Token>(), Ok(Token::Pitch(60)));
        assert_eq!("r".parse::<Token>(), Ok(Token::Rest));
        assert_eq!("_".parse::<Token>(), Ok(Token::Hold));
        assert_eq!("128".parse::<Token>(), Err(TokenError::Invalid("128".to_string())));
        assert!("/".parse::<Token>().is_err());
    }

    #[test]
    fn test_decode_recovers_events() {
        let events = vec![
            Event::note(60, q(1, 1)),
            Event::rest(q(1, 2)),
            Event::note(60, q(1, 4)),
            Event::note(64, q(3, 2)),
        ];
        let tokens = encode_score(&Score::new(events.clone()), default_time_step());
        assert_eq!(decode_events(&tokens, default_time_step()).unwrap(), events);
    }

    #[test]
    fn test_decode_runs() {
        let tokens = parse_tokens("60 _ r 62 _ _").unwrap();
        let runs = decode_tokens(&tokens).unwrap();
        assert_eq!(
            runs,
            vec![
                Run { symbol: Token::Pitch(60), steps: 2 },
                Run { symbol: Token::Rest, steps: 1 },
                Run { symbol: Token::Pitch(62), steps: 3 },
            ]
        );
    }

    #[test]
    fn test_decode_rejects_leading_hold() {
        let tokens = parse_tokens("_ 60").unwrap();
        assert_eq!(decode_tokens(&tokens), Err(TokenError::OrphanHold(0)));
    }
}
