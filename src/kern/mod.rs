//! Humdrum **kern reader
//!
//! Reads the subset of **kern found in folk-song collections into a flat
//! `Score`:
//! 1. **Spines**: the exclusive interpretation line selects `**kern` columns,
//!    all other spine types are skipped
//! 2. **Records**: comments, interpretations, barlines and data records are
//!    told apart by their first character
//! 3. **Flatten**: events of every `**kern` spine are merged by onset offset;
//!    at equal offsets the rightmost spine (the top staff) comes first
//!
//! The rightmost `**kern` spine is the first part: its opening measure holds
//! the key designation. Spine splits and joins (`*^`, `*v`, `*x`, `*+`) are
//! not supported and make the file fail to parse. Tied notes stay separate
//! events. Grace notes take no time; they are counted on the score so the
//! duration filter can reject it.

pub mod tokens;

use std::path::Path;

use num_traits::CheckedAdd;
use thiserror::Error;

use crate::error::ScoreError;
use crate::models::{Event, Key, Rational, Score};
use crate::source::ScoreSource;

use tokens::{parse_data_token, parse_key_designation, DataToken};

/// Fatal **kern parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: record before the exclusive interpretation")]
    MissingHeader { line: usize },

    #[error("no **kern spine")]
    NoKernSpine,

    #[error("line {line}: expected {expected} spines, found {found}")]
    SpineCountMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: unsupported spine manipulator '{token}'")]
    UnsupportedSpineManipulator { line: usize, token: String },

    #[error("line {line}: invalid note '{token}': {reason}")]
    InvalidNote {
        line: usize,
        token: String,
        reason: String,
    },

    #[error("line {line}: onset offset exceeds the representable range")]
    DurationOverflow { line: usize },
}

/// Event with its onset, used while merging spines
struct TimedEvent {
    offset: Rational,
    spine: usize,
    event: Event,
}

/// Running state of one **kern spine
struct Spine {
    column: usize,
    offset: Rational,
    seen_data: bool,
}

/// Rightmost `**kern` spine; callers guarantee at least one
fn first_part(spines: &[Spine]) -> &Spine {
    &spines[spines.len() - 1]
}

/// Parse a **kern document into a flattened score
pub fn parse_kern(text: &str) -> Result<Score, ParseError> {
    let mut columns: Option<usize> = None;
    let mut spines: Vec<Spine> = Vec::new();
    let mut timed: Vec<TimedEvent> = Vec::new();
    let mut key: Option<Key> = None;
    let mut in_first_measure = true;
    let mut grace_notes = 0;

    for (index, raw_line) in text.lines().enumerate() {
        let line = index + 1;
        let record = raw_line.trim_end_matches('\r');
        if record.is_empty() || record.starts_with('!') {
            continue;
        }

        let fields: Vec<&str> = record.split('\t').collect();

        if record.starts_with("**") && columns.is_none() {
            spines = fields
                .iter()
                .enumerate()
                .filter(|(_, field)| **field == "**kern")
                .map(|(column, _)| Spine {
                    column,
                    offset: Rational::from_integer(0),
                    seen_data: false,
                })
                .collect();
            if spines.is_empty() {
                return Err(ParseError::NoKernSpine);
            }
            columns = Some(fields.len());
            continue;
        }

        let Some(expected) = columns else {
            return Err(ParseError::MissingHeader { line });
        };
        if fields.len() != expected {
            return Err(ParseError::SpineCountMismatch {
                line,
                expected,
                found: fields.len(),
            });
        }

        if record.starts_with('*') {
            if let Some(token) = fields
                .iter()
                .copied()
                .find(|field| matches!(*field, "*^" | "*v" | "*x" | "*+"))
            {
                return Err(ParseError::UnsupportedSpineManipulator {
                    line,
                    token: token.to_string(),
                });
            }
            // key designation of the first part, first measure only
            if in_first_measure && key.is_none() {
                let field = fields[first_part(&spines).column];
                if let Some(designation) = parse_key_designation(field) {
                    if designation.is_none() {
                        log::debug!("line {}: key designation names no usable key", line);
                    }
                    key = designation;
                }
            }
            continue;
        }

        if record.starts_with('=') {
            if first_part(&spines).seen_data {
                in_first_measure = false;
            }
            continue;
        }

        for (position, spine) in spines.iter_mut().enumerate() {
            let field = fields[spine.column];
            if field == "." {
                continue;
            }
            let token = parse_data_token(field).map_err(|reason| ParseError::InvalidNote {
                line,
                token: field.to_string(),
                reason,
            })?;
            match token {
                DataToken::Event(event) => {
                    timed.push(TimedEvent {
                        offset: spine.offset,
                        spine: position,
                        event,
                    });
                    spine.offset = spine
                        .offset
                        .checked_add(&event.duration())
                        .ok_or(ParseError::DurationOverflow { line })?;
                    spine.seen_data = true;
                }
                DataToken::Grace => {
                    log::debug!("line {}: grace note '{}'", line, field);
                    grace_notes += 1;
                }
            }
        }
    }

    if columns.is_none() {
        return Err(ParseError::NoKernSpine);
    }

    timed.sort_by(|a, b| a.offset.cmp(&b.offset).then(b.spine.cmp(&a.spine)));

    Ok(Score {
        events: timed.into_iter().map(|timed| timed.event).collect(),
        key,
        grace_notes,
    })
}

/// `ScoreSource` reading `.krn` files from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct KernSource;

impl ScoreSource for KernSource {
    fn extension(&self) -> &str {
        "krn"
    }

    fn load(&self, path: &Path) -> Result<Score, ScoreError> {
        let bytes = std::fs::read(path)
            .map_err(|e| ScoreError::Unreadable(format!("{}: {}", path.display(), e)))?;
        // collections are often Latin-1; only comments carry non-ASCII text
        Ok(parse_kern(&String::from_utf8_lossy(&bytes))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Mode, Tonic};

    fn q(numer: i32, denom: i32) -> Rational {
        Rational::new(numer, denom)
    }

    const FOLK_SONG: &str = "!!!OTL: Test song\n\
**kern\n\
*ICvox\n\
*M3/4\n\
*k[f#]\n\
*G:\n\
=1-\n\
8g\n\
8a\n\
=2\n\
4b\n\
4.dd\n\
8r\n\
=3\n\
2g\n\
==\n\
*-\n";

    #[test]
    fn test_parse_folk_song() {
        let score = parse_kern(FOLK_SONG).unwrap();
        assert_eq!(score.key, Some(Key::new(Tonic::G, Mode::Major)));
        assert_eq!(
            score.events,
            vec![
                Event::note(67, q(1, 2)),
                Event::note(69, q(1, 2)),
                Event::note(71, q(1, 1)),
                Event::note(74, q(3, 2)),
                Event::rest(q(1, 2)),
                Event::note(67, q(2, 1)),
            ]
        );
    }

    #[test]
    fn test_key_signature_alone_is_not_a_key() {
        let score = parse_kern("**kern\n*k[b-]\n4f\n*-\n").unwrap();
        assert_eq!(score.key, None);
    }

    #[test]
    fn test_key_after_first_measure_is_ignored() {
        let text = "**kern\n4c\n=2\n*a:\n4a\n*-\n";
        assert_eq!(parse_kern(text).unwrap().key, None);
    }

    #[test]
    fn test_unknown_key_designation() {
        assert_eq!(parse_kern("**kern\n*?:\n4c\n*-\n").unwrap().key, None);
    }

    #[test]
    fn test_other_spines_are_ignored() {
        let text = "**kern\t**text\n*e:\t*\n4e\tLa\n4g\tla\n*-\t*-\n";
        let score = parse_kern(text).unwrap();
        assert_eq!(score.key, Some(Key::new(Tonic::E, Mode::Minor)));
        assert_eq!(score.events.len(), 2);
    }

    #[test]
    fn test_kern_spines_are_flattened_by_offset() {
        let text = "**kern\t**kern\n2C\t4c\n.\t4d\n*-\t*-\n";
        let score = parse_kern(text).unwrap();
        let pitches: Vec<u8> = score.events.iter().filter_map(|e| e.pitch()).collect();
        // top staff first at equal onsets
        assert_eq!(pitches, vec![60, 48, 62]);
    }

    #[test]
    fn test_key_comes_from_rightmost_kern_spine() {
        let text = "**kern\t**kern\n*F:\t*d:\n4F\t4d\n*-\t*-\n";
        let score = parse_kern(text).unwrap();
        assert_eq!(score.key, Some(Key::new(Tonic::D, Mode::Minor)));

        // the first measure ends when the top staff has played
        let text = "**kern\t**kern\n4F\t4d\n=2\t=2\n*F:\t*d:\n4F\t4d\n*-\t*-\n";
        assert_eq!(parse_kern(text).unwrap().key, None);
    }

    #[test]
    fn test_grace_notes_are_counted_not_timed() {
        let score = parse_kern("**kern\n*C:\n8qd\n4c\n*-\n").unwrap();
        assert_eq!(score.events, vec![Event::note(60, q(1, 1))]);
        assert_eq!(score.grace_notes, 1);
    }

    #[test]
    fn test_onset_overflow_is_an_error() {
        let text = "**kern\n7c\n11c\n13c\n17c\n19c\n23c\n29c\n31c\n37c\n41c\n*-\n";
        assert!(matches!(
            parse_kern(text),
            Err(ParseError::DurationOverflow { .. })
        ));
    }

    #[test]
    fn test_latin1_comment_is_tolerated() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("song.krn");
        let mut bytes = b"!!!OTL: M".to_vec();
        bytes.push(0xE4);
        bytes.extend_from_slice(b"dchen\n**kern\n*G:\n4g\n*-\n");
        std::fs::write(&path, bytes).unwrap();

        let score = KernSource.load(&path).unwrap();
        assert_eq!(score.key, Some(Key::new(Tonic::G, Mode::Major)));
        assert_eq!(score.events, vec![Event::note(67, q(1, 1))]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_kern("**text\nla\n*-\n"), Err(ParseError::NoKernSpine));
        assert_eq!(parse_kern(""), Err(ParseError::NoKernSpine));
        assert_eq!(parse_kern("4c\n"), Err(ParseError::MissingHeader { line: 1 }));
        assert!(matches!(
            parse_kern("**kern\n*^\n"),
            Err(ParseError::UnsupportedSpineManipulator { line: 2, .. })
        ));
        assert!(matches!(
            parse_kern("**kern\n4c\t4d\n"),
            Err(ParseError::SpineCountMismatch { line: 2, expected: 1, found: 2 })
        ));
        assert!(matches!(
            parse_kern("**kern\nc\n"),
            Err(ParseError::InvalidNote { line: 2, .. })
        ));
    }
}
