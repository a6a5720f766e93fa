//! Serde helpers for quarter-length values in configuration files
//!
//! Rationals are written as strings (`"3/4"`, `"2"`) and read from fractions,
//! decimals (`"0.75"`, `0.75`) or integers, so configuration files stay exact
//! and readable.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use super::score::Rational;

#[derive(Deserialize)]
#[serde(untagged)]
enum RationalRepr {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RationalRepr {
    fn into_rational(self) -> Result<Rational, String> {
        match self {
            RationalRepr::Integer(n) => i32::try_from(n)
                .map(Rational::from_integer)
                .map_err(|_| format!("{} is out of range", n)),
            RationalRepr::Float(f) => parse_rational(&f.to_string()),
            RationalRepr::Text(s) => parse_rational(&s),
        }
    }
}

/// Parse `"3/4"`, `"0.75"`, `"-2"` into an exact rational
pub fn parse_rational(text: &str) -> Result<Rational, String> {
    let text = text.trim();
    let invalid = || format!("'{}' is not a fraction or decimal number", text);

    if let Some((numer, denom)) = text.split_once('/') {
        let numer: i32 = numer.trim().parse().map_err(|_| invalid())?;
        let denom: i32 = denom.trim().parse().map_err(|_| invalid())?;
        if denom == 0 {
            return Err(format!("'{}' has a zero denominator", text));
        }
        return Ok(Rational::new(numer, denom));
    }

    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) || fraction.len() > 6 {
        return Err(invalid());
    }

    let scale = 10i32.pow(fraction.len() as u32);
    let whole: i32 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| invalid())? };
    let fraction: i32 = if fraction.is_empty() { 0 } else { fraction.parse().map_err(|_| invalid())? };
    let numer = whole
        .checked_mul(scale)
        .and_then(|n| n.checked_add(fraction))
        .ok_or_else(invalid)?;

    Ok(Rational::new(if negative { -numer } else { numer }, scale))
}

/// `#[serde(with = "rational")]` for a single value
pub mod rational {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Rational, serializer: S) -> Result<S::Ok, S::Error> {
        value.to_string().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rational, D::Error> {
        RationalRepr::deserialize(deserializer)?
            .into_rational()
            .map_err(de::Error::custom)
    }
}

/// `#[serde(with = "rational_list")]` for a list of values
pub mod rational_list {
    use super::*;

    pub fn serialize<S: Serializer>(values: &[Rational], serializer: S) -> Result<S::Ok, S::Error> {
        values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Rational>, D::Error> {
        Vec::<RationalRepr>::deserialize(deserializer)?
            .into_iter()
            .map(|repr| repr.into_rational().map_err(de::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fractions() {
        assert_eq!(parse_rational("3/4"), Ok(Rational::new(3, 4)));
        assert_eq!(parse_rational(" 2 / 4 "), Ok(Rational::new(1, 2)));
        assert!(parse_rational("1/0").is_err());
    }

    #[test]
    fn test_parse_decimals() {
        assert_eq!(parse_rational("0.75"), Ok(Rational::new(3, 4)));
        assert_eq!(parse_rational("1.5"), Ok(Rational::new(3, 2)));
        assert_eq!(parse_rational("4"), Ok(Rational::from_integer(4)));
        assert_eq!(parse_rational(".25"), Ok(Rational::new(1, 4)));
        assert_eq!(parse_rational("-0.5"), Ok(Rational::new(-1, 2)));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_rational("").is_err());
        assert!(parse_rational("abc").is_err());
        assert!(parse_rational("1.2.3").is_err());
        assert!(parse_rational(".").is_err());
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Holder {
        #[serde(with = "rational")]
        step: Rational,
        #[serde(with = "rational_list")]
        allowed: Vec<Rational>,
    }

    #[test]
    fn test_json_forms() {
        let holder: Holder =
            serde_json::from_str(r#"{"step": 0.25, "allowed": ["3/4", 1, "1.5"]}"#).unwrap();
        assert_eq!(holder.step, Rational::new(1, 4));
        assert_eq!(
            holder.allowed,
            vec![Rational::new(3, 4), Rational::from_integer(1), Rational::new(3, 2)]
        );

        let json = serde_json::to_string(&holder).unwrap();
        assert_eq!(json, r#"{"step":"1/4","allowed":["3/4","1","3/2"]}"#);
    }
}
