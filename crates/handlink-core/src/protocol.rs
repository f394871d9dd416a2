//! Line protocol parsing
//!
//! Each line sent by the tracking process is a comma-separated list of
//! `KEY:VALUE` tokens, for example:
//!
//! ```text
//! HAND:LEFT,X:0.5,Y:0.3,Z:-0.2,QW:1.0,QX:0.0,QY:0.0,QZ:0.0,TRIGGER:0.8,GRIP:0.0,GESTURE:POINT
//! ```
//!
//! Parsing never fails. Tokens without a colon are dropped and a repeated key
//! keeps its last value. Numeric fields reject `nan` and `inf` along with
//! non-numeric text, so only finite values reach hand state.

use std::collections::HashMap;
use thiserror::Error;

/// Hand selector field
pub const FIELD_HAND: &str = "HAND";
pub const FIELD_X: &str = "X";
pub const FIELD_Y: &str = "Y";
pub const FIELD_Z: &str = "Z";
pub const FIELD_QW: &str = "QW";
pub const FIELD_QX: &str = "QX";
pub const FIELD_QY: &str = "QY";
pub const FIELD_QZ: &str = "QZ";
pub const FIELD_TRIGGER: &str = "TRIGGER";
pub const FIELD_GRIP: &str = "GRIP";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("Field {field} is not a number: {value:?}")]
    Malformed { field: String, value: String },
    #[error("Field {field} is not finite: {value:?}")]
    NonFinite { field: String, value: String },
}

/// One parsed protocol line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolMessage {
    fields: HashMap<String, String>,
}

impl ProtocolMessage {
    /// Raw value of a field
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse a field as `f32`
    ///
    /// Returns `None` when the field is absent. Surrounding whitespace is
    /// ignored; anything else that is not a finite number is an error.
    pub fn parse_f32(&self, key: &str) -> Option<Result<f32, FieldError>> {
        let raw = self.get(key)?;
        let parsed = match raw.trim().parse::<f32>() {
            Ok(v) if v.is_finite() => Ok(v),
            Ok(_) => Err(FieldError::NonFinite {
                field: key.to_string(),
                value: raw.to_string(),
            }),
            Err(_) => Err(FieldError::Malformed {
                field: key.to_string(),
                value: raw.to_string(),
            }),
        };
        Some(parsed)
    }

    /// Parse a group of fields that must all be present
    ///
    /// Returns `None` if any member is missing. If all are present, the first
    /// malformed member is reported as the error.
    pub fn parse_group<const N: usize>(
        &self,
        keys: [&str; N],
    ) -> Option<Result<[f32; N], FieldError>> {
        if !keys.iter().all(|k| self.contains(k)) {
            return None;
        }
        let mut values = [0.0f32; N];
        for (slot, key) in values.iter_mut().zip(keys) {
            match self.parse_f32(key)? {
                Ok(v) => *slot = v,
                Err(e) => return Some(Err(e)),
            }
        }
        Some(Ok(values))
    }
}

impl FromIterator<(String, String)> for ProtocolMessage {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Parse a single line (without its trailing newline) into a message
pub fn parse_line(line: &str) -> ProtocolMessage {
    line.split(',')
        .filter_map(|token| token.split_once(':'))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_line() {
        let msg = parse_line("HAND:LEFT,X:0.5,Y:0.3,Z:-0.2");
        assert_eq!(msg.len(), 4);
        assert_eq!(msg.get("HAND"), Some("LEFT"));
        assert_eq!(msg.get("X"), Some("0.5"));
        assert_eq!(msg.get("Y"), Some("0.3"));
        assert_eq!(msg.get("Z"), Some("-0.2"));
    }

    #[test]
    fn test_parse_splits_on_first_colon() {
        let msg = parse_line("GESTURE:A:B,X:1");
        assert_eq!(msg.get("GESTURE"), Some("A:B"));
        assert_eq!(msg.get("X"), Some("1"));
    }

    #[test]
    fn test_parse_drops_tokens_without_colon() {
        let msg = parse_line("HAND:RIGHT,garbage,,X:2");
        assert_eq!(msg.len(), 2);
        assert!(!msg.contains("garbage"));
        assert!(!msg.contains(""));
    }

    #[test]
    fn test_parse_last_duplicate_wins() {
        let msg = parse_line("X:1,X:2,X:3");
        assert_eq!(msg.len(), 1);
        assert_eq!(msg.get("X"), Some("3"));
    }

    #[test]
    fn test_parse_empty_line() {
        assert!(parse_line("").is_empty());
    }

    #[test]
    fn test_parse_keeps_empty_key_and_value() {
        let msg = parse_line(":5,Y:");
        assert_eq!(msg.get(""), Some("5"));
        assert_eq!(msg.get("Y"), Some(""));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let line = "HAND:LEFT,QW:1,QX:0,QY:0,QZ:0,TRIGGER:0.8,GRIP:0.1,GESTURE:POINT";
        assert_eq!(parse_line(line), parse_line(line));
    }

    #[test]
    fn test_parse_generated_pairs() {
        for n in 0..20 {
            let pairs: Vec<(String, String)> = (0..n)
                .map(|i| (format!("K{}", i), format!("{}.{}", i, n)))
                .collect();
            let line = pairs
                .iter()
                .map(|(k, v)| format!("{}:{}", k, v))
                .collect::<Vec<_>>()
                .join(",");
            let msg = parse_line(&line);
            assert_eq!(msg.len(), n);
            for (k, v) in &pairs {
                assert_eq!(msg.get(k), Some(v.as_str()));
            }
        }
    }

    #[test]
    fn test_parse_f32() {
        let msg = parse_line("X: 1.5 ,Y:abc,Z:inf");
        assert_eq!(msg.parse_f32("X"), Some(Ok(1.5)));
        assert!(matches!(
            msg.parse_f32("Y"),
            Some(Err(FieldError::Malformed { .. }))
        ));
        assert!(matches!(
            msg.parse_f32("Z"),
            Some(Err(FieldError::NonFinite { .. }))
        ));
        assert_eq!(msg.parse_f32("W"), None);
    }

    #[test]
    fn test_parse_group() {
        let msg = parse_line("X:1,Y:2,Z:3");
        assert_eq!(msg.parse_group(["X", "Y", "Z"]), Some(Ok([1.0, 2.0, 3.0])));

        let partial = parse_line("X:1,Y:2");
        assert_eq!(partial.parse_group(["X", "Y", "Z"]), None);

        let bad = parse_line("X:1,Y:nope,Z:3");
        assert!(matches!(
            bad.parse_group(["X", "Y", "Z"]),
            Some(Err(FieldError::Malformed { ref field, .. })) if field == "Y"
        ));
    }
}
