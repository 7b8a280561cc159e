//! Canonical answer letters and normalization of raw gold labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// One of the four option letters of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
}

impl AnswerLetter {
    /// All letters in option order.
    pub const ALL: [AnswerLetter; 4] =
        [AnswerLetter::A, AnswerLetter::B, AnswerLetter::C, AnswerLetter::D];

    /// The letter as a one-character string.
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerLetter::A => "A",
            AnswerLetter::B => "B",
            AnswerLetter::C => "C",
            AnswerLetter::D => "D",
        }
    }

    /// Map a single option character (either case) to a letter.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(AnswerLetter::A),
            'B' => Some(AnswerLetter::B),
            'C' => Some(AnswerLetter::C),
            'D' => Some(AnswerLetter::D),
            _ => None,
        }
    }
}

impl fmt::Display for AnswerLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerLetter {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        normalize_label(s)
    }
}

/// Normalize a raw answer label to its canonical letter.
///
/// Datasets store the gold answer either as an option number (`"1"`..`"4"`)
/// or as a letter. Surrounding whitespace is ignored and letters are
/// case-insensitive.
///
/// # Errors
///
/// Returns [`RagError::InvalidLabel`] for any other value, including empty input.
pub fn normalize_label(raw: &str) -> Result<AnswerLetter> {
    match raw.trim().to_uppercase().as_str() {
        "1" | "A" => Ok(AnswerLetter::A),
        "2" | "B" => Ok(AnswerLetter::B),
        "3" | "C" => Ok(AnswerLetter::C),
        "4" | "D" => Ok(AnswerLetter::D),
        _ => Err(RagError::InvalidLabel(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_numbers_and_letters() {
        let cases = [
            ("1", AnswerLetter::A),
            ("2", AnswerLetter::B),
            ("3", AnswerLetter::C),
            ("4", AnswerLetter::D),
            ("A", AnswerLetter::A),
            ("a", AnswerLetter::A),
            ("B", AnswerLetter::B),
            ("c", AnswerLetter::C),
            ("D", AnswerLetter::D),
            ("  3 ", AnswerLetter::C),
        ];
        for (raw, expected) in cases {
            assert_eq!(normalize_label(raw).unwrap(), expected, "label {raw:?}");
        }
    }

    #[test]
    fn rejects_unknown_labels() {
        for raw in ["", " ", "0", "5", "E", "AB", "1.0", "정답"] {
            let err = normalize_label(raw).unwrap_err();
            assert!(matches!(err, RagError::InvalidLabel(ref v) if v == raw), "label {raw:?}");
        }
    }

    #[test]
    fn parses_via_from_str() {
        let letter: AnswerLetter = "4".parse().unwrap();
        assert_eq!(letter, AnswerLetter::D);
        assert_eq!(letter.to_string(), "D");
    }
}
