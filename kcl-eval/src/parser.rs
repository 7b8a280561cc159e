//! Extraction of the final answer letter from model output.

use std::sync::LazyLock;

use kcl_rag::AnswerLetter;
use regex::Regex;

use crate::error::{EvalError, Result};

/// `정답: X` anywhere in the text.
static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)정답\s*:\s*([ABCD])").expect("valid regex"));

/// An option letter not touching other ASCII letters or digits.
static STANDALONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^A-Za-z0-9])([ABCD])(?:$|[^A-Za-z0-9])").expect("valid regex")
});

/// Extract the chosen option from generated text.
///
/// The `정답: X` marker wins wherever it appears. Without it, only the last
/// line is inspected for a standalone option letter, so letters inside the
/// reasoning are never mistaken for the answer.
///
/// # Errors
///
/// Returns [`EvalError::ParseFailure`] carrying the text if neither strategy
/// finds a letter.
pub fn parse_answer(text: &str) -> Result<AnswerLetter> {
    let text = text.trim();

    if let Some(letter) = MARKER.captures(text).and_then(|c| first_letter(&c)) {
        return Ok(letter);
    }

    let last_line = text.lines().last().unwrap_or_default();
    if let Some(letter) = STANDALONE.captures(last_line).and_then(|c| first_letter(&c)) {
        return Ok(letter);
    }

    Err(EvalError::ParseFailure { text: text.to_string() })
}

fn first_letter(captures: &regex::Captures<'_>) -> Option<AnswerLetter> {
    captures.get(1)?.as_str().chars().next().and_then(AnswerLetter::from_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_on_last_line() {
        let text = "문맥에 따르면 B가 타당하다.\n정답: B";
        assert_eq!(parse_answer(text).unwrap(), AnswerLetter::B);
    }

    #[test]
    fn marker_wins_over_later_letters() {
        let text = "정답 : d\n추가 설명: A와 C는 틀렸다";
        assert_eq!(parse_answer(text).unwrap(), AnswerLetter::D);
    }

    #[test]
    fn standalone_letter_on_last_line() {
        let text = "Reasoning about the options...\nThe answer is C";
        assert_eq!(parse_answer(text).unwrap(), AnswerLetter::C);
    }

    #[test]
    fn letters_inside_words_are_ignored() {
        let text = "Reasoning...\nNo decision reached";
        assert!(matches!(parse_answer(text), Err(EvalError::ParseFailure { .. })));
    }

    #[test]
    fn letter_followed_by_hangul_counts() {
        assert_eq!(parse_answer("...\n따라서 답은 B입니다.").unwrap(), AnswerLetter::B);
    }

    #[test]
    fn letters_before_last_line_are_ignored() {
        let text = "A와 B를 비교하면\n결론을 내릴 수 없다";
        match parse_answer(text) {
            Err(EvalError::ParseFailure { text: t }) => assert_eq!(t, text),
            other => panic!("expected ParseFailure, got {other:?}"),
        }
    }

    #[test]
    fn empty_output_fails() {
        assert!(matches!(parse_answer("   "), Err(EvalError::ParseFailure { .. })));
    }
}
