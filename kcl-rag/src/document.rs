//! Data types for question records, indexed documents, and retrieval hits.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::label::{AnswerLetter, normalize_label};

/// One multiple-choice question as stored in a dataset row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionRecord {
    /// The question stem.
    pub question: String,
    /// Option A.
    #[serde(rename = "A")]
    pub a: String,
    /// Option B.
    #[serde(rename = "B")]
    pub b: String,
    /// Option C.
    #[serde(rename = "C")]
    pub c: String,
    /// Option D.
    #[serde(rename = "D")]
    pub d: String,
    /// The gold answer as written in the dataset (`"1"`..`"4"` or a letter).
    pub answer: String,
}

impl QuestionRecord {
    /// The four option texts in letter order.
    pub fn options(&self) -> [(AnswerLetter, &str); 4] {
        [
            (AnswerLetter::A, self.a.as_str()),
            (AnswerLetter::B, self.b.as_str()),
            (AnswerLetter::C, self.c.as_str()),
            (AnswerLetter::D, self.d.as_str()),
        ]
    }

    /// The canonical gold letter.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidLabel`](crate::RagError::InvalidLabel) if the
    /// raw answer is not recognized.
    pub fn gold(&self) -> Result<AnswerLetter> {
        normalize_label(&self.answer)
    }

    /// Render the text that gets embedded for this record.
    ///
    /// The answer is left out so the label never leaks into retrieval.
    pub fn document_text(&self) -> String {
        let mut text = format!("질문: {}\n선택지:\n", self.question.trim());
        for (letter, option) in self.options() {
            text.push_str(&format!("{letter}) {}\n", option.trim()));
        }
        text
    }

    /// Render the question and its lettered options as shown to the model.
    pub fn question_block(&self) -> String {
        let mut block = self.question.clone();
        for (letter, option) in self.options() {
            block.push_str(&format!("\n{letter}) {option}"));
        }
        block
    }
}

/// A retrieved training document paired with its cosine distance to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalHit {
    /// The document text.
    pub text: String,
    /// Cosine distance (lower is more similar).
    pub distance: f32,
}
