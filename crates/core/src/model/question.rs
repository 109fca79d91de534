use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::OptionValue;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question has no options")]
    NoOptions,

    #[error("option at position {position} has an empty value")]
    EmptyOptionValue { position: usize },

    #[error("option value {value:?} appears more than once")]
    DuplicateOption { value: String },

    #[error("correct answer {value:?} is not one of the options")]
    CorrectAnswerMissing { value: String },
}

//
// ─── OPTIONS ──────────────────────────────────────────────────────────────────
//

/// One selectable answer: an opaque value plus the label shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub value: OptionValue,
    pub label: String,
}

impl AnswerOption {
    #[must_use]
    pub fn new(value: impl Into<OptionValue>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// Unvalidated question input, as read from a content file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub prompt: String,
    pub options: Vec<AnswerOption>,
    pub correct_answer: OptionValue,
    pub feedback: String,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// Empty option values are refused so no option can be confused with an
    /// unanswered question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, there are no options, an
    /// option value is empty or duplicated, or the correct answer is not an option.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let prompt = self.prompt.trim().to_owned();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if self.options.is_empty() {
            return Err(QuestionError::NoOptions);
        }

        let mut seen = HashSet::with_capacity(self.options.len());
        for (position, option) in self.options.iter().enumerate() {
            if option.value.is_empty() {
                return Err(QuestionError::EmptyOptionValue { position });
            }
            if !seen.insert(option.value.as_str()) {
                return Err(QuestionError::DuplicateOption {
                    value: option.value.as_str().to_owned(),
                });
            }
        }

        if !seen.contains(self.correct_answer.as_str()) {
            return Err(QuestionError::CorrectAnswerMissing {
                value: self.correct_answer.as_str().to_owned(),
            });
        }

        Ok(Question {
            prompt,
            options: self.options,
            correct_answer: self.correct_answer,
            feedback: self.feedback.trim().to_owned(),
        })
    }
}

/// A validated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    prompt: String,
    options: Vec<AnswerOption>,
    correct_answer: OptionValue,
    feedback: String,
}

impl Question {
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &OptionValue {
        &self.correct_answer
    }

    #[must_use]
    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    /// Looks up an option by its value.
    #[must_use]
    pub fn option(&self, value: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|opt| opt.value.as_str() == value)
    }

    #[must_use]
    pub fn label_for(&self, value: &str) -> Option<&str> {
        self.option(value).map(|opt| opt.label.as_str())
    }

    #[must_use]
    pub fn correct_label(&self) -> &str {
        self.label_for(self.correct_answer.as_str())
            .unwrap_or(self.correct_answer.as_str())
    }

    #[must_use]
    pub fn is_correct(&self, value: &str) -> bool {
        self.correct_answer.as_str() == value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft {
            prompt: "What is the chemical symbol for gold?".into(),
            options: vec![
                AnswerOption::new("au", "Au"),
                AnswerOption::new("ag", "Ag"),
                AnswerOption::new("fe", "Fe"),
            ],
            correct_answer: "au".into(),
            feedback: "Gold is Au, from the Latin 'aurum'.".into(),
        }
    }

    #[test]
    fn validates_well_formed_question() {
        let question = draft().validate().unwrap();
        assert_eq!(question.options().len(), 3);
        assert_eq!(question.correct_label(), "Au");
        assert_eq!(question.label_for("fe"), Some("Fe"));
        assert!(question.is_correct("au"));
        assert!(!question.is_correct("ag"));
    }

    #[test]
    fn rejects_blank_prompt() {
        let mut d = draft();
        d.prompt = "   ".into();
        assert_eq!(d.validate().unwrap_err(), QuestionError::EmptyPrompt);
    }

    #[test]
    fn rejects_missing_options() {
        let mut d = draft();
        d.options.clear();
        assert_eq!(d.validate().unwrap_err(), QuestionError::NoOptions);
    }

    #[test]
    fn rejects_empty_option_value() {
        let mut d = draft();
        d.options.push(AnswerOption::new("", "Nothing"));
        assert_eq!(
            d.validate().unwrap_err(),
            QuestionError::EmptyOptionValue { position: 3 }
        );
    }

    #[test]
    fn rejects_duplicate_option_value() {
        let mut d = draft();
        d.options.push(AnswerOption::new("ag", "Silver again"));
        assert!(matches!(
            d.validate(),
            Err(QuestionError::DuplicateOption { value }) if value == "ag"
        ));
    }

    #[test]
    fn rejects_correct_answer_outside_options() {
        let mut d = draft();
        d.correct_answer = "pb".into();
        assert!(matches!(
            d.validate(),
            Err(QuestionError::CorrectAnswerMissing { .. })
        ));
    }
}
