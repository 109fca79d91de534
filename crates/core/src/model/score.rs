use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::ids::OptionValue;
use crate::model::question::Question;
use crate::model::session::Answer;

/// Scores below this percentage are failing.
pub const PASSING_PERCENTAGE: u8 = 60;

/// Coarse classification of a finished quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreOutcome {
    Perfect,
    Passed,
    Failed,
}

/// How a single question went, for the review screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionReview {
    pub index: usize,
    pub prompt: String,
    /// `None` only if the question was never reached.
    pub answer: Option<Answer>,
    pub selected_label: Option<String>,
    pub correct_value: OptionValue,
    pub correct_label: String,
    pub is_correct: bool,
    pub feedback: String,
}

impl QuestionReview {
    /// Human-readable description of what was answered.
    #[must_use]
    pub fn answer_text(&self) -> &str {
        match (&self.answer, &self.selected_label) {
            (Some(Answer::Unanswered), _) => "Time expired - No answer",
            (Some(Answer::Selected(_)), Some(label)) => label.as_str(),
            _ => "Not answered",
        }
    }
}

/// Final score of a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,
    pub percentage: u8,
    pub reviews: Vec<QuestionReview>,
}

impl QuizScore {
    /// Score `answers` against the questions' correct values.
    #[must_use]
    pub fn compute(questions: &[Question], answers: &BTreeMap<usize, Answer>) -> Self {
        let reviews: Vec<QuestionReview> = questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let answer = answers.get(&index).cloned();
                let selected = answer.as_ref().and_then(Answer::selected);
                let is_correct = selected.is_some_and(|value| question.is_correct(value.as_str()));
                QuestionReview {
                    index,
                    prompt: question.prompt().to_owned(),
                    selected_label: selected
                        .and_then(|value| question.label_for(value.as_str()))
                        .map(str::to_owned),
                    answer,
                    correct_value: question.correct_answer().clone(),
                    correct_label: question.correct_label().to_owned(),
                    is_correct,
                    feedback: question.feedback().to_owned(),
                }
            })
            .collect();

        let correct = reviews.iter().filter(|r| r.is_correct).count();
        let total = questions.len();

        Self {
            correct,
            total,
            percentage: rounded_percentage(correct, total),
            reviews,
        }
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.correct == self.total
    }

    #[must_use]
    pub fn is_failing(&self) -> bool {
        self.percentage < PASSING_PERCENTAGE
    }

    #[must_use]
    pub fn outcome(&self) -> ScoreOutcome {
        if self.is_perfect() {
            ScoreOutcome::Perfect
        } else if self.is_failing() {
            ScoreOutcome::Failed
        } else {
            ScoreOutcome::Passed
        }
    }
}

/// `round(100 * part / whole)` with halves rounded up.
#[must_use]
pub fn rounded_percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole);
    let pct = (part * 200 + whole) / (whole * 2);
    u8::try_from(pct).unwrap_or(100)
}
