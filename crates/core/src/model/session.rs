use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::model::ids::{OptionValue, TopicId};
use crate::model::progress::QuizProgress;
use crate::model::question::Question;
use crate::model::score::QuizScore;
use crate::model::topic::Topic;

/// Seconds allowed per question unless configured otherwise.
pub const QUESTION_DURATION_SECS: u32 = 60;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("topic has no questions")]
    NoQuestions,

    #[error("question duration must be at least one second")]
    ZeroDuration,

    #[error("{value:?} is not an option of question {index}")]
    InvalidOption { index: usize, value: String },
}

//
// ─── ANSWERS & STATUS ─────────────────────────────────────────────────────────
//

/// What was recorded for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    Selected(OptionValue),
    /// The countdown ran out before anything was selected.
    Unanswered,
}

impl Answer {
    #[must_use]
    pub fn selected(&self) -> Option<&OptionValue> {
        match self {
            Answer::Selected(value) => Some(value),
            Answer::Unanswered => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

/// Why a command left the session untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// The session already finished; late events are expected from timer races.
    Completed,
    /// Explicit advance requires an answer for the current question.
    AwaitingAnswer,
}

/// Outcome of applying a command to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transition {
    Ignored { reason: IgnoreReason },
    AnswerSelected { index: usize },
    Ticked { seconds_remaining: u32 },
    Advanced { from: usize, to: usize, timed_out: bool },
    Completed { timed_out: bool },
    Restarted,
}

impl Transition {
    /// True when the current question changed, so any running countdown is stale.
    #[must_use]
    pub fn moved_question(&self) -> bool {
        matches!(
            self,
            Transition::Advanced { .. } | Transition::Completed { .. } | Transition::Restarted
        )
    }

    #[must_use]
    pub fn is_ignored(&self) -> bool {
        matches!(self, Transition::Ignored { .. })
    }
}

/// Commands accepted by `QuizSession::apply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SessionCommand {
    SelectAnswer(String),
    Tick,
    Advance,
    Restart,
}

//
// ─── SESSION ──────────────────────────────────────────────────────────────────
//

/// State of one quiz run over a topic.
///
/// All transitions are synchronous and deterministic; callers pass timestamps
/// in from their clock. Once completed, `current_index() == len()` and only
/// `restart` changes anything.
#[derive(Clone)]
pub struct QuizSession {
    topic_id: TopicId,
    questions: Arc<[Question]>,
    question_secs: u32,
    current: usize,
    answers: BTreeMap<usize, Answer>,
    seconds_remaining: u32,
    completed_count: usize,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Start a session over the topic with the default 60 second countdown.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::NoQuestions` if the topic is empty.
    pub fn new(topic: &Topic, started_at: DateTime<Utc>) -> Result<Self, QuizSessionError> {
        Self::with_duration(topic, QUESTION_DURATION_SECS, started_at)
    }

    /// Start a session with a custom per-question countdown.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::NoQuestions` if the topic is empty and
    /// `QuizSessionError::ZeroDuration` if `question_secs` is zero.
    pub fn with_duration(
        topic: &Topic,
        question_secs: u32,
        started_at: DateTime<Utc>,
    ) -> Result<Self, QuizSessionError> {
        if topic.is_empty() {
            return Err(QuizSessionError::NoQuestions);
        }
        if question_secs == 0 {
            return Err(QuizSessionError::ZeroDuration);
        }

        Ok(Self {
            topic_id: topic.id().clone(),
            questions: topic.shared_questions(),
            question_secs,
            current: 0,
            answers: BTreeMap::new(),
            seconds_remaining: question_secs,
            completed_count: 0,
            started_at,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn topic_id(&self) -> &TopicId {
        &self.topic_id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false; empty sessions cannot be built.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn question_secs(&self) -> u32 {
        self.question_secs
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<usize, Answer> {
        &self.answers
    }

    #[must_use]
    pub fn answer_for(&self, index: usize) -> Option<&Answer> {
        self.answers.get(&index)
    }

    /// Selected value for the current question, if any.
    #[must_use]
    pub fn current_selection(&self) -> Option<&OptionValue> {
        self.answer_for(self.current).and_then(Answer::selected)
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        if self.is_complete() {
            SessionStatus::Completed
        } else {
            SessionStatus::InProgress
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        !self.is_complete() && self.current + 1 == self.questions.len()
    }

    /// Whether an explicit advance would be accepted right now.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        !self.is_complete() && self.answers.contains_key(&self.current)
    }

    /// Questions fully answered or timed out, over the total.
    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress::new(self.completed_count, self.questions.len())
    }

    /// Score of a completed session; `None` while in progress.
    #[must_use]
    pub fn score(&self) -> Option<QuizScore> {
        if self.is_complete() {
            Some(QuizScore::compute(&self.questions, &self.answers))
        } else {
            None
        }
    }

    /// Record (or replace) the answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::InvalidOption` if `value` is not one of the
    /// current question's options; recorded answers are left untouched.
    pub fn select_answer(&mut self, value: &str) -> Result<Transition, QuizSessionError> {
        let Some(question) = self.current_question() else {
            return Ok(Transition::Ignored {
                reason: IgnoreReason::Completed,
            });
        };
        let Some(option) = question.option(value) else {
            return Err(QuizSessionError::InvalidOption {
                index: self.current,
                value: value.to_owned(),
            });
        };

        let selected = Answer::Selected(option.value.clone());
        self.answers.insert(self.current, selected);
        Ok(Transition::AnswerSelected {
            index: self.current,
        })
    }

    /// One second elapsed on the current question's countdown.
    ///
    /// At zero an unanswered question is marked `Answer::Unanswered` and the
    /// session advances.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Transition {
        if self.is_complete() {
            return Transition::Ignored {
                reason: IgnoreReason::Completed,
            };
        }

        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining > 0 {
            return Transition::Ticked {
                seconds_remaining: self.seconds_remaining,
            };
        }

        self.answers
            .entry(self.current)
            .or_insert(Answer::Unanswered);
        self.move_next(now, true)
    }

    /// Submit the current answer and move on.
    ///
    /// Ignored when the session is complete or nothing has been selected yet.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Transition {
        if self.is_complete() {
            return Transition::Ignored {
                reason: IgnoreReason::Completed,
            };
        }
        if !self.answers.contains_key(&self.current) {
            return Transition::Ignored {
                reason: IgnoreReason::AwaitingAnswer,
            };
        }
        self.move_next(now, false)
    }

    /// Reset to the first question with no answers.
    pub fn restart(&mut self, now: DateTime<Utc>) -> Transition {
        self.current = 0;
        self.answers.clear();
        self.seconds_remaining = self.question_secs;
        self.completed_count = 0;
        self.started_at = now;
        self.completed_at = None;
        Transition::Restarted
    }

    /// Dispatch a command.
    ///
    /// # Errors
    ///
    /// Propagates `QuizSessionError::InvalidOption` from `select_answer`.
    pub fn apply(
        &mut self,
        command: SessionCommand,
        now: DateTime<Utc>,
    ) -> Result<Transition, QuizSessionError> {
        match command {
            SessionCommand::SelectAnswer(value) => self.select_answer(&value),
            SessionCommand::Tick => Ok(self.tick(now)),
            SessionCommand::Advance => Ok(self.advance(now)),
            SessionCommand::Restart => Ok(self.restart(now)),
        }
    }

    fn move_next(&mut self, now: DateTime<Utc>, timed_out: bool) -> Transition {
        self.completed_count += 1;
        let from = self.current;

        if from + 1 < self.questions.len() {
            self.current = from + 1;
            self.seconds_remaining = self.question_secs;
            Transition::Advanced {
                from,
                to: self.current,
                timed_out,
            }
        } else {
            self.current = self.questions.len();
            self.seconds_remaining = 0;
            self.completed_at = Some(now);
            Transition::Completed { timed_out }
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("topic_id", &self.topic_id)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answers_len", &self.answers.len())
            .field("seconds_remaining", &self.seconds_remaining)
            .field("completed_count", &self.completed_count)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
