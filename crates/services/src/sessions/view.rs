use chrono::{DateTime, Utc};
use serde::Serialize;

use quiz_core::model::{
    AnswerOption, OptionValue, QuizProgress, QuizScore, QuizSession, SessionStatus, TopicId,
};

/// At or below this many seconds the countdown is flagged as running low.
pub const RUNNING_LOW_SECS: u32 = 10;

/// The question on screen, without its correct answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
    pub selected: Option<OptionValue>,
}

/// Presentation-agnostic projection of a session.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no rendering decisions beyond the `running_low` flag
///
/// Once completed, `question` is `None` and `score` carries the review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub topic_id: TopicId,
    pub topic_title: String,
    pub status: SessionStatus,
    /// 1-based number of the question on screen, capped at the total.
    pub question_number: usize,
    pub total_questions: usize,
    pub question: Option<QuestionView>,
    pub seconds_remaining: u32,
    pub question_secs: u32,
    pub running_low: bool,
    pub progress: QuizProgress,
    pub is_last_question: bool,
    pub can_advance: bool,
    pub score: Option<QuizScore>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn from_session(session: &QuizSession, topic_title: &str) -> Self {
        let question = session.current_question().map(|q| QuestionView {
            index: session.current_index(),
            prompt: q.prompt().to_owned(),
            options: q.options().to_vec(),
            selected: session.current_selection().cloned(),
        });
        let in_progress = session.status() == SessionStatus::InProgress;

        Self {
            topic_id: session.topic_id().clone(),
            topic_title: topic_title.to_owned(),
            status: session.status(),
            question_number: (session.current_index() + 1).min(session.len()),
            total_questions: session.len(),
            question,
            seconds_remaining: session.seconds_remaining(),
            question_secs: session.question_secs(),
            running_low: in_progress && session.seconds_remaining() <= RUNNING_LOW_SECS,
            progress: session.progress(),
            is_last_question: session.is_last_question(),
            can_advance: session.can_advance(),
            score: session.score(),
            started_at: session.started_at(),
            completed_at: session.completed_at(),
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionDraft, Topic};
    use quiz_core::time::fixed_now;

    fn build_session() -> QuizSession {
        let questions = (0..2)
            .map(|i| {
                QuestionDraft {
                    prompt: format!("Q{i}"),
                    options: vec![AnswerOption::new("a", "A"), AnswerOption::new("b", "B")],
                    correct_answer: "a".into(),
                    feedback: String::new(),
                }
                .validate()
                .unwrap()
            })
            .collect();
        let topic = Topic::new(TopicId::new("science").unwrap(), None, None, questions);
        QuizSession::new(&topic, fixed_now()).unwrap()
    }

    #[test]
    fn snapshot_tracks_question_and_selection() {
        let mut session = build_session();
        session.select_answer("b").unwrap();

        let snapshot = SessionSnapshot::from_session(&session, "Science");
        assert_eq!(snapshot.question_number, 1);
        assert_eq!(snapshot.total_questions, 2);
        let question = snapshot.question.unwrap();
        assert_eq!(question.prompt, "Q0");
        assert_eq!(question.selected, Some(OptionValue::new("b")));
        assert!(snapshot.can_advance);
        assert!(!snapshot.running_low);
        assert!(snapshot.score.is_none());
    }

    #[test]
    fn snapshot_flags_low_time() {
        let mut session = build_session();
        for _ in 0..50 {
            session.tick(fixed_now());
        }
        let snapshot = SessionSnapshot::from_session(&session, "Science");
        assert_eq!(snapshot.seconds_remaining, 10);
        assert!(snapshot.running_low);
    }

    #[test]
    fn completed_snapshot_has_score_and_no_question() {
        let mut session = build_session();
        session.select_answer("a").unwrap();
        session.advance(fixed_now());
        session.select_answer("a").unwrap();
        session.advance(fixed_now());

        let snapshot = SessionSnapshot::from_session(&session, "Science");
        assert!(snapshot.is_complete());
        assert!(snapshot.question.is_none());
        assert_eq!(snapshot.question_number, 2);
        assert!(!snapshot.running_low);
        assert!(snapshot.score.unwrap().is_perfect());
    }

    #[test]
    fn snapshot_serializes_for_external_renderers() {
        let snapshot = SessionSnapshot::from_session(&build_session(), "Science");
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["topic_id"], "science");
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["seconds_remaining"], 60);
    }
}
