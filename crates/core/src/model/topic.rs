use serde::Serialize;
use std::sync::Arc;

use crate::model::ids::TopicId;
use crate::model::question::Question;

/// A named, ordered list of questions.
///
/// Questions are shared behind an `Arc` so sessions and repositories can hold
/// the same list without copying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    id: TopicId,
    title: String,
    description: Option<String>,
    questions: Arc<[Question]>,
}

impl Topic {
    /// Build a topic. A missing or blank title falls back to the capitalized id.
    #[must_use]
    pub fn new(
        id: TopicId,
        title: Option<String>,
        description: Option<String>,
        questions: Vec<Question>,
    ) -> Self {
        let title = title
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| id.default_title());
        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        Self {
            id,
            title,
            description,
            questions: questions.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &TopicId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn shared_questions(&self) -> Arc<[Question]> {
        Arc::clone(&self.questions)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> TopicSummary {
        TopicSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            question_count: self.questions.len(),
        }
    }
}

/// Listing entry for a topic, without its questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicSummary {
    pub id: TopicId,
    pub title: String,
    pub description: Option<String>,
    pub question_count: usize,
}
