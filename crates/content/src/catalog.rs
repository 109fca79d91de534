//! JSON content files and the built-in topic catalog.
//!
//! File layout:
//!
//! ```json
//! { "topics": [ { "id": "science", "title": "Science", "description": "...",
//!     "questions": [ { "question": "...", "options": [{ "value": "au", "label": "Au" }],
//!                      "correctAnswer": "au", "feedback": "..." } ] } ] }
//! ```

use quiz_core::model::{AnswerOption, QuestionDraft, Topic, TopicId};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::repository::ContentError;

/// Catalog shipped with the application.
pub const BUILTIN_CATALOG: &str = include_str!("../data/topics.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFile {
    pub topics: Vec<TopicRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub question: String,
    pub options: Vec<AnswerOption>,
    pub correct_answer: String,
    #[serde(default)]
    pub feedback: String,
}

impl TopicRecord {
    /// Validate the record into a domain `Topic`.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::InvalidTopic` for a bad id and
    /// `ContentError::InvalidQuestion` for the first question that fails validation.
    pub fn into_topic(self) -> Result<Topic, ContentError> {
        let id = TopicId::new(&self.id).map_err(|source| ContentError::InvalidTopic {
            raw: self.id.clone(),
            source,
        })?;

        let questions = self
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                record
                    .into_draft()
                    .validate()
                    .map_err(|source| ContentError::InvalidQuestion {
                        topic: id.to_string(),
                        index,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Topic::new(id, self.title, self.description, questions))
    }

    #[must_use]
    pub fn from_topic(topic: &Topic) -> Self {
        Self {
            id: topic.id().to_string(),
            title: Some(topic.title().to_owned()),
            description: topic.description().map(str::to_owned),
            questions: topic
                .questions()
                .iter()
                .map(|q| QuestionRecord {
                    question: q.prompt().to_owned(),
                    options: q.options().to_vec(),
                    correct_answer: q.correct_answer().to_string(),
                    feedback: q.feedback().to_owned(),
                })
                .collect(),
        }
    }
}

impl QuestionRecord {
    #[must_use]
    pub fn into_draft(self) -> QuestionDraft {
        QuestionDraft {
            prompt: self.question,
            options: self.options,
            correct_answer: self.correct_answer.into(),
            feedback: self.feedback,
        }
    }
}

/// Parse and validate a JSON catalog.
///
/// Topics without questions are accepted here; starting a session on one fails.
///
/// # Errors
///
/// Returns `ContentError::Json` for malformed input and validation errors for
/// bad ids or questions.
pub fn parse_catalog(raw: &str) -> Result<Vec<Topic>, ContentError> {
    let file: ContentFile = serde_json::from_str(raw)?;
    let topics = file
        .topics
        .into_iter()
        .map(TopicRecord::into_topic)
        .collect::<Result<Vec<_>, _>>()?;

    let empty = topics.iter().filter(|t| t.is_empty()).count();
    if empty > 0 {
        tracing::warn!(empty, "catalog contains topics without questions");
    }
    tracing::debug!(topics = topics.len(), "parsed topic catalog");
    Ok(topics)
}

/// Read a catalog from disk.
///
/// # Errors
///
/// Returns `ContentError::Io` if the file cannot be read, otherwise see `parse_catalog`.
pub fn load_path(path: &Path) -> Result<Vec<Topic>, ContentError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "loading topic catalog");
    parse_catalog(&raw)
}

/// Serialize topics back into the content file format.
///
/// # Errors
///
/// Returns `ContentError::Json` if serialization fails.
pub fn to_json(topics: &[Topic]) -> Result<String, ContentError> {
    let file = ContentFile {
        topics: topics.iter().map(TopicRecord::from_topic).collect(),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionError;

    #[test]
    fn builtin_catalog_has_four_topics_of_five() {
        let topics = parse_catalog(BUILTIN_CATALOG).unwrap();
        let ids: Vec<_> = topics.iter().map(|t| t.id().as_str()).collect();
        assert_eq!(ids, ["science", "history", "programming", "general"]);
        assert!(topics.iter().all(|t| t.len() == 5));
        assert_eq!(topics[3].title(), "General Knowledge");
    }

    #[test]
    fn missing_title_uses_capitalized_id() {
        let raw = r#"{ "topics": [ { "id": "music", "questions": [] } ] }"#;
        let topics = parse_catalog(raw).unwrap();
        assert_eq!(topics[0].title(), "Music");
        assert!(topics[0].is_empty());
    }

    #[test]
    fn invalid_question_reports_topic_and_index() {
        let raw = r#"{ "topics": [ { "id": "art", "questions": [
            { "question": "Q1", "options": [{ "value": "a", "label": "A" }], "correctAnswer": "a" },
            { "question": "Q2", "options": [{ "value": "a", "label": "A" }], "correctAnswer": "b" }
        ] } ] }"#;
        let err = parse_catalog(raw).unwrap_err();
        match err {
            ContentError::InvalidQuestion {
                topic,
                index,
                source,
            } => {
                assert_eq!(topic, "art");
                assert_eq!(index, 1);
                assert!(matches!(source, QuestionError::CorrectAnswerMissing { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_topic_id_is_reported() {
        let raw = r#"{ "topics": [ { "id": "  ", "questions": [] } ] }"#;
        assert!(matches!(
            parse_catalog(raw),
            Err(ContentError::InvalidTopic { .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(
            parse_catalog("{ \"topics\": "),
            Err(ContentError::Json(_))
        ));
    }

    #[test]
    fn exported_catalog_parses_back_unchanged() {
        let topics = parse_catalog(BUILTIN_CATALOG).unwrap();
        let json = to_json(&topics).unwrap();
        assert_eq!(parse_catalog(&json).unwrap(), topics);
    }
}
