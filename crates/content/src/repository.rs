use async_trait::async_trait;
use quiz_core::model::{IdError, QuestionError, Topic, TopicId, TopicSummary};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::catalog;

/// Errors surfaced by content sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("topic not found: {topic}")]
    NotFound { topic: String },

    #[error("topic {topic} is defined more than once")]
    DuplicateTopic { topic: String },

    #[error("invalid topic id {raw:?}: {source}")]
    InvalidTopic {
        raw: String,
        #[source]
        source: IdError,
    },

    #[error("topic {topic}, question {index}: {source}")]
    InvalidQuestion {
        topic: String,
        index: usize,
        #[source]
        source: QuestionError,
    },

    #[error("malformed content file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("content source unavailable: {0}")]
    Connection(String),
}

/// Read access to the topic catalog.
#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// List every topic in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the source cannot be read.
    async fn list_topics(&self) -> Result<Vec<TopicSummary>, ContentError>;

    /// Fetch a topic with its questions.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::NotFound` if no topic has this id.
    async fn get_topic(&self, id: &TopicId) -> Result<Topic, ContentError>;
}

/// Ordered in-memory catalog. Cloning shares the same topics.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    topics: Arc<Mutex<Vec<Topic>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from topics, refusing duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::DuplicateTopic` when two topics share an id.
    pub fn from_topics(topics: Vec<Topic>) -> Result<Self, ContentError> {
        for (i, topic) in topics.iter().enumerate() {
            if topics[..i].iter().any(|t| t.id() == topic.id()) {
                return Err(ContentError::DuplicateTopic {
                    topic: topic.id().to_string(),
                });
            }
        }
        Ok(Self {
            topics: Arc::new(Mutex::new(topics)),
        })
    }

    /// Replace the topic with the same id, or append it.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Connection` if the lock is poisoned.
    pub fn upsert_topic(&self, topic: Topic) -> Result<(), ContentError> {
        let mut guard = self
            .topics
            .lock()
            .map_err(|e| ContentError::Connection(e.to_string()))?;
        match guard.iter_mut().find(|t| t.id() == topic.id()) {
            Some(existing) => *existing = topic,
            None => guard.push(topic),
        }
        Ok(())
    }
}

#[async_trait]
impl TopicRepository for InMemoryRepository {
    async fn list_topics(&self) -> Result<Vec<TopicSummary>, ContentError> {
        let guard = self
            .topics
            .lock()
            .map_err(|e| ContentError::Connection(e.to_string()))?;
        Ok(guard.iter().map(Topic::summary).collect())
    }

    async fn get_topic(&self, id: &TopicId) -> Result<Topic, ContentError> {
        let guard = self
            .topics
            .lock()
            .map_err(|e| ContentError::Connection(e.to_string()))?;
        guard
            .iter()
            .find(|t| t.id() == id)
            .cloned()
            .ok_or_else(|| ContentError::NotFound {
                topic: id.to_string(),
            })
    }
}

/// Topic source behind a trait object so callers can swap backends.
#[derive(Clone)]
pub struct Content {
    pub topics: Arc<dyn TopicRepository>,
}

impl Content {
    /// The catalog compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the embedded catalog fails validation.
    pub fn builtin() -> Result<Self, ContentError> {
        let topics = catalog::parse_catalog(catalog::BUILTIN_CATALOG)?;
        Self::from_topics(topics)
    }

    /// A catalog read from a JSON content file.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Io` if the file cannot be read, or a parse or
    /// validation error for its contents.
    pub fn from_path(path: &Path) -> Result<Self, ContentError> {
        let topics = catalog::load_path(path)?;
        Self::from_topics(topics)
    }

    /// # Errors
    ///
    /// Returns `ContentError::DuplicateTopic` when two topics share an id.
    pub fn from_topics(topics: Vec<Topic>) -> Result<Self, ContentError> {
        let repo = InMemoryRepository::from_topics(topics)?;
        Ok(Self {
            topics: Arc::new(repo),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerOption, QuestionDraft};

    fn build_topic(id: &str, questions: usize) -> Topic {
        let questions = (0..questions)
            .map(|i| {
                QuestionDraft {
                    prompt: format!("Q{i}"),
                    options: vec![AnswerOption::new("x", "X"), AnswerOption::new("y", "Y")],
                    correct_answer: "x".into(),
                    feedback: String::new(),
                }
                .validate()
                .unwrap()
            })
            .collect();
        Topic::new(TopicId::new(id).unwrap(), None, None, questions)
    }

    #[tokio::test]
    async fn lists_topics_in_insertion_order() {
        let repo =
            InMemoryRepository::from_topics(vec![build_topic("zoology", 1), build_topic("art", 2)])
                .unwrap();
        let listed = repo.list_topics().await.unwrap();
        let ids: Vec<_> = listed.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["zoology", "art"]);
        assert_eq!(listed[1].question_count, 2);
    }

    #[tokio::test]
    async fn missing_topic_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo
            .get_topic(&TopicId::new("nope").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::NotFound { topic } if topic == "nope"));
    }

    #[tokio::test]
    async fn upsert_replaces_existing_topic() {
        let repo = InMemoryRepository::from_topics(vec![build_topic("art", 1)]).unwrap();
        repo.upsert_topic(build_topic("art", 3)).unwrap();
        repo.upsert_topic(build_topic("music", 0)).unwrap();

        let art = repo.get_topic(&TopicId::new("art").unwrap()).await.unwrap();
        assert_eq!(art.len(), 3);
        assert_eq!(repo.list_topics().await.unwrap().len(), 2);
    }

    #[test]
    fn duplicate_ids_are_refused() {
        let err =
            InMemoryRepository::from_topics(vec![build_topic("art", 1), build_topic("ART", 1)])
                .err()
                .unwrap();
        assert!(matches!(err, ContentError::DuplicateTopic { topic } if topic == "art"));
    }
}
