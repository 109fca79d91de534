use std::sync::Arc;
use std::time::Duration;

use content::{ContentError, TopicRepository};
use quiz_core::model::{QuizSession, QuizSessionError, TopicId, TopicSummary};
use tokio::runtime::Handle;

use crate::Clock;
use crate::error::QuizError;
use super::controller::{ControllerOptions, QuizController};

/// Starts quiz sessions from the topic catalog.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    topics: Arc<dyn TopicRepository>,
    options: ControllerOptions,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, topics: Arc<dyn TopicRepository>) -> Self {
        Self {
            clock,
            topics,
            options: ControllerOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ControllerOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_question_secs(mut self, question_secs: u32) -> Self {
        self.options.question_secs = question_secs;
        self
    }

    #[must_use]
    pub fn with_tick_period(mut self, tick_period: Duration) -> Self {
        self.options.tick_period = tick_period;
        self
    }

    /// Disable the background countdown; callers drive `QuizController::tick`.
    #[must_use]
    pub fn with_auto_tick(mut self, auto_tick: bool) -> Self {
        self.options.auto_tick = auto_tick;
        self
    }

    #[must_use]
    pub fn options(&self) -> ControllerOptions {
        self.options
    }

    /// List topics in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Content` if the catalog cannot be read.
    pub async fn list_topics(&self) -> Result<Vec<TopicSummary>, QuizError> {
        Ok(self.topics.list_topics().await?)
    }

    /// Start a timed session for the topic named `topic`.
    ///
    /// Topic names are matched case-insensitively. Must be called within a
    /// Tokio runtime, which drives the question countdown.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::UnknownTopic` if the name is malformed, not in the
    /// catalog, or the topic has no questions.
    /// Returns `QuizError::NoRuntime` outside a Tokio runtime.
    /// Returns `QuizError::Content` for other catalog failures.
    pub async fn start(&self, topic: &str) -> Result<QuizController, QuizError> {
        let unknown = || QuizError::UnknownTopic {
            topic: topic.to_owned(),
        };

        let id = TopicId::new(topic).map_err(|_| unknown())?;
        let found = match self.topics.get_topic(&id).await {
            Ok(found) => found,
            Err(ContentError::NotFound { .. }) => return Err(unknown()),
            Err(err) => return Err(err.into()),
        };

        let runtime = Handle::try_current().map_err(|_| QuizError::NoRuntime)?;
        let session =
            match QuizSession::with_duration(&found, self.options.question_secs, self.clock.now()) {
                Ok(session) => session,
                Err(QuizSessionError::NoQuestions) => {
                    tracing::warn!(topic = %id, "topic has no questions");
                    return Err(unknown());
                }
                Err(err) => return Err(err.into()),
            };

        tracing::info!(
            topic = %id,
            questions = session.len(),
            question_secs = session.question_secs(),
            auto_tick = self.options.auto_tick,
            "quiz started"
        );
        Ok(QuizController::start(
            session,
            found.title(),
            self.clock,
            self.options,
            runtime,
        ))
    }
}
