mod ids;
mod progress;
mod question;
mod score;
mod session;
mod topic;

pub use ids::{IdError, OptionValue, TopicId};
pub use progress::QuizProgress;
pub use question::{AnswerOption, Question, QuestionDraft, QuestionError};
pub use score::{PASSING_PERCENTAGE, QuestionReview, QuizScore, ScoreOutcome, rounded_percentage};
pub use session::{
    Answer, IgnoreReason, QUESTION_DURATION_SECS, QuizSession, QuizSessionError, SessionCommand,
    SessionStatus, Transition,
};
pub use topic::{Topic, TopicSummary};
