#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use error::QuizError;

pub use sessions::{
    ControllerOptions, QuestionView, QuizController, QuizLoopService, RUNNING_LOW_SECS,
    SessionEvent, SessionSnapshot,
};
