mod controller;
mod timer;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::QuizError;
pub use controller::{ControllerOptions, QuizController, SessionEvent};
pub use view::{QuestionView, RUNNING_LOW_SECS, SessionSnapshot};
pub use workflow::QuizLoopService;
