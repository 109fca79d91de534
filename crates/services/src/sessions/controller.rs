use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use quiz_core::model::{QUESTION_DURATION_SECS, QuizScore, QuizSession, Transition};
use quiz_core::time::elapsed_secs;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::Clock;
use crate::error::QuizError;
use super::timer::QuestionTimer;
use super::view::SessionSnapshot;

const EVENT_CAPACITY: usize = 64;

//
// ─── OPTIONS & EVENTS ──────────────────────────────────────────────────────────
//

/// Countdown settings for a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    pub question_secs: u32,
    /// Real time between two ticks.
    pub tick_period: Duration,
    /// When false nothing ticks on its own; the caller drives `tick()`.
    pub auto_tick: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            question_secs: QUESTION_DURATION_SECS,
            tick_period: Duration::from_secs(1),
            auto_tick: true,
        }
    }
}

/// Broadcast after every applied command, including ignored ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionEvent {
    pub transition: Transition,
    pub snapshot: SessionSnapshot,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

struct ControllerState {
    session: QuizSession,
    timer: QuestionTimer,
}

struct Shared {
    state: Mutex<ControllerState>,
    events: broadcast::Sender<SessionEvent>,
    clock: Clock,
    options: ControllerOptions,
    runtime: Handle,
    topic_title: String,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.timer.cancel();
    }
}

/// Owns one quiz session and its per-question countdown.
///
/// At most one timer task exists at a time. Moving to another question,
/// completing, or restarting cancels the running task before the new state is
/// visible, so a late tick can never act on the wrong question. Dropping the
/// controller stops the timer.
pub struct QuizController {
    shared: Arc<Shared>,
}

impl QuizController {
    /// Wrap a session and, with `auto_tick`, start its countdown on `runtime`.
    #[must_use]
    pub fn start(
        session: QuizSession,
        topic_title: impl Into<String>,
        clock: Clock,
        options: ControllerOptions,
        runtime: Handle,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let shared = Arc::new(Shared {
            state: Mutex::new(ControllerState {
                session,
                timer: QuestionTimer::default(),
            }),
            events,
            clock,
            options,
            runtime,
            topic_title: topic_title.into(),
        });

        {
            let mut state = shared.lock();
            rearm_timer(&shared, &mut state);
        }

        Self { shared }
    }

    /// Record an answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` if `value` is not an option of the current
    /// question. Recorded answers are unchanged in that case.
    pub fn select_answer(&self, value: &str) -> Result<Transition, QuizError> {
        let mut state = self.shared.lock();
        let transition = state.session.select_answer(value).inspect_err(|err| {
            tracing::warn!(topic = %state.session.topic_id(), %err, "rejected answer");
        })?;
        apply_side_effects(&self.shared, &mut state, &transition);
        Ok(transition)
    }

    /// Count down one second by hand. The automatic timer calls the same path.
    pub fn tick(&self) -> Transition {
        let mut state = self.shared.lock();
        let transition = state.session.tick(self.shared.clock.now());
        apply_side_effects(&self.shared, &mut state, &transition);
        transition
    }

    /// Submit the current answer. Ignored until something is selected.
    pub fn advance(&self) -> Transition {
        let mut state = self.shared.lock();
        let transition = state.session.advance(self.shared.clock.now());
        apply_side_effects(&self.shared, &mut state, &transition);
        transition
    }

    pub fn restart(&self) -> Transition {
        let mut state = self.shared.lock();
        let transition = state.session.restart(self.shared.clock.now());
        apply_side_effects(&self.shared, &mut state, &transition);
        transition
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.shared.lock();
        SessionSnapshot::from_session(&state.session, &self.shared.topic_title)
    }

    #[must_use]
    pub fn score(&self) -> Option<QuizScore> {
        self.shared.lock().session.score()
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    #[must_use]
    pub fn topic_title(&self) -> &str {
        &self.shared.topic_title
    }

    #[must_use]
    pub fn options(&self) -> ControllerOptions {
        self.shared.options
    }

    /// Whether a countdown task is currently scheduled.
    #[must_use]
    pub fn has_active_timer(&self) -> bool {
        self.shared.lock().timer.is_armed()
    }
}

impl fmt::Debug for QuizController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("QuizController")
            .field("session", &state.session)
            .field("options", &self.shared.options)
            .field("timer_armed", &state.timer.is_armed())
            .finish_non_exhaustive()
    }
}

//
// ─── TIMER PLUMBING ────────────────────────────────────────────────────────────
//

fn apply_side_effects(shared: &Arc<Shared>, state: &mut ControllerState, transition: &Transition) {
    if transition.moved_question() {
        rearm_timer(shared, state);
    }
    log_transition(state, transition);

    let event = SessionEvent {
        transition: transition.clone(),
        snapshot: SessionSnapshot::from_session(&state.session, &shared.topic_title),
    };
    // No subscribers is fine.
    let _ = shared.events.send(event);
}

/// Cancel the current countdown and, if the session still runs, start a fresh one.
fn rearm_timer(shared: &Arc<Shared>, state: &mut ControllerState) {
    if !shared.options.auto_tick || state.session.is_complete() {
        state.timer.cancel();
        return;
    }

    let weak = Arc::downgrade(shared);
    let period = shared.options.tick_period;
    let runtime = shared.runtime.clone();
    state
        .timer
        .arm(|epoch| runtime.spawn(run_countdown(weak, epoch, period)));
}

async fn run_countdown(shared: Weak<Shared>, epoch: u64, period: Duration) {
    let mut ticks = time::interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticks.tick().await;
        let Some(shared) = shared.upgrade() else {
            break;
        };
        if !timer_tick(&shared, epoch) {
            break;
        }
    }
}

/// Apply one timer tick. Returns false once this timer is stale or replaced.
fn timer_tick(shared: &Arc<Shared>, epoch: u64) -> bool {
    let mut state = shared.lock();
    if !state.timer.is_current(epoch) {
        return false;
    }
    let transition = state.session.tick(shared.clock.now());
    apply_side_effects(shared, &mut state, &transition);
    !transition.moved_question()
}

fn log_transition(state: &ControllerState, transition: &Transition) {
    let topic = state.session.topic_id();
    match transition {
        Transition::Ticked { seconds_remaining } => {
            tracing::trace!(%topic, seconds_remaining, "tick");
        }
        Transition::AnswerSelected { index } => {
            tracing::debug!(%topic, index, "answer selected");
        }
        Transition::Advanced {
            from,
            to,
            timed_out,
        } => {
            tracing::debug!(%topic, from, to, timed_out, "advanced to next question");
        }
        Transition::Completed { timed_out } => {
            if let Some(score) = state.session.score() {
                let took_secs = state
                    .session
                    .completed_at()
                    .map_or(0, |end| elapsed_secs(state.session.started_at(), end));
                tracing::info!(
                    %topic,
                    correct = score.correct,
                    total = score.total,
                    percentage = score.percentage,
                    took_secs,
                    timed_out,
                    "quiz completed"
                );
            }
        }
        Transition::Restarted => tracing::info!(%topic, "quiz restarted"),
        Transition::Ignored { reason } => {
            tracing::debug!(%topic, ?reason, "command ignored");
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
