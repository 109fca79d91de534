//! Plain-text screens for the terminal front-end.
//!
//! Everything here is a pure function of snapshots so it can be tested
//! without a terminal.

use std::fmt::Write as _;

use quiz_core::model::{IgnoreReason, QuizScore, ScoreOutcome, TopicSummary, Transition};
use quiz_core::time::elapsed_secs;
use services::{SessionEvent, SessionSnapshot};

const BAR_WIDTH: usize = 20;

pub fn topic_list(topics: &[TopicSummary]) -> String {
    let mut out = String::from("Available topics:\n");
    for (i, topic) in topics.iter().enumerate() {
        let _ = write!(
            out,
            "  {}. {} ({}, {} questions)",
            i + 1,
            topic.title,
            topic.id,
            topic.question_count
        );
        if let Some(description) = &topic.description {
            let _ = write!(out, " - {description}");
        }
        out.push('\n');
    }
    out
}

pub fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

pub fn question_screen(snapshot: &SessionSnapshot) -> String {
    let Some(question) = &snapshot.question else {
        return results(snapshot);
    };

    let mut out = String::new();
    let _ = writeln!(out, "\n{} Quiz", snapshot.topic_title);
    let _ = writeln!(
        out,
        "Question {} of {}  {} {}%",
        snapshot.question_number,
        snapshot.total_questions,
        progress_bar(snapshot.progress.percent()),
        snapshot.progress.percent()
    );
    let _ = writeln!(out, "{}\n", countdown(snapshot));
    let _ = writeln!(out, "{}", question.prompt);
    for (i, option) in question.options.iter().enumerate() {
        let marker = if question.selected.as_ref() == Some(&option.value) {
            '*'
        } else {
            ' '
        };
        let _ = writeln!(out, "  {marker} {}. {}", i + 1, option.label);
    }
    let _ = write!(out, "\n{}", controls_hint(snapshot));
    out
}

pub fn countdown(snapshot: &SessionSnapshot) -> String {
    if snapshot.running_low {
        format!("Time left: {}s (hurry!)", snapshot.seconds_remaining)
    } else {
        format!("Time left: {}s", snapshot.seconds_remaining)
    }
}

fn controls_hint(snapshot: &SessionSnapshot) -> String {
    let next = if snapshot.is_last_question {
        "finish"
    } else {
        "next question"
    };
    let count = snapshot.question.as_ref().map_or(0, |q| q.options.len());
    format!("Enter 1-{count} to answer, n for {next}, r to restart, q to quit.")
}

pub fn outcome_message(score: &QuizScore) -> String {
    match score.outcome() {
        ScoreOutcome::Perfect => "Perfect Score! Congratulations!".into(),
        ScoreOutcome::Failed => "Better luck next time!".into(),
        ScoreOutcome::Passed => format!("Your score: {}%", score.percentage),
    }
}

pub fn results(snapshot: &SessionSnapshot) -> String {
    let Some(score) = &snapshot.score else {
        return String::new();
    };

    let mut out = String::new();
    let _ = writeln!(out, "\n{} Quiz Results", snapshot.topic_title);
    let _ = writeln!(out, "{} / {}", score.correct, score.total);
    let _ = writeln!(out, "{}", outcome_message(score));
    let _ = writeln!(out, "{}", progress_bar(score.percentage));
    if let Some(end) = snapshot.completed_at {
        let secs = elapsed_secs(snapshot.started_at, end);
        let _ = writeln!(out, "Time taken: {}m {:02}s", secs / 60, secs % 60);
    }
    out.push('\n');

    let _ = writeln!(out, "Question Review");
    for review in &score.reviews {
        let mark = if review.is_correct { "[ok]" } else { "[x]" };
        let _ = writeln!(out, "{mark} {}. {}", review.index + 1, review.prompt);
        let _ = writeln!(out, "    Your answer: {}", review.answer_text());
        let _ = writeln!(out, "    Correct answer: {}", review.correct_label);
        if !review.feedback.is_empty() {
            let _ = writeln!(out, "    {}", review.feedback);
        }
    }
    let _ = write!(out, "\nPress r to restart or q to quit.");
    out
}

/// Text to print for an event, or `None` when nothing needs redrawing.
pub fn event(event: &SessionEvent) -> Option<String> {
    let snapshot = &event.snapshot;
    match &event.transition {
        Transition::Ticked { seconds_remaining } => {
            (snapshot.running_low || seconds_remaining % 10 == 0).then(|| countdown(snapshot))
        }
        Transition::AnswerSelected { .. } => {
            let question = snapshot.question.as_ref()?;
            let label = question
                .options
                .iter()
                .find(|o| Some(&o.value) == question.selected.as_ref())
                .map_or("?", |o| o.label.as_str());
            Some(format!("Selected: {label}. {}", controls_hint(snapshot)))
        }
        Transition::Advanced { timed_out, .. } | Transition::Completed { timed_out } => {
            let screen = question_screen(snapshot);
            Some(if *timed_out {
                format!("Time's up!\n{screen}")
            } else {
                screen
            })
        }
        Transition::Restarted => Some(format!("Restarting.\n{}", question_screen(snapshot))),
        Transition::Ignored {
            reason: IgnoreReason::AwaitingAnswer,
        } => Some("Select an answer before continuing.".into()),
        Transition::Ignored {
            reason: IgnoreReason::Completed,
        } => Some("The quiz is over. Press r to restart or q to quit.".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{
        AnswerOption, QuestionDraft, QuizSession, Topic, TopicId,
    };
    use quiz_core::time::fixed_now;

    fn session(len: usize) -> QuizSession {
        let questions = (0..len)
            .map(|i| {
                QuestionDraft {
                    prompt: format!("Question {i}?"),
                    options: vec![
                        AnswerOption::new("yes", "Yes"),
                        AnswerOption::new("no", "No"),
                    ],
                    correct_answer: "yes".into(),
                    feedback: format!("Because {i}."),
                }
                .validate()
                .unwrap()
            })
            .collect();
        let topic = Topic::new(TopicId::new("general").unwrap(), None, None, questions);
        QuizSession::new(&topic, fixed_now()).unwrap()
    }

    fn finish(session: &mut QuizSession, values: &[&str]) {
        for value in values {
            session.select_answer(value).unwrap();
            session.advance(fixed_now());
        }
    }

    #[test]
    fn question_screen_lists_numbered_options_and_marks_selection() {
        let mut session = session(2);
        session.select_answer("no").unwrap();
        let text = question_screen(&SessionSnapshot::from_session(&session, "General"));

        assert!(text.contains("Question 1 of 2"));
        assert!(text.contains("Time left: 60s"));
        assert!(text.contains("    1. Yes"));
        assert!(text.contains("  * 2. No"));
        assert!(text.contains("Enter 1-2 to answer, n for next question"));
    }

    #[test]
    fn results_pick_message_by_outcome() {
        let mut perfect = session(2);
        finish(&mut perfect, &["yes", "yes"]);
        let text = results(&SessionSnapshot::from_session(&perfect, "General"));
        assert!(text.contains("2 / 2"));
        assert!(text.contains("Perfect Score! Congratulations!"));
        assert!(text.contains("Time taken: 0m 00s"));

        let mut failed = session(2);
        finish(&mut failed, &["no", "no"]);
        let text = results(&SessionSnapshot::from_session(&failed, "General"));
        assert!(text.contains("Better luck next time!"));
        assert!(text.contains("Your answer: No"));
        assert!(text.contains("Correct answer: Yes"));

        let mut passed = session(3);
        finish(&mut passed, &["yes", "yes", "no"]);
        let text = results(&SessionSnapshot::from_session(&passed, "General"));
        assert!(text.contains("Your score: 67%"));
    }

    #[test]
    fn timed_out_question_shows_expired_answer() {
        let mut session = session(1);
        for _ in 0..60 {
            session.tick(fixed_now());
        }
        let text = results(&SessionSnapshot::from_session(&session, "General"));
        assert!(text.contains("Your answer: Time expired - No answer"));
    }

    #[test]
    fn ticks_are_only_printed_on_tens_or_when_low() {
        let mut session = session(1);
        let mut printed = Vec::new();
        for _ in 0..55 {
            let transition = session.tick(fixed_now());
            let event = SessionEvent {
                transition,
                snapshot: SessionSnapshot::from_session(&session, "General"),
            };
            if let Some(text) = super::event(&event) {
                printed.push(text);
            }
        }
        assert_eq!(printed[0], "Time left: 50s");
        assert!(printed.contains(&"Time left: 10s (hurry!)".to_owned()));
        assert_eq!(printed.last().unwrap(), "Time left: 5s (hurry!)");
        assert_eq!(printed.len(), 4 + 6);
    }

    #[test]
    fn progress_bar_scales_to_width() {
        assert_eq!(progress_bar(0), format!("[{}]", "-".repeat(20)));
        assert_eq!(progress_bar(50), format!("[{}{}]", "#".repeat(10), "-".repeat(10)));
        assert_eq!(progress_bar(100), format!("[{}]", "#".repeat(20)));
    }

    #[test]
    fn topic_list_numbers_topics() {
        let topic = Topic::new(
            TopicId::new("science").unwrap(),
            Some("Science".into()),
            Some("Test your knowledge".into()),
            Vec::new(),
        );
        let text = topic_list(&[topic.summary()]);
        assert!(text.contains("1. Science (science, 0 questions) - Test your knowledge"));
    }
}
