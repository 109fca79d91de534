use std::io::Write;

use quiz_core::model::TopicSummary;
use services::{QuizController, SessionEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::broadcast::error::RecvError;

use crate::render;

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// 1-based option number.
    Pick(usize),
    Next,
    Restart,
    Quit,
    Unknown,
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if let Ok(n) = line.parse::<usize>() {
            return Self::Pick(n);
        }
        match line.to_ascii_lowercase().as_str() {
            "n" | "next" | "" => Self::Next,
            "r" | "restart" => Self::Restart,
            "q" | "quit" | "exit" => Self::Quit,
            _ => Self::Unknown,
        }
    }
}

/// Drive a quiz from `lines` until the player quits or input ends.
///
/// Screens are redrawn from controller events, so timer-driven changes show
/// up without any input.
///
/// # Errors
///
/// Returns I/O errors from reading input or writing output.
pub async fn run_quiz<R, W>(
    controller: &QuizController,
    lines: &mut Lines<R>,
    out: &mut W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut events = controller.subscribe();
    writeln!(out, "{}", render::question_screen(&controller.snapshot()))?;
    out.flush()?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match Input::parse(&line) {
                    Input::Pick(n) => pick(controller, n, out)?,
                    Input::Next => {
                        controller.advance();
                    }
                    Input::Restart => {
                        controller.restart();
                    }
                    Input::Quit => break,
                    Input::Unknown => writeln!(out, "Unrecognized input: {}", line.trim())?,
                }
            }
            event = events.recv() => match event {
                Ok(event) => show(&event, out)?,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "renderer lagged behind session events");
                    writeln!(out, "{}", render::question_screen(&controller.snapshot()))?;
                }
                Err(RecvError::Closed) => break,
            },
        }
        out.flush()?;
    }

    // Render anything the last command produced.
    while let Ok(event) = events.try_recv() {
        show(&event, out)?;
    }
    out.flush()
}

/// Ask for a topic by number or id. Returns `None` when input ends or the player quits.
///
/// # Errors
///
/// Returns I/O errors from reading input or writing output.
pub async fn choose_topic<R, W>(
    topics: &[TopicSummary],
    lines: &mut Lines<R>,
    out: &mut W,
) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{}", render::topic_list(topics))?;
    loop {
        write!(out, "Choose a topic (number or id, q to quit): ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        let choice = line.trim();
        if matches!(Input::parse(choice), Input::Quit) {
            return Ok(None);
        }
        let by_number = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| topics.get(i));
        let by_id = topics
            .iter()
            .find(|t| t.id.as_str().eq_ignore_ascii_case(choice));
        match by_number.or(by_id) {
            Some(topic) => return Ok(Some(topic.id.to_string())),
            None => writeln!(out, "No topic {choice:?}.")?,
        }
    }
}

fn pick<W: Write>(controller: &QuizController, n: usize, out: &mut W) -> std::io::Result<()> {
    let snapshot = controller.snapshot();
    let Some(question) = snapshot.question else {
        // Completed; let the controller report it.
        let _ = controller.select_answer("");
        return Ok(());
    };
    let Some(option) = n.checked_sub(1).and_then(|i| question.options.get(i)) else {
        return writeln!(out, "Choose a number from 1 to {}.", question.options.len());
    };
    if let Err(err) = controller.select_answer(option.value.as_str()) {
        writeln!(out, "{err}")?;
    }
    Ok(())
}

fn show<W: Write>(event: &SessionEvent, out: &mut W) -> std::io::Result<()> {
    match render::event(event) {
        Some(text) => writeln!(out, "{text}"),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;
    use services::{Clock, QuizLoopService};
    use std::sync::Arc;
    use tokio::io::BufReader;

    fn service() -> QuizLoopService {
        let content = content::Content::builtin().unwrap();
        QuizLoopService::new(Clock::fixed(fixed_now()), Arc::clone(&content.topics))
    }

    async fn play(script: &str, auto_tick: bool) -> (String, QuizController) {
        let controller = service()
            .with_auto_tick(auto_tick)
            .start("general")
            .await
            .unwrap();
        let mut lines = BufReader::new(script.as_bytes()).lines();
        let mut out = Vec::new();
        run_quiz(&controller, &mut lines, &mut out).await.unwrap();
        (String::from_utf8(out).unwrap(), controller)
    }

    #[test]
    fn parses_player_input() {
        assert_eq!(Input::parse(" 3 "), Input::Pick(3));
        assert_eq!(Input::parse("N"), Input::Next);
        assert_eq!(Input::parse(""), Input::Next);
        assert_eq!(Input::parse("restart"), Input::Restart);
        assert_eq!(Input::parse("q"), Input::Quit);
        assert_eq!(Input::parse("maybe"), Input::Unknown);
    }

    #[tokio::test]
    async fn scripted_perfect_run_prints_results() {
        // Correct options: 2, 2, 3, 4, 3.
        let (out, controller) = play("2\nn\n2\nn\n3\nn\n4\nn\n3\nn\nq\n", false).await;
        assert!(controller.snapshot().is_complete());
        assert!(out.contains("General Knowledge Quiz"));
        assert!(out.contains("Perfect Score! Congratulations!"));
        assert!(out.contains("5 / 5"));
    }

    #[tokio::test]
    async fn advancing_without_an_answer_is_refused() {
        let (out, controller) = play("n\n9\nq\n", false).await;
        assert!(out.contains("Select an answer before continuing."));
        assert!(out.contains("Choose a number from 1 to 4."));
        assert_eq!(controller.snapshot().question_number, 1);
    }

    #[tokio::test]
    async fn topics_can_be_chosen_by_number_or_id() {
        let topics = service().list_topics().await.unwrap();

        let mut out = Vec::new();
        let mut lines = BufReader::new("7\nHistory\n".as_bytes()).lines();
        let chosen = choose_topic(&topics, &mut lines, &mut out).await.unwrap();
        assert_eq!(chosen.as_deref(), Some("history"));
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("No topic \"7\"."));

        let mut lines = BufReader::new("4\n".as_bytes()).lines();
        let chosen = choose_topic(&topics, &mut lines, &mut Vec::new()).await.unwrap();
        assert_eq!(chosen.as_deref(), Some("general"));

        let mut lines = BufReader::new("q\n".as_bytes()).lines();
        assert_eq!(choose_topic(&topics, &mut lines, &mut Vec::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn end_of_input_stops_the_loop() {
        let (out, controller) = play("1\n", false).await;
        assert!(out.contains("Selected: New Zealand."));
        assert!(!controller.snapshot().is_complete());
    }
}
