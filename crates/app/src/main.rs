mod config;
mod logging;
mod render;
mod terminal;

use std::fmt;
use std::path::PathBuf;

use content::Content;
use services::{Clock, QuizError, QuizLoopService};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::{AppConfig, parse_seconds};

#[derive(Debug, PartialEq, Eq)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSeconds { raw: String },
    InvalidContentPath { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSeconds { raw } => write!(f, "invalid --seconds value: {raw}"),
            ArgsError::InvalidContentPath { raw } => write!(f, "invalid --content value: {raw:?}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play   [--topic <id>] [--content <path>] [--seconds <n>]");
    eprintln!("  cargo run -p app -- topics [--content <path>]");
    eprintln!();
    eprintln!("Defaults for play:");
    eprintln!("  built-in topics, 60 seconds per question, topic chosen interactively");
    eprintln!();
    eprintln!("While playing: 1-4 selects an answer, n submits, r restarts, q quits.");
    eprintln!();
    eprintln!("Environment (.env is read if present):");
    eprintln!("  QUIZ_CONTENT_PATH, QUIZ_QUESTION_SECONDS, QUIZ_TOPIC, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Topics,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "topics" => Some(Self::Topics),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    content_path: Option<PathBuf>,
    topic: Option<String>,
    question_secs: u32,
}

impl Args {
    /// Parse flags on top of the environment config. Flags win.
    fn parse(
        cmd: Command,
        args: &mut impl Iterator<Item = String>,
        config: &AppConfig,
    ) -> Result<Option<Self>, ArgsError> {
        let mut parsed = Self {
            content_path: config.content_path.clone(),
            topic: config.topic.clone(),
            question_secs: config.question_secs,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--content" => {
                    let value = require_value(args, "--content")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidContentPath { raw: value });
                    }
                    parsed.content_path = Some(PathBuf::from(value));
                }
                "--topic" if cmd == Command::Play => {
                    parsed.topic = Some(require_value(args, "--topic")?);
                }
                "--seconds" if cmd == Command::Play => {
                    let value = require_value(args, "--seconds")?;
                    parsed.question_secs =
                        parse_seconds(&value).ok_or(ArgsError::InvalidSeconds { raw: value })?;
                }
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Some(parsed))
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    logging::init(&config.log_filter);

    let mut argv = std::env::args().skip(1).peekable();

    // Default behavior: play when no subcommand is provided.
    let cmd = match argv.peek().map(String::as_str) {
        None => Command::Play,
        Some(first) if first.starts_with('-') => Command::Play,
        Some(first) => {
            let cmd = Command::from_arg(first).ok_or_else(|| {
                print_usage();
                ArgsError::UnknownArg(first.to_owned())
            })?;
            argv.next();
            cmd
        }
    };

    let Some(args) = Args::parse(cmd, &mut argv, &config).inspect_err(|_| print_usage())? else {
        print_usage();
        return Ok(());
    };

    let content = match &args.content_path {
        Some(path) => Content::from_path(path)?,
        None => Content::builtin()?,
    };
    let service = QuizLoopService::new(Clock::system(), content.topics)
        .with_question_secs(args.question_secs);
    let topics = service.list_topics().await?;

    let mut stdout = std::io::stdout();
    match cmd {
        Command::Topics => {
            print!("{}", render::topic_list(&topics));
            Ok(())
        }
        Command::Play => {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let topic = match args.topic {
                Some(topic) => topic,
                None => match terminal::choose_topic(&topics, &mut lines, &mut stdout).await? {
                    Some(topic) => topic,
                    None => return Ok(()),
                },
            };

            let controller = match service.start(&topic).await {
                Ok(controller) => controller,
                Err(err @ QuizError::UnknownTopic { .. }) => {
                    eprint!("{}", render::topic_list(&topics));
                    return Err(err.into());
                }
                Err(err) => return Err(err.into()),
            };
            terminal::run_quiz(&controller, &mut lines, &mut stdout).await?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(cmd: Command, args: &[&str], config: &AppConfig) -> Result<Option<Args>, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_owned());
        Args::parse(cmd, &mut iter, config)
    }

    #[test]
    fn flags_override_environment() {
        let config = AppConfig {
            content_path: Some("env.json".into()),
            question_secs: 30,
            topic: Some("science".into()),
            log_filter: "warn".into(),
        };
        let args = parse(
            Command::Play,
            &["--topic", "history", "--seconds", "15", "--content", "cli.json"],
            &config,
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            args,
            Args {
                content_path: Some("cli.json".into()),
                topic: Some("history".into()),
                question_secs: 15,
            }
        );
    }

    #[test]
    fn environment_is_used_without_flags() {
        let config = AppConfig {
            topic: Some("general".into()),
            ..AppConfig::default()
        };
        let args = parse(Command::Play, &[], &config).unwrap().unwrap();
        assert_eq!(args.topic.as_deref(), Some("general"));
        assert_eq!(args.question_secs, 60);
        assert_eq!(args.content_path, None);
    }

    #[test]
    fn rejects_bad_flags() {
        let config = AppConfig::default();
        assert_eq!(
            parse(Command::Play, &["--seconds", "0"], &config).unwrap_err(),
            ArgsError::InvalidSeconds { raw: "0".into() }
        );
        assert_eq!(
            parse(Command::Play, &["--topic"], &config).unwrap_err(),
            ArgsError::MissingValue { flag: "--topic" }
        );
        assert_eq!(
            parse(Command::Topics, &["--seconds", "5"], &config).unwrap_err(),
            ArgsError::UnknownArg("--seconds".into())
        );
        assert_eq!(
            parse(Command::Topics, &["--content", " "], &config).unwrap_err(),
            ArgsError::InvalidContentPath { raw: " ".into() }
        );
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(parse(Command::Play, &["-h"], &AppConfig::default()).unwrap(), None);
    }

    #[test]
    fn subcommands_are_recognized() {
        assert_eq!(Command::from_arg("play"), Some(Command::Play));
        assert_eq!(Command::from_arg("topics"), Some(Command::Topics));
        assert_eq!(Command::from_arg("seed"), None);
    }
}
