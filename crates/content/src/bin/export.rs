use std::fmt;
use std::path::PathBuf;

use content::catalog;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for ArgsError {}

struct Args {
    source: Option<PathBuf>,
    out: Option<PathBuf>,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p content --bin export -- [--from <content.json>] [--out <path>]");
    eprintln!();
    eprintln!("Writes the topic catalog (built-in unless --from is given) as JSON.");
    eprintln!("Without --out the JSON goes to stdout.");
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut parsed = Self {
            source: None,
            out: None,
        };
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--from" => parsed.source = Some(require_value(&mut args, "--from")?.into()),
                "--out" => parsed.out = Some(require_value(&mut args, "--out")?.into()),
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(Some(parsed))
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = Args::parse(std::env::args().skip(1)).inspect_err(|_| print_usage())? else {
        print_usage();
        return Ok(());
    };

    let topics = match &args.source {
        Some(path) => catalog::load_path(path)?,
        None => catalog::parse_catalog(catalog::BUILTIN_CATALOG)?,
    };
    let json = catalog::to_json(&topics)?;

    match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, format!("{json}\n"))?;
            eprintln!("wrote {} topics to {}", topics.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
