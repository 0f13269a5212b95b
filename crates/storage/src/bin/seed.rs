use std::fmt;

use chrono::{DateTime, Duration, Utc};
use progress_core::model::{Language, ProgressPatch, UserId};
use storage::repository::Storage;
use storage::sqlite::SqlitePoolConfig;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    learners: u32,
    prefix: String,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidLearners { raw: String },
    InvalidDbUrl { raw: String },
    InvalidPrefix { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidLearners { raw } => write!(f, "invalid --learners value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidPrefix { raw } => write!(f, "invalid --prefix value: {raw:?}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:kudzidza.sqlite3?mode=rwc".into());
        let mut learners = std::env::var("SEED_LEARNERS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(5);
        let mut prefix = "demo".to_string();
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--learners" => {
                    let value = require_value(&mut args, "--learners")?;
                    learners = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidLearners { raw: value.clone() })?;
                }
                "--prefix" => {
                    let value = require_value(&mut args, "--prefix")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidPrefix { raw: value });
                    }
                    prefix = value;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            learners,
            prefix,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>     SQLite URL (default: sqlite:kudzidza.sqlite3?mode=rwc)");
    eprintln!("  --learners <n>        Number of demo learners to upsert (default: 5)");
    eprintln!("  --prefix <text>       User id prefix (default: demo)");
    eprintln!("  --now <rfc3339>       Fixed current time for deterministic seeding");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  DATABASE_URL, SEED_LEARNERS");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url, SqlitePoolConfig::default()).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let letters = ["A", "B", "C", "D", "E", "F"];
    let words = ["imba", "mvura", "cat", "dog", "baba"];
    let languages = [Language::Both, Language::English, Language::Shona];

    let mut created = 0_u32;
    for i in 0..args.learners {
        let idx = i as usize;
        let user_id = UserId::parse(format!("{}-{}", args.prefix, i + 1))?;
        let patch = ProgressPatch::new()
            .with_stars(i * 3 + 1)
            .with_level(i % 4 + 1)?
            .with_letters_completed(letters.iter().take(idx % letters.len() + 1).copied())
            .with_words_completed(words.iter().take(idx % words.len()).copied())
            .with_math_completed((1..=i64::from(i % 6)).collect::<Vec<_>>())
            .with_tracing_completed(letters.iter().take(idx % 3).copied())
            .with_language(languages[idx % languages.len()]);

        let at = now - Duration::minutes(i64::from(args.learners - i));
        let receipt = storage.progress.merge_progress(&user_id, &patch, at).await?;
        if !receipt.outcome.modified() {
            created += 1;
        }
    }

    println!(
        "Seeded {} learners ({} new) into {}",
        args.learners, created, args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
