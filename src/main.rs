use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use routedrill::cli::{Cli, Commands, ConfigAction};
use routedrill::config::Config;
use routedrill::defaults::now_ms;
use routedrill::import::read_csv;
use routedrill::library::LibraryFilter;
use routedrill::{
    AddressRecord, JsonFileStore, ListenMode, MatchResult, NewRecord, QuizBuilder, QuizMode,
    RouteBook, Routed, Segment, TranscriptEvent,
};
use std::fs::{self, File};
use std::io::{self, BufRead, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    match cli.command {
        Commands::Search { query, json } => {
            let book = open_book(cli.config.as_deref(), cli.store.as_deref())?;
            let results = book.search(&query.join(" "))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_matches(&results);
            }
        }
        Commands::Segment { transcript, json } => {
            let book = open_book(cli.config.as_deref(), cli.store.as_deref())?;
            handle_segment(&book, transcript, json)?;
        }
        Commands::Add {
            street,
            zone,
            company,
            pinyin,
        } => {
            let book = open_book(cli.config.as_deref(), cli.store.as_deref())?;
            let mut new = NewRecord::new(street, zone);
            new.company_name = company;
            new.pinyin = pinyin;
            let record = book.add(new, now_ms())?;
            println!(
                "Added {} → {} (id {})",
                record.street_name.bold(),
                record.route_area.green(),
                record.id.dimmed()
            );
        }
        Commands::Delete { id } => {
            let book = open_book(cli.config.as_deref(), cli.store.as_deref())?;
            book.delete(&id)?;
            println!("Deleted {}", id);
        }
        Commands::List { filter, zone } => {
            let book = open_book(cli.config.as_deref(), cli.store.as_deref())?;
            handle_list(&book, LibraryFilter { text: filter, zone })?;
        }
        Commands::Import { file } => {
            let book = open_book(cli.config.as_deref(), cli.store.as_deref())?;
            let reader = File::open(&file)
                .with_context(|| format!("Failed to open {}", file.display()))?;
            let summary = book.import(read_csv(reader)?, now_ms())?;
            println!(
                "Imported {}: {} added, {} updated, {} skipped",
                file.display(),
                summary.added,
                summary.updated,
                summary.skipped
            );
        }
        Commands::Export { file } => {
            let book = open_book(cli.config.as_deref(), cli.store.as_deref())?;
            match file {
                Some(path) => {
                    let out = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    book.export_csv(BufWriter::new(out))?;
                    if !cli.quiet {
                        eprintln!("Exported to {}", path.display());
                    }
                }
                None => book.export_csv(io::stdout().lock())?,
            }
        }
        Commands::Due { json } => {
            let book = open_book(cli.config.as_deref(), cli.store.as_deref())?;
            let now = now_ms();
            let due = book.due(now)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&due)?);
            } else if due.is_empty() {
                println!("Nothing due for review");
            } else {
                for record in &due {
                    println!("  {}  {}", format_record(record), format_due(record, now).dimmed());
                }
            }
        }
        Commands::Mistakes { json } => {
            let book = open_book(cli.config.as_deref(), cli.store.as_deref())?;
            let pool = book.mistakes()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&pool)?);
            } else if pool.is_empty() {
                println!("Mistake pool is empty");
            } else {
                let streak = book.scheduler().graduation_streak();
                for record in &pool {
                    let detail = format!(
                        "streak {}/{}, {} misses",
                        record.mistake_streak, streak, record.failure_count
                    );
                    println!("  {}  {}", format_record(record), detail.dimmed());
                }
            }
        }
        Commands::Quiz { mode, count, seed } => {
            let config = load_config(cli.config.as_deref())?;
            let book = book_from_config(&config, cli.store.as_deref())?;
            let count = count.unwrap_or(config.quiz.count);
            run_quiz(&book, mode, count, seed.or(config.quiz.seed))?;
        }
        Commands::Stats { json } => {
            let book = open_book(cli.config.as_deref(), cli.store.as_deref())?;
            let stats = book.stats(now_ms())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Streets:         {}", stats.total);
                println!("Zones:           {}", stats.zones);
                println!("Due now:         {}", stats.due);
                println!("Mistake pool:    {}", stats.in_mistake_pool);
                println!("Never reviewed:  {}", stats.never_reviewed);
                println!("Mastered:        {}", stats.mastered);
            }
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "routedrill", &mut io::stdout());
        }
    }

    Ok(())
}

/// Install the log subscriber; `RUST_LOG` wins over the flags.
fn init_tracing(quiet: bool, verbose: u8) {
    let default = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/routedrill/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = match custom_path {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&Config::default_path())?,
    };
    Ok(config.with_env_overrides())
}

fn book_from_config(
    config: &Config,
    store_override: Option<&Path>,
) -> Result<RouteBook<JsonFileStore>> {
    let path = store_override
        .map(PathBuf::from)
        .unwrap_or_else(|| config.store_path());
    let store = JsonFileStore::open_with_seed(&path, config.store.seed)?;
    Ok(RouteBook::from_config(store, config)?)
}

fn open_book(
    config_path: Option<&Path>,
    store_override: Option<&Path>,
) -> Result<RouteBook<JsonFileStore>> {
    let config = load_config(config_path)?;
    book_from_config(&config, store_override)
}

fn format_record(record: &AddressRecord) -> String {
    format!("{} → {}", record.street_name.bold(), record.route_area.green())
}

fn format_due(record: &AddressRecord, now: i64) -> String {
    if record.next_review_time <= 0 {
        return "never scheduled".to_string();
    }
    let overdue = Duration::from_secs(((now - record.next_review_time).max(0) / 1000) as u64);
    if overdue.is_zero() {
        "due now".to_string()
    } else {
        format!("overdue by {}", humantime::format_duration(overdue))
    }
}

fn print_matches(results: &[MatchResult]) {
    if results.is_empty() {
        println!("No match");
        return;
    }
    for result in results {
        let score = format!("{:>5.1}", result.score);
        let score = if result.score >= 95.0 {
            score.green().to_string()
        } else {
            score.yellow().to_string()
        };
        print!("  {}  {}", score, format_record(&result.record));
        if let Some(company) = &result.record.company_name {
            print!("  {}", company.dimmed());
        }
        println!();
    }
}

fn print_segments(segments: &[Segment]) {
    let mut line = String::new();
    for segment in segments {
        match &segment.record {
            Some(record) => line.push_str(&format!(
                "[{} → {}]",
                segment.text.bold(),
                record.route_area.green()
            )),
            None => line.push_str(&segment.text.dimmed().to_string()),
        }
    }
    println!("{}", line);
}

fn handle_segment(
    book: &RouteBook<JsonFileStore>,
    transcript: Option<String>,
    json: bool,
) -> Result<()> {
    let transcripts: Vec<String> = match transcript {
        Some(text) => vec![text],
        None => io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()?
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect(),
    };

    for text in transcripts {
        let event = TranscriptEvent::Final(text);
        let Routed::Segments(segments) = book.route(&event, ListenMode::Batch)? else {
            continue;
        };
        if json {
            println!("{}", serde_json::to_string(&segments)?);
        } else {
            print_segments(&segments);
        }
    }
    Ok(())
}

fn handle_list(book: &RouteBook<JsonFileStore>, filter: LibraryFilter) -> Result<()> {
    let groups = book.library(&filter)?;
    if groups.is_empty() {
        println!("No streets");
        return Ok(());
    }
    for group in &groups {
        println!("{} ({})", group.zone.green().bold(), group.records.len());
        for record in &group.records {
            print!("  {}  {}", record.id.dimmed(), record.street_name);
            if let Some(company) = &record.company_name {
                print!("  {}", company.dimmed());
            }
            if record.is_in_mistake_pool {
                print!("  {}", "mistake".red());
            }
            println!();
        }
    }
    Ok(())
}

/// Ask each question on stdin and feed every answer back to the scheduler.
fn run_quiz(
    book: &RouteBook<JsonFileStore>,
    mode: QuizMode,
    count: usize,
    seed: Option<u64>,
) -> Result<()> {
    let mut builder = match seed {
        Some(seed) => QuizBuilder::seeded(seed),
        None => QuizBuilder::from_os_rng(),
    };
    let questions = book.quiz(&mut builder, mode, count, now_ms())?;
    if questions.is_empty() {
        match mode {
            QuizMode::Random => println!("The library is empty; add or import streets first"),
            QuizMode::Due => println!("Nothing due for review"),
            QuizMode::Mistakes => println!("Mistake pool is empty"),
        }
        return Ok(());
    }

    let interactive = io::stdin().is_terminal();
    let mut input = io::stdin().lock();
    let mut tally = routedrill::review::SessionTally::default();
    let total = questions.len();

    for (n, question) in questions.iter().enumerate() {
        println!();
        println!("[{}/{}] {}", n + 1, total, question.record.street_name.bold());
        for (i, option) in question.options.iter().enumerate() {
            println!("  {}) {}", i + 1, option);
        }
        if interactive {
            print!("> ");
            io::stdout().flush()?;
        }

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let answer = line.trim();
        if answer.eq_ignore_ascii_case("q") {
            break;
        }
        let choice = match answer.parse::<usize>() {
            Ok(i) if (1..=question.options.len()).contains(&i) => question.options[i - 1].as_str(),
            _ => answer,
        };

        let correct = tally.record_answer(question, choice);
        book.process_result(&question.record.id, correct, now_ms())?;
        if correct {
            println!("{}", "✓ correct".green());
        } else {
            println!("{} {}", "✗ it is".red(), question.correct_answer().green().bold());
        }
    }

    println!();
    println!(
        "Score: {}/{} ({}%)",
        tally.correct,
        tally.total,
        tally.percentage()
    );
    if !tally.wrong.is_empty() {
        println!("Missed:");
        for record in &tally.wrong {
            println!("  {}", format_record(record));
        }
    }
    Ok(())
}

/// Handle configuration commands.
fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    let config_path = custom_path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);

    match action {
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            print!("{}", config.to_toml()?);
            println!("# store: {}", config.store_path().display());
        }
        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    config_path.display()
                );
            }
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&config_path, Config::default().to_toml()?)?;
            println!("Wrote {}", config_path.display());
        }
    }
    Ok(())
}
