//! Command-line interface for routedrill
//!
//! Provides argument parsing using clap derive macros.

use crate::review::QuizMode;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Fuzzy route-area lookup and spaced-review drills for couriers
#[derive(Parser, Debug)]
#[command(
    name = "routedrill",
    version,
    about = "Fuzzy route-area lookup and spaced-review drills for couriers"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Record store file (overrides config and ROUTEDRILL_STORE)
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: info, -vv: debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up the zone for one spoken or typed street name
    Search {
        /// Query text (multiple words are joined with spaces)
        #[arg(required = true)]
        query: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Split a continuous transcript into street matches
    Segment {
        /// Transcript text (default: one transcript per stdin line)
        transcript: Option<String>,

        /// Print segments as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a street to the library
    Add {
        /// Street or building name
        street: String,

        /// Route area the street belongs to
        zone: String,

        /// Courier company
        #[arg(long, value_name = "NAME")]
        company: Option<String>,

        /// Phonetic key (default: computed from the street name)
        #[arg(long, value_name = "KEY")]
        pinyin: Option<String>,
    },

    /// Delete a street by id
    Delete {
        /// Record id as shown by `list`
        id: String,
    },

    /// List the library grouped by zone
    List {
        /// Only show records whose street, zone or company contains TEXT
        #[arg(long, short, value_name = "TEXT")]
        filter: Option<String>,

        /// Only show one zone
        #[arg(long, short, value_name = "ZONE")]
        zone: Option<String>,
    },

    /// Import streets from a CSV file (upsert by street name)
    Import {
        /// CSV file with street and zone columns
        file: PathBuf,
    },

    /// Export the library as CSV
    Export {
        /// Output file (default: stdout)
        file: Option<PathBuf>,
    },

    /// Show streets due for review
    Due {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the mistake pool
    Mistakes {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run an interactive quiz
    Quiz {
        /// Which streets to drill: random, due or mistakes
        #[arg(long, short, value_name = "MODE", default_value = "random")]
        mode: QuizMode,

        /// Maximum number of questions (default: quiz.count from config)
        #[arg(long, short = 'n', value_name = "N")]
        count: Option<usize>,

        /// Seed for a reproducible session
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
    },

    /// Show library statistics
    Stats {
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
