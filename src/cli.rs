//! CLI - Command Line Interface for nitflex
//!
//! Every catalog, watch-list and account action is scriptable.
//! Output is JSON when `--json` is set or stdout is not a terminal.
//!
//! # Examples
//!
//! ```bash
//! # Browse feeds
//! nitflex feed trending --media tv
//! nitflex feed similar --id 550 --page 2
//!
//! # Search and save
//! nitflex search "blade runner" --no-adult
//! nitflex watchlist add 78
//!
//! # Account
//! nitflex login --email ann@x.io --password secret
//! nitflex whoami --json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::api::Category;
use crate::models::MediaType;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error
    NetworkError = 3,
    /// Rejected credentials or missing session
    AuthError = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// nitflex - movie and TV catalog from the terminal
#[derive(Parser, Debug)]
#[command(
    name = "nitflex",
    version,
    about = "Browse movies and TV shows, keep a watch list",
    long_about = "Browse paged TMDB feeds, search the catalog, keep a local \
                  watch list and sign in to the account backend.",
    after_help = "EXAMPLES:\n\
                  nitflex feed popular --media tv       Popular TV shows\n\
                  nitflex search \"the batman\"          Search movies and TV\n\
                  nitflex watchlist add 414906          Save a movie\n\
                  nitflex whoami --json                 Current session"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Browse a paged feed
    #[command(visible_alias = "f")]
    Feed(FeedCmd),

    /// Search movies and TV shows
    #[command(visible_alias = "s")]
    Search(SearchCmd),

    /// List genres for a media type
    Genres(GenresCmd),

    /// Show the cast of a title
    Cast(CastCmd),

    /// Manage the local watch list
    #[command(visible_alias = "wl")]
    Watchlist(WatchlistCmd),

    /// Create an account
    Register(RegisterCmd),

    /// Sign in
    Login(LoginCmd),

    /// Sign out and forget the stored token
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Show or change preferences
    Prefs(PrefsCmd),
}

/// Media type argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaArg {
    /// Movies
    #[default]
    Movie,
    /// TV shows
    Tv,
}

impl From<MediaArg> for MediaType {
    fn from(arg: MediaArg) -> Self {
        match arg {
            MediaArg::Movie => MediaType::Movie,
            MediaArg::Tv => MediaType::Tv,
        }
    }
}

// =============================================================================
// Feed Command
// =============================================================================

/// Fetch one page of a catalog feed
#[derive(Args, Debug)]
pub struct FeedCmd {
    /// Which feed to load
    #[arg(value_enum)]
    pub feed: FeedArg,

    /// Movies or TV shows
    #[arg(long, short = 'm', value_enum, default_value = "movie")]
    pub media: MediaArg,

    /// Page to load (1-based)
    #[arg(long, short = 'p', default_value = "1")]
    pub page: u32,

    /// Title id (required for similar and recommended)
    #[arg(long)]
    pub id: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedArg {
    Trending,
    Popular,
    TopRated,
    NowPlaying,
    /// Always movies
    Upcoming,
    /// Discover titles from 1940 to 1980
    BackInTheDays,
    /// Titles similar to --id
    Similar,
    /// Recommendations for --id
    Recommended,
}

impl FeedArg {
    /// Category for the fixed feeds, `None` for the id-based ones
    pub fn category(self) -> Option<Category> {
        match self {
            FeedArg::Trending => Some(Category::Trending),
            FeedArg::Popular => Some(Category::Popular),
            FeedArg::TopRated => Some(Category::TopRated),
            FeedArg::NowPlaying => Some(Category::NowPlaying),
            FeedArg::Upcoming => Some(Category::Upcoming),
            FeedArg::BackInTheDays => Some(Category::BackInTheDays),
            FeedArg::Similar | FeedArg::Recommended => None,
        }
    }
}

// =============================================================================
// Search Command
// =============================================================================

#[derive(Args, Debug)]
pub struct SearchCmd {
    /// Search query
    #[arg(required = true)]
    pub query: String,

    /// Page to load (1-based)
    #[arg(long, short = 'p', default_value = "1")]
    pub page: u32,

    /// Include adult titles (overrides the saved preference)
    #[arg(long, conflicts_with = "no_adult")]
    pub adult: bool,

    /// Exclude adult titles (overrides the saved preference)
    #[arg(long)]
    pub no_adult: bool,
}

impl SearchCmd {
    /// Explicit override, if either flag was given
    pub fn adult_override(&self) -> Option<bool> {
        match (self.adult, self.no_adult) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

// =============================================================================
// Genres / Cast
// =============================================================================

#[derive(Args, Debug)]
pub struct GenresCmd {
    #[arg(long, short = 'm', value_enum, default_value = "movie")]
    pub media: MediaArg,
}

#[derive(Args, Debug)]
pub struct CastCmd {
    /// TMDB id of the title
    pub id: u64,

    #[arg(long, short = 'm', value_enum, default_value = "movie")]
    pub media: MediaArg,
}

// =============================================================================
// Watch List
// =============================================================================

#[derive(Args, Debug)]
pub struct WatchlistCmd {
    #[command(subcommand)]
    pub action: WatchlistAction,
}

#[derive(Subcommand, Debug)]
pub enum WatchlistAction {
    /// Print saved titles in insertion order
    List,
    /// Look a title up and save it
    Add {
        id: u64,
        #[arg(long, short = 'm', value_enum, default_value = "movie")]
        media: MediaArg,
    },
    /// Remove a saved title
    Remove { id: u64 },
    /// Check whether a title is saved
    Exists { id: u64 },
    /// Remove everything
    Clear,
}

// =============================================================================
// Account
// =============================================================================

#[derive(Args, Debug)]
pub struct RegisterCmd {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,

    /// Defaults to --password
    #[arg(long)]
    pub password_confirmation: Option<String>,
}

#[derive(Args, Debug)]
pub struct LoginCmd {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct PrefsCmd {
    /// Set whether search includes adult titles
    #[arg(long)]
    pub adult: Option<bool>,
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// Status OK response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusOk {
    pub status: &'static str,
}

impl Default for StatusOk {
    fn default() -> Self {
        Self { status: "ok" }
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print a human line, or `data` wrapped as JSON
    pub fn print_or<T: Serialize>(&self, data: T, human: impl std::fmt::Display) -> anyhow::Result<()> {
        if self.json {
            self.print(data)
        } else {
            println!("{}", human);
            Ok(())
        }
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}
