//! nitflex - movie and TV catalog from the terminal
//!
//! # Usage
//!
//! ```bash
//! nitflex feed trending
//! nitflex search "blade runner" --json
//! nitflex watchlist list
//! nitflex login --email ann@x.io --password secret
//! ```

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use nitflex::app::App;
use nitflex::cli::{Cli, Command, ExitCode, Output};
use nitflex::commands;
use nitflex::config::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let path = cli.config.clone().or_else(Config::path);
    let (config, load_error) = match path.as_deref().map(Config::try_load_from) {
        Some(Ok(Some(config))) => (config, None),
        Some(Err(e)) => (Config::default(), Some(e)),
        _ => (Config::default(), None),
    };

    init_tracing(&config);
    if let Some(e) = load_error {
        warn!(error = %format!("{:#}", e), "ignoring config file, using defaults");
    }

    let exit_code = run_cli(cli, config).await;
    std::process::exit(exit_code.into());
}

/// Log to stderr so JSON on stdout stays parseable
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli, config: Config) -> ExitCode {
    let output = Output::new(&cli);

    let app = match App::open(config).await {
        Ok(app) => app,
        Err(e) => return output.error(format!("Failed to open local data: {:#}", e), ExitCode::Error),
    };

    match cli.command {
        Command::Feed(cmd) => commands::feed_cmd(cmd, &app, &output).await,

        Command::Search(cmd) => commands::search_cmd(cmd, &app, &output).await,

        Command::Genres(cmd) => commands::genres_cmd(cmd, &app, &output).await,

        Command::Cast(cmd) => commands::cast_cmd(cmd, &app, &output).await,

        Command::Watchlist(cmd) => commands::watchlist_cmd(cmd, &app, &output).await,

        Command::Register(cmd) => commands::register_cmd(cmd, &app, &output).await,

        Command::Login(cmd) => commands::login_cmd(cmd, &app, &output).await,

        Command::Logout => commands::logout_cmd(&app, &output).await,

        Command::Whoami => commands::whoami_cmd(&app, &output).await,

        Command::Prefs(cmd) => commands::prefs_cmd(cmd, &app, &output).await,
    }
}
