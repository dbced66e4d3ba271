//! cinesearch CLI
//!
//! Interactive terminal search by default, plus one-shot `search` and
//! `discover` commands for scripting.

use cinesearch::config::{Overrides, API_KEY_VAR, BASE_URL_VAR};
use cinesearch::{AppConfig, DisplayState, Movie, SearchSession, TmdbClient};
use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// cinesearch - find the movies you enjoy without hassle
///
/// Searches the TMDB catalogue as you type. Needs a TMDB API read access
/// token in TMDB_API_KEY (a .env file in the working directory works too).
#[derive(Parser)]
#[command(name = "cinesearch")]
#[command(author = "cinesearch Contributors")]
#[command(version)]
#[command(about = "Terminal movie search over the TMDB API", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct GlobalArgs {
    /// TMDB API read access token
    #[arg(long, env = API_KEY_VAR, hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// API base URL [default: https://api.themoviedb.org/3]
    #[arg(long, env = BASE_URL_VAR, global = true)]
    base_url: Option<String>,

    /// Quiet interval before typed text is searched, in milliseconds [default: 500]
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,

    /// Give up on a request after this many seconds (default: wait forever)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Log file path
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace, off) [default: info]
    #[arg(long, value_parser = parse_level, global = true)]
    log_level: Option<log::LevelFilter>,
}

fn parse_level(s: &str) -> Result<log::LevelFilter, String> {
    s.parse::<log::LevelFilter>()
        .map_err(|_| format!("unknown log level '{}'", s))
}

impl GlobalArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            request_timeout: self.timeout_secs.map(Duration::from_secs),
            quiet_interval: self.debounce_ms.map(Duration::from_millis),
            log_file: self.log_file.clone(),
            log_level: self.log_level,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive search (default)
    Tui,

    /// Search once and print the results
    Search {
        /// Search text (words are joined with spaces)
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        query: Vec<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print the popular listing
    Discover {
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Print at most this many results
    #[arg(short, long)]
    limit: Option<usize>,
}

fn main() {
    // `.env` has to be in the environment before clap reads env-backed flags
    let _ = dotenv::dotenv();
    let cli = Cli::parse();
    let config = AppConfig::from_env_with(cli.global.overrides());

    if let Err(e) = cinesearch::logging::init(&config.log_file, config.log_level) {
        eprintln!(
            "{} could not open log file {}: {}",
            style("Warning:").yellow().bold(),
            config.log_file.display(),
            e
        );
    }
    cinesearch::logging::separator(&format!("cinesearch {} starting", cinesearch::VERSION));

    let result = match cli.command {
        None | Some(Commands::Tui) => cmd_tui(&config),
        Some(Commands::Search { query, output }) => cmd_fetch(&config, &query.join(" "), &output),
        Some(Commands::Discover { output }) => cmd_fetch(&config, "", &output),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            log::error!(target: "MAIN", "{}", e);
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(path) = cinesearch::logging::log_path() {
                eprintln!("  details in {}", style(path.display()).dim());
            }
            std::process::exit(1);
        }
    }
}

fn cmd_tui(config: &AppConfig) -> cinesearch::Result<i32> {
    if config.api.api_key.is_empty() {
        log::warn!(target: "MAIN", "no API key configured; requests will be rejected");
    }
    let client = TmdbClient::new(config.api.clone())?;
    cinesearch::tui::run(config, Arc::new(client))?;
    Ok(0)
}

/// One-shot fetch for `search` and `discover`
fn cmd_fetch(config: &AppConfig, query: &str, output: &OutputArgs) -> cinesearch::Result<i32> {
    let client = TmdbClient::new(config.api.clone())?;
    let mut session = SearchSession::new(Arc::new(client));

    let label = if query.is_empty() {
        "popular movies".to_string()
    } else {
        format!("'{}'", query)
    };

    let spinner = if output.json {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.magenta} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Fetching {}...", label));
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    };

    session.commit(query)?;
    while !session.wait(Duration::from_millis(100)) {
        spinner.tick();
    }
    spinner.finish_and_clear();

    match session.display() {
        DisplayState::Loaded(movies) => {
            let shown = &movies[..output.limit.unwrap_or(movies.len()).min(movies.len())];
            if output.json {
                println!("{}", serde_json::to_string_pretty(shown)?);
            } else {
                print_cards(&label, shown, session.total_results(), session.last_elapsed());
            }
            Ok(0)
        }
        DisplayState::Error(message) => {
            if output.json {
                println!("{}", serde_json::json!({ "error": message }));
            } else {
                eprintln!("{} {}", style("✗").red().bold(), style(message).red());
            }
            Ok(1)
        }
        DisplayState::Loading => Ok(1),
    }
}

fn print_cards(label: &str, movies: &[Movie], total: Option<u64>, elapsed: Option<Duration>) {
    if movies.is_empty() {
        println!("{} No movies found for {}", style("→").cyan().bold(), label);
        return;
    }

    let count = match total {
        Some(t) if t as usize > movies.len() => format!("{} of {}", movies.len(), t),
        _ => movies.len().to_string(),
    };
    let took = elapsed
        .map(|d| format!(" in {}ms", d.as_millis()))
        .unwrap_or_default();
    println!(
        "{} {} results for {}{}",
        style("✓").green().bold(),
        style(count).green(),
        style(label).yellow(),
        took
    );
    println!();

    for (i, movie) in movies.iter().enumerate() {
        println!(
            "  {} {}",
            style(format!("{:3}.", i + 1)).dim(),
            style(movie.display_title()).bold()
        );
        println!(
            "       {} {}  {}  {}",
            style("★").yellow(),
            movie.rating_label(),
            style(movie.language_label()).cyan(),
            movie.release_year()
        );
        if let Some(poster) = movie.poster_url() {
            println!("       {}", style(poster).dim());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn log_level_parses_names() {
        assert_eq!(parse_level("debug"), Ok(log::LevelFilter::Debug));
        assert_eq!(parse_level("OFF"), Ok(log::LevelFilter::Off));
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn absent_flags_defer_to_environment() {
        let cli = Cli::try_parse_from(["cinesearch", "discover", "--json"]).unwrap();
        let overrides = cli.global.overrides();
        assert_eq!(overrides.quiet_interval, None);
        assert_eq!(overrides.log_level, None);
        assert_eq!(overrides.request_timeout, None);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cinesearch",
            "search",
            "blade",
            "runner",
            "--debounce-ms",
            "250",
            "--log-level",
            "trace",
            "--base-url",
            "http://127.0.0.1:8080",
        ])
        .unwrap();
        let overrides = cli.global.overrides();
        assert_eq!(overrides.quiet_interval, Some(Duration::from_millis(250)));
        assert_eq!(overrides.log_level, Some(log::LevelFilter::Trace));
        assert_eq!(overrides.base_url.as_deref(), Some("http://127.0.0.1:8080"));
        match cli.command {
            Some(Commands::Search { query, .. }) => assert_eq!(query.join(" "), "blade runner"),
            _ => panic!("expected search"),
        }
    }
}
