use std::io::{self, BufRead};
use std::path::PathBuf;

use eyre::{Result, bail};
use log::{debug, info};
use tubescript::config::{Config, config_path};
use tubescript::output::Format;
use tubescript::{Engine, Reply};

mod cli;

use cli::{Cli, Command};

const DEFAULT_LANG: &str = "en";

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("tubescript.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tubescript")
        .join("logs")
}

fn build_after_help() -> String {
    format!(
        "Config is read from: {}\nLogs are written to: {}",
        config_path().display(),
        log_dir().join("tubescript.log").display()
    )
}

fn read_stdin_urls() -> Result<Vec<String>> {
    let lines = io::stdin().lock().lines().collect::<Result<Vec<_>, _>>()?;
    Ok(lines
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let cmd = <Cli as clap::CommandFactory>::command().after_help(build_after_help());
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_default();

    if cli.verbose {
        let path = config_path();
        if path.exists() {
            eprintln!("Config: {}", path.display());
        }
        eprintln!("Logs: {}", log_dir().join("tubescript.log").display());
    }

    // CLI flags take priority over config defaults
    let lang_or_default = |lang: Option<String>| {
        lang.or_else(|| config.default_lang.clone())
            .unwrap_or_else(|| DEFAULT_LANG.to_string())
    };
    let format_or_default = |format: Option<Format>| format.or(config.default_format).unwrap_or_default();

    let engine = Engine::new(config.limits());

    let reply = match cli.command {
        Command::Transcript {
            url,
            lang,
            format,
            max_tokens,
        } => {
            engine
                .get_transcript(&url, &lang_or_default(lang), format_or_default(format), max_tokens)
                .await?
        }
        Command::Info { url } => engine.get_video_info(&url).await?,
        Command::Batch {
            urls,
            lang,
            format,
            max_tokens,
        } => {
            let urls = if urls.is_empty() { read_stdin_urls()? } else { urls };
            debug!("Batch of {} URLs", urls.len());
            engine
                .get_transcripts(&urls, &lang_or_default(lang), format_or_default(format), max_tokens)
                .await?
        }
        Command::Playlist {
            url,
            lang,
            format,
            max_tokens,
        } => {
            engine
                .get_playlist(&url, &lang_or_default(lang), format_or_default(format), max_tokens)
                .await?
        }
        Command::Search {
            url,
            query,
            lang,
            context,
        } => {
            engine
                .search_transcript(&url, &query, &lang_or_default(lang), context)
                .await?
        }
        Command::Comments { url, count } => engine.get_comments(&url, count).await?,
    };

    let rendered = match reply {
        Reply::Content(text) => text,
        Reply::NoCaptions(message) => bail!(message),
    };

    if let Some(ref path) = cli.output {
        std::fs::write(path, &rendered)?;
        if cli.verbose {
            eprintln!("Output written to: {}", path.display());
        }
    } else {
        println!("{rendered}");
    }

    Ok(())
}
