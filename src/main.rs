mod action;
mod app;
mod async_diff;
mod cli;
mod components;
mod config;
mod display_map;
mod document;
mod event;
mod git;
mod intraline;
mod selection;
mod state;
mod theme;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use simplelog::{Config, WriteLogger};
use std::env;
use std::fs::File;

use crate::app::{parse_target, App};
use crate::cli::Cli;
use crate::config::DiffselConfig;
use crate::git::RepoCache;
use crate::state::DiffOptions;
use crate::theme::{Theme, THEME_NAMES};

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        default_hook(panic_info);
    }));
}

fn init_logging(config: &DiffselConfig, cli: &Cli) -> Result<()> {
    let path = cli
        .log_file
        .clone()
        .or_else(|| config.log_file.clone())
        .unwrap_or_else(config::default_log_file);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    WriteLogger::init(config.log_level, Config::default(), file)
        .context("Failed to initialize logging")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install().ok();
    install_panic_hook();

    let cli = Cli::parse();

    let mut config = config::load_config();
    init_logging(&config, &cli)?;
    if let Some(ref err) = config.load_error {
        log::warn!("ignoring config file: {err}");
    }
    if let Some(ref theme_name) = cli.theme {
        if !THEME_NAMES.contains(&theme_name.as_str()) {
            log::warn!("unknown theme {theme_name}, using {}", config.theme.name);
        } else {
            config.theme = Theme::from_name(theme_name);
        }
    }
    if cli.debounce_ms.is_some() {
        config.debounce_ms = cli.debounce_ms;
    }

    let cwd = env::current_dir()?;

    // Repository and target problems are reported before the terminal
    // switches to the alternate screen.
    let target = parse_target(cli.target.as_deref());
    let repo = match RepoCache::open(&cwd).and_then(|r| r.check_target(&target).map(|_| r)) {
        Ok(r) => r,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("diffsel: {e:#}");
            std::process::exit(1);
        }
    };
    let repo_path = repo.workdir().to_path_buf();
    drop(repo);

    log::info!("starting in {} against {:?}", repo_path.display(), target);

    // CLI flags win over config-file settings
    let unified = cli.unified || config.unified.unwrap_or(false);
    let ignore_ws = cli.ignore_whitespace || config.ignore_whitespace.unwrap_or(false);

    let diff_options = DiffOptions::new(ignore_ws, unified);
    let mut app = App::new(diff_options, target, repo_path, config);

    let mut terminal = tui::init()?;
    let result = app.run(&mut terminal).await;
    tui::restore()?;

    if let Err(ref e) = result {
        log::error!("{e:#}");
        eprintln!("diffsel: {e:#}");
        return result;
    }

    // Comments go to stdout so they can be piped elsewhere.
    if app.comments().count() > 0 {
        println!("{}", app.comments().to_json()?);
    }
    Ok(())
}
