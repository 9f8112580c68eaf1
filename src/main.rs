//! Grok SDR - Sales lead dashboard in the terminal
//!
//! A terminal UI application that shows the lead pipeline, drafts outreach
//! with Grok and compares model accuracy, backed by the Grok SDR HTTP API.

use std::io;
use std::panic;
use std::process;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};

use grok_sdr::app::App;
use grok_sdr::cache::CacheManager;
use grok_sdr::cli::{self, Cli, CliError, StartupConfig};
use grok_sdr::data::ApiClient;
use grok_sdr::dispatch::Dispatcher;
use grok_sdr::settings::SettingsStore;
use grok_sdr::{logging, ui};

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Removes the on-disk response cache, for `--clear-cache`
fn clear_persistent_cache() -> Result<(), CliError> {
    let cache = CacheManager::persistent().ok_or(CliError::NoCacheDir)?;
    cli::clear_cache(&cache)?;
    println!("Response cache cleared");
    Ok(())
}

fn build_cache(config: &StartupConfig) -> CacheManager {
    if config.persist_cache {
        match CacheManager::persistent() {
            Some(cache) => return cache,
            None => warn!("No cache directory available, keeping responses in memory"),
        }
    }
    CacheManager::session()
}

async fn run(config: StartupConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = ApiClient::new(&config.api_url, config.timeout)?;
    let mut dispatcher = Dispatcher::new(client);
    let cache = build_cache(&config);
    let mut app = App::new(cache, SettingsStore::open(), config.initial_view);
    info!(
        "Starting on {} against {}",
        app.screen().label(),
        config.api_url
    );

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main event loop
    loop {
        // Start whatever the views queued, then apply finished requests
        dispatcher.flush(&mut app.outbox);
        while let Some(completion) = dispatcher.try_recv() {
            app.apply(completion);
        }
        // Completions can queue follow-ups (enrichment polls, refetches)
        dispatcher.flush(&mut app.outbox);

        // Render UI
        terminal.draw(|f| ui::render(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    info!(
        "Shutting down with {} request(s) in flight",
        dispatcher.in_flight()
    );

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    if cli.clear_cache {
        if let Err(e) = clear_persistent_cache() {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
        return Ok(());
    }

    let log_path = config.log_file.clone().or_else(logging::default_log_path);
    if let Some(path) = &log_path {
        if let Err(e) = logging::init(path) {
            eprintln!("Warning: could not open log file {}: {}", path.display(), e);
        }
    }

    if let Err(e) = run(config).await {
        error!("Fatal: {}", e);
        // The terminal may still be in raw mode
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        return Err(e);
    }
    Ok(())
}
