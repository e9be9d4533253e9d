//! gemtalk - chat with Gemini from the terminal.
//!
//! # Usage
//!
//! ```bash
//! GEMINI_API_KEY=... gemtalk
//! gemtalk --model gemini-2.5-pro --history 20
//! gemtalk --theme light --save
//! ```

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gemtalk::app::App;
use gemtalk::client::{DEFAULT_MODEL, GeminiClient, GeminiConfig, ReplyWorker};
use gemtalk::config::{
    API_KEY_ENV, ConfigFlags, ThemeMode, clear_config_flags, credentials_path, global_config_path,
    load_config_flags, local_override_path, parse_flag_tokens, resolve_api_key, save_config_flags,
};
use gemtalk::conversation::{ChatSession, ConversationWindow, DEFAULT_HISTORY};
use gemtalk::highlight::{
    HighlightBackground, background_from_rgb, parse_osc11_reply, set_background_mode,
};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Chat with Gemini from the terminal
///
/// Values are read again from the raw arguments so `--save` can persist
/// them verbatim; the fields here drive `--help` and clap's validation.
#[allow(dead_code)]
#[derive(Parser, Debug)]
#[command(name = "gemtalk", version, about, long_about = None)]
struct Cli {
    /// Gemini model to talk to [default: gemini-2.5-flash]
    #[arg(long, value_name = "NAME")]
    model: Option<String>,

    /// Number of past turns sent with each message [default: 50]
    #[arg(long, value_name = "N", allow_hyphen_values = true)]
    history: Option<String>,

    /// Request timeout in seconds [default: 60]
    #[arg(long, value_name = "SECS")]
    timeout: Option<String>,

    /// Force the color theme (light or dark)
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,

    /// Write logs to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Start without the greeting message
    #[arg(long)]
    no_welcome: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

// Query the terminal background using OSC 11.
// We talk to /dev/tty so the terminal responds even when stdout is piped.
// On non-Unix platforms we skip the query entirely because the fallback
// (stdin/stdout) leaves an orphaned reader thread that blocks the console
// input buffer, preventing crossterm from receiving any keyboard events.
#[cfg(not(unix))]
fn query_terminal_background() -> std::io::Result<Option<(u8, u8, u8)>> {
    Ok(None)
}

#[cfg(unix)]
fn query_terminal_background() -> std::io::Result<Option<(u8, u8, u8)>> {
    use std::io::{Read, Write};
    use std::sync::mpsc;

    let (tx, rx) = mpsc::channel();

    let mut io = OpenOptions::new().read(true).write(true).open("/dev/tty")?;
    let reader = io.try_clone()?;

    // OSC 11 query: ESC ] 11 ; ? BEL
    io.write_all(b"\x1b]11;?\x07")?;
    io.flush()?;

    std::thread::spawn(move || {
        let mut reader = reader;
        let mut buf = [0u8; 256];
        let mut collected: Vec<u8> = Vec::new();
        loop {
            match reader.read(&mut buf) {
                Ok(0) => {}
                Ok(n) => {
                    collected.extend_from_slice(&buf[..n]);
                    if collected.contains(&b'\x07')
                        || collected.windows(2).any(|w| w == b"\x1b\\")
                    {
                        let _ = tx.send(collected);
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    Ok(rx
        .recv_timeout(Duration::from_millis(75))
        .ok()
        .and_then(|bytes| parse_osc11_reply(&String::from_utf8_lossy(&bytes))))
}

fn detect_theme() -> Option<HighlightBackground> {
    let _raw = enable_raw_mode();
    let result = query_terminal_background();
    let _ = disable_raw_mode();
    result
        .ok()
        .flatten()
        .map(|(r, g, b)| background_from_rgb(r, g, b))
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args).context("Invalid command line")?;

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.log_file.as_deref())?;

    match effective.theme.unwrap_or(ThemeMode::Auto) {
        ThemeMode::Auto => set_background_mode(detect_theme()),
        ThemeMode::Light => set_background_mode(Some(HighlightBackground::Light)),
        ThemeMode::Dark => set_background_mode(Some(HighlightBackground::Dark)),
    }

    let history = effective.history.unwrap_or(DEFAULT_HISTORY);
    let window = ConversationWindow::new(history).context("Invalid history size")?;

    let api_key = resolve_api_key(std::env::var(API_KEY_ENV).ok(), &credentials_path())?;
    if api_key.is_none() {
        warn!(
            credentials = %credentials_path().display(),
            "no API key configured, requests will fail"
        );
    }
    let model = effective
        .model
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let timeout = Duration::from_secs(effective.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
    let config = GeminiConfig::new(api_key, model, timeout).with_env_base_url();
    info!(endpoint = %config.endpoint(), history, "starting");
    let client = GeminiClient::new(config).context("Failed to create HTTP client")?;

    // Run the application
    let mut app = App::new(
        ReplyWorker::new(Arc::new(client)),
        ChatSession::new(window),
    )
    .with_welcome(!effective.no_welcome)
    .with_config_paths(
        Some(global_path.clone()),
        if local_path.exists() {
            Some(local_path.clone())
        } else {
            None
        },
    );

    app.run().context("Application error")
}
