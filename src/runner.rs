//! Application Runner Module
//!
//! Shared entry points for the TUI, the plain REPL and the one-shot prompt
//! mode. Called by the binary after argument parsing.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::chat::{ChatSession, ChatView};
use crate::client::HttpTransport;
use crate::config::{Settings, SettingsOverrides};

/// Shared application configuration, filled from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Enable debug logging
    pub debug: bool,
    /// Enable verbose (trace-level) logging
    pub verbose: bool,
    /// Backend base URL override
    pub backend_url: Option<String>,
    /// Settings file override
    pub config_path: Option<PathBuf>,
    /// Start without the greeting message
    pub no_greeting: bool,
}

impl AppConfig {
    fn default_filter(&self) -> &'static str {
        if self.verbose {
            "trace"
        } else if self.debug {
            "debug"
        } else {
            "info"
        }
    }

    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            backend_url: self.backend_url.clone(),
            no_greeting: self.no_greeting,
        }
    }
}

/// Resolve settings and build a session against the configured backend.
pub fn build_session(config: &AppConfig) -> anyhow::Result<(ChatSession, Settings)> {
    let settings = Settings::resolve(config.config_path.as_deref(), &config.overrides())
        .context("Failed to load settings")?;

    let transport = HttpTransport::new(&settings.backend_url, settings.connect_timeout())
        .context("Failed to set up HTTP client")?;
    tracing::info!(endpoint = %transport.endpoint(), "Using chat endpoint");

    let view = match &settings.greeting {
        Some(greeting) => ChatView::with_greeting(greeting.clone()),
        None => ChatView::new(),
    };

    Ok((ChatSession::new(view, Arc::new(transport)), settings))
}

/// Log to stderr; used by the line-mode front-ends.
fn init_stderr_logging(config: &AppConfig) {
    // Keep stderr quiet by default so replies are not interleaved with logs.
    let default_filter = if config.verbose || config.debug {
        config.default_filter()
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Run a single prompt and exit.
pub fn run_prompt(config: AppConfig, prompt: &str) -> anyhow::Result<()> {
    init_stderr_logging(&config);

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    runtime.block_on(async {
        let (mut session, _) = build_session(&config)?;
        crate::cli::run_single_prompt(&mut session, prompt).await
    })
}

/// Run the plain line-mode REPL.
pub fn run_plain(config: AppConfig) -> anyhow::Result<()> {
    init_stderr_logging(&config);

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    runtime.block_on(async {
        let (mut session, _) = build_session(&config)?;
        crate::cli::run_interactive(&mut session).await
    })
}

/// Run the TUI application.
///
/// # Errors
///
/// Returns an error if the TUI feature is not enabled or if the TUI fails to start.
#[cfg(feature = "tui")]
pub fn run_tui(config: AppConfig) -> anyhow::Result<()> {
    use std::fs::File;

    // The terminal belongs to the UI, so logs go to a file.
    let dirs = crate::config::XdgDirs::new();
    dirs.ensure_state_dir()
        .context("Failed to create state directory")?;
    let log_path = dirs.log_file();
    let log_file = File::create(&log_path)
        .with_context(|| format!("Failed to create log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter()));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(log_file)),
        )
        .init();

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    runtime.block_on(async {
        let (session, settings) = build_session(&config)?;
        crate::tui::run(session, settings.backend_url).await
    })
}

#[cfg(not(feature = "tui"))]
pub fn run_tui(_config: AppConfig) -> anyhow::Result<()> {
    anyhow::bail!("TUI feature not enabled. Recompile with --features tui or use --plain")
}
