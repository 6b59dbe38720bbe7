//! bccs-chat - terminal chat client
//!
//! Streams replies from the club's `/api/v1/llm` endpoint into a terminal UI,
//! a plain REPL, or straight to stdout for a single prompt.

use std::path::PathBuf;

use bccs_chat::runner::{run_plain, run_prompt, run_tui, AppConfig};
use clap::Parser;

/// bccs club | 🤖 chat
#[derive(Parser, Debug)]
#[command(name = "bccs-chat")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Change to this directory before running
    #[arg(short = 'C', long, visible_alias = "directory")]
    cwd: Option<String>,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    debug: bool,

    /// Enable verbose (trace-level) logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Backend base URL (overrides BCCS_BACKEND_URL and the settings file)
    #[arg(long, value_name = "URL")]
    backend_url: Option<String>,

    /// Settings file to use instead of ~/.config/bccs-chat/config.json
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Start the conversation without the greeting message
    #[arg(long)]
    no_greeting: bool,

    /// Use the plain line-mode REPL instead of the terminal UI
    #[arg(long, conflicts_with = "prompt")]
    plain: bool,

    /// Send one message, print the streamed reply and exit
    #[arg(short = 'p', long, value_name = "TEXT")]
    prompt: Option<String>,
}

impl From<&Args> for AppConfig {
    fn from(args: &Args) -> Self {
        AppConfig {
            debug: args.debug,
            verbose: args.verbose,
            backend_url: args.backend_url.clone(),
            config_path: args.config.clone(),
            no_greeting: args.no_greeting,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Change directory if requested
    if let Some(cwd) = &args.cwd {
        std::env::set_current_dir(cwd)?;
    }

    let config = AppConfig::from(&args);

    if let Some(prompt) = &args.prompt {
        if prompt.is_empty() {
            anyhow::bail!("--prompt needs a non-empty message");
        }
        run_prompt(config, prompt)
    } else if args.plain {
        run_plain(config)
    } else {
        run_tui(config)
    }
}
