//! CLI runner for interactive and single-prompt modes.

use std::io::Write;

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use super::commands::{show_help, show_history, Command};
use crate::chat::{ChatEvent, ChatSession};

/// Send one prompt, stream the reply to stdout and return.
///
/// Fails if the exchange failed, so the process exits non-zero.
pub async fn run_single_prompt(session: &mut ChatSession, prompt: &str) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    send_and_stream(session, prompt, &mut stdout).await?;

    if let Some(error) = session.view().last_error() {
        anyhow::bail!("{}", error);
    }
    Ok(())
}

/// Run the line-mode REPL on stdin/stdout.
pub async fn run_interactive(session: &mut ChatSession) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    print_banner(&mut stdout)?;
    repl(session, stdin, &mut stdout).await
}

/// REPL loop over any line source, so tests can drive it.
pub async fn repl<R, W>(session: &mut ChatSession, input: R, out: &mut W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if let Some(greeting) = session.view().messages().first() {
        writeln!(out, "\x1b[1;33mbot\x1b[0m {}\n", greeting.content.as_str())?;
    }

    let mut lines = input.lines();
    loop {
        write!(out, "\x1b[1;36m› \x1b[0m")?;
        out.flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            writeln!(out)?;
            break;
        };

        match Command::parse(&line) {
            Some(Command::Quit) => break,
            Some(Command::Help) => show_help(out)?,
            Some(Command::History) => show_history(session.view(), out)?,
            Some(Command::Unknown(name)) => {
                writeln!(out, "\x1b[31mUnknown command: /{}\x1b[0m (try /help)", name)?
            }
            None => {
                if line.is_empty() {
                    continue;
                }
                send_and_stream(session, &line, out).await?;
                if let Some(error) = session.view().last_error() {
                    writeln!(out, "\x1b[31m✗ {}\x1b[0m", error)?;
                }
            }
        }
    }
    Ok(())
}

/// Submit `text` and write reply chunks to `out` as they arrive.
async fn send_and_stream<W: Write>(
    session: &mut ChatSession,
    text: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    session.set_input(text);
    if session.submit().is_none() {
        return Ok(());
    }

    let mut write_result = Ok(());
    session
        .run_until_idle(|event| {
            if let ChatEvent::Chunk { text, .. } = event {
                if write_result.is_ok() {
                    write_result = write!(out, "{}", text);
                }
                if write_result.is_ok() {
                    write_result = out.flush();
                }
            }
        })
        .await;
    write_result?;
    writeln!(out)?;
    Ok(())
}

fn print_banner(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "  \x1b[1;33mbccs club\x1b[0m \x1b[2m| 🤖 chat  v{}\x1b[0m",
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(
        out,
        "  \x1b[2mType \x1b[0m\x1b[1;36m/help\x1b[0m\x1b[2m for commands, or start chatting!\x1b[0m"
    )?;
    writeln!(out)
}
