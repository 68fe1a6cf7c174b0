//! Minimal stdio frontend for the glassterm session core.
//!
//! Reads one command per line from standard input and prints streamed
//! output. A GUI frontend replaces this loop with its own widgets; the
//! session API is the same.

use std::io::{BufRead, Write};
use std::thread;

use anyhow::Result;
use tokio::sync::mpsc::{self, Receiver};

use glassterm::ui::{StdioPrompt, display_path};
use glassterm::{SessionController, SessionEvent, init_session_events, utils};

/// Feeds stdin lines into a channel from a dedicated thread, so reading
/// never blocks the event loop.
fn init_input_lines() -> Receiver<String> {
    let (tx, rx) = mpsc::channel(64);
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

#[tokio::main]
async fn main() -> Result<()> {
    utils::logger::init_logging();

    let (events, mut session_events) = init_session_events();
    let mut session = SessionController::new(events)?;
    let mut prompt = StdioPrompt;
    let mut input_lines = init_input_lines();

    println!("📂 {}", display_path(session.working_dir()));

    loop {
        tokio::select! {
            line = input_lines.recv() => {
                let Some(line) = line else { break };
                if session.busy() {
                    println!("(a command is still running)");
                    continue;
                }
                println!("$ {line}");
                if let Err(e) = session.submit(&line, &mut prompt).await {
                    println!("{e:#}");
                }
            }
            event = session_events.recv() => {
                let Some(event) = event else { break };
                handle_event(&mut session, event)?;
            }
        }
    }

    Ok(())
}

fn handle_event(session: &mut SessionController, event: SessionEvent) -> Result<()> {
    let mut out = std::io::stdout().lock();
    match event {
        SessionEvent::Stdout { chunk } => {
            write!(out, "{chunk}")?;
            out.flush()?;
        }
        SessionEvent::Stderr { chunk } => {
            write!(std::io::stderr().lock(), "{chunk}")?;
        }
        SessionEvent::ClearScrollback => {
            // ANSI clear screen + cursor home
            write!(out, "\x1b[2J\x1b[H")?;
            out.flush()?;
        }
        SessionEvent::WorkingDirChanged { path } => {
            writeln!(out, "📂 {}", display_path(&path))?;
        }
        SessionEvent::Info { message } | SessionEvent::CommandError { message } => {
            writeln!(out, "{message}")?;
        }
        SessionEvent::CommandFinished { pid, exit_code } => {
            session.finish_command(pid);
            if let Some(code) = exit_code
                && code != 0
            {
                writeln!(out, "(exit {code})")?;
            }
        }
    }
    Ok(())
}
