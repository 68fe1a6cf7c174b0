//! glassterm - the command-execution core of a translucent terminal window.
//!
//! This library provides the session and process layer a terminal frontend
//! builds on:
//! - session control: line classification (builtins vs. delegated commands),
//!   working-directory tracking, one command in flight at a time
//! - process management: one child shell per delegated command, incremental
//!   UTF-8 output streaming, push-notified completion
//! - sudo handling: credential probe and password-prompt flow
//! - persisted appearance settings
//!
//! The frontend renders by consuming [`event::SessionEvent`]s; the only call
//! back into it is the password prompt. `src/main.rs` is a minimal stdio
//! frontend showing the wiring.
//!
//! # Example
//!
//! ```no_run
//! use glassterm::ui::NoPrompt;
//! use glassterm::{SessionController, init_session_events};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (events, mut rx) = init_session_events();
//!     let mut session = SessionController::new(events)?;
//!
//!     session.submit("echo hello", &mut NoPrompt).await?;
//!     while let Some(event) = rx.recv().await {
//!         println!("{event:?}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod event;
pub mod session;
pub mod settings;
pub mod shell;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use event::{SessionEvent, init_session_events};
pub use session::{CommandOutcome, SessionController};
pub use settings::{Appearance, Settings};
pub use shell::{ProcessHandle, ProcessManager, SudoGate};
