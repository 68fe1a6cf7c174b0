//! Session state and command classification.
//!
//! One [`SessionController`] per terminal window. It interprets each
//! submitted line, tracks the working directory, owns the persisted
//! appearance settings, and forwards delegated commands to the process
//! layer one at a time.
//!
//! Classification, in priority order:
//! 1. empty / whitespace-only lines are ignored
//! 2. `clear` asks the frontend to discard its scrollback
//! 3. `cd` moves to the home directory
//! 4. `cd <path>` moves to an absolute path or one relative to the current
//!    working directory
//! 5. `sudo <cmd>` goes through the credential probe and password prompt
//! 6. everything else runs as `<shell> -c <line>`

mod outcome;

pub use outcome::CommandOutcome;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::event::SessionEvent;
use crate::settings::{Appearance, Settings};
use crate::shell::{Escalation, ProcessHandle, ProcessManager, SudoGate};
use crate::ui::PasswordPrompt;

/// Long-lived state of one terminal window.
pub struct SessionController {
    working_dir: PathBuf,
    active: Option<ProcessHandle>,
    processes: ProcessManager,
    sudo: SudoGate,
    settings: Settings,
    settings_path: PathBuf,
    event_sink: UnboundedSender<SessionEvent>,
}

impl SessionController {
    /// Creates a session rooted at the process's starting directory, with
    /// settings at the default path.
    pub fn new(event_sink: UnboundedSender<SessionEvent>) -> Result<Self> {
        Self::with_settings_path(event_sink, Settings::default_path())
    }

    /// Creates a session with an explicit settings file location.
    pub fn with_settings_path(
        event_sink: UnboundedSender<SessionEvent>,
        settings_path: PathBuf,
    ) -> Result<Self> {
        let working_dir =
            std::env::current_dir().context("Failed to read the starting directory")?;
        let settings = Settings::load_or_create(&settings_path)?;
        info!(dir = %working_dir.display(), "session started");

        Ok(Self {
            working_dir,
            active: None,
            processes: ProcessManager::new(event_sink.clone()),
            sudo: SudoGate::new(),
            settings,
            settings_path,
            event_sink,
        })
    }

    /// Interprets one submitted line.
    ///
    /// Returns after classification and (for delegated commands) the spawn;
    /// output streams in the background via session events. Fails without
    /// side effects while a delegated command is still running.
    pub async fn submit(
        &mut self,
        line: &str,
        prompt: &mut dyn PasswordPrompt,
    ) -> Result<CommandOutcome> {
        if self.busy() {
            bail!("A command is already running");
        }

        let line = line.trim();
        if line.is_empty() {
            return Ok(CommandOutcome::Builtin);
        }

        if line.eq_ignore_ascii_case("clear") {
            self.send(SessionEvent::ClearScrollback);
            return Ok(CommandOutcome::Builtin);
        }

        if line == "cd" {
            self.working_dir = home_dir();
            debug!(dir = %self.working_dir.display(), "cd to home");
            self.announce_working_dir();
            return Ok(CommandOutcome::Builtin);
        }

        if let Some(target) = line.strip_prefix("cd ") {
            return Ok(self.change_dir(target.trim()));
        }

        if line.starts_with("sudo ") {
            return self.submit_sudo(line, prompt).await;
        }

        Ok(self.delegate(line))
    }

    /// True while a delegated command's child process is running. New
    /// submissions are rejected until [`Self::finish_command`] runs.
    pub fn busy(&self) -> bool {
        self.active.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Called by the frontend when it observes
    /// [`SessionEvent::CommandFinished`]. Clears the active command and
    /// re-validates the working directory, since the finished command may
    /// have removed it.
    ///
    /// The pid must match the active handle. A completion can sit in the
    /// event queue while a newer command is already running (submission is
    /// allowed as soon as the previous child exits); such a stale event must
    /// not wipe the new command's handle.
    pub fn finish_command(&mut self, pid: Option<u32>) {
        match &self.active {
            Some(handle) if handle.pid() == pid => self.active = None,
            Some(_) => {
                debug!(?pid, "ignoring completion of a superseded command");
                return;
            }
            None => return,
        }
        if !self.working_dir.is_dir() {
            let home = home_dir();
            warn!(
                gone = %self.working_dir.display(),
                "working directory vanished, falling back to {}",
                home.display()
            );
            self.working_dir = home;
        }
        self.announce_working_dir();
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn appearance(&self) -> &Appearance {
        &self.settings.appearance
    }

    /// Replaces the appearance settings and persists them immediately.
    pub fn set_appearance(&mut self, appearance: Appearance) -> Result<()> {
        self.settings.appearance = appearance;
        self.settings.save(&self.settings_path)
    }

    fn change_dir(&mut self, target: &str) -> CommandOutcome {
        let candidate = if Path::new(target).is_absolute() {
            PathBuf::from(target)
        } else {
            self.working_dir.join(target)
        };

        if candidate.is_dir() {
            // Resolve `..` and symlinks so the tracked path stays clean
            self.working_dir = std::fs::canonicalize(&candidate).unwrap_or(candidate);
            debug!(dir = %self.working_dir.display(), "cd");
            self.announce_working_dir();
            CommandOutcome::Builtin
        } else {
            self.send(SessionEvent::CommandError {
                message: format!("Directory not found: {target}"),
            });
            CommandOutcome::Error
        }
    }

    async fn submit_sudo(
        &mut self,
        line: &str,
        prompt: &mut dyn PasswordPrompt,
    ) -> Result<CommandOutcome> {
        match self.sudo.escalate(line, prompt).await {
            Ok(Escalation::Run { command_line }) => Ok(self.delegate(&command_line)),
            Ok(Escalation::Cancelled) => {
                self.send(SessionEvent::Info {
                    message: "Sudo command cancelled".to_string(),
                });
                Ok(CommandOutcome::Builtin)
            }
            Err(e) => {
                warn!("credential probe failed: {e:#}");
                self.send(SessionEvent::CommandError {
                    message: format!("{e:#}"),
                });
                Ok(CommandOutcome::Error)
            }
        }
    }

    fn delegate(&mut self, command_line: &str) -> CommandOutcome {
        match self.processes.spawn(command_line, &self.working_dir) {
            Ok(handle) => {
                self.active = Some(handle);
                CommandOutcome::Delegated
            }
            Err(e) => {
                warn!("spawn failed: {e:#}");
                self.send(SessionEvent::CommandError {
                    message: format!("{e:#}"),
                });
                CommandOutcome::Error
            }
        }
    }

    fn announce_working_dir(&self) {
        self.send(SessionEvent::WorkingDirChanged {
            path: self.working_dir.clone(),
        });
    }

    fn send(&self, event: SessionEvent) {
        if self.event_sink.send(event).is_err() {
            debug!("event receiver dropped");
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        // Settings are written at session end, matching saves on change
        if let Err(e) = self.settings.save(&self.settings_path) {
            warn!("failed to save settings on exit: {e:#}");
        }
    }
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/".to_string()))
}
