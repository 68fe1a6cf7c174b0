//! Privilege escalation flow for `sudo`-prefixed commands.
//!
//! Before spawning anything, the session probes whether sudo credentials are
//! already cached (`sudo -n true`). If they are, the original line runs
//! unchanged. If not, the frontend is asked for a password and the command is
//! rebuilt around `sudo -S`. The probe is a separate short-lived child; only
//! the final spawn becomes the session's active delegated command.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::debug;

use crate::ui::PasswordPrompt;

/// Decision produced by the escalation flow for one `sudo`-prefixed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Escalation {
    /// Spawn this command line as the delegated command.
    Run { command_line: String },
    /// User declined the password prompt; nothing is spawned.
    Cancelled,
}

/// Credential probe and command rewriting for sudo.
pub struct SudoGate {
    probe_program: String,
}

impl Default for SudoGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SudoGate {
    pub fn new() -> Self {
        Self {
            probe_program: "sudo".to_string(),
        }
    }

    /// Uses a different binary for the credential probe. Lets tests force
    /// either probe outcome without sudo being installed.
    pub fn with_probe_program(program: impl Into<String>) -> Self {
        Self {
            probe_program: program.into(),
        }
    }

    /// Non-interactive credential check: `sudo -n true` exits 0 when
    /// credentials are cached. This is a blocking wait, expected sub-second,
    /// and never runs while a delegated command is active.
    pub async fn credentials_cached(&self) -> Result<bool> {
        let status = Command::new(&self.probe_program)
            .args(["-n", "true"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .with_context(|| format!("Failed to run credential probe {}", self.probe_program))?;
        debug!(cached = status.success(), "sudo credential probe");
        Ok(status.success())
    }

    /// Runs the full escalation flow for `line` (which starts with `sudo `).
    pub async fn escalate(
        &self,
        line: &str,
        prompt: &mut dyn PasswordPrompt,
    ) -> Result<Escalation> {
        if self.credentials_cached().await? {
            return Ok(Escalation::Run {
                command_line: line.to_string(),
            });
        }

        match prompt.prompt_password("Enter sudo password:") {
            Some(password) => Ok(Escalation::Run {
                command_line: pipeline(&password, strip_sudo(line)),
            }),
            None => Ok(Escalation::Cancelled),
        }
    }
}

/// Builds the `sudo -S` pipeline that feeds the password on stdin.
///
/// Caveat: the password is part of the shell command line and therefore
/// briefly visible to local process listings. This matches the reference
/// behavior; an integrator wanting the safer route (writing to the child's
/// stdin directly, or an askpass helper) replaces this one function.
pub fn pipeline(password: &str, command: &str) -> String {
    format!("echo {password} | sudo -S {command}")
}

fn strip_sudo(line: &str) -> &str {
    line.strip_prefix("sudo ").unwrap_or(line).trim_start()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticPrompt(Option<String>);

    impl PasswordPrompt for StaticPrompt {
        fn prompt_password(&mut self, _title: &str) -> Option<String> {
            self.0.clone()
        }
    }

    #[test]
    fn test_pipeline_template() {
        assert_eq!(pipeline("x", "whoami"), "echo x | sudo -S whoami");
    }

    #[tokio::test]
    async fn test_cached_credentials_run_line_unchanged() {
        // `true -n true` exits 0, simulating cached credentials
        let gate = SudoGate::with_probe_program("true");
        let mut prompt = StaticPrompt(None);
        let decision = gate.escalate("sudo apt update", &mut prompt).await.unwrap();
        assert_eq!(
            decision,
            Escalation::Run {
                command_line: "sudo apt update".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_password_embedded_in_pipeline() {
        // `false -n true` exits 1, simulating missing credentials
        let gate = SudoGate::with_probe_program("false");
        let mut prompt = StaticPrompt(Some("x".to_string()));
        let decision = gate.escalate("sudo whoami", &mut prompt).await.unwrap();
        assert_eq!(
            decision,
            Escalation::Run {
                command_line: "echo x | sudo -S whoami".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_declined_prompt_cancels() {
        let gate = SudoGate::with_probe_program("false");
        let mut prompt = StaticPrompt(None);
        let decision = gate.escalate("sudo whoami", &mut prompt).await.unwrap();
        assert_eq!(decision, Escalation::Cancelled);
    }

    #[tokio::test]
    async fn test_missing_probe_binary_is_an_error() {
        let gate = SudoGate::with_probe_program("/nonexistent/sudo");
        let mut prompt = StaticPrompt(None);
        assert!(gate.escalate("sudo id", &mut prompt).await.is_err());
    }
}
