//! Conflict policies.
//!
//! A policy decides the outcome of one conflicting pair. The decision is
//! async so the interactive variant can suspend on the operator prompt
//! without blocking the scheduler task.

use async_trait::async_trait;
use quotesync_engine::{Record, Resolution};

/// Strategy deciding each conflicting pair.
#[async_trait]
pub trait ConflictPolicy: Send + Sync {
    /// Decide which version of a conflicting pair survives.
    async fn decide(&self, local: &Record, remote: &Record) -> Resolution;
}

/// Remote content unconditionally overwrites local content.
pub struct RemoteWins;

#[async_trait]
impl ConflictPolicy for RemoteWins {
    async fn decide(&self, _local: &Record, _remote: &Record) -> Resolution {
        Resolution::KeepRemote
    }
}

/// A yes/no prompt given two human-readable record summaries.
#[async_trait]
pub trait OperatorPrompt: Send + Sync {
    /// `Some(true)` keeps the remote version, `Some(false)` keeps the local
    /// one, `None` means no operator is reachable.
    async fn choose_remote(&self, local: &str, remote: &str) -> Option<bool>;
}

/// Ask the operator per conflict.
///
/// When the prompt is unavailable the policy falls back to remote-wins so
/// the cycle always completes.
pub struct Interactive {
    prompt: Box<dyn OperatorPrompt>,
    push_on_local_win: bool,
}

impl Interactive {
    /// Create an interactive policy around a prompt.
    pub fn new(prompt: Box<dyn OperatorPrompt>, push_on_local_win: bool) -> Self {
        Self {
            prompt,
            push_on_local_win,
        }
    }
}

#[async_trait]
impl ConflictPolicy for Interactive {
    async fn decide(&self, local: &Record, remote: &Record) -> Resolution {
        match self
            .prompt
            .choose_remote(&local.summary(), &remote.summary())
            .await
        {
            Some(true) => Resolution::KeepRemote,
            Some(false) => Resolution::KeepLocal {
                push_upstream: self.push_on_local_win,
            },
            None => {
                tracing::debug!("operator prompt unavailable, keeping remote version");
                Resolution::KeepRemote
            }
        }
    }
}

/// Line-oriented terminal prompt.
///
/// Runs on the blocking thread pool so the scheduler task is suspended, not
/// blocked, while the operator decides.
pub struct StdinPrompt;

#[async_trait]
impl OperatorPrompt for StdinPrompt {
    async fn choose_remote(&self, local: &str, remote: &str) -> Option<bool> {
        let local = local.to_owned();
        let remote = remote.to_owned();

        tokio::task::spawn_blocking(move || {
            use std::io::{BufRead, Write};

            println!("Conflict detected:");
            println!("  local:  {local}");
            println!("  remote: {remote}");
            print!("Keep remote version? [Y/n] ");
            std::io::stdout().flush().ok()?;

            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).ok()?;
            Some(!line.trim().eq_ignore_ascii_case("n"))
        })
        .await
        .ok()
        .flatten()
    }
}
