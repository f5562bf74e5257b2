//! Client side of the command channel

use tokio::sync::{mpsc, oneshot};

use super::types::{Command, CommandError, StatsReport};

/// Create a command channel of the given capacity
pub fn channel(capacity: usize) -> (CommandHandle, mpsc::Receiver<Command>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (CommandHandle { tx }, rx)
}

/// Cloneable sender used by command listeners
#[derive(Debug, Clone)]
pub struct CommandHandle {
    tx: mpsc::Sender<Command>,
}

impl CommandHandle {
    /// Returns true if the symbol was not muted before
    pub async fn mute(&self, symbol: &str) -> Result<bool, CommandError> {
        let symbol = symbol.trim().to_ascii_uppercase();
        self.request(|reply| Command::Mute { symbol, reply }).await
    }

    pub async fn list_muted(&self) -> Result<Vec<String>, CommandError> {
        self.request(|reply| Command::ListMuted { reply }).await
    }

    pub async fn stats(&self, n: usize) -> Result<StatsReport, CommandError> {
        self.request(|reply| Command::Stats { n, reply }).await
    }

    pub async fn reset(&self) -> Result<(), CommandError> {
        self.request(|reply| Command::Reset { reply }).await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, CommandError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| CommandError::Closed)?;
        rx.await.map_err(|_| CommandError::NoReply)
    }
}
