pub mod signal_cli;

use async_trait::async_trait;

use crate::error::Result;

pub use signal_cli::SignalCli;

/// Delivers a text message to the configured destinations.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<()>;
}
