use std::process::Stdio;

use async_trait::async_trait;
use log::{debug, info};
use tokio::process::Command;

use crate::config::SignalSettings;
use crate::error::{PriceWatchError, Result};
use crate::notify::Notifier;

/// Sends messages through the `signal-cli` command line client.
///
/// Every value is passed as its own argument, so message text and group
/// ids reach the program verbatim with no shell in between.
pub struct SignalCli {
    settings: SignalSettings,
}

impl SignalCli {
    pub fn new(settings: SignalSettings) -> Self {
        Self { settings }
    }

    fn args<'a>(&'a self, message: &'a str) -> Vec<&'a str> {
        let mut args = vec!["-u", self.settings.username.as_str(), "send"];
        for group in &self.settings.groups {
            args.push("-g");
            args.push(group.as_str());
        }
        args.push("-m");
        args.push(message);
        args
    }
}

#[async_trait]
impl Notifier for SignalCli {
    async fn notify(&self, message: &str) -> Result<()> {
        let args = self.args(message);
        debug!("running {} {:?}", self.settings.program, args);

        let output = Command::new(&self.settings.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(PriceWatchError::Notifier {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        info!(
            "message delivered to {} group(s)",
            self.settings.groups.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier(groups: &[&str]) -> SignalCli {
        SignalCli::new(SignalSettings {
            program: "signal-cli".to_string(),
            username: "+15550001111".to_string(),
            groups: groups.iter().map(|g| g.to_string()).collect(),
        })
    }

    #[test]
    fn each_group_gets_its_own_flag() {
        let cli = notifier(&["groupA", "groupB"]);
        assert_eq!(
            cli.args("hello"),
            vec!["-u", "+15550001111", "send", "-g", "groupA", "-g", "groupB", "-m", "hello"]
        );
    }

    #[test]
    fn shell_metacharacters_stay_inside_one_argument() {
        let cli = notifier(&["groupA"]);
        let message = "up 5%'; rm -rf / #\n$(whoami)";
        let args = cli.args(message);

        assert_eq!(args.last(), Some(&message));
        assert_eq!(args.len(), 7);
    }

    #[tokio::test]
    async fn missing_program_is_an_io_error() {
        let cli = SignalCli::new(SignalSettings {
            program: "/nonexistent/signal-cli".to_string(),
            username: "+1".to_string(),
            groups: vec!["g".to_string()],
        });

        assert!(matches!(
            cli.notify("hi").await,
            Err(PriceWatchError::IoError(_))
        ));
    }
}
