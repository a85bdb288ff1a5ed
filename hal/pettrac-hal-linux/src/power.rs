//! OS shutdown request

use std::process::Command;

use log::info;
use pettrac_core::traits::{ShutdownError, ShutdownTrigger};

/// Runs a power-off command without waiting for it
#[derive(Debug, Clone)]
pub struct ShutdownCommand {
    program: String,
    args: Vec<String>,
}

impl Default for ShutdownCommand {
    /// `sudo shutdown -h now`
    fn default() -> Self {
        Self::new("sudo", ["shutdown", "-h", "now"])
    }
}

impl ShutdownCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl ShutdownTrigger for ShutdownCommand {
    fn request_shutdown(&mut self) -> Result<(), ShutdownError> {
        info!("Running {} {}", self.program, self.args.join(" "));
        Command::new(&self.program).args(&self.args).spawn()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_failure_is_reported() {
        let mut command = ShutdownCommand::new("/nonexistent/pettrac-poweroff", Vec::<String>::new());
        assert!(matches!(
            command.request_shutdown(),
            Err(ShutdownError::Spawn(_))
        ));
    }

    #[test]
    fn test_spawn_success() {
        let mut command = ShutdownCommand::new("true", Vec::<String>::new());
        assert!(command.request_shutdown().is_ok());
    }
}
