//! # hwbridge-adapter-pinctrl
//!
//! GPIO output adapter — switches pins by running
//! `pinctrl set <pin> op dh|dl`.
//!
//! Each call spawns the tool once and waits for it to exit; a non-zero exit
//! status is reported as a driver error for that channel.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `hwbridge-app` and `hwbridge-domain`.

mod error;

pub use error::PinctrlError;

use tokio::process::Command;

use hwbridge_app::ports::OutputDriver;
use hwbridge_domain::channel::ChannelId;
use hwbridge_domain::error::BridgeError;

/// Default name of the pin control tool, resolved through `PATH`.
pub const DEFAULT_PROGRAM: &str = "pinctrl";

/// Output driver backed by the `pinctrl` command-line tool.
#[derive(Debug, Clone)]
pub struct PinctrlDriver {
    program: String,
}

impl PinctrlDriver {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, channel: &ChannelId, active: bool) -> Result<(), PinctrlError> {
        let args = pinctrl_args(channel, active);
        let output = Command::new(&self.program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| PinctrlError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PinctrlError::ExitStatus {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl Default for PinctrlDriver {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

/// Arguments switching `channel` to output, driven high or low.
#[must_use]
pub fn pinctrl_args(channel: &ChannelId, active: bool) -> [&str; 4] {
    let level = if active { "dh" } else { "dl" };
    ["set", channel.as_str(), "op", level]
}

impl OutputDriver for PinctrlDriver {
    async fn set_channel(&self, channel: &ChannelId, active: bool) -> Result<(), BridgeError> {
        tracing::trace!(%channel, active, program = %self.program, "running pin control");
        self.run(channel, active)
            .await
            .map_err(|err| err.into_domain(channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwbridge_domain::error::DriverError;

    #[test]
    fn should_drive_pin_high_when_active() {
        let channel = ChannelId::from("20");
        assert_eq!(pinctrl_args(&channel, true), ["set", "20", "op", "dh"]);
    }

    #[test]
    fn should_drive_pin_low_when_inactive() {
        let channel = ChannelId::from("21");
        assert_eq!(pinctrl_args(&channel, false), ["set", "21", "op", "dl"]);
    }

    #[test]
    fn should_default_to_pinctrl_on_path() {
        assert_eq!(PinctrlDriver::default().program(), "pinctrl");
    }

    #[tokio::test]
    async fn should_succeed_when_tool_exits_cleanly() {
        let driver = PinctrlDriver::new("true");
        let result = driver.set_channel(&ChannelId::from("16"), true).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_report_output_error_on_failed_exit() {
        let driver = PinctrlDriver::new("false");
        let result = driver.set_channel(&ChannelId::from("16"), false).await;
        assert!(matches!(
            result,
            Err(BridgeError::Driver(DriverError::Output { ref channel, .. })) if channel == "16"
        ));
    }

    #[tokio::test]
    async fn should_report_output_error_when_tool_missing() {
        let driver = PinctrlDriver::new("/nonexistent/hwbridge-pinctrl");
        let result = driver.set_channel(&ChannelId::from("20"), true).await;
        assert!(matches!(
            result,
            Err(BridgeError::Driver(DriverError::Output { .. }))
        ));
    }
}
