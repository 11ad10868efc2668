//! Command router — decodes inbound actuator payloads and dispatches them.
//!
//! Every failure stays inside [`CommandRouter::route`]: a bad payload is
//! logged and dropped, an unknown actuator is inert, and an output failure
//! is reported by the controller. The caller only sees a [`RouteOutcome`].

use hwbridge_domain::actuator::{ActuatorCommand, ParsedCommand, parse_command};

use crate::ports::OutputDriver;
use crate::services::output_controller::OutputController;

/// What happened to one inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The command was applied to its output channel.
    Dispatched(ActuatorCommand),
    /// The command was handed to the output controller, which failed.
    Failed(ActuatorCommand),
    /// The payload named an actuator we do not drive.
    Ignored { actuator: String },
    /// The payload could not be decoded.
    Dropped,
}

/// Routes decoded commands to the [`OutputController`].
pub struct CommandRouter<O> {
    outputs: OutputController<O>,
}

impl<O: OutputDriver> CommandRouter<O> {
    pub fn new(outputs: OutputController<O>) -> Self {
        Self { outputs }
    }

    /// Decode `payload` and dispatch it.
    pub async fn route(&self, payload: &str) -> RouteOutcome {
        tracing::debug!(payload, "actuator payload received");

        let command = match parse_command(payload) {
            Ok(ParsedCommand::Known(command)) => command,
            Ok(ParsedCommand::Unknown { actuator }) => {
                tracing::debug!(%actuator, "ignoring command for unknown actuator");
                return RouteOutcome::Ignored { actuator };
            }
            Err(err) => {
                tracing::warn!(%err, payload, "dropping undecodable actuator payload");
                return RouteOutcome::Dropped;
            }
        };

        match self.outputs.apply(&command).await {
            Ok(()) => RouteOutcome::Dispatched(command),
            Err(_) => RouteOutcome::Failed(command),
        }
    }
}
