//! Output port — drives a physical output channel.

use std::future::Future;

use hwbridge_domain::channel::ChannelId;
use hwbridge_domain::error::BridgeError;

/// Sets a binary output channel. Fire-and-forget: there is no feedback
/// beyond the returned result.
pub trait OutputDriver: Send + Sync + 'static {
    fn set_channel(
        &self,
        channel: &ChannelId,
        active: bool,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

impl<T: OutputDriver> OutputDriver for std::sync::Arc<T> {
    fn set_channel(
        &self,
        channel: &ChannelId,
        active: bool,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).set_channel(channel, active)
    }
}
