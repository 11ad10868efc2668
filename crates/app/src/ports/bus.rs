//! Bus transport port — service lookup, signal subscription, method calls
//! and service presence notifications.

use std::future::Future;

use tokio::sync::mpsc;

use hwbridge_domain::error::BridgeError;
use hwbridge_domain::presence::ServicePresenceEvent;
use hwbridge_domain::target::ServiceRef;

/// Receiver of the string payloads carried by one registered signal listener.
///
/// The stream ends when the listener is detached or the transport drops it.
pub type SignalListener = mpsc::Receiver<String>;

/// Receiver of process-wide service presence events, in delivery order.
pub type PresenceEvents = mpsc::Receiver<ServicePresenceEvent>;

/// A live interface of a remote service.
pub trait RemoteInterface: Send + Sync + 'static {
    /// Register a listener on `signal`.
    ///
    /// Every registration receives its own copy of each emission until
    /// [`off`](Self::off) is called for the same signal.
    fn on(&self, signal: &str) -> impl Future<Output = Result<SignalListener, BridgeError>> + Send;

    /// Detach every listener registered on `signal` through this interface.
    fn off(&self, signal: &str) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Invoke `method` with a single string argument, discarding the reply.
    fn invoke(
        &self,
        method: &str,
        argument: String,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

/// Connection to an inter-process bus.
pub trait BusTransport: Send + Sync + 'static {
    type Interface: RemoteInterface;

    /// Resolve a well-known service name to its current owner.
    fn lookup_service(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<ServiceRef, BridgeError>> + Send;

    /// Acquire an interface of a service previously found with
    /// [`lookup_service`](Self::lookup_service).
    fn get_interface(
        &self,
        service: &ServiceRef,
        object_path: &str,
        interface: &str,
    ) -> impl Future<Output = Result<Self::Interface, BridgeError>> + Send;

    /// Start receiving ownership changes of every bus name.
    fn watch_presence(&self) -> impl Future<Output = Result<PresenceEvents, BridgeError>> + Send;
}
