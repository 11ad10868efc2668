//! # hwbridge-adapter-dbus
//!
//! D-Bus adapter — implements the bus transport port on top of `zbus`.
//!
//! ## How it works
//!
//! - Service lookup resolves a well-known name to its current unique owner
//!   through `org.freedesktop.DBus.GetNameOwner`.
//! - Interfaces are proxies bound to that unique owner, so a restarted
//!   service (new owner) never feeds signals into an old proxy.
//! - Each registered signal listener is a forwarding task that decodes the
//!   single string argument of the signal into an `mpsc` channel.
//! - Presence comes from `NameOwnerChanged`, forwarded unfiltered.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `hwbridge-app` and `hwbridge-domain`.

mod config;
mod error;
mod interface;
mod transport;

pub use config::BusKind;
pub use error::DbusError;
pub use interface::DbusInterface;
pub use transport::DbusTransport;
