//! [`BusTransport`] implementation over a zbus connection.

use tokio::sync::mpsc;
use tokio_stream::StreamExt as _;
use zbus::Connection;
use zbus::fdo::{self, DBusProxy};
use zbus::names::{BusName, UniqueName};

use hwbridge_app::ports::{BusTransport, PresenceEvents};
use hwbridge_domain::error::BridgeError;
use hwbridge_domain::presence::ServicePresenceEvent;
use hwbridge_domain::target::ServiceRef;

use crate::config::BusKind;
use crate::error::DbusError;
use crate::interface::DbusInterface;

const PRESENCE_BUFFER: usize = 64;

/// Connection to one message bus plus a proxy on the bus daemon itself.
pub struct DbusTransport {
    conn: Connection,
    dbus: DBusProxy<'static>,
}

impl DbusTransport {
    /// Connect to the requested bus.
    ///
    /// # Errors
    ///
    /// Returns [`DbusError::Connect`] when the bus socket cannot be reached
    /// or authentication fails.
    pub async fn connect(kind: BusKind) -> Result<Self, DbusError> {
        let conn = match kind {
            BusKind::System => Connection::system().await,
            BusKind::Session => Connection::session().await,
        }
        .map_err(|source| DbusError::Connect {
            bus: kind.as_str(),
            source,
        })?;

        let dbus = DBusProxy::new(&conn)
            .await
            .map_err(|source| DbusError::Connect {
                bus: kind.as_str(),
                source,
            })?;

        tracing::info!(
            bus = %kind,
            unique_name = ?conn.unique_name().map(ToString::to_string),
            "connected to message bus"
        );
        Ok(Self { conn, dbus })
    }
}

impl BusTransport for DbusTransport {
    type Interface = DbusInterface;

    async fn lookup_service(&self, name: &str) -> Result<ServiceRef, BridgeError> {
        let bus_name = BusName::try_from(name).map_err(|err| DbusError::InvalidAddress {
            value: name.to_string(),
            source: err.into(),
        })?;

        let owner = self
            .dbus
            .get_name_owner(bus_name)
            .await
            .map_err(|err| owner_lookup_error(name, err))?;

        Ok(ServiceRef {
            name: name.to_string(),
            owner: owner.to_string(),
        })
    }

    async fn get_interface(
        &self,
        service: &ServiceRef,
        object_path: &str,
        interface: &str,
    ) -> Result<DbusInterface, BridgeError> {
        let destination = if service.owner.is_empty() {
            service.name.clone()
        } else {
            service.owner.clone()
        };
        Ok(DbusInterface::new(&self.conn, destination, object_path, interface).await?)
    }

    async fn watch_presence(&self) -> Result<PresenceEvents, BridgeError> {
        let stream = self
            .dbus
            .receive_name_owner_changed()
            .await
            .map_err(DbusError::Call)?;
        let (tx, rx) = mpsc::channel(PRESENCE_BUFFER);

        tokio::spawn(async move {
            tokio::pin!(stream);
            while let Some(signal) = stream.next().await {
                let args = match signal.args() {
                    Ok(args) => args,
                    Err(err) => {
                        tracing::warn!(%err, "undecodable NameOwnerChanged signal");
                        continue;
                    }
                };
                let old_owner: &Option<UniqueName<'_>> = args.old_owner();
                let new_owner: &Option<UniqueName<'_>> = args.new_owner();
                let event = ServicePresenceEvent::new(
                    args.name().to_string(),
                    old_owner.as_ref().map(ToString::to_string),
                    new_owner.as_ref().map(ToString::to_string),
                );
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            tracing::debug!("presence forwarder stopped");
        });

        Ok(rx)
    }
}

/// Only a missing owner means the service is absent; anything else is a bus
/// failure.
fn owner_lookup_error(name: &str, err: fdo::Error) -> DbusError {
    match err {
        fdo::Error::NameHasNoOwner(_) => DbusError::NameNotOwned(name.to_string()),
        other => {
            tracing::debug!(err = %other, service = name, "name owner lookup failed");
            DbusError::Call(other.into())
        }
    }
}
