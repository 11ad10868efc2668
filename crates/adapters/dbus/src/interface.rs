//! [`RemoteInterface`] implementation over a zbus proxy.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt as _;
use zbus::{Connection, Proxy};

use hwbridge_app::ports::{RemoteInterface, SignalListener};
use hwbridge_domain::error::BridgeError;

use crate::error::DbusError;

const SIGNAL_BUFFER: usize = 32;

/// Proxy on one interface of the control service, plus the forwarding
/// tasks of its registered signal listeners.
pub struct DbusInterface {
    proxy: Proxy<'static>,
    listeners: Mutex<HashMap<String, Vec<JoinHandle<()>>>>,
}

impl DbusInterface {
    pub(crate) async fn new(
        conn: &Connection,
        destination: String,
        object_path: &str,
        interface: &str,
    ) -> Result<Self, DbusError> {
        let proxy = Proxy::new(
            conn,
            destination.clone(),
            object_path.to_string(),
            interface.to_string(),
        )
        .await
        .map_err(|err| classify(&format!("{destination} {object_path} {interface}"), err))?;

        tracing::debug!(
            destination = %destination,
            object_path,
            interface,
            "interface proxy created"
        );

        Ok(Self {
            proxy,
            listeners: Mutex::new(HashMap::new()),
        })
    }

    fn listeners(&self) -> MutexGuard<'_, HashMap<String, Vec<JoinHandle<()>>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Name-syntax failures become [`DbusError::InvalidAddress`], everything
/// else [`DbusError::Call`].
fn classify(value: &str, err: zbus::Error) -> DbusError {
    match err {
        zbus::Error::Names(_) | zbus::Error::Variant(_) => DbusError::InvalidAddress {
            value: value.to_string(),
            source: err,
        },
        other => DbusError::Call(other),
    }
}

impl RemoteInterface for DbusInterface {
    async fn on(&self, signal: &str) -> Result<SignalListener, BridgeError> {
        let stream = self
            .proxy
            .receive_signal(signal.to_string())
            .await
            .map_err(|err| classify(signal, err))?;
        let (tx, rx) = mpsc::channel(SIGNAL_BUFFER);

        let name = signal.to_string();
        let task = tokio::spawn(async move {
            tokio::pin!(stream);
            while let Some(message) = stream.next().await {
                match message.body().deserialize::<String>() {
                    Ok(payload) => {
                        if tx.send(payload).await.is_err() {
                            break;
                        }
                    }
                    Err(source) => {
                        let err = DbusError::SignalBody {
                            signal: name.clone(),
                            source,
                        };
                        tracing::warn!(%err, "dropping signal");
                    }
                }
            }
            tracing::debug!(signal = %name, "signal forwarder stopped");
        });

        self.listeners()
            .entry(signal.to_string())
            .or_default()
            .push(task);
        Ok(rx)
    }

    async fn off(&self, signal: &str) -> Result<(), BridgeError> {
        let removed = self.listeners().remove(signal).unwrap_or_default();
        for task in &removed {
            task.abort();
        }
        tracing::debug!(signal, count = removed.len(), "signal listeners detached");
        Ok(())
    }

    async fn invoke(&self, method: &str, argument: String) -> Result<(), BridgeError> {
        self.proxy
            .call_method(method, &(argument,))
            .await
            .map_err(|err| classify(method, err))?;
        Ok(())
    }
}

impl Drop for DbusInterface {
    fn drop(&mut self) {
        let listeners = self
            .listeners
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for task in listeners.drain().flat_map(|(_, tasks)| tasks) {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwbridge_domain::error::TransportError;

    #[test]
    fn should_classify_name_errors_as_invalid_address() {
        let name_err = zbus::names::BusName::try_from("not a name").unwrap_err();
        let err = classify("not a name", name_err.into());
        assert!(matches!(
            err,
            DbusError::InvalidAddress { ref value, .. } if value == "not a name"
        ));
    }

    #[test]
    fn should_classify_other_errors_as_call_failures() {
        let err: BridgeError = classify("setMeasurement", zbus::Error::InvalidReply).into();
        assert!(matches!(err, BridgeError::Transport(TransportError::Bus(_))));
    }
}
