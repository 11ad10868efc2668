//! In-memory message bus.
//!
//! Emissions are delivered to every interface ever acquired for a service,
//! whichever instance of the service it was acquired from. A listener that
//! was never detached therefore keeps receiving after a restart, which is
//! exactly what the bridge must avoid.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use hwbridge_app::ports::{BusTransport, PresenceEvents, RemoteInterface, SignalListener};
use hwbridge_domain::error::{BridgeError, TransportError};
use hwbridge_domain::presence::ServicePresenceEvent;
use hwbridge_domain::target::ServiceRef;

const PRESENCE_BUFFER: usize = 64;
const SIGNAL_BUFFER: usize = 32;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct InterfaceState {
    listeners: HashMap<String, Vec<mpsc::Sender<String>>>,
    calls: Vec<(String, String)>,
}

impl InterfaceState {
    fn listener_count(&self, signal: &str) -> usize {
        self.listeners.get(signal).map_or(0, Vec::len)
    }
}

struct Acquired {
    service: String,
    state: Arc<Mutex<InterfaceState>>,
}

#[derive(Default)]
struct BusState {
    /// Running services by well-known name, with their unique owner.
    services: HashMap<String, String>,
    next_owner: u32,
    acquired: Vec<Acquired>,
    watchers: Vec<mpsc::Sender<ServicePresenceEvent>>,
    peak_listeners: usize,
}

impl BusState {
    fn listener_total(&self, service: &str, signal: &str) -> usize {
        self.acquired
            .iter()
            .filter(|iface| iface.service == service)
            .map(|iface| lock(&iface.state).listener_count(signal))
            .sum()
    }

    fn announce(&mut self, event: &ServicePresenceEvent) {
        self.watchers.retain(|tx| {
            !matches!(
                tx.try_send(event.clone()),
                Err(mpsc::error::TrySendError::Closed(_))
            )
        });
    }
}

/// Shared handle on an in-memory bus. Clones observe the same bus.
#[derive(Clone, Default)]
pub struct VirtualBus {
    state: Arc<Mutex<BusState>>,
}

impl VirtualBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `name` and announce it. Returns its unique owner; starting a
    /// running service returns the current owner without an announcement.
    pub fn start_service(&self, name: &str) -> String {
        let mut state = lock(&self.state);
        if let Some(owner) = state.services.get(name) {
            return owner.clone();
        }
        state.next_owner += 1;
        let owner = format!(":1.{}", state.next_owner);
        state.services.insert(name.to_string(), owner.clone());
        state.announce(&ServicePresenceEvent::appeared(name, owner.as_str()));
        tracing::debug!(service = name, %owner, "virtual service started");
        owner
    }

    /// Stop `name` and announce it. Stopping a stopped service is a no-op.
    pub fn stop_service(&self, name: &str) {
        let mut state = lock(&self.state);
        if let Some(owner) = state.services.remove(name) {
            state.announce(&ServicePresenceEvent::vanished(name, owner.as_str()));
            tracing::debug!(service = name, %owner, "virtual service stopped");
        }
    }

    /// Hand `name` over to a new owner in one step, as a replacing
    /// connection does. Returns the new owner, or `None` when the service
    /// is not running.
    pub fn replace_service(&self, name: &str) -> Option<String> {
        let mut state = lock(&self.state);
        let old = state.services.get(name).cloned()?;
        state.next_owner += 1;
        let new = format!(":1.{}", state.next_owner);
        state.services.insert(name.to_string(), new.clone());
        state.announce(&ServicePresenceEvent::new(name, Some(old.clone()), Some(new.clone())));
        tracing::debug!(service = name, %old, %new, "virtual service replaced");
        Some(new)
    }

    /// Emit `signal` from `service`. Returns how many listeners received it.
    pub fn emit(&self, service: &str, signal: &str, payload: &str) -> usize {
        let state = lock(&self.state);
        state
            .acquired
            .iter()
            .filter(|iface| iface.service == service)
            .map(|iface| {
                lock(&iface.state)
                    .listeners
                    .get(signal)
                    .map_or(0, |senders| {
                        senders
                            .iter()
                            .filter(|tx| tx.try_send(payload.to_string()).is_ok())
                            .count()
                    })
            })
            .sum()
    }

    /// Listeners currently registered on `signal` of `service`, across all
    /// acquired interfaces.
    #[must_use]
    pub fn listener_count(&self, service: &str, signal: &str) -> usize {
        lock(&self.state).listener_total(service, signal)
    }

    /// Highest listener count ever observed for any single signal.
    #[must_use]
    pub fn peak_listeners(&self) -> usize {
        lock(&self.state).peak_listeners
    }

    /// Number of interfaces acquired for `service` so far.
    #[must_use]
    pub fn interfaces_acquired(&self, service: &str) -> usize {
        lock(&self.state)
            .acquired
            .iter()
            .filter(|iface| iface.service == service)
            .count()
    }

    /// Every method call received by `service`, in order of acquisition.
    #[must_use]
    pub fn calls(&self, service: &str) -> Vec<(String, String)> {
        lock(&self.state)
            .acquired
            .iter()
            .filter(|iface| iface.service == service)
            .flat_map(|iface| lock(&iface.state).calls.clone())
            .collect()
    }
}

/// An interface handed out by a [`VirtualBus`].
pub struct VirtualInterface {
    service: String,
    owner: String,
    state: Arc<Mutex<InterfaceState>>,
    bus: Arc<Mutex<BusState>>,
}

impl RemoteInterface for VirtualInterface {
    async fn on(&self, signal: &str) -> Result<SignalListener, BridgeError> {
        let (tx, rx) = mpsc::channel(SIGNAL_BUFFER);
        lock(&self.state)
            .listeners
            .entry(signal.to_string())
            .or_default()
            .push(tx);

        let mut bus = lock(&self.bus);
        let total = bus.listener_total(&self.service, signal);
        bus.peak_listeners = bus.peak_listeners.max(total);
        Ok(rx)
    }

    async fn off(&self, signal: &str) -> Result<(), BridgeError> {
        lock(&self.state).listeners.remove(signal);
        Ok(())
    }

    async fn invoke(&self, method: &str, argument: String) -> Result<(), BridgeError> {
        let running = lock(&self.bus).services.get(&self.service).cloned();
        if running.as_deref() != Some(self.owner.as_str()) {
            return Err(TransportError::ServiceNotFound {
                service: self.service.clone(),
            }
            .into());
        }
        lock(&self.state).calls.push((method.to_string(), argument));
        Ok(())
    }
}

impl BusTransport for VirtualBus {
    type Interface = VirtualInterface;

    async fn lookup_service(&self, name: &str) -> Result<ServiceRef, BridgeError> {
        let owner = lock(&self.state).services.get(name).cloned().ok_or_else(|| {
            TransportError::ServiceNotFound {
                service: name.to_string(),
            }
        })?;
        Ok(ServiceRef {
            name: name.to_string(),
            owner,
        })
    }

    async fn get_interface(
        &self,
        service: &ServiceRef,
        _object_path: &str,
        _interface: &str,
    ) -> Result<VirtualInterface, BridgeError> {
        let mut state = lock(&self.state);
        if state.services.get(&service.name) != Some(&service.owner) {
            return Err(TransportError::ServiceNotFound {
                service: service.name.clone(),
            }
            .into());
        }

        let iface_state = Arc::new(Mutex::new(InterfaceState::default()));
        state.acquired.push(Acquired {
            service: service.name.clone(),
            state: Arc::clone(&iface_state),
        });
        Ok(VirtualInterface {
            service: service.name.clone(),
            owner: service.owner.clone(),
            state: iface_state,
            bus: Arc::clone(&self.state),
        })
    }

    async fn watch_presence(&self) -> Result<PresenceEvents, BridgeError> {
        let (tx, rx) = mpsc::channel(PRESENCE_BUFFER);
        lock(&self.state).watchers.push(tx);
        Ok(rx)
    }
}
