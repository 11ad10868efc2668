//! In-memory port implementations shared by the unit tests of this crate.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use hwbridge_domain::channel::ChannelId;
use hwbridge_domain::error::{BridgeError, DriverError, TransportError};
use hwbridge_domain::measurement::Reading;
use hwbridge_domain::presence::ServicePresenceEvent;
use hwbridge_domain::target::ServiceRef;

use crate::ports::{
    BusTransport, OutputDriver, PresenceEvents, RemoteInterface, SensorDriver, SignalListener,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn boxed(message: &str) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::other(message.to_string()))
}

// ── Outputs ─────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingOutputs {
    applied: Arc<Mutex<Vec<(ChannelId, bool)>>>,
    failing: bool,
}

impl RecordingOutputs {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn applied(&self) -> Vec<(ChannelId, bool)> {
        lock(&self.applied).clone()
    }
}

impl OutputDriver for RecordingOutputs {
    async fn set_channel(&self, channel: &ChannelId, active: bool) -> Result<(), BridgeError> {
        lock(&self.applied).push((channel.clone(), active));
        if self.failing {
            return Err(DriverError::Output {
                channel: channel.to_string(),
                source: boxed("pin busy"),
            }
            .into());
        }
        Ok(())
    }
}

// ── Sensors ─────────────────────────────────────────────────────

pub struct ScriptedSensor {
    name: &'static str,
    init_fails: bool,
    reads: VecDeque<Result<Vec<Reading>, &'static str>>,
    pub read_count: Arc<Mutex<usize>>,
}

impl ScriptedSensor {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            init_fails: false,
            reads: VecDeque::new(),
            read_count: Arc::default(),
        }
    }

    pub fn failing_init(mut self) -> Self {
        self.init_fails = true;
        self
    }

    pub fn then_read(mut self, readings: Vec<Reading>) -> Self {
        self.reads.push_back(Ok(readings));
        self
    }

    pub fn then_fail(mut self, message: &'static str) -> Self {
        self.reads.push_back(Err(message));
        self
    }
}

impl SensorDriver for ScriptedSensor {
    fn name(&self) -> &str {
        self.name
    }

    async fn init(&mut self) -> Result<(), BridgeError> {
        if self.init_fails {
            return Err(DriverError::Sensor {
                sensor: self.name.to_string(),
                source: boxed("no ack"),
            }
            .into());
        }
        Ok(())
    }

    async fn read(&mut self) -> Result<Vec<Reading>, BridgeError> {
        *lock(&self.read_count) += 1;
        match self.reads.pop_front() {
            Some(Ok(readings)) => Ok(readings),
            Some(Err(message)) => Err(DriverError::Sensor {
                sensor: self.name.to_string(),
                source: boxed(message),
            }
            .into()),
            None => Ok(Vec::new()),
        }
    }
}

// ── Bus ─────────────────────────────────────────────────────────

#[derive(Default)]
struct InterfaceState {
    listeners: HashMap<String, Vec<mpsc::Sender<String>>>,
    calls: Vec<(String, String)>,
}

#[derive(Clone, Default)]
pub struct FakeInterface {
    state: Arc<Mutex<InterfaceState>>,
    bus: Option<Arc<Mutex<BusState>>>,
    failing_invoke: bool,
}

impl FakeInterface {
    pub fn failing_invoke() -> Self {
        Self {
            failing_invoke: true,
            ..Self::default()
        }
    }

    pub fn emit(&self, signal: &str, payload: &str) -> usize {
        let state = lock(&self.state);
        state.listeners.get(signal).map_or(0, |senders| {
            senders
                .iter()
                .filter(|tx| tx.try_send(payload.to_string()).is_ok())
                .count()
        })
    }

    pub fn listener_count(&self, signal: &str) -> usize {
        lock(&self.state).listeners.get(signal).map_or(0, Vec::len)
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        lock(&self.state).calls.clone()
    }
}

impl RemoteInterface for FakeInterface {
    async fn on(&self, signal: &str) -> Result<SignalListener, BridgeError> {
        let (tx, rx) = mpsc::channel(16);
        lock(&self.state)
            .listeners
            .entry(signal.to_string())
            .or_default()
            .push(tx);
        if let Some(bus) = &self.bus {
            let mut bus = lock(bus);
            let total = bus.listener_total(signal);
            bus.peak_listeners = bus.peak_listeners.max(total);
        }
        Ok(rx)
    }

    async fn off(&self, signal: &str) -> Result<(), BridgeError> {
        lock(&self.state).listeners.remove(signal);
        Ok(())
    }

    async fn invoke(&self, method: &str, argument: String) -> Result<(), BridgeError> {
        if self.failing_invoke {
            return Err(TransportError::Bus(boxed("no reply")).into());
        }
        lock(&self.state).calls.push((method.to_string(), argument));
        Ok(())
    }
}

#[derive(Default)]
struct BusState {
    present: bool,
    failing_interface: bool,
    acquired: Vec<FakeInterface>,
    presence_tx: Option<mpsc::Sender<ServicePresenceEvent>>,
    peak_listeners: usize,
}

impl BusState {
    fn listener_total(&self, signal: &str) -> usize {
        self.acquired.iter().map(|iface| iface.listener_count(signal)).sum()
    }
}

#[derive(Clone, Default)]
pub struct FakeBus {
    state: Arc<Mutex<BusState>>,
}

impl FakeBus {
    pub fn present() -> Self {
        let bus = Self::default();
        bus.set_present(true);
        bus
    }

    pub fn set_present(&self, present: bool) {
        lock(&self.state).present = present;
    }

    pub fn set_failing_interface(&self, failing: bool) {
        lock(&self.state).failing_interface = failing;
    }

    /// Deliver a presence event to the watcher, if any.
    pub fn announce(&self, event: ServicePresenceEvent) {
        let tx = lock(&self.state).presence_tx.clone();
        if let Some(tx) = tx {
            let _ = tx.try_send(event);
        }
    }

    /// Drop the presence sender, closing the watcher's stream.
    pub fn close_presence(&self) {
        lock(&self.state).presence_tx = None;
    }

    pub fn interfaces(&self) -> Vec<FakeInterface> {
        lock(&self.state).acquired.clone()
    }

    pub fn listener_total(&self, signal: &str) -> usize {
        lock(&self.state).listener_total(signal)
    }

    pub fn peak_listeners(&self) -> usize {
        lock(&self.state).peak_listeners
    }

    /// Emit `signal` on every interface ever handed out.
    pub fn broadcast(&self, signal: &str, payload: &str) -> usize {
        self.interfaces()
            .iter()
            .map(|iface| iface.emit(signal, payload))
            .sum()
    }
}

impl BusTransport for FakeBus {
    type Interface = FakeInterface;

    async fn lookup_service(&self, name: &str) -> Result<ServiceRef, BridgeError> {
        if !lock(&self.state).present {
            return Err(TransportError::ServiceNotFound {
                service: name.to_string(),
            }
            .into());
        }
        Ok(ServiceRef {
            name: name.to_string(),
            owner: ":1.1".to_string(),
        })
    }

    async fn get_interface(
        &self,
        _service: &ServiceRef,
        _object_path: &str,
        _interface: &str,
    ) -> Result<FakeInterface, BridgeError> {
        let mut state = lock(&self.state);
        if state.failing_interface {
            return Err(TransportError::Bus(boxed("introspection failed")).into());
        }
        let iface = FakeInterface {
            bus: Some(Arc::clone(&self.state)),
            ..FakeInterface::default()
        };
        state.acquired.push(iface.clone());
        Ok(iface)
    }

    async fn watch_presence(&self) -> Result<PresenceEvents, BridgeError> {
        let (tx, rx) = mpsc::channel(64);
        lock(&self.state).presence_tx = Some(tx);
        Ok(rx)
    }
}
