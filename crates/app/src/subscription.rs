//! Subscription manager — keeps exactly one live subscription to the control
//! service's actuator signal across service restarts.
//!
//! ## State machine
//!
//! ```text
//!         start / Appeared / Replaced          interface + listener acquired
//! Unsubscribed ───────────────▶ Subscribing ─────────────────────────────────▶ Subscribed
//!      ▲                             │                                            │
//!      │       acquisition failed    │                                            │
//!      ├─────────────────────────────┘                                            │
//!      │          Vanished / listener closed (detach, then discard handle)        │
//!      └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A direct owner hand-over tears the subscription down and acquires a new
//! one, since interfaces are bound to the owner they were acquired from.
//!
//! The manager is the single writer of the [`RemoteServiceHandle`]: it
//! publishes the current interface through a `watch` channel and readers
//! (the measurement publisher) observe it through a [`HandleView`].
//!
//! The signal listener is registered exactly while the state is
//! `Subscribed`. Detaching always happens before the handle is discarded
//! and before the state changes, and the listener receiver is dropped with
//! it, so nothing buffered from a stale subscription is ever dispatched.
//!
//! [`RemoteServiceHandle`]: HandleView

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use hwbridge_domain::error::BridgeError;
use hwbridge_domain::presence::{PresenceTransition, ServicePresenceEvent};
use hwbridge_domain::target::ServiceTarget;

use crate::ports::{BusTransport, OutputDriver, PresenceEvents, RemoteInterface, SignalListener};
use crate::services::command_router::CommandRouter;

/// Lifecycle state of the signal subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Unsubscribed,
    Subscribing,
    Subscribed,
}

/// Read-only view of the handle held by the [`SubscriptionManager`].
pub struct HandleView<I> {
    rx: watch::Receiver<Option<Arc<I>>>,
}

impl<I> HandleView<I> {
    pub fn new(rx: watch::Receiver<Option<Arc<I>>>) -> Self {
        Self { rx }
    }

    /// The currently active interface, if the service is reachable.
    #[must_use]
    pub fn current(&self) -> Option<Arc<I>> {
        self.rx.borrow().clone()
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        self.rx.borrow().is_some()
    }
}

impl<I> Clone for HandleView<I> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

/// Owner of the signal subscription and of the remote service handle.
pub struct SubscriptionManager<T: BusTransport, O> {
    transport: T,
    target: ServiceTarget,
    router: CommandRouter<O>,
    state: SubscriptionState,
    listener: Option<SignalListener>,
    handle: watch::Sender<Option<Arc<T::Interface>>>,
    retry_delay: Option<Duration>,
    retry_at: Option<Instant>,
}

impl<T, O> SubscriptionManager<T, O>
where
    T: BusTransport,
    O: OutputDriver,
{
    pub fn new(transport: T, target: ServiceTarget, router: CommandRouter<O>) -> Self {
        let (handle, _) = watch::channel(None);
        Self {
            transport,
            target,
            router,
            state: SubscriptionState::Unsubscribed,
            listener: None,
            handle,
            retry_delay: None,
            retry_at: None,
        }
    }

    /// Retry a failed acquisition after `delay` instead of waiting for the
    /// next presence event. `None` disables timed retries.
    #[must_use]
    pub fn with_retry(mut self, delay: Option<Duration>) -> Self {
        self.retry_delay = delay.filter(|delay| !delay.is_zero());
        self
    }

    #[must_use]
    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    /// A reader of the handle, for components that call the remote service.
    #[must_use]
    pub fn handle_view(&self) -> HandleView<T::Interface> {
        HandleView::new(self.handle.subscribe())
    }

    /// Acquire the interface and register the signal listener.
    ///
    /// Any previous subscription is detached first, so at most one listener
    /// exists at any time.
    pub async fn subscribe(&mut self) {
        if self.state != SubscriptionState::Unsubscribed {
            self.detach().await;
        }

        self.state = SubscriptionState::Subscribing;
        tracing::debug!(service = %self.target.service_name, "subscribing to control service");

        match self.acquire().await {
            Ok((remote, listener)) => {
                self.listener = Some(listener);
                self.handle.send_replace(Some(Arc::new(remote)));
                self.retry_at = None;
                self.state = SubscriptionState::Subscribed;
                tracing::info!(
                    service = %self.target.service_name,
                    signal = %self.target.signal,
                    "subscribed to control service"
                );
            }
            Err(err) => {
                self.state = SubscriptionState::Unsubscribed;
                self.retry_at = self
                    .retry_delay
                    .and_then(|delay| Instant::now().checked_add(delay));
                tracing::warn!(
                    %err,
                    service = %self.target.service_name,
                    retry_in = ?self.retry_delay,
                    "failed to subscribe to control service"
                );
            }
        }
    }

    async fn acquire(&self) -> Result<(T::Interface, SignalListener), BridgeError> {
        let service = self
            .transport
            .lookup_service(&self.target.service_name)
            .await?;
        let remote = self
            .transport
            .get_interface(&service, &self.target.object_path, &self.target.interface)
            .await?;
        let listener = remote.on(&self.target.signal).await?;
        Ok((remote, listener))
    }

    /// Detach the listener, discard the handle, then become `Unsubscribed`.
    pub async fn detach(&mut self) {
        self.listener = None;
        if let Some(remote) = self.handle.send_replace(None) {
            if let Err(err) = remote.off(&self.target.signal).await {
                tracing::warn!(
                    %err,
                    signal = %self.target.signal,
                    "failed to detach signal listener"
                );
            }
        }
        if self.state != SubscriptionState::Unsubscribed {
            tracing::info!(
                service = %self.target.service_name,
                "unsubscribed from control service"
            );
        }
        self.state = SubscriptionState::Unsubscribed;
    }

    /// React to an ownership change on the bus.
    pub async fn handle_presence(&mut self, event: &ServicePresenceEvent) {
        match event.transition_for(&self.target.service_name) {
            Some(PresenceTransition::Appeared) => {
                tracing::info!(service = %event.name, "control service started");
                self.subscribe().await;
            }
            Some(PresenceTransition::Replaced) => {
                tracing::info!(
                    service = %event.name,
                    owner = ?event.new_owner,
                    "control service changed owner"
                );
                self.subscribe().await;
            }
            Some(PresenceTransition::Vanished) => {
                tracing::info!(service = %event.name, "control service stopped");
                self.detach().await;
            }
            None => {
                tracing::trace!(service = %event.name, "ignoring presence event");
            }
        }
    }

    /// Subscribe, then serve presence events, signals and retries until the
    /// task is aborted.
    ///
    /// Without `presence`, service restarts are not detected and the initial
    /// subscription (if any) is kept as long as the transport keeps it open.
    pub async fn run(mut self, presence: Option<PresenceEvents>) {
        let mut presence = presence;
        self.subscribe().await;

        loop {
            let step = tokio::select! {
                biased;
                event = next_presence(presence.as_mut()) => Step::Presence(event),
                payload = next_signal(self.listener.as_mut()) => Step::Signal(payload),
                () = retry_due(self.retry_at) => Step::Retry,
            };

            match step {
                Step::Presence(Some(event)) => self.handle_presence(&event).await,
                Step::Presence(None) => {
                    tracing::warn!(
                        service = %self.target.service_name,
                        "presence monitor closed, service restarts will no longer be detected"
                    );
                    presence = None;
                }
                Step::Signal(Some(payload)) => {
                    self.router.route(&payload).await;
                }
                Step::Signal(None) => {
                    tracing::warn!(
                        signal = %self.target.signal,
                        "signal listener closed by transport"
                    );
                    self.detach().await;
                }
                Step::Retry => {
                    self.retry_at = None;
                    if self.state == SubscriptionState::Unsubscribed {
                        self.subscribe().await;
                    }
                }
            }
        }
    }
}

enum Step {
    Presence(Option<ServicePresenceEvent>),
    Signal(Option<String>),
    Retry,
}

async fn next_presence(events: Option<&mut PresenceEvents>) -> Option<ServicePresenceEvent> {
    match events {
        Some(events) => events.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_signal(listener: Option<&mut SignalListener>) -> Option<String> {
    match listener {
        Some(listener) => listener.recv().await,
        None => std::future::pending().await,
    }
}

async fn retry_due(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
