//! Call state controller
//!
//! [`CallStateController`] owns the SDK handle and the call state. It is the
//! only component allowed to touch the SDK.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  actions   ┌──────────────────────┐   primitives   ┌─────────┐
//! │  front end   ├───────────►│ CallStateController  ├───────────────►│   SDK   │
//! │              │◄───────────┤  CallMachine::apply  │◄───────────────┤         │
//! └──────────────┘  snapshot  └──────────────────────┘   SdkEvent     └─────────┘
//!                   (watch)              ▲  timers (ready / reset)
//!                                        └──────────┘
//! ```
//!
//! Every state change is one reducer input applied under a short lock, and
//! the resulting snapshot replaces the published one. Front ends read
//! [`CallStateController::state`] or watch [`CallStateController::subscribe`].

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::CallBackend;
use crate::client::config::ClientConfig;
use crate::client::reducer::{CallMachine, Effect, Input};
use crate::error::{ClientError, ClientResult};
use crate::events::{event_channel, EventStream, SdkEvent};
use crate::sdk::{SdkConnector, TelephonySdk};
use crate::state::ConnectionState;

/// Shared controller internals
pub(crate) struct ControllerInner {
    pub(crate) config: ClientConfig,
    pub(crate) backend: Arc<dyn CallBackend>,
    connector: Arc<dyn SdkConnector>,
    sdk: RwLock<Option<Arc<dyn TelephonySdk>>>,
    machine: Mutex<CallMachine>,
    state_tx: watch::Sender<ConnectionState>,
    event_task: Mutex<Option<JoinHandle<()>>>,
}

impl ControllerInner {
    /// The SDK handle, if it has been created
    pub(crate) fn sdk(&self) -> Option<Arc<dyn TelephonySdk>> {
        self.sdk.read().clone()
    }

    /// The SDK handle, or [`ClientError::ClientNotInitialized`]
    pub(crate) fn client(&self) -> ClientResult<Arc<dyn TelephonySdk>> {
        self.sdk().ok_or(ClientError::ClientNotInitialized)
    }

    /// Apply one reducer input and publish the resulting snapshot
    pub(crate) fn apply(self: &Arc<Self>, input: Input) {
        let effects = self.apply_with(input, |_| Ok(())).unwrap_or_default();
        for effect in effects {
            self.schedule(effect);
        }
    }

    /// Apply `input` only if `check` accepts the machine as it is right now.
    ///
    /// The check and the transition happen under the same lock.
    pub(crate) fn apply_checked(
        self: &Arc<Self>,
        input: Input,
        check: impl FnOnce(&CallMachine) -> ClientResult<()>,
    ) -> ClientResult<()> {
        let effects = self.apply_with(input, check)?;
        for effect in effects {
            self.schedule(effect);
        }
        Ok(())
    }

    fn apply_with(
        &self,
        input: Input,
        check: impl FnOnce(&CallMachine) -> ClientResult<()>,
    ) -> ClientResult<Vec<Effect>> {
        let mut machine = self.machine.lock();
        check(&machine)?;

        debug!("Applying {:?}", input);
        let effects = machine.apply(input);
        let next = machine.state().clone();
        debug!(
            status = %next.call_status,
            connected = next.is_connected,
            ready = next.is_client_ready,
            in_call = next.is_in_call,
            "State updated"
        );
        self.state_tx.send_replace(next);
        Ok(effects)
    }

    fn schedule(self: &Arc<Self>, effect: Effect) {
        let (delay, input) = match effect {
            Effect::ScheduleClientReady { session } => {
                (self.config.client_ready_delay(), Input::ClientReadyElapsed { session })
            }
            Effect::ScheduleStatusReset { generation } => {
                (self.config.status_reset_delay(), Input::StatusResetElapsed { generation })
            }
        };

        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.apply(input);
            }
        });
    }
}

impl Drop for ControllerInner {
    /// Last controller handle gone: log a connected SDK out and stop intake
    fn drop(&mut self) {
        if let Some(sdk) = self.sdk.get_mut().take() {
            if self.state_tx.borrow().is_connected {
                debug!("Controller dropped while connected, logging out");
                if let Err(e) = sdk.logout() {
                    warn!("SDK logout on drop failed: {}", e);
                }
            }
        }
        if let Some(task) = self.event_task.get_mut().take() {
            task.abort();
        }
    }
}

async fn drain_events(inner: Weak<ControllerInner>, mut events: EventStream) {
    while let Some(event) = events.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        debug!(event = event.name(), "SDK event received");
        if let SdkEvent::LoginFailed { reason } = &event {
            warn!("SDK login failed: {}", reason);
        }
        inner.apply(Input::Sdk(event));
    }
    debug!("SDK event stream closed");
}

/// Reconciles SDK events with the state the front end renders from
#[derive(Clone)]
pub struct CallStateController {
    pub(crate) inner: Arc<ControllerInner>,
}

impl std::fmt::Debug for CallStateController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallStateController")
            .field("config", &self.inner.config)
            .field("initialized", &self.is_initialized())
            .field("state", &*self.inner.state_tx.borrow())
            .finish()
    }
}

impl CallStateController {
    /// Create a controller. The SDK handle is not created until [`initialize`](Self::initialize).
    pub fn new(config: ClientConfig, backend: Arc<dyn CallBackend>, connector: Arc<dyn SdkConnector>) -> Self {
        let machine = CallMachine::new(config.incoming_address_suffix.clone());
        let (state_tx, _) = watch::channel(machine.state().clone());

        Self {
            inner: Arc::new(ControllerInner {
                config,
                backend,
                connector,
                sdk: RwLock::new(None),
                machine: Mutex::new(machine),
                state_tx,
                event_task: Mutex::new(None),
            }),
        }
    }

    /// Create the SDK handle and start consuming its events.
    ///
    /// Calling this again once a handle exists does nothing. On failure the
    /// state carries a generic `initialization failed` error and the
    /// controller behaves as if no client existed.
    pub fn initialize(&self) -> ClientResult<()> {
        let mut slot = self.inner.sdk.write();
        if slot.is_some() {
            return Ok(());
        }

        let (sink, events) = event_channel();
        match self.inner.connector.connect(&self.inner.config.sdk, sink) {
            Ok(sdk) => {
                *slot = Some(sdk);
                drop(slot);

                let task = tokio::spawn(drain_events(Arc::downgrade(&self.inner), events));
                if let Some(previous) = self.inner.event_task.lock().replace(task) {
                    previous.abort();
                }
                info!("Telephony SDK initialized");
                Ok(())
            }
            Err(e) => {
                drop(slot);
                warn!("Telephony SDK initialization failed: {}", e);
                self.inner.apply(Input::InitializationFailed);
                Err(match e {
                    ClientError::InitializationFailed { .. } => e,
                    other => ClientError::InitializationFailed {
                        reason: other.to_string(),
                    },
                })
            }
        }
    }

    /// Whether the SDK handle exists
    pub fn is_initialized(&self) -> bool {
        self.inner.sdk.read().is_some()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Current snapshot
    pub fn state(&self) -> ConnectionState {
        self.inner.state_tx.borrow().clone()
    }

    /// Receiver notified on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    /// Wait until the published state satisfies `predicate`
    pub async fn wait_for<F>(&self, mut predicate: F) -> ConnectionState
    where
        F: FnMut(&ConnectionState) -> bool,
    {
        let mut receiver = self.subscribe();
        loop {
            {
                let state = receiver.borrow_and_update();
                if predicate(&*state) {
                    return (*state).clone();
                }
            }
            // the sender lives as long as `self`, so this cannot fail
            if receiver.changed().await.is_err() {
                return self.state();
            }
        }
    }

    /// [`wait_for`](Self::wait_for) bounded by `timeout`
    pub async fn wait_for_timeout<F>(&self, timeout: Duration, predicate: F) -> Option<ConnectionState>
    where
        F: FnMut(&ConnectionState) -> bool,
    {
        tokio::time::timeout(timeout, self.wait_for(predicate)).await.ok()
    }

    /// Fetch an access token and hand it to the SDK.
    ///
    /// `is_connected` follows later from the login-succeeded event.
    pub async fn login(&self) -> ClientResult<()> {
        let sdk = self.inner.client()?;
        self.inner.apply(Input::LoginStarted);

        let token = self.inner.backend.fetch_token().await?.into_token()?;
        info!("Access token fetched, logging in");
        sdk.login_with_access_token(&token).await
    }

    /// Ask the SDK to log out; the logout-completed event resets the state
    pub fn logout(&self) {
        let Some(sdk) = self.inner.sdk() else {
            return;
        };
        if let Err(e) = sdk.logout() {
            warn!("SDK logout failed: {}", e);
        }
    }

    /// Log out and release the SDK handle
    pub fn shutdown(&self) {
        self.logout();
        if self.inner.sdk.write().take().is_some() {
            info!("Telephony SDK released");
        }
    }
}
