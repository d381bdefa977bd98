//! In-process telephony SDK
//!
//! [`SimulatedSdk`] honors the [`TelephonySdk`] contract without any network:
//! primitives update a small call model and report back through the
//! [`EventSink`] exactly like a real SDK would. The remote party is played
//! by the test or the operator through the `remote_*` and `ring_in` methods.
//!
//! | primitive                 | event reported                             |
//! |---------------------------|--------------------------------------------|
//! | login (non-empty token)   | `LoginSucceeded`                           |
//! | login (empty token)       | `LoginFailed`                              |
//! | hangup before answer      | `CallFailed("Canceled")`                   |
//! | hangup after answer       | `CallTerminated`                           |
//! | answer                    | `CallAnswered`                             |
//! | reject                    | `CallFailed("Rejected")`                   |
//! | logout                    | `LogoutCompleted`                          |

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::call::CallDirection;
use crate::error::{ClientError, ClientResult};
use crate::events::{EventSink, SdkEvent};
use crate::phone::DEFAULT_ADDRESS_SUFFIX;
use crate::sdk::{OtherCallsAction, SdkConnector, SdkOptions, TelephonySdk};

/// A call placed through [`SimulatedSdk::call`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedCall {
    pub destination: String,
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct ActiveCall {
    direction: CallDirection,
    call_uuid: Option<String>,
    answered: bool,
}

#[derive(Debug, Default)]
struct SimState {
    logged_in: bool,
    muted: bool,
    refuse_calls: bool,
    call: Option<ActiveCall>,
    placed: Vec<PlacedCall>,
    answered_with: Vec<(String, OtherCallsAction)>,
}

/// SDK stand-in driven entirely in memory
#[derive(Debug)]
pub struct SimulatedSdk {
    options: SdkOptions,
    events: EventSink,
    state: Mutex<SimState>,
}

impl SimulatedSdk {
    pub fn new(options: SdkOptions, events: EventSink) -> Self {
        Self {
            options,
            events,
            state: Mutex::new(SimState::default()),
        }
    }

    /// Options the SDK was created with
    pub fn options(&self) -> &SdkOptions {
        &self.options
    }

    /// Make subsequent `call` primitives report an immediate refusal
    pub fn refuse_calls(&self, refuse: bool) {
        self.state.lock().refuse_calls = refuse;
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.lock().logged_in
    }

    pub fn is_muted(&self) -> bool {
        self.state.lock().muted
    }

    pub fn has_active_call(&self) -> bool {
        self.state.lock().call.is_some()
    }

    /// Every call placed so far, oldest first
    pub fn placed_calls(&self) -> Vec<PlacedCall> {
        self.state.lock().placed.clone()
    }

    /// Every answer primitive received so far
    pub fn answered_calls(&self) -> Vec<(String, OtherCallsAction)> {
        self.state.lock().answered_with.clone()
    }

    /// The far end of the outbound call starts ringing
    pub fn remote_ringing(&self) {
        if self.state.lock().call.is_some() {
            self.events.emit(SdkEvent::RemoteRinging);
        }
    }

    /// The far end picks up the outbound call
    pub fn remote_answer(&self) {
        let answered = {
            let mut state = self.state.lock();
            match state.call.as_mut() {
                Some(call) if !call.answered => {
                    call.answered = true;
                    true
                }
                _ => false,
            }
        };
        if answered {
            self.events.emit(SdkEvent::CallAnswered);
        }
    }

    /// The far end hangs up
    pub fn remote_hangup(&self) {
        let ended = self.state.lock().call.take();
        match ended {
            Some(call) if call.answered => self.events.emit(SdkEvent::CallTerminated),
            Some(_) => self.events.emit(SdkEvent::CallFailed {
                reason: Some("Canceled".to_string()),
            }),
            None => {}
        }
    }

    /// The network drops the current call
    pub fn fail_call(&self, reason: impl Into<String>) {
        self.state.lock().call = None;
        self.events.emit(SdkEvent::CallFailed {
            reason: Some(reason.into()),
        });
    }

    /// A remote party calls `number`; returns the call UUID announced in the headers
    pub fn ring_in(&self, number: &str) -> String {
        let call_uuid = uuid::Uuid::new_v4().to_string();
        self.state.lock().call = Some(ActiveCall {
            direction: CallDirection::Inbound,
            call_uuid: Some(call_uuid.clone()),
            answered: false,
        });

        self.events.emit(SdkEvent::IncomingCall {
            from: Some(format!("{}{}", number, DEFAULT_ADDRESS_SUFFIX)),
            call_uuid: Some(call_uuid.clone()),
            extra_headers: HashMap::from([("call_uuid".to_string(), call_uuid.clone())]),
        });
        call_uuid
    }

    fn take_inbound(&self, call_uuid: &str) -> ClientResult<ActiveCall> {
        let mut state = self.state.lock();
        match state.call.take() {
            Some(call) if call.direction == CallDirection::Inbound && call.call_uuid.as_deref() == Some(call_uuid) => {
                Ok(call)
            }
            other => {
                state.call = other;
                Err(ClientError::sdk("reject", format!("no incoming call {}", call_uuid)))
            }
        }
    }
}

#[async_trait]
impl TelephonySdk for SimulatedSdk {
    async fn login_with_access_token(&self, token: &str) -> ClientResult<()> {
        if token.is_empty() {
            self.events.emit(SdkEvent::LoginFailed {
                reason: "invalid access token".to_string(),
            });
            return Ok(());
        }

        self.state.lock().logged_in = true;
        self.events.emit(SdkEvent::LoginSucceeded);
        Ok(())
    }

    fn call(&self, destination: &str, headers: &HashMap<String, String>) -> ClientResult<bool> {
        let mut state = self.state.lock();
        if !state.logged_in {
            return Err(ClientError::sdk("call", "not logged in"));
        }
        if state.refuse_calls || state.call.is_some() {
            return Ok(false);
        }

        debug!("Simulated call to {}", destination);
        state.placed.push(PlacedCall {
            destination: destination.to_string(),
            headers: headers.clone(),
        });
        state.call = Some(ActiveCall {
            direction: CallDirection::Outbound,
            call_uuid: None,
            answered: false,
        });
        Ok(true)
    }

    fn hangup(&self) -> ClientResult<()> {
        let ended = {
            let mut state = self.state.lock();
            state.muted = false;
            state.call.take()
        };

        match ended {
            Some(call) if call.answered => self.events.emit(SdkEvent::CallTerminated),
            Some(_) => self.events.emit(SdkEvent::CallFailed {
                reason: Some("Canceled".to_string()),
            }),
            None => debug!("Simulated hangup with no active call"),
        }
        Ok(())
    }

    fn mute(&self) -> ClientResult<bool> {
        let mut state = self.state.lock();
        if state.muted {
            return Ok(false);
        }
        state.muted = true;
        Ok(true)
    }

    fn unmute(&self) -> ClientResult<()> {
        self.state.lock().muted = false;
        Ok(())
    }

    fn answer(&self, call_uuid: &str, other_calls: OtherCallsAction) -> ClientResult<()> {
        {
            let mut state = self.state.lock();
            match state.call.as_mut() {
                Some(call) if call.direction == CallDirection::Inbound && call.call_uuid.as_deref() == Some(call_uuid) => {
                    call.answered = true;
                }
                _ => return Err(ClientError::sdk("answer", format!("no incoming call {}", call_uuid))),
            }
            state.answered_with.push((call_uuid.to_string(), other_calls));
        }
        self.events.emit(SdkEvent::CallAnswered);
        Ok(())
    }

    fn reject(&self, call_uuid: &str) -> ClientResult<()> {
        self.take_inbound(call_uuid)?;
        self.events.emit(SdkEvent::CallFailed {
            reason: Some("Rejected".to_string()),
        });
        Ok(())
    }

    fn logout(&self) -> ClientResult<()> {
        {
            let mut state = self.state.lock();
            state.logged_in = false;
            state.muted = false;
            state.call = None;
        }
        self.events.emit(SdkEvent::LogoutCompleted);
        Ok(())
    }
}

/// [`SdkConnector`] producing [`SimulatedSdk`]s.
///
/// Clones share the last created SDK, so a test can keep one clone and
/// reach the SDK the controller is driving.
#[derive(Debug, Clone, Default)]
pub struct SimulatedConnector {
    created: Arc<Mutex<Option<Arc<SimulatedSdk>>>>,
    failure: Option<String>,
}

impl SimulatedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connector whose construction always fails with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    /// The most recently created SDK
    pub fn sdk(&self) -> Option<Arc<SimulatedSdk>> {
        self.created.lock().clone()
    }
}

impl SdkConnector for SimulatedConnector {
    fn connect(&self, options: &SdkOptions, events: EventSink) -> ClientResult<Arc<dyn TelephonySdk>> {
        if let Some(reason) = &self.failure {
            return Err(ClientError::InitializationFailed { reason: reason.clone() });
        }

        let sdk = Arc::new(SimulatedSdk::new(options.clone(), events));
        *self.created.lock() = Some(sdk.clone());
        Ok(sdk)
    }
}
