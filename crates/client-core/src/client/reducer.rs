//! Call state reducer
//!
//! Every change to the published [`ConnectionState`] goes through
//! [`CallMachine::apply`]: SDK events, the synchronous parts of user actions,
//! and timer expiries are all [`Input`]s. `apply` builds the next snapshot,
//! replaces the previous one wholesale and returns the timers that must be
//! started as [`Effect`]s. It performs no I/O, so every transition can be
//! exercised by feeding synthetic inputs.
//!
//! # Conflict policy
//!
//! Actions update the state optimistically while the SDK confirms (or
//! contradicts) later through events. Both writers go through this reducer,
//! one input at a time:
//!
//! - ringing/answered events with no call on record are dropped, since the
//!   call was already hung up or rejected locally;
//! - terminated always shows `Ended`, then reverts to `Idle`;
//! - a failure that follows a local hangup or reject of the same call
//!   attempt is silent; any other failure is reported;
//! - a failure or termination for a hung-up call that arrives after a newer
//!   call started is consumed without touching the newer call;
//! - an outbound placement that completes while an incoming call rings
//!   replaces the incoming call;
//! - timers carry the generation they were started for and are ignored once
//!   a newer login, logout or call end has superseded them.

use tracing::{debug, warn};

use crate::call::{CallInfo, CallStatus};
use crate::events::SdkEvent;
use crate::phone::{extract_call_uuid, strip_address_suffix, DEFAULT_ADDRESS_SUFFIX};
use crate::state::ConnectionState;

/// User-facing message when the SDK could not be constructed
pub const INIT_FAILED_MESSAGE: &str = "initialization failed";
pub const HANGUP_FAILED_MESSAGE: &str = "hangup failed";
pub const ANSWER_FAILED_MESSAGE: &str = "answer failed";
pub const REJECT_FAILED_MESSAGE: &str = "reject failed";
/// Reason shown when the SDK reports a call failure without one
pub const UNKNOWN_REASON: &str = "unknown error";

/// Anything that can change the state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Event delivered by the SDK
    Sdk(SdkEvent),
    /// The SDK handle could not be created
    InitializationFailed,
    /// `login()` started
    LoginStarted,
    /// `make_call()` started dialing the normalized number
    DialStarted { phone_number: String },
    /// `make_call()` failed before the SDK accepted the call
    DialFailed,
    /// The SDK accepted the outbound call
    CallPlaced { call_id: String, phone_number: String },
    /// About to ask the SDK to hang up
    HangupIssued,
    HangupSucceeded,
    HangupFailed,
    /// About to ask the SDK to reject the incoming call
    RejectIssued,
    RejectSucceeded,
    RejectFailed,
    AnswerFailed,
    /// Warm-up delay for login `session` elapsed
    ClientReadyElapsed { session: u64 },
    /// Call-ended display for `generation` elapsed
    StatusResetElapsed { generation: u64 },
}

/// Timers requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Mark the client ready after the warm-up delay
    ScheduleClientReady { session: u64 },
    /// Revert `Ended` to `Idle` after the display delay
    ScheduleStatusReset { generation: u64 },
}

/// Which user action is expected to make the SDK report a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserTermination {
    Hangup,
    Reject,
}

/// Token armed right before a deliberate hangup or reject.
///
/// Only armed when a placed call is on record. The next call-failed or
/// terminated event consumes it. If a newer call attempt has started since,
/// that event belongs to the ended call and leaves the state alone;
/// otherwise a failure stays silent. The issuing action disarms it on its own
/// error path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedFailure {
    pub attempt: u64,
    pub origin: UserTermination,
}

/// Reducer state: the published snapshot plus bookkeeping the UI never sees
#[derive(Debug, Clone)]
pub struct CallMachine {
    state: ConnectionState,
    address_suffix: String,
    session: u64,
    attempt: u64,
    ended_generation: u64,
    expected_failure: Option<ExpectedFailure>,
    dialing: bool,
}

impl Default for CallMachine {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS_SUFFIX)
    }
}

impl CallMachine {
    /// Machine in the initial state, stripping `address_suffix` from inbound callers
    pub fn new(address_suffix: impl Into<String>) -> Self {
        Self {
            state: ConnectionState::initial(),
            address_suffix: address_suffix.into(),
            session: 0,
            attempt: 0,
            ended_generation: 0,
            expected_failure: None,
            dialing: false,
        }
    }

    /// Current snapshot
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Pending hangup/reject token, if any
    pub fn expected_failure(&self) -> Option<ExpectedFailure> {
        self.expected_failure
    }

    /// Whether a dial is in flight or a placed call is on record
    pub fn call_in_progress(&self) -> bool {
        self.dialing
            || self
                .state
                .current_call
                .as_ref()
                .map_or(false, CallInfo::is_placed)
    }

    /// Apply one input and return the timers it requests
    pub fn apply(&mut self, input: Input) -> Vec<Effect> {
        let current = &self.state;

        let next = match input {
            Input::Sdk(event) => return self.apply_event(event),

            Input::InitializationFailed => current.with_error(Some(INIT_FAILED_MESSAGE.to_string())),

            Input::LoginStarted => current.with_error(None),

            Input::DialStarted { phone_number } => {
                self.attempt += 1;
                self.dialing = true;
                current
                    .with_error(None)
                    .with_call(CallInfo::outbound(phone_number), CallStatus::Connecting)
            }

            Input::DialFailed => {
                self.dialing = false;
                current.clone()
            }

            Input::CallPlaced { call_id, phone_number } => {
                self.dialing = false;
                match &current.current_call {
                    Some(call) if !call.is_inbound() && !call.is_placed() => {
                        let status = if current.call_status.has_call() {
                            current.call_status
                        } else {
                            CallStatus::Connecting
                        };
                        current.with_call(call.clone().with_call_id(call_id), status)
                    }
                    other => {
                        if let Some(replaced) = other {
                            warn!(
                                "Outbound call {} placed over {:?} call {:?}, dropping it",
                                call_id, replaced.direction, replaced.call_uuid
                            );
                        }
                        current.with_call(
                            CallInfo::outbound(phone_number).with_call_id(call_id),
                            CallStatus::Connecting,
                        )
                    }
                }
            }

            Input::HangupIssued => {
                if current.current_call.as_ref().map_or(false, CallInfo::is_placed) {
                    self.arm(UserTermination::Hangup);
                }
                return Vec::new();
            }

            Input::RejectIssued => {
                if current.current_call.as_ref().map_or(false, CallInfo::is_placed) {
                    self.arm(UserTermination::Reject);
                }
                return Vec::new();
            }

            Input::HangupSucceeded | Input::RejectSucceeded => current.without_call(CallStatus::Idle),

            Input::HangupFailed => {
                self.expected_failure = None;
                current.with_error(Some(HANGUP_FAILED_MESSAGE.to_string()))
            }

            Input::RejectFailed => {
                self.expected_failure = None;
                current.with_error(Some(REJECT_FAILED_MESSAGE.to_string()))
            }

            Input::AnswerFailed => current.with_error(Some(ANSWER_FAILED_MESSAGE.to_string())),

            Input::ClientReadyElapsed { session } => {
                if session != self.session || !current.is_connected {
                    debug!("Ignoring stale client-ready timer for session {}", session);
                    return Vec::new();
                }
                ConnectionState {
                    is_client_ready: true,
                    ..current.clone()
                }
            }

            Input::StatusResetElapsed { generation } => {
                if generation != self.ended_generation || current.call_status != CallStatus::Ended {
                    debug!("Ignoring stale status-reset timer {}", generation);
                    return Vec::new();
                }
                current.with_status(CallStatus::Idle)
            }
        };

        self.state = next;
        Vec::new()
    }

    fn apply_event(&mut self, event: SdkEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        let current = &self.state;

        let next = match event {
            SdkEvent::LoginSucceeded => {
                self.session += 1;
                effects.push(Effect::ScheduleClientReady { session: self.session });
                ConnectionState {
                    is_connected: true,
                    error: None,
                    ..current.clone()
                }
            }

            SdkEvent::LoginFailed { reason } => {
                self.session += 1;
                ConnectionState {
                    is_connected: false,
                    is_client_ready: false,
                    error: Some(format!("login failed: {}", reason)),
                    ..current.clone()
                }
            }

            SdkEvent::LogoutCompleted => {
                self.session += 1;
                self.expected_failure = None;
                self.dialing = false;
                ConnectionState::initial()
            }

            SdkEvent::CallTerminated => {
                if let Some(token) = self.expected_failure.take() {
                    if token.attempt != self.attempt {
                        debug!("Termination belongs to the call ended by local {:?}, ignoring", token.origin);
                        return effects;
                    }
                }
                self.ended_generation += 1;
                effects.push(Effect::ScheduleStatusReset {
                    generation: self.ended_generation,
                });
                current.without_call(CallStatus::Ended)
            }

            SdkEvent::CallAnswered => {
                if current.current_call.is_none() {
                    debug!("Call answered with no call on record, ignoring");
                    return effects;
                }
                current.with_status(CallStatus::Connected)
            }

            SdkEvent::RemoteRinging => {
                if current.current_call.is_none() {
                    debug!("Remote ringing with no call on record, ignoring");
                    return effects;
                }
                current.with_status(CallStatus::Ringing)
            }

            SdkEvent::CallFailed { reason } => {
                let expected = self.expected_failure.take();
                let idle = current.without_call(CallStatus::Idle);
                match expected {
                    Some(token) if token.attempt == self.attempt => {
                        debug!("Call failure follows local {:?}, not reporting it", token.origin);
                        idle
                    }
                    Some(token) => {
                        debug!(
                            "Call failure belongs to the call ended by local {:?}, keeping the current call",
                            token.origin
                        );
                        return effects;
                    }
                    None => {
                        let reason = reason
                            .filter(|r| !r.is_empty())
                            .unwrap_or_else(|| UNKNOWN_REASON.to_string());
                        idle.with_error(Some(format!("call failed: {}", reason)))
                    }
                }
            }

            SdkEvent::IncomingCall {
                from,
                call_uuid,
                extra_headers,
            } => {
                self.attempt += 1;
                let phone_number = from.map(|address| strip_address_suffix(&address, &self.address_suffix));
                let call_uuid = extract_call_uuid(&extra_headers).or(call_uuid.filter(|uuid| !uuid.is_empty()));
                current.with_call(CallInfo::inbound(call_uuid, phone_number), CallStatus::Ringing)
            }
        };

        self.state = next;
        effects
    }

    fn arm(&mut self, origin: UserTermination) {
        self.expected_failure = Some(ExpectedFailure {
            attempt: self.attempt,
            origin,
        });
    }
}
