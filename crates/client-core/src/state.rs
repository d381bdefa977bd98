//! Connection and call state snapshot
//!
//! [`ConnectionState`] is the single read-only view handed to the
//! presentation layer. The controller never mutates a published snapshot in
//! place: every transition builds a new value and replaces the old one, so a
//! reader always observes a consistent set of fields.

use serde::{Deserialize, Serialize};

use crate::call::{CallInfo, CallStatus};

/// Process-wide connection and call state owned by the controller
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionState {
    /// SDK login succeeded and no logout has happened since
    pub is_connected: bool,
    /// The SDK finished warming up after login; outbound calls may be placed
    pub is_client_ready: bool,
    /// Mirrors `current_call.is_some()`
    pub is_in_call: bool,
    /// Lifecycle phase of the current call attempt
    pub call_status: CallStatus,
    /// The pending or active call
    pub current_call: Option<CallInfo>,
    /// Last user-facing error message
    pub error: Option<String>,
}

impl ConnectionState {
    /// The state before login and after logout
    pub fn initial() -> Self {
        Self::default()
    }

    /// Copy of this state tracking `call` in phase `status`
    pub fn with_call(&self, call: CallInfo, status: CallStatus) -> Self {
        Self {
            is_in_call: true,
            current_call: Some(call),
            call_status: status,
            ..self.clone()
        }
    }

    /// Copy of this state with the call dropped and the phase set to `status`
    pub fn without_call(&self, status: CallStatus) -> Self {
        Self {
            is_in_call: false,
            current_call: None,
            call_status: status,
            ..self.clone()
        }
    }

    /// Copy of this state in phase `status`, keeping the current call
    pub fn with_status(&self, status: CallStatus) -> Self {
        Self {
            call_status: status,
            ..self.clone()
        }
    }

    /// Copy of this state with `error` replaced
    pub fn with_error(&self, error: Option<String>) -> Self {
        Self {
            error,
            ..self.clone()
        }
    }

    /// Whether the call fields agree with each other.
    ///
    /// A call is present exactly while the phase is connecting, ringing or
    /// connected, and `is_in_call` always mirrors the presence of the call.
    pub fn is_consistent(&self) -> bool {
        let has_call = self.current_call.is_some();
        has_call == self.call_status.has_call() && has_call == self.is_in_call
    }

    /// UUID of the current call if it is an inbound one
    pub fn incoming_call_uuid(&self) -> Option<&str> {
        self.current_call
            .as_ref()
            .filter(|call| call.is_inbound())
            .and_then(|call| call.call_uuid.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = ConnectionState::initial();
        assert!(!state.is_connected);
        assert!(!state.is_client_ready);
        assert!(!state.is_in_call);
        assert_eq!(state.call_status, CallStatus::Idle);
        assert!(state.current_call.is_none());
        assert!(state.error.is_none());
        assert!(state.is_consistent());
    }

    #[test]
    fn test_call_helpers_keep_in_call_flag_in_step() {
        let state = ConnectionState::initial()
            .with_call(CallInfo::outbound("+1555"), CallStatus::Connecting);
        assert!(state.is_in_call);
        assert!(state.is_consistent());

        let state = state.without_call(CallStatus::Ended);
        assert!(!state.is_in_call);
        assert!(state.current_call.is_none());
        assert!(state.is_consistent());
    }

    #[test]
    fn test_inconsistent_state_detected() {
        let state = ConnectionState::initial().with_status(CallStatus::Connected);
        assert!(!state.is_consistent());
    }

    #[test]
    fn test_incoming_call_uuid_only_for_inbound() {
        let inbound = ConnectionState::initial().with_call(
            CallInfo::inbound(Some("u1".to_string()), None),
            CallStatus::Ringing,
        );
        assert_eq!(inbound.incoming_call_uuid(), Some("u1"));

        let outbound = ConnectionState::initial()
            .with_call(CallInfo::outbound("+1").with_call_id("abc"), CallStatus::Ringing);
        assert_eq!(outbound.incoming_call_uuid(), None);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let json = serde_json::to_value(ConnectionState::initial()).unwrap();
        assert_eq!(json["isConnected"], false);
        assert_eq!(json["isClientReady"], false);
        assert_eq!(json["isInCall"], false);
        assert_eq!(json["callStatus"], "idle");
        assert!(json["currentCall"].is_null());
        assert!(json["error"].is_null());
    }
}
