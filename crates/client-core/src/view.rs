//! Presentation model
//!
//! Front ends render from a [`ConnectionState`] snapshot only. This module
//! derives what they show: the status line of the call panel, which call
//! controls are offered, and whether the dial button is enabled.

use crate::call::{CallDirection, CallStatus};
use crate::state::ConnectionState;

/// A control the call panel may offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallControl {
    Answer,
    Reject,
    Mute,
    Hangup,
    /// Hang up an outbound call that has not been answered yet, or clear a
    /// dial that never reached the SDK
    Cancel,
}

/// What the call panel shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPanel {
    pub status: CallStatus,
    pub label: &'static str,
    pub phone_number: Option<String>,
    pub controls: Vec<CallControl>,
}

impl CallPanel {
    /// Panel for `state`, or `None` when there is nothing to show
    pub fn from_state(state: &ConnectionState) -> Option<Self> {
        if !state.is_in_call && state.call_status == CallStatus::Idle {
            return None;
        }

        let direction = state.current_call.as_ref().map(|call| call.direction);
        let label = match state.call_status {
            CallStatus::Connecting => "Connecting...",
            CallStatus::Ringing if direction == Some(CallDirection::Inbound) => "Incoming call...",
            CallStatus::Ringing => "Ringing...",
            CallStatus::Connected => "In call",
            CallStatus::Ended => "Call ended",
            CallStatus::Idle => "Unknown status",
        };

        let controls = match (state.call_status, direction) {
            (CallStatus::Ringing, Some(CallDirection::Inbound)) => vec![CallControl::Answer, CallControl::Reject],
            (CallStatus::Connecting | CallStatus::Ringing, Some(CallDirection::Outbound)) => {
                vec![CallControl::Cancel]
            }
            (CallStatus::Connected, _) => vec![CallControl::Mute, CallControl::Hangup],
            _ => Vec::new(),
        };

        Some(Self {
            status: state.call_status,
            label,
            phone_number: state
                .current_call
                .as_ref()
                .and_then(|call| call.phone_number.clone()),
            controls,
        })
    }

    pub fn offers(&self, control: CallControl) -> bool {
        self.controls.contains(&control)
    }
}

/// State of the dial button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialButton {
    pub enabled: bool,
    pub label: &'static str,
}

impl DialButton {
    /// Dial button for `state` with `number` typed in
    pub fn from_state(state: &ConnectionState, number: &str) -> Self {
        let label = if !state.is_connected {
            "Not connected"
        } else if !state.is_client_ready {
            "Client syncing..."
        } else if state.is_in_call {
            "In call..."
        } else {
            "Call"
        };

        let enabled =
            state.is_connected && state.is_client_ready && !state.is_in_call && !number.trim().is_empty();

        Self { enabled, label }
    }
}

/// One-line connection badge
pub fn connection_label(state: &ConnectionState) -> &'static str {
    match (state.is_connected, state.is_client_ready) {
        (false, _) => "Disconnected",
        (true, false) => "Connected, client syncing...",
        (true, true) => "Connected, client ready",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::CallInfo;

    fn ready() -> ConnectionState {
        ConnectionState {
            is_connected: true,
            is_client_ready: true,
            ..ConnectionState::initial()
        }
    }

    #[test]
    fn test_no_panel_when_idle() {
        assert!(CallPanel::from_state(&ready()).is_none());
    }

    #[test]
    fn test_inbound_ringing_offers_answer_and_reject() {
        let state = ready().with_call(
            CallInfo::inbound(Some("u1".to_string()), Some("123".to_string())),
            CallStatus::Ringing,
        );
        let panel = CallPanel::from_state(&state).unwrap();

        assert_eq!(panel.label, "Incoming call...");
        assert_eq!(panel.phone_number.as_deref(), Some("123"));
        assert!(panel.offers(CallControl::Answer));
        assert!(panel.offers(CallControl::Reject));
        assert!(!panel.offers(CallControl::Hangup));
    }

    #[test]
    fn test_outbound_ringing_offers_cancel_only() {
        let state = ready().with_call(CallInfo::outbound("+1").with_call_id("c"), CallStatus::Ringing);
        let panel = CallPanel::from_state(&state).unwrap();

        assert_eq!(panel.label, "Ringing...");
        assert_eq!(panel.controls, vec![CallControl::Cancel]);
    }

    #[test]
    fn test_failed_dial_can_be_cancelled_then_redialled() {
        use crate::client::reducer::{CallMachine, Input};
        use crate::events::SdkEvent;

        let mut machine = CallMachine::default();
        machine.apply(Input::Sdk(SdkEvent::LoginSucceeded));
        machine.apply(Input::ClientReadyElapsed { session: 1 });
        machine.apply(Input::DialStarted {
            phone_number: "+1".to_string(),
        });
        machine.apply(Input::DialFailed);

        let panel = CallPanel::from_state(machine.state()).unwrap();
        assert_eq!(panel.label, "Connecting...");
        assert_eq!(panel.controls, vec![CallControl::Cancel]);
        assert!(!DialButton::from_state(machine.state(), "123").enabled);

        // cancel runs the hangup action
        machine.apply(Input::HangupIssued);
        machine.apply(Input::HangupSucceeded);

        assert!(CallPanel::from_state(machine.state()).is_none());
        assert_eq!(
            DialButton::from_state(machine.state(), "123"),
            DialButton { enabled: true, label: "Call" }
        );
        assert!(!machine.call_in_progress());
    }

    #[test]
    fn test_connected_offers_mute_and_hangup() {
        let state = ready().with_call(CallInfo::outbound("+1").with_call_id("c"), CallStatus::Connected);
        let panel = CallPanel::from_state(&state).unwrap();

        assert_eq!(panel.label, "In call");
        assert_eq!(panel.controls, vec![CallControl::Mute, CallControl::Hangup]);
    }

    #[test]
    fn test_ended_panel_has_no_controls() {
        let state = ready().without_call(CallStatus::Ended);
        let panel = CallPanel::from_state(&state).unwrap();

        assert_eq!(panel.label, "Call ended");
        assert!(panel.controls.is_empty());
    }

    #[test]
    fn test_dial_button_gating() {
        let disconnected = ConnectionState::initial();
        assert_eq!(
            DialButton::from_state(&disconnected, "123"),
            DialButton { enabled: false, label: "Not connected" }
        );

        let syncing = ConnectionState {
            is_connected: true,
            ..ConnectionState::initial()
        };
        assert_eq!(DialButton::from_state(&syncing, "123").label, "Client syncing...");
        assert!(!DialButton::from_state(&syncing, "123").enabled);

        assert!(DialButton::from_state(&ready(), "123").enabled);
        assert!(!DialButton::from_state(&ready(), "   ").enabled);

        let busy = ready().with_call(CallInfo::outbound("+1"), CallStatus::Connecting);
        assert_eq!(
            DialButton::from_state(&busy, "123"),
            DialButton { enabled: false, label: "In call..." }
        );
    }

    #[test]
    fn test_connection_label() {
        assert_eq!(connection_label(&ConnectionState::initial()), "Disconnected");
        assert_eq!(connection_label(&ready()), "Connected, client ready");
    }
}
