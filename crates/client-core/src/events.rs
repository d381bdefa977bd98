//! Typed SDK events
//!
//! The telephony SDK reports everything asynchronously. Instead of
//! registering callbacks, an SDK implementation is handed an [`EventSink`]
//! at construction and publishes [`SdkEvent`]s into it. The controller is the
//! single consumer of the other end of the channel and maps each event to
//! exactly one state transition.
//!
//! ```rust
//! use webphone_client_core::events::{event_channel, SdkEvent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (sink, mut events) = event_channel();
//! sink.emit(SdkEvent::RemoteRinging);
//!
//! assert_eq!(events.recv().await, Some(SdkEvent::RemoteRinging));
//! # }
//! ```

use std::collections::HashMap;

use tokio::sync::mpsc;

/// Events emitted by the telephony SDK
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkEvent {
    /// Login with the access token succeeded
    LoginSucceeded,
    /// Login was refused
    LoginFailed {
        /// Reason reported by the SDK
        reason: String,
    },
    /// Logout completed
    LogoutCompleted,
    /// The current call ended normally
    CallTerminated,
    /// The far end picked up
    CallAnswered,
    /// The far end is ringing
    RemoteRinging,
    /// The current call failed
    CallFailed {
        /// Reason reported by the SDK, if any
        reason: Option<String>,
    },
    /// A remote party is calling us
    IncomingCall {
        /// Caller address as reported by the SDK (e.g. `123@phone.plivo.com`)
        from: Option<String>,
        /// Call UUID assigned by the SDK
        call_uuid: Option<String>,
        /// Custom headers attached by the caller
        extra_headers: HashMap<String, String>,
    },
}

impl SdkEvent {
    /// Short event name for logging
    pub fn name(&self) -> &'static str {
        match self {
            SdkEvent::LoginSucceeded => "login_succeeded",
            SdkEvent::LoginFailed { .. } => "login_failed",
            SdkEvent::LogoutCompleted => "logout_completed",
            SdkEvent::CallTerminated => "call_terminated",
            SdkEvent::CallAnswered => "call_answered",
            SdkEvent::RemoteRinging => "remote_ringing",
            SdkEvent::CallFailed { .. } => "call_failed",
            SdkEvent::IncomingCall { .. } => "incoming_call",
        }
    }
}

/// Producer side of the SDK event channel
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: mpsc::UnboundedSender<SdkEvent>,
}

impl EventSink {
    /// Publish an event.
    ///
    /// Events sent after the controller is gone are dropped.
    pub fn emit(&self, event: SdkEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("SDK event dropped, controller no longer listening");
        }
    }

    /// Whether the consuming side still exists
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Consumer side of the SDK event channel
pub type EventStream = mpsc::UnboundedReceiver<SdkEvent>;

/// Create a connected sink/stream pair
pub fn event_channel() -> (EventSink, EventStream) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (EventSink { sender }, receiver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (sink, mut events) = event_channel();
        sink.emit(SdkEvent::LoginSucceeded);
        sink.emit(SdkEvent::CallFailed { reason: None });

        assert_eq!(events.recv().await, Some(SdkEvent::LoginSucceeded));
        assert_eq!(events.recv().await, Some(SdkEvent::CallFailed { reason: None }));
    }

    #[test]
    fn test_emit_after_consumer_dropped_is_silent() {
        let (sink, events) = event_channel();
        drop(events);

        assert!(sink.is_closed());
        sink.emit(SdkEvent::LogoutCompleted);
    }
}
