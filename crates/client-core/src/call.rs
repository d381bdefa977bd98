//! Call types
//!
//! A [`CallInfo`] exists only while a call is pending or active. It is created
//! when an outbound dial starts or when an incoming call is announced, and is
//! dropped as soon as the call ends, fails, or is hung up.
//!
//! # Call phases
//!
//! ```text
//! outbound:  Idle -> Connecting -> Ringing -> Connected -> Ended -> Idle
//! inbound:   Idle ------------->  Ringing -> Connected -> Ended -> Idle
//! ```
//!
//! Any phase may drop straight back to `Idle` on hangup, reject or failure.
//! `Ended` is transient and advances to `Idle` on its own after the
//! configured reset delay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which side initiated the call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallDirection {
    /// The remote party called us
    Inbound,
    /// We dialed out
    Outbound,
}

impl std::fmt::Display for CallDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallDirection::Inbound => write!(f, "inbound"),
            CallDirection::Outbound => write!(f, "outbound"),
        }
    }
}

/// Lifecycle phase of the current call attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    /// No call attempt in progress
    #[default]
    Idle,
    /// Outbound call is being prepared and placed
    Connecting,
    /// Remote party is ringing (outbound) or we are being rung (inbound)
    Ringing,
    /// Media is flowing
    Connected,
    /// Call just ended; reverts to `Idle` after the reset delay
    Ended,
}

impl CallStatus {
    /// Phases during which a [`CallInfo`] must be present
    pub fn has_call(&self) -> bool {
        matches!(
            self,
            CallStatus::Connecting | CallStatus::Ringing | CallStatus::Connected
        )
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallStatus::Idle => write!(f, "idle"),
            CallStatus::Connecting => write!(f, "connecting"),
            CallStatus::Ringing => write!(f, "ringing"),
            CallStatus::Connected => write!(f, "connected"),
            CallStatus::Ended => write!(f, "ended"),
        }
    }
}

/// The call currently pending or active
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallInfo {
    /// Identifier assigned by the call-preparation endpoint (outbound only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    /// Identifier assigned by the remote side (inbound only); needed to answer or reject
    #[serde(rename = "callUUID", skip_serializing_if = "Option::is_none")]
    pub call_uuid: Option<String>,
    /// Counterparty number, `+`-prefixed for outbound calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// When this record was created
    pub start_time: DateTime<Utc>,
    /// Which side initiated the call
    pub direction: CallDirection,
}

impl CallInfo {
    /// Record for an outbound call whose dial has just started
    pub fn outbound(phone_number: impl Into<String>) -> Self {
        Self {
            call_id: None,
            call_uuid: None,
            phone_number: Some(phone_number.into()),
            start_time: Utc::now(),
            direction: CallDirection::Outbound,
        }
    }

    /// Record for an announced incoming call
    pub fn inbound(call_uuid: Option<String>, phone_number: Option<String>) -> Self {
        Self {
            call_id: None,
            call_uuid,
            phone_number,
            start_time: Utc::now(),
            direction: CallDirection::Inbound,
        }
    }

    /// Attach the prepared call id once the SDK accepted the placement
    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }

    /// Whether either side has assigned an identifier to this call.
    ///
    /// An outbound record without a call id is a dial that never got placed.
    pub fn is_placed(&self) -> bool {
        self.call_id.is_some() || self.call_uuid.is_some()
    }

    pub fn is_inbound(&self) -> bool {
        self.direction == CallDirection::Inbound
    }
}
