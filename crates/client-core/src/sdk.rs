//! Telephony SDK seam
//!
//! Signaling, media negotiation and transport all live inside the embedded
//! SDK. This module only describes the primitives the controller drives
//! ([`TelephonySdk`]) and how an SDK handle comes into existence
//! ([`SdkConnector`]).
//!
//! The handle is created once, lazily, by the controller and is exclusively
//! owned by it. Nothing else is expected to call into the SDK directly.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClientResult;
use crate::events::EventSink;

/// SDK log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DebugLevel {
    Off,
    Error,
    Warn,
    Info,
    #[default]
    Debug,
    All,
}

/// Options recognized when constructing the SDK
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SdkOptions {
    /// SDK log verbosity
    pub debug: DebugLevel,
    /// Ask for microphone permission only on an explicit click
    pub perm_on_click: bool,
    /// Allow the SDK to report usage statistics
    pub enable_tracking: bool,
    /// Prompt before the page is closed during a call
    pub close_protection: bool,
    /// Upper bound on the average audio bitrate, in bits per second
    pub max_average_bitrate: u32,
}

impl Default for SdkOptions {
    fn default() -> Self {
        Self {
            debug: DebugLevel::Debug,
            perm_on_click: true,
            enable_tracking: true,
            close_protection: true,
            max_average_bitrate: 48_000,
        }
    }
}

/// What the SDK should do with other incoming calls once one is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OtherCallsAction {
    /// Leave them ringing
    Ignore,
    /// Reject them
    Reject,
    /// Let the SDK decide
    LetDefault,
}

impl OtherCallsAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtherCallsAction::Ignore => "ignore",
            OtherCallsAction::Reject => "reject",
            OtherCallsAction::LetDefault => "letDefault",
        }
    }
}

/// Primitives exposed by an initialized SDK client.
///
/// Synchronous methods mirror SDK calls that return immediately; their
/// outcome (ringing, answered, terminated...) arrives later on the
/// [`EventSink`] the client was created with.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TelephonySdk: Send + Sync {
    /// Start a login with a previously fetched access token
    async fn login_with_access_token(&self, token: &str) -> ClientResult<()>;

    /// Place an outbound call. `Ok(false)` means the SDK refused it outright.
    fn call(&self, destination: &str, headers: &HashMap<String, String>) -> ClientResult<bool>;

    /// Hang up the current call
    fn hangup(&self) -> ClientResult<()>;

    /// Mute the microphone. `Ok(false)` means the mute did not take effect.
    fn mute(&self) -> ClientResult<bool>;

    /// Unmute the microphone
    fn unmute(&self) -> ClientResult<()>;

    /// Answer an incoming call
    fn answer(&self, call_uuid: &str, other_calls: OtherCallsAction) -> ClientResult<()>;

    /// Reject an incoming call
    fn reject(&self, call_uuid: &str) -> ClientResult<()>;

    /// Log out; completion is reported as [`SdkEvent::LogoutCompleted`](crate::events::SdkEvent::LogoutCompleted)
    fn logout(&self) -> ClientResult<()>;

    /// Satisfy the host's audio autoplay policy before media starts.
    ///
    /// Hosts without such a policy have nothing to do.
    async fn unlock_audio(&self) -> ClientResult<()> {
        Ok(())
    }
}

/// Creates the SDK client handle
pub trait SdkConnector: Send + Sync {
    /// Construct a client configured with `options` that reports to `events`
    fn connect(&self, options: &SdkOptions, events: EventSink) -> ClientResult<Arc<dyn TelephonySdk>>;
}

impl<F> SdkConnector for F
where
    F: Fn(&SdkOptions, EventSink) -> ClientResult<Arc<dyn TelephonySdk>> + Send + Sync,
{
    fn connect(&self, options: &SdkOptions, events: EventSink) -> ClientResult<Arc<dyn TelephonySdk>> {
        self(options, events)
    }
}
