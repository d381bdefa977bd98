//! # Webphone Client Core - Call State Controller
//!
//! This crate reconciles the events of a WebRTC telephony SDK with a single
//! call-state snapshot that a front end renders from. It provides:
//! - **Controller**: login, dial, hangup, mute, answer, reject and logout
//! - **Reducer**: a pure state machine turning SDK events, action steps and
//!   timer expiries into the next [`ConnectionState`]
//! - **Backend**: the token and call-preparation HTTP endpoints
//! - **Simulated SDK**: an in-process [`TelephonySdk`] for tests and demos
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use webphone_client_core::{CallStatus, ControllerBuilder, SimulatedConnector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let connector = SimulatedConnector::new();
//!     let controller = ControllerBuilder::new().connector(connector.clone()).build()?;
//!
//!     controller.initialize()?;
//!     controller.login().await?;
//!     controller.wait_for(|state| state.is_client_ready).await;
//!
//!     controller.make_call("13322309337").await?;
//!     if let Some(sdk) = connector.sdk() {
//!         sdk.remote_answer();
//!     }
//!     controller
//!         .wait_for_timeout(Duration::from_secs(5), |state| state.call_status == CallStatus::Connected)
//!         .await;
//!
//!     controller.hangup_call();
//!     Ok(())
//! }
//! ```
//!
//! ## State
//!
//! | field             | meaning                                              |
//! |-------------------|------------------------------------------------------|
//! | `is_connected`    | the SDK reported a successful login                  |
//! | `is_client_ready` | the settle delay after login has elapsed             |
//! | `is_in_call`      | a call is present (connecting, ringing or connected) |
//! | `call_status`     | phase of the current or last call                    |
//! | `current_call`    | details of the current call                          |
//! | `error`           | last user-visible error                              |

pub mod backend;
pub mod call;
pub mod client;
pub mod error;
pub mod events;
pub mod phone;
pub mod sdk;
pub mod simulated;
pub mod state;
pub mod view;

// Re-export main types
pub use backend::{CallBackend, HttpBackend, PrepareCallResponse, TokenResponse};
pub use call::{CallDirection, CallInfo, CallStatus};
pub use client::builder::ControllerBuilder;
pub use client::config::ClientConfig;
pub use client::controller::CallStateController;
pub use error::{ClientError, ClientResult};
pub use events::{event_channel, EventSink, EventStream, SdkEvent};
pub use sdk::{DebugLevel, OtherCallsAction, SdkConnector, SdkOptions, TelephonySdk};
pub use simulated::{PlacedCall, SimulatedConnector, SimulatedSdk};
pub use state::ConnectionState;
pub use view::{CallControl, CallPanel, DialButton};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
