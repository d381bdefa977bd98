//! Controller and its building blocks
//!
//! - [`config`]: endpoints, delays and SDK options
//! - [`reducer`]: the pure call state machine
//! - [`controller`]: SDK ownership, event intake and snapshot publishing
//! - [`builder`]: wiring a controller together
//!
//! The call operations live in `calls` as further methods on
//! [`CallStateController`](controller::CallStateController).

pub mod builder;
mod calls;
pub mod config;
pub mod controller;
pub mod reducer;
