#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # Reprise
//!
//! Composable retry/repeat scheduling for async HTTP clients: wrap a client's
//! send step with policies that *repeat* requests on unsuccessful responses
//! and *retry* them on transport failures, with fixed, exponential, jittered,
//! and bounded-count delay schedules that compose.
//!
//! ## Features
//!
//! - **[`Schedule`] combinators**: `recurs`, `spaced`, `exponential`,
//!   `jittered`, `do_while`, `and` — pure, immutable, generic over input
//! - **Explicit decision engine**: [`ScheduleStep`] state machines yielding
//!   [`Decision`]s, fully deterministic outside of jitter
//! - **[`ScheduledClient`]**: the interceptor owning the attempt loop, with
//!   per-attempt request mutation and fire-and-forget [`AttemptEvent`]s
//! - **Per-request overrides**: [`ScheduleOverrides`] replace the global
//!   config for a single request
//! - **Tower integration**: [`ScheduleLayer`] runs the same loop as a
//!   middleware over any compatible `tower::Service`
//!
//! ## Quick Start
//!
//! ```rust
//! use reprise::{Request, Response, Schedule, ScheduleConfig, ScheduledClient,
//!     Transport, TransportError};
//! use std::time::Duration;
//!
//! #[derive(Debug)]
//! struct MyTransport;
//!
//! #[async_trait::async_trait]
//! impl Transport for MyTransport {
//!     async fn send(&self, _request: Request) -> Result<Response, TransportError> {
//!         // hand the request to your actual HTTP client here
//!         Ok(Response::new(200))
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let client = ScheduledClient::builder(MyTransport)
//!     .config(
//!         ScheduleConfig::builder()
//!             .repeat(
//!                 Schedule::exponential(Duration::from_secs(2))
//!                     .jittered()
//!                     .and(Schedule::do_while(|r: &Response, _| r.is_server_error())),
//!             )
//!             .retry(Schedule::spaced(Duration::from_secs(1)).and(Schedule::recurs(3)))
//!             .build(),
//!     )
//!     .build();
//!
//! let response = client.send(Request::get("https://example.com")).await.unwrap();
//! assert!(response.is_success());
//! # });
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod interceptor;
pub mod layer;
pub mod overrides;
pub mod prelude;
pub mod request;
pub mod schedule;
pub mod sleeper;
pub mod transport;

// Re-exports
pub use config::{ModifyContext, ModifyRequest, ScheduleConfig, ScheduleConfigBuilder};
pub use error::TransportError;
pub use event::{AttemptEvent, ChannelSink, CollectingSink, EventSink, NullSink};
pub use interceptor::{ScheduledClient, ScheduledClientBuilder};
pub use layer::{ScheduleLayer, ScheduleService};
pub use overrides::ScheduleOverrides;
pub use request::{Method, Request, Response};
pub use schedule::{Decision, Schedule, ScheduleStep, MAX_DELAY};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
pub use transport::Transport;
