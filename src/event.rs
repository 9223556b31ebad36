//! Attempt events and the observer channel they flow through.
//!
//! Every loop iteration that decides to continue emits one [`AttemptEvent`]
//! describing the attempt it just judged. Emission is strictly fire-and-forget:
//! an [`EventSink`] must never block and can never fail the request loop.

use crate::error::TransportError;
use crate::request::{Request, Response};
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Outcome of one physical attempt that the schedules decided to follow up.
///
/// Carries the sub-request actually sent and a 1-based attempt counter.
#[derive(Debug, Clone)]
pub enum AttemptEvent {
    /// The attempt completed with an HTTP response (any status).
    Response {
        /// The physical request sent.
        request: Request,
        /// 1-based attempt counter.
        attempt: u32,
        /// The response the repeat schedule judged.
        response: Response,
    },
    /// The attempt raised a transport failure before producing a response.
    Failure {
        /// The physical request sent.
        request: Request,
        /// 1-based attempt counter.
        attempt: u32,
        /// The failure the retry schedule judged.
        error: TransportError,
    },
}

impl AttemptEvent {
    /// The physical request this attempt sent.
    pub fn request(&self) -> &Request {
        match self {
            AttemptEvent::Response { request, .. } | AttemptEvent::Failure { request, .. } => {
                request
            }
        }
    }

    /// 1-based attempt counter.
    pub fn attempt(&self) -> u32 {
        match self {
            AttemptEvent::Response { attempt, .. } | AttemptEvent::Failure { attempt, .. } => {
                *attempt
            }
        }
    }

    /// The response, for response outcomes only.
    pub fn response(&self) -> Option<&Response> {
        match self {
            AttemptEvent::Response { response, .. } => Some(response),
            AttemptEvent::Failure { .. } => None,
        }
    }

    /// The failure, for failure outcomes only.
    pub fn error(&self) -> Option<&TransportError> {
        match self {
            AttemptEvent::Response { .. } => None,
            AttemptEvent::Failure { error, .. } => Some(error),
        }
    }
}

/// Observer channel for attempt diagnostics.
///
/// Implementations must return promptly and swallow their own failures; the
/// request loop treats emission as best-effort telemetry.
pub trait EventSink: Send + Sync + fmt::Debug {
    /// Deliver one event.
    fn emit(&self, event: AttemptEvent);
}

/// Sink that drops every event (the default).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: AttemptEvent) {}
}

/// Sink forwarding events over an unbounded tokio channel.
///
/// `send` on an unbounded channel never waits; events emitted after the
/// receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<AttemptEvent>,
}

impl ChannelSink {
    /// Create the sink plus the receiving half for the observer task.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AttemptEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: AttemptEvent) {
        let _ = self.tx.send(event);
    }
}

/// Test sink that keeps every event in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<AttemptEvent>>>,
}

impl CollectingSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events emitted so far.
    pub fn events(&self) -> Vec<AttemptEvent> {
        self.events.lock().expect("collecting sink poisoned").clone()
    }

    /// Number of events emitted so far.
    pub fn len(&self) -> usize {
        self.events.lock().expect("collecting sink poisoned").len()
    }

    /// True if nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: AttemptEvent) {
        self.events.lock().expect("collecting sink poisoned").push(event);
    }
}
