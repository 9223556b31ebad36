#![allow(dead_code)]

//! Shared test transport: a scripted stand-in for a real HTTP client.

use async_trait::async_trait;
use reprise::{Request, Response, Transport, TransportError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One scripted attempt outcome.
#[derive(Debug, Clone)]
pub enum Outcome {
    Status(u16),
    Fail(TransportError),
}

/// Transport that plays a script of outcomes, then repeats a fallback
/// forever. Records every request it receives.
#[derive(Debug, Clone)]
pub struct MockTransport {
    script: Arc<Mutex<VecDeque<Outcome>>>,
    fallback: Outcome,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl MockTransport {
    pub fn scripted(script: Vec<Outcome>, fallback: Outcome) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            fallback,
            hits: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answer with `status`.
    pub fn always_status(status: u16) -> Self {
        Self::scripted(Vec::new(), Outcome::Status(status))
    }

    /// Always raise `error`.
    pub fn always_fail(error: TransportError) -> Self {
        Self::scripted(Vec::new(), Outcome::Fail(error))
    }

    /// Answer `status` for the first `n` attempts, then 200.
    pub fn status_n_then_ok(n: usize, status: u16) -> Self {
        Self::scripted(vec![Outcome::Status(status); n], Outcome::Status(200))
    }

    /// Raise `error` for the first `n` attempts, then 200.
    pub fn fail_n_then_ok(n: usize, error: TransportError) -> Self {
        Self::scripted(vec![Outcome::Fail(error); n], Outcome::Status(200))
    }

    /// Number of physical attempts received.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        let outcome =
            self.script.lock().unwrap().pop_front().unwrap_or_else(|| self.fallback.clone());
        match outcome {
            Outcome::Status(status) => Ok(Response::new(status)),
            Outcome::Fail(error) => Err(error),
        }
    }
}
