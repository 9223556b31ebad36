//! The send-pipeline hook point.
//!
//! [`Transport`] is the single seam between the schedule loop and whatever
//! actually speaks HTTP. The loop calls `send` once per physical attempt;
//! it is the loop's only I/O suspension point, and the only place failures
//! are caught for retry evaluation.

use crate::error::TransportError;
use crate::request::{Request, Response};
use async_trait::async_trait;
use std::sync::Arc;

/// Executes one physical request against the wire.
///
/// Implementations adapt a concrete HTTP client. Connection resources
/// acquired for an attempt must be released before `send` returns, so that
/// nothing is held across the inter-attempt delay.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one attempt, producing a response or a transport failure.
    async fn send(&self, request: Request) -> Result<Response, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        (**self).send(request).await
    }
}
