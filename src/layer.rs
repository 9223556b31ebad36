//! Tower-native surface for the schedule loop.
//!
//! [`ScheduleLayer`] wraps any `tower::Service<Request>` whose response and
//! error types are this crate's currency types, running every call through
//! the same attempt loop as [`ScheduledClient`](crate::ScheduledClient).

use crate::config::ScheduleConfig;
use crate::error::TransportError;
use crate::event::{EventSink, NullSink};
use crate::interceptor::run_schedule;
use crate::request::{Request, Response};
use crate::sleeper::{Sleeper, TokioSleeper};
use futures::future::BoxFuture;
use std::sync::Arc;
use tower_layer::Layer;
use tower_service::Service;

/// Layer applying repeat/retry scheduling to an inner send service.
#[derive(Clone)]
pub struct ScheduleLayer {
    config: ScheduleConfig,
    sleeper: Arc<dyn Sleeper>,
    events: Arc<dyn EventSink>,
}

impl ScheduleLayer {
    /// Layer with the given configuration, tokio sleeping, and no observer.
    pub fn new(config: ScheduleConfig) -> Self {
        Self { config, sleeper: Arc::new(TokioSleeper), events: Arc::new(NullSink) }
    }

    /// Replace the sleeper.
    pub fn with_sleeper<S: Sleeper + 'static>(mut self, sleeper: S) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Install an observer for attempt events.
    pub fn with_event_sink<E: EventSink + 'static>(mut self, sink: E) -> Self {
        self.events = Arc::new(sink);
        self
    }
}

impl std::fmt::Debug for ScheduleLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleLayer").field("config", &self.config).finish()
    }
}

impl<S> Layer<S> for ScheduleLayer {
    type Service = ScheduleService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ScheduleService { inner, layer: self.clone() }
    }
}

/// Service produced by [`ScheduleLayer`].
#[derive(Clone, Debug)]
pub struct ScheduleService<S> {
    inner: S,
    layer: ScheduleLayer,
}

impl<S> Service<Request> for ScheduleService<S>
where
    S: Service<Request, Response = Response, Error = TransportError> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = TransportError;
    type Future = BoxFuture<'static, Result<Response, TransportError>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let layer = self.layer.clone();
        let mut inner = self.inner.clone();
        Box::pin(async move {
            run_schedule(
                &layer.config,
                layer.sleeper.as_ref(),
                layer.events.as_ref(),
                request,
                move |sub| inner.call(sub),
            )
            .await
        })
    }
}
