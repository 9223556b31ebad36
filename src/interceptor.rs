//! The request interceptor: owns the full attempt loop.
//!
//! One call to [`ScheduledClient::send`] is one *logical* request, which the
//! loop turns into one or more *physical* attempts. Each attempt works on an
//! independent fork of the original request; responses are judged by the
//! repeat schedule, transport failures by the retry schedule, and every
//! continue decision sleeps its delay and emits one [`AttemptEvent`].
//!
//! Cancellation is structural: dropping the `send` future drops the in-flight
//! attempt and prevents further attempts, while a failed attempt only ever
//! surfaces as an `Err` fed to the retry schedule.

use crate::config::{ModifyContext, ScheduleConfig};
use crate::error::TransportError;
use crate::event::{AttemptEvent, EventSink, NullSink};
use crate::request::{Request, Response};
use crate::schedule::Decision;
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::transport::Transport;
use std::future::Future;
use std::sync::Arc;

/// Wraps a [`Transport`] with repeat/retry scheduling.
///
/// Cheap to clone; clones share the transport and configuration but every
/// `send` call gets fresh schedule state.
///
/// ```rust
/// use reprise::{Request, Response, ScheduledClient, Transport, TransportError};
///
/// #[derive(Debug)]
/// struct AlwaysOk;
///
/// #[async_trait::async_trait]
/// impl Transport for AlwaysOk {
///     async fn send(&self, _request: Request) -> Result<Response, TransportError> {
///         Ok(Response::new(200))
///     }
/// }
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let client = ScheduledClient::new(AlwaysOk);
/// let response = client.send(Request::get("https://example.com")).await.unwrap();
/// assert_eq!(response.status(), 200);
/// # });
/// ```
pub struct ScheduledClient<T> {
    transport: Arc<T>,
    config: ScheduleConfig,
    sleeper: Arc<dyn Sleeper>,
    events: Arc<dyn EventSink>,
}

impl<T> Clone for ScheduledClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: self.config.clone(),
            sleeper: Arc::clone(&self.sleeper),
            events: Arc::clone(&self.events),
        }
    }
}

impl<T> std::fmt::Debug for ScheduledClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledClient")
            .field("config", &self.config)
            .field("sleeper", &self.sleeper)
            .field("events", &self.events)
            .finish()
    }
}

impl<T: Transport> ScheduledClient<T> {
    /// Wrap `transport` with the default configuration.
    pub fn new(transport: T) -> Self {
        Self::builder(transport).build()
    }

    /// Start building a client around `transport`.
    pub fn builder(transport: T) -> ScheduledClientBuilder<T> {
        ScheduledClientBuilder {
            transport,
            config: ScheduleConfig::default(),
            sleeper: Arc::new(TokioSleeper),
            events: Arc::new(NullSink),
        }
    }

    /// Execute one logical request through the attempt loop.
    ///
    /// Returns the final response once the repeat schedule signals Done, or
    /// re-raises the last transport failure once the retry schedule does.
    pub async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let transport = Arc::clone(&self.transport);
        run_schedule(&self.config, self.sleeper.as_ref(), self.events.as_ref(), request, |sub| {
            let transport = Arc::clone(&transport);
            async move { transport.send(sub).await }
        })
        .await
    }
}

/// Builder for [`ScheduledClient`].
pub struct ScheduledClientBuilder<T> {
    transport: T,
    config: ScheduleConfig,
    sleeper: Arc<dyn Sleeper>,
    events: Arc<dyn EventSink>,
}

impl<T: Transport> ScheduledClientBuilder<T> {
    /// Install a schedule configuration.
    pub fn config(mut self, config: ScheduleConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the sleeper (tests use `InstantSleeper`/`TrackingSleeper`).
    pub fn sleeper<S: Sleeper + 'static>(mut self, sleeper: S) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Install an observer for attempt events.
    pub fn event_sink<E: EventSink + 'static>(mut self, sink: E) -> Self {
        self.events = Arc::new(sink);
        self
    }

    /// Finish the client.
    pub fn build(self) -> ScheduledClient<T> {
        ScheduledClient {
            transport: Arc::new(self.transport),
            config: self.config,
            sleeper: self.sleeper,
            events: self.events,
        }
    }
}

/// The attempt loop shared by [`ScheduledClient`] and the tower service.
///
/// `execute` performs one physical attempt; it is the only place failures are
/// caught for retry evaluation.
pub(crate) async fn run_schedule<F, Fut>(
    config: &ScheduleConfig,
    sleeper: &dyn Sleeper,
    events: &dyn EventSink,
    request: Request,
    mut execute: F,
) -> Result<Response, TransportError>
where
    F: FnMut(Request) -> Fut,
    Fut: Future<Output = Result<Response, TransportError>>,
{
    // Per-request overrides shadow the global configuration field by field.
    let modify = request
        .overrides
        .modify_request
        .clone()
        .unwrap_or_else(|| config.modify_request.clone());
    let mut repeat_step = request.overrides.repeat.as_ref().unwrap_or(&config.repeat).step();
    let mut retry_step = request.overrides.retry.as_ref().unwrap_or(&config.retry).step();

    let mut attempt: u32 = 0;
    let mut last_event: Option<AttemptEvent> = None;

    loop {
        let mut sub = request.fork();
        if let Some(last) = &last_event {
            let context = ModifyContext::new(&request, last);
            (modify)(&context, &mut sub);
        }

        let event = match execute(sub.clone()).await {
            Ok(response) => match repeat_step.step(&response) {
                Decision::Continue { delay, next } => {
                    tracing::debug!(
                        attempt = attempt + 1,
                        status = response.status(),
                        delay_ms = delay.as_millis() as u64,
                        url = sub.url(),
                        "repeating request"
                    );
                    if !delay.is_zero() {
                        sleeper.sleep(delay).await;
                    }
                    repeat_step = next;
                    attempt += 1;
                    AttemptEvent::Response { request: sub, attempt, response }
                }
                Decision::Done => return Ok(response),
            },
            Err(error) => match retry_step.step(&error) {
                Decision::Continue { delay, next } => {
                    tracing::debug!(
                        attempt = attempt + 1,
                        error = %error,
                        delay_ms = delay.as_millis() as u64,
                        url = sub.url(),
                        "retrying request"
                    );
                    if !delay.is_zero() {
                        sleeper.sleep(delay).await;
                    }
                    retry_step = next;
                    attempt += 1;
                    AttemptEvent::Failure { request: sub, attempt, error }
                }
                Decision::Done => {
                    if attempt > 0 {
                        tracing::warn!(
                            attempts = attempt + 1,
                            error = %error,
                            url = sub.url(),
                            "giving up on request"
                        );
                    }
                    return Err(error);
                }
            },
        };

        events.emit(event.clone());
        last_event = Some(event);
    }
}
