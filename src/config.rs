//! Global schedule configuration.
//!
//! A [`ScheduleConfig`] is built once when the client is assembled and is
//! read-only during interception; individual requests can shadow it via
//! [`ScheduleOverrides`](crate::ScheduleOverrides).
//!
//! The defaults mirror a battle-tested shape: 5xx responses are repeated with
//! jittered exponential backoff starting at 2s (bounded only by the status
//! predicate), and transport failures are retried with the same backoff
//! capped at 3 recurrences.

use crate::error::TransportError;
use crate::event::AttemptEvent;
use crate::request::{Request, Response};
use crate::schedule::Schedule;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);
const DEFAULT_MAX_RETRIES: u64 = 3;

/// Callback invoked on the sub-request before every attempt after the first.
pub type ModifyRequest = Arc<dyn for<'a> Fn(&ModifyContext<'a>, &mut Request) + Send + Sync>;

/// What a modify-request callback gets to see: the original logical request
/// and the outcome of the previous attempt.
pub struct ModifyContext<'a> {
    original: &'a Request,
    last: &'a AttemptEvent,
}

impl<'a> ModifyContext<'a> {
    pub(crate) fn new(original: &'a Request, last: &'a AttemptEvent) -> Self {
        Self { original, last }
    }

    /// The caller's original request specification.
    pub fn original(&self) -> &Request {
        self.original
    }

    /// The physical request sent on the previous attempt.
    pub fn sent_request(&self) -> &Request {
        self.last.request()
    }

    /// 1-based count of attempts whose outcome triggered a continue decision.
    pub fn attempt(&self) -> u32 {
        self.last.attempt()
    }

    /// The previous attempt's response, if it produced one.
    pub fn response(&self) -> Option<&Response> {
        self.last.response()
    }

    /// The previous attempt's failure, if it raised one.
    pub fn error(&self) -> Option<&TransportError> {
        self.last.error()
    }
}

impl fmt::Debug for ModifyContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifyContext")
            .field("original", self.original)
            .field("attempt", &self.attempt())
            .finish()
    }
}

/// Process-wide repeat/retry policy, immutable after construction.
#[derive(Clone)]
pub struct ScheduleConfig {
    pub(crate) repeat: Schedule<Response>,
    pub(crate) retry: Schedule<TransportError>,
    pub(crate) modify_request: ModifyRequest,
}

impl ScheduleConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> ScheduleConfigBuilder {
        ScheduleConfigBuilder::new()
    }

    /// Default repeat schedule: jittered exponential backoff from 2s while
    /// the response status is 5xx. Unbounded on purpose; any non-5xx response
    /// terminates it.
    pub fn default_repeat() -> Schedule<Response> {
        Schedule::exponential(DEFAULT_BASE_DELAY)
            .jittered()
            .and(Schedule::do_while(|response: &Response, _| response.is_server_error()))
    }

    /// Default retry schedule: jittered exponential backoff from 2s, at most
    /// 3 recurrences.
    pub fn default_retry() -> Schedule<TransportError> {
        Schedule::exponential(DEFAULT_BASE_DELAY)
            .jittered()
            .and(Schedule::recurs(DEFAULT_MAX_RETRIES))
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfigBuilder::new().build()
    }
}

impl fmt::Debug for ScheduleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleConfig")
            .field("repeat", &self.repeat)
            .field("retry", &self.retry)
            .field("modify_request", &"<callback>")
            .finish()
    }
}

/// Builder for [`ScheduleConfig`].
pub struct ScheduleConfigBuilder {
    repeat: Schedule<Response>,
    retry: Schedule<TransportError>,
    modify_request: ModifyRequest,
}

impl ScheduleConfigBuilder {
    /// Start from the built-in defaults.
    pub fn new() -> Self {
        Self {
            repeat: ScheduleConfig::default_repeat(),
            retry: ScheduleConfig::default_retry(),
            modify_request: Arc::new(|_, _| {}),
        }
    }

    /// Repeat the request according to `schedule`, fed with each attempt's
    /// response.
    pub fn repeat(mut self, schedule: Schedule<Response>) -> Self {
        self.repeat = schedule;
        self
    }

    /// Retry the request according to `schedule`, fed with each attempt's
    /// failure.
    pub fn retry(mut self, schedule: Schedule<TransportError>) -> Self {
        self.retry = schedule;
        self
    }

    /// Mutate the sub-request before every attempt after the first, e.g. to
    /// stamp a retry-count header.
    pub fn modify_request<F>(mut self, callback: F) -> Self
    where
        F: for<'a> Fn(&ModifyContext<'a>, &mut Request) + Send + Sync + 'static,
    {
        self.modify_request = Arc::new(callback);
        self
    }

    /// Finish the configuration.
    pub fn build(self) -> ScheduleConfig {
        ScheduleConfig {
            repeat: self.repeat,
            retry: self.retry,
            modify_request: self.modify_request,
        }
    }
}

impl Default for ScheduleConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
