//! Per-request schedule overrides.
//!
//! A request author can replace the globally installed repeat schedule, retry
//! schedule, or modify-request callback for one outgoing request via
//! [`Request::with_schedule`](crate::Request::with_schedule). Resolution is
//! per field and all-or-nothing: a present override fully replaces the global
//! value, absent fields fall through to the global configuration. Overrides
//! live for the lifetime of that logical request only.

use crate::config::{ModifyContext, ModifyRequest};
use crate::error::TransportError;
use crate::request::{Request, Response};
use crate::schedule::Schedule;
use std::fmt;
use std::sync::Arc;

/// Optional per-request replacements for the global [`ScheduleConfig`](crate::ScheduleConfig).
#[derive(Clone, Default)]
pub struct ScheduleOverrides {
    pub(crate) repeat: Option<Schedule<Response>>,
    pub(crate) retry: Option<Schedule<TransportError>>,
    pub(crate) modify_request: Option<ModifyRequest>,
}

impl ScheduleOverrides {
    /// Replace the repeat-on-response schedule for this request.
    pub fn repeat(&mut self, schedule: Schedule<Response>) -> &mut Self {
        self.repeat = Some(schedule);
        self
    }

    /// Replace the retry-on-failure schedule for this request.
    pub fn retry(&mut self, schedule: Schedule<TransportError>) -> &mut Self {
        self.retry = Some(schedule);
        self
    }

    /// Replace the modify-request callback for this request.
    pub fn modify_request<F>(&mut self, callback: F) -> &mut Self
    where
        F: for<'a> Fn(&ModifyContext<'a>, &mut Request) + Send + Sync + 'static,
    {
        self.modify_request = Some(Arc::new(callback));
        self
    }

    /// True when no field is overridden.
    pub fn is_empty(&self) -> bool {
        self.repeat.is_none() && self.retry.is_none() && self.modify_request.is_none()
    }
}

impl fmt::Debug for ScheduleOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleOverrides")
            .field("repeat", &self.repeat)
            .field("retry", &self.retry)
            .field("modify_request", &self.modify_request.as_ref().map(|_| "<callback>"))
            .finish()
    }
}
