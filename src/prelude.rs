//! Convenient re-exports for common Reprise types.
pub use crate::{
    config::{ModifyContext, ScheduleConfig, ScheduleConfigBuilder},
    error::TransportError,
    event::{AttemptEvent, ChannelSink, CollectingSink, EventSink, NullSink},
    interceptor::{ScheduledClient, ScheduledClientBuilder},
    layer::{ScheduleLayer, ScheduleService},
    overrides::ScheduleOverrides,
    request::{Method, Request, Response},
    schedule::{Decision, Schedule, ScheduleStep, MAX_DELAY},
    sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper},
    transport::Transport,
};
