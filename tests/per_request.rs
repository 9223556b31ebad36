//! Per-request override resolution: override wins for that request only,
//! field by field, with no merging.

mod common;

use common::MockTransport;
use reprise::{
    InstantSleeper, Request, Response, Schedule, ScheduleConfig, ScheduledClient, TransportError,
};

fn no_retry_client(transport: MockTransport) -> ScheduledClient<MockTransport> {
    let config = ScheduleConfig::builder()
        .repeat(Schedule::recurs(0))
        .retry(Schedule::recurs(0))
        .build();
    ScheduledClient::builder(transport).config(config).sleeper(InstantSleeper).build()
}

#[tokio::test]
async fn override_applies_to_one_request_and_not_the_next() {
    use common::Outcome;

    // Script: the first plain request fails once, the overridden request
    // fails three times then recovers, and everything after fails forever.
    let transport = MockTransport::scripted(
        vec![
            Outcome::Fail(TransportError::ConnectionClosed),
            Outcome::Fail(TransportError::ConnectionClosed),
            Outcome::Fail(TransportError::ConnectionClosed),
            Outcome::Fail(TransportError::ConnectionClosed),
            Outcome::Status(200),
        ],
        Outcome::Fail(TransportError::ConnectionClosed),
    );
    let client = no_retry_client(transport.clone());

    // Global config never retries: the first request fails outright.
    let err = client.send(Request::get("/")).await.unwrap_err();
    assert!(err.is_connection_closed());
    assert_eq!(transport.hits(), 1);

    // The overridden request retries until the transport recovers.
    let request = Request::get("/").with_schedule(|s| {
        s.retry(Schedule::do_while(|error: &TransportError, _| error.is_connection_closed()));
    });
    let response = client.send(request).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(transport.hits(), 5);

    // A later plain request on the SAME client is back on the global config:
    // exactly one attempt, nothing cached from the overridden request.
    let err = client.send(Request::get("/")).await.unwrap_err();
    assert!(err.is_connection_closed());
    assert_eq!(transport.hits(), 6, "override must not outlive its request");
}

#[tokio::test]
async fn overriding_repeat_replaces_only_repeat() {
    let transport = MockTransport::always_status(503);
    // Global: repeat twice on 5xx; global modify stamps a header.
    let config = ScheduleConfig::builder()
        .repeat(Schedule::do_while(|r: &Response, _| r.is_server_error()).and(Schedule::recurs(2)))
        .modify_request(|context, sub| {
            sub.append_header("x-global-modify", context.attempt().to_string());
        })
        .build();
    let client =
        ScheduledClient::builder(transport.clone()).config(config).sleeper(InstantSleeper).build();

    // Override repeat to a single recurrence; the global modify callback must
    // still run since it was not overridden.
    let request = Request::get("/").with_schedule(|s| {
        s.repeat(Schedule::recurs(1));
    });
    client.send(request).await.unwrap();

    let sent = transport.requests();
    assert_eq!(sent.len(), 2, "override fully replaces the global repeat schedule");
    assert_eq!(sent[1].header_value("x-global-modify"), Some("1"));
}

#[tokio::test]
async fn overriding_modify_replaces_only_modify() {
    let transport = MockTransport::always_status(500);
    let config = ScheduleConfig::builder()
        .repeat(Schedule::recurs(2))
        .modify_request(|_, sub| sub.append_header("x-source", "global"))
        .build();
    let client =
        ScheduledClient::builder(transport.clone()).config(config).sleeper(InstantSleeper).build();

    let request = Request::get("/").with_schedule(|s| {
        s.modify_request(|_, sub| sub.append_header("x-source", "override"));
    });
    client.send(request).await.unwrap();

    let sent = transport.requests();
    assert_eq!(sent.len(), 3, "global repeat schedule still applies");
    assert_eq!(sent[1].header_value("x-source"), Some("override"));
    assert_eq!(sent[2].header_value("x-source"), Some("override"));
}

#[tokio::test]
async fn unrelated_override_field_changes_nothing() {
    // Overriding only the retry schedule must leave repeat behavior intact.
    let transport = MockTransport::always_status(503);
    let config = ScheduleConfig::builder().repeat(Schedule::recurs(2)).build();
    let client =
        ScheduledClient::builder(transport.clone()).config(config).sleeper(InstantSleeper).build();

    let request = Request::get("/").with_schedule(|s| {
        s.retry(Schedule::recurs(9));
    });
    let response = client.send(request).await.unwrap();
    assert_eq!(response.status(), 503);
    assert_eq!(transport.hits(), 3, "global repeat schedule governs responses");
}
