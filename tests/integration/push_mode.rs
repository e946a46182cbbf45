//! Scheduled webhook cycle tests.

use std::io::Write;

use crate::helpers::*;
use pingwatch::config::MonitorConfig;
use pingwatch::monitor::Monitor;
use pingwatch::registry::Registry;
use pingwatch::Status;

fn write_config(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(json.as_bytes()).unwrap();
    file
}

/// Run one cycle and wait for every pipeline.
async fn run_once(monitor: &Monitor<ScriptedProber>) -> Vec<Status> {
    let mut statuses = Vec::new();
    for handle in monitor.run_cycle() {
        statuses.push(handle.await.expect("pipeline panicked").status);
    }
    statuses
}

#[tokio::test]
async fn test_operational_target_posts_expected_payload() {
    let hook = FakeEndpoint::start(200, "").await;
    let file = write_config(&format!(
        r#"{{"ping":[{{"host":"10.0.0.1","webhook":"{}"}}]}}"#,
        hook.url("/x")
    ));

    let config = MonitorConfig::load(file.path()).unwrap();
    let prober = ScriptedProber::new().with(
        "10.0.0.1",
        Scripted::Icmp {
            sent: 4,
            received: 4,
            avg_ms: 7,
        },
    );
    let monitor = Monitor::new(Registry::from_config(&config), prober, local_notifier());

    assert_eq!(run_once(&monitor).await, vec![Status::Operational]);

    let requests = hook.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/x");
    assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(
        requests[0].body,
        r#"{"trigger":"up","message":"Received 4/4, avg time 7 ms","name":"ping","status":"OPERATIONAL"}"#
    );
}

#[tokio::test]
async fn test_each_target_gets_its_own_verdict() {
    let hook = FakeEndpoint::start(200, "").await;
    let config = MonitorConfig::from_json(
        &format!(
            r#"{{"ping":[
                {{"host":"10.0.0.1","webhook":"{0}"}},
                {{"host":"10.0.0.2","webhook":"{0}"}},
                {{"host":"10.0.0.3","webhook":"{0}"}}
            ]}}"#,
            hook.url("/hook")
        ),
        "inline",
    )
    .unwrap();

    let prober = ScriptedProber::new()
        .with(
            "10.0.0.1",
            Scripted::Icmp {
                sent: 4,
                received: 3,
                avg_ms: 20,
            },
        )
        .with(
            "10.0.0.2",
            Scripted::Icmp {
                sent: 4,
                received: 0,
                avg_ms: 0,
            },
        )
        .with("10.0.0.3", Scripted::SocketError("operation not permitted"));

    let monitor = Monitor::new(Registry::from_config(&config), prober, local_notifier());

    assert_eq!(
        run_once(&monitor).await,
        vec![
            Status::PartialOutage,
            Status::MajorOutage,
            Status::MajorOutage
        ]
    );

    let mut bodies: Vec<String> = hook.requests().into_iter().map(|r| r.body).collect();
    bodies.sort();
    assert_eq!(
        bodies,
        vec![
            r#"{"trigger":"down","message":"Received 0/4, avg time 0 ms","name":"ping","status":"MAJOROUTAGE"}"#,
            r#"{"trigger":"down","message":"socket: operation not permitted","name":"ping","status":"MAJOROUTAGE"}"#,
            r#"{"trigger":"up","message":"Received 3/4, avg time 20 ms","name":"ping","status":"PARTIALOUTAGE"}"#,
        ]
    );
}

#[tokio::test]
async fn test_failing_webhook_does_not_block_other_targets() {
    let broken = FakeEndpoint::start(500, "internal error").await;
    let healthy = FakeEndpoint::start(200, "").await;
    let config = MonitorConfig::from_json(
        &format!(
            r#"{{"ping":[{{"host":"10.0.0.1","webhook":"{}"}},{{"host":"10.0.0.2","webhook":"{}"}}]}}"#,
            broken.url("/hook"),
            healthy.url("/hook")
        ),
        "inline",
    )
    .unwrap();

    let prober = ScriptedProber::new()
        .with(
            "10.0.0.1",
            Scripted::Icmp {
                sent: 4,
                received: 4,
                avg_ms: 1,
            },
        )
        .with(
            "10.0.0.2",
            Scripted::Icmp {
                sent: 4,
                received: 4,
                avg_ms: 1,
            },
        );
    let monitor = Monitor::new(Registry::from_config(&config), prober, local_notifier());

    run_once(&monitor).await;

    // Exactly one attempt each, no retry on the broken hook
    assert_eq!(broken.requests().len(), 1);
    assert_eq!(healthy.requests().len(), 1);
}

#[tokio::test]
async fn test_target_without_webhook_is_probed_only() {
    let config = MonitorConfig::from_json(r#"{"ping":[{"host":"10.0.0.9"}]}"#, "inline").unwrap();
    let monitor = Monitor::new(
        Registry::from_config(&config),
        ScriptedProber::new(),
        local_notifier(),
    );

    // Unknown host in the script fails to resolve
    assert_eq!(run_once(&monitor).await, vec![Status::MajorOutage]);
}

#[tokio::test]
async fn test_consecutive_cycles_are_independent() {
    let hook = FakeEndpoint::start(200, "").await;
    let config = MonitorConfig::from_json(
        &format!(
            r#"{{"ping":[{{"host":"10.0.0.1","webhook":"{}"}}]}}"#,
            hook.url("/hook")
        ),
        "inline",
    )
    .unwrap();
    let prober = ScriptedProber::new().with(
        "10.0.0.1",
        Scripted::Icmp {
            sent: 4,
            received: 4,
            avg_ms: 2,
        },
    );
    let monitor = Monitor::new(Registry::from_config(&config), prober, local_notifier());

    run_once(&monitor).await;
    run_once(&monitor).await;

    let requests = hook.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body, requests[1].body);
}
