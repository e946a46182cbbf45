//! Turns raw probe results into health verdicts.
//!
//! Both classifiers are pure: the verdict depends on exactly one probe result
//! and nothing else. Full packet loss is always a major outage; partial loss
//! is always degraded and never upgraded.

use std::fmt;

use serde::Serialize;

use crate::probe::{HttpStatus, IcmpStats, Measurement, ProbeResult};

/// Webhook trigger direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Up,
    Down,
}

/// Push-mode health state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Operational,
    PartialOutage,
    MajorOutage,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operational => "OPERATIONAL",
            Self::PartialOutage => "PARTIALOUTAGE",
            Self::MajorOutage => "MAJOROUTAGE",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Push-mode verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub trigger: Trigger,
    pub status: Status,
    pub message: String,
}

impl Verdict {
    fn new(trigger: Trigger, status: Status, message: impl Into<String>) -> Self {
        Self {
            trigger,
            status,
            message: message.into(),
        }
    }
}

/// Pull-mode verdict: the HTTP status and body of a status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryVerdict {
    pub code: u16,
    pub message: String,
}

impl QueryVerdict {
    fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Classify a probe result for webhook delivery.
pub fn classify_push(result: &ProbeResult) -> Verdict {
    match result {
        Err(e) => Verdict::new(Trigger::Down, Status::MajorOutage, e.to_string()),
        Ok(Measurement::Icmp(stats)) => classify_icmp_push(stats),
        Ok(Measurement::Http(status)) => classify_http_push(status),
    }
}

fn classify_icmp_push(stats: &IcmpStats) -> Verdict {
    let message = format!(
        "Received {}/{}, avg time {} ms",
        stats.received,
        stats.sent,
        stats.avg_rtt_ms()
    );

    if stats.received == 0 {
        Verdict::new(Trigger::Down, Status::MajorOutage, message)
    } else if stats.received < stats.sent {
        Verdict::new(Trigger::Up, Status::PartialOutage, message)
    } else {
        Verdict::new(Trigger::Up, Status::Operational, message)
    }
}

fn classify_http_push(status: &HttpStatus) -> Verdict {
    let message = format!("HTTP {} {}", status.code, status.text);

    match status.code {
        200..=299 => Verdict::new(Trigger::Up, Status::Operational, message),
        500..=599 => Verdict::new(Trigger::Down, Status::MajorOutage, message),
        _ => Verdict::new(Trigger::Up, Status::PartialOutage, message),
    }
}

/// Classify a probe result for a synchronous status query.
pub fn classify_query(result: &ProbeResult) -> QueryVerdict {
    match result {
        Err(e) => QueryVerdict::new(500, e.to_string()),
        Ok(Measurement::Icmp(stats)) => {
            let lost = format!("Received {} packets out of {}", stats.received, stats.sent);
            if stats.received == 0 {
                QueryVerdict::new(500, lost)
            } else if stats.received < stats.sent {
                QueryVerdict::new(503, lost)
            } else {
                QueryVerdict::new(200, "OK")
            }
        }
        Ok(Measurement::Http(status)) => QueryVerdict::new(status.code, status.text.clone()),
    }
}
