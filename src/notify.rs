//! Webhook delivery.
//!
//! One verdict becomes one `POST` of a small JSON document:
//!
//! ```json
//! {"trigger":"up","message":"Received 4/4, avg time 12 ms","name":"ping","status":"OPERATIONAL"}
//! ```
//!
//! Only `200 OK` counts as delivered. There is no retry: a failed delivery is
//! reported to the caller once and then dropped.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::classify::{Status, Trigger, Verdict};

/// Wire form of a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payload {
    pub trigger: Trigger,
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl Payload {
    /// Build the payload for `verdict`, tagged with the probe kind.
    pub fn from_verdict(name: impl Into<String>, verdict: &Verdict) -> Self {
        Self {
            trigger: verdict.trigger,
            message: verdict.message.clone(),
            name: name.into(),
            status: Some(verdict.status),
        }
    }
}

/// Webhook delivery failure.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("encode payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The webhook answered with something other than `200 OK`.
    #[error("webhook returned HTTP {status}: {body}")]
    Rejected {
        status: u16,
        body: String,
        /// The JSON document that was sent.
        payload: String,
    },
}

/// Posts payloads to webhook endpoints.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: reqwest::Client,
}

impl Notifier {
    pub fn new() -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pingwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Deliver `payload` to `endpoint` with a single attempt.
    pub async fn notify(&self, endpoint: &str, payload: &Payload) -> Result<(), NotifyError> {
        let data = serde_json::to_string(payload)?;

        let response = self
            .client
            .post(endpoint)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(data.clone())
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_else(|e| e.to_string());
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
                payload: data,
            });
        }

        debug!(endpoint, "webhook accepted payload");
        Ok(())
    }
}
