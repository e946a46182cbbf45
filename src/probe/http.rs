//! HTTP reachability probe.

use hyper::ext::ReasonPhrase;
use reqwest::StatusCode;
use tracing::debug;

use super::{HttpStatus, ProbeError};

/// Issues a single `GET` and reports the response status as the target sent it.
///
/// Redirects and timeouts follow the client defaults.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pingwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Reuse an existing client (shares its connection pool).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, url: &str) -> Result<HttpStatus, ProbeError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!(url, status = status.as_u16(), "http probe response");

        Ok(HttpStatus {
            code: status.as_u16(),
            text: reason_text(status, response.extensions().get::<ReasonPhrase>()),
        })
    }
}

/// Status text as sent by the target.
///
/// hyper only records the reason phrase when it differs from the canonical one.
fn reason_text(status: StatusCode, phrase: Option<&ReasonPhrase>) -> String {
    match phrase {
        Some(phrase) => String::from_utf8_lossy(phrase.as_bytes()).into_owned(),
        None => status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_u16().to_string()),
    }
}
