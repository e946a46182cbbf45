//! Reachability probes.
//!
//! A [`Target`] is either an ICMP host or an HTTP URL; the variant is picked
//! once, when the target is built from its host string. The [`Prober`] trait
//! abstracts over how a target is actually checked so the cycle runner and the
//! query server can be driven by a scripted prober in tests.
//!
//! | Variant | Check | Measurement |
//! |---------|-------|-------------|
//! | [`Target::Icmp`] | N echo requests | sent / received / average RTT |
//! | [`Target::Http`] | one `GET` | status code / status text |

mod error;
mod http;
mod icmp;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

pub use error::ProbeError;
pub use self::http::HttpProbe;
pub use icmp::{IcmpProbe, IcmpSettings};

/// A single monitored endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Host name or IP address checked with ICMP echo.
    Icmp { host: String },
    /// URL checked with an HTTP `GET`.
    Http { url: String },
}

impl Target {
    /// Build a target from a host string.
    ///
    /// Anything containing a colon is treated as a URL, everything else as
    /// an ICMP host.
    pub fn parse(host: &str) -> Self {
        let host = host.trim();
        if host.contains(':') {
            Self::Http {
                url: host.to_string(),
            }
        } else {
            Self::Icmp {
                host: host.to_string(),
            }
        }
    }

    /// The host string this target was built from.
    pub fn host(&self) -> &str {
        match self {
            Self::Icmp { host } => host,
            Self::Http { url } => url,
        }
    }

    /// Probe kind, used as the `name` field of webhook payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Icmp { .. } => "ping",
            Self::Http { .. } => "http",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.host())
    }
}

/// ICMP run statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IcmpStats {
    /// Echo requests sent.
    pub sent: u32,
    /// Echo replies received.
    pub received: u32,
    /// Average round-trip time over received replies (zero if none).
    pub avg_rtt: Duration,
}

impl IcmpStats {
    #[inline]
    pub fn avg_rtt_ms(&self) -> u128 {
        self.avg_rtt.as_millis()
    }
}

/// HTTP response summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStatus {
    pub code: u16,
    pub text: String,
}

/// Raw result of one successful probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Measurement {
    Icmp(IcmpStats),
    Http(HttpStatus),
}

/// Outcome of one probe invocation.
pub type ProbeResult = Result<Measurement, ProbeError>;

/// Trait for probe backends.
///
/// Implementations must be thread-safe; one instance is shared by every
/// pipeline of a cycle.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Run one reachability check against `target`.
    async fn probe(&self, target: &Target) -> ProbeResult;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// Prober that talks to the network.
#[derive(Clone)]
pub struct NetworkProber {
    icmp: IcmpProbe,
    http: HttpProbe,
}

impl NetworkProber {
    pub fn new(icmp: IcmpSettings, http: HttpProbe) -> Self {
        Self {
            icmp: IcmpProbe::new(icmp),
            http,
        }
    }

    /// Prober configured for scheduled webhook cycles.
    pub fn for_push() -> Result<Self, ProbeError> {
        Ok(Self::new(IcmpSettings::push(), HttpProbe::new()?))
    }

    /// Prober configured for synchronous status queries.
    pub fn for_query() -> Result<Self, ProbeError> {
        Ok(Self::new(IcmpSettings::query(), HttpProbe::new()?))
    }

    pub fn icmp_settings(&self) -> &IcmpSettings {
        self.icmp.settings()
    }
}

#[async_trait]
impl Prober for NetworkProber {
    async fn probe(&self, target: &Target) -> ProbeResult {
        match target {
            Target::Icmp { host } => self.icmp.run(host).await.map(Measurement::Icmp),
            Target::Http { url } => self.http.get(url).await.map(Measurement::Http),
        }
    }

    fn name(&self) -> &'static str {
        "network"
    }
}
