//! The set of monitored targets.

use crate::config::MonitorConfig;
use crate::probe::Target;

/// A target together with the webhook that receives its verdicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredTarget {
    pub target: Target,
    pub webhook: Option<String>,
}

/// Targets loaded at startup. Read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<MonitoredTarget>,
}

impl Registry {
    pub fn new(entries: Vec<MonitoredTarget>) -> Self {
        Self { entries }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        let entries = config
            .targets
            .iter()
            .map(|entry| MonitoredTarget {
                target: Target::parse(&entry.host),
                webhook: entry.webhook.clone(),
            })
            .collect();
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonitoredTarget> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
