//! # Route Targets
//!
//! A target is either a hostname, which has to be resolved first, or a literal address that
//! is routed as-is. A [`ConfigurationRun`] lays the targets of one [`Settings`] snapshot out in
//! processing order: every hostname, then every literal address.

use std::fmt;

use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Hostname,
    Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub kind: TargetKind,
    pub value: String,
}

impl Target {
    pub fn hostname(value: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Hostname,
            value: value.into(),
        }
    }

    pub fn address(value: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Address,
            value: value.into(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// The ordered work of a single run and how far it got.
#[derive(Debug, Clone)]
pub struct ConfigurationRun {
    targets: Vec<Target>,
    completed: usize,
}

impl ConfigurationRun {
    /// Blank entries are skipped and do not count toward the total.
    pub fn from_settings(settings: &Settings) -> Self {
        let hostnames = non_blank(&settings.hostnames).map(Target::hostname);
        let addresses = non_blank(&settings.addresses).map(Target::address);
        Self {
            targets: hostnames.chain(addresses).collect(),
            completed: 0,
        }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn total(&self) -> usize {
        self.targets.len()
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn is_finished(&self) -> bool {
        self.completed >= self.targets.len()
    }

    /// Marks one more target as processed and returns the new count.
    pub fn advance(&mut self) -> usize {
        self.completed = (self.completed + 1).min(self.targets.len());
        self.completed
    }
}

fn non_blank(list: &[String]) -> impl Iterator<Item = &str> {
    list.iter().map(|entry| entry.trim()).filter(|entry| !entry.is_empty())
}
