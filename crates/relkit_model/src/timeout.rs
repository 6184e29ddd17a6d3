//! Network timeouts for entities that talk to remote services.

use serde::Deserialize;

#[cfg(test)]
#[path = "timeout_tests.rs"]
mod tests;

pub const DEFAULT_CONNECT_TIMEOUT_SECONDS: u32 = 20;
pub const DEFAULT_READ_TIMEOUT_SECONDS: u32 = 60;

/// Connect and read timeouts in seconds.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub(crate) connect_timeout: Option<u32>,
    pub(crate) read_timeout: Option<u32>,
}

impl Timeouts {
    pub fn merge(&mut self, incoming: &Timeouts) {
        crate::merge::merge_value(&mut self.connect_timeout, &incoming.connect_timeout);
        crate::merge::merge_value(&mut self.read_timeout, &incoming.read_timeout);
    }
}

/// Entities with network timeouts. Unset or zero values use the defaults.
pub trait TimeoutAware {
    fn timeouts(&self) -> &Timeouts;

    fn connect_timeout(&self) -> u32 {
        match self.timeouts().connect_timeout {
            Some(seconds) if seconds > 0 => seconds,
            _ => DEFAULT_CONNECT_TIMEOUT_SECONDS,
        }
    }

    fn read_timeout(&self) -> u32 {
        match self.timeouts().read_timeout {
            Some(seconds) if seconds > 0 => seconds,
            _ => DEFAULT_READ_TIMEOUT_SECONDS,
        }
    }
}

impl TimeoutAware for Timeouts {
    fn timeouts(&self) -> &Timeouts {
        self
    }
}
