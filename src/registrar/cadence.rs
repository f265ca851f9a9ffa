//! Heartbeat cadence.

use std::time::Duration;

/// How often the heartbeat loop announces after its initial call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Announce once at startup, then stop.
    OneShot,
    /// Announce at startup, then once per interval until shutdown.
    Periodic(Duration),
}

impl Cadence {
    /// A zero interval selects one-shot mode.
    pub fn from_interval(interval: Duration) -> Self {
        if interval.is_zero() {
            Cadence::OneShot
        } else {
            Cadence::Periodic(interval)
        }
    }

    /// Zero or negative seconds select one-shot mode.
    pub fn from_secs_signed(secs: i64) -> Self {
        match u64::try_from(secs) {
            Ok(secs) => Self::from_interval(Duration::from_secs(secs)),
            Err(_) => Cadence::OneShot,
        }
    }

    /// Parse a humantime string ("30s", "1m 30s"). A leading `-` or a zero
    /// duration selects one-shot mode.
    pub fn parse(text: &str) -> Result<Self, humantime::DurationError> {
        let text = text.trim();
        if let Some(rest) = text.strip_prefix('-') {
            humantime::parse_duration(rest)?;
            return Ok(Cadence::OneShot);
        }
        if text == "0" {
            return Ok(Cadence::OneShot);
        }
        humantime::parse_duration(text).map(Self::from_interval)
    }

    /// The repeat interval, or `None` when only the first announce is sent.
    /// `Periodic(Duration::ZERO)` counts as one-shot.
    pub fn interval(&self) -> Option<Duration> {
        match self {
            Cadence::Periodic(interval) if !interval.is_zero() => Some(*interval),
            _ => None,
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.interval() {
            None => write!(f, "one-shot"),
            Some(interval) => write!(f, "every {}", humantime::format_duration(interval)),
        }
    }
}

/// Cadence plus the per-call timeout. Fixed once a registrar is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadencePolicy {
    pub cadence: Cadence,
    pub call_timeout: Duration,
}

impl CadencePolicy {
    pub fn new(cadence: Cadence, call_timeout: Duration) -> Self {
        Self { cadence, call_timeout }
    }
}

impl Default for CadencePolicy {
    fn default() -> Self {
        Self {
            cadence: Cadence::Periodic(Duration::from_secs(20)),
            call_timeout: Duration::from_secs(5),
        }
    }
}
