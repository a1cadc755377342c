use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

pub const ENV_INITIAL_DELAY_MS: &str = "SEMSCOPE_BACKOFF_INITIAL_MS";
pub const ENV_MULTIPLIER: &str = "SEMSCOPE_BACKOFF_MULTIPLIER";
pub const ENV_MAX_DELAY_MS: &str = "SEMSCOPE_BACKOFF_MAX_MS";
pub const ENV_MAX_ATTEMPTS: &str = "SEMSCOPE_BACKOFF_MAX_ATTEMPTS";
pub const ENV_RESYNC_ON_GAP: &str = "SEMSCOPE_RESYNC_ON_GAP";

/// Exponential backoff for retried language-server requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    pub initial_delay_ms: u64,
    pub multiplier: u32,
    pub max_delay_ms: u64,
    /// `None` retries until the session is cancelled.
    pub max_attempts: Option<u32>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 100,
            multiplier: 2,
            max_delay_ms: 10_000,
            max_attempts: None,
        }
    }
}

impl BackoffConfig {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = u64::from(self.multiplier.max(1)).saturating_pow(attempt.saturating_sub(1));
        let delay = self.initial_delay_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.max_delay_ms.max(self.initial_delay_ms)))
    }

    pub fn attempts_exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub backoff: BackoffConfig,
    /// Reload the whole database when an update batch skips versions,
    /// instead of applying it.
    pub resync_on_gap: bool,
}

impl SessionConfig {
    /// Defaults overlaid with `SEMSCOPE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let backoff = &mut config.backoff;
        overlay(&lookup, ENV_INITIAL_DELAY_MS, &mut backoff.initial_delay_ms);
        overlay(&lookup, ENV_MULTIPLIER, &mut backoff.multiplier);
        overlay(&lookup, ENV_MAX_DELAY_MS, &mut backoff.max_delay_ms);
        if let Some(raw) = lookup(ENV_MAX_ATTEMPTS) {
            match raw.trim().parse::<u32>() {
                Ok(0) => backoff.max_attempts = None,
                Ok(max) => backoff.max_attempts = Some(max),
                Err(e) => tracing::warn!("Ignoring {}={:?}: {}", ENV_MAX_ATTEMPTS, raw, e),
            }
        }
        overlay(&lookup, ENV_RESYNC_ON_GAP, &mut config.resync_on_gap);
        config
    }
}

fn overlay<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, target: &mut T)
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(e) => tracing::warn!("Ignoring {}={:?}: {}", key, raw, e),
    }
}
