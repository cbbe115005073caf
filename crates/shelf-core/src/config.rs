//! List cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ListError, ListResult};

/// What a screen does with its cache when it is mounted again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemountPolicy {
    /// Drop accumulated pages; the first fetch starts over.
    #[default]
    Reset,
    /// Keep accumulated pages, cursor and exhaustion state.
    Preserve,
}

impl std::str::FromStr for RemountPolicy {
    type Err = ListError;

    fn from_str(s: &str) -> ListResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reset" => Ok(Self::Reset),
            "preserve" => Ok(Self::Preserve),
            other => Err(ListError::Config {
                message: format!("unknown remount policy '{other}' (expected reset|preserve)"),
            }),
        }
    }
}

/// List cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    /// Items requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Quiescence window before a search term is applied, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Behaviour of [`crate::ListCache::remount`].
    #[serde(default)]
    pub remount: RemountPolicy,
}

fn default_page_size() -> usize {
    10
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
            remount: RemountPolicy::default(),
        }
    }
}

impl ListConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `SHELF_PAGE_SIZE` | Items per page (default: 10) |
    /// | `SHELF_DEBOUNCE_MS` | Search debounce window (default: 300) |
    /// | `SHELF_REMOUNT` | `reset` or `preserve` (default: reset) |
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            page_size: std::env::var("SHELF_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or_else(default_page_size),
            debounce_ms: std::env::var("SHELF_DEBOUNCE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_debounce_ms),
            remount: std::env::var("SHELF_REMOUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        }
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the debounce window.
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce_ms = window.as_millis() as u64;
        self
    }

    /// Set the remount policy.
    pub fn with_remount(mut self, policy: RemountPolicy) -> Self {
        self.remount = policy;
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Reject settings the cache cannot run with.
    pub fn validate(&self) -> ListResult<()> {
        if self.page_size == 0 {
            return Err(ListError::Config {
                message: "page_size must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
