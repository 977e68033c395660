//! Structured logging and session metrics.
//!
//! - [`init_logging`]: one-time `tracing` setup with `RUST_LOG` support
//! - [`SessionMetrics`]: counters for one visualization session

use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Initialize structured logging with `RUST_LOG` environment variable support.
///
/// Defaults to `lngraph=info` when `RUST_LOG` is not set. Logs go to stderr
/// so stdout stays free for render payloads. Subsequent calls are silently
/// ignored.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lngraph=info"));

    // try_init so double-init in tests doesn't panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Counters for one session. Serializable via [`SessionMetrics::to_json`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionMetrics {
    pub builds: u64,
    /// Builds that fell back to the placeholder graph.
    pub load_fallbacks: u64,
    pub renders: u64,
    pub filters: u64,
    pub expansions: u64,
    pub collapses: u64,
    pub depth_changes: u64,
    pub color_cache_hits: u64,
    pub color_cache_misses: u64,
    pub last_build_ms: Option<u64>,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "builds": self.builds,
            "load_fallbacks": self.load_fallbacks,
            "renders": self.renders,
            "filters": self.filters,
            "expansions": self.expansions,
            "collapses": self.collapses,
            "depth_changes": self.depth_changes,
            "color_cache_hits": self.color_cache_hits,
            "color_cache_misses": self.color_cache_misses,
            "color_cache_hit_rate": self.color_cache_hit_rate(),
            "last_build_ms": self.last_build_ms,
        })
    }

    pub fn color_cache_hit_rate(&self) -> f64 {
        let total = self.color_cache_hits + self.color_cache_misses;
        if total == 0 {
            return 0.0;
        }
        self.color_cache_hits as f64 / total as f64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
