//! Optional metrics instrumentation for logvault.
//!
//! When the `observe` feature is enabled, writes, queries, lock waits and
//! counter rollbacks emit counters and histograms via the [`metrics`] crate.
//! A downstream application must install a metrics recorder to collect them.
//!
//! Without the feature every function here is a zero-cost no-op.

use std::time::Duration;

/// Record one append (counter + latency histogram).
///
/// - `logvault.write.total` – counter with `outcome` label (`ok` / `fail`)
/// - `logvault.write.duration_seconds` – histogram
#[inline]
pub fn record_write(duration: Duration, success: bool) {
    #[cfg(feature = "observe")]
    {
        let outcome = if success { "ok" } else { "fail" };
        metrics::counter!("logvault.write.total", "outcome" => outcome).increment(1);
        metrics::histogram!("logvault.write.duration_seconds").record(duration.as_secs_f64());
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = (duration, success);
    }
}

/// Record one query scan.
///
/// - `logvault.query.total` – counter
/// - `logvault.query.duration_seconds` – histogram
/// - `logvault.query.files_scanned_total` – counter
/// - `logvault.query.records_matched_total` – counter
#[inline]
pub fn record_query(duration: Duration, files_scanned: u64, records_matched: u64) {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("logvault.query.total").increment(1);
        metrics::histogram!("logvault.query.duration_seconds").record(duration.as_secs_f64());
        metrics::counter!("logvault.query.files_scanned_total").increment(files_scanned);
        metrics::counter!("logvault.query.records_matched_total").increment(records_matched);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = (duration, files_scanned, records_matched);
    }
}

/// Record time spent waiting for a partition lock.
///
/// - `logvault.lock.wait_duration_seconds` – histogram with `mode` label
#[inline]
pub fn record_lock_wait(duration: Duration, exclusive: bool) {
    #[cfg(feature = "observe")]
    {
        let mode = if exclusive { "write" } else { "read" };
        metrics::histogram!("logvault.lock.wait_duration_seconds", "mode" => mode)
            .record(duration.as_secs_f64());
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = (duration, exclusive);
    }
}

/// Record an id handed back after a failed append.
///
/// - `logvault.counter.rollbacks_total` – counter
#[inline]
pub fn record_rollback() {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("logvault.counter.rollbacks_total").increment(1);
    }
}
