//! Metric descriptions.
//!
//! Counters are recorded through the `metrics` facade wherever the event
//! happens; whichever recorder the host installs receives them. This module
//! only attaches descriptions.
//!
//! # Metrics Recorded
//!
//! - `rsperms_cache_hits_total` / `rsperms_cache_misses_total` - lookups by cache
//! - `rsperms_cache_created_total` - entities created on first access
//! - `rsperms_cache_unloads_total` - entities removed from a cache
//! - `rsperms_refresh_failures_total` - failed reloads during bulk refresh
//! - `rsperms_save_failures_total` - failed detached saves
//! - `rsperms_saves_elided_total` - disconnect saves skipped for baseline users

/// Registers descriptions for every counter rsperms records.
///
/// Safe to call more than once.
pub fn describe_metrics() {
    // Cache metrics, labelled by "cache"
    metrics::describe_counter!("rsperms_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!("rsperms_cache_misses_total", "Total number of cache misses");
    metrics::describe_counter!(
        "rsperms_cache_created_total",
        "Total number of entities created on first access"
    );
    metrics::describe_counter!(
        "rsperms_cache_unloads_total",
        "Total number of entities unloaded from a cache"
    );

    // User service metrics
    metrics::describe_counter!(
        "rsperms_refresh_failures_total",
        "Total number of user reloads that failed during a bulk refresh"
    );
    metrics::describe_counter!(
        "rsperms_save_failures_total",
        "Total number of detached user saves that failed"
    );
    metrics::describe_counter!(
        "rsperms_saves_elided_total",
        "Total number of disconnect saves skipped because the user held only the default membership"
    );
}
