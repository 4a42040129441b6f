use tracing::{debug, error, info, warn};

/// Logs the start of a pipeline run with consistent format
pub fn log_run_start(run_id: &str, sources: usize) {
    info!("RUN_START: {} over {} source(s)", run_id, sources);
}

/// Logs a finished run with its headline counters
pub fn log_run_finished(run_id: &str, extracted: usize, new: usize, dispatched: usize, failed: usize) {
    info!(
        "RUN_DONE: {} - extracted {}, new {}, dispatched {}, failed {}",
        run_id, extracted, new, dispatched, failed
    );
}

/// Logs an aborted run
pub fn log_run_aborted(run_id: &str, error: &str) {
    error!("RUN_ABORTED: {} - {}", run_id, error);
}

/// Logs a per-source extraction result
pub fn log_source_extracted(source: &str, url: &str, extracted: usize, skipped: usize) {
    if skipped > 0 {
        warn!(
            "SOURCE_OK: {} ({}) - {} article(s), {} item(s) skipped",
            source, url, extracted, skipped
        );
    } else {
        info!("SOURCE_OK: {} ({}) - {} article(s)", source, url, extracted);
    }
}

/// Logs a source that failed for this run
pub fn log_source_failure(source: &str, url: &str, error: &str) {
    error!("SOURCE_FAILED: {} ({}) - {}", source, url, error);
}

/// Logs an item dropped during extraction
pub fn log_item_skipped(source: &str, reason: &str, details: Option<&str>) {
    match details {
        Some(d) => warn!("ITEM_SKIPPED: {} - {} - {}", source, reason, d),
        None => warn!("ITEM_SKIPPED: {} - {}", source, reason),
    }
}

/// Logs a delivery attempt outcome
pub fn log_dispatch(article_id: &str, title: &str, error: Option<&str>) {
    match error {
        Some(e) => error!("DISPATCH_ERROR: {} \"{}\" - {}", article_id, title, e),
        None => info!("DISPATCH_OK: {} \"{}\"", article_id, title),
    }
}

/// Logs database operations with consistent format
pub fn log_database_operation(operation: &str, table: &str, details: Option<&str>) {
    match details {
        Some(d) => debug!("DB_OP: {} on {} - {}", operation, table, d),
        None => debug!("DB_OP: {} on {}", operation, table),
    }
}

/// Logs database errors with consistent format
pub fn log_database_error(operation: &str, table: &str, error: &str, details: Option<&str>) {
    match details {
        Some(d) => error!("DB_ERROR: {} on {} failed: {} - {}", operation, table, error, d),
        None => error!("DB_ERROR: {} on {} failed: {}", operation, table, error),
    }
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
