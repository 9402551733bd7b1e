//! Process-wide switch for logging patient-identifying values.
//!
//! Accession numbers tie a specimen to a patient. Library crates pass them
//! through [`redact_value`] before logging; the binary flips the switch when
//! the user asks for data logging.

use std::sync::atomic::{AtomicBool, Ordering};

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

/// Placeholder used when data logging is disabled.
pub const REDACTED_VALUE: &str = "[REDACTED]";

pub fn set_log_data(enable: bool) {
    LOG_DATA_ENABLED.store(enable, Ordering::Release);
}

/// Returns true if data logging is explicitly enabled.
pub fn log_data_enabled() -> bool {
    LOG_DATA_ENABLED.load(Ordering::Relaxed)
}

/// Returns the input value when data logging is enabled, otherwise a redacted token.
pub fn redact_value(value: &str) -> &str {
    if log_data_enabled() {
        value
    } else {
        REDACTED_VALUE
    }
}
