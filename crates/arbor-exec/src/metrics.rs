//! Metrics/tracing hooks (starter).
//!
//! This module purposefully avoids pulling heavy telemetry stacks.
//! Wire these up to OpenTelemetry/Prometheus in the binary layer.

#[cfg(feature = "tracing")]
pub fn emit_event(event: &str, key_values: &[(&str, String)]) {
    for (k, v) in key_values {
        tracing::trace!(%event, %k, %v, "metric");
    }
}

#[cfg(not(feature = "tracing"))]
pub fn emit_event(_event: &str, _key_values: &[(&str, String)]) { /* no-op */
}
