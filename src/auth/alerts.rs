/// Security alerts raised during refresh.

/// Sink for session anomalies
pub trait SecurityAlerts: Send + Sync {
    /// A refresh arrived from a different origin than the one the consumed
    /// record was issued to. Informational only; the refresh still proceeds.
    fn origin_changed(&self, subject: &str, previous_origin: &str, current_origin: &str);
}

/// Emits one warning log entry per alert
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlerts;

impl SecurityAlerts for LogAlerts {
    fn origin_changed(&self, subject: &str, previous_origin: &str, current_origin: &str) {
        tracing::warn!(
            subject = subject,
            previous_origin = previous_origin,
            current_origin = current_origin,
            "Origin changed between token issuance and refresh"
        );
    }
}
