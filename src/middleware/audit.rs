use crate::audit::AuditLog;
use crate::models::AuditEvent;

/// Record an audit event where a failed write must not fail the request.
/// The error is logged and otherwise dropped.
pub async fn record_best_effort(log: &AuditLog, event: AuditEvent) {
    let kind = event.kind();
    if let Err(e) = log.append(event).await {
        tracing::error!("Failed to write {kind} audit entry: {e}");
    }
}
