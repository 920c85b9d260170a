use rolewarden_application::{FailureDisposition, FailureRecord, FailureSink};
use tracing::{error, warn};

/// Failure sink that writes every record to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFailureSink;

impl TracingFailureSink {
    /// Creates the sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FailureSink for TracingFailureSink {
    fn record(&self, failure: &FailureRecord) {
        let community_id = failure
            .community_id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();

        match failure.disposition {
            FailureDisposition::Recoverable => warn!(
                operation = failure.operation,
                source = failure.source.as_str(),
                community_id = %community_id,
                error = %failure.message,
                "recoverable failure; continuing"
            ),
            FailureDisposition::Fatal => error!(
                operation = failure.operation,
                source = failure.source.as_str(),
                community_id = %community_id,
                error = %failure.message,
                "fatal failure"
            ),
        }
    }
}
