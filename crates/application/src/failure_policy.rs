use std::sync::Arc;

use rolewarden_core::AppError;
use rolewarden_domain::CommunityId;

/// Collaborator a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureSource {
    /// Persisted store query.
    Store,
    /// Role grant or revoke call against the platform.
    Platform,
    /// Membership snapshot collection.
    Snapshot,
    /// Opening the platform session.
    Session,
}

impl FailureSource {
    /// Returns a stable name for logging.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Platform => "platform",
            Self::Snapshot => "snapshot",
            Self::Session => "session",
        }
    }
}

/// Whether processing continues after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDisposition {
    /// Logged; the surrounding loop moves on.
    Recoverable,
    /// Startup must abort.
    Fatal,
}

/// One reported failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    /// Operation that observed the failure.
    pub operation: &'static str,
    /// Failing collaborator.
    pub source: FailureSource,
    /// Classification.
    pub disposition: FailureDisposition,
    /// Community in scope, if any.
    pub community_id: Option<CommunityId>,
    /// Rendered error.
    pub message: String,
}

/// Port receiving classified failures.
pub trait FailureSink: Send + Sync {
    /// Records a failure.
    fn record(&self, failure: &FailureRecord);
}

/// Classifies failures and forwards them to a sink.
#[derive(Clone)]
pub struct FailurePolicy {
    sink: Arc<dyn FailureSink>,
}

impl FailurePolicy {
    /// Creates a policy reporting into the given sink.
    #[must_use]
    pub fn new(sink: Arc<dyn FailureSink>) -> Self {
        Self { sink }
    }

    /// Classifies a failure without reporting it.
    ///
    /// Only a session that cannot be opened is fatal. Store, platform and
    /// snapshot failures self-heal on later events.
    #[must_use]
    pub fn classify(source: FailureSource, _error: &AppError) -> FailureDisposition {
        match source {
            FailureSource::Session => FailureDisposition::Fatal,
            FailureSource::Store | FailureSource::Platform | FailureSource::Snapshot => {
                FailureDisposition::Recoverable
            }
        }
    }

    /// Classifies and records a failure, returning its disposition.
    pub fn report(
        &self,
        operation: &'static str,
        source: FailureSource,
        community_id: Option<&CommunityId>,
        error: &AppError,
    ) -> FailureDisposition {
        let disposition = Self::classify(source, error);
        self.sink.record(&FailureRecord {
            operation,
            source,
            disposition,
            community_id: community_id.cloned(),
            message: error.to_string(),
        });

        disposition
    }
}
