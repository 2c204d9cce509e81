use thiserror::Error;

/// Engine-level error taxonomy. The orchestrator never swallows backend
/// errors: the original error text is always carried through.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No backend is registered for the requested platform name. A
    /// configuration error; no state mutation occurs.
    #[error("no backend registered for platform '{0}'")]
    BackendNotFound(String),

    /// Status/drift was requested for a resource id with no stored record.
    #[error("no state recorded for resource '{0}'")]
    ResourceNotFound(String),

    /// The backend call itself failed. Wraps the underlying error.
    #[error("{operation} failed: {source}")]
    BackendOperationFailed {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The operation was aborted by its deadline. If the backend call had
    /// already been issued, the stored record carries an `error` status
    /// with a "cancelled" message, since the live state is then unknown.
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// A state store read or write failed.
    #[error("state store: {0}")]
    Store(#[source] anyhow::Error),
}

impl EngineError {
    pub fn backend(operation: &'static str, source: anyhow::Error) -> Self {
        EngineError::BackendOperationFailed { operation, source }
    }
}
