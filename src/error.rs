//! Error type shared by the engine, the pure logic and the stores.

use thiserror::Error;

/// Errors that can occur during draw operations.
#[derive(Debug, Error)]
pub enum DrawError {
    /// Tournament, group or match does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input rejected before anything was written.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Something already exists for this category; reset it first.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A multi-write operation stopped partway. Nothing is rolled back.
    #[error("{operation} failed after {completed} write(s): {source}")]
    PartialFailure {
        operation: &'static str,
        completed: usize,
        #[source]
        source: Box<DrawError>,
    },

    /// Failure reported by the storage backend.
    #[error("Store error: {0}")]
    Store(String),
}

impl DrawError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DrawError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Wrap `source` as a partial failure when some writes already landed.
    pub fn partial(operation: &'static str, completed: usize, source: DrawError) -> Self {
        if completed == 0 {
            return source;
        }
        log::warn!("{operation} stopped after {completed} write(s): {source}");
        DrawError::PartialFailure {
            operation,
            completed,
            source: Box::new(source),
        }
    }

    /// Message safe to show in the admin UI. Backend details are not exposed.
    pub fn client_message(&self) -> String {
        match self {
            DrawError::Store(_) => "Storage unavailable, retry the operation".to_string(),
            DrawError::PartialFailure { operation, .. } => format!(
                "{operation} did not finish; reset and regenerate to recover"
            ),
            _ => self.to_string(),
        }
    }
}

/// Result type for draw operations.
pub type DrawResult<T> = Result<T, DrawError>;
