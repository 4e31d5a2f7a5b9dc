use folio_core_types::RequestId;
use thiserror::Error;

/// Result type alias using FolioError
pub type Result<T> = std::result::Result<T, FolioError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and process-level reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    NotFound,
    ConstraintViolation,

    // Integration/IO
    Io,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus optional
/// context (operation, entity, unit of work) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain failures raised by the merge and removal operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FolioError {
    /// A detached Creator carries an id that is not tracked
    #[error("Creator not found: {creator_id}")]
    CreatorNotFound { creator_id: u64 },

    /// A detached Work carries an id that is not tracked
    #[error("Work not found: {work_id}")]
    WorkNotFound { work_id: u64 },

    /// A detached Work names an existing Work owned by a different Creator
    #[error("Work {work_id} belongs to creator {owner_id}, not creator {creator_id}")]
    WorkOwnedByOtherCreator {
        work_id: u64,
        owner_id: u64,
        creator_id: u64,
    },

    /// The same Work id appears twice in one supplied collection
    #[error("Work {work_id} appears more than once in creator {creator_id}")]
    DuplicateWork { work_id: u64, creator_id: u64 },

    /// A Creator's full name is empty or whitespace-only
    #[error("Invalid creator name: {reason}")]
    InvalidName { reason: String },

    /// A Work's title is empty or whitespace-only
    #[error("Invalid work title: {reason}")]
    InvalidTitle { reason: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<std::io::Error> for ExError {
    fn from(err: std::io::Error) -> Self {
        ExError::new(ExErrorKind::Io).with_message(err.to_string())
    }
}

impl From<FolioError> for ExError {
    fn from(err: FolioError) -> Self {
        match err {
            FolioError::CreatorNotFound { creator_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(creator_id.to_string())
                .with_message("Creator not found"),

            FolioError::WorkNotFound { work_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(work_id.to_string())
                .with_message("Work not found"),

            FolioError::WorkOwnedByOtherCreator {
                work_id,
                owner_id,
                creator_id,
            } => ExError::new(ExErrorKind::ConstraintViolation)
                .with_entity_id(work_id.to_string())
                .with_message(format!(
                    "Work belongs to creator {}, cannot be merged into creator {}",
                    owner_id, creator_id
                )),

            FolioError::DuplicateWork {
                work_id,
                creator_id,
            } => ExError::new(ExErrorKind::InvalidInput)
                .with_entity_id(work_id.to_string())
                .with_message(format!(
                    "Work supplied more than once for creator {}",
                    creator_id
                )),

            FolioError::InvalidName { reason } => ExError::new(ExErrorKind::InvalidInput)
                .with_message(format!("Invalid creator name: {}", reason)),

            FolioError::InvalidTitle { reason } => ExError::new(ExErrorKind::InvalidInput)
                .with_message(format!("Invalid work title: {}", reason)),

            FolioError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code_op_and_entity() {
        let err = ExError::new(ExErrorKind::NotFound)
            .with_op("merge")
            .with_entity_id("7")
            .with_message("Creator not found");

        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_NOT_FOUND]"));
        assert!(rendered.contains("in operation 'merge'"));
        assert!(rendered.contains("(entity_id: 7)"));
    }

    #[test]
    fn test_display_without_context() {
        let err = ExError::new(ExErrorKind::Internal);
        assert_eq!(err.to_string(), "[ERR_INTERNAL]");
    }
}
