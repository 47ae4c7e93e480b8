use sitecontent_core_types::{RequestContext, RequestId, TraceId};
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used in logs, CLI output and
/// test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    NotFound,
    ConstraintViolation,

    // Auth
    Unauthorised,
    Forbidden,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    ExternalService,
    Timeout,
    Config,

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
            ExErrorKind::Unauthorised => "ERR_UNAUTHORISED",
            ExErrorKind::Forbidden => "ERR_FORBIDDEN",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether the failure was reported by the store or its transport
    ///
    /// Store-reported failures surface their own message in the mirror;
    /// everything else is collapsed into a generic message.
    pub fn is_store_reported(&self) -> bool {
        matches!(
            self,
            ExErrorKind::NotFound
                | ExErrorKind::ConstraintViolation
                | ExErrorKind::Forbidden
                | ExErrorKind::Persistence
                | ExErrorKind::ExternalService
                | ExErrorKind::Timeout
                | ExErrorKind::Io
        )
    }
}

/// Canonical structured error type
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    collection: Option<String>,
    section: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            collection: None,
            section: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the backing collection name
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Add the section identifier the caller used
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Attach request and trace ids from a request context
    pub fn with_context(mut self, ctx: &RequestContext) -> Self {
        self.request_id = Some(ctx.request_id.clone());
        self.trace_id = ctx.trace_id.clone();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
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

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
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
        if let Some(section) = &self.section {
            write!(f, " (section: {})", section)?;
        }
        if let Some(collection) = &self.collection {
            write!(f, " (collection: {})", collection)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain failures raised by the content layer itself
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    /// Identifier is not part of the known section set
    #[error("Unknown section: {name}")]
    UnknownSection { name: String },

    /// Write attempted without an authenticated session
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Field is not declared in the collection schema
    #[error("Unknown field '{field}' for collection {collection}")]
    UnknownField { collection: String, field: String },

    /// Field value has the wrong scalar type for its column
    #[error("Field '{field}' of collection {collection} expects {expected}")]
    FieldTypeMismatch {
        collection: String,
        field: String,
        expected: String,
    },

    /// Typed content was handed to an accessor of another collection
    #[error("Content for {actual} cannot be written to {expected}")]
    ContentMismatch { expected: String, actual: String },

    /// A single-row collection returned more than one row
    #[error("Collection {collection} holds {count} rows, expected at most one")]
    MultipleRows { collection: String, count: usize },

    /// Configuration could not be loaded or is inconsistent
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<ContentError> for ExError {
    fn from(err: ContentError) -> Self {
        let message = err.to_string();
        match err {
            ContentError::UnknownSection { name } => ExError::new(ExErrorKind::InvalidInput)
                .with_section(name)
                .with_message(message),

            ContentError::AuthenticationRequired => {
                ExError::new(ExErrorKind::Unauthorised).with_message(message)
            }

            ContentError::UnknownField { collection, .. }
            | ContentError::FieldTypeMismatch { collection, .. } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_collection(collection)
                    .with_message(message)
            }

            ContentError::ContentMismatch { expected, .. } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_collection(expected)
                    .with_message(message)
            }

            ContentError::MultipleRows { collection, .. } => {
                ExError::new(ExErrorKind::ConstraintViolation)
                    .with_collection(collection)
                    .with_message(message)
            }

            ContentError::InvalidConfig { .. } => {
                ExError::new(ExErrorKind::Config).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Serialization).with_message(err.to_string())
    }
}
