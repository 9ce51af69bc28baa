//! Unified application error types for LAMUS.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Import failures additionally carry
//! the workspace, the importer that failed, and the archive node involved,
//! so a failed import can be diagnosed from the error alone.

use std::fmt;
use thiserror::Error;

use crate::types::id::WorkspaceId;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A programming error: a required value was never set. Never retried.
    Precondition,
    /// An argument was missing or invalid.
    Validation,
    /// The target subtree overlaps a workspace that is already open.
    PreLocked,
    /// The archive (or the workspace store) has no such node.
    NotFound,
    /// Importing a single node into a workspace failed.
    NodeImport,
    /// A document mutation or storage step failed while linking/unlinking.
    Workspace,
    /// A conflict occurred (duplicate row, concurrent modification).
    Conflict,
    /// A database error occurred.
    Database,
    /// A storage I/O error occurred.
    Storage,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An external collaborator (archive, type checker, handle server) failed.
    ExternalService,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Precondition => write!(f, "PRECONDITION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::PreLocked => write!(f, "PRE_LOCKED"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::NodeImport => write!(f, "NODE_IMPORT"),
            Self::Workspace => write!(f, "WORKSPACE"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Database => write!(f, "DATABASE"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::ExternalService => write!(f, "EXTERNAL_SERVICE"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout LAMUS.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// The workspace the failure belongs to, when known.
    pub workspace_id: Option<WorkspaceId>,
    /// The importer variant that failed (`"metadata"`, `"resource"`, `"orphan"`).
    pub importer: Option<&'static str>,
    /// The archive node involved (the locked node for [`ErrorKind::PreLocked`]).
    pub node_uri: Option<String>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            workspace_id: None,
            importer: None,
            node_uri: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::new(kind, message)
        }
    }

    /// Create a precondition (illegal state) error.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Precondition, message)
    }

    /// Create a validation (invalid argument) error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a pre-lock violation for the given archive node.
    pub fn pre_locked(node_uri: impl Into<String>) -> Self {
        let node_uri = node_uri.into();
        Self {
            node_uri: Some(node_uri.clone()),
            ..Self::new(
                ErrorKind::PreLocked,
                format!("Node {node_uri} overlaps a workspace that is already open"),
            )
        }
    }

    /// Wrap the failure to import one node.
    pub fn node_import(
        workspace_id: WorkspaceId,
        importer: &'static str,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            workspace_id: Some(workspace_id),
            importer: Some(importer),
            ..Self::with_source(ErrorKind::NodeImport, message, source)
        }
    }

    /// Wrap a document-mutation or storage failure inside a workspace.
    pub fn workspace(
        workspace_id: WorkspaceId,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            workspace_id: Some(workspace_id),
            ..Self::with_source(ErrorKind::Workspace, message, source)
        }
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an external-service error.
    pub fn external(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalService, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Attach the archive node this error is about.
    pub fn with_node(mut self, node_uri: impl Into<String>) -> Self {
        self.node_uri = Some(node_uri.into());
        self
    }

    /// Returns true if this error has the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// The directly wrapped [`AppError`], if the source is one.
    pub fn app_source(&self) -> Option<&AppError> {
        self.source
            .as_deref()
            .and_then(|source| source.downcast_ref::<AppError>())
    }

    /// Render the full cause chain as one line, outermost first.
    pub fn chain(&self) -> String {
        let mut rendered = self.to_string();
        let mut current: Option<&(dyn std::error::Error + 'static)> = std::error::Error::source(self);
        while let Some(cause) = current {
            rendered.push_str(": ");
            rendered.push_str(&cause.to_string());
            current = cause.source();
        }
        rendered
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            workspace_id: self.workspace_id,
            importer: self.importer,
            node_uri: self.node_uri.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
