//! Outbound ports (collaborator traits)
//!
//! Hexagonal architecture: these are the interfaces that infrastructure must implement.

use async_trait::async_trait;

use crate::application::dto::{ExportFile, ExportOptions, SubmissionBundle, SubmissionReceipt};
use crate::domain::aggregates::{FormDefinition, FormResponse};
use crate::domain::services::Template;
use crate::domain::value_objects::{FileHandle, FormId, OrgUnitRef};
use crate::domain::DomainEvent;

/// Form definition storage
#[async_trait]
pub trait FormRepository: Send + Sync {
    /// Find form by ID
    async fn find_by_id(&self, id: &FormId) -> Result<Option<FormDefinition>, RepositoryError>;

    /// Create or update, returning the stored identifier
    async fn save(&self, form: &FormDefinition) -> Result<FormId, RepositoryError>;

    /// Delete form
    async fn delete(&self, id: &FormId) -> Result<(), RepositoryError>;

    /// All stored forms
    async fn list(&self) -> Result<Vec<FormDefinition>, RepositoryError>;
}

/// Response storage
#[async_trait]
pub trait ResponseRepository: Send + Sync {
    /// Responses of a form, oldest first
    async fn list_by_form(&self, form_id: &FormId) -> Result<Vec<FormResponse>, RepositoryError>;

    async fn create(&self, response: &FormResponse) -> Result<(), RepositoryError>;
}

/// Organizational unit lookup
#[async_trait]
pub trait OrgUnitDirectory: Send + Sync {
    async fn resolve(&self, id: &str) -> Result<Option<OrgUnitRef>, RepositoryError>;

    async fn list(&self) -> Result<Vec<OrgUnitRef>, RepositoryError>;
}

/// Tabular encoding of a response set
#[async_trait]
pub trait ResponseExporter: Send + Sync {
    async fn export(
        &self,
        form: &FormDefinition,
        responses: &[FormResponse],
        options: &ExportOptions,
    ) -> Result<ExportFile, RepositoryError>;
}

/// Destination of a finished export
#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Store the file, returning where it went
    async fn save(&self, file: &ExportFile) -> Result<String, TransportError>;
}

/// Upload progress callback, in bytes
pub trait UploadProgress: Send + Sync {
    fn on_progress(&self, sent: u64, total: u64);
}

/// Progress sink that ignores updates
pub struct NoProgress;

impl UploadProgress for NoProgress {
    fn on_progress(&self, _sent: u64, _total: u64) {}
}

/// Multi-part submission transport
#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn submit(
        &self,
        bundle: &SubmissionBundle,
        progress: &dyn UploadProgress,
    ) -> Result<SubmissionReceipt, TransportError>;
}

/// Clipboard used to share fill-out links
pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> Result<(), TransportError>;
}

/// Local preview resources for attached media files
pub trait PreviewProvider: Send + Sync {
    /// Create a preview, returning its URL, or `None` if none is needed
    fn create(&self, file: &FileHandle) -> Option<String>;

    fn release(&self, url: &str);
}

/// Asked before a template discards the current fields
pub trait OverwriteConfirmation: Send + Sync {
    fn confirm_overwrite(&self, form: &FormDefinition, template: &Template) -> bool;
}

/// Always allows the overwrite
pub struct AlwaysOverwrite;

impl OverwriteConfirmation for AlwaysOverwrite {
    fn confirm_overwrite(&self, _form: &FormDefinition, _template: &Template) -> bool {
        true
    }
}

/// Event publisher port
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish domain events
    async fn publish(&self, events: Vec<DomainEvent>) -> Result<(), RepositoryError>;
}

/// Repository error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    NotFound,
    ConnectionError(String),
    QueryError(String),
    SerializationError(String),
}

impl std::error::Error for RepositoryError {}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "Entity not found"),
            Self::ConnectionError(e) => write!(f, "Connection error: {}", e),
            Self::QueryError(e) => write!(f, "Query error: {}", e),
            Self::SerializationError(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl From<std::io::Error> for RepositoryError {
    fn from(e: std::io::Error) -> Self {
        Self::ConnectionError(e.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}

/// Failure talking to a transport, clipboard, or file sink
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("upload failed: {0}")]
    Upload(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<RepositoryError> for TransportError {
    fn from(e: RepositoryError) -> Self {
        Self::Connection(e.to_string())
    }
}
