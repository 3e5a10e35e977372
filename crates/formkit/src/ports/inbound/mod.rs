//! Inbound ports (Use case traits)
//!
//! Hexagonal architecture: application service interfaces.

use async_trait::async_trait;

use crate::application::dto::FormSummary;
use crate::application::fill::FillSession;
use crate::domain::aggregates::{FormDefinition, FormError, FormResponse};
use crate::domain::services::ValidationError;
use crate::domain::value_objects::{FieldError, FormId, OrgUnitRef};
use crate::ports::outbound::{ExportSink, RepositoryError, TransportError, UploadProgress};

/// Form authoring use cases
#[async_trait]
pub trait FormUseCases: Send + Sync {
    /// Validate and persist, returning the stored identifier
    async fn save_form(&self, form: &mut FormDefinition) -> Result<FormId, UseCaseError>;

    /// Load a stored form
    async fn load_form(&self, id: &FormId) -> Result<FormDefinition, UseCaseError>;

    /// List stored forms
    async fn list_forms(&self) -> Result<Vec<FormSummary>, UseCaseError>;

    /// Delete a stored form
    async fn delete_form(&self, id: &FormId) -> Result<(), UseCaseError>;

    /// Validate, publish, and persist
    async fn publish_form(&self, form: &mut FormDefinition) -> Result<FormId, UseCaseError>;

    /// Organizational units a form can be associated with
    async fn list_org_units(&self) -> Result<Vec<OrgUnitRef>, UseCaseError>;

    /// Build the public fill-out link and copy it to the clipboard
    fn share_link(&self, form: &FormDefinition) -> Result<String, UseCaseError>;
}

/// Response capture use cases
#[async_trait]
pub trait ResponseUseCases: Send + Sync {
    /// Validate the session's values and hand them to the transport
    async fn submit(
        &self,
        session: &FillSession,
        progress: &dyn UploadProgress,
    ) -> Result<FormResponse, UseCaseError>;

    /// Stored responses of a form
    async fn list_responses(&self, form_id: &FormId) -> Result<Vec<FormResponse>, UseCaseError>;

    /// Request a tabular export and save the returned file
    async fn export_responses(&self, form_id: &FormId, sink: &dyn ExportSink) -> Result<String, UseCaseError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UseCaseError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("domain error: {0}")]
    Domain(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<RepositoryError> for UseCaseError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound("entity not found".into()),
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<TransportError> for UseCaseError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<FormError> for UseCaseError {
    fn from(e: FormError) -> Self {
        match e {
            FormError::FieldNotFound(id) => Self::NotFound(format!("field {}", id)),
            other => Self::Domain(other.to_string()),
        }
    }
}

impl From<FieldError> for UseCaseError {
    fn from(e: FieldError) -> Self {
        Self::Domain(e.to_string())
    }
}
