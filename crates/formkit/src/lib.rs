//! FormKit
//!
//! Dynamic form definition, authoring, and filling engine, following
//! Domain-Driven Design (DDD) with a hexagonal layout.
//!
//! ## Architecture
//!
//! - **Domain Layer**: Field types and definitions, form and response aggregates, events
//! - **Application Layer**: Builder and fill sessions, use case orchestration, DTOs
//! - **Ports Layer**: Hexagonal architecture interfaces
//! - **Infrastructure Layer**: In-memory and JSON file stores, CSV export, local transport
//!
//! ## Key Aggregates
//!
//! - **FormDefinition**: Ordered field list plus form metadata and publication status
//! - **FormResponse**: Immutable snapshot of one submitted answer set
//!
//! ## Features
//!
//! - Closed field type registry with per-type defaults
//! - Typed property patches; a field never carries settings foreign to its type
//! - Template catalog with an overwrite confirmation hook
//! - Fail-fast required validation in declaration order
//! - Seeded fill sessions with preview handles released exactly once
//! - Domain events for integration

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// Re-exports for convenience
pub use application::{
    BuilderError, BuilderSession, FillSession, FormBuilder, FormService, ResponseService, TemplateOutcome,
};
pub use config::{ConfigError, FormsConfig};
pub use domain::aggregates::{FormDefinition, FormError, FormResponse, FormStatus};
pub use domain::events::{DomainEvent, FormEvent, ResponseEvent};
pub use domain::services::{
    FieldInput, FieldRenderer, FieldValidator, FormValues, Template, TemplateCatalog, ValidationError,
    ValidationOptions,
};
pub use domain::value_objects::{
    FieldCategory, FieldDefinition, FieldError, FieldId, FieldKind, FieldPatch, FieldSetting, FieldType,
    FieldValue, FileHandle, FormId, OrgUnitRef, ResponseId,
};
pub use ports::inbound::{FormUseCases, ResponseUseCases, UseCaseError};
pub use ports::outbound::{RepositoryError, TransportError};

/// Errors surfaced by the crate's entry points
#[derive(Debug, thiserror::Error)]
pub enum FormsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Builder(#[from] BuilderError),

    #[error(transparent)]
    UseCase(#[from] UseCaseError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type Result<T> = std::result::Result<T, FormsError>;
