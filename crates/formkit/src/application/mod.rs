//! Application layer
//!
//! Orchestrates use cases and coordinates domain objects.

pub mod builder;
pub mod commands;
pub mod dto;
pub mod fill;

pub use builder::{BuilderError, BuilderSession, DragGesture, FormBuilder, TemplateOutcome};
pub use commands::{FormService, ResponseService};
pub use dto::*;
pub use fill::{FillSession, PreviewHandle, UploadedFile};
