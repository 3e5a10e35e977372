//! Domain services
//!
//! Stateless logic shared by the builder and the filling flow.

pub mod templates;
pub mod validator;
pub mod renderer;

pub use templates::{Template, TemplateCatalog, TemplateField, derive_name};
pub use validator::{FieldValidator, ValidationError, ValidationOptions};
pub use renderer::{FieldInput, FieldRenderer, FormValues};
