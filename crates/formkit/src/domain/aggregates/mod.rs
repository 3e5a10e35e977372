//! Aggregates module

pub mod form;
pub mod response;

pub use form::{FormDefinition, FormError, FormStatus};
pub use response::FormResponse;
