//! Value Objects module
//!
//! Immutable, validated domain primitives.

pub mod field_type;
pub mod field_kind;
pub mod field_value;
pub mod field;

pub use field_type::{FieldType, FieldCategory, FieldTypeInfo};
pub use field_kind::{FieldKind, FieldSetting, FileSettings, RangeSettings};
pub use field_value::{FieldValue, AddressValue, AddressPart, CreditCardValue, CardPart, FileHandle};
pub use field::{FieldDefinition, FieldPatch, FieldWidth, FieldError};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

entity_id!(
    /// Identifier of a stored form definition
    FormId
);

entity_id!(
    /// Identifier of a field, unique within its form only
    FieldId
);

entity_id!(
    /// Identifier of a captured response
    ResponseId
);

/// Reference to the organizational unit a form is associated with
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct OrgUnitRef {
    pub id: String,
    pub name: Option<String>,
}

impl OrgUnitRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), name: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
