//! Field Type Registry
//!
//! Static catalog of supported field types, their picker category, and the
//! factory producing their default properties.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::field_kind::FieldKind;

/// Supported field types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    Text,
    Email,
    Number,
    Tel,
    Url,
    Password,
    Date,
    Time,
    Datetime,
    Select,
    Radio,
    Checkbox,
    Toggle,
    Textarea,
    File,
    Rating,
    Address,
    CreditCard,
    Color,
    Range,
}

/// Picker grouping; has no effect on behavior
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldCategory {
    Basic,
    Date,
    Choice,
    Text,
    Media,
    Rating,
    Advanced,
    Input,
}

/// Registry entry for one field type
#[derive(Clone, Copy, Debug)]
pub struct FieldTypeInfo {
    pub field_type: FieldType,
    pub category: FieldCategory,
    pub label: &'static str,
    pub defaults: fn(FieldType) -> FieldKind,
}

impl FieldTypeInfo {
    /// Build the type-specific default properties for a new field
    pub fn default_kind(&self) -> FieldKind {
        (self.defaults)(self.field_type)
    }
}

impl FieldType {
    pub const ALL: [FieldType; 20] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Number,
        FieldType::Tel,
        FieldType::Url,
        FieldType::Password,
        FieldType::Date,
        FieldType::Time,
        FieldType::Datetime,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::Toggle,
        FieldType::Textarea,
        FieldType::File,
        FieldType::Rating,
        FieldType::Address,
        FieldType::CreditCard,
        FieldType::Color,
        FieldType::Range,
    ];

    pub fn describe(self) -> FieldTypeInfo {
        use FieldCategory as C;
        use FieldType as T;

        let (category, label) = match self {
            T::Text => (C::Basic, "Text"),
            T::Email => (C::Basic, "Email"),
            T::Number => (C::Basic, "Number"),
            T::Tel => (C::Basic, "Phone"),
            T::Url => (C::Basic, "URL"),
            T::Password => (C::Basic, "Password"),
            T::Date => (C::Date, "Date"),
            T::Time => (C::Date, "Time"),
            T::Datetime => (C::Date, "Date & Time"),
            T::Select => (C::Choice, "Dropdown"),
            T::Radio => (C::Choice, "Radio Group"),
            T::Checkbox => (C::Choice, "Checkbox"),
            T::Toggle => (C::Choice, "Toggle"),
            T::Textarea => (C::Text, "Text Area"),
            T::File => (C::Media, "File Upload"),
            T::Rating => (C::Rating, "Rating"),
            T::Address => (C::Advanced, "Address"),
            T::CreditCard => (C::Advanced, "Credit Card"),
            T::Color => (C::Advanced, "Color Picker"),
            T::Range => (C::Input, "Range Slider"),
        };

        FieldTypeInfo {
            field_type: self,
            category,
            label,
            defaults: FieldKind::defaults_for,
        }
    }

    pub fn category(self) -> FieldCategory {
        self.describe().category
    }

    pub fn label(self) -> &'static str {
        self.describe().label
    }

    /// Wire name, as used in stored definitions
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Tel => "tel",
            FieldType::Url => "url",
            FieldType::Password => "password",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Datetime => "datetime",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Toggle => "toggle",
            FieldType::Textarea => "textarea",
            FieldType::File => "file",
            FieldType::Rating => "rating",
            FieldType::Address => "address",
            FieldType::CreditCard => "creditCard",
            FieldType::Color => "color",
            FieldType::Range => "range",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field type: {0}")]
pub struct UnknownFieldType(pub String);

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownFieldType(s.to_string()))
    }
}

impl FieldCategory {
    pub const ALL: [FieldCategory; 8] = [
        FieldCategory::Basic,
        FieldCategory::Date,
        FieldCategory::Choice,
        FieldCategory::Text,
        FieldCategory::Media,
        FieldCategory::Rating,
        FieldCategory::Advanced,
        FieldCategory::Input,
    ];

    /// Field types in this category, in registry order
    pub fn types(self) -> Vec<FieldType> {
        FieldType::ALL
            .into_iter()
            .filter(|t| t.category() == self)
            .collect()
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldCategory::Basic => "Basic",
            FieldCategory::Date => "Date & Time",
            FieldCategory::Choice => "Choice",
            FieldCategory::Text => "Text",
            FieldCategory::Media => "Media",
            FieldCategory::Rating => "Rating",
            FieldCategory::Advanced => "Advanced",
            FieldCategory::Input => "Input",
        }
    }
}
