//! Field values
//!
//! Type-shaped answers held in a fill session and captured in responses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single field's answer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum FieldValue {
    /// Text-like inputs, choices, dates, and colors
    Text(String),
    /// Number input; `None` while empty
    Number(Option<f64>),
    /// Checkbox and toggle
    Bool(bool),
    /// Range and rating
    Integer(i64),
    Address(AddressValue),
    CreditCard(CreditCardValue),
    /// Attached files; at most one unless the field allows multiple
    Files(Vec<FileHandle>),
}

impl FieldValue {
    /// Empty per the required rule: empty string, unset number, or no items.
    ///
    /// Booleans, integers, and composite records are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Number(n) => n.is_none(),
            FieldValue::Files(files) => files.is_empty(),
            FieldValue::Bool(_)
            | FieldValue::Integer(_)
            | FieldValue::Address(_)
            | FieldValue::CreditCard(_) => false,
        }
    }

    /// Single-cell rendering used by tabular export
    pub fn to_cell(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(Some(n)) => n.to_string(),
            FieldValue::Number(None) => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Address(a) => a.to_string(),
            FieldValue::CreditCard(c) => c.masked_number(),
            FieldValue::Files(files) => files
                .iter()
                .map(|f| f.file_name.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Number(_) => "number",
            FieldValue::Bool(_) => "bool",
            FieldValue::Integer(_) => "integer",
            FieldValue::Address(_) => "address",
            FieldValue::CreditCard(_) => "creditCard",
            FieldValue::Files(_) => "files",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AddressPart {
    Street,
    City,
    State,
    Zip,
    Country,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl AddressValue {
    /// Set one sub-property, keeping every sibling
    pub fn merge(&mut self, part: AddressPart, value: impl Into<String>) {
        let slot = match part {
            AddressPart::Street => &mut self.street,
            AddressPart::City => &mut self.city,
            AddressPart::State => &mut self.state,
            AddressPart::Zip => &mut self.zip,
            AddressPart::Country => &mut self.country,
        };
        *slot = Some(value.into());
    }

    pub fn get(&self, part: AddressPart) -> Option<&str> {
        match part {
            AddressPart::Street => self.street.as_deref(),
            AddressPart::City => self.city.as_deref(),
            AddressPart::State => self.state.as_deref(),
            AddressPart::Zip => self.zip.as_deref(),
            AddressPart::Country => self.country.as_deref(),
        }
    }

    /// Every sub-property present and non-empty
    pub fn is_complete(&self) -> bool {
        [AddressPart::Street, AddressPart::City, AddressPart::State, AddressPart::Zip, AddressPart::Country]
            .into_iter()
            .all(|p| self.get(p).map(|s| !s.is_empty()).unwrap_or(false))
    }
}

impl fmt::Display for AddressValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [&self.street, &self.city, &self.state, &self.zip, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.is_empty())
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardPart {
    Number,
    Name,
    Expiry,
    Cvv,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCardValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvv: Option<String>,
}

impl CreditCardValue {
    /// Set one sub-property, keeping every sibling
    pub fn merge(&mut self, part: CardPart, value: impl Into<String>) {
        let slot = match part {
            CardPart::Number => &mut self.number,
            CardPart::Name => &mut self.name,
            CardPart::Expiry => &mut self.expiry,
            CardPart::Cvv => &mut self.cvv,
        };
        *slot = Some(value.into());
    }

    pub fn get(&self, part: CardPart) -> Option<&str> {
        match part {
            CardPart::Number => self.number.as_deref(),
            CardPart::Name => self.name.as_deref(),
            CardPart::Expiry => self.expiry.as_deref(),
            CardPart::Cvv => self.cvv.as_deref(),
        }
    }

    pub fn is_complete(&self) -> bool {
        [CardPart::Number, CardPart::Name, CardPart::Expiry, CardPart::Cvv]
            .into_iter()
            .all(|p| self.get(p).map(|s| !s.is_empty()).unwrap_or(false))
    }

    /// Card number with all but the last four digits hidden
    pub fn masked_number(&self) -> String {
        let digits: Vec<char> = self
            .number
            .as_deref()
            .unwrap_or_default()
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        if digits.is_empty() {
            return String::new();
        }
        let visible = digits.len().saturating_sub(4);
        digits
            .iter()
            .enumerate()
            .map(|(i, c)| if i < visible { '*' } else { *c })
            .collect()
    }
}

// Keep card data out of logs
impl fmt::Debug for CreditCardValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreditCardValue")
            .field("number", &self.masked_number())
            .field("name", &self.name)
            .field("expiry", &self.expiry)
            .field("cvv", &self.cvv.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Reference to a locally selected file
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandle {
    pub id: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl FileHandle {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            size_bytes,
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Media files get a local preview while attached
    pub fn is_previewable(&self) -> bool {
        ["image/", "video/", "audio/"]
            .iter()
            .any(|prefix| self.content_type.starts_with(prefix))
    }
}
