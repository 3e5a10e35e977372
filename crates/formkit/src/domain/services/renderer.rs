//! Field Renderer Contract
//!
//! How a field's value is seeded, read, and written. Presentation is left to
//! the caller; this module only guarantees every value has its type's shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::aggregates::FormDefinition;
use crate::domain::value_objects::field_kind::is_hex_color;
use crate::domain::value_objects::{
    AddressPart, AddressValue, CardPart, CreditCardValue, FieldDefinition, FieldError, FieldKind, FieldValue,
    FileHandle,
};

/// Values of one fill session, keyed by field name
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, FieldValue>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.0.insert(name.into(), value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every attached file across all fields
    pub fn attachments(&self) -> Vec<FileHandle> {
        self.0
            .values()
            .filter_map(|v| match v {
                FieldValue::Files(files) => Some(files.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn into_inner(self) -> BTreeMap<String, FieldValue> {
        self.0
    }
}

/// One user interaction with a field
#[derive(Clone, Debug, PartialEq)]
pub enum FieldInput {
    Text(String),
    Number(Option<f64>),
    Checked(bool),
    /// Pick one of a select/radio field's options
    Choose(String),
    /// Raw slider position
    Slide(i64),
    /// Discrete rating selection
    Rate(i64),
    Address(AddressPart, String),
    Card(CardPart, String),
    Attach(Vec<FileHandle>),
    /// Remove one attached file by handle id
    Detach(String),
    /// Back to the seeded empty value
    Clear,
}

impl FieldInput {
    /// Decode a JSON answer for `field` into the inputs that produce it.
    ///
    /// Composite objects become one input per sub-property; file fields are
    /// not handled here since handles come from the local file picker.
    pub fn from_json(field: &FieldDefinition, value: &Value) -> Result<Vec<FieldInput>, FieldError> {
        let mismatch = |expected: &'static str| FieldError::TypeMismatch {
            property: field.name.clone(),
            expected,
        };
        if value.is_null() {
            return Ok(vec![FieldInput::Clear]);
        }

        let input = match field.kind() {
            FieldKind::Number => match value {
                Value::Number(n) => FieldInput::Number(n.as_f64()),
                Value::String(s) => FieldInput::Text(s.clone()),
                _ => return Err(mismatch("number")),
            },
            FieldKind::Checkbox { .. } | FieldKind::Toggle { .. } => {
                FieldInput::Checked(value.as_bool().ok_or_else(|| mismatch("boolean"))?)
            }
            FieldKind::Select { .. } | FieldKind::Radio { .. } => {
                FieldInput::Choose(value.as_str().ok_or_else(|| mismatch("string"))?.to_string())
            }
            FieldKind::Range(_) => FieldInput::Slide(value.as_i64().ok_or_else(|| mismatch("integer"))?),
            FieldKind::Rating { .. } => FieldInput::Rate(value.as_i64().ok_or_else(|| mismatch("integer"))?),
            FieldKind::Address => {
                let address: AddressValue =
                    serde_json::from_value(value.clone()).map_err(|_| mismatch("address object"))?;
                return Ok([
                    AddressPart::Street,
                    AddressPart::City,
                    AddressPart::State,
                    AddressPart::Zip,
                    AddressPart::Country,
                ]
                .into_iter()
                .filter_map(|p| address.get(p).map(|v| FieldInput::Address(p, v.to_string())))
                .collect());
            }
            FieldKind::CreditCard => {
                let card: CreditCardValue =
                    serde_json::from_value(value.clone()).map_err(|_| mismatch("credit card object"))?;
                return Ok([CardPart::Number, CardPart::Name, CardPart::Expiry, CardPart::Cvv]
                    .into_iter()
                    .filter_map(|p| card.get(p).map(|v| FieldInput::Card(p, v.to_string())))
                    .collect());
            }
            FieldKind::File(_) => return Err(mismatch("attached files")),
            FieldKind::Text
            | FieldKind::Email
            | FieldKind::Tel
            | FieldKind::Url
            | FieldKind::Password
            | FieldKind::Textarea
            | FieldKind::Date { .. }
            | FieldKind::Time { .. }
            | FieldKind::Datetime { .. }
            | FieldKind::Color { .. } => FieldInput::Text(value.as_str().ok_or_else(|| mismatch("string"))?.to_string()),
        };
        Ok(vec![input])
    }
}

/// Seed, read, and write values for fields of any type
pub struct FieldRenderer;

impl FieldRenderer {
    /// Type-correct initial value for a field
    pub fn empty_value(field: &FieldDefinition) -> FieldValue {
        match field.kind() {
            FieldKind::Text
            | FieldKind::Email
            | FieldKind::Tel
            | FieldKind::Url
            | FieldKind::Password
            | FieldKind::Textarea
            | FieldKind::Select { .. }
            | FieldKind::Radio { .. } => FieldValue::Text(String::new()),
            FieldKind::Number => FieldValue::Number(None),
            FieldKind::Date { default_date: d, .. }
            | FieldKind::Time { default_time: d, .. }
            | FieldKind::Datetime { default_datetime: d, .. } => FieldValue::Text(d.clone().unwrap_or_default()),
            FieldKind::Checkbox { checked } | FieldKind::Toggle { checked } => FieldValue::Bool(*checked),
            FieldKind::Range(range) => FieldValue::Integer(range.default_value),
            FieldKind::Rating { max_rating, default_rating } => {
                FieldValue::Integer(i64::from((*default_rating).min(*max_rating)))
            }
            FieldKind::File(_) => FieldValue::Files(vec![]),
            FieldKind::Address => FieldValue::Address(AddressValue::default()),
            FieldKind::CreditCard => FieldValue::CreditCard(CreditCardValue::default()),
            FieldKind::Color { default_color } => FieldValue::Text(default_color.clone()),
        }
    }

    /// Initialize every field so no input starts unset
    pub fn seed(form: &FormDefinition) -> FormValues {
        let mut values = FormValues::new();
        for field in form.fields() {
            values.insert(field.name.clone(), Self::empty_value(field));
        }
        values
    }

    pub fn read<'a>(field: &FieldDefinition, values: &'a FormValues) -> Option<&'a FieldValue> {
        values.get(&field.name)
    }

    /// Apply one input to the field's value.
    ///
    /// Returns the file handles the write detached, so the caller can release
    /// anything it holds for them.
    pub fn write(
        field: &FieldDefinition,
        values: &mut FormValues,
        input: FieldInput,
    ) -> Result<Vec<FileHandle>, FieldError> {
        let mismatch = |expected: &'static str| FieldError::TypeMismatch {
            property: field.name.clone(),
            expected,
        };

        if input == FieldInput::Clear {
            let previous = values.insert(field.name.clone(), Self::empty_value(field));
            return Ok(match previous {
                Some(FieldValue::Files(files)) => files,
                _ => vec![],
            });
        }

        let next = match (field.kind(), input) {
            (FieldKind::Number, FieldInput::Number(n)) => FieldValue::Number(n),
            (FieldKind::Number, FieldInput::Text(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    FieldValue::Number(None)
                } else {
                    FieldValue::Number(Some(trimmed.parse::<f64>().map_err(|_| mismatch("number"))?))
                }
            }
            (FieldKind::Checkbox { .. } | FieldKind::Toggle { .. }, FieldInput::Checked(b)) => FieldValue::Bool(b),
            (FieldKind::Select { options } | FieldKind::Radio { options }, FieldInput::Choose(s) | FieldInput::Text(s)) => {
                if !s.is_empty() && !options.contains(&s) {
                    return Err(FieldError::UnknownOption { field: field.name.clone(), value: s });
                }
                FieldValue::Text(s)
            }
            (FieldKind::Range(range), FieldInput::Slide(raw)) => FieldValue::Integer(range.snap(raw)),
            (FieldKind::Rating { max_rating, .. }, FieldInput::Rate(r)) => {
                if r < 0 || r > i64::from(*max_rating) {
                    return Err(FieldError::OutOfRange { property: "rating", value: r.to_string() });
                }
                FieldValue::Integer(r)
            }
            (FieldKind::Color { .. }, FieldInput::Text(s)) => {
                if !s.is_empty() && !is_hex_color(&s) {
                    return Err(FieldError::OutOfRange { property: "color", value: s });
                }
                FieldValue::Text(s)
            }
            (
                FieldKind::Text
                | FieldKind::Email
                | FieldKind::Tel
                | FieldKind::Url
                | FieldKind::Password
                | FieldKind::Textarea
                | FieldKind::Date { .. }
                | FieldKind::Time { .. }
                | FieldKind::Datetime { .. },
                FieldInput::Text(s),
            ) => FieldValue::Text(s),
            (FieldKind::Address, FieldInput::Address(part, s)) => {
                let mut address = match values.get(&field.name) {
                    Some(FieldValue::Address(a)) => a.clone(),
                    _ => AddressValue::default(),
                };
                address.merge(part, s);
                FieldValue::Address(address)
            }
            (FieldKind::CreditCard, FieldInput::Card(part, s)) => {
                let mut card = match values.get(&field.name) {
                    Some(FieldValue::CreditCard(c)) => c.clone(),
                    _ => CreditCardValue::default(),
                };
                card.merge(part, s);
                FieldValue::CreditCard(card)
            }
            (FieldKind::File(settings), FieldInput::Attach(incoming)) => {
                if !settings.multiple && incoming.len() > 1 {
                    return Err(FieldError::FileRejected {
                        file_name: incoming[1].file_name.clone(),
                        reason: "only one file may be attached".into(),
                    });
                }
                for file in &incoming {
                    if !settings.accepts(&file.file_name, &file.content_type) {
                        return Err(FieldError::FileRejected {
                            file_name: file.file_name.clone(),
                            reason: format!("type not accepted ({})", settings.accept),
                        });
                    }
                    if file.size_bytes > settings.max_size_bytes() {
                        return Err(FieldError::FileRejected {
                            file_name: file.file_name.clone(),
                            reason: format!("larger than {} MB", settings.max_size),
                        });
                    }
                }

                let current = match values.get(&field.name) {
                    Some(FieldValue::Files(files)) => files.clone(),
                    _ => vec![],
                };
                if settings.multiple {
                    let mut files = current;
                    files.extend(incoming);
                    values.insert(field.name.clone(), FieldValue::Files(files));
                    return Ok(vec![]);
                }
                values.insert(field.name.clone(), FieldValue::Files(incoming));
                return Ok(current);
            }
            (FieldKind::File(_), FieldInput::Detach(id)) => {
                let mut files = match values.get(&field.name) {
                    Some(FieldValue::Files(files)) => files.clone(),
                    _ => vec![],
                };
                let detached: Vec<FileHandle> = files.iter().filter(|f| f.id == id).cloned().collect();
                files.retain(|f| f.id != id);
                values.insert(field.name.clone(), FieldValue::Files(files));
                return Ok(detached);
            }
            (kind, _) => return Err(mismatch(expected_input(kind))),
        };

        values.insert(field.name.clone(), next);
        Ok(vec![])
    }
}

fn expected_input(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Number => "number",
        FieldKind::Checkbox { .. } | FieldKind::Toggle { .. } => "checked state",
        FieldKind::Select { .. } | FieldKind::Radio { .. } => "option",
        FieldKind::Range(_) => "slider position",
        FieldKind::Rating { .. } => "rating",
        FieldKind::Address => "address part",
        FieldKind::CreditCard => "card part",
        FieldKind::File(_) => "files",
        _ => "text",
    }
}
