//! Field Validator
//!
//! Save-time checks on a definition and submit-time checks on filled values.
//! Both stop at the first failure, in field declaration order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::aggregates::FormDefinition;
use crate::domain::value_objects::{FieldDefinition, FieldKind, FieldValue};
use super::renderer::FormValues;

/// Optional strictness beyond the default rules
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Require every address / credit card sub-property on required fields
    pub strict_composites: bool,
    /// Reject forms where two fields share a `name`
    pub unique_field_names: bool,
}

/// A single blocking validation message
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Label of the offending field, when one is to blame
    pub field: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn form(message: impl Into<String>) -> Self {
        Self { field: None, message: message.into() }
    }

    pub fn field(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: Some(label.into()), message: message.into() }
    }

    fn required(field: &FieldDefinition) -> Self {
        Self::field(field.label.clone(), format!("{} is required", field.label))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FieldValidator {
    options: ValidationOptions,
}

impl FieldValidator {
    pub fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ValidationOptions {
        self.options
    }

    /// Fails iff the field is required and the value is missing or empty.
    ///
    /// Composite values only need to exist unless `strict_composites` is set.
    pub fn required_check(&self, field: &FieldDefinition, value: Option<&FieldValue>) -> Result<(), ValidationError> {
        if !field.required {
            return Ok(());
        }
        let value = match value {
            Some(v) => v,
            None => return Err(ValidationError::required(field)),
        };
        if value.is_empty() {
            return Err(ValidationError::required(field));
        }
        if self.options.strict_composites {
            let complete = match value {
                FieldValue::Address(a) => a.is_complete(),
                FieldValue::CreditCard(c) => c.is_complete(),
                _ => true,
            };
            if !complete {
                return Err(ValidationError::field(
                    field.label.clone(),
                    format!("{} is incomplete", field.label),
                ));
            }
        }
        Ok(())
    }

    /// Value, if present, has the shape the field type produces
    pub fn shape_check(&self, field: &FieldDefinition, value: Option<&FieldValue>) -> Result<(), ValidationError> {
        let value = match value {
            Some(v) => v,
            None => return Ok(()),
        };
        let matches = match (field.kind(), value) {
            (FieldKind::Number, FieldValue::Number(_)) => true,
            (FieldKind::Checkbox { .. } | FieldKind::Toggle { .. }, FieldValue::Bool(_)) => true,
            (FieldKind::Range(_) | FieldKind::Rating { .. }, FieldValue::Integer(_)) => true,
            (FieldKind::Address, FieldValue::Address(_)) => true,
            (FieldKind::CreditCard, FieldValue::CreditCard(_)) => true,
            (FieldKind::File(_), FieldValue::Files(_)) => true,
            (
                FieldKind::Text
                | FieldKind::Email
                | FieldKind::Tel
                | FieldKind::Url
                | FieldKind::Password
                | FieldKind::Textarea
                | FieldKind::Date { .. }
                | FieldKind::Time { .. }
                | FieldKind::Datetime { .. }
                | FieldKind::Select { .. }
                | FieldKind::Radio { .. }
                | FieldKind::Color { .. },
                FieldValue::Text(_),
            ) => true,
            _ => false,
        };
        if matches {
            Ok(())
        } else {
            Err(ValidationError::field(
                field.label.clone(),
                format!("{} has an invalid {} value", field.label, value.kind_name()),
            ))
        }
    }

    /// Submit-time check. Reports only the first failing field.
    pub fn validate_submission(&self, form: &FormDefinition, values: &FormValues) -> Result<(), ValidationError> {
        for field in form.fields() {
            let value = values.get(&field.name);
            self.required_check(field, value)?;
            self.shape_check(field, value)?;
        }
        Ok(())
    }

    /// Save-time check on the definition itself
    pub fn validate_for_save(&self, form: &FormDefinition) -> Result<(), ValidationError> {
        if form.title().trim().is_empty() {
            return Err(ValidationError::form("Form title is required"));
        }
        if form.org_unit().is_none() {
            return Err(ValidationError::form("Select an organizational unit for this form"));
        }
        if form.fields().is_empty() {
            return Err(ValidationError::form("Add at least one field to the form"));
        }

        let mut seen = HashSet::new();
        for field in form.fields() {
            if field.name.trim().is_empty() {
                return Err(ValidationError::field(
                    field.label.clone(),
                    format!("{} needs a name", field.label),
                ));
            }
            if let Some(options) = field.options() {
                if options.is_empty() {
                    return Err(ValidationError::field(
                        field.label.clone(),
                        format!("{} needs at least one option", field.label),
                    ));
                }
            }
            if self.options.unique_field_names && !seen.insert(field.name.as_str()) {
                return Err(ValidationError::field(
                    field.label.clone(),
                    format!("Field name `{}` is already used by another field", field.name),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{
        AddressPart, AddressValue, FieldSetting, FieldPatch, FieldType, FileHandle, OrgUnitRef,
    };

    fn field(name: &str, field_type: FieldType, required: bool) -> FieldDefinition {
        let mut f = FieldDefinition::new(name, name.to_uppercase(), FieldKind::defaults_for(field_type));
        f.required = required;
        f
    }

    fn saveable_form() -> FormDefinition {
        let mut form = FormDefinition::create("Survey");
        form.associate(OrgUnitRef::new("hr"));
        form.add_field(field("a", FieldType::Text, true));
        form
    }

    #[test]
    fn test_required_rule() {
        let v = FieldValidator::default();
        let f = field("a", FieldType::Text, true);

        assert!(v.required_check(&f, None).is_err());
        assert!(v.required_check(&f, Some(&FieldValue::Text(String::new()))).is_err());
        assert!(v.required_check(&f, Some(&FieldValue::Text("x".into()))).is_ok());

        let optional = field("b", FieldType::Text, false);
        assert!(v.required_check(&optional, None).is_ok());
    }

    #[test]
    fn test_required_file_needs_one_attachment() {
        let v = FieldValidator::default();
        let f = field("cv", FieldType::File, true);
        assert!(v.required_check(&f, Some(&FieldValue::Files(vec![]))).is_err());
        let one = FieldValue::Files(vec![FileHandle::new("cv.pdf", "application/pdf", 10)]);
        assert!(v.required_check(&f, Some(&one)).is_ok());
    }

    #[test]
    fn test_composites_checked_top_level_only_by_default() {
        let f = field("home", FieldType::Address, true);
        let empty = FieldValue::Address(AddressValue::default());

        assert!(FieldValidator::default().required_check(&f, Some(&empty)).is_ok());

        let strict = FieldValidator::new(ValidationOptions { strict_composites: true, ..Default::default() });
        assert!(strict.required_check(&f, Some(&empty)).is_err());

        let mut partial = AddressValue::default();
        partial.merge(AddressPart::Street, "Main St");
        assert!(strict.required_check(&f, Some(&FieldValue::Address(partial))).is_err());
    }

    #[test]
    fn test_fail_fast_reports_first_declared_field() {
        let mut form = FormDefinition::create("Survey");
        form.add_field(field("first", FieldType::Text, true));
        form.add_field(field("second", FieldType::Email, true));

        let err = FieldValidator::default()
            .validate_submission(&form, &FormValues::default())
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("FIRST"));
        assert_eq!(err.message, "FIRST is required");

        let id = form.fields()[1].id.clone();
        form.move_field(1, 0).unwrap();
        let err = FieldValidator::default()
            .validate_submission(&form, &FormValues::default())
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("SECOND"));
        assert_eq!(form.fields()[0].id, id);
    }

    #[test]
    fn test_shape_mismatch() {
        let f = field("n", FieldType::Number, false);
        let err = FieldValidator::default()
            .shape_check(&f, Some(&FieldValue::Bool(true)))
            .unwrap_err();
        assert!(err.message.contains("invalid bool"));
    }

    #[test]
    fn test_save_rules() {
        let v = FieldValidator::default();
        assert!(v.validate_for_save(&saveable_form()).is_ok());

        let mut untitled = saveable_form();
        untitled.set_title("  ");
        assert_eq!(v.validate_for_save(&untitled).unwrap_err().message, "Form title is required");

        let mut unassociated = FormDefinition::create("Survey");
        unassociated.add_field(field("a", FieldType::Text, false));
        assert!(v.validate_for_save(&unassociated).is_err());

        let mut empty = FormDefinition::create("Survey");
        empty.associate(OrgUnitRef::new("hr"));
        assert!(v.validate_for_save(&empty).is_err());
    }

    #[test]
    fn test_empty_choice_options_block_save() {
        let mut form = saveable_form();
        form.add_field(field("pick", FieldType::Select, false));
        let id = form.fields()[1].id.clone();
        form.update_field(&id, FieldPatch::new().set(FieldSetting::Options(vec![]))).unwrap();

        let err = FieldValidator::default().validate_for_save(&form).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("PICK"));
    }

    #[test]
    fn test_duplicate_names_only_checked_when_enabled() {
        let mut form = saveable_form();
        form.add_field(field("a", FieldType::Email, false));

        assert!(FieldValidator::default().validate_for_save(&form).is_ok());

        let strict = FieldValidator::new(ValidationOptions { unique_field_names: true, ..Default::default() });
        let err = strict.validate_for_save(&form).unwrap_err();
        assert!(err.message.contains("`a`"));
    }
}
