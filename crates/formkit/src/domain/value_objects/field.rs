//! Field definition
//!
//! One configured question within a form: identity, common presentation
//! attributes, and the type-specific [`FieldKind`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::field_kind::{FieldKind, FieldSetting};
use super::field_type::FieldType;
use super::FieldId;

/// Layout hint only
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldWidth {
    #[default]
    Full,
    Half,
    Third,
}

impl std::str::FromStr for FieldWidth {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(FieldWidth::Full),
            "half" => Ok(FieldWidth::Half),
            "third" => Ok(FieldWidth::Third),
            other => Err(FieldError::OutOfRange { property: "width", value: other.to_string() }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: FieldId,
    /// Key under which the value is stored and submitted
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub help_text: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub width: FieldWidth,
    #[serde(flatten)]
    kind: FieldKind,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: FieldId::new(),
            name: name.into(),
            label: label.into(),
            placeholder: String::new(),
            help_text: String::new(),
            required: false,
            width: FieldWidth::Full,
            kind,
        }
    }

    /// Type is fixed at creation; only its properties can change
    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn options(&self) -> Option<&[String]> {
        self.kind.options()
    }

    /// Merge a patch into this field. Nothing is changed if any part fails.
    pub fn apply_patch(&mut self, patch: FieldPatch) -> Result<(), FieldError> {
        let mut kind = self.kind.clone();
        for setting in patch.settings {
            kind.apply(setting)?;
        }
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(FieldError::OutOfRange { property: "name", value: name.clone() });
            }
        }

        self.kind = kind;
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(placeholder) = patch.placeholder {
            self.placeholder = placeholder;
        }
        if let Some(help_text) = patch.help_text {
            self.help_text = help_text;
        }
        if let Some(required) = patch.required {
            self.required = required;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        Ok(())
    }
}

/// Partial update of a field; unset members are left as they are
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldPatch {
    pub name: Option<String>,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
    pub required: Option<bool>,
    pub width: Option<FieldWidth>,
    pub settings: Vec<FieldSetting>,
}

impl FieldPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn width(mut self, width: FieldWidth) -> Self {
        self.width = Some(width);
        self
    }

    pub fn set(mut self, setting: FieldSetting) -> Self {
        self.settings.push(setting);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build a patch from a JSON object of camelCase keys
    pub fn from_json(object: &Map<String, Value>) -> Result<Self, FieldError> {
        let mut patch = FieldPatch::new();
        for (key, value) in object {
            let text = || {
                value.as_str().map(str::to_string).ok_or_else(|| FieldError::TypeMismatch {
                    property: key.clone(),
                    expected: "string",
                })
            };
            match key.as_str() {
                "name" => patch.name = Some(text()?),
                "label" => patch.label = Some(text()?),
                "placeholder" => patch.placeholder = Some(text()?),
                "helpText" => patch.help_text = Some(text()?),
                "required" => {
                    patch.required = Some(value.as_bool().ok_or_else(|| FieldError::TypeMismatch {
                        property: key.clone(),
                        expected: "boolean",
                    })?)
                }
                "width" => patch.width = Some(text()?.parse()?),
                "id" | "type" => {
                    return Err(FieldError::Immutable { property: key.clone() });
                }
                other => match FieldSetting::from_json(other, value)? {
                    Some(setting) => patch.settings.push(setting),
                    None => return Err(FieldError::UnknownProperty { property: other.to_string() }),
                },
            }
        }
        Ok(patch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("property `{property}` is not valid for {field_type} fields")]
    IllegalProperty { property: &'static str, field_type: FieldType },

    #[error("unknown field property `{property}`")]
    UnknownProperty { property: String },

    #[error("property `{property}` cannot be changed")]
    Immutable { property: String },

    #[error("property `{property}` expects {expected}")]
    TypeMismatch { property: String, expected: &'static str },

    #[error("invalid value for `{property}`: {value}")]
    OutOfRange { property: &'static str, value: String },

    #[error("`{value}` is not one of the options of `{field}`")]
    UnknownOption { field: String, value: String },

    #[error("file `{file_name}` rejected: {reason}")]
    FileRejected { file_name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn range_field() -> FieldDefinition {
        FieldDefinition::new("field_1", "Volume", FieldKind::defaults_for(FieldType::Range))
    }

    #[test]
    fn test_patch_merges_only_given_keys() {
        let mut field = range_field();
        field.placeholder = "slide".into();
        field
            .apply_patch(FieldPatch::new().label("Loudness").set(FieldSetting::Max(20)))
            .unwrap();

        assert_eq!(field.label, "Loudness");
        assert_eq!(field.placeholder, "slide");
        assert_eq!(field.name, "field_1");
    }

    #[test]
    fn test_failed_patch_changes_nothing() {
        let mut field = range_field();
        let before = field.clone();
        let patch = FieldPatch::new()
            .label("Changed")
            .set(FieldSetting::Max(20))
            .set(FieldSetting::Checked(true));

        assert!(field.apply_patch(patch).is_err());
        assert_eq!(field, before);
    }

    #[test]
    fn test_patch_from_json() {
        let object = json!({"label": "Age", "required": true, "max": 120, "width": "half"});
        let patch = FieldPatch::from_json(object.as_object().unwrap()).unwrap();
        assert_eq!(patch.label.as_deref(), Some("Age"));
        assert_eq!(patch.required, Some(true));
        assert_eq!(patch.width, Some(FieldWidth::Half));
        assert_eq!(patch.settings, vec![FieldSetting::Max(120)]);

        let object = json!({"type": "email"});
        assert!(matches!(
            FieldPatch::from_json(object.as_object().unwrap()),
            Err(FieldError::Immutable { .. })
        ));

        let object = json!({"colour": "#fff"});
        assert!(matches!(
            FieldPatch::from_json(object.as_object().unwrap()),
            Err(FieldError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn test_serde_round_trip_keeps_type_properties() {
        let mut field = FieldDefinition::new("q", "Pick one", FieldKind::defaults_for(FieldType::Radio));
        field.required = true;
        field.help_text = "only one".into();

        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "radio");
        assert_eq!(json["options"], json!(["Option 1", "Option 2", "Option 3"]));
        assert_eq!(json["helpText"], "only one");

        let back: FieldDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(back, field);
    }
}
