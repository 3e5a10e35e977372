//! Form templates
//!
//! Predefined field sets used to bulk-initialize a form.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{FieldDefinition, FieldKind, FieldType};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateField {
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl TemplateField {
    fn new(label: &str, field_type: FieldType) -> Self {
        Self { label: label.into(), field_type, required: false, options: None }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn options(mut self, options: &[&str]) -> Self {
        self.options = Some(options.iter().map(|o| o.to_string()).collect());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub fields: Vec<TemplateField>,
}

impl Template {
    /// Build concrete fields: type defaults, a name derived from the label,
    /// an "Enter ..." placeholder, and the template's required flag.
    pub fn instantiate(&self) -> Vec<FieldDefinition> {
        self.fields
            .iter()
            .map(|entry| {
                let kind = match (entry.field_type, &entry.options) {
                    (FieldType::Select, Some(options)) => FieldKind::Select { options: options.clone() },
                    (FieldType::Radio, Some(options)) => FieldKind::Radio { options: options.clone() },
                    (field_type, _) => FieldKind::defaults_for(field_type),
                };
                let mut field = FieldDefinition::new(derive_name(&entry.label), entry.label.clone(), kind);
                field.placeholder = format!("Enter {}", entry.label.to_lowercase());
                field.required = entry.required;
                field
            })
            .collect()
    }
}

/// Lower-case the text and join whitespace-separated words with `_`
pub fn derive_name(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

/// Lookup table of available templates
#[derive(Clone, Debug)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateCatalog {
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    pub fn builtin() -> Self {
        use FieldType as T;

        let feedback = Template {
            id: "feedback-survey".into(),
            title: "Customer Feedback Survey".into(),
            description: "Collect feedback about your product or service".into(),
            category: "feedback".into(),
            fields: vec![
                TemplateField::new("Full Name", T::Text).required(),
                TemplateField::new("Email Address", T::Email).required(),
                TemplateField::new("Overall Rating", T::Rating).required(),
                TemplateField::new("Would You Recommend Us", T::Radio)
                    .options(&["Definitely", "Maybe", "Not at all"]),
                TemplateField::new("Comments", T::Textarea),
            ],
        };

        let contact = Template {
            id: "contact-form".into(),
            title: "Contact Form".into(),
            description: "Let visitors get in touch".into(),
            category: "general".into(),
            fields: vec![
                TemplateField::new("Name", T::Text).required(),
                TemplateField::new("Email", T::Email).required(),
                TemplateField::new("Phone", T::Tel),
                TemplateField::new("Subject", T::Select)
                    .options(&["General Inquiry", "Support", "Sales"]),
                TemplateField::new("Message", T::Textarea).required(),
            ],
        };

        let registration = Template {
            id: "event-registration".into(),
            title: "Event Registration".into(),
            description: "Register attendees for an event".into(),
            category: "events".into(),
            fields: vec![
                TemplateField::new("Full Name", T::Text).required(),
                TemplateField::new("Email", T::Email).required(),
                TemplateField::new("Organization", T::Text),
                TemplateField::new("Session", T::Select)
                    .options(&["Morning", "Afternoon", "Evening"])
                    .required(),
                TemplateField::new("Dietary Requirements", T::Textarea),
                TemplateField::new("Subscribe To Updates", T::Checkbox),
            ],
        };

        let application = Template {
            id: "job-application".into(),
            title: "Job Application".into(),
            description: "Accept applications for an open position".into(),
            category: "hr".into(),
            fields: vec![
                TemplateField::new("Full Name", T::Text).required(),
                TemplateField::new("Email", T::Email).required(),
                TemplateField::new("Phone", T::Tel).required(),
                TemplateField::new("Portfolio Url", T::Url),
                TemplateField::new("Available From", T::Date),
                TemplateField::new("Resume", T::File).required(),
                TemplateField::new("Cover Letter", T::Textarea),
            ],
        };

        Self::new(vec![feedback, contact, registration, application])
    }

    pub fn list(&self) -> &[Template] {
        &self.templates
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_name() {
        assert_eq!(derive_name("Full Name"), "full_name");
        assert_eq!(derive_name("  Email   Address "), "email_address");
        assert_eq!(derive_name("field_3"), "field_3");
    }

    #[test]
    fn test_feedback_survey_instantiation() {
        let catalog = TemplateCatalog::builtin();
        let template = catalog.get("feedback-survey").unwrap();
        let fields = template.instantiate();

        assert_eq!(fields.len(), 5);
        assert_eq!(fields[0].name, "full_name");
        assert_eq!(fields[0].placeholder, "Enter full name");
        assert!(fields[0].required);
        assert!(!fields[4].required);
        assert_eq!(
            fields[3].options().unwrap(),
            ["Definitely", "Maybe", "Not at all"]
        );
    }

    #[test]
    fn test_instantiation_gives_fresh_ids() {
        let catalog = TemplateCatalog::builtin();
        let template = catalog.get("contact-form").unwrap();
        let a = template.instantiate();
        let b = template.instantiate();
        assert_ne!(a[0].id, b[0].id);
    }

    #[test]
    fn test_unknown_template() {
        assert!(TemplateCatalog::builtin().get("tax-return").is_none());
    }
}
