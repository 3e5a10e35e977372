//! Form Aggregate
//!
//! Aggregate root owning the ordered field list. Field order is both display
//! order and submission/export column order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::events::{DomainEvent, FormEvent};
use crate::domain::value_objects::{FieldDefinition, FieldError, FieldId, FieldPatch, FormId, OrgUnitRef};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormStatus {
    #[default]
    Draft,
    Published,
}

/// Form definition aggregate root
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    id: FormId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    org_unit: Option<OrgUnitRef>,
    fields: Vec<FieldDefinition>,
    #[serde(default)]
    status: FormStatus,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    theme: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl FormDefinition {
    /// Start a new, empty draft
    pub fn create(title: impl Into<String>) -> Self {
        let now = Utc::now();
        let id = FormId::new();
        let title = title.into();

        let mut form = Self {
            id: id.clone(),
            title: title.clone(),
            description: String::new(),
            org_unit: None,
            fields: vec![],
            status: FormStatus::Draft,
            category: None,
            tags: vec![],
            theme: None,
            created_at: now,
            updated_at: now,
            events: vec![],
        };

        form.raise_event(DomainEvent::Form(FormEvent::Created {
            form_id: id,
            title,
            created_at: now,
        }));

        form
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn id(&self) -> &FormId { &self.id }
    pub fn title(&self) -> &str { &self.title }
    pub fn description(&self) -> &str { &self.description }
    pub fn org_unit(&self) -> Option<&OrgUnitRef> { self.org_unit.as_ref() }
    pub fn fields(&self) -> &[FieldDefinition] { &self.fields }
    pub fn status(&self) -> FormStatus { self.status }
    pub fn category(&self) -> Option<&str> { self.category.as_deref() }
    pub fn tags(&self) -> &[String] { &self.tags }
    pub fn theme(&self) -> Option<&str> { self.theme.as_deref() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
    pub fn is_published(&self) -> bool { self.status == FormStatus::Published }

    pub fn field(&self, id: &FieldId) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| &f.id == id)
    }

    pub fn position(&self, id: &FieldId) -> Option<usize> {
        self.fields.iter().position(|f| &f.id == id)
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.touch();
    }

    pub fn associate(&mut self, org_unit: OrgUnitRef) {
        self.org_unit = Some(org_unit);
        self.touch();
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category;
        self.touch();
    }

    pub fn set_theme(&mut self, theme: Option<String>) {
        self.theme = theme;
        self.touch();
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
            self.touch();
        }
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
        self.touch();
    }

    // =========================================================================
    // Field operations
    // =========================================================================

    /// Append a field at the end of the order
    pub fn add_field(&mut self, field: FieldDefinition) {
        self.raise_event(DomainEvent::Form(FormEvent::FieldAdded {
            form_id: self.id.clone(),
            field_id: field.id.clone(),
            field_type: field.field_type(),
        }));
        self.fields.push(field);
        self.touch();
    }

    /// Insert a field at `index`, shifting later fields back
    pub fn insert_field(&mut self, index: usize, field: FieldDefinition) -> Result<(), FormError> {
        if index > self.fields.len() {
            return Err(FormError::IndexOutOfBounds { index, len: self.fields.len() });
        }
        self.raise_event(DomainEvent::Form(FormEvent::FieldAdded {
            form_id: self.id.clone(),
            field_id: field.id.clone(),
            field_type: field.field_type(),
        }));
        self.fields.insert(index, field);
        self.touch();
        Ok(())
    }

    /// Merge a patch into the identified field
    pub fn update_field(&mut self, id: &FieldId, patch: FieldPatch) -> Result<&FieldDefinition, FormError> {
        let index = self
            .position(id)
            .ok_or_else(|| FormError::FieldNotFound(id.clone()))?;
        self.fields[index].apply_patch(patch)?;
        self.touch();
        Ok(&self.fields[index])
    }

    pub fn remove_field(&mut self, id: &FieldId) -> Result<FieldDefinition, FormError> {
        let index = self
            .position(id)
            .ok_or_else(|| FormError::FieldNotFound(id.clone()))?;
        let removed = self.fields.remove(index);
        self.touch();

        self.raise_event(DomainEvent::Form(FormEvent::FieldRemoved {
            form_id: self.id.clone(),
            field_id: removed.id.clone(),
        }));
        Ok(removed)
    }

    /// List move: take the field out at `from`, then insert it at `to` in the
    /// shortened list. Not a swap.
    pub fn move_field(&mut self, from: usize, to: usize) -> Result<(), FormError> {
        let len = self.fields.len();
        if from >= len {
            return Err(FormError::IndexOutOfBounds { index: from, len });
        }
        if to >= len {
            return Err(FormError::IndexOutOfBounds { index: to, len });
        }
        if from == to {
            return Ok(());
        }

        let field = self.fields.remove(from);
        let field_id = field.id.clone();
        self.fields.insert(to, field);
        self.touch();

        self.raise_event(DomainEvent::Form(FormEvent::FieldMoved {
            form_id: self.id.clone(),
            field_id,
            from,
            to,
        }));
        Ok(())
    }

    /// Replace the whole field list, returning the discarded fields
    pub fn replace_fields(
        &mut self,
        template_id: impl Into<String>,
        fields: Vec<FieldDefinition>,
    ) -> Vec<FieldDefinition> {
        let discarded = std::mem::replace(&mut self.fields, fields);
        self.touch();

        self.raise_event(DomainEvent::Form(FormEvent::TemplateApplied {
            form_id: self.id.clone(),
            template_id: template_id.into(),
            discarded_fields: discarded.len(),
        }));
        discarded
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    pub fn publish(&mut self) -> Result<(), FormError> {
        if self.fields.is_empty() {
            return Err(FormError::NoFields);
        }
        if self.status == FormStatus::Published {
            return Ok(());
        }

        let now = Utc::now();
        self.status = FormStatus::Published;
        self.updated_at = now;

        self.raise_event(DomainEvent::Form(FormEvent::Published {
            form_id: self.id.clone(),
            published_at: now,
        }));
        Ok(())
    }

    pub fn unpublish(&mut self) {
        self.status = FormStatus::Draft;
        self.touch();
    }

    /// Record that the current state was handed to storage
    pub fn mark_saved(&mut self) {
        self.raise_event(DomainEvent::Form(FormEvent::Saved {
            form_id: self.id.clone(),
            field_count: self.fields.len(),
        }));
    }

    // =========================================================================
    // Domain Events
    // =========================================================================

    /// Get and clear accumulated domain events
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn raise_event(&mut self, event: DomainEvent) {
        self.events.push(event);
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("field not found: {0}")]
    FieldNotFound(FieldId),

    #[error("index {index} out of bounds for {len} fields")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("form has no fields")]
    NoFields,

    #[error(transparent)]
    Field(#[from] FieldError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{FieldKind, FieldSetting, FieldType};
    use proptest::prelude::*;

    fn text_field(name: &str) -> FieldDefinition {
        FieldDefinition::new(name, name.to_uppercase(), FieldKind::Text)
    }

    fn form_with(names: &[&str]) -> FormDefinition {
        let mut form = FormDefinition::create("Survey");
        for name in names {
            form.add_field(text_field(name));
        }
        form.take_events();
        form
    }

    fn names(form: &FormDefinition) -> Vec<&str> {
        form.fields().iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_created_event() {
        let mut form = FormDefinition::create("Survey");
        let events = form.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], DomainEvent::Form(FormEvent::Created { .. })));
        assert_eq!(form.status(), FormStatus::Draft);
    }

    #[test]
    fn test_move_adjacent() {
        let mut form = form_with(&["a", "b", "c", "d"]);
        form.move_field(1, 2).unwrap();
        assert_eq!(names(&form), ["a", "c", "b", "d"]);
    }

    #[test]
    fn test_move_non_adjacent_differs_from_swap() {
        let mut form = form_with(&["a", "b", "c", "d", "e"]);
        form.move_field(0, 3).unwrap();
        // a swap would give d, b, c, a, e
        assert_eq!(names(&form), ["b", "c", "d", "a", "e"]);

        let mut form = form_with(&["a", "b", "c", "d", "e"]);
        form.move_field(4, 1).unwrap();
        assert_eq!(names(&form), ["a", "e", "b", "c", "d"]);
    }

    #[test]
    fn test_move_out_of_bounds() {
        let mut form = form_with(&["a", "b"]);
        assert_eq!(form.move_field(2, 0), Err(FormError::IndexOutOfBounds { index: 2, len: 2 }));
        assert_eq!(form.move_field(0, 2), Err(FormError::IndexOutOfBounds { index: 2, len: 2 }));
        assert_eq!(names(&form), ["a", "b"]);
    }

    #[test]
    fn test_update_unknown_field() {
        let mut form = form_with(&["a"]);
        let missing = FieldId::new();
        let err = form.update_field(&missing, FieldPatch::new().label("x")).unwrap_err();
        assert_eq!(err, FormError::FieldNotFound(missing));
    }

    #[test]
    fn test_update_rejects_foreign_property() {
        let mut form = form_with(&["a"]);
        let id = form.fields()[0].id.clone();
        let err = form
            .update_field(&id, FieldPatch::new().set(FieldSetting::MaxRating(3)))
            .unwrap_err();
        assert!(matches!(err, FormError::Field(FieldError::IllegalProperty { .. })));
    }

    #[test]
    fn test_publish_requires_fields() {
        let mut form = FormDefinition::create("Empty");
        assert_eq!(form.publish(), Err(FormError::NoFields));

        form.add_field(FieldDefinition::new("r", "R", FieldKind::defaults_for(FieldType::Rating)));
        form.publish().unwrap();
        assert!(form.is_published());
    }

    #[test]
    fn test_tags_and_theme() {
        let mut form = form_with(&["a"]);
        form.add_tag("hr");
        form.add_tag("onboarding");
        form.add_tag("hr");
        form.set_theme(Some("dark".into()));
        assert_eq!(form.tags(), ["hr", "onboarding"]);

        form.remove_tag("hr");
        assert_eq!(form.tags(), ["onboarding"]);

        let back: FormDefinition = serde_json::from_str(&serde_json::to_string(&form).unwrap()).unwrap();
        assert_eq!(back.tags(), ["onboarding"]);
        assert_eq!(back.theme(), Some("dark"));
    }

    #[test]
    fn test_serde_round_trip() {
        let mut form = form_with(&["a", "b"]);
        form.associate(OrgUnitRef::new("dept-7"));
        form.add_field(FieldDefinition::new("s", "S", FieldKind::defaults_for(FieldType::Select)));

        let json = serde_json::to_string(&form).unwrap();
        let back: FormDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back.fields(), form.fields());
        assert_eq!(back.org_unit(), form.org_unit());
        assert!(back.clone().take_events().is_empty());
    }

    proptest! {
        #[test]
        fn move_equals_remove_then_insert(len in 1usize..12, from_seed: usize, to_seed: usize) {
            let from = from_seed % len;
            let to = to_seed % len;
            let labels: Vec<String> = (0..len).map(|i| format!("f{}", i)).collect();
            let refs: Vec<&str> = labels.iter().map(String::as_str).collect();

            let mut form = form_with(&refs);
            form.move_field(from, to).unwrap();

            let mut expected = labels.clone();
            let moved = expected.remove(from);
            expected.insert(to, moved);

            prop_assert_eq!(names(&form), expected.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}
