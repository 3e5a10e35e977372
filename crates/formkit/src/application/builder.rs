//! Form Builder
//!
//! Authoring operations over one form, plus the ephemeral session state
//! (selected field, drag gesture) of the person editing it.

use tracing::{debug, info, warn};

use crate::domain::aggregates::{FormDefinition, FormError};
use crate::domain::services::{FieldValidator, Template, TemplateCatalog, ValidationError};
use crate::domain::value_objects::{FieldDefinition, FieldId, FieldPatch, FieldType};
use crate::ports::outbound::OverwriteConfirmation;

/// In-progress reorder gesture
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragGesture {
    pub source: usize,
    pub target: Option<usize>,
}

/// Ephemeral authoring state; never persisted
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuilderSession {
    selected: Option<FieldId>,
    drag: Option<DragGesture>,
}

impl BuilderSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&FieldId> {
        self.selected.as_ref()
    }

    pub fn drag(&self) -> Option<DragGesture> {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn select(&mut self, id: FieldId) {
        self.selected = Some(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Capture the source index; replaces any stale gesture
    pub fn start_drag(&mut self, source: usize) {
        self.drag = Some(DragGesture { source, target: None });
    }

    /// Record the last hovered index without committing anything
    pub fn hover(&mut self, target: usize) {
        if let Some(drag) = self.drag.as_mut() {
            drag.target = Some(target);
        }
    }

    /// Clear the gesture, returning its (source, target) pair if complete
    pub fn end_drag(&mut self) -> Option<(usize, usize)> {
        self.drag.take().and_then(|d| d.target.map(|t| (d.source, t)))
    }

    pub fn reset(&mut self) {
        self.selected = None;
        self.drag = None;
    }
}

/// Result of a template application
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemplateOutcome {
    Applied { added: usize, discarded: usize },
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuilderError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unknown template: {0}")]
    UnknownTemplate(String),
}

/// Authoring operations over one form
#[derive(Debug)]
pub struct FormBuilder {
    form: FormDefinition,
    session: BuilderSession,
}

impl FormBuilder {
    /// Edit an existing form
    pub fn new(form: FormDefinition) -> Self {
        Self { form, session: BuilderSession::new() }
    }

    /// Start a new, empty form
    pub fn start_new(title: impl Into<String>) -> Self {
        Self::new(FormDefinition::create(title))
    }

    pub fn form(&self) -> &FormDefinition {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormDefinition {
        &mut self.form
    }

    pub fn session(&self) -> &BuilderSession {
        &self.session
    }

    pub fn into_form(self) -> FormDefinition {
        self.form
    }

    pub fn selected_field(&self) -> Option<&FieldDefinition> {
        self.session.selected().and_then(|id| self.form.field(id))
    }

    /// Append a field with its type's defaults and select it
    pub fn add_field(&mut self, field_type: FieldType) -> &FieldDefinition {
        let info = field_type.describe();
        let name = format!("field_{}", self.form.fields().len() + 1);
        let label = format!("New {} Field", info.label);
        let field = FieldDefinition::new(name, label, info.default_kind());
        let id = field.id.clone();

        debug!(form_id = %self.form.id(), field_id = %id, %field_type, "adding field");
        self.form.add_field(field);
        self.session.select(id);

        let last = self.form.fields().len() - 1;
        &self.form.fields()[last]
    }

    /// Copy a field right after the original and select the copy
    pub fn duplicate_field(&mut self, id: &FieldId) -> Result<&FieldDefinition, BuilderError> {
        let index = self
            .form
            .position(id)
            .ok_or_else(|| FormError::FieldNotFound(id.clone()))?;

        let mut copy = self.form.fields()[index].clone();
        copy.id = FieldId::new();
        copy.name = format!("field_{}", self.form.fields().len() + 1);
        copy.label = format!("{} (copy)", copy.label);
        let copy_id = copy.id.clone();

        self.form.insert_field(index + 1, copy)?;
        self.session.select(copy_id);
        Ok(&self.form.fields()[index + 1])
    }

    /// Merge a patch into the identified field. Name collisions are left to
    /// save-time validation.
    pub fn update_field(&mut self, id: &FieldId, patch: FieldPatch) -> Result<&FieldDefinition, BuilderError> {
        debug!(form_id = %self.form.id(), field_id = %id, "updating field");
        let field = self.form.update_field(id, patch).map_err(|e| {
            warn!(field_id = %id, error = %e, "field update rejected");
            e
        })?;
        Ok(field)
    }

    /// Delete a field; clears the selection if it pointed there
    pub fn remove_field(&mut self, id: &FieldId) -> Result<FieldDefinition, BuilderError> {
        let removed = self.form.remove_field(id)?;
        if self.session.selected() == Some(id) {
            self.session.clear_selection();
        }
        debug!(form_id = %self.form.id(), field_id = %id, "removed field");
        Ok(removed)
    }

    /// List move (remove at `from`, insert at `to`)
    pub fn move_field(&mut self, from: usize, to: usize) -> Result<(), BuilderError> {
        self.form.move_field(from, to)?;
        debug!(form_id = %self.form.id(), from, to, "moved field");
        Ok(())
    }

    pub fn select_field(&mut self, id: &FieldId) -> Result<(), BuilderError> {
        if self.form.field(id).is_none() {
            return Err(FormError::FieldNotFound(id.clone()).into());
        }
        self.session.select(id.clone());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
    }

    // =========================================================================
    // Drag gesture
    // =========================================================================

    pub fn begin_drag(&mut self, source: usize) {
        self.session.start_drag(source);
    }

    pub fn drag_over(&mut self, target: usize) {
        self.session.hover(target);
    }

    /// Commit the last hovered position. The gesture is cleared even when the
    /// move fails or no position was hovered.
    pub fn end_drag(&mut self) -> Result<bool, BuilderError> {
        match self.session.end_drag() {
            Some((from, to)) if from != to => {
                self.move_field(from, to)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Abandon the gesture without moving anything
    pub fn cancel_drag(&mut self) {
        self.session.end_drag();
    }

    // =========================================================================
    // Templates
    // =========================================================================

    /// Replace every field with the template's, and take its title,
    /// description, and category. Prior fields are not kept.
    pub fn apply_template(
        &mut self,
        template: &Template,
        confirm: &dyn OverwriteConfirmation,
    ) -> Result<TemplateOutcome, BuilderError> {
        let fields = template.instantiate();
        if fields.is_empty() {
            return Err(ValidationError::form(format!("Template `{}` has no fields", template.id)).into());
        }
        if !self.form.fields().is_empty() && !confirm.confirm_overwrite(&self.form, template) {
            info!(form_id = %self.form.id(), template = %template.id, "template overwrite declined");
            return Ok(TemplateOutcome::Declined);
        }

        let added = fields.len();
        let discarded = self.form.replace_fields(template.id.clone(), fields).len();
        self.form.set_title(template.title.clone());
        self.form.set_description(template.description.clone());
        self.form.set_category(Some(template.category.clone()));
        self.session.reset();

        if discarded > 0 {
            warn!(form_id = %self.form.id(), template = %template.id, discarded, "template replaced existing fields");
        }
        Ok(TemplateOutcome::Applied { added, discarded })
    }

    pub fn apply_template_by_id(
        &mut self,
        catalog: &TemplateCatalog,
        template_id: &str,
        confirm: &dyn OverwriteConfirmation,
    ) -> Result<TemplateOutcome, BuilderError> {
        let template = catalog
            .get(template_id)
            .ok_or_else(|| BuilderError::UnknownTemplate(template_id.to_string()))?;
        self.apply_template(template, confirm)
    }

    // =========================================================================
    // Save
    // =========================================================================

    pub fn validate_for_save(&self, validator: &FieldValidator) -> Result<(), ValidationError> {
        validator.validate_for_save(&self.form)
    }

    /// Discard everything and start over with an empty form
    pub fn reset(&mut self, title: impl Into<String>) {
        self.form = FormDefinition::create(title);
        self.session.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{FieldKind, FieldSetting, OrgUnitRef, RangeSettings};
    use crate::ports::outbound::AlwaysOverwrite;
    use proptest::prelude::*;

    struct Decline;

    impl OverwriteConfirmation for Decline {
        fn confirm_overwrite(&self, _form: &FormDefinition, _template: &Template) -> bool {
            false
        }
    }

    fn builder() -> FormBuilder {
        FormBuilder::start_new("Untitled")
    }

    fn ids(b: &FormBuilder) -> Vec<FieldId> {
        b.form().fields().iter().map(|f| f.id.clone()).collect()
    }

    #[test]
    fn test_add_select_then_remove() {
        let mut b = builder();
        let field = b.add_field(FieldType::Select).clone();

        assert_eq!(field.label, "New Dropdown Field");
        assert_eq!(field.name, "field_1");
        assert_eq!(field.options().unwrap(), ["Option 1", "Option 2", "Option 3"]);
        assert_eq!(b.session().selected(), Some(&field.id));

        b.remove_field(&field.id).unwrap();
        assert!(b.form().fields().is_empty());
        assert!(b.session().selected().is_none());
    }

    #[test]
    fn test_range_update_keeps_default() {
        let mut b = builder();
        let id = b.add_field(FieldType::Range).id.clone();
        assert_eq!(
            b.form().fields()[0].kind(),
            &FieldKind::Range(RangeSettings { min: 0, max: 100, step: 1, default_value: 50 })
        );

        b.update_field(&id, FieldPatch::new().set(FieldSetting::Max(20))).unwrap();
        assert_eq!(
            b.form().fields()[0].kind(),
            &FieldKind::Range(RangeSettings { min: 0, max: 20, step: 1, default_value: 50 })
        );
    }

    #[test]
    fn test_names_follow_field_count() {
        let mut b = builder();
        b.add_field(FieldType::Text);
        let second = b.add_field(FieldType::Email).id.clone();
        b.remove_field(&second).unwrap();
        let third = b.add_field(FieldType::Number);
        assert_eq!(third.name, "field_2");
        assert_eq!(third.label, "New Number Field");
    }

    #[test]
    fn test_removing_other_field_keeps_selection() {
        let mut b = builder();
        let first = b.add_field(FieldType::Text).id.clone();
        let second = b.add_field(FieldType::Text).id.clone();
        b.remove_field(&first).unwrap();
        assert_eq!(b.session().selected(), Some(&second));
    }

    #[test]
    fn test_unknown_field_is_reported() {
        let mut b = builder();
        let missing = FieldId::new();
        assert!(matches!(
            b.remove_field(&missing),
            Err(BuilderError::Form(FormError::FieldNotFound(_)))
        ));
        assert!(b.update_field(&missing, FieldPatch::new().label("x")).is_err());
        assert!(b.select_field(&missing).is_err());
    }

    #[test]
    fn test_duplicate_inserts_after_original() {
        let mut b = builder();
        let a = b.add_field(FieldType::Radio).id.clone();
        b.add_field(FieldType::Text);
        let copy = b.duplicate_field(&a).unwrap().clone();

        assert_eq!(b.form().fields()[1].id, copy.id);
        assert_eq!(copy.label, "New Radio Group Field (copy)");
        assert_eq!(copy.options(), b.form().fields()[0].options());
        assert_eq!(b.session().selected(), Some(&copy.id));
    }

    #[test]
    fn test_drag_commits_last_hover() {
        let mut b = builder();
        for _ in 0..4 {
            b.add_field(FieldType::Text);
        }
        let before = ids(&b);

        b.begin_drag(0);
        b.drag_over(1);
        b.drag_over(3);
        b.drag_over(2);
        assert_eq!(ids(&b), before);
        assert!(b.end_drag().unwrap());

        assert_eq!(ids(&b), vec![before[1].clone(), before[2].clone(), before[0].clone(), before[3].clone()]);
        assert!(!b.session().is_dragging());
    }

    #[test]
    fn test_drag_without_hover_or_abandoned_clears_state() {
        let mut b = builder();
        b.add_field(FieldType::Text);
        b.add_field(FieldType::Text);
        let before = ids(&b);

        b.begin_drag(1);
        assert!(!b.end_drag().unwrap());
        assert!(!b.session().is_dragging());

        b.begin_drag(0);
        b.drag_over(1);
        b.cancel_drag();
        assert!(!b.session().is_dragging());
        assert_eq!(ids(&b), before);
    }

    #[test]
    fn test_failed_drop_still_clears_gesture() {
        let mut b = builder();
        b.add_field(FieldType::Text);
        b.begin_drag(0);
        b.drag_over(7);
        assert!(b.end_drag().is_err());
        assert!(!b.session().is_dragging());
    }

    #[test]
    fn test_template_replaces_custom_fields() {
        let mut b = builder();
        let custom_a = b.add_field(FieldType::Text).id.clone();
        let custom_b = b.add_field(FieldType::Color).id.clone();

        let outcome = b
            .apply_template_by_id(&TemplateCatalog::builtin(), "feedback-survey", &AlwaysOverwrite)
            .unwrap();

        assert_eq!(outcome, TemplateOutcome::Applied { added: 5, discarded: 2 });
        assert_eq!(b.form().fields().len(), 5);
        assert!(b.form().field(&custom_a).is_none());
        assert!(b.form().field(&custom_b).is_none());
        assert_eq!(b.form().title(), "Customer Feedback Survey");
        assert_eq!(b.form().category(), Some("feedback"));
        assert!(b.session().selected().is_none());
    }

    #[test]
    fn test_template_overwrite_can_be_declined() {
        let mut b = builder();
        b.add_field(FieldType::Text);
        let outcome = b
            .apply_template_by_id(&TemplateCatalog::builtin(), "contact-form", &Decline)
            .unwrap();
        assert_eq!(outcome, TemplateOutcome::Declined);
        assert_eq!(b.form().fields().len(), 1);
    }

    #[test]
    fn test_empty_or_unknown_template() {
        let mut b = builder();
        let empty = Template {
            id: "blank".into(),
            title: "Blank".into(),
            description: String::new(),
            category: "misc".into(),
            fields: vec![],
        };
        assert!(matches!(b.apply_template(&empty, &AlwaysOverwrite), Err(BuilderError::Validation(_))));
        assert!(matches!(
            b.apply_template_by_id(&TemplateCatalog::builtin(), "nope", &AlwaysOverwrite),
            Err(BuilderError::UnknownTemplate(_))
        ));
    }

    #[test]
    fn test_validate_for_save() {
        let mut b = builder();
        let validator = FieldValidator::default();
        assert!(b.validate_for_save(&validator).is_err());

        b.add_field(FieldType::Text);
        b.form_mut().associate(OrgUnitRef::new("finance"));
        assert!(b.validate_for_save(&validator).is_ok());
    }

    #[derive(Clone, Debug)]
    enum Op {
        Add,
        Remove(usize),
        Move(usize, usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Add),
            any::<usize>().prop_map(Op::Remove),
            (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Move(a, b)),
        ]
    }

    proptest! {
        #[test]
        fn order_tracks_surviving_fields(ops in prop::collection::vec(op(), 0..40)) {
            let mut b = builder();
            let mut model: Vec<FieldId> = vec![];

            for op in ops {
                match op {
                    Op::Add => model.push(b.add_field(FieldType::Text).id.clone()),
                    Op::Remove(seed) if !model.is_empty() => {
                        let id = model.remove(seed % model.len());
                        b.remove_field(&id).unwrap();
                    }
                    Op::Move(from, to) if !model.is_empty() => {
                        let (from, to) = (from % model.len(), to % model.len());
                        b.move_field(from, to).unwrap();
                        let id = model.remove(from);
                        model.insert(to, id);
                    }
                    _ => {}
                }
            }

            prop_assert_eq!(ids(&b), model);
        }
    }
}
