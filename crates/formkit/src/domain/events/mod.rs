//! Domain Events
//!
//! Events raised by aggregates to communicate state changes.

use chrono::{DateTime, Utc};
use crate::domain::value_objects::{FieldId, FieldType, FormId, ResponseId};

/// All domain events in the forms bounded context
#[derive(Clone, Debug, PartialEq)]
pub enum DomainEvent {
    Form(FormEvent),
    Response(ResponseEvent),
}

/// Form definition events
#[derive(Clone, Debug, PartialEq)]
pub enum FormEvent {
    Created {
        form_id: FormId,
        title: String,
        created_at: DateTime<Utc>,
    },

    FieldAdded {
        form_id: FormId,
        field_id: FieldId,
        field_type: FieldType,
    },

    FieldRemoved {
        form_id: FormId,
        field_id: FieldId,
    },

    FieldMoved {
        form_id: FormId,
        field_id: FieldId,
        from: usize,
        to: usize,
    },

    TemplateApplied {
        form_id: FormId,
        template_id: String,
        discarded_fields: usize,
    },

    Published {
        form_id: FormId,
        published_at: DateTime<Utc>,
    },

    Saved {
        form_id: FormId,
        field_count: usize,
    },
}

/// Response capture events
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseEvent {
    Submitted {
        form_id: FormId,
        response_id: ResponseId,
        attachment_count: usize,
        submitted_at: DateTime<Utc>,
    },
}

impl DomainEvent {
    /// Form the event belongs to
    pub fn form_id(&self) -> &FormId {
        match self {
            DomainEvent::Form(e) => match e {
                FormEvent::Created { form_id, .. } => form_id,
                FormEvent::FieldAdded { form_id, .. } => form_id,
                FormEvent::FieldRemoved { form_id, .. } => form_id,
                FormEvent::FieldMoved { form_id, .. } => form_id,
                FormEvent::TemplateApplied { form_id, .. } => form_id,
                FormEvent::Published { form_id, .. } => form_id,
                FormEvent::Saved { form_id, .. } => form_id,
            },
            DomainEvent::Response(e) => match e {
                ResponseEvent::Submitted { form_id, .. } => form_id,
            },
        }
    }

    /// Get event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::Form(e) => match e {
                FormEvent::Created { .. } => "form.created",
                FormEvent::FieldAdded { .. } => "form.field_added",
                FormEvent::FieldRemoved { .. } => "form.field_removed",
                FormEvent::FieldMoved { .. } => "form.field_moved",
                FormEvent::TemplateApplied { .. } => "form.template_applied",
                FormEvent::Published { .. } => "form.published",
                FormEvent::Saved { .. } => "form.saved",
            },
            DomainEvent::Response(e) => match e {
                ResponseEvent::Submitted { .. } => "response.submitted",
            },
        }
    }
}
