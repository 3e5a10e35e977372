//! Response Aggregate
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::events::{DomainEvent, ResponseEvent};
use crate::domain::value_objects::{FieldValue, FileHandle, FormId, ResponseId};

/// One completed answer set. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormResponse {
    id: ResponseId,
    form_id: FormId,
    values: BTreeMap<String, FieldValue>,
    #[serde(default)]
    attachments: Vec<FileHandle>,
    created_at: DateTime<Utc>,
}

impl FormResponse {
    pub fn create(form_id: FormId, values: BTreeMap<String, FieldValue>, attachments: Vec<FileHandle>) -> Self {
        Self { id: ResponseId::new(), form_id, values, attachments, created_at: Utc::now() }
    }

    /// Rebuild a response received from a transport
    pub fn restore(
        id: ResponseId,
        form_id: FormId,
        values: BTreeMap<String, FieldValue>,
        attachments: Vec<FileHandle>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self { id, form_id, values, attachments, created_at }
    }

    pub fn id(&self) -> &ResponseId { &self.id }
    pub fn form_id(&self) -> &FormId { &self.form_id }
    pub fn values(&self) -> &BTreeMap<String, FieldValue> { &self.values }
    pub fn value(&self, name: &str) -> Option<&FieldValue> { self.values.get(name) }
    pub fn attachments(&self) -> &[FileHandle] { &self.attachments }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    pub fn submitted_event(&self) -> DomainEvent {
        DomainEvent::Response(ResponseEvent::Submitted {
            form_id: self.form_id.clone(),
            response_id: self.id.clone(),
            attachment_count: self.attachments.len(),
            submitted_at: self.created_at,
        })
    }
}
