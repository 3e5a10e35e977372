//! Data Transfer Objects
//!
//! Shapes handed to outbound collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::aggregates::FormResponse;
use crate::domain::value_objects::{FieldValue, FileHandle, FormId, ResponseId};

/// Multi-part submission: values plus the files to upload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionBundle {
    pub form_id: FormId,
    pub response_id: ResponseId,
    pub values: BTreeMap<String, FieldValue>,
    pub attachments: Vec<FileHandle>,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionBundle {
    pub fn from_response(response: &FormResponse) -> Self {
        Self {
            form_id: response.form_id().clone(),
            response_id: response.id().clone(),
            values: response.values().clone(),
            attachments: response.attachments().to_vec(),
            submitted_at: response.created_at(),
        }
    }

    pub fn into_response(self) -> FormResponse {
        FormResponse::restore(self.response_id, self.form_id, self.values, self.attachments, self.submitted_at)
    }

    /// Bytes to upload across all attachments
    pub fn upload_size(&self) -> u64 {
        self.attachments.iter().map(|f| f.size_bytes).sum()
    }
}

/// Transport acknowledgement of a submission
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub response_id: ResponseId,
    pub uploaded_bytes: u64,
}

/// Tabular export parameters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub delimiter: char,
    pub file_prefix: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { delimiter: ',', file_prefix: "responses".into() }
    }
}

/// Encoded export produced by the storage collaborator
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Summary row for listing stored forms
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    pub id: FormId,
    pub title: String,
    pub status: crate::domain::aggregates::FormStatus,
    pub field_count: usize,
}

impl From<&crate::domain::aggregates::FormDefinition> for FormSummary {
    fn from(form: &crate::domain::aggregates::FormDefinition) -> Self {
        Self {
            id: form.id().clone(),
            title: form.title().to_string(),
            status: form.status(),
            field_count: form.fields().len(),
        }
    }
}
