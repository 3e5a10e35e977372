//! Fill Session
//!
//! One person filling one form: seeded values, transient password
//! visibility, and the files they attached with their local previews.

use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::domain::aggregates::FormDefinition;
use crate::domain::services::{FieldInput, FieldRenderer, FormValues};
use crate::domain::value_objects::{FieldDefinition, FieldError, FieldId, FieldKind, FileHandle};
use crate::ports::outbound::PreviewProvider;

/// A local preview resource. Released when dropped, exactly once.
pub struct PreviewHandle {
    url: String,
    provider: Arc<dyn PreviewProvider>,
}

impl PreviewHandle {
    fn create(provider: &Arc<dyn PreviewProvider>, file: &FileHandle) -> Option<Self> {
        if !file.is_previewable() {
            return None;
        }
        provider.create(file).map(|url| Self { url, provider: Arc::clone(provider) })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.provider.release(&self.url);
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewHandle").field("url", &self.url).finish()
    }
}

/// A file attached during this session
#[derive(Debug)]
pub struct UploadedFile {
    pub field_id: FieldId,
    pub handle: FileHandle,
    preview: Option<PreviewHandle>,
}

impl UploadedFile {
    pub fn preview_url(&self) -> Option<&str> {
        self.preview.as_ref().map(PreviewHandle::url)
    }
}

pub struct FillSession {
    form: FormDefinition,
    values: FormValues,
    revealed: HashSet<FieldId>,
    uploads: Vec<UploadedFile>,
    previews: Arc<dyn PreviewProvider>,
}

impl FillSession {
    /// Open a session with every field seeded to its empty default
    pub fn new(form: FormDefinition, previews: Arc<dyn PreviewProvider>) -> Self {
        let values = FieldRenderer::seed(&form);
        Self {
            form,
            values,
            revealed: HashSet::new(),
            uploads: Vec::new(),
            previews,
        }
    }

    pub fn form(&self) -> &FormDefinition {
        &self.form
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn uploads(&self) -> &[UploadedFile] {
        &self.uploads
    }

    /// Files currently attached to any field, in field order
    pub fn attachments(&self) -> Vec<FileHandle> {
        self.values.attachments()
    }

    fn field(&self, id: &FieldId) -> Result<&FieldDefinition, FieldError> {
        self.form.field(id).ok_or_else(|| FieldError::UnknownProperty {
            property: id.to_string(),
        })
    }

    /// Apply one input. A rejected input leaves the session unchanged.
    pub fn set(&mut self, field_id: &FieldId, input: FieldInput) -> Result<(), FieldError> {
        let field = self.field(field_id)?.clone();
        let attached = match &input {
            FieldInput::Attach(files) => files.clone(),
            _ => vec![],
        };

        let displaced = FieldRenderer::write(&field, &mut self.values, input)?;

        for file in displaced {
            self.detach_upload(&file.id);
        }
        for handle in attached {
            let preview = PreviewHandle::create(&self.previews, &handle);
            debug!(field_id = %field_id, file = %handle.file_name, preview = preview.is_some(), "file attached");
            self.uploads.push(UploadedFile { field_id: field_id.clone(), handle, preview });
        }
        Ok(())
    }

    /// Apply a JSON answer addressed by field name
    pub fn set_json(&mut self, name: &str, value: &Value) -> Result<(), FieldError> {
        let field = self
            .form
            .fields()
            .iter()
            .find(|f| f.name == name)
            .cloned()
            .ok_or_else(|| FieldError::UnknownProperty { property: name.to_string() })?;

        let inputs = FieldInput::from_json(&field, value)?;
        let snapshot = self.values.clone();
        let mut displaced = Vec::new();
        for input in inputs {
            match FieldRenderer::write(&field, &mut self.values, input) {
                Ok(files) => displaced.extend(files),
                Err(e) => {
                    self.values = snapshot;
                    return Err(e);
                }
            }
        }
        for file in displaced {
            self.detach_upload(&file.id);
        }
        Ok(())
    }

    pub fn attach(&mut self, field_id: &FieldId, files: Vec<FileHandle>) -> Result<(), FieldError> {
        self.set(field_id, FieldInput::Attach(files))
    }

    pub fn detach(&mut self, field_id: &FieldId, file_id: &str) -> Result<(), FieldError> {
        self.set(field_id, FieldInput::Detach(file_id.to_string()))
    }

    fn detach_upload(&mut self, file_id: &str) {
        // Dropping the record releases its preview
        self.uploads.retain(|u| u.handle.id != file_id);
    }

    /// Flip the visibility of a password input; returns the new state
    pub fn toggle_password_visibility(&mut self, field_id: &FieldId) -> Result<bool, FieldError> {
        let field = self.field(field_id)?;
        if !matches!(field.kind(), FieldKind::Password) {
            return Err(FieldError::IllegalProperty {
                property: "visibility",
                field_type: field.field_type(),
            });
        }
        if self.revealed.remove(field_id) {
            Ok(false)
        } else {
            self.revealed.insert(field_id.clone());
            Ok(true)
        }
    }

    pub fn is_revealed(&self, field_id: &FieldId) -> bool {
        self.revealed.contains(field_id)
    }

    /// Back to seeded values; every preview is released
    pub fn reset(&mut self) {
        self.values = FieldRenderer::seed(&self.form);
        self.revealed.clear();
        self.uploads.clear();
    }
}

impl fmt::Debug for FillSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FillSession")
            .field("form_id", self.form.id())
            .field("values", &self.values.len())
            .field("uploads", &self.uploads)
            .finish()
    }
}
