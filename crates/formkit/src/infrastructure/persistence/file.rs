//! JSON file store
//!
//! One file per form under `forms/`, one array of responses per form under
//! `responses/`.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::aggregates::{FormDefinition, FormResponse};
use crate::domain::value_objects::FormId;
use crate::ports::outbound::{FormRepository, RepositoryError, ResponseRepository};

pub struct JsonFileStore {
    root: PathBuf,
    // Serializes read-modify-write of response files
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), write_lock: Mutex::new(()) }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn forms_dir(&self) -> PathBuf {
        self.root.join("forms")
    }

    fn form_path(&self, id: &FormId) -> Result<PathBuf, RepositoryError> {
        Ok(self.forms_dir().join(format!("{}.json", file_stem(id)?)))
    }

    fn responses_path(&self, id: &FormId) -> Result<PathBuf, RepositoryError> {
        Ok(self.root.join("responses").join(format!("{}.json", file_stem(id)?)))
    }

    async fn read_responses(&self, path: &Path) -> Result<Vec<FormResponse>, RepositoryError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(vec![]),
            Err(e) => Err(e.into()),
        }
    }
}

fn file_stem(id: &FormId) -> Result<&str, RepositoryError> {
    let stem = id.as_str();
    let safe = !stem.is_empty()
        && stem.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if safe {
        Ok(stem)
    } else {
        Err(RepositoryError::QueryError(format!("invalid form id `{}`", stem)))
    }
}

async fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), RepositoryError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl FormRepository for JsonFileStore {
    async fn find_by_id(&self, id: &FormId) -> Result<Option<FormDefinition>, RepositoryError> {
        match fs::read(self.form_path(id)?).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, form: &FormDefinition) -> Result<FormId, RepositoryError> {
        write_json(&self.form_path(form.id())?, form).await?;
        tracing::debug!(form_id = %form.id(), root = %self.root.display(), "form written");
        Ok(form.id().clone())
    }

    async fn delete(&self, id: &FormId) -> Result<(), RepositoryError> {
        match fs::remove_file(self.form_path(id)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(RepositoryError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<FormDefinition>, RepositoryError> {
        let mut entries = match fs::read_dir(self.forms_dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut forms = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path).await?;
            forms.push(serde_json::from_slice(&bytes)?);
        }
        Ok(forms)
    }
}

#[async_trait]
impl ResponseRepository for JsonFileStore {
    async fn list_by_form(&self, form_id: &FormId) -> Result<Vec<FormResponse>, RepositoryError> {
        self.read_responses(&self.responses_path(form_id)?).await
    }

    async fn create(&self, response: &FormResponse) -> Result<(), RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let path = self.responses_path(response.form_id())?;
        let mut responses = self.read_responses(&path).await?;
        if responses.iter().any(|r| r.id() == response.id()) {
            return Err(RepositoryError::QueryError(format!("response {} already exists", response.id())));
        }
        responses.push(response.clone());
        write_json(&path, &responses).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{
        FieldDefinition, FieldKind, FieldPatch, FieldSetting, FieldType, FieldValue, FieldWidth, OrgUnitRef,
    };
    use std::collections::BTreeMap;

    /// Non-default properties for every type that has any
    fn custom_settings(field_type: FieldType) -> Vec<FieldSetting> {
        use FieldSetting as S;
        match field_type {
            FieldType::Date => vec![
                S::MinDate(Some("2024-01-01".into())),
                S::MaxDate(Some("2024-12-31".into())),
                S::DefaultDate(Some("2024-06-15".into())),
            ],
            FieldType::Time => vec![S::MinTime(Some("09:00".into())), S::MaxTime(Some("17:30".into()))],
            FieldType::Datetime => vec![S::DefaultDatetime(Some("2024-06-15T12:00".into()))],
            FieldType::Select | FieldType::Radio => vec![S::Options(vec!["Red".into(), "Green".into()])],
            FieldType::Checkbox | FieldType::Toggle => vec![S::Checked(true)],
            FieldType::File => vec![S::Multiple(true), S::Accept("image/*, .pdf".into()), S::MaxSize(12)],
            FieldType::Rating => vec![S::MaxRating(10), S::DefaultRating(7)],
            FieldType::Color => vec![S::DefaultColor("#ff0000".into())],
            FieldType::Range => vec![S::Min(-10), S::Max(10), S::Step(2), S::DefaultValue(4)],
            _ => vec![],
        }
    }

    fn every_type_form() -> FormDefinition {
        let mut form = FormDefinition::create("Everything");
        form.associate(OrgUnitRef::new("hr"));
        for (i, field_type) in FieldType::ALL.into_iter().enumerate() {
            let mut field =
                FieldDefinition::new(format!("f{}", i), field_type.label(), field_type.describe().default_kind());
            let mut patch = FieldPatch::new()
                .required(true)
                .placeholder(format!("enter {}", field_type))
                .help_text("shown below the input")
                .width(FieldWidth::Half);
            for setting in custom_settings(field_type) {
                patch = patch.set(setting);
            }
            field.apply_patch(patch).unwrap();
            form.add_field(field);
        }
        form
    }

    fn survey() -> FormDefinition {
        let mut form = FormDefinition::create("Survey");
        form.associate(OrgUnitRef::new("hr"));
        form.add_field(FieldDefinition::new("email", "Email", FieldKind::Email));
        form
    }

    #[tokio::test]
    async fn test_forms_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let form = survey();
        let id = JsonFileStore::new(dir.path()).save(&form).await.unwrap();

        let reopened = JsonFileStore::new(dir.path());
        let loaded = reopened.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(loaded.title(), "Survey");
        assert_eq!(loaded.fields(), form.fields());
        assert_eq!(reopened.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_every_field_type_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let form = every_type_form();
        for field in form.fields() {
            if !custom_settings(field.field_type()).is_empty() {
                assert_ne!(field.kind(), &FieldKind::defaults_for(field.field_type()));
            }
        }
        let id = JsonFileStore::new(dir.path()).save(&form).await.unwrap();

        let loaded = JsonFileStore::new(dir.path()).find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(loaded.fields().len(), FieldType::ALL.len());
        for (stored, original) in loaded.fields().iter().zip(form.fields()) {
            assert_eq!(stored, original, "{} changed on reload", original.field_type());
            assert!(stored.required);
        }
    }

    #[tokio::test]
    async fn test_missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent"));
        assert!(store.list().await.unwrap().is_empty());
        assert!(store.find_by_id(&FormId::new()).await.unwrap().is_none());
        assert!(store.list_by_form(&FormId::new()).await.unwrap().is_empty());
        assert_eq!(store.delete(&FormId::new()).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_responses_append() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let form_id = FormId::new();

        let mut values = BTreeMap::new();
        values.insert("email".to_string(), FieldValue::Text("a@b.c".into()));
        let first = FormResponse::create(form_id.clone(), values, vec![]);
        let second = FormResponse::create(form_id.clone(), BTreeMap::new(), vec![]);

        store.create(&first).await.unwrap();
        store.create(&second).await.unwrap();

        assert_eq!(store.list_by_form(&form_id).await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn test_path_like_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let id = FormId::from_string("../escape");
        assert!(matches!(store.find_by_id(&id).await, Err(RepositoryError::QueryError(_))));
    }
}
