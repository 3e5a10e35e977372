//! CLI Commands

pub mod catalog;
pub mod config;
pub mod fields;
pub mod forms;
pub mod responses;

use anyhow::anyhow;
use std::path::PathBuf;
use std::sync::Arc;

use formkit::infrastructure::{
    CsvResponseExporter, JsonFileStore, LocalSubmissionTransport, LoggingClipboard, LoggingEventPublisher,
    StaticOrgUnitDirectory,
};
use formkit::ports::outbound::{EventPublisher, FormRepository};
use formkit::{
    FieldDefinition, FieldId, FieldValidator, FormBuilder, FormDefinition, FormId, FormService, FormUseCases,
    ResponseService,
};

use crate::config::Config;
use crate::output::{self, OutputFormat};

/// Everything a command needs: store, config, output format
pub struct Context {
    pub store_dir: PathBuf,
    pub store: Arc<JsonFileStore>,
    pub config: Config,
    pub format: OutputFormat,
    events: Arc<dyn EventPublisher>,
}

impl Context {
    pub fn new(store_dir: PathBuf, config: Config, format: OutputFormat) -> Self {
        Self {
            store: Arc::new(JsonFileStore::new(store_dir.clone())),
            store_dir,
            config,
            format,
            events: Arc::new(LoggingEventPublisher),
        }
    }

    pub fn validator(&self) -> FieldValidator {
        FieldValidator::new(self.config.forms.validation)
    }

    pub fn form_service(&self) -> FormService {
        FormService::new(
            self.store.clone(),
            Arc::new(StaticOrgUnitDirectory::new(self.config.org_units.clone())),
            Arc::new(LoggingClipboard),
            self.events.clone(),
            self.config.forms.clone(),
        )
    }

    pub fn response_service(&self) -> ResponseService {
        let transport = LocalSubmissionTransport::new(self.store.clone())
            .with_attachment_dir(self.store_dir.join("attachments"));
        ResponseService::new(
            self.store.clone(),
            self.store.clone(),
            Arc::new(CsvResponseExporter::new()),
            Arc::new(transport),
            self.events.clone(),
            self.config.forms.clone(),
        )
    }

    pub async fn load_form(&self, id: &str) -> formkit::Result<FormDefinition> {
        let service = self.form_service();
        Ok(service.load_form(&FormId::from_string(id)).await?)
    }

    pub async fn load_builder(&self, id: &str) -> formkit::Result<FormBuilder> {
        Ok(FormBuilder::new(self.load_form(id).await?))
    }

    /// Store a draft as-is. Save validation only warns here; publishing enforces it.
    pub async fn save_draft(&self, form: &mut FormDefinition) -> formkit::Result<()> {
        if let Err(e) = self.validator().validate_for_save(form) {
            output::notice(format!("not ready to publish: {}", e));
        }
        self.store.save(form).await?;
        self.events.publish(form.take_events()).await?;
        Ok(())
    }
}

/// Find a field by id, falling back to its name
pub fn resolve_field<'a>(form: &'a FormDefinition, key: &str) -> anyhow::Result<&'a FieldDefinition> {
    form.field(&FieldId::from_string(key))
        .or_else(|| form.fields().iter().find(|f| f.name == key))
        .ok_or_else(|| anyhow!("form {} has no field `{}`", form.id(), key))
}
