//! Command handlers
//!
//! Application services that orchestrate use cases.

use std::sync::Arc;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::application::dto::{FormSummary, SubmissionBundle};
use crate::application::fill::FillSession;
use crate::config::FormsConfig;
use crate::domain::aggregates::{FormDefinition, FormResponse};
use crate::domain::services::{FieldValidator, ValidationError};
use crate::domain::value_objects::{FormId, OrgUnitRef};
use crate::domain::DomainEvent;
use crate::ports::inbound::{FormUseCases, ResponseUseCases, UseCaseError};
use crate::ports::outbound::{
    Clipboard, EventPublisher, ExportSink, FormRepository, OrgUnitDirectory, ResponseExporter,
    ResponseRepository, SubmissionTransport, UploadProgress,
};

async fn publish_events(publisher: &dyn EventPublisher, events: Vec<DomainEvent>) {
    if events.is_empty() {
        return;
    }
    // State is already stored; a lost notification must not undo that
    if let Err(e) = publisher.publish(events).await {
        warn!(error = %e, "failed to publish domain events");
    }
}

/// Form authoring application service
pub struct FormService {
    form_repo: Arc<dyn FormRepository>,
    org_units: Arc<dyn OrgUnitDirectory>,
    clipboard: Arc<dyn Clipboard>,
    event_publisher: Arc<dyn EventPublisher>,
    validator: FieldValidator,
    config: FormsConfig,
}

impl FormService {
    pub fn new(
        form_repo: Arc<dyn FormRepository>,
        org_units: Arc<dyn OrgUnitDirectory>,
        clipboard: Arc<dyn Clipboard>,
        event_publisher: Arc<dyn EventPublisher>,
        config: FormsConfig,
    ) -> Self {
        Self {
            form_repo,
            org_units,
            clipboard,
            event_publisher,
            validator: FieldValidator::new(config.validation),
            config,
        }
    }

    pub fn validator(&self) -> &FieldValidator {
        &self.validator
    }

    async fn resolve_org_unit(&self, form: &FormDefinition) -> Result<OrgUnitRef, UseCaseError> {
        let requested = form
            .org_unit()
            .ok_or_else(|| ValidationError::form("Select an organizational unit for this form"))?;
        self.org_units
            .resolve(&requested.id)
            .await?
            .ok_or_else(|| {
                ValidationError::form(format!("Unknown organizational unit `{}`", requested.id)).into()
            })
    }

    /// Store a staged copy; the caller's form is replaced only on success
    async fn persist(&self, form: &mut FormDefinition, mut staged: FormDefinition) -> Result<FormId, UseCaseError> {
        let org_unit = self.resolve_org_unit(&staged).await?;
        staged.associate(org_unit);
        staged.mark_saved();

        let id = self.form_repo.save(&staged).await?;
        let events = staged.take_events();
        *form = staged;

        info!(form_id = %id, fields = form.fields().len(), status = ?form.status(), "form saved");
        publish_events(self.event_publisher.as_ref(), events).await;
        Ok(id)
    }
}

#[async_trait]
impl FormUseCases for FormService {
    async fn save_form(&self, form: &mut FormDefinition) -> Result<FormId, UseCaseError> {
        self.validator.validate_for_save(form)?;
        let staged = form.clone();
        self.persist(form, staged).await
    }

    async fn load_form(&self, id: &FormId) -> Result<FormDefinition, UseCaseError> {
        self.form_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| UseCaseError::NotFound(format!("form {}", id)))
    }

    async fn list_forms(&self) -> Result<Vec<FormSummary>, UseCaseError> {
        let mut forms = self.form_repo.list().await?;
        forms.sort_by_key(|f| std::cmp::Reverse(f.updated_at()));
        Ok(forms.iter().map(FormSummary::from).collect())
    }

    async fn delete_form(&self, id: &FormId) -> Result<(), UseCaseError> {
        self.load_form(id).await?;
        self.form_repo.delete(id).await?;
        info!(form_id = %id, "form deleted");
        Ok(())
    }

    async fn publish_form(&self, form: &mut FormDefinition) -> Result<FormId, UseCaseError> {
        self.validator.validate_for_save(form)?;
        let mut staged = form.clone();
        staged.publish()?;
        self.persist(form, staged).await
    }

    async fn list_org_units(&self) -> Result<Vec<OrgUnitRef>, UseCaseError> {
        Ok(self.org_units.list().await?)
    }

    fn share_link(&self, form: &FormDefinition) -> Result<String, UseCaseError> {
        if !form.is_published() {
            return Err(UseCaseError::Domain(format!(
                "form {} must be published before it can be shared",
                form.id()
            )));
        }
        let link = self.config.share.link_for(form.id());
        self.clipboard.copy(&link)?;
        debug!(form_id = %form.id(), %link, "share link copied");
        Ok(link)
    }
}

/// Response capture application service
pub struct ResponseService {
    form_repo: Arc<dyn FormRepository>,
    response_repo: Arc<dyn ResponseRepository>,
    exporter: Arc<dyn ResponseExporter>,
    transport: Arc<dyn SubmissionTransport>,
    event_publisher: Arc<dyn EventPublisher>,
    validator: FieldValidator,
    config: FormsConfig,
}

impl ResponseService {
    pub fn new(
        form_repo: Arc<dyn FormRepository>,
        response_repo: Arc<dyn ResponseRepository>,
        exporter: Arc<dyn ResponseExporter>,
        transport: Arc<dyn SubmissionTransport>,
        event_publisher: Arc<dyn EventPublisher>,
        config: FormsConfig,
    ) -> Self {
        Self {
            form_repo,
            response_repo,
            exporter,
            transport,
            event_publisher,
            validator: FieldValidator::new(config.validation),
            config,
        }
    }
}

#[async_trait]
impl ResponseUseCases for ResponseService {
    async fn submit(
        &self,
        session: &FillSession,
        progress: &dyn UploadProgress,
    ) -> Result<FormResponse, UseCaseError> {
        let form = session.form();
        if let Err(e) = self.validator.validate_submission(form, session.values()) {
            debug!(form_id = %form.id(), error = %e, "submission blocked");
            return Err(e.into());
        }

        let response = FormResponse::create(
            form.id().clone(),
            session.values().clone().into_inner(),
            session.attachments(),
        );
        let bundle = SubmissionBundle::from_response(&response);

        let receipt = self.transport.submit(&bundle, progress).await.map_err(|e| {
            warn!(form_id = %form.id(), error = %e, "submission failed");
            e
        })?;

        info!(
            form_id = %form.id(),
            response_id = %receipt.response_id,
            uploaded_bytes = receipt.uploaded_bytes,
            "response submitted"
        );
        publish_events(self.event_publisher.as_ref(), vec![response.submitted_event()]).await;
        Ok(response)
    }

    async fn list_responses(&self, form_id: &FormId) -> Result<Vec<FormResponse>, UseCaseError> {
        Ok(self.response_repo.list_by_form(form_id).await?)
    }

    async fn export_responses(&self, form_id: &FormId, sink: &dyn ExportSink) -> Result<String, UseCaseError> {
        let form = self
            .form_repo
            .find_by_id(form_id)
            .await?
            .ok_or_else(|| UseCaseError::NotFound(format!("form {}", form_id)))?;
        let responses = self.response_repo.list_by_form(form_id).await?;

        let file = self
            .exporter
            .export(&form, &responses, &self.config.export_options())
            .await?;
        let location = sink.save(&file).await?;

        info!(form_id = %form_id, responses = responses.len(), %location, "responses exported");
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::{ExportFile, SubmissionReceipt};
    use crate::domain::services::FieldInput;
    use crate::domain::value_objects::{FieldDefinition, FieldKind, FieldValue, FileHandle};
    use crate::infrastructure::{
        CsvResponseExporter, InMemoryFormRepository, InMemoryResponseRepository, LocalSubmissionTransport,
        MemoryExportSink, NoOpEventPublisher, RecordingClipboard, RecordingEventPublisher, StaticOrgUnitDirectory,
        TrackingPreviewProvider,
    };
    use crate::ports::outbound::{NoProgress, TransportError};
    use parking_lot::Mutex;

    struct FailingTransport;

    #[async_trait]
    impl SubmissionTransport for FailingTransport {
        async fn submit(
            &self,
            _bundle: &SubmissionBundle,
            _progress: &dyn UploadProgress,
        ) -> Result<SubmissionReceipt, TransportError> {
            Err(TransportError::Connection("offline".into()))
        }
    }

    #[derive(Default)]
    struct ProgressLog(Mutex<Vec<(u64, u64)>>);

    impl UploadProgress for ProgressLog {
        fn on_progress(&self, sent: u64, total: u64) {
            self.0.lock().push((sent, total));
        }
    }

    struct Fixture {
        forms: Arc<InMemoryFormRepository>,
        responses: Arc<InMemoryResponseRepository>,
        clipboard: Arc<RecordingClipboard>,
        events: Arc<RecordingEventPublisher>,
        form_service: FormService,
    }

    fn fixture() -> Fixture {
        let forms = Arc::new(InMemoryFormRepository::new());
        let responses = Arc::new(InMemoryResponseRepository::new());
        let clipboard = Arc::new(RecordingClipboard::new());
        let events = Arc::new(RecordingEventPublisher::new());
        let org_units = Arc::new(StaticOrgUnitDirectory::new(vec![
            OrgUnitRef::new("finance").with_name("Finance"),
            OrgUnitRef::new("hr").with_name("Human Resources"),
        ]));
        let form_service = FormService::new(
            forms.clone(),
            org_units,
            clipboard.clone(),
            events.clone(),
            FormsConfig::default(),
        );
        Fixture { forms, responses, clipboard, events, form_service }
    }

    fn response_service(f: &Fixture, transport: Arc<dyn SubmissionTransport>) -> ResponseService {
        ResponseService::new(
            f.forms.clone(),
            f.responses.clone(),
            Arc::new(CsvResponseExporter::new()),
            transport,
            Arc::new(NoOpEventPublisher),
            FormsConfig::default(),
        )
    }

    fn local_transport(f: &Fixture) -> Arc<dyn SubmissionTransport> {
        Arc::new(LocalSubmissionTransport::new(f.responses.clone()))
    }

    fn intake_form() -> FormDefinition {
        let mut form = FormDefinition::create("Intake");
        form.associate(OrgUnitRef::new("finance"));
        let mut name = FieldDefinition::new("full_name", "Full Name", FieldKind::Text);
        name.required = true;
        form.add_field(name);
        form.add_field(FieldDefinition::new("photo", "Photo", FieldKind::defaults_for(crate::FieldType::File)));
        form
    }

    fn fill(form: FormDefinition) -> FillSession {
        FillSession::new(form, Arc::new(TrackingPreviewProvider::new()))
    }

    #[tokio::test]
    async fn test_save_resolves_org_unit_and_publishes_events() {
        let f = fixture();
        let mut form = intake_form();
        let id = f.form_service.save_form(&mut form).await.unwrap();

        assert_eq!(&id, form.id());
        assert_eq!(form.org_unit().and_then(|o| o.name.as_deref()), Some("Finance"));

        let stored = f.form_service.load_form(&id).await.unwrap();
        assert_eq!(stored.fields().len(), 2);

        let published = f.events.events();
        assert!(published.iter().any(|e| e.event_type() == "form.created"));
        assert!(published.iter().any(|e| e.event_type() == "form.saved"));
        assert!(form.take_events().is_empty());
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_forms() {
        let f = fixture();

        let mut untitled = intake_form();
        untitled.set_title("");
        let err = f.form_service.save_form(&mut untitled).await.unwrap_err();
        assert_eq!(err, UseCaseError::Validation(ValidationError::form("Form title is required")));

        let mut unknown_unit = intake_form();
        unknown_unit.associate(OrgUnitRef::new("legal"));
        assert!(matches!(
            f.form_service.save_form(&mut unknown_unit).await,
            Err(UseCaseError::Validation(_))
        ));
        assert!(f.form_service.list_forms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_share_requires_published_form() {
        let f = fixture();
        let mut form = intake_form();
        f.form_service.save_form(&mut form).await.unwrap();
        assert!(matches!(f.form_service.share_link(&form), Err(UseCaseError::Domain(_))));

        f.form_service.publish_form(&mut form).await.unwrap();
        let link = f.form_service.share_link(&form).unwrap();
        assert_eq!(link, format!("http://localhost:8080/forms/{}/fill", form.id()));
        assert_eq!(f.clipboard.last().as_deref(), Some(link.as_str()));

        let listed = f.form_service.list_forms().await.unwrap();
        assert_eq!(listed[0].status, crate::FormStatus::Published);
    }

    #[tokio::test]
    async fn test_delete_unknown_form() {
        let f = fixture();
        assert!(matches!(
            f.form_service.delete_form(&FormId::new()).await,
            Err(UseCaseError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_blocked_by_validation_makes_no_call() {
        let f = fixture();
        let service = response_service(&f, local_transport(&f));
        let session = fill(intake_form());

        let err = service.submit(&session, &NoProgress).await.unwrap_err();
        assert_eq!(err.to_string(), "validation error: Full Name is required");
        assert!(f.responses.list_by_form(session.form().id()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_snapshots_values_and_reports_progress() {
        let f = fixture();
        let service = response_service(&f, local_transport(&f));
        let mut session = fill(intake_form());
        let name = session.form().fields()[0].id.clone();
        let photo = session.form().fields()[1].id.clone();

        session.set(&name, FieldInput::Text("Ada".into())).unwrap();
        session.attach(&photo, vec![FileHandle::new("me.png", "image/png", 2048)]).unwrap();

        let progress = ProgressLog::default();
        let response = service.submit(&session, &progress).await.unwrap();

        assert_eq!(response.value("full_name"), Some(&FieldValue::Text("Ada".into())));
        assert_eq!(response.attachments().len(), 1);
        assert_eq!(progress.0.lock().last(), Some(&(2048, 2048)));

        session.set(&name, FieldInput::Text("Grace".into())).unwrap();
        let stored = service.list_responses(session.form().id()).await.unwrap();
        assert_eq!(stored[0].value("full_name"), Some(&FieldValue::Text("Ada".into())));
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_session_intact() {
        let f = fixture();
        let service = response_service(&f, Arc::new(FailingTransport));
        let mut session = fill(intake_form());
        let name = session.form().fields()[0].id.clone();
        session.set(&name, FieldInput::Text("Ada".into())).unwrap();
        let before = session.values().clone();

        let err = service.submit(&session, &NoProgress).await.unwrap_err();
        assert!(matches!(err, UseCaseError::Transport(_)));
        assert_eq!(session.values(), &before);
    }

    #[tokio::test]
    async fn test_export_saves_returned_file() {
        let f = fixture();
        let mut form = intake_form();
        f.form_service.save_form(&mut form).await.unwrap();

        let service = response_service(&f, local_transport(&f));
        let mut session = fill(form.clone());
        let name = form.fields()[0].id.clone();
        session.set(&name, FieldInput::Text("Ada".into())).unwrap();
        service.submit(&session, &NoProgress).await.unwrap();

        let sink = MemoryExportSink::new();
        let location = service.export_responses(form.id(), &sink).await.unwrap();
        let files: Vec<ExportFile> = sink.files();

        assert_eq!(location, files[0].file_name);
        let text = String::from_utf8(files[0].bytes.clone()).unwrap();
        assert!(text.starts_with("Full Name,Photo"));
        assert!(text.contains("Ada"));

        assert!(matches!(
            service.export_responses(&FormId::new(), &sink).await,
            Err(UseCaseError::NotFound(_))
        ));
    }
}
