//! In-memory repositories, org unit directory, and event publishers

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::domain::aggregates::{FormDefinition, FormResponse};
use crate::domain::value_objects::{FormId, OrgUnitRef};
use crate::domain::DomainEvent;
use crate::ports::outbound::{
    EventPublisher, FormRepository, OrgUnitDirectory, RepositoryError, ResponseRepository,
};

/// In-memory form repository (for testing)
#[derive(Default)]
pub struct InMemoryFormRepository {
    forms: DashMap<FormId, FormDefinition>,
}

impl InMemoryFormRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FormRepository for InMemoryFormRepository {
    async fn find_by_id(&self, id: &FormId) -> Result<Option<FormDefinition>, RepositoryError> {
        Ok(self.forms.get(id).map(|f| f.value().clone()))
    }

    async fn save(&self, form: &FormDefinition) -> Result<FormId, RepositoryError> {
        self.forms.insert(form.id().clone(), form.clone());
        Ok(form.id().clone())
    }

    async fn delete(&self, id: &FormId) -> Result<(), RepositoryError> {
        self.forms.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    async fn list(&self) -> Result<Vec<FormDefinition>, RepositoryError> {
        Ok(self.forms.iter().map(|f| f.value().clone()).collect())
    }
}

/// In-memory response repository (for testing)
#[derive(Default)]
pub struct InMemoryResponseRepository {
    responses: RwLock<Vec<FormResponse>>,
}

impl InMemoryResponseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResponseRepository for InMemoryResponseRepository {
    async fn list_by_form(&self, form_id: &FormId) -> Result<Vec<FormResponse>, RepositoryError> {
        Ok(self
            .responses
            .read()
            .iter()
            .filter(|r| r.form_id() == form_id)
            .cloned()
            .collect())
    }

    async fn create(&self, response: &FormResponse) -> Result<(), RepositoryError> {
        let mut responses = self.responses.write();
        if responses.iter().any(|r| r.id() == response.id()) {
            return Err(RepositoryError::QueryError(format!("response {} already exists", response.id())));
        }
        responses.push(response.clone());
        Ok(())
    }
}

/// Fixed list of organizational units
#[derive(Default)]
pub struct StaticOrgUnitDirectory {
    units: Vec<OrgUnitRef>,
}

impl StaticOrgUnitDirectory {
    pub fn new(units: Vec<OrgUnitRef>) -> Self {
        Self { units }
    }
}

#[async_trait]
impl OrgUnitDirectory for StaticOrgUnitDirectory {
    async fn resolve(&self, id: &str) -> Result<Option<OrgUnitRef>, RepositoryError> {
        Ok(self.units.iter().find(|u| u.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<OrgUnitRef>, RepositoryError> {
        Ok(self.units.clone())
    }
}

/// No-op event publisher (for testing)
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _events: Vec<DomainEvent>) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Keeps every published event in memory
#[derive(Default)]
pub struct RecordingEventPublisher {
    events: RwLock<Vec<DomainEvent>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.read().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, events: Vec<DomainEvent>) -> Result<(), RepositoryError> {
        for event in &events {
            tracing::debug!(event_type = event.event_type(), form_id = %event.form_id(), "event published");
        }
        self.events.write().extend(events);
        Ok(())
    }
}

/// Writes each event to the log; for hosts with no event bus
pub struct LoggingEventPublisher;

#[async_trait]
impl EventPublisher for LoggingEventPublisher {
    async fn publish(&self, events: Vec<DomainEvent>) -> Result<(), RepositoryError> {
        for event in &events {
            tracing::info!(event_type = event.event_type(), form_id = %event.form_id(), "domain event");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_form_roundtrip() {
        let repo = InMemoryFormRepository::new();
        let form = FormDefinition::create("Survey");
        let id = repo.save(&form).await.unwrap();

        assert_eq!(repo.find_by_id(&id).await.unwrap().unwrap().title(), "Survey");
        assert_eq!(repo.list().await.unwrap().len(), 1);

        repo.delete(&id).await.unwrap();
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
        assert_eq!(repo.delete(&id).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_responses_keep_submission_order() {
        let repo = InMemoryResponseRepository::new();
        let form_id = FormId::new();
        let first = FormResponse::create(form_id.clone(), BTreeMap::new(), vec![]);
        let second = FormResponse::create(form_id.clone(), BTreeMap::new(), vec![]);
        let other = FormResponse::create(FormId::new(), BTreeMap::new(), vec![]);

        for r in [&first, &second, &other] {
            repo.create(r).await.unwrap();
        }
        assert!(repo.create(&first).await.is_err());

        let listed = repo.list_by_form(&form_id).await.unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn test_logging_publisher_accepts_events() {
        let mut form = FormDefinition::create("Survey");
        assert!(LoggingEventPublisher.publish(form.take_events()).await.is_ok());
        assert!(LoggingEventPublisher.publish(vec![]).await.is_ok());
    }

    #[tokio::test]
    async fn test_org_unit_lookup() {
        let directory = StaticOrgUnitDirectory::new(vec![OrgUnitRef::new("hr").with_name("HR")]);
        assert_eq!(directory.resolve("hr").await.unwrap().unwrap().name.as_deref(), Some("HR"));
        assert!(directory.resolve("it").await.unwrap().is_none());
    }
}
