//! Repository implementations

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::{
    InMemoryFormRepository, InMemoryResponseRepository, LoggingEventPublisher, NoOpEventPublisher,
    RecordingEventPublisher, StaticOrgUnitDirectory,
};
