//! Infrastructure layer
//!
//! Concrete implementations of the outbound ports.

pub mod export;
pub mod persistence;
pub mod preview;
pub mod transport;

pub use export::CsvResponseExporter;
pub use persistence::*;
pub use preview::TrackingPreviewProvider;
pub use transport::{
    FileExportSink, LocalSubmissionTransport, LoggingClipboard, MemoryExportSink, RecordingClipboard,
};
