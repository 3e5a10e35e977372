//! Local transport, export sinks, and clipboard
//!
//! Stand-ins for the remote collaborators so forms can be filled and
//! exported without a server.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;

use crate::application::dto::{ExportFile, SubmissionBundle, SubmissionReceipt};
use crate::ports::outbound::{
    Clipboard, ExportSink, ResponseRepository, SubmissionTransport, TransportError, UploadProgress,
};

/// Stores submissions straight into a response repository
pub struct LocalSubmissionTransport {
    responses: Arc<dyn ResponseRepository>,
    attachment_dir: Option<PathBuf>,
}

impl LocalSubmissionTransport {
    pub fn new(responses: Arc<dyn ResponseRepository>) -> Self {
        Self { responses, attachment_dir: None }
    }

    /// Copy attached files with a local path under `dir/<response id>/`
    pub fn with_attachment_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.attachment_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl SubmissionTransport for LocalSubmissionTransport {
    async fn submit(
        &self,
        bundle: &SubmissionBundle,
        progress: &dyn UploadProgress,
    ) -> Result<SubmissionReceipt, TransportError> {
        let total = bundle.upload_size();
        let mut sent = 0;
        progress.on_progress(sent, total);

        for file in &bundle.attachments {
            if let (Some(dir), Some(source)) = (&self.attachment_dir, &file.path) {
                let target_dir = dir.join(bundle.response_id.as_str());
                fs::create_dir_all(&target_dir).await?;
                let target = target_dir.join(format!("{}-{}", file.id, file.file_name));
                fs::copy(source, &target).await.map_err(|e| {
                    TransportError::Upload(format!("{}: {}", file.file_name, e))
                })?;
            }
            sent += file.size_bytes;
            progress.on_progress(sent, total);
        }

        self.responses.create(&bundle.clone().into_response()).await?;
        tracing::debug!(response_id = %bundle.response_id, bytes = sent, "submission stored");

        Ok(SubmissionReceipt { response_id: bundle.response_id.clone(), uploaded_bytes: sent })
    }
}

/// Writes exports into a directory
pub struct FileExportSink {
    dir: PathBuf,
}

impl FileExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ExportSink for FileExportSink {
    async fn save(&self, file: &ExportFile) -> Result<String, TransportError> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&file.file_name);
        fs::write(&path, &file.bytes).await?;
        Ok(path.display().to_string())
    }
}

/// Keeps exports in memory (for testing)
#[derive(Default)]
pub struct MemoryExportSink {
    files: Mutex<Vec<ExportFile>>,
}

impl MemoryExportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> Vec<ExportFile> {
        self.files.lock().clone()
    }
}

#[async_trait]
impl ExportSink for MemoryExportSink {
    async fn save(&self, file: &ExportFile) -> Result<String, TransportError> {
        self.files.lock().push(file.clone());
        Ok(file.file_name.clone())
    }
}

/// Remembers copied text instead of touching a system clipboard
#[derive(Default)]
pub struct RecordingClipboard {
    copied: Mutex<Vec<String>>,
}

impl RecordingClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<String> {
        self.copied.lock().last().cloned()
    }
}

impl Clipboard for RecordingClipboard {
    fn copy(&self, text: &str) -> Result<(), TransportError> {
        self.copied.lock().push(text.to_string());
        Ok(())
    }
}

/// Logs copied text; for terminals with no system clipboard
pub struct LoggingClipboard;

impl Clipboard for LoggingClipboard {
    fn copy(&self, text: &str) -> Result<(), TransportError> {
        tracing::info!(text, "copied to clipboard");
        Ok(())
    }
}
