//! Response commands

use anyhow::{anyhow, bail, Context as _};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tabled::Tabled;

use formkit::infrastructure::{FileExportSink, TrackingPreviewProvider};
use formkit::ports::outbound::UploadProgress;
use formkit::{FieldKind, FileHandle, FillSession, FormResponse, ResponseUseCases};

use super::Context;
use crate::output;
use crate::ResponseCommands;

#[derive(Debug, Serialize, Tabled)]
pub struct ResponseRow {
    pub id: String,
    pub submitted: String,
    pub answers: usize,
    pub files: usize,
}

impl From<&FormResponse> for ResponseRow {
    fn from(response: &FormResponse) -> Self {
        Self {
            id: response.id().to_string(),
            submitted: response.created_at().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            answers: response.values().values().filter(|v| !v.is_empty()).count(),
            files: response.attachments().len(),
        }
    }
}

/// Upload progress on stderr
struct StderrProgress;

impl UploadProgress for StderrProgress {
    fn on_progress(&self, sent: u64, total: u64) {
        if total > 0 {
            eprintln!("uploaded {}/{} bytes ({}%)", sent, total, sent * 100 / total);
        }
    }
}

/// Guess a MIME type from the file extension
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

fn file_handle(path: &Path) -> anyhow::Result<FileHandle> {
    let metadata = std::fs::metadata(path).with_context(|| format!("cannot read {}", path.display()))?;
    if !metadata.is_file() {
        bail!("{} is not a file", path.display());
    }
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("{} has no usable file name", path.display()))?;
    Ok(FileHandle::new(file_name, content_type_for(path), metadata.len()).with_path(path.display().to_string()))
}

/// Fill a session from a JSON object of answers keyed by field name.
///
/// File fields take a path or a list of paths, resolved against `base`.
pub fn fill_from_json(session: &mut FillSession, answers: &Value, base: &Path) -> anyhow::Result<()> {
    let answers = answers
        .as_object()
        .ok_or_else(|| anyhow!("answers must be a JSON object keyed by field name"))?;

    for (name, value) in answers {
        let field = session
            .form()
            .fields()
            .iter()
            .find(|f| &f.name == name)
            .cloned()
            .ok_or_else(|| anyhow!("form has no field named `{}`", name))?;

        if matches!(field.kind(), FieldKind::File(_)) {
            let paths: Vec<&str> = match value {
                Value::String(p) => vec![p.as_str()],
                Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
                Value::Null => vec![],
                _ => bail!("`{}` expects a file path or a list of paths", name),
            };
            let handles = paths
                .into_iter()
                .map(|p| file_handle(&base.join(p)))
                .collect::<anyhow::Result<Vec<_>>>()?;
            if !handles.is_empty() {
                session.attach(&field.id, handles)?;
            }
        } else {
            session
                .set_json(name, value)
                .with_context(|| format!("invalid answer for `{}`", name))?;
        }
    }
    Ok(())
}

pub async fn handle(action: ResponseCommands, ctx: &Context) -> anyhow::Result<()> {
    let service = ctx.response_service();

    match action {
        ResponseCommands::Submit { form, values } => {
            let form = ctx.load_form(&form).await?;
            if !form.is_published() {
                output::notice(format!("form {} is not published", form.id()));
            }
            let content = std::fs::read_to_string(&values)
                .with_context(|| format!("cannot read {}", values.display()))?;
            let answers: Value = serde_json::from_str(&content)?;
            let base = values.parent().unwrap_or_else(|| Path::new("."));

            let mut session = FillSession::new(form, Arc::new(TrackingPreviewProvider::new()));
            fill_from_json(&mut session, &answers, base)?;

            let response = service.submit(&session, &StderrProgress).await?;
            session.reset();
            output::success(ctx.format, format!("Stored response {}", response.id()));
            if !ctx.format.is_table() {
                ctx.format.print(&response);
            }
        }
        ResponseCommands::List { form } => {
            let form = ctx.load_form(&form).await?;
            let responses = service.list_responses(form.id()).await?;
            if ctx.format.is_table() {
                let rows: Vec<ResponseRow> = responses.iter().map(ResponseRow::from).collect();
                ctx.format.print_rows(&rows);
            } else {
                ctx.format.print(&responses);
            }
        }
        ResponseCommands::Export { form, out } => {
            let form = ctx.load_form(&form).await?;
            let sink = FileExportSink::new(out);
            let location = service.export_responses(form.id(), &sink).await?;
            output::success(ctx.format, format!("Exported responses to {}", location));
            if !ctx.format.is_table() {
                ctx.format.print(&serde_json::json!({ "formId": form.id(), "path": location }));
            }
        }
    }
    Ok(())
}
