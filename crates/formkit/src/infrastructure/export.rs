//! Delimited export of a response set

use async_trait::async_trait;

use crate::application::dto::{ExportFile, ExportOptions};
use crate::domain::aggregates::{FormDefinition, FormResponse};
use crate::ports::outbound::{RepositoryError, ResponseExporter};

/// One column per field in declaration order, headed by its label
#[derive(Default)]
pub struct CsvResponseExporter;

impl CsvResponseExporter {
    pub fn new() -> Self {
        Self
    }

    fn encode(
        form: &FormDefinition,
        responses: &[FormResponse],
        delimiter: u8,
    ) -> Result<Vec<u8>, csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        writer.write_record(form.fields().iter().map(|f| f.label.as_str()))?;
        for response in responses {
            writer.write_record(form.fields().iter().map(|f| {
                response.value(&f.name).map(|v| v.to_cell()).unwrap_or_default()
            }))?;
        }
        writer.into_inner().map_err(|e| e.into_error().into())
    }
}

#[async_trait]
impl ResponseExporter for CsvResponseExporter {
    async fn export(
        &self,
        form: &FormDefinition,
        responses: &[FormResponse],
        options: &ExportOptions,
    ) -> Result<ExportFile, RepositoryError> {
        let delimiter = u8::try_from(options.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                RepositoryError::SerializationError(format!("delimiter `{}` is not ASCII", options.delimiter))
            })?;

        let bytes = Self::encode(form, responses, delimiter)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        Ok(ExportFile {
            file_name: format!("{}-{}.csv", options.file_prefix, form.id()),
            content_type: "text/csv".to_string(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{AddressValue, FieldDefinition, FieldKind, FieldValue, FileHandle};
    use std::collections::BTreeMap;

    fn form() -> FormDefinition {
        let mut form = FormDefinition::create("Registration");
        form.add_field(FieldDefinition::new("name", "Name", FieldKind::Text));
        form.add_field(FieldDefinition::new("home", "Home, Address", FieldKind::Address));
        form.add_field(FieldDefinition::new("docs", "Documents", FieldKind::File(Default::default())));
        form
    }

    fn response(form: &FormDefinition) -> FormResponse {
        let mut values = BTreeMap::new();
        values.insert("name".to_string(), FieldValue::Text("Ada".into()));
        values.insert(
            "home".to_string(),
            FieldValue::Address(AddressValue {
                street: Some("1 Main St".into()),
                city: Some("Springfield".into()),
                ..Default::default()
            }),
        );
        values.insert(
            "docs".to_string(),
            FieldValue::Files(vec![
                FileHandle::new("a.pdf", "application/pdf", 1),
                FileHandle::new("b.pdf", "application/pdf", 1),
            ]),
        );
        FormResponse::create(form.id().clone(), values, vec![])
    }

    #[tokio::test]
    async fn test_columns_follow_field_order() {
        let form = form();
        let file = CsvResponseExporter::new()
            .export(&form, &[response(&form)], &ExportOptions::default())
            .await
            .unwrap();

        let text = String::from_utf8(file.bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Name,\"Home, Address\",Documents");
        assert_eq!(lines[1], "Ada,\"1 Main St, Springfield\",a.pdf; b.pdf");
        assert_eq!(file.file_name, format!("responses-{}.csv", form.id()));
    }

    #[tokio::test]
    async fn test_custom_delimiter_and_missing_values() {
        let form = form();
        let bare = FormResponse::create(form.id().clone(), BTreeMap::new(), vec![]);
        let options = ExportOptions { delimiter: ';', file_prefix: "export".into() };

        let file = CsvResponseExporter::new().export(&form, &[bare], &options).await.unwrap();
        let text = String::from_utf8(file.bytes).unwrap();
        assert_eq!(text.lines().nth(1), Some(";;"));
    }

    #[tokio::test]
    async fn test_non_ascii_delimiter_rejected() {
        let form = form();
        let options = ExportOptions { delimiter: '§', file_prefix: "export".into() };
        assert!(CsvResponseExporter::new().export(&form, &[], &options).await.is_err());
    }
}
