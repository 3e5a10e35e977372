//! Field type and template listings

use serde::Serialize;
use tabled::Tabled;

use formkit::{FieldCategory, TemplateCatalog};

use super::Context;

#[derive(Debug, Serialize, Tabled)]
pub struct TypeRow {
    pub category: &'static str,
    #[serde(rename = "type")]
    #[tabled(rename = "type")]
    pub field_type: String,
    pub label: &'static str,
}

#[derive(Debug, Serialize, Tabled)]
pub struct TemplateRow {
    pub id: String,
    pub title: String,
    pub category: String,
    pub fields: usize,
}

pub fn type_rows() -> Vec<TypeRow> {
    FieldCategory::ALL
        .iter()
        .flat_map(|category| {
            category.types().into_iter().map(move |t| TypeRow {
                category: category.label(),
                field_type: t.to_string(),
                label: t.label(),
            })
        })
        .collect()
}

pub fn types(ctx: &Context) -> anyhow::Result<()> {
    ctx.format.print_rows(&type_rows());
    Ok(())
}

pub fn templates(ctx: &Context) -> anyhow::Result<()> {
    let rows: Vec<TemplateRow> = TemplateCatalog::builtin()
        .list()
        .iter()
        .map(|t| TemplateRow {
            id: t.id.clone(),
            title: t.title.clone(),
            category: t.category.clone(),
            fields: t.fields.len(),
        })
        .collect();
    ctx.format.print_rows(&rows);
    Ok(())
}
