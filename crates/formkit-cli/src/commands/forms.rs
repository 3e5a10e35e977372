//! Form commands

use anyhow::bail;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use tabled::Tabled;

use formkit::application::FormSummary;
use formkit::ports::outbound::{AlwaysOverwrite, OverwriteConfirmation};
use formkit::{
    FieldDefinition, FormBuilder, FormDefinition, FormId, FormUseCases, OrgUnitRef, Template, TemplateCatalog,
    TemplateOutcome,
};

use super::Context;
use crate::output::{self, OutputFormat};
use crate::FormCommands;

#[derive(Debug, Serialize, Tabled)]
pub struct FormRow {
    pub id: String,
    pub title: String,
    pub status: String,
    pub fields: usize,
}

impl From<FormSummary> for FormRow {
    fn from(summary: FormSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            title: summary.title,
            status: format!("{:?}", summary.status).to_lowercase(),
            fields: summary.field_count,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct FieldRow {
    #[tabled(rename = "#")]
    pub position: usize,
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    #[tabled(rename = "type")]
    pub field_type: String,
    pub required: bool,
    pub id: String,
}

impl FieldRow {
    pub fn new(position: usize, field: &FieldDefinition) -> Self {
        Self {
            position,
            name: field.name.clone(),
            label: field.label.clone(),
            field_type: field.field_type().to_string(),
            required: field.required,
            id: field.id.to_string(),
        }
    }
}

pub fn print_form(form: &FormDefinition, format: OutputFormat) {
    if !format.is_table() {
        format.print(form);
        return;
    }
    println!("{} ({})", form.title(), form.id());
    if !form.description().is_empty() {
        println!("{}", form.description());
    }
    let org = form
        .org_unit()
        .map(|o| o.name.clone().unwrap_or_else(|| o.id.clone()))
        .unwrap_or_else(|| "(none)".into());
    println!("status: {:?}  org unit: {}", form.status(), org);
    if !form.tags().is_empty() {
        println!("tags: {}", form.tags().join(", "));
    }
    if let Some(theme) = form.theme() {
        println!("theme: {}", theme);
    }
    let rows: Vec<FieldRow> = form.fields().iter().enumerate().map(|(i, f)| FieldRow::new(i, f)).collect();
    format.print_rows(&rows);
}

/// Asks on the terminal before a template discards fields
struct PromptOverwrite;

impl OverwriteConfirmation for PromptOverwrite {
    fn confirm_overwrite(&self, form: &FormDefinition, template: &Template) -> bool {
        print!(
            "Applying `{}` discards the {} field(s) of \"{}\". Continue? [y/N] ",
            template.id,
            form.fields().len(),
            form.title()
        );
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
            Err(_) => false,
        }
    }
}

pub async fn handle(action: FormCommands, ctx: &Context) -> anyhow::Result<()> {
    let service = ctx.form_service();

    match action {
        FormCommands::New { title, description, org } => {
            let mut builder = FormBuilder::start_new(title);
            if let Some(description) = description {
                builder.form_mut().set_description(description);
            }
            if let Some(org) = org {
                builder.form_mut().associate(OrgUnitRef::new(org));
            }
            let mut form = builder.into_form();
            ctx.save_draft(&mut form).await?;
            output::success(ctx.format, format!("Created form {}", form.id()));
            print_form(&form, ctx.format);
        }
        FormCommands::Edit { id, title, description, org, category, theme, tags, untag } => {
            let mut form = ctx.load_form(&id).await?;
            if let Some(title) = title {
                form.set_title(title);
            }
            if let Some(description) = description {
                form.set_description(description);
            }
            if let Some(org) = org {
                form.associate(OrgUnitRef::new(org));
            }
            if let Some(category) = category {
                form.set_category(Some(category));
            }
            if let Some(theme) = theme {
                form.set_theme(Some(theme).filter(|t| !t.is_empty()));
            }
            for tag in tags {
                form.add_tag(tag);
            }
            for tag in &untag {
                form.remove_tag(tag);
            }
            ctx.save_draft(&mut form).await?;
            print_form(&form, ctx.format);
        }
        FormCommands::Show { id } => {
            let form = ctx.load_form(&id).await?;
            print_form(&form, ctx.format);
        }
        FormCommands::List => {
            let rows: Vec<FormRow> = service.list_forms().await?.into_iter().map(FormRow::from).collect();
            ctx.format.print_rows(&rows);
        }
        FormCommands::Delete { id } => {
            service.delete_form(&FormId::from_string(&id)).await?;
            output::success(ctx.format, format!("Deleted form {}", id));
        }
        FormCommands::Template { id, template, yes } => {
            let mut builder = ctx.load_builder(&id).await?;
            let confirm: &dyn OverwriteConfirmation = if yes { &AlwaysOverwrite } else { &PromptOverwrite };
            match builder.apply_template_by_id(&TemplateCatalog::builtin(), &template, confirm)? {
                TemplateOutcome::Declined => bail!("template not applied"),
                TemplateOutcome::Applied { added, discarded } => {
                    let mut form = builder.into_form();
                    ctx.save_draft(&mut form).await?;
                    output::success(
                        ctx.format,
                        format!("Applied `{}`: {} field(s) added, {} discarded", template, added, discarded),
                    );
                    print_form(&form, ctx.format);
                }
            }
        }
        FormCommands::Publish { id } => {
            let mut form = ctx.load_form(&id).await?;
            service.publish_form(&mut form).await?;
            output::success(ctx.format, format!("Published form {}", form.id()));
            print_form(&form, ctx.format);
        }
        FormCommands::Unpublish { id } => {
            let mut form = ctx.load_form(&id).await?;
            form.unpublish();
            ctx.save_draft(&mut form).await?;
            output::success(ctx.format, format!("Form {} is a draft again", form.id()));
        }
        FormCommands::Share { id } => {
            let form = ctx.load_form(&id).await?;
            let link = service.share_link(&form)?;
            if ctx.format.is_table() {
                println!("{}", link);
            } else {
                ctx.format.print(&serde_json::json!({ "formId": form.id(), "link": link }));
            }
        }
        FormCommands::Orgs => {
            ctx.format.print(&service.list_org_units().await?);
        }
    }
    Ok(())
}
