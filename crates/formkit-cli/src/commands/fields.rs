//! Field commands

use anyhow::{anyhow, Context as _};
use serde_json::{Map, Value};

use formkit::FieldPatch;

use super::{resolve_field, Context};
use crate::commands::forms::print_form;
use crate::output;
use crate::FieldCommands;

/// Parse `key=value` assignments into a JSON patch object.
///
/// Values are read as JSON when they parse (`20`, `true`, `["A","B"]`) and
/// as plain strings otherwise.
pub fn parse_assignments(assignments: &[String]) -> anyhow::Result<Map<String, Value>> {
    let mut object = Map::new();
    for assignment in assignments {
        let (key, raw) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got `{}`", assignment))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        object.insert(key.trim().to_string(), value);
    }
    Ok(object)
}

pub async fn handle(action: FieldCommands, ctx: &Context) -> anyhow::Result<()> {
    match action {
        FieldCommands::Add { form, field_type } => {
            let mut builder = ctx.load_builder(&form).await?;
            let added = builder.add_field(field_type).clone();
            let mut form = builder.into_form();
            ctx.save_draft(&mut form).await?;
            output::success(ctx.format, format!("Added {} `{}` ({})", field_type.label(), added.name, added.id));
            print_form(&form, ctx.format);
        }
        FieldCommands::Update { form, field, set } => {
            let mut builder = ctx.load_builder(&form).await?;
            let id = resolve_field(builder.form(), &field)?.id.clone();
            let patch = FieldPatch::from_json(&parse_assignments(&set)?)?;
            builder
                .update_field(&id, patch)
                .with_context(|| format!("cannot update `{}`", field))?;
            let mut form = builder.into_form();
            ctx.save_draft(&mut form).await?;
            print_form(&form, ctx.format);
        }
        FieldCommands::Remove { form, field } => {
            let mut builder = ctx.load_builder(&form).await?;
            let id = resolve_field(builder.form(), &field)?.id.clone();
            let removed = builder.remove_field(&id)?;
            let mut form = builder.into_form();
            ctx.save_draft(&mut form).await?;
            output::success(ctx.format, format!("Removed `{}`", removed.name));
            print_form(&form, ctx.format);
        }
        FieldCommands::Move { form, from, to } => {
            let mut builder = ctx.load_builder(&form).await?;
            builder.begin_drag(from);
            builder.drag_over(to);
            builder.end_drag()?;
            let mut form = builder.into_form();
            ctx.save_draft(&mut form).await?;
            print_form(&form, ctx.format);
        }
        FieldCommands::Duplicate { form, field } => {
            let mut builder = ctx.load_builder(&form).await?;
            let id = resolve_field(builder.form(), &field)?.id.clone();
            let copy = builder.duplicate_field(&id)?.name.clone();
            let mut form = builder.into_form();
            ctx.save_draft(&mut form).await?;
            output::success(ctx.format, format!("Duplicated `{}` as `{}`", field, copy));
            print_form(&form, ctx.format);
        }
    }
    Ok(())
}
