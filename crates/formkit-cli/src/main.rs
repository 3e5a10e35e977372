//! FormKit CLI
//!
//! Author, fill, and export forms against a local JSON store.
//!
//! # Usage
//!
//! ```bash
//! formkit types
//! formkit form new --title "Onboarding" --org general
//! formkit form template <FORM_ID> feedback-survey --yes
//! formkit field add <FORM_ID> range
//! formkit field update <FORM_ID> field_1 --set max=20 --set required=true
//! formkit response submit <FORM_ID> --values answers.json
//! formkit response export <FORM_ID> --out exports/ --format json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use formkit::FieldType;

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "formkit")]
#[command(version)]
#[command(about = "Build, fill, and export dynamic forms", long_about = None)]
struct Cli {
    /// Directory holding forms and responses
    #[arg(long, env = "FORMKIT_STORE")]
    store: Option<PathBuf>,

    /// Profile name from config file
    #[arg(long, short)]
    profile: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    format: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List field types grouped by category
    Types,
    /// List form templates
    Templates,
    /// Manage forms
    Form {
        #[command(subcommand)]
        action: FormCommands,
    },
    /// Edit the fields of a form
    Field {
        #[command(subcommand)]
        action: FieldCommands,
    },
    /// Submit, list, and export responses
    Response {
        #[command(subcommand)]
        action: ResponseCommands,
    },
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum FormCommands {
    /// Create a draft form
    New {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Organizational unit id
        #[arg(long)]
        org: Option<String>,
    },
    /// Change form metadata
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        org: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Presentation theme name
        #[arg(long)]
        theme: Option<String>,
        /// Add a tag (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// Remove a tag (repeatable)
        #[arg(long = "untag", value_name = "TAG")]
        untag: Vec<String>,
    },
    /// Show a form and its fields
    Show { id: String },
    /// List stored forms
    List,
    /// Delete a form
    Delete { id: String },
    /// Replace all fields with a template's
    Template {
        id: String,
        template: String,
        /// Discard existing fields without asking
        #[arg(long)]
        yes: bool,
    },
    /// Validate and publish a form
    Publish { id: String },
    /// Return a published form to draft
    Unpublish { id: String },
    /// Print the public fill-out link of a published form
    Share { id: String },
    /// List organizational units
    Orgs,
}

#[derive(Subcommand)]
enum FieldCommands {
    /// Append a field of the given type
    Add { form: String, field_type: FieldType },
    /// Change field properties
    Update {
        form: String,
        /// Field id or name
        field: String,
        /// Property assignment, e.g. `max=20` or `options=["A","B"]`
        #[arg(long = "set", value_name = "KEY=VALUE", required = true)]
        set: Vec<String>,
    },
    /// Remove a field
    Remove { form: String, field: String },
    /// Move the field at FROM to position TO
    Move { form: String, from: usize, to: usize },
    /// Copy a field right after the original
    Duplicate { form: String, field: String },
}

#[derive(Subcommand)]
enum ResponseCommands {
    /// Fill and submit a form from a JSON file of answers keyed by field name
    Submit {
        form: String,
        #[arg(long)]
        values: PathBuf,
    },
    /// List stored responses
    List { form: String },
    /// Export responses as a delimited file
    Export {
        form: String,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a default configuration file
    Init,
    /// Print the active configuration
    Show,
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match config::Config::load(cli.profile.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {}, using defaults", e);
            config::Config::default()
        }
    };
    init_tracing(&config.forms.log_level);

    let store_dir = cli.store.clone().unwrap_or_else(|| config.store_dir());
    let ctx = commands::Context::new(store_dir, config, cli.format);

    let result = match cli.command {
        Commands::Types => commands::catalog::types(&ctx),
        Commands::Templates => commands::catalog::templates(&ctx),
        Commands::Form { action } => commands::forms::handle(action, &ctx).await,
        Commands::Field { action } => commands::fields::handle(action, &ctx).await,
        Commands::Response { action } => commands::responses::handle(action, &ctx).await,
        Commands::Config { action } => commands::config::handle(action, cli.profile.as_deref(), &ctx),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", colored::Colorize::red("Error:"), e);
        std::process::exit(1);
    }
}
