//! # Cruddy CLI
//!
//! Command-line interface for inspecting a directory of cruddy entity
//! definitions without running the admin panel.
//!
//! ## Commands
//!
//! - `show` - Print an entity as the JSON the UI layer receives
//! - `check` - Resolve every entity and report configuration errors
//! - `listing` - Print the SQL of an entity listing
//! - `form` - Print the model and validation rules of an entity form
//!

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use cruddy_core::{Arrayable, SortDirection};
use cruddy_entity::{ConfigRepository, Container, EntityFactory};
use cruddy_schema::Catalog;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "cruddy",
    version,
    about = "Inspect cruddy entity definitions",
    long_about = "Resolve, check and render the entities defined in a directory holding one {id}.toml or {id}.json file per entity."
)]
pub struct Cli {
    /// Directory of entity definitions
    #[arg(
        long,
        short = 'e',
        env = "CRUDDY_ENTITIES",
        default_value = "entities",
        global = true
    )]
    pub entities: PathBuf,

    /// Translation catalog (.toml or .json)
    #[arg(long, short = 'l', global = true)]
    pub lang: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print an entity as JSON
    Show {
        /// Entity id
        id: String,

        /// Print on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Resolve every entity and report problems
    Check,

    /// Print the SQL of an entity listing and its eager-loaded relations
    Listing {
        /// Entity id
        id: String,

        /// Column to order by instead of the configured default
        #[arg(long)]
        order: Option<String>,

        /// Sort descending
        #[arg(long, requires = "order")]
        desc: bool,
    },

    /// Print the model and validation rules of an entity form
    Form {
        /// Entity id
        id: String,
    },
}

// ============================================================================
// Commands
// ============================================================================

/// Run a parsed command line, writing results to `out`
pub fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let factory = build_factory(cli)?;

    match &cli.command {
        Command::Show { id, compact } => {
            let entity = factory.resolve(id)?;
            writeln!(out, "{}", entity.to_json_string(!*compact)?)?;
        }
        Command::Check => check(&factory, out)?,
        Command::Listing { id, order, desc } => {
            let entity = factory.resolve(id)?;
            let direction = if *desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            let order = order.as_deref().map(|column| (column, direction));
            let query = factory.listing_query(&entity, order)?;
            writeln!(out, "{}", query.to_sql())?;
            if !query.eager_loads().is_empty() {
                writeln!(out, "with: {}", query.eager_loads().join(", "))?;
            }
        }
        Command::Form { id } => {
            let entity = factory.resolve(id)?;
            let form = entity.form(&factory)?;
            let model = form.model();
            writeln!(out, "model: {} (table {})", model.class(), model.table())?;
            for (attribute, rules) in form.validator().rules() {
                let rules: Vec<String> = rules.iter().map(ToString::to_string).collect();
                writeln!(out, "  {}: {}", attribute, rules.join("|"))?;
            }
        }
    }

    Ok(())
}

fn build_factory(cli: &Cli) -> anyhow::Result<EntityFactory> {
    let config = ConfigRepository::from_entities_dir(&cli.entities).with_context(|| {
        format!(
            "failed to load entities from {}",
            cli.entities.display()
        )
    })?;
    tracing::debug!("Loaded entity definitions from {}", cli.entities.display());

    let container = Container::new().with_model_autoload();
    let mut factory = EntityFactory::new(Arc::new(config), Arc::new(container));

    if let Some(lang) = &cli.lang {
        let catalog = Catalog::load(lang)
            .with_context(|| format!("failed to load translations from {}", lang.display()))?;
        factory = factory.with_translator(Arc::new(catalog));
    }

    Ok(factory)
}

fn check(factory: &EntityFactory, out: &mut impl Write) -> anyhow::Result<()> {
    let ids = factory.ids();
    let mut failed = 0;

    for id in &ids {
        let result = factory.resolve(id).and_then(|entity| {
            if factory.config(&format!("{}.form", id)).is_some() {
                entity.form(factory)?;
            }
            Ok(entity)
        });

        match result {
            Ok(entity) => writeln!(
                out,
                "{} {} ({} fields, {} columns, {} related)",
                "ok".green().bold(),
                id,
                entity.fields().len(),
                entity.columns().len(),
                entity.related().len()
            )?,
            Err(e) => {
                failed += 1;
                writeln!(out, "{} {}: {}", "error".red().bold(), id, e)?;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} entities failed", failed, ids.len());
    }
    writeln!(out, "{} entities ok", ids.len())?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
