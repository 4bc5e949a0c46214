//! `list` — print the merged catalog.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::bootstrap::Catalog;
use crate::output::{self, OutputFormat};
use catalog_core::error::AppError;
use catalog_entity::CatalogEntity;

/// Arguments for the list command
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Apply the catalog filters (hides disabled entities)
    #[arg(long)]
    pub filtered: bool,

    /// Only entities of this kind
    #[arg(short, long)]
    pub kind: Option<String>,
}

/// Entity display row
#[derive(Debug, Serialize, Tabled)]
struct EntityRow {
    /// Entity uid
    uid: String,
    /// Display name
    name: String,
    /// Kind
    kind: String,
    /// Status phase
    phase: String,
    /// Contributing source
    source: String,
}

impl EntityRow {
    fn from_entity(entity: &dyn CatalogEntity) -> Self {
        let core = entity.core();
        Self {
            uid: entity.get_id().to_string(),
            name: entity.get_name(),
            kind: entity.kind().to_string(),
            phase: core.phase(),
            source: core.source().unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Execute the list command
pub fn execute(args: &ListArgs, catalog: &Catalog, format: OutputFormat) -> Result<(), AppError> {
    let entities = if args.filtered {
        catalog.entities.filtered_items()
    } else {
        catalog.entities.items().to_vec()
    };

    let rows: Vec<EntityRow> = entities
        .iter()
        .filter(|e| args.kind.as_deref().is_none_or(|kind| e.kind() == kind))
        .map(|e| EntityRow::from_entity(e.as_ref()))
        .collect();

    output::print_list(&rows, format)?;

    let pending = catalog.entities.unresolved_count();
    if pending > 0 && format == OutputFormat::Table {
        output::print_warning(&format!(
            "{} descriptor(s) waiting for an unknown category",
            pending
        ));
    }

    Ok(())
}
