//! `run` and `menu` — entity action dispatch.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::bootstrap::Catalog;
use crate::output::{self, OutputFormat};
use catalog_core::error::AppError;
use catalog_registry::RunOutcome;

/// Arguments naming one entity
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Entity uid
    pub uid: String,
}

/// Menu display row
#[derive(Debug, Serialize, Tabled)]
struct MenuRow {
    /// Where the entry appears
    menu: String,
    /// Entry title
    title: String,
    /// Extra detail (icon or settings group)
    detail: String,
}

/// Execute the run command
pub async fn execute(args: &RunArgs, catalog: &Catalog) -> Result<(), AppError> {
    let entity = catalog
        .entities
        .get_by_id(&args.uid)
        .ok_or_else(|| AppError::not_found(format!("Entity '{}' not found", args.uid)))?;

    catalog.entities.set_active_entity(Some(entity.get_id()));

    match catalog.entities.on_run(&entity).await {
        RunOutcome::Completed => {
            output::print_success(&format!("Ran '{}'", entity.get_name()));
            Ok(())
        }
        RunOutcome::Prevented { by } => {
            output::print_warning(&format!(
                "Run of '{}' prevented by {}",
                entity.get_name(),
                by.as_deref().unwrap_or("a hook")
            ));
            Ok(())
        }
        RunOutcome::Failed => Err(AppError::hook(format!(
            "Run action of '{}' failed",
            entity.get_name()
        ))),
    }
}

/// Execute the menu command
pub fn menu(args: &RunArgs, catalog: &Catalog, format: OutputFormat) -> Result<(), AppError> {
    let entity = catalog
        .entities
        .get_by_id(&args.uid)
        .ok_or_else(|| AppError::not_found(format!("Entity '{}' not found", args.uid)))?;

    let context_items = catalog.entities.on_context_menu_open(&entity);
    let settings = catalog.entities.on_settings_open(&entity);

    let rows: Vec<MenuRow> = context_items
        .iter()
        .map(|item| MenuRow {
            menu: "context".to_string(),
            title: item.title.clone(),
            detail: item.icon.clone().unwrap_or_default(),
        })
        .chain(settings.iter().map(|section| MenuRow {
            menu: "settings".to_string(),
            title: section.title.clone(),
            detail: section.group.clone(),
        }))
        .collect();

    output::print_list(&rows, format)
}
