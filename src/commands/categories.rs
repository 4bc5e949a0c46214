//! `categories` — print the category table.

use serde::Serialize;
use tabled::Tabled;

use crate::bootstrap::Catalog;
use crate::output::{self, OutputFormat};
use catalog_core::error::AppError;

/// Category display row
#[derive(Debug, Serialize, Tabled)]
struct CategoryRow {
    /// Category name
    name: String,
    /// `group/kind`
    id: String,
    /// Resolved apiVersions
    versions: String,
    /// Icon
    icon: String,
    /// Live entities of this category
    entities: usize,
}

/// Execute the categories command
pub fn execute(catalog: &Catalog, format: OutputFormat) -> Result<(), AppError> {
    let rows: Vec<CategoryRow> = catalog
        .categories
        .items()
        .iter()
        .map(|category| CategoryRow {
            name: category.metadata.name.clone(),
            id: category.get_id(),
            versions: category.supported_api_versions().join(", "),
            icon: category.metadata.icon.clone(),
            entities: catalog
                .entities
                .get_items_for_category(category, Default::default())
                .len(),
        })
        .collect();

    output::print_list(&rows, format)
}
