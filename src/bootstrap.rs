//! Startup wiring: logging, registries, built-in categories, and the
//! static descriptor sources.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use catalog_core::config::AppConfig;
use catalog_core::config::logging::LoggingConfig;
use catalog_core::{AppResult, EntityDescriptor};
use catalog_entity::Navigator;
use catalog_entity::builtin::general::general_category;
use catalog_entity::builtin::web_link::web_link_category;
use catalog_registry::{CategoryRegistry, EntityRegistry, ObservableList, SourceItem};

/// Initialize tracing/logging. Output goes to stderr so command output on
/// stdout stays machine-readable.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Navigator for a headless host: records the request and prints it.
#[derive(Debug, Default)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, url: &str) {
        info!(url = %url, "Navigation requested");
        println!("→ {}", url);
    }
}

/// The wired registries.
#[derive(Debug)]
pub struct Catalog {
    /// Category registry
    pub categories: Arc<CategoryRegistry>,
    /// Entity registry
    pub entities: Arc<EntityRegistry>,
}

/// Builds the catalog: built-in categories, the default filter, and one
/// observable source per descriptor file.
///
/// A source file that cannot be read or parsed is skipped with a warning.
pub async fn build_catalog(config: &AppConfig, extra_sources: &[PathBuf]) -> Catalog {
    let categories = Arc::new(CategoryRegistry::new());
    categories.add(general_category());
    categories.add(web_link_category());

    for duplicate in categories.duplicate_group_kinds() {
        warn!(category = %duplicate, "Category claimed more than once, latest registration wins");
    }

    let entities = Arc::new(EntityRegistry::new(
        Arc::clone(&categories),
        Arc::new(LoggingNavigator),
        &config.registry,
    ));
    entities.add_catalog_filter(|entity| entity.is_enabled());

    let configured = config
        .sources
        .iter()
        .map(|s| (s.id.clone(), PathBuf::from(&s.path)));
    let ad_hoc = extra_sources
        .iter()
        .enumerate()
        .map(|(i, path)| (format!("cli-{}", i), path.clone()));

    for (id, path) in configured.chain(ad_hoc) {
        match load_descriptors(&path).await {
            Ok(descriptors) => {
                let count = descriptors.len();
                let items = descriptors
                    .into_iter()
                    .map(|d| SourceItem::from(tag_source(d, &id)))
                    .collect();
                entities.add_observable_source(&id, ObservableList::from_items(items));
                info!(source_id = %id, path = %path.display(), count, "Source registered");
            }
            Err(e) => {
                warn!(source_id = %id, path = %path.display(), error = %e, "Skipping unreadable source");
            }
        }
    }

    Catalog {
        categories,
        entities,
    }
}

/// Reads a JSON array of descriptors.
pub async fn load_descriptors(path: &Path) -> AppResult<Vec<EntityDescriptor>> {
    let raw = tokio::fs::read_to_string(path).await?;
    let descriptors: Vec<EntityDescriptor> = serde_json::from_str(&raw)?;
    Ok(descriptors)
}

fn tag_source(descriptor: EntityDescriptor, source_id: &str) -> EntityDescriptor {
    if descriptor.metadata.source.is_some() {
        descriptor
    } else {
        descriptor.with_source(source_id)
    }
}
