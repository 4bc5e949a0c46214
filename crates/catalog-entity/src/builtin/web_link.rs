//! Web link entities: bookmarks opened in the browser.

use std::any::Any;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use catalog_core::{AppError, AppResult, EntityDescriptor};

use super::{BUILTIN_GROUP, BUILTIN_VERSION};
use crate::category::Category;
use crate::context::{ContextMenuContext, MenuItem, RunContext};
use crate::entity::{CatalogEntity, EntityCore};

/// Typed spec of a web link.
#[derive(Debug, Clone, Deserialize)]
pub struct WebLinkSpec {
    /// Target URL.
    pub url: String,
}

/// A bookmark.
#[derive(Debug)]
pub struct WebLink {
    core: EntityCore,
}

impl WebLink {
    /// Builds the entity from a descriptor.
    pub fn new(descriptor: &EntityDescriptor) -> Self {
        Self {
            core: EntityCore::from_descriptor(descriptor),
        }
    }

    /// Parses the current spec.
    pub fn typed_spec(&self) -> AppResult<WebLinkSpec> {
        serde_json::from_value(self.core.spec()).map_err(|e| {
            AppError::validation(format!("Invalid WebLink spec for '{}': {e}", self.core.uid()))
        })
    }
}

#[async_trait]
impl CatalogEntity for WebLink {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn on_run(&self, context: &RunContext) -> AppResult<()> {
        let spec = self.typed_spec()?;
        context.navigate(&spec.url);
        Ok(())
    }

    fn on_context_menu_open(&self, context: &mut ContextMenuContext) {
        let spec = match self.typed_spec() {
            Ok(spec) => spec,
            Err(e) => {
                warn!(uid = %self.get_id(), error = %e, "Web link has no usable url, no menu items");
                return;
            }
        };
        let navigator = context.navigator();
        context.menu_items.push(
            MenuItem::new("Open in Browser", move || navigator.navigate(&spec.url))
                .with_icon("open_in_new"),
        );
    }
}

/// The `WebLink` category.
pub fn web_link_category() -> Category {
    Category::new("Web Links", "link", BUILTIN_GROUP, "WebLink").with_version(BUILTIN_VERSION, WebLink::new)
}
