//! Category definitions: the `(group, kind, version)` → constructor table.

use std::fmt;
use std::sync::Arc;

use catalog_core::EntityDescriptor;

use crate::entity::CatalogEntity;

/// Builds a typed entity from a descriptor.
pub type EntityConstructor = Arc<dyn Fn(&EntityDescriptor) -> Arc<dyn CatalogEntity> + Send + Sync>;

/// apiVersion carried by category declarations themselves.
pub const CATEGORY_API_VERSION: &str = "catalog.dev/v1";

/// Kind carried by category declarations themselves.
pub const CATEGORY_KIND: &str = "CatalogCategory";

/// Display metadata of a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMetadata {
    /// Display name, e.g. `"Web Links"`.
    pub name: String,
    /// Icon name or inline SVG.
    pub icon: String,
}

/// Kind names a category claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNames {
    /// Entity kind, e.g. `"WebLink"`.
    pub kind: String,
}

/// One supported version and its constructor.
#[derive(Clone)]
pub struct CategoryVersion {
    /// Version name, e.g. `"v1"`.
    pub name: String,
    constructor: EntityConstructor,
}

impl CategoryVersion {
    /// Creates a version entry.
    pub fn new(name: impl Into<String>, constructor: EntityConstructor) -> Self {
        Self {
            name: name.into(),
            constructor,
        }
    }

    /// Invokes the constructor.
    pub fn construct(&self, descriptor: &EntityDescriptor) -> Arc<dyn CatalogEntity> {
        (self.constructor)(descriptor)
    }
}

impl fmt::Debug for CategoryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryVersion")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Category spec.
#[derive(Debug, Clone)]
pub struct CategorySpec {
    /// API group, e.g. `"entity.catalog.dev"`. May be empty.
    pub group: String,
    /// Supported versions in declaration order.
    pub versions: Vec<CategoryVersion>,
    /// Claimed kind.
    pub names: CategoryNames,
}

/// A category declaration.
#[derive(Debug, Clone)]
pub struct Category {
    /// Always [`CATEGORY_API_VERSION`] for built-in declarations.
    pub api_version: String,
    /// Always [`CATEGORY_KIND`] for built-in declarations.
    pub kind: String,
    /// Display metadata.
    pub metadata: CategoryMetadata,
    /// Resolution spec.
    pub spec: CategorySpec,
}

impl Category {
    /// Creates a category with no versions.
    pub fn new(name: &str, icon: &str, group: &str, kind: &str) -> Self {
        Self {
            api_version: CATEGORY_API_VERSION.to_string(),
            kind: CATEGORY_KIND.to_string(),
            metadata: CategoryMetadata {
                name: name.to_string(),
                icon: icon.to_string(),
            },
            spec: CategorySpec {
                group: group.to_string(),
                versions: Vec::new(),
                names: CategoryNames {
                    kind: kind.to_string(),
                },
            },
        }
    }

    /// Adds a version whose constructor returns a concrete entity type.
    pub fn with_version<E, F>(mut self, name: &str, build: F) -> Self
    where
        E: CatalogEntity,
        F: Fn(&EntityDescriptor) -> E + Send + Sync + 'static,
    {
        let constructor: EntityConstructor =
            Arc::new(move |descriptor: &EntityDescriptor| -> Arc<dyn CatalogEntity> {
                Arc::new(build(descriptor))
            });
        self.spec.versions.push(CategoryVersion::new(name, constructor));
        self
    }

    /// Returns `"group/kind"`.
    pub fn get_id(&self) -> String {
        format!("{}/{}", self.spec.group, self.spec.names.kind)
    }

    /// Returns the claimed entity kind.
    pub fn entity_kind(&self) -> &str {
        &self.spec.names.kind
    }

    /// Looks up a version entry by name.
    pub fn version(&self, name: &str) -> Option<&CategoryVersion> {
        self.spec.versions.iter().find(|v| v.name == name)
    }

    /// Returns every apiVersion string this category resolves.
    pub fn supported_api_versions(&self) -> Vec<String> {
        self.spec
            .versions
            .iter()
            .map(|v| {
                if self.spec.group.is_empty() {
                    v.name.clone()
                } else {
                    format!("{}/{}", self.spec.group, v.name)
                }
            })
            .collect()
    }

    /// Returns whether this category claims `(group, kind)`.
    pub fn claims(&self, group: &str, kind: &str) -> bool {
        self.spec.group == group && self.spec.names.kind == kind
    }
}
