//! Capabilities handed to entity actions.

use std::fmt;
use std::sync::Arc;

/// Navigation capability supplied by the host.
pub trait Navigator: Send + Sync + fmt::Debug {
    /// Navigates to an in-app route or an external URL.
    fn navigate(&self, url: &str);
}

type SetActiveFn = Arc<dyn Fn(Option<String>) + Send + Sync>;

/// Context passed to [`CatalogEntity::on_run`](crate::CatalogEntity::on_run).
#[derive(Clone)]
pub struct RunContext {
    navigator: Arc<dyn Navigator>,
    set_active: SetActiveFn,
}

impl RunContext {
    /// Creates a run context.
    ///
    /// `set_active` receives the uid chosen by
    /// [`RunContext::set_command_palette_context`].
    pub fn new(
        navigator: Arc<dyn Navigator>,
        set_active: impl Fn(Option<String>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            navigator,
            set_active: Arc::new(set_active),
        }
    }

    /// Navigates to `url`.
    pub fn navigate(&self, url: &str) {
        self.navigator.navigate(url);
    }

    /// Makes `uid` the active entity for the command palette, or clears it.
    pub fn set_command_palette_context(&self, uid: Option<&str>) {
        (self.set_active)(uid.map(str::to_string));
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("navigator", &self.navigator)
            .finish_non_exhaustive()
    }
}

/// A settings page section contributed by an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsMenu {
    /// Section id.
    pub id: String,
    /// Group the section belongs to.
    pub group: String,
    /// Section title.
    pub title: String,
}

/// Context passed to [`CatalogEntity::on_settings_open`](crate::CatalogEntity::on_settings_open).
#[derive(Debug)]
pub struct SettingsContext {
    navigator: Arc<dyn Navigator>,
    /// Sections collected from the entity.
    pub menu_items: Vec<SettingsMenu>,
}

impl SettingsContext {
    /// Creates an empty settings context.
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            navigator,
            menu_items: Vec::new(),
        }
    }

    /// Navigates to `url`.
    pub fn navigate(&self, url: &str) {
        self.navigator.navigate(url);
    }
}

/// Click handler of a context menu item.
pub type MenuAction = Arc<dyn Fn() + Send + Sync>;

/// A context menu entry contributed by an entity.
#[derive(Clone)]
pub struct MenuItem {
    /// Label.
    pub title: String,
    /// Optional icon name.
    pub icon: Option<String>,
    /// Confirmation prompt shown before `on_click` runs.
    pub confirm: Option<String>,
    /// Click handler.
    pub on_click: MenuAction,
}

impl MenuItem {
    /// Creates a menu item without icon or confirmation.
    pub fn new(title: impl Into<String>, on_click: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            title: title.into(),
            icon: None,
            confirm: None,
            on_click: Arc::new(on_click),
        }
    }

    /// Sets the icon.
    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    /// Requires a confirmation prompt.
    pub fn with_confirm(mut self, message: &str) -> Self {
        self.confirm = Some(message.to_string());
        self
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("title", &self.title)
            .field("icon", &self.icon)
            .field("confirm", &self.confirm)
            .finish_non_exhaustive()
    }
}

/// Context passed to [`CatalogEntity::on_context_menu_open`](crate::CatalogEntity::on_context_menu_open).
#[derive(Debug)]
pub struct ContextMenuContext {
    navigator: Arc<dyn Navigator>,
    /// Items collected from the entity.
    pub menu_items: Vec<MenuItem>,
}

impl ContextMenuContext {
    /// Creates an empty context menu context.
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            navigator,
            menu_items: Vec::new(),
        }
    }

    /// Returns the navigator so menu actions can capture it.
    pub fn navigator(&self) -> Arc<dyn Navigator> {
        Arc::clone(&self.navigator)
    }

    /// Navigates to `url`.
    pub fn navigate(&self, url: &str) {
        self.navigator.navigate(url);
    }
}
