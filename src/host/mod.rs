//! Boundary between plugins and whatever presents their menus
//!
//! A plugin never draws anything itself: it hands [`MenuItem`]s to a [`Host`],
//! gets back the one the user picked (if any), and keeps its settings in the
//! host's blob store.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

mod store;
mod terminal;

pub use store::BlobStore;
pub use terminal::TerminalHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Selecting it does something and usually closes the menu
    #[default]
    Action,
    /// Selecting it opens another menu
    Submenu,
    /// Display only
    Info,
}

/// One selectable entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl MenuItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            plugin: None,
            badge: None,
            icon: None,
            metadata: None,
        }
    }

    pub fn action(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, title, ItemKind::Action)
    }

    pub fn submenu(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, title, ItemKind::Submenu)
    }

    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = Some(plugin.into());
        self
    }

    pub fn with_badge(mut self, badge: impl Into<String>) -> Self {
        self.badge = Some(badge.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// `metadata.path`, set on items that stand for a file
    pub fn path(&self) -> Option<PathBuf> {
        self.metadata
            .as_ref()?
            .get("path")?
            .as_str()
            .map(PathBuf::from)
    }

    /// Single-line rendering used by text prompts
    pub fn label(&self) -> String {
        let mut label = self.title.clone();
        if self.kind == ItemKind::Submenu {
            label.push_str(" ›");
        }
        if let Some(badge) = &self.badge {
            label.push_str(&format!("  [{badge}]"));
        }
        label
    }
}

/// What a plugin may ask of its presenter
pub trait Host {
    /// Present `items` and wait for a selection; `None` when dismissed
    fn choose(&mut self, items: &[MenuItem], prompt: &str) -> Result<Option<MenuItem>>;

    fn notify(&mut self, message: &str);

    fn load_blob(&self, key: &str) -> Option<Value>;

    fn store_blob(&mut self, key: &str, value: Value) -> Result<()>;

    /// Look up an item among those presented most recently
    fn find_item(&self, id: &str) -> Option<MenuItem>;
}
