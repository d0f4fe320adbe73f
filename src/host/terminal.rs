//! Terminal presenter used by the `pick` command

use super::{BlobStore, Host, MenuItem};
use crate::cli::Output;
use anyhow::{Result, bail};
use dialoguer::FuzzySelect;
use dialoguer::theme::ColorfulTheme;
use serde_json::{Map, Value};

pub struct TerminalHost {
    plugin: String,
    output: Output,
    store: BlobStore,
    /// Served by `load_blob` until something is stored under the same key
    seeds: Map<String, Value>,
    presented: Vec<MenuItem>,
}

impl TerminalHost {
    pub fn new(plugin: impl Into<String>, output: Output, store: BlobStore) -> Self {
        Self {
            plugin: plugin.into(),
            output,
            store,
            seeds: Map::new(),
            presented: Vec::new(),
        }
    }

    pub fn with_seed(mut self, key: impl Into<String>, value: Value) -> Self {
        self.seeds.insert(key.into(), value);
        self
    }
}

impl Host for TerminalHost {
    fn choose(&mut self, items: &[MenuItem], prompt: &str) -> Result<Option<MenuItem>> {
        if !console::Term::stderr().is_term() {
            bail!("Interactive menus need a terminal");
        }
        if items.is_empty() {
            self.output.info("Nothing to choose from");
            return Ok(None);
        }

        self.presented = items.to_vec();
        let labels: Vec<String> = items.iter().map(MenuItem::label).collect();

        let selection = FuzzySelect::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(&labels)
            .default(0)
            .interact_opt()?;

        Ok(selection.map(|index| items[index].clone()))
    }

    fn notify(&mut self, message: &str) {
        self.output.info(message);
    }

    fn load_blob(&self, key: &str) -> Option<Value> {
        self.store
            .get(&self.plugin, key)
            .or_else(|| self.seeds.get(key).cloned())
    }

    fn store_blob(&mut self, key: &str, value: Value) -> Result<()> {
        self.store.set(&self.plugin, key, value)
    }

    fn find_item(&self, id: &str) -> Option<MenuItem> {
        self.presented.iter().find(|item| item.id == id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn host() -> TerminalHost {
        TerminalHost::new("files", Output::new(0, true), BlobStore::in_memory())
    }

    #[test]
    fn test_seed_served_until_stored() {
        let mut host = host().with_seed("config", json!({"max_depth": 2}));
        assert_eq!(host.load_blob("config"), Some(json!({"max_depth": 2})));
        assert_eq!(host.load_blob("missing"), None);

        host.store_blob("config", json!({"max_depth": 7})).unwrap();
        assert_eq!(host.load_blob("config"), Some(json!({"max_depth": 7})));
    }

    #[test]
    fn test_find_item_before_any_menu() {
        assert_eq!(host().find_item("files"), None);
    }
}
