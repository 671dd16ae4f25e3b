use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{RandomiserError, Result};

/// Discoveries needed to unlock an item when neither the world table nor the
/// run settings say otherwise.
pub const DEFAULT_DISCOVERIES_TO_UNLOCK: u32 = 4;

/// A collectible whose variants share one placement budget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceableItem {
    pub key: String,
    /// Concrete class ids. Order matters: splits are drawn in this order.
    pub variants: Vec<String>,
    /// The item is only placed once the reachable depth is strictly greater.
    #[serde(default)]
    pub accessibility_depth: u32,
    #[serde(default)]
    pub discoveries_to_unlock: Option<u32>,
}

impl PlaceableItem {
    pub fn discoveries_or_default(&self) -> u32 {
        self.discoveries_to_unlock
            .unwrap_or(DEFAULT_DISCOVERIES_TO_UNLOCK)
    }
}

/// Item lookup by stable key, preserving world-table order for iteration.
#[derive(Clone, Debug, Default)]
pub struct ItemTable {
    items: Vec<PlaceableItem>,
    index: BTreeMap<String, usize>,
}

impl ItemTable {
    pub fn new(items: Vec<PlaceableItem>) -> Result<Self> {
        let mut index = BTreeMap::new();
        for (i, item) in items.iter().enumerate() {
            if item.variants.is_empty() {
                return Err(RandomiserError::UnknownItem(format!(
                    "{} has no variants",
                    item.key
                )));
            }
            if index.insert(item.key.clone(), i).is_some() {
                return Err(RandomiserError::Config(format!(
                    "duplicate item key {}",
                    item.key
                )));
            }
        }
        Ok(Self { items, index })
    }

    pub fn get(&self, key: &str) -> Result<&PlaceableItem> {
        self.index
            .get(key)
            .map(|&i| &self.items[i])
            .ok_or_else(|| RandomiserError::UnknownItem(key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlaceableItem> {
        self.items.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|i| i.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(key: &str, variants: &[&str]) -> PlaceableItem {
        PlaceableItem {
            key: key.to_string(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
            accessibility_depth: 0,
            discoveries_to_unlock: None,
        }
    }

    #[test]
    fn lookup_by_key() {
        let table = ItemTable::new(vec![item("seaglide_fragment", &["a", "b"])]).unwrap();
        assert_eq!(table.get("seaglide_fragment").unwrap().variants.len(), 2);
        assert!(matches!(
            table.get("nope"),
            Err(RandomiserError::UnknownItem(_))
        ));
    }

    #[test]
    fn rejects_empty_variant_list() {
        let err = ItemTable::new(vec![item("ghost", &[])]).unwrap_err();
        assert!(matches!(err, RandomiserError::UnknownItem(_)));
    }

    #[test]
    fn rejects_duplicate_keys() {
        let err = ItemTable::new(vec![item("a", &["x"]), item("a", &["y"])]).unwrap_err();
        assert!(matches!(err, RandomiserError::Config(_)));
    }

    #[test]
    fn default_discoveries() {
        let mut it = item("a", &["x"]);
        assert_eq!(it.discoveries_or_default(), DEFAULT_DISCOVERIES_TO_UNLOCK);
        it.discoveries_to_unlock = Some(9);
        assert_eq!(it.discoveries_or_default(), 9);
    }

    #[test]
    fn keys_keep_table_order() {
        let table = ItemTable::new(vec![item("b", &["x"]), item("a", &["y"])]).unwrap();
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }
}
