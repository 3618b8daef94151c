//! Menu catalog boundary
//!
//! The food catalog is owned elsewhere; the only thing this server reads
//! from it is the current price of a food id, and only as a fallback for
//! line items persisted without an embedded price. It never changes the
//! totals of already-placed orders that carry their own snapshot.

use std::collections::HashMap;
use std::path::Path;

/// Read-only view of the current menu prices
pub trait MenuCatalog: Send + Sync {
    /// Current price of a food in minor units, if the menu knows it
    fn unit_price(&self, food_id: i64) -> Option<i64>;
}

/// In-memory price snapshot
#[derive(Debug, Clone, Default)]
pub struct StaticMenu {
    prices: HashMap<i64, i64>,
}

impl StaticMenu {
    pub fn new(prices: HashMap<i64, i64>) -> Self {
        Self { prices }
    }

    /// Empty menu; every lookup misses
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a snapshot file (JSON object of food id to price)
    ///
    /// A missing or unreadable file degrades to an empty menu with a
    /// warning so the server still starts; totals then rely entirely on
    /// embedded prices.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let parsed = std::fs::read_to_string(path)
            .ok()
            .and_then(|raw| serde_json::from_str::<HashMap<String, i64>>(&raw).ok());

        match parsed {
            Some(map) => {
                let prices: HashMap<i64, i64> = map
                    .into_iter()
                    .filter_map(|(k, v)| k.parse::<i64>().ok().map(|id| (id, v)))
                    .collect();
                tracing::info!(path = %path.display(), entries = prices.len(), "Menu snapshot loaded");
                Self { prices }
            }
            None => {
                tracing::warn!(
                    path = %path.display(),
                    "Menu snapshot missing or unreadable, starting with an empty menu"
                );
                Self::empty()
            }
        }
    }
}

impl MenuCatalog for StaticMenu {
    fn unit_price(&self, food_id: i64) -> Option<i64> {
        self.prices.get(&food_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_hits_and_misses() {
        let menu = StaticMenu::new(HashMap::from([(1, 5000), (2, 1500)]));
        assert_eq!(menu.unit_price(1), Some(5000));
        assert_eq!(menu.unit_price(99), None);
    }

    #[test]
    fn snapshot_file_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("menu.json");
        std::fs::write(&path, r#"{"1": 5000, "2": 1500}"#).unwrap();

        let menu = StaticMenu::from_file(&path);
        assert_eq!(menu.unit_price(2), Some(1500));
    }

    #[test]
    fn missing_snapshot_degrades_to_empty() {
        let menu = StaticMenu::from_file("/nonexistent/menu.json");
        assert_eq!(menu.unit_price(1), None);
    }
}
