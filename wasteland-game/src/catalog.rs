//! Static registry of item definitions.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::constants::INSTANCE_SEPARATOR;
use crate::error::DataError;

const DEFAULT_ITEM_DATA: &str = include_str!("../assets/data/items.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Weapon,
    Medical,
    Food,
    Ammo,
    Tool,
    Clothing,
    Misc,
}

impl ItemCategory {
    pub const ALL: [Self; 7] = [
        Self::Weapon,
        Self::Medical,
        Self::Food,
        Self::Ammo,
        Self::Tool,
        Self::Clothing,
        Self::Misc,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Medical => "medical",
            Self::Food => "food",
            Self::Ammo => "ammo",
            Self::Tool => "tool",
            Self::Clothing => "clothing",
            Self::Misc => "misc",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable item definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: ItemCategory,
    /// 1..=5, 5 rarest.
    pub rarity: u8,
    /// Kilograms per unit.
    pub weight: f64,
    #[serde(default)]
    pub usable: bool,
    #[serde(default)]
    pub stackable: bool,
    /// Base condition for degradable gear.
    #[serde(default, rename = "condition")]
    pub base_condition: Option<u8>,
}

impl ItemDef {
    #[must_use]
    pub const fn is_degradable(&self) -> bool {
        self.base_condition.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ItemCatalogFile {
    #[serde(default)]
    items: Vec<ItemDef>,
}

/// Item definitions keyed by id, in asset order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemCatalog {
    items: Vec<ItemDef>,
    index: HashMap<String, usize>,
}

impl ItemCatalog {
    /// Parse the embedded catalog; an unreadable asset yields an empty catalog.
    #[must_use]
    pub fn load_from_static() -> Self {
        match Self::from_json(DEFAULT_ITEM_DATA) {
            Ok(catalog) => catalog,
            Err(err) => {
                log::error!("embedded item catalog rejected: {err}");
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<ItemCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or a definition is invalid.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let file: ItemCatalogFile =
            serde_json::from_str(json).map_err(|e| DataError::parse("items", e))?;
        Self::from_defs(file.items)
    }

    /// # Errors
    ///
    /// Returns an error on duplicate ids, reserved characters or out-of-range fields.
    pub fn from_defs(items: Vec<ItemDef>) -> Result<Self, DataError> {
        let mut index = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            validate_def(item)?;
            if index.insert(item.id.clone(), idx).is_some() {
                return Err(DataError::DuplicateId {
                    kind: "item",
                    id: item.id.clone(),
                });
            }
        }
        Ok(Self { items, index })
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ItemDef> {
        self.index.get(id).and_then(|idx| self.items.get(*idx))
    }

    /// Resolve a definition from either a definition id or an instance id.
    #[must_use]
    pub fn resolve(&self, key: &str) -> Option<&ItemDef> {
        self.get(definition_id(key))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemDef> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Strip the instance serial from a key; definition ids pass through.
#[must_use]
pub fn definition_id(key: &str) -> &str {
    key.split_once(INSTANCE_SEPARATOR)
        .map_or(key, |(def_id, _)| def_id)
}

/// Build the instance id for the `serial`-th minted copy of a definition.
#[must_use]
pub fn instance_id(def_id: &str, serial: u64) -> String {
    format!("{def_id}{INSTANCE_SEPARATOR}{serial}")
}

fn validate_def(item: &ItemDef) -> Result<(), DataError> {
    if item.id.contains(INSTANCE_SEPARATOR) {
        return Err(DataError::ReservedSeparator {
            id: item.id.clone(),
        });
    }
    if !(1..=5).contains(&item.rarity) {
        return Err(DataError::ItemOutOfRange {
            id: item.id.clone(),
            field: "rarity",
            value: f64::from(item.rarity),
        });
    }
    if !item.weight.is_finite() || item.weight <= 0.0 {
        return Err(DataError::ItemOutOfRange {
            id: item.id.clone(),
            field: "weight",
            value: item.weight,
        });
    }
    if let Some(condition) = item.base_condition
        && condition > 100
    {
        return Err(DataError::ItemOutOfRange {
            id: item.id.clone(),
            field: "condition",
            value: f64::from(condition),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_loads() {
        let catalog = ItemCatalog::default_catalog();
        assert_eq!(catalog.len(), 19);
        let pistol = catalog.get("pistol").expect("pistol defined");
        assert_eq!(pistol.category, ItemCategory::Weapon);
        assert_eq!(pistol.base_condition, Some(60));
        assert!(!pistol.stackable);
        let water = catalog.get("water").expect("water defined");
        assert!(water.stackable && water.usable);
        assert!(!water.is_degradable());
    }

    #[test]
    fn resolve_strips_instance_serial() {
        let catalog = ItemCatalog::default_catalog();
        let key = instance_id("rifle", 7);
        assert_eq!(key, "rifle#7");
        assert_eq!(definition_id(&key), "rifle");
        assert_eq!(catalog.resolve(&key).map(|d| d.id.as_str()), Some("rifle"));
        assert!(catalog.resolve("laser#1").is_none());
        assert_eq!(definition_id("water"), "water");
    }

    #[test]
    fn rejects_duplicates_and_bad_ranges() {
        let dup = r#"{ "items": [
            { "id": "a", "name": "A", "category": "misc", "rarity": 1, "weight": 1.0 },
            { "id": "a", "name": "A2", "category": "misc", "rarity": 1, "weight": 1.0 }
        ] }"#;
        assert!(matches!(
            ItemCatalog::from_json(dup),
            Err(DataError::DuplicateId { .. })
        ));

        let rarity = r#"{ "items": [
            { "id": "a", "name": "A", "category": "misc", "rarity": 9, "weight": 1.0 }
        ] }"#;
        assert!(matches!(
            ItemCatalog::from_json(rarity),
            Err(DataError::ItemOutOfRange { field: "rarity", .. })
        ));

        let weight = r#"{ "items": [
            { "id": "a", "name": "A", "category": "misc", "rarity": 1, "weight": 0.0 }
        ] }"#;
        assert!(matches!(
            ItemCatalog::from_json(weight),
            Err(DataError::ItemOutOfRange { field: "weight", .. })
        ));

        let reserved = r#"{ "items": [
            { "id": "a#1", "name": "A", "category": "misc", "rarity": 1, "weight": 1.0 }
        ] }"#;
        assert!(matches!(
            ItemCatalog::from_json(reserved),
            Err(DataError::ReservedSeparator { .. })
        ));
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        assert!(matches!(
            ItemCatalog::from_json("{ items: nope"),
            Err(DataError::Parse { asset: "items", .. })
        ));
    }
}
