//! The player's inventory: quantity-tracked entries keyed by item key.
//!
//! A key is a definition id for stackable items and an instance id
//! (`pistol#3`) for individually tracked gear.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{ItemCatalog, ItemCategory, definition_id};
use crate::effects::EffectTable;
use crate::numbers::u32_to_f64;
use crate::survival::SurvivalState;

/// One inventory line. `quantity` is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub item_id: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<u8>,
}

impl InventoryEntry {
    #[must_use]
    pub fn new(item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
            condition: None,
        }
    }

    /// Definition id behind this entry's key.
    #[must_use]
    pub fn definition_id(&self) -> &str {
        definition_id(&self.item_id)
    }
}

/// Result of a consume request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsumeOutcome {
    /// Units were removed and the effect (if any) applied.
    Consumed {
        item_id: String,
        quantity: u32,
        had_effect: bool,
    },
    /// Nothing happened: unknown item, not held, or zero quantity.
    Ignored,
}

/// Player-owned inventory. At most one entry per key; insertion order is kept
/// for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlayerInventory {
    entries: Vec<InventoryEntry>,
}

impl PlayerInventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inventory holding one unit of each listed key.
    #[must_use]
    pub fn with_items<'a>(items: impl IntoIterator<Item = &'a str>) -> Self {
        let mut inventory = Self::new();
        for item in items {
            inventory.add_item(item, 1);
        }
        inventory
    }

    fn find(&self, item_id: &str) -> Option<&InventoryEntry> {
        self.entries.iter().find(|entry| entry.item_id == item_id)
    }

    fn find_mut(&mut self, item_id: &str) -> Option<&mut InventoryEntry> {
        self.entries.iter_mut().find(|entry| entry.item_id == item_id)
    }

    /// Add units, merging into an existing entry.
    pub fn add_item(&mut self, item_id: &str, quantity: u32) {
        self.add_entry(InventoryEntry::new(item_id, quantity));
    }

    /// Add an entry, keeping its condition when it opens a new line.
    pub fn add_entry(&mut self, entry: InventoryEntry) {
        if entry.quantity == 0 {
            log::debug!("ignoring zero-quantity add for `{}`", entry.item_id);
            return;
        }
        if let Some(existing) = self.find_mut(&entry.item_id) {
            existing.quantity = existing.quantity.saturating_add(entry.quantity);
        } else {
            self.entries.push(entry);
        }
    }

    /// Remove units; removing at least the held amount drops the entry.
    /// Returns the number of units actually removed.
    pub fn remove_item(&mut self, item_id: &str, quantity: u32) -> u32 {
        let Some(existing) = self.find_mut(item_id) else {
            log::debug!("remove of `{item_id}` ignored: not held");
            return 0;
        };
        if existing.quantity > quantity {
            existing.quantity -= quantity;
            quantity
        } else {
            let removed = existing.quantity;
            self.entries.retain(|entry| entry.item_id != item_id);
            removed
        }
    }

    #[must_use]
    pub fn has_item(&self, item_id: &str, quantity: u32) -> bool {
        self.find(item_id)
            .is_some_and(|entry| entry.quantity >= quantity)
    }

    #[must_use]
    pub fn get_item_quantity(&self, item_id: &str) -> u32 {
        self.find(item_id).map_or(0, |entry| entry.quantity)
    }

    /// Units held of a definition, summed across its instances.
    #[must_use]
    pub fn definition_quantity(&self, def_id: &str) -> u32 {
        self.entries
            .iter()
            .filter(|entry| entry.definition_id() == def_id)
            .fold(0, |acc, entry| acc.saturating_add(entry.quantity))
    }

    /// Per-instance condition, if the entry carries one.
    #[must_use]
    pub fn condition_of(&self, item_id: &str) -> Option<u8> {
        self.find(item_id).and_then(|entry| entry.condition)
    }

    /// Consume up to `quantity` held units, applying their survival effect.
    ///
    /// Unknown, unusable and unheld items are ignored. Usable items without
    /// an effect entry are still used up.
    pub fn consume_item(
        &mut self,
        item_id: &str,
        quantity: u32,
        catalog: &ItemCatalog,
        effects: &EffectTable,
        survival: &mut SurvivalState,
    ) -> ConsumeOutcome {
        let Some(def) = catalog.resolve(item_id) else {
            log::debug!("consume of unknown item `{item_id}` ignored");
            return ConsumeOutcome::Ignored;
        };
        if !def.usable {
            log::debug!("`{item_id}` is not usable");
            return ConsumeOutcome::Ignored;
        }
        let held = self.get_item_quantity(item_id);
        let units = quantity.min(held);
        if units == 0 {
            log::debug!("consume of `{item_id}` ignored: holding {held}, asked {quantity}");
            return ConsumeOutcome::Ignored;
        }
        let had_effect = effects.apply(&def.id, units, survival);
        let removed = self.remove_item(item_id, units);
        ConsumeOutcome::Consumed {
            item_id: item_id.to_string(),
            quantity: removed,
            had_effect,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[InventoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Sum of units across all entries.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| u64::from(entry.quantity))
            .sum()
    }

    /// Carried weight in kilograms. Informational; nothing caps it.
    #[must_use]
    pub fn total_weight(&self, catalog: &ItemCatalog) -> f64 {
        self.entries
            .iter()
            .filter_map(|entry| {
                catalog
                    .resolve(&entry.item_id)
                    .map(|def| def.weight * u32_to_f64(entry.quantity))
            })
            .sum()
    }

    /// Entries grouped by category for the inventory screen. Keys the
    /// catalog cannot resolve land under `misc`.
    #[must_use]
    pub fn by_category(&self, catalog: &ItemCatalog) -> BTreeMap<ItemCategory, Vec<&InventoryEntry>> {
        let mut groups: BTreeMap<ItemCategory, Vec<&InventoryEntry>> = BTreeMap::new();
        for entry in &self.entries {
            let category = catalog
                .resolve(&entry.item_id)
                .map_or(ItemCategory::Misc, |def| def.category);
            groups.entry(category).or_default().push(entry);
        }
        groups
    }
}
