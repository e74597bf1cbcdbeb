//! Loot generation and per-location ephemeral inventories.
//!
//! Searching a location rolls a handful of items from that location type's
//! rarity pools. Stackable finds merge into one entry per definition;
//! everything else is minted as its own instance with a rolled condition.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::catalog::{ItemCatalog, ItemDef, instance_id};
use crate::constants::{
    CONDITION_MAX, CONDITION_MIN, CONDITION_VARIANCE, FALLBACK_LOOT_TABLE,
    LOOT_COUNT_EFFICIENCY_CAP, LOOT_RARE_THRESHOLD, LOOT_UNCOMMON_THRESHOLD,
    MIN_SEARCH_EFFICIENCY,
};
use crate::effects::EffectTable;
use crate::error::DataError;
use crate::inventory::{ConsumeOutcome, InventoryEntry, PlayerInventory};
use crate::numbers::{clamp_i32_to_u8, floor_f64_to_usize};
use crate::survival::SurvivalState;

const DEFAULT_LOOT_TABLE_DATA: &str = include_str!("../assets/data/loot_tables.json");

/// Items found by a single search; never more than a handful.
pub type GeneratedLoot = SmallVec<[LootEntry; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RarityTier {
    Common,
    Uncommon,
    Rare,
}

impl RarityTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
        }
    }
}

impl fmt::Display for RarityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three rarity pools of item ids for one location type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LootPools {
    #[serde(default)]
    pub common: Vec<String>,
    #[serde(default)]
    pub uncommon: Vec<String>,
    #[serde(default)]
    pub rare: Vec<String>,
}

impl LootPools {
    #[must_use]
    pub fn pool(&self, tier: RarityTier) -> &[String] {
        match tier {
            RarityTier::Common => &self.common,
            RarityTier::Uncommon => &self.uncommon,
            RarityTier::Rare => &self.rare,
        }
    }

    /// Pool for `tier`, or the common pool when that tier is empty.
    #[must_use]
    pub fn pool_or_common(&self, tier: RarityTier) -> &[String] {
        let pool = self.pool(tier);
        if pool.is_empty() { &self.common } else { pool }
    }

    #[must_use]
    pub fn contains(&self, item_id: &str) -> bool {
        self.ids().any(|id| id == item_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.common
            .iter()
            .chain(&self.uncommon)
            .chain(&self.rare)
            .map(String::as_str)
    }
}

/// Loot pools keyed by location type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LootTables {
    #[serde(default)]
    tables: HashMap<String, LootPools>,
}

impl LootTables {
    #[must_use]
    pub fn load_from_static() -> Self {
        match Self::from_json(DEFAULT_LOOT_TABLE_DATA) {
            Ok(tables) => tables,
            Err(err) => {
                log::error!("embedded loot tables rejected: {err}");
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn default_tables() -> &'static Self {
        static TABLES: OnceLock<LootTables> = OnceLock::new();
        TABLES.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into loot tables.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        serde_json::from_str(json).map_err(|e| DataError::parse("loot_tables", e))
    }

    /// Check that the fallback table exists, every common pool has items and
    /// every pooled id is in the catalog.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found, in table-name order.
    pub fn validate(&self, catalog: &ItemCatalog) -> Result<(), DataError> {
        if !self.tables.contains_key(FALLBACK_LOOT_TABLE) {
            return Err(DataError::MissingFallbackTable(FALLBACK_LOOT_TABLE));
        }
        let mut names: Vec<&String> = self.tables.keys().collect();
        names.sort();
        for name in names {
            let pools = &self.tables[name];
            if pools.common.is_empty() {
                return Err(DataError::EmptyCommonPool {
                    table: name.clone(),
                });
            }
            if let Some(missing) = pools.ids().find(|id| !catalog.contains(id)) {
                return Err(DataError::UnknownLootItem {
                    table: name.clone(),
                    item: missing.to_string(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, location_type: &str) -> Option<&LootPools> {
        self.tables.get(location_type)
    }

    /// Pools for a location type, falling back to the ruins table.
    #[must_use]
    pub fn table_for(&self, location_type: &str) -> Option<&LootPools> {
        self.tables.get(location_type).or_else(|| {
            log::debug!("no loot table for `{location_type}`, using `{FALLBACK_LOOT_TABLE}`");
            self.tables.get(FALLBACK_LOOT_TABLE)
        })
    }

    pub fn insert(&mut self, location_type: impl Into<String>, pools: LootPools) {
        self.tables.insert(location_type.into(), pools);
    }
}

/// An item lying in a location's inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootEntry {
    /// Definition id for stackables, instance id for everything else.
    pub item_id: String,
    pub definition_id: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<u8>,
}

impl LootEntry {
    #[must_use]
    pub fn is_instance(&self) -> bool {
        self.item_id != self.definition_id
    }
}

impl From<&LootEntry> for InventoryEntry {
    fn from(entry: &LootEntry) -> Self {
        Self {
            item_id: entry.item_id.clone(),
            quantity: entry.quantity,
            condition: entry.condition,
        }
    }
}

/// Sanitized efficiency: non-finite or non-positive values become the floor.
#[must_use]
pub fn effective_efficiency(search_efficiency: f64) -> f64 {
    if search_efficiency.is_finite() && search_efficiency > 0.0 {
        search_efficiency
    } else {
        MIN_SEARCH_EFFICIENCY
    }
}

/// Items found for a uniform draw in `[0, 1)`: `floor(1 + draw * min(3, eff))`.
#[must_use]
pub fn item_count_for(draw: f64, search_efficiency: f64) -> usize {
    let eff = effective_efficiency(search_efficiency).min(LOOT_COUNT_EFFICIENCY_CAP);
    floor_f64_to_usize(1.0 + draw * eff).max(1)
}

/// Tier for a roll in `[0, 100)`. Thresholds scale with efficiency and are
/// not renormalized, so high efficiency swallows the common band entirely.
#[must_use]
pub fn tier_for_roll(roll: f64, search_efficiency: f64) -> RarityTier {
    let eff = effective_efficiency(search_efficiency);
    if roll < LOOT_RARE_THRESHOLD * eff {
        RarityTier::Rare
    } else if roll < LOOT_UNCOMMON_THRESHOLD * eff {
        RarityTier::Uncommon
    } else {
        RarityTier::Common
    }
}

/// Condition for a fresh instance: base plus a uniform variance, clamped.
pub fn roll_condition<R>(base: u8, rng: &mut R) -> u8
where
    R: Rng + ?Sized,
{
    let variance = rng.gen_range(-CONDITION_VARIANCE..=CONDITION_VARIANCE);
    clamp_i32_to_u8(i32::from(base) + variance).clamp(CONDITION_MIN, CONDITION_MAX)
}

/// What to search.
#[derive(Debug, Clone, Copy)]
pub struct LootRequest<'a> {
    pub location_id: &'a str,
    pub location_type: &'a str,
    pub search_efficiency: f64,
}

/// Owns the reference data needed for rolls and every location's loot pile.
#[derive(Debug, Clone)]
pub struct LootEngine {
    catalog: ItemCatalog,
    tables: LootTables,
    location_inventories: HashMap<String, Vec<LootEntry>>,
    next_serial: u64,
}

impl LootEngine {
    #[must_use]
    pub fn new(catalog: ItemCatalog, tables: LootTables) -> Self {
        Self {
            catalog,
            tables,
            location_inventories: HashMap::new(),
            next_serial: 1,
        }
    }

    /// Engine over the embedded catalog and tables.
    #[must_use]
    pub fn with_static_data() -> Self {
        Self::new(
            ItemCatalog::default_catalog().clone(),
            LootTables::default_tables().clone(),
        )
    }

    #[must_use]
    pub const fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn tables(&self) -> &LootTables {
        &self.tables
    }

    fn mint_instance_id(&mut self, def_id: &str) -> String {
        let serial = self.next_serial;
        self.next_serial = self.next_serial.saturating_add(1);
        instance_id(def_id, serial)
    }

    fn inventory_mut(&mut self, location_id: &str) -> &mut Vec<LootEntry> {
        self.location_inventories
            .entry(location_id.to_string())
            .or_default()
    }

    /// Put one unit into the pile: stackables merge, anything else gets its
    /// own instance entry.
    fn place(&mut self, location_id: &str, def: &ItemDef, condition: Option<u8>) -> LootEntry {
        if def.stackable {
            let pile = self.inventory_mut(location_id);
            if let Some(existing) = pile.iter_mut().find(|entry| entry.item_id == def.id) {
                existing.quantity = existing.quantity.saturating_add(1);
            } else {
                pile.push(LootEntry {
                    item_id: def.id.clone(),
                    definition_id: def.id.clone(),
                    quantity: 1,
                    condition: None,
                });
            }
            return LootEntry {
                item_id: def.id.clone(),
                definition_id: def.id.clone(),
                quantity: 1,
                condition: None,
            };
        }
        let entry = LootEntry {
            item_id: self.mint_instance_id(&def.id),
            definition_id: def.id.clone(),
            quantity: 1,
            condition,
        };
        self.inventory_mut(location_id).push(entry.clone());
        entry
    }

    /// Roll loot for a search and add it to the location's pile.
    ///
    /// `rng` drives counts, tiers and picks; `condition_rng` drives
    /// per-instance wear. Returns only what this call found.
    pub fn generate_loot<R, C>(
        &mut self,
        request: &LootRequest<'_>,
        rng: &mut R,
        condition_rng: &mut C,
    ) -> GeneratedLoot
    where
        R: Rng + ?Sized,
        C: Rng + ?Sized,
    {
        let mut found = GeneratedLoot::new();
        let Some(pools) = self.tables.table_for(request.location_type).cloned() else {
            log::debug!("no loot tables available, search of `{}` finds nothing", request.location_id);
            return found;
        };

        let efficiency = request.search_efficiency;
        let count = item_count_for(rng.r#gen::<f64>(), efficiency);
        for _ in 0..count {
            let roll = rng.gen_range(0.0..100.0);
            let tier = tier_for_roll(roll, efficiency);
            let pool = pools.pool_or_common(tier);
            let Some(item_id) = pool.choose(rng) else {
                continue;
            };
            let Some(def) = self.catalog.get(item_id).cloned() else {
                log::debug!("loot pool item `{item_id}` missing from catalog");
                continue;
            };
            let condition = def
                .base_condition
                .map(|base| roll_condition(base, condition_rng));
            log::trace!(
                "loot roll {roll:.2} at {} -> {tier} `{}` condition {condition:?}",
                request.location_id,
                def.id
            );
            found.push(self.place(request.location_id, &def, condition));
        }
        found
    }

    /// Add one unit of a catalog item. Unknown ids are ignored.
    /// Returns the key the unit was stored under.
    pub fn add_item_to_location(&mut self, location_id: &str, item_id: &str) -> Option<String> {
        let Some(def) = self.catalog.get(item_id).cloned() else {
            log::debug!("add of unknown item `{item_id}` to `{location_id}` ignored");
            return None;
        };
        let entry = self.place(location_id, &def, def.base_condition);
        Some(entry.item_id)
    }

    /// Remove units from a pile; asking for at least what is there removes
    /// the whole entry. Returns the units removed.
    pub fn remove_item_from_location(
        &mut self,
        location_id: &str,
        item_id: &str,
        quantity: u32,
    ) -> u32 {
        let Some(pile) = self.location_inventories.get_mut(location_id) else {
            return 0;
        };
        let Some(pos) = pile.iter().position(|entry| entry.item_id == item_id) else {
            log::debug!("remove of `{item_id}` from `{location_id}` ignored: not present");
            return 0;
        };
        let entry = &mut pile[pos];
        if entry.quantity > quantity {
            entry.quantity -= quantity;
            quantity
        } else {
            pile.remove(pos).quantity
        }
    }

    /// Move units from a location to the player, crediting before debiting.
    /// Only units the location holds can move. Returns the units moved.
    pub fn move_item_to_player(
        &mut self,
        location_id: &str,
        item_id: &str,
        quantity: u32,
        player: &mut PlayerInventory,
    ) -> u32 {
        if self.catalog.resolve(item_id).is_none() {
            log::debug!("move of unknown item `{item_id}` ignored");
            return 0;
        }
        let Some(entry) = self.find(location_id, item_id) else {
            log::debug!("move of `{item_id}` from `{location_id}` ignored: not present");
            return 0;
        };
        let units = quantity.min(entry.quantity);
        if units == 0 {
            return 0;
        }
        let mut credit = InventoryEntry::from(entry);
        credit.quantity = units;
        player.add_entry(credit);
        self.remove_item_from_location(location_id, item_id, units)
    }

    /// Move every entry in the pile to the player. Returns total units moved.
    pub fn take_all(&mut self, location_id: &str, player: &mut PlayerInventory) -> u32 {
        let pile: Vec<(String, u32)> = self
            .location_items(location_id)
            .iter()
            .map(|entry| (entry.item_id.clone(), entry.quantity))
            .collect();
        pile.into_iter()
            .map(|(item_id, quantity)| {
                self.move_item_to_player(location_id, &item_id, quantity, player)
            })
            .sum()
    }

    /// Consume a usable item straight from the pile.
    pub fn use_from_location(
        &mut self,
        location_id: &str,
        item_id: &str,
        quantity: u32,
        effects: &EffectTable,
        survival: &mut SurvivalState,
    ) -> ConsumeOutcome {
        let Some(def) = self.catalog.resolve(item_id) else {
            return ConsumeOutcome::Ignored;
        };
        if !def.usable {
            log::debug!("`{item_id}` is not usable");
            return ConsumeOutcome::Ignored;
        }
        let held = self.find(location_id, item_id).map_or(0, |e| e.quantity);
        let units = quantity.min(held);
        if units == 0 {
            return ConsumeOutcome::Ignored;
        }
        let had_effect = effects.apply(&def.id, units, survival);
        let removed = self.remove_item_from_location(location_id, item_id, units);
        ConsumeOutcome::Consumed {
            item_id: item_id.to_string(),
            quantity: removed,
            had_effect,
        }
    }

    /// Hand catalog items straight to the player: stackables under their
    /// definition id, anything else as fresh instances at base condition.
    /// Unknown ids are ignored. Returns the units granted.
    pub fn grant_to_player(
        &mut self,
        item_id: &str,
        quantity: u32,
        player: &mut PlayerInventory,
    ) -> u32 {
        let Some(def) = self.catalog.get(item_id).cloned() else {
            log::debug!("grant of unknown item `{item_id}` ignored");
            return 0;
        };
        if quantity == 0 {
            return 0;
        }
        if def.stackable {
            player.add_item(&def.id, quantity);
            return quantity;
        }
        for _ in 0..quantity {
            player.add_entry(InventoryEntry {
                item_id: self.mint_instance_id(&def.id),
                quantity: 1,
                condition: def.base_condition,
            });
        }
        quantity
    }

    /// Drop units from the player onto a location's pile. Stackables merge;
    /// every other unit lands as its own instance, keeping its key when it
    /// already is a free instance id. Returns the units dropped.
    pub fn drop_from_player(
        &mut self,
        location_id: &str,
        item_id: &str,
        quantity: u32,
        player: &mut PlayerInventory,
    ) -> u32 {
        let Some(def) = self.catalog.resolve(item_id).cloned() else {
            return 0;
        };
        let condition = player.condition_of(item_id).or(def.base_condition);
        let removed = player.remove_item(item_id, quantity);
        if removed == 0 {
            return 0;
        }
        if def.stackable {
            let pile = self.inventory_mut(location_id);
            if let Some(existing) = pile.iter_mut().find(|entry| entry.item_id == item_id) {
                existing.quantity = existing.quantity.saturating_add(removed);
            } else {
                pile.push(LootEntry {
                    item_id: item_id.to_string(),
                    definition_id: def.id,
                    quantity: removed,
                    condition: None,
                });
            }
            return removed;
        }
        for _ in 0..removed {
            let key = if item_id == def.id || self.find(location_id, item_id).is_some() {
                self.mint_instance_id(&def.id)
            } else {
                item_id.to_string()
            };
            self.inventory_mut(location_id).push(LootEntry {
                item_id: key,
                definition_id: def.id.clone(),
                quantity: 1,
                condition,
            });
        }
        removed
    }

    /// Forget everything lying at a location.
    pub fn clear_location_loot(&mut self, location_id: &str) {
        if let Some(pile) = self.location_inventories.get_mut(location_id) {
            pile.clear();
        }
    }

    #[must_use]
    pub fn location_items(&self, location_id: &str) -> &[LootEntry] {
        self.location_inventories
            .get(location_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn find(&self, location_id: &str, item_id: &str) -> Option<&LootEntry> {
        self.location_items(location_id)
            .iter()
            .find(|entry| entry.item_id == item_id)
    }

    #[must_use]
    pub fn location_quantity(&self, location_id: &str, item_id: &str) -> u32 {
        self.find(location_id, item_id).map_or(0, |entry| entry.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::collections::HashSet;

    fn engine() -> LootEngine {
        LootEngine::with_static_data()
    }

    fn rngs(seed: u64) -> (ChaCha20Rng, ChaCha20Rng) {
        (
            ChaCha20Rng::seed_from_u64(seed),
            ChaCha20Rng::seed_from_u64(seed ^ 0x5EED),
        )
    }

    #[test]
    fn embedded_tables_are_consistent() {
        let tables = LootTables::default_tables();
        tables
            .validate(ItemCatalog::default_catalog())
            .expect("tables reference catalog items");
        for kind in ["city", "ruins", "forest", "military", "hospital", "gas-station"] {
            assert!(tables.get(kind).is_some(), "missing table {kind}");
        }
    }

    #[test]
    fn validate_reports_missing_fallback_and_unknown_items() {
        let catalog = ItemCatalog::default_catalog();
        let mut tables = LootTables::default();
        tables.insert(
            "city",
            LootPools {
                common: vec!["water".into()],
                ..LootPools::default()
            },
        );
        assert!(matches!(
            tables.validate(catalog),
            Err(DataError::MissingFallbackTable("ruins"))
        ));
        tables.insert(
            "ruins",
            LootPools {
                common: vec!["water".into()],
                rare: vec!["plasma-rifle".into()],
                ..LootPools::default()
            },
        );
        assert!(matches!(
            tables.validate(catalog),
            Err(DataError::UnknownLootItem { item, .. }) if item == "plasma-rifle"
        ));
    }

    #[test]
    fn tier_thresholds_scale_with_efficiency() {
        assert_eq!(tier_for_roll(9.99, 1.0), RarityTier::Rare);
        assert_eq!(tier_for_roll(10.0, 1.0), RarityTier::Uncommon);
        assert_eq!(tier_for_roll(39.99, 1.0), RarityTier::Uncommon);
        assert_eq!(tier_for_roll(40.0, 1.0), RarityTier::Common);
        assert_eq!(tier_for_roll(25.0, 3.0), RarityTier::Rare);
        assert_eq!(tier_for_roll(99.0, 3.0), RarityTier::Uncommon);
        assert_eq!(tier_for_roll(99.9, 10.0), RarityTier::Rare);
        assert_eq!(tier_for_roll(1.0, 0.0), RarityTier::Common);
    }

    #[test]
    fn item_count_is_capped() {
        assert_eq!(item_count_for(0.0, 1.0), 1);
        assert_eq!(item_count_for(0.999, 1.0), 1);
        assert_eq!(item_count_for(0.5, 2.0), 2);
        assert_eq!(item_count_for(0.999, 3.0), 3);
        assert_eq!(item_count_for(0.999, 50.0), 3);
        assert_eq!(item_count_for(0.7, f64::NAN), 1);
    }

    #[test]
    fn empty_tier_falls_back_to_common() {
        let pools = LootPools {
            common: vec!["water".into()],
            uncommon: Vec::new(),
            rare: Vec::new(),
        };
        assert_eq!(pools.pool_or_common(RarityTier::Rare), ["water".to_string()]);
        assert_eq!(pools.pool_or_common(RarityTier::Uncommon), ["water".to_string()]);
    }

    #[test]
    fn condition_rolls_stay_in_bounds() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for base in [0_u8, 5, 40, 60, 95, 100] {
            for _ in 0..500 {
                let c = roll_condition(base, &mut rng);
                assert!((CONDITION_MIN..=CONDITION_MAX).contains(&c));
                let lo = i32::from(base) - CONDITION_VARIANCE;
                let hi = i32::from(base) + CONDITION_VARIANCE;
                let lo = lo.clamp(5, 100);
                let hi = hi.clamp(5, 100);
                assert!((lo..=hi).contains(&i32::from(c)), "base {base} rolled {c}");
            }
        }
    }

    #[test]
    fn add_item_merges_stackables_and_mints_instances() {
        let mut engine = engine();
        assert_eq!(engine.add_item_to_location("home", "water").as_deref(), Some("water"));
        engine.add_item_to_location("home", "water");
        let first = engine.add_item_to_location("home", "pistol").expect("pistol");
        let second = engine.add_item_to_location("home", "pistol").expect("pistol");
        assert_ne!(first, second);
        assert_eq!(engine.location_quantity("home", "water"), 2);
        assert_eq!(engine.location_items("home").len(), 3);
        assert_eq!(engine.find("home", &first).and_then(|e| e.condition), Some(60));
    }

    #[test]
    fn add_unknown_item_is_noop() {
        let mut engine = engine();
        assert!(engine.add_item_to_location("home", "laser").is_none());
        assert!(engine.location_items("home").is_empty());
    }

    #[test]
    fn remove_from_location_saturates() {
        let mut engine = engine();
        for _ in 0..3 {
            engine.add_item_to_location("home", "bandage");
        }
        assert_eq!(engine.remove_item_from_location("home", "bandage", 1), 1);
        assert_eq!(engine.location_quantity("home", "bandage"), 2);
        assert_eq!(engine.remove_item_from_location("home", "bandage", 9), 2);
        assert!(engine.find("home", "bandage").is_none());
        assert_eq!(engine.remove_item_from_location("home", "bandage", 1), 0);
        assert_eq!(engine.remove_item_from_location("nowhere", "bandage", 1), 0);
    }

    #[test]
    fn move_conserves_units() {
        let mut engine = engine();
        let mut player = PlayerInventory::new();
        for _ in 0..5 {
            engine.add_item_to_location("city", "water");
        }
        assert_eq!(engine.move_item_to_player("city", "water", 5, &mut player), 5);
        assert!(engine.location_items("city").is_empty());
        assert_eq!(player.get_item_quantity("water"), 5);
    }

    #[test]
    fn partial_move_leaves_remainder() {
        let mut engine = engine();
        let mut player = PlayerInventory::new();
        player.add_item("water", 1);
        for _ in 0..4 {
            engine.add_item_to_location("city", "water");
        }
        engine.move_item_to_player("city", "water", 3, &mut player);
        assert_eq!(engine.location_quantity("city", "water"), 1);
        assert_eq!(player.get_item_quantity("water"), 4);
    }

    #[test]
    fn move_cannot_exceed_location_stock() {
        let mut engine = engine();
        let mut player = PlayerInventory::new();
        engine.add_item_to_location("city", "water");
        assert_eq!(engine.move_item_to_player("city", "water", 10, &mut player), 1);
        assert_eq!(player.get_item_quantity("water"), 1);
        assert_eq!(engine.move_item_to_player("city", "water", 1, &mut player), 0);
        assert_eq!(engine.move_item_to_player("city", "laser", 1, &mut player), 0);
        assert_eq!(player.get_item_quantity("water"), 1);
    }

    #[test]
    fn moved_instances_keep_identity_and_condition() {
        let mut engine = engine();
        let mut player = PlayerInventory::new();
        let key = engine.add_item_to_location("base", "rifle").expect("rifle");
        engine.move_item_to_player("base", &key, 1, &mut player);
        assert_eq!(player.get_item_quantity(&key), 1);
        assert_eq!(player.condition_of(&key), Some(45));
    }

    #[test]
    fn take_all_empties_pile() {
        let mut engine = engine();
        let mut player = PlayerInventory::new();
        engine.add_item_to_location("city", "water");
        engine.add_item_to_location("city", "water");
        engine.add_item_to_location("city", "jacket");
        assert_eq!(engine.take_all("city", &mut player), 3);
        assert!(engine.location_items("city").is_empty());
        assert_eq!(player.get_item_quantity("water"), 2);
        assert_eq!(player.len(), 2);
    }

    #[test]
    fn use_from_location_requires_usable_item() {
        let mut engine = engine();
        let effects = EffectTable::default_table();
        let mut survival = SurvivalState::new(50.0, 0.0, 0.0, 0.0);
        engine.add_item_to_location("clinic", "medkit");
        engine.add_item_to_location("clinic", "medkit");
        let ammo = engine.add_item_to_location("clinic", "pistol-ammo").expect("ammo");

        let outcome = engine.use_from_location("clinic", "medkit", 1, effects, &mut survival);
        assert!(matches!(outcome, ConsumeOutcome::Consumed { quantity: 1, .. }));
        assert!((survival.health() - 75.0).abs() < 1e-9);
        assert_eq!(engine.location_quantity("clinic", "medkit"), 1);

        assert_eq!(
            engine.use_from_location("clinic", &ammo, 1, effects, &mut survival),
            ConsumeOutcome::Ignored
        );
        assert_eq!(engine.location_quantity("clinic", &ammo), 1);
    }

    #[test]
    fn drop_returns_items_to_pile() {
        let mut engine = engine();
        let mut player = PlayerInventory::new();
        player.add_item("fuel", 3);
        assert_eq!(engine.drop_from_player("gas-station", "fuel", 2, &mut player), 2);
        assert_eq!(engine.location_quantity("gas-station", "fuel"), 2);
        assert_eq!(player.get_item_quantity("fuel"), 1);
        assert_eq!(engine.drop_from_player("gas-station", "water", 1, &mut player), 0);
    }

    #[test]
    fn drop_non_stackable_keeps_instances() {
        let mut engine = engine();
        let mut player = PlayerInventory::new();
        player.add_item("flashlight", 1);
        assert_eq!(engine.drop_from_player("home", "flashlight", 1, &mut player), 1);
        player.add_item("flashlight", 2);
        assert_eq!(engine.drop_from_player("home", "flashlight", 2, &mut player), 2);

        let pile = engine.location_items("home");
        assert_eq!(pile.len(), 3);
        let keys: HashSet<&str> = pile.iter().map(|e| e.item_id.as_str()).collect();
        assert_eq!(keys.len(), 3);
        for entry in pile {
            assert!(entry.is_instance(), "{} merged under its definition", entry.item_id);
            assert_eq!(entry.quantity, 1);
            assert_eq!(entry.condition, Some(70));
        }
    }

    #[test]
    fn dropped_instance_keeps_its_key_and_condition() {
        let mut engine = engine();
        let mut player = PlayerInventory::new();
        assert_eq!(engine.grant_to_player("rifle", 1, &mut player), 1);
        let key = player.entries()[0].item_id.clone();
        assert_eq!(engine.drop_from_player("base", &key, 1, &mut player), 1);
        let entry = engine.find("base", &key).expect("instance on the pile");
        assert_eq!(entry.condition, Some(45));
        assert!(player.is_empty());
    }

    #[test]
    fn grant_mints_instances_for_gear_only() {
        let mut engine = engine();
        let mut player = PlayerInventory::new();
        assert_eq!(engine.grant_to_player("pistol", 2, &mut player), 2);
        assert_eq!(engine.grant_to_player("water", 3, &mut player), 3);
        assert_eq!(engine.grant_to_player("laser", 1, &mut player), 0);
        assert_eq!(player.len(), 3);
        assert_eq!(player.definition_quantity("pistol"), 2);
        assert!(!player.has_item("pistol", 1));
        assert_eq!(player.get_item_quantity("water"), 3);
        assert!(
            player
                .entries()
                .iter()
                .filter(|e| e.definition_id() == "pistol")
                .all(|e| e.condition == Some(60))
        );
    }

    #[test]
    fn clear_empties_only_that_location() {
        let mut engine = engine();
        engine.add_item_to_location("a", "water");
        engine.add_item_to_location("b", "water");
        engine.clear_location_loot("a");
        assert!(engine.location_items("a").is_empty());
        assert_eq!(engine.location_quantity("b", "water"), 1);
    }

    #[test]
    fn generation_returns_only_this_search() {
        let mut engine = engine();
        engine.add_item_to_location("city", "cigarettes");
        let (mut rng, mut wear) = rngs(11);
        let request = LootRequest {
            location_id: "city",
            location_type: "city",
            search_efficiency: 1.0,
        };
        let found = engine.generate_loot(&request, &mut rng, &mut wear);
        assert!((1..=3).contains(&found.len()));
        let pile_units: u32 = engine.location_items("city").iter().map(|e| e.quantity).sum();
        assert_eq!(pile_units, 1 + u32::try_from(found.len()).unwrap());
    }

    #[test]
    fn unknown_location_type_uses_ruins_table() {
        let mut engine = engine();
        let ruins = LootTables::default_tables().get("ruins").unwrap().clone();
        let (mut rng, mut wear) = rngs(3);
        for _ in 0..50 {
            let request = LootRequest {
                location_id: "mystery",
                location_type: "volcano",
                search_efficiency: 1.0,
            };
            for entry in engine.generate_loot(&request, &mut rng, &mut wear) {
                assert!(ruins.contains(&entry.definition_id));
            }
        }
    }

    #[test]
    fn same_seed_generates_same_loot() {
        let request = LootRequest {
            location_id: "mall",
            location_type: "city",
            search_efficiency: 1.5,
        };
        let mut a = engine();
        let mut b = engine();
        let (mut rng_a, mut wear_a) = rngs(99);
        let (mut rng_b, mut wear_b) = rngs(99);
        for _ in 0..10 {
            assert_eq!(
                a.generate_loot(&request, &mut rng_a, &mut wear_a),
                b.generate_loot(&request, &mut rng_b, &mut wear_b)
            );
        }
    }
}
