//! Per-item survival effects applied when an item is consumed.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::catalog::ItemCatalog;
use crate::error::DataError;
use crate::numbers::u32_to_f64;
use crate::survival::SurvivalState;

const DEFAULT_EFFECT_DATA: &str = include_str!("../assets/data/effects.json");

/// Stat deltas for one consumed unit. Negative hunger/thirst/radiation
/// relieve the deficit; positive health heals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ItemEffect {
    #[serde(default)]
    pub health: f64,
    #[serde(default)]
    pub hunger: f64,
    #[serde(default)]
    pub thirst: f64,
    #[serde(default)]
    pub radiation: f64,
}

impl ItemEffect {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.health == 0.0 && self.hunger == 0.0 && self.thirst == 0.0 && self.radiation == 0.0
    }

    /// Apply `quantity` units of this effect.
    pub fn apply(&self, quantity: u32, survival: &mut SurvivalState) {
        let units = u32_to_f64(quantity);
        if self.health != 0.0 {
            survival.adjust_health(self.health * units);
        }
        if self.hunger < 0.0 {
            survival.eat(-self.hunger * units);
        } else if self.hunger > 0.0 {
            survival.increase_hunger(self.hunger * units);
        }
        if self.thirst < 0.0 {
            survival.drink(-self.thirst * units);
        } else if self.thirst > 0.0 {
            survival.increase_thirst(self.thirst * units);
        }
        if self.radiation != 0.0 {
            survival.adjust_radiation(self.radiation * units);
        }
    }
}

/// Effect lookup keyed by item definition id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EffectTable {
    #[serde(default)]
    effects: HashMap<String, ItemEffect>,
}

impl EffectTable {
    #[must_use]
    pub fn load_from_static() -> Self {
        match Self::from_json(DEFAULT_EFFECT_DATA) {
            Ok(table) => table,
            Err(err) => {
                log::error!("embedded effect table rejected: {err}");
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn default_table() -> &'static Self {
        static TABLE: OnceLock<EffectTable> = OnceLock::new();
        TABLE.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into an effect table.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        serde_json::from_str(json).map_err(|e| DataError::parse("effects", e))
    }

    /// # Errors
    ///
    /// Returns an error naming the first effect keyed by an unknown item.
    pub fn validate(&self, catalog: &ItemCatalog) -> Result<(), DataError> {
        let mut ids: Vec<&String> = self.effects.keys().collect();
        ids.sort();
        match ids.into_iter().find(|id| !catalog.contains(id)) {
            Some(id) => Err(DataError::UnknownEffectItem(id.clone())),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn get(&self, def_id: &str) -> Option<&ItemEffect> {
        self.effects.get(def_id)
    }

    pub fn insert(&mut self, def_id: impl Into<String>, effect: ItemEffect) {
        self.effects.insert(def_id.into(), effect);
    }

    /// Apply the effect for `def_id`, returning false when none is defined.
    pub fn apply(&self, def_id: &str, quantity: u32, survival: &mut SurvivalState) -> bool {
        match self.get(def_id) {
            Some(effect) => {
                effect.apply(quantity, survival);
                true
            }
            None => {
                log::debug!("no survival effect defined for `{def_id}`");
                false
            }
        }
    }
}
