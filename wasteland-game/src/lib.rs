//! Wasteland Game Engine
//!
//! Platform-agnostic core logic for a post-apocalyptic scavenging game: item
//! catalog, loot generation, inventories, the map, the clock and survival
//! decay. No UI or platform-specific dependencies.

pub mod catalog;
pub mod constants;
pub mod effects;
pub mod error;
pub mod inventory;
pub mod locations;
pub mod loot;
pub mod numbers;
pub mod rng;
pub mod session;
pub mod survival;
pub mod time;

// Re-export commonly used types
pub use catalog::{ItemCatalog, ItemCategory, ItemDef, definition_id, instance_id};
pub use effects::{EffectTable, ItemEffect};
pub use error::DataError;
pub use inventory::{ConsumeOutcome, InventoryEntry, PlayerInventory};
pub use locations::{Location, LocationKind, LocationRegistry, Route};
pub use loot::{
    GeneratedLoot, LootEngine, LootEntry, LootPools, LootRequest, LootTables, RarityTier,
};
pub use rng::{CountingRng, RngBundle};
pub use session::{GameData, GameSession, SessionSnapshot, TickOutcome, TravelOutcome};
pub use survival::{SurvivalConfig, SurvivalState};
pub use time::{DayPhase, GameClock};

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// # Errors
    ///
    /// Returns an error if the item catalog cannot be loaded.
    fn load_catalog(&self) -> Result<ItemCatalog, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the loot tables cannot be loaded.
    fn load_loot_tables(&self) -> Result<LootTables, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the effect table cannot be loaded.
    fn load_effects(&self) -> Result<EffectTable, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the location list cannot be loaded.
    fn load_locations(&self) -> Result<LocationRegistry, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the survival tuning cannot be loaded.
    fn load_survival_config(&self) -> Result<SurvivalConfig, Self::Error>;

    /// Load every asset a session needs.
    ///
    /// # Errors
    ///
    /// Returns the first loader error encountered.
    fn load_game_data(&self) -> Result<GameData, Self::Error> {
        collect_game_data(self)
    }
}

/// Run each per-asset loader once, without cross-checking the results.
fn collect_game_data<L: DataLoader + ?Sized>(loader: &L) -> Result<GameData, L::Error> {
    Ok(GameData {
        catalog: loader.load_catalog()?,
        loot_tables: loader.load_loot_tables()?,
        effects: loader.load_effects()?,
        survival: loader.load_survival_config()?,
        locations: loader.load_locations()?,
    })
}

/// Loader over the assets embedded in this crate. Unlike the `load_from_static`
/// helpers it reports malformed data instead of falling back to empty sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDataLoader;

impl DataLoader for StaticDataLoader {
    type Error = DataError;

    fn load_catalog(&self) -> Result<ItemCatalog, Self::Error> {
        ItemCatalog::from_json(include_str!("../assets/data/items.json"))
    }

    fn load_loot_tables(&self) -> Result<LootTables, Self::Error> {
        LootTables::from_json(include_str!("../assets/data/loot_tables.json"))
    }

    fn load_effects(&self) -> Result<EffectTable, Self::Error> {
        EffectTable::from_json(include_str!("../assets/data/effects.json"))
    }

    fn load_locations(&self) -> Result<LocationRegistry, Self::Error> {
        LocationRegistry::from_json(include_str!("../assets/data/locations.json"))
    }

    fn load_survival_config(&self) -> Result<SurvivalConfig, Self::Error> {
        SurvivalConfig::from_json(include_str!("../assets/data/survival.json"))
    }

    fn load_game_data(&self) -> Result<GameData, Self::Error> {
        let data = collect_game_data(self)?;
        data.validate()?;
        Ok(data)
    }
}

/// Main game engine for creating game sessions
pub struct GameEngine<L>
where
    L: DataLoader,
{
    data_loader: L,
}

impl<L> GameEngine<L>
where
    L: DataLoader,
{
    /// Create a new game engine with the provided data loader
    pub const fn new(data_loader: L) -> Self {
        Self { data_loader }
    }

    #[must_use]
    pub const fn data_loader(&self) -> &L {
        &self.data_loader
    }

    /// Construct a fresh session seeded with `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the game data cannot be loaded.
    pub fn create_session(&self, seed: u64) -> Result<GameSession, L::Error> {
        let data = self.data_loader.load_game_data()?;
        log::debug!(
            "creating session {seed:#x} with {} items, {} locations",
            data.catalog.len(),
            data.locations.len()
        );
        Ok(GameSession::new(seed, data))
    }
}

impl Default for GameEngine<StaticDataLoader> {
    fn default() -> Self {
        Self::new(StaticDataLoader)
    }
}
