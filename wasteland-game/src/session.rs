//! Owned game session binding the clock, survivor, map and loot engine to a
//! seeded RNG bundle.
use serde::Serialize;

use crate::catalog::ItemCatalog;
use crate::constants::{
    BASE_SEARCH_EFFICIENCY, HOME_LOCATION_ID, REST_MINUTES, SEARCH_MINUTES, STARTING_KIT,
    TICK_MINUTES,
};
use crate::effects::EffectTable;
use crate::error::DataError;
use crate::inventory::{ConsumeOutcome, InventoryEntry, PlayerInventory};
use crate::locations::{Location, LocationRegistry, Route};
use crate::loot::{GeneratedLoot, LootEngine, LootEntry, LootRequest, LootTables};
use crate::rng::RngBundle;
use crate::survival::{SurvivalConfig, SurvivalState};
use crate::time::{DayPhase, GameClock};

/// Reference data a session is built from.
#[derive(Debug, Clone)]
pub struct GameData {
    pub catalog: ItemCatalog,
    pub loot_tables: LootTables,
    pub effects: EffectTable,
    pub survival: SurvivalConfig,
    pub locations: LocationRegistry,
}

impl GameData {
    /// Embedded assets, unvalidated.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self {
            catalog: ItemCatalog::default_catalog().clone(),
            loot_tables: LootTables::default_tables().clone(),
            effects: EffectTable::default_table().clone(),
            survival: SurvivalConfig::load_from_static(),
            locations: LocationRegistry::default_registry().clone(),
        }
    }

    /// Cross-check loot tables and effects against the catalog.
    ///
    /// # Errors
    ///
    /// Returns the first reference to an item the catalog does not define.
    pub fn validate(&self) -> Result<(), DataError> {
        self.loot_tables.validate(&self.catalog)?;
        self.effects.validate(&self.catalog)
    }
}

/// Result of a `tick` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TickOutcome {
    Paused,
    Advanced,
    Dead,
}

/// Result of a travel request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TravelOutcome {
    Arrived {
        from: Option<String>,
        to: String,
        minutes: u32,
    },
    UnknownLocation,
    NotAccessible,
    AlreadyHere,
    Dead,
}

/// Serializable view of a session for reports and rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub seed: u64,
    pub day: u32,
    pub time: String,
    pub phase: DayPhase,
    pub paused: bool,
    pub location: Option<String>,
    pub health: f64,
    pub hunger: f64,
    pub thirst: f64,
    pub radiation: f64,
    pub inventory: Vec<InventoryEntry>,
    pub location_items: Vec<LootEntry>,
    pub carried_weight: f64,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    loot: LootEngine,
    effects: EffectTable,
    survival_cfg: SurvivalConfig,
    locations: LocationRegistry,
    player: PlayerInventory,
    clock: GameClock,
    survival: SurvivalState,
    rng: RngBundle,
}

impl GameSession {
    /// Fresh session at home with the starting kit.
    #[must_use]
    pub fn new(seed: u64, data: GameData) -> Self {
        let GameData {
            catalog,
            loot_tables,
            effects,
            survival,
            mut locations,
        } = data;
        if !locations.set_current(HOME_LOCATION_ID) {
            log::debug!("no accessible `{HOME_LOCATION_ID}` location; session starts off-map");
        }
        let mut loot = LootEngine::new(catalog, loot_tables);
        let mut player = PlayerInventory::new();
        for item in STARTING_KIT {
            loot.grant_to_player(item, 1, &mut player);
        }
        Self {
            loot,
            effects,
            survival_cfg: survival,
            locations,
            player,
            clock: GameClock::default(),
            survival: SurvivalState::default(),
            rng: RngBundle::from_user_seed(seed),
        }
    }

    /// Session over the embedded assets.
    #[must_use]
    pub fn with_static_data(seed: u64) -> Self {
        Self::new(seed, GameData::load_from_static())
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    #[must_use]
    pub const fn clock(&self) -> &GameClock {
        &self.clock
    }

    #[must_use]
    pub const fn survival(&self) -> &SurvivalState {
        &self.survival
    }

    pub const fn survival_mut(&mut self) -> &mut SurvivalState {
        &mut self.survival
    }

    #[must_use]
    pub const fn survival_config(&self) -> &SurvivalConfig {
        &self.survival_cfg
    }

    #[must_use]
    pub const fn player(&self) -> &PlayerInventory {
        &self.player
    }

    #[must_use]
    pub const fn locations(&self) -> &LocationRegistry {
        &self.locations
    }

    pub const fn locations_mut(&mut self) -> &mut LocationRegistry {
        &mut self.locations
    }

    #[must_use]
    pub const fn catalog(&self) -> &ItemCatalog {
        self.loot.catalog()
    }

    #[must_use]
    pub const fn loot(&self) -> &LootEngine {
        &self.loot
    }

    #[must_use]
    pub const fn rng(&self) -> &RngBundle {
        &self.rng
    }

    #[must_use]
    pub fn current_location(&self) -> Option<&Location> {
        self.locations.current()
    }

    fn current_id(&self) -> Option<String> {
        self.locations.current().map(|loc| loc.id.clone())
    }

    /// Items lying at the current location.
    #[must_use]
    pub fn location_items(&self) -> &[LootEntry] {
        self.locations
            .current()
            .map(|loc| self.loot.location_items(&loc.id))
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn routes(&self) -> Vec<Route> {
        self.locations.routes()
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.survival.is_dead()
    }

    pub const fn toggle_pause(&mut self) {
        self.clock.toggle_pause();
    }

    pub const fn set_paused(&mut self, paused: bool) {
        self.clock.set_paused(paused);
    }

    /// Advance the clock and run survival decay for the same span.
    fn pass_time(&mut self, minutes: u32) {
        self.clock.advance_time(minutes);
        self.survival.apply_minutes(minutes, &self.survival_cfg);
        if self.survival.is_dead() {
            log::info!("survivor died on {}", self.clock);
        }
    }

    /// One real-time tick. Paused clocks do not move.
    pub fn tick(&mut self) -> TickOutcome {
        if self.clock.is_paused() {
            return TickOutcome::Paused;
        }
        if self.is_dead() {
            return TickOutcome::Dead;
        }
        self.pass_time(TICK_MINUTES);
        TickOutcome::Advanced
    }

    /// Spend half an hour searching the current location.
    pub fn search(&mut self, search_efficiency: f64) -> GeneratedLoot {
        let Some(location) = self.locations.current() else {
            log::debug!("search ignored: no current location");
            return GeneratedLoot::new();
        };
        if self.survival.is_dead() {
            return GeneratedLoot::new();
        }
        let location_id = location.id.clone();
        let location_type = location.kind.as_str();
        self.pass_time(SEARCH_MINUTES);
        if self.survival.is_dead() {
            log::debug!("search of `{location_id}` cut short: survivor died");
            return GeneratedLoot::new();
        }
        let request = LootRequest {
            location_id: &location_id,
            location_type,
            search_efficiency,
        };
        let (loot_rng, condition_rng) = self.rng.split();
        let found = self.loot.generate_loot(&request, loot_rng, condition_rng);
        log::debug!("search of `{location_id}` found {} item(s)", found.len());
        found
    }

    /// Search at baseline efficiency.
    pub fn search_default(&mut self) -> GeneratedLoot {
        self.search(BASE_SEARCH_EFFICIENCY)
    }

    /// Pick up units from the current location.
    pub fn take(&mut self, item_id: &str, quantity: u32) -> u32 {
        let Some(location_id) = self.current_id() else {
            return 0;
        };
        self.loot
            .move_item_to_player(&location_id, item_id, quantity, &mut self.player)
    }

    pub fn take_all(&mut self) -> u32 {
        let Some(location_id) = self.current_id() else {
            return 0;
        };
        self.loot.take_all(&location_id, &mut self.player)
    }

    /// Use an item lying at the current location without picking it up.
    pub fn use_from_location(&mut self, item_id: &str, quantity: u32) -> ConsumeOutcome {
        let Some(location_id) = self.current_id() else {
            return ConsumeOutcome::Ignored;
        };
        self.loot.use_from_location(
            &location_id,
            item_id,
            quantity,
            &self.effects,
            &mut self.survival,
        )
    }

    /// Consume from the player's inventory.
    pub fn consume(&mut self, item_id: &str, quantity: u32) -> ConsumeOutcome {
        self.player.consume_item(
            item_id,
            quantity,
            self.loot.catalog(),
            &self.effects,
            &mut self.survival,
        )
    }

    /// Drop units from the player onto the current location.
    pub fn drop_item(&mut self, item_id: &str, quantity: u32) -> u32 {
        let Some(location_id) = self.current_id() else {
            return 0;
        };
        self.loot
            .drop_from_player(&location_id, item_id, quantity, &mut self.player)
    }

    /// Walk to another accessible location. Loot left behind is lost.
    pub fn travel_to(&mut self, destination: &str) -> TravelOutcome {
        if self.is_dead() {
            return TravelOutcome::Dead;
        }
        let Some(target) = self.locations.get(destination) else {
            log::debug!("travel to unknown location `{destination}` ignored");
            return TravelOutcome::UnknownLocation;
        };
        if !target.accessible {
            return TravelOutcome::NotAccessible;
        }
        let from = self.current_id();
        if from.as_deref() == Some(destination) {
            return TravelOutcome::AlreadyHere;
        }
        let minutes = from
            .as_deref()
            .and_then(|origin| self.locations.travel_minutes(origin, destination))
            .unwrap_or(0);

        self.pass_time(minutes);
        if let Some(origin) = from.as_deref() {
            self.loot.clear_location_loot(origin);
        }
        self.locations.discover(destination);
        self.locations.set_current(destination);
        log::debug!("travelled {from:?} -> `{destination}` in {minutes} min");
        TravelOutcome::Arrived {
            from,
            to: destination.to_string(),
            minutes,
        }
    }

    /// Sleep through the night. Only possible at home.
    pub fn rest(&mut self) -> bool {
        if self.is_dead() || self.current_id().as_deref() != Some(HOME_LOCATION_ID) {
            log::debug!("rest ignored away from `{HOME_LOCATION_ID}`");
            return false;
        }
        self.pass_time(REST_MINUTES);
        true
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            seed: self.seed(),
            day: self.clock.day(),
            time: self.clock.format_time(),
            phase: self.clock.day_phase(),
            paused: self.clock.is_paused(),
            location: self.current_id(),
            health: self.survival.health(),
            hunger: self.survival.hunger(),
            thirst: self.survival.thirst(),
            radiation: self.survival.radiation(),
            inventory: self.player.entries().to_vec(),
            location_items: self.location_items().to_vec(),
            carried_weight: self.player.total_weight(self.loot.catalog()),
        }
    }
}
