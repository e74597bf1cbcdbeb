//! Centralized balance and tuning constants for Wasteland game logic.
//!
//! These values define the deterministic math for the core simulation.
//! Data-driven content (items, loot tables, locations) lives in JSON assets;
//! the numbers that shape the rolls live here.

// Loot generation ----------------------------------------------------------
/// Upper bound on the efficiency contribution to the per-search item count.
pub const LOOT_COUNT_EFFICIENCY_CAP: f64 = 3.0;
/// Rare band threshold at efficiency 1.0, on a 0..100 roll.
pub const LOOT_RARE_THRESHOLD: f64 = 10.0;
/// Uncommon band threshold at efficiency 1.0, on a 0..100 roll.
pub const LOOT_UNCOMMON_THRESHOLD: f64 = 40.0;
/// Floor applied to non-positive or non-finite search efficiency.
pub const MIN_SEARCH_EFFICIENCY: f64 = 0.1;
/// Baseline search efficiency.
pub const BASE_SEARCH_EFFICIENCY: f64 = 1.0;
/// Location type whose table is used when the requested type is unknown.
pub const FALLBACK_LOOT_TABLE: &str = "ruins";
/// Condition variance applied to each rolled instance (inclusive, +/-).
pub const CONDITION_VARIANCE: i32 = 15;
pub const CONDITION_MIN: u8 = 5;
pub const CONDITION_MAX: u8 = 100;
/// Separator between a definition id and an instance serial.
pub const INSTANCE_SEPARATOR: char = '#';

// Clock ---------------------------------------------------------------------
pub const MINUTES_PER_HOUR: u32 = 60;
pub const HOURS_PER_DAY: u32 = 24;
pub const START_DAY: u32 = 1;
pub const START_HOUR: u32 = 8;
pub const MORNING_START_HOUR: u32 = 5;
pub const DAY_START_HOUR: u32 = 11;
pub const EVENING_START_HOUR: u32 = 18;
pub const NIGHT_START_HOUR: u32 = 22;

// Survival -------------------------------------------------------------------
pub const STAT_MIN: f64 = 0.0;
pub const STAT_MAX: f64 = 100.0;
pub const START_HEALTH: f64 = 100.0;
pub const START_HUNGER: f64 = 50.0;
pub const START_THIRST: f64 = 50.0;
pub const START_RADIATION: f64 = 0.0;
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 70.0;
pub const DEFAULT_HEALTH_DECAY_PER_MINUTE: f64 = 0.1;
pub const DEFAULT_HUNGER_PER_MINUTE: f64 = 0.02;
pub const DEFAULT_THIRST_PER_MINUTE: f64 = 0.03;

// Actions ----------------------------------------------------------------------
pub const SEARCH_MINUTES: u32 = 30;
pub const REST_MINUTES: u32 = 8 * 60;
pub const TICK_MINUTES: u32 = 1;
pub const HOME_LOCATION_ID: &str = "home";

// Map --------------------------------------------------------------------------
/// Longest map distance that still gets a direct route.
pub const ROUTE_MAX_DISTANCE: f64 = 25.0;
/// Nearest neighbours each discovered location connects to.
pub const ROUTE_MAX_NEIGHBOURS: usize = 3;
/// Kilometres per map unit.
pub const KM_PER_MAP_UNIT: f64 = 0.5;
pub const DEFAULT_MINUTES_PER_KM: u32 = 12;

/// Starting kit handed to a new survivor.
pub const STARTING_KIT: [&str; 6] = [
    "pistol",
    "pistol-ammo",
    "medkit",
    "canned-meat",
    "water",
    "flashlight",
];
