//! Player vital statistics and the rules that wear them down over time.
//!
//! Hunger and thirst are deficits: higher values mean a hungrier, thirstier
//! survivor. Every stat lives in `[0, 100]`.
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CRITICAL_THRESHOLD, DEFAULT_HEALTH_DECAY_PER_MINUTE, DEFAULT_HUNGER_PER_MINUTE,
    DEFAULT_THIRST_PER_MINUTE, START_HEALTH, START_HUNGER, START_RADIATION, START_THIRST,
};
use crate::error::DataError;
use crate::numbers::clamp_stat;

const DEFAULT_SURVIVAL_DATA: &str = include_str!("../assets/data/survival.json");

/// Tuning for passive decay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalConfig {
    /// Hunger or thirst strictly above this value drains health.
    #[serde(default = "SurvivalConfig::default_critical_threshold")]
    pub critical_threshold: f64,
    #[serde(default = "SurvivalConfig::default_health_decay")]
    pub health_decay_per_minute: f64,
    #[serde(default = "SurvivalConfig::default_hunger_rate")]
    pub hunger_per_minute: f64,
    #[serde(default = "SurvivalConfig::default_thirst_rate")]
    pub thirst_per_minute: f64,
}

impl Default for SurvivalConfig {
    fn default() -> Self {
        Self {
            critical_threshold: Self::default_critical_threshold(),
            health_decay_per_minute: Self::default_health_decay(),
            hunger_per_minute: Self::default_hunger_rate(),
            thirst_per_minute: Self::default_thirst_rate(),
        }
    }
}

impl SurvivalConfig {
    const fn default_critical_threshold() -> f64 {
        DEFAULT_CRITICAL_THRESHOLD
    }

    const fn default_health_decay() -> f64 {
        DEFAULT_HEALTH_DECAY_PER_MINUTE
    }

    const fn default_hunger_rate() -> f64 {
        DEFAULT_HUNGER_PER_MINUTE
    }

    const fn default_thirst_rate() -> f64 {
        DEFAULT_THIRST_PER_MINUTE
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_SURVIVAL_DATA).unwrap_or_default()
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a survival config.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        serde_json::from_str(json).map_err(|e| DataError::parse("survival", e))
    }

    /// Config with passive hunger/thirst growth switched off; deficits only
    /// move through explicit eat/drink calls.
    #[must_use]
    pub fn without_passive_growth(mut self) -> Self {
        self.hunger_per_minute = 0.0;
        self.thirst_per_minute = 0.0;
        self
    }
}

/// Health, hunger, thirst and radiation of the survivor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalState {
    health: f64,
    hunger: f64,
    thirst: f64,
    radiation: f64,
}

impl Default for SurvivalState {
    fn default() -> Self {
        Self {
            health: START_HEALTH,
            hunger: START_HUNGER,
            thirst: START_THIRST,
            radiation: START_RADIATION,
        }
    }
}

impl SurvivalState {
    /// Build a state from raw values, clamping each into range.
    #[must_use]
    pub fn new(health: f64, hunger: f64, thirst: f64, radiation: f64) -> Self {
        Self {
            health: clamp_stat(health),
            hunger: clamp_stat(hunger),
            thirst: clamp_stat(thirst),
            radiation: clamp_stat(radiation),
        }
    }

    #[must_use]
    pub const fn health(&self) -> f64 {
        self.health
    }

    #[must_use]
    pub const fn hunger(&self) -> f64 {
        self.hunger
    }

    #[must_use]
    pub const fn thirst(&self) -> f64 {
        self.thirst
    }

    #[must_use]
    pub const fn radiation(&self) -> f64 {
        self.radiation
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Signed health primitive: positive heals, negative damages.
    pub fn adjust_health(&mut self, delta: f64) {
        self.health = clamp_stat(self.health + delta);
    }

    pub fn take_damage(&mut self, amount: f64) {
        self.adjust_health(-amount);
    }

    pub fn heal(&mut self, amount: f64) {
        self.adjust_health(amount);
    }

    /// Reduce hunger deficit.
    pub fn eat(&mut self, amount: f64) {
        self.hunger = clamp_stat(self.hunger - amount);
    }

    /// Reduce thirst deficit.
    pub fn drink(&mut self, amount: f64) {
        self.thirst = clamp_stat(self.thirst - amount);
    }

    pub fn increase_hunger(&mut self, amount: f64) {
        self.hunger = clamp_stat(self.hunger + amount);
    }

    pub fn increase_thirst(&mut self, amount: f64) {
        self.thirst = clamp_stat(self.thirst + amount);
    }

    pub fn adjust_radiation(&mut self, delta: f64) {
        self.radiation = clamp_stat(self.radiation + delta);
    }

    /// Whether either deficit sits above the critical threshold.
    #[must_use]
    pub fn is_critical(&self, cfg: &SurvivalConfig) -> bool {
        self.hunger > cfg.critical_threshold || self.thirst > cfg.critical_threshold
    }

    /// Apply one simulated minute of decay.
    pub fn tick_minute(&mut self, cfg: &SurvivalConfig) {
        self.increase_hunger(cfg.hunger_per_minute);
        self.increase_thirst(cfg.thirst_per_minute);
        if self.is_critical(cfg) {
            self.adjust_health(-cfg.health_decay_per_minute);
        }
    }

    /// Apply `minutes` of decay, minute by minute, so the threshold check
    /// sees every intermediate deficit.
    pub fn apply_minutes(&mut self, minutes: u32, cfg: &SurvivalConfig) {
        for _ in 0..minutes {
            if self.is_dead() {
                break;
            }
            self.tick_minute(cfg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn starting_values_match_new_survivor() {
        let state = SurvivalState::default();
        assert!(approx(state.health(), 100.0));
        assert!(approx(state.hunger(), 50.0));
        assert!(approx(state.thirst(), 50.0));
        assert!(approx(state.radiation(), 0.0));
    }

    #[test]
    fn adjust_health_uses_one_sign_convention() {
        let mut state = SurvivalState::new(50.0, 0.0, 0.0, 0.0);
        state.adjust_health(-20.0);
        assert!(approx(state.health(), 30.0));
        state.adjust_health(15.0);
        assert!(approx(state.health(), 45.0));
        state.take_damage(100.0);
        assert!(approx(state.health(), 0.0));
        assert!(state.is_dead());
        state.heal(250.0);
        assert!(approx(state.health(), 100.0));
    }

    #[test]
    fn eat_and_drink_clamp_at_zero() {
        let mut state = SurvivalState::new(100.0, 20.0, 10.0, 0.0);
        state.eat(30.0);
        state.drink(40.0);
        assert!(approx(state.hunger(), 0.0));
        assert!(approx(state.thirst(), 0.0));
    }

    #[test]
    fn increases_clamp_at_hundred() {
        let mut state = SurvivalState::new(100.0, 95.0, 99.0, 90.0);
        state.increase_hunger(10.0);
        state.increase_thirst(10.0);
        state.adjust_radiation(25.0);
        assert!(approx(state.hunger(), 100.0));
        assert!(approx(state.thirst(), 100.0));
        assert!(approx(state.radiation(), 100.0));
        state.adjust_radiation(-120.0);
        assert!(approx(state.radiation(), 0.0));
    }

    #[test]
    fn below_threshold_health_holds() {
        let cfg = SurvivalConfig::default().without_passive_growth();
        let mut state = SurvivalState::new(80.0, 70.0, 10.0, 0.0);
        state.apply_minutes(120, &cfg);
        assert!(approx(state.health(), 80.0));
    }

    #[test]
    fn critical_hunger_drains_health_each_minute() {
        let cfg = SurvivalConfig::default().without_passive_growth();
        let mut state = SurvivalState::new(50.0, 80.0, 0.0, 0.0);
        let mut previous = state.health();
        for _ in 0..100 {
            state.tick_minute(&cfg);
            assert!(state.health() < previous);
            previous = state.health();
        }
        assert!(approx(state.health(), 40.0));
    }

    #[test]
    fn drain_stops_once_deficit_recovers() {
        let cfg = SurvivalConfig::default().without_passive_growth();
        let mut state = SurvivalState::new(60.0, 0.0, 90.0, 0.0);
        state.apply_minutes(10, &cfg);
        assert!(approx(state.health(), 59.0));
        state.drink(40.0);
        state.apply_minutes(10, &cfg);
        assert!(approx(state.health(), 59.0));
    }

    #[test]
    fn passive_growth_eventually_turns_critical() {
        let cfg = SurvivalConfig::default();
        let mut state = SurvivalState::default();
        assert!(!state.is_critical(&cfg));
        state.apply_minutes(24 * 60, &cfg);
        assert!(state.is_critical(&cfg));
        assert!(state.health() < 100.0);
    }

    #[test]
    fn static_config_matches_defaults() {
        let cfg = SurvivalConfig::load_from_static();
        assert_eq!(cfg, SurvivalConfig::default());
        let partial = SurvivalConfig::from_json(r#"{ "critical_threshold": 60.0 }"#).unwrap();
        assert!(approx(partial.critical_threshold, 60.0));
        assert!(approx(partial.health_decay_per_minute, 0.1));
    }
}
