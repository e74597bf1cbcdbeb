//! Map locations, their discovery state and the travel network between them.
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

use crate::constants::{
    DEFAULT_MINUTES_PER_KM, KM_PER_MAP_UNIT, ROUTE_MAX_DISTANCE, ROUTE_MAX_NEIGHBOURS,
};
use crate::error::DataError;
use crate::numbers::round_f64_to_u32;

const DEFAULT_LOCATION_DATA: &str = include_str!("../assets/data/locations.json");

/// Location type; doubles as the loot table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationKind {
    City,
    Ruins,
    Forest,
    Military,
    Hospital,
    GasStation,
}

impl LocationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Ruins => "ruins",
            Self::Forest => "forest",
            Self::Military => "military",
            Self::Hospital => "hospital",
            Self::GasStation => "gas-station",
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub x: f64,
    pub y: f64,
    pub kind: LocationKind,
    #[serde(default)]
    pub accessible: bool,
    #[serde(default)]
    pub danger_level: u8,
    #[serde(default)]
    pub discovered: bool,
}

impl Location {
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A travel link between two discovered locations. `from` sorts before `to`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub from: String,
    pub to: String,
    pub distance: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct LocationFile {
    #[serde(default)]
    locations: Vec<Location>,
    #[serde(default = "default_minutes_per_km")]
    minutes_per_km: u32,
}

const fn default_minutes_per_km() -> u32 {
    DEFAULT_MINUTES_PER_KM
}

/// All map locations plus the player's current position.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRegistry {
    locations: Vec<Location>,
    index: HashMap<String, usize>,
    current: Option<usize>,
    minutes_per_km: u32,
}

impl Default for LocationRegistry {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
            index: HashMap::new(),
            current: None,
            minutes_per_km: DEFAULT_MINUTES_PER_KM,
        }
    }
}

impl LocationRegistry {
    #[must_use]
    pub fn load_from_static() -> Self {
        match Self::from_json(DEFAULT_LOCATION_DATA) {
            Ok(registry) => registry,
            Err(err) => {
                log::error!("embedded location list rejected: {err}");
                Self::default()
            }
        }
    }

    /// Shared pristine copy; sessions clone it before mutating.
    #[must_use]
    pub fn default_registry() -> &'static Self {
        static REGISTRY: OnceLock<LocationRegistry> = OnceLock::new();
        REGISTRY.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or a location is invalid.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let file: LocationFile =
            serde_json::from_str(json).map_err(|e| DataError::parse("locations", e))?;
        let mut registry = Self::from_locations(file.locations)?;
        registry.minutes_per_km = file.minutes_per_km;
        Ok(registry)
    }

    /// # Errors
    ///
    /// Returns an error on duplicate ids, off-map coordinates or bad danger levels.
    pub fn from_locations(locations: Vec<Location>) -> Result<Self, DataError> {
        let mut index = HashMap::with_capacity(locations.len());
        for (idx, location) in locations.iter().enumerate() {
            let on_map = |v: f64| (0.0..=100.0).contains(&v);
            if !on_map(location.x) || !on_map(location.y) {
                return Err(DataError::LocationOutOfBounds {
                    id: location.id.clone(),
                    x: location.x,
                    y: location.y,
                });
            }
            if location.danger_level > 5 {
                return Err(DataError::DangerOutOfRange {
                    id: location.id.clone(),
                    value: location.danger_level,
                });
            }
            if index.insert(location.id.clone(), idx).is_some() {
                return Err(DataError::DuplicateId {
                    kind: "location",
                    id: location.id.clone(),
                });
            }
        }
        Ok(Self {
            locations,
            index,
            current: None,
            minutes_per_km: DEFAULT_MINUTES_PER_KM,
        })
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Location> {
        self.index.get(id).and_then(|idx| self.locations.get(*idx))
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Location> {
        let idx = *self.index.get(id)?;
        self.locations.get_mut(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn discovered(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter().filter(|loc| loc.discovered)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Mark a location discovered. Returns false for unknown ids.
    pub fn discover(&mut self, id: &str) -> bool {
        let Some(location) = self.get_mut(id) else {
            log::debug!("discover of unknown location `{id}` ignored");
            return false;
        };
        location.discovered = true;
        true
    }

    /// Unlock a location for travel. Returns false for unknown ids.
    pub fn make_accessible(&mut self, id: &str) -> bool {
        let Some(location) = self.get_mut(id) else {
            log::debug!("unlock of unknown location `{id}` ignored");
            return false;
        };
        location.accessible = true;
        true
    }

    /// Move the player marker. Only accessible locations qualify.
    pub fn set_current(&mut self, id: &str) -> bool {
        match self.index.get(id) {
            Some(&idx) if self.locations[idx].accessible => {
                self.current = Some(idx);
                true
            }
            Some(_) => {
                log::debug!("location `{id}` is not accessible");
                false
            }
            None => {
                log::debug!("set_current to unknown location `{id}` ignored");
                false
            }
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&Location> {
        self.current.and_then(|idx| self.locations.get(idx))
    }

    #[must_use]
    pub const fn minutes_per_km(&self) -> u32 {
        self.minutes_per_km
    }

    pub const fn set_minutes_per_km(&mut self, minutes: u32) {
        self.minutes_per_km = minutes;
    }

    /// Straight-line distance in map units.
    #[must_use]
    pub fn distance(&self, from: &str, to: &str) -> Option<f64> {
        Some(self.get(from)?.distance_to(self.get(to)?))
    }

    #[must_use]
    pub fn distance_km(&self, from: &str, to: &str) -> Option<u32> {
        self.distance(from, to)
            .map(|d| round_f64_to_u32(d * KM_PER_MAP_UNIT))
    }

    #[must_use]
    pub fn travel_minutes(&self, from: &str, to: &str) -> Option<u32> {
        self.distance_km(from, to)
            .map(|km| km.saturating_mul(self.minutes_per_km))
    }

    /// Links each discovered location to its nearest discovered neighbours
    /// within range. Each pair appears once.
    #[must_use]
    pub fn routes(&self) -> Vec<Route> {
        let discovered: Vec<&Location> = self.discovered().collect();
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let mut routes = Vec::new();
        for origin in &discovered {
            let mut neighbours: Vec<(&Location, f64)> = discovered
                .iter()
                .filter(|other| other.id != origin.id)
                .map(|other| (*other, origin.distance_to(other)))
                .filter(|(_, d)| *d <= ROUTE_MAX_DISTANCE)
                .collect();
            neighbours.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.id.cmp(&b.0.id)));
            for (other, distance) in neighbours.into_iter().take(ROUTE_MAX_NEIGHBOURS) {
                let (from, to) = if origin.id <= other.id {
                    (origin.id.as_str(), other.id.as_str())
                } else {
                    (other.id.as_str(), origin.id.as_str())
                };
                if seen.insert((from, to)) {
                    routes.push(Route {
                        from: from.to_string(),
                        to: to.to_string(),
                        distance,
                    });
                }
            }
        }
        routes
    }
}
