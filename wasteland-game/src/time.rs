//! In-game clock and day phases.
//!
//! The clock holds no timer of its own. Whatever drives the simulation calls
//! [`GameClock::advance_time`] on its own cadence and must skip the call while
//! the clock is paused.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    DAY_START_HOUR, EVENING_START_HOUR, HOURS_PER_DAY, MINUTES_PER_HOUR, MORNING_START_HOUR,
    NIGHT_START_HOUR, START_DAY, START_HOUR,
};

/// Coarse classification of the hour of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DayPhase {
    #[default]
    Morning,
    Day,
    Evening,
    Night,
}

impl DayPhase {
    /// Phase for an hour in `0..24`: `[5,11)` morning, `[11,18)` day,
    /// `[18,22)` evening, everything else night.
    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        if hour >= MORNING_START_HOUR && hour < DAY_START_HOUR {
            Self::Morning
        } else if hour >= DAY_START_HOUR && hour < EVENING_START_HOUR {
            Self::Day
        } else if hour >= EVENING_START_HOUR && hour < NIGHT_START_HOUR {
            Self::Evening
        } else {
            Self::Night
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Day => "day",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}

impl fmt::Display for DayPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day/hour/minute clock. `minute < 60` and `hour < 24` always hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    day: u32,
    hour: u32,
    minute: u32,
    paused: bool,
    phase: DayPhase,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            day: START_DAY,
            hour: START_HOUR,
            minute: 0,
            paused: false,
            phase: DayPhase::from_hour(START_HOUR),
        }
    }
}

impl GameClock {
    /// Clock at the given time, normalized.
    #[must_use]
    pub fn at(day: u32, hour: u32, minute: u32) -> Self {
        let mut clock = Self::default();
        clock.set_time(day, hour, minute);
        clock
    }

    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }

    #[must_use]
    pub const fn hour(&self) -> u32 {
        self.hour
    }

    #[must_use]
    pub const fn minute(&self) -> u32 {
        self.minute
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub const fn day_phase(&self) -> DayPhase {
        self.phase
    }

    /// Minutes elapsed since day 1, 00:00.
    #[must_use]
    pub const fn total_minutes(&self) -> u64 {
        let days = (self.day.saturating_sub(1)) as u64;
        let hours = days * HOURS_PER_DAY as u64 + self.hour as u64;
        hours * MINUTES_PER_HOUR as u64 + self.minute as u64
    }

    /// Advance the clock. Minutes are unsigned, so the clock never runs
    /// backwards; zero is accepted and only refreshes the phase.
    pub fn advance_time(&mut self, minutes: u32) {
        let total_minutes = u64::from(self.minute) + u64::from(minutes);
        let carried_hours = total_minutes / u64::from(MINUTES_PER_HOUR);
        let total_hours = u64::from(self.hour) + carried_hours;
        let carried_days = total_hours / u64::from(HOURS_PER_DAY);

        self.minute = (total_minutes % u64::from(MINUTES_PER_HOUR)) as u32;
        self.hour = (total_hours % u64::from(HOURS_PER_DAY)) as u32;
        self.day = self
            .day
            .saturating_add(u32::try_from(carried_days).unwrap_or(u32::MAX));
        self.phase = DayPhase::from_hour(self.hour);
    }

    pub const fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub const fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Jump to an explicit time. Overflowing minutes and hours carry forward
    /// and day 0 is lifted to day 1.
    pub fn set_time(&mut self, day: u32, hour: u32, minute: u32) {
        self.day = day.max(START_DAY);
        self.hour = 0;
        self.minute = 0;
        let minutes = hour
            .saturating_mul(MINUTES_PER_HOUR)
            .saturating_add(minute);
        self.advance_time(minutes);
    }

    /// `HH:MM`
    #[must_use]
    pub fn format_time(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

impl fmt::Display for GameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Day {}, {:02}:{:02}", self.day, self.hour, self.minute)
    }
}
