use anyhow::{Result, ensure};

use super::game_tester::{PlanStep, SimulationPlan, SimulationSummary};
use wasteland_game::{DayPhase, LootTables};

/// Logic scenario: a named plan plus its expectations.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

const SCENARIOS: [(&str, &str); 8] = [
    ("smoke", "Search home once and pick everything up"),
    ("loot-search", "Repeated searches only roll items from the location's pools"),
    ("transfer", "Take, drop and take-all keep unit counts consistent"),
    ("survival", "Eating and drinking relieve deficits; idle time wears them back"),
    ("starvation", "Critical deficits drain health until food and water arrive"),
    ("day-cycle", "Rest and travel roll the clock into a new day"),
    ("expedition", "Round trip to the city: travel, scavenge, return, rest"),
    ("pause", "Paused clock ignores ticks but not explicit actions"),
];

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS.to_vec()
}

/// Every scenario name, in catalog order.
#[must_use]
pub fn all_scenario_names() -> Vec<String> {
    SCENARIOS.iter().map(|(name, _)| (*name).to_string()).collect()
}

#[must_use]
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let plan = match name {
        "smoke" => smoke_plan(),
        "loot-search" => loot_search_plan(),
        "transfer" => transfer_plan(),
        "survival" => survival_plan(),
        "starvation" => starvation_plan(),
        "day-cycle" => day_cycle_plan(),
        "expedition" => expedition_plan(),
        "pause" => pause_plan(),
        _ => return None,
    };
    Some(TestScenario::simulation(name, plan))
}

fn smoke_plan() -> SimulationPlan {
    SimulationPlan::new(vec![PlanStep::Search(1.0), PlanStep::TakeAll]).with_expectation(
        |summary: &SimulationSummary| {
            let snapshot = summary.final_snapshot();
            ensure!(summary.items_found >= 1, "search found nothing");
            ensure!(snapshot.time == "08:30", "search took {} instead of 30 min", snapshot.time);
            ensure!(snapshot.location_items.is_empty(), "pile not emptied by take-all");
            ensure!(
                summary.session.player().total_units() > units(&summary.initial.inventory),
                "inventory did not grow"
            );
            Ok(())
        },
    )
}

fn loot_search_plan() -> SimulationPlan {
    let mut steps = Vec::new();
    for (location, eff) in [
        ("abandoned-city", 1.0),
        ("clinic", 0.5),
        ("military-outpost", 2.5),
        ("forest-camp", 1.5),
    ] {
        steps.push(PlanStep::Travel(location.to_string()));
        for _ in 0..4 {
            steps.push(PlanStep::Search(eff));
        }
    }
    SimulationPlan::new(steps).with_expectation(pile_matches_pools)
}

fn pile_matches_pools(summary: &SimulationSummary) -> Result<()> {
    let session = &summary.session;
    let location = session
        .current_location()
        .ok_or_else(|| anyhow::anyhow!("no current location"))?;
    let pools = LootTables::default_tables()
        .table_for(location.kind.as_str())
        .ok_or_else(|| anyhow::anyhow!("no loot table for {}", location.kind))?;
    for entry in session.location_items() {
        ensure!(
            pools.contains(&entry.definition_id),
            "{} rolled {} outside its pools",
            location.id,
            entry.definition_id
        );
        if let Some(condition) = entry.condition {
            ensure!((5..=100).contains(&condition), "condition {condition} out of range");
        }
    }
    ensure!(summary.items_found >= 16, "expected at least one find per search");
    Ok(())
}

fn transfer_plan() -> SimulationPlan {
    SimulationPlan::new(vec![
        PlanStep::Drop("water".into(), 1),
        PlanStep::Drop("canned-meat".into(), 1),
        PlanStep::Search(1.0),
        PlanStep::Take("water".into(), 10),
        PlanStep::TakeAll,
    ])
    .with_expectation(|summary: &SimulationSummary| {
        let dropped: u32 = summary.records[..2].iter().map(|r| r.units).sum();
        ensure!(dropped == 2, "expected two units dropped, got {dropped}");
        let before = units(&summary.initial.inventory);
        let after = summary.session.player().total_units();
        ensure!(
            after == before - u64::from(dropped) + u64::from(summary.units_taken),
            "unit count drifted: {before} -> {after} with {} taken",
            summary.units_taken
        );
        ensure!(summary.session.location_items().is_empty(), "pile not emptied");
        Ok(())
    })
}

fn survival_plan() -> SimulationPlan {
    SimulationPlan::new(vec![
        PlanStep::Consume("canned-meat".into(), 1),
        PlanStep::Consume("water".into(), 1),
        PlanStep::Consume("water".into(), 1),
        PlanStep::Tick(120),
    ])
    .with_expectation(|summary: &SimulationSummary| {
        let snapshot = summary.final_snapshot();
        ensure!(summary.records[0].accepted, "canned meat not eaten");
        ensure!(!summary.records[2].accepted, "second water came from nowhere");
        ensure!(snapshot.hunger > 20.0 && snapshot.hunger < 25.0, "hunger {}", snapshot.hunger);
        ensure!(snapshot.thirst > 10.0 && snapshot.thirst < 15.0, "thirst {}", snapshot.thirst);
        ensure!((snapshot.health - 100.0).abs() < 1e-9, "health moved without a crisis");
        Ok(())
    })
}

fn starvation_plan() -> SimulationPlan {
    SimulationPlan::new(vec![
        PlanStep::Tick(60),
        PlanStep::Consume("canned-meat".into(), 1),
        PlanStep::Consume("water".into(), 1),
        PlanStep::Tick(60),
    ])
    .with_setup(|session| {
        session.survival_mut().increase_hunger(40.0);
        session.survival_mut().increase_thirst(40.0);
    })
    .with_expectation(|summary: &SimulationSummary| {
        let snapshot = summary.final_snapshot();
        ensure!(summary.initial.hunger > 70.0, "setup did not starve the survivor");
        ensure!(
            (snapshot.health - 94.0).abs() < 1e-6,
            "expected one hour of drain, health {}",
            snapshot.health
        );
        ensure!(snapshot.hunger < 70.0 && snapshot.thirst < 70.0, "deficits still critical");
        Ok(())
    })
}

fn day_cycle_plan() -> SimulationPlan {
    SimulationPlan::new(vec![
        PlanStep::Rest,
        PlanStep::Travel("old-factory".into()),
        PlanStep::Travel("home".into()),
        PlanStep::Rest,
    ])
    .with_expectation(|summary: &SimulationSummary| {
        let clock = summary.session.clock();
        ensure!(summary.records.iter().all(|r| r.accepted), "a step was refused");
        ensure!(clock.day() == 2, "expected day 2, got {clock}");
        ensure!(clock.day_phase() == DayPhase::Night, "expected night, got {}", clock.day_phase());
        Ok(())
    })
}

fn expedition_plan() -> SimulationPlan {
    SimulationPlan::new(vec![
        PlanStep::Travel("abandoned-city".into()),
        PlanStep::Search(1.0),
        PlanStep::Search(1.0),
        PlanStep::TakeAll,
        PlanStep::Search(2.0),
        PlanStep::Travel("home".into()),
        PlanStep::Rest,
    ])
    .with_expectation(|summary: &SimulationSummary| {
        let session = &summary.session;
        ensure!(!session.is_dead(), "survivor died on a short trip");
        ensure!(
            session.loot().location_items("abandoned-city").is_empty(),
            "city pile survived departure"
        );
        ensure!(
            session.locations().current().is_some_and(|loc| loc.id == "home"),
            "did not make it home"
        );
        ensure!(summary.records.last().is_some_and(|r| r.accepted), "rest refused at home");
        Ok(())
    })
}

fn pause_plan() -> SimulationPlan {
    SimulationPlan::new(vec![
        PlanStep::TogglePause,
        PlanStep::Tick(30),
        PlanStep::Search(1.0),
        PlanStep::TogglePause,
        PlanStep::Tick(30),
    ])
    .with_expectation(|summary: &SimulationSummary| {
        ensure!(summary.records[1].units == 0, "paused ticks advanced the clock");
        ensure!(summary.records[4].units == 30, "unpaused ticks stalled");
        let time = &summary.final_snapshot().time;
        ensure!(time == "09:00", "expected 09:00, got {time}");
        Ok(())
    })
}

fn units(entries: &[wasteland_game::InventoryEntry]) -> u64 {
    entries.iter().map(|e| u64::from(e.quantity)).sum()
}
