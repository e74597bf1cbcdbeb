use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;

use wasteland_game::{
    ConsumeOutcome, GameEngine, GameSession, SessionSnapshot, StaticDataLoader, TickOutcome,
    TravelOutcome,
};

/// One scripted player action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PlanStep {
    Search(f64),
    TakeAll,
    Take(String, u32),
    Consume(String, u32),
    UseFromLocation(String, u32),
    Drop(String, u32),
    Travel(String),
    Rest,
    Tick(u32),
    TogglePause,
}

impl PlanStep {
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Search(eff) => format!("search x{eff:.1}"),
            Self::TakeAll => "take all".to_string(),
            Self::Take(item, qty) => format!("take {qty} {item}"),
            Self::Consume(item, qty) => format!("consume {qty} {item}"),
            Self::UseFromLocation(item, qty) => format!("use {qty} {item} in place"),
            Self::Drop(item, qty) => format!("drop {qty} {item}"),
            Self::Travel(to) => format!("travel to {to}"),
            Self::Rest => "rest".to_string(),
            Self::Tick(n) => format!("tick x{n}"),
            Self::TogglePause => "toggle pause".to_string(),
        }
    }
}

/// What a step did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub step: String,
    pub clock: String,
    pub location: Option<String>,
    pub units: u32,
    pub accepted: bool,
}

#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub steps: Vec<PlanStep>,
    pub setup: Option<fn(&mut GameSession)>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self {
            steps,
            setup: None,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_setup(mut self, setup: fn(&mut GameSession)) -> Self {
        self.setup = Some(setup);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub records: Vec<StepRecord>,
    pub items_found: usize,
    pub units_taken: u32,
    pub initial: SessionSnapshot,
    pub session: GameSession,
}

impl SimulationSummary {
    #[must_use]
    pub fn final_snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }
}

/// Headless deterministic runner for the core game logic.
#[derive(Clone)]
pub struct GameTester {
    engine: Arc<GameEngine<StaticDataLoader>>,
    verbose: bool,
}

impl GameTester {
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self {
            engine: Arc::new(GameEngine::default()),
            verbose,
        }
    }

    /// Run a plan from a fresh session.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded game data fails to load.
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        let mut session = self.engine.create_session(seed)?;
        if let Some(setup) = plan.setup {
            setup(&mut session);
        }
        let initial = session.snapshot();
        let mut records = Vec::with_capacity(plan.steps.len());
        let mut items_found = 0;
        let mut units_taken = 0;

        for step in &plan.steps {
            let (units, accepted) = match step {
                PlanStep::Search(eff) => {
                    let found = session.search(*eff);
                    items_found += found.len();
                    (u32::try_from(found.len()).unwrap_or(u32::MAX), !found.is_empty())
                }
                PlanStep::TakeAll => {
                    let moved = session.take_all();
                    units_taken += moved;
                    (moved, moved > 0)
                }
                PlanStep::Take(item, qty) => {
                    let moved = session.take(item, *qty);
                    units_taken += moved;
                    (moved, moved > 0)
                }
                PlanStep::Consume(item, qty) => consumed_units(&session.consume(item, *qty)),
                PlanStep::UseFromLocation(item, qty) => {
                    consumed_units(&session.use_from_location(item, *qty))
                }
                PlanStep::Drop(item, qty) => {
                    let dropped = session.drop_item(item, *qty);
                    (dropped, dropped > 0)
                }
                PlanStep::Travel(to) => match session.travel_to(to) {
                    TravelOutcome::Arrived { minutes, .. } => (minutes, true),
                    other => {
                        log::debug!("travel to {to} refused: {other:?}");
                        (0, false)
                    }
                },
                PlanStep::Rest => (0, session.rest()),
                PlanStep::Tick(n) => {
                    let advanced = (0..*n)
                        .filter(|_| session.tick() == TickOutcome::Advanced)
                        .count();
                    (u32::try_from(advanced).unwrap_or(u32::MAX), advanced > 0)
                }
                PlanStep::TogglePause => {
                    session.toggle_pause();
                    (0, true)
                }
            };
            let record = StepRecord {
                step: step.label(),
                clock: session.clock().to_string(),
                location: session.current_location().map(|loc| loc.id.clone()),
                units,
                accepted,
            };
            if self.verbose {
                log::info!(
                    "seed {seed}: {} -> {} units ({})",
                    record.step,
                    record.units,
                    record.clock
                );
            }
            records.push(record);
        }

        Ok(SimulationSummary {
            seed,
            records,
            items_found,
            units_taken,
            initial,
            session,
        })
    }
}

fn consumed_units(outcome: &ConsumeOutcome) -> (u32, bool) {
    match outcome {
        ConsumeOutcome::Consumed { quantity, .. } => (*quantity, true),
        ConsumeOutcome::Ignored => (0, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_runs_steps_in_order() {
        let tester = GameTester::new(false);
        let plan = SimulationPlan::new(vec![
            PlanStep::Search(1.0),
            PlanStep::TakeAll,
            PlanStep::Travel("nowhere".into()),
            PlanStep::Rest,
        ]);
        let summary = tester.run_plan(&plan, 9).unwrap();
        assert_eq!(summary.records.len(), 4);
        assert!(summary.items_found >= 1);
        assert!(summary.units_taken >= 1);
        assert!(!summary.records[2].accepted);
        assert!(summary.records[3].accepted);
        assert_eq!(summary.final_snapshot().time, "16:30");
    }

    #[test]
    fn setup_hook_runs_before_steps() {
        let tester = GameTester::new(false);
        let plan = SimulationPlan::new(vec![PlanStep::Tick(3)])
            .with_setup(|session| session.set_paused(true));
        let summary = tester.run_plan(&plan, 1).unwrap();
        assert!(summary.initial.paused);
        assert_eq!(summary.records[0].units, 0);
        assert!(!summary.records[0].accepted);
    }

    #[test]
    fn expectations_see_the_summary() {
        let plan = SimulationPlan::new(vec![PlanStep::Consume("water".into(), 1)])
            .with_expectation(|summary: &SimulationSummary| {
                anyhow::ensure!(summary.records[0].units == 1, "water not consumed");
                Ok(())
            });
        let summary = GameTester::new(false).run_plan(&plan, 2).unwrap();
        for expectation in &plan.expectations {
            expectation.evaluate(&summary).unwrap();
        }
    }
}
