use crate::bodies::BodyStore;
use crate::boundary::clamp_to_domain;
use crate::broad_phase::candidate_groups;
use crate::chains::{detect_collisions, resolve_collisions};
use crate::config::{RunConfig, SimConfig};
use crate::error::SimError;
use crate::gravity::ForceEngine;
use crate::integrator::integrate;
use crate::stats::SystemStats;

/// What happened during one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub candidate_groups: usize,
    pub chains: usize,
    /// Bodies removed by merging
    pub merged_away: usize,
    /// Bodies stopped at the domain wall
    pub clamped: usize,
    /// Live bodies after the step
    pub live: usize,
}

/// Final result of a complete run
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub steps: usize,
    pub merged_away: usize,
    pub stats: SystemStats,
}

/// Advance the store by one tick with an existing force engine.
///
/// Order: candidates, collision chains (the store shrinks here), gravity on
/// the merged state, integration, boundary clamp. An invalid `config` is
/// rejected before the store is touched. A failure part-way leaves the store
/// partially updated.
pub fn advance(
    store: &mut BodyStore,
    config: &SimConfig,
    engine: &ForceEngine,
) -> Result<StepReport, SimError> {
    config.validate()?;
    let groups = candidate_groups(store, config.broad_phase, config.tile_factor);
    let chains = detect_collisions(store, &groups);
    let merge = resolve_collisions(store, &chains)?;

    let forces = engine.compute(store.positions(), store.masses(), config.gravity);
    integrate(store, &forces, config.time_step);
    let clamped = clamp_to_domain(store, config.edge);

    Ok(StepReport {
        candidate_groups: groups.len(),
        chains: merge.chains,
        merged_away: merge.removed,
        clamped,
        live: store.len(),
    })
}

/// Advance the store by one tick, spinning up `config.workers` force workers
/// for the duration of the step
pub fn step(store: &mut BodyStore, config: &SimConfig) -> Result<StepReport, SimError> {
    config.validate()?;
    let engine = ForceEngine::new(config.workers)?;
    advance(store, config, &engine)
}

/// A body store together with its tunables and a reusable force engine
#[derive(Debug)]
pub struct Simulation {
    store: BodyStore,
    config: SimConfig,
    engine: ForceEngine,
    pub current_step: usize,
    pub max_steps: usize,
    pub merged_away: usize,
}

impl Simulation {
    /// Empty simulation; populate through [`Simulation::store_mut`]
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let engine = ForceEngine::new(config.workers)?;
        Ok(Self {
            store: BodyStore::new(config.radius),
            config,
            engine,
            current_step: 0,
            max_steps: usize::MAX,
            merged_away: 0,
        })
    }

    pub fn from_run_config(run: &RunConfig) -> Result<Self, SimError> {
        let mut sim = Self::new(run.sim.clone())?;
        sim.store = BodyStore::with_capacity(run.sim.radius, run.scenario.body_count());
        run.scenario.populate(&mut sim.store);
        sim.max_steps = run.steps;
        Ok(sim)
    }

    pub fn store(&self) -> &BodyStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut BodyStore {
        &mut self.store
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn stats(&self) -> SystemStats {
        SystemStats::measure(&self.store)
    }

    pub fn is_finished(&self) -> bool {
        self.current_step >= self.max_steps
    }

    pub fn step(&mut self) -> Result<StepReport, SimError> {
        let report = advance(&mut self.store, &self.config, &self.engine)?;
        self.current_step += 1;
        self.merged_away += report.merged_away;
        Ok(report)
    }

    /// Step until `max_steps`, calling `on_step` after every step
    pub fn run_with<F>(&mut self, mut on_step: F) -> Result<SimulationResult, SimError>
    where
        F: FnMut(&Simulation, &StepReport),
    {
        while !self.is_finished() {
            let report = self.step()?;
            on_step(self, &report);
        }
        Ok(SimulationResult {
            steps: self.current_step,
            merged_away: self.merged_away,
            stats: self.stats(),
        })
    }
}

/// Build a simulation from a run configuration and run it to completion
pub fn run_simulation(run: &RunConfig) -> Result<SimulationResult, SimError> {
    let mut sim = Simulation::from_run_config(run)?;
    sim.run_with(|_, _| {})
}
