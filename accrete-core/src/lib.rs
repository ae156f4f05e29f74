pub mod bodies;
pub mod boundary;
pub mod broad_phase;
pub mod chains;
pub mod config;
pub mod error;
pub mod gravity;
pub mod integrator;
pub mod scenario;
pub mod simulation;
pub mod stats;

pub use bodies::{Body, BodyMut, BodyStore, RadiusMapping};
pub use broad_phase::{candidate_groups, BroadPhase, CandidateGroup};
pub use chains::{detect_collisions, resolve_collisions, CollisionChain, MergeReport};
pub use config::{RunConfig, SimConfig};
pub use error::{ConfigError, SimError, StoreError};
pub use gravity::{compute_forces_chunked, compute_forces_sequential, ForceEngine};
pub use scenario::{BodySpec, Scenario};
pub use simulation::{advance, run_simulation, step, Simulation, SimulationResult, StepReport};
pub use stats::SystemStats;
