/// Episode hour counter.
pub mod clock;
/// The microgrid environment and its reset/step lifecycle.
pub mod env;
pub mod kpi;
/// Baseline dispatch policies.
pub mod policy;
pub mod power_balance;
/// Episode evaluation and per-hour records.
pub mod rollout;
pub mod types;

pub use env::{EnvConfig, EnvSnapshot, MicrogridEnv, PlantState, ResetOptions};
pub use kpi::EpisodeKpi;
pub use policy::{ConstantPolicy, IdlePolicy, MeritOrderPolicy, Policy, PolicyKind, RandomPolicy};
pub use power_balance::{Settlement, Tariff};
pub use rollout::{EpisodeRecord, StepRecord, episode_return, evaluate_episode};
pub use types::{Action, CostBreakdown, Observation, StepOutcome, StepReport};
