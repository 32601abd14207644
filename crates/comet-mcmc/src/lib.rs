#![deny(missing_docs)]
#![doc = "Adaptive multi-chain MCMC driver for CoMEt: chain rounds, convergence control, result canonicalization and reporting."]

/// Ranking and tab-separated reporting of the merged table.
pub mod aggregate;
/// Canonical keys for sampled collections.
pub mod canonical;
/// A single chain round against an engine.
pub mod chain;
/// Run and exhaustive-mode configuration.
pub mod config;
/// Log-factorial table and engine PRNG lifecycle.
pub mod context;
/// Adaptive budget growth and the convergence state machine.
pub mod convergence;
/// Raw sample to named gene set conversion.
pub mod convert;
/// Deterministic substream seeds.
pub mod determinism;
/// Engine interface consumed by the driver.
pub mod engine;
/// Reference exclusivity engine.
pub mod exclusivity;
/// Exhaustive enumeration mode.
pub mod exhaustive;
/// Run parameter files and provenance.
pub mod manifest;
/// Starting solutions for every chain.
pub mod planner;
/// Precomputed score loading.
pub mod precomputed;
/// Frequency tables and target weights.
pub mod records;
/// Initial-solution seeder interface.
pub mod seeder;

pub use aggregate::{rank, write_report, write_report_file, ReportRow};
pub use canonical::CanonicalKey;
pub use config::{ExhaustiveConfig, RunConfig};
pub use context::ComputationContext;
pub use convergence::{ConvergenceController, RunOutcome, StopReason};
pub use engine::{EnumeratedSet, RawRow, RawSample, SampleRequest, SamplingEngine};
pub use exclusivity::ExclusivityEngine;
pub use manifest::RunParameters;
pub use planner::{InitialPlan, InitialSolutionPlanner};
pub use records::{ChainTable, GlobalTable, ResultRecord, SetRecord};
pub use seeder::{InitialSeeder, SeederParams};
