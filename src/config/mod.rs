//! Configuration loading and management for the Budget Allocation Engine.
//!
//! This module loads allocation rules (rounding unit, validation thresholds,
//! per-department caps, priority weights) and the department registry seed
//! from a directory of YAML files.
//!
//! # Example
//!
//! ```no_run
//! use budget_allocation::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded rules: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AllocationSettings, DepartmentsConfig, DistributionSettings, EngineConfig, EngineMetadata,
    EngineSettings, PrioritiesConfig, PriorityWeights, ServerSettings, ValidationRules,
};
