//! Configuration types for budget allocation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{Department, Priority};

/// Metadata about the rule set.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineMetadata {
    /// The human-readable name of the rule set.
    pub name: String,
    /// The version or effective date of the rule set.
    pub version: String,
    /// ISO currency code amounts are expressed in.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Settings controlling how auto-distribution rounds amounts.
#[derive(Debug, Clone, Deserialize)]
pub struct AllocationSettings {
    /// Number of decimal places amounts are rounded to (0 = whole units).
    #[serde(default)]
    pub unit_scale: u32,
}

impl Default for AllocationSettings {
    fn default() -> Self {
        Self { unit_scale: 0 }
    }
}

/// Business rules applied by the allocation validator.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationRules {
    /// Share of the total budget (0-1) above which a single line is flagged.
    #[serde(default = "default_concentration_threshold")]
    pub concentration_threshold: Decimal,
    /// Optional maximum amount per department id.
    #[serde(default)]
    pub department_caps: HashMap<String, Decimal>,
}

fn default_concentration_threshold() -> Decimal {
    Decimal::new(50, 2)
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            concentration_threshold: default_concentration_threshold(),
            department_caps: HashMap::new(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Address the API listens on.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Engine configuration file structure (engine.yaml).
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Rule set metadata.
    pub metadata: EngineMetadata,
    /// Rounding settings.
    #[serde(default)]
    pub allocation: AllocationSettings,
    /// Validation rules.
    #[serde(default)]
    pub validation: ValidationRules,
    /// Server settings.
    #[serde(default)]
    pub server: ServerSettings,
}

/// Relative weight of each priority for priority-weighted distribution.
#[derive(Debug, Clone, Deserialize)]
pub struct PriorityWeights {
    /// Weight for low priority.
    pub low: Decimal,
    /// Weight for medium priority.
    pub medium: Decimal,
    /// Weight for high priority.
    pub high: Decimal,
    /// Weight for critical priority.
    pub critical: Decimal,
}

impl PriorityWeights {
    /// Returns the weight for a priority.
    pub fn weight(&self, priority: Priority) -> Decimal {
        match priority {
            Priority::Low => self.low,
            Priority::Medium => self.medium,
            Priority::High => self.high,
            Priority::Critical => self.critical,
        }
    }
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            low: Decimal::ONE,
            medium: Decimal::TWO,
            high: Decimal::new(3, 0),
            critical: Decimal::new(4, 0),
        }
    }
}

/// Priorities configuration file structure (priorities.yaml).
#[derive(Debug, Clone, Deserialize)]
pub struct PrioritiesConfig {
    /// Weight per priority.
    pub weights: PriorityWeights,
}

/// Department registry seed file structure (departments.yaml).
#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentsConfig {
    /// Known departments, in display order.
    pub departments: Vec<Department>,
}

/// Everything auto-distribution needs beyond its inputs.
#[derive(Debug, Clone, Default)]
pub struct DistributionSettings {
    /// Number of decimal places amounts are rounded to.
    pub unit_scale: u32,
    /// Weight per priority.
    pub priority_weights: PriorityWeights,
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    settings: EngineSettings,
    priority_weights: PriorityWeights,
    departments: Vec<Department>,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(
        settings: EngineSettings,
        priority_weights: PriorityWeights,
        departments: Vec<Department>,
    ) -> Self {
        Self {
            settings,
            priority_weights,
            departments,
        }
    }

    /// Returns the rule set metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        &self.settings.metadata
    }

    /// Returns the validation rules.
    pub fn validation_rules(&self) -> &ValidationRules {
        &self.settings.validation
    }

    /// Returns the server settings.
    pub fn server(&self) -> &ServerSettings {
        &self.settings.server
    }

    /// Returns the priority weights.
    pub fn priority_weights(&self) -> &PriorityWeights {
        &self.priority_weights
    }

    /// Returns the department registry seed.
    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    /// Returns the settings used by auto-distribution.
    pub fn distribution_settings(&self) -> DistributionSettings {
        DistributionSettings {
            unit_scale: self.settings.allocation.unit_scale,
            priority_weights: self.priority_weights.clone(),
        }
    }
}
