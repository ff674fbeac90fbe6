//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading allocation
//! rules and the department registry from YAML files.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::Department;

use super::types::{
    DepartmentsConfig, DistributionSettings, EngineConfig, EngineMetadata, EngineSettings,
    PrioritiesConfig, ServerSettings, ValidationRules,
};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/default/
/// ├── engine.yaml       # Metadata, rounding, validation rules, server settings
/// ├── priorities.yaml   # Priority weights for priority-weighted distribution
/// └── departments.yaml  # Department registry seed
/// ```
///
/// # Example
///
/// ```no_run
/// use budget_allocation::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// let department = loader.get_department("dept_eng").unwrap();
/// println!("Department: {}", department.name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - Two departments share an id
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let priorities = Self::load_yaml::<PrioritiesConfig>(&path.join("priorities.yaml"))?;

        let departments_path = path.join("departments.yaml");
        let departments = Self::load_yaml::<DepartmentsConfig>(&departments_path)?.departments;
        Self::check_unique_ids(&departments, &departments_path)?;

        debug!(
            path = %path.display(),
            departments = departments.len(),
            unit_scale = settings.allocation.unit_scale,
            "Loaded allocation configuration"
        );

        Ok(Self {
            config: EngineConfig::new(settings, priorities.weights, departments),
        })
    }

    /// Builds a loader from already-parsed parts.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn check_unique_ids(departments: &[Department], path: &Path) -> EngineResult<()> {
        let mut seen = HashSet::new();
        for department in departments {
            if !seen.insert(department.id.as_str()) {
                return Err(EngineError::ConfigParseError {
                    path: path.display().to_string(),
                    message: format!("duplicate department id '{}'", department.id),
                });
            }
        }
        Ok(())
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the rule set metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        self.config.metadata()
    }

    /// Returns the validation rules.
    pub fn validation_rules(&self) -> &ValidationRules {
        self.config.validation_rules()
    }

    /// Returns the server settings.
    pub fn server(&self) -> &ServerSettings {
        self.config.server()
    }

    /// Returns the settings used by auto-distribution.
    pub fn distribution_settings(&self) -> DistributionSettings {
        self.config.distribution_settings()
    }

    /// Returns all departments in registry order.
    pub fn departments(&self) -> &[Department] {
        self.config.departments()
    }

    /// Gets a department by its id.
    ///
    /// # Returns
    ///
    /// Returns the department if found, or `DepartmentNotFound` error.
    pub fn get_department(&self, id: &str) -> EngineResult<&Department> {
        self.config
            .departments()
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| EngineError::DepartmentNotFound { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::models::Priority;

    fn config_path() -> &'static str {
        "./config/default"
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.metadata().currency, "USD");
        assert_eq!(loader.departments().len(), 5);
    }

    #[test]
    fn test_get_department() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let department = loader.get_department("dept_eng").unwrap();
        assert_eq!(department.code, "ENG");
        assert_eq!(department.employee_count, 30);
    }

    #[test]
    fn test_get_department_unknown_returns_error() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        match loader.get_department("unknown") {
            Err(EngineError::DepartmentNotFound { id }) => assert_eq!(id, "unknown"),
            other => panic!("Expected DepartmentNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_rules_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let rules = loader.validation_rules();

        assert_eq!(rules.concentration_threshold, Decimal::new(50, 2));
        assert_eq!(
            rules.department_caps.get("dept_mkt"),
            Some(&Decimal::new(150_000, 0))
        );
    }

    #[test]
    fn test_priority_weights_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let settings = loader.distribution_settings();

        assert_eq!(settings.unit_scale, 0);
        assert_eq!(settings.priority_weights.weight(Priority::Low), Decimal::ONE);
        assert_eq!(
            settings.priority_weights.weight(Priority::Critical),
            Decimal::new(4, 0)
        );
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        match ConfigLoader::load("/nonexistent/path") {
            Err(EngineError::ConfigNotFound { path }) => assert!(path.contains("engine.yaml")),
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_department_ids_rejected() {
        let departments: DepartmentsConfig = serde_yaml::from_str(
            r#"
departments:
  - { id: dept_a, name: A, code: A }
  - { id: dept_a, name: B, code: B }
"#,
        )
        .unwrap();

        let result =
            ConfigLoader::check_unique_ids(&departments.departments, Path::new("departments.yaml"));
        match result {
            Err(EngineError::ConfigParseError { message, .. }) => {
                assert!(message.contains("dept_a"))
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }
}
