//! Application state for the Budget Allocation API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::workflow::AllocationService;

/// Shared application state.
///
/// Holds the loaded configuration and the allocation service whose draft
/// store lives for the lifetime of the server.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    service: Arc<AllocationService>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        let service = AllocationService::new(
            config.departments().to_vec(),
            config.validation_rules().clone(),
        );
        Self {
            config: Arc::new(config),
            service: Arc::new(service),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the allocation service.
    pub fn service(&self) -> &AllocationService {
        &self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_clones_share_the_store() {
        let state = AppState::new(ConfigLoader::load("./config/default").unwrap());
        let other = state.clone();
        assert!(std::ptr::eq(state.service(), other.service()));
    }
}
