//! Application state for the billing engine API.

use std::sync::Arc;

use crate::config::{BusinessRules, ConfigLoader};

/// Shared application state.
///
/// Handlers compute on the ledger in each request body; the only thing they
/// share is the immutable business rules.
#[derive(Clone)]
pub struct AppState {
    rules: Arc<BusinessRules>,
}

impl AppState {
    /// Creates a new application state from a loaded configuration.
    pub fn new(config: ConfigLoader) -> Self {
        Self::from_rules(config.into_rules())
    }

    /// Creates a new application state from explicit business rules.
    pub fn from_rules(rules: BusinessRules) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    /// Returns the business rules.
    pub fn rules(&self) -> &BusinessRules {
        &self.rules
    }
}
