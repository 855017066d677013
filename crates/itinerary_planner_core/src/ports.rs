//! crates/itinerary_planner_core/src/ports.rs
//!
//! Defines the service contracts (traits) the planner depends on.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! conversation logic independent of the AI provider and the translation table.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::{SuggestionDraft, SuggestionRequest};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, model).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("The call did not complete within {0:?}")]
    Timeout(Duration),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait SuggestionGenerator: Send + Sync {
    /// Produces a multi-day suggestion list for the given preferences.
    ///
    /// `Ok(None)` means the generator answered but had nothing usable; item ids
    /// may be missing from the draft.
    async fn generate_suggestions(
        &self,
        request: &SuggestionRequest,
    ) -> PortResult<Option<SuggestionDraft>>;
}

#[async_trait]
pub trait TownInfoService: Send + Sync {
    /// Returns a short free-text description of the town.
    async fn get_town_info(&self) -> PortResult<String>;
}

/// Looks up display copy by key. Replacements fill `{{name}}` placeholders.
pub trait Translator: Send + Sync {
    fn t(&self, key: &str, replacements: &[(&str, &str)]) -> String;
}
