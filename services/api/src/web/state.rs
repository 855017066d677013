//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and how a per-connection planner
//! session is wired from it.

use crate::adapters::CatalogTranslator;
use crate::config::Config;
use itinerary_planner_core::{
    planner::PlannerServices,
    ports::{SuggestionGenerator, TownInfoService},
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub suggestion_adapter: Arc<dyn SuggestionGenerator>,
    pub town_info_adapter: Arc<dyn TownInfoService>,
}

impl AppState {
    /// The collaborators for one conversation, translated into `language`.
    pub fn planner_services(&self, language: &str) -> PlannerServices {
        PlannerServices {
            suggestions: self.suggestion_adapter.clone(),
            town_info: self.town_info_adapter.clone(),
            translator: Arc::new(CatalogTranslator::for_language(language)),
        }
    }
}
