pub mod conversation;
pub mod domain;
pub mod planner;
pub mod ports;
pub mod validation;
pub mod views;

pub use conversation::{Action, Conversation, ConversationError, Effect, Event, Step};
pub use domain::{
    derive_itinerary, Budget, Category, ChatMessage, Delivery, DeliveryChannel, DraftDay,
    DraftItem, Itinerary, ItineraryDay, ItineraryItem, Preferences, Selection, Speaker,
    SuggestionDraft, SuggestionItem, SuggestionRequest, SuggestionSet,
};
pub use planner::{with_timeout, PlannerServices, PlannerSession, PlannerSettings, PlannerUpdate};
pub use ports::{PortError, PortResult, SuggestionGenerator, TownInfoService, Translator};
pub use views::{ItineraryPanel, View};
