pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

// Re-export the handlers so the binary can build the router from one place.
pub use rest::{health_handler, suggestions_handler, town_info_handler};
pub use ws_handler::ws_handler;
