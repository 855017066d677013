//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API
//! server for the itinerary planner chat.

use chrono::{DateTime, Utc};
use itinerary_planner_core::{
    conversation::{Action, Event, Step},
    domain::{Budget, DeliveryChannel, Speaker},
    planner::PlannerUpdate,
    views::{ItineraryPanel, View},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionChoice {
    Create,
    Learn,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChoice {
    Email,
    Whatsapp,
    None,
}

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Picks one of the two buttons shown after the greeting.
    ChooseAction { action: ActionChoice },

    /// Free-text answer for interests, duration, email or phone.
    SubmitText { text: String },

    /// One of `budget-friendly`, `moderate`, `luxury`.
    ChooseBudget { budget: String },

    /// Ticks or unticks a suggestion in the picker.
    ToggleItem { item_id: String },

    ConfirmSelection,

    /// Goes back from the itinerary to the picker.
    ModifySelection,

    ChooseDelivery { channel: DeliveryChoice },

    /// Clears the conversation and starts again from the greeting.
    Restart,
}

impl ClientMessage {
    /// Maps the wire message onto a conversation event.
    pub fn into_event(self) -> Result<Event, String> {
        let event = match self {
            ClientMessage::ChooseAction { action } => Event::ActionChosen(match action {
                ActionChoice::Create => Action::Create,
                ActionChoice::Learn => Action::Learn,
            }),
            ClientMessage::SubmitText { text } => Event::TextSubmitted(text),
            ClientMessage::ChooseBudget { budget } => {
                Event::BudgetChosen(budget.parse::<Budget>().map_err(|e| e.to_string())?)
            }
            ClientMessage::ToggleItem { item_id } => Event::ItemToggled(item_id),
            ClientMessage::ConfirmSelection => Event::SelectionConfirmed,
            ClientMessage::ModifySelection => Event::ModifyRequested,
            ClientMessage::ChooseDelivery { channel } => Event::DeliveryChosen(match channel {
                DeliveryChoice::Email => DeliveryChannel::Email,
                DeliveryChoice::Whatsapp => DeliveryChannel::WhatsApp,
                DeliveryChoice::None => DeliveryChannel::None,
            }),
            ClientMessage::Restart => Event::RestartRequested,
        };
        Ok(event)
    }
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms the conversation is ready. Always the first frame.
    SessionInitialized {
        conversation_id: Uuid,
        language: String,
    },

    /// The transcript was cleared; the client should empty its chat log.
    TranscriptReset,

    /// A new transcript line.
    Message {
        speaker: Speaker,
        content: String,
        sent_at: DateTime<Utc>,
    },

    /// What to render under the transcript and in the itinerary panel.
    View {
        step: Step,
        view: View,
        itinerary: ItineraryPanel,
    },

    /// Reports a rejected or malformed client message. Nothing changed.
    Error { message: String },
}

impl From<PlannerUpdate> for ServerMessage {
    fn from(update: PlannerUpdate) -> Self {
        match update {
            PlannerUpdate::TranscriptReset => ServerMessage::TranscriptReset,
            PlannerUpdate::Message(message) => ServerMessage::Message {
                speaker: message.speaker,
                content: message.content,
                sent_at: message.sent_at,
            },
            PlannerUpdate::View {
                step,
                view,
                itinerary,
            } => ServerMessage::View {
                step,
                view,
                itinerary,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itinerary_planner_core::views::ItineraryPlaceholderView;
    use serde_json::json;

    fn parse(raw: serde_json::Value) -> ClientMessage {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn client_messages_map_to_events() {
        let event = parse(json!({"type": "choose_action", "action": "learn"}))
            .into_event()
            .unwrap();
        assert!(matches!(event, Event::ActionChosen(Action::Learn)));

        let event = parse(json!({"type": "choose_budget", "budget": "budget-friendly"}))
            .into_event()
            .unwrap();
        assert!(matches!(event, Event::BudgetChosen(Budget::BudgetFriendly)));

        let event = parse(json!({"type": "choose_delivery", "channel": "whatsapp"}))
            .into_event()
            .unwrap();
        assert!(matches!(event, Event::DeliveryChosen(DeliveryChannel::WhatsApp)));

        let event = parse(json!({"type": "toggle_item", "item_id": "d1i0"}))
            .into_event()
            .unwrap();
        assert!(matches!(event, Event::ItemToggled(id) if id == "d1i0"));

        let event = parse(json!({"type": "restart"})).into_event().unwrap();
        assert!(matches!(event, Event::RestartRequested));
    }

    #[test]
    fn unknown_budget_is_reported() {
        let err = parse(json!({"type": "choose_budget", "budget": "cheap"}))
            .into_event()
            .unwrap_err();
        assert!(err.contains("cheap"));
    }

    #[test]
    fn view_frames_are_tagged() {
        let message = ServerMessage::View {
            step: Step::GetDuration,
            view: View::TextInput {
                placeholder: "Type".to_string(),
            },
            itinerary: ItineraryPanel::Placeholder(ItineraryPlaceholderView {
                message: "Soon".to_string(),
            }),
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "view");
        assert_eq!(value["step"], "getDuration");
        assert_eq!(value["view"]["kind"], "text_input");
        assert_eq!(value["itinerary"]["kind"], "placeholder");
        assert_eq!(value["itinerary"]["message"], "Soon");
    }
}
