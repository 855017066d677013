//! crates/itinerary_planner_core/src/conversation.rs
//!
//! The itinerary conversation as a closed state machine.
//!
//! `Conversation::handle` takes one `Event`, mutates the state and returns the
//! `Effect`s the host must carry out (capability calls, timers). It never performs
//! I/O itself. Events that the current step does not accept are rejected with a
//! `ConversationError` and leave the state untouched.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    derive_itinerary, Budget, ChatMessage, Delivery, DeliveryChannel, Itinerary, Preferences,
    Selection, SuggestionDraft, SuggestionRequest, SuggestionSet,
};
use crate::ports::{PortResult, Translator};
use crate::validation::{is_valid_email, is_valid_phone, parse_duration};

//=========================================================================================
// Steps, Events and Effects
//=========================================================================================

/// Where the conversation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    Start,
    PromptAction,
    /// Waiting on the town info capability after the user picked "learn".
    FetchTownInfo,
    GetInterests,
    GetDuration,
    GetBudget,
    GenerateSuggestions,
    Selection,
    DisplayFinal,
    PromptDelivery,
    GetEmail,
    GetPhone,
    Finished,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Start => "start",
            Step::PromptAction => "promptAction",
            Step::FetchTownInfo => "fetchTownInfo",
            Step::GetInterests => "getInterests",
            Step::GetDuration => "getDuration",
            Step::GetBudget => "getBudget",
            Step::GenerateSuggestions => "generateSuggestions",
            Step::Selection => "selection",
            Step::DisplayFinal => "displayFinal",
            Step::PromptDelivery => "promptDelivery",
            Step::GetEmail => "getEmail",
            Step::GetPhone => "getPhone",
            Step::Finished => "finished",
        }
    }

    /// Steps that wait on a capability call and accept no user input.
    pub fn is_busy(&self) -> bool {
        matches!(self, Step::FetchTownInfo | Step::GenerateSuggestions)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two entry points offered after the greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Learn,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Learn => "learn",
        }
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            Action::Create => "planner.action.create",
            Action::Learn => "planner.action.learn",
        }
    }
}

/// Everything that can move the conversation forward.
#[derive(Debug)]
pub enum Event {
    /// The automatic transition out of `Start`.
    Started,
    ActionChosen(Action),
    TextSubmitted(String),
    BudgetChosen(Budget),
    SuggestionsReceived(PortResult<Option<SuggestionDraft>>),
    TownInfoReceived(PortResult<String>),
    ItemToggled(String),
    SelectionConfirmed,
    ModifyRequested,
    /// The short pause after the itinerary is shown has elapsed.
    DeliveryPromptDue,
    DeliveryChosen(DeliveryChannel),
    RestartRequested,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Started => "started",
            Event::ActionChosen(_) => "action_chosen",
            Event::TextSubmitted(_) => "text_submitted",
            Event::BudgetChosen(_) => "budget_chosen",
            Event::SuggestionsReceived(_) => "suggestions_received",
            Event::TownInfoReceived(_) => "town_info_received",
            Event::ItemToggled(_) => "item_toggled",
            Event::SelectionConfirmed => "selection_confirmed",
            Event::ModifyRequested => "modify_requested",
            Event::DeliveryPromptDue => "delivery_prompt_due",
            Event::DeliveryChosen(_) => "delivery_chosen",
            Event::RestartRequested => "restart_requested",
        }
    }
}

/// Work the host performs on behalf of the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Call the suggestion generator and feed back `Event::SuggestionsReceived`.
    RequestSuggestions(SuggestionRequest),
    /// Call the town info service and feed back `Event::TownInfoReceived`.
    RequestTownInfo,
    /// Feed back `Event::DeliveryPromptDue` after the configured delay.
    ScheduleDeliveryPrompt,
    CancelDeliveryPrompt,
    /// The transcript was cleared; observers should drop what they rendered.
    TranscriptReset,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversationError {
    #[error("Event '{event}' is not accepted in step '{step}'")]
    UnexpectedEvent { step: Step, event: &'static str },
    #[error("Select at least one suggestion before confirming")]
    EmptySelection,
    #[error("Unknown suggestion id: {0}")]
    UnknownItem(String),
    #[error("An answer is required")]
    EmptyInput,
}

//=========================================================================================
// The Conversation
//=========================================================================================

/// The single authoritative record behind one planner chat.
pub struct Conversation {
    id: Uuid,
    translator: Arc<dyn Translator>,
    step: Step,
    transcript: Vec<ChatMessage>,
    preferences: Preferences,
    suggestions: Option<SuggestionSet>,
    selection: Selection,
    itinerary: Option<Itinerary>,
    delivery: Option<Delivery>,
}

impl fmt::Debug for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversation")
            .field("id", &self.id)
            .field("step", &self.step)
            .field("transcript_len", &self.transcript.len())
            .field("preferences", &self.preferences)
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

impl Conversation {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self {
            id: Uuid::new_v4(),
            translator,
            step: Step::Start,
            transcript: Vec::new(),
            preferences: Preferences::default(),
            suggestions: None,
            selection: Selection::new(),
            itinerary: None,
            delivery: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn suggestions(&self) -> Option<&SuggestionSet> {
        self.suggestions.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn itinerary(&self) -> Option<&Itinerary> {
        self.itinerary.as_ref()
    }

    pub fn delivery(&self) -> Option<&Delivery> {
        self.delivery.as_ref()
    }

    pub fn translator(&self) -> &dyn Translator {
        self.translator.as_ref()
    }

    pub fn t(&self, key: &str) -> String {
        self.translator.t(key, &[])
    }

    /// Applies one event. On error nothing has changed.
    pub fn handle(&mut self, event: Event) -> Result<Vec<Effect>, ConversationError> {
        let from = self.step;
        let event_name = event.name();
        let effects = match (self.step, event) {
            (_, Event::RestartRequested) => {
                self.restart();
                vec![Effect::CancelDeliveryPrompt, Effect::TranscriptReset]
            }

            (Step::Start, Event::Started) => {
                self.say("planner.greeting");
                self.step = Step::PromptAction;
                vec![]
            }

            (Step::PromptAction, Event::ActionChosen(action)) => {
                self.echo_key(action.label_key());
                match action {
                    Action::Create => {
                        self.say("planner.askInterests");
                        self.step = Step::GetInterests;
                        vec![]
                    }
                    Action::Learn => {
                        self.step = Step::FetchTownInfo;
                        vec![Effect::RequestTownInfo]
                    }
                }
            }

            (Step::FetchTownInfo, Event::TownInfoReceived(result)) => {
                let text = match result {
                    Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
                    _ => self.t("planner.townInfoFallback"),
                };
                self.transcript.push(ChatMessage::bot(text));
                self.step = Step::PromptAction;
                vec![]
            }

            (Step::GetInterests, Event::TextSubmitted(text)) => {
                let interests = text.trim();
                if interests.is_empty() {
                    return Err(ConversationError::EmptyInput);
                }
                self.transcript.push(ChatMessage::user(interests));
                self.preferences.interests = Some(interests.to_string());
                self.say("planner.askDuration");
                self.step = Step::GetDuration;
                vec![]
            }

            (Step::GetDuration, Event::TextSubmitted(text)) => {
                self.transcript.push(ChatMessage::user(text.trim()));
                match parse_duration(&text) {
                    Some(days) => {
                        self.preferences.duration = Some(days);
                        self.say("planner.askBudget");
                        self.step = Step::GetBudget;
                    }
                    None => self.say("planner.invalidDuration"),
                }
                vec![]
            }

            (Step::GetBudget, Event::BudgetChosen(budget)) => {
                self.echo_key(budget.label_key());
                self.preferences.budget = Some(budget);
                match self.preferences.to_request() {
                    Some(request) => {
                        self.say("planner.generating");
                        self.step = Step::GenerateSuggestions;
                        vec![Effect::RequestSuggestions(request)]
                    }
                    // Unreachable through the steps above; treat as a failed cycle.
                    None => {
                        self.fail_generation();
                        vec![]
                    }
                }
            }

            (Step::GenerateSuggestions, Event::SuggestionsReceived(result)) => {
                match result.map(|draft| draft.map(SuggestionSet::from)) {
                    Ok(Some(set)) if !set.is_empty() => {
                        self.suggestions = Some(set);
                        self.selection.clear();
                        self.itinerary = None;
                        self.say("planner.suggestionsReady");
                        self.step = Step::Selection;
                    }
                    _ => self.fail_generation(),
                }
                vec![]
            }

            (Step::Selection, Event::ItemToggled(item_id)) => {
                let known = self
                    .suggestions
                    .as_ref()
                    .is_some_and(|set| set.contains(&item_id));
                if !known {
                    return Err(ConversationError::UnknownItem(item_id));
                }
                self.selection.toggle(&item_id);
                vec![]
            }

            (Step::Selection, Event::SelectionConfirmed) => {
                if self.selection.is_empty() {
                    return Err(ConversationError::EmptySelection);
                }
                let Some(suggestions) = self.suggestions.as_ref() else {
                    return Err(ConversationError::EmptySelection);
                };
                let translator = &self.translator;
                let itinerary = derive_itinerary(suggestions, &self.selection, |day| {
                    translator.t("planner.dayTitle", &[("day", &day.to_string())])
                });
                self.itinerary = Some(itinerary);
                self.say("planner.itineraryReady");
                self.step = Step::DisplayFinal;
                vec![Effect::ScheduleDeliveryPrompt]
            }

            (Step::DisplayFinal, Event::ModifyRequested) => {
                self.itinerary = None;
                self.step = Step::Selection;
                vec![Effect::CancelDeliveryPrompt]
            }

            (Step::DisplayFinal, Event::DeliveryPromptDue) => {
                self.say("planner.askDelivery");
                self.step = Step::PromptDelivery;
                vec![]
            }

            (Step::PromptDelivery, Event::DeliveryChosen(channel)) => {
                self.echo_key(channel.label_key());
                match channel {
                    DeliveryChannel::Email => {
                        self.say("planner.askEmail");
                        self.step = Step::GetEmail;
                    }
                    DeliveryChannel::WhatsApp => {
                        self.say("planner.askPhone");
                        self.step = Step::GetPhone;
                    }
                    DeliveryChannel::None => {
                        self.say("planner.closing");
                        self.step = Step::Finished;
                    }
                }
                vec![]
            }

            (Step::GetEmail, Event::TextSubmitted(text)) => {
                self.capture_contact(DeliveryChannel::Email, &text);
                vec![]
            }

            (Step::GetPhone, Event::TextSubmitted(text)) => {
                self.capture_contact(DeliveryChannel::WhatsApp, &text);
                vec![]
            }

            (step, event) => {
                return Err(ConversationError::UnexpectedEvent {
                    step,
                    event: event.name(),
                })
            }
        };

        if from != self.step {
            debug!(conversation_id = %self.id, event = event_name, "{} -> {}", from, self.step);
        }
        Ok(effects)
    }

    /// Clears everything and returns to `Start`.
    pub fn restart(&mut self) {
        self.transcript.clear();
        self.clear_plan();
        self.step = Step::Start;
    }

    fn clear_plan(&mut self) {
        self.preferences = Preferences::default();
        self.suggestions = None;
        self.selection.clear();
        self.itinerary = None;
        self.delivery = None;
    }

    /// The apology stays visible; all planning data is dropped.
    fn fail_generation(&mut self) {
        self.say("planner.generationFailed");
        self.clear_plan();
        self.step = Step::Start;
    }

    fn capture_contact(&mut self, channel: DeliveryChannel, text: &str) {
        let contact = text.trim();
        self.transcript.push(ChatMessage::user(contact));

        let (valid, invalid_key, confirmed_key) = match channel {
            DeliveryChannel::Email => (
                is_valid_email(contact),
                "planner.invalidEmail",
                "planner.emailConfirmed",
            ),
            _ => (
                is_valid_phone(contact),
                "planner.invalidPhone",
                "planner.whatsappConfirmed",
            ),
        };

        if !valid {
            self.say(invalid_key);
            return;
        }

        let confirmation = self.translator.t(confirmed_key, &[("contact", contact)]);
        self.transcript.push(ChatMessage::bot(confirmation));
        self.delivery = Some(Delivery {
            channel,
            contact: contact.to_string(),
        });
        self.step = Step::Finished;
    }

    fn say(&mut self, key: &str) {
        let content = self.t(key);
        self.transcript.push(ChatMessage::bot(content));
    }

    fn echo_key(&mut self, key: &str) {
        let content = self.t(key);
        self.transcript.push(ChatMessage::user(content));
    }
}
