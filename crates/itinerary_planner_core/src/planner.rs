//! crates/itinerary_planner_core/src/planner.rs
//!
//! Runs a `Conversation` against the real capabilities.
//!
//! A `PlannerSession` carries out the effects the state machine asks for and pushes
//! a `PlannerUpdate` for every observable change, so a rendering layer can follow
//! along through a channel. Delayed events (the delivery prompt) come back through
//! the `scheduled` channel and must be dispatched by the owner of the session.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::conversation::{Conversation, ConversationError, Effect, Event, Step};
use crate::domain::{ChatMessage, SuggestionDraft, SuggestionRequest};
use crate::ports::{PortError, PortResult, SuggestionGenerator, TownInfoService, Translator};
use crate::views::{render, render_itinerary_panel, ItineraryPanel, View};

/// Tunables for one planner session.
#[derive(Debug, Clone)]
pub struct PlannerSettings {
    /// Upper bound on a single capability call. `None` waits forever.
    pub capability_timeout: Option<Duration>,
    /// Pause between showing the itinerary and asking about delivery.
    pub delivery_prompt_delay: Duration,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            capability_timeout: Some(Duration::from_secs(60)),
            delivery_prompt_delay: Duration::from_millis(1500),
        }
    }
}

/// The collaborators a session talks to.
#[derive(Clone)]
pub struct PlannerServices {
    pub suggestions: Arc<dyn SuggestionGenerator>,
    pub town_info: Arc<dyn TownInfoService>,
    pub translator: Arc<dyn Translator>,
}

/// What observers receive after each transition.
#[derive(Debug, Clone)]
pub enum PlannerUpdate {
    TranscriptReset,
    Message(ChatMessage),
    View {
        step: Step,
        view: View,
        itinerary: ItineraryPanel,
    },
}

pub struct PlannerSession {
    conversation: Conversation,
    suggestions: Arc<dyn SuggestionGenerator>,
    town_info: Arc<dyn TownInfoService>,
    settings: PlannerSettings,
    updates: mpsc::UnboundedSender<PlannerUpdate>,
    scheduled: mpsc::UnboundedSender<Event>,
    delivery_timer: Option<CancellationToken>,
}

impl PlannerSession {
    pub fn new(
        services: PlannerServices,
        settings: PlannerSettings,
        updates: mpsc::UnboundedSender<PlannerUpdate>,
        scheduled: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            conversation: Conversation::new(services.translator),
            suggestions: services.suggestions,
            town_info: services.town_info,
            settings,
            updates,
            scheduled,
            delivery_timer: None,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Emits the greeting and leaves the conversation at `promptAction`.
    pub async fn start(&mut self) -> Result<(), ConversationError> {
        self.dispatch(Event::Started).await
    }

    /// Applies `event` and every follow-up it causes: capability results and the
    /// automatic transition out of `Start`. Returns once the conversation waits on
    /// the user or on a timer.
    pub async fn dispatch(&mut self, event: Event) -> Result<(), ConversationError> {
        let mut next = Some(event);

        while let Some(event) = next.take() {
            let seen = self.conversation.transcript().len();
            let effects = self.conversation.handle(event)?;

            let reset = effects.contains(&Effect::TranscriptReset);
            self.publish(if reset { 0 } else { seen }, reset);

            for effect in effects {
                match effect {
                    Effect::RequestSuggestions(request) => {
                        let result = self.request_suggestions(&request).await;
                        next = Some(Event::SuggestionsReceived(result));
                    }
                    Effect::RequestTownInfo => {
                        let result = self.request_town_info().await;
                        next = Some(Event::TownInfoReceived(result));
                    }
                    Effect::ScheduleDeliveryPrompt => self.schedule_delivery_prompt(),
                    Effect::CancelDeliveryPrompt => self.cancel_delivery_prompt(),
                    Effect::TranscriptReset => {}
                }
            }

            if next.is_none() && self.conversation.step() == Step::Start {
                next = Some(Event::Started);
            }
        }

        Ok(())
    }

    fn publish(&self, from: usize, reset: bool) {
        let mut updates = Vec::new();
        if reset {
            updates.push(PlannerUpdate::TranscriptReset);
        }
        updates.extend(
            self.conversation.transcript()[from..]
                .iter()
                .cloned()
                .map(PlannerUpdate::Message),
        );
        updates.push(PlannerUpdate::View {
            step: self.conversation.step(),
            view: render(&self.conversation),
            itinerary: render_itinerary_panel(&self.conversation),
        });

        for update in updates {
            if self.updates.send(update).is_err() {
                debug!(conversation_id = %self.conversation.id(), "Update observer is gone.");
                return;
            }
        }
    }

    async fn request_suggestions(
        &self,
        request: &SuggestionRequest,
    ) -> PortResult<Option<SuggestionDraft>> {
        let started = Instant::now();
        info!(
            conversation_id = %self.conversation.id(),
            budget = %request.budget,
            duration = request.duration,
            "Requesting itinerary suggestions."
        );
        let limit = self.settings.capability_timeout;
        let result = with_timeout(limit, self.suggestions.generate_suggestions(request)).await;
        match &result {
            Ok(Some(draft)) => info!(
                "Suggestion generator returned {} days in {:?}",
                draft.days.len(),
                started.elapsed()
            ),
            Ok(None) => warn!(
                "Suggestion generator returned nothing after {:?}",
                started.elapsed()
            ),
            Err(e) => warn!(
                "Suggestion generation failed after {:?}: {}",
                started.elapsed(),
                e
            ),
        }
        result
    }

    async fn request_town_info(&self) -> PortResult<String> {
        let started = Instant::now();
        let limit = self.settings.capability_timeout;
        let result = with_timeout(limit, self.town_info.get_town_info()).await;
        match &result {
            Ok(_) => info!("Town info fetched in {:?}", started.elapsed()),
            Err(e) => warn!("Town info unavailable, using fallback: {}", e),
        }
        result
    }

    fn schedule_delivery_prompt(&mut self) {
        self.cancel_delivery_prompt();

        let token = CancellationToken::new();
        let guard = token.clone();
        let scheduled = self.scheduled.clone();
        let delay = self.settings.delivery_prompt_delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = guard.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = scheduled.send(Event::DeliveryPromptDue);
                }
            }
        });
        self.delivery_timer = Some(token);
    }

    fn cancel_delivery_prompt(&mut self) {
        if let Some(token) = self.delivery_timer.take() {
            token.cancel();
        }
    }
}

impl Drop for PlannerSession {
    fn drop(&mut self) {
        self.cancel_delivery_prompt();
    }
}

/// Awaits a capability call, giving up with `PortError::Timeout` after `limit`.
/// `None` waits as long as the call takes.
pub async fn with_timeout<T>(
    limit: Option<Duration>,
    call: impl Future<Output = PortResult<T>>,
) -> PortResult<T> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| PortError::Timeout(limit))?,
        None => call.await,
    }
}
