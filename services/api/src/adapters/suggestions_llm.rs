//! services/api/src/adapters/suggestions_llm.rs
//!
//! This module contains the adapter for the itinerary-suggestion LLM.
//! It implements the `SuggestionGenerator` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str = r#"You are a local travel planner for {town}.
You suggest real-feeling activities, places to eat and sights that match a visitor's interests and budget.

Respond with a single JSON object and nothing else. No markdown, no commentary.
The object must have this exact shape:
{
  "title": "short catchy itinerary title",
  "duration": <number of days>,
  "days": [
    {
      "day": <day number starting at 1>,
      "options": [
        {
          "id": "d<day>i<index>" (index counts from 0 within the day, e.g. "d1i0"),
          "time": "e.g. 09:00",
          "activity": "what the visitor does",
          "businessName": "name of the business or place",
          "location": "street or area",
          "details": "one or two sentences on why it fits",
          "category": "activity" | "dining" | "sightseeing"
        }
      ]
    }
  ]
}

Rules:
- Produce exactly one entry in "days" per requested day, in order.
- Every "id" must be unique across the whole object.
- Give between 3 and 5 options per day, ordered by time of day.
- Mix categories across the day and keep every option inside the stated budget level."#;

const USER_INPUT_TEMPLATE: &str = r#"Plan {duration} day(s) in {town}.
Interests: {interests}
Budget level: {budget}"#;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client, error::OpenAIError,
};
use async_trait::async_trait;
use itinerary_planner_core::{
    domain::{Category, DraftDay, DraftItem, SuggestionDraft, SuggestionRequest},
    ports::{PortError, PortResult, SuggestionGenerator},
};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::{debug, warn};

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*(.*?)\s*```\s*$").expect("fence pattern is valid")
});

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SuggestionGenerator` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiSuggestionAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    town_name: String,
}

impl OpenAiSuggestionAdapter {
    /// Creates a new `OpenAiSuggestionAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, town_name: String) -> Self {
        Self {
            client,
            model,
            town_name,
        }
    }
}

//=========================================================================================
// "Impure" Response Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct SuggestionSetRecord {
    #[serde(default)]
    title: String,
    duration: Option<u32>,
    #[serde(default)]
    days: Vec<DayRecord>,
}

#[derive(Deserialize)]
struct DayRecord {
    #[serde(alias = "dayNumber", alias = "day_number")]
    day: Option<u32>,
    #[serde(default, alias = "items", alias = "activities")]
    options: Vec<ItemRecord>,
}

#[derive(Deserialize)]
struct ItemRecord {
    id: Option<String>,
    #[serde(default)]
    time: String,
    #[serde(default)]
    activity: String,
    #[serde(default, rename = "businessName", alias = "business_name")]
    business_name: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    details: String,
    #[serde(default)]
    category: String,
}

impl SuggestionSetRecord {
    fn to_domain(self, request: &SuggestionRequest) -> SuggestionDraft {
        let days = self
            .days
            .into_iter()
            .enumerate()
            .map(|(index, day)| DraftDay {
                day_number: day.day.unwrap_or(index as u32 + 1),
                options: day.options.into_iter().map(ItemRecord::to_domain).collect(),
            })
            .collect();

        SuggestionDraft {
            title: self.title,
            duration: self.duration.unwrap_or(request.duration),
            days,
        }
    }
}

impl ItemRecord {
    fn to_domain(self) -> DraftItem {
        DraftItem {
            id: self.id,
            time: self.time,
            activity: self.activity,
            business_name: self.business_name,
            location: self.location,
            details: self.details,
            category: Category::from_generated(&self.category),
        }
    }
}

/// Parses the model's reply. An empty reply or one without any day is `None`.
pub fn parse_suggestions(
    raw: &str,
    request: &SuggestionRequest,
) -> PortResult<Option<SuggestionDraft>> {
    let body = match CODE_FENCE.captures(raw) {
        Some(captures) => captures.get(1).map_or("", |m| m.as_str()),
        None => raw.trim(),
    };
    if body.is_empty() {
        return Ok(None);
    }

    let record: SuggestionSetRecord = serde_json::from_str(body)
        .map_err(|e| PortError::Unexpected(format!("Malformed suggestion JSON: {}", e)))?;
    if record.days.is_empty() {
        return Ok(None);
    }
    Ok(Some(record.to_domain(request)))
}

//=========================================================================================
// `SuggestionGenerator` Trait Implementation
//=========================================================================================

#[async_trait]
impl SuggestionGenerator for OpenAiSuggestionAdapter {
    /// Asks the model for a day-by-day list of candidate activities.
    async fn generate_suggestions(
        &self,
        request: &SuggestionRequest,
    ) -> PortResult<Option<SuggestionDraft>> {
        let duration = request.duration.to_string();
        let user_input = USER_INPUT_TEMPLATE
            .replace("{duration}", &duration)
            .replace("{town}", &self.town_name)
            .replace("{interests}", &request.interests)
            .replace("{budget}", request.budget.as_str());

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS.replace("{town}", &self.town_name))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_input)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request_body = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .temperature(0.7)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request_body)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let Some(content) = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
        else {
            warn!("Suggestion LLM returned no content.");
            return Ok(None);
        };
        debug!("Raw suggestion payload: {} bytes", content.len());

        parse_suggestions(&content, request)
    }
}
