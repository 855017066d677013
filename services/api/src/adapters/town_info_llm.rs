//! services/api/src/adapters/town_info_llm.rs
//!
//! This module contains the adapter for the town-description LLM.
//! It implements the `TownInfoService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use itinerary_planner_core::ports::{PortError, PortResult, TownInfoService};

const GUIDE_INSTRUCTIONS: &str = "You are a friendly local tourism guide. \
Describe the town you are asked about in one short paragraph (at most 5 sentences): \
its character, what visitors love, and one insider tip. \
Plain text only, no lists, no markdown.";

pub struct OpenAiTownInfoAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    town_name: String,
}

impl OpenAiTownInfoAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String, town_name: String) -> Self {
        Self {
            client,
            model,
            town_name,
        }
    }
}

#[async_trait]
impl TownInfoService for OpenAiTownInfoAdapter {
    async fn get_town_info(&self) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(GUIDE_INSTRUCTIONS)
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(format!("Tell a visitor about {}.", self.town_name))
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(300u32)
            .temperature(0.7)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| PortError::Unexpected("No town info generated".to_string()))?;

        Ok(text)
    }
}
