#![allow(dead_code)]

use async_trait::async_trait;
use itinerary_planner_core::{
    Category, DraftDay, DraftItem, PortError, PortResult, SuggestionDraft, SuggestionGenerator,
    SuggestionRequest, TownInfoService, Translator,
};
use std::sync::Mutex;
use std::time::Duration;

/// Returns the key itself, with replacements appended as `key[name=value]`.
pub struct KeyTranslator;

impl Translator for KeyTranslator {
    fn t(&self, key: &str, replacements: &[(&str, &str)]) -> String {
        if replacements.is_empty() {
            return key.to_string();
        }
        let filled: Vec<String> = replacements
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        format!("{}[{}]", key, filled.join(","))
    }
}

pub fn draft_item(id: Option<&str>, activity: &str) -> DraftItem {
    DraftItem {
        id: id.map(str::to_string),
        time: "10:00".to_string(),
        activity: activity.to_string(),
        business_name: format!("{} Ltd", activity),
        location: "Old Town".to_string(),
        details: String::new(),
        category: Category::Activity,
    }
}

/// A three-day draft with two unnamed options per day.
pub fn three_day_draft() -> SuggestionDraft {
    SuggestionDraft {
        title: "Beaches and food".to_string(),
        duration: 3,
        days: (1..=3)
            .map(|day| DraftDay {
                day_number: day,
                options: vec![
                    draft_item(None, &format!("Beach walk {}", day)),
                    draft_item(None, &format!("Tapas {}", day)),
                ],
            })
            .collect(),
    }
}

pub enum Reply {
    Draft(SuggestionDraft),
    Nothing,
    Fail,
    Hang,
}

/// A generator that answers every call with the configured reply and records requests.
pub struct FakeGenerator {
    reply: Reply,
    pub requests: Mutex<Vec<SuggestionRequest>>,
}

impl FakeGenerator {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SuggestionGenerator for FakeGenerator {
    async fn generate_suggestions(
        &self,
        request: &SuggestionRequest,
    ) -> PortResult<Option<SuggestionDraft>> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Draft(draft) => Ok(Some(draft.clone())),
            Reply::Nothing => Ok(None),
            Reply::Fail => Err(PortError::Unexpected("model unavailable".to_string())),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
        }
    }
}

pub struct FakeTownInfo(pub Option<&'static str>);

#[async_trait]
impl TownInfoService for FakeTownInfo {
    async fn get_town_info(&self) -> PortResult<String> {
        self.0
            .map(str::to_string)
            .ok_or_else(|| PortError::Unexpected("no town info".to_string()))
    }
}
