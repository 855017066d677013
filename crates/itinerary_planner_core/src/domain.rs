//! crates/itinerary_planner_core/src/domain.rs
//!
//! Defines the pure, core data structures of the itinerary planner.
//! Apart from the few types that are rendered straight to clients, these structs
//! are independent of any transport or serialization format.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

//=========================================================================================
// Preferences
//=========================================================================================

/// The three spending levels a traveller can pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Budget {
    BudgetFriendly,
    Moderate,
    Luxury,
}

impl Budget {
    pub const ALL: [Budget; 3] = [Budget::BudgetFriendly, Budget::Moderate, Budget::Luxury];

    /// The identifier sent to the suggestion generator and used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Budget::BudgetFriendly => "budget-friendly",
            Budget::Moderate => "moderate",
            Budget::Luxury => "luxury",
        }
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            Budget::BudgetFriendly => "planner.budget.budgetFriendly",
            Budget::Moderate => "planner.budget.moderate",
            Budget::Luxury => "planner.budget.luxury",
        }
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown budget level: {0}")]
pub struct UnknownBudget(pub String);

impl FromStr for Budget {
    type Err = UnknownBudget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "budget-friendly" | "budget_friendly" | "budget" => Ok(Budget::BudgetFriendly),
            "moderate" => Ok(Budget::Moderate),
            "luxury" => Ok(Budget::Luxury),
            other => Err(UnknownBudget(other.to_string())),
        }
    }
}

/// Travel preferences, collected one conversation turn at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    pub interests: Option<String>,
    pub duration: Option<u32>,
    pub budget: Option<Budget>,
}

impl Preferences {
    pub fn is_empty(&self) -> bool {
        self.interests.is_none() && self.duration.is_none() && self.budget.is_none()
    }

    /// Builds the generator request once every preference has been captured.
    pub fn to_request(&self) -> Option<SuggestionRequest> {
        Some(SuggestionRequest {
            interests: self.interests.clone()?,
            duration: self.duration?,
            budget: self.budget?,
        })
    }
}

/// The frozen preferences handed to the suggestion generator for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub interests: String,
    pub budget: Budget,
    pub duration: u32,
}

//=========================================================================================
// Suggestions
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Activity,
    Dining,
    Sightseeing,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Activity => "activity",
            Category::Dining => "dining",
            Category::Sightseeing => "sightseeing",
        }
    }

    /// Lenient parse used on generator output; anything unrecognised is an activity.
    pub fn from_generated(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dining" | "food" | "restaurant" => Category::Dining,
            "sightseeing" | "sight" | "landmark" => Category::Sightseeing,
            _ => Category::Activity,
        }
    }
}

/// A suggestion item as produced by the generator, before ids are normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftItem {
    pub id: Option<String>,
    pub time: String,
    pub activity: String,
    pub business_name: String,
    pub location: String,
    pub details: String,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftDay {
    pub day_number: u32,
    pub options: Vec<DraftItem>,
}

/// The raw multi-day candidate list returned by a `SuggestionGenerator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionDraft {
    pub title: String,
    pub duration: u32,
    pub days: Vec<DraftDay>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionItem {
    pub id: String,
    pub time: String,
    pub activity: String,
    pub business_name: String,
    pub location: String,
    pub details: String,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionDay {
    pub day_number: u32,
    pub options: Vec<SuggestionItem>,
}

/// The full candidate itinerary with a stable id on every item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionSet {
    pub title: String,
    pub duration: u32,
    pub days: Vec<SuggestionDay>,
}

/// The id given to an item the generator left unnamed: `d{day}i{index}`, index 0-based.
pub fn synthesized_item_id(day_number: u32, index: usize) -> String {
    format!("d{}i{}", day_number, index)
}

/// Hands out item ids that are unique within one suggestion set.
///
/// Every id the generator supplied is reserved up front, so a synthesized id never
/// shadows one that appears later in the draft. The first item carrying a supplied
/// id keeps it; repeats and unnamed items get `d{day}i{index}`, suffixed with `-n`
/// when that is taken too.
struct ItemIds {
    reserved: HashSet<String>,
    taken: HashSet<String>,
}

impl ItemIds {
    fn new(draft: &SuggestionDraft) -> Self {
        let reserved = draft
            .days
            .iter()
            .flat_map(|day| day.options.iter())
            .filter_map(|item| normalized_id(item.id.as_deref()))
            .collect();
        Self {
            reserved,
            taken: HashSet::new(),
        }
    }

    fn assign(&mut self, supplied: Option<&str>, day_number: u32, index: usize) -> String {
        if let Some(id) = normalized_id(supplied) {
            if self.taken.insert(id.clone()) {
                return id;
            }
        }

        let base = synthesized_item_id(day_number, index);
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.reserved.contains(&candidate) || self.taken.contains(&candidate) {
            candidate = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

fn normalized_id(id: Option<&str>) -> Option<String> {
    id.map(str::trim).filter(|id| !id.is_empty()).map(str::to_string)
}

impl From<SuggestionDraft> for SuggestionSet {
    fn from(draft: SuggestionDraft) -> Self {
        let mut ids = ItemIds::new(&draft);
        let days = draft
            .days
            .into_iter()
            .map(|day| {
                let day_number = day.day_number;
                let options = day
                    .options
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| SuggestionItem {
                        id: ids.assign(item.id.as_deref(), day_number, index),
                        time: item.time,
                        activity: item.activity,
                        business_name: item.business_name,
                        location: item.location,
                        details: item.details,
                        category: item.category,
                    })
                    .collect();
                SuggestionDay { day_number, options }
            })
            .collect();

        Self {
            title: draft.title,
            duration: draft.duration,
            days,
        }
    }
}

impl SuggestionSet {
    pub fn items(&self) -> impl Iterator<Item = &SuggestionItem> {
        self.days.iter().flat_map(|day| day.options.iter())
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.items().any(|item| item.id == item_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items().next().is_none()
    }
}

//=========================================================================================
// Selection
//=========================================================================================

/// The set of suggestion ids the user has ticked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(BTreeSet<String>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `item_id` and returns whether it is now selected.
    pub fn toggle(&mut self, item_id: &str) -> bool {
        if self.0.remove(item_id) {
            false
        } else {
            self.0.insert(item_id.to_string());
            true
        }
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.0.contains(item_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

//=========================================================================================
// Itinerary
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryItem {
    pub id: String,
    pub time: String,
    pub activity: String,
    pub business_name: String,
    pub location: String,
    pub details: String,
    pub category: Category,
}

impl From<&SuggestionItem> for ItineraryItem {
    fn from(item: &SuggestionItem) -> Self {
        Self {
            id: item.id.clone(),
            time: item.time.clone(),
            activity: item.activity.clone(),
            business_name: item.business_name.clone(),
            location: item.location.clone(),
            details: item.details.clone(),
            category: item.category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryDay {
    pub day_number: u32,
    pub title: String,
    /// Categories of the day's items in order of first appearance, e.g. `dining, sightseeing`.
    pub theme: String,
    pub items: Vec<ItineraryItem>,
}

/// The user-curated itinerary, grouped by day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itinerary {
    pub title: String,
    pub duration: u32,
    pub days: Vec<ItineraryDay>,
}

impl Itinerary {
    pub fn item_count(&self) -> usize {
        self.days.iter().map(|day| day.items.len()).sum()
    }
}

/// Derives the itinerary from the suggestions the user kept.
///
/// Day order and item order follow the generator; days without a selected item
/// are left out. The result depends only on the inputs, so deriving twice yields
/// identical itineraries.
pub fn derive_itinerary(
    suggestions: &SuggestionSet,
    selection: &Selection,
    day_title: impl Fn(u32) -> String,
) -> Itinerary {
    let days = suggestions
        .days
        .iter()
        .filter_map(|day| {
            let items: Vec<ItineraryItem> = day
                .options
                .iter()
                .filter(|item| selection.contains(&item.id))
                .map(ItineraryItem::from)
                .collect();
            if items.is_empty() {
                return None;
            }

            let mut categories: Vec<&'static str> = Vec::new();
            for item in &items {
                let name = item.category.as_str();
                if !categories.contains(&name) {
                    categories.push(name);
                }
            }

            Some(ItineraryDay {
                day_number: day.day_number,
                title: day_title(day.day_number),
                theme: categories.join(", "),
                items,
            })
        })
        .collect();

    Itinerary {
        title: suggestions.title.clone(),
        duration: suggestions.duration,
        days,
    }
}

//=========================================================================================
// Transcript & Delivery
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

/// A single line of the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            content: content.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: content.into(),
            sent_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryChannel {
    Email,
    WhatsApp,
    None,
}

impl DeliveryChannel {
    pub const ALL: [DeliveryChannel; 3] = [
        DeliveryChannel::Email,
        DeliveryChannel::WhatsApp,
        DeliveryChannel::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryChannel::Email => "email",
            DeliveryChannel::WhatsApp => "whatsapp",
            DeliveryChannel::None => "none",
        }
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            DeliveryChannel::Email => "planner.delivery.email",
            DeliveryChannel::WhatsApp => "planner.delivery.whatsapp",
            DeliveryChannel::None => "planner.delivery.none",
        }
    }
}

/// The contact the user asked the itinerary to be sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub channel: DeliveryChannel,
    pub contact: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: Option<&str>, activity: &str, category: Category) -> DraftItem {
        DraftItem {
            id: id.map(str::to_string),
            time: "09:00".to_string(),
            activity: activity.to_string(),
            business_name: "Harbour Co.".to_string(),
            location: "Main St".to_string(),
            details: String::new(),
            category,
        }
    }

    fn sample_set() -> SuggestionSet {
        SuggestionSet::from(SuggestionDraft {
            title: "Coast weekend".to_string(),
            duration: 2,
            days: vec![
                DraftDay {
                    day_number: 1,
                    options: vec![
                        item(None, "Kayaking", Category::Activity),
                        item(Some("lunch"), "Seafood lunch", Category::Dining),
                        item(None, "Lighthouse", Category::Sightseeing),
                    ],
                },
                DraftDay {
                    day_number: 2,
                    options: vec![item(Some("  "), "Museum", Category::Sightseeing)],
                },
            ],
        })
    }

    #[test]
    fn missing_ids_are_synthesized_from_day_and_index() {
        let set = sample_set();
        let ids: Vec<&str> = set.items().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["d1i0", "lunch", "d1i2", "d2i0"]);
    }

    #[test]
    fn synthesized_ids_never_collide_with_supplied_ones() {
        let draft = SuggestionDraft {
            title: "Beach day".to_string(),
            duration: 1,
            days: vec![DraftDay {
                day_number: 1,
                options: vec![
                    item(Some("d1i1"), "Swim", Category::Activity),
                    item(None, "Lunch", Category::Dining),
                    item(Some("d1i3"), "Sunset", Category::Sightseeing),
                ],
            }],
        };
        let set = SuggestionSet::from(draft);
        let ids: Vec<&str> = set.items().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["d1i1", "d1i1-1", "d1i3"]);

        let mut selection = Selection::new();
        selection.toggle("d1i1");
        let itinerary = derive_itinerary(&set, &selection, |n| format!("Day {}", n));
        let activities: Vec<&str> = itinerary.days[0]
            .items
            .iter()
            .map(|i| i.activity.as_str())
            .collect();
        assert_eq!(activities, vec!["Swim"]);
    }

    #[test]
    fn repeated_supplied_ids_are_made_unique() {
        let draft = SuggestionDraft {
            title: "Repeats".to_string(),
            duration: 2,
            days: vec![
                DraftDay {
                    day_number: 1,
                    options: vec![
                        item(None, "Kayaking", Category::Activity),
                        item(Some("d1i0"), "Brunch", Category::Dining),
                    ],
                },
                DraftDay {
                    day_number: 2,
                    options: vec![item(Some("d1i0"), "Museum", Category::Sightseeing)],
                },
            ],
        };
        let set = SuggestionSet::from(draft);
        let ids: Vec<&str> = set.items().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["d1i0-1", "d1i0", "d2i0"]);
    }

    #[test]
    fn toggle_flips_membership() {
        let mut selection = Selection::new();
        assert!(selection.toggle("d1i0"));
        assert!(selection.contains("d1i0"));
        assert!(!selection.toggle("d1i0"));
        assert!(selection.is_empty());
    }

    #[test]
    fn derived_itinerary_skips_days_without_selection() {
        let set = sample_set();
        let selection: Selection = ["d1i2", "d1i0"].into_iter().collect();
        let itinerary = derive_itinerary(&set, &selection, |n| format!("Day {}", n));

        assert_eq!(itinerary.days.len(), 1);
        let day = &itinerary.days[0];
        assert_eq!(day.day_number, 1);
        assert_eq!(day.title, "Day 1");
        let activities: Vec<&str> = day.items.iter().map(|i| i.activity.as_str()).collect();
        assert_eq!(activities, vec!["Kayaking", "Lighthouse"]);
        assert_eq!(day.theme, "activity, sightseeing");
    }

    #[test]
    fn derivation_is_idempotent() {
        let set = sample_set();
        let selection: Selection = ["lunch", "d2i0"].into_iter().collect();
        let first = derive_itinerary(&set, &selection, |n| format!("Day {}", n));
        let second = derive_itinerary(&set, &selection, |n| format!("Day {}", n));
        assert_eq!(first, second);
        assert_eq!(first.item_count(), 2);
    }

    #[test]
    fn budget_parses_wire_names() {
        assert_eq!("budget-friendly".parse::<Budget>(), Ok(Budget::BudgetFriendly));
        assert_eq!(" Luxury ".parse::<Budget>(), Ok(Budget::Luxury));
        assert!("cheap".parse::<Budget>().is_err());
    }
}
