//! crates/itinerary_planner_core/src/views.rs
//!
//! View models for everything the chat shows besides the transcript itself:
//! choice buttons, the suggestion picker, the itinerary display with its day
//! views, and the placeholder shown before an itinerary exists.
//!
//! These are pure functions of a `Conversation`; rendering them is up to the client.

use serde::Serialize;

use crate::conversation::{Action, Conversation, Step};
use crate::domain::{
    Budget, Category, DeliveryChannel, Itinerary, ItineraryDay, Selection, SuggestionSet,
};
use crate::ports::Translator;

/// A button the user can press to answer the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickerOption {
    pub item_id: String,
    pub time: String,
    pub activity: String,
    pub business_name: String,
    pub location: String,
    pub details: String,
    pub category: Category,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickerDay {
    pub day_number: u32,
    pub label: String,
    pub options: Vec<PickerOption>,
}

/// One toggle control per suggestion, reflecting the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionPickerView {
    pub title: String,
    pub days: Vec<PickerDay>,
    pub selected_count: usize,
    pub can_confirm: bool,
    pub confirm_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItineraryEntryView {
    pub time: String,
    pub activity: String,
    pub business_name: String,
    pub location: String,
    pub details: String,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItineraryDayView {
    pub day_number: u32,
    pub title: String,
    pub theme: String,
    pub entries: Vec<ItineraryEntryView>,
}

/// Read-only, chronological view of the final itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItineraryDisplayView {
    pub title: String,
    pub duration: u32,
    pub days: Vec<ItineraryDayView>,
    /// Present only while the user may still go back to the picker.
    pub modify_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItineraryPlaceholderView {
    pub message: String,
}

/// What the itinerary panel shows next to the chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItineraryPanel {
    Display(ItineraryDisplayView),
    Placeholder(ItineraryPlaceholderView),
}

/// The control area under the transcript for the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    None,
    Choices { choices: Vec<Choice> },
    TextInput { placeholder: String },
    Loading { label: String },
    SuggestionPicker(SuggestionPickerView),
    ItineraryDisplay(ItineraryDisplayView),
}

//=========================================================================================
// Rendering
//=========================================================================================

pub fn render(conversation: &Conversation) -> View {
    let translator = conversation.translator();
    let text_input = || View::TextInput {
        placeholder: translator.t("planner.inputPlaceholder", &[]),
    };

    match conversation.step() {
        Step::Start => View::None,
        Step::PromptAction => View::Choices {
            choices: [Action::Create, Action::Learn]
                .iter()
                .map(|action| choice(translator, action.as_str(), action.label_key()))
                .collect(),
        },
        Step::GetInterests | Step::GetDuration | Step::GetEmail | Step::GetPhone => text_input(),
        Step::GetBudget => View::Choices {
            choices: Budget::ALL
                .iter()
                .map(|budget| choice(translator, budget.as_str(), budget.label_key()))
                .collect(),
        },
        Step::FetchTownInfo | Step::GenerateSuggestions => View::Loading {
            label: translator.t("planner.loading", &[]),
        },
        Step::Selection => match conversation.suggestions() {
            Some(set) => View::SuggestionPicker(suggestion_picker(
                translator,
                set,
                conversation.selection(),
            )),
            None => View::None,
        },
        Step::DisplayFinal => match conversation.itinerary() {
            Some(itinerary) => {
                View::ItineraryDisplay(itinerary_display(translator, itinerary, true))
            }
            None => View::None,
        },
        Step::PromptDelivery => View::Choices {
            choices: DeliveryChannel::ALL
                .iter()
                .map(|channel| choice(translator, channel.as_str(), channel.label_key()))
                .collect(),
        },
        Step::Finished => View::Choices {
            choices: vec![choice(translator, "restart", "planner.startOver")],
        },
    }
}

/// The side panel: the itinerary once it exists, a placeholder otherwise.
pub fn render_itinerary_panel(conversation: &Conversation) -> ItineraryPanel {
    let translator = conversation.translator();
    match conversation.itinerary() {
        Some(itinerary) => ItineraryPanel::Display(itinerary_display(
            translator,
            itinerary,
            conversation.step() == Step::DisplayFinal,
        )),
        None => ItineraryPanel::Placeholder(ItineraryPlaceholderView {
            message: translator.t("planner.itineraryPlaceholder", &[]),
        }),
    }
}

pub fn suggestion_picker(
    translator: &dyn Translator,
    set: &SuggestionSet,
    selection: &Selection,
) -> SuggestionPickerView {
    let days = set
        .days
        .iter()
        .map(|day| PickerDay {
            day_number: day.day_number,
            label: translator.t("planner.dayTitle", &[("day", &day.day_number.to_string())]),
            options: day
                .options
                .iter()
                .map(|item| PickerOption {
                    item_id: item.id.clone(),
                    time: item.time.clone(),
                    activity: item.activity.clone(),
                    business_name: item.business_name.clone(),
                    location: item.location.clone(),
                    details: item.details.clone(),
                    category: item.category,
                    checked: selection.contains(&item.id),
                })
                .collect(),
        })
        .collect();

    SuggestionPickerView {
        title: set.title.clone(),
        days,
        selected_count: selection.len(),
        can_confirm: !selection.is_empty(),
        confirm_label: translator.t("planner.confirmSelection", &[]),
    }
}

pub fn itinerary_display(
    translator: &dyn Translator,
    itinerary: &Itinerary,
    can_modify: bool,
) -> ItineraryDisplayView {
    ItineraryDisplayView {
        title: itinerary.title.clone(),
        duration: itinerary.duration,
        days: itinerary.days.iter().map(itinerary_day).collect(),
        modify_label: can_modify.then(|| translator.t("planner.modifySelections", &[])),
    }
}

pub fn itinerary_day(day: &ItineraryDay) -> ItineraryDayView {
    ItineraryDayView {
        day_number: day.day_number,
        title: day.title.clone(),
        theme: day.theme.clone(),
        entries: day
            .items
            .iter()
            .map(|item| ItineraryEntryView {
                time: item.time.clone(),
                activity: item.activity.clone(),
                business_name: item.business_name.clone(),
                location: item.location.clone(),
                details: item.details.clone(),
                category: item.category,
            })
            .collect(),
    }
}

fn choice(translator: &dyn Translator, id: &str, label_key: &str) -> Choice {
    Choice {
        id: id.to_string(),
        label: translator.t(label_key, &[]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{derive_itinerary, DraftDay, DraftItem, SuggestionDraft};

    struct Keys;

    impl Translator for Keys {
        fn t(&self, key: &str, _replacements: &[(&str, &str)]) -> String {
            key.to_string()
        }
    }

    fn item(activity: &str, category: Category) -> DraftItem {
        DraftItem {
            id: None,
            time: "10:00".to_string(),
            activity: activity.to_string(),
            business_name: format!("{} Co", activity),
            location: "Main St".to_string(),
            details: String::new(),
            category,
        }
    }

    fn set() -> SuggestionSet {
        SuggestionSet::from(SuggestionDraft {
            title: "Two days".to_string(),
            duration: 2,
            days: vec![
                DraftDay {
                    day_number: 1,
                    options: vec![
                        item("Kayak", Category::Activity),
                        item("Paella", Category::Dining),
                    ],
                },
                DraftDay {
                    day_number: 2,
                    options: vec![item("Castle", Category::Sightseeing)],
                },
            ],
        })
    }

    #[test]
    fn picker_reflects_selection() {
        let selection: Selection = ["d1i1"].into_iter().collect();
        let view = suggestion_picker(&Keys, &set(), &selection);

        let checked: Vec<(&str, bool)> = view
            .days
            .iter()
            .flat_map(|day| day.options.iter())
            .map(|option| (option.item_id.as_str(), option.checked))
            .collect();
        assert_eq!(checked, vec![("d1i0", false), ("d1i1", true), ("d2i0", false)]);
        assert_eq!(view.selected_count, 1);
        assert!(view.can_confirm);

        let empty = suggestion_picker(&Keys, &set(), &Selection::new());
        assert!(!empty.can_confirm);
    }

    #[test]
    fn display_offers_modify_only_when_asked() {
        let selection: Selection = ["d1i0", "d2i0"].into_iter().collect();
        let itinerary = derive_itinerary(&set(), &selection, |n| format!("Day {}", n));

        let view = itinerary_display(&Keys, &itinerary, true);
        assert_eq!(view.days.len(), 2);
        assert_eq!(view.days[1].entries[0].activity, "Castle");
        assert_eq!(view.modify_label.as_deref(), Some("planner.modifySelections"));

        assert!(itinerary_display(&Keys, &itinerary, false).modify_label.is_none());
    }

    #[test]
    fn panels_serialize_with_a_kind_tag() {
        let panel = ItineraryPanel::Placeholder(ItineraryPlaceholderView {
            message: "planner.itineraryPlaceholder".to_string(),
        });
        let value = serde_json::to_value(&panel).unwrap();
        assert_eq!(value["kind"], "placeholder");

        let view = View::Loading {
            label: "planner.loading".to_string(),
        };
        assert_eq!(serde_json::to_value(&view).unwrap()["kind"], "loading");
    }
}
