//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::adapters::CatalogTranslator;
use crate::web::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use itinerary_planner_core::{
    domain::{Budget, SuggestionDraft, SuggestionRequest, SuggestionSet},
    planner::with_timeout,
    ports::{PortError, PortResult, Translator},
    validation::{MAX_DURATION_DAYS, MIN_DURATION_DAYS},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        suggestions_handler,
        town_info_handler,
    ),
    components(
        schemas(
            HealthResponse,
            SuggestionsRequest,
            SuggestionSetResponse,
            SuggestionDayResponse,
            SuggestionItemResponse,
            TownInfoResponse,
        )
    ),
    tags(
        (
            name = "Itinerary Planner API",
            description = "Endpoints behind the itinerary planner chat."
        )
    )
)]
pub struct ApiDoc;

/// The OpenAPI document for the REST surface, pretty-printed.
pub fn openapi_json() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_pretty_json()
}

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
}

/// Preferences for a one-off suggestion request.
#[derive(Deserialize, ToSchema)]
pub struct SuggestionsRequest {
    interests: String,
    duration: u32,
    /// One of `budget-friendly`, `moderate`, `luxury`.
    budget: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionItemResponse {
    id: String,
    time: String,
    activity: String,
    business_name: String,
    location: String,
    details: String,
    category: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionDayResponse {
    day_number: u32,
    options: Vec<SuggestionItemResponse>,
}

#[derive(Serialize, ToSchema)]
pub struct SuggestionSetResponse {
    title: String,
    duration: u32,
    days: Vec<SuggestionDayResponse>,
}

impl From<SuggestionSet> for SuggestionSetResponse {
    fn from(set: SuggestionSet) -> Self {
        Self {
            title: set.title,
            duration: set.duration,
            days: set
                .days
                .into_iter()
                .map(|day| SuggestionDayResponse {
                    day_number: day.day_number,
                    options: day
                        .options
                        .into_iter()
                        .map(|item| SuggestionItemResponse {
                            id: item.id,
                            time: item.time,
                            activity: item.activity,
                            business_name: item.business_name,
                            location: item.location,
                            details: item.details,
                            category: item.category.as_str().to_string(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct TownInfoResponse {
    text: String,
    /// True when the canned description was used instead of a generated one.
    fallback: bool,
}

#[derive(Deserialize)]
pub struct LanguageQuery {
    lang: Option<String>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Generate itinerary suggestions without going through the chat.
///
/// Applies the same checks as the conversation: non-empty interests, a duration
/// of 1 to 10 days and a known budget level. Items always carry an id.
#[utoipa::path(
    post,
    path = "/suggestions",
    request_body = SuggestionsRequest,
    responses(
        (status = 200, description = "Suggestions generated", body = SuggestionSetResponse),
        (status = 400, description = "Invalid preferences"),
        (status = 502, description = "The generator failed or returned nothing"),
        (status = 504, description = "The generator timed out")
    )
)]
pub async fn suggestions_handler(
    State(app_state): State<Arc<AppState>>,
    Json(body): Json<SuggestionsRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let request = validate_suggestions_request(body)?;
    info!(budget = %request.budget, duration = request.duration, "REST suggestion request.");

    let result = with_timeout(
        app_state.config.generation_timeout,
        app_state.suggestion_adapter.generate_suggestions(&request),
    )
    .await;

    let set = suggestions_outcome(result)?;
    Ok((StatusCode::OK, Json(SuggestionSetResponse::from(set))))
}

/// Applies the same checks the conversation does before anything is generated.
fn validate_suggestions_request(
    body: SuggestionsRequest,
) -> Result<SuggestionRequest, (StatusCode, String)> {
    let interests = body.interests.trim();
    if interests.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "interests must not be empty".to_string()));
    }
    if !(MIN_DURATION_DAYS..=MAX_DURATION_DAYS).contains(&body.duration) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "duration must be between {} and {} days",
                MIN_DURATION_DAYS, MAX_DURATION_DAYS
            ),
        ));
    }
    let budget = body
        .budget
        .parse::<Budget>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(SuggestionRequest {
        interests: interests.to_string(),
        budget,
        duration: body.duration,
    })
}

/// Normalizes a generator result, mapping every way it can fail to a gateway status.
fn suggestions_outcome(
    result: PortResult<Option<SuggestionDraft>>,
) -> Result<SuggestionSet, (StatusCode, String)> {
    match result {
        Ok(Some(draft)) => {
            let set = SuggestionSet::from(draft);
            if set.is_empty() {
                return Err((StatusCode::BAD_GATEWAY, "No suggestions generated".to_string()));
            }
            Ok(set)
        }
        Ok(None) => Err((StatusCode::BAD_GATEWAY, "No suggestions generated".to_string())),
        Err(PortError::Timeout(limit)) => {
            warn!("Suggestion generation timed out after {:?}", limit);
            Err((
                StatusCode::GATEWAY_TIMEOUT,
                "Suggestion generation timed out".to_string(),
            ))
        }
        Err(e) => {
            error!("Failed to generate suggestions: {:?}", e);
            Err((
                StatusCode::BAD_GATEWAY,
                "Failed to generate suggestions".to_string(),
            ))
        }
    }
}

/// A short description of the town. Never fails; falls back to canned copy.
#[utoipa::path(
    get,
    path = "/town-info",
    responses((status = 200, description = "Town description", body = TownInfoResponse)),
    params(
        ("lang" = Option<String>, Query, description = "Language for the fallback text, e.g. `es`.")
    )
)]
pub async fn town_info_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<LanguageQuery>,
) -> Json<TownInfoResponse> {
    let result = with_timeout(
        app_state.config.generation_timeout,
        app_state.town_info_adapter.get_town_info(),
    )
    .await;

    match result {
        Ok(text) if !text.trim().is_empty() => Json(TownInfoResponse {
            text,
            fallback: false,
        }),
        other => {
            if let Err(e) = other {
                warn!("Town info unavailable, using fallback: {}", e);
            }
            let language = query
                .lang
                .unwrap_or_else(|| app_state.config.default_language.clone());
            let translator = CatalogTranslator::for_language(&language);
            Json(TownInfoResponse {
                text: translator.t("planner.townInfoFallback", &[]),
                fallback: true,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use async_trait::async_trait;
    use itinerary_planner_core::{
        domain::{Category, DraftDay, DraftItem},
        ports::{SuggestionGenerator, TownInfoService},
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Clone, Copy)]
    enum Canned {
        Draft,
        Nothing,
        Fail,
        Slow,
    }

    struct CannedGenerator {
        reply: Canned,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SuggestionGenerator for CannedGenerator {
        async fn generate_suggestions(
            &self,
            _request: &SuggestionRequest,
        ) -> PortResult<Option<SuggestionDraft>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Canned::Draft => Ok(Some(draft())),
                Canned::Nothing => Ok(None),
                Canned::Fail => Err(PortError::Unexpected("model offline".to_string())),
                Canned::Slow => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(Some(draft()))
                }
            }
        }
    }

    struct SilentTown;

    #[async_trait]
    impl TownInfoService for SilentTown {
        async fn get_town_info(&self) -> PortResult<String> {
            Ok(String::new())
        }
    }

    fn draft() -> SuggestionDraft {
        let option = |activity: &str| DraftItem {
            id: None,
            time: "10:00".to_string(),
            activity: activity.to_string(),
            business_name: "Harbour Co.".to_string(),
            location: "Pier 1".to_string(),
            details: String::new(),
            category: Category::Activity,
        };
        SuggestionDraft {
            title: "Harbour days".to_string(),
            duration: 1,
            days: vec![DraftDay {
                day_number: 1,
                options: vec![option("Sail"), option("Fish")],
            }],
        }
    }

    fn state(reply: Canned) -> (Arc<AppState>, Arc<CannedGenerator>) {
        let config = Config::from_lookup(|name| {
            (name == "GENERATION_TIMEOUT_SECS").then(|| "5".to_string())
        })
        .unwrap();
        let generator = Arc::new(CannedGenerator {
            reply,
            calls: AtomicUsize::new(0),
        });
        let state = AppState {
            config: Arc::new(config),
            suggestion_adapter: generator.clone(),
            town_info_adapter: Arc::new(SilentTown),
        };
        (Arc::new(state), generator)
    }

    fn body(interests: &str, duration: u32, budget: &str) -> SuggestionsRequest {
        SuggestionsRequest {
            interests: interests.to_string(),
            duration,
            budget: budget.to_string(),
        }
    }

    async fn status_for(state: Arc<AppState>, body: SuggestionsRequest) -> StatusCode {
        match suggestions_handler(State(state), Json(body)).await {
            Ok(response) => response.into_response().status(),
            Err((status, _)) => status,
        }
    }

    #[tokio::test]
    async fn invalid_preferences_are_rejected_before_generation() {
        let (state, generator) = state(Canned::Draft);
        for bad in [
            body("beaches", 0, "moderate"),
            body("beaches", 11, "moderate"),
            body("   ", 3, "moderate"),
            body("beaches", 3, "cheap"),
        ] {
            assert_eq!(status_for(state.clone(), bad).await, StatusCode::BAD_REQUEST);
        }
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn generated_suggestions_are_returned() {
        let (state, generator) = state(Canned::Draft);
        let status = status_for(state, body(" beaches ", 10, "luxury")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_or_failed_generation_is_a_bad_gateway() {
        let (state, _) = state(Canned::Nothing);
        assert_eq!(
            status_for(state, body("food", 2, "moderate")).await,
            StatusCode::BAD_GATEWAY
        );

        let (state, _) = self::state(Canned::Fail);
        assert_eq!(
            status_for(state, body("food", 2, "moderate")).await,
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_generation_is_a_gateway_timeout() {
        let (state, _) = state(Canned::Slow);
        assert_eq!(
            status_for(state, body("food", 2, "moderate")).await,
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn openapi_document_lists_every_route() {
        let doc: serde_json::Value = serde_json::from_str(&openapi_json().unwrap()).unwrap();
        for path in ["/health", "/suggestions", "/town-info"] {
            assert!(doc["paths"].get(path).is_some(), "{} is undocumented", path);
        }
        assert!(doc["components"]["schemas"]
            .get("SuggestionSetResponse")
            .is_some());
    }

    #[test]
    fn outcome_fills_missing_ids() {
        let set = suggestions_outcome(Ok(Some(draft()))).unwrap();
        let ids: Vec<&str> = set.items().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["d1i0", "d1i1"]);

        let (status, _) = suggestions_outcome(Err(PortError::Timeout(Duration::from_secs(5))))
            .unwrap_err();
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    }
}
