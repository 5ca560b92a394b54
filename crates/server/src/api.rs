//! JSON API for local rankings and assistant turns.
//!
//! - `POST /api/recommendations` - offline top-3 for an application tag
//! - `POST /api/intake`          - free-text case, then offline top-3
//! - `POST /api/chat`            - one streamed assistant turn, returned whole

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use mater_agent::conversation::ChatRequest;
use mater_agent::runtime::{AgentRuntime, AssistantReply};
use mater_core::errors::{ApplicationError, DomainError, InterfaceError};
use mater_core::intake::CaseIntake;
use mater_core::recommend::recommend;
use mater_core::Recommendation;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct ApiState {
    agent: AgentRuntime,
    default_baseline: String,
}

impl ApiState {
    pub fn new(agent: AgentRuntime, default_baseline: String) -> Self {
        Self { agent, default_baseline }
    }

    pub fn default_baseline(&self) -> &str {
        &self.default_baseline
    }
}

#[derive(Debug, Deserialize)]
pub struct RecommendationsRequest {
    pub application: String,
    pub baseline: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub application: String,
    pub baseline: String,
    pub candidate_count: usize,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Deserialize)]
pub struct IntakeRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeResponse {
    pub intake: CaseIntake,
    #[serde(flatten)]
    pub ranking: RecommendationsResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub error: &'static str,
    pub detail: String,
    pub correlation_id: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/recommendations", post(recommendations))
        .route("/api/intake", post(intake))
        .route("/api/chat", post(chat))
        .with_state(state)
}

async fn recommendations(
    State(state): State<ApiState>,
    Json(body): Json<RecommendationsRequest>,
) -> ApiResult<RecommendationsResponse> {
    let correlation_id = Uuid::new_v4().to_string();
    let baseline = body.baseline.unwrap_or_else(|| state.default_baseline().to_string());
    let response = rank(&state, body.application.trim(), &baseline)
        .map_err(|error| error_response(error.into_interface(&correlation_id)))?;

    info!(
        event_name = "api.recommendations.ranked",
        correlation_id = %correlation_id,
        application = %response.application,
        candidates = response.candidate_count,
        "local recommendation served"
    );
    Ok(Json(response))
}

async fn intake(
    State(state): State<ApiState>,
    Json(body): Json<IntakeRequest>,
) -> ApiResult<IntakeResponse> {
    let correlation_id = Uuid::new_v4().to_string();
    if body.text.trim().is_empty() {
        let error = ApplicationError::from(DomainError::InvariantViolation(
            "case description must not be empty".to_string(),
        ));
        return Err(error_response(error.into_interface(&correlation_id)));
    }

    let intake = CaseIntake::from_text(&body.text, state.default_baseline());
    let ranking = rank(&state, &intake.application, &intake.baseline_key)
        .map_err(|error| error_response(error.into_interface(&correlation_id)))?;

    info!(
        event_name = "api.intake.ranked",
        correlation_id = %correlation_id,
        age = intake.age,
        application = %intake.application,
        baseline = %intake.baseline_key,
        "case intake served"
    );
    Ok(Json(IntakeResponse { intake, ranking }))
}

async fn chat(
    State(state): State<ApiState>,
    Json(body): Json<ChatRequest>,
) -> ApiResult<AssistantReply> {
    let correlation_id = Uuid::new_v4().to_string();
    match state.agent.ask(&body, &correlation_id, |_| {}).await {
        Ok(reply) => Ok(Json(reply)),
        Err(error) => {
            let interface = ApplicationError::from(error).into_interface(&correlation_id);
            warn!(
                event_name = "api.chat.failed",
                correlation_id = %correlation_id,
                error = %interface,
                "assistant turn failed"
            );
            Err(error_response(interface))
        }
    }
}

fn rank(
    state: &ApiState,
    application: &str,
    baseline: &str,
) -> Result<RecommendationsResponse, ApplicationError> {
    if application.is_empty() {
        return Err(DomainError::InvariantViolation("application must not be empty".to_string())
            .into());
    }
    let catalog = state.agent.catalog();
    if catalog.find(baseline).is_none() {
        return Err(DomainError::UnknownMaterial(baseline.to_string()).into());
    }

    let selection = recommend(catalog, application, baseline);
    Ok(RecommendationsResponse {
        application: application.to_string(),
        baseline: baseline.to_string(),
        candidate_count: selection.candidates.len(),
        recommendations: selection.top.iter().map(|pick| pick.to_recommendation()).collect(),
    })
}

fn error_response(error: InterfaceError) -> (StatusCode, Json<ApiError>) {
    let status = match error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        InterfaceError::PaymentRequired { .. } => StatusCode::PAYMENT_REQUIRED,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = ApiError {
        error: error.user_message(),
        detail: error.to_string(),
        correlation_id: error.correlation_id().to_string(),
    };
    (status, Json(body))
}
