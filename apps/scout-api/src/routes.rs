use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use scout_domain::Document;
use scout_service::{Error as ServiceError, SearchOutcome, SearchParams};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
	pub query: String,
	pub documents: Vec<Document>,
	pub alpha: Option<f32>,
	pub top_k: Option<usize>,
	pub stage1_cutoff: Option<usize>,
	pub stage2_cutoff: Option<usize>,
}
impl SearchRequest {
	fn params(&self, defaults: &SearchParams) -> SearchParams {
		SearchParams {
			alpha: self.alpha.unwrap_or(defaults.alpha),
			top_k: self.top_k.unwrap_or(defaults.top_k),
			stage1_cutoff: self.stage1_cutoff.unwrap_or(defaults.stage1_cutoff),
			stage2_cutoff: self.stage2_cutoff.unwrap_or(defaults.stage2_cutoff),
			title_cutoff: defaults.title_cutoff,
		}
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/search", post(search))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchOutcome>, ApiError> {
	let params = payload.params(&state.defaults);
	let (documents, dropped) = scout_domain::retain_usable(payload.documents);

	if dropped > 0 {
		tracing::warn!(
			dropped,
			kept = documents.len(),
			"Dropped documents with placeholder fields."
		);
	}

	let outcome = state.funnel.search(&payload.query, &documents, &params).await?;

	Ok(Json(outcome))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidParameter { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "INVALID_PARAMETER", message),
			ServiceError::ModelUnavailable { message } => {
				tracing::error!(%message, "Search failed on a model call.");

				ApiError::new(StatusCode::BAD_GATEWAY, "MODEL_UNAVAILABLE", message)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
