//! HTTP handlers.
//!
//! Thin wrappers that bridge requests to the pipeline and profile store.
//! The reply routes always answer 200 with something displayable; the
//! profile routes report errors as `(StatusCode, String)`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::llm::{Placeholder, RizzRequest, RizzResponse};
use crate::pipeline::{self, ScreenshotRequest};
use crate::profile::onboarding::{self as wizard, CalibrationLine, Question};
use crate::profile::store::is_valid_uid;
use crate::profile::{OnboardingAnswers, Profile, StoreError};
use crate::server::SharedState;

type ApiError = (StatusCode, String);

/// `POST /api/rizz`
pub async fn rizz(
    State(state): State<SharedState>,
    payload: Result<Json<RizzRequest>, JsonRejection>,
) -> Json<RizzResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(e) => {
            log::warn!("[SERVER] Unreadable /api/rizz body: {}", e);
            return Json(RizzResponse::placeholder(Placeholder::GatewayFailure));
        }
    };
    Json(pipeline::handle_rizz(state.gateway.as_ref(), &state.rules, request).await)
}

/// `POST /api/screenshot`
pub async fn screenshot(
    State(state): State<SharedState>,
    payload: Result<Json<ScreenshotRequest>, JsonRejection>,
) -> Json<RizzResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(e) => {
            log::warn!("[SERVER] Unreadable /api/screenshot body: {}", e);
            return Json(RizzResponse::placeholder(Placeholder::ScreenshotFailure));
        }
    };
    Json(
        pipeline::reply_to_screenshot(
            state.gateway.as_ref(),
            state.recognizer.as_deref(),
            &state.rules,
            request,
            state.max_image_dim,
        )
        .await,
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingDefinition {
    pub questions: Vec<Question>,
    pub calibration_lines: Vec<CalibrationLine>,
}

/// `GET /api/onboarding`
pub async fn onboarding() -> Json<OnboardingDefinition> {
    Json(OnboardingDefinition {
        questions: wizard::questions(),
        calibration_lines: wizard::CALIBRATION_LINES.to_vec(),
    })
}

#[derive(Debug, Serialize)]
pub struct CreatedProfile {
    pub uid: String,
}

/// `POST /api/profile`
pub async fn create_profile(
    State(state): State<SharedState>,
) -> Result<(StatusCode, Json<CreatedProfile>), ApiError> {
    let _guard = state.registry_lock.lock().await;
    let store = state.profiles.clone();
    let uid = with_store(move || store.allocate_uid()).await?;
    Ok((StatusCode::CREATED, Json(CreatedProfile { uid })))
}

/// `GET /api/profile/:uid`
pub async fn get_profile(
    State(state): State<SharedState>,
    Path(uid): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let store = state.profiles.clone();
    with_store(move || store.load(&uid)).await.map(Json)
}

/// `PUT /api/profile/:uid`
pub async fn put_profile(
    State(state): State<SharedState>,
    Path(uid): Path<String>,
    payload: Result<Json<OnboardingAnswers>, JsonRejection>,
) -> Result<Json<Profile>, ApiError> {
    if !is_valid_uid(&uid) {
        return Err(store_error(StoreError::InvalidUid(uid)));
    }
    let answers = match payload {
        Ok(Json(answers)) => answers,
        Err(e) => {
            log::warn!("[PROFILE] Unreadable onboarding for {}: {}", uid, e);
            return Err((StatusCode::BAD_REQUEST, e.body_text()));
        }
    };
    let profile = answers.into_profile().map_err(|e| {
        log::warn!("[PROFILE] Rejected onboarding for {}: {}", uid, e);
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    let _guard = state.registry_lock.lock().await;
    let store = state.profiles.clone();
    let saved = profile.clone();
    with_store(move || store.save(&uid, &saved)).await?;
    Ok(Json(profile))
}

/// `GET /health`
pub async fn health(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": {
            "id": state.provider.id,
            "name": state.provider.name,
        },
        "ocr": state.recognizer.is_some(),
    }))
}

/// Run a profile store call on the blocking pool.
async fn with_store<T, F>(op: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(op).await {
        Ok(result) => result.map_err(store_error),
        Err(e) => {
            log::error!("[PROFILE] Store task failed: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "profile store unavailable".to_string()))
        }
    }
}

fn store_error(e: StoreError) -> ApiError {
    let status = match &e {
        StoreError::InvalidUid(_) => StatusCode::BAD_REQUEST,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Io(_) | StoreError::Json(_) => {
            log::error!("[PROFILE] Store failure: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.to_string())
}
