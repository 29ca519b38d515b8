//! Public endpoints: service info, health, the RSVP flow (classify,
//! register, waitlist) and direct invite requests.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use rsvpd_api::ApiResult;
use rsvpd_core::{Cohort, OccurrenceAvailability};
use rsvpd_store::{NewRegistrant, NewWaitlistEntry};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "rsvpd",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ready" }))
}

/// Catalog with live per-cohort counts.
pub async fn occurrences(State(state): State<AppState>) -> impl IntoResponse {
    let overview = state.store.overview().await;
    Json(overview)
}

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub publications: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    pub cohort: Cohort,
    pub available: Vec<OccurrenceAvailability>,
    /// True when nothing is open to this cohort and the waitlist path
    /// should be offered.
    pub waitlist_offered: bool,
    /// Occurrence ids to pre-select as preferred on the waitlist form.
    pub preferred_defaults: Vec<String>,
}

/// Derive the cohort for a publication selection and report which
/// occurrences are open to it.
pub async fn classify(
    State(state): State<AppState>,
    Json(req): Json<ClassifyRequest>,
) -> ApiResult<Json<ClassifyResponse>> {
    let cohort = state.classifier.classify(&req.publications)?;
    let available = state.store.available_for(cohort).await;
    let waitlist_offered = available.is_empty();
    let preferred_defaults = if waitlist_offered {
        state.store.catalog().ids()
    } else {
        Vec::new()
    };
    Ok(Json(ClassifyResponse {
        cohort,
        available,
        waitlist_offered,
        preferred_defaults,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub professional_title: Option<String>,
    pub bio: String,
    #[serde(default)]
    pub food_allergies: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    pub publications: Vec<String>,
    pub event_id: String,
}

/// Register for an occurrence. The cohort is derived here, once, from the
/// submitted publications; capacity is re-checked inside the store.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let cohort = state.classifier.classify(&req.publications)?;
    let registrant = state
        .store
        .register(NewRegistrant {
            name: req.name,
            email: req.email,
            phone: req.phone,
            professional_title: req.professional_title,
            bio: req.bio,
            food_allergies: req.food_allergies,
            photo: req.photo,
            cohort,
            event_id: req.event_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(registrant)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub professional_title: Option<String>,
    pub bio: String,
    #[serde(default)]
    pub food_allergies: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    pub publications: Vec<String>,
    pub preferred_events: Vec<String>,
}

pub async fn join_waitlist(
    State(state): State<AppState>,
    Json(req): Json<WaitlistRequest>,
) -> ApiResult<impl IntoResponse> {
    let cohort = state.classifier.classify(&req.publications)?;
    let entry = state
        .store
        .add_to_waitlist(NewWaitlistEntry {
            name: req.name,
            email: req.email,
            phone: req.phone,
            professional_title: req.professional_title,
            bio: req.bio,
            food_allergies: req.food_allergies,
            photo: req.photo,
            cohort,
            preferred_events: req.preferred_events,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub name: String,
    pub email: String,
}

pub async fn request_invite(
    State(state): State<AppState>,
    Json(req): Json<InviteRequest>,
) -> ApiResult<impl IntoResponse> {
    let entry = state.store.add_invite(&req.name, &req.email).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
