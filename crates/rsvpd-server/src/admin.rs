//! Admin endpoints: dashboard data, registrant management, waitlist
//! promotion, exports, and webhook configuration. All routes here sit
//! behind the shared-password middleware.

use axum::http::{HeaderMap, HeaderValue, header};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rsvpd_api::{ApiError, ApiResult};
use rsvpd_core::{
    Cohort, EntityKind, InviteEntry, RecordKey, Registrant, Timestamp, WaitlistEntry,
};
use rsvpd_store::RegistrantUpdate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;

use crate::export;
use crate::server::AppState;

pub fn admin_routes() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/overview", get(overview))
        .route(
            "/registrants",
            get(list_registrants)
                .put(edit_registrant)
                .delete(delete_registrant),
        )
        .route(
            "/registrants/move-to-waitlist",
            post(move_registrant_to_waitlist),
        )
        .route("/registrants/move-to-invite", post(move_registrant_to_invite))
        .route("/waitlist", get(list_waitlist).delete(delete_waitlist))
        .route("/waitlist/promote", post(promote_waitlist))
        .route("/waitlist/move-to-invite", post(move_waitlist_to_invite))
        .route("/invites", get(list_invites).delete(delete_invite))
        .route("/export/registrants.csv", get(export_registrants_csv))
        .route("/export/registrants.json", get(export_registrants_json))
        .route("/export/waitlist.csv", get(export_waitlist_csv))
        .route("/export/push", post(push_export))
        .route("/webhook", get(get_webhook).put(put_webhook))
}

// =============================================================================
// Overview
// =============================================================================

async fn overview(State(state): State<AppState>) -> impl IntoResponse {
    let occurrences = state.store.overview().await;
    let total_registrants: u32 = occurrences.iter().map(|o| o.total).sum();
    let waitlist_count = state.store.waitlist().await.len();
    let invite_count = state.store.invites().await.len();
    Json(json!({
        "occurrences": occurrences,
        "totalRegistrants": total_registrants,
        "waitlistCount": waitlist_count,
        "inviteCount": invite_count,
    }))
}

// =============================================================================
// Registrants
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegistrantFilter {
    /// Case-insensitive search over name, email and title.
    pub q: Option<String>,
    /// Restrict to one occurrence id.
    pub event: Option<String>,
}

/// A registrant annotated with its occurrence's display fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegistrantView {
    #[serde(flatten)]
    registrant: Registrant,
    date: String,
    location: String,
}

async fn list_registrants(
    State(state): State<AppState>,
    Query(filter): Query<RegistrantFilter>,
) -> impl IntoResponse {
    let registrants = state
        .store
        .registrants(filter.q.as_deref(), filter.event.as_deref())
        .await;
    let catalog = state.store.catalog();
    let views: Vec<RegistrantView> = registrants
        .into_iter()
        .map(|r| RegistrantView {
            date: catalog.label_for(&r.event_id),
            location: catalog
                .get(&r.event_id)
                .map(|o| o.location.clone())
                .unwrap_or_default(),
            registrant: r,
        })
        .collect();
    Json(views)
}

/// Identity of a registrant or waitlist entry in query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyQuery {
    pub email: String,
    pub timestamp: String,
}

impl KeyQuery {
    fn into_key(self) -> ApiResult<RecordKey> {
        let ts = Timestamp::from_str(&self.timestamp)?;
        Ok(RecordKey::new(self.email, ts))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub key: RecordKey,
    #[serde(flatten)]
    pub update: RegistrantUpdate,
}

async fn edit_registrant(
    State(state): State<AppState>,
    Json(req): Json<EditRequest>,
) -> ApiResult<Json<Registrant>> {
    let updated = state.store.edit_registrant(&req.key, req.update).await?;
    Ok(Json(updated))
}

async fn delete_registrant(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> ApiResult<StatusCode> {
    let key = query.into_key()?;
    state.store.delete_registrant(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToWaitlistRequest {
    pub key: RecordKey,
    #[serde(default)]
    pub preferred_events: Option<Vec<String>>,
}

async fn move_registrant_to_waitlist(
    State(state): State<AppState>,
    Json(req): Json<MoveToWaitlistRequest>,
) -> ApiResult<Json<WaitlistEntry>> {
    let entry = state
        .store
        .move_registrant_to_waitlist(&req.key, req.preferred_events)
        .await?;
    Ok(Json(entry))
}

#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    pub key: RecordKey,
}

async fn move_registrant_to_invite(
    State(state): State<AppState>,
    Json(req): Json<KeyRequest>,
) -> ApiResult<Json<InviteEntry>> {
    let entry = state.store.move_registrant_to_invite(&req.key).await?;
    Ok(Json(entry))
}

// =============================================================================
// Waitlist
// =============================================================================

async fn list_waitlist(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.waitlist().await)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteRequest {
    pub key: RecordKey,
    pub event_id: String,
    pub cohort: Cohort,
}

async fn promote_waitlist(
    State(state): State<AppState>,
    Json(req): Json<PromoteRequest>,
) -> ApiResult<Json<Registrant>> {
    let registrant = state
        .store
        .promote_waitlist(&req.key, &req.event_id, req.cohort)
        .await?;
    Ok(Json(registrant))
}

async fn move_waitlist_to_invite(
    State(state): State<AppState>,
    Json(req): Json<KeyRequest>,
) -> ApiResult<Json<InviteEntry>> {
    let entry = state.store.move_waitlist_to_invite(&req.key).await?;
    Ok(Json(entry))
}

async fn delete_waitlist(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> ApiResult<StatusCode> {
    let key = query.into_key()?;
    state.store.delete_waitlist(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Invites
// =============================================================================

async fn list_invites(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.invites().await)
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

async fn delete_invite(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> ApiResult<StatusCode> {
    state.store.delete_invite(&query.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Exports & webhook configuration
// =============================================================================

fn csv_response(filename: &str, body: String) -> impl IntoResponse + use<> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    if let Ok(value) =
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
    {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    (headers, body)
}

async fn export_registrants_csv(State(state): State<AppState>) -> impl IntoResponse {
    let registrants = state.store.registrants(None, None).await;
    let csv = export::registrants_csv(state.store.catalog(), &registrants);
    csv_response(&format!("rsvpd-registrants-{}.csv", export::today_stamp()), csv)
}

async fn export_waitlist_csv(State(state): State<AppState>) -> impl IntoResponse {
    let entries = state.store.waitlist().await;
    let csv = export::waitlist_csv(state.store.catalog(), &entries);
    csv_response(&format!("rsvpd-waitlist-{}.csv", export::today_stamp()), csv)
}

async fn export_registrants_json(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.store.snapshot().await;
    Json(snapshot.registrations)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRequest {
    #[serde(rename = "type")]
    pub kind: EntityKind,
}

/// Replay a whole collection to the configured webhooks as a bulk export.
async fn push_export(
    State(state): State<AppState>,
    Json(req): Json<PushRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if state.store.webhook_url().await.is_none() && !state.has_static_endpoints {
        return Err(ApiError::bad_request(
            "no webhook configured; set one first",
        ));
    }
    let pushed = state.store.push_bulk_export(req.kind).await?;
    Ok(Json(json!({ "pushed": pushed })))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookConfigBody {
    pub url: Option<String>,
}

async fn get_webhook(State(state): State<AppState>) -> impl IntoResponse {
    Json(WebhookConfigBody {
        url: state.store.webhook_url().await,
    })
}

async fn put_webhook(
    State(state): State<AppState>,
    Json(body): Json<WebhookConfigBody>,
) -> ApiResult<Json<WebhookConfigBody>> {
    let url = body.url.filter(|u| !u.is_empty());
    state.store.set_webhook_url(url.clone()).await?;
    Ok(Json(WebhookConfigBody { url }))
}
