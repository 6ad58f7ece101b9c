//! Event endpoints: thin passthroughs to the domain service.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use calendar_core::event::{Event, EventDraft};

use crate::error::AppResult;
use crate::state::AppState;

/// Caller-suppliable event fields in the wire encoding.
#[derive(Debug, Deserialize)]
pub struct EventPayload {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "startDt")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "endDt")]
    pub end_date: DateTime<Utc>,
    #[serde(rename = "notifyBefore", with = "calendar_core::event::duration_nanos")]
    pub notify_before: chrono::Duration,
}

impl From<EventPayload> for EventDraft {
    fn from(payload: EventPayload) -> Self {
        EventDraft {
            title: payload.title,
            description: payload.description,
            start_date: payload.start_date,
            end_date: payload.end_date,
            notify_before: payload.notify_before,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub id: String,
    #[serde(flatten)]
    pub event: EventPayload,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// POST /events
async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> AppResult<StatusCode> {
    state
        .service
        .create_event(&request.id, request.event.into())
        .await?;
    Ok(StatusCode::CREATED)
}

/// PUT /events/{id}
async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<EventPayload>,
) -> AppResult<StatusCode> {
    state.service.update_event(&id, payload.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /events/{id}
async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.service.delete_event(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /events/{id}
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Event>> {
    Ok(Json(state.service.get_event(&id).await?))
}

/// GET /events?from=..&to=..
async fn list_by_date_range(
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> AppResult<Json<Vec<Event>>> {
    Ok(Json(
        state
            .service
            .list_events_by_date_range(range.from, range.to)
            .await?,
    ))
}

/// GET /events/due/{date}
async fn list_due(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<Vec<Event>>> {
    Ok(Json(state.service.list_events_for_notification(date).await?))
}

/// GET /events/on-date/{date}
async fn list_on_date(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<Vec<Event>>> {
    Ok(Json(state.service.list_events_on_date(date).await?))
}

/// GET /events/on-week/{date}
async fn list_on_week(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<Vec<Event>>> {
    Ok(Json(state.service.list_events_on_week(date).await?))
}

/// GET /events/on-month/{date}
async fn list_on_month(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<Vec<Event>>> {
    Ok(Json(state.service.list_events_on_month(date).await?))
}

/// Mount the event routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event).get(list_by_date_range))
        .route(
            "/events/{id}",
            put(update_event).delete(delete_event).get(get_event),
        )
        .route("/events/due/{date}", get(list_due))
        .route("/events/on-date/{date}", get(list_on_date))
        .route("/events/on-week/{date}", get(list_on_week))
        .route("/events/on-month/{date}", get(list_on_month))
}
