//! HTTP route handlers.

use std::path::Path as FsPath;

use askama::Template;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tracing::{debug, warn};

use crate::domain::{DomainError, Line, Position, TripIdError};
use crate::view::{DEFAULT_ZOOM, Selection};

use super::dto::*;
use super::state::AppState;
use super::templates::IndexTemplate;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &FsPath) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/api/view", get(get_view))
        .route("/api/lines", get(list_lines))
        .route("/api/lines/:line/vehicles", get(line_vehicles))
        .route("/api/vehicles", get(list_vehicles))
        .route("/api/vehicles/nearby", get(nearby_vehicles))
        .route("/api/search", post(set_search))
        .route("/api/selection/toggle", post(toggle_line))
        .route("/api/selection/clear", post(clear_selection))
        .route("/api/focus/:id", post(focus_vehicle))
        .route("/api/locate", post(locate))
        .route("/api/notifications/:id/dismiss", post(dismiss_notification))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Map page.
async fn index_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let template = IndexTemplate {
        lat: state.default_center.lat,
        lng: state.default_center.lng,
        zoom: DEFAULT_ZOOM,
        refresh_ms: state.refresh_interval.as_millis() as u64,
    };
    let html = template.render().map_err(|e| AppError::Internal {
        message: format!("Template error: {e}"),
    })?;
    Ok(Html(html))
}

/// Everything the map draws.
async fn get_view(State(state): State<AppState>) -> Json<ViewResponse> {
    let view = state.view.read().await;
    Json(ViewResponse::from_view(&view))
}

/// Lines matching `q`, or the stored search text when `q` is absent.
async fn list_lines(
    State(state): State<AppState>,
    Query(req): Query<LinesQuery>,
) -> Json<LinesResponse> {
    let view = state.view.read().await;
    let lines = match req.q {
        Some(q) => {
            let mut query = Selection::new();
            query.set_search(q);
            query
                .visible_lines(&view.snapshot().lines)
                .into_iter()
                .map(|l| l.to_string())
                .collect()
        }
        None => view.visible_lines().iter().map(|l| l.to_string()).collect(),
    };
    Json(LinesResponse { lines })
}

/// Vehicles passing the current line selection.
async fn list_vehicles(State(state): State<AppState>) -> Json<VehiclesResponse> {
    let view = state.view.read().await;
    let vehicles = view
        .visible_vehicles()
        .into_iter()
        .map(VehicleResult::from_vehicle)
        .collect();
    Json(VehiclesResponse { vehicles })
}

/// All vehicles on one line.
async fn line_vehicles(
    State(state): State<AppState>,
    Path(line): Path<String>,
) -> Result<Json<VehiclesResponse>, AppError> {
    let line = Line::parse(&line)?;
    let view = state.view.read().await;

    let vehicles: Vec<_> = view
        .vehicles_on_line(&line)
        .into_iter()
        .map(VehicleResult::from_vehicle)
        .collect();
    if vehicles.is_empty() {
        return Err(AppError::NotFound {
            message: format!("No vehicles on line {line}"),
        });
    }
    Ok(Json(VehiclesResponse { vehicles }))
}

/// Vehicles on a line within range of a point.
async fn nearby_vehicles(
    State(state): State<AppState>,
    Query(req): Query<NearbyQuery>,
) -> Result<Json<VehiclesResponse>, AppError> {
    let line = Line::parse(&req.line)?;
    let from = Position::new(req.lat, req.lng)?;
    if !req.range_km.is_finite() || req.range_km < 0.0 {
        return Err(AppError::BadRequest {
            message: format!("Invalid range: {}", req.range_km),
        });
    }

    let view = state.view.read().await;
    let vehicles: Vec<_> = view
        .vehicles_near(&line, &from, req.range_km)
        .into_iter()
        .map(VehicleResult::from_vehicle)
        .collect();
    if vehicles.is_empty() {
        return Err(AppError::NotFound {
            message: format!("No vehicles on line {line} within {} km", req.range_km),
        });
    }
    Ok(Json(VehiclesResponse { vehicles }))
}

/// Replace the search text and return the matching lines.
async fn set_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Json<LinesResponse> {
    let mut view = state.view.write().await;
    view.set_search(req.text);
    let lines = view.visible_lines().iter().map(|l| l.to_string()).collect();
    Json(LinesResponse { lines })
}

async fn toggle_line(
    State(state): State<AppState>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, AppError> {
    let line = Line::parse(&req.line)?;
    let mut view = state.view.write().await;

    let selected = view.toggle_line(line.clone());
    debug!(%line, selected, "Line toggled");

    Ok(Json(ToggleResponse {
        line: line.to_string(),
        selected,
        selected_lines: view
            .selection()
            .selected()
            .iter()
            .map(|l| l.to_string())
            .collect(),
    }))
}

async fn clear_selection(State(state): State<AppState>) -> StatusCode {
    state.view.write().await.clear_selection();
    StatusCode::NO_CONTENT
}

/// Centre the map on a vehicle.
async fn focus_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ViewportResult>, AppError> {
    let mut view = state.view.write().await;
    if !view.focus_vehicle(&id) {
        return Err(AppError::NotFound {
            message: format!("Unknown vehicle: {id}"),
        });
    }
    Ok(Json(ViewportResult::from_viewport(view.map().viewport())))
}

/// Show the user's location and centre on it.
async fn locate(
    State(state): State<AppState>,
    Json(req): Json<LocateRequest>,
) -> Result<Json<ViewportResult>, AppError> {
    let position = Position::new(req.lat, req.lng)?;
    let mut view = state.view.write().await;
    view.locate(position);
    Ok(Json(ViewportResult::from_viewport(view.map().viewport())))
}

async fn dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    let view = state.view.read().await;
    if view.dismiss_notification(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound {
            message: format!("No active notification {id}"),
        })
    }
}

/// Application errors.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<TripIdError> for AppError {
    fn from(e: TripIdError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            warn!(%status, %message, "Request failed");
        } else {
            debug!(%status, %message, "Request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
