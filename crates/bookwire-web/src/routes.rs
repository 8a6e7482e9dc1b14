use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use bookwire_core::{AuthClient, AuthSession, BookingClient, Category, SlotIndex};

use crate::error::ApiFailure;

pub struct AppState {
    pub auth: AuthClient,
    pub booking: BookingClient,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/companies/:company_id/categories", get(categories))
        .route(
            "/api/companies/:company_id/services/:service_id/slots",
            get(slots),
        )
        .route("/api/auth", post(authenticate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn categories(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<u64>,
) -> Result<Json<Vec<Category>>, ApiFailure> {
    Ok(Json(state.booking.categories(company_id).await?))
}

async fn slots(
    State(state): State<Arc<AppState>>,
    Path((company_id, service_id)): Path<(u64, u64)>,
) -> Result<Json<SlotIndex>, ApiFailure> {
    Ok(Json(state.booking.slots(company_id, service_id).await?))
}

#[derive(Debug, Deserialize)]
struct AuthForm {
    number: String,
    password: String,
}

async fn authenticate(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AuthForm>,
) -> Result<Json<AuthSession>, ApiFailure> {
    Ok(Json(state.auth.authenticate(&form.number, &form.password).await?))
}
