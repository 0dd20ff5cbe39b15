use crate::actions::{DeleteOutcome, FormOutcome, INVOICES_PATH};
use crate::models::{FormData, FormState, Invoice, InvoiceId};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Serialize;
use service_core::error::AppError;

const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

#[derive(Serialize)]
struct InvoiceList {
    invoices: Vec<Invoice>,
}

impl IntoResponse for FormOutcome {
    fn into_response(self) -> Response {
        match self {
            FormOutcome::Redirect(target) => Redirect::to(target).into_response(),
            FormOutcome::Render(state) => {
                let status = if state.has_field_errors() {
                    StatusCode::UNPROCESSABLE_ENTITY
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, Json(state)).into_response()
            }
        }
    }
}

impl IntoResponse for DeleteOutcome {
    fn into_response(self) -> Response {
        match self {
            DeleteOutcome::Deleted => StatusCode::NO_CONTENT.into_response(),
            DeleteOutcome::Failed(state) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(state)).into_response()
            }
        }
    }
}

fn json_page(body: String, cache_status: &'static str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (X_CACHE, cache_status),
        ],
        body,
    )
        .into_response()
}

/// Invoice listing, served from the page cache until a write invalidates it.
pub async fn list_invoices(State(state): State<AppState>) -> Result<Response, AppError> {
    let cache = state.actions.cache();

    if let Some(body) = cache.get(INVOICES_PATH) {
        return Ok(json_page(body, "hit"));
    }

    let generation = cache.generation();
    let invoices = state.actions.store().list_invoices().await?;
    let body = serde_json::to_string(&InvoiceList { invoices })
        .map_err(|e| AppError::InternalError(e.into()))?;

    if !cache.store(INVOICES_PATH, generation, body.clone()) {
        tracing::debug!("Invoice listing changed while rendering; not cached");
    }

    Ok(json_page(body, "miss"))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    Form(form): Form<FormData>,
) -> FormOutcome {
    state
        .actions
        .create_invoice(&FormState::default(), &form)
        .await
}

pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<FormData>,
) -> FormOutcome {
    state
        .actions
        .update_invoice(&InvoiceId::new(id), &FormState::default(), &form)
        .await
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DeleteOutcome {
    state.actions.delete_invoice(&InvoiceId::new(id)).await
}

/// Dashboard landing page: the invoice listing.
pub async fn dashboard_home() -> Redirect {
    Redirect::to(INVOICES_PATH)
}
