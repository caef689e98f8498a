//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use pos_types::{
    AppError, CreatePaymentRequest, DeletePaymentQuery, NewPaymentItem, PaymentId,
    PaymentRepository, RegisterCashDeskRequest, RegisterEmployeeRequest,
};

use super::extract::{ApiJson, ApiQuery};
use crate::PaymentService;

/// Application state shared across handlers.
pub struct AppState<R: PaymentRepository> {
    pub service: PaymentService<R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = serde_json::json!({
            "error": self.0.to_string(),
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

fn parse_payment_id(id: &str) -> Result<PaymentId, ApiError> {
    id.parse()
        .map_err(|_| AppError::InvalidArgument(format!("Invalid payment ID: {}", id)).into())
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Reference data
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state), fields(cash_desk = %req.number))]
pub async fn register_cash_desk<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    ApiJson(req): ApiJson<RegisterCashDeskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let desk = state.service.register_cash_desk(req).await?;
    Ok((StatusCode::CREATED, Json(desk)))
}

#[tracing::instrument(skip(state), fields(employee = %req.registration_number))]
pub async fn register_employee<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    ApiJson(req): ApiJson<RegisterEmployeeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let employee = state.service.register_employee(req).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────────────────────────

/// Open a payment at a cash desk.
#[tracing::instrument(skip(state), fields(cash_desk = %req.cash_desk_number, employee = %req.employee_registration_number))]
pub async fn create_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    ApiJson(req): ApiJson<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state.service.create_payment(req).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// List all payments, newest first.
#[tracing::instrument(skip(state))]
pub async fn list_payments<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = state.service.list_payments().await?;
    Ok(Json(payments))
}

/// Get a payment with its items.
#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn get_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id = parse_payment_id(&id)?;

    let details = state.service.get_payment_details(payment_id).await?;
    Ok(Json(details))
}

#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn confirm_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id = parse_payment_id(&id)?;

    let payment = state.service.confirm_payment(payment_id).await?;
    Ok(Json(payment))
}

/// Add a line item to an open payment.
#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn add_payment_item<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    ApiJson(item): ApiJson<NewPaymentItem>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id = parse_payment_id(&id)?;

    let item = state
        .service
        .add_payment_item(item.for_payment(payment_id))
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn list_payment_items<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id = parse_payment_id(&id)?;

    let items = state.service.list_payment_items(payment_id).await?;
    Ok(Json(items))
}

/// Delete a payment; `?delete_items=true` removes its items as well.
#[tracing::instrument(skip(state), fields(payment_id = %id, delete_items = query.delete_items))]
pub async fn delete_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<DeletePaymentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id = parse_payment_id(&id)?;

    state
        .service
        .delete_payment(payment_id, query.delete_items)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
