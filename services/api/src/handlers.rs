//! Axum Handlers for the REST API
//!
//! Read-only endpoints over the catalog and the order ledger. The WebSocket
//! endpoint in `ws` is the conversational surface; these exist for history
//! queries and client bootstrapping, with `utoipa` doc comments generating
//! the OpenAPI documentation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::error;

use crate::{
    models::{ErrorResponse, OrderView, ProductView},
    state::AppState,
};

pub enum ApiError {
    NotFound(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

/// List the full product catalog.
#[utoipa::path(
    get,
    path = "/catalog",
    responses(
        (status = 200, description = "All purchasable products", body = [ProductView])
    )
)]
pub async fn list_catalog(State(state): State<Arc<AppState>>) -> Json<Vec<ProductView>> {
    let products = state
        .catalog
        .products()
        .iter()
        .map(ProductView::from)
        .collect();
    Json(products)
}

/// List all placed orders, oldest first.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Order history", body = [OrderView])
    )
)]
pub async fn list_orders(State(state): State<Arc<AppState>>) -> Json<Vec<OrderView>> {
    use pantry_core::ledger::OrderLedger;
    let ledger = state.ledger.lock().await;
    let orders = ledger.orders().iter().map(OrderView::from).collect();
    Json(orders)
}

/// Get a specific order by its sequential id.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    responses(
        (status = 200, description = "Order details", body = OrderView),
        (status = 404, description = "Order not found", body = ErrorResponse)
    ),
    params(
        ("id" = u64, Path, description = "Sequential order id")
    )
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<OrderView>, ApiError> {
    use pantry_core::ledger::OrderLedger;
    let ledger = state.ledger.lock().await;
    let order = ledger
        .orders()
        .iter()
        .find(|o| o.id == id)
        .map(OrderView::from)
        .ok_or_else(|| ApiError::NotFound(format!("Order with id '{}' not found", id)))?;
    Ok(Json(order))
}
