//! API Models
//!
//! REST-facing views of the core types, kept separate so the OpenAPI surface
//! (via `utoipa`) never leaks core internals.

use chrono::{DateTime, Utc};
use pantry_core::catalog::Product;
use pantry_core::ledger::{Order, OrderLine};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A catalog product as exposed over REST.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ProductView {
    #[schema(example = "bread")]
    pub id: String,
    #[schema(example = "Whole Wheat Bread")]
    pub name: String,
    #[schema(example = "bakery")]
    pub category: String,
    #[schema(example = 40)]
    pub price: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            category: p.category.clone(),
            price: p.price,
            color: p.color.clone(),
        }
    }
}

/// One line of a placed order.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct OrderLineView {
    pub product_id: String,
    pub name: String,
    pub unit_price: u32,
    pub quantity: u32,
}

impl From<&OrderLine> for OrderLineView {
    fn from(l: &OrderLine) -> Self {
        Self {
            product_id: l.product_id.clone(),
            name: l.name.clone(),
            unit_price: l.unit_price,
            quantity: l.quantity,
        }
    }
}

/// A placed order as exposed over REST.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct OrderView {
    #[schema(example = 1)]
    pub id: u64,
    pub lines: Vec<OrderLineView>,
    #[schema(example = 80)]
    pub total: u64,
    #[schema(example = "INR")]
    pub currency: String,
    pub placed_at: DateTime<Utc>,
}

impl From<&Order> for OrderView {
    fn from(o: &Order) -> Self {
        Self {
            id: o.id,
            lines: o.lines.iter().map(OrderLineView::from).collect(),
            total: o.total,
            currency: o.currency.clone(),
            placed_at: o.placed_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
