use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use serde_json::json;

use crate::db::models::{Medicine, Order};
use crate::error::AppError;
use crate::services;
use crate::state::AppState;

const RECENT_ORDERS_LIMIT: usize = 5;

/// GET /api/analytics: seven-day sales series, inventory breakdown, order
/// status distribution and the most recent orders, in one payload.
pub async fn get_analytics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let orders: Vec<Order> = state
        .db
        .collection::<Order>("orders")
        .find(doc! {})
        .sort(doc! { "date": -1 })
        .await?
        .try_collect()
        .await?;

    let medicines: Vec<Medicine> = state
        .db
        .collection::<Medicine>("medicines")
        .find(doc! {})
        .await?
        .try_collect()
        .await?;

    let now = Utc::now();
    let recent: Vec<&Order> = orders.iter().take(RECENT_ORDERS_LIMIT).collect();

    Ok(Json(json!({
        "salesData": services::sales_series(&orders, now),
        "inventoryData": services::inventory_breakdown(&medicines),
        "orderStatusData": services::order_status_distribution(&orders),
        "recentOrders": recent,
    })))
}
