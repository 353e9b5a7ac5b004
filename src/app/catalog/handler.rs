//! 模拟数据接口处理器

use axum::{extract::State, response::Json};
use tracing::info;

use super::model::Product;
use crate::app::AppState;

/// `GET /api/products`
pub async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    info!(
        "模拟慢查询开始，延迟 {}ms",
        state.catalog.delay().as_millis()
    );

    let products = state.catalog.list_products().await;

    info!("返回 {} 条模拟记录", products.len());
    Json(products)
}
