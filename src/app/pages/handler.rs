//! 页面处理器

use axum::{extract::State, response::Html};
use tracing::warn;

use super::layout;
use crate::app::AppState;
use crate::views::{BlockingDelay, BulkGeneration};

/// `GET /` 首页：hero + 产品列表，按配置挂载回归组件
pub async fn landing(State(state): State<AppState>) -> Html<String> {
    let mut body = layout::hero();
    body.push_str(&layout::feature_list_section());

    let regression = &state.regression;
    if regression.blocking_delay {
        // 故意在处理请求的工作线程上忙等
        warn!("首页挂载阻塞延迟组件 ({}ms)", regression.blocking_delay_ms);
        let mut delay = BlockingDelay::new(regression.blocking_duration());
        delay.attach();
        body.push_str(&delay.render());
    }
    if regression.bulk_render {
        warn!("首页挂载批量渲染组件 ({} 条)", regression.bulk_item_count);
        let mut bulk = BulkGeneration::new(regression.bulk_item_count);
        bulk.attach();
        body.push_str(&bulk.render());
    }

    Html(layout::document("Performance Thesis Testbed", &body))
}

/// `GET /products`
pub async fn products() -> Html<String> {
    let mut body = layout::banner("products", "Products Page");
    body.push_str(&layout::feature_list_section());
    Html(layout::document("Products Page", &body))
}

/// `GET /about` 静态对照页
pub async fn about() -> Html<String> {
    let mut body = layout::banner("about", "About Us");
    body.push_str(&layout::about_content());
    Html(layout::document("About Us", &body))
}
