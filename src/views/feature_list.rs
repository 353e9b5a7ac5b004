//! 产品列表视图
//!
//! 生命周期：
//! - `new` 之后处于 `Loading`
//! - `attach` 启动唯一一次异步拉取，结果写回视图自己的状态
//! - `detach` 之后视图不再接收结果，迟到的数据被丢弃
//!
//! 拉取失败时记录日志并进入空列表的 `Loaded`，页面不会停在加载中。

use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, error};

use super::{escape, source::ProductSource};
use crate::app::catalog::Product;

pub const LOADING_TEXT: &str = "Loading features...";

#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    Loading,
    Loaded(Vec<Product>),
}

pub struct FeatureList {
    source: Arc<dyn ProductSource>,
    state: watch::Receiver<ListState>,
    // attach 时交给拉取任务，之后为 None
    sender: Option<watch::Sender<ListState>>,
    task: Option<JoinHandle<()>>,
}

impl FeatureList {
    pub fn new(source: Arc<dyn ProductSource>) -> Self {
        let (sender, state) = watch::channel(ListState::Loading);
        Self {
            source,
            state,
            sender: Some(sender),
            task: None,
        }
    }

    /// 挂载视图，启动一次拉取。必须在 tokio 运行时中调用。
    ///
    /// 每个视图只拉取一次，重复调用直接忽略。
    pub fn attach(&mut self) {
        let Some(sender) = self.sender.take() else {
            debug!("列表视图已挂载过，忽略");
            return;
        };

        let source = Arc::clone(&self.source);
        self.task = Some(tokio::spawn(async move {
            let products = match source.fetch().await {
                Ok(products) => products,
                Err(e) => {
                    error!("Failed to fetch products: {}", e);
                    Vec::new()
                }
            };

            if sender.send(ListState::Loaded(products)).is_err() {
                debug!("列表视图已卸载，丢弃迟到的结果");
            }
        }));
    }

    /// 等待拉取结束（成功或失败）。未挂载或已卸载时立即返回。
    pub async fn settled(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("列表拉取任务异常退出: {}", e);
            }
        }
    }

    /// 卸载视图：冻结当前状态，之后到达的结果全部忽略。
    ///
    /// 已发出的请求不会被取消。
    pub fn detach(&mut self) {
        let current = self.state();
        let (_, frozen) = watch::channel(current);
        self.state = frozen;
        self.sender = None;
        self.task = None;
    }

    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.state.borrow(), ListState::Loading)
    }

    pub fn render(&self) -> String {
        render_state(&self.state.borrow())
    }
}

/// 按状态渲染列表片段
pub fn render_state(state: &ListState) -> String {
    match state {
        ListState::Loading => format!(
            r#"<div class="feature-list loading">{}</div>"#,
            LOADING_TEXT
        ),
        ListState::Loaded(products) => {
            let cards: String = products.iter().map(render_card).collect();
            format!(
                r#"<div class="feature-list">
  <h2 class="eyebrow">Features</h2>
  <p class="title">Our Products</p>
  <div class="grid">{}</div>
</div>"#,
                cards
            )
        }
    }
}

fn render_card(product: &Product) -> String {
    format!(
        r#"<div class="card" data-id="{}"><h3>{}</h3><p>{}</p><p class="price">${}</p></div>"#,
        product.id,
        escape(&product.name),
        escape(&product.description),
        escape(&product.price)
    )
}
