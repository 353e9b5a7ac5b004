//! 列表视图的数据来源

use async_trait::async_trait;
use reqwest::Client;

use crate::app::catalog::{Product, PRODUCTS_PATH};

/// 拉取数据失败的原因
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("请求失败: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("接口返回非成功状态码: {0}")]
    Status(u16),
    #[error("响应解析失败: {0}")]
    Decode(#[from] serde_json::Error),
}

/// 列表视图挂载时调用一次的数据源
#[async_trait]
pub trait ProductSource: Send + Sync + 'static {
    async fn fetch(&self) -> Result<Vec<Product>, FetchError>;
}

/// 通过 HTTP 请求模拟数据接口
///
/// 不设置超时，沿用 reqwest 客户端的默认行为。
#[derive(Debug, Clone)]
pub struct HttpProductSource {
    client: Client,
    url: String,
}

impl HttpProductSource {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), PRODUCTS_PATH),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ProductSource for HttpProductSource {
    async fn fetch(&self) -> Result<Vec<Product>, FetchError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
