//! 模拟数据服务

use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

use super::model::Product;
use crate::config::CatalogConfig;

#[derive(Debug, Clone)]
pub struct CatalogService {
    delay: Duration,
    record_count: usize,
}

impl CatalogService {
    pub fn new(delay: Duration, record_count: usize) -> Self {
        Self {
            delay,
            record_count,
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(config.delay(), config.record_count)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// 生成一批记录，id 从 1 开始连续递增
    pub fn generate(&self) -> Vec<Product> {
        let mut rng = rand::thread_rng();

        (1..=self.record_count as u32)
            .map(|id| Product {
                id,
                name: format!("Performance Product {}", id),
                description: format!("High-speed product description for item {}.", id),
                price: format_price(rng.gen_range(0..10_000)),
            })
            .collect()
    }

    /// 模拟慢查询：先挂起 `delay`，再生成数据
    ///
    /// 只挂起当前请求任务，不会阻塞运行时上的其他请求。
    pub async fn list_products(&self) -> Vec<Product> {
        sleep(self.delay).await;
        self.generate()
    }
}

/// 以分为单位格式化，保证结果严格小于 100.00
fn format_price(cents: u32) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}
