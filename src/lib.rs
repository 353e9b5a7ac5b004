//! # 性能测试平台
//!
//! 一个用于验证性能度量工具的最小 Web 应用：
//! - `/api/products` 模拟慢查询，固定延迟后返回合成数据
//! - 产品列表视图挂载时拉取一次数据，失败时降级为空列表
//! - 可选的回归组件：主线程忙等、一次性渲染大量条目
//! - `probe` 度量客户端，对接口延迟做门禁检查

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;
pub mod probe;
pub mod views;

pub use app::{router, AppState};
pub use config::{Config, ConfigError};
