//! 模拟数据接口

pub mod handler;
pub mod model;
pub mod service;

pub use model::Product;
pub use service::CatalogService;

/// 模拟数据接口路径，页面脚本与 HTTP 数据源都请求这里
pub const PRODUCTS_PATH: &str = "/api/products";
