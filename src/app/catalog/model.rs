//! 模拟数据模型

use serde::{Deserialize, Serialize};

/// 模拟接口返回的单条记录
///
/// `price` 是保留两位小数的字符串，和原始接口的 JSON 形状保持一致。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub price: String,
}
