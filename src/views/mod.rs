//! 视图组件
//!
//! 组件都是显式生命周期：`attach` 触发副作用，`render` 根据当前状态输出 HTML 片段。

pub mod feature_list;
pub mod heavy;
pub mod source;

pub use feature_list::{FeatureList, ListState};
pub use heavy::{BlockingDelay, BulkGeneration};
pub use source::{FetchError, HttpProductSource, ProductSource};

/// HTML 文本转义
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
