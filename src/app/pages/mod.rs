//! 页面路由

pub mod handler;
pub mod layout;
