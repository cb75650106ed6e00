//! HTTP 핸들러

pub mod call;
pub mod health;
pub mod info;
