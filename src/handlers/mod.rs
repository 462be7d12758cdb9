//! HTTP handlers

pub mod api;
pub mod fallback;
pub mod health;
pub mod model_info;
pub mod pages;
pub mod predict;
