//! CLI command implementations.

pub mod cache;
pub mod common;
pub mod config;
pub mod download;
pub mod estimate;
pub mod fetch;
pub mod lifecycle;
pub mod tile;
