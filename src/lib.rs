//! ascii-site: markdown posts and GitHub repository cards aggregated into
//! cached, ordered views, served as plain text, RSS and JSON.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
