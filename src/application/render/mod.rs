//! Markdown rendering shared by posts and the about page.
//!
//! The pipeline is pure: it accepts markdown input, produces deterministic,
//! sanitised HTML and surfaces structured errors. Caching is the caller's job.

mod service;
mod types;

pub use service::{ComrakRenderService, render_service};
pub use types::{RenderError, RenderService};
