//! Infrastructure adapters and runtime bootstrap.

pub mod content;
pub mod error;
pub mod github;
pub mod http;
pub mod telemetry;
pub mod watch;
