//! Application services: parsing, resolution and composition of site content.

pub mod about;
pub mod error;
pub mod github;
pub mod hero;
pub(crate) mod metrics;
pub mod parser;
pub mod plaintext;
pub mod render;
pub mod sources;
pub mod syndication;
