//! Domain layer types and invariants.

pub mod about;
pub mod github;
pub mod hero;
pub mod posts;
pub mod slug;
pub mod text;
