//! v1 API Data Transfer Objects.
//!
//! Wire types for the slip API, kept apart from the internal models in
//! `src/models/`. Fields serialize as camelCase.

pub mod jobs;

pub use jobs::*;
