//! # Domain
//!
//! Plain data shared by every HeroHQ crate: configuration, `OpenAPI` tags and the feature
//! slice registry. Depends on `serde` only; no I/O lives here.

pub mod config;
pub mod constants;
pub mod registry;
