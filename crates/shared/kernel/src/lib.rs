//! # Kernel
//!
//! Cross-slice plumbing: the layered config loader and, behind the `server` feature, the
//! axum state, error envelope and system routes.
//!
//! ```rust,ignore
//! use hq_kernel::config::load_config;
//! use hq_kernel::domain::config::ApiConfig;
//!
//! let cfg: ApiConfig = load_config(Some("server"))?;
//! ```

pub mod config;
#[cfg(feature = "server")]
pub mod server;

pub use hq_domain as domain;
