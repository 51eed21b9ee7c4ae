#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by every HeroHQ crate.
//!
//! * [`macro@hq_error`] turns a struct-variant enum into a `thiserror` error with context support.
//! * [`macro@hq_slice`] wraps feature state into a cheaply clonable, registrable slice.
//! * [`macro@api_model`] and [`macro@api_handler`] keep DTOs and Axum handlers consistent with
//!   the `OpenAPI` document.
//! * [`macro@main`] boots the process on a pre-configured Tokio runtime.
//!
//! Examples are `ignore`d here because a proc-macro crate cannot use its own macros in doctests.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Attribute macro to bootstrap the process on a `hq_runtime` Tokio runtime.
///
/// Accepts an optional profile: `high_performance`, `memory_efficient` or `default`.
/// The annotated function must be `async` and return a `Result`.
///
/// # Examples
///
/// ```rust,ignore
/// #[hq_runtime::main(high_performance)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Attribute macro to define a request or response body.
///
/// * **Derives**: adds `Debug`, `Serialize` and `Deserialize` when missing.
/// * **`OpenAPI`**: adds `utoipa::ToSchema` when the consuming crate's `server` feature is on.
/// * **Serde Policy**: `rename_all = "snake_case"` unless overridden; unknown fields are
///   rejected only with `deny_unknown_fields = true`.
///
/// # Example
///
/// ```rust,ignore
/// use hq_derive::api_model;
///
/// #[api_model(deny_unknown_fields = true)]
/// pub struct UpdatePowerRequest {
///     pub description: Option<String>,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Attribute macro to register an Axum handler in the `OpenAPI` document.
///
/// Accepts the standard `utoipa::path` arguments. The path attribute is only emitted when
/// the consuming crate enables its `server` feature.
///
/// # Example
///
/// ```rust,ignore
/// use hq_derive::api_handler;
///
/// #[api_handler(get, path = "/heroes", responses((status = OK, body = Vec<Hero>)), tag = HEROES_TAG)]
/// pub async fn list_heroes(State(state): State<ApiState>) -> Result<Json<Vec<Hero>>, ApiError> {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Attribute macro for crate error enums.
///
/// Every variant must use named fields. A variant may carry a
/// `context: Option<Cow<'static, str>>` field, and a variant wrapping an upstream error names
/// it `source` (or marks it `#[source]` / `#[from]`); such variants must also carry `context`.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<Name>Ext<T>` with `.context(...)` for `Result<T, Name>` and for
///   `Result<T, Source>` of every source variant.
/// * `From<Source>` for every source variant.
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }` variant exists.
/// * A private `format_context` helper for `#[error(...)]` strings.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[hq_derive::hq_error]
/// pub enum RosterError {
///     #[error("Persistence error{}: {source}", format_context(.context))]
///     Persistence { source: surrealdb::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load(db: &Database) -> Result<Vec<Hero>, RosterError> {
///     db.query("SELECT * FROM hero").await.context("Loading heroes")?.take(0).context("Decoding heroes")
/// }
/// ```
#[proc_macro_attribute]
pub fn hq_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Attribute macro to define a feature slice handle.
///
/// The annotated struct becomes `<Name>Inner`; `<Name>` wraps it in an `Arc`, derefs to it,
/// and implements `hq_kernel::domain::registry::FeatureSlice`.
///
/// # Example
/// ```rust,ignore
/// #[hq_derive::hq_slice]
/// pub struct Roster {
///     pub repository: Repository,
/// }
///
/// let slice = Roster::new(RosterInner { repository });
/// ```
#[proc_macro_attribute]
pub fn hq_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
