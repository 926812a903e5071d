#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the loader workspace.
//!
//! * [`macro@main`] bootstraps a Tokio runtime profile around `async fn main`.
//! * [`macro@stager_error`] turns a plain enum into a context-aware error type.
//!
//! The examples are `ignore`d because a proc-macro crate cannot use its own
//! macros in doctests; the UI tests under `tests/ui` exercise them instead.

mod macros {
    pub mod error;
    pub mod runtime;
}

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, parse_macro_input};

/// Attribute macro to bootstrap a Tokio runtime from a named profile.
///
/// The annotated `async fn` must return a `Result`. It is rewritten into a
/// synchronous function that builds the runtime and blocks on the body.
///
/// # Arguments
///
/// * `cooperative` - A current-thread runtime. Every future is polled on the
///   calling thread, which is the scheduling model the loading pipeline assumes.
/// * `multi_threaded` - A work-stealing runtime sized from available parallelism.
/// * `default` - Same as `multi_threaded`, with default naming.
///
/// # Examples
///
/// ```rust,ignore
/// #[stager_runtime::main(cooperative)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Attribute macro for crate-level error enums.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<ErrorName>Ext` trait with `.context(...)`, implemented for `Result<T, ErrorName>`
///   and for `Result<T, Source>` of every variant that wraps a source error.
/// * `From<Source>` for every variant with a `source` field (or `#[source]`/`#[from]`).
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * A private `format_context` helper for use inside `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. Applied to an **enum** with named-field variants only.
/// 2. Variants with a source must also carry `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use stager_derive::stager_error;
/// use std::borrow::Cow;
///
/// #[stager_error]
/// pub enum FetchError {
///     #[error("Decode failed{}: {source}", format_context(.context))]
///     Decode { source: serde_json::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fetch error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn parse(body: &str) -> Result<serde_json::Value, FetchError> {
///     serde_json::from_str(body).context("Decoding configuration")
/// }
/// ```
#[proc_macro_attribute]
pub fn stager_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
