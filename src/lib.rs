//! `MeuGestor` - A WhatsApp personal-finance assistant backend
//!
//! This crate receives WhatsApp messages through an Evolution API webhook,
//! delegates natural-language understanding to an external Dify agent,
//! persists the resulting expense/income/reminder records per user, and
//! replies with confirmations and period balance reports. A companion web
//! dashboard reads the same data through a small REST API.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// Thin HTTP clients for the Dify agent and the Evolution messaging API
pub mod api;
/// Configuration management for database and application settings
pub mod config;
/// Core business logic - ledger, period resolution, summaries, dispatch
pub mod core;
/// SeaORM entity definitions for database tables
pub mod entities;
/// Unified error types and result handling
pub mod errors;
/// Axum routes - Evolution webhook and dashboard REST API
pub mod web;

#[cfg(test)]
pub mod test_utils;
